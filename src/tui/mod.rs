//! Terminal front-ends: the staging view and the generation spinner.

pub mod spinner;
pub mod staging;
pub mod staging_view;

use std::io::{self, IsTerminal};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::warn;

pub use spinner::{GenerationOutcome, Spinner, race_worker, wait_for_cancel_key};
pub use staging::{SessionEnd, StagingEvent, StagingSession, StagingState};
pub use staging_view::run_staging_view;

/// Whether stdin and stdout are both attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// `q`, Esc or Ctrl-C.
pub fn is_cancel_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Keeps the terminal in raw mode until dropped.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}
