//! Full-screen crossterm driver for [`StagingSession`].

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::debug;

use crate::error::StagingError;
use crate::tui::staging::{SessionEnd, StagingEvent, StagingSession, StagingState};
use crate::tui::{RawModeGuard, is_interactive};
use crate::vcs::VersionControlBackend;

const HELP: &str = "↑/k ↓/j move · space toggle · a toggle all · enter confirm · q quit";

/// Map a key press to a session event.
pub fn map_key(key: &KeyEvent) -> Option<StagingEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(StagingEvent::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(StagingEvent::Down),
        KeyCode::Char(' ') => Some(StagingEvent::Toggle),
        KeyCode::Char('a') => Some(StagingEvent::ToggleAll),
        KeyCode::Enter => Some(StagingEvent::Confirm),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(StagingEvent::Cancel)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(StagingEvent::Cancel),
        _ => None,
    }
}

/// Text lines for one frame of the view.
pub fn render_lines(state: &StagingState) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Stage files ({} of {} staged)",
            state.staged_count(),
            state.rows().len()
        ),
        String::new(),
    ];

    if state.rows().is_empty() {
        lines.push("  No changes in the working tree".to_string());
    }

    for (i, row) in state.rows().iter().enumerate() {
        let pointer = if i == state.cursor() { '>' } else { ' ' };
        let check = if row.staged { 'x' } else { ' ' };
        lines.push(format!(
            "{pointer} [{check}] {} {}",
            row.status.marker(),
            row.path
        ));
    }

    lines.push(String::new());
    if let Some(message) = state.status_message() {
        lines.push(format!("! {message}"));
    }
    lines.push(HELP.to_string());
    lines
}

fn draw(out: &mut impl Write, state: &StagingState) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (i, line) in render_lines(state).iter().enumerate() {
        queue!(out, MoveTo(0, i as u16))?;
        if i == state.cursor() + 2 && !state.rows().is_empty() {
            queue!(
                out,
                SetAttribute(Attribute::Reverse),
                Print(line),
                SetAttribute(Attribute::Reset)
            )?;
        } else {
            queue!(out, Print(line))?;
        }
    }
    out.flush()
}

/// Run the interactive staging view until the user confirms or quits.
pub fn run_staging_view<B>(backend: &B) -> Result<SessionEnd, StagingError>
where
    B: VersionControlBackend + ?Sized,
{
    if !is_interactive() {
        return Err(StagingError::NotInteractive);
    }

    let mut session = StagingSession::start(backend)?;

    let mut stdout = io::stdout();
    let raw = RawModeGuard::enable().map_err(StagingError::Terminal)?;
    execute!(stdout, EnterAlternateScreen, Hide).map_err(StagingError::Terminal)?;

    let result = event_loop(&mut session, &mut stdout);

    let restore = execute!(stdout, Show, LeaveAlternateScreen);
    drop(raw);
    restore.map_err(StagingError::Terminal)?;

    let end = result?;
    debug!("Staging session ended: {:?}", end);
    Ok(end)
}

fn event_loop<B>(
    session: &mut StagingSession<'_, B>,
    out: &mut impl Write,
) -> Result<SessionEnd, StagingError>
where
    B: VersionControlBackend + ?Sized,
{
    loop {
        draw(out, session.state()).map_err(StagingError::Terminal)?;

        let Event::Key(key) = event::read().map_err(StagingError::Terminal)? else {
            continue;
        };
        let Some(staging_event) = map_key(&key) else {
            continue;
        };

        if let Some(end) = session.handle(staging_event)? {
            return Ok(end);
        }
    }
}
