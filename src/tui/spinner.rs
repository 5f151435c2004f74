//! Spinner and cancel race for the background suggestion worker.

use std::future::Future;
use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::CommitFlowError;
use crate::tui::{RawModeGuard, is_cancel_key, is_interactive};

/// What happened to an outstanding worker.
#[derive(Debug, PartialEq, Eq)]
pub enum GenerationOutcome<T> {
    Completed(T),
    /// The user quit first. The worker's eventual result is never read.
    Cancelled,
}

/// Terminal spinner shown while the worker runs.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

/// Wait for whichever comes first: the worker's message or the cancel future.
///
/// A worker that drops its sender without reporting is
/// [`CommitFlowError::WorkerLost`].
pub async fn race_worker<T, C>(
    worker: oneshot::Receiver<T>,
    cancel: C,
) -> Result<GenerationOutcome<T>, CommitFlowError>
where
    C: Future<Output = ()>,
{
    tokio::select! {
        received = worker => match received {
            Ok(value) => Ok(GenerationOutcome::Completed(value)),
            Err(_) => Err(CommitFlowError::WorkerLost),
        },
        () = cancel => {
            debug!("Generation cancelled by user");
            Ok(GenerationOutcome::Cancelled)
        }
    }
}

/// Resolve when the user presses a cancel key.
///
/// Never resolves when there is no terminal to read from.
pub async fn wait_for_cancel_key() {
    if is_interactive() {
        match read_cancel_key().await {
            Ok(()) => return,
            Err(e) => debug!("Stopped watching for cancel key: {}", e),
        }
    }
    std::future::pending::<()>().await
}

async fn read_cancel_key() -> io::Result<()> {
    let _raw = RawModeGuard::enable()?;
    let mut events = EventStream::new();
    while let Some(event) = events.next().await {
        if let Event::Key(key) = event?
            && is_cancel_key(&key)
        {
            return Ok(());
        }
    }
    Err(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "terminal event stream closed",
    ))
}
