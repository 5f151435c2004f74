//! Interactive staging session as an explicit state machine.
//!
//! [`StagingState::transition`] is pure: it moves the cursor and decides which
//! stage/unstage calls an event requires, but never touches the repository.
//! [`StagingSession`] applies those effects one at a time and then rebuilds
//! the rows from a fresh backend query, so the view never drifts from the
//! index even when a call fails halfway through a toggle-all.

use tracing::{debug, warn};

use crate::error::VcsError;
use crate::vcs::{ChangeRecord, ChangeStatus, VersionControlBackend};

/// One file row in the staging view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingRow {
    pub path: String,
    pub status: ChangeStatus,
    pub staged: bool,
}

impl From<ChangeRecord> for StagingRow {
    fn from(record: ChangeRecord) -> Self {
        Self {
            path: record.path,
            status: record.status,
            staged: record.staged,
        }
    }
}

/// Input events understood by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingEvent {
    Up,
    Down,
    Toggle,
    ToggleAll,
    Confirm,
    Cancel,
}

/// A repository mutation requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Stage(String),
    Unstage(String),
}

impl Effect {
    fn inverse(&self) -> Effect {
        match self {
            Effect::Stage(path) => Effect::Unstage(path.clone()),
            Effect::Unstage(path) => Effect::Stage(path.clone()),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Keep whatever is staged and continue.
    Confirmed,
    /// The user aborted. Mutations already applied stay in effect.
    Cancelled,
}

/// Result of feeding one event to the state machine.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    pub end: Option<SessionEnd>,
}

impl Transition {
    fn effects(effects: Vec<Effect>) -> Self {
        Self { effects, end: None }
    }

    fn end(end: SessionEnd) -> Self {
        Self {
            effects: Vec::new(),
            end: Some(end),
        }
    }
}

#[derive(Debug, Default)]
pub struct StagingState {
    rows: Vec<StagingRow>,
    cursor: usize,
    quitting: bool,
    /// Effects of the last toggle-all, while no other mutation has happened.
    last_toggle_all: Option<Vec<Effect>>,
    status_message: Option<String>,
}

impl StagingState {
    pub fn new(records: Vec<ChangeRecord>) -> Self {
        Self {
            rows: records.into_iter().map(StagingRow::from).collect(),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[StagingRow] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn staged_count(&self) -> usize {
        self.rows.iter().filter(|row| row.staged).count()
    }

    /// Apply one event and report the mutations it requires.
    pub fn transition(&mut self, event: StagingEvent) -> Transition {
        match event {
            StagingEvent::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                Transition::default()
            }
            StagingEvent::Down => {
                if self.cursor + 1 < self.rows.len() {
                    self.cursor += 1;
                }
                Transition::default()
            }
            StagingEvent::Toggle => {
                self.last_toggle_all = None;
                let Some(row) = self.rows.get(self.cursor) else {
                    return Transition::default();
                };
                let effect = if row.staged {
                    Effect::Unstage(row.path.clone())
                } else {
                    Effect::Stage(row.path.clone())
                };
                Transition::effects(vec![effect])
            }
            StagingEvent::ToggleAll => {
                // A second toggle-all in a row undoes the first.
                let effects = match self.last_toggle_all.take() {
                    Some(previous) => previous.iter().map(Effect::inverse).collect(),
                    None => {
                        let effects = self.toggle_all_effects();
                        self.last_toggle_all = Some(effects.clone());
                        effects
                    }
                };
                Transition::effects(effects)
            }
            StagingEvent::Confirm => Transition::end(SessionEnd::Confirmed),
            StagingEvent::Cancel => {
                self.quitting = true;
                Transition::end(SessionEnd::Cancelled)
            }
        }
    }

    fn toggle_all_effects(&self) -> Vec<Effect> {
        let all_staged = !self.rows.is_empty() && self.rows.iter().all(|row| row.staged);
        if all_staged {
            self.rows
                .iter()
                .map(|row| Effect::Unstage(row.path.clone()))
                .collect()
        } else {
            self.rows
                .iter()
                .filter(|row| !row.staged)
                .map(|row| Effect::Stage(row.path.clone()))
                .collect()
        }
    }

    /// Rebuild rows from backend truth, keeping the cursor on the same path
    /// when it is still listed and clamping it otherwise.
    pub fn refresh(&mut self, records: Vec<ChangeRecord>) {
        let current = self.rows.get(self.cursor).map(|row| row.path.clone());
        self.rows = records.into_iter().map(StagingRow::from).collect();

        self.cursor = current
            .and_then(|path| self.rows.iter().position(|row| row.path == path))
            .unwrap_or(self.cursor)
            .min(self.rows.len().saturating_sub(1));
    }
}

/// Staging session bound to a backend.
pub struct StagingSession<'a, B: VersionControlBackend + ?Sized> {
    backend: &'a B,
    state: StagingState,
}

impl<'a, B: VersionControlBackend + ?Sized> StagingSession<'a, B> {
    /// Start a session from one backend query.
    pub fn start(backend: &'a B) -> Result<Self, VcsError> {
        let records = backend.list_changes()?;
        debug!("Staging session started with {} files", records.len());
        Ok(Self {
            backend,
            state: StagingState::new(records),
        })
    }

    pub fn state(&self) -> &StagingState {
        &self.state
    }

    /// Process one event to completion.
    ///
    /// Effects run serially. The first failing call stops the rest and is
    /// shown as a status message; rows are re-read from the backend either way.
    pub fn handle(&mut self, event: StagingEvent) -> Result<Option<SessionEnd>, VcsError> {
        let transition = self.state.transition(event);
        if transition.effects.is_empty() {
            return Ok(transition.end);
        }

        self.state.status_message = None;
        for effect in &transition.effects {
            let result = match effect {
                Effect::Stage(path) => self.backend.stage(path),
                Effect::Unstage(path) => self.backend.unstage(path),
            };
            if let Err(e) = result {
                warn!("Failed to apply {:?}: {}", effect, e);
                self.state.set_status_message(e.to_string());
                break;
            }
        }

        self.state.refresh(self.backend.list_changes()?);
        Ok(transition.end)
    }

    /// Drive the session from an event source until it ends.
    ///
    /// An exhausted source counts as a cancel.
    pub fn run<I>(mut self, events: I) -> Result<SessionEnd, VcsError>
    where
        I: IntoIterator<Item = StagingEvent>,
    {
        for event in events {
            if let Some(end) = self.handle(event)? {
                return Ok(end);
            }
        }
        Ok(SessionEnd::Cancelled)
    }
}
