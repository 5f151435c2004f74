//! Staged-change summary handed to the prompt builder.

use std::fmt::Write;

use tracing::debug;

use crate::error::VcsError;
use crate::vcs::{ChangeRecord, VersionControlBackend};

/// Maximum bytes of diff text kept in a summary before truncation.
pub const MAX_DIFF_BYTES: usize = 30_000;

/// Snapshot of the staged set: status lines plus their diff text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSummary {
    pub records: Vec<ChangeRecord>,
    pub diff_text: String,
    pub truncated: bool,
}

impl ChangeSummary {
    /// Query the backend for the staged records and their diff.
    pub fn collect<B: VersionControlBackend + ?Sized>(backend: &B) -> Result<Self, VcsError> {
        let records: Vec<ChangeRecord> = backend
            .list_changes()?
            .into_iter()
            .filter(|record| record.staged)
            .collect();

        if records.is_empty() {
            return Ok(Self::new(records, String::new()));
        }

        let diff_text = backend.staged_diff_text()?;
        Ok(Self::new(records, diff_text))
    }

    /// Build a summary, truncating the diff to [`MAX_DIFF_BYTES`].
    pub fn new(records: Vec<ChangeRecord>, mut diff_text: String) -> Self {
        let truncated = diff_text.len() > MAX_DIFF_BYTES;
        if truncated {
            let mut end = MAX_DIFF_BYTES;
            while end > 0 && !diff_text.is_char_boundary(end) {
                end -= 1;
            }
            debug!(
                "Truncating staged diff from {} to {} bytes",
                diff_text.len(),
                end
            );
            diff_text.truncate(end);
        }

        Self {
            records,
            diff_text,
            truncated,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the status lines followed by the diff text.
    ///
    /// Output depends only on the summary contents, so the same staged set
    /// always yields the same prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            let _ = writeln!(out, "{} ({})", record.path, record.status);
        }
        if !self.diff_text.is_empty() {
            out.push('\n');
            out.push_str(&self.diff_text);
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        if self.truncated {
            out.push_str("\n(diff truncated due to size; focus on the visible changes)\n");
        }
        out
    }
}
