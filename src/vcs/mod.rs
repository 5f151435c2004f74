//! Version-control capability consumed by the staging and commit flows.
//!
//! The core never caches what the backend reports: every caller re-queries
//! [`VersionControlBackend::list_changes`] after a mutation so the index stays
//! the single source of truth.

pub mod git;
pub mod summary;

use std::fmt;

use crate::error::VcsError;

pub use git::GitBackend;
pub use summary::{ChangeSummary, MAX_DIFF_BYTES};

/// Status of a changed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Unmodified,
    Unknown,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Renamed => "renamed",
            ChangeStatus::Copied => "copied",
            ChangeStatus::Unmodified => "unmodified",
            ChangeStatus::Unknown => "unknown",
        }
    }

    /// Single-letter marker used in compact listings.
    pub fn marker(&self) -> char {
        match self {
            ChangeStatus::Added => 'A',
            ChangeStatus::Modified => 'M',
            ChangeStatus::Deleted => 'D',
            ChangeStatus::Renamed => 'R',
            ChangeStatus::Copied => 'C',
            ChangeStatus::Unmodified => ' ',
            ChangeStatus::Unknown => '?',
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed path as reported by the backend at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub status: ChangeStatus,
    pub staged: bool,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, status: ChangeStatus, staged: bool) -> Self {
        Self {
            path: path.into(),
            status,
            staged,
        }
    }
}

/// Low-level repository operations.
///
/// Implementations must make `stage` and `unstage` idempotent: unstaging a
/// path that was never staged is a no-op, not an error.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControlBackend {
    /// All changed paths, staged and unstaged, in a stable order.
    fn list_changes(&self) -> Result<Vec<ChangeRecord>, VcsError>;

    /// Unified diffs of staged files, each prefixed with `=== <path> ===`.
    fn staged_diff_text(&self) -> Result<String, VcsError>;

    fn stage(&self, path: &str) -> Result<(), VcsError>;

    fn unstage(&self, path: &str) -> Result<(), VcsError>;

    /// Record the staged set as a new commit on HEAD.
    fn commit(&self, message: &str) -> Result<(), VcsError>;
}
