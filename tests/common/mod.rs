//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use git2::{Repository, Signature};

use gitai::commit::SelectionPrompter;
use gitai::error::{CommitFlowError, VcsError};
use gitai::llm::CommitSuggestion;
use gitai::vcs::{ChangeRecord, ChangeStatus, VersionControlBackend};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a local identity.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the work tree.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write test file");
    }

    /// Stage `name` and commit it directly through git2.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) {
        self.write(name, content);

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit");
    }

    /// Message of the HEAD commit, if any.
    pub fn head_message(&self) -> Option<String> {
        let commit = self.repo.head().ok()?.peel_to_commit().ok()?;
        commit.message().map(str::to_string)
    }

    pub fn commit_count(&self) -> usize {
        let Ok(mut walk) = self.repo.revwalk() else {
            return 0;
        };
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }
}

/// In-memory backend. Paths map to (status, staged).
#[derive(Default)]
pub struct FakeBackend {
    files: Mutex<BTreeMap<String, (ChangeStatus, bool)>>,
    pub commits: Mutex<Vec<String>>,
    /// Paths whose `stage` call fails.
    pub failing: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_files(files: &[(&str, ChangeStatus, bool)]) -> Self {
        let backend = Self::default();
        {
            let mut map = backend.files.lock().unwrap();
            for (path, status, staged) in files {
                map.insert(path.to_string(), (*status, *staged));
            }
        }
        backend
    }

    pub fn staged_paths(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, (_, staged))| *staged)
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn set_staged(&self, path: &str, value: bool) {
        if let Some(entry) = self.files.lock().unwrap().get_mut(path) {
            entry.1 = value;
        }
    }
}

impl VersionControlBackend for FakeBackend {
    fn list_changes(&self) -> Result<Vec<ChangeRecord>, VcsError> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|(path, (status, staged))| ChangeRecord::new(path.clone(), *status, *staged))
            .collect())
    }

    fn staged_diff_text(&self) -> Result<String, VcsError> {
        Ok(self
            .staged_paths()
            .iter()
            .map(|path| format!("=== {path} ===\n+changed\n"))
            .collect())
    }

    fn stage(&self, path: &str) -> Result<(), VcsError> {
        if self.failing.lock().unwrap().iter().any(|p| p == path) {
            return Err(VcsError::Git(git2::Error::from_str("stage failed")));
        }
        self.set_staged(path, true);
        Ok(())
    }

    fn unstage(&self, path: &str) -> Result<(), VcsError> {
        self.set_staged(path, false);
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), VcsError> {
        if self.staged_paths().is_empty() {
            return Err(VcsError::NothingStaged);
        }
        self.commits.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Prompter that replays canned answers and records what it was shown.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    confirm: bool,
    pub shown: Mutex<Vec<CommitSuggestion>>,
    pub notices: Mutex<Vec<String>>,
    pub confirmations: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str], confirm: bool) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            confirm,
            ..Default::default()
        }
    }
}

impl SelectionPrompter for &ScriptedPrompter {
    fn show_staged(&self, _records: &[ChangeRecord]) {}

    fn show_suggestions(&self, suggestions: &[CommitSuggestion]) {
        self.shown.lock().unwrap().extend_from_slice(suggestions);
    }

    fn read_choice(&self, _count: usize) -> Result<String, CommitFlowError> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CommitFlowError::Prompt("script exhausted".to_string()))
    }

    fn confirm(&self, message: &str) -> Result<bool, CommitFlowError> {
        self.confirmations.lock().unwrap().push(message.to_string());
        Ok(self.confirm)
    }

    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}
