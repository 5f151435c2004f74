//! git2-backed implementation of [`VersionControlBackend`].

use std::fmt::Write;
use std::path::Path;

use git2::{
    Commit, Delta, Diff, DiffFindOptions, ErrorCode, Patch, Repository, Status, StatusEntry,
    StatusOptions, Tree,
};
use tracing::debug;

use crate::error::VcsError;
use crate::vcs::{ChangeRecord, ChangeStatus, VersionControlBackend};

const INDEX_CHANGES: Status = Status::INDEX_NEW
    .union(Status::INDEX_MODIFIED)
    .union(Status::INDEX_DELETED)
    .union(Status::INDEX_RENAMED)
    .union(Status::INDEX_TYPECHANGE);

/// Backend over a local repository opened with libgit2.
pub struct GitBackend {
    repo: Repository,
}

impl GitBackend {
    /// Find the repository containing `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, VcsError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            debug!("Repository discovery failed: {}", e);
            VcsError::RepositoryNotFound(path.to_path_buf())
        })?;
        Self::from_repository(repo)
    }

    /// Wrap an already-open repository.
    pub fn from_repository(repo: Repository) -> Result<Self, VcsError> {
        if repo.is_bare() {
            return Err(VcsError::BareRepository);
        }
        Ok(Self { repo })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    fn workdir(&self) -> Result<&Path, VcsError> {
        self.repo.workdir().ok_or(VcsError::BareRepository)
    }

    /// HEAD commit, or `None` on an unborn branch.
    fn head_commit(&self) -> Result<Option<Commit<'_>>, VcsError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(VcsError::Git(e)),
        }
    }

    fn head_tree(&self) -> Result<Option<Tree<'_>>, VcsError> {
        match self.head_commit()? {
            Some(commit) => Ok(Some(commit.tree()?)),
            None => Ok(None),
        }
    }

    /// HEAD-to-index diff with rename detection.
    fn staged_diff(&self) -> Result<Diff<'_>, VcsError> {
        let head_tree = self.head_tree()?;
        let mut diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;
        Ok(diff)
    }

    /// Source path of a staged rename whose destination is `path`.
    fn staged_rename_source(&self, path: &str) -> Result<Option<String>, VcsError> {
        let diff = self.staged_diff()?;
        let source = diff
            .deltas()
            .filter(|delta| delta.status() == Delta::Renamed)
            .find(|delta| delta.new_file().path() == Some(Path::new(path)))
            .and_then(|delta| delta.old_file().path().map(|p| p.to_string_lossy().to_string()));
        Ok(source)
    }
}

impl VersionControlBackend for GitBackend {
    fn list_changes(&self) -> Result<Vec<ChangeRecord>, VcsError> {
        // Pick up index writes made by other processes since the last query.
        self.repo.index()?.read(false)?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let mut records: Vec<ChangeRecord> = statuses
            .iter()
            .filter_map(|entry| record_from_entry(&entry))
            .collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));

        debug!("Listed {} changed paths", records.len());
        Ok(records)
    }

    fn staged_diff_text(&self) -> Result<String, VcsError> {
        let diff = self.staged_diff()?;

        let mut out = String::new();
        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();

            let _ = writeln!(out, "=== {path} ===");
            match Patch::from_diff(&diff, idx)? {
                Some(mut patch) => {
                    let buf = patch.to_buf()?;
                    out.push_str(&String::from_utf8_lossy(&buf));
                }
                None => out.push_str("(binary file)\n"),
            }
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }

        Ok(out)
    }

    fn stage(&self, path: &str) -> Result<(), VcsError> {
        let mut index = self.repo.index()?;
        let on_disk = self.workdir()?.join(path).symlink_metadata().is_ok();

        if on_disk {
            index.add_path(Path::new(path))?;
        } else {
            // deletions are staged by dropping the entry
            index.remove_path(Path::new(path))?;
        }
        index.write()?;

        debug!("Staged {}", path);
        Ok(())
    }

    /// Unstaging a staged rename also restores its source path, so the
    /// deletion half of the rename does not stay behind in the index.
    fn unstage(&self, path: &str) -> Result<(), VcsError> {
        match self.head_commit()? {
            Some(head) => {
                let mut paths = vec![path.to_string()];
                if let Some(source) = self.staged_rename_source(path)? {
                    debug!("Unstaging rename source {}", source);
                    paths.push(source);
                }
                self.repo.reset_default(Some(head.as_object()), paths)?;
            }
            None => {
                let mut index = self.repo.index()?;
                index.remove_path(Path::new(path))?;
                index.write()?;
            }
        }

        debug!("Unstaged {}", path);
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), VcsError> {
        let sig = self.repo.signature().map_err(|e| match e.code() {
            ErrorCode::NotFound => VcsError::MissingIdentity,
            _ => VcsError::Git(e),
        })?;

        let head_tree = self.head_tree()?;
        let staged = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)?;
        if staged.deltas().len() == 0 {
            return Err(VcsError::NothingStaged);
        }

        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = self.head_commit()?;
        let parents: Vec<&Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        debug!("Created commit {}", oid);
        Ok(())
    }
}

/// Map a status entry to a record, skipping ignored and clean paths.
fn record_from_entry(entry: &StatusEntry<'_>) -> Option<ChangeRecord> {
    let status = entry.status();
    if status.is_ignored() || status == Status::CURRENT {
        return None;
    }

    let path = entry
        .head_to_index()
        .filter(|_| status.is_index_renamed())
        .and_then(|delta| delta.new_file().path())
        .map(|p| p.to_string_lossy().to_string())
        .or_else(|| entry.path().map(str::to_string))?;

    let staged = status.intersects(INDEX_CHANGES);
    let change_status = if staged {
        index_status(status)
    } else {
        worktree_status(status)
    };

    Some(ChangeRecord {
        path,
        status: change_status,
        staged,
    })
}

fn index_status(status: Status) -> ChangeStatus {
    if status.is_index_new() {
        ChangeStatus::Added
    } else if status.is_index_deleted() {
        ChangeStatus::Deleted
    } else if status.is_index_renamed() {
        ChangeStatus::Renamed
    } else if status.is_index_modified() || status.is_index_typechange() {
        ChangeStatus::Modified
    } else {
        ChangeStatus::Unknown
    }
}

fn worktree_status(status: Status) -> ChangeStatus {
    if status.is_wt_new() {
        ChangeStatus::Added
    } else if status.is_wt_deleted() {
        ChangeStatus::Deleted
    } else if status.is_wt_renamed() {
        ChangeStatus::Renamed
    } else if status.is_wt_modified() || status.is_wt_typechange() {
        ChangeStatus::Modified
    } else {
        ChangeStatus::Unknown
    }
}
