//! Planning and applying the mutations that reconcile a destination
//!
//! Every diff entry is mapped to a [`SyncAction`] before anything is touched,
//! so an unsupported diff shape aborts with the destination unmodified. The
//! actions are then applied in path order; the first failure aborts and
//! leaves earlier mutations in place.

use std::path::Path;

use mirror_fs::{NormalizedPath, io};
use mirror_git::{GitRepository, VersionControl};
use serde::Serialize;

use crate::error::{Operation, Result, SyncError};
use crate::exclude::build_exclusion_predicate;
use crate::tree::{DiffEntry, DiffState, EntryKind, diff_trees};

/// A single mutation of the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "path", rename_all = "snake_case")]
pub enum SyncAction {
    /// Copy a file missing from the destination, then stage it
    CreateFile(NormalizedPath),
    /// Create a directory missing from the destination
    CreateDirectory(NormalizedPath),
    /// Remove a file from the destination index and disk
    RemoveFile(NormalizedPath),
    /// Overwrite a file whose content differs, then stage it
    UpdateFile(NormalizedPath),
}

impl SyncAction {
    pub fn path(&self) -> &NormalizedPath {
        match self {
            Self::CreateFile(path)
            | Self::CreateDirectory(path)
            | Self::RemoveFile(path)
            | Self::UpdateFile(path) => path,
        }
    }

    /// Map one diff entry to its action. `None` for entries needing no work.
    fn from_entry(entry: &DiffEntry) -> Result<Option<Self>> {
        let path = entry.path.clone();
        let action = match (entry.state, entry.source_kind, entry.dest_kind) {
            (DiffState::Equal, _, _) => None,
            (DiffState::OnlySource, Some(EntryKind::File), None) => Some(Self::CreateFile(path)),
            (DiffState::OnlySource, Some(EntryKind::Directory), None) => {
                Some(Self::CreateDirectory(path))
            }
            (DiffState::OnlyDest, None, Some(EntryKind::File)) => Some(Self::RemoveFile(path)),
            // Emptied directories are pruned by the collaborator's remove.
            (DiffState::OnlyDest, None, Some(EntryKind::Directory)) => None,
            (DiffState::Distinct, Some(EntryKind::File), Some(EntryKind::File)) => {
                Some(Self::UpdateFile(path))
            }
            (state, source_kind, dest_kind) => {
                return Err(SyncError::UnsupportedDiffShape {
                    path,
                    state,
                    source_kind,
                    dest_kind,
                });
            }
        };
        Ok(action)
    }
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateFile(path) => write!(f, "create {path}"),
            Self::CreateDirectory(path) => write!(f, "mkdir {path}"),
            Self::RemoveFile(path) => write!(f, "remove {path}"),
            Self::UpdateFile(path) => write!(f, "update {path}"),
        }
    }
}

/// The validated, ordered list of actions for one synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub actions: Vec<SyncAction>,
}

impl SyncPlan {
    /// Plan the actions for a diff.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnsupportedDiffShape`] for the first entry that
    /// changes kind between the trees.
    pub fn from_diff(entries: &[DiffEntry]) -> Result<Self> {
        let mut actions = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(action) = SyncAction::from_entry(entry)? {
                actions.push(action);
            }
        }
        Ok(Self { actions })
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

/// What a synchronization changed in the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Files copied into the destination
    pub created: Vec<NormalizedPath>,
    /// Files whose content was overwritten
    pub updated: Vec<NormalizedPath>,
    /// Files removed from the index and disk
    pub removed: Vec<NormalizedPath>,
    /// Directories created without a file of their own
    pub directories_created: Vec<NormalizedPath>,
    /// Created or updated files the destination's own rules ignore
    pub left_unstaged: Vec<NormalizedPath>,
}

impl SyncReport {
    /// True when the destination was already in sync.
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }

    /// Number of files and directories touched.
    pub fn total_changes(&self) -> usize {
        self.created.len() + self.updated.len() + self.removed.len() + self.directories_created.len()
    }
}

/// Compute the plan for reconciling `source_root` into `dest_root` without
/// touching either tree.
///
/// # Errors
///
/// Fails like [`synchronize`] does before its first mutation.
pub fn plan<S: AsRef<str>>(source_root: &Path, dest_root: &Path, patterns: &[S]) -> Result<SyncPlan> {
    let predicate = build_exclusion_predicate(source_root, dest_root, patterns)?;
    let diff = diff_trees(source_root, dest_root, &predicate)?;
    SyncPlan::from_diff(&diff)
}

/// Make the tracked content of the git working copy at `dest_root` equal to
/// `source_root`, staging every change.
///
/// Holds the working copy's advisory lock for the whole call.
///
/// # Errors
///
/// Returns [`SyncError::Lock`] when another synchronization holds the
/// destination, [`SyncError::Repository`] when it is not a working copy, and
/// otherwise fails like [`synchronize_with`].
pub fn synchronize<S: AsRef<str>>(
    source_root: &Path,
    dest_root: &Path,
    patterns: &[S],
) -> Result<SyncReport> {
    let repo = GitRepository::open(dest_root)?;
    let _lock = repo.lock().map_err(|e| match e {
        mirror_git::Error::Fs(mirror_fs::Error::LockFailed { path }) => SyncError::Lock { path },
        other => SyncError::Repository(other),
    })?;

    synchronize_with(&repo, source_root, dest_root, patterns)
}

/// [`synchronize`] against any [`VersionControl`] collaborator.
///
/// The caller is responsible for serializing calls against one destination.
///
/// # Errors
///
/// Returns [`SyncError::UnsupportedDiffShape`] before any mutation when a path
/// changed kind, [`SyncError::Filesystem`] when a copy or directory creation
/// fails, and [`SyncError::Index`] when the collaborator rejects a request.
pub fn synchronize_with<S: AsRef<str>>(
    vcs: &dyn VersionControl,
    source_root: &Path,
    dest_root: &Path,
    patterns: &[S],
) -> Result<SyncReport> {
    tracing::debug!(
        source = %source_root.display(),
        dest = %dest_root.display(),
        patterns = patterns.len(),
        "Synchronizing"
    );

    let plan = plan(source_root, dest_root, patterns)?;
    let report = apply(vcs, source_root, dest_root, &plan)?;

    tracing::info!(
        created = report.created.len(),
        updated = report.updated.len(),
        removed = report.removed.len(),
        directories = report.directories_created.len(),
        unstaged = report.left_unstaged.len(),
        "Synchronization complete"
    );
    Ok(report)
}

fn apply(
    vcs: &dyn VersionControl,
    source_root: &Path,
    dest_root: &Path,
    plan: &SyncPlan,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    for action in &plan.actions {
        tracing::debug!(%action, "Applying");
        match action {
            SyncAction::CreateFile(path) => {
                let target = path.to_native(dest_root);
                if let Some(parent) = target.parent() {
                    io::ensure_dir_all(parent).map_err(|source| SyncError::Filesystem {
                        path: path.parent().unwrap_or_else(NormalizedPath::root),
                        operation: Operation::CreateDirectory,
                        source,
                    })?;
                }
                io::copy_exclusive(&path.to_native(source_root), &target)
                    .map_err(|source| filesystem(path, Operation::Copy, source))?;
                stage_unless_ignored(vcs, path, &mut report)?;
                report.created.push(path.clone());
            }
            SyncAction::CreateDirectory(path) => {
                let target = path.to_native(dest_root);
                if let Some(parent) = target.parent() {
                    io::ensure_dir_all(parent)
                        .map_err(|source| filesystem(path, Operation::CreateDirectory, source))?;
                }
                if io::create_dir(&target)
                    .map_err(|source| filesystem(path, Operation::CreateDirectory, source))?
                {
                    report.directories_created.push(path.clone());
                }
            }
            SyncAction::RemoveFile(path) => {
                vcs.remove(path).map_err(|source| SyncError::Index {
                    path: path.clone(),
                    operation: Operation::Remove,
                    source,
                })?;
                restore_source_dirs(path, source_root, dest_root)?;
                report.removed.push(path.clone());
            }
            SyncAction::UpdateFile(path) => {
                io::copy_overwrite(&path.to_native(source_root), &path.to_native(dest_root))
                    .map_err(|source| filesystem(path, Operation::Overwrite, source))?;
                stage_unless_ignored(vcs, path, &mut report)?;
                report.updated.push(path.clone());
            }
        }
    }

    Ok(report)
}

/// Recreate ancestors of a removed `path` that the collaborator pruned while
/// the source still has them.
fn restore_source_dirs(path: &NormalizedPath, source_root: &Path, dest_root: &Path) -> Result<()> {
    for dir in path.ancestors() {
        if !dir.to_native(source_root).is_dir() {
            break;
        }
        if io::create_dir(&dir.to_native(dest_root))
            .map_err(|source| filesystem(&dir, Operation::CreateDirectory, source))?
        {
            tracing::trace!(path = %dir, "Restored pruned directory");
        }
    }
    Ok(())
}

/// Stage `path` unless the destination's own ignore rules exclude it.
///
/// Asked after the copy, so rules the exclusion predicate never saw (such as
/// `.git/info/exclude`) still keep the file out of the index.
fn stage_unless_ignored(
    vcs: &dyn VersionControl,
    path: &NormalizedPath,
    report: &mut SyncReport,
) -> Result<()> {
    let ignored = vcs.is_ignored(path).map_err(|source| SyncError::Index {
        path: path.clone(),
        operation: Operation::CheckIgnore,
        source,
    })?;
    if ignored {
        tracing::debug!(%path, "Leaving ignored file unstaged");
        report.left_unstaged.push(path.clone());
        return Ok(());
    }

    vcs.stage(path).map_err(|source| SyncError::Index {
        path: path.clone(),
        operation: Operation::Stage,
        source,
    })
}

fn filesystem(path: &NormalizedPath, operation: Operation, source: mirror_fs::Error) -> SyncError {
    SyncError::Filesystem {
        path: path.clone(),
        operation,
        source,
    }
}
