//! File mutation primitives used while reconciling a destination tree

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// Create `path` and all missing parents. A no-op when it already exists.
pub fn ensure_dir_all(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Create a single directory unless it already exists.
///
/// Returns `true` when the directory was created by this call.
pub fn create_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir(path).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Copy `from` to `to`, failing with [`Error::AlreadyExists`] if `to` exists.
///
/// The destination is opened with `create_new`, so the existence check and the
/// creation are a single filesystem operation. Permissions follow the source
/// so the executable bit survives the copy.
pub fn copy_exclusive(from: &Path, to: &Path) -> Result<u64> {
    let mut source = File::open(from).map_err(|e| Error::io(from, e))?;
    let permissions = source
        .metadata()
        .map_err(|e| Error::io(from, e))?
        .permissions();

    let mut dest = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
        .map_err(|e| Error::io(to, e))?;

    let copied = std::io::copy(&mut source, &mut dest).map_err(|e| Error::io(to, e))?;
    dest.set_permissions(permissions)
        .map_err(|e| Error::io(to, e))?;
    Ok(copied)
}

/// Overwrite `to` with the content of `from`.
///
/// `std::fs::copy` clones extents (reflink / `copy_file_range` / `clonefile`)
/// where the platform supports it and falls back to a byte copy otherwise.
pub fn copy_overwrite(from: &Path, to: &Path) -> Result<u64> {
    fs::copy(from, to).map_err(|e| Error::io(to, e))
}

/// Remove `dir` and its ancestors while they are empty, stopping at `stop`.
///
/// `stop` itself is never removed.
pub fn prune_empty_dirs(dir: &Path, stop: &Path) -> Result<()> {
    let mut current = Some(dir);
    while let Some(path) = current {
        if path == stop || !path.starts_with(stop) {
            break;
        }
        let mut entries = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
        if entries.next().is_some() {
            break;
        }
        fs::remove_dir(path).map_err(|e| Error::io(path, e))?;
        tracing::trace!(path = %path.display(), "Pruned empty directory");
        current = path.parent();
    }
    Ok(())
}

/// An exclusive advisory lock held until dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release lock");
        }
    }
}

/// Take an exclusive advisory lock on `path`, creating the file if needed.
///
/// Does not block: if another holder owns the lock this fails immediately
/// with [`Error::LockFailed`].
pub fn lock_exclusive(path: &Path) -> Result<LockGuard> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    file.try_lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    Ok(LockGuard {
        file,
        path: path.to_path_buf(),
    })
}
