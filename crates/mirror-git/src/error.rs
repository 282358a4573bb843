//! Error types for mirror-git

use std::path::PathBuf;

/// Result type for mirror-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] mirror_fs::Error),

    #[error("Not a git working copy: {path}")]
    NotAWorkingCopy { path: PathBuf },

    #[error("Nothing to commit: the index matches HEAD")]
    NothingToCommit,

    #[error("HEAD is not on a branch")]
    DetachedHead,

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Push of {refname} rejected: {message}")]
    PushRejected { refname: String, message: String },

    #[error("Unable to connect to repository at {url}: {message}")]
    Unreachable { url: String, message: String },
}
