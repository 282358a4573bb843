//! Error types for mirror-publish

/// Result type for mirror-publish operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while verifying or publishing a release
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Plugin configuration missing 'destination_url'")]
    MissingDestination,

    #[error(
        "The source and destination repository are the same ({url}). You must publish to another repository"
    )]
    SameRepository { url: String },

    #[error("Unable to connect to destination repository at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Invalid release version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// Reconciliation failed
    #[error(transparent)]
    Sync(#[from] mirror_sync::SyncError),

    /// A git operation on the scratch clone failed
    #[error(transparent)]
    Git(#[from] mirror_git::Error),

    /// Configuration could not be loaded
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),
}
