//! Error types for mirror-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from mirror-sync
    #[error(transparent)]
    Sync(#[from] mirror_sync::SyncError),

    /// Error from mirror-publish
    #[error(transparent)]
    Publish(#[from] mirror_publish::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Logging could not be initialised
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
