//! Error types for mirror-sync

use std::fmt;
use std::path::PathBuf;

use mirror_fs::NormalizedPath;

use crate::tree::{DiffState, EntryKind};

/// Result type for mirror-sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// The step that was being attempted when a path failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateDirectory,
    Copy,
    Overwrite,
    Inspect,
    Hash,
    ReadIgnoreFile,
    Stage,
    Remove,
    CheckIgnore,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::CreateDirectory => "create directory",
            Self::Copy => "copy",
            Self::Overwrite => "overwrite",
            Self::Inspect => "inspect",
            Self::Hash => "hash",
            Self::ReadIgnoreFile => "read ignore file",
            Self::Stage => "stage",
            Self::Remove => "remove",
            Self::CheckIgnore => "check ignore status of",
        };
        f.write_str(verb)
    }
}

/// Errors that abort a synchronization
///
/// Nothing is rolled back: when a mutation fails, the destination keeps every
/// change applied before it.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A path changed kind between the trees, which has no reconcile policy
    #[error(
        "Unsupported diff shape at {path}: {state} (source: {}, destination: {})",
        describe(.source_kind),
        describe(.dest_kind)
    )]
    UnsupportedDiffShape {
        path: NormalizedPath,
        state: DiffState,
        source_kind: Option<EntryKind>,
        dest_kind: Option<EntryKind>,
    },

    /// Directory creation, copy or inspection failed
    #[error("Failed to {operation} {path}: {source}")]
    Filesystem {
        path: NormalizedPath,
        operation: Operation,
        #[source]
        source: mirror_fs::Error,
    },

    /// The version-control collaborator rejected a request
    #[error("Index failed to {operation} {path}: {source}")]
    Index {
        path: NormalizedPath,
        operation: Operation,
        #[source]
        source: mirror_git::Error,
    },

    #[error("Invalid pattern '{pattern}' in {origin}: {source}")]
    InvalidPattern {
        pattern: String,
        origin: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Destination is locked by another synchronization ({path})")]
    Lock { path: PathBuf },

    /// The destination could not be opened as a working copy
    #[error(transparent)]
    Repository(#[from] mirror_git::Error),
}

fn describe(kind: &Option<EntryKind>) -> String {
    kind.map_or_else(|| "absent".to_string(), |k| k.to_string())
}
