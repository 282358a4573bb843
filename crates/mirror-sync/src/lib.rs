//! Directory reconciliation engine for git-mirror
//!
//! Makes the tracked content of a destination git working copy equal to a
//! source directory tree:
//!
//! - [`exclude`] builds the [`ExclusionPredicate`] from both trees'
//!   `.gitignore` files and an explicit pattern list
//! - [`tree`] walks both trees and classifies every path into a [`DiffEntry`]
//! - [`reconcile`] turns the diff into a [`SyncPlan`] and applies it through a
//!   [`mirror_git::VersionControl`] collaborator
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! let report = mirror_sync::synchronize(
//!     Path::new("dist"),
//!     Path::new("/tmp/clone"),
//!     &["*.map", "/internal/"],
//! )?;
//! println!("{} created, {} removed", report.created.len(), report.removed.len());
//! # Ok::<(), mirror_sync::SyncError>(())
//! ```

pub mod error;
pub mod exclude;
pub mod reconcile;
pub mod tree;

pub use error::{Operation, Result, SyncError};
pub use exclude::{ExcludeRules, ExclusionPredicate, build_exclusion_predicate};
pub use reconcile::{SyncAction, SyncPlan, SyncReport, plan, synchronize, synchronize_with};
pub use tree::{DiffEntry, DiffState, EntryKind, TreeEntry, diff_trees};
