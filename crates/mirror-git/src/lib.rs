//! Git collaborator for git-mirror
//!
//! The reconciler only needs three index primitives, captured by
//! [`VersionControl`]. [`GitRepository`] implements them over `git2` and adds
//! the clone/commit/tag/push operations used by the publish flow.

pub mod error;
pub mod provider;
pub mod remote;
pub mod repository;
pub mod status;

pub use error::{Error, Result};
pub use provider::VersionControl;
pub use remote::list_remote;
pub use repository::GitRepository;
pub use status::StatusSummary;
