//! Filesystem primitives for git-mirror
//!
//! Provides relative path handling, exclusive/overwrite copies, content
//! checksums, advisory locking and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::LockGuard;
pub use path::NormalizedPath;
