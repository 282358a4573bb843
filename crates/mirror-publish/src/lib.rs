//! Release publishing for git-mirror
//!
//! Publishes a built tree to a separate destination repository: clone it into
//! a scratch directory, reconcile the tree into the clone, then commit, tag
//! and push.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use mirror_publish::{NextRelease, PublishConfig, publish, verify_conditions};
//!
//! let config = PublishConfig::load(Path::new("git-mirror.toml"))?;
//! verify_conditions(&config)?;
//! let release = NextRelease::new("1.4.0", "Bug fixes")?;
//! let report = publish(&config, Path::new("dist"), &release)?;
//! println!("published {} at {}", report.tag, report.commit);
//! # Ok::<(), mirror_publish::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod publish;
pub mod release;
pub mod verify;

pub use config::PublishConfig;
pub use error::{Error, Result};
pub use publish::{PublishReport, publish};
pub use release::NextRelease;
pub use verify::verify_conditions;
