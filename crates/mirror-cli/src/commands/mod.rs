//! Command implementations for mirror-cli

pub mod check_ignore;
pub mod publish;
pub mod sync;
pub mod verify;

pub use check_ignore::run_check_ignore;
pub use publish::run_publish;
pub use sync::run_sync;
pub use verify::run_verify;

use std::path::Path;

use mirror_publish::PublishConfig;

use crate::error::Result;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub destination: Option<String>,
    pub repository: Option<String>,
    /// Appended to the config file's patterns
    pub exclude: Vec<String>,
}

/// Load `path` when given, then apply `overrides`.
pub fn resolve_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<PublishConfig> {
    let mut config = match path {
        Some(path) => PublishConfig::load(path)?,
        None => PublishConfig::default(),
    };

    if overrides.destination.is_some() {
        config.destination_url = overrides.destination;
    }
    if overrides.repository.is_some() {
        config.repository_url = overrides.repository;
    }
    config.exclude.extend(overrides.exclude);

    Ok(config)
}
