//! Publish configuration

use std::path::Path;

use mirror_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where and what to publish.
///
/// Loaded from TOML, JSON or YAML:
///
/// ```toml
/// destination_url = "git@example.com:org/dist.git"
/// repository_url = "git@example.com:org/app.git"
/// exclude = ["*.map", "/internal/"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Repository the release is pushed to
    pub destination_url: Option<String>,
    /// Repository being published, which the destination must differ from
    pub repository_url: Option<String>,
    /// Extra exclude patterns, gitignore syntax
    pub exclude: Vec<String>,
}

impl PublishConfig {
    /// Load from a config file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = ConfigStore::new().load(path)?;
        tracing::debug!(path = %path.display(), "Loaded publish configuration");
        Ok(config)
    }

    /// The destination URL, which must be set and non-blank.
    pub fn destination(&self) -> Result<&str> {
        self.destination_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(Error::MissingDestination)
    }
}
