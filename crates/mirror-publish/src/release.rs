//! The release being published

use semver::Version;

use crate::{Error, Result};

/// Version and notes of the release being published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextRelease {
    pub version: Version,
    pub notes: String,
}

impl NextRelease {
    /// Build a release, validating `version` as semver.
    pub fn new(version: &str, notes: impl Into<String>) -> Result<Self> {
        let parsed = Version::parse(version.trim()).map_err(|source| Error::InvalidVersion {
            version: version.to_string(),
            source,
        })?;
        Ok(Self {
            version: parsed,
            notes: notes.into(),
        })
    }

    /// Tag name pushed to the destination.
    pub fn git_tag(&self) -> String {
        format!("v{}", self.version)
    }

    /// Commit message, followed by the notes when there are any.
    pub fn commit_message(&self) -> String {
        let mut message = format!("Publishing version {}", self.version);
        if !self.notes.is_empty() {
            message.push_str("\n\n");
            message.push_str(&self.notes);
        }
        message
    }
}
