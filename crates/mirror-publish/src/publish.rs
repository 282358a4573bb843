//! Publishing a release through a scratch clone

use std::path::Path;

use mirror_git::GitRepository;
use mirror_sync::{SyncReport, synchronize};
use serde::Serialize;

use crate::{Error, NextRelease, PublishConfig, Result};

/// Prefix of the scratch directory holding the destination clone.
pub const SCRATCH_PREFIX: &str = "git-mirror-publish";

/// What a publish pushed.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// Id of the release commit
    pub commit: String,
    pub tag: String,
    pub branch: String,
    pub sync: SyncReport,
}

/// Publish the tree at `source_dir` as `release` to the configured
/// destination.
///
/// The destination is cloned into a temporary directory that is removed when
/// this call returns, whether it succeeds or not. A release with no changes
/// still produces a commit and a tag.
pub fn publish(
    config: &PublishConfig,
    source_dir: &Path,
    release: &NextRelease,
) -> Result<PublishReport> {
    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir()
        .map_err(Error::Scratch)?;

    let result = publish_in(config, source_dir, release, scratch.path());
    if let Err(e) = &result {
        tracing::error!(error = %e, "Error occurred during publish");
    }
    result
}

fn publish_in(
    config: &PublishConfig,
    source_dir: &Path,
    release: &NextRelease,
    scratch: &Path,
) -> Result<PublishReport> {
    let destination = config.destination()?;

    let repo = GitRepository::clone_from(destination, scratch)?;
    tracing::info!("Cloned destination repo {destination} to {}", scratch.display());

    let sync = synchronize(source_dir, scratch, config.exclude.as_slice())?;
    tracing::debug!(changes = sync.total_changes(), "Synced files to cloned repository");

    if repo.is_clean()? {
        tracing::warn!("There are no changes to publish. Will publish an empty commit anyway.");
    }

    let commit = repo.commit(&release.commit_message(), true)?;
    tracing::debug!(%commit, "Committed changes");

    let tag = release.git_tag();
    repo.add_tag(&tag)?;

    repo.push()?;
    tracing::info!("Pushed commits to origin");
    repo.push_tags()?;
    tracing::info!("Pushed tags to origin");

    tracing::info!("Finished publishing to destination Git repository");
    Ok(PublishReport {
        commit: commit.to_string(),
        tag,
        branch: repo.current_branch()?,
        sync,
    })
}
