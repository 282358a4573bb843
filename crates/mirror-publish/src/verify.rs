//! Preconditions checked before publishing

use mirror_git::list_remote;
use mirror_sync::ExcludeRules;

use crate::{Error, PublishConfig, Result};

/// Check that `config` can be published.
///
/// In order: the destination is set, it differs from the repository being
/// published, the exclude patterns compile, and the destination answers a
/// reference listing.
pub fn verify_conditions(config: &PublishConfig) -> Result<()> {
    let destination = config.destination()?;

    if config.repository_url.as_deref().map(str::trim) == Some(destination) {
        return Err(Error::SameRepository {
            url: destination.to_string(),
        });
    }

    ExcludeRules::parse(config.exclude.as_slice())?;

    if let Err(e) = list_remote(destination) {
        tracing::error!(url = destination, error = %e, "Unable to connect to destination repository");
        return Err(Error::Unreachable {
            url: destination.to_string(),
            message: e.to_string(),
        });
    }
    tracing::info!("Successfully connected to git repo {destination}");

    tracing::info!("Verified conditions, and found no problem");
    Ok(())
}
