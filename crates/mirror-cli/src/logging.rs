//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

/// Install the global subscriber, writing to stderr so stdout stays
/// parseable.
///
/// `--verbose` forces debug level; otherwise `RUST_LOG` applies, defaulting
/// to info.
pub fn init(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    tracing::debug!("Verbose mode enabled");
    Ok(())
}
