//! Verify command implementation

use std::path::Path;

use colored::Colorize;
use mirror_publish::verify_conditions;

use super::{ConfigOverrides, resolve_config};
use crate::error::Result;

/// Run the verify command
pub fn run_verify(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<()> {
    let config = resolve_config(config_path, overrides)?;
    verify_conditions(&config)?;

    println!(
        "{} Destination {} is ready for publishing.",
        "OK".green().bold(),
        config.destination_url.as_deref().unwrap_or_default().cyan()
    );
    Ok(())
}
