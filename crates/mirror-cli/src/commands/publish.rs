//! Publish command implementation

use std::path::Path;

use colored::Colorize;
use mirror_publish::{NextRelease, publish, verify_conditions};

use super::sync::print_report;
use super::{ConfigOverrides, resolve_config};
use crate::error::Result;

/// Run the publish command
///
/// Verifies the configuration first, then publishes `source`.
pub fn run_publish(
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
    source: &Path,
    version: &str,
    notes: &str,
    json: bool,
) -> Result<()> {
    let config = resolve_config(config_path, overrides)?;
    let release = NextRelease::new(version, notes)?;
    verify_conditions(&config)?;

    let report = publish(&config, source, &release)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_report(&report.sync);
    println!(
        "{} Published {} ({}) to {}.",
        "OK".green().bold(),
        report.tag.cyan(),
        &report.commit[..report.commit.len().min(8)],
        report.branch
    );
    Ok(())
}
