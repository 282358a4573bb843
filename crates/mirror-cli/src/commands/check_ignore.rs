//! Check-ignore command implementation

use std::path::Path;

use colored::Colorize;
use mirror_sync::build_exclusion_predicate;

use crate::error::Result;

/// Run the check-ignore command
///
/// Prints one line per path. Excluded paths are not an error.
pub fn run_check_ignore(
    source: &Path,
    dest: &Path,
    paths: &[String],
    exclude: &[String],
) -> Result<()> {
    let predicate = build_exclusion_predicate(source, dest, exclude)?;

    for path in paths {
        if predicate.is_excluded(path) {
            println!("{} {}", "excluded".yellow(), path);
        } else {
            println!("{} {}", "included".green(), path);
        }
    }
    Ok(())
}
