//! Sync command implementation

use std::path::Path;

use colored::Colorize;
use mirror_sync::{SyncAction, SyncReport, plan, synchronize};

use crate::error::Result;

/// Run the sync command
///
/// With `dry_run`, only prints the plan.
pub fn run_sync(
    source: &Path,
    dest: &Path,
    exclude: &[String],
    dry_run: bool,
    json: bool,
) -> Result<()> {
    if dry_run {
        let plan = plan(source, dest, exclude)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
            return Ok(());
        }

        if plan.is_empty() {
            println!("{} Already in sync.", "OK".green().bold());
            return Ok(());
        }
        println!("{} Would apply {} action(s):", "=>".blue().bold(), plan.len());
        for action in &plan.actions {
            print_action(action);
        }
        return Ok(());
    }

    if !json {
        println!(
            "{} Synchronizing {} into {}...",
            "=>".blue().bold(),
            source.display(),
            dest.display()
        );
    }

    let report = synchronize(source, dest, exclude)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_action(action: &SyncAction) {
    let (marker, path) = match action {
        SyncAction::CreateFile(path) => ("+".green(), path),
        SyncAction::CreateDirectory(path) => ("+".green(), path),
        SyncAction::RemoveFile(path) => ("-".red(), path),
        SyncAction::UpdateFile(path) => ("~".yellow(), path),
    };
    let suffix = if matches!(action, SyncAction::CreateDirectory(_)) {
        "/"
    } else {
        ""
    };
    println!("   {} {}{}", marker, path.to_string().cyan(), suffix);
}

pub(crate) fn print_report(report: &SyncReport) {
    if report.is_empty() {
        println!("{} Already in sync.", "OK".green().bold());
        return;
    }

    for path in &report.created {
        println!("   {} {}", "+".green(), path.to_string().cyan());
    }
    for path in &report.updated {
        println!("   {} {}", "~".yellow(), path.to_string().cyan());
    }
    for path in &report.removed {
        println!("   {} {}", "-".red(), path.to_string().cyan());
    }
    for path in &report.left_unstaged {
        println!(
            "   {} {} {}",
            "!".yellow(),
            path.to_string().cyan(),
            "(ignored by destination, not staged)".dimmed()
        );
    }

    println!(
        "{} {} created, {} updated, {} removed.",
        "OK".green().bold(),
        report.created.len(),
        report.updated.len(),
        report.removed.len()
    );
}
