//! git-mirror CLI
//!
//! Reconciles directory trees into git working copies and publishes releases
//! to a destination repository.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} directory mirroring for git", "git-mirror".green().bold());
            println!();
            println!("Run {} for available commands.", "git-mirror --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync {
            source,
            dest,
            exclude,
            dry_run,
            json,
        } => commands::run_sync(&source, &dest, &exclude, dry_run, json),
        Commands::CheckIgnore {
            source,
            dest,
            paths,
            exclude,
        } => commands::run_check_ignore(&source, &dest, &paths, &exclude),
        Commands::Verify {
            config,
            destination,
            repository,
        } => {
            let overrides = commands::ConfigOverrides {
                destination,
                repository,
                exclude: Vec::new(),
            };
            commands::run_verify(config.as_deref(), overrides)
        }
        Commands::Publish {
            release_version,
            notes,
            config,
            destination,
            repository,
            source,
            exclude,
            json,
        } => {
            let overrides = commands::ConfigOverrides {
                destination,
                repository,
                exclude,
            };
            commands::run_publish(config.as_deref(), overrides, &source, &release_version, &notes, json)
        }
    }
}
