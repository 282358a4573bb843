//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// git-mirror - Mirror a directory tree into a git repository and publish releases
#[derive(Parser, Debug)]
#[command(name = "git-mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Reconcile a directory into a git working copy and stage the changes
    ///
    /// Examples:
    ///   git-mirror sync dist ../dist-repo
    ///   git-mirror sync dist ../dist-repo -e '*.map' -e /internal/
    ///   git-mirror sync dist ../dist-repo --dry-run --json
    Sync {
        /// Directory to copy from
        source: PathBuf,

        /// Git working copy to reconcile
        dest: PathBuf,

        /// Extra exclude pattern (gitignore syntax), repeatable
        #[arg(short, long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Show the planned actions without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Report whether paths would be excluded from a sync
    CheckIgnore {
        /// Source directory of the sync
        source: PathBuf,

        /// Destination directory of the sync
        dest: PathBuf,

        /// Relative paths to check; a trailing '/' marks a directory
        #[arg(required = true)]
        paths: Vec<String>,

        /// Extra exclude pattern (gitignore syntax), repeatable
        #[arg(short, long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,
    },

    /// Check that a release can be published
    Verify {
        /// Config file (TOML, JSON or YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Destination repository URL (overrides the config file)
        #[arg(long)]
        destination: Option<String>,

        /// URL of the repository being published (overrides the config file)
        #[arg(long)]
        repository: Option<String>,
    },

    /// Publish a directory as a tagged release to the destination repository
    Publish {
        /// Version being released (semver)
        #[arg(long, value_name = "VERSION")]
        release_version: String,

        /// Release notes appended to the commit message
        #[arg(long, default_value = "")]
        notes: String,

        /// Config file (TOML, JSON or YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Destination repository URL (overrides the config file)
        #[arg(long)]
        destination: Option<String>,

        /// URL of the repository being published (overrides the config file)
        #[arg(long)]
        repository: Option<String>,

        /// Directory to publish
        #[arg(long, default_value = ".")]
        source: PathBuf,

        /// Extra exclude pattern, added to the config file's list
        #[arg(short, long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },
}
