//! Command-line interface definitions for treemark.
//!
//! Shared between the binary and xtask (man page generation).
//!
//! Field-level documentation comes from clap attributes, so missing_docs is
//! allowed here.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for treemark.
#[derive(Parser)]
#[command(
    name = "treemark",
    version = crate::VERSION,
    about = "Directory fingerprints with identity and version",
    long_about = "Records an xxHash3 fingerprint of every file in a directory, tagged with a \
                  stable identity and an increasing version, and detects drift between \
                  recordings or between copies"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start tracking a directory: move its contents into data/ and record version 0
    Init {
        /// Lineage identity shared by every copy of this directory
        identity: String,

        /// Directory to initialize
        #[arg(default_value = ".")]
        directory: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Verify data/ against the recorded manifest
    Check {
        /// Tracked directory
        #[arg(default_value = ".")]
        directory: PathBuf,
    },

    /// Record the current data/ as the next version
    Update {
        /// Tracked directory
        #[arg(default_value = ".")]
        directory: PathBuf,

        /// Keep the current version when nothing changed
        #[arg(long)]
        if_changed: bool,
    },

    /// Compare identity, version and recorded manifest of two directories
    Compare {
        /// First tracked directory
        dir1: PathBuf,

        /// Second tracked directory
        dir2: PathBuf,
    },

    /// Show identity, version and file count of a tracked directory
    Status {
        /// Tracked directory
        #[arg(default_value = ".")]
        directory: PathBuf,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
