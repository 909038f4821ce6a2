#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)] // Counters and version bumps are bounded by u64
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Treemark - Directory Fingerprints with Lineage
//!
//! Treemark records a content fingerprint for every file of a directory tree,
//! tagged with a stable identity and a monotonically increasing version. It
//! answers two questions: has this directory changed since it was last
//! recorded, and do two directories hold the same content at the same version.
//!
//! ## Layout of a tracked directory
//!
//! ```text
//! photos/
//!   .treemark/manifest        # "<xxh3-128 hex> <relative/path>" per file
//!   .treemark.id.proj1        # identity marker (name only)
//!   .treemark.version.3       # version marker (name only)
//!   data/                     # the tracked payload
//! ```
//!
//! ## Architecture
//!
//! - [`utils::hash`]: per-file xxHash3 fingerprints
//! - [`tracking::scanner`]: parallel fingerprinting of a whole tree
//! - [`tracking::manifest`]: the manifest text codec and set equality
//! - [`tracking::store`]: markers and manifest inside a tracked directory
//! - [`commands`]: init, check, update, compare and status
//!
//! ## Example Usage
//!
//! ```no_run
//! use treemark::TreemarkContext;
//! use treemark::commands::{check, init};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = TreemarkContext::new()?;
//! let options = init::InitOptions { yes: true };
//! init::execute(&ctx, Path::new("/srv/photos"), "photos-2024", &options)?;
//!
//! let outcome = check::execute(&ctx, Path::new("/srv/photos"))?;
//! assert!(outcome.is_match());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// State operations: init, check, update, compare, status.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Error taxonomy for tracked directories.
pub mod error;

/// Tracing subscriber setup.
pub mod logging;

/// Output formatting for user-facing status lines.
pub mod output;

/// Fingerprinting, manifest codec and manifest store.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub use error::{TrackError, TrackResult};

/// Current version of the treemark binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the metadata subdirectory at the tracked directory root.
pub const META_DIR: &str = ".treemark";

/// Name of the payload subtree whose content is fingerprinted.
pub const DATA_DIR: &str = "data";

/// Name of the manifest file inside [`META_DIR`].
pub const MANIFEST_FILE: &str = "manifest";

/// Prefix of the identity marker file name; the identity follows it.
pub const ID_MARKER_PREFIX: &str = ".treemark.id.";

/// Prefix of the version marker file name; the decimal version follows it.
pub const VERSION_MARKER_PREFIX: &str = ".treemark.version.";

/// Prefix of the staging directory created while initializing.
pub const STAGING_PREFIX: &str = ".treemark-staging-";

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/treemark/config";

/// Central context for all treemark operations.
///
/// Holds the loaded configuration and whether prompts may read stdin.
#[derive(Debug, Clone)]
pub struct TreemarkContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Whether to run in non-interactive mode (no prompts).
    /// Used primarily for testing to prevent stdin reads.
    pub non_interactive: bool,
}

impl TreemarkContext {
    /// Creates a new `TreemarkContext` by loading the configuration from the default path.
    ///
    /// `TREEMARK_CONFIG_PATH` overrides the location of the configuration file.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file exists but cannot be parsed.
    pub fn new() -> Result<Self> {
        let config_path = config::default_config_path()?;
        let config = config::Config::load(&config_path)?;

        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            output::warning(&format!("Configuration validation failed: {e}"));
        }

        let threads = utils::thread_pool::configure(&config.performance)
            .context("Failed to start hashing threads")?;
        tracing::debug!(threads, "hash pool ready");

        Ok(Self {
            config_path,
            config,
            non_interactive: false,
        })
    }

    /// Creates a context from an explicit configuration, never prompting.
    ///
    /// Used by tests and embedders that do not want a config file on disk.
    #[must_use]
    pub fn with_config(config: config::Config) -> Self {
        Self {
            config_path: PathBuf::new(),
            config,
            non_interactive: true,
        }
    }

    /// Scanner options derived from the loaded configuration.
    #[must_use]
    pub fn scan_options(&self) -> tracking::scanner::ScanOptions {
        tracking::scanner::ScanOptions {
            symlinks: self.config.tracking.symlinks,
            mmap_threshold: self.config.performance.mmap_threshold,
        }
    }
}
