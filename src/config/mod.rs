pub mod validator;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub performance: PerformanceConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub init: InitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceConfig {
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,
    #[serde(default = "default_mmap_threshold")]
    pub mmap_threshold: u64,
}

/// How the tree walk treats symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Hash the link target; broken links and loops are errors
    #[default]
    Follow,
    /// Leave symlinks out of the manifest
    Skip,
    /// Refuse to fingerprint a tree containing symlinks
    Error,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TrackingConfig {
    #[serde(default)]
    pub symlinks: SymlinkPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitConfig {
    /// Entries listed in the confirmation summary before "... and N more"
    #[serde(default = "default_preview_entries")]
    pub preview_entries: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            mmap_threshold: default_mmap_threshold(),
        }
    }
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            preview_entries: default_preview_entries(),
        }
    }
}

/// Location of the configuration file.
///
/// `TREEMARK_CONFIG_PATH` wins over `~/.config/treemark/config`.
///
/// # Errors
///
/// Returns an error if the variable is unset and the home directory cannot be found.
pub fn default_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("TREEMARK_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(crate::DEFAULT_CONFIG_PATH))
}

impl Config {
    /// Load configuration from a file, falling back to defaults when it is absent
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML or out-of-range values
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML or out-of-range values.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no operation can work with
    fn validate(&self) -> Result<()> {
        if self.performance.parallel_threads == 0 {
            anyhow::bail!("Parallel threads must be at least 1");
        }
        Ok(())
    }
}

fn default_parallel_threads() -> usize {
    crate::utils::thread_pool::default_threads()
}

const fn default_mmap_threshold() -> u64 {
    crate::utils::hash::DEFAULT_MMAP_THRESHOLD
}

const fn default_preview_entries() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tracking.symlinks, SymlinkPolicy::Follow);
        assert_eq!(config.init.preview_entries, 5);
        assert_eq!(config.performance.mmap_threshold, 1_048_576);
        assert!(config.performance.parallel_threads >= 1);
    }

    #[test]
    fn test_parse_partial_file() -> Result<()> {
        let config = Config::parse("[tracking]\nsymlinks = \"skip\"\n")?;
        assert_eq!(config.tracking.symlinks, SymlinkPolicy::Skip);
        assert_eq!(config.init.preview_entries, 5);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_zero_threads() {
        assert!(Config::parse("[performance]\nparallel_threads = 0\n").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_policy() {
        assert!(Config::parse("[tracking]\nsymlinks = \"maybe\"\n").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults_without_writing() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config");
        let config = Config::load(&path)?;
        assert_eq!(config.init.preview_entries, 5);
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config");
        std::fs::write(
            &path,
            "[init]\npreview_entries = 2\n\n[tracking]\nsymlinks = \"error\"\n",
        )?;

        let loaded = Config::load(&path)?;
        assert_eq!(loaded.init.preview_entries, 2);
        assert_eq!(loaded.tracking.symlinks, SymlinkPolicy::Error);
        assert_eq!(loaded.performance.mmap_threshold, 1_048_576);
        Ok(())
    }
}
