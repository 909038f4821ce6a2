//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`hash`]: xxHash3 file fingerprints
//! - [`paths`]: manifest path rendering
//! - [`thread_pool`]: Thread pool configuration

/// File content fingerprints
pub mod hash;
/// Path manipulation for manifest entries
pub mod paths;
/// Thread pool configuration for parallel hashing
pub mod thread_pool;

use anyhow::{Context, Result};
use std::path::Path;

/// Returns the names of the entries directly under `dir`, sorted.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a name is not valid UTF-8.
pub fn list_entry_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let name = entry.file_name().into_string().map_err(|raw| {
            anyhow::anyhow!(
                "Entry name is not valid UTF-8: {}",
                raw.to_string_lossy()
            )
        })?;
        names.push(name);
    }

    names.sort();
    Ok(names)
}

/// Random name for a staging directory that collides with none of `existing`.
#[must_use]
pub fn unique_staging_name(existing: &[String]) -> String {
    loop {
        let candidate = format!("{}{:016x}", crate::STAGING_PREFIX, rand::random::<u64>());
        if !existing.iter().any(|name| *name == candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_entry_names_sorted() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("b.txt"), "")?;
        std::fs::create_dir(dir.path().join("a"))?;
        std::fs::write(dir.path().join("c"), "")?;

        assert_eq!(list_entry_names(dir.path())?, vec!["a", "b.txt", "c"]);
        Ok(())
    }

    #[test]
    fn test_unique_staging_name() {
        let existing = vec!["data".to_string()];
        let name = unique_staging_name(&existing);
        assert!(name.starts_with(crate::STAGING_PREFIX));
        assert_eq!(name.len(), crate::STAGING_PREFIX.len() + 16);
        assert!(!existing.contains(&name));
    }
}
