use super::{Outcome, display_dir, exit};
use crate::TreemarkContext;
use crate::output;
use crate::tracking::manifest::ManifestDiff;
use crate::tracking::scanner::fingerprint_tree;
use crate::tracking::store::TrackedDir;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{Level, info, span};

/// Result of auditing a tracked directory against its stored manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Every file matches the stored manifest
    Match {
        /// Files checked
        entries: usize,
    },
    /// The tree differs from the stored manifest
    Mismatch(ManifestDiff),
    /// The directory is not tracked
    NotTracked,
}

impl CheckOutcome {
    /// Whether the tree matched
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

impl Outcome for CheckOutcome {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Match { .. } => exit::SUCCESS,
            Self::Mismatch(_) => exit::CHECK_MISMATCH,
            Self::NotTracked => exit::NOT_TRACKED,
        }
    }
}

/// Recompute the fingerprints of `<dir>/data` and compare with the stored manifest
///
/// Read-only: neither the manifest nor the version changes.
///
/// # Errors
///
/// Returns an error if the tree cannot be fingerprinted or the stored
/// manifest cannot be read or parsed.
pub fn execute(ctx: &TreemarkContext, dir: &Path) -> Result<CheckOutcome> {
    let span = span!(Level::INFO, "check", dir = %dir.display());
    let _enter = span.enter();

    let tracked = TrackedDir::new(dir);
    if !tracked.is_tracked() {
        output::error(&format!("{} is not initialized", display_dir(dir)));
        return Ok(CheckOutcome::NotTracked);
    }

    output::info(&format!("Checking {}...", display_dir(dir)));
    let live = fingerprint_tree(&tracked.data_dir(), &ctx.scan_options())
        .context("Failed to fingerprint data")?;
    let stored = tracked
        .read_manifest()
        .context("Failed to read stored manifest")?;

    if stored.same_fingerprints(&live) {
        info!(entries = live.len(), "check matched");
        output::success(&format!("Checksums match ({} files)", live.len()));
        return Ok(CheckOutcome::Match {
            entries: live.len(),
        });
    }

    let diff = stored.diff(&live);
    info!(changed = diff.len(), "check mismatched");
    output::error("Checksums do not match");
    for path in &diff.modified {
        output::change('M', path);
    }
    for path in &diff.added {
        output::change('A', path);
    }
    for path in &diff.removed {
        output::change('D', path);
    }

    Ok(CheckOutcome::Mismatch(diff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::{self, InitOptions};
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> Result<(TempDir, TreemarkContext)> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("x.txt"), "hello")?;
        fs::create_dir(temp.path().join("sub"))?;
        fs::write(temp.path().join("sub/y.txt"), "world")?;

        let ctx = TreemarkContext::with_config(Config::default());
        init::execute(&ctx, temp.path(), "proj1", &InitOptions { yes: true })?;
        Ok((temp, ctx))
    }

    #[test]
    fn test_fresh_init_matches() -> Result<()> {
        let (temp, ctx) = setup()?;
        let outcome = execute(&ctx, temp.path())?;
        assert_eq!(outcome, CheckOutcome::Match { entries: 2 });
        assert_eq!(outcome.exit_code(), exit::SUCCESS);
        Ok(())
    }

    #[test]
    fn test_modified_file_mismatches() -> Result<()> {
        let (temp, ctx) = setup()?;
        fs::write(temp.path().join("data/x.txt"), "hellp")?;

        let outcome = execute(&ctx, temp.path())?;
        match &outcome {
            CheckOutcome::Mismatch(diff) => {
                assert_eq!(diff.modified, vec!["x.txt"]);
                assert!(diff.added.is_empty());
                assert!(diff.removed.is_empty());
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
        assert_eq!(outcome.exit_code(), exit::CHECK_MISMATCH);
        Ok(())
    }

    #[test]
    fn test_added_and_removed_files() -> Result<()> {
        let (temp, ctx) = setup()?;
        fs::remove_file(temp.path().join("data/sub/y.txt"))?;
        fs::write(temp.path().join("data/new.txt"), "new")?;

        let CheckOutcome::Mismatch(diff) = execute(&ctx, temp.path())? else {
            panic!("expected mismatch");
        };
        assert_eq!(diff.added, vec!["new.txt"]);
        assert_eq!(diff.removed, vec!["sub/y.txt"]);
        Ok(())
    }

    #[test]
    fn test_check_does_not_change_state() -> Result<()> {
        let (temp, ctx) = setup()?;
        fs::write(temp.path().join("data/x.txt"), "changed")?;
        let dir = TrackedDir::new(temp.path());
        let before = dir.read_manifest()?;

        execute(&ctx, temp.path())?;

        assert_eq!(dir.read_manifest()?, before);
        assert_eq!(dir.read_version()?, 0);
        Ok(())
    }

    #[test]
    fn test_untracked_directory() -> Result<()> {
        let temp = TempDir::new()?;
        let ctx = TreemarkContext::with_config(Config::default());
        let outcome = execute(&ctx, temp.path())?;
        assert_eq!(outcome, CheckOutcome::NotTracked);
        assert_eq!(outcome.exit_code(), exit::NOT_TRACKED);
        Ok(())
    }
}
