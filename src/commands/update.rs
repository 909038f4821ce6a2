use super::{Outcome, display_dir, exit};
use crate::TreemarkContext;
use crate::output;
use crate::tracking::scanner::fingerprint_tree;
use crate::tracking::store::TrackedDir;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{Level, info, span};

/// Flags for `update`
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Leave the version alone when the tree matches the stored manifest
    pub if_changed: bool,
}

/// What `update` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A new version was recorded
    Updated {
        /// Version before the update
        from: u64,
        /// Version after the update
        to: u64,
        /// Files in the new manifest
        files: usize,
    },
    /// `--if-changed` and nothing changed
    Unchanged {
        /// Current (untouched) version
        version: u64,
    },
    /// The directory is not tracked
    NotTracked,
}

impl Outcome for UpdateOutcome {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Updated { .. } | Self::Unchanged { .. } => exit::SUCCESS,
            Self::NotTracked => exit::NOT_TRACKED,
        }
    }
}

/// Record the current state of `<dir>/data` as the next version
///
/// By default the version advances even when nothing changed. The tree is
/// fingerprinted before any marker is touched, so a failed walk leaves the
/// version where it was.
///
/// # Errors
///
/// Returns an error if the version marker is missing or malformed, the tree
/// cannot be fingerprinted, or a marker or the manifest cannot be written.
pub fn execute(ctx: &TreemarkContext, dir: &Path, options: &UpdateOptions) -> Result<UpdateOutcome> {
    let span = span!(Level::INFO, "update", dir = %dir.display());
    let _enter = span.enter();

    let tracked = TrackedDir::new(dir);
    if !tracked.is_tracked() {
        output::error(&format!("{} is not initialized", display_dir(dir)));
        return Ok(UpdateOutcome::NotTracked);
    }

    let from = tracked.read_version().context("Failed to read version")?;
    let manifest = fingerprint_tree(&tracked.data_dir(), &ctx.scan_options())
        .context("Failed to fingerprint data")?;

    if options.if_changed {
        let stored = tracked
            .read_manifest()
            .context("Failed to read stored manifest")?;
        if stored.same_fingerprints(&manifest) {
            output::info(&format!(
                "{} unchanged, staying at version {from}",
                display_dir(dir)
            ));
            return Ok(UpdateOutcome::Unchanged { version: from });
        }
    }

    let to = tracked.bump_version().context("Failed to advance version")?;
    tracked
        .write_manifest(&manifest)
        .context("Failed to write manifest")?;

    info!(from, to, files = manifest.len(), "updated");
    output::success(&format!(
        "Updated {} to version {to} ({} files)",
        display_dir(dir),
        manifest.len()
    ));

    Ok(UpdateOutcome::Updated {
        from,
        to,
        files: manifest.len(),
    })
}
