use super::{Outcome, display_dir, exit};
use crate::output;
use crate::tracking::store::{TrackedDir, TrackedStatus};
use anyhow::{Context, Result};
use std::path::Path;

/// Recorded state of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    /// Identity, version and manifest size
    Tracked(TrackedStatus),
    /// The directory is not tracked
    NotTracked,
}

impl Outcome for StatusOutcome {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Tracked(_) => exit::SUCCESS,
            Self::NotTracked => exit::NOT_TRACKED,
        }
    }
}

/// Print the identity, version and entry count recorded for `dir`
///
/// Reads markers and the stored manifest only; the data tree is not walked.
///
/// # Errors
///
/// Returns an error if a marker is missing or ambiguous, or the manifest
/// cannot be read or parsed.
pub fn execute(dir: &Path) -> Result<StatusOutcome> {
    let tracked = TrackedDir::new(dir);
    if !tracked.is_tracked() {
        output::error(&format!("{} is not initialized", display_dir(dir)));
        return Ok(StatusOutcome::NotTracked);
    }

    let status = tracked
        .status()
        .with_context(|| format!("Failed to read state of {}", dir.display()))?;

    output::field("Directory", &display_dir(dir));
    output::field("Identity", &status.identity);
    output::field("Version", &status.version.to_string());
    output::field("Files", &status.entries.to_string());

    Ok(StatusOutcome::Tracked(status))
}
