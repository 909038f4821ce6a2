use super::{Outcome, display_dir, exit};
use crate::output;
use crate::tracking::manifest::ManifestDiff;
use crate::tracking::store::TrackedDir;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};

/// Result of comparing two tracked directories
///
/// Variants are ordered the way the comparison short-circuits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareOutcome {
    /// Same identity, same version, same stored manifest
    Match {
        /// Shared identity
        identity: String,
        /// Shared version
        version: u64,
        /// Entries in the shared manifest
        entries: usize,
    },
    /// One of the two directories is not tracked
    NotTracked {
        /// The first untracked directory
        path: PathBuf,
    },
    /// The identities differ
    IdentityMismatch {
        /// Identity of the first directory
        left: String,
        /// Identity of the second directory
        right: String,
    },
    /// Same identity, different versions
    VersionMismatch {
        /// Version of the first directory
        left: u64,
        /// Version of the second directory
        right: u64,
    },
    /// Same identity and version, different stored manifests
    ManifestMismatch(ManifestDiff),
}

impl CompareOutcome {
    /// Whether both directories hold the same recorded state
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }
}

impl Outcome for CompareOutcome {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Match { .. } => exit::SUCCESS,
            Self::NotTracked { .. } => exit::COMPARE_NOT_TRACKED,
            Self::IdentityMismatch { .. } => exit::IDENTITY_MISMATCH,
            Self::VersionMismatch { .. } => exit::VERSION_MISMATCH,
            Self::ManifestMismatch(_) => exit::MANIFEST_MISMATCH,
        }
    }
}

/// Compare the recorded state of two tracked directories
///
/// Identity first, then version, then the stored manifests. Only the stored
/// manifests are consulted; neither data tree is walked, so an unrecorded
/// edit on either side goes unnoticed until that side is updated.
///
/// # Errors
///
/// Returns an error if a marker is missing or ambiguous, or a stored
/// manifest cannot be read or parsed.
pub fn execute(left: &Path, right: &Path) -> Result<CompareOutcome> {
    let span = span!(
        Level::INFO,
        "compare",
        left = %left.display(),
        right = %right.display()
    );
    let _enter = span.enter();

    let left_dir = TrackedDir::new(left);
    let right_dir = TrackedDir::new(right);

    for dir in [&left_dir, &right_dir] {
        if !dir.is_tracked() {
            output::error(&format!("{} is not initialized", display_dir(dir.root())));
            return Ok(CompareOutcome::NotTracked {
                path: dir.root().to_path_buf(),
            });
        }
    }

    let left_id = left_dir
        .read_identity()
        .with_context(|| format!("Failed to read identity of {}", left.display()))?;
    let right_id = right_dir
        .read_identity()
        .with_context(|| format!("Failed to read identity of {}", right.display()))?;
    if left_id != right_id {
        output::error("ID does not match");
        output::field(&display_dir(left), &left_id);
        output::field(&display_dir(right), &right_id);
        return Ok(CompareOutcome::IdentityMismatch {
            left: left_id,
            right: right_id,
        });
    }

    let left_version = left_dir
        .read_version()
        .with_context(|| format!("Failed to read version of {}", left.display()))?;
    let right_version = right_dir
        .read_version()
        .with_context(|| format!("Failed to read version of {}", right.display()))?;
    if left_version != right_version {
        output::error("Version does not match");
        output::field(&display_dir(left), &left_version.to_string());
        output::field(&display_dir(right), &right_version.to_string());
        return Ok(CompareOutcome::VersionMismatch {
            left: left_version,
            right: right_version,
        });
    }

    let left_manifest = left_dir
        .read_manifest()
        .with_context(|| format!("Failed to read manifest of {}", left.display()))?;
    let right_manifest = right_dir
        .read_manifest()
        .with_context(|| format!("Failed to read manifest of {}", right.display()))?;
    if !left_manifest.same_fingerprints(&right_manifest) {
        let diff = left_manifest.diff(&right_manifest);
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
        return Ok(CompareOutcome::ManifestMismatch(diff));
    }

    debug!(identity = %left_id, version = left_version, "directories match");
    output::success(&format!(
        "Match: '{left_id}' at version {left_version} ({} files)",
        left_manifest.len()
    ));

    Ok(CompareOutcome::Match {
        identity: left_id,
        version: left_version,
        entries: left_manifest.len(),
    })
}
