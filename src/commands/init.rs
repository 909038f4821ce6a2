use super::{Outcome, display_dir, exit};
use crate::TreemarkContext;
use crate::error::TrackError;
use crate::output;
use crate::tracking::scanner::fingerprint_tree;
use crate::tracking::store::TrackedDir;
use crate::utils::{list_entry_names, unique_staging_name};
use crate::{DATA_DIR, ID_MARKER_PREFIX};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use tracing::{Level, debug, info, span};

/// Flags for `init`
#[derive(Debug, Clone, Copy, Default)]
pub struct InitOptions {
    /// Skip the confirmation prompt
    pub yes: bool,
}

/// What `init` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The directory is now tracked at version 0
    Initialized {
        /// Entries moved into `data`
        moved: usize,
        /// Files recorded in the initial manifest
        files: usize,
    },
    /// The directory was already tracked; nothing changed
    AlreadyInitialized,
    /// The user declined; nothing changed
    Declined,
}

impl Outcome for InitOutcome {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Initialized { .. } => exit::SUCCESS,
            Self::AlreadyInitialized => exit::ALREADY_INITIALIZED,
            Self::Declined => exit::DECLINED,
        }
    }
}

/// Start tracking `dir` under `identity`
///
/// Moves everything currently in `dir` into a fresh `data` subtree, writes
/// identity and version 0 markers, and records the initial manifest.
///
/// # Errors
///
/// Returns an error if:
/// - `dir` is not a directory
/// - `identity` cannot be used as a marker name
/// - Moving entries, writing markers or fingerprinting fails (entries
///   already moved into staging are not moved back)
pub fn execute(
    ctx: &TreemarkContext,
    dir: &Path,
    identity: &str,
    options: &InitOptions,
) -> Result<InitOutcome> {
    let span = span!(Level::INFO, "init", dir = %dir.display(), identity);
    let _enter = span.enter();

    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let tracked = TrackedDir::new(dir);
    if tracked.is_tracked() {
        output::warning(&format!("{} is already initialized", display_dir(dir)));
        return Ok(InitOutcome::AlreadyInitialized);
    }

    validate_identity(identity)?;

    let names = list_entry_names(dir)?;
    print_summary(dir, &names, ctx.config.init.preview_entries);

    if !options.yes && !ask(ctx, dir)? {
        output::info("Initialization cancelled");
        return Ok(InitOutcome::Declined);
    }

    move_into_data(dir, &names)?;

    tracked.create_meta_dir()?;
    tracked
        .write_identity(identity)
        .context("Failed to write identity marker")?;
    tracked
        .write_version(0)
        .context("Failed to write version marker")?;

    let manifest = fingerprint_tree(&tracked.data_dir(), &ctx.scan_options())
        .context("Failed to fingerprint data")?;
    tracked
        .write_manifest(&manifest)
        .context("Failed to write initial manifest")?;

    info!(moved = names.len(), files = manifest.len(), "initialized");
    output::success(&format!(
        "Initialized {} as '{}' at version 0 ({} file{})",
        display_dir(dir),
        identity,
        manifest.len(),
        if manifest.len() == 1 { "" } else { "s" }
    ));

    Ok(InitOutcome::Initialized {
        moved: names.len(),
        files: manifest.len(),
    })
}

/// Longest file name most filesystems accept, in bytes
const MAX_FILE_NAME: usize = 255;

/// Reject identities that cannot form a single file name
///
/// # Errors
///
/// Returns [`TrackError::InvalidIdentity`] describing the problem.
pub fn validate_identity(identity: &str) -> Result<(), TrackError> {
    let reason = if identity.is_empty() {
        Some("must not be empty")
    } else if identity == "." || identity == ".." {
        Some("must not be '.' or '..'")
    } else if identity.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if identity.contains(['\0', '\n', '\r']) {
        Some("must not contain NUL or line breaks")
    } else if ID_MARKER_PREFIX.len() + identity.len() > MAX_FILE_NAME {
        Some("is too long for a marker file name")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(TrackError::InvalidIdentity {
            identity: identity.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Lines of the pre-confirmation summary: first `preview` names, then a remainder count
#[must_use]
pub fn summary_lines(names: &[String], preview: usize) -> Vec<String> {
    let mut lines: Vec<String> = names.iter().take(preview).cloned().collect();
    if names.len() > preview {
        lines.push(format!("... and {} more", names.len() - preview));
    }
    lines
}

/// Show what is about to be moved
fn print_summary(dir: &Path, names: &[String], preview: usize) {
    if names.is_empty() {
        output::info(&format!("{} is empty", display_dir(dir)));
        return;
    }

    output::info(&format!(
        "{} entr{} will be moved into {}/:",
        names.len(),
        if names.len() == 1 { "y" } else { "ies" },
        DATA_DIR
    ));
    for line in summary_lines(names, preview) {
        eprintln!("  {}", line.cyan());
    }
}

/// Prompt unless running non-interactively (which declines)
fn ask(ctx: &TreemarkContext, dir: &Path) -> Result<bool> {
    if ctx.non_interactive {
        debug!("non-interactive without --yes, declining");
        return Ok(false);
    }
    super::confirm(&format!("Initialize {}?", display_dir(dir)))
}

/// Move every entry into a staging directory, then rename it to `data`.
///
/// Staging first keeps an existing entry literally named `data` from
/// colliding with the new payload directory.
fn move_into_data(dir: &Path, names: &[String]) -> Result<()> {
    let staging_name = unique_staging_name(names);
    let staging = dir.join(&staging_name);

    fs::create_dir(&staging)
        .with_context(|| format!("Failed to create staging directory {}", staging.display()))?;
    debug!(staging = %staging.display(), "staging created");

    for name in names {
        let from = dir.join(name);
        let to = staging.join(name);
        fs::rename(&from, &to)
            .with_context(|| format!("Failed to move {} into staging", from.display()))?;
        output::verbose(&format!("  moved {name}"));
    }

    let data = dir.join(DATA_DIR);
    fs::rename(&staging, &data).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            staging.display(),
            data.display()
        )
    })?;

    Ok(())
}
