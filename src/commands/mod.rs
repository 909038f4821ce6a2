//! State operations on tracked directories.
//!
//! Each command prints its own status lines and returns a typed outcome;
//! the binary turns the outcome into a process exit code so scripts can
//! tell every abort and mismatch apart.

pub mod check;
pub mod compare;
pub mod init;
pub mod status;
pub mod update;

use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;

/// Process exit codes, one per abort or mismatch path.
pub mod exit {
    /// Success or full match
    pub const SUCCESS: i32 = 0;
    /// Unexpected error (I/O, malformed manifest, bad configuration)
    pub const ERROR: i32 = 1;
    /// Init refused: directory already tracked
    pub const ALREADY_INITIALIZED: i32 = 3;
    /// Target directory is not tracked
    pub const NOT_TRACKED: i32 = 4;
    /// Init refused: confirmation declined
    pub const DECLINED: i32 = 5;
    /// Check found the tree differs from the stored manifest
    pub const CHECK_MISMATCH: i32 = 6;
    /// Compare: one of the directories is not tracked
    pub const COMPARE_NOT_TRACKED: i32 = 7;
    /// Compare: identities differ
    pub const IDENTITY_MISMATCH: i32 = 8;
    /// Compare: versions differ
    pub const VERSION_MISMATCH: i32 = 9;
    /// Compare: stored manifests differ
    pub const MANIFEST_MISMATCH: i32 = 10;
}

/// Result of a state operation that maps to a process exit code.
pub trait Outcome {
    /// Exit code for this outcome (see [`exit`])
    fn exit_code(&self) -> i32;
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` declines.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed or stdin cannot be read.
pub fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

/// Human label for a directory in messages.
fn display_dir(path: &Path) -> String {
    path.display().to_string()
}
