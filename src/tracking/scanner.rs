//! Tree fingerprinting.
//!
//! Walks a payload subtree, records every regular file with its path
//! relative to the walk root, and hashes the files in parallel. The walk
//! visits subdirectories before files and sorts by name inside each
//! directory, so the resulting manifest text is reproducible.

use crate::config::SymlinkPolicy;
use crate::error::{TrackError, TrackResult};
use crate::tracking::manifest::{Manifest, ManifestEntry};
use crate::utils::hash::{DEFAULT_MMAP_THRESHOLD, hash_file_with_threshold};
use crate::utils::paths::to_manifest_path;
use crate::utils::thread_pool::run_in_pool;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, span};
use walkdir::{DirEntry, WalkDir};

/// Knobs for a tree walk
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// What to do with symbolic links
    pub symlinks: SymlinkPolicy,
    /// Files at or above this size are memory-mapped
    pub mmap_threshold: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            symlinks: SymlinkPolicy::Follow,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

/// Fingerprint a single file.
///
/// # Errors
///
/// Returns [`TrackError::Io`] if the file cannot be read.
pub fn fingerprint_file(path: &Path, options: &ScanOptions) -> TrackResult<String> {
    hash_file_with_threshold(path, options.mmap_threshold)
}

/// Fingerprint every file under `root`.
///
/// # Errors
///
/// Returns [`TrackError::Io`] if the walk or any file read fails (including
/// broken or looping symlinks under [`SymlinkPolicy::Follow`] and any symlink
/// under [`SymlinkPolicy::Error`]), and [`TrackError::Format`] for paths the
/// manifest cannot represent.
pub fn fingerprint_tree(root: &Path, options: &ScanOptions) -> TrackResult<Manifest> {
    let span = span!(Level::DEBUG, "fingerprint_tree", root = %root.display());
    let _enter = span.enter();

    let files = collect_files(root, options)?;
    debug!(files = files.len(), "walk finished, hashing");

    let entries: TrackResult<Vec<ManifestEntry>> = run_in_pool(|| {
        files
            .par_iter()
            .map(|(abs, rel)| {
                let fingerprint = fingerprint_file(abs, options)?;
                Ok(ManifestEntry::new(fingerprint, rel.clone()))
            })
            .collect()
    })?;

    Ok(Manifest::from_entries(entries?))
}

/// Walk `root` and return `(absolute, manifest-relative)` pairs in walk order.
fn collect_files(root: &Path, options: &ScanOptions) -> TrackResult<Vec<(PathBuf, String)>> {
    let follow = options.symlinks == SymlinkPolicy::Follow;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(follow)
        .min_depth(1)
        .sort_by(dirs_first_then_name)
    {
        let entry = entry.map_err(|e| {
            let context = match e.path() {
                Some(p) => format!("walking {}", p.display()),
                None => format!("walking {}", root.display()),
            };
            TrackError::Io {
                context,
                source: e.into(),
            }
        })?;

        if entry.path_is_symlink() && !follow {
            if options.symlinks == SymlinkPolicy::Error {
                return Err(TrackError::Io {
                    context: format!("walking {}", entry.path().display()),
                    source: std::io::Error::other("symbolic links are not allowed in tracked data"),
                });
            }
            debug!(path = %entry.path().display(), "skipping symlink");
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| TrackError::format(entry.path(), 0, "path is outside the walk root"))?;
        files.push((entry.path().to_path_buf(), to_manifest_path(relative)?));
    }

    Ok(files)
}

/// Subdirectories sort before files; ties broken by file name.
fn dirs_first_then_name(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    b_dir
        .cmp(&a_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}
