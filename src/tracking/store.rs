//! Manifest store: markers and manifest of one tracked directory.
//!
//! A directory is tracked when it has a `.treemark` subdirectory. Identity
//! and version live in the *names* of two marker files at the directory
//! root; the manifest lives inside `.treemark`.

use crate::error::{TrackError, TrackResult};
use crate::tracking::manifest::Manifest;
use crate::{DATA_DIR, ID_MARKER_PREFIX, MANIFEST_FILE, META_DIR, VERSION_MARKER_PREFIX};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read-only summary of a tracked directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedStatus {
    /// Lineage identity
    pub identity: String,
    /// Current version
    pub version: u64,
    /// Number of entries in the stored manifest
    pub entries: usize,
}

/// Handle on a (possibly untracked) directory root.
#[derive(Debug, Clone)]
pub struct TrackedDir {
    /// Directory root
    root: PathBuf,
}

impl TrackedDir {
    /// Wrap a directory root; nothing is read until an accessor is called
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `data` payload subtree
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// The metadata subdirectory
    #[must_use]
    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    /// Path of the manifest file
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.meta_dir().join(MANIFEST_FILE)
    }

    /// True iff the metadata subdirectory exists directly under the root
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.meta_dir().is_dir()
    }

    /// Fail with [`TrackError::NotTracked`] unless tracked
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::NotTracked`] if the metadata subdirectory is absent.
    pub fn ensure_tracked(&self) -> TrackResult<()> {
        if self.is_tracked() {
            Ok(())
        } else {
            Err(TrackError::NotTracked {
                path: self.root.clone(),
            })
        }
    }

    /// Identity recorded at initialization
    ///
    /// # Errors
    ///
    /// - [`TrackError::NotTracked`] if the directory is not tracked
    /// - [`TrackError::MissingMarker`] if no identity marker exists
    /// - [`TrackError::Format`] if more than one identity marker exists
    pub fn read_identity(&self) -> TrackResult<String> {
        self.ensure_tracked()?;
        let mut ids = self.marker_suffixes(ID_MARKER_PREFIX)?;

        match ids.len() {
            0 => Err(TrackError::MissingMarker {
                marker: "identity",
                path: self.root.clone(),
            }),
            1 => Ok(ids.remove(0)),
            n => Err(TrackError::format(
                &self.root,
                0,
                format!("{n} identity markers found, lineage is ambiguous"),
            )),
        }
    }

    /// Current version
    ///
    /// When an interrupted update left several version markers behind, the
    /// highest one wins.
    ///
    /// # Errors
    ///
    /// - [`TrackError::NotTracked`] if the directory is not tracked
    /// - [`TrackError::MissingMarker`] if no version marker exists
    /// - [`TrackError::Format`] if a marker suffix is not a decimal number
    pub fn read_version(&self) -> TrackResult<u64> {
        self.ensure_tracked()?;
        let versions = self.versions()?;

        if versions.len() > 1 {
            warn!(
                root = %self.root.display(),
                markers = versions.len(),
                "multiple version markers found, using the highest"
            );
        }

        versions
            .into_iter()
            .map(|(version, _)| version)
            .max()
            .ok_or_else(|| TrackError::MissingMarker {
                marker: "version",
                path: self.root.clone(),
            })
    }

    /// Stored manifest
    ///
    /// # Errors
    ///
    /// - [`TrackError::NotTracked`] if the directory is not tracked
    /// - [`TrackError::Io`] if the manifest cannot be read
    /// - [`TrackError::Format`] if the manifest cannot be parsed
    pub fn read_manifest(&self) -> TrackResult<Manifest> {
        self.ensure_tracked()?;
        let path = self.manifest_path();
        let bytes = fs::read(&path).map_err(TrackError::io(format!("reading {}", path.display())))?;
        Manifest::decode_bytes(&bytes, &path)
    }

    /// Replace the stored manifest
    ///
    /// The text is written next to the manifest and renamed over it, so a
    /// crash leaves either the old or the new manifest.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Io`] if writing or renaming fails.
    pub fn write_manifest(&self, manifest: &Manifest) -> TrackResult<()> {
        let path = self.manifest_path();
        let tmp = path.with_extension("tmp");

        fs::write(&tmp, manifest.encode())
            .map_err(TrackError::io(format!("writing {}", tmp.display())))?;
        fs::rename(&tmp, &path).map_err(TrackError::io(format!(
            "replacing {} with {}",
            path.display(),
            tmp.display()
        )))?;

        debug!(path = %path.display(), entries = manifest.len(), "manifest written");
        Ok(())
    }

    /// Create the metadata subdirectory
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::AlreadyInitialized`] if it already exists and
    /// [`TrackError::Io`] if it cannot be created.
    pub fn create_meta_dir(&self) -> TrackResult<()> {
        let meta = self.meta_dir();
        fs::create_dir(&meta).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                TrackError::AlreadyInitialized {
                    path: self.root.clone(),
                }
            } else {
                TrackError::Io {
                    context: format!("creating {}", meta.display()),
                    source: e,
                }
            }
        })
    }

    /// Write the identity marker
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Io`] if the marker cannot be created.
    pub fn write_identity(&self, identity: &str) -> TrackResult<()> {
        self.touch(&format!("{ID_MARKER_PREFIX}{identity}"))
    }

    /// Write a version marker (does not remove older ones)
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Io`] if the marker cannot be created.
    pub fn write_version(&self, version: u64) -> TrackResult<()> {
        self.touch(&format!("{VERSION_MARKER_PREFIX}{version}"))
    }

    /// Advance the version by one and return the new value
    ///
    /// The new marker is written before the old ones are removed; a failure
    /// in between leaves two markers, which [`TrackedDir::read_version`]
    /// resolves to the newer one.
    ///
    /// # Errors
    ///
    /// Returns any error of [`TrackedDir::read_version`], or
    /// [`TrackError::Io`] if a marker cannot be written or removed.
    pub fn bump_version(&self) -> TrackResult<u64> {
        let current = self.read_version()?;
        let next = current.checked_add(1).ok_or_else(|| {
            TrackError::format(&self.root, 0, "version counter overflow")
        })?;

        self.write_version(next)?;
        let current_suffix = next.to_string();
        for (_, suffix) in self
            .versions()?
            .into_iter()
            .filter(|(_, suffix)| *suffix != current_suffix)
        {
            let marker = self.root.join(format!("{VERSION_MARKER_PREFIX}{suffix}"));
            fs::remove_file(&marker)
                .map_err(TrackError::io(format!("removing {}", marker.display())))?;
        }

        debug!(root = %self.root.display(), from = current, to = next, "version bumped");
        Ok(next)
    }

    /// Identity, version and entry count in one read
    ///
    /// # Errors
    ///
    /// Returns any error of the three underlying reads.
    pub fn status(&self) -> TrackResult<TrackedStatus> {
        Ok(TrackedStatus {
            identity: self.read_identity()?,
            version: self.read_version()?,
            entries: self.read_manifest()?.len(),
        })
    }

    /// Version markers as `(version, suffix)`; the suffix is the on-disk spelling
    fn versions(&self) -> TrackResult<Vec<(u64, String)>> {
        self.marker_suffixes(VERSION_MARKER_PREFIX)?
            .into_iter()
            .map(|suffix| {
                let version = suffix.parse::<u64>().map_err(|_| {
                    TrackError::format(
                        &self.root,
                        0,
                        format!("version marker '{VERSION_MARKER_PREFIX}{suffix}' is not a number"),
                    )
                })?;
                Ok((version, suffix))
            })
            .collect()
    }

    /// Suffixes of root-level file names starting with `prefix`, sorted
    fn marker_suffixes(&self, prefix: &str) -> TrackResult<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .map_err(TrackError::io(format!("reading {}", self.root.display())))?;

        let mut suffixes = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(TrackError::io(format!("reading {}", self.root.display())))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(suffix) = name.strip_prefix(prefix)
                && !suffix.is_empty()
            {
                suffixes.push(suffix.to_string());
            }
        }

        suffixes.sort();
        Ok(suffixes)
    }

    /// Create an empty marker file at the root
    fn touch(&self, name: &str) -> TrackResult<()> {
        let path = self.root.join(name);
        fs::File::create(&path).map_err(TrackError::io(format!("creating {}", path.display())))?;
        Ok(())
    }
}
