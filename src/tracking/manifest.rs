//! Manifest model and its text codec.
//!
//! A manifest is the ordered list of `(fingerprint, path)` pairs for every
//! file under a tracked directory's `data` subtree. On disk it is plain
//! UTF-8 text, one `<fingerprint> <path>` line per file:
//!
//! ```text
//! 5d41402abc4b2a76b9719d911017c592 x.txt
//! 7d793037a0760186574b0282f2f435e7 sub/y.txt
//! ```
//!
//! Paths may contain spaces: everything after the first space is the path.
//! Order is kept for reproducible output, but equality between manifests
//! is set based (see [`Manifest::same_fingerprints`]).

use crate::error::{TrackError, TrackResult};
use crate::utils::hash::is_fingerprint;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// One tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestEntry {
    /// Hex content fingerprint (never contains a space)
    pub fingerprint: String,
    /// Path relative to `data`, `/` separated
    pub path: String,
}

impl ManifestEntry {
    /// Create an entry from a fingerprint and a relative path
    #[must_use]
    pub fn new(fingerprint: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            path: path.into(),
        }
    }
}

/// Ordered sequence of manifest entries.
///
/// `PartialEq` compares sequences exactly (order included); use
/// [`Manifest::same_fingerprints`] for the order-independent comparison
/// the state operations rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Entries in walk order
    entries: Vec<ManifestEntry>,
}

/// Per-path differences between two manifests, each list sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    /// Paths present only in the newer manifest
    pub added: Vec<String>,
    /// Paths present only in the older manifest
    pub removed: Vec<String>,
    /// Paths present in both with different fingerprints
    pub modified: Vec<String>,
}

impl ManifestDiff {
    /// True when no path differs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of differing paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

impl Manifest {
    /// Create an empty manifest
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a manifest from entries, keeping their order
    #[must_use]
    pub const fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    /// Entries in stored order
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Consume the manifest, returning its entries
    #[must_use]
    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fingerprint recorded for `path`, if any
    #[must_use]
    pub fn fingerprint_of(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.fingerprint.as_str())
    }

    /// Render as manifest text: `"<fingerprint> <path>\n"` per entry.
    #[must_use]
    pub fn encode(&self) -> String {
        let capacity = self
            .entries
            .iter()
            .map(|e| e.fingerprint.len() + e.path.len() + 2)
            .sum();
        let mut out = String::with_capacity(capacity);

        for entry in &self.entries {
            out.push_str(&entry.fingerprint);
            out.push(' ');
            out.push_str(&entry.path);
            out.push('\n');
        }

        out
    }

    /// Parse manifest text.
    ///
    /// One trailing newline is optional. `source` only labels errors.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Format`] when a line has no space separator,
    /// an empty or non-hex fingerprint, an empty path, or repeats a path.
    pub fn decode(text: &str, source: &Path) -> TrackResult<Self> {
        let body = text.strip_suffix('\n').unwrap_or(text);
        if body.is_empty() {
            return Ok(Self::new());
        }

        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for (idx, line) in body.split('\n').enumerate() {
            let line_no = idx + 1;
            let (fingerprint, path) = line.split_once(' ').ok_or_else(|| {
                TrackError::format(source, line_no, "missing space between fingerprint and path")
            })?;

            if fingerprint.is_empty() {
                return Err(TrackError::format(source, line_no, "empty fingerprint"));
            }
            if !is_fingerprint(fingerprint) {
                return Err(TrackError::format(
                    source,
                    line_no,
                    format!("'{fingerprint}' is not a 32-digit hex fingerprint"),
                ));
            }
            if path.is_empty() {
                return Err(TrackError::format(source, line_no, "empty path"));
            }
            if !seen.insert(path) {
                return Err(TrackError::format(
                    source,
                    line_no,
                    format!("duplicate path '{path}'"),
                ));
            }

            entries.push(ManifestEntry::new(fingerprint, path));
        }

        Ok(Self { entries })
    }

    /// Parse manifest bytes, validating UTF-8 first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Format`] for invalid UTF-8 or any error of [`Manifest::decode`].
    pub fn decode_bytes(bytes: &[u8], source: &Path) -> TrackResult<Self> {
        let text = simdutf8::basic::from_utf8(bytes)
            .map_err(|_| TrackError::format(source, 0, "manifest is not valid UTF-8"))?;
        Self::decode(text, source)
    }

    /// Order-independent equality: same paths, and the same fingerprint for each.
    #[must_use]
    pub fn same_fingerprints(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }

        let theirs = other.by_path();
        self.entries
            .iter()
            .all(|e| theirs.get(e.path.as_str()) == Some(&e.fingerprint.as_str()))
    }

    /// Paths that differ going from `self` (older) to `newer`.
    #[must_use]
    pub fn diff(&self, newer: &Self) -> ManifestDiff {
        let old = self.by_path();
        let new = newer.by_path();

        let mut added = BTreeSet::new();
        let mut removed = BTreeSet::new();
        let mut modified = BTreeSet::new();

        for (path, fingerprint) in &new {
            match old.get(path) {
                None => {
                    added.insert((*path).to_string());
                }
                Some(previous) if previous != fingerprint => {
                    modified.insert((*path).to_string());
                }
                Some(_) => {}
            }
        }
        for path in old.keys() {
            if !new.contains_key(path) {
                removed.insert((*path).to_string());
            }
        }

        ManifestDiff {
            added: added.into_iter().collect(),
            removed: removed.into_iter().collect(),
            modified: modified.into_iter().collect(),
        }
    }

    /// Path to fingerprint lookup
    fn by_path(&self) -> HashMap<&str, &str> {
        self.entries
            .iter()
            .map(|e| (e.path.as_str(), e.fingerprint.as_str()))
            .collect()
    }
}

impl FromIterator<ManifestEntry> for Manifest {
    fn from_iter<I: IntoIterator<Item = ManifestEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FP_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const FP_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const FP_C: &str = "cccccccccccccccccccccccccccccccc";
    const FP_D: &str = "dddddddddddddddddddddddddddddddd";
    const FP_F: &str = "ffffffffffffffffffffffffffffffff";
    const FP_A2: &str = "a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2";

    fn sample() -> Manifest {
        Manifest::from_entries(vec![
            ManifestEntry::new(FP_A, "x.txt"),
            ManifestEntry::new(FP_B, "sub/y.txt"),
        ])
    }

    fn src() -> &'static Path {
        Path::new("manifest")
    }

    #[test]
    fn test_encode_format() {
        assert_eq!(sample().encode(), format!("{FP_A} x.txt\n{FP_B} sub/y.txt\n"));
        assert_eq!(Manifest::new().encode(), "");
    }

    #[test]
    fn test_decode_with_and_without_trailing_newline() {
        let with = Manifest::decode(&format!("{FP_A} x.txt\n{FP_B} sub/y.txt\n"), src()).unwrap();
        let without = Manifest::decode(&format!("{FP_A} x.txt\n{FP_B} sub/y.txt"), src()).unwrap();
        assert_eq!(with, sample());
        assert_eq!(without, sample());
    }

    #[test]
    fn test_decode_path_with_spaces() {
        let m = Manifest::decode(&format!("{FP_C} my docs/read me.txt\n"), src()).unwrap();
        assert_eq!(m.entries()[0].path, "my docs/read me.txt");
        assert_eq!(m.entries()[0].fingerprint, FP_C);
    }

    #[test]
    fn test_decode_empty() {
        assert!(Manifest::decode("", src()).unwrap().is_empty());
        assert!(Manifest::decode("\n", src()).unwrap().is_empty());
    }

    #[test]
    fn test_decode_missing_separator() {
        let err = Manifest::decode(&format!("{FP_A} x.txt\nnospace\n"), src()).unwrap_err();
        match err {
            TrackError::Format { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_rejects_empty_path_and_fingerprint() {
        assert!(Manifest::decode(&format!("{FP_A} \n"), src()).is_err());
        assert!(Manifest::decode(" x.txt\n", src()).is_err());
        // A blank line in the middle has no separator either
        assert!(Manifest::decode(&format!("{FP_A} x\n\n{FP_B} y\n"), src()).is_err());
    }

    #[test]
    fn test_decode_rejects_foreign_fingerprints() {
        // Short or non-hex digests were not produced here
        assert!(Manifest::decode("5d41402abc4b2a76 x.txt\n", src()).is_err());
        let err = Manifest::decode(
            "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz x.txt\n",
            src(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a 32-digit hex fingerprint"));
    }

    #[test]
    fn test_decode_rejects_duplicate_path() {
        let err = Manifest::decode(&format!("{FP_A} x.txt\n{FP_B} x.txt\n"), src()).unwrap_err();
        assert!(err.to_string().contains("duplicate path"));
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        let err = Manifest::decode_bytes(&[0xff, 0xfe, b' ', b'x'], src()).unwrap_err();
        assert!(matches!(err, TrackError::Format { .. }));
    }

    #[test]
    fn test_round_trip() {
        let m = sample();
        assert_eq!(Manifest::decode(&m.encode(), src()).unwrap(), m);
    }

    #[test]
    fn test_same_fingerprints_ignores_order() {
        let a = sample();
        let b: Manifest = a.entries().iter().rev().cloned().collect();
        assert_ne!(a, b);
        assert!(a.same_fingerprints(&b));
    }

    #[test]
    fn test_same_fingerprints_detects_differences() {
        let a = sample();

        let changed = Manifest::from_entries(vec![
            ManifestEntry::new(FP_A, "x.txt"),
            ManifestEntry::new(FP_F, "sub/y.txt"),
        ]);
        assert!(!a.same_fingerprints(&changed));

        let renamed = Manifest::from_entries(vec![
            ManifestEntry::new(FP_A, "x.txt"),
            ManifestEntry::new(FP_B, "sub/z.txt"),
        ]);
        assert!(!a.same_fingerprints(&renamed));

        let shorter = Manifest::from_entries(vec![ManifestEntry::new(FP_A, "x.txt")]);
        assert!(!a.same_fingerprints(&shorter));
        assert!(!shorter.same_fingerprints(&a));
    }

    #[test]
    fn test_diff() {
        let old = sample();
        let new = Manifest::from_entries(vec![
            ManifestEntry::new(FP_A2, "x.txt"),
            ManifestEntry::new(FP_D, "z.txt"),
        ]);

        let diff = old.diff(&new);
        assert_eq!(diff.added, vec!["z.txt"]);
        assert_eq!(diff.removed, vec!["sub/y.txt"]);
        assert_eq!(diff.modified, vec!["x.txt"]);
        assert_eq!(diff.len(), 3);
        assert!(old.diff(&old).is_empty());
    }

    #[test]
    fn test_fingerprint_of() {
        let m = sample();
        assert_eq!(m.fingerprint_of("sub/y.txt"), Some(FP_B));
        assert_eq!(m.fingerprint_of("nope"), None);
    }
}
