//! Fingerprints, manifests, and the on-disk state of tracked directories.
//!
//! # Architecture
//!
//! - [`crate::tracking::scanner`] - walks a tree and fingerprints every file
//! - [`crate::tracking::manifest`] - the `(fingerprint, path)` list and its text codec
//! - [`crate::tracking::store`] - markers and manifest of one tracked directory
//!
//! # Usage
//!
//! ```no_run
//! use treemark::tracking::scanner::{ScanOptions, fingerprint_tree};
//! use treemark::tracking::store::TrackedDir;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = TrackedDir::new("/srv/photos");
//! let stored = dir.read_manifest()?;
//! let live = fingerprint_tree(&dir.data_dir(), &ScanOptions::default())?;
//! println!("unchanged: {}", stored.same_fingerprints(&live));
//! # Ok(())
//! # }
//! ```

pub mod manifest;
pub mod scanner;
pub mod store;

pub use manifest::{Manifest, ManifestDiff, ManifestEntry};
pub use scanner::{ScanOptions, fingerprint_file, fingerprint_tree};
pub use store::{TrackedDir, TrackedStatus};
