use crate::error::{TrackError, TrackResult};
use memmap2::MmapOptions;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

/// Files at or above this size are memory-mapped instead of read.
pub const DEFAULT_MMAP_THRESHOLD: u64 = 1_048_576;

/// Hex-encoded 128-bit xxHash3 of a byte slice.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    let hash = xxh3_128(data);
    format!("{hash:032x}")
}

/// Fingerprint a file with the default mmap threshold.
///
/// # Errors
///
/// Returns [`TrackError::Io`] if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> TrackResult<String> {
    hash_file_with_threshold(path, DEFAULT_MMAP_THRESHOLD)
}

/// Fingerprint a file, memory-mapping it once it reaches `mmap_threshold` bytes.
///
/// Filesystems that refuse the mapping fall back to [`hash_file_streaming`].
///
/// # Errors
///
/// Returns [`TrackError::Io`] if the file cannot be opened or read.
pub fn hash_file_with_threshold(path: &Path, mmap_threshold: u64) -> TrackResult<String> {
    let file = File::open(path).map_err(TrackError::io(format!("opening {}", path.display())))?;
    let metadata = file
        .metadata()
        .map_err(TrackError::io(format!("reading metadata of {}", path.display())))?;

    if metadata.len() == 0 {
        return Ok(hash_bytes(b""));
    }

    if metadata.len() < mmap_threshold {
        let content =
            std::fs::read(path).map_err(TrackError::io(format!("reading {}", path.display())))?;
        Ok(hash_bytes(&content))
    } else {
        // SAFETY: the map is read-only and dropped before returning; a concurrent
        // writer can only change the digest, which the model leaves undefined.
        match unsafe { MmapOptions::new().map(&file) } {
            Ok(mmap) => Ok(hash_bytes(&mmap)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "mmap failed, streaming instead");
                hash_file_streaming(path)
            }
        }
    }
}

/// Fingerprint a file through a fixed 64 KiB buffer.
///
/// Produces the same digest as [`hash_file`].
///
/// # Errors
///
/// Returns [`TrackError::Io`] if the file cannot be opened or read.
pub fn hash_file_streaming(path: &Path) -> TrackResult<String> {
    let mut file =
        File::open(path).map_err(TrackError::io(format!("opening {}", path.display())))?;
    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; 65536];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(TrackError::io(format!("reading {}", path.display())))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = hasher.digest128();
    Ok(format!("{hash:032x}"))
}

/// Whether `s` looks like a fingerprint produced by this module.
#[must_use]
pub fn is_fingerprint(s: &str) -> bool {
    s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
