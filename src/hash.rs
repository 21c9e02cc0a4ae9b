//! Streaming file digests.
//!
//! Folds a file's bytes through BLAKE3 in fixed-size reads, so memory use is
//! O(1) in file size. The digest is a change detector, not a security boundary.

use crate::error::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read size for streaming digests
pub const CHUNK_SIZE: usize = 4096;

/// Compute the digest of a file's full byte content.
///
/// Produces the identical digest whether the content is read in one shot or
/// in chunks. I/O errors propagate to the caller as a per-entry failure.
pub fn file_digest(path: &Path) -> Result<blake3::Hash> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize())
}
