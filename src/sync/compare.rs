//! Content equality for file pairs.

use crate::error::Result;
use crate::hash::file_digest;
use std::path::Path;

/// Whether two files have identical byte content.
///
/// Digest equality is the sole criterion - no size or mtime short-circuit.
/// Both files are read fully on every comparison, which stays correct under
/// clock skew or metadata tampering.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    Ok(file_digest(a)? == file_digest(b)?)
}
