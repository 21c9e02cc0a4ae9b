//! Error types for replisync.
//!
//! Fatal errors (bad roots, bad configuration) abort before any reconciliation.
//! Per-entry I/O failures never surface here - the synchronizer catches them at
//! entry granularity and tallies them in `SyncStats`.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("source root not found or not a directory: {}", .0.display())]
    SourceRoot(PathBuf),

    #[error("destination root does not exist: {} (pass --create-dest to create it)", .0.display())]
    DestRoot(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
