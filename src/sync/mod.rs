//! One-way mirror synchronization.
//!
//! Reconciles each directory pair in two phases: prune destination entries
//! that have no source counterpart, then materialize (copy/update/create)
//! the source entries. Pruning completes for a level before materialization
//! starts, so a re-created path never races a pending deletion.

pub mod compare;

use crate::error::{Result, SyncError};
use crate::sync::compare::files_identical;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Entry kind as seen by the mirror. Metadata is read without following
/// symlinks, so a symlink never classifies as its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
    /// Symlinks, sockets, devices - skipped with a warning
    Other,
}

impl EntryKind {
    fn of(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// Kind of the entry at `path`, or `None` if nothing exists there.
fn entry_kind(path: &Path) -> io::Result<Option<EntryKind>> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(EntryKind::of(meta.file_type()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Counters for a single synchronize() pass.
///
/// A run with all mutating counters at zero changed nothing on disk;
/// `errors` lists the paths where the mirror may still diverge.
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    pub files_copied: usize,
    pub files_updated: usize,
    pub files_deleted: usize,
    pub files_unchanged: usize,
    pub files_skipped: usize,
    pub dirs_created: usize,
    pub dirs_deleted: usize,
    pub bytes_copied: u64,
    pub duration: Duration,
    pub errors: Vec<(PathBuf, String)>,
}

impl SyncStats {
    /// Whether this run mutated the destination at all.
    pub fn has_changes(&self) -> bool {
        self.files_copied > 0
            || self.files_updated > 0
            || self.files_deleted > 0
            || self.dirs_created > 0
            || self.dirs_deleted > 0
    }

    /// One-line human summary for the run-end log event.
    pub fn summary(&self) -> String {
        format!(
            "{} copied, {} updated, {} unchanged, {} removed, {} dirs created, {} skipped, {} errors, {} bytes in {:.2?}",
            self.files_copied,
            self.files_updated,
            self.files_unchanged,
            self.files_deleted + self.dirs_deleted,
            self.dirs_created,
            self.files_skipped,
            self.errors.len(),
            self.bytes_copied,
            self.duration,
        )
    }

    fn record_error(&mut self, path: &Path, err: impl std::fmt::Display) {
        tracing::error!("Failed to sync {}: {}", path.display(), err);
        self.errors.push((path.to_path_buf(), err.to_string()));
    }
}

/// One-way synchronizer for a source/destination root pair.
///
/// Every `synchronize()` call is a cold full re-scan - no state is carried
/// between runs.
pub struct Mirror {
    source: PathBuf,
    dest: PathBuf,
    create_dest: bool,
}

impl Mirror {
    pub fn new(source: &Path, dest: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            create_dest: false,
        }
    }

    /// Create the destination root if it does not exist, instead of failing.
    pub fn with_create_dest(mut self, create: bool) -> Self {
        self.create_dest = create;
        self
    }

    /// Run one full reconciliation pass.
    ///
    /// Fails fast only for bad roots; per-entry I/O failures are logged,
    /// tallied in `SyncStats::errors`, and never abort the pass.
    pub fn synchronize(&self) -> Result<SyncStats> {
        if !self.source.is_dir() {
            return Err(SyncError::SourceRoot(self.source.clone()));
        }

        match entry_kind(&self.dest)? {
            Some(EntryKind::Dir) => {}
            Some(_) => {
                return Err(SyncError::Config(format!(
                    "destination root is not a directory: {}",
                    self.dest.display()
                )));
            }
            None if self.create_dest => {
                fs::create_dir_all(&self.dest)?;
                tracing::info!("Created destination root {}", self.dest.display());
            }
            None => return Err(SyncError::DestRoot(self.dest.clone())),
        }

        tracing::info!(
            "Sync started: {} -> {}",
            self.source.display(),
            self.dest.display()
        );

        let start = Instant::now();
        let mut stats = SyncStats::default();
        self.sync_dir(&self.source, &self.dest, &mut stats);
        stats.duration = start.elapsed();

        tracing::info!("Sync finished: {}", stats.summary());
        Ok(stats)
    }

    /// Reconcile one directory pair. `dst` is known to exist.
    fn sync_dir(&self, src: &Path, dst: &Path, stats: &mut SyncStats) {
        self.prune(src, dst, stats);
        self.materialize(src, dst, stats);
    }

    /// Phase 1: remove destination entries with no matching source entry.
    fn prune(&self, src: &Path, dst: &Path, stats: &mut SyncStats) {
        let entries = match fs::read_dir(dst) {
            Ok(entries) => entries,
            Err(e) => {
                stats.record_error(dst, e);
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    stats.record_error(dst, e);
                    continue;
                }
            };
            let dst_path = entry.path();
            if let Err(e) = self.prune_entry(src, &entry, stats) {
                stats.record_error(&dst_path, e);
            }
        }
    }

    fn prune_entry(&self, src: &Path, entry: &fs::DirEntry, stats: &mut SyncStats) -> io::Result<()> {
        let dst_path = entry.path();
        let dst_kind = EntryKind::of(entry.file_type()?);
        let src_kind = entry_kind(&src.join(entry.file_name()))?;

        let keep = match src_kind {
            // No source counterpart: extraneous
            None => false,
            // The source entry is unsupported and will be skipped in phase 2,
            // so its destination counterpart is left alone too
            Some(EntryKind::Other) => true,
            // Kind mismatch counts as extraneous; phase 2 recreates the
            // source kind in its place
            Some(kind) => kind == dst_kind,
        };
        if keep {
            return Ok(());
        }

        match dst_kind {
            EntryKind::Dir => {
                fs::remove_dir_all(&dst_path)?;
                stats.dirs_deleted += 1;
                tracing::info!("Removed directory {}", dst_path.display());
            }
            _ => {
                fs::remove_file(&dst_path)?;
                stats.files_deleted += 1;
                tracing::info!("Removed file {}", dst_path.display());
            }
        }
        Ok(())
    }

    /// Phase 2: copy, update, and create so destination matches source,
    /// recursing into subdirectories.
    fn materialize(&self, src: &Path, dst: &Path, stats: &mut SyncStats) {
        let entries = match fs::read_dir(src) {
            Ok(entries) => entries,
            Err(e) => {
                stats.record_error(src, e);
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    stats.record_error(src, e);
                    continue;
                }
            };
            let src_path = entry.path();
            let dst_path = dst.join(entry.file_name());
            if let Err(e) = self.materialize_entry(&entry, &dst_path, stats) {
                stats.record_error(&src_path, e);
            }
        }
    }

    fn materialize_entry(
        &self,
        entry: &fs::DirEntry,
        dst_path: &Path,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let src_path = entry.path();

        match EntryKind::of(entry.file_type()?) {
            EntryKind::File => match entry_kind(dst_path)? {
                None => {
                    let bytes = fs::copy(&src_path, dst_path)?;
                    stats.files_copied += 1;
                    stats.bytes_copied += bytes;
                    tracing::info!("Copied {} -> {}", src_path.display(), dst_path.display());
                }
                Some(_) => {
                    if files_identical(&src_path, dst_path)? {
                        stats.files_unchanged += 1;
                    } else {
                        let bytes = fs::copy(&src_path, dst_path)?;
                        stats.files_updated += 1;
                        stats.bytes_copied += bytes;
                        tracing::info!("Updated {}", dst_path.display());
                    }
                }
            },
            EntryKind::Dir => {
                if entry_kind(dst_path)?.is_none() {
                    fs::create_dir(dst_path)?;
                    stats.dirs_created += 1;
                    tracing::info!("Created directory {}", dst_path.display());
                }
                self.sync_dir(&src_path, dst_path, stats);
            }
            EntryKind::Other => {
                stats.files_skipped += 1;
                tracing::warn!("Skipping unsupported entry {}", src_path.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_source_root_is_fatal() {
        let dest = TempDir::new().unwrap();
        let mirror = Mirror::new(Path::new("/nonexistent/replisync-src"), dest.path());
        assert!(matches!(
            mirror.synchronize(),
            Err(SyncError::SourceRoot(_))
        ));
    }

    #[test]
    fn test_source_root_must_be_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "not a dir").unwrap();
        let mirror = Mirror::new(&file, dir.path());
        assert!(matches!(
            mirror.synchronize(),
            Err(SyncError::SourceRoot(_))
        ));
    }

    #[test]
    fn test_missing_dest_root_is_fatal_without_flag() {
        let source = TempDir::new().unwrap();
        let dest = source.path().join("missing");
        let mirror = Mirror::new(source.path(), &dest);
        assert!(matches!(mirror.synchronize(), Err(SyncError::DestRoot(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn test_create_dest_flag_creates_root() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.txt"), "hello").unwrap();
        let scratch = TempDir::new().unwrap();
        let dest = scratch.path().join("replica");

        let mirror = Mirror::new(source.path(), &dest).with_create_dest(true);
        let stats = mirror.synchronize().unwrap();

        assert!(dest.is_dir());
        assert_eq!(stats.files_copied, 1);
        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_dest_root_that_is_a_file_is_fatal() {
        let source = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let dest = scratch.path().join("plain");
        fs::write(&dest, "x").unwrap();

        let mirror = Mirror::new(source.path(), &dest).with_create_dest(true);
        assert!(matches!(mirror.synchronize(), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_kind_mismatch_dir_replaced_by_file() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(source.path().join("entry"), "now a file").unwrap();
        fs::create_dir(dest.path().join("entry")).unwrap();
        fs::write(dest.path().join("entry/inner.txt"), "old").unwrap();

        let stats = Mirror::new(source.path(), dest.path())
            .synchronize()
            .unwrap();

        assert_eq!(stats.dirs_deleted, 1);
        assert_eq!(stats.files_copied, 1);
        assert!(dest.path().join("entry").is_file());
        assert_eq!(fs::read(dest.path().join("entry")).unwrap(), b"now a file");
    }

    #[test]
    fn test_kind_mismatch_file_replaced_by_dir() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::create_dir(source.path().join("entry")).unwrap();
        fs::write(source.path().join("entry/inner.txt"), "new").unwrap();
        fs::write(dest.path().join("entry"), "was a file").unwrap();

        let stats = Mirror::new(source.path(), dest.path())
            .synchronize()
            .unwrap();

        assert_eq!(stats.files_deleted, 1);
        assert_eq!(stats.dirs_created, 1);
        assert!(dest.path().join("entry").is_dir());
        assert_eq!(
            fs::read(dest.path().join("entry/inner.txt")).unwrap(),
            b"new"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_in_source_is_skipped() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(source.path().join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink("real.txt", source.path().join("link")).unwrap();

        let stats = Mirror::new(source.path(), dest.path())
            .synchronize()
            .unwrap();

        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_copied, 1);
        assert!(!dest.path().join("link").exists());
        assert!(dest.path().join("real.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_skipped_source_entry_leaves_dest_counterpart() {
        // A symlink in source is skipped in phase 2, so phase 1 must not
        // prune whatever sits at that name in the destination
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(source.path().join("target"), "t").unwrap();
        std::os::unix::fs::symlink("target", source.path().join("link")).unwrap();
        fs::write(dest.path().join("link"), "stale but kept").unwrap();

        let stats = Mirror::new(source.path(), dest.path())
            .synchronize()
            .unwrap();

        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_deleted, 0);
        assert!(dest.path().join("link").is_file());
    }
}
