//! replisync - one-way directory mirroring.
//!
//! Mirrors a source tree onto a destination tree: after a run the destination
//! holds exactly the files and directories of the source, with identical
//! content, and nothing else. Change detection is digest-based (streamed
//! BLAKE3), reconciliation is a two-phase prune-then-materialize pass per
//! directory, and an optional fixed-interval scheduler re-runs the pass with
//! a single-flight guarantee.

pub mod cli;
pub mod error;
pub mod hash;
pub mod schedule;
pub mod sync;

pub use error::{Result, SyncError};
pub use schedule::Scheduler;
pub use sync::{Mirror, SyncStats};
