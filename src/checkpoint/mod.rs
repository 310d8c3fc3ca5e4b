//! Checkpoint persistence
//!
//! A checkpoint is an immutable-at-write-time snapshot of all parameter
//! buffers plus the two lifecycle counters, identified by the epoch at which
//! it was written. Records are written atomically (temp file + rename) and
//! never mutated afterwards, only superseded by a newer record.

mod record;
mod store;

pub use record::{CheckpointRecord, FORMAT_VERSION};
pub use store::CheckpointStore;
