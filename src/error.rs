//! Crate-wide error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the training lifecycle
///
/// A missing checkpoint is deliberately NOT an error: restoring from an empty
/// store is the expected state of a fresh run and reports success.
#[derive(Debug, Error)]
pub enum Error {
    /// Checkpoint file exists but cannot be decoded, or its parameter digest
    /// does not match the payload
    #[error("corrupt checkpoint {path}: {reason}")]
    CorruptCheckpoint { path: PathBuf, reason: String },

    /// Checkpoint decoded cleanly but does not fit the live model
    #[error("incompatible checkpoint: {0}")]
    IncompatibleCheckpoint(String),

    /// Numeric divergence during a training or validation pass
    #[error("non-finite loss during {phase} at step {step}")]
    NonFiniteLoss { phase: &'static str, step: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;
