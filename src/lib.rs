//! Resumable train/validate orchestration
//!
//! This crate provides the checkpoint-and-resume lifecycle shared by
//! epoch-driven training runs, independent of any tensor runtime:
//! - Model lifecycle contract (named parameter buffers + persistent counters)
//! - Checkpoint store (atomic snapshots, retention rotation, integrity digests)
//! - Metric streams (cadence-sampled scalars, flushed at epoch boundaries)
//! - Orchestration loop (restore → baseline validation → train/validate/checkpoint)
//! - A concrete SGD reference runner with virtual-batch gradient accumulation
//!
//! Interrupting a run costs at most the epoch in flight: checkpoints are
//! written strictly after each epoch's validation, and a re-run restores the
//! last persisted epoch and redoes the rest.
//!
//! # Example
//!
//! ```no_run
//! use ndarray::{Array1, Array2};
//! use reanudar::{InMemoryDataSource, ModelState, RunConfig, SgdRunner, TrainLoop};
//!
//! let config = RunConfig::new()
//!     .with_learning_rate(1e-2)
//!     .with_num_epochs(10)
//!     .with_checkpoint_dir("checkpoints")
//!     .with_batch_sizes(32, 32);
//!
//! let model = ModelState::new(SgdRunner::initial_params(4));
//! let data = InMemoryDataSource::new(
//!     Array2::zeros((128, 4)),
//!     Array1::zeros(128),
//!     Array2::zeros((32, 4)),
//!     Array1::zeros(32),
//! )
//! .with_batch_sizes(config.train_batch_size, config.val_batch_size);
//!
//! let mut train_loop = TrainLoop::new(model, SgdRunner::new(), data, config);
//! let result = train_loop.run()?;
//! println!(
//!     "epoch {} after {} cycles, val loss {:?}",
//!     result.final_epoch, result.epochs_run, result.final_val_loss
//! );
//! # Ok::<(), reanudar::Error>(())
//! ```

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model;
pub mod train;

pub use checkpoint::{CheckpointRecord, CheckpointStore};
pub use config::{BaselinePolicy, RunConfig};
pub use data::{Batch, DataMode, DataSource, InMemoryDataSource};
pub use error::{Error, Result};
pub use metrics::{MetricLogger, MetricsTracker, ScalarEvent};
pub use model::ModelState;
pub use train::{
    EpochContext, EpochRunner, EpochSummary, Phase, RunResult, SgdRunner, TrainLoop, WEIGHTS,
};
