//! Trainer orchestration loop
//!
//! This module drives the epoch lifecycle:
//! - `Phase` state machine over the run
//! - `EpochRunner` extension points implemented by concrete trainers
//! - `TrainLoop` restore → validate → train/validate/checkpoint orchestration
//! - `RunResult` summary of a completed run
//! - `SgdRunner`, a concrete least-squares runner with virtual-batch
//!   gradient accumulation
//!
//! # Example
//!
//! ```no_run
//! use ndarray::{Array1, Array2};
//! use reanudar::{InMemoryDataSource, ModelState, RunConfig, SgdRunner, TrainLoop};
//!
//! let config = RunConfig::new().with_num_epochs(5).with_batch_sizes(8, 8);
//! let model = ModelState::new(SgdRunner::initial_params(3));
//! let data = InMemoryDataSource::new(
//!     Array2::zeros((32, 3)),
//!     Array1::zeros(32),
//!     Array2::zeros((8, 3)),
//!     Array1::zeros(8),
//! )
//! .with_batch_sizes(config.train_batch_size, config.val_batch_size);
//!
//! let mut train_loop = TrainLoop::new(model, SgdRunner::new(), data, config);
//! let result = train_loop.run()?;
//! println!("finished at epoch {}", result.final_epoch);
//! # Ok::<(), reanudar::Error>(())
//! ```

mod phase;
mod result;
mod runner;
mod sgd;
mod train_loop;

pub use phase::Phase;
pub use result::RunResult;
pub use runner::{EpochContext, EpochRunner, EpochSummary};
pub use sgd::{SgdRunner, WEIGHTS};
pub use train_loop::TrainLoop;
