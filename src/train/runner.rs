//! Extension points implemented by concrete trainers
//!
//! The base loop is architecture-agnostic: it owns restore/validate/checkpoint
//! ordering and hands per-batch iteration to an `EpochRunner`.

use crate::config::RunConfig;
use crate::data::DataSource;
use crate::error::Result;
use crate::metrics::MetricLogger;
use crate::model::ModelState;

/// State handed to an epoch pass
///
/// `data` is already switched to the phase's stream, and `logger` points at
/// the phase's metric sink.
pub struct EpochContext<'a> {
    /// Parameters and lifecycle counters
    pub model: &'a mut ModelState,
    /// Batch producer, re-armed for this phase
    pub data: &'a mut dyn DataSource,
    /// Metric sink for this phase
    pub logger: &'a mut MetricLogger,
    /// Run configuration
    pub config: &'a RunConfig,
    /// 1-based number of the epoch being run; the baseline validation pass
    /// reuses the last completed epoch's number
    pub epoch: u64,
}

/// Aggregate result of one epoch pass
#[derive(Clone, Copy, Debug)]
pub struct EpochSummary {
    /// Mean loss over the epoch's batches (0.0 for an empty epoch)
    pub mean_loss: f32,
    /// Batches processed
    pub batches: usize,
}

/// Per-epoch behavior of a concrete trainer
///
/// Both passes are required operations; the loop has no fallback for either.
/// A training pass processes every batch of the training stream and applies
/// parameter updates. A validation pass computes evaluation metrics only and
/// must never update parameters.
pub trait EpochRunner {
    /// Register metric cadences with the phase sinks; called once at loop
    /// construction, before any I/O happens
    fn register_metrics(&self, _train: &mut MetricLogger, _val: &mut MetricLogger) {}

    /// One full pass over the training set, applying parameter updates
    fn run_training_epoch(&mut self, ctx: EpochContext<'_>) -> Result<EpochSummary>;

    /// One full pass over the validation set, metrics only
    fn run_validation_epoch(&mut self, ctx: EpochContext<'_>) -> Result<EpochSummary>;
}
