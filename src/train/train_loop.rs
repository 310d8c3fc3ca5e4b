//! The restore → validate → train/validate/checkpoint orchestration loop

use super::phase::Phase;
use super::result::RunResult;
use super::runner::{EpochContext, EpochRunner};
use crate::checkpoint::CheckpointStore;
use crate::config::{BaselinePolicy, RunConfig};
use crate::data::{DataMode, DataSource};
use crate::error::Result;
use crate::metrics::{MetricLogger, MetricsTracker};
use crate::model::ModelState;
use std::time::Instant;

/// Drives the train→validate→checkpoint cycle with resume support
///
/// The loop owns the model, the data source, the checkpoint store, and one
/// metric sink per phase; everything is acquired at construction and released
/// when the loop is dropped. Epoch semantics are at-least-once: a failure
/// during either pass aborts the run before the epoch's checkpoint is
/// written, so a re-run restores the last persisted epoch and redoes the
/// failed one entirely.
pub struct TrainLoop<R: EpochRunner, D: DataSource> {
    runner: R,
    model: ModelState,
    data: D,
    store: CheckpointStore,
    train_logger: MetricLogger,
    val_logger: MetricLogger,
    /// In-memory history for the current run
    pub metrics: MetricsTracker,
    config: RunConfig,
    phase: Phase,
}

impl<R: EpochRunner, D: DataSource> TrainLoop<R, D> {
    /// Create a loop over freshly allocated model state
    pub fn new(model: ModelState, runner: R, data: D, config: RunConfig) -> Self {
        let store =
            CheckpointStore::new(&config.checkpoint_dir).with_retention(config.keep_checkpoints);
        let mut train_logger = MetricLogger::new(&config.train_log_dir);
        let mut val_logger = MetricLogger::new(&config.val_log_dir);
        runner.register_metrics(&mut train_logger, &mut val_logger);

        Self {
            runner,
            model,
            data,
            store,
            train_logger,
            val_logger,
            metrics: MetricsTracker::new(),
            config,
            phase: Phase::Uninitialized,
        }
    }

    /// Current state of the run
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The driven model
    pub fn model(&self) -> &ModelState {
        &self.model
    }

    /// The run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run until the epoch counter reaches `num_epochs`
    ///
    /// Restores the latest checkpoint first (an empty store means a fresh
    /// start), optionally runs a baseline validation pass so epoch-0 metrics
    /// are comparable across resumed runs, then cycles
    /// train → validate → checkpoint. The checkpoint for an epoch is written
    /// strictly after that epoch's validation metrics are computed.
    pub fn run(&mut self) -> Result<RunResult> {
        let started = Instant::now();

        self.phase = Phase::Restoring;
        let resumed = self.model.restore(&self.store)?;
        let start_epoch = self.model.current_epoch();

        let mut final_train_loss = None;
        let mut final_val_loss = None;

        let run_baseline = match self.config.baseline_validation {
            BaselinePolicy::Always => true,
            BaselinePolicy::FreshStartOnly => !resumed,
            BaselinePolicy::Never => false,
        };
        if run_baseline {
            let summary = self.validation_pass(start_epoch)?;
            self.metrics.record_val_loss(summary.mean_loss);
            final_val_loss = Some(summary.mean_loss);
            self.val_logger.flush()?;
        }

        while self.model.current_epoch() < self.config.num_epochs {
            let epoch = self.model.current_epoch() + 1;

            self.phase = Phase::TrainingEpoch;
            self.data.switch_to(DataMode::Train);
            let train = self.runner.run_training_epoch(EpochContext {
                model: &mut self.model,
                data: &mut self.data,
                logger: &mut self.train_logger,
                config: &self.config,
                epoch,
            })?;
            self.model.increment_current_epoch();

            let val = self.validation_pass(epoch)?;

            // epoch boundary: flush sinks, record history, then persist
            self.train_logger.flush()?;
            self.val_logger.flush()?;
            self.metrics.record_epoch(train.mean_loss, self.config.learning_rate);
            self.metrics.record_val_loss(val.mean_loss);
            final_train_loss = Some(train.mean_loss);
            final_val_loss = Some(val.mean_loss);

            self.model.save(&self.store)?;
        }

        self.phase = Phase::Done;
        let final_epoch = self.model.current_epoch();
        Ok(RunResult {
            resumed,
            start_epoch,
            final_epoch,
            epochs_run: final_epoch - start_epoch,
            final_train_loss,
            final_val_loss,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }

    fn validation_pass(&mut self, epoch: u64) -> Result<super::runner::EpochSummary> {
        self.phase = Phase::ValidatingEpoch;
        self.data.switch_to(DataMode::Validation);
        self.runner.run_validation_epoch(EpochContext {
            model: &mut self.model,
            data: &mut self.data,
            logger: &mut self.val_logger,
            config: &self.config,
            epoch,
        })
    }
}
