//! Concrete least-squares runner with virtual-batch gradient accumulation

use super::runner::{EpochContext, EpochRunner, EpochSummary};
use crate::data::Batch;
use crate::error::{Error, Result};
use crate::metrics::MetricLogger;
use crate::model::ModelState;
use ndarray::Array1;

/// Name of the weight buffer the runner trains
pub const WEIGHTS: &str = "weights";

/// Linear least-squares trainer
///
/// Fits `targets ≈ inputs · weights` with plain SGD. Gradients accumulate
/// across `virtual_batch_size_factor` physical batches before each weight
/// update, emulating a larger batch under memory constraints; the trailing
/// partial window still produces an update. `global_step` advances once per
/// applied update.
pub struct SgdRunner {
    /// Absolute-error tolerance for the accuracy scalar
    tolerance: f32,
}

impl SgdRunner {
    /// Create a runner with the default accuracy tolerance
    pub fn new() -> Self {
        Self { tolerance: 0.5 }
    }

    /// Set the absolute-error tolerance used for the accuracy scalar
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Parameter buffers for a fresh linear model of the given input width
    pub fn initial_params(dim: usize) -> Vec<(String, Array1<f32>)> {
        vec![(WEIGHTS.to_string(), Array1::zeros(dim))]
    }

    fn forward(weights: &Array1<f32>, batch: &Batch) -> Array1<f32> {
        batch.inputs.dot(weights)
    }

    fn mse(predictions: &Array1<f32>, targets: &Array1<f32>) -> f32 {
        let diff = predictions - targets;
        diff.mapv(|d| d * d).mean().unwrap_or(0.0)
    }

    fn accuracy(&self, predictions: &Array1<f32>, targets: &Array1<f32>) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let correct = predictions
            .iter()
            .zip(targets)
            .filter(|(p, t)| (*p - *t).abs() <= self.tolerance)
            .count();
        correct as f32 / targets.len() as f32
    }

    /// Mean gradient of the batch loss with respect to the weights
    fn gradient(weights: &Array1<f32>, batch: &Batch) -> Array1<f32> {
        let residual = Self::forward(weights, batch) - &batch.targets;
        let n = batch.targets.len().max(1) as f32;
        batch.inputs.t().dot(&residual) * (2.0 / n)
    }

    fn require_weights(model: &ModelState) {
        assert!(
            model.param(WEIGHTS).is_some(),
            "SgdRunner requires a '{WEIGHTS}' parameter buffer"
        );
    }

    fn collect_batches(ctx: &mut EpochContext<'_>) -> Vec<Batch> {
        let mut batches = Vec::new();
        while let Some(batch) = ctx.data.next_batch() {
            batches.push(batch);
        }
        batches
    }
}

impl Default for SgdRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl EpochRunner for SgdRunner {
    fn register_metrics(&self, train: &mut MetricLogger, val: &mut MetricLogger) {
        train.register_scalar("loss", 10);
        train.register_scalar("accuracy", 10);
        val.register_scalar("loss", 10);
        val.register_scalar("accuracy", 10);
    }

    fn run_training_epoch(&mut self, mut ctx: EpochContext<'_>) -> Result<EpochSummary> {
        Self::require_weights(ctx.model);

        let factor = ctx.config.virtual_batch_size_factor.max(1);
        let lr = ctx.config.learning_rate;

        let batches = Self::collect_batches(&mut ctx);
        let steps_per_epoch = batches.len();

        let dim = ctx.model.param(WEIGHTS).map(|w| w.len()).unwrap_or(0);
        let mut grad_accum: Array1<f32> = Array1::zeros(dim);
        let mut window = 0usize;
        let mut total_loss = 0.0;
        let mut window_loss = 0.0;
        let mut window_accuracy = 0.0;

        for (step, batch) in batches.iter().enumerate() {
            let weights = ctx.model.param(WEIGHTS).unwrap();
            let predictions = Self::forward(weights, batch);
            let loss = Self::mse(&predictions, &batch.targets);
            if !loss.is_finite() {
                return Err(Error::NonFiniteLoss {
                    phase: "training",
                    step: ctx.model.global_step(),
                });
            }

            grad_accum += &Self::gradient(weights, batch);
            window += 1;
            total_loss += loss;
            window_loss += loss;
            window_accuracy += self.accuracy(&predictions, &batch.targets);

            let is_window_boundary = (step + 1).is_multiple_of(factor);
            let is_last_batch = step + 1 == steps_per_epoch;
            if is_window_boundary || is_last_batch {
                let scale = lr / window as f32;
                ctx.model.param_mut(WEIGHTS).unwrap().scaled_add(-scale, &grad_accum);
                ctx.model.increment_global_step();

                let step_now = ctx.model.global_step();
                ctx.logger.record("loss", window_loss / window as f32, step_now);
                ctx.logger.record("accuracy", window_accuracy / window as f32, step_now);

                grad_accum.fill(0.0);
                window = 0;
                window_loss = 0.0;
                window_accuracy = 0.0;
            }
        }

        let mean_loss =
            if steps_per_epoch > 0 { total_loss / steps_per_epoch as f32 } else { 0.0 };
        Ok(EpochSummary { mean_loss, batches: steps_per_epoch })
    }

    fn run_validation_epoch(&mut self, mut ctx: EpochContext<'_>) -> Result<EpochSummary> {
        Self::require_weights(ctx.model);

        let batches = Self::collect_batches(&mut ctx);
        let mut total_loss = 0.0;
        let mut total_accuracy = 0.0;

        for batch in &batches {
            let weights = ctx.model.param(WEIGHTS).unwrap();
            let predictions = Self::forward(weights, batch);
            let loss = Self::mse(&predictions, &batch.targets);
            if !loss.is_finite() {
                return Err(Error::NonFiniteLoss {
                    phase: "validation",
                    step: ctx.model.global_step(),
                });
            }
            total_loss += loss;
            total_accuracy += self.accuracy(&predictions, &batch.targets);
        }

        let count = batches.len();
        let mean_loss = if count > 0 { total_loss / count as f32 } else { 0.0 };
        let mean_accuracy = if count > 0 { total_accuracy / count as f32 } else { 0.0 };

        let step_now = ctx.model.global_step();
        ctx.logger.record("loss", mean_loss, step_now);
        ctx.logger.record("accuracy", mean_accuracy, step_now);

        Ok(EpochSummary { mean_loss, batches: count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::data::{DataMode, DataSource, InMemoryDataSource};
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    /// y = 2x over a handful of one-dimensional samples
    fn linear_source(batch_size: usize) -> InMemoryDataSource {
        let inputs = Array2::from_shape_vec((8, 1), (1..=8).map(|i| i as f32).collect()).unwrap();
        let targets = inputs.column(0).mapv(|x| 2.0 * x);
        InMemoryDataSource::new(inputs.clone(), targets.clone(), inputs, targets)
            .with_batch_sizes(batch_size, batch_size)
    }

    fn run_one_training_epoch(
        model: &mut ModelState,
        data: &mut InMemoryDataSource,
        config: &RunConfig,
    ) -> EpochSummary {
        let mut runner = SgdRunner::new();
        let mut logger = MetricLogger::new(std::env::temp_dir().join("unused"));
        data.switch_to(DataMode::Train);
        runner
            .run_training_epoch(EpochContext {
                model,
                data,
                logger: &mut logger,
                config,
                epoch: 1,
            })
            .unwrap()
    }

    #[test]
    fn test_training_reduces_loss() {
        let config = RunConfig::new().with_learning_rate(0.01).with_virtual_batches(2, 1);
        let mut model = ModelState::new(SgdRunner::initial_params(1));
        let mut data = linear_source(2);

        let first = run_one_training_epoch(&mut model, &mut data, &config);
        let second = run_one_training_epoch(&mut model, &mut data, &config);

        assert!(first.mean_loss > second.mean_loss);
        assert_eq!(first.batches, 4);
    }

    #[test]
    fn test_global_step_counts_updates_not_batches() {
        let config = RunConfig::new().with_learning_rate(0.001).with_virtual_batches(2, 2);
        let mut model = ModelState::new(SgdRunner::initial_params(1));
        let mut data = linear_source(2);

        run_one_training_epoch(&mut model, &mut data, &config);

        // 4 physical batches, accumulation factor 2: two updates
        assert_eq!(model.global_step(), 2);
    }

    #[test]
    fn test_trailing_partial_window_still_updates() {
        let config = RunConfig::new().with_learning_rate(0.001).with_virtual_batches(2, 3);
        let mut model = ModelState::new(SgdRunner::initial_params(1));
        let mut data = linear_source(2);

        run_one_training_epoch(&mut model, &mut data, &config);

        // 4 batches at factor 3: one full window and one partial
        assert_eq!(model.global_step(), 2);
    }

    #[test]
    fn test_validation_never_updates_parameters() {
        let config = RunConfig::new();
        let mut model = ModelState::new(SgdRunner::initial_params(1));
        model.param_mut(WEIGHTS).unwrap()[0] = 1.5;
        let mut data = linear_source(4);
        let mut runner = SgdRunner::new();
        let mut logger = MetricLogger::new(std::env::temp_dir().join("unused"));

        data.switch_to(DataMode::Validation);
        let summary = runner
            .run_validation_epoch(EpochContext {
                model: &mut model,
                data: &mut data,
                logger: &mut logger,
                config: &config,
                epoch: 1,
            })
            .unwrap();

        assert!(summary.mean_loss > 0.0);
        assert_eq!(model.param(WEIGHTS).unwrap()[0], 1.5);
        assert_eq!(model.global_step(), 0);
    }

    #[test]
    fn test_non_finite_loss_is_fatal() {
        let config = RunConfig::new();
        let mut model = ModelState::new(SgdRunner::initial_params(1));
        let inputs = array![[1.0]];
        let targets = array![f32::INFINITY];
        let mut data = InMemoryDataSource::new(inputs.clone(), targets.clone(), inputs, targets)
            .with_batch_sizes(1, 1);
        let mut runner = SgdRunner::new();
        let mut logger = MetricLogger::new(std::env::temp_dir().join("unused"));

        data.switch_to(DataMode::Train);
        let result = runner.run_training_epoch(EpochContext {
            model: &mut model,
            data: &mut data,
            logger: &mut logger,
            config: &config,
            epoch: 1,
        });
        assert!(matches!(result, Err(Error::NonFiniteLoss { phase: "training", .. })));
    }

    #[test]
    fn test_empty_epoch_reports_zero_loss() {
        let config = RunConfig::new();
        let mut model = ModelState::new(SgdRunner::initial_params(1));
        let mut data = InMemoryDataSource::new(
            Array2::zeros((0, 1)),
            Array1::zeros(0),
            Array2::zeros((0, 1)),
            Array1::zeros(0),
        );
        let mut runner = SgdRunner::new();
        let mut logger = MetricLogger::new(std::env::temp_dir().join("unused"));

        data.switch_to(DataMode::Train);
        let summary = runner
            .run_training_epoch(EpochContext {
                model: &mut model,
                data: &mut data,
                logger: &mut logger,
                config: &config,
                epoch: 1,
            })
            .unwrap();
        assert_eq!(summary.batches, 0);
        assert_eq!(summary.mean_loss, 0.0);
    }

    #[test]
    #[should_panic(expected = "requires a 'weights' parameter buffer")]
    fn test_missing_weight_buffer_is_fatal_at_first_use() {
        let config = RunConfig::new();
        let mut model = ModelState::new(vec![("other".to_string(), array![0.0])]);
        let mut data = linear_source(2);
        let mut runner = SgdRunner::new();
        let mut logger = MetricLogger::new(std::env::temp_dir().join("unused"));

        data.switch_to(DataMode::Train);
        let _ = runner.run_training_epoch(EpochContext {
            model: &mut model,
            data: &mut data,
            logger: &mut logger,
            config: &config,
            epoch: 1,
        });
    }

    #[test]
    fn test_accuracy_tolerance() {
        let runner = SgdRunner::new().with_tolerance(0.1);
        let predictions = array![1.0, 2.0, 3.0, 10.0];
        let targets = array![1.05, 2.5, 3.0, 9.0];
        assert_abs_diff_eq!(runner.accuracy(&predictions, &targets), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_convergence_on_linear_data() {
        let config = RunConfig::new().with_learning_rate(0.01).with_virtual_batches(2, 1);
        let mut model = ModelState::new(SgdRunner::initial_params(1));
        let mut data = linear_source(2);

        for _ in 0..200 {
            run_one_training_epoch(&mut model, &mut data, &config);
        }

        assert_abs_diff_eq!(model.param(WEIGHTS).unwrap()[0], 2.0, epsilon = 1e-2);
    }
}
