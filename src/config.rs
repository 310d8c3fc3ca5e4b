//! Run configuration
//!
//! The original experiments configured these knobs through a process-global
//! flags registry. Here they are an immutable value built once and handed to
//! the loop and runner at construction.

use std::path::PathBuf;

/// Policy for the validation pass performed before the epoch loop starts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BaselinePolicy {
    /// Run one validation pass at the start of every run, fresh or resumed,
    /// so epoch-0 metrics stay comparable across resumed runs
    #[default]
    Always,
    /// Run the baseline pass only when no checkpoint was restored
    FreshStartOnly,
    /// Skip the baseline pass
    Never,
}

/// Immutable configuration for a training run
///
/// # Example
///
/// ```
/// use reanudar::RunConfig;
///
/// let config = RunConfig::new()
///     .with_learning_rate(1e-3)
///     .with_num_epochs(20)
///     .with_virtual_batches(32, 8);
/// assert_eq!(config.num_epochs, 20);
/// ```
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Optimizer step size
    pub learning_rate: f32,
    /// Number of epochs to train for
    pub num_epochs: u64,
    /// Metric sink for training summaries
    pub train_log_dir: PathBuf,
    /// Metric sink for validation summaries
    pub val_log_dir: PathBuf,
    /// Checkpoint store location
    pub checkpoint_dir: PathBuf,
    /// Keep only the newest N checkpoints (`None` keeps all)
    pub keep_checkpoints: Option<usize>,
    /// Samples per batch fed through at once
    pub physical_batch_size: usize,
    /// Physical batches accumulated per weight update
    pub virtual_batch_size_factor: usize,
    /// Batch size for training epochs
    pub train_batch_size: usize,
    /// Batch size for validation epochs
    pub val_batch_size: usize,
    /// Baseline validation pass policy
    pub baseline_validation: BaselinePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-4,
            num_epochs: 10,
            train_log_dir: PathBuf::from("logs/train"),
            val_log_dir: PathBuf::from("logs/val"),
            checkpoint_dir: PathBuf::from("checkpoints"),
            keep_checkpoints: Some(5),
            physical_batch_size: 32,
            virtual_batch_size_factor: 8,
            train_batch_size: 256,
            val_batch_size: 256,
            baseline_validation: BaselinePolicy::default(),
        }
    }
}

impl RunConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the optimizer step size
    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Set the number of epochs to train for
    pub fn with_num_epochs(mut self, num_epochs: u64) -> Self {
        self.num_epochs = num_epochs;
        self
    }

    /// Set the training and validation metric sink directories
    pub fn with_log_dirs(mut self, train: impl Into<PathBuf>, val: impl Into<PathBuf>) -> Self {
        self.train_log_dir = train.into();
        self.val_log_dir = val.into();
        self
    }

    /// Set the checkpoint store directory
    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = dir.into();
        self
    }

    /// Set checkpoint retention (`None` keeps every checkpoint)
    pub fn with_keep_checkpoints(mut self, keep: Option<usize>) -> Self {
        self.keep_checkpoints = keep;
        self
    }

    /// Set virtual batch composition: samples per physical batch and physical
    /// batches accumulated per weight update
    pub fn with_virtual_batches(mut self, physical: usize, factor: usize) -> Self {
        debug_assert!(physical > 0 && factor > 0);
        self.physical_batch_size = physical;
        self.virtual_batch_size_factor = factor;
        self
    }

    /// Set per-phase batch sizes
    pub fn with_batch_sizes(mut self, train: usize, val: usize) -> Self {
        debug_assert!(train > 0 && val > 0);
        self.train_batch_size = train;
        self.val_batch_size = val;
        self
    }

    /// Set the baseline validation policy
    pub fn with_baseline(mut self, policy: BaselinePolicy) -> Self {
        self.baseline_validation = policy;
        self
    }
}
