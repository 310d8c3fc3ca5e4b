//! Data source contract
//!
//! The trainer treats data as an external producer: switch the source between
//! the training and validation streams, then pull batches until the stream
//! ends. Making repeated epoch passes deterministic and resettable is the
//! source's responsibility; `switch_to` re-arms the stream from the start.

use ndarray::{s, Array1, Array2};

/// Which stream a data source currently serves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataMode {
    Train,
    Validation,
}

/// A batch of samples: one row of `inputs` per sample
#[derive(Clone, Debug)]
pub struct Batch {
    /// Input features, one row per sample
    pub inputs: Array2<f32>,
    /// Target values, one per sample
    pub targets: Array1<f32>,
}

impl Batch {
    /// Create a new batch
    pub fn new(inputs: Array2<f32>, targets: Array1<f32>) -> Self {
        debug_assert_eq!(inputs.nrows(), targets.len());
        Self { inputs, targets }
    }

    /// Number of samples in the batch
    pub fn size(&self) -> usize {
        self.targets.len()
    }
}

/// Pull-based producer of batches with an atomic phase switch
pub trait DataSource {
    /// Switch the stream between phases, re-arming it from the start
    fn switch_to(&mut self, mode: DataMode);

    /// Pull the next batch; `None` ends the current phase
    fn next_batch(&mut self) -> Option<Batch>;
}

/// Deterministic in-memory source backed by fixed sample sets
///
/// Slices each sample set into consecutive batches of the configured per-phase
/// size (the final batch may be short). Batch order is fixed, so repeated
/// passes over either stream are identical.
pub struct InMemoryDataSource {
    train_inputs: Array2<f32>,
    train_targets: Array1<f32>,
    val_inputs: Array2<f32>,
    val_targets: Array1<f32>,
    train_batch_size: usize,
    val_batch_size: usize,
    mode: DataMode,
    cursor: usize,
}

impl InMemoryDataSource {
    /// Create a source over fixed training and validation sample sets
    pub fn new(
        train_inputs: Array2<f32>,
        train_targets: Array1<f32>,
        val_inputs: Array2<f32>,
        val_targets: Array1<f32>,
    ) -> Self {
        debug_assert_eq!(train_inputs.nrows(), train_targets.len());
        debug_assert_eq!(val_inputs.nrows(), val_targets.len());
        Self {
            train_inputs,
            train_targets,
            val_inputs,
            val_targets,
            train_batch_size: 256,
            val_batch_size: 256,
            mode: DataMode::Train,
            cursor: 0,
        }
    }

    /// Set per-phase batch sizes (typically taken from the run config)
    pub fn with_batch_sizes(mut self, train: usize, val: usize) -> Self {
        debug_assert!(train > 0 && val > 0);
        self.train_batch_size = train;
        self.val_batch_size = val;
        self
    }

    /// Number of samples in the stream for `mode`
    pub fn num_samples(&self, mode: DataMode) -> usize {
        match mode {
            DataMode::Train => self.train_targets.len(),
            DataMode::Validation => self.val_targets.len(),
        }
    }
}

impl DataSource for InMemoryDataSource {
    fn switch_to(&mut self, mode: DataMode) {
        self.mode = mode;
        self.cursor = 0;
    }

    fn next_batch(&mut self) -> Option<Batch> {
        let (inputs, targets, batch_size) = match self.mode {
            DataMode::Train => (&self.train_inputs, &self.train_targets, self.train_batch_size),
            DataMode::Validation => (&self.val_inputs, &self.val_targets, self.val_batch_size),
        };

        if self.cursor >= targets.len() {
            return None;
        }

        let end = (self.cursor + batch_size).min(targets.len());
        let batch = Batch::new(
            inputs.slice(s![self.cursor..end, ..]).to_owned(),
            targets.slice(s![self.cursor..end]).to_owned(),
        );
        self.cursor = end;
        Some(batch)
    }
}
