//! Model lifecycle contract
//!
//! `ModelState` decouples the orchestration loop from any concrete
//! architecture: a model is a set of named parameter buffers plus the two
//! lifecycle counters the loop persists and restores. Counters are ordinary
//! fields serialized into the checkpoint record alongside the weights, so
//! both are restored consistently or not at all.

use crate::checkpoint::{CheckpointRecord, CheckpointStore};
use crate::error::{Error, Result};
use ndarray::Array1;
use std::path::PathBuf;

/// Named parameter buffers plus lifecycle counters
///
/// Counters are mutated only by the trainer driving the loop:
/// `current_epoch` once per completed training epoch, `global_step` once per
/// applied parameter update.
#[derive(Clone, Debug)]
pub struct ModelState {
    params: Vec<(String, Array1<f32>)>,
    global_step: u64,
    current_epoch: u64,
}

impl ModelState {
    /// Create a model with freshly initialized parameters and zeroed counters
    pub fn new(params: Vec<(String, Array1<f32>)>) -> Self {
        Self { params, global_step: 0, current_epoch: 0 }
    }

    /// All parameter buffers, in declaration order
    pub fn params(&self) -> &[(String, Array1<f32>)] {
        &self.params
    }

    /// Look up a parameter buffer by name
    pub fn param(&self, name: &str) -> Option<&Array1<f32>> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, buf)| buf)
    }

    /// Look up a parameter buffer by name, mutably
    pub fn param_mut(&mut self, name: &str) -> Option<&mut Array1<f32>> {
        self.params.iter_mut().find(|(n, _)| n == name).map(|(_, buf)| buf)
    }

    /// Parameter updates applied so far; used for log alignment only
    pub fn global_step(&self) -> u64 {
        self.global_step
    }

    /// Last fully completed training epoch
    pub fn current_epoch(&self) -> u64 {
        self.current_epoch
    }

    /// Advance the step counter after an applied parameter update
    pub fn increment_global_step(&mut self) {
        self.global_step += 1;
    }

    /// Advance the epoch counter after a successfully completed training epoch
    pub fn increment_current_epoch(&mut self) {
        self.current_epoch += 1;
    }

    /// Restore weights and counters from the latest checkpoint, if any
    ///
    /// Returns `Ok(false)` when the store is empty: parameters stay freshly
    /// initialized and counters stay at zero, the expected state of a fresh
    /// run. A corrupt or incompatible record is fatal and leaves the live
    /// model untouched.
    pub fn restore(&mut self, store: &CheckpointStore) -> Result<bool> {
        let Some(record) = store.latest()? else {
            return Ok(false);
        };
        self.apply(record)?;
        Ok(true)
    }

    /// Write current weights and counters as a new checkpoint
    pub fn save(&self, store: &CheckpointStore) -> Result<PathBuf> {
        let record =
            CheckpointRecord::new(self.current_epoch, self.global_step, self.params.clone());
        store.save(&record)
    }

    /// Apply a verified record, all-or-nothing
    fn apply(&mut self, record: CheckpointRecord) -> Result<()> {
        if record.params.len() != self.params.len() {
            return Err(Error::IncompatibleCheckpoint(format!(
                "record has {} parameters, model has {}",
                record.params.len(),
                self.params.len()
            )));
        }
        for ((name, buf), (rec_name, rec_buf)) in self.params.iter().zip(&record.params) {
            if name != rec_name {
                return Err(Error::IncompatibleCheckpoint(format!(
                    "parameter name mismatch: expected '{name}', record has '{rec_name}'"
                )));
            }
            if buf.len() != rec_buf.len() {
                return Err(Error::IncompatibleCheckpoint(format!(
                    "parameter '{name}' has {} elements, record has {}",
                    buf.len(),
                    rec_buf.len()
                )));
            }
        }

        self.params = record.params;
        self.global_step = record.global_step;
        self.current_epoch = record.current_epoch;
        Ok(())
    }
}
