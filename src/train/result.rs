//! Run result types

/// Summary of a completed run
#[derive(Clone, Debug)]
pub struct RunResult {
    /// Whether a checkpoint was restored at the start of the run
    pub resumed: bool,
    /// Epoch counter value after restore
    pub start_epoch: u64,
    /// Epoch counter value at the end of the run
    pub final_epoch: u64,
    /// Full train/validate/checkpoint cycles performed by this invocation
    pub epochs_run: u64,
    /// Mean training loss of the last completed epoch
    pub final_train_loss: Option<f32>,
    /// Mean validation loss of the last validation pass
    pub final_val_loss: Option<f32>,
    /// Wall-clock duration of the run in seconds
    pub elapsed_secs: f64,
}
