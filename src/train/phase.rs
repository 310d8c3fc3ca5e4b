//! Loop state machine

use std::fmt;

/// Lifecycle states of a training run
///
/// A run moves `Uninitialized → Restoring`, loops between `TrainingEpoch` and
/// `ValidatingEpoch`, and ends in `Done` once the epoch counter reaches the
/// configured bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Parameters freshly allocated, nothing restored yet
    Uninitialized,
    /// Loading the latest checkpoint, if any
    Restoring,
    /// One full pass over the training set, applying updates
    TrainingEpoch,
    /// One full pass over the validation set, metrics only
    ValidatingEpoch,
    /// The epoch counter reached the configured bound
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Restoring.to_string(), "Restoring");
        assert_eq!(Phase::ValidatingEpoch.to_string(), "ValidatingEpoch");
    }
}
