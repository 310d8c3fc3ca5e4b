//! Serialized checkpoint snapshots

use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Current on-disk record layout version
pub const FORMAT_VERSION: u32 = 1;

/// One persisted snapshot of parameters and lifecycle counters
///
/// The digest covers the parameter payload and is verified on load, so a
/// truncated or bit-flipped record is rejected instead of partially applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// On-disk layout version
    pub format_version: u32,
    /// Wall-clock time the record was written
    pub saved_at: DateTime<Utc>,
    /// Last fully completed training epoch
    pub current_epoch: u64,
    /// Parameter updates applied so far
    pub global_step: u64,
    /// Named parameter buffers
    pub params: Vec<(String, Array1<f32>)>,
    /// SHA-256 over the parameter payload
    pub digest: String,
}

impl CheckpointRecord {
    /// Build a record for the given counters and parameter buffers
    pub fn new(current_epoch: u64, global_step: u64, params: Vec<(String, Array1<f32>)>) -> Self {
        let digest = Self::compute_digest(&params);
        Self {
            format_version: FORMAT_VERSION,
            saved_at: Utc::now(),
            current_epoch,
            global_step,
            params,
            digest,
        }
    }

    /// Whether the stored digest matches the parameter payload
    pub fn digest_matches(&self) -> bool {
        self.digest == Self::compute_digest(&self.params)
    }

    fn compute_digest(params: &[(String, Array1<f32>)]) -> String {
        let mut hasher = Sha256::new();
        for (name, buf) in params {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            for v in buf {
                hasher.update(v.to_le_bytes());
            }
        }
        format!("sha256-{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_params() -> Vec<(String, Array1<f32>)> {
        vec![
            ("weights".to_string(), array![1.0, 2.0, 3.0]),
            ("bias".to_string(), array![0.5]),
        ]
    }

    #[test]
    fn test_record_digest_round_trip() {
        let record = CheckpointRecord::new(3, 120, sample_params());
        assert_eq!(record.format_version, FORMAT_VERSION);
        assert!(record.digest.starts_with("sha256-"));
        assert!(record.digest_matches());
    }

    #[test]
    fn test_tampered_payload_fails_digest() {
        let mut record = CheckpointRecord::new(1, 10, sample_params());
        record.params[0].1[0] = 99.0;
        assert!(!record.digest_matches());
    }

    #[test]
    fn test_digest_sensitive_to_names() {
        let a = CheckpointRecord::new(0, 0, vec![("w".to_string(), array![1.0])]);
        let b = CheckpointRecord::new(0, 0, vec![("v".to_string(), array![1.0])]);
        assert_ne!(a.digest, b.digest);
    }

    #[test]
    fn test_serde_round_trip() {
        let record = CheckpointRecord::new(2, 40, sample_params());
        let json = serde_json::to_string(&record).unwrap();
        let back: CheckpointRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.current_epoch, 2);
        assert_eq!(back.global_step, 40);
        assert_eq!(back.params, record.params);
        assert!(back.digest_matches());
    }
}
