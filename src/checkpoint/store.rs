//! Directory-backed checkpoint store

use super::record::{CheckpointRecord, FORMAT_VERSION};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores checkpoint records as `checkpoint_epoch_{k}.json` files
///
/// An empty or absent directory is the expected state of a fresh run: `latest`
/// reports `Ok(None)` rather than an error. Writes go through a temp file in
/// the same directory followed by a rename, so a reader never observes a
/// partially written record.
#[derive(Clone, Debug)]
pub struct CheckpointStore {
    dir: PathBuf,
    keep: Option<usize>,
}

impl CheckpointStore {
    /// Create a store over the given directory, keeping every checkpoint
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), keep: None }
    }

    /// Keep only the newest `keep` checkpoints after each save
    pub fn with_retention(mut self, keep: Option<usize>) -> Self {
        self.keep = keep;
        self
    }

    /// Directory this store writes to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a checkpoint for `epoch` is stored at
    pub fn checkpoint_path(&self, epoch: u64) -> PathBuf {
        self.dir.join(format!("checkpoint_epoch_{epoch}.json"))
    }

    /// Write a record, superseding any prior record for the same epoch
    pub fn save(&self, record: &CheckpointRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let data = serde_json::to_string(record)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;

        let path = self.checkpoint_path(record.current_epoch);
        let tmp = self.dir.join(format!(".checkpoint_epoch_{}.tmp", record.current_epoch));
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;

        self.rotate()?;
        Ok(path)
    }

    /// Load the newest record, or `Ok(None)` when the store is empty
    pub fn latest(&self) -> Result<Option<CheckpointRecord>> {
        match self.epochs_on_disk()?.last() {
            Some((_, path)) => self.load(path).map(Some),
            None => Ok(None),
        }
    }

    /// Epoch of the newest record on disk, if any
    pub fn latest_epoch(&self) -> Result<Option<u64>> {
        Ok(self.epochs_on_disk()?.last().map(|(epoch, _)| *epoch))
    }

    /// Load and verify one record
    pub fn load(&self, path: &Path) -> Result<CheckpointRecord> {
        let content = fs::read_to_string(path)?;
        let record: CheckpointRecord = serde_json::from_str(&content).map_err(|e| {
            Error::CorruptCheckpoint { path: path.to_path_buf(), reason: e.to_string() }
        })?;

        if record.format_version != FORMAT_VERSION {
            return Err(Error::CorruptCheckpoint {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported format version {} (expected {FORMAT_VERSION})",
                    record.format_version
                ),
            });
        }
        if !record.digest_matches() {
            return Err(Error::CorruptCheckpoint {
                path: path.to_path_buf(),
                reason: "parameter digest mismatch".to_string(),
            });
        }
        Ok(record)
    }

    /// Records on disk, sorted by epoch ascending
    fn epochs_on_disk(&self) -> Result<Vec<(u64, PathBuf)>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut found = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            let Some(epoch) = name
                .strip_prefix("checkpoint_epoch_")
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|digits| digits.parse::<u64>().ok())
            else {
                continue;
            };
            found.push((epoch, path));
        }
        found.sort_by_key(|(epoch, _)| *epoch);
        Ok(found)
    }

    fn rotate(&self) -> Result<()> {
        let Some(keep) = self.keep else { return Ok(()) };
        let on_disk = self.epochs_on_disk()?;
        if on_disk.len() <= keep {
            return Ok(());
        }
        for (_, path) in &on_disk[..on_disk.len() - keep] {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    fn record(epoch: u64) -> CheckpointRecord {
        CheckpointRecord::new(epoch, epoch * 10, vec![("w".to_string(), array![1.0, 2.0])])
    }

    #[test]
    fn test_empty_store_is_not_an_error() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("never_created"));
        assert!(store.latest().unwrap().is_none());
        assert!(store.latest_epoch().unwrap().is_none());
    }

    #[test]
    fn test_save_then_latest_round_trip() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());

        let path = store.save(&record(3)).unwrap();
        assert_eq!(path, store.checkpoint_path(3));

        let loaded = store.latest().unwrap().unwrap();
        assert_eq!(loaded.current_epoch, 3);
        assert_eq!(loaded.global_step, 30);
        assert_eq!(loaded.params[0].1, array![1.0, 2.0]);
    }

    #[test]
    fn test_latest_picks_highest_epoch() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());

        store.save(&record(1)).unwrap();
        store.save(&record(10)).unwrap();
        store.save(&record(2)).unwrap();

        assert_eq!(store.latest_epoch().unwrap(), Some(10));
    }

    #[test]
    fn test_retention_deletes_oldest() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path()).with_retention(Some(2));

        for epoch in 1..=5 {
            store.save(&record(epoch)).unwrap();
        }

        assert!(!store.checkpoint_path(1).exists());
        assert!(!store.checkpoint_path(3).exists());
        assert!(store.checkpoint_path(4).exists());
        assert!(store.checkpoint_path(5).exists());
        assert_eq!(store.latest_epoch().unwrap(), Some(5));
    }

    #[test]
    fn test_corrupt_record_is_fatal() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        store.save(&record(1)).unwrap();

        fs::write(store.checkpoint_path(1), "{ not json").unwrap();
        assert!(matches!(store.latest(), Err(Error::CorruptCheckpoint { .. })));
    }

    #[test]
    fn test_tampered_payload_is_fatal() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        store.save(&record(1)).unwrap();

        let path = store.checkpoint_path(1);
        let tampered = fs::read_to_string(&path).unwrap().replace("1.0", "9.0");
        fs::write(&path, tampered).unwrap();

        match store.latest() {
            Err(Error::CorruptCheckpoint { reason, .. }) => {
                assert!(reason.contains("digest"));
            }
            other => panic!("expected corrupt checkpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_unrelated_files_ignored() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("checkpoint_epoch_x.json"), "{}").unwrap();

        assert!(store.latest().unwrap().is_none());

        store.save(&record(2)).unwrap();
        assert_eq!(store.latest_epoch().unwrap(), Some(2));
    }

    #[test]
    fn test_resave_same_epoch_supersedes() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());

        store.save(&record(1)).unwrap();
        let newer = CheckpointRecord::new(1, 99, vec![("w".to_string(), array![5.0, 6.0])]);
        store.save(&newer).unwrap();

        let loaded = store.latest().unwrap().unwrap();
        assert_eq!(loaded.global_step, 99);
        assert_eq!(loaded.params[0].1, array![5.0, 6.0]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;
    use tempfile::tempdir;

    proptest! {
        /// Retention keeps exactly min(saves, keep) newest records
        #[test]
        fn retention_bounds_store_size(
            saves in 1u64..12,
            keep in 1usize..6,
        ) {
            let dir = tempdir().unwrap();
            let store = CheckpointStore::new(dir.path()).with_retention(Some(keep));

            for epoch in 1..=saves {
                let record = CheckpointRecord::new(
                    epoch, epoch, vec![("w".to_string(), array![epoch as f32])],
                );
                store.save(&record).unwrap();
            }

            let on_disk: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().ends_with(".json"))
                .collect();
            prop_assert_eq!(on_disk.len(), (saves as usize).min(keep));
            prop_assert_eq!(store.latest_epoch().unwrap(), Some(saves));
        }
    }
}
