//! Cadence-sampled scalar event sinks

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// File name of the append-only event stream within a sink directory
pub const EVENTS_FILE: &str = "events.jsonl";

/// A single scalar measurement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarEvent {
    pub name: String,
    pub value: f32,
    pub step: u64,
}

/// Buffered scalar sink for one log directory
///
/// Each metric carries a logging cadence: `record` keeps a sample only when
/// the step falls on the metric's cadence (unregistered names are sampled
/// every step). Buffered events are appended to `events.jsonl` on `flush`,
/// which the loop calls at epoch boundaries.
#[derive(Debug)]
pub struct MetricLogger {
    dir: PathBuf,
    cadences: HashMap<String, u64>,
    pending: Vec<ScalarEvent>,
}

impl MetricLogger {
    /// Create a logger writing to `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), cadences: HashMap::new(), pending: Vec::new() }
    }

    /// Declare a metric and its sampling cadence (log every `log_every` steps)
    pub fn register_scalar(&mut self, name: impl Into<String>, log_every: u64) {
        self.cadences.insert(name.into(), log_every.max(1));
    }

    /// Record a measurement; kept only when `step` falls on the cadence
    pub fn record(&mut self, name: &str, value: f32, step: u64) {
        let every = self.cadences.get(name).copied().unwrap_or(1);
        if step.is_multiple_of(every) {
            self.pending.push(ScalarEvent { name: name.to_string(), value, step });
        }
    }

    /// Number of buffered events awaiting flush
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Append buffered events to the sink stream
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        let mut file =
            OpenOptions::new().create(true).append(true).open(self.dir.join(EVENTS_FILE))?;
        for event in self.pending.drain(..) {
            let line = serde_json::to_string(&event)
                .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}
