//! Metric streams
//!
//! Scalars flow through two layers: a `MetricLogger` per sink directory
//! buffers cadence-sampled `(name, value, step)` events and appends them to an
//! append-only stream at epoch boundaries, and a `MetricsTracker` keeps the
//! in-memory per-run history the loop reports from. Neither outlives the log
//! sink; nothing here participates in resume correctness.

mod logger;
mod tracker;

pub use logger::{MetricLogger, ScalarEvent, EVENTS_FILE};
pub use tracker::MetricsTracker;
