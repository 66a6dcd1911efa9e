//! Run orchestration for snapback
//!
//! The core of the crate: the per-group state machine that drives backup and
//! retention through the engine adapters, isolates per-group failures, and
//! accumulates the run summary that decides the process exit code.
//!
//! # Architecture
//!
//! - `orchestrator`: the sequential group loop, a pure fold over
//!   (groups, adapters) producing a [`RunReport`]
//! - `summary`: per-group outcomes and the aggregate run summary
//! - `metrics`: the append-only JSONL metrics sink

pub mod metrics;
pub mod orchestrator;
pub mod summary;

pub use metrics::{FileMetricsSink, MemoryMetricsSink, MetricRecord, MetricsSink};
pub use orchestrator::run_groups;
pub use summary::{GroupOutcome, GroupStatus, RunReport, RunSummary};
