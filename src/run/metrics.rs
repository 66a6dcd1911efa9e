//! Metrics sink for per-group run records
//!
//! The sink uses a line-delimited JSON format (JSONL) where each line is a
//! complete JSON object describing one executed group. Each write is flushed
//! immediately so that a record survives even if a later group hangs the run.
//!
//! Skipped groups do not reach the sink; the metrics file is a record of
//! engine invocations, not of catalog entries.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SnapbackError, SnapbackResult};

use super::summary::{GroupOutcome, GroupStatus};

/// One metrics line, as written to the sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    /// When the group finished processing
    pub timestamp: DateTime<Utc>,
    /// Group name
    pub group: String,
    /// Wall-clock duration of the backup step, in whole seconds
    pub duration_sec: u64,
    /// "success" or "failed"
    pub result: GroupStatus,
    /// Best-effort repository free space
    pub repo_free: String,
}

impl MetricRecord {
    /// Build a record from a finished outcome, stamped now
    pub fn from_outcome(outcome: &GroupOutcome) -> Self {
        Self {
            timestamp: Utc::now(),
            group: outcome.group.clone(),
            duration_sec: outcome.duration.as_secs(),
            result: outcome.status,
            repo_free: outcome.repo_free.clone(),
        }
    }
}

/// Destination for per-group metric records
pub trait MetricsSink {
    /// Append one record
    fn append(&mut self, record: &MetricRecord) -> SnapbackResult<()>;
}

/// File-backed sink, appending one JSON line per record
pub struct FileMetricsSink {
    path: PathBuf,
}

impl FileMetricsSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl MetricsSink for FileMetricsSink {
    fn append(&mut self, record: &MetricRecord) -> SnapbackResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SnapbackError::Io(format!("Failed to create metrics directory: {}", e))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SnapbackError::Io(format!("Failed to open metrics file: {}", e)))?;

        let json = serde_json::to_string(record)
            .map_err(|e| SnapbackError::Json(format!("Failed to serialize metric record: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| SnapbackError::Io(format!("Failed to write metric record: {}", e)))?;

        file.flush()
            .map_err(|e| SnapbackError::Io(format!("Failed to flush metrics file: {}", e)))?;

        Ok(())
    }
}

/// In-memory sink recording every appended record, for tests
#[derive(Debug, Default)]
pub struct MemoryMetricsSink {
    pub records: Vec<MetricRecord>,
}

impl MetricsSink for MemoryMetricsSink {
    fn append(&mut self, record: &MetricRecord) -> SnapbackResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
