//! Syslog-style run notification
//!
//! After the loop finishes, the aggregate counts are handed to the system log
//! via `logger(1)`. This is best-effort: a missing or failing `logger` binary
//! is logged as a warning and never touches the exit code.

use std::process::Command;

use tracing::warn;

use crate::run::RunSummary;

/// Send the run's aggregate counts to the system log
pub fn notify_run_complete(tag: &str, summary: &RunSummary) {
    let message = format!(
        "backup run complete: {} total, {} succeeded, {} failed, {} skipped, {}s",
        summary.total,
        summary.succeeded,
        summary.failed,
        summary.skipped,
        summary.total_duration.as_secs()
    );

    let result = Command::new("logger").arg("-t").arg(tag).arg(&message).status();

    match result {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("Syslog notification exited with {}", status),
        Err(e) => warn!("Syslog notification failed to start: {}", e),
    }
}
