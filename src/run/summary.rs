//! Per-group outcomes and the aggregate run summary

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::FREE_SPACE_UNKNOWN;

/// Terminal classification of one group's processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    /// Backup succeeded (retention may still have warned)
    Success,
    /// Backup invocation failed
    Failed,
    /// Group had no paths and was never executed
    Skipped,
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupStatus::Success => write!(f, "success"),
            GroupStatus::Failed => write!(f, "failed"),
            GroupStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Final record of one group's processing, created once and never mutated
#[derive(Debug, Clone)]
pub struct GroupOutcome {
    /// Group name
    pub group: String,
    /// Terminal status
    pub status: GroupStatus,
    /// Wall-clock duration; only meaningful for success/failed
    pub duration: Duration,
    /// Best-effort repository free space, "unknown" on probe failure
    pub repo_free: String,
}

impl GroupOutcome {
    /// Outcome for a group that was skipped because it has no paths
    pub fn skipped(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            status: GroupStatus::Skipped,
            duration: Duration::ZERO,
            repo_free: FREE_SPACE_UNKNOWN.to_string(),
        }
    }
}

/// Aggregate totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration: Duration,
}

impl RunSummary {
    /// Fold one outcome into the totals
    pub fn record(&mut self, outcome: &GroupOutcome) {
        self.total += 1;
        match outcome.status {
            GroupStatus::Success => self.succeeded += 1,
            GroupStatus::Failed => self.failed += 1,
            GroupStatus::Skipped => self.skipped += 1,
        }
        self.total_duration += outcome.duration;
    }

    /// Exit-code rule: zero iff no group's backup failed
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }
}

/// Everything the loop produced: ordered outcomes plus the aggregate summary
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<GroupOutcome>,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: GroupStatus, secs: u64) -> GroupOutcome {
        GroupOutcome {
            group: "g".into(),
            status,
            duration: Duration::from_secs(secs),
            repo_free: FREE_SPACE_UNKNOWN.into(),
        }
    }

    #[test]
    fn test_totals_invariant() {
        let mut summary = RunSummary::default();
        summary.record(&outcome(GroupStatus::Success, 10));
        summary.record(&outcome(GroupStatus::Failed, 5));
        summary.record(&outcome(GroupStatus::Skipped, 0));
        summary.record(&outcome(GroupStatus::Success, 2));

        assert_eq!(summary.total, 4);
        assert_eq!(
            summary.total,
            summary.succeeded + summary.failed + summary.skipped
        );
        assert_eq!(summary.total_duration, Duration::from_secs(17));
    }

    #[test]
    fn test_exit_code_zero_without_failures() {
        let mut summary = RunSummary::default();
        summary.record(&outcome(GroupStatus::Success, 1));
        summary.record(&outcome(GroupStatus::Skipped, 0));
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_all_skipped_is_still_exit_zero() {
        let mut summary = RunSummary::default();
        summary.record(&outcome(GroupStatus::Skipped, 0));
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_any_failure_forces_exit_one() {
        let mut summary = RunSummary::default();
        summary.record(&outcome(GroupStatus::Success, 1));
        summary.record(&outcome(GroupStatus::Failed, 1));
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_status_display_matches_metric_values() {
        assert_eq!(GroupStatus::Success.to_string(), "success");
        assert_eq!(GroupStatus::Failed.to_string(), "failed");
        assert_eq!(GroupStatus::Skipped.to_string(), "skipped");
    }
}
