//! The group backup loop
//!
//! Groups are processed one at a time, in catalog order, with no parallelism:
//! the engine holds a lock on the remote repository, so sequential processing
//! is the safety mechanism. Group N's retention never starts before group N's
//! backup finishes, and group N+1 never starts before group N's full sequence
//! is done.
//!
//! Per-group state machine:
//!
//! ```text
//! PENDING -> (no paths)        -> SKIPPED
//! PENDING -> BACKING_UP -> ok  -> RETAINING -> RETAINED
//! BACKING_UP -> failure        -> FAILED
//! RETAINING -> failure         -> RETAINED (warning only; still success)
//! ```
//!
//! Only the backup step decides a group's classification. Retention failure,
//! a malformed retention spec, a probe failure, and a metrics write failure
//! are all absorbed as warnings.

use std::time::Instant;

use tracing::{info, warn};

use crate::catalog::BackupGroup;
use crate::engine::{BackupEngine, FreeSpaceProbe};

use super::metrics::{MetricRecord, MetricsSink};
use super::summary::{GroupOutcome, GroupStatus, RunReport, RunSummary};

/// Process every group in order, isolating per-group failures
///
/// Pure apart from the injected adapters: the same groups and adapters always
/// produce the same report. Outcomes and metric records are emitted in
/// catalog order; skipped groups get an outcome and a log line but no metric
/// record.
pub fn run_groups(
    groups: &[BackupGroup],
    engine: &dyn BackupEngine,
    probe: &dyn FreeSpaceProbe,
    metrics: &mut dyn MetricsSink,
) -> RunReport {
    let mut outcomes = Vec::with_capacity(groups.len());
    let mut summary = RunSummary::default();

    for group in groups {
        let outcome = process_group(group, engine, probe);

        if outcome.status != GroupStatus::Skipped {
            let record = MetricRecord::from_outcome(&outcome);
            if let Err(e) = metrics.append(&record) {
                warn!("Failed to record metrics for group '{}': {}", group.name, e);
            }
        }

        summary.record(&outcome);
        outcomes.push(outcome);
    }

    RunReport { outcomes, summary }
}

/// Run one group through the state machine
fn process_group(
    group: &BackupGroup,
    engine: &dyn BackupEngine,
    probe: &dyn FreeSpaceProbe,
) -> GroupOutcome {
    if group.is_empty() {
        info!("Group '{}' has no paths, skipping", group.name);
        return GroupOutcome::skipped(&group.name);
    }

    info!(
        "Backing up group '{}' ({} paths)",
        group.name,
        group.paths.len()
    );
    let started = Instant::now();
    let backup = engine.backup(group);
    let duration = started.elapsed();

    if !backup.ok {
        warn!(
            "Backup failed for group '{}' after {}s: {}",
            group.name,
            duration.as_secs(),
            backup.output.trim()
        );
        return GroupOutcome {
            group: group.name.clone(),
            status: GroupStatus::Failed,
            duration,
            repo_free: crate::engine::FREE_SPACE_UNKNOWN.to_string(),
        };
    }

    info!(
        "Backup succeeded for group '{}' in {}s",
        group.name,
        duration.as_secs()
    );

    let repo_free = probe.free_space();

    // Retention runs only after a successful backup and never changes the
    // group's classification.
    apply_retention(group, engine);

    GroupOutcome {
        group: group.name.clone(),
        status: GroupStatus::Success,
        duration,
        repo_free,
    }
}

/// Resolve the group's retention policy and apply it, absorbing all failures
fn apply_retention(group: &BackupGroup, engine: &dyn BackupEngine) {
    let policy = match group.retention.resolve() {
        Ok(policy) => policy,
        Err(e) => {
            warn!(
                "Skipping retention for group '{}': {}",
                group.name, e
            );
            return;
        }
    };

    let forget = engine.forget(&group.name, &policy);
    if forget.ok {
        info!("Retention applied for group '{}'", group.name);
    } else {
        warn!(
            "Retention failed for group '{}' (backup still counts as successful): {}",
            group.name,
            forget.output.trim()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::catalog::{RetentionPolicy, RetentionSpec};
    use crate::engine::{EngineInvocation, FREE_SPACE_UNKNOWN};
    use crate::run::metrics::MemoryMetricsSink;

    /// Stub engine recording every call, failing backups for named groups
    #[derive(Default)]
    struct StubEngine {
        fail_backups_for: Vec<String>,
        fail_forgets: bool,
        backups: RefCell<Vec<String>>,
        forgets: RefCell<Vec<(String, RetentionPolicy)>>,
    }

    impl BackupEngine for StubEngine {
        fn backup(&self, group: &BackupGroup) -> EngineInvocation {
            self.backups.borrow_mut().push(group.name.clone());
            if self.fail_backups_for.contains(&group.name) {
                EngineInvocation::failure("stub: repository locked")
            } else {
                EngineInvocation::success("stub: snapshot saved")
            }
        }

        fn forget(&self, tag: &str, policy: &RetentionPolicy) -> EngineInvocation {
            self.forgets.borrow_mut().push((tag.to_string(), *policy));
            if self.fail_forgets {
                EngineInvocation::failure("stub: prune failed")
            } else {
                EngineInvocation::success("stub: pruned")
            }
        }

        fn check(&self, _subset: &str) -> EngineInvocation {
            EngineInvocation::success("stub: no errors")
        }
    }

    struct FixedProbe(&'static str);

    impl FreeSpaceProbe for FixedProbe {
        fn free_space(&self) -> String {
            self.0.to_string()
        }
    }

    fn group(name: &str, paths: &[&str]) -> BackupGroup {
        BackupGroup {
            name: name.into(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            retention: RetentionSpec::default(),
        }
    }

    #[test]
    fn test_all_success_run() {
        // One real group, one empty group
        let groups = vec![group("home", &["/home"]), group("empty", &[])];
        let engine = StubEngine::default();
        let mut sink = MemoryMetricsSink::default();

        let report = run_groups(&groups, &engine, &FixedProbe("120G"), &mut sink);

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.failed, 0);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.summary.exit_code(), 0);

        // Two outcomes, but only one metric record (skipped groups emit none)
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(sink.records.len(), 1);
        assert_eq!(sink.records[0].group, "home");
        assert_eq!(sink.records[0].repo_free, "120G");
    }

    #[test]
    fn test_failed_backup_skips_retention() {
        let groups = vec![group("home", &["/home"]), group("empty", &[])];
        let engine = StubEngine {
            fail_backups_for: vec!["home".into()],
            ..Default::default()
        };
        let mut sink = MemoryMetricsSink::default();

        let report = run_groups(&groups, &engine, &FixedProbe("120G"), &mut sink);

        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.exit_code(), 1);

        // Retention must not have been invoked at all, not merely no-opped
        assert!(engine.forgets.borrow().is_empty());

        // The failed group still gets a metric record
        assert_eq!(sink.records.len(), 1);
        assert_eq!(sink.records[0].result, GroupStatus::Failed);
        assert_eq!(sink.records[0].repo_free, FREE_SPACE_UNKNOWN);
    }

    #[test]
    fn test_failure_isolation_continues_the_loop() {
        let groups = vec![
            group("bad", &["/bad"]),
            group("good", &["/good"]),
        ];
        let engine = StubEngine {
            fail_backups_for: vec!["bad".into()],
            ..Default::default()
        };
        let mut sink = MemoryMetricsSink::default();

        let report = run_groups(&groups, &engine, &FixedProbe("9G"), &mut sink);

        // Both groups were attempted, in order
        assert_eq!(*engine.backups.borrow(), vec!["bad", "good"]);
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.summary.exit_code(), 1);
    }

    #[test]
    fn test_retention_failure_does_not_downgrade_success() {
        let groups = vec![group("home", &["/home"])];
        let engine = StubEngine {
            fail_forgets: true,
            ..Default::default()
        };
        let mut sink = MemoryMetricsSink::default();

        let report = run_groups(&groups, &engine, &FixedProbe("9G"), &mut sink);

        assert_eq!(engine.forgets.borrow().len(), 1);
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.failed, 0);
        assert_eq!(report.summary.exit_code(), 0);
        assert_eq!(sink.records[0].result, GroupStatus::Success);
    }

    #[test]
    fn test_malformed_retention_skips_forget_but_group_succeeds() {
        let mut bad = group("home", &["/home"]);
        bad.retention = RetentionSpec {
            keep_daily: Some(-3),
            ..Default::default()
        };
        let engine = StubEngine::default();
        let mut sink = MemoryMetricsSink::default();

        let report = run_groups(&[bad], &engine, &FixedProbe("9G"), &mut sink);

        assert!(engine.forgets.borrow().is_empty());
        assert_eq!(report.summary.succeeded, 1);
        assert_eq!(report.summary.exit_code(), 0);
    }

    #[test]
    fn test_forget_receives_resolved_policy() {
        let mut custom = group("home", &["/home"]);
        custom.retention = RetentionSpec {
            keep_daily: Some(0),
            keep_yearly: Some(5),
            ..Default::default()
        };
        let engine = StubEngine::default();
        let mut sink = MemoryMetricsSink::default();

        run_groups(&[custom], &engine, &FixedProbe("9G"), &mut sink);

        let forgets = engine.forgets.borrow();
        let (tag, policy) = &forgets[0];
        assert_eq!(tag, "home");
        // Explicit zero wins over the default of 7
        assert_eq!(policy.keep_daily, 0);
        assert_eq!(policy.keep_yearly, 5);
        assert_eq!(policy.keep_weekly, 4);
    }

    #[test]
    fn test_outcomes_and_metrics_preserve_catalog_order() {
        let groups = vec![
            group("a", &["/a"]),
            group("skip", &[]),
            group("b", &["/b"]),
        ];
        let engine = StubEngine::default();
        let mut sink = MemoryMetricsSink::default();

        let report = run_groups(&groups, &engine, &FixedProbe("9G"), &mut sink);

        let outcome_groups: Vec<&str> =
            report.outcomes.iter().map(|o| o.group.as_str()).collect();
        assert_eq!(outcome_groups, vec!["a", "skip", "b"]);

        let metric_groups: Vec<&str> =
            sink.records.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(metric_groups, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_catalog_is_a_clean_run() {
        let engine = StubEngine::default();
        let mut sink = MemoryMetricsSink::default();

        let report = run_groups(&[], &engine, &FixedProbe("9G"), &mut sink);

        assert_eq!(report.summary, RunSummary::default());
        assert_eq!(report.summary.exit_code(), 0);
        assert!(engine.backups.borrow().is_empty());
    }
}
