//! Backup engine adapters
//!
//! The orchestrator talks to the external snapshot engine through the
//! [`BackupEngine`] trait so that the core loop can be exercised against
//! stubs. The production implementation, [`ResticEngine`], shells out to the
//! `restic` binary.
//!
//! Adapter methods never return `Err`: a non-zero exit from the external
//! engine and a failure to spawn it at all both surface as
//! `EngineInvocation { ok: false, .. }`, because the orchestrator must keep
//! processing the remaining groups either way.

pub mod probe;
pub mod restic;

pub use probe::{FreeSpaceProbe, SshFreeSpaceProbe, UnknownFreeSpaceProbe, FREE_SPACE_UNKNOWN};
pub use restic::ResticEngine;

use crate::catalog::{BackupGroup, RetentionPolicy};

/// Outcome of one external engine invocation
#[derive(Debug, Clone)]
pub struct EngineInvocation {
    /// Whether the engine exited successfully
    pub ok: bool,
    /// Captured stdout and stderr, for logging
    pub output: String,
}

impl EngineInvocation {
    /// A successful invocation with the given captured output
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            ok: true,
            output: output.into(),
        }
    }

    /// A failed invocation with the given captured output
    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            ok: false,
            output: output.into(),
        }
    }
}

/// Interface to the external snapshot engine
///
/// Every call blocks the calling thread for the duration of the external
/// process; no timeout is imposed at this layer.
pub trait BackupEngine {
    /// Snapshot all of the group's paths, tagged with the group name
    fn backup(&self, group: &BackupGroup) -> EngineInvocation;

    /// Forget snapshots for the tag beyond the policy's keep counts, then prune
    fn forget(&self, tag: &str, policy: &RetentionPolicy) -> EngineInvocation;

    /// Verify repository integrity, reading the given subset of pack data
    fn check(&self, read_data_subset: &str) -> EngineInvocation;
}
