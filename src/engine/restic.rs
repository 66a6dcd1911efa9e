//! Restic adapter
//!
//! Invokes the `restic` binary once per operation, with the repository and
//! passphrase passed through the child environment so they never appear in
//! the process list.

use std::process::Command;

use tracing::debug;

use crate::catalog::{BackupGroup, RetentionPolicy};
use crate::secrets::Passphrase;

use super::{BackupEngine, EngineInvocation};

/// Production backup engine backed by the `restic` binary
pub struct ResticEngine {
    binary: String,
    repository: String,
    passphrase: Passphrase,
}

impl ResticEngine {
    /// Create an adapter for the given repository
    pub fn new(binary: impl Into<String>, repository: impl Into<String>, passphrase: Passphrase) -> Self {
        Self {
            binary: binary.into(),
            repository: repository.into(),
            passphrase,
        }
    }

    /// Build a restic command with repository and passphrase in the child env
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.env("RESTIC_REPOSITORY", &self.repository)
            .env("RESTIC_PASSWORD", self.passphrase.expose());
        cmd
    }

    /// Run a prepared command, folding spawn failure and non-zero exit into
    /// a failed invocation
    fn run(&self, mut cmd: Command) -> EngineInvocation {
        debug!("Running {:?}", cmd);
        match cmd.output() {
            Ok(output) => {
                let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.is_empty() {
                    if !captured.is_empty() {
                        captured.push('\n');
                    }
                    captured.push_str(&stderr);
                }
                EngineInvocation {
                    ok: output.status.success(),
                    output: captured,
                }
            }
            Err(e) => EngineInvocation::failure(format!(
                "Failed to invoke {}: {}",
                self.binary, e
            )),
        }
    }
}

impl BackupEngine for ResticEngine {
    fn backup(&self, group: &BackupGroup) -> EngineInvocation {
        let mut cmd = self.command();
        cmd.arg("backup").arg("--tag").arg(&group.name);
        for path in &group.paths {
            cmd.arg(path);
        }
        self.run(cmd)
    }

    fn forget(&self, tag: &str, policy: &RetentionPolicy) -> EngineInvocation {
        let mut cmd = self.command();
        cmd.arg("forget")
            .arg("--tag")
            .arg(tag)
            .arg("--keep-hourly")
            .arg(policy.keep_hourly.to_string())
            .arg("--keep-daily")
            .arg(policy.keep_daily.to_string())
            .arg("--keep-weekly")
            .arg(policy.keep_weekly.to_string())
            .arg("--keep-monthly")
            .arg(policy.keep_monthly.to_string())
            .arg("--keep-yearly")
            .arg(policy.keep_yearly.to_string())
            .arg("--prune");
        self.run(cmd)
    }

    fn check(&self, read_data_subset: &str) -> EngineInvocation {
        let mut cmd = self.command();
        cmd.arg("check")
            .arg("--read-data-subset")
            .arg(read_data_subset);
        self.run(cmd)
    }
}
