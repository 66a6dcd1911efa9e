//! Best-effort free-space probe
//!
//! The orchestrator records how much space is left on the repository host
//! alongside each successful backup. The probe always returns a value: any
//! underlying failure maps to the [`FREE_SPACE_UNKNOWN`] sentinel, never a
//! propagated error.

use std::process::Command;

use tracing::warn;

/// Sentinel reported when the free space could not be determined
pub const FREE_SPACE_UNKNOWN: &str = "unknown";

/// Best-effort probe of remote repository free space
pub trait FreeSpaceProbe {
    /// Free space as a human-readable string, or [`FREE_SPACE_UNKNOWN`]
    fn free_space(&self) -> String;
}

/// Probe that runs `df -h` on the repository host over SSH
pub struct SshFreeSpaceProbe {
    host: String,
    path: String,
}

impl SshFreeSpaceProbe {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }
}

impl FreeSpaceProbe for SshFreeSpaceProbe {
    fn free_space(&self) -> String {
        let output = Command::new("ssh")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg(&self.host)
            .arg("df")
            .arg("-h")
            .arg("--output=avail")
            .arg(&self.path)
            .output();

        match output {
            Ok(output) if output.status.success() => {
                // df prints a header line followed by the value
                let stdout = String::from_utf8_lossy(&output.stdout);
                match stdout.lines().nth(1).map(|line| line.trim().to_string()) {
                    Some(avail) if !avail.is_empty() => avail,
                    _ => {
                        warn!("Free-space probe returned unexpected output");
                        FREE_SPACE_UNKNOWN.to_string()
                    }
                }
            }
            Ok(output) => {
                warn!(
                    "Free-space probe failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                FREE_SPACE_UNKNOWN.to_string()
            }
            Err(e) => {
                warn!("Free-space probe failed to start: {}", e);
                FREE_SPACE_UNKNOWN.to_string()
            }
        }
    }
}

/// Probe used when no probe target is configured
pub struct UnknownFreeSpaceProbe;

impl FreeSpaceProbe for UnknownFreeSpaceProbe {
    fn free_space(&self) -> String {
        FREE_SPACE_UNKNOWN.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_probe_returns_sentinel() {
        assert_eq!(UnknownFreeSpaceProbe.free_space(), FREE_SPACE_UNKNOWN);
    }

    #[test]
    fn test_unreachable_host_returns_sentinel() {
        // BatchMode forbids prompting, so a bogus host fails fast
        let probe = SshFreeSpaceProbe::new("nobody@invalid.localdomain", "/srv/restic");
        assert_eq!(probe.free_space(), FREE_SPACE_UNKNOWN);
    }
}
