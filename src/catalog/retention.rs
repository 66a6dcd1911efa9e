//! Retention specification and policy resolution
//!
//! The catalog carries an optional count per snapshot bucket; resolution turns
//! that partial shape into a fully-populated policy. Absence of a key is
//! distinct from an explicit zero: a present value always wins, even at zero.

use serde::Deserialize;

use crate::error::{SnapbackError, SnapbackResult};

/// Raw retention block as it appears in the catalog
///
/// Values are kept as signed integers so that a negative count parses
/// structurally and is rejected by [`RetentionSpec::resolve`] instead, where
/// the orchestrator can treat it as a per-group soft failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetentionSpec {
    #[serde(default)]
    pub keep_hourly: Option<i64>,
    #[serde(default)]
    pub keep_daily: Option<i64>,
    #[serde(default)]
    pub keep_weekly: Option<i64>,
    #[serde(default)]
    pub keep_monthly: Option<i64>,
    #[serde(default)]
    pub keep_yearly: Option<i64>,
}

/// Fully-populated retention policy passed to the engine's forget operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub keep_hourly: u32,
    pub keep_daily: u32,
    pub keep_weekly: u32,
    pub keep_monthly: u32,
    pub keep_yearly: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            keep_hourly: 0,
            keep_daily: 7,
            keep_weekly: 4,
            keep_monthly: 6,
            keep_yearly: 1,
        }
    }
}

impl RetentionSpec {
    /// Resolve this specification into a concrete policy
    ///
    /// Each count falls back to its default when absent. A negative value is
    /// malformed; the caller is expected to skip retention for the group and
    /// continue the run.
    pub fn resolve(&self) -> SnapbackResult<RetentionPolicy> {
        let defaults = RetentionPolicy::default();
        Ok(RetentionPolicy {
            keep_hourly: resolve_count("keep_hourly", self.keep_hourly, defaults.keep_hourly)?,
            keep_daily: resolve_count("keep_daily", self.keep_daily, defaults.keep_daily)?,
            keep_weekly: resolve_count("keep_weekly", self.keep_weekly, defaults.keep_weekly)?,
            keep_monthly: resolve_count("keep_monthly", self.keep_monthly, defaults.keep_monthly)?,
            keep_yearly: resolve_count("keep_yearly", self.keep_yearly, defaults.keep_yearly)?,
        })
    }
}

fn resolve_count(key: &str, value: Option<i64>, default: u32) -> SnapbackResult<u32> {
    match value {
        None => Ok(default),
        Some(n) => u32::try_from(n).map_err(|_| {
            SnapbackError::Retention(format!("{} is out of range for a keep count: {}", key, n))
        }),
    }
}
