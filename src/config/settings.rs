//! Run settings for snapback
//!
//! Everything a run needs before the first group is processed: the repository
//! reference, the secret-store coordinates, where the group catalog comes
//! from, and where metrics go. Settings are read once at startup and never
//! written back.
//!
//! ## Config file resolution order
//!
//! 1. `--config <path>` CLI flag (handled by the caller)
//! 2. `SNAPBACK_CONFIG` environment variable
//! 3. `$XDG_CONFIG_HOME/snapback/config.json` or `~/.config/snapback/config.json`

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{SnapbackError, SnapbackResult};

/// Secret-store coordinates for the repository passphrase
#[derive(Debug, Clone, Deserialize)]
pub struct SecretStoreSettings {
    /// Secret-store address, e.g. `https://vault.internal:8200`
    pub address: String,
    /// Path of the secret holding the passphrase, e.g. `kv/backup/restic`
    pub secret_path: String,
    /// Field within the secret (defaults to `password`)
    #[serde(default = "default_secret_field")]
    pub field: String,
    /// File containing the auth token; falls back to `VAULT_TOKEN` when absent
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

/// Free-space probe target (optional; probing is best-effort)
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSettings {
    /// SSH host holding the repository, e.g. `backup@nas.internal`
    pub host: String,
    /// Filesystem path on the host to run `df` against
    pub path: String,
}

/// Run settings for snapback
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Repository reference passed to the backup engine,
    /// e.g. `sftp:backup@nas.internal:/srv/restic`
    pub repository: String,

    /// Secret-store coordinates for the repository passphrase
    pub secret_store: SecretStoreSettings,

    /// Inline group catalog (mutually exclusive with `catalog_file`)
    #[serde(default)]
    pub catalog: Option<serde_json::Value>,

    /// Path to a JSON file holding the group catalog
    #[serde(default)]
    pub catalog_file: Option<PathBuf>,

    /// Where per-group metric records are appended (JSONL)
    #[serde(default = "default_metrics_file")]
    pub metrics_file: PathBuf,

    /// Backup engine binary
    #[serde(default = "default_engine_binary")]
    pub engine_binary: String,

    /// Secret-store CLI binary
    #[serde(default = "default_vault_binary")]
    pub vault_binary: String,

    /// Subset of repository data to read during the post-run integrity check
    #[serde(default = "default_check_subset")]
    pub check_data_subset: String,

    /// Whether to run the post-run integrity check at all
    #[serde(default = "default_true")]
    pub run_check: bool,

    /// Tag used for the syslog-style run notification
    #[serde(default = "default_syslog_tag")]
    pub syslog_tag: String,

    /// Free-space probe target; absent means every probe reports "unknown"
    #[serde(default)]
    pub free_space: Option<ProbeSettings>,
}

fn default_secret_field() -> String {
    "password".to_string()
}

fn default_metrics_file() -> PathBuf {
    PathBuf::from("/var/log/snapback/metrics.jsonl")
}

fn default_engine_binary() -> String {
    "restic".to_string()
}

fn default_vault_binary() -> String {
    "vault".to_string()
}

fn default_check_subset() -> String {
    "5%".to_string()
}

fn default_true() -> bool {
    true
}

fn default_syslog_tag() -> String {
    "snapback".to_string()
}

impl Settings {
    /// Load settings from an explicit path
    pub fn load(path: &Path) -> SnapbackResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SnapbackError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            SnapbackError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default location (env override, then XDG)
    pub fn load_default() -> SnapbackResult<Self> {
        Self::load(&default_config_path()?)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> SnapbackResult<()> {
        if self.repository.trim().is_empty() {
            return Err(SnapbackError::Config("repository must not be empty".into()));
        }
        if self.secret_store.address.trim().is_empty() {
            return Err(SnapbackError::Config(
                "secret_store.address must not be empty".into(),
            ));
        }
        if self.secret_store.secret_path.trim().is_empty() {
            return Err(SnapbackError::Config(
                "secret_store.secret_path must not be empty".into(),
            ));
        }
        match (&self.catalog, &self.catalog_file) {
            (None, None) => Err(SnapbackError::Config(
                "either catalog or catalog_file is required".into(),
            )),
            (Some(_), Some(_)) => Err(SnapbackError::Config(
                "catalog and catalog_file are mutually exclusive".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Materialize the raw catalog value, reading `catalog_file` if configured
    pub fn catalog_value(&self) -> SnapbackResult<serde_json::Value> {
        if let Some(value) = &self.catalog {
            return Ok(value.clone());
        }

        // validate() guarantees exactly one source is set
        let path = self.catalog_file.as_ref().ok_or_else(|| {
            SnapbackError::Config("either catalog or catalog_file is required".into())
        })?;

        let contents = std::fs::read_to_string(path).map_err(|e| {
            SnapbackError::Io(format!(
                "Failed to read catalog file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            SnapbackError::Catalog(format!(
                "Failed to parse catalog file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// Resolve the default config file path
fn default_config_path() -> SnapbackResult<PathBuf> {
    if let Ok(custom) = std::env::var("SNAPBACK_CONFIG") {
        return Ok(PathBuf::from(custom));
    }

    let config_base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| {
            std::env::var("HOME").map(|home| PathBuf::from(home).join(".config"))
        })
        .map_err(|_| {
            SnapbackError::Config("Could not determine config directory (HOME not set)".into())
        })?;

    Ok(config_base.join("snapback").join("config.json"))
}
