//! Repository passphrase retrieval
//!
//! The passphrase lives in an external secret store and is fetched exactly
//! once, before the group loop starts. Any failure here is fatal: without the
//! passphrase no group can be processed, so there is nothing to isolate.
//!
//! The fetched value is wrapped in [`Passphrase`], which zeroizes its memory
//! on drop and is deliberately excluded from `Debug` output.

use std::path::Path;
use std::process::Command;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::settings::SecretStoreSettings;
use crate::error::{SnapbackError, SnapbackResult};

/// Repository passphrase, zeroized on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value, for handing to the engine's child environment
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase(***)")
    }
}

/// Client for the external secret store CLI
pub struct SecretStore {
    binary: String,
    settings: SecretStoreSettings,
}

impl SecretStore {
    /// Create a client for the configured store
    pub fn new(binary: impl Into<String>, settings: SecretStoreSettings) -> Self {
        Self {
            binary: binary.into(),
            settings,
        }
    }

    /// Fetch the repository passphrase
    ///
    /// One blocking call against the store. Authentication or connectivity
    /// failure, and an empty fetched value, are all fatal.
    pub fn fetch_passphrase(&self) -> SnapbackResult<Passphrase> {
        let token = self.resolve_token()?;

        let output = Command::new(&self.binary)
            .arg("kv")
            .arg("get")
            .arg(format!("-field={}", self.settings.field))
            .arg(&self.settings.secret_path)
            .env("VAULT_ADDR", &self.settings.address)
            .env("VAULT_TOKEN", &token)
            .output()
            .map_err(|e| {
                SnapbackError::Secret(format!("Failed to invoke {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            return Err(SnapbackError::Secret(format!(
                "Secret store returned an error for {}: {}",
                self.settings.secret_path,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let passphrase = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if passphrase.is_empty() {
            return Err(SnapbackError::Secret(format!(
                "Fetched passphrase from {} is empty",
                self.settings.secret_path
            )));
        }

        Ok(Passphrase::new(passphrase))
    }

    /// Resolve the auth token: token file if configured, `VAULT_TOKEN` otherwise
    fn resolve_token(&self) -> SnapbackResult<String> {
        if let Some(token_file) = &self.settings.token_file {
            return read_token_file(token_file);
        }

        std::env::var("VAULT_TOKEN").map_err(|_| {
            SnapbackError::Secret(
                "No secret-store token: set secret_store.token_file or VAULT_TOKEN".into(),
            )
        })
    }
}

fn read_token_file(path: &Path) -> SnapbackResult<String> {
    let token = std::fs::read_to_string(path)
        .map_err(|e| {
            SnapbackError::Secret(format!(
                "Failed to read token file {}: {}",
                path.display(),
                e
            ))
        })?
        .trim()
        .to_string();

    if token.is_empty() {
        return Err(SnapbackError::Secret(format!(
            "Token file {} is empty",
            path.display()
        )));
    }

    Ok(token)
}
