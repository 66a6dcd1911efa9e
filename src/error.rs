//! Custom error types for snapback
//!
//! This module defines the error hierarchy for the orchestrator using thiserror
//! for ergonomic error definitions.
//!
//! The variants split into two families that the rest of the crate treats very
//! differently: fatal preconditions (configuration, secret retrieval, catalog
//! parsing, an unknown group filter) abort the run before any group is
//! processed, while the soft variants (`Retention`) are absorbed by the
//! orchestrator loop and only ever surface as warnings.

use thiserror::Error;

/// The main error type for snapback operations
#[derive(Error, Debug)]
pub enum SnapbackError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Group catalog structural errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// The requested group filter matched nothing
    #[error("Group not found: {name} (available: {})", .available.join(", "))]
    GroupNotFound {
        name: String,
        available: Vec<String>,
    },

    /// Secret-store retrieval errors (authentication, connectivity, empty value)
    #[error("Secret error: {0}")]
    Secret(String),

    /// Malformed retention specification for a single group
    #[error("Retention error: {0}")]
    Retention(String),
}

impl SnapbackError {
    /// Create a "group not found" error carrying the names that do exist
    pub fn group_not_found(name: impl Into<String>, available: Vec<String>) -> Self {
        Self::GroupNotFound {
            name: name.into(),
            available,
        }
    }

    /// Check if this is a "group not found" error
    pub fn is_group_not_found(&self) -> bool {
        matches!(self, Self::GroupNotFound { .. })
    }

    /// Check if this is a retention error (soft, per-group)
    pub fn is_retention(&self) -> bool {
        matches!(self, Self::Retention(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for SnapbackError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SnapbackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for snapback operations
pub type SnapbackResult<T> = Result<T, SnapbackError>;
