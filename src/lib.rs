//! snapback - Group-oriented backup orchestrator
//!
//! This library drives periodic, multi-target backups against a single remote
//! restic repository. Filesystem paths are grouped into named backup groups,
//! each with its own retention policy; the run authenticates once to a secret
//! store for the repository passphrase, then processes groups strictly in
//! catalog order, isolating per-group failures so one bad target never aborts
//! the whole run.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Config file resolution and run settings
//! - `error`: Custom error types
//! - `catalog`: Group catalog parsing, filtering, and retention resolution
//! - `engine`: Adapters for the external backup engine and free-space probe
//! - `secrets`: Repository passphrase retrieval from the secret store
//! - `run`: The orchestrator loop, run summary, and metrics sink
//! - `notify`: Syslog-style run notification
//!
//! # Example
//!
//! ```rust,ignore
//! use snapback::catalog::Catalog;
//! use snapback::config::Settings;
//! use snapback::run::{run_groups, FileMetricsSink};
//!
//! let settings = Settings::load_default()?;
//! let catalog = Catalog::parse(settings.catalog_value()?)?;
//! let groups = catalog.filtered(None)?;
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod run;
pub mod secrets;

pub use error::SnapbackError;
