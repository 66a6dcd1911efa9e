//! Configuration module for snapback
//!
//! This module provides configuration management including:
//! - Config file path resolution (env override, then XDG)
//! - Run settings persistence (repository, secret store, catalog source)

pub mod settings;

pub use settings::Settings;
