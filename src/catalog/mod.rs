//! Group catalog for snapback
//!
//! A catalog is an ordered list of backup groups, each naming a set of
//! filesystem paths and an optional retention specification. Catalog order is
//! processing order and is preserved end to end, including duplicate names.

pub mod group;
pub mod retention;

pub use group::{BackupGroup, Catalog};
pub use retention::{RetentionPolicy, RetentionSpec};
