//! Backup groups and catalog parsing
//!
//! A `BackupGroup` names an ordered set of filesystem paths that are backed
//! up and pruned together under one tag. The catalog is parsed once per run;
//! a structural failure here is fatal because without a valid catalog no
//! group identity is known.

use serde::Deserialize;

use crate::error::{SnapbackError, SnapbackResult};

use super::retention::RetentionSpec;

/// A named set of filesystem paths sharing one retention policy
#[derive(Debug, Clone, Deserialize)]
pub struct BackupGroup {
    /// Group name, used as the snapshot tag
    pub name: String,
    /// Paths to back up, in order; a group with no paths is skipped, not failed
    #[serde(default)]
    pub paths: Vec<String>,
    /// Raw retention specification, resolved lazily after a successful backup
    #[serde(default)]
    pub retention: RetentionSpec,
}

impl BackupGroup {
    /// Whether this group has anything to back up
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The parsed group catalog, in declaration order
#[derive(Debug, Clone)]
pub struct Catalog {
    groups: Vec<BackupGroup>,
}

impl Catalog {
    /// Parse a raw catalog value into typed groups
    ///
    /// Structural failure (not an array, wrong field types, empty group name)
    /// is fatal for the whole run.
    pub fn parse(raw: serde_json::Value) -> SnapbackResult<Self> {
        let groups: Vec<BackupGroup> = serde_json::from_value(raw)
            .map_err(|e| SnapbackError::Catalog(format!("Malformed group catalog: {}", e)))?;

        for group in &groups {
            if group.name.trim().is_empty() {
                return Err(SnapbackError::Catalog(
                    "Group name must not be empty".into(),
                ));
            }
        }

        Ok(Self { groups })
    }

    /// All groups, in catalog order
    pub fn groups(&self) -> &[BackupGroup] {
        &self.groups
    }

    /// Names of all groups, in catalog order (duplicates preserved)
    pub fn names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }

    /// Apply the optional name filter
    ///
    /// With no filter the full catalog is returned unchanged. With a filter,
    /// every group whose name matches exactly (case-sensitive) is kept, in
    /// catalog order; zero matches is a fatal configuration error carrying
    /// the available names.
    pub fn filtered(&self, filter: Option<&str>) -> SnapbackResult<Vec<BackupGroup>> {
        let Some(name) = filter else {
            return Ok(self.groups.clone());
        };

        let matches: Vec<BackupGroup> = self
            .groups
            .iter()
            .filter(|g| g.name == name)
            .cloned()
            .collect();

        if matches.is_empty() {
            return Err(SnapbackError::group_not_found(name, self.names()));
        }

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        Catalog::parse(serde_json::json!([
            {
                "name": "home",
                "paths": ["/home", "/root"],
                "retention": { "keep_daily": 14 }
            },
            {
                "name": "etc",
                "paths": ["/etc"]
            },
            {
                "name": "scratch",
                "paths": []
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_parse_preserves_order() {
        let catalog = sample_catalog();
        assert_eq!(catalog.names(), vec!["home", "etc", "scratch"]);
        assert_eq!(catalog.groups()[0].paths, vec!["/home", "/root"]);
        assert!(catalog.groups()[2].is_empty());
    }

    #[test]
    fn test_retention_defaults_when_block_absent() {
        let catalog = sample_catalog();
        let policy = catalog.groups()[1].retention.resolve().unwrap();
        assert_eq!(policy.keep_daily, 7);
    }

    #[test]
    fn test_malformed_catalog_is_fatal() {
        let err = Catalog::parse(serde_json::json!({"name": "not-a-list"})).unwrap_err();
        assert!(matches!(err, SnapbackError::Catalog(_)));

        let err = Catalog::parse(serde_json::json!([{"paths": ["/home"]}])).unwrap_err();
        assert!(matches!(err, SnapbackError::Catalog(_)));
    }

    #[test]
    fn test_empty_name_is_fatal() {
        let err = Catalog::parse(serde_json::json!([{"name": "  ", "paths": []}])).unwrap_err();
        assert!(matches!(err, SnapbackError::Catalog(_)));
    }

    #[test]
    fn test_no_filter_returns_all() {
        let catalog = sample_catalog();
        let groups = catalog.filtered(None).unwrap();
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_filter_exact_match() {
        let catalog = sample_catalog();
        let groups = catalog.filtered(Some("etc")).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "etc");
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let catalog = sample_catalog();
        let err = catalog.filtered(Some("Etc")).unwrap_err();
        assert!(err.is_group_not_found());
    }

    #[test]
    fn test_filter_no_match_lists_available_names() {
        let catalog = sample_catalog();
        let err = catalog.filtered(Some("nonexistent")).unwrap_err();
        match err {
            SnapbackError::GroupNotFound { name, available } => {
                assert_eq!(name, "nonexistent");
                assert_eq!(available, vec!["home", "etc", "scratch"]);
            }
            other => panic!("expected GroupNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_keeps_all_duplicate_matches_in_order() {
        let catalog = Catalog::parse(serde_json::json!([
            {"name": "home", "paths": ["/home/a"]},
            {"name": "etc", "paths": ["/etc"]},
            {"name": "home", "paths": ["/home/b"]}
        ]))
        .unwrap();

        let groups = catalog.filtered(Some("home")).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].paths, vec!["/home/a"]);
        assert_eq!(groups[1].paths, vec!["/home/b"]);
    }
}
