//! Builder configuration

use serde::{Deserialize, Serialize};

/// Configuration for [`HierarchyBuilder`](crate::HierarchyBuilder).
///
/// The only structural knob is how many roots the taxonomy may have. By
/// default exactly one root is required and the tree is returned as a single
/// node; forest mode accepts any number of roots.
///
/// Hosts usually embed this in their own config file:
///
/// ```yaml
/// expected_root_count: 1
/// forest: false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Number of records with no parent that validation must find.
    /// Ignored in forest mode.
    pub expected_root_count: usize,

    /// Accept any number of roots and return the tree as a forest
    pub forest: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            expected_root_count: 1,
            forest: false,
        }
    }
}

impl BuilderConfig {
    /// Create a config requiring a single root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that accepts any number of roots.
    pub fn forest() -> Self {
        Self {
            forest: true,
            ..Default::default()
        }
    }

    /// Create a config requiring exactly `count` roots.
    pub fn with_expected_root_count(count: usize) -> Self {
        Self {
            expected_root_count: count,
            forest: false,
        }
    }

    /// Check whether `count` roots satisfy this config.
    pub fn accepts_root_count(&self, count: usize) -> bool {
        self.forest || count == self.expected_root_count
    }

    /// Whether the tree comes back as a single node rather than a forest.
    pub fn yields_single_tree(&self) -> bool {
        !self.forest && self.expected_root_count == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_requires_one_root() {
        let config = BuilderConfig::default();
        assert!(config.accepts_root_count(1));
        assert!(!config.accepts_root_count(0));
        assert!(!config.accepts_root_count(2));
        assert!(config.yields_single_tree());
    }

    #[test]
    fn test_forest_accepts_anything() {
        let config = BuilderConfig::forest();
        assert!(config.accepts_root_count(0));
        assert!(config.accepts_root_count(7));
        assert!(!config.yields_single_tree());
    }

    #[test]
    fn test_expected_count_other_than_one_is_a_forest() {
        let config = BuilderConfig::with_expected_root_count(3);
        assert!(config.accepts_root_count(3));
        assert!(!config.accepts_root_count(1));
        assert!(!config.yields_single_tree());
    }
}
