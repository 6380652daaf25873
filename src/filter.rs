/*!
 * Inclusion filter
 *
 * An `InclusionMap` records per-path visibility overrides. A path with no
 * entry is included. Updates never touch the caller's map; they return a
 * new one.
 */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tree::{descendant_paths, find_node};
use crate::types::{AnalysisResult, TreeNode};

/// Path to visibility override, absent means included
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InclusionMap(HashMap<String, bool>);

impl InclusionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with every path of a result explicitly included
    pub fn all_included(result: &AnalysisResult) -> Self {
        Self(
            result
                .flat_structure
                .iter()
                .map(|r| (r.path.clone(), true))
                .collect(),
        )
    }

    /// Explicit override for a path, if any
    pub fn get(&self, path: &str) -> Option<bool> {
        self.0.get(path).copied()
    }

    /// Paths explicitly marked excluded, sorted
    pub fn excluded_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .0
            .iter()
            .filter(|(_, &included)| !included)
            .map(|(path, _)| path.as_str())
            .collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, bool)> for InclusionMap {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether a path is included
pub fn is_included(path: &str, map: &InclusionMap) -> bool {
    map.get(path).unwrap_or(true)
}

/// Set a path's inclusion, cascading to all of its descendants
///
/// Descendants lose any individual override. Ancestors are left alone. A
/// path missing from the tree only updates its own key.
pub fn set_inclusion(map: &InclusionMap, path: &str, included: bool, tree: &[TreeNode]) -> InclusionMap {
    let mut updated = map.clone();
    updated.0.insert(path.to_string(), included);

    if let Some(node) = find_node(tree, path) {
        for descendant in descendant_paths(node) {
            updated.0.insert(descendant.to_string(), included);
        }
    }

    updated
}

/// Totals over the included part of a result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilteredSummary {
    /// Included files that were read as text
    pub files: usize,
    /// Tokens of those files
    pub tokens: usize,
    /// Included directories
    pub directories: usize,
}

/// Count what survives the filter
pub fn filtered_summary(result: &AnalysisResult, map: &InclusionMap) -> FilteredSummary {
    result
        .flat_structure
        .iter()
        .filter(|r| is_included(&r.path, map))
        .fold(FilteredSummary::default(), |mut acc, record| {
            if record.is_directory() {
                acc.directories += 1;
            } else if result.file_contents.contains_key(&record.path) {
                acc.files += 1;
                acc.tokens += record.tokens;
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;
    use crate::types::FlatRecord;

    fn sample_tree() -> Vec<TreeNode> {
        build_tree(&[
            FlatRecord::directory("repo", "repo", ""),
            FlatRecord::file("a.txt", "repo/a.txt", "repo", 1),
            FlatRecord::directory("sub", "repo/sub", "repo"),
            FlatRecord::file("b.txt", "repo/sub/b.txt", "repo/sub", 1),
            FlatRecord::directory("deep", "repo/sub/deep", "repo/sub"),
            FlatRecord::file("c.txt", "repo/sub/deep/c.txt", "repo/sub/deep", 1),
        ])
    }

    #[test]
    fn test_absent_means_included() {
        let map = InclusionMap::new();
        assert!(is_included("anything", &map));
    }

    #[test]
    fn test_cascade_to_descendants() {
        let tree = sample_tree();
        let map = set_inclusion(&InclusionMap::new(), "repo/sub", false, &tree);

        for path in ["repo/sub", "repo/sub/b.txt", "repo/sub/deep", "repo/sub/deep/c.txt"] {
            assert!(!is_included(path, &map), "{} should be excluded", path);
        }
        assert!(is_included("repo", &map));
        assert!(is_included("repo/a.txt", &map));
        assert_eq!(map.get("repo"), None);
    }

    #[test]
    fn test_cascade_overrides_individual_settings() {
        let tree = sample_tree();
        let map = set_inclusion(&InclusionMap::new(), "repo/sub/b.txt", false, &tree);
        let map = set_inclusion(&map, "repo/sub", true, &tree);
        assert!(is_included("repo/sub/b.txt", &map));
    }

    #[test]
    fn test_file_toggle_only_affects_file() {
        let tree = sample_tree();
        let map = set_inclusion(&InclusionMap::new(), "repo/a.txt", false, &tree);
        assert_eq!(map.len(), 1);
        assert_eq!(map.excluded_paths(), vec!["repo/a.txt"]);
    }

    #[test]
    fn test_unknown_path_sets_single_key() {
        let tree = sample_tree();
        let map = set_inclusion(&InclusionMap::new(), "elsewhere", false, &tree);
        assert_eq!(map.len(), 1);
        assert!(!is_included("elsewhere", &map));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let tree = sample_tree();
        let original = InclusionMap::new();
        let _ = set_inclusion(&original, "repo", false, &tree);
        assert!(original.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let tree = sample_tree();
        let once = set_inclusion(&InclusionMap::new(), "repo/sub", false, &tree);
        let twice = set_inclusion(&once, "repo/sub", false, &tree);
        assert_eq!(once, twice);
    }
}
