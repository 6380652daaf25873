/*!
 * Core types and data structures for repotree
 */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::Display;

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory containing other entries
    Directory,
}

/// Why a file's content was not read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// Type tag marks the file as binary
    Binary,
    /// File exceeds the text size limit
    Oversized,
    /// Reading the file as text failed
    ReadFailed,
}

/// One file or directory entry, prior to tree construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    /// Leaf segment
    pub name: String,
    /// Slash-delimited path from the analysis root
    pub path: String,
    /// File or directory
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Path of the containing directory, empty at root level
    #[serde(default)]
    pub parent: String,
    /// Size in bytes, 0 for directories
    #[serde(default)]
    pub size: u64,
    /// Estimated token count
    #[serde(default)]
    pub tokens: usize,
    /// Content was not read as text
    #[serde(default)]
    pub binary: bool,
    /// Reason the content was skipped, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl FlatRecord {
    /// Create a directory record
    pub fn directory(name: impl Into<String>, path: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::Directory,
            parent: parent.into(),
            size: 0,
            tokens: 0,
            binary: false,
            skipped: None,
        }
    }

    /// Create a file record with no tokens counted yet
    pub fn file(
        name: impl Into<String>,
        path: impl Into<String>,
        parent: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::File,
            parent: parent.into(),
            size,
            tokens: 0,
            binary: false,
            skipped: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A record together with its ordered children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub record: FlatRecord,
    /// Children in first-seen order, empty for files
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(record: FlatRecord) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.record.path
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn is_directory(&self) -> bool {
        self.record.is_directory()
    }

    /// Number of nodes in this subtree, including itself
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children.iter());
        }
        total
    }
}

/// Result of one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Name of the analyzed repository
    pub repo_name: String,
    /// Tokens across every file read as text
    pub total_tokens: usize,
    /// Files read as text
    pub total_files: usize,
    /// Directories seen
    pub total_directories: usize,
    /// Root nodes of the directory tree
    pub directory_structure: Vec<TreeNode>,
    /// Text content keyed by path
    pub file_contents: HashMap<String, String>,
    /// Every record in traversal order
    pub flat_structure: Vec<FlatRecord>,
}

impl AnalysisResult {
    /// Look up a record by path
    pub fn record(&self, path: &str) -> Option<&FlatRecord> {
        self.flat_structure.iter().find(|r| r.path == path)
    }

    /// Default file name for a downloaded export
    pub fn export_file_name(&self) -> String {
        format!("{}_analysis.txt", self.repo_name)
    }
}

/// Progress notification emitted at pipeline milestones
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Human readable status line
    pub status: String,
    /// Completion percentage, 0..=100
    pub percentage: u8,
}

impl Progress {
    pub fn new(status: impl Into<String>, percentage: u8) -> Self {
        Self {
            status: status.into(),
            percentage: percentage.min(100),
        }
    }
}

/// Receives progress notifications from the analyzer
pub trait ProgressReporter {
    /// Called at each milestone
    fn report(&self, progress: &Progress);
}

impl<F> ProgressReporter for F
where
    F: Fn(&Progress),
{
    fn report(&self, progress: &Progress) {
        self(progress)
    }
}

/// Reporter that drops every notification
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _progress: &Progress) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_type_field() {
        let record = FlatRecord::file("a.txt", "repo/a.txt", "repo", 2);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["parent"], "repo");
        assert!(value.get("skipped").is_none());
    }

    #[test]
    fn test_tree_node_flattens_record() {
        let mut dir = TreeNode::new(FlatRecord::directory("repo", "repo", ""));
        dir.children
            .push(TreeNode::new(FlatRecord::file("a.txt", "repo/a.txt", "repo", 2)));
        let value = serde_json::to_value(&dir).unwrap();
        assert_eq!(value["path"], "repo");
        assert_eq!(value["children"][0]["name"], "a.txt");
        assert_eq!(dir.count(), 2);
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(Progress::new("done", 140).percentage, 100);
    }
}
