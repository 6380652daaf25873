/*!
 * Text export rendering and writing for repotree
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::ValueEnum;
use strum::Display;

use crate::filter::{filtered_summary, is_included, InclusionMap};
use crate::types::{AnalysisResult, TreeNode};

/// Prefix of a root-level line
const ROOT_BRANCH: &str = "└── ";
/// Prefix of a nested line, after the indentation
const CHILD_BRANCH: &str = "├── ";
/// One level of indentation
const INDENT: &str = "    ";

/// Export document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    /// Summary, directory tree and file contents
    #[default]
    Text,
    /// Directory tree only
    Tree,
    /// Full analysis result as JSON
    Json,
}

/// Render the tree as indented text, one line per included node
///
/// Each node is checked on its own: an excluded directory hides its own line
/// but its children are still visited.
pub fn render_tree_text(tree: &[TreeNode], depth: usize, map: &InclusionMap) -> String {
    let mut out = String::new();
    let mut stack: Vec<(&TreeNode, usize)> = tree.iter().rev().map(|n| (n, depth)).collect();

    while let Some((node, depth)) = stack.pop() {
        if is_included(node.path(), map) {
            if depth == 0 {
                out.push_str(ROOT_BRANCH);
            } else {
                out.push_str(&INDENT.repeat(depth - 1));
                out.push_str(CHILD_BRANCH);
            }
            out.push_str(node.name());
            if node.is_directory() {
                out.push('/');
            }
            out.push('\n');
        }

        if node.is_directory() {
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }

    out
}

/// Token total in thousands with one decimal, rounding halves up
///
/// Integer rounding, so 1150 is `1.2k` where binary float rounding would
/// give `1.1k`.
pub fn format_kilo_tokens(tokens: usize) -> String {
    let tenths = (tokens + 50) / 100;
    format!("{}.{}k", tenths / 10, tenths % 10)
}

/// "Directory structure:" header followed by the tree text
pub fn render_tree_export(result: &AnalysisResult, map: &InclusionMap) -> String {
    format!(
        "Directory structure:\n{}",
        render_tree_text(&result.directory_structure, 0, map)
    )
}

/// Full export: summary, tree and the content of every included file
pub fn render_full_export(result: &AnalysisResult, map: &InclusionMap) -> String {
    let summary = filtered_summary(result, map);

    let mut out = format!(
        "Repository: {}\nFiles analyzed: {}\nEstimated tokens: {}\n\n",
        result.repo_name,
        summary.files,
        format_kilo_tokens(summary.tokens)
    );
    out.push_str(&render_tree_export(result, map));
    out.push_str("\n\nFiles Content:\n\n");

    for record in result.flat_structure.iter().filter(|r| r.is_file()) {
        if !is_included(&record.path, map) {
            continue;
        }
        if let Some(content) = result.file_contents.get(&record.path) {
            out.push_str("--- ");
            out.push_str(&record.path);
            out.push_str(" ---\n\n");
            out.push_str(content);
            out.push_str("\n\n");
        }
    }

    out
}

/// Render a document in the requested format
pub fn render(result: &AnalysisResult, map: &InclusionMap, format: ExportFormat) -> io::Result<String> {
    match format {
        ExportFormat::Text => Ok(render_full_export(result, map)),
        ExportFormat::Tree => Ok(render_tree_export(result, map)),
        ExportFormat::Json => serde_json::to_string_pretty(result).map_err(io::Error::from),
    }
}

/// Writes export documents to a file or stdout
pub struct ExportWriter {
    /// Destination file, stdout when `None`
    output_file: Option<PathBuf>,
    format: ExportFormat,
}

impl ExportWriter {
    /// Create a new export writer
    pub fn new(output_file: Option<PathBuf>, format: ExportFormat) -> Self {
        Self {
            output_file,
            format,
        }
    }

    /// Write the document and return the number of bytes written
    pub fn write(&self, result: &AnalysisResult, map: &InclusionMap) -> io::Result<usize> {
        let document = render(result, map, self.format)?;

        match &self.output_file {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                writer.write_all(document.as_bytes())?;
                writer.flush()?;
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(document.as_bytes())?;
                handle.flush()?;
            }
        }

        Ok(document.len())
    }
}
