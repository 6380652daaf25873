/*!
 * repotree - Turn a directory tree into token-counted LLM context
 *
 * Normalizes a collection of files or directory entries into canonical
 * paths, classifies and reads every file, estimates tokens, builds a nested
 * tree and renders a filtered plain-text export.
 */

pub mod error;

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod filter;
pub mod normalizer;
pub mod report;
pub mod scanner;
pub mod tokenizer;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use analyzer::Analyzer;
pub use config::{Config, SourceMode};
pub use error::{RepoTreeError, Result};
pub use filter::{filtered_summary, is_included, set_inclusion, FilteredSummary, InclusionMap};
pub use normalizer::{DirectoryEntry, EntryReader, FileHandle, Input, SourceFile};
pub use report::{FileReportInfo, ReportFormat, Reporter, ScanReport};
pub use scanner::Scanner;
pub use tokenizer::{estimate, Strategy, Tokenizer};
pub use tree::build_tree;
pub use types::{AnalysisResult, EntryKind, FlatRecord, Progress, ProgressReporter, SkipReason, TreeNode};
pub use utils::format_file_size;
pub use writer::{render_full_export, render_tree_export, render_tree_text, ExportFormat, ExportWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
