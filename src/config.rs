/*!
 * Configuration handling for repotree
 */

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

use crate::ensure;
use crate::error::Result;
use crate::tokenizer::Strategy;
use crate::writer::ExportFormat;

/// How the target directory is handed to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceMode {
    /// Flat file list tagged with relative paths
    #[default]
    Files,
    /// Root directory entry whose children are listed in batches
    Entries,
}

/// Command-line arguments for repotree
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "repotree",
    version = env!("CARGO_PKG_VERSION"),
    about = "Export a directory tree and its text files as LLM context",
    long_about = "Walks a directory, estimates tokens for every text file, and writes a plain-text export with a summary, an indented directory tree and the content of every included file."
)]
pub struct Args {
    /// Target directory to process
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output file name (default: <repo>_analysis.txt)
    pub output_file: Option<String>,

    /// Comma-separated list of patterns to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Comma-separated list of patterns to include (if specified, only matching files are included)
    #[clap(long, value_delimiter = ',')]
    pub include_patterns: Vec<String>,

    /// Comma-separated list of paths to leave out of the export, with everything below them
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Number of threads to use for processing
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Respect .gitignore files (default: true)
    #[clap(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub respect_gitignore: bool,

    /// Path to custom .gitignore file
    #[clap(long)]
    pub gitignore_path: Option<String>,

    /// Token estimation strategy
    #[clap(long, value_enum, default_value_t = Strategy::default())]
    pub tokenizer: Strategy,

    /// Export document format
    #[clap(long, value_enum, default_value_t = ExportFormat::default())]
    pub format: ExportFormat,

    /// How the directory is fed to the pipeline
    #[clap(long, value_enum, default_value_t = SourceMode::default())]
    pub source: SourceMode,

    /// Write the export to stdout instead of a file
    #[clap(long)]
    pub stdout: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Target directory to process
    pub target_dir: PathBuf,

    /// Output file path, derived from the repository name when unset
    pub output_file: Option<PathBuf>,

    /// Patterns to ignore
    pub ignore_patterns: Vec<String>,

    /// Patterns to include (if empty, include all)
    pub include_patterns: Vec<String>,

    /// Paths switched off in the export
    pub exclude: Vec<String>,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// Whether to respect .gitignore files
    pub respect_gitignore: bool,

    /// Path to custom .gitignore file
    pub gitignore_path: Option<PathBuf>,

    /// Token estimation strategy
    pub tokenizer: Strategy,

    /// Export document format
    pub format: ExportFormat,

    /// Input shape handed to the pipeline
    pub source: SourceMode,

    /// Write the export to stdout
    pub stdout: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            output_file: None,
            ignore_patterns: Vec::new(),
            include_patterns: Vec::new(),
            exclude: Vec::new(),
            num_threads: 4,
            respect_gitignore: true,
            gitignore_path: None,
            tokenizer: Strategy::default(),
            format: ExportFormat::default(),
            source: SourceMode::default(),
            stdout: false,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        Self {
            target_dir: PathBuf::from(args.directory_path),
            output_file: args.output_file.map(PathBuf::from),
            ignore_patterns: args.ignore_patterns,
            include_patterns: args.include_patterns,
            exclude: args.exclude,
            num_threads: args.threads,
            respect_gitignore: args.respect_gitignore,
            gitignore_path: args.gitignore_path.map(PathBuf::from),
            tokenizer: args.tokenizer,
            format: args.format,
            source: args.source,
            stdout: args.stdout,
        }
    }

    /// Where the export goes, `None` for stdout
    pub fn output_path(&self, repo_name: &str) -> Option<PathBuf> {
        if self.stdout {
            return None;
        }
        Some(
            self.output_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("{}_analysis.txt", repo_name))),
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        // Check if output file directory exists
        if let Some(parent) = self.output_file.as_ref().and_then(|p| p.parent()) {
            ensure!(
                parent.as_os_str().is_empty() || parent.exists(),
                PathNotFound,
                "Output directory not found: {}",
                parent.display()
            );
        }

        // Check if custom gitignore file exists
        if let Some(path) = &self.gitignore_path {
            ensure!(
                path.exists(),
                PathNotFound,
                "Custom .gitignore file not found: {}",
                path.display()
            );
        }

        ensure!(self.num_threads > 0, Config, "Thread count must be at least 1");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoTreeError;

    fn parse(args: &[&str]) -> Config {
        let argv = std::iter::once("repotree").chain(args.iter().copied());
        Config::from_args(Args::parse_from(argv))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.target_dir, PathBuf::from("."));
        assert_eq!(config.output_file, None);
        assert_eq!(config.num_threads, 4);
        assert!(config.respect_gitignore);
        assert_eq!(config.tokenizer, Strategy::Chars);
        assert_eq!(config.format, ExportFormat::Text);
        assert_eq!(config.source, SourceMode::Files);
    }

    #[test]
    fn test_comma_separated_lists() {
        let config = parse(&[
            "src",
            "out.txt",
            "--ignore-patterns",
            "*.log,tmp",
            "--exclude",
            "repo/docs,repo/a.txt",
            "--tokenizer",
            "words",
            "--source",
            "entries",
            "--respect-gitignore",
            "false",
        ]);
        assert_eq!(config.target_dir, PathBuf::from("src"));
        assert_eq!(config.output_file, Some(PathBuf::from("out.txt")));
        assert_eq!(config.ignore_patterns, vec!["*.log", "tmp"]);
        assert_eq!(config.exclude, vec!["repo/docs", "repo/a.txt"]);
        assert_eq!(config.tokenizer, Strategy::Words);
        assert_eq!(config.source, SourceMode::Entries);
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn test_output_path() {
        let config = Config::default();
        assert_eq!(config.output_path("demo"), Some(PathBuf::from("demo_analysis.txt")));

        let config = Config {
            stdout: true,
            ..Config::default()
        };
        assert_eq!(config.output_path("demo"), None);
    }

    #[test]
    fn test_validate_missing_target() {
        let config = Config {
            target_dir: PathBuf::from("/definitely/not/here"),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(RepoTreeError::PathNotFound(_))));
    }

    #[test]
    fn test_validate_zero_threads() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            target_dir: dir.path().to_path_buf(),
            num_threads: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(RepoTreeError::Config(_))));
    }
}
