/*!
 * Local filesystem input
 *
 * Produces the pipeline's input shapes from a directory on disk: either a
 * flat list of files tagged with relative paths, or a root directory entry
 * whose children are listed in batches.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob_match::glob_match;
use ignore::WalkBuilder;
use walkdir::WalkDir;

use crate::classifier::mime_type_for_path;
use crate::config::{Config, SourceMode};
use crate::error::{RepoTreeError, Result};
use crate::normalizer::{DirectoryEntry, EntryReader, FileHandle, Input, SourceFile};
use crate::utils::DEFAULT_IGNORE;

/// Children handed out per `read_entries` call
pub const READ_BATCH_SIZE: usize = 100;

/// A file on disk
#[derive(Debug, Clone)]
pub struct FsFile {
    path: PathBuf,
    size: u64,
    mime_type: Option<&'static str>,
}

impl FsFile {
    /// Stat a file on disk
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let size = fs::metadata(&path)?.len();
        let mime_type = mime_type_for_path(&path);
        Ok(Self {
            path,
            size,
            mime_type,
        })
    }
}

impl FileHandle for FsFile {
    fn size(&self) -> u64 {
        self.size
    }

    fn mime_type(&self) -> Option<&str> {
        self.mime_type
    }

    fn read_text(&self) -> io::Result<String> {
        // Fails with InvalidData on content that is not UTF-8
        fs::read_to_string(&self.path)
    }
}

/// Name based filtering shared by both input shapes
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    ignore_patterns: Vec<String>,
    include_patterns: Vec<String>,
    /// Absolute paths of exports this run may read back in
    output_files: Vec<PathBuf>,
}

impl PathFilter {
    /// Filter for a scan rooted at the canonical `root`
    pub fn new(config: &Config, root: &Path) -> Self {
        let repo_name = Scanner::leaf_name(root);
        let mut output_files: Vec<PathBuf> = config
            .output_path(&repo_name)
            .and_then(|out| resolve_output(&out))
            .into_iter()
            .collect();
        // A default export left inside the target by an earlier run
        if config.output_file.is_none() {
            output_files.push(root.join(format!("{}_analysis.txt", repo_name)));
        }

        Self {
            ignore_patterns: config.ignore_patterns.clone(),
            include_patterns: config.include_patterns.clone(),
            output_files,
        }
    }

    /// Check if an entry should be ignored based on patterns and defaults
    pub fn should_ignore(&self, path: &Path) -> bool {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();

        if self
            .ignore_patterns
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_IGNORE.iter().copied())
            .any(|pattern| glob_match(pattern, &file_name))
        {
            return true;
        }

        // Don't pick up a previous export
        self.output_files.iter().any(|out| out == path)
    }

    /// Check if a file should be included based on patterns
    pub fn should_include(&self, path: &Path) -> bool {
        if self.include_patterns.is_empty() {
            return true;
        }

        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        self.include_patterns
            .iter()
            .any(|pattern| glob_match(pattern, &file_name))
    }

    /// Whether a listed child should be kept
    fn keep(&self, path: &Path, is_dir: bool) -> bool {
        !self.should_ignore(path) && (is_dir || self.should_include(path))
    }
}

/// Absolute form of an output path, with its directory canonicalized
fn resolve_output(out: &Path) -> Option<PathBuf> {
    let abs = if out.is_absolute() {
        out.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(out)
    };
    let parent = abs.parent()?;
    let name = abs.file_name()?;
    let parent = fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
    Some(parent.join(name))
}

/// Settings shared by every directory entry of one scan
#[derive(Debug)]
struct ListingContext {
    filter: PathFilter,
    respect_gitignore: bool,
    gitignore_path: Option<PathBuf>,
}

/// List the direct children of a directory, sorted by name
fn list_children(context: &Arc<ListingContext>, dir: &Path) -> io::Result<Vec<FsEntry>> {
    let mut children: Vec<(PathBuf, bool)> = if context.respect_gitignore {
        let mut walker = WalkBuilder::new(dir);
        walker.max_depth(Some(1));
        if let Some(gitignore_path) = &context.gitignore_path {
            walker.add_custom_ignore_filename(gitignore_path);
        }

        walker
            .build()
            .filter_map(|r| r.map_err(|e| log::warn!("{}", e)).ok())
            .filter(|e| e.path() != dir)
            .filter_map(|e| {
                let ft = e.file_type()?;
                (ft.is_file() || ft.is_dir()).then(|| (e.into_path(), ft.is_dir()))
            })
            .collect()
    } else {
        let mut children = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            let ft = entry.file_type();
            if ft.is_file() || ft.is_dir() {
                children.push((entry.into_path(), ft.is_dir()));
            }
        }
        children
    };

    children.retain(|(path, is_dir)| context.filter.keep(path, *is_dir));
    children.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

    Ok(children
        .into_iter()
        .map(|(path, is_dir)| FsEntry::new(path, is_dir, Arc::clone(context)))
        .collect())
}

/// A file or directory on disk, listed lazily in batches
pub struct FsEntry {
    path: PathBuf,
    name: String,
    is_dir: bool,
    context: Arc<ListingContext>,
}

impl FsEntry {
    fn new(path: PathBuf, is_dir: bool, context: Arc<ListingContext>) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self {
            path,
            name,
            is_dir,
            context,
        }
    }
}

impl DirectoryEntry for FsEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_file(&self) -> bool {
        !self.is_dir
    }

    fn is_directory(&self) -> bool {
        self.is_dir
    }

    fn create_reader(&self) -> Box<dyn EntryReader> {
        Box::new(FsEntryReader {
            dir: self.path.clone(),
            context: Arc::clone(&self.context),
            pending: None,
        })
    }

    fn file(&self) -> io::Result<Box<dyn FileHandle>> {
        Ok(Box::new(FsFile::open(&self.path)?))
    }
}

/// Lists a directory once, then hands the children out in batches
struct FsEntryReader {
    dir: PathBuf,
    context: Arc<ListingContext>,
    pending: Option<std::vec::IntoIter<FsEntry>>,
}

impl EntryReader for FsEntryReader {
    fn read_entries(&mut self) -> io::Result<Vec<Box<dyn DirectoryEntry>>> {
        if self.pending.is_none() {
            self.pending = Some(list_children(&self.context, &self.dir)?.into_iter());
        }

        let Some(pending) = self.pending.as_mut() else {
            return Ok(Vec::new());
        };
        Ok(pending
            .by_ref()
            .take(READ_BATCH_SIZE)
            .map(|e| Box::new(e) as Box<dyn DirectoryEntry>)
            .collect())
    }
}

/// Builds pipeline input from a local directory
pub struct Scanner {
    /// Scanner configuration
    config: Config,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Scan the target directory into the configured input shape
    pub fn scan(&self) -> Result<Input> {
        let abs_path = fs::canonicalize(&self.config.target_dir).map_err(|e| {
            RepoTreeError::PathNotFound(format!("{}: {}", self.config.target_dir.display(), e))
        })?;

        match self.config.source {
            SourceMode::Files => Ok(self.scan_files(&abs_path)),
            SourceMode::Entries => Ok(self.scan_entries(&abs_path)),
        }
    }

    /// Last path component as a string
    fn leaf_name(path: &Path) -> String {
        path.file_name().unwrap_or_default().to_string_lossy().to_string()
    }

    /// Recursive walk into a flat list tagged with relative paths
    fn scan_files(&self, abs_path: &Path) -> Input {
        let root_name = Self::leaf_name(abs_path);
        let filter = PathFilter::new(&self.config, abs_path);
        let mut files = Vec::new();

        let paths: Vec<PathBuf> = if self.config.respect_gitignore {
            let mut walker = WalkBuilder::new(abs_path);
            walker.sort_by_file_name(|a, b| a.cmp(b));
            if let Some(gitignore_path) = &self.config.gitignore_path {
                walker.add_custom_ignore_filename(gitignore_path);
            }
            let prune = filter.clone();
            walker.filter_entry(move |e| e.depth() == 0 || !prune.should_ignore(e.path()));

            walker
                .build()
                .filter_map(|r| r.map_err(|e| log::warn!("{}", e)).ok())
                .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
                .map(|e| e.into_path())
                .collect()
        } else {
            WalkDir::new(abs_path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !filter.should_ignore(e.path()))
                .filter_map(|r| r.map_err(|e| log::warn!("{}", e)).ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .collect()
        };

        for path in paths {
            if !filter.should_include(&path) {
                continue;
            }
            let rel = path.strip_prefix(abs_path).unwrap_or(&path);
            let relative_path = std::iter::once(root_name.clone())
                .chain(rel.components().map(|c| c.as_os_str().to_string_lossy().to_string()))
                .collect::<Vec<_>>()
                .join("/");

            match FsFile::open(&path) {
                Ok(handle) => {
                    let name = Self::leaf_name(&path);
                    files.push(SourceFile::new(name, Box::new(handle)).with_relative_path(relative_path));
                }
                Err(e) => log::warn!("Error processing {}: {}", path.display(), e),
            }
        }

        Input::Files(files)
    }

    /// Root directory entry with batched child listing
    fn scan_entries(&self, abs_path: &Path) -> Input {
        let context = Arc::new(ListingContext {
            filter: PathFilter::new(&self.config, abs_path),
            respect_gitignore: self.config.respect_gitignore,
            gitignore_path: self.config.gitignore_path.clone(),
        });
        let root = FsEntry::new(abs_path.to_path_buf(), true, context);
        Input::Entries(vec![Box::new(root)])
    }
}
