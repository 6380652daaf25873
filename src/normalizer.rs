/*!
 * Entry normalization
 *
 * Turns the supported input shapes into one ordered sequence of canonical
 * entries, then into flat records with a synthesized directory record for
 * every path prefix.
 */

use std::collections::HashSet;
use std::fmt;
use std::io;

use crate::types::FlatRecord;

/// Repository name used when no entry carries a root segment
pub const FALLBACK_REPO_NAME: &str = "repository";

/// A file whose content can be read as text
pub trait FileHandle: Send + Sync {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Opaque type tag, if the source provides one
    fn mime_type(&self) -> Option<&str>;

    /// Read the whole file as text
    fn read_text(&self) -> io::Result<String>;
}

/// Stateful batched reader over a directory's children
///
/// A single call may return only part of the listing. Callers must keep
/// calling until an empty batch comes back.
pub trait EntryReader {
    /// Read the next batch of children, empty when exhausted
    fn read_entries(&mut self) -> io::Result<Vec<Box<dyn DirectoryEntry>>>;
}

/// A node of a recursive directory listing
pub trait DirectoryEntry {
    /// Leaf name
    fn name(&self) -> &str;

    fn is_file(&self) -> bool;

    fn is_directory(&self) -> bool;

    /// Open a batched reader over the children of a directory
    fn create_reader(&self) -> Box<dyn EntryReader>;

    /// Materialize the file behind a file entry
    fn file(&self) -> io::Result<Box<dyn FileHandle>>;
}

/// A file from a flat list, optionally tagged with its relative path
pub struct SourceFile {
    /// Bare file name
    pub name: String,
    /// Path relative to the selected folder, including its name
    pub relative_path: Option<String>,
    pub handle: Box<dyn FileHandle>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, handle: Box<dyn FileHandle>) -> Self {
        Self {
            name: name.into(),
            relative_path: None,
            handle,
        }
    }

    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    /// Relative path if present, otherwise the bare name
    pub fn effective_path(&self) -> &str {
        match self.relative_path.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => &self.name,
        }
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("relative_path", &self.relative_path)
            .field("size", &self.handle.size())
            .finish()
    }
}

/// Supported input shapes
pub enum Input {
    /// Flat file list, with or without relative path hints
    Files(Vec<SourceFile>),
    /// Root entries of a recursive directory listing
    Entries(Vec<Box<dyn DirectoryEntry>>),
}

impl Input {
    /// Number of top-level items handed in
    pub fn len(&self) -> usize {
        match self {
            Input::Files(files) => files.len(),
            Input::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One entry in canonical form
pub struct CanonicalEntry {
    /// Non-empty path segments from the analysis root
    pub segments: Vec<String>,
    /// File handle, `None` for an explicit directory
    pub handle: Option<Box<dyn FileHandle>>,
}

impl CanonicalEntry {
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn is_directory(&self) -> bool {
        self.handle.is_none()
    }
}

/// Output of normalization
pub struct Normalized {
    pub repo_name: String,
    pub entries: Vec<CanonicalEntry>,
}

/// Split a path into non-empty segments, accepting either separator
pub fn split_segments(path: &str) -> Vec<String> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// First non-empty root segment across the entries, or the fallback
pub fn derive_repo_name(entries: &[CanonicalEntry]) -> String {
    entries
        .iter()
        .find_map(|e| e.segments.first())
        .cloned()
        .unwrap_or_else(|| FALLBACK_REPO_NAME.to_string())
}

/// Normalize any input shape
pub fn normalize(input: Input) -> Normalized {
    let entries = match input {
        Input::Files(files) => normalize_files(files),
        Input::Entries(roots) => normalize_entries(roots),
    };
    let repo_name = derive_repo_name(&entries);

    Normalized { repo_name, entries }
}

/// Shape A: flat list, hierarchy taken from relative paths when present
fn normalize_files(files: Vec<SourceFile>) -> Vec<CanonicalEntry> {
    files
        .into_iter()
        .filter_map(|file| {
            let segments = split_segments(file.effective_path());
            if segments.is_empty() {
                log::warn!("Skipping file with empty path: {:?}", file);
                return None;
            }
            Some(CanonicalEntry {
                segments,
                handle: Some(file.handle),
            })
        })
        .collect()
}

/// Shape B: depth-first traversal of batched directory readers
fn normalize_entries(roots: Vec<Box<dyn DirectoryEntry>>) -> Vec<CanonicalEntry> {
    let mut out = Vec::new();

    // Stack of (entry, parent segments); pushed in reverse to keep sibling order.
    let mut stack: Vec<(Box<dyn DirectoryEntry>, Vec<String>)> = roots
        .into_iter()
        .rev()
        .map(|entry| (entry, Vec::new()))
        .collect();

    while let Some((entry, parent)) = stack.pop() {
        let mut segments = parent;
        segments.extend(split_segments(entry.name()));

        if entry.is_file() {
            match entry.file() {
                Ok(handle) => out.push(CanonicalEntry {
                    segments,
                    handle: Some(handle),
                }),
                Err(e) => log::warn!("Error opening file {}: {}", segments.join("/"), e),
            }
        } else if entry.is_directory() {
            let children = drain_reader(entry.create_reader().as_mut(), &segments);
            for child in children.into_iter().rev() {
                stack.push((child, segments.clone()));
            }
            out.push(CanonicalEntry {
                segments,
                handle: None,
            });
        }
    }

    out
}

/// Call the batched reader until it returns an empty batch
///
/// A failed batch ends the listing for that directory; children already
/// read are kept.
pub fn drain_reader(
    reader: &mut dyn EntryReader,
    dir_segments: &[String],
) -> Vec<Box<dyn DirectoryEntry>> {
    let mut children = Vec::new();
    loop {
        match reader.read_entries() {
            Ok(batch) if batch.is_empty() => break,
            Ok(batch) => children.extend(batch),
            Err(e) => {
                log::warn!("Error reading directory {}: {}", dir_segments.join("/"), e);
                break;
            }
        }
    }
    children
}

/// A file still waiting for its content to be read
pub struct PendingFile {
    /// Index of its record in the flat sequence
    pub record_index: usize,
    pub handle: Box<dyn FileHandle>,
}

/// Flat records plus the files whose content still needs reading
pub struct Synthesized {
    pub records: Vec<FlatRecord>,
    pub files: Vec<PendingFile>,
}

/// Build flat records, synthesizing one directory record per unique prefix
///
/// Directory records appear in first-seen order, just before the first entry
/// that needs them. A path seen twice keeps its first record.
pub fn synthesize_records(entries: Vec<CanonicalEntry>) -> Synthesized {
    let mut records = Vec::new();
    let mut files = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for entry in entries {
        let Some((leaf, dirs)) = entry.segments.split_last() else {
            continue;
        };

        // Directory prefixes, including the entry itself when it is a directory
        let dir_segments = if entry.is_directory() {
            &entry.segments[..]
        } else {
            dirs
        };

        let mut current = String::new();
        for segment in dir_segments {
            let parent = current.clone();
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);

            if seen.insert(current.clone()) {
                records.push(FlatRecord::directory(segment.clone(), current.clone(), parent));
            }
        }

        let Some(handle) = entry.handle else {
            continue;
        };

        let path = entry.segments.join("/");
        if !seen.insert(path.clone()) {
            log::warn!("Duplicate path {}, keeping the first entry", path);
            continue;
        }

        files.push(PendingFile {
            record_index: records.len(),
            handle,
        });
        records.push(FlatRecord::file(leaf.clone(), path, current, 0));
    }

    for pending in &files {
        records[pending.record_index].size = pending.handle.size();
    }

    Synthesized { records, files }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct MemFile(&'static str);

    impl FileHandle for MemFile {
        fn size(&self) -> u64 {
            self.0.len() as u64
        }

        fn mime_type(&self) -> Option<&str> {
            None
        }

        fn read_text(&self) -> io::Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Clone)]
    enum MemEntry {
        File(&'static str),
        Dir(&'static str, Vec<MemEntry>, Rc<RefCell<usize>>),
    }

    fn dir(name: &'static str, children: Vec<MemEntry>) -> MemEntry {
        MemEntry::Dir(name, children, Rc::new(RefCell::new(0)))
    }

    /// Hands out children one at a time, counting calls
    struct OneByOne {
        children: Vec<MemEntry>,
        next: usize,
        calls: Rc<RefCell<usize>>,
    }

    impl EntryReader for OneByOne {
        fn read_entries(&mut self) -> io::Result<Vec<Box<dyn DirectoryEntry>>> {
            *self.calls.borrow_mut() += 1;
            let batch: Vec<Box<dyn DirectoryEntry>> = self
                .children
                .get(self.next)
                .map(|c| Box::new(c.clone()) as Box<dyn DirectoryEntry>)
                .into_iter()
                .collect();
            self.next += batch.len();
            Ok(batch)
        }
    }

    impl DirectoryEntry for MemEntry {
        fn name(&self) -> &str {
            match self {
                MemEntry::File(name) => *name,
                MemEntry::Dir(name, _, _) => *name,
            }
        }

        fn is_file(&self) -> bool {
            matches!(self, MemEntry::File(_))
        }

        fn is_directory(&self) -> bool {
            matches!(self, MemEntry::Dir(..))
        }

        fn create_reader(&self) -> Box<dyn EntryReader> {
            let (children, calls) = match self {
                MemEntry::Dir(_, children, calls) => (children.clone(), calls.clone()),
                MemEntry::File(_) => (Vec::new(), Rc::new(RefCell::new(0))),
            };
            Box::new(OneByOne {
                children,
                next: 0,
                calls,
            })
        }

        fn file(&self) -> io::Result<Box<dyn FileHandle>> {
            Ok(Box::new(MemFile("content")))
        }
    }

    fn paths(entries: &[CanonicalEntry]) -> Vec<String> {
        entries.iter().map(|e| e.path()).collect()
    }

    #[test]
    fn test_flat_files_use_relative_path_or_name() {
        let input = Input::Files(vec![
            SourceFile::new("a.txt", Box::new(MemFile("a"))).with_relative_path("repo/a.txt"),
            SourceFile::new("b.txt", Box::new(MemFile("b"))),
            SourceFile::new("c.txt", Box::new(MemFile("c"))).with_relative_path(""),
        ]);
        let normalized = normalize(input);
        assert_eq!(normalized.repo_name, "repo");
        assert_eq!(paths(&normalized.entries), vec!["repo/a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_repo_name_fallback() {
        let normalized = normalize(Input::Files(Vec::new()));
        assert_eq!(normalized.repo_name, FALLBACK_REPO_NAME);
    }

    #[test]
    fn test_split_segments_drops_empty_parts() {
        assert_eq!(split_segments("/repo//src/\\main.rs/"), vec!["repo", "src", "main.rs"]);
    }

    #[test]
    fn test_reader_is_drained_until_empty() {
        let root = dir(
            "repo",
            vec![
                MemEntry::File("a.txt"),
                MemEntry::File("b.txt"),
                dir("sub", vec![MemEntry::File("c.txt")]),
                MemEntry::File("d.txt"),
            ],
        );
        let calls = match &root {
            MemEntry::Dir(_, _, calls) => calls.clone(),
            MemEntry::File(_) => unreachable!(),
        };

        let normalized = normalize(Input::Entries(vec![Box::new(root)]));

        // Four single-child batches plus the terminating empty one
        assert_eq!(*calls.borrow(), 5);
        assert_eq!(
            paths(&normalized.entries),
            vec!["repo", "repo/a.txt", "repo/b.txt", "repo/sub", "repo/sub/c.txt", "repo/d.txt"]
        );
    }

    #[test]
    fn test_entries_keep_depth_first_order() {
        let root = dir(
            "repo",
            vec![
                MemEntry::File("a.txt"),
                dir("sub", vec![MemEntry::File("c.txt"), dir("empty", vec![])]),
                MemEntry::File("d.txt"),
            ],
        );
        let normalized = normalize(Input::Entries(vec![Box::new(root)]));
        let synthesized = synthesize_records(normalized.entries);
        let record_paths: Vec<&str> = synthesized.records.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(
            record_paths,
            vec![
                "repo",
                "repo/a.txt",
                "repo/sub",
                "repo/sub/c.txt",
                "repo/sub/empty",
                "repo/d.txt"
            ]
        );
        assert_eq!(synthesized.files.len(), 3);
    }

    #[test]
    fn test_directories_synthesized_once_in_first_seen_order() {
        let input = Input::Files(vec![
            SourceFile::new("a.txt", Box::new(MemFile("a"))).with_relative_path("repo/x/a.txt"),
            SourceFile::new("b.txt", Box::new(MemFile("bb"))).with_relative_path("repo/y/b.txt"),
            SourceFile::new("c.txt", Box::new(MemFile("c"))).with_relative_path("repo/x/c.txt"),
        ]);
        let synthesized = synthesize_records(normalize(input).entries);
        let summary: Vec<(&str, &str)> = synthesized
            .records
            .iter()
            .map(|r| (r.path.as_str(), r.parent.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("repo", ""),
                ("repo/x", "repo"),
                ("repo/x/a.txt", "repo/x"),
                ("repo/y", "repo"),
                ("repo/y/b.txt", "repo/y"),
                ("repo/x/c.txt", "repo/x"),
            ]
        );
        assert_eq!(synthesized.records[4].size, 2);
        assert_eq!(synthesized.files[1].record_index, 4);
    }

    #[test]
    fn test_duplicate_paths_keep_first() {
        let input = Input::Files(vec![
            SourceFile::new("a.txt", Box::new(MemFile("first"))).with_relative_path("repo/a.txt"),
            SourceFile::new("a.txt", Box::new(MemFile("second"))).with_relative_path("repo/a.txt"),
        ]);
        let synthesized = synthesize_records(normalize(input).entries);
        assert_eq!(synthesized.records.len(), 2);
        assert_eq!(synthesized.files.len(), 1);
        assert_eq!(synthesized.files[0].handle.read_text().unwrap(), "first");
    }
}
