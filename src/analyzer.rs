/*!
 * Analysis pipeline
 *
 * normalize -> synthesize records -> classify and read files -> estimate
 * tokens -> build tree
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;

use crate::classifier::classify;
use crate::error::{RepoTreeError, Result};
use crate::normalizer::{normalize, synthesize_records, FileHandle, Input, PendingFile};
use crate::tokenizer::{tokenizer_for, Strategy, Tokenizer};
use crate::tree::build_tree;
use crate::types::{AnalysisResult, Progress, ProgressReporter, SkipReason};

/// What happened to one file
enum FileOutcome {
    Read { text: String, tokens: usize },
    Skipped(SkipReason),
}

/// Runs the analysis pipeline over one input
pub struct Analyzer {
    tokenizer: Box<dyn Tokenizer>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl Analyzer {
    /// Create an analyzer using the given estimation strategy
    pub fn new(strategy: Strategy) -> Self {
        Self {
            tokenizer: tokenizer_for(strategy),
        }
    }

    /// Create an analyzer with a caller supplied tokenizer
    pub fn with_tokenizer(tokenizer: Box<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Analyze an input and return the result
    ///
    /// File reads run on the rayon pool; the returned records keep
    /// enumeration order. A file that fails to read is recorded with zero
    /// tokens and left out of the contents.
    pub fn analyze<P>(&self, input: Input, progress: &P) -> Result<AnalysisResult>
    where
        P: ProgressReporter + Sync + ?Sized,
    {
        progress.report(&Progress::new("Starting analysis...", 0));

        if input.is_empty() {
            return Err(RepoTreeError::EmptyInput);
        }

        progress.report(&Progress::new("Scanning files...", 10));
        let normalized = normalize(input);
        if normalized.entries.is_empty() {
            return Err(RepoTreeError::EmptyInput);
        }
        log::info!(
            "Normalized {} entries for {}",
            normalized.entries.len(),
            normalized.repo_name
        );

        progress.report(&Progress::new("Analyzing files...", 30));
        let synthesized = synthesize_records(normalized.entries);
        let mut records = synthesized.records;

        let total = synthesized.files.len();
        let done = AtomicUsize::new(0);
        // Highest percentage reported so far; held while reporting so the
        // callback never sees a value go backwards
        let reported = Mutex::new(30u8);
        let outcomes: Vec<(usize, FileOutcome)> = synthesized
            .files
            .par_iter()
            .map(|pending| {
                let outcome = self.process_file(pending, &records[pending.record_index].path);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                let percentage = file_percentage(finished, total);
                if let Ok(mut last) = reported.lock() {
                    if percentage > *last {
                        *last = percentage;
                        progress.report(&Progress::new("Processing files...", percentage));
                    }
                }
                (pending.record_index, outcome)
            })
            .collect();

        let mut file_contents = HashMap::new();
        let mut total_tokens = 0;
        let mut total_files = 0;
        for (idx, outcome) in outcomes {
            let record = &mut records[idx];
            match outcome {
                FileOutcome::Read { text, tokens } => {
                    record.tokens = tokens;
                    total_tokens += tokens;
                    total_files += 1;
                    file_contents.insert(record.path.clone(), text);
                }
                FileOutcome::Skipped(reason) => {
                    record.tokens = 0;
                    record.binary = true;
                    record.skipped = Some(reason);
                }
            }
        }
        let total_directories = records.iter().filter(|r| r.is_directory()).count();

        progress.report(&Progress::new("Building directory tree...", 95));
        let directory_structure = build_tree(&records);

        log::info!(
            "Analyzed {} files, {} directories, {} tokens",
            total_files,
            total_directories,
            total_tokens
        );
        progress.report(&Progress::new("Analysis complete!", 100));

        Ok(AnalysisResult {
            repo_name: normalized.repo_name,
            total_tokens,
            total_files,
            total_directories,
            directory_structure,
            file_contents,
            flat_structure: records,
        })
    }

    /// Classify, read and count one file
    fn process_file(&self, pending: &PendingFile, path: &str) -> FileOutcome {
        let handle: &dyn FileHandle = pending.handle.as_ref();
        let classification = classify(handle.size(), handle.mime_type());

        if let Some(reason) = classification.skip_reason() {
            log::debug!("Skipping {} ({})", path, reason);
            return FileOutcome::Skipped(reason);
        }

        match handle.read_text() {
            Ok(text) => {
                let tokens = self.tokenizer.count_tokens(&text);
                log::debug!("Read {} ({} tokens)", path, tokens);
                FileOutcome::Read { text, tokens }
            }
            Err(e) => {
                log::warn!("Error processing file {}: {}", path, e);
                FileOutcome::Skipped(SkipReason::ReadFailed)
            }
        }
    }
}

/// Progress through the per-file phase, spread over 30..=90
fn file_percentage(finished: usize, total: usize) -> u8 {
    if total == 0 {
        return 90;
    }
    (30 + (finished * 60) / total).min(90) as u8
}
