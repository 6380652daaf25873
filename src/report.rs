/*!
 * Reporting functionality for repotree
 *
 * Renders a console summary of an analysis run with the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::filter::{filtered_summary, is_included, FilteredSummary, InclusionMap};
use crate::types::{AnalysisResult, SkipReason};
use crate::utils::format_file_size;
use crate::writer::format_kilo_tokens;

/// Number of files listed when a run has many
const TOP_FILES: usize = 10;

/// One file row of the report
#[derive(Debug, Clone)]
pub struct FileReportInfo {
    /// Canonical path
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// Estimated tokens
    pub tokens: usize,
}

/// Statistics for one run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Repository name
    pub repo_name: String,
    /// Where the export went
    pub output: String,
    /// Time taken by analysis and export
    pub duration: Duration,
    /// Totals before filtering
    pub total_files: usize,
    pub total_directories: usize,
    pub total_tokens: usize,
    /// Totals after filtering
    pub filtered: FilteredSummary,
    /// Files skipped as binary
    pub binary_files: usize,
    /// Files skipped as too large
    pub oversized_files: usize,
    /// Files that could not be read
    pub failed_files: usize,
    /// Included text files, largest token count first
    pub file_details: Vec<FileReportInfo>,
}

impl ScanReport {
    /// Collect statistics from a result and its inclusion map
    pub fn new(result: &AnalysisResult, map: &InclusionMap, output: String, duration: Duration) -> Self {
        let count_skipped = |reason: SkipReason| {
            result
                .flat_structure
                .iter()
                .filter(|r| r.skipped == Some(reason))
                .count()
        };

        let mut file_details: Vec<FileReportInfo> = result
            .flat_structure
            .iter()
            .filter(|r| r.is_file() && is_included(&r.path, map))
            .filter(|r| result.file_contents.contains_key(&r.path))
            .map(|r| FileReportInfo {
                path: r.path.clone(),
                size: r.size,
                tokens: r.tokens,
            })
            .collect();
        file_details.sort_by(|a, b| b.tokens.cmp(&a.tokens).then_with(|| a.path.cmp(&b.path)));

        Self {
            repo_name: result.repo_name.clone(),
            output,
            duration,
            total_files: result.total_files,
            total_directories: result.total_directories,
            total_tokens: result.total_tokens,
            filtered: filtered_summary(result, map),
            binary_files: count_skipped(SkipReason::Binary),
            oversized_files: count_skipped(SkipReason::Oversized),
            failed_files: count_skipped(SkipReason::ReadFailed),
            file_details,
        }
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for analysis runs
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stderr, keeping stdout free for the export
    pub fn print_report(&self, report: &ScanReport) {
        eprintln!("\n{}", self.generate_report(report));
    }

    // Keep the trailing segments of a long path
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut segments = Vec::new();
        let mut current_len = 3; // "..."
        for part in path.split('/').rev() {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(part);
            current_len += part_len;
        }

        if segments.is_empty() {
            let tail: String = path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn styled(mut table: Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let row = |key: &str, value: String| SummaryRow {
            key: key.to_string(),
            value,
        };

        let mut rows = vec![
            row("📁 Repository", report.repo_name.clone()),
            row("📂 Output", report.output.clone()),
            row("⏱️ Process Time", format!("{:.4?}", report.duration)),
            row(
                "📄 Files Analyzed",
                format!(
                    "{} of {}",
                    self.format_number(report.filtered.files),
                    self.format_number(report.total_files)
                ),
            ),
            row(
                "🗂️ Directories",
                format!(
                    "{} of {}",
                    self.format_number(report.filtered.directories),
                    self.format_number(report.total_directories)
                ),
            ),
            row(
                "📦 Estimated Tokens",
                format!(
                    "{} of {}",
                    format_kilo_tokens(report.filtered.tokens),
                    format_kilo_tokens(report.total_tokens)
                ),
            ),
        ];

        let skipped = report.binary_files + report.oversized_files + report.failed_files;
        if skipped > 0 {
            rows.push(row(
                "⏭️ Skipped",
                format!(
                    "{} binary, {} oversized, {} unreadable",
                    report.binary_files, report.oversized_files, report.failed_files
                ),
            ));
        }

        Self::styled(Table::new(rows))
    }

    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Size")]
            size: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        let files_to_show = if report.file_details.len() > 15 {
            &report.file_details[..TOP_FILES]
        } else {
            &report.file_details[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|info| FileRow {
                path: self.format_path(&info.path, 60),
                size: format_file_size(info.size),
                tokens: self.format_number(info.tokens),
            })
            .collect();

        Self::styled(Table::new(rows))
    }

    fn generate_console_report(&self, report: &ScanReport) -> String {
        let summary_table = self.create_summary_table(report);
        let summary_title = "✅  ANALYSIS COMPLETE";

        if report.file_details.is_empty() {
            return format!("{}\n{}", summary_title, summary_table);
        }

        let files_table = self.create_files_table(report);
        let files_title = if report.file_details.len() > 15 {
            "📋  TOP 10 FILES BY ESTIMATED TOKENS  📋"
        } else {
            "📋  INCLUDED FILES"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;
    use crate::types::FlatRecord;
    use std::collections::HashMap;

    fn sample_result() -> AnalysisResult {
        let mut big = FlatRecord::file("big.rs", "repo/big.rs", "repo", 4000);
        big.tokens = 1000;
        let mut small = FlatRecord::file("small.rs", "repo/small.rs", "repo", 40);
        small.tokens = 10;
        let mut logo = FlatRecord::file("logo.png", "repo/logo.png", "repo", 99);
        logo.binary = true;
        logo.skipped = Some(SkipReason::Binary);
        let flat = vec![FlatRecord::directory("repo", "repo", ""), small, big, logo];

        let mut contents = HashMap::new();
        contents.insert("repo/big.rs".to_string(), "x".repeat(4000));
        contents.insert("repo/small.rs".to_string(), "y".repeat(40));

        AnalysisResult {
            repo_name: "repo".to_string(),
            total_tokens: 1010,
            total_files: 2,
            total_directories: 1,
            directory_structure: build_tree(&flat),
            file_contents: contents,
            flat_structure: flat,
        }
    }

    #[test]
    fn test_report_collects_statistics() {
        let result = sample_result();
        let report = ScanReport::new(&result, &InclusionMap::new(), "out.txt".into(), Duration::ZERO);

        assert_eq!(report.binary_files, 1);
        assert_eq!(report.failed_files, 0);
        assert_eq!(report.filtered.files, 2);
        let paths: Vec<&str> = report.file_details.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["repo/big.rs", "repo/small.rs"]);
    }

    #[test]
    fn test_report_respects_exclusions() {
        let result = sample_result();
        let map: InclusionMap = [("repo/big.rs".to_string(), false)].into_iter().collect();
        let report = ScanReport::new(&result, &map, "out.txt".into(), Duration::ZERO);

        assert_eq!(report.filtered.tokens, 10);
        assert_eq!(report.file_details.len(), 1);
    }

    #[test]
    fn test_console_report_contents() {
        let result = sample_result();
        let report = ScanReport::new(&result, &InclusionMap::new(), "out.txt".into(), Duration::ZERO);
        let text = Reporter::new(ReportFormat::ConsoleTable).generate_report(&report);

        assert!(text.contains("ANALYSIS COMPLETE"));
        assert!(text.contains("repo/big.rs"));
        assert!(text.contains("1.0K"));
        assert!(text.contains("1 binary, 0 oversized, 0 unreadable"));
    }

    #[test]
    fn test_format_path_keeps_tail() {
        let reporter = Reporter::new(ReportFormat::ConsoleTable);
        assert_eq!(reporter.format_path("repo/a.rs", 60), "repo/a.rs");
        assert_eq!(reporter.format_path("repo/very/deep/tree/file.rs", 16), ".../tree/file.rs");
    }
}
