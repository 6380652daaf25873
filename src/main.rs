/*!
 * Command-line interface for repotree
 */

use std::io;
use std::process;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;

use repotree::analyzer::Analyzer;
use repotree::config::{Args, Config};
use repotree::error::{Result, ResultExt};
use repotree::filter::{set_inclusion, InclusionMap};
use repotree::report::{ReportFormat, Reporter, ScanReport};
use repotree::scanner::Scanner;
use repotree::tokenizer::create_tokenizer;
use repotree::tree::find_node;
use repotree::types::Progress;
use repotree::writer::ExportWriter;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config = Config::from_args(args);
    config.validate()?;

    // Configure thread pool
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        log::warn!("Failed to set thread pool size: {}", e);
    }

    // Fail early when an exact tokenizer was asked for but cannot load
    let tokenizer = create_tokenizer(config.tokenizer)?;

    let progress = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {percent:>3}% {wide_msg:.dim.white}")
        .map_err(|e| repotree::error!(Unexpected, "invalid progress template: {}", e))?
        .progress_chars("█▓░");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📊 repotree");
    progress.set_message(format!("📂 {}", config.target_dir.display()));

    let start_time = Instant::now();

    let input = Scanner::new(config.clone()).scan()?;
    let on_progress = |p: &Progress| {
        progress.set_position(u64::from(p.percentage));
        progress.set_message(p.status.clone());
    };
    let result = Analyzer::with_tokenizer(tokenizer).analyze(input, &on_progress)?;

    let mut map = InclusionMap::new();
    for path in &config.exclude {
        if find_node(&result.directory_structure, path).is_none() {
            log::warn!("Excluded path {} is not in the tree", path);
        }
        map = set_inclusion(&map, path, false, &result.directory_structure);
    }

    let output_path = config.output_path(&result.repo_name);
    progress.set_message("Writing export...");
    ExportWriter::new(output_path.clone(), config.format)
        .write(&result, &map)
        .with_context(|| "Failed to write export")?;

    let duration = start_time.elapsed();
    progress.finish_and_clear();

    let output = output_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdout>".to_string());
    let report = ScanReport::new(&result, &map, output, duration);
    Reporter::new(ReportFormat::ConsoleTable).print_report(&report);

    Ok(())
}
