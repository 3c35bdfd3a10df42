//! Batch command - extract and merge tables from many analysis results.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use formtab_core::{
    BatchEvent, BatchOrchestrator, BatchReport, DirectorySource, FileStore, JsonResultAnalyzer,
};

use super::output::{write_dataset, FormatArg};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing analysis results
    #[arg(required = true)]
    input_dir: PathBuf,

    /// Dataset output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dataset format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Directory for raw per-document results
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Directory for the checkpoint file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Write failed documents to this JSON file
    #[arg(long)]
    errors: Option<PathBuf>,

    /// Skip documents recorded in the checkpoint
    #[arg(long)]
    resume: bool,

    /// Exit with an error status if any document failed
    #[arg(long)]
    fail_on_error: bool,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.input_dir.display());
    }

    let source = DirectorySource::new(&args.input_dir)
        .with_extensions(&config.batch.input_extensions);
    let store = FileStore::new(
        args.results_dir.clone().unwrap_or_else(|| config.batch.results_dir.clone()),
        args.log_dir.clone().unwrap_or_else(|| config.batch.log_dir.clone()),
    );

    let mut orchestrator = BatchOrchestrator::new(JsonResultAnalyzer, store)
        .with_extraction_config(config.extraction.clone())
        .with_source_suffix(config.batch.source_suffix.clone());
    if args.resume {
        orchestrator = orchestrator.resume()?;
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let report = orchestrator.run_with_progress(&source, |event| match event {
        BatchEvent::Listed { total } => pb.set_length(total as u64),
        BatchEvent::Started { name, .. } => pb.set_message(name.to_string()),
        BatchEvent::Finished { .. } | BatchEvent::Skipped { .. } => pb.inc(1),
    })?;

    pb.finish_and_clear();

    let format = args.format.map_or(config.output.format, Into::into);
    write_dataset(
        &report.dataset,
        format,
        config.output.csv_delimiter,
        args.output.as_deref(),
    )?;

    if let Some(errors_path) = &args.errors {
        fs::write(errors_path, serde_json::to_string_pretty(&report.errors)?)?;
        debug!("Wrote {} errors to {}", report.errors.len(), errors_path.display());
    }

    print_summary(&report, &args, start);

    if args.fail_on_error && !report.errors.is_empty() {
        error!("{} documents failed", report.errors.len());
        anyhow::bail!("{} documents failed", report.errors.len());
    }

    Ok(())
}

fn print_summary(report: &BatchReport, args: &BatchArgs, start: Instant) {
    let attempted = report.processed.len() + report.errors.len() - count_late_failures(report);

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        attempted,
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed, {} skipped, {} rows",
        style(report.succeeded()).green(),
        style(report.errors.len()).red(),
        style(report.skipped.len()).yellow(),
        report.dataset.len()
    );

    if let Some(output) = &args.output {
        eprintln!("{} Dataset written to {}", style("✓").green(), output.display());
    }

    let malformed = report.dataset.malformed_rows();
    if !malformed.is_empty() {
        eprintln!(
            "{} {} rows do not match the column count",
            style("!").yellow(),
            malformed.len()
        );
    }

    if !report.errors.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for failure in &report.errors {
            eprintln!("  - {} ({:?}): {}", failure.file, failure.stage, failure.error);
        }
    }
}

/// Failures after the analysis step, whose documents also count as processed.
fn count_late_failures(report: &BatchReport) -> usize {
    report
        .errors
        .iter()
        .filter(|e| report.processed.contains(&e.source_id))
        .count()
}
