//! Batch processing command for multiple documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use docan_core::{
    DocumentKind, DocumentReader, DocumentText, ExtractionResult, InvoiceParser, SourceType,
};

use super::output::{render, OutputFormat};
use super::{analyze_file, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: Result<(DocumentText, ExtractionResult), String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| DocumentKind::from_extension(&p.to_string_lossy()).is_some())
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let reader = Arc::new(DocumentReader::from_config(&config));
    let parser = Arc::new(InvoiceParser::from_config(&config.extraction)?);
    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));

    let mut tasks = JoinSet::new();
    for (index, path) in files.into_iter().enumerate() {
        let reader = Arc::clone(&reader);
        let parser = Arc::clone(&parser);
        let permits = Arc::clone(&permits);

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let file_start = Instant::now();

            let task_path = path.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                analyze_file(&task_path, &reader, &parser).map_err(|e| e.to_string())
            })
            .await
            .unwrap_or_else(|e| Err(format!("worker failed: {}", e)));

            (
                index,
                ProcessResult {
                    path,
                    outcome,
                    processing_time_ms: file_start.elapsed().as_millis() as u64,
                },
            )
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        overall_pb.inc(1);

        if let Err(message) = &result.outcome {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), message);
            } else {
                error!("Failed to process {}: {}", result.path.display(), message);
                tasks.abort_all();
                overall_pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), message);
            }
        }

        results.push((index, result));
    }

    overall_pb.finish_and_clear();
    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Ok((_, extraction)) = &result.outcome {
                let output_path = output_path(output_dir, &result.path, args.format);
                fs::write(&output_path, render(extraction, None, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.outcome.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(message) = &result.outcome {
                println!("  - {}: {}", result.path.display(), message);
            }
        }
    }

    Ok(())
}

fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn source_label(source: SourceType) -> &'static str {
    match source {
        SourceType::TextPdf => "text_pdf",
        SourceType::ImagePdf => "image_pdf",
        SourceType::Image => "image",
        SourceType::PlainText => "plain_text",
        SourceType::Unknown => "unknown",
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "date",
        "total_amount",
        "line_items",
        "source",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time_ms = result.processing_time_ms.to_string();

        match &result.outcome {
            Ok((document, extraction)) => {
                let header = extraction.header.to_display();
                wtr.write_record([
                    filename,
                    "success",
                    header.invoice_number.as_str(),
                    header.date.as_str(),
                    header.total_amount.as_str(),
                    extraction.line_items.len().to_string().as_str(),
                    source_label(document.source),
                    time_ms.as_str(),
                    "",
                ])?;
            }
            Err(message) => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    "",
                    time_ms.as_str(),
                    message.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
