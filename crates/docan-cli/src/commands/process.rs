//! Process command - extract data from a single document.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docan_core::{report_file_name, DocumentReader, InvoiceParser};

use super::output::{render, OutputFormat};
use super::{analyze_file, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, image or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include the extracted document text
    #[arg(long)]
    show_text: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Reading document...");

    let reader = DocumentReader::from_config(&config);
    let parser = InvoiceParser::from_config(&config.extraction)?;

    let outcome = analyze_file(&args.input, &reader, &parser);
    pb.finish_and_clear();
    let (document, result) = outcome?;

    debug!(
        "Read {} page(s) from {:?}",
        document.pages, document.source
    );

    let raw_text = args.show_text.then_some(document.text.as_str());
    let data = render(&result, raw_text, args.format)?;

    let output_path = match (&args.output, args.format.is_binary()) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(report_file_name(
            &result.header.to_display(),
            false,
        ))),
        (None, false) => None,
    };

    if let Some(output_path) = output_path {
        fs::write(&output_path, &data)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&data)?;
        if !data.ends_with(b"\n") {
            stdout.write_all(b"\n")?;
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
