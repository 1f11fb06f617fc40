//! Ask command - one question about a document.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use docan_core::{DocumentAssistant, DocumentReader, InvoiceParser, OpenRouterClient};

use super::{analyze_file, load_config};

/// Arguments for the ask command.
#[derive(Args)]
pub struct AskArgs {
    /// Input file (PDF, image or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Question about the document
    #[arg(required = true)]
    question: String,

    /// OpenRouter API key (default: config or OPENROUTER_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
}

pub async fn run(args: AskArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let api_key = args
        .api_key
        .or_else(|| config.chat.resolve_api_key())
        .unwrap_or_default();

    let reader = DocumentReader::from_config(&config);
    let parser = InvoiceParser::from_config(&config.extraction)?;
    let (document, _) = analyze_file(&args.input, &reader, &parser)?;
    debug!("Asking about {} characters of text", document.text.len());

    let assistant = DocumentAssistant::new(OpenRouterClient::new(&config.chat)?);
    let reply = assistant.ask(&args.question, &document.text, &api_key).await;

    if reply.is_failure() {
        eprintln!("{} {}", style("✗").red(), reply.text());
        anyhow::bail!("No answer received");
    }

    println!("{}", reply.text());
    Ok(())
}
