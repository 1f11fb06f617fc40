pub mod ask;
pub mod batch;
pub mod config;
pub mod edit;
pub mod output;
pub mod process;

use std::path::{Path, PathBuf};

use docan_core::models::config::DocanConfig;
use docan_core::{DocumentKind, DocumentReader, DocumentText, ExtractionResult, InvoiceParser};

/// Load the configuration from `-c`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DocanConfig> {
    Ok(DocanConfig::load(config_path.map(Path::new))?)
}

/// Configuration file used by commands that write it.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(DocanConfig::default_path)
}

/// Read a document from disk and extract its invoice data.
pub fn analyze_file(
    path: &Path,
    reader: &DocumentReader,
    parser: &InvoiceParser,
) -> anyhow::Result<(DocumentText, ExtractionResult)> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    if DocumentKind::from_extension(&path.to_string_lossy()).is_none() {
        anyhow::bail!("Unsupported file format: {}", path.display());
    }

    let document = reader.read_file(path)?;
    let result = parser.parse(&document.text);
    Ok((document, result))
}
