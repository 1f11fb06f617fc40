//! Configuration structures for the document pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no chat API key is configured.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Main configuration for docan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Conversational query configuration.
    pub chat: ChatConfig,

    /// HTTP API configuration.
    pub server: ServerConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run OCR on images and scanned PDF pages.
    pub enabled: bool,

    /// Grayscale and Otsu-binarize images before recognition.
    pub binarize: bool,

    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binarize: true,
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.model_dir.join(file_name)
    }

    /// Check that detection and recognition models are present.
    pub fn models_present(&self) -> bool {
        self.model_path(&self.detection_model).exists()
            && self.model_path(&self.recognition_model).exists()
            && self.model_path(&self.dictionary).exists()
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Use embedded text before falling back to OCR.
    pub prefer_embedded_text: bool,

    /// Minimum embedded text length to treat a PDF as text-based.
    pub min_text_length: usize,

    /// Maximum pages to OCR (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
            max_pages: 0,
        }
    }
}

/// Additional header patterns, tried after the built-in ones.
///
/// Each pattern must have at least one capture group; the first group is
/// the extracted value. Matching is case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extra invoice number patterns.
    pub invoice_number_patterns: Vec<String>,

    /// Extra date patterns.
    pub date_patterns: Vec<String>,
}

/// Chat completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// API key used when the caller does not provide one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "anthropic/claude-3-haiku".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

impl ChatConfig {
    /// Configured key, falling back to the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,

    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 20 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl DocanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docan")
            .join("config.json")
    }

    /// Load from an explicit path, else the default path if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, std::io::Error> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: DocanConfig =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.chat.model, "anthropic/claude-3-haiku");
        assert!(config.extraction.date_patterns.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DocanConfig::default();
        config.extraction.invoice_number_patterns.push(r"Bill\s+No\.?\s*(\S+)".to_string());
        config.save(&path).unwrap();

        let loaded = DocanConfig::load(Some(&path)).unwrap();
        assert_eq!(
            loaded.extraction.invoice_number_patterns,
            config.extraction.invoice_number_patterns
        );
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let config = ChatConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-test"));
    }
}
