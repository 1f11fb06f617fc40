//! Turning uploaded documents into raw text.
//!
//! PDFs use their embedded text when there is enough of it, otherwise their
//! page images go through OCR. Images always go through OCR.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DocanError, OcrError, Result};
use crate::models::config::{DocanConfig, OcrConfig, PdfConfig};
use crate::models::invoice::SourceType;
use crate::ocr::{binarize, TextRecognizer};
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Supported document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
    Text,
}

impl DocumentKind {
    /// Detect from a MIME type, falling back to the file extension.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        let from_mime = content_type.and_then(|mime| {
            let mime = mime.split(';').next().unwrap_or("").trim().to_lowercase();
            match mime.as_str() {
                "application/pdf" => Some(DocumentKind::Pdf),
                "text/plain" => Some(DocumentKind::Text),
                m if m.starts_with("image/") => Some(DocumentKind::Image),
                _ => None,
            }
        });

        from_mime.or_else(|| file_name.and_then(Self::from_extension))
    }

    /// Detect from a file name or path.
    pub fn from_extension(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp" => Some(DocumentKind::Image),
            "txt" => Some(DocumentKind::Text),
            _ => None,
        }
    }
}

/// Raw text of a document and how it was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentText {
    /// Extracted text, pages separated by `\n`.
    pub text: String,

    /// Where the text came from.
    pub source: SourceType,

    /// Number of pages read.
    pub pages: u32,
}

/// Reads text out of PDFs, images and plain text files.
pub struct DocumentReader {
    pdf: PdfConfig,
    ocr: OcrConfig,
    recognizer: Option<Arc<dyn TextRecognizer>>,
}

impl DocumentReader {
    /// Create a reader without an OCR engine.
    pub fn new(pdf: PdfConfig, ocr: OcrConfig) -> Self {
        Self {
            pdf,
            ocr,
            recognizer: None,
        }
    }

    /// Create a reader, loading the OCR engine when enabled and available.
    pub fn from_config(config: &DocanConfig) -> Self {
        let reader = Self::new(config.pdf.clone(), config.ocr.clone());

        if !config.ocr.enabled {
            debug!("OCR disabled by configuration");
            return reader;
        }

        #[cfg(feature = "native")]
        {
            match crate::ocr::PureOcrEngine::from_config(&config.ocr) {
                Ok(engine) => return reader.with_recognizer(Arc::new(engine)),
                Err(e) => info!("OCR unavailable, only text documents can be read: {}", e),
            }
        }

        reader
    }

    /// Use the given OCR engine.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Whether images can be read.
    pub fn has_ocr(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Read a file from disk, detecting its kind from the extension.
    pub fn read_file(&self, path: &Path) -> Result<DocumentText> {
        let name = path.to_string_lossy();
        let kind = DocumentKind::from_extension(&name)
            .ok_or_else(|| DocanError::UnsupportedDocument(name.to_string()))?;

        let data = std::fs::read(path)?;
        self.read(&data, kind)
    }

    /// Read a document held in memory.
    pub fn read(&self, data: &[u8], kind: DocumentKind) -> Result<DocumentText> {
        let start = Instant::now();

        let document = match kind {
            DocumentKind::Pdf => self.read_pdf(data)?,
            DocumentKind::Image => self.read_image(data)?,
            DocumentKind::Text => DocumentText {
                text: String::from_utf8_lossy(data).into_owned(),
                source: SourceType::PlainText,
                pages: 1,
            },
        };

        if document.text.trim().is_empty() {
            return Err(DocanError::NoText);
        }

        info!(
            "Read {} characters from {} page(s) ({:?}) in {:?}",
            document.text.len(),
            document.pages,
            document.source,
            start.elapsed()
        );

        Ok(document)
    }

    fn read_pdf(&self, data: &[u8]) -> Result<DocumentText> {
        let mut extractor = PdfExtractor::new();
        extractor.load(data)?;
        let pages = extractor.page_count();

        let embedded = match extractor.extract_text() {
            Ok(text) => text,
            Err(e) => {
                warn!("Embedded text extraction failed: {}", e);
                String::new()
            }
        };
        let enough_text = embedded.trim().len() >= self.pdf.min_text_length;

        if self.pdf.prefer_embedded_text && enough_text {
            debug!("Using embedded PDF text");
            return Ok(DocumentText {
                text: embedded,
                source: SourceType::TextPdf,
                pages,
            });
        }

        match self.ocr_pdf_pages(&extractor) {
            Ok(text) if !text.trim().is_empty() => Ok(DocumentText {
                text,
                source: SourceType::ImagePdf,
                pages,
            }),
            Ok(_) | Err(_) if !embedded.trim().is_empty() => {
                debug!("OCR produced no text, using embedded PDF text");
                Ok(DocumentText {
                    text: embedded,
                    source: SourceType::TextPdf,
                    pages,
                })
            }
            Ok(_) => Err(DocanError::NoText),
            Err(e) => Err(e),
        }
    }

    fn ocr_pdf_pages(&self, extractor: &PdfExtractor) -> Result<String> {
        let recognizer = self.recognizer.as_ref().ok_or(OcrError::Unavailable)?;

        let mut page_count = extractor.page_count();
        if self.pdf.max_pages > 0 {
            page_count = page_count.min(self.pdf.max_pages as u32);
        }

        let mut page_texts = Vec::new();
        for page in 1..=page_count {
            let images = match extractor.extract_images(page) {
                Ok(images) => images,
                Err(e) => {
                    warn!("Failed to extract images from page {}: {}", page, e);
                    continue;
                }
            };

            for image in &images {
                match self.recognize(recognizer.as_ref(), image) {
                    Ok(text) if !text.trim().is_empty() => page_texts.push(text),
                    Ok(_) => debug!("No text detected on page {}", page),
                    Err(e) => warn!("OCR failed on page {}: {}", page, e),
                }
            }
        }

        Ok(page_texts.join("\n"))
    }

    fn read_image(&self, data: &[u8]) -> Result<DocumentText> {
        let recognizer = self.recognizer.as_ref().ok_or(OcrError::Unavailable)?;
        let image = image::load_from_memory(data)?;

        Ok(DocumentText {
            text: self.recognize(recognizer.as_ref(), &image)?,
            source: SourceType::Image,
            pages: 1,
        })
    }

    fn recognize(
        &self,
        recognizer: &dyn TextRecognizer,
        image: &DynamicImage,
    ) -> std::result::Result<String, OcrError> {
        if self.ocr.binarize {
            recognizer.recognize(&binarize(image))
        } else {
            recognizer.recognize(image)
        }
    }
}
