//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{layout_text, TextBox, TextRecognizer};

/// Vertical band (pixels) within which fragments share a line.
const ROW_HEIGHT: f32 = 20.0;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in the configuration.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        if !config.models_present() {
            return Err(OcrError::ModelLoad(format!(
                "OCR models not found in {}",
                config.model_dir.display()
            )));
        }

        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self { engine })
    }
}

impl TextRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                rect: polygon_to_rect(&r.bounding_box),
                text: r.text.replace("[UNK]", " "),
                confidence: r.confidence,
            })
            .collect();

        debug!(
            "OCR recognized {} text regions in {:?}",
            boxes.len(),
            start.elapsed()
        );

        Ok(layout_text(boxes, ROW_HEIGHT))
    }
}

/// Axis-aligned bounds of a detection polygon.
fn polygon_to_rect(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32, f32, f32) {
    let mut rect = (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for coord in polygon.exterior().coords() {
        rect.0 = rect.0.min(coord.x as f32);
        rect.1 = rect.1.min(coord.y as f32);
        rect.2 = rect.2.max(coord.x as f32);
        rect.3 = rect.3.max(coord.y as f32);
    }
    rect
}
