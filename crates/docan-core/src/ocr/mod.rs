//! OCR: turning page images into text.
//!
//! Recognition itself is delegated to an engine behind [`TextRecognizer`];
//! this module only prepares images and orders recognized fragments.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::{binarize, otsu_threshold};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Something that can read text from an image.
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text of one image, lines separated by `\n`.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// A recognized text fragment with its axis-aligned bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding rectangle (min_x, min_y, max_x, max_y).
    pub rect: (f32, f32, f32, f32),

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

/// Join fragments into lines in reading order.
///
/// Fragments whose top edges fall in the same `row_height` band are treated
/// as one line and joined left to right with a space, so a table row becomes
/// one physical line of text.
pub fn layout_text(mut boxes: Vec<TextBox>, row_height: f32) -> String {
    let row_of = |b: &TextBox| (b.rect.1 / row_height.max(1.0)) as i32;

    boxes.sort_by(|a, b| {
        row_of(a).cmp(&row_of(b)).then_with(|| {
            a.rect
                .0
                .partial_cmp(&b.rect.0)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    let mut lines: Vec<String> = Vec::new();
    let mut current_row = None;

    for text_box in &boxes {
        let row = row_of(text_box);
        match lines.last_mut() {
            Some(line) if current_row == Some(row) => {
                line.push(' ');
                line.push_str(&text_box.text);
            }
            _ => lines.push(text_box.text.clone()),
        }
        current_row = Some(row);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            rect: (x, y, x + 50.0, y + 12.0),
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_layout_groups_rows() {
        let boxes = vec![
            text_box(300.0, 42.0, "10.00"),
            text_box(10.0, 5.0, "INVOICE AB1"),
            text_box(10.0, 41.0, "1"),
            text_box(40.0, 43.0, "Bolt"),
        ];

        assert_eq!(layout_text(boxes, 20.0), "INVOICE AB1\n1 Bolt 10.00");
    }

    #[test]
    fn test_layout_empty() {
        assert_eq!(layout_text(Vec::new(), 20.0), "");
    }
}
