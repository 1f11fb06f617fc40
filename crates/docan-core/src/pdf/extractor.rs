//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) if !arr.is_empty() => {
                    arr.first().and_then(|o| o.as_name().ok())
                }
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    // Scanned pages are usually JPEG; the raw stream is the file.
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Skipping image with unsupported filter");
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8) as u8;

        create_image_from_raw(&data, width, height, color_space, bits)
    }

    /// Get resources dictionary for a page, following inheritance.
    fn get_page_resources(&self, doc: &Document, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_page_resources(doc, *parent_id),
            _ => None,
        }
    }
}

fn create_image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = (width as usize) * (height as usize);
    let channels = match color_space {
        b"DeviceRGB" | b"RGB" => 3,
        b"DeviceGray" | b"G" => 1,
        _ => return None,
    };

    if data.len() < pixels * channels {
        trace!(
            "Image data too short: {} bytes for {}x{}x{}",
            data.len(),
            width,
            height,
            channels
        );
        return None;
    }

    let mut rgba = Vec::with_capacity(pixels * 4);
    for chunk in data[..pixels * channels].chunks(channels) {
        match chunk {
            [r, g, b] => rgba.extend_from_slice(&[*r, *g, *b, 255]),
            [gray] => rgba.extend_from_slice(&[*gray, *gray, *gray, 255]),
            _ => return None,
        }
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.document()?;
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;

        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(resources) = self.get_page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

/// Build a one-page PDF with each entry of `lines` on its own text line.
#[cfg(test)]
pub(crate) fn sample_pdf(lines: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![50.into(), 800.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}
