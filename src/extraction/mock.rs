//! Deterministic mock collaborators for exercising the engine without the
//! real computer-vision, OCR, AI, or PDF services.

use image::DynamicImage;

use super::fields::DetectedFields;
use super::progress::ProgressSpan;
use super::types::{
    AiExtraction, AiFieldExtractor, CornerDetector, DocumentKind, DocumentWarper, OcrEngine,
    OcrResult, PdfRasterizer, WarpedDocument,
};
use super::ExtractionError;
use crate::geometry::CornerSet;
use crate::import::ImportError;

fn solid_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200u8, 200, 200]),
    ))
}

fn encode_png(image: &DynamicImage) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("PNG encoding of an in-memory image cannot fail");
    cursor.into_inner()
}

/// Corner detector stub.
pub enum MockCornerDetector {
    /// Always returns this corner set.
    Finds(CornerSet),
    /// Runs but finds nothing.
    FindsNothing,
    /// Errors on every call.
    Broken,
}

impl CornerDetector for MockCornerDetector {
    fn detect_corners(&self, _image: &DynamicImage) -> Result<Option<CornerSet>, ExtractionError> {
        match self {
            Self::Finds(corners) => Ok(Some(*corners)),
            Self::FindsNothing => Ok(None),
            Self::Broken => Err(ExtractionError::CornerDetection("mock detector down".into())),
        }
    }
}

/// Perspective warper stub producing a solid image of fixed dimensions.
pub struct MockWarper {
    pub width: u32,
    pub height: u32,
    /// When set, every call fails with this message (recoverable).
    pub fail_with: Option<String>,
}

impl MockWarper {
    pub fn ok(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail_with: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            width: 0,
            height: 0,
            fail_with: Some(message.to_string()),
        }
    }
}

impl DocumentWarper for MockWarper {
    fn extract_document(
        &self,
        _image: &DynamicImage,
        _corners: &CornerSet,
    ) -> Result<WarpedDocument, ExtractionError> {
        if let Some(message) = &self.fail_with {
            return Err(ExtractionError::Warp(message.clone()));
        }
        let image = solid_image(self.width, self.height);
        let blob = encode_png(&image);
        Ok(WarpedDocument { image, blob })
    }
}

/// OCR engine stub returning fixed fields with a fixed confidence.
pub struct MockOcrEngine {
    pub text: String,
    pub detected_fields: DetectedFields,
    pub confidence: f32,
    pub fail: bool,
}

impl MockOcrEngine {
    pub fn new(text: &str, confidence: f32) -> Self {
        Self {
            text: text.to_string(),
            detected_fields: DetectedFields::default(),
            confidence,
            fail: false,
        }
    }

    pub fn with_fields(mut self, fields: DetectedFields) -> Self {
        self.detected_fields = fields;
        self
    }

    pub fn failing() -> Self {
        Self {
            text: String::new(),
            detected_fields: DetectedFields::default(),
            confidence: 0.0,
            fail: true,
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn perform_ocr(
        &self,
        _image: &DynamicImage,
        _kind: DocumentKind,
        _reference: Option<&DetectedFields>,
        progress: &mut ProgressSpan<'_>,
    ) -> Result<OcrResult, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::OcrProcessing("mock OCR down".into()));
        }
        progress.report("ocr", 0.5);
        progress.report("ocr", 1.0);
        Ok(OcrResult {
            text: self.text.clone(),
            detected_fields: self.detected_fields.clone(),
            confidence: self.confidence,
            is_expired: None,
        })
    }
}

/// AI field-extraction stub.
pub struct MockAiExtractor {
    pub available: bool,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub fail: bool,
}

impl MockAiExtractor {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            fields: serde_json::Map::new(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            available: true,
            fields: serde_json::Map::new(),
            fail: true,
        }
    }

    pub fn with_fields(pairs: &[(&str, &str)]) -> Self {
        let mut fields = serde_json::Map::new();
        for (key, value) in pairs {
            fields.insert(
                key.to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
        Self {
            available: true,
            fields,
            fail: false,
        }
    }
}

impl AiFieldExtractor for MockAiExtractor {
    fn is_available(&self) -> bool {
        self.available
    }

    fn extract(
        &self,
        _image: &DynamicImage,
        _kind: DocumentKind,
    ) -> Result<AiExtraction, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::AiService("mock AI down".into()));
        }
        Ok(AiExtraction {
            fields: self.fields.clone(),
            model: "mock-model".into(),
        })
    }
}

/// Rasterizer stub yielding fixed-size pages for any PDF bytes.
pub struct MockRasterizer {
    pub pages: Vec<(u32, u32)>,
}

impl MockRasterizer {
    pub fn with_pages(pages: &[(u32, u32)]) -> Self {
        Self {
            pages: pages.to_vec(),
        }
    }
}

impl PdfRasterizer for MockRasterizer {
    fn rasterize(&self, _pdf_bytes: &[u8]) -> Result<Vec<DynamicImage>, ImportError> {
        if self.pages.is_empty() {
            return Err(ImportError::ZeroPagePdf);
        }
        Ok(self
            .pages
            .iter()
            .map(|&(w, h)| solid_image(w, h))
            .collect())
    }
}
