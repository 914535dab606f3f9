use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::fields::{AiFieldSet, DetectedFields};
use super::progress::ProgressSpan;
use super::ExtractionError;
use crate::geometry::CornerSet;
use crate::import::ImportError;

/// Kind of document being captured. Declared by the operator before the
/// flow starts; drives the dual-sided branch and OCR strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Passport,
    /// Two-sided national ID card; complete data requires capturing and
    /// merging both faces.
    NationalId,
    Generic,
}

impl DocumentKind {
    pub fn is_dual_sided(&self) -> bool {
        matches!(self, Self::NationalId)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::NationalId => "national_id",
            Self::Generic => "generic",
        }
    }
}

/// Which face of a dual-sided document a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSide {
    Front,
    Back,
}

/// Perspective-corrected document image plus its encoded blob.
#[derive(Debug, Clone)]
pub struct WarpedDocument {
    pub image: DynamicImage,
    pub blob: Vec<u8>,
}

/// Raw output of the OCR engine for one document image: full recognized
/// text, canonical detected fields, and an overall confidence score.
/// `is_expired` is derived afterwards by the orchestrator from the detected
/// validity date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    pub text: String,
    pub detected_fields: DetectedFields,
    pub confidence: f32,
    /// Detected validity date lies before today. `None` when no validity
    /// date was detected or it could not be parsed.
    pub is_expired: Option<bool>,
}

/// Raw AI extraction output: the provider's own field names, untouched.
/// `normalize_ai_fields` maps these onto the canonical `AiFieldSet`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiExtraction {
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub model: String,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------
// Each external algorithm is behind a narrow trait so the engine can be
// exercised end to end with mocks (see `mock`).

/// Best-effort automatic quadrilateral detection.
pub trait CornerDetector {
    /// `Ok(None)` means the detector ran but found no document; the caller
    /// substitutes the default inset rectangle either way.
    fn detect_corners(&self, image: &DynamicImage) -> Result<Option<CornerSet>, ExtractionError>;
}

/// Perspective correction/crop of the region enclosed by the corners.
pub trait DocumentWarper {
    /// An `Err(ExtractionError::Warp)` is recoverable: the capture stage
    /// rolls back to highlighting and the user may retry.
    fn extract_document(
        &self,
        image: &DynamicImage,
        corners: &CornerSet,
    ) -> Result<WarpedDocument, ExtractionError>;
}

/// Text-recognition engine producing detected field candidates.
pub trait OcrEngine {
    fn perform_ocr(
        &self,
        image: &DynamicImage,
        kind: DocumentKind,
        reference: Option<&DetectedFields>,
        progress: &mut ProgressSpan<'_>,
    ) -> Result<OcrResult, ExtractionError>;
}

/// AI field-extraction service interpreting a document image holistically.
pub trait AiFieldExtractor {
    fn is_available(&self) -> bool;

    fn extract(
        &self,
        image: &DynamicImage,
        kind: DocumentKind,
    ) -> Result<AiExtraction, ExtractionError>;
}

/// PDF-to-image rasterizer for PDF uploads.
pub trait PdfRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<DynamicImage>, ImportError>;
}

/// Normalized AI extraction after canonical field mapping, kept alongside
/// the raw provider output for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResult {
    pub fields: AiFieldSet,
    pub raw: AiExtraction,
}
