//! Field extraction: quality validation, the AI-first/OCR-fallback
//! orchestrator, field normalization, and the dual-side merge policy.

pub mod fields;
pub mod merge;
pub mod mock;
pub mod ollama;
pub mod orchestrator;
pub mod progress;
pub mod quality;
pub mod types;

pub use fields::{normalize_ai_fields, AiFieldSet, DetectedFields};
pub use merge::{merge_sides, CombinedFieldSet};
pub use orchestrator::{ExtractionKind, FieldExtraction, FieldExtractor};
pub use progress::{ProgressEvent, ProgressSink, ProgressSpan};
pub use quality::{validate_quality, QualityIssue, QualityReport};
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Corner detection failed: {0}")]
    CornerDetection(String),

    #[error("Perspective extraction failed: {0}")]
    Warp(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("AI extraction service error: {0}")]
    AiService(String),

    #[error("Cannot connect to AI service at {0}")]
    AiConnection(String),

    #[error("AI response parsing failed: {0}")]
    ResponseParsing(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),
}
