//! Field-extraction orchestration.
//!
//! Given a corrected document image and a declared document kind, produce
//! the richest available structured field set: the AI service is preferred,
//! OCR is the fallback, and for dual-sided documents (or when diagnostics
//! is on) OCR runs even when AI succeeds so the back side's
//! machine-readable-zone data is recovered.
//!
//! No collaborator error propagates out of here; either path failing just
//! means that path produced no result. Only total absence of both results
//! is a user-visible condition ("no data detected"), not an error state.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::fields::{self, DetectedFields};
use super::progress::{ProgressSink, ProgressSpan};
use super::types::{AiFieldExtractor, AiResult, DocumentKind, OcrEngine, OcrResult};

/// Which extraction paths produced results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionKind {
    Ai,
    Ocr,
    Both,
    None,
}

/// Outcome of one orchestrated extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldExtraction {
    pub kind: ExtractionKind,
    pub ai: Option<AiResult>,
    pub ocr: Option<OcrResult>,
}

/// Percent range occupied by the AI sub-phase when OCR may follow.
const AI_SPAN_END: f32 = 60.0;

/// Sequences AI extraction and OCR with trait-based DI, so the whole flow
/// runs against mock collaborators in tests.
pub struct FieldExtractor {
    ai: Box<dyn AiFieldExtractor + Send + Sync>,
    ocr: Box<dyn OcrEngine + Send + Sync>,
    diagnostics: bool,
}

impl FieldExtractor {
    pub fn new(
        ai: Box<dyn AiFieldExtractor + Send + Sync>,
        ocr: Box<dyn OcrEngine + Send + Sync>,
    ) -> Self {
        Self {
            ai,
            ocr,
            diagnostics: false,
        }
    }

    /// Run OCR alongside AI even for single-sided documents.
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Extract the richest available field set from a corrected image.
    ///
    /// `reference` is optional previously-known personal data the OCR
    /// engine may use for candidate comparison.
    pub fn extract_fields(
        &self,
        image: &DynamicImage,
        kind: DocumentKind,
        reference: Option<&DetectedFields>,
        sink: &mut dyn ProgressSink,
    ) -> FieldExtraction {
        let ai_available = self.ai.is_available();
        tracing::info!(
            document_kind = kind.as_str(),
            ai_available,
            "Starting field extraction"
        );

        let mut ai_result = None;
        if ai_available {
            let mut span = ProgressSpan::range(sink, 0.0, AI_SPAN_END);
            span.report("ai_extraction", 0.0);
            match self.ai.extract(image, kind) {
                Ok(raw) => {
                    let normalized = fields::normalize_ai_fields(&raw);
                    span.report("ai_extraction", 1.0);
                    tracing::info!(model = %raw.model, "AI extraction succeeded");
                    ai_result = Some(AiResult {
                        fields: normalized,
                        raw,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "AI extraction failed, falling back to OCR");
                }
            }
        }

        // OCR runs when AI produced nothing (sole path), or additionally for
        // dual-sided documents / diagnostics mode (MRZ recovery, comparison).
        let ocr_needed =
            ai_result.is_none() || kind.is_dual_sided() || self.diagnostics;

        let mut ocr_result = None;
        if ocr_needed {
            let mut span = if ai_available {
                ProgressSpan::range(sink, AI_SPAN_END, 100.0)
            } else {
                ProgressSpan::full(sink)
            };
            span.report("ocr", 0.0);
            match self.ocr.perform_ocr(image, kind, reference, &mut span) {
                Ok(mut result) => {
                    result.is_expired =
                        fields::is_expired_today(result.detected_fields.validity.as_deref());
                    tracing::info!(
                        confidence = result.confidence,
                        expired = ?result.is_expired,
                        "OCR completed"
                    );
                    ocr_result = Some(result);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "OCR failed, no result for that path");
                }
            }
        } else {
            // AI alone satisfied the request; close out the progress scale.
            ProgressSpan::range(sink, AI_SPAN_END, 100.0).report("complete", 1.0);
        }

        let kind_tag = match (&ai_result, &ocr_result) {
            (Some(_), Some(_)) => ExtractionKind::Both,
            (Some(_), None) => ExtractionKind::Ai,
            (None, Some(_)) => ExtractionKind::Ocr,
            (None, None) => ExtractionKind::None,
        };
        tracing::info!(outcome = ?kind_tag, "Field extraction finished");

        FieldExtraction {
            kind: kind_tag,
            ai: ai_result,
            ocr: ocr_result,
        }
    }
}
