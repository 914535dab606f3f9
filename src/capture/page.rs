use image::{DynamicImage, GenericImageView};
use uuid::Uuid;

use crate::extraction::fields::AiFieldSet;
use crate::extraction::merge::CombinedFieldSet;
use crate::extraction::quality::QualityReport;
use crate::extraction::types::{DocumentSide, OcrResult, WarpedDocument};
use crate::geometry::CornerSet;

/// A source image plus its encoded bytes. Image buffers are never mutated
/// in place after creation; extraction reads the source and produces new
/// derived images.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub blob: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SourceImage {
    pub fn new(image: DynamicImage, blob: Vec<u8>) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            blob,
            width,
            height,
        }
    }
}

/// One captured/uploaded page and everything derived from it.
///
/// Created when a source image becomes available (direct upload or one
/// rasterized PDF page); corners are mutated through the session's geometry
/// operations, the rest through the extraction pipeline; discarded on
/// session reset or when its side finalizes.
#[derive(Debug)]
pub struct PageCapture {
    pub id: Uuid,
    pub source: SourceImage,
    /// User-adjustable corner set.
    pub corners: Option<CornerSet>,
    /// The detector's original suggestion; immutable once set, `None` when
    /// detection failed and the default rectangle was substituted.
    pub auto_corners: Option<CornerSet>,
    pub extracted: Option<WarpedDocument>,
    pub quality: Option<QualityReport>,
    pub ocr: Option<OcrResult>,
    pub ai: Option<AiFieldSet>,
    pub side: Option<DocumentSide>,
}

impl PageCapture {
    pub fn new(source: SourceImage, side: Option<DocumentSide>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            corners: None,
            auto_corners: None,
            extracted: None,
            quality: None,
            ocr: None,
            ai: None,
            side,
        }
    }
}

/// A finalized side: the corrected image blob plus whatever field results
/// extraction produced.
#[derive(Debug, Clone)]
pub struct SideRecord {
    pub image_blob: Vec<u8>,
    pub ocr: Option<OcrResult>,
    pub ai: Option<AiFieldSet>,
}

/// Session-level dual-side state: at most one finalized front and back,
/// plus the combined record populated only once both exist.
#[derive(Debug, Default)]
pub struct SideCapture {
    pub front: Option<SideRecord>,
    pub back: Option<SideRecord>,
    pub combined: Option<CombinedFieldSet>,
}

impl SideCapture {
    pub fn is_complete(&self) -> bool {
        self.front.is_some() && self.back.is_some()
    }

    pub fn clear(&mut self) {
        self.front = None;
        self.back = None;
        self.combined = None;
    }
}

/// Front/back blobs and the merged record for a dual-sided document.
#[derive(Debug, Clone)]
pub struct DualSideBundle {
    pub front_blob: Vec<u8>,
    pub back_blob: Vec<u8>,
    pub combined: CombinedFieldSet,
}

/// Final payload handed upward once the capture session completes; the
/// document-upload flow outside this engine consumes it.
#[derive(Debug, Clone)]
pub struct CaptureOutput {
    /// Perspective-corrected image of the (last) captured side.
    pub image_blob: Vec<u8>,
    pub ocr: Option<OcrResult>,
    pub ai: Option<AiFieldSet>,
    /// Present only for dual-sided documents with both sides captured.
    pub dual_side: Option<DualSideBundle>,
    /// Original uploaded source bytes, for audit.
    pub source_blob: Vec<u8>,
    /// The quality check failed on the final side; surface a blocking
    /// warning before acceptance.
    pub quality_warning: bool,
}
