//! The capture session controller.
//!
//! One `CaptureSession` exclusively owns all page and side state for a
//! single capture flow and drives the stage machine; the geometry editor
//! and the extraction orchestrator never hold state of their own. All
//! collaborators come in as trait objects, so the whole flow runs against
//! mocks in tests.

use uuid::Uuid;

use super::page::{
    CaptureOutput, DualSideBundle, PageCapture, SideCapture, SideRecord, SourceImage,
};
use super::stage::Stage;
use super::CaptureError;
use crate::config::CaptureConfig;
use crate::extraction::merge;
use crate::extraction::orchestrator::FieldExtractor;
use crate::extraction::progress::ProgressSink;
use crate::extraction::quality::validate_quality;
use crate::extraction::types::{
    CornerDetector, DocumentKind, DocumentSide, DocumentWarper, PdfRasterizer,
};
use crate::geometry::{self, build_overlay, Corner, CornerSet, FitTransform, OverlayMode,
    OverlayScene, Point};
use crate::import::{detect_format, FileKind, ImportError};

pub struct CaptureSession {
    config: CaptureConfig,
    kind: DocumentKind,
    /// Session identity, rotated on `reset()`. Extraction results are
    /// applied only while the generation matches; the synchronous call path
    /// cannot race this, the check is for callers that later move
    /// extraction onto a worker thread.
    generation: Uuid,
    stage: Stage,
    pages: Vec<PageCapture>,
    current_page: usize,
    sides: SideCapture,
    detector: Box<dyn CornerDetector + Send + Sync>,
    warper: Box<dyn DocumentWarper + Send + Sync>,
    extractor: FieldExtractor,
    rasterizer: Option<Box<dyn PdfRasterizer + Send + Sync>>,
}

impl CaptureSession {
    pub fn new(
        config: CaptureConfig,
        kind: DocumentKind,
        detector: Box<dyn CornerDetector + Send + Sync>,
        warper: Box<dyn DocumentWarper + Send + Sync>,
        extractor: FieldExtractor,
    ) -> Self {
        Self {
            config,
            kind,
            generation: Uuid::new_v4(),
            stage: Stage::Idle,
            pages: Vec::new(),
            current_page: 0,
            sides: SideCapture::default(),
            detector,
            warper,
            extractor,
            rasterizer: None,
        }
    }

    /// Add a PDF rasterizer so PDF uploads become page captures.
    pub fn with_rasterizer(
        mut self,
        rasterizer: Box<dyn PdfRasterizer + Send + Sync>,
    ) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn document_kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> Option<&PageCapture> {
        self.pages.get(self.current_page)
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page
    }

    pub fn sides(&self) -> &SideCapture {
        &self.sides
    }

    pub fn combined_data(&self) -> Option<&merge::CombinedFieldSet> {
        self.sides.combined.as_ref()
    }

    // -----------------------------------------------------------------------
    // Intake
    // -----------------------------------------------------------------------

    /// Accept a new source file (image or PDF bytes) and run corner
    /// detection on every page it yields.
    ///
    /// Legal from `idle` and from `waiting_for_back` (the back side of a
    /// dual-sided document). Input errors are fatal to the capture attempt:
    /// the session clears and returns to `idle`.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<(), CaptureError> {
        if !self.stage.accepts_source() {
            return Err(CaptureError::InvalidTransition {
                stage: self.stage,
                action: "ingest a source",
            });
        }

        let side = if self.kind.is_dual_sided() {
            if self.stage == Stage::WaitingForBack {
                Some(DocumentSide::Back)
            } else {
                Some(DocumentSide::Front)
            }
        } else {
            None
        };

        let images = match self.load_source(bytes) {
            Ok(images) => images,
            Err(e) => {
                tracing::error!(error = %e, "Source rejected, returning to idle");
                self.clear_all();
                self.stage = Stage::Idle;
                return Err(CaptureError::InputRejected(e));
            }
        };

        self.stage = Stage::Detecting;
        self.pages = images
            .into_iter()
            .map(|image| {
                let blob = bytes.to_vec();
                PageCapture::new(SourceImage::new(image, blob), side)
            })
            .collect();
        self.current_page = 0;
        tracing::info!(
            pages = self.pages.len(),
            side = ?side,
            "Source accepted, detecting corners"
        );

        // A page whose detector call fails or returns nothing gets the
        // default inset rectangle; detection failure never aborts the flow.
        for page in &mut self.pages {
            let width = page.source.width as f32;
            let height = page.source.height as f32;
            match self.detector.detect_corners(&page.source.image) {
                Ok(Some(corners)) => {
                    let corners = corners.clamped_to(width, height);
                    page.auto_corners = Some(corners);
                    page.corners = Some(corners);
                }
                Ok(None) => {
                    tracing::warn!(page = %page.id, "No document detected, using default corners");
                    page.corners = Some(CornerSet::inset_default(
                        width,
                        height,
                        self.config.default_corner_inset,
                    ));
                }
                Err(e) => {
                    tracing::warn!(page = %page.id, error = %e, "Corner detection failed, using default corners");
                    page.corners = Some(CornerSet::inset_default(
                        width,
                        height,
                        self.config.default_corner_inset,
                    ));
                }
            }
        }

        self.stage = Stage::Adjusting;
        Ok(())
    }

    fn load_source(&self, bytes: &[u8]) -> Result<Vec<image::DynamicImage>, ImportError> {
        if bytes.is_empty() {
            return Err(ImportError::EmptyFile);
        }
        match detect_format(bytes) {
            FileKind::Pdf => {
                let rasterizer = self.rasterizer.as_ref().ok_or(ImportError::NoRasterizer)?;
                let pages = rasterizer.rasterize(bytes)?;
                if pages.is_empty() {
                    return Err(ImportError::ZeroPagePdf);
                }
                Ok(pages)
            }
            kind if kind.is_image() => {
                let image = image::load_from_memory(bytes)
                    .map_err(|e| ImportError::ImageDecode(e.to_string()))?;
                Ok(vec![image])
            }
            other => Err(ImportError::UnsupportedFormat(other.as_str().to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Geometry editing
    // -----------------------------------------------------------------------

    /// Hit-test a pointer position (image space) against the current
    /// page's corner handles.
    pub fn hit_test(&self, point: Point) -> Option<Corner> {
        let corners = self.current_page()?.corners?;
        geometry::hit_test_corner(
            point,
            &corners,
            self.config.handle_radius(),
            self.config.hit_area_multiplier(),
        )
    }

    /// Drag one corner of the current page to `to` (image space), clamped
    /// to the image bounds. Only legal while adjusting.
    pub fn drag(&mut self, corner: Corner, to: Point) -> Result<CornerSet, CaptureError> {
        if !self.stage.allows_corner_editing() {
            return Err(CaptureError::InvalidTransition {
                stage: self.stage,
                action: "drag a corner",
            });
        }
        let page = self
            .pages
            .get_mut(self.current_page)
            .ok_or(CaptureError::NoActivePage)?;
        let corners = page.corners.ok_or(CaptureError::NoActivePage)?;
        let updated = geometry::drag_corner(
            corner,
            to,
            &corners,
            page.source.width as f32,
            page.source.height as f32,
        );
        page.corners = Some(updated);
        Ok(updated)
    }

    /// Overlay scene for the current page: draggable handles while
    /// adjusting, the confirmed-region highlight afterwards, a placeholder
    /// when no image is loaded.
    pub fn overlay_scene(
        &self,
        transform: &FitTransform,
        active: Option<Corner>,
    ) -> OverlayScene {
        let corners = self.current_page().and_then(|p| p.corners);
        let mode = if self.stage.allows_corner_editing() {
            OverlayMode::Handles
        } else {
            OverlayMode::Highlight
        };
        build_overlay(corners.as_ref(), mode, active, transform, &self.config)
    }

    // -----------------------------------------------------------------------
    // Stage advancement
    // -----------------------------------------------------------------------

    /// User confirmation of the adjusted region ("next"). The edited
    /// corner set is accepted as-is; no validation here.
    pub fn confirm_region(&mut self) -> Result<(), CaptureError> {
        if self.stage != Stage::Adjusting {
            return Err(CaptureError::InvalidTransition {
                stage: self.stage,
                action: "confirm the region",
            });
        }
        self.stage = Stage::Highlighting;
        Ok(())
    }

    /// Step back to re-adjust the already-held corner set. Never re-runs
    /// detection.
    pub fn back_to_adjust(&mut self) -> Result<(), CaptureError> {
        if !self.stage.allows_back_to_adjust() {
            return Err(CaptureError::InvalidTransition {
                stage: self.stage,
                action: "go back to adjusting",
            });
        }
        self.stage = Stage::Adjusting;
        Ok(())
    }

    /// User confirmation to extract ("extract"): perspective-correct the
    /// current page, quality-validate the output, then run field
    /// extraction.
    ///
    /// A warper failure is recoverable: the stage rolls back to
    /// `highlighting` with the failure message and the user may retry.
    /// Field-extraction failures never block the transition; the record
    /// just ends up with fewer populated fields.
    pub fn extract_current(
        &mut self,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), CaptureError> {
        if self.stage != Stage::Highlighting {
            return Err(CaptureError::InvalidTransition {
                stage: self.stage,
                action: "extract",
            });
        }
        let generation = self.generation;
        let page = self
            .pages
            .get(self.current_page)
            .ok_or(CaptureError::NoActivePage)?;
        let corners = page.corners.ok_or(CaptureError::NoActivePage)?;
        let source_width = page.source.width;
        let source_height = page.source.height;

        self.stage = Stage::Extracting;
        let warped = match self
            .warper
            .extract_document(&self.pages[self.current_page].source.image, &corners)
        {
            Ok(warped) => warped,
            Err(e) => {
                tracing::warn!(error = %e, "Perspective extraction failed, rolling back");
                self.stage = Stage::Highlighting;
                return Err(CaptureError::ExtractionFailed {
                    message: e.to_string(),
                });
            }
        };

        let quality = validate_quality(
            &warped.image,
            &corners,
            source_width,
            source_height,
            &self.config,
        );
        self.stage = Stage::Validating;

        // Previously finalized front-side fields serve as OCR reference
        // data when capturing the back.
        let reference = self
            .sides
            .front
            .as_ref()
            .and_then(|record| record.ocr.as_ref())
            .map(|ocr| ocr.detected_fields.clone());
        let extraction =
            self.extractor
                .extract_fields(&warped.image, self.kind, reference.as_ref(), sink);

        // Generation check for drivers that run extraction off-thread.
        // Under the current synchronous call it cannot have changed.
        if self.generation != generation {
            tracing::warn!("Discarding extraction result from a stale session");
            return Ok(());
        }

        let record = SideRecord {
            image_blob: warped.blob.clone(),
            ocr: extraction.ocr.clone(),
            ai: extraction.ai.as_ref().map(|a| a.fields.clone()),
        };

        let page = &mut self.pages[self.current_page];
        let side = page.side;
        page.extracted = Some(warped);
        page.quality = Some(quality);
        page.ocr = extraction.ocr;
        page.ai = extraction.ai.map(|a| a.fields);

        self.finalize_side(side, record);
        Ok(())
    }

    fn finalize_side(&mut self, side: Option<DocumentSide>, record: SideRecord) {
        match side {
            Some(DocumentSide::Front) => {
                self.sides.front = Some(record);
                self.sides.combined = None;
                // The front page leaves the active list once saved.
                self.pages.clear();
                self.current_page = 0;
                self.stage = Stage::WaitingForBack;
                tracing::info!("Front side finalized, waiting for back");
            }
            Some(DocumentSide::Back) => {
                self.sides.back = Some(record);
                self.sides.combined = Some(merge::merge_sides(
                    self.sides.front.as_ref().and_then(|r| r.ocr.as_ref()),
                    self.sides.back.as_ref().and_then(|r| r.ocr.as_ref()),
                ));
                self.stage = Stage::Complete;
                tracing::info!("Back side finalized, sides merged");
            }
            None => {
                self.stage = Stage::Complete;
                tracing::info!("Capture complete");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Multi-page navigation
    // -----------------------------------------------------------------------

    /// Switch which page is current. Pages keep whatever state they reached
    /// when last current; the stage machine always governs the current one.
    pub fn set_current_page(&mut self, index: usize) -> Result<(), CaptureError> {
        if index >= self.pages.len() {
            return Err(CaptureError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current_page = index;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Completion & reset
    // -----------------------------------------------------------------------

    /// Final payload for the upward `on_extracted` surface. Legal only in
    /// `complete`.
    pub fn finish(&self) -> Result<CaptureOutput, CaptureError> {
        if self.stage != Stage::Complete {
            return Err(CaptureError::InvalidTransition {
                stage: self.stage,
                action: "finish",
            });
        }
        let page = self.current_page().ok_or(CaptureError::NoActivePage)?;
        let extracted = page.extracted.as_ref().ok_or(CaptureError::NoActivePage)?;

        let dual_side = match (&self.sides.front, &self.sides.back, &self.sides.combined) {
            (Some(front), Some(back), Some(combined)) => Some(DualSideBundle {
                front_blob: front.image_blob.clone(),
                back_blob: back.image_blob.clone(),
                combined: combined.clone(),
            }),
            _ => None,
        };

        Ok(CaptureOutput {
            image_blob: extracted.blob.clone(),
            ocr: page.ocr.clone(),
            ai: page.ai.clone(),
            dual_side,
            source_blob: page.source.blob.clone(),
            quality_warning: page
                .quality
                .as_ref()
                .map(|q| !q.is_valid)
                .unwrap_or(false),
        })
    }

    /// Session reset (modal closed): unconditionally clears all page and
    /// side data from any state and rotates the generation so in-flight
    /// results are discarded when they resolve.
    pub fn reset(&mut self) {
        tracing::info!(stage = %self.stage, "Session reset");
        self.clear_all();
        self.stage = Stage::Idle;
        self.generation = Uuid::new_v4();
    }

    fn clear_all(&mut self) {
        self.pages.clear();
        self.current_page = 0;
        self.sides.clear();
    }
}
