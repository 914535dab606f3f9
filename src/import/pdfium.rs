//! PDF page rasterization via Google PDFium.
//!
//! `PdfiumRasterizer` is stateless (`Send + Sync`). Each operation creates
//! a fresh `Pdfium` instance because the upstream type is `!Send`. The OS
//! caches `dlopen`/`LoadLibrary` calls, so repeat loads are near-free.

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::ImportError;
use crate::extraction::types::PdfRasterizer;

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on extremely large pages or absurd DPI settings.
const MAX_DIMENSION_PX: u32 = 4096;

/// Default rendering DPI for document capture.
pub const DEFAULT_RENDER_DPI: u32 = 200;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// Rasterizes every page of a PDF to an RGB image using Google PDFium.
pub struct PdfiumRasterizer {
    dpi: u32,
}

impl PdfiumRasterizer {
    /// Create a new rasterizer, verifying the PDFium library is loadable.
    pub fn new() -> Result<Self, ImportError> {
        let _ = load_pdfium()?;
        Ok(Self {
            dpi: DEFAULT_RENDER_DPI,
        })
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ImportError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ImportError::PdfRasterization(format!("Failed to load PDFium from {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "Loaded PDFium from exe directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ImportError::PdfRasterization(format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Map PDF load errors; detect encrypted PDFs for user-friendly messaging.
fn map_load_error(e: PdfiumError) -> ImportError {
    let msg = format!("{e}").to_lowercase();
    if msg.contains("password") || msg.contains("encrypt") {
        ImportError::PdfEncrypted
    } else {
        ImportError::PdfRasterization(format!("Failed to load PDF: {e}"))
    }
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, MAX_DIMENSION_PX],
/// preserving aspect ratio when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio).round() as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio).round() as u32).clamp(1, MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PdfRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8]) -> Result<Vec<DynamicImage>, ImportError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(ImportError::ZeroPagePdf);
        }

        let mut rendered = Vec::with_capacity(pages.len() as usize);
        for (index, page) in pages.iter().enumerate() {
            let width_points = page.width().value;
            let height_points = page.height().value;
            let (target_w, target_h) =
                compute_render_dimensions(width_points, height_points, self.dpi);

            let uncapped_w = (width_points * self.dpi as f32 / POINTS_PER_INCH) as u32;
            if target_w != uncapped_w {
                warn!(
                    page = index,
                    capped_width = target_w,
                    capped_height = target_h,
                    "Page dimensions capped to {MAX_DIMENSION_PX}px"
                );
            }

            let config = PdfRenderConfig::new()
                .set_target_width(target_w as i32)
                .set_maximum_height(target_h as i32);

            let bitmap = page.render_with_config(&config).map_err(|e| {
                ImportError::PdfRasterization(format!("Rendering page {index} failed: {e}"))
            })?;

            debug!(
                page = index,
                width = target_w,
                height = target_h,
                "Rendered PDF page"
            );
            rendered.push(bitmap.as_image());
        }

        Ok(rendered)
    }
}
