//! Veridoc: document capture and field-extraction engine.
//!
//! Drives the full capture flow for identity/legal documents: interactive
//! four-corner geometry editing over a source image, a staged capture state
//! machine (with a branch for two-sided documents), and an extraction
//! orchestrator that prefers an AI field-extraction service and falls back
//! to OCR. Heavy lifting (corner detection, perspective warping, PDF
//! rasterization, OCR, AI inference) lives behind narrow collaborator
//! traits so the engine stays fully testable with mocks.

pub mod capture;
pub mod config;
pub mod extraction;
pub mod geometry;
pub mod import;

pub use capture::session::CaptureSession;
pub use config::{CaptureConfig, InputMode};
pub use extraction::orchestrator::FieldExtractor;
pub use geometry::{Corner, CornerSet, Point};
