//! Source-file intake: format detection and PDF rasterization.
//!
//! Input errors raised here are the only fatal class in the capture flow;
//! an unsupported, empty, or corrupt file aborts the current attempt and
//! returns the session to idle.

pub mod format;
#[cfg(feature = "pdfium")]
pub mod pdfium;

pub use format::{detect_format, is_image_file, is_pdf_file, FileKind};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Image decoding failed: {0}")]
    ImageDecode(String),

    #[error("PDF rasterization failed: {0}")]
    PdfRasterization(String),

    #[error("PDF is encrypted")]
    PdfEncrypted,

    #[error("PDF contains no pages")]
    ZeroPagePdf,

    #[error("No PDF rasterizer configured")]
    NoRasterizer,
}
