//! The capture session: staged state machine driving a document side from
//! source image to finalized, field-extracted record.

pub mod page;
pub mod session;
pub mod stage;

pub use page::{CaptureOutput, DualSideBundle, PageCapture, SideCapture, SideRecord};
pub use session::CaptureSession;
pub use stage::Stage;

use thiserror::Error;

use crate::import::ImportError;

#[derive(Error, Debug)]
pub enum CaptureError {
    /// The requested action is not legal in the current stage.
    #[error("Cannot {action} while in stage {stage}")]
    InvalidTransition {
        stage: Stage,
        action: &'static str,
    },

    /// Fatal input error: the current attempt is aborted and the session
    /// returns to idle.
    #[error("Input rejected: {0}")]
    InputRejected(#[from] ImportError),

    /// Perspective extraction failed; the stage rolled back to
    /// highlighting and the user may retry without re-uploading.
    #[error("Extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("No page is currently active")]
    NoActivePage,

    #[error("Page index {index} out of range ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },
}
