//! Corner geometry for the capture editor.
//!
//! Pure math over source-image pixel space: the four-corner quadrilateral
//! model, fit-to-container transforms, hit-testing, drag clamping, and the
//! renderer-agnostic overlay scene. No component here owns corner state;
//! every edit returns a new `CornerSet` for the caller to store.

pub mod hit_test;
pub mod overlay;
pub mod point;
pub mod transform;

pub use hit_test::hit_test_corner;
pub use overlay::{build_overlay, OverlayMode, OverlayScene};
pub use point::{drag_corner, Corner, CornerSet, Point};
pub use transform::FitTransform;
