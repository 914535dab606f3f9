use serde::{Deserialize, Serialize};

/// Pointer capability of the capturing device.
///
/// Resolved once at session start and passed into the geometry editor;
/// touch targets need more tolerance than a mouse pointer, so both the
/// handle radius and the hit-area multiplier scale up under touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Pointer,
    Touch,
}

/// Configuration for a capture session.
///
/// All geometry constants and quality thresholds are resolved here, once,
/// instead of being queried from environment globals mid-flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Pointer vs touch input; drives handle sizing and hit tolerance.
    pub input_mode: InputMode,
    /// Fraction of each image dimension to inset the fallback corner
    /// rectangle when auto-detection fails (0.0-0.5).
    pub default_corner_inset: f32,
    /// Minimum acceptable width of the perspective-corrected image, px.
    pub min_extracted_width: u32,
    /// Minimum acceptable height of the perspective-corrected image, px.
    pub min_extracted_height: u32,
    /// Quad area below this fraction of the source image area is flagged
    /// as degenerate.
    pub min_quad_area_fraction: f32,
    /// Corners closer than this (px, source-image space) are flagged.
    pub min_corner_distance: f32,
    /// Developer diagnostics: run OCR alongside AI even for single-sided
    /// documents, for side-by-side comparison.
    pub diagnostics: bool,
}

impl CaptureConfig {
    /// Radius of a corner handle in screen pixels.
    pub fn handle_radius(&self) -> f32 {
        match self.input_mode {
            InputMode::Pointer => 8.0,
            InputMode::Touch => 14.0,
        }
    }

    /// Multiplier applied to the handle radius for hit-testing.
    pub fn hit_area_multiplier(&self) -> f32 {
        match self.input_mode {
            InputMode::Pointer => 2.0,
            InputMode::Touch => 3.0,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Pointer,
            default_corner_inset: 0.05,
            min_extracted_width: 600,
            min_extracted_height: 380,
            min_quad_area_fraction: 0.02,
            min_corner_distance: 24.0,
            diagnostics: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_targets_are_larger_than_pointer() {
        let pointer = CaptureConfig::default();
        let touch = CaptureConfig {
            input_mode: InputMode::Touch,
            ..CaptureConfig::default()
        };
        assert!(touch.handle_radius() > pointer.handle_radius());
        assert!(touch.hit_area_multiplier() > pointer.hit_area_multiplier());
    }

    #[test]
    fn default_inset_is_a_sane_fraction() {
        let config = CaptureConfig::default();
        assert!(config.default_corner_inset > 0.0);
        assert!(config.default_corner_inset < 0.5);
    }
}
