//! Post-warp quality validation.
//!
//! Synchronous sanity check on the perspective-corrected image, run right
//! after extraction and before AI/OCR: output resolution minimums and
//! corner-geometry degeneracy (near-zero quad area, coincident corners).
//! A failed check never blocks field extraction; it surfaces as a blocking
//! warning at final acceptance instead.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};

use crate::config::CaptureConfig;
use crate::geometry::CornerSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Specific problems the check found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QualityIssue {
    LowResolution {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },
    /// Quad area is a negligible fraction of the source image; usually a
    /// collapsed or self-intersecting corner set.
    DegenerateQuad { area_fraction: f32 },
    CornersTooClose { distance: f32, minimum: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub is_valid: bool,
    pub issues: Vec<QualityIssue>,
    pub resolution: Resolution,
}

/// Validate a warped document image against the session thresholds.
///
/// `source_width`/`source_height` are the dimensions of the original image
/// the corners live on, used to scale the degeneracy check.
pub fn validate_quality(
    extracted: &DynamicImage,
    corners: &CornerSet,
    source_width: u32,
    source_height: u32,
    config: &CaptureConfig,
) -> QualityReport {
    let (width, height) = extracted.dimensions();
    let mut issues = Vec::new();

    if width < config.min_extracted_width || height < config.min_extracted_height {
        issues.push(QualityIssue::LowResolution {
            width,
            height,
            min_width: config.min_extracted_width,
            min_height: config.min_extracted_height,
        });
    }

    let source_area = (source_width as f32) * (source_height as f32);
    if source_area > 0.0 {
        let area_fraction = corners.area() / source_area;
        if area_fraction < config.min_quad_area_fraction {
            issues.push(QualityIssue::DegenerateQuad { area_fraction });
        }
    }

    let min_distance = corners.min_corner_distance();
    if min_distance < config.min_corner_distance {
        issues.push(QualityIssue::CornersTooClose {
            distance: min_distance,
            minimum: config.min_corner_distance,
        });
    }

    let is_valid = issues.is_empty();
    if !is_valid {
        tracing::warn!(
            width,
            height,
            issue_count = issues.len(),
            "Quality validation flagged extracted image"
        );
    }

    QualityReport {
        is_valid,
        issues,
        resolution: Resolution { width, height },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn good_corners() -> CornerSet {
        CornerSet::inset_default(1000.0, 800.0, 0.05)
    }

    fn image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([128u8, 128, 128]),
        ))
    }

    #[test]
    fn passes_a_clean_extraction() {
        let report = validate_quality(
            &image(900, 600),
            &good_corners(),
            1000,
            800,
            &CaptureConfig::default(),
        );
        assert!(report.is_valid);
        assert!(report.issues.is_empty());
        assert_eq!(report.resolution, Resolution { width: 900, height: 600 });
    }

    #[test]
    fn flags_low_resolution() {
        let report = validate_quality(
            &image(200, 120),
            &good_corners(),
            1000,
            800,
            &CaptureConfig::default(),
        );
        assert!(!report.is_valid);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, QualityIssue::LowResolution { .. })));
    }

    #[test]
    fn flags_degenerate_quad_and_close_corners() {
        // All corners collapsed into a 4px cluster.
        let corners = CornerSet {
            top_left: Point::new(500.0, 400.0),
            top_right: Point::new(504.0, 400.0),
            bottom_left: Point::new(500.0, 404.0),
            bottom_right: Point::new(504.0, 404.0),
        };
        let report = validate_quality(
            &image(900, 600),
            &corners,
            1000,
            800,
            &CaptureConfig::default(),
        );
        assert!(!report.is_valid);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, QualityIssue::DegenerateQuad { .. })));
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, QualityIssue::CornersTooClose { .. })));
    }

    #[test]
    fn bowtie_quad_is_flagged_as_degenerate() {
        // Self-intersecting quad: shoelace area collapses toward zero.
        let corners = CornerSet {
            top_left: Point::new(900.0, 50.0),
            top_right: Point::new(100.0, 50.0),
            bottom_left: Point::new(100.0, 700.0),
            bottom_right: Point::new(900.0, 700.0),
        };
        let report = validate_quality(
            &image(900, 600),
            &corners,
            1000,
            800,
            &CaptureConfig::default(),
        );
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, QualityIssue::DegenerateQuad { .. })));
    }
}
