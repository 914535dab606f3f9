use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in source-image pixel coordinates (not screen space).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp componentwise to `[0, width] × [0, height]`.
    pub fn clamped_to(&self, width: f32, height: f32) -> Point {
        Point {
            x: self.x.clamp(0.0, width),
            y: self.y.clamp(0.0, height),
        }
    }
}

/// One of the four corners of the document quadrilateral.
///
/// A proper enum rather than string keys: typos become compile errors and
/// transition logic can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::TopRight => "top_right",
            Self::BottomLeft => "bottom_left",
            Self::BottomRight => "bottom_right",
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four named corners of a document quadrilateral on the source image.
///
/// Invariant: all four points lie within `[0, image_width] × [0, image_height]`
/// (maintained by `drag_corner` / `clamped_to`). No ordering or convexity is
/// enforced; a user may drag corners into a self-intersecting quad, which is
/// passed through to the warper as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl CornerSet {
    pub fn get(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    /// A copy with one corner replaced, the other three untouched.
    pub fn with_corner(&self, corner: Corner, point: Point) -> CornerSet {
        let mut next = *self;
        match corner {
            Corner::TopLeft => next.top_left = point,
            Corner::TopRight => next.top_right = point,
            Corner::BottomLeft => next.bottom_left = point,
            Corner::BottomRight => next.bottom_right = point,
        }
        next
    }

    /// All four corners clamped to the image bounds.
    pub fn clamped_to(&self, width: f32, height: f32) -> CornerSet {
        CornerSet {
            top_left: self.top_left.clamped_to(width, height),
            top_right: self.top_right.clamped_to(width, height),
            bottom_left: self.bottom_left.clamped_to(width, height),
            bottom_right: self.bottom_right.clamped_to(width, height),
        }
    }

    /// Deterministic fallback quadrilateral: a rectangle inset from the full
    /// image bounds by `inset` (fraction of each dimension). Used when corner
    /// auto-detection fails or returns nothing.
    pub fn inset_default(width: f32, height: f32, inset: f32) -> CornerSet {
        let dx = width * inset;
        let dy = height * inset;
        CornerSet {
            top_left: Point::new(dx, dy),
            top_right: Point::new(width - dx, dy),
            bottom_left: Point::new(dx, height - dy),
            bottom_right: Point::new(width - dx, height - dy),
        }
    }

    /// Quadrilateral area via the shoelace formula, in tl→tr→br→bl order.
    /// Self-intersecting quads can yield near-zero values, which is exactly
    /// what the degeneracy check wants to catch.
    pub fn area(&self) -> f32 {
        let p = [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ];
        let mut sum = 0.0f32;
        for i in 0..4 {
            let a = p[i];
            let b = p[(i + 1) % 4];
            sum += a.x * b.y - b.x * a.y;
        }
        (sum / 2.0).abs()
    }

    /// Smallest distance between any pair of corners.
    pub fn min_corner_distance(&self) -> f32 {
        let p = [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ];
        let mut min = f32::MAX;
        for i in 0..4 {
            for j in (i + 1)..4 {
                min = min.min(p[i].distance_to(&p[j]));
            }
        }
        min
    }
}

/// Move one corner to `new_point`, clamped componentwise to the image
/// bounds. Returns the updated set; the caller owns corner state.
pub fn drag_corner(
    corner: Corner,
    new_point: Point,
    corners: &CornerSet,
    image_width: f32,
    image_height: f32,
) -> CornerSet {
    corners.with_corner(corner, new_point.clamped_to(image_width, image_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame() -> CornerSet {
        CornerSet {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(100.0, 0.0),
            bottom_left: Point::new(0.0, 80.0),
            bottom_right: Point::new(100.0, 80.0),
        }
    }

    #[test]
    fn drag_clamps_to_image_bounds() {
        let corners = full_frame();
        let dragged = drag_corner(
            Corner::TopRight,
            Point::new(250.0, -40.0),
            &corners,
            100.0,
            80.0,
        );
        assert_eq!(dragged.top_right, Point::new(100.0, 0.0));
        // Other corners untouched.
        assert_eq!(dragged.top_left, corners.top_left);
        assert_eq!(dragged.bottom_left, corners.bottom_left);
        assert_eq!(dragged.bottom_right, corners.bottom_right);
    }

    #[test]
    fn drag_always_stays_in_bounds() {
        let corners = full_frame();
        let probes = [
            Point::new(-1.0, -1.0),
            Point::new(1e6, 1e6),
            Point::new(50.0, -0.001),
            Point::new(f32::MAX, 40.0),
        ];
        for target in probes {
            for corner in Corner::ALL {
                let next = drag_corner(corner, target, &corners, 100.0, 80.0);
                let p = next.get(corner);
                assert!((0.0..=100.0).contains(&p.x), "x out of bounds: {}", p.x);
                assert!((0.0..=80.0).contains(&p.y), "y out of bounds: {}", p.y);
            }
        }
    }

    #[test]
    fn inset_default_is_symmetric() {
        let corners = CornerSet::inset_default(200.0, 100.0, 0.05);
        assert_eq!(corners.top_left, Point::new(10.0, 5.0));
        assert_eq!(corners.top_right, Point::new(190.0, 5.0));
        assert_eq!(corners.bottom_left, Point::new(10.0, 95.0));
        assert_eq!(corners.bottom_right, Point::new(190.0, 95.0));
    }

    #[test]
    fn area_of_axis_aligned_rect() {
        assert!((full_frame().area() - 8000.0).abs() < 1e-3);
    }

    #[test]
    fn self_intersecting_quad_has_reduced_area() {
        // Swap top_left and top_right → bowtie.
        let mut corners = full_frame();
        std::mem::swap(&mut corners.top_left, &mut corners.top_right);
        assert!(corners.area() < full_frame().area());
    }

    #[test]
    fn min_corner_distance_detects_coincident_corners() {
        let mut corners = full_frame();
        corners.top_right = corners.top_left;
        assert_eq!(corners.min_corner_distance(), 0.0);
    }
}
