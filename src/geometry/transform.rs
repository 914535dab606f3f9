use serde::{Deserialize, Serialize};

use super::point::Point;

/// Mapping between source-image space and the screen container the image is
/// displayed in: uniform scale plus centering offsets.
///
/// Pure value; callers recompute it whenever the container resizes (the
/// container should be observed continuously, not just measured once).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl FitTransform {
    /// No-op mapping, used when no image is loaded.
    pub const IDENTITY: FitTransform = FitTransform {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Fit an image into a container without ever upscaling:
    /// `scale = min(cw/iw, ch/ih, 1)`, offsets center the scaled image.
    pub fn compute(
        image_width: f32,
        image_height: f32,
        container_width: f32,
        container_height: f32,
    ) -> FitTransform {
        if image_width <= 0.0 || image_height <= 0.0 {
            return Self::IDENTITY;
        }
        let scale = (container_width / image_width)
            .min(container_height / image_height)
            .min(1.0);
        if scale <= 0.0 {
            return Self::IDENTITY;
        }
        FitTransform {
            scale,
            offset_x: (container_width - image_width * scale) / 2.0,
            offset_y: (container_height - image_height * scale) / 2.0,
        }
    }

    /// Inverse-map a pointer position to image space.
    pub fn screen_to_image(&self, screen_x: f32, screen_y: f32) -> Point {
        Point {
            x: (screen_x - self.offset_x) / self.scale,
            y: (screen_y - self.offset_y) / self.scale,
        }
    }

    /// Map an image-space point to screen space.
    pub fn image_to_screen(&self, point: Point) -> (f32, f32) {
        (
            point.x * self.scale + self.offset_x,
            point.y * self.scale + self.offset_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_upscales() {
        // Small image, huge container: scale caps at 1.
        let t = FitTransform::compute(100.0, 50.0, 4000.0, 4000.0);
        assert_eq!(t.scale, 1.0);

        // Sweep a range of aspect ratios.
        for (iw, ih, cw, ch) in [
            (1.0, 1.0, 10_000.0, 10_000.0),
            (3000.0, 2000.0, 800.0, 600.0),
            (640.0, 480.0, 640.0, 480.0),
            (10.0, 2000.0, 500.0, 500.0),
        ] {
            let t = FitTransform::compute(iw, ih, cw, ch);
            assert!(t.scale <= 1.0, "scale {} > 1 for {iw}x{ih}", t.scale);
        }
    }

    #[test]
    fn centers_scaled_image() {
        let t = FitTransform::compute(1000.0, 500.0, 500.0, 500.0);
        assert_eq!(t.scale, 0.5);
        assert_eq!(t.offset_x, 0.0);
        // 500 - 500*0.5 = 250, halved for centering.
        assert_eq!(t.offset_y, 125.0);
    }

    #[test]
    fn screen_to_image_inverts_image_to_screen() {
        let t = FitTransform::compute(1200.0, 800.0, 600.0, 600.0);
        let p = Point::new(512.0, 101.5);
        let (sx, sy) = t.image_to_screen(p);
        let back = t.screen_to_image(sx, sy);
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn zero_sized_image_yields_identity() {
        assert_eq!(
            FitTransform::compute(0.0, 100.0, 500.0, 500.0),
            FitTransform::IDENTITY
        );
    }
}
