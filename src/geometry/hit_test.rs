use super::point::{Corner, CornerSet, Point};

/// Find the corner handle under a pointer position (image space).
///
/// Returns the nearest corner whose Euclidean distance to `point` is within
/// `handle_radius * hit_area_multiplier`, or `None` if no corner qualifies.
/// The multiplier comes from the session config and is larger for touch
/// input, where fingers need more tolerance than a mouse cursor.
pub fn hit_test_corner(
    point: Point,
    corners: &CornerSet,
    handle_radius: f32,
    hit_area_multiplier: f32,
) -> Option<Corner> {
    let max_distance = handle_radius * hit_area_multiplier;
    Corner::ALL
        .iter()
        .map(|&corner| (corner, corners.get(corner).distance_to(&point)))
        .filter(|&(_, distance)| distance <= max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(corner, _)| corner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> CornerSet {
        CornerSet {
            top_left: Point::new(10.0, 10.0),
            top_right: Point::new(190.0, 10.0),
            bottom_left: Point::new(10.0, 140.0),
            bottom_right: Point::new(190.0, 140.0),
        }
    }

    #[test]
    fn hits_corner_inside_radius() {
        // 8px radius * 2.0 multiplier = 16px tolerance.
        let hit = hit_test_corner(Point::new(20.0, 18.0), &corners(), 8.0, 2.0);
        assert_eq!(hit, Some(Corner::TopLeft));
    }

    #[test]
    fn misses_outside_all_hit_radii() {
        let hit = hit_test_corner(Point::new(100.0, 75.0), &corners(), 8.0, 2.0);
        assert_eq!(hit, None);
    }

    #[test]
    fn exactly_on_boundary_counts_as_hit() {
        let hit = hit_test_corner(Point::new(10.0 + 16.0, 10.0), &corners(), 8.0, 2.0);
        assert_eq!(hit, Some(Corner::TopLeft));
    }

    #[test]
    fn nearest_corner_wins_when_two_qualify() {
        // Corners 10px apart, tolerance large enough to cover both.
        let tight = CornerSet {
            top_left: Point::new(10.0, 10.0),
            top_right: Point::new(20.0, 10.0),
            bottom_left: Point::new(10.0, 100.0),
            bottom_right: Point::new(20.0, 100.0),
        };
        let hit = hit_test_corner(Point::new(13.0, 10.0), &tight, 8.0, 3.0);
        assert_eq!(hit, Some(Corner::TopLeft));
        let hit = hit_test_corner(Point::new(17.0, 10.0), &tight, 8.0, 3.0);
        assert_eq!(hit, Some(Corner::TopRight));
    }

    #[test]
    fn touch_multiplier_extends_reach() {
        let probe = Point::new(10.0 + 20.0, 10.0);
        // Pointer tolerance (16px) misses, touch tolerance (14*3=42px) hits.
        assert_eq!(hit_test_corner(probe, &corners(), 8.0, 2.0), None);
        assert_eq!(
            hit_test_corner(probe, &corners(), 14.0, 3.0),
            Some(Corner::TopLeft)
        );
    }
}
