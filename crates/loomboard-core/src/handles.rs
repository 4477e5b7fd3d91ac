//! Resize handles for selected blocks.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Handle size in screen pixels. The renderer divides by the camera scale so
/// handles stay this size visually at any zoom.
pub const HANDLE_SIZE: f64 = 8.0;
/// Handle hit tolerance in screen pixels, divided by the camera scale at
/// call sites.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;

/// Corner positions of a block's bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// The diagonally opposite corner; it stays fixed during a resize.
    pub fn opposite(&self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// This corner's position on a rectangle.
    pub fn position(&self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// A resize handle with its world position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Position in world coordinates.
    pub position: Point,
    /// Which corner this handle controls.
    pub corner: Corner,
}

impl Handle {
    /// Check whether a world point hits this handle. `tolerance` must
    /// already be adjusted for the camera scale.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// The four corner handles of a bounding rectangle.
pub fn corner_handles(rect: Rect) -> [Handle; 4] {
    [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ]
    .map(|corner| Handle {
        position: corner.position(rect),
        corner,
    })
}

/// Find which corner handle (if any) of a rectangle is hit at the given
/// world point.
pub fn hit_test_handles(rect: Rect, point: Point, tolerance: f64) -> Option<Corner> {
    corner_handles(rect)
        .into_iter()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.corner)
}

/// Recompute a rectangle with the grabbed corner displaced by `delta` and
/// the opposite corner fixed.
///
/// The moving edges clamp at `opposite ∓ min` so the rect never inverts and
/// the position never overshoots the far edge once the size floor is hit.
pub fn resize_from_corner(
    origin: Rect,
    corner: Corner,
    delta: Vec2,
    min_width: f64,
    min_height: f64,
) -> Rect {
    match corner {
        Corner::TopLeft => Rect::new(
            (origin.x0 + delta.x).min(origin.x1 - min_width),
            (origin.y0 + delta.y).min(origin.y1 - min_height),
            origin.x1,
            origin.y1,
        ),
        Corner::TopRight => Rect::new(
            origin.x0,
            (origin.y0 + delta.y).min(origin.y1 - min_height),
            (origin.x1 + delta.x).max(origin.x0 + min_width),
            origin.y1,
        ),
        Corner::BottomLeft => Rect::new(
            (origin.x0 + delta.x).min(origin.x1 - min_width),
            origin.y0,
            origin.x1,
            (origin.y1 + delta.y).max(origin.y0 + min_height),
        ),
        Corner::BottomRight => Rect::new(
            origin.x0,
            origin.y0,
            (origin.x1 + delta.x).max(origin.x0 + min_width),
            (origin.y1 + delta.y).max(origin.y0 + min_height),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: f64 = 50.0;

    #[test]
    fn test_corner_handles_positions() {
        let rect = Rect::new(0.0, 0.0, 100.0, 60.0);
        let handles = corner_handles(rect);

        assert_eq!(handles[0].position, Point::new(0.0, 0.0));
        assert_eq!(handles[1].position, Point::new(100.0, 0.0));
        assert_eq!(handles[2].position, Point::new(0.0, 60.0));
        assert_eq!(handles[3].position, Point::new(100.0, 60.0));
    }

    #[test]
    fn test_handle_hit_test() {
        let handle = Handle {
            position: Point::new(50.0, 50.0),
            corner: Corner::TopLeft,
        };
        assert!(handle.hit_test(Point::new(50.0, 50.0), 10.0));
        assert!(handle.hit_test(Point::new(56.0, 56.0), 10.0));
        assert!(!handle.hit_test(Point::new(70.0, 70.0), 10.0));
    }

    #[test]
    fn test_hit_test_handles_finds_corner() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            hit_test_handles(rect, Point::new(98.0, 2.0), 6.0),
            Some(Corner::TopRight)
        );
        assert_eq!(hit_test_handles(rect, Point::new(50.0, 50.0), 6.0), None);
    }

    #[test]
    fn test_opposite_corners() {
        assert_eq!(Corner::TopLeft.opposite(), Corner::BottomRight);
        assert_eq!(Corner::BottomLeft.opposite(), Corner::TopRight);
    }

    #[test]
    fn test_resize_top_left_keeps_bottom_right_fixed() {
        let origin = Rect::new(0.0, 0.0, 100.0, 100.0);
        let result = resize_from_corner(origin, Corner::TopLeft, Vec2::new(20.0, 10.0), MIN, MIN);

        assert_eq!(result, Rect::new(20.0, 10.0, 100.0, 100.0));
        assert!((result.width() - 80.0).abs() < f64::EPSILON);
        assert!((result.height() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_bottom_right_grows() {
        let origin = Rect::new(10.0, 10.0, 110.0, 110.0);
        let result =
            resize_from_corner(origin, Corner::BottomRight, Vec2::new(40.0, -20.0), MIN, MIN);

        assert_eq!(result, Rect::new(10.0, 10.0, 150.0, 90.0));
    }

    #[test]
    fn test_resize_clamps_without_inversion() {
        let origin = Rect::new(0.0, 0.0, 100.0, 100.0);

        // Dragging the top-left far past the opposite corner
        let result =
            resize_from_corner(origin, Corner::TopLeft, Vec2::new(500.0, 500.0), MIN, MIN);
        assert_eq!(result, Rect::new(50.0, 50.0, 100.0, 100.0));
        assert!((result.width() - MIN).abs() < f64::EPSILON);
        assert!((result.height() - MIN).abs() < f64::EPSILON);

        // And the bottom-right dragged far past the top-left
        let result =
            resize_from_corner(origin, Corner::BottomRight, Vec2::new(-500.0, -500.0), MIN, MIN);
        assert_eq!(result, Rect::new(0.0, 0.0, 50.0, 50.0));
    }

    #[test]
    fn test_resize_mixed_corners() {
        let origin = Rect::new(0.0, 0.0, 200.0, 100.0);

        let result = resize_from_corner(origin, Corner::TopRight, Vec2::new(-30.0, 20.0), MIN, MIN);
        assert_eq!(result, Rect::new(0.0, 20.0, 170.0, 100.0));

        let result =
            resize_from_corner(origin, Corner::BottomLeft, Vec2::new(25.0, -15.0), MIN, MIN);
        assert_eq!(result, Rect::new(25.0, 0.0, 200.0, 85.0));
    }
}
