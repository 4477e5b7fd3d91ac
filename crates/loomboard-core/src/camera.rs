//! View transform between screen pixels and world coordinates.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom scale.
pub const MIN_SCALE: f64 = 0.05;
/// Largest allowed zoom scale.
pub const MAX_SCALE: f64 = 10.0;

/// Finite world half-extent used for grid/background rendering.
/// Block placement itself is unbounded.
pub const WORLD_EXTENT: f64 = 5000.0;

/// Camera manages the view transform for the canvas.
///
/// It handles panning (translation) and zooming (scaling), converting
/// between screen coordinates and world coordinates. All math is `f64`;
/// nothing here assumes integer pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen units.
    pub offset: Vec2,
    /// Current zoom scale, kept within [`MIN_SCALE`, `MAX_SCALE`].
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    /// Create a new camera at the identity view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Affine transform converting world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Inverse transform converting screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to world coordinates.
    pub fn to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Set the zoom scale directly, clamped to the allowed range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Zoom by a factor, keeping the given screen point fixed.
    pub fn zoom_about(&mut self, screen_point: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        // World point under the cursor before the zoom
        let world_point = self.to_world(screen_point);

        self.scale = new_scale;

        // Adjust offset so world_point stays at screen_point
        let new_screen = self.to_screen(world_point);
        self.offset += Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
    }

    /// Reset to the identity view.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }

    /// The world-space rectangle currently visible in a viewport of the
    /// given size.
    pub fn visible_world_rect(&self, viewport: Size) -> Rect {
        let top_left = self.to_world(Point::ZERO);
        let bottom_right = self.to_world(Point::new(viewport.width, viewport.height));
        Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }
}
