//! Placement math for the host's text-edit overlay.
//!
//! While a block is edited, the host positions a native text input over it
//! so keystrokes land in a real input stack. The overlay must sit exactly
//! on the block's text interior and follow pan/zoom each frame.

use kurbo::Rect;
use loomboard_core::block::{Block, BlockContent};
use loomboard_core::camera::Camera;

use crate::text::TEXT_PADDING;

/// Screen-space placement for the host's edit input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditOverlay {
    /// Where the input goes, in screen pixels.
    pub rect: Rect,
    /// Font size in screen pixels, so the overlay text matches the
    /// rendered text at the current zoom.
    pub font_px: f64,
}

/// Compute the overlay for a block, or `None` for image blocks.
pub fn overlay_for(block: &Block, camera: &Camera) -> Option<EditOverlay> {
    let BlockContent::Text { font_size, .. } = &block.content else {
        return None;
    };

    let interior = block.rect().inset(-TEXT_PADDING);
    let top_left = camera.to_screen(interior.origin());
    let bottom_right = camera.to_screen(kurbo::Point::new(interior.x1, interior.y1));

    Some(EditOverlay {
        rect: Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y),
        font_px: font_size * camera.scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size, Vec2};
    use loomboard_core::block::{ImageFormat, ImageSource};

    fn text_block() -> Block {
        Block::new(
            Point::new(100.0, 50.0),
            Size::new(200.0, 120.0),
            BlockContent::text("words"),
        )
    }

    #[test]
    fn test_overlay_matches_interior_at_identity() {
        let block = text_block();
        let camera = Camera::new();

        let overlay = overlay_for(&block, &camera).unwrap();
        assert_eq!(overlay.rect, Rect::new(108.0, 58.0, 292.0, 162.0));
        assert!((overlay.font_px - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlay_follows_pan_and_zoom() {
        let block = text_block();
        let mut camera = Camera::new();
        camera.scale = 2.0;
        camera.offset = Vec2::new(30.0, -10.0);

        let overlay = overlay_for(&block, &camera).unwrap();
        assert_eq!(overlay.rect, Rect::new(246.0, 106.0, 614.0, 314.0));
        assert!((overlay.font_px - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_blocks_have_no_overlay() {
        let block = Block::new(
            Point::ZERO,
            Size::new(100.0, 100.0),
            BlockContent::Image {
                source: ImageSource::from_bytes(ImageFormat::Png, &[0]),
                natural_size: Size::new(100.0, 100.0),
            },
        );
        assert!(overlay_for(&block, &Camera::new()).is_none());
    }
}
