//! Backend-agnostic display list.
//!
//! A [`Scene`] is what one frame looks like: draw nodes in world
//! coordinates plus the transform that maps them to the screen, and a list
//! of screen-space hit regions for DOM-style hosts that do their own event
//! routing. Backends walk the nodes in order, rear to front.

use kurbo::{Affine, BezPath, Point, Rect};
use loomboard_core::block::BlockId;
use loomboard_core::handles::Corner;
use peniko::Color;

use crate::images::ImageStatus;

/// One draw command. Geometry is world-space unless noted.
#[derive(Debug, Clone)]
pub enum SceneNode {
    Fill {
        path: BezPath,
        color: Color,
    },
    Stroke {
        path: BezPath,
        color: Color,
        width: f64,
    },
    /// Pre-wrapped text anchored at `origin`, the top-left of the first
    /// line. Line advance is the core line-height estimate.
    Text {
        lines: Vec<String>,
        origin: Point,
        font_size: f64,
        color: Color,
    },
    /// Image content for `block`, scaled into `rect`. The host resolves
    /// pixels from the block's source; the scene never carries them.
    Image { block: BlockId, rect: Rect },
    /// Placeholder chrome while an image resolves or after it failed.
    Placeholder { rect: Rect, status: ImageStatus },
}

/// What a screen-space region maps back to when the host routes events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Block(BlockId),
    Handle { block: BlockId, corner: Corner },
}

/// An interactive region in screen coordinates, rear to front.
#[derive(Debug, Clone, Copy)]
pub struct HitRegion {
    pub rect: Rect,
    pub target: HitTarget,
}

/// A fully built frame.
#[derive(Debug, Clone)]
pub struct Scene {
    /// World-to-screen transform for this frame.
    pub transform: Affine,
    /// Clear color for the surface.
    pub background: Color,
    pub nodes: Vec<SceneNode>,
    pub hit_regions: Vec<HitRegion>,
}

impl Scene {
    pub fn new(transform: Affine, background: Color) -> Self {
        Self {
            transform,
            background,
            nodes: Vec::new(),
            hit_regions: Vec::new(),
        }
    }

    pub fn fill(&mut self, path: BezPath, color: Color) {
        self.nodes.push(SceneNode::Fill { path, color });
    }

    pub fn stroke(&mut self, path: BezPath, color: Color, width: f64) {
        self.nodes.push(SceneNode::Stroke { path, color, width });
    }
}

/// Frame colors. Defaults match the neutral app chrome.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub grid: Color,
    pub origin_marker: Color,
    /// Block interiors stay hit-testable without reading as filled.
    pub block_fill: Color,
    pub selection: Color,
    pub handle_fill: Color,
    pub connection: Color,
    pub placeholder: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgba8(250, 250, 250, 255),
            grid: Color::from_rgba8(200, 200, 200, 100),
            origin_marker: Color::from_rgba8(148, 163, 184, 255),
            block_fill: Color::from_rgba8(255, 255, 255, 5),
            selection: Color::from_rgba8(59, 130, 246, 255),
            handle_fill: Color::WHITE,
            connection: Color::from_rgba8(100, 116, 139, 255),
            placeholder: Color::from_rgba8(203, 213, 225, 255),
        }
    }
}
