//! Frame assembly: store + camera in, display list out.

use kurbo::{BezPath, Point, Rect, Shape, Size};
use loomboard_core::block::{BlockContent, BlockId};
use loomboard_core::camera::{Camera, WORLD_EXTENT};
use loomboard_core::connection::CurveStyle;
use loomboard_core::handles::{HANDLE_SIZE, corner_handles};
use loomboard_core::store::EntityStore;
use thiserror::Error;

use crate::images::{ImageResolver, ImageStatus, default_status};
use crate::scene::{HitRegion, HitTarget, Palette, Scene, SceneNode};
use crate::text::{TEXT_PADDING, wrap_text};

/// World-space distance between grid lines.
pub const GRID_SPACING: f64 = 100.0;

/// Half-length of each origin marker arm, world units.
const ORIGIN_ARM: f64 = 16.0;

/// Cap on the horizontal control-point offset of connection curves.
const MAX_CONNECTION_OFFSET: f64 = 100.0;

/// Slack around a connection's endpoint box when culling, covering the
/// control-point bulge plus stroke width.
const CONNECTION_CULL_PAD: f64 = MAX_CONNECTION_OFFSET + 20.0;

/// Scene building errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("viewport is degenerate: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
}

/// Result type for scene building.
pub type SceneResult<T> = Result<T, SceneError>;

/// Grid display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    /// No grid (plain background).
    None,
    /// Full grid lines.
    #[default]
    Lines,
    /// Only intersection dots.
    Dots,
}

impl GridStyle {
    /// Cycle to the next grid style.
    pub fn next(self) -> Self {
        match self {
            GridStyle::None => GridStyle::Lines,
            GridStyle::Lines => GridStyle::Dots,
            GridStyle::Dots => GridStyle::None,
        }
    }

    /// Get display name for this grid style.
    pub fn name(self) -> &'static str {
        match self {
            GridStyle::None => "None",
            GridStyle::Lines => "Lines",
            GridStyle::Dots => "Dots",
        }
    }
}

/// Context for a single frame.
pub struct RenderContext<'a> {
    /// The entities to draw.
    pub store: &'a EntityStore,
    /// The view transform.
    pub camera: &'a Camera,
    /// Viewport size in screen pixels.
    pub viewport: Size,
    /// Grid display style.
    pub grid_style: GridStyle,
    /// Frame colors.
    pub palette: Palette,
    /// Block currently under the host's edit overlay; its text is skipped
    /// so the overlay is the only visible copy.
    pub editing_block: Option<BlockId>,
    /// Host-side image readiness lookup.
    pub resolver: Option<&'a dyn ImageResolver>,
}

impl<'a> RenderContext<'a> {
    pub fn new(store: &'a EntityStore, camera: &'a Camera, viewport: Size) -> Self {
        Self {
            store,
            camera,
            viewport,
            grid_style: GridStyle::default(),
            palette: Palette::default(),
            editing_block: None,
            resolver: None,
        }
    }

    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_editing_block(mut self, block: Option<BlockId>) -> Self {
        self.editing_block = block;
        self
    }

    pub fn with_resolver(mut self, resolver: &'a dyn ImageResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Build the display list for one frame.
///
/// Draw order is grid, origin marker, connections, blocks in z-order, then
/// selection chrome on top. Chrome strokes and handles divide their sizes
/// by the camera scale so they stay visually constant under zoom.
pub fn build_scene(ctx: &RenderContext) -> SceneResult<Scene> {
    let Size { width, height } = ctx.viewport;
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(SceneError::InvalidViewport { width, height });
    }

    let mut builder = SceneBuilder {
        scene: Scene::new(ctx.camera.transform(), ctx.palette.background),
        scale: ctx.camera.scale,
        visible: ctx.camera.visible_world_rect(ctx.viewport),
        palette: ctx.palette,
    };

    match ctx.grid_style {
        GridStyle::None => {}
        GridStyle::Lines => builder.grid_lines(),
        GridStyle::Dots => builder.grid_dots(),
    }
    builder.origin_marker();
    builder.connections(ctx.store);
    builder.blocks(ctx);
    builder.selection_chrome(ctx.store);
    builder.hit_regions(ctx.store);

    let scene = builder.scene;
    log::trace!(
        "scene built: {} nodes, {} hit regions",
        scene.nodes.len(),
        scene.hit_regions.len()
    );
    Ok(scene)
}

/// Connection path between two block centers.
///
/// Curved connections are cubics whose control points extend horizontally
/// by half the x-distance, capped at 100 world units, which keeps short
/// links gently bowed and long links from ballooning.
pub fn connection_path(start: Point, end: Point, style: CurveStyle) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(start);
    match style {
        CurveStyle::Straight => {
            path.line_to(end);
        }
        CurveStyle::Curved => {
            let offset = ((end.x - start.x).abs() * 0.5).min(MAX_CONNECTION_OFFSET);
            path.curve_to(
                Point::new(start.x + offset, start.y),
                Point::new(end.x - offset, end.y),
                end,
            );
        }
    }
    path
}

struct SceneBuilder {
    scene: Scene,
    scale: f64,
    /// Visible region in world coordinates.
    visible: Rect,
    palette: Palette,
}

impl SceneBuilder {
    /// Grid extent: the visible region clamped to the finite world,
    /// aligned outward to whole grid steps.
    fn grid_bounds(&self, spacing: f64) -> Option<(f64, f64, f64, f64)> {
        let world = Rect::new(-WORLD_EXTENT, -WORLD_EXTENT, WORLD_EXTENT, WORLD_EXTENT);
        let bounds = self.visible.intersect(world);
        if bounds.is_zero_area() {
            return None;
        }
        let start_x = (bounds.x0 / spacing).floor() * spacing;
        let start_y = (bounds.y0 / spacing).floor() * spacing;
        let end_x = (bounds.x1 / spacing).ceil() * spacing;
        let end_y = (bounds.y1 / spacing).ceil() * spacing;
        Some((start_x, start_y, end_x, end_y))
    }

    /// Full grid lines, batched into a single stroke.
    fn grid_lines(&mut self) {
        let Some((start_x, start_y, end_x, end_y)) = self.grid_bounds(GRID_SPACING) else {
            return;
        };

        let mut path = BezPath::new();
        let mut x = start_x;
        while x <= end_x {
            path.move_to(Point::new(x, start_y));
            path.line_to(Point::new(x, end_y));
            x += GRID_SPACING;
        }
        let mut y = start_y;
        while y <= end_y {
            path.move_to(Point::new(start_x, y));
            path.line_to(Point::new(end_x, y));
            y += GRID_SPACING;
        }
        self.scene.stroke(path, self.palette.grid, 0.5);
    }

    /// Dots at grid intersections, batched into a single fill.
    fn grid_dots(&mut self) {
        let Some((start_x, start_y, end_x, end_y)) = self.grid_bounds(GRID_SPACING) else {
            return;
        };
        let dot_size = 1.5;

        let mut path = BezPath::new();
        let mut x = start_x;
        while x <= end_x {
            let mut y = start_y;
            while y <= end_y {
                let dot = Rect::new(x - dot_size, y - dot_size, x + dot_size, y + dot_size);
                path.move_to(Point::new(dot.x0, dot.y0));
                path.line_to(Point::new(dot.x1, dot.y0));
                path.line_to(Point::new(dot.x1, dot.y1));
                path.line_to(Point::new(dot.x0, dot.y1));
                path.close_path();
                y += GRID_SPACING;
            }
            x += GRID_SPACING;
        }
        self.scene.fill(path, self.palette.grid);
    }

    /// Crosshair at the world origin so users can find their way back.
    fn origin_marker(&mut self) {
        let reach = self.visible.inflate(ORIGIN_ARM, ORIGIN_ARM);
        if !reach.contains(Point::ZERO) {
            return;
        }
        let mut path = BezPath::new();
        path.move_to(Point::new(-ORIGIN_ARM, 0.0));
        path.line_to(Point::new(ORIGIN_ARM, 0.0));
        path.move_to(Point::new(0.0, -ORIGIN_ARM));
        path.line_to(Point::new(0.0, ORIGIN_ARM));
        self.scene
            .stroke(path, self.palette.origin_marker, 1.0 / self.scale);
    }

    /// Connection curves, drawn beneath the blocks they link.
    fn connections(&mut self, store: &EntityStore) {
        for connection in store.connections() {
            let (a_id, b_id) = connection.endpoints();
            let (Some(a), Some(b)) = (store.block(a_id), store.block(b_id)) else {
                log::warn!("connection {} references a missing block", connection.id);
                continue;
            };
            if !a.visible || !b.visible {
                continue;
            }
            let start = a.center();
            let end = b.center();
            let reach = Rect::from_points(start, end)
                .inflate(CONNECTION_CULL_PAD, CONNECTION_CULL_PAD);
            if reach.intersect(self.visible).is_zero_area() {
                continue;
            }
            let path = connection_path(start, end, connection.style);
            self.scene
                .stroke(path, self.palette.connection, 1.5 / self.scale);
        }
    }

    /// Visible blocks in z-order: hit fill plus content.
    fn blocks(&mut self, ctx: &RenderContext) {
        for id in ctx.store.blocks_in_rect(self.visible) {
            let Some(block) = ctx.store.block(id) else { continue };
            let rect = block.rect();
            self.scene.fill(rect.to_path(0.1), self.palette.block_fill);

            match &block.content {
                BlockContent::Text {
                    text,
                    font_size,
                    color,
                } => {
                    // The edit overlay is the only visible copy while
                    // this block is being edited.
                    if ctx.editing_block == Some(id) {
                        continue;
                    }
                    let interior = rect.inset(-TEXT_PADDING);
                    let lines = wrap_text(text, interior.width(), *font_size);
                    self.scene.nodes.push(SceneNode::Text {
                        lines,
                        origin: interior.origin(),
                        font_size: *font_size,
                        color: (*color).into(),
                    });
                }
                BlockContent::Image { source, .. } => {
                    let status = match ctx.resolver {
                        Some(resolver) => resolver.status(source),
                        None => default_status(source),
                    };
                    match status {
                        ImageStatus::Ready => {
                            self.scene.nodes.push(SceneNode::Image { block: id, rect });
                        }
                        ImageStatus::Loading | ImageStatus::Failed => {
                            self.scene.fill(rect.to_path(0.1), self.palette.placeholder);
                            self.scene.nodes.push(SceneNode::Placeholder { rect, status });
                        }
                    }
                }
            }
        }
    }

    /// Borders and corner handles for the selection, on top of content.
    /// Sizes divide by the camera scale to stay constant on screen.
    fn selection_chrome(&mut self, store: &EntityStore) {
        for id in store.selection_ordered() {
            let Some(block) = store.block(id) else { continue };
            let rect = block.rect();
            if rect.intersect(self.visible).is_zero_area() {
                continue;
            }
            self.scene
                .stroke(rect.to_path(0.1), self.palette.selection, 1.0 / self.scale);

            // Locked blocks show no resize affordance.
            if block.locked {
                continue;
            }
            let side = HANDLE_SIZE / self.scale;
            for handle in corner_handles(rect) {
                let square = Rect::from_center_size(handle.position, Size::new(side, side));
                self.scene.fill(square.to_path(0.1), self.palette.handle_fill);
                self.scene
                    .stroke(square.to_path(0.1), self.palette.selection, 1.0 / self.scale);
            }
        }
    }

    /// Screen-space hit regions, rear to front, for DOM-style hosts.
    fn hit_regions(&mut self, store: &EntityStore) {
        let transform = self.scene.transform;
        for id in store.blocks_in_rect(self.visible) {
            let Some(block) = store.block(id) else { continue };
            self.scene.hit_regions.push(HitRegion {
                rect: transform.transform_rect_bbox(block.rect()),
                target: HitTarget::Block(id),
            });
        }
        for id in store.selection_ordered() {
            let Some(block) = store.block(id) else { continue };
            if block.locked {
                continue;
            }
            for handle in corner_handles(block.rect()) {
                let center = transform * handle.position;
                self.scene.hit_regions.push(HitRegion {
                    rect: Rect::from_center_size(center, Size::new(HANDLE_SIZE, HANDLE_SIZE)),
                    target: HitTarget::Handle {
                        block: id,
                        corner: handle.corner,
                    },
                });
            }
        }
    }
}
