//! The embedding surface: one value owning the store, camera, and
//! interaction machine, with flat event-forwarding methods so hosts never
//! juggle the borrow order themselves.

use crate::block::{BlockCreateRequest, BlockId};
use crate::camera::Camera;
use crate::input::{Modifiers, MouseButton};
use crate::interaction::Interaction;
use crate::store::{EntityStore, StoreResult};
use kurbo::{Point, Rect, Size};

const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// An interactive canvas: entities, view transform, and gesture state.
///
/// Hosts feed pointer, wheel, keyboard, and paste-derived events in and
/// read the store and camera back out each frame.
#[derive(Debug, Default)]
pub struct Workspace {
    pub store: EntityStore,
    pub camera: Camera,
    pub interaction: Interaction,
    viewport: Size,
}

impl Workspace {
    /// An empty workspace. The viewport starts at zero; hosts call
    /// [`set_viewport`](Self::set_viewport) on every surface resize.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, position: Point, button: MouseButton, modifiers: Modifiers) {
        self.interaction
            .pointer_down(&mut self.store, &self.camera, position, button, modifiers);
    }

    pub fn pointer_move(&mut self, position: Point) {
        self.interaction
            .pointer_move(&mut self.store, &mut self.camera, position);
    }

    pub fn pointer_up(&mut self, now_ms: f64) {
        self.interaction.pointer_up(&mut self.store, now_ms);
    }

    pub fn pointer_up_outside(&mut self) {
        self.interaction.pointer_up_outside(&mut self.store);
    }

    /// Wheel input zooms about the cursor, one discrete step per event.
    pub fn wheel(&mut self, position: Point, delta_y: f64) {
        if delta_y == 0.0 {
            return;
        }
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        };
        self.camera.zoom_about(position, factor);
    }

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) {
        self.interaction.key_down(&mut self.store, key, modifiers);
    }

    pub fn key_up(&mut self, key: &str) {
        self.interaction.key_up(key);
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a block from a prepared request (the paste path) and make it
    /// the sole selection.
    pub fn apply(&mut self, request: BlockCreateRequest) -> StoreResult<BlockId> {
        let id = self.store.create_block(request)?;
        self.store.select(id, false);
        log::debug!("block {} inserted", id);
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Editing forwards
    // ------------------------------------------------------------------

    pub fn begin_editing(&mut self, id: BlockId) {
        self.interaction.begin_editing(&mut self.store, id);
    }

    pub fn edit_text_changed(&mut self, text: &str) {
        self.interaction.edit_text_changed(&mut self.store, text);
    }

    pub fn commit_editing(&mut self) {
        self.interaction.commit_editing(&mut self.store);
    }

    pub fn cancel_editing(&mut self) {
        self.interaction.cancel_editing(&mut self.store);
    }

    pub fn editing_block(&self) -> Option<BlockId> {
        self.interaction.editing_block()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// The world point under the viewport center, where pasted blocks land.
    pub fn viewport_center_world(&self) -> Point {
        self.camera.to_world(Point::new(
            self.viewport.width / 2.0,
            self.viewport.height / 2.0,
        ))
    }

    pub fn visible_world_rect(&self) -> Rect {
        self.camera.visible_world_rect(self.viewport)
    }

    /// Whether the host should keep global pointer listeners attached.
    pub fn wants_capture(&self) -> bool {
        self.interaction.capture().is_attached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockContent;

    fn workspace_with_block() -> (Workspace, BlockId) {
        let mut ws = Workspace::with_viewport(Size::new(800.0, 600.0));
        let id = ws
            .store
            .create_block(BlockCreateRequest {
                position: Point::new(0.0, 0.0),
                size: Size::new(100.0, 100.0),
                content: BlockContent::text("hi"),
            })
            .unwrap();
        (ws, id)
    }

    #[test]
    fn test_wheel_zooms_about_cursor() {
        let mut ws = Workspace::with_viewport(Size::new(800.0, 600.0));
        let cursor = Point::new(200.0, 150.0);
        let anchored = ws.camera.to_world(cursor);

        ws.wheel(cursor, 120.0);
        assert!(ws.camera.scale > 1.0);
        let after = ws.camera.to_world(cursor);
        assert!((after - anchored).hypot() < 1e-10);

        ws.wheel(cursor, -120.0);
        ws.wheel(cursor, -120.0);
        assert!(ws.camera.scale < 1.0);
    }

    #[test]
    fn test_viewport_center_world_tracks_camera() {
        let mut ws = Workspace::with_viewport(Size::new(800.0, 600.0));
        assert_eq!(ws.viewport_center_world(), Point::new(400.0, 300.0));

        ws.camera.offset = kurbo::Vec2::new(-100.0, 40.0);
        ws.camera.scale = 2.0;
        assert_eq!(ws.viewport_center_world(), Point::new(250.0, 130.0));
    }

    #[test]
    fn test_apply_selects_new_block_solely() {
        let (mut ws, existing) = workspace_with_block();
        ws.store.select(existing, false);

        let id = ws
            .apply(BlockCreateRequest::default_text_at(Point::new(
                500.0, 500.0,
            )))
            .unwrap();
        assert!(ws.store.is_selected(id));
        assert!(!ws.store.is_selected(existing));
    }

    #[test]
    fn test_events_flow_through_facade() {
        let (mut ws, id) = workspace_with_block();

        ws.pointer_down(Point::new(50.0, 50.0), MouseButton::Left, Modifiers::default());
        assert!(ws.wants_capture());
        ws.pointer_move(Point::new(75.0, 50.0));
        ws.pointer_up(1000.0);

        assert!(!ws.wants_capture());
        assert_eq!(ws.store.block(id).unwrap().position, Point::new(25.0, 0.0));
    }

    #[test]
    fn test_editing_forwards() {
        let (mut ws, id) = workspace_with_block();

        ws.begin_editing(id);
        assert_eq!(ws.editing_block(), Some(id));
        ws.edit_text_changed("typed");
        ws.commit_editing();

        assert_eq!(ws.editing_block(), None);
        assert_eq!(ws.store.block(id).unwrap().content.as_text(), Some("typed"));
    }
}
