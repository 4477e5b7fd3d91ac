//! The pointer-driven interaction state machine.
//!
//! Consumes raw pointer/keyboard events plus explicit store and camera
//! handles, and drives every gesture: select, drag, resize, connect, pan,
//! and in-place text editing. One gesture is active at a time; a gesture is
//! fully synchronous from pointer-down to its terminating up, up-outside, or
//! cancel. No error escapes an event handler: failed mutations are logged
//! and the machine returns to idle.

use crate::block::{BlockContent, BlockCreateRequest, BlockId, BlockPatch};
use crate::block::{MIN_BLOCK_HEIGHT, MIN_BLOCK_WIDTH};
use crate::camera::Camera;
use crate::handles::{Corner, HANDLE_HIT_TOLERANCE, hit_test_handles, resize_from_corner};
use crate::input::{ClickKind, ClickTarget, ClickTracker, Modifiers, MouseButton};
use crate::session::CaptureSession;
use crate::store::EntityStore;
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// World-space distance a pressed pointer must travel before a press commits
/// to a drag instead of a click.
pub const DRAG_THRESHOLD: f64 = 5.0;

/// Per-pointer-session gesture state.
#[derive(Debug, Clone, Default)]
enum Gesture {
    /// No active gesture.
    #[default]
    Idle,
    /// Pointer down on a block; still a click until the threshold is
    /// crossed. `toggle` records the multi-select modifier at press time.
    Armed {
        block: BlockId,
        down_world: Point,
        toggle: bool,
    },
    /// Moving the selection. `origins` snapshots each block's position at
    /// drag commit; every move applies `world - down_world` on top of them.
    Dragging {
        down_world: Point,
        primary: BlockId,
        origins: HashMap<BlockId, Point>,
    },
    /// Resizing from a corner handle with the opposite corner fixed.
    Resizing {
        block: BlockId,
        corner: Corner,
        down_world: Point,
        origin: Rect,
    },
    /// Panning the camera by screen-space deltas.
    Panning { last_screen: Point },
    /// Pointer down on empty canvas; still a click until moved.
    CanvasPress { down_world: Point, moved: bool },
    /// Pointer held after arming, committing, or cancelling a connection.
    /// Dragging is suppressed for the remainder of the press.
    ConnectPress,
}

/// An in-place text editing session with its rollback snapshot.
#[derive(Debug, Clone)]
struct EditSession {
    block: BlockId,
    original: String,
}

/// The interaction state machine. Owns only transient gesture state; the
/// store stays the single authoritative copy of every block.
#[derive(Debug, Default)]
pub struct Interaction {
    gesture: Gesture,
    /// Source block of a pending connection, surviving between the arming
    /// click and the committing click.
    connect_source: Option<BlockId>,
    editing: Option<EditSession>,
    clicks: ClickTracker,
    capture: CaptureSession,
    pan_mode: bool,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------

    /// Handle a pointer-down in screen coordinates.
    pub fn pointer_down(
        &mut self,
        store: &mut EntityStore,
        camera: &Camera,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    ) {
        if !matches!(self.gesture, Gesture::Idle) {
            log::trace!("pointer down ignored, a gesture is already active");
            return;
        }

        // Any press that reaches the machine is outside the edit overlay,
        // which counts as losing focus: commit, then handle the press.
        if self.editing.is_some() {
            self.commit_editing(store);
        }

        let world = camera.to_world(position);

        if button == MouseButton::Right {
            return;
        }
        if button == MouseButton::Middle || self.pan_mode {
            self.start_gesture(Gesture::Panning {
                last_screen: position,
            });
            return;
        }

        // Corner handles of selected blocks take priority over block bodies.
        let tolerance = HANDLE_HIT_TOLERANCE / camera.scale;
        for id in store.selection_ordered().into_iter().rev() {
            let Some(block) = store.block(id) else { continue };
            if block.locked {
                continue;
            }
            if let Some(corner) = hit_test_handles(block.rect(), world, tolerance) {
                self.start_gesture(Gesture::Resizing {
                    block: id,
                    corner,
                    down_world: world,
                    origin: block.rect(),
                });
                return;
            }
        }

        match store.block_at_point(world).map(|block| block.id) {
            Some(id) => {
                // A pending connection resolves on the next block press,
                // whether or not the modifier is still held.
                if let Some(source) = self.connect_source.take() {
                    if source == id {
                        log::debug!("connection cancelled on its source block");
                    } else if store.create_connection(source, id).is_some() {
                        log::debug!("connected {} to {}", source, id);
                    }
                    self.start_gesture(Gesture::ConnectPress);
                    return;
                }
                if modifiers.connect() {
                    self.connect_source = Some(id);
                    log::debug!("connection armed from {}", id);
                    self.start_gesture(Gesture::ConnectPress);
                    return;
                }
                self.start_gesture(Gesture::Armed {
                    block: id,
                    down_world: world,
                    toggle: modifiers.toggle_select(),
                });
            }
            None => {
                if self.connect_source.take().is_some() {
                    log::debug!("connection cancelled on background press");
                }
                if !modifiers.toggle_select() {
                    store.deselect_all();
                }
                self.start_gesture(Gesture::CanvasPress {
                    down_world: world,
                    moved: false,
                });
            }
        }
    }

    /// Handle a pointer-move in screen coordinates. Delivered globally once
    /// a gesture holds capture, so fast motion cannot escape the gesture.
    pub fn pointer_move(
        &mut self,
        store: &mut EntityStore,
        camera: &mut Camera,
        position: Point,
    ) {
        let world = camera.to_world(position);
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        self.gesture = match gesture {
            Gesture::Armed {
                block,
                down_world,
                toggle,
            } => {
                if (world - down_world).hypot() <= DRAG_THRESHOLD {
                    Gesture::Armed {
                        block,
                        down_world,
                        toggle,
                    }
                } else {
                    match store.block(block) {
                        None => {
                            log::warn!("armed block {} vanished, gesture dropped", block);
                            self.capture.end();
                            Gesture::Idle
                        }
                        Some(armed) if armed.locked => Gesture::Armed {
                            block,
                            down_world,
                            toggle,
                        },
                        Some(_) => {
                            if !store.is_selected(block) {
                                store.select(block, false);
                            }
                            let mut origins = HashMap::new();
                            for id in store.selection_ordered() {
                                if let Some(peer) = store.block(id) {
                                    if !peer.locked {
                                        origins.insert(id, peer.position);
                                    }
                                }
                            }
                            // The committing move applies the full
                            // accumulated delta, not just the remainder
                            // past the threshold.
                            if apply_drag(store, &origins, down_world, world) {
                                Gesture::Dragging {
                                    down_world,
                                    primary: block,
                                    origins,
                                }
                            } else {
                                self.capture.end();
                                Gesture::Idle
                            }
                        }
                    }
                }
            }
            Gesture::Dragging {
                down_world,
                primary,
                origins,
            } => {
                if apply_drag(store, &origins, down_world, world) {
                    Gesture::Dragging {
                        down_world,
                        primary,
                        origins,
                    }
                } else {
                    self.capture.end();
                    Gesture::Idle
                }
            }
            Gesture::Resizing {
                block,
                corner,
                down_world,
                origin,
            } => {
                let rect = resize_from_corner(
                    origin,
                    corner,
                    world - down_world,
                    MIN_BLOCK_WIDTH,
                    MIN_BLOCK_HEIGHT,
                );
                match store.update_block(block, BlockPatch::rect(rect)) {
                    Ok(()) => Gesture::Resizing {
                        block,
                        corner,
                        down_world,
                        origin,
                    },
                    Err(err) => {
                        log::warn!("resize update dropped: {}", err);
                        self.capture.end();
                        Gesture::Idle
                    }
                }
            }
            Gesture::Panning { last_screen } => {
                camera.pan(position - last_screen);
                Gesture::Panning {
                    last_screen: position,
                }
            }
            Gesture::CanvasPress { down_world, moved } => Gesture::CanvasPress {
                down_world,
                moved: moved || (world - down_world).hypot() > DRAG_THRESHOLD,
            },
            idle @ (Gesture::Idle | Gesture::ConnectPress) => idle,
        };
    }

    /// Handle the terminating pointer-up of a gesture. `now_ms` is the
    /// host's monotonic timestamp, used for double-click classification.
    pub fn pointer_up(&mut self, store: &mut EntityStore, now_ms: f64) {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Idle => {}
            Gesture::Armed { block, toggle, .. } => {
                match self.clicks.click(ClickTarget::Block(block), now_ms) {
                    ClickKind::Double => {
                        let editable = store
                            .block(block)
                            .is_some_and(|b| b.content.is_text() && !b.locked);
                        if editable {
                            self.begin_editing(store, block);
                        } else {
                            store.select(block, false);
                        }
                    }
                    ClickKind::Single => store.select(block, toggle),
                }
            }
            Gesture::Dragging { primary, .. } => {
                store.bring_to_front(primary);
            }
            Gesture::CanvasPress { down_world, moved } => {
                if !moved && self.clicks.click(ClickTarget::Canvas, now_ms) == ClickKind::Double {
                    self.create_text_block(store, down_world);
                }
            }
            Gesture::Resizing { .. } | Gesture::Panning { .. } | Gesture::ConnectPress => {}
        }
        self.capture.end();
    }

    /// Handle a pointer-up outside the surface. The gesture ends with
    /// whatever partial mutation already happened; clicks never qualify.
    pub fn pointer_up_outside(&mut self, store: &mut EntityStore) {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        if let Gesture::Dragging { primary, .. } = gesture {
            store.bring_to_front(primary);
        }
        self.capture.end();
    }

    /// Forcibly cancel any active gesture (e.g. the host window lost
    /// focus). Equivalent to a pointer-up outside.
    pub fn cancel_gesture(&mut self, store: &mut EntityStore) {
        self.pointer_up_outside(store);
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Handle a key-down. Keys use host-style names: `"Enter"`,
    /// `"Escape"`, `"Delete"`, `"Backspace"`, `" "` for Space.
    pub fn key_down(&mut self, store: &mut EntityStore, key: &str, modifiers: Modifiers) {
        if self.editing.is_some() {
            match key {
                "Enter" if !modifiers.shift => self.commit_editing(store),
                "Escape" => self.cancel_editing(store),
                // Everything else belongs to the host's text input and
                // arrives through edit_text_changed.
                _ => {}
            }
            return;
        }

        match key {
            " " => self.pan_mode = true,
            "Delete" | "Backspace" => {
                for id in store.selection_ordered() {
                    store.delete_block(id);
                }
            }
            "Escape" => {
                if self.connect_source.take().is_some() {
                    log::debug!("connection cancelled via escape");
                }
            }
            _ => {}
        }
    }

    /// Handle a key-up.
    pub fn key_up(&mut self, key: &str) {
        if key == " " {
            self.pan_mode = false;
        }
    }

    // ------------------------------------------------------------------
    // Text editing
    // ------------------------------------------------------------------

    /// Enter edit mode on a text block, snapshotting its content for the
    /// escape rollback. No-op for images, locked blocks, or unknown ids.
    pub fn begin_editing(&mut self, store: &mut EntityStore, id: BlockId) {
        if self.editing.as_ref().is_some_and(|session| session.block == id) {
            return;
        }
        self.commit_editing(store);

        let Some(block) = store.block(id) else {
            log::warn!("edit requested for unknown block {}", id);
            return;
        };
        if block.locked {
            return;
        }
        let BlockContent::Text { text, .. } = &block.content else {
            return;
        };
        let original = text.clone();
        store.select(id, false);
        self.editing = Some(EditSession {
            block: id,
            original,
        });
        log::debug!("text edit begun on {}", id);
    }

    /// Mirror a keystroke from the host's edit overlay into the store, so
    /// the store and overlay never diverge.
    pub fn edit_text_changed(&mut self, store: &mut EntityStore, text: &str) {
        let Some(session) = &self.editing else { return };
        let block = session.block;
        if let Err(err) = store.update_block(block, BlockPatch::text(text)) {
            log::warn!("edit keystroke dropped: {}", err);
            self.editing = None;
        }
    }

    /// Commit the current text and leave edit mode. A block left with only
    /// whitespace is removed.
    pub fn commit_editing(&mut self, store: &mut EntityStore) {
        let Some(session) = self.editing.take() else { return };
        self.remove_if_blank(store, session.block);
    }

    /// Discard changes made since entering edit mode, restoring the
    /// snapshot, and leave edit mode.
    pub fn cancel_editing(&mut self, store: &mut EntityStore) {
        let Some(session) = self.editing.take() else { return };
        if let Err(err) = store.update_block(session.block, BlockPatch::text(session.original)) {
            log::warn!("edit rollback dropped: {}", err);
            return;
        }
        self.remove_if_blank(store, session.block);
    }

    fn remove_if_blank(&self, store: &mut EntityStore, id: BlockId) {
        let blank = store
            .block(id)
            .and_then(|block| block.content.as_text())
            .is_some_and(|text| text.trim().is_empty());
        if blank {
            store.delete_block(id);
            log::debug!("blank text block {} removed on exit", id);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether no pointer gesture is active.
    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// The block currently in text edit mode, if any.
    pub fn editing_block(&self) -> Option<BlockId> {
        self.editing.as_ref().map(|session| session.block)
    }

    /// The armed source of a pending connection, if any.
    pub fn connect_source(&self) -> Option<BlockId> {
        self.connect_source
    }

    /// Whether space-pan mode is currently held.
    pub fn pan_mode(&self) -> bool {
        self.pan_mode
    }

    /// Capture bookkeeping, mirrored by hosts into their global listener
    /// attachment.
    pub fn capture(&self) -> &CaptureSession {
        &self.capture
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn start_gesture(&mut self, gesture: Gesture) {
        self.capture.begin();
        self.gesture = gesture;
    }

    fn create_text_block(&mut self, store: &mut EntityStore, center: Point) {
        match store.create_block(BlockCreateRequest::default_text_at(center)) {
            Ok(id) => {
                store.select(id, false);
                self.begin_editing(store, id);
            }
            Err(err) => log::warn!("text block creation dropped: {}", err),
        }
    }
}

/// Move every snapshotted block by `world - down_world`. Returns false when
/// a target disappeared mid-gesture, which drops the gesture.
fn apply_drag(
    store: &mut EntityStore,
    origins: &HashMap<BlockId, Point>,
    down_world: Point,
    world: Point,
) -> bool {
    let delta = world - down_world;
    for (&id, &origin) in origins {
        if let Err(err) = store.move_block(id, origin.x + delta.x, origin.y + delta.y) {
            log::warn!("drag update dropped: {}", err);
            return false;
        }
    }
    true
}
