//! The entity store: single source of truth for blocks and connections.
//!
//! All mutation goes through the operations here; each is atomic and runs on
//! the single UI thread, so readers never observe partial application and no
//! locking is needed.

use crate::block::{Block, BlockCreateRequest, BlockId, BlockPatch, clamp_size};
use crate::connection::{Connection, ConnectionId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Store mutation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid block size {width}x{height}: dimensions must be positive")]
    Validation { width: f64, height: f64 },
    #[error("no block with id {0}")]
    NotFound(BlockId),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Owns the authoritative set of blocks and connections plus the transient
/// selection. The interaction layer never holds a second authoritative copy,
/// only per-gesture deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    /// All blocks, keyed by id.
    blocks: HashMap<BlockId, Block>,
    /// Render order, back to front.
    z_order: Vec<BlockId>,
    /// All connections.
    connections: Vec<Connection>,
    /// Selected block ids. Transient UI state, not part of the document.
    #[serde(skip)]
    selection: HashSet<BlockId>,
    /// Bumped by every successful mutation so hosts can skip redundant
    /// scene rebuilds.
    #[serde(skip)]
    revision: u64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            z_order: Vec::new(),
            connections: Vec::new(),
            selection: HashSet::new(),
            revision: 0,
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Current mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ------------------------------------------------------------------
    // Block operations
    // ------------------------------------------------------------------

    /// Create a block. Non-positive size components are a validation error;
    /// positive-but-small sizes clamp up to the block minimums.
    pub fn create_block(&mut self, request: BlockCreateRequest) -> StoreResult<BlockId> {
        if request.size.width <= 0.0 || request.size.height <= 0.0 {
            return Err(StoreError::Validation {
                width: request.size.width,
                height: request.size.height,
            });
        }

        let block = Block::new(request.position, request.size, request.content);
        let id = block.id;
        self.blocks.insert(id, block);
        self.z_order.push(id);
        self.touch();
        Ok(id)
    }

    /// Merge the provided fields of a patch into an existing block.
    pub fn update_block(&mut self, id: BlockId, patch: BlockPatch) -> StoreResult<()> {
        let block = self.blocks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        block.apply_patch(patch);
        self.touch();
        Ok(())
    }

    /// Delete a block, cascading to every connection that references it and
    /// removing its id from the selection, all in the same mutation.
    /// Deleting an absent id is a no-op.
    pub fn delete_block(&mut self, id: BlockId) -> Option<Block> {
        let block = self.blocks.remove(&id)?;
        self.z_order.retain(|other| *other != id);
        self.connections.retain(|conn| !conn.touches(id));
        self.selection.remove(&id);
        self.touch();
        Some(block)
    }

    /// Move a block to an absolute world position.
    pub fn move_block(&mut self, id: BlockId, x: f64, y: f64) -> StoreResult<()> {
        let block = self.blocks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        block.position = Point::new(x, y);
        self.touch();
        Ok(())
    }

    /// Resize a block, enforcing the minimum-size invariant.
    pub fn resize_block(&mut self, id: BlockId, width: f64, height: f64) -> StoreResult<()> {
        let block = self.blocks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        block.size = clamp_size(kurbo::Size::new(width, height));
        self.touch();
        Ok(())
    }

    /// Move a block to the top of the render order.
    pub fn bring_to_front(&mut self, id: BlockId) {
        if let Some(index) = self.z_order.iter().position(|other| *other == id) {
            let id = self.z_order.remove(index);
            self.z_order.push(id);
            self.touch();
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select a block. Non-additive replaces the selection with `{id}`;
    /// additive toggles the id's membership. Unknown ids are ignored.
    pub fn select(&mut self, id: BlockId, additive: bool) {
        if !self.blocks.contains_key(&id) {
            return;
        }
        if additive {
            if !self.selection.remove(&id) {
                self.selection.insert(id);
            }
        } else {
            self.selection.clear();
            self.selection.insert(id);
        }
        self.touch();
    }

    /// Clear the selection.
    pub fn deselect_all(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.touch();
        }
    }

    pub fn is_selected(&self, id: BlockId) -> bool {
        self.selection.contains(&id)
    }

    pub fn selection(&self) -> &HashSet<BlockId> {
        &self.selection
    }

    /// Selected ids in render order, back to front.
    pub fn selection_ordered(&self) -> Vec<BlockId> {
        self.z_order
            .iter()
            .copied()
            .filter(|id| self.selection.contains(id))
            .collect()
    }

    // ------------------------------------------------------------------
    // Connection operations
    // ------------------------------------------------------------------

    /// Create a connection between two blocks. Self-links, unknown
    /// endpoints, and duplicate unordered pairs are all no-ops.
    pub fn create_connection(&mut self, a: BlockId, b: BlockId) -> Option<ConnectionId> {
        if !self.blocks.contains_key(&a) || !self.blocks.contains_key(&b) {
            return None;
        }
        if self.connections.iter().any(|conn| conn.links(a, b)) {
            return None;
        }
        let connection = Connection::new(a, b)?;
        let id = connection.id;
        self.connections.push(connection);
        self.touch();
        Some(id)
    }

    /// Delete a connection. Absent ids are a no-op.
    pub fn delete_connection(&mut self, id: ConnectionId) {
        let before = self.connections.len();
        self.connections.retain(|conn| conn.id != id);
        if self.connections.len() != before {
            self.touch();
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn contains_block(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in render order, back to front.
    pub fn blocks_ordered(&self) -> impl Iterator<Item = &Block> {
        self.z_order.iter().filter_map(|id| self.blocks.get(id))
    }

    /// The front-most visible block containing the given world point.
    pub fn block_at_point(&self, point: Point) -> Option<&Block> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| self.blocks.get(id))
            .find(|block| block.visible && block.contains(point))
    }

    /// Ids of visible blocks intersecting the given world rect, in render
    /// order.
    pub fn blocks_in_rect(&self, rect: Rect) -> Vec<BlockId> {
        self.z_order
            .iter()
            .filter_map(|id| self.blocks.get(id))
            .filter(|block| block.visible && !block.rect().intersect(rect).is_zero_area())
            .map(|block| block.id)
            .collect()
    }

    /// Union of all visible block rects, if any.
    pub fn content_bounds(&self) -> Option<Rect> {
        let mut rects = self
            .blocks
            .values()
            .filter(|block| block.visible)
            .map(Block::rect);
        let first = rects.next()?;
        Some(rects.fold(first, |acc, rect| acc.union(rect)))
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Serialize the document (blocks, order, connections) to JSON. The
    /// selection and revision counter are transient and excluded.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockContent, MIN_BLOCK_HEIGHT, MIN_BLOCK_WIDTH};
    use kurbo::Size;

    fn text_request(x: f64, y: f64) -> BlockCreateRequest {
        BlockCreateRequest {
            position: Point::new(x, y),
            size: Size::new(100.0, 100.0),
            content: BlockContent::text("test"),
        }
    }

    #[test]
    fn test_create_block_clamps_small_sizes() {
        let mut store = EntityStore::new();
        let id = store
            .create_block(BlockCreateRequest {
                position: Point::ZERO,
                size: Size::new(5.0, 7.0),
                content: BlockContent::text(""),
            })
            .unwrap();

        let block = store.block(id).unwrap();
        assert!((block.size.width - MIN_BLOCK_WIDTH).abs() < f64::EPSILON);
        assert!((block.size.height - MIN_BLOCK_HEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_create_block_rejects_non_positive_size() {
        let mut store = EntityStore::new();
        let result = store.create_block(BlockCreateRequest {
            position: Point::ZERO,
            size: Size::new(0.0, 100.0),
            content: BlockContent::text(""),
        });
        assert!(matches!(result, Err(StoreError::Validation { .. })));

        let result = store.create_block(BlockCreateRequest {
            position: Point::ZERO,
            size: Size::new(100.0, -3.0),
            content: BlockContent::text(""),
        });
        assert!(matches!(result, Err(StoreError::Validation { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_block_unknown_id() {
        let mut store = EntityStore::new();
        let result = store.update_block(uuid::Uuid::new_v4(), BlockPatch::default());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_resize_enforces_minimum() {
        let mut store = EntityStore::new();
        let id = store.create_block(text_request(0.0, 0.0)).unwrap();

        store.resize_block(id, 1.0, 400.0).unwrap();
        let block = store.block(id).unwrap();
        assert!((block.size.width - MIN_BLOCK_WIDTH).abs() < f64::EPSILON);
        assert!((block.size.height - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_cascades_connections_and_selection() {
        let mut store = EntityStore::new();
        let a = store.create_block(text_request(0.0, 0.0)).unwrap();
        let b = store.create_block(text_request(200.0, 0.0)).unwrap();
        let c = store.create_block(text_request(400.0, 0.0)).unwrap();

        store.create_connection(a, b).unwrap();
        store.create_connection(b, c).unwrap();
        store.select(b, false);

        store.delete_block(b);

        assert!(store.block(b).is_none());
        assert!(store.connections().is_empty());
        assert!(!store.is_selected(b));
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = EntityStore::new();
        let id = store.create_block(text_request(0.0, 0.0)).unwrap();

        assert!(store.delete_block(id).is_some());
        assert!(store.delete_block(id).is_none());
        assert!(store.delete_block(uuid::Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_select_replaces_and_toggles() {
        let mut store = EntityStore::new();
        let a = store.create_block(text_request(0.0, 0.0)).unwrap();
        let b = store.create_block(text_request(200.0, 0.0)).unwrap();

        store.select(a, false);
        assert!(store.is_selected(a));

        store.select(b, false);
        assert!(!store.is_selected(a));
        assert!(store.is_selected(b));

        store.select(a, true);
        assert!(store.is_selected(a));
        assert!(store.is_selected(b));

        store.select(b, true);
        assert!(!store.is_selected(b));

        store.deselect_all();
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_select_unknown_id_is_ignored() {
        let mut store = EntityStore::new();
        store.select(uuid::Uuid::new_v4(), false);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn test_connection_dedupe_unordered() {
        let mut store = EntityStore::new();
        let a = store.create_block(text_request(0.0, 0.0)).unwrap();
        let b = store.create_block(text_request(200.0, 0.0)).unwrap();

        assert!(store.create_connection(a, b).is_some());
        assert!(store.create_connection(b, a).is_none());
        assert_eq!(store.connections().len(), 1);
    }

    #[test]
    fn test_connection_self_link_is_noop() {
        let mut store = EntityStore::new();
        let a = store.create_block(text_request(0.0, 0.0)).unwrap();
        assert!(store.create_connection(a, a).is_none());
        assert!(store.connections().is_empty());
    }

    #[test]
    fn test_connection_requires_live_endpoints() {
        let mut store = EntityStore::new();
        let a = store.create_block(text_request(0.0, 0.0)).unwrap();
        assert!(store.create_connection(a, uuid::Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_delete_connection_idempotent() {
        let mut store = EntityStore::new();
        let a = store.create_block(text_request(0.0, 0.0)).unwrap();
        let b = store.create_block(text_request(200.0, 0.0)).unwrap();
        let conn = store.create_connection(a, b).unwrap();

        store.delete_connection(conn);
        assert!(store.connections().is_empty());
        store.delete_connection(conn);
        assert!(store.connections().is_empty());
    }

    #[test]
    fn test_block_at_point_prefers_front_most() {
        let mut store = EntityStore::new();
        let back = store.create_block(text_request(0.0, 0.0)).unwrap();
        let front = store.create_block(text_request(50.0, 50.0)).unwrap();

        // Overlap region
        let hit = store.block_at_point(Point::new(75.0, 75.0)).unwrap();
        assert_eq!(hit.id, front);

        store.bring_to_front(back);
        let hit = store.block_at_point(Point::new(75.0, 75.0)).unwrap();
        assert_eq!(hit.id, back);
    }

    #[test]
    fn test_block_at_point_skips_invisible() {
        let mut store = EntityStore::new();
        let id = store.create_block(text_request(0.0, 0.0)).unwrap();
        store
            .update_block(
                id,
                BlockPatch {
                    visible: Some(false),
                    ..BlockPatch::default()
                },
            )
            .unwrap();

        assert!(store.block_at_point(Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_blocks_in_rect() {
        let mut store = EntityStore::new();
        let a = store.create_block(text_request(0.0, 0.0)).unwrap();
        let _far = store.create_block(text_request(1000.0, 1000.0)).unwrap();

        let hits = store.blocks_in_rect(Rect::new(-10.0, -10.0, 150.0, 150.0));
        assert_eq!(hits, vec![a]);
    }

    #[test]
    fn test_content_bounds() {
        let mut store = EntityStore::new();
        assert!(store.content_bounds().is_none());

        store.create_block(text_request(0.0, 0.0)).unwrap();
        store.create_block(text_request(300.0, 400.0)).unwrap();

        let bounds = store.content_bounds().unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 400.0, 500.0));
    }

    #[test]
    fn test_json_roundtrip_drops_selection() {
        let mut store = EntityStore::new();
        let a = store.create_block(text_request(0.0, 0.0)).unwrap();
        let b = store.create_block(text_request(200.0, 0.0)).unwrap();
        store.create_connection(a, b).unwrap();
        store.select(a, false);

        let json = store.to_json().unwrap();
        let restored = EntityStore::from_json(&json).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.connections().len(), 1);
        assert!(restored.selection().is_empty());
        assert_eq!(
            restored.block(a).unwrap().content.as_text(),
            Some("test")
        );
    }

    #[test]
    fn test_revision_bumps_on_mutation() {
        let mut store = EntityStore::new();
        let before = store.revision();
        let id = store.create_block(text_request(0.0, 0.0)).unwrap();
        assert!(store.revision() > before);

        let before = store.revision();
        store.move_block(id, 5.0, 5.0).unwrap();
        assert!(store.revision() > before);

        // Failed mutations leave the revision untouched
        let before = store.revision();
        assert!(store.move_block(uuid::Uuid::new_v4(), 0.0, 0.0).is_err());
        assert_eq!(store.revision(), before);
    }
}
