//! Connections: undirected visual links between two blocks.

use crate::block::BlockId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connection.
pub type ConnectionId = Uuid;

/// Curve style for a connection. Gestures only ever produce `Curved`;
/// `Straight` is reserved for programmatic callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveStyle {
    #[default]
    Curved,
    Straight,
}

/// An undirected link between two distinct blocks.
///
/// Endpoints are stored as a canonical pair (smaller id first) so that the
/// same unordered pair always compares equal regardless of creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    a: BlockId,
    b: BlockId,
    #[serde(default)]
    pub style: CurveStyle,
}

impl Connection {
    /// Create a connection between two blocks. Returns `None` for a
    /// self-link.
    pub fn new(a: BlockId, b: BlockId) -> Option<Self> {
        if a == b {
            return None;
        }
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        Some(Self {
            id: Uuid::new_v4(),
            a,
            b,
            style: CurveStyle::Curved,
        })
    }

    /// The canonical endpoint pair (smaller id first).
    pub fn endpoints(&self) -> (BlockId, BlockId) {
        (self.a, self.b)
    }

    /// Whether this connection references the given block.
    pub fn touches(&self, id: BlockId) -> bool {
        self.a == id || self.b == id
    }

    /// Whether this connection links the given unordered pair.
    pub fn links(&self, x: BlockId, y: BlockId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }
}
