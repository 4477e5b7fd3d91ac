//! Loomboard Core Library
//!
//! Platform-agnostic engine for the Loomboard infinite canvas: the block and
//! connection model, the screen/world coordinate transform, and the pointer
//! interaction state machine.

pub mod block;
pub mod camera;
pub mod connection;
pub mod handles;
pub mod input;
pub mod interaction;
pub mod session;
pub mod store;
pub mod workspace;

pub use block::{
    Block, BlockContent, BlockCreateRequest, BlockId, BlockPatch, ImageFormat, ImageSource, Rgba,
};
pub use camera::Camera;
pub use connection::{Connection, ConnectionId, CurveStyle};
pub use handles::Corner;
pub use input::{ClickKind, Modifiers, MouseButton, classify_click};
pub use interaction::Interaction;
pub use session::CaptureSession;
pub use store::{EntityStore, StoreError, StoreResult};
pub use workspace::Workspace;
