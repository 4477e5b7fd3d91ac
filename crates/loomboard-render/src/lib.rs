//! Loomboard Render Library
//!
//! Turns a core snapshot (store + camera) into a backend-agnostic display
//! list each frame. Hosts submit the [`Scene`] to whatever paints for them
//! and position their native text input with [`overlay::overlay_for`].

pub mod images;
pub mod overlay;
pub mod renderer;
pub mod scene;
pub mod text;

pub use images::{ImageResolver, ImageStatus};
pub use overlay::EditOverlay;
pub use renderer::{GridStyle, RenderContext, SceneError, SceneResult, build_scene};
pub use scene::{HitRegion, HitTarget, Palette, Scene, SceneNode};
