//! Image readiness at the render boundary.
//!
//! Decoding and pixel upload are host concerns. The scene builder only
//! needs to know whether a block's image is drawable yet, so it asks an
//! [`ImageResolver`] the host implements over its own cache.

use loomboard_core::block::ImageSource;

/// Lifecycle of an image asset as the host resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    /// Not decoded/fetched yet; draw the loading placeholder.
    Loading,
    /// Pixels are available; draw the image.
    Ready,
    /// Decode or fetch failed; draw the failure placeholder.
    Failed,
}

/// Host-side lookup from an image source to its readiness.
pub trait ImageResolver {
    fn status(&self, source: &ImageSource) -> ImageStatus;
}

/// Fallback policy when the host supplies no resolver: inline payloads are
/// self-contained and count as ready, URL references stay loading until a
/// real resolver says otherwise.
pub fn default_status(source: &ImageSource) -> ImageStatus {
    match source {
        ImageSource::Inline { .. } => ImageStatus::Ready,
        ImageSource::Url(_) => ImageStatus::Loading,
    }
}
