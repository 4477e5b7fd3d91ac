//! Loomboard Clipboard Library
//!
//! Classifies host clipboard payloads and converts them into the block
//! creation requests the core store consumes. The core never touches
//! clipboard APIs; hosts hand the raw payload here and pass the resulting
//! request to the workspace.

use kurbo::{Point, Size};
use loomboard_core::block::{
    BlockContent, BlockCreateRequest, DEFAULT_FONT_SIZE, ImageFormat, ImageSource, clamp_size,
    estimate_text_size,
};
use thiserror::Error;

pub mod html;

/// Longest edge a pasted image block starts with, world units. Users can
/// resize afterwards; this keeps a wallpaper-sized paste from swallowing
/// the viewport.
pub const MAX_PASTE_EDGE: f64 = 480.0;

/// Block size for URL-referenced images until the host resolves them.
const DEFAULT_URL_IMAGE_SIZE: Size = Size::new(320.0, 240.0);

/// Interior padding added around pasted text before clamping.
const TEXT_PASTE_PADDING: f64 = 16.0;

/// Paste failures.
#[derive(Debug, Error)]
pub enum PasteError {
    #[error("clipboard image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
    #[error("clipboard payload is empty")]
    Empty,
}

/// A clipboard payload as the host hands it over. Browsers typically fill
/// several of these at once for a single user paste.
#[derive(Debug, Clone, Copy, Default)]
pub struct PastePayload<'a> {
    pub image_bytes: Option<&'a [u8]>,
    pub html: Option<&'a str>,
    pub text: Option<&'a str>,
}

/// Convert a payload into exactly one block-creation request centered on
/// `center`, in priority order: raw image bytes, then an HTML `<img>`
/// reference, then plain text.
///
/// HTML without an image falls through to the text representation, which
/// matches what users expect from copying mixed content in a browser.
pub fn to_block_request(
    payload: &PastePayload<'_>,
    center: Point,
) -> Result<BlockCreateRequest, PasteError> {
    if let Some(bytes) = payload.image_bytes {
        return on_image_payload(bytes, center);
    }
    if let Some(html) = payload.html {
        if let Some(request) = on_html_payload(html, center) {
            return Ok(request);
        }
    }
    if let Some(text) = payload.text {
        if !text.is_empty() {
            return Ok(on_text_payload(text, center));
        }
    }
    Err(PasteError::Empty)
}

/// Build an image block from raw clipboard bytes.
///
/// The bytes are decoded once to probe dimensions and reject garbage; the
/// block then stores the original payload inline with its sniffed format.
pub fn on_image_payload(bytes: &[u8], center: Point) -> Result<BlockCreateRequest, PasteError> {
    let decoded = image::load_from_memory(bytes)?;
    let natural = Size::new(f64::from(decoded.width()), f64::from(decoded.height()));
    let size = fit_size(natural);
    let format = ImageFormat::from_magic_bytes(bytes).unwrap_or(ImageFormat::Png);
    log::info!(
        "Pasted image from clipboard: {}x{}",
        decoded.width(),
        decoded.height()
    );

    Ok(BlockCreateRequest {
        position: center - size.to_vec2() / 2.0,
        size,
        content: BlockContent::Image {
            source: ImageSource::from_bytes(format, bytes),
            natural_size: natural,
        },
    })
}

/// Build an image block referencing the first `<img src>` in pasted HTML,
/// or `None` when the fragment has no image.
pub fn on_html_payload(html: &str, center: Point) -> Option<BlockCreateRequest> {
    let src = html::first_img_src(html)?;
    log::info!("Pasted image reference from clipboard HTML");

    Some(BlockCreateRequest {
        position: center - DEFAULT_URL_IMAGE_SIZE.to_vec2() / 2.0,
        size: DEFAULT_URL_IMAGE_SIZE,
        content: BlockContent::Image {
            source: ImageSource::Url(src),
            // Unknown until the host fetches the asset; the renderer shows
            // a loading placeholder meanwhile.
            natural_size: Size::ZERO,
        },
    })
}

/// Build a text block sized by the core's content estimate.
pub fn on_text_payload(text: &str, center: Point) -> BlockCreateRequest {
    let estimate = estimate_text_size(text, DEFAULT_FONT_SIZE);
    let size = clamp_size(Size::new(
        estimate.width + TEXT_PASTE_PADDING,
        estimate.height + TEXT_PASTE_PADDING,
    ));

    BlockCreateRequest {
        position: center - size.to_vec2() / 2.0,
        size,
        content: BlockContent::text(text),
    }
}

/// Scale a natural image size down (never up) so its longest edge fits
/// within [`MAX_PASTE_EDGE`], preserving aspect ratio.
fn fit_size(natural: Size) -> Size {
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return clamp_size(Size::ZERO);
    }
    let scale = (MAX_PASTE_EDGE / natural.width)
        .min(MAX_PASTE_EDGE / natural.height)
        .min(1.0);
    clamp_size(natural * scale)
}
