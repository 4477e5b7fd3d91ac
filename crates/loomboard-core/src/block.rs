//! Block model: the positioned, sized, typed content units on the canvas.

use kurbo::{Point, Rect, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a block.
pub type BlockId = Uuid;

/// Minimum block width in world units.
pub const MIN_BLOCK_WIDTH: f64 = 50.0;
/// Minimum block height in world units.
pub const MIN_BLOCK_HEIGHT: f64 = 50.0;

/// Default font size for text blocks.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Default size for a text block created by double-clicking the canvas.
pub const DEFAULT_TEXT_BLOCK_SIZE: Size = Size::new(200.0, 120.0);

/// Approximate glyph advance as a fraction of font size.
/// Real measurement happens in the rendering backend; this estimate is
/// good enough for sizing freshly created blocks.
pub const CHAR_WIDTH_FACTOR: f64 = 0.55;
/// Line height as a multiple of font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.3;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Default text color: near-black.
    pub fn text_default() -> Self {
        Self::new(24, 24, 27, 255)
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Supported image payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// MIME type string for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect the format from the payload's magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() >= 4 && data[0..4] == [0x89, 0x50, 0x4E, 0x47] {
            Some(ImageFormat::Png)
        } else if data.len() >= 3 && data[0..3] == [0xFF, 0xD8, 0xFF] {
            Some(ImageFormat::Jpeg)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else {
            None
        }
    }
}

/// Opaque handle to image pixel data. The core never decodes pixels; the
/// rendering backend (or host asset loader) resolves the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    /// Payload carried inline, base64-encoded.
    Inline {
        format: ImageFormat,
        data_base64: String,
    },
    /// Remote reference the host resolves asynchronously.
    Url(String),
}

impl ImageSource {
    /// Encode raw bytes as an inline source.
    pub fn from_bytes(format: ImageFormat, bytes: &[u8]) -> Self {
        use base64::{Engine, engine::general_purpose::STANDARD};
        ImageSource::Inline {
            format,
            data_base64: STANDARD.encode(bytes),
        }
    }

    /// Decode an inline payload back to raw bytes. `None` for URL sources
    /// or corrupt base64.
    pub fn decoded_bytes(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        match self {
            ImageSource::Inline { data_base64, .. } => STANDARD.decode(data_base64).ok(),
            ImageSource::Url(_) => None,
        }
    }
}

/// Content payload variants. Every consumer matches exhaustively; adding a
/// kind is a compile-visible change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockContent {
    Text {
        text: String,
        font_size: f64,
        color: Rgba,
    },
    Image {
        source: ImageSource,
        natural_size: Size,
    },
}

impl BlockContent {
    /// A text payload with default styling.
    pub fn text(text: impl Into<String>) -> Self {
        BlockContent::Text {
            text: text.into(),
            font_size: DEFAULT_FONT_SIZE,
            color: Rgba::text_default(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, BlockContent::Text { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, BlockContent::Image { .. })
    }

    /// The text payload, if this is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BlockContent::Text { text, .. } => Some(text),
            BlockContent::Image { .. } => None,
        }
    }
}

/// A positioned, sized, typed content unit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier, immutable after creation.
    pub id: BlockId,
    /// World-space top-left corner.
    pub position: Point,
    /// World-space size, never below the block minimums.
    pub size: Size,
    /// Content payload.
    pub content: BlockContent,
    /// Locked blocks ignore drag/resize/edit gestures.
    #[serde(default)]
    pub locked: bool,
    /// Invisible blocks are skipped by rendering and hit testing.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Block {
    /// Create a block with a fresh id. The size is clamped to the minimums.
    pub fn new(position: Point, size: Size, content: BlockContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size: clamp_size(size),
            content,
            locked: false,
            visible: true,
        }
    }

    /// The block's world-space bounding rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// The block's world-space center.
    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Whether a world point falls inside the block.
    pub fn contains(&self, point: Point) -> bool {
        self.rect().contains(point)
    }

    /// Merge the provided fields of a patch into this block.
    ///
    /// Text fields are ignored on image blocks and vice versa; a size patch
    /// re-clamps to the minimums.
    pub fn apply_patch(&mut self, patch: BlockPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = clamp_size(size);
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let BlockContent::Text {
            text,
            font_size,
            color,
        } = &mut self.content
        {
            if let Some(new_text) = patch.text {
                *text = new_text;
            }
            if let Some(new_size) = patch.font_size {
                *font_size = new_size;
            }
            if let Some(new_color) = patch.color {
                *color = new_color;
            }
        }
    }
}

/// Clamp a size up to the block minimums.
pub fn clamp_size(size: Size) -> Size {
    Size::new(
        size.width.max(MIN_BLOCK_WIDTH),
        size.height.max(MIN_BLOCK_HEIGHT),
    )
}

/// Estimate the rendered size of a run of text at the given font size.
/// Accounts for explicit newlines; no wrapping.
pub fn estimate_text_size(text: &str, font_size: f64) -> Size {
    let max_line_len = text.lines().map(str::len).max().unwrap_or(0);
    let line_count = text.lines().count().max(1);
    Size::new(
        max_line_len as f64 * font_size * CHAR_WIDTH_FACTOR,
        line_count as f64 * font_size * LINE_HEIGHT_FACTOR,
    )
}

/// Everything needed to create a block through the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockCreateRequest {
    pub position: Point,
    pub size: Size,
    pub content: BlockContent,
}

impl BlockCreateRequest {
    /// A default text block centered on the given world point, as created
    /// by double-clicking empty canvas.
    pub fn default_text_at(center: Point) -> Self {
        let size = DEFAULT_TEXT_BLOCK_SIZE;
        Self {
            position: Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0),
            size,
            content: BlockContent::text(""),
        }
    }
}

/// Partial update for [`crate::store::EntityStore::update_block`]. Only the
/// populated fields are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<Rgba>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
}

impl BlockPatch {
    /// A patch moving the block to a new position.
    pub fn at(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// A patch replacing the block's geometry wholesale.
    pub fn rect(rect: Rect) -> Self {
        Self {
            position: Some(rect.origin()),
            size: Some(rect.size()),
            ..Self::default()
        }
    }

    /// A patch replacing a text block's content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}
