use crate::foundation::error::{MintError, MintResult};

/// 1-indexed sequence id of a generated item.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    /// First id of every collection.
    pub const FIRST: ItemId = ItemId(1);

    /// Id of the item at 0-based position `index`.
    pub fn from_index(index: usize) -> MintResult<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .map(ItemId)
            .ok_or_else(|| MintError::validation(format!("item index {index} exceeds u32 ids")))
    }

    /// 0-based position of this id.
    pub fn index(self) -> usize {
        self.0.saturating_sub(1) as usize
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-item state machine inside the packaging pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStage {
    /// Queued, not started.
    Pending,
    /// Layers are being loaded and drawn.
    Rendering,
    /// Surface encoded to an owned byte buffer.
    Encoded,
    /// All entries for the item are in the archive.
    Deposited,
}

impl std::fmt::Display for ItemStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Rendering => "rendering",
            Self::Encoded => "encoded",
            Self::Deposited => "deposited",
        })
    }
}

/// Output image encoding.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// PNG with alpha.
    Lossless,
    /// JPEG, alpha flattened over the surface background.
    Lossy {
        /// Encoder quality in `0..=1`.
        quality: f32,
    },
}

impl OutputFormat {
    /// File extension used for archive entries.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Lossless => "png",
            Self::Lossy { .. } => "jpg",
        }
    }
}

/// Fixed render target: size, encoding and the colour lossy output is flattened over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSpec {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Output encoding.
    pub format: OutputFormat,
    /// Straight-alpha RGBA8 background used when the format cannot carry alpha.
    pub background_rgba: [u8; 4],
}

impl SurfaceSpec {
    /// Create a validated lossless spec.
    pub fn lossless(width: u32, height: u32) -> MintResult<Self> {
        Self::new(width, height, OutputFormat::Lossless)
    }

    /// Create a validated spec with a white flatten background.
    pub fn new(width: u32, height: u32, format: OutputFormat) -> MintResult<Self> {
        let spec = Self {
            width,
            height,
            format,
            background_rgba: [255, 255, 255, 255],
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check size and quality bounds.
    pub fn validate(&self) -> MintResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MintError::validation("surface width/height must be non-zero"));
        }
        const MAX_DIM: u32 = 16_384;
        if self.width > MAX_DIM || self.height > MAX_DIM {
            return Err(MintError::validation(format!(
                "surface size too large: {}x{} (max {MAX_DIM}x{MAX_DIM})",
                self.width, self.height
            )));
        }
        if let OutputFormat::Lossy { quality } = self.format
            && !(0.0..=1.0).contains(&quality)
        {
            return Err(MintError::validation(format!(
                "lossy quality must be within 0..=1, got {quality}"
            )));
        }
        Ok(())
    }

    /// Rectangle covering the whole surface.
    pub fn full_rect(&self) -> PixelRect {
        PixelRect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    /// Byte length of one premultiplied RGBA8 surface.
    pub fn byte_len(&self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Integer pixel rectangle on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
