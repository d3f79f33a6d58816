use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{MintError, MintResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded layer in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Return `true` when at least one pixel has non-zero alpha.
    pub fn has_coverage(&self) -> bool {
        self.rgba8_premul.chunks_exact(4).any(|px| px[3] != 0)
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> MintResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> MintResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize `tree` stretched to exactly `width x height`.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> MintResult<PreparedImage> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MintError::asset_load("failed to allocate svg pixmap"))?;

    let size = tree.size();
    if !(size.width() > 0.0 && size.height() > 0.0) {
        return Err(MintError::asset_load("svg has invalid width/height"));
    }
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Resample `img` to `width x height`. Returns the input unchanged when sizes already match.
///
/// Filtering runs on premultiplied values so transparent edges do not bleed colour.
pub fn stretch(img: PreparedImage, width: u32, height: u32) -> MintResult<PreparedImage> {
    if img.width == width && img.height == height {
        return Ok(img);
    }
    let (src_w, src_h) = (img.width, img.height);
    let raw = Arc::try_unwrap(img.rgba8_premul).unwrap_or_else(|shared| (*shared).clone());
    let buf = image::RgbaImage::from_raw(src_w, src_h, raw)
        .ok_or_else(|| MintError::asset_load("layer buffer does not match its dimensions"))?;
    let out = image::imageops::resize(&buf, width, height, image::imageops::FilterType::Triangle);
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(out.into_raw()),
    })
}

/// Return `true` when `asset` names an SVG document.
pub fn is_svg_asset(asset: &str) -> bool {
    std::path::Path::new(asset)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
