use image::ImageEncoder;

use crate::foundation::core::OutputFormat;
use crate::foundation::error::{MintError, MintResult};
use crate::foundation::math::unpremultiply;
use crate::render::composite::{over, premul};

/// Encode a premultiplied RGBA8 buffer.
///
/// Lossless output keeps alpha. Lossy output is flattened over `background` (treated as opaque)
/// because JPEG has no alpha channel. An empty result is an [`MintError::EmptyRender`].
pub fn encode_premul(
    width: u32,
    height: u32,
    premul_rgba: &[u8],
    format: OutputFormat,
    background: [u8; 4],
) -> MintResult<Vec<u8>> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| MintError::validation("encode buffer size overflow"))?;
    if premul_rgba.len() != expected {
        return Err(MintError::validation(format!(
            "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
            premul_rgba.len()
        )));
    }

    let mut out = Vec::new();
    match format {
        OutputFormat::Lossless => {
            let mut straight = Vec::with_capacity(premul_rgba.len());
            for px in premul_rgba.chunks_exact(4) {
                straight.extend_from_slice(&unpremultiply([px[0], px[1], px[2], px[3]]));
            }
            image::codecs::png::PngEncoder::new(&mut out)
                .write_image(&straight, width, height, image::ExtendedColorType::Rgba8)
                .map_err(|e| MintError::Other(anyhow::Error::new(e).context("encode png")))?;
        }
        OutputFormat::Lossy { quality } => {
            let bg = premul([background[0], background[1], background[2], 255]);
            let mut rgb = Vec::with_capacity(premul_rgba.len() / 4 * 3);
            for px in premul_rgba.chunks_exact(4) {
                let flat = over(bg, [px[0], px[1], px[2], px[3]]);
                rgb.extend_from_slice(&flat[..3]);
            }
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality))
                .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
                .map_err(|e| MintError::Other(anyhow::Error::new(e).context("encode jpeg")))?;
        }
    }

    if out.is_empty() {
        return Err(MintError::empty_render("encoder produced zero bytes"));
    }
    Ok(out)
}

/// Map a `0..=1` quality onto the JPEG encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    let q = if quality.is_finite() { quality } else { 1.0 };
    ((q.clamp(0.0, 1.0) * 100.0).round() as u8).max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
