use crate::foundation::error::{MintError, MintResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8, premultiply_rgba8_in_place};

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over blend of two premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        out[i] = add_sat_u8(src[i], mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Replace the colour of `src` with `fill`, keeping `src` coverage.
///
/// `fill` is premultiplied; the result carries `fill` scaled by the source alpha.
pub fn silhouette(src: PremulRgba8, fill: PremulRgba8) -> PremulRgba8 {
    let a = u16::from(src[3]);
    [
        mul_div255_u8(u16::from(fill[0]), a),
        mul_div255_u8(u16::from(fill[1]), a),
        mul_div255_u8(u16::from(fill[2]), a),
        mul_div255_u8(u16::from(fill[3]), a),
    ]
}

/// Premultiply one straight-alpha colour.
pub fn premul(straight: [u8; 4]) -> PremulRgba8 {
    let mut px = straight;
    premultiply_rgba8_in_place(&mut px);
    px
}

/// Blend `src` over `dst` pixel by pixel.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> MintResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MintError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Blend the silhouette of `src` in `fill` over `dst`.
pub fn silhouette_over_in_place(dst: &mut [u8], src: &[u8], fill: PremulRgba8) -> MintResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MintError::validation(
            "silhouette_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let shape = silhouette([s[0], s[1], s[2], s[3]], fill);
        let out = over([d[0], d[1], d[2], d[3]], shape);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
