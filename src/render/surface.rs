use crate::assets::decode::PreparedImage;
use crate::foundation::core::{PixelRect, SurfaceSpec};
use crate::foundation::error::{MintError, MintResult};
use crate::render::composite::{PremulRgba8, over_in_place, premul, silhouette_over_in_place};
use crate::render::encode::encode_premul;

/// How a layer's pixels reach the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerPaint {
    /// Draw the layer as is.
    Normal,
    /// Draw only the layer's coverage, filled with a straight-alpha RGBA8 colour.
    Silhouette([u8; 4]),
}

/// Drawing capability the compositor renders through.
///
/// Layers are drawn in call order; each call lands strictly above everything drawn before it.
pub trait DrawSurface {
    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Draw `layer` into `dst`. The layer must already be sized to `dst`.
    fn draw_layer(&mut self, layer: &PreparedImage, dst: PixelRect, paint: LayerPaint)
    -> MintResult<()>;

    /// Encode the current contents as `spec` requests into an owned buffer.
    fn encode(&self, spec: &SurfaceSpec) -> MintResult<Vec<u8>>;
}

/// Premultiplied RGBA8 surface held in memory.
#[derive(Clone, Debug)]
pub struct CpuSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CpuSurface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> MintResult<Self> {
        if width == 0 || height == 0 {
            return Err(MintError::validation("surface width/height must be non-zero"));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| MintError::validation("surface size overflow"))?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Allocate a surface matching `spec`.
    pub fn for_spec(spec: &SurfaceSpec) -> MintResult<Self> {
        Self::new(spec.width, spec.height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`, if inside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }
}

impl DrawSurface for CpuSurface {
    fn clear(&mut self) {
        self.data.fill(0);
    }

    fn draw_layer(
        &mut self,
        layer: &PreparedImage,
        dst: PixelRect,
        paint: LayerPaint,
    ) -> MintResult<()> {
        if layer.width != dst.width || layer.height != dst.height {
            return Err(MintError::validation(format!(
                "layer is {}x{} but target rect is {}x{}",
                layer.width, layer.height, dst.width, dst.height
            )));
        }
        if dst.is_empty() || dst.x >= self.width || dst.y >= self.height {
            return Ok(());
        }

        let cols = dst.width.min(self.width - dst.x) as usize;
        let rows = dst.height.min(self.height - dst.y) as usize;
        let src_stride = (layer.width as usize) * 4;
        let dst_stride = (self.width as usize) * 4;
        let fill = match paint {
            LayerPaint::Normal => None,
            LayerPaint::Silhouette(straight) => Some(premul(straight)),
        };

        for row in 0..rows {
            let s0 = row * src_stride;
            let d0 = (dst.y as usize + row) * dst_stride + (dst.x as usize) * 4;
            let src = &layer.rgba8_premul[s0..s0 + cols * 4];
            let out = &mut self.data[d0..d0 + cols * 4];
            match fill {
                None => over_in_place(out, src)?,
                Some(fill) => silhouette_over_in_place(out, src, fill)?,
            }
        }
        Ok(())
    }

    fn encode(&self, spec: &SurfaceSpec) -> MintResult<Vec<u8>> {
        if spec.width != self.width || spec.height != self.height {
            return Err(MintError::validation(format!(
                "surface is {}x{} but spec asks for {}x{}",
                self.width, self.height, spec.width, spec.height
            )));
        }
        encode_premul(
            self.width,
            self.height,
            &self.data,
            spec.format,
            spec.background_rgba,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
