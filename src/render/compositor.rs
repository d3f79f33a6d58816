use crate::assets::source::LayerSource;
use crate::assets::store::{LayerAssetStore, LayerStoreStats};
use crate::catalog::model::TraitCatalog;
use crate::foundation::core::{OutputFormat, SurfaceSpec};
use crate::foundation::error::{MintError, MintResult};
use crate::generate::combination::TraitCombination;
use crate::render::surface::{CpuSurface, DrawSurface, LayerPaint};

/// A layer that was skipped while rendering. Never fatal on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderWarning {
    /// Category of the skipped layer.
    pub category: String,
    /// Option selected for that category.
    pub option: String,
    /// Why the layer was skipped.
    pub message: String,
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}: {}", self.category, self.option, self.message)
    }
}

/// Encoded image plus what went into it.
#[derive(Clone, Debug)]
pub struct RenderedImage {
    /// Encoded bytes, never empty.
    pub bytes: Vec<u8>,
    /// Layers actually drawn.
    pub layers_drawn: usize,
    /// Layers skipped, in layer order.
    pub warnings: Vec<RenderWarning>,
}

/// Outcome of drawing a combination onto a surface, before encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerTally {
    /// Layers actually drawn.
    pub drawn: usize,
    /// Layers skipped, in layer order.
    pub warnings: Vec<RenderWarning>,
}

/// Look of the public placeholder render in the shadow layout.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShadowStyle {
    /// Straight-alpha RGBA8 colour every hidden layer's coverage is filled with.
    pub fill_rgba: [u8; 4],
    /// Categories drawn unmodified.
    pub keep_categories: Vec<String>,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            fill_rgba: [24, 24, 24, 255],
            keep_categories: vec!["background".to_string()],
        }
    }
}

impl ShadowStyle {
    fn paint_for(&self, category: &str) -> LayerPaint {
        if self.keep_categories.iter().any(|c| c == category) {
            LayerPaint::Normal
        } else {
            LayerPaint::Silhouette(self.fill_rgba)
        }
    }
}

/// Renders trait combinations by stacking their layers in catalog order.
///
/// Output depends only on the combination, the surface spec and the asset bytes. Layer assets are
/// cached until [`Compositor::clear_assets`].
pub struct Compositor<'a, S: LayerSource> {
    catalog: &'a TraitCatalog,
    store: LayerAssetStore<S>,
}

impl<'a, S: LayerSource> Compositor<'a, S> {
    /// Create a compositor reading layer assets from `source`.
    pub fn new(catalog: &'a TraitCatalog, source: S) -> Self {
        Self {
            catalog,
            store: LayerAssetStore::new(source),
        }
    }

    /// Catalog whose layer order drives rendering.
    pub fn catalog(&self) -> &'a TraitCatalog {
        self.catalog
    }

    /// Layer cache counters.
    pub fn asset_stats(&self) -> LayerStoreStats {
        self.store.stats()
    }

    /// Forget cached layers so the next render reads assets again.
    pub fn clear_assets(&mut self) {
        self.store.clear();
    }

    /// Render `combination` into `spec`'s size and encoding.
    ///
    /// Unloadable layers are skipped with a warning. Drawing nothing at all, or encoding to zero
    /// bytes, is [`MintError::EmptyRender`].
    pub fn render(
        &mut self,
        combination: &TraitCombination,
        spec: &SurfaceSpec,
    ) -> MintResult<RenderedImage> {
        self.render_with(combination, spec, |_| LayerPaint::Normal)
    }

    /// Render the public placeholder of `combination` as a lossless silhouette.
    pub fn render_shadow(
        &mut self,
        combination: &TraitCombination,
        spec: &SurfaceSpec,
        style: &ShadowStyle,
    ) -> MintResult<RenderedImage> {
        let spec = SurfaceSpec {
            format: OutputFormat::Lossless,
            ..*spec
        };
        self.render_with(combination, &spec, |category| style.paint_for(category))
    }

    fn render_with(
        &mut self,
        combination: &TraitCombination,
        spec: &SurfaceSpec,
        paint_for: impl Fn(&str) -> LayerPaint,
    ) -> MintResult<RenderedImage> {
        spec.validate()?;
        let mut surface = CpuSurface::for_spec(spec)?;
        let tally = self.render_onto(&mut surface, combination, spec, paint_for)?;
        if tally.drawn == 0 {
            return Err(MintError::empty_render(format!(
                "no layer of '{}' could be drawn ({} skipped)",
                combination.canonical_key(),
                tally.warnings.len()
            )));
        }

        let bytes = surface.encode(spec)?;
        if bytes.is_empty() {
            return Err(MintError::empty_render("encoder produced zero bytes"));
        }
        Ok(RenderedImage {
            bytes,
            layers_drawn: tally.drawn,
            warnings: tally.warnings,
        })
    }

    /// Draw every non-empty layer of `combination` onto `surface`, bottom layer first.
    pub fn render_onto<D: DrawSurface>(
        &mut self,
        surface: &mut D,
        combination: &TraitCombination,
        spec: &SurfaceSpec,
        paint_for: impl Fn(&str) -> LayerPaint,
    ) -> MintResult<LayerTally> {
        surface.clear();
        let rect = spec.full_rect();
        let mut tally = LayerTally::default();

        for (category, option) in combination.layered(self.catalog) {
            let asset = self
                .catalog
                .option(category, option)
                .and_then(|opt| opt.asset.clone());
            let Some(asset) = asset else {
                skip(&mut tally, category, option, "option has no asset in the catalog");
                continue;
            };

            match self.store.load(&asset, spec.width, spec.height) {
                Ok(layer) => {
                    surface.draw_layer(&layer, rect, paint_for(category))?;
                    tally.drawn += 1;
                }
                Err(err) => skip(&mut tally, category, option, &err.to_string()),
            }
        }
        Ok(tally)
    }
}

fn skip(tally: &mut LayerTally, category: &str, option: &str, message: &str) {
    tracing::warn!(category, option, message, "skipping layer");
    tally.warnings.push(RenderWarning {
        category: category.to_string(),
        option: option.to_string(),
        message: message.to_string(),
    });
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
