//! Project configuration file: catalog, collection constants, render, generation and packaging.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::catalog::model::{CatalogDef, TraitCatalog};
use crate::foundation::core::{OutputFormat, SurfaceSpec};
use crate::foundation::error::{MintError, MintResult};
use crate::generate::unique::DEFAULT_ATTEMPT_FACTOR;
use crate::metadata::record::CollectionInfo;
use crate::package::pipeline::PipelineOpts;
use crate::render::compositor::ShadowStyle;

/// Encoding selector as written in configuration files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatChoice {
    /// PNG.
    #[default]
    Lossless,
    /// JPEG at `quality`.
    Lossy,
}

/// `render` section.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output encoding.
    pub format: FormatChoice,
    /// Lossy quality in `0..=1`. Ignored for lossless output.
    pub quality: f32,
    /// Straight-alpha colour lossy output is flattened over.
    pub background_rgba: [u8; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            format: FormatChoice::Lossless,
            quality: 0.9,
            background_rgba: [255, 255, 255, 255],
        }
    }
}

impl RenderConfig {
    /// Validated surface spec for this section.
    pub fn surface_spec(&self) -> MintResult<SurfaceSpec> {
        let format = match self.format {
            FormatChoice::Lossless => OutputFormat::Lossless,
            FormatChoice::Lossy => OutputFormat::Lossy {
                quality: self.quality,
            },
        };
        let mut spec = SurfaceSpec::new(self.width, self.height, format)?;
        spec.background_rgba = self.background_rgba;
        Ok(spec)
    }
}

/// `generation` section.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Collection size.
    pub count: usize,
    /// Sampling attempts allowed per requested item.
    pub attempt_factor: usize,
    /// Seed for reproducible collections; OS entropy when absent.
    pub seed: Option<u64>,
    /// Accept fewer items than `count` when the attempt bound is hit.
    pub allow_underfill: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            count: 100,
            attempt_factor: DEFAULT_ATTEMPT_FACTOR,
            seed: None,
            allow_underfill: true,
        }
    }
}

/// `packaging` section.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagingConfig {
    /// Items per batch.
    pub batch_size: usize,
    /// Extra yield cadence for shadow runs.
    pub shadow_yield_every: usize,
    /// Shadow placeholder look.
    pub shadow: ShadowStyle,
}

impl Default for PackagingConfig {
    fn default() -> Self {
        let opts = PipelineOpts::default();
        Self {
            batch_size: opts.batch_size,
            shadow_yield_every: opts.shadow_yield_every,
            shadow: opts.shadow_style,
        }
    }
}

impl PackagingConfig {
    /// Pipeline options for this section, without a cancel token.
    pub fn pipeline_opts(&self) -> PipelineOpts {
        PipelineOpts {
            batch_size: self.batch_size,
            shadow_yield_every: self.shadow_yield_every,
            shadow_style: self.shadow.clone(),
            cancel: None,
        }
    }
}

/// Whole project file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Trait catalog definition.
    pub catalog: CatalogDef,
    /// Collection-level metadata constants.
    pub collection: CollectionInfo,
    /// Output surface.
    #[serde(default)]
    pub render: RenderConfig,
    /// Sampling controls.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Pipeline controls.
    #[serde(default)]
    pub packaging: PackagingConfig,
}

impl ProjectConfig {
    /// Parse a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MintResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MintError::configuration(format!("parse project JSON: {e}")))
    }

    /// Parse a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MintResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MintError::configuration(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate every section and build the catalog.
    pub fn validate(&self) -> MintResult<TraitCatalog> {
        let catalog = TraitCatalog::from_def(&self.catalog)?;
        self.render
            .surface_spec()
            .map_err(|e| MintError::configuration(format!("render section: {e}")))?;
        if self.generation.attempt_factor == 0 {
            return Err(MintError::configuration(
                "generation.attempt_factor must be >= 1",
            ));
        }
        if self.packaging.batch_size == 0 || self.packaging.shadow_yield_every == 0 {
            return Err(MintError::configuration(
                "packaging.batch_size and packaging.shadow_yield_every must be >= 1",
            ));
        }
        for kept in &self.packaging.shadow.keep_categories {
            if catalog.category(kept).is_none() {
                tracing::warn!(category = %kept, "shadow keep_categories names an unknown category");
            }
        }
        Ok(catalog)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
