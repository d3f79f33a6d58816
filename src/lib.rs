//! traitmint builds layered generative collections.
//!
//! A run goes through four stages:
//!
//! - Load a [`TraitCatalog`] (categories in layer order, rarity weights, exclusion groups)
//! - Draw a unique collection with [`UniquenessGuarantor`]
//! - Render each item with the [`Compositor`]
//! - Stream images and metadata records into an [`ArchiveSink`] through the
//!   [`PackagingPipeline`], in the direct or shadow [`ArchiveLayout`]
//!
//! [`ProjectConfig`] bundles every input of a run in one JSON file.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod catalog;
mod foundation;
mod generate;
mod metadata;
mod package;
mod render;

/// Project configuration file.
pub mod config;

pub use crate::foundation::core::{ItemId, ItemStage, OutputFormat, PixelRect, SurfaceSpec};
pub use crate::foundation::error::{MintError, MintResult};

pub use crate::catalog::model::{
    CatalogDef, CategoryDef, DEFAULT_EMPTY_SENTINEL, ExclusionGroup, OptionDef, TraitCatalog,
    TraitCategory, TraitOption,
};
pub use crate::catalog::rarity::{DEFAULT_WEIGHT, RarityTable};

pub use crate::generate::combination::{GeneratedItem, TraitCombination};
pub use crate::generate::sampler::TraitSampler;
pub use crate::generate::unique::{
    DEFAULT_ATTEMPT_FACTOR, Generation, Underfill, UniquenessGuarantor,
};

pub use crate::metadata::builder::MetadataBuilder;
pub use crate::metadata::record::{
    Attribute, CollectionInfo, Metadata, RevealRecord, ShadowRecords,
};
pub use crate::metadata::validate::{
    ValidationReport, Violation, validate_items, validate_metadata, validate_placeholder,
};

pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::source::{
    DirLayerSource, LayerSource, MemoryLayerSource, normalize_rel_path,
};
pub use crate::assets::store::{LayerAssetStore, LayerStoreStats};

pub use crate::render::compositor::{
    Compositor, LayerTally, RenderWarning, RenderedImage, ShadowStyle,
};
pub use crate::render::encode::encode_premul;
pub use crate::render::surface::{CpuSurface, DrawSurface, LayerPaint};

pub use crate::package::archive::{ArchiveSink, DirArchive, MemoryArchive, SealedArchive};
pub use crate::package::layout::{
    ArchiveLayout, EntryName, IMAGES_DIR, JSON_DIR, METADATA_DIR, REVEAL_DIR, SHADOWS_DIR,
};
pub use crate::package::pipeline::{PackageStats, PackagingPipeline, PipelineOpts};
pub use crate::package::progress::{CancelToken, Progress, ProgressReporter};

pub use crate::config::ProjectConfig;
