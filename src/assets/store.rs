use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::{PreparedImage, decode_image, is_svg_asset, parse_svg, rasterize_svg, stretch};
use crate::assets::source::LayerSource;
use crate::foundation::error::{MintError, MintResult};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayerKey {
    asset: String,
    width: u32,
    height: u32,
}

/// Cache counters for one store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerStoreStats {
    /// Lookups served from the cache (including cached failures).
    pub hits: u64,
    /// Lookups that read and decoded the asset.
    pub loads: u64,
    /// Loads that failed.
    pub failures: u64,
}

/// Loads layer assets stretched to the surface size and keeps them until
/// [`LayerAssetStore::clear`].
///
/// A catalog has far fewer distinct assets than a collection has items, so every prepared layer
/// is retained. Failures are cached too, so a missing asset is read once but reported per item.
/// Packaging runs clear the store before their first item.
pub struct LayerAssetStore<S: LayerSource> {
    source: S,
    cache: HashMap<LayerKey, Result<Arc<PreparedImage>, String>>,
    stats: LayerStoreStats,
}

impl<S: LayerSource> LayerAssetStore<S> {
    /// Create an empty store over `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            stats: LayerStoreStats::default(),
        }
    }

    /// Prepared layer for `asset` at `width x height`.
    pub fn load(&mut self, asset: &str, width: u32, height: u32) -> MintResult<Arc<PreparedImage>> {
        let key = LayerKey {
            asset: asset.to_string(),
            width,
            height,
        };
        if let Some(cached) = self.cache.get(&key) {
            self.stats.hits += 1;
            return cached.clone().map_err(MintError::asset_load);
        }

        self.stats.loads += 1;
        let loaded = self
            .prepare(asset, width, height)
            .map(Arc::new)
            .map_err(|e| format!("'{asset}': {e:#}"));
        if loaded.is_err() {
            self.stats.failures += 1;
        }
        self.cache.insert(key, loaded.clone());
        loaded.map_err(MintError::asset_load)
    }

    fn prepare(&self, asset: &str, width: u32, height: u32) -> MintResult<PreparedImage> {
        let bytes = self.source.read(asset)?;
        if is_svg_asset(asset) {
            let tree = parse_svg(&bytes)?;
            return rasterize_svg(&tree, width, height);
        }
        stretch(decode_image(&bytes)?, width, height)
    }

    /// Drop every cached layer and cached failure. Counters are kept.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache counters.
    pub fn stats(&self) -> LayerStoreStats {
        self.stats
    }

    /// Underlying byte source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
