use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{MintError, MintResult};

/// Byte source for layer assets, keyed by the catalog's asset references.
pub trait LayerSource {
    /// Read the raw bytes of `asset`.
    fn read(&self, asset: &str) -> MintResult<Vec<u8>>;
}

/// Reads assets relative to a root directory.
#[derive(Clone, Debug)]
pub struct DirLayerSource {
    root: PathBuf,
}

impl DirLayerSource {
    /// Resolve asset references against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LayerSource for DirLayerSource {
    fn read(&self, asset: &str) -> MintResult<Vec<u8>> {
        let rel = normalize_rel_path(asset)?;
        let path = self.root.join(Path::new(&rel));
        std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(MintError::from)
    }
}

/// In-memory assets, mostly for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryLayerSource {
    assets: BTreeMap<String, Vec<u8>>,
}

impl MemoryLayerSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `asset`.
    pub fn insert(&mut self, asset: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(asset.into(), bytes);
    }

    /// Builder-style [`MemoryLayerSource::insert`].
    pub fn with(mut self, asset: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(asset, bytes);
        self
    }
}

impl LayerSource for MemoryLayerSource {
    fn read(&self, asset: &str) -> MintResult<Vec<u8>> {
        self.assets
            .get(asset)
            .cloned()
            .ok_or_else(|| MintError::asset_load(format!("asset '{asset}' not found")))
    }
}

/// Normalize and validate root-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> MintResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MintError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(MintError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MintError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MintError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
