use crate::foundation::core::{ItemId, ItemStage};
use crate::generate::unique::Underfill;
use crate::metadata::validate::ValidationReport;

/// Convenience result type used across traitmint.
pub type MintResult<T> = Result<T, MintError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum MintError {
    /// Malformed catalog or project configuration. Fatal before any run starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Invalid caller-provided value (render options, ids, paths).
    #[error("validation error: {0}")]
    Validation(String),

    /// A layer asset could not be read or decoded.
    ///
    /// The compositor absorbs this into a render warning; it only escapes from the asset layer.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// Rendering drew nothing or encoding produced zero bytes.
    #[error("empty render: {0}")]
    EmptyRender(String),

    /// The requested collection size could not be reached within the attempt bound.
    #[error("collection underfilled: {0}")]
    Underfill(Underfill),

    /// Folder creation or byte deposit into an archive failed.
    #[error("archive deposit error: {0}")]
    ArchiveDeposit(String),

    /// Collection or metadata checks failed; carries every violation found.
    #[error("invalid collection: {0}")]
    Invalid(ValidationReport),

    /// A packaging run was cancelled at a batch boundary.
    #[error("run cancelled after {completed} of {total} items")]
    Cancelled {
        /// Items fully deposited before cancellation was observed.
        completed: usize,
        /// Items in the run.
        total: usize,
    },

    /// A single item failed; the whole run is aborted.
    #[error("item {id} failed while {stage}: {source}")]
    Item {
        /// Failing item.
        id: ItemId,
        /// Pipeline stage the item was in when it failed.
        stage: ItemStage,
        /// Underlying failure.
        #[source]
        source: Box<MintError>,
    },

    /// Errors when serializing or deserializing records.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MintError {
    /// Build a [`MintError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`MintError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MintError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`MintError::EmptyRender`] value.
    pub fn empty_render(msg: impl Into<String>) -> Self {
        Self::EmptyRender(msg.into())
    }

    /// Build a [`MintError::ArchiveDeposit`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::ArchiveDeposit(msg.into())
    }

    /// Build a [`MintError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Wrap `self` as the failure of item `id` at `stage`.
    pub fn at_item(self, id: ItemId, stage: ItemStage) -> Self {
        Self::Item {
            id,
            stage,
            source: Box::new(self),
        }
    }

    /// Return the innermost error, looking through [`MintError::Item`] wrappers.
    pub fn root_cause(&self) -> &MintError {
        match self {
            Self::Item { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for MintError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
