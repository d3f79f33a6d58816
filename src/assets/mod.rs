//! Layer asset sources, decoding and the per-run prepared-layer cache.

pub(crate) mod decode;
pub(crate) mod source;
pub(crate) mod store;
