//! Metadata records (direct, shadow, empty) and collection validation.

pub(crate) mod builder;
pub(crate) mod record;
pub(crate) mod validate;
