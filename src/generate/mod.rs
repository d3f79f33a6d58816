//! Trait sampling and unique-collection generation.

pub(crate) mod combination;
pub(crate) mod sampler;
pub(crate) mod unique;
