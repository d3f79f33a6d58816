//! Static trait catalog: categories in layer order, options, rarity weights and exclusion groups.

pub(crate) mod model;
pub(crate) mod rarity;
