use std::collections::BTreeMap;

/// Weight assigned to options the rarity table does not list.
pub const DEFAULT_WEIGHT: u32 = 100;

/// Two-level rarity lookup: `category -> option -> weight`, with a typed default.
///
/// A weight of `0` removes the option from random selection entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RarityTable {
    default_weight: u32,
    weights: BTreeMap<String, BTreeMap<String, u32>>,
}

impl Default for RarityTable {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT)
    }
}

impl RarityTable {
    /// Create an empty table where every option weighs `default_weight`.
    pub fn new(default_weight: u32) -> Self {
        Self {
            default_weight,
            weights: BTreeMap::new(),
        }
    }

    /// Builder-style override for one option.
    pub fn with(mut self, category: &str, option: &str, weight: u32) -> Self {
        self.set(category, option, weight);
        self
    }

    /// Override the weight of one option.
    pub fn set(&mut self, category: &str, option: &str, weight: u32) {
        self.weights
            .entry(category.to_string())
            .or_default()
            .insert(option.to_string(), weight);
    }

    /// Weight of `option` within `category`, falling back to the default.
    pub fn weight(&self, category: &str, option: &str) -> u32 {
        self.weights
            .get(category)
            .and_then(|opts| opts.get(option))
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Weight used for unlisted options.
    pub fn default_weight(&self) -> u32 {
        self.default_weight
    }

    /// Iterate explicit overrides as `(category, option, weight)`.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.weights.iter().flat_map(|(cat, opts)| {
            opts.iter()
                .map(move |(opt, w)| (cat.as_str(), opt.as_str(), *w))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/rarity.rs"]
mod tests;
