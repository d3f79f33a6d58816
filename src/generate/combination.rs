use std::collections::BTreeMap;

use crate::catalog::model::TraitCatalog;
use crate::foundation::core::ItemId;

/// Selected option per category, exactly one entry per catalog category.
///
/// Stored sorted by category name; layer order comes from the catalog, never from this map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TraitCombination {
    traits: BTreeMap<String, String>,
}

impl TraitCombination {
    /// Create an empty combination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(category, option)` pairs.
    pub fn from_pairs<C, O>(pairs: impl IntoIterator<Item = (C, O)>) -> Self
    where
        C: Into<String>,
        O: Into<String>,
    {
        Self {
            traits: pairs
                .into_iter()
                .map(|(c, o)| (c.into(), o.into()))
                .collect(),
        }
    }

    /// Set the option for `category`, replacing any previous value.
    pub fn insert(&mut self, category: impl Into<String>, option: impl Into<String>) {
        self.traits.insert(category.into(), option.into());
    }

    /// Selected option for `category`.
    pub fn get(&self, category: &str) -> Option<&str> {
        self.traits.get(category).map(String::as_str)
    }

    /// Iterate `(category, option)` sorted by category name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.traits.iter().map(|(c, o)| (c.as_str(), o.as_str()))
    }

    /// Number of categories present.
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    /// Return `true` when no category is set.
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Distinctness key: sorted `category:value` pairs joined by `|`.
    pub fn canonical_key(&self) -> String {
        let mut out = String::new();
        for (i, (c, o)) in self.iter().enumerate() {
            if i > 0 {
                out.push('|');
            }
            out.push_str(c);
            out.push(':');
            out.push_str(o);
        }
        out
    }

    /// Non-empty `(category, option)` pairs in the catalog's layer order.
    pub fn layered<'a>(
        &'a self,
        catalog: &'a TraitCatalog,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        catalog.categories().iter().filter_map(move |cat| {
            let opt = self.get(&cat.name)?;
            (!catalog.is_empty_option(opt)).then_some((cat.name.as_str(), opt))
        })
    }
}

/// One member of a generated collection. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratedItem {
    /// Dense 1-indexed sequence id.
    pub id: ItemId,
    /// Selected traits.
    pub traits: TraitCombination,
}

#[cfg(test)]
#[path = "../../tests/unit/generate/combination.rs"]
mod tests;
