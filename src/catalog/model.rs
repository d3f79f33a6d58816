use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::rarity::{DEFAULT_WEIGHT, RarityTable};
use crate::foundation::error::{MintError, MintResult};

/// Option name meaning "draw nothing for this layer" unless the catalog overrides it.
pub const DEFAULT_EMPTY_SENTINEL: &str = "none";

fn default_sentinel() -> String {
    DEFAULT_EMPTY_SENTINEL.to_string()
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

/// JSON boundary form of a trait catalog.
///
/// `categories` is listed bottom layer first; that order is the fixed layer stack.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogDef {
    /// Reserved option name for "no layer".
    #[serde(default = "default_sentinel")]
    pub empty_sentinel: String,
    /// Weight of options the rarity table does not list.
    #[serde(default = "default_weight")]
    pub default_weight: u32,
    /// Categories in layer order (bottom first).
    pub categories: Vec<CategoryDef>,
    /// `category -> option -> weight` overrides.
    #[serde(default)]
    pub rarity: BTreeMap<String, BTreeMap<String, u32>>,
    /// Groups of categories of which at most one may be non-empty.
    #[serde(default)]
    pub exclusion_groups: Vec<Vec<String>>,
}

/// JSON boundary form of one category.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategoryDef {
    /// Category identifier, e.g. `background`.
    pub name: String,
    /// Never resolve to the empty sentinel.
    #[serde(default)]
    pub required: bool,
    /// Selectable options, including the sentinel when the layer may be absent.
    pub options: Vec<OptionDef>,
}

/// JSON boundary form of one option.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptionDef {
    /// Display name.
    pub name: String,
    /// Asset path relative to the asset root. Absent only for the sentinel.
    #[serde(default)]
    pub asset: Option<String>,
}

/// One selectable value within a category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraitOption {
    /// Display name.
    pub name: String,
    /// Asset reference; `None` for the empty sentinel.
    pub asset: Option<String>,
}

/// A named slot in the layer stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraitCategory {
    /// Category identifier.
    pub name: String,
    /// Position in the layer stack, 0 is drawn first.
    pub layer: usize,
    /// Never resolve to the empty sentinel.
    pub required: bool,
    /// Options in definition order.
    pub options: Vec<TraitOption>,
}

/// Categories of which at most one may be non-empty, stored as layer indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExclusionGroup {
    /// Member layer indices, in definition order.
    pub members: Vec<usize>,
}

/// Immutable, validated trait catalog.
///
/// Loaded once and passed explicitly to the sampler and compositor.
#[derive(Clone, Debug)]
pub struct TraitCatalog {
    empty_sentinel: String,
    categories: Vec<TraitCategory>,
    index_by_name: BTreeMap<String, usize>,
    exclusion_groups: Vec<ExclusionGroup>,
    rarity: RarityTable,
}

impl TraitCatalog {
    /// Validate a boundary definition into a catalog.
    pub fn from_def(def: &CatalogDef) -> MintResult<Self> {
        if def.empty_sentinel.is_empty() {
            return Err(MintError::configuration("empty_sentinel must be non-empty"));
        }
        check_key_safe("empty_sentinel", &def.empty_sentinel)?;
        if def.categories.is_empty() {
            return Err(MintError::configuration(
                "catalog must define at least one category",
            ));
        }

        let mut categories = Vec::with_capacity(def.categories.len());
        let mut index_by_name = BTreeMap::new();
        for (layer, cat) in def.categories.iter().enumerate() {
            if cat.name.is_empty() {
                return Err(MintError::configuration(format!(
                    "category at layer {layer} has an empty name"
                )));
            }
            if index_by_name.insert(cat.name.clone(), layer).is_some() {
                return Err(MintError::configuration(format!(
                    "duplicate category '{}'",
                    cat.name
                )));
            }
            check_key_safe("category", &cat.name)?;

            let mut seen = BTreeSet::new();
            let mut options = Vec::with_capacity(cat.options.len());
            for opt in &cat.options {
                check_key_safe("option", &opt.name)?;
                if !seen.insert(opt.name.as_str()) {
                    return Err(MintError::configuration(format!(
                        "duplicate option '{}' in category '{}'",
                        opt.name, cat.name
                    )));
                }
                let is_sentinel = opt.name == def.empty_sentinel;
                match (&opt.asset, is_sentinel) {
                    (Some(_), true) => {
                        return Err(MintError::configuration(format!(
                            "empty sentinel '{}' in category '{}' must not reference an asset",
                            opt.name, cat.name
                        )));
                    }
                    (None, false) => {
                        return Err(MintError::configuration(format!(
                            "option '{}' in category '{}' has no asset",
                            opt.name, cat.name
                        )));
                    }
                    _ => {}
                }
                options.push(TraitOption {
                    name: opt.name.clone(),
                    asset: opt.asset.clone(),
                });
            }

            categories.push(TraitCategory {
                name: cat.name.clone(),
                layer,
                required: cat.required,
                options,
            });
        }

        let mut rarity = RarityTable::new(def.default_weight);
        for (cat_name, opts) in &def.rarity {
            let Some(&idx) = index_by_name.get(cat_name) else {
                return Err(MintError::configuration(format!(
                    "rarity table names unknown category '{cat_name}'"
                )));
            };
            for (opt_name, &w) in opts {
                if !categories[idx].options.iter().any(|o| &o.name == opt_name) {
                    return Err(MintError::configuration(format!(
                        "rarity table names unknown option '{opt_name}' in category '{cat_name}'"
                    )));
                }
                rarity.set(cat_name, opt_name, w);
            }
        }

        let mut exclusion_groups = Vec::with_capacity(def.exclusion_groups.len());
        for group in &def.exclusion_groups {
            if group.len() < 2 {
                return Err(MintError::configuration(format!(
                    "exclusion group {group:?} needs at least two categories"
                )));
            }
            let mut members = Vec::with_capacity(group.len());
            for name in group {
                let Some(&idx) = index_by_name.get(name) else {
                    return Err(MintError::configuration(format!(
                        "exclusion group names unknown category '{name}'"
                    )));
                };
                if members.contains(&idx) {
                    return Err(MintError::configuration(format!(
                        "exclusion group {group:?} lists '{name}' twice"
                    )));
                }
                if categories[idx].required {
                    return Err(MintError::configuration(format!(
                        "required category '{name}' cannot be part of an exclusion group"
                    )));
                }
                members.push(idx);
            }
            exclusion_groups.push(ExclusionGroup { members });
        }

        let catalog = Self {
            empty_sentinel: def.empty_sentinel.clone(),
            categories,
            index_by_name,
            exclusion_groups,
            rarity,
        };
        catalog.check_weights()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from a JSON value.
    pub fn from_value(value: serde_json::Value) -> MintResult<Self> {
        let def: CatalogDef = serde_json::from_value(value)
            .map_err(|e| MintError::configuration(format!("parse catalog JSON: {e}")))?;
        Self::from_def(&def)
    }

    fn check_weights(&self) -> MintResult<()> {
        for cat in &self.categories {
            let total: u64 = cat
                .options
                .iter()
                .map(|o| u64::from(self.weight(cat, &o.name)))
                .sum();
            if total == 0 {
                return Err(MintError::configuration(format!(
                    "category '{}' has zero total weight",
                    cat.name
                )));
            }
            if cat.required {
                let non_empty: u64 = cat
                    .options
                    .iter()
                    .filter(|o| !self.is_empty_option(&o.name))
                    .map(|o| u64::from(self.weight(cat, &o.name)))
                    .sum();
                if non_empty == 0 {
                    return Err(MintError::configuration(format!(
                        "required category '{}' has no selectable non-empty option",
                        cat.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Categories in layer order.
    pub fn categories(&self) -> &[TraitCategory] {
        &self.categories
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&TraitCategory> {
        self.index_by_name
            .get(name)
            .map(|&idx| &self.categories[idx])
    }

    /// Look up an option within a category.
    pub fn option(&self, category: &str, option: &str) -> Option<&TraitOption> {
        self.category(category)?
            .options
            .iter()
            .find(|o| o.name == option)
    }

    /// Reserved "draw nothing" option name.
    pub fn empty_sentinel(&self) -> &str {
        &self.empty_sentinel
    }

    /// Return `true` when `option` is the empty sentinel.
    pub fn is_empty_option(&self, option: &str) -> bool {
        option == self.empty_sentinel
    }

    /// Declared mutual-exclusion groups.
    pub fn exclusion_groups(&self) -> &[ExclusionGroup] {
        &self.exclusion_groups
    }

    /// Rarity weights.
    pub fn rarity(&self) -> &RarityTable {
        &self.rarity
    }

    /// Weight of `option` within `category`.
    pub fn weight(&self, category: &TraitCategory, option: &str) -> u32 {
        self.rarity.weight(&category.name, option)
    }

    /// Upper bound on the number of distinct combinations the sampler can produce.
    ///
    /// Exclusion groups are ignored, so the real space may be smaller.
    pub fn combination_space_upper_bound(&self) -> u128 {
        self.categories.iter().fold(1u128, |acc, cat| {
            let eligible = cat
                .options
                .iter()
                .filter(|o| self.weight(cat, &o.name) > 0)
                .filter(|o| !(cat.required && self.is_empty_option(&o.name)))
                .count() as u128;
            acc.saturating_mul(eligible)
        })
    }
}

/// Rejects `:` and `|`, the separators of canonical combination keys.
fn check_key_safe(kind: &str, name: &str) -> MintResult<()> {
    if name.contains([':', '|']) {
        return Err(MintError::configuration(format!(
            "{kind} name '{name}' must not contain ':' or '|'"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
