use rand::Rng;

use crate::catalog::model::{TraitCatalog, TraitCategory};
use crate::foundation::error::{MintError, MintResult};
use crate::generate::combination::TraitCombination;

/// Cumulative-weight table over option indices. Zero-weight options are not present.
#[derive(Clone, Debug)]
struct WeightedList {
    picks: Vec<usize>,
    cumulative: Vec<u64>,
}

impl WeightedList {
    fn build(weights: impl IntoIterator<Item = (usize, u32)>) -> Option<Self> {
        let mut picks = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0u64;
        for (idx, w) in weights {
            if w == 0 {
                continue;
            }
            total += u64::from(w);
            picks.push(idx);
            cumulative.push(total);
        }
        (total > 0).then_some(Self { picks, cumulative })
    }

    fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> usize {
        let roll = rng.random_range(0..self.total());
        let slot = self.cumulative.partition_point(|&c| c <= roll);
        self.picks[slot]
    }
}

#[derive(Clone, Debug)]
struct CategoryTable {
    all: WeightedList,
    non_empty: Option<WeightedList>,
}

/// Draws single trait combinations from a catalog.
///
/// Per category, an option is drawn proportionally to its weight. Required categories that drew
/// the empty sentinel are redrawn from their non-empty options, then every exclusion group with
/// more than one non-empty member keeps one member chosen uniformly and empties the rest.
#[derive(Clone, Debug)]
pub struct TraitSampler<'a> {
    catalog: &'a TraitCatalog,
    tables: Vec<CategoryTable>,
}

impl<'a> TraitSampler<'a> {
    /// Precompute weighted tables for every category.
    pub fn new(catalog: &'a TraitCatalog) -> MintResult<Self> {
        let mut tables = Vec::with_capacity(catalog.categories().len());
        for cat in catalog.categories() {
            let all = WeightedList::build(weights_of(catalog, cat, |_| true)).ok_or_else(|| {
                MintError::configuration(format!("category '{}' has zero total weight", cat.name))
            })?;
            let non_empty =
                WeightedList::build(weights_of(catalog, cat, |o| !catalog.is_empty_option(o)));
            if cat.required && non_empty.is_none() {
                return Err(MintError::configuration(format!(
                    "required category '{}' has no selectable non-empty option",
                    cat.name
                )));
            }
            tables.push(CategoryTable { all, non_empty });
        }
        Ok(Self { catalog, tables })
    }

    /// Catalog this sampler draws from.
    pub fn catalog(&self) -> &'a TraitCatalog {
        self.catalog
    }

    /// Draw one combination.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> TraitCombination {
        let catalog = self.catalog;
        let sentinel = catalog.empty_sentinel();
        let mut picked: Vec<&str> = catalog
            .categories()
            .iter()
            .zip(&self.tables)
            .map(|(cat, table)| cat.options[table.all.draw(rng)].name.as_str())
            .collect();

        for ((cat, table), slot) in catalog
            .categories()
            .iter()
            .zip(&self.tables)
            .zip(picked.iter_mut())
        {
            if cat.required
                && catalog.is_empty_option(*slot)
                && let Some(non_empty) = &table.non_empty
            {
                *slot = cat.options[non_empty.draw(rng)].name.as_str();
            }
        }

        for group in catalog.exclusion_groups() {
            let occupied: Vec<usize> = group
                .members
                .iter()
                .copied()
                .filter(|&m| !catalog.is_empty_option(picked[m]))
                .collect();
            if occupied.len() <= 1 {
                continue;
            }
            let keep = occupied[rng.random_range(0..occupied.len())];
            for m in occupied {
                if m != keep {
                    picked[m] = sentinel;
                }
            }
        }

        TraitCombination::from_pairs(
            catalog
                .categories()
                .iter()
                .zip(picked)
                .map(|(cat, opt)| (cat.name.as_str(), opt)),
        )
    }
}

fn weights_of<'c>(
    catalog: &'c TraitCatalog,
    cat: &'c TraitCategory,
    keep: impl Fn(&str) -> bool + 'c,
) -> impl Iterator<Item = (usize, u32)> + 'c {
    cat.options
        .iter()
        .enumerate()
        .filter(move |(_, o)| keep(&o.name))
        .map(move |(i, o)| (i, catalog.weight(cat, &o.name)))
}

#[cfg(test)]
#[path = "../../tests/unit/generate/sampler.rs"]
mod tests;
