use std::collections::HashSet;

use rand::Rng;

use crate::catalog::model::TraitCatalog;
use crate::foundation::core::ItemId;
use crate::foundation::error::{MintError, MintResult};
use crate::generate::combination::GeneratedItem;
use crate::generate::sampler::TraitSampler;

/// Default multiple of the requested count used as the total attempt bound.
pub const DEFAULT_ATTEMPT_FACTOR: usize = 10;

/// The attempt bound was exhausted before the requested count was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Underfill {
    /// Items asked for.
    pub requested: usize,
    /// Distinct items found.
    pub produced: usize,
    /// Sampler draws spent.
    pub attempts: usize,
}

impl std::fmt::Display for Underfill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "produced {} of {} unique combinations after {} attempts",
            self.produced, self.requested, self.attempts
        )
    }
}

/// Result of one generation run.
#[derive(Clone, Debug)]
pub struct Generation {
    /// Items with dense ids `1..=items.len()`.
    pub items: Vec<GeneratedItem>,
    /// Items asked for.
    pub requested: usize,
    /// Sampler draws spent.
    pub attempts: usize,
}

impl Generation {
    /// Return the underfill condition, if the run came up short.
    pub fn underfill(&self) -> Option<Underfill> {
        (self.items.len() < self.requested).then_some(Underfill {
            requested: self.requested,
            produced: self.items.len(),
            attempts: self.attempts,
        })
    }

    /// Return `true` when every requested item was produced.
    pub fn is_complete(&self) -> bool {
        self.underfill().is_none()
    }

    /// Return the items, treating an underfill as an error.
    pub fn into_full(self) -> MintResult<Vec<GeneratedItem>> {
        match self.underfill() {
            Some(u) => Err(MintError::Underfill(u)),
            None => Ok(self.items),
        }
    }
}

/// Builds collections of pairwise-distinct trait combinations within a bounded attempt budget.
///
/// The seen-key set lives only for the duration of one [`UniquenessGuarantor::generate`] call.
#[derive(Clone, Debug)]
pub struct UniquenessGuarantor<'a> {
    sampler: TraitSampler<'a>,
    attempt_factor: usize,
}

impl<'a> UniquenessGuarantor<'a> {
    /// Create a guarantor with the default attempt factor.
    pub fn new(catalog: &'a TraitCatalog) -> MintResult<Self> {
        Ok(Self {
            sampler: TraitSampler::new(catalog)?,
            attempt_factor: DEFAULT_ATTEMPT_FACTOR,
        })
    }

    /// Override the attempt factor (`max attempts = count * factor`, at least 1).
    pub fn with_attempt_factor(mut self, factor: usize) -> Self {
        self.attempt_factor = factor.max(1);
        self
    }

    /// Total draws allowed for a request of `count` items.
    pub fn max_attempts(&self, count: usize) -> usize {
        count.saturating_mul(self.attempt_factor)
    }

    /// Generate up to `count` distinct items.
    ///
    /// Never fails; check [`Generation::underfill`] for a short result.
    #[tracing::instrument(skip_all, fields(count = count))]
    pub fn generate<R: Rng>(&self, count: usize, rng: &mut R) -> Generation {
        let max_attempts = self.max_attempts(count);
        let mut seen = HashSet::with_capacity(count);
        let mut items = Vec::with_capacity(count);
        let mut attempts = 0usize;

        let space = self.sampler.catalog().combination_space_upper_bound();
        if (count as u128) > space {
            tracing::warn!(
                count,
                space = %space,
                "requested count exceeds the catalog's combination space"
            );
        }

        while items.len() < count && attempts < max_attempts {
            attempts += 1;
            let traits = self.sampler.sample(rng);
            if !seen.insert(traits.canonical_key()) {
                continue;
            }
            items.push(GeneratedItem {
                id: ItemId(items.len() as u32 + 1),
                traits,
            });
        }

        let out = Generation {
            items,
            requested: count,
            attempts,
        };
        match out.underfill() {
            Some(u) => tracing::warn!(
                requested = u.requested,
                produced = u.produced,
                attempts = u.attempts,
                "attempt bound reached before collection was filled"
            ),
            None => tracing::debug!(count, attempts, "collection generated"),
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/unique.rs"]
mod tests;
