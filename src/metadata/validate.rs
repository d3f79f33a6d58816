use std::collections::HashMap;

use crate::catalog::model::TraitCatalog;
use crate::foundation::core::ItemId;
use crate::foundation::error::{MintError, MintResult};
use crate::generate::combination::GeneratedItem;
use crate::metadata::record::Metadata;

/// One problem found while checking a collection or its metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// Ids are not `1..=n` in order.
    NonDenseId {
        /// 0-based position in the collection.
        position: usize,
        /// Id expected at that position.
        expected: ItemId,
        /// Id actually found.
        found: ItemId,
    },
    /// Two items share a canonical trait key.
    DuplicateCombination {
        /// Later item.
        id: ItemId,
        /// Earlier item with the same key.
        first: ItemId,
    },
    /// A catalog category has no entry in the item.
    MissingCategory {
        /// Item.
        id: ItemId,
        /// Category name.
        category: String,
    },
    /// The item names a category or option the catalog does not define.
    UnknownTrait {
        /// Item.
        id: ItemId,
        /// Category name.
        category: String,
        /// Option name.
        option: String,
    },
    /// A required category resolved to the empty sentinel.
    RequiredEmpty {
        /// Item.
        id: ItemId,
        /// Category name.
        category: String,
    },
    /// More than one member of an exclusion group is non-empty.
    ExclusionConflict {
        /// Item.
        id: ItemId,
        /// Non-empty members.
        categories: Vec<String>,
    },
    /// A required metadata field is blank.
    MissingField {
        /// Item.
        id: ItemId,
        /// Field name.
        field: &'static str,
    },
    /// The image reference does not use the required scheme.
    ImageScheme {
        /// Item.
        id: ItemId,
        /// Offending reference.
        image: String,
        /// Required scheme prefix.
        scheme: String,
    },
    /// An empty placeholder record has no image to point at.
    MissingPlaceholderImage,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonDenseId {
                position,
                expected,
                found,
            } => write!(f, "position {position}: expected id {expected}, found {found}"),
            Self::DuplicateCombination { id, first } => {
                write!(f, "item {id}: same traits as item {first}")
            }
            Self::MissingCategory { id, category } => {
                write!(f, "item {id}: no entry for category '{category}'")
            }
            Self::UnknownTrait {
                id,
                category,
                option,
            } => write!(f, "item {id}: unknown trait '{category}:{option}'"),
            Self::RequiredEmpty { id, category } => {
                write!(f, "item {id}: required category '{category}' is empty")
            }
            Self::ExclusionConflict { id, categories } => write!(
                f,
                "item {id}: exclusive categories set together: {}",
                categories.join(", ")
            ),
            Self::MissingField { id, field } => write!(f, "item {id}: '{field}' is blank"),
            Self::ImageScheme { id, image, scheme } => {
                write!(f, "item {id}: image '{image}' does not start with '{scheme}'")
            }
            Self::MissingPlaceholderImage => {
                write!(f, "placeholder records need a non-blank placeholder_image")
            }
        }
    }
}

/// Every violation found by a check, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Violations found.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Return `true` when nothing was found.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Append the violations of `other`.
    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }

    /// `Ok(())` when clean, otherwise [`MintError::Invalid`] carrying the whole report.
    pub fn into_result(self) -> MintResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MintError::Invalid(self))
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} violation(s)", self.violations.len())?;
        for v in &self.violations {
            write!(f, "; {v}")?;
        }
        Ok(())
    }
}

/// Check ids are dense and 1-indexed, combinations distinct and consistent with `catalog`.
pub fn validate_items(catalog: &TraitCatalog, items: &[GeneratedItem]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut first_by_key = HashMap::<String, ItemId>::with_capacity(items.len());

    for (position, item) in items.iter().enumerate() {
        let expected = ItemId(position as u32 + 1);
        if item.id != expected {
            report.violations.push(Violation::NonDenseId {
                position,
                expected,
                found: item.id,
            });
        }

        if let Some(&first) = first_by_key.get(&item.traits.canonical_key()) {
            report.violations.push(Violation::DuplicateCombination { id: item.id, first });
        } else {
            first_by_key.insert(item.traits.canonical_key(), item.id);
        }

        check_traits(catalog, item, &mut report);
    }
    report
}

fn check_traits(catalog: &TraitCatalog, item: &GeneratedItem, report: &mut ValidationReport) {
    let id = item.id;
    for cat in catalog.categories() {
        match item.traits.get(&cat.name) {
            None => report.violations.push(Violation::MissingCategory {
                id,
                category: cat.name.clone(),
            }),
            Some(opt) if cat.required && catalog.is_empty_option(opt) => {
                report.violations.push(Violation::RequiredEmpty {
                    id,
                    category: cat.name.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for (category, option) in item.traits.iter() {
        let known = catalog.category(category).is_some()
            && (catalog.is_empty_option(option) || catalog.option(category, option).is_some());
        if !known {
            report.violations.push(Violation::UnknownTrait {
                id,
                category: category.to_string(),
                option: option.to_string(),
            });
        }
    }

    for group in catalog.exclusion_groups() {
        let occupied: Vec<String> = group
            .members
            .iter()
            .map(|&m| &catalog.categories()[m].name)
            .filter(|name| {
                item.traits
                    .get(name)
                    .is_some_and(|o| !catalog.is_empty_option(o))
            })
            .cloned()
            .collect();
        if occupied.len() > 1 {
            report.violations.push(Violation::ExclusionConflict {
                id,
                categories: occupied,
            });
        }
    }
}

/// Check required fields of a metadata record and, when given, the image scheme.
pub fn validate_metadata(id: ItemId, md: &Metadata, scheme: Option<&str>) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (field, value) in [
        ("name", &md.name),
        ("description", &md.description),
        ("image", &md.image),
    ] {
        if value.trim().is_empty() {
            report.violations.push(Violation::MissingField { id, field });
        }
    }
    if let Some(scheme) = scheme
        && !md.image.is_empty()
        && !md.image.starts_with(scheme)
    {
        report.violations.push(Violation::ImageScheme {
            id,
            image: md.image.clone(),
            scheme: scheme.to_string(),
        });
    }
    report
}

/// Check an empty placeholder record. Every field may be blank except `image`.
pub fn validate_placeholder(md: &Metadata) -> ValidationReport {
    let mut report = ValidationReport::default();
    if md.image.trim().is_empty() {
        report.violations.push(Violation::MissingPlaceholderImage);
    }
    report
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/validate.rs"]
mod tests;
