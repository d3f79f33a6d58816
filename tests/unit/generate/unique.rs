use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

use super::*;

fn catalog_with_space(colors: usize) -> TraitCatalog {
    let options: Vec<_> = (0..colors)
        .map(|i| json!({ "name": format!("c{i}"), "asset": format!("bg/c{i}.png") }))
        .collect();
    TraitCatalog::from_value(json!({
        "categories": [{ "name": "background", "required": true, "options": options }]
    }))
    .unwrap()
}

fn big_catalog() -> TraitCatalog {
    TraitCatalog::from_value(json!({
        "categories": [
            { "name": "background", "required": true, "options": [
                { "name": "a", "asset": "a.png" }, { "name": "b", "asset": "b.png" },
                { "name": "c", "asset": "c.png" }, { "name": "d", "asset": "d.png" }
            ]},
            { "name": "eyes", "options": [
                { "name": "none" }, { "name": "x", "asset": "x.png" },
                { "name": "y", "asset": "y.png" }, { "name": "z", "asset": "z.png" }
            ]},
            { "name": "hat", "options": [
                { "name": "none" }, { "name": "p", "asset": "p.png" },
                { "name": "q", "asset": "q.png" }, { "name": "r", "asset": "r.png" }
            ]}
        ]
    }))
    .unwrap()
}

#[test]
fn ids_are_dense_and_keys_distinct() {
    let catalog = big_catalog();
    let guarantor = UniquenessGuarantor::new(&catalog).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let generation = guarantor.generate(40, &mut rng);

    assert!(generation.is_complete());
    assert_eq!(generation.items.len(), 40);
    let keys: HashSet<_> = generation
        .items
        .iter()
        .map(|i| i.traits.canonical_key())
        .collect();
    assert_eq!(keys.len(), 40);
    for (i, item) in generation.items.iter().enumerate() {
        assert_eq!(item.id, ItemId(i as u32 + 1));
    }
}

#[test]
fn small_space_underfills_within_bound() {
    let catalog = catalog_with_space(3);
    let guarantor = UniquenessGuarantor::new(&catalog).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let generation = guarantor.generate(5, &mut rng);

    assert_eq!(generation.items.len(), 3);
    assert_eq!(generation.attempts, 50);
    let u = generation.underfill().unwrap();
    assert_eq!(u.requested, 5);
    assert_eq!(u.produced, 3);

    let err = generation.into_full().unwrap_err();
    assert!(matches!(err, MintError::Underfill(_)));
}

#[test]
fn attempt_factor_is_configurable() {
    let catalog = catalog_with_space(3);
    let guarantor = UniquenessGuarantor::new(&catalog)
        .unwrap()
        .with_attempt_factor(1);
    assert_eq!(guarantor.max_attempts(5), 5);
    let mut rng = StdRng::seed_from_u64(5);
    let generation = guarantor.generate(5, &mut rng);
    assert!(generation.attempts <= 5);
    assert!(!generation.is_complete());

    let zero = UniquenessGuarantor::new(&catalog)
        .unwrap()
        .with_attempt_factor(0);
    assert_eq!(zero.max_attempts(4), 4);
}

#[test]
fn zero_count_is_empty_and_complete() {
    let catalog = catalog_with_space(2);
    let guarantor = UniquenessGuarantor::new(&catalog).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let generation = guarantor.generate(0, &mut rng);
    assert!(generation.items.is_empty());
    assert!(generation.is_complete());
    assert_eq!(generation.attempts, 0);
}

#[test]
fn runs_do_not_share_seen_keys() {
    let catalog = catalog_with_space(3);
    let guarantor = UniquenessGuarantor::new(&catalog).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let first = guarantor.generate(3, &mut rng);
    let second = guarantor.generate(3, &mut rng);
    assert!(first.is_complete());
    assert!(second.is_complete());
}
