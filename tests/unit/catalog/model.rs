use serde_json::json;

use super::*;

fn base() -> serde_json::Value {
    json!({
        "categories": [
            { "name": "background", "required": true, "options": [
                { "name": "blue", "asset": "bg/blue.png" },
                { "name": "red", "asset": "bg/red.png" }
            ]},
            { "name": "shirt", "options": [
                { "name": "none" },
                { "name": "tee", "asset": "shirt/tee.png" }
            ]},
            { "name": "hoodie", "options": [
                { "name": "none" },
                { "name": "grey", "asset": "hoodie/grey.png" }
            ]}
        ],
        "rarity": { "background": { "red": 0 } },
        "exclusion_groups": [["shirt", "hoodie"]]
    })
}

fn with(mut v: serde_json::Value, f: impl FnOnce(&mut serde_json::Value)) -> serde_json::Value {
    f(&mut v);
    v
}

#[test]
fn builds_layer_order_and_lookups() {
    let cat = TraitCatalog::from_value(base()).unwrap();
    let names: Vec<_> = cat.categories().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["background", "shirt", "hoodie"]);
    assert_eq!(cat.category("hoodie").unwrap().layer, 2);
    assert_eq!(cat.empty_sentinel(), "none");
    assert!(cat.is_empty_option("none"));
    assert_eq!(
        cat.option("shirt", "tee").unwrap().asset.as_deref(),
        Some("shirt/tee.png")
    );
    assert_eq!(cat.exclusion_groups()[0].members, vec![1, 2]);
    assert_eq!(cat.weight(cat.category("background").unwrap(), "red"), 0);
    // background: blue only (red weight 0); shirt 2; hoodie 2
    assert_eq!(cat.combination_space_upper_bound(), 4);
}

#[test]
fn zero_total_weight_is_configuration_error() {
    let v = with(base(), |v| {
        v["rarity"]["background"]["blue"] = json!(0);
    });
    let err = TraitCatalog::from_value(v).unwrap_err();
    assert!(matches!(err, MintError::Configuration(_)));
    assert!(err.to_string().contains("background"));
}

#[test]
fn required_category_needs_non_empty_weight() {
    let v = json!({
        "categories": [{ "name": "bg", "required": true, "options": [{ "name": "none" }] }]
    });
    assert!(matches!(
        TraitCatalog::from_value(v),
        Err(MintError::Configuration(_))
    ));
}

#[test]
fn rejects_unknown_references() {
    let v = with(base(), |v| {
        v["rarity"]["hat"] = json!({ "crown": 1 });
    });
    assert!(TraitCatalog::from_value(v).is_err());

    let v = with(base(), |v| {
        v["rarity"]["shirt"] = json!({ "polo": 1 });
    });
    assert!(TraitCatalog::from_value(v).is_err());

    let v = with(base(), |v| {
        v["exclusion_groups"] = json!([["shirt", "cape"]]);
    });
    assert!(TraitCatalog::from_value(v).is_err());
}

#[test]
fn rejects_required_member_in_exclusion_group() {
    let v = with(base(), |v| {
        v["exclusion_groups"] = json!([["background", "shirt"]]);
    });
    let err = TraitCatalog::from_value(v).unwrap_err();
    assert!(err.to_string().contains("required category"));
}

#[test]
fn rejects_duplicates_and_missing_assets() {
    let v = with(base(), |v| {
        v["categories"][1]["options"][1] = json!({ "name": "none" });
    });
    assert!(TraitCatalog::from_value(v).is_err());

    let v = with(base(), |v| {
        v["categories"][1]["options"][1] = json!({ "name": "tee" });
    });
    assert!(TraitCatalog::from_value(v).is_err());

    let v = with(base(), |v| {
        v["categories"][2]["name"] = json!("shirt");
    });
    assert!(TraitCatalog::from_value(v).is_err());
}

#[test]
fn rejects_key_separators_in_names() {
    let v = with(base(), |v| {
        v["categories"][1]["options"][1]["name"] = json!("p|hoodie:grey");
    });
    assert!(matches!(
        TraitCatalog::from_value(v),
        Err(MintError::Configuration(_))
    ));

    let v = with(base(), |v| {
        v["categories"][2]["name"] = json!("hood:ie");
    });
    assert!(matches!(
        TraitCatalog::from_value(v),
        Err(MintError::Configuration(_))
    ));

    let v = with(base(), |v| {
        v["empty_sentinel"] = json!("no|ne");
    });
    assert!(TraitCatalog::from_value(v).is_err());
}
