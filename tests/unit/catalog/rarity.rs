use super::*;

#[test]
fn unlisted_options_fall_back_to_default() {
    let table = RarityTable::default().with("hat", "crown", 5);
    assert_eq!(table.weight("hat", "crown"), 5);
    assert_eq!(table.weight("hat", "cap"), DEFAULT_WEIGHT);
    assert_eq!(table.weight("eyes", "crown"), DEFAULT_WEIGHT);
}

#[test]
fn zero_weight_is_kept_not_defaulted() {
    let table = RarityTable::new(7).with("hat", "cap", 0);
    assert_eq!(table.weight("hat", "cap"), 0);
    assert_eq!(table.default_weight(), 7);
    assert_eq!(table.overrides().collect::<Vec<_>>(), vec![("hat", "cap", 0)]);
}
