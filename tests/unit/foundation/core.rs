use super::*;

#[test]
fn item_ids_are_one_indexed() {
    assert_eq!(ItemId::from_index(0).unwrap(), ItemId::FIRST);
    assert_eq!(ItemId::from_index(49).unwrap(), ItemId(50));
    assert_eq!(ItemId(50).index(), 49);
    assert_eq!(ItemId(3).to_string(), "3");
}

#[test]
fn surface_spec_rejects_zero_size_and_bad_quality() {
    assert!(SurfaceSpec::lossless(0, 10).is_err());
    assert!(SurfaceSpec::new(8, 8, OutputFormat::Lossy { quality: 1.5 }).is_err());
    assert!(SurfaceSpec::new(8, 8, OutputFormat::Lossy { quality: 0.0 }).is_ok());

    let spec = SurfaceSpec::lossless(4, 2).unwrap();
    assert_eq!(spec.byte_len(), 32);
    assert_eq!(spec.full_rect().width, 4);
}

#[test]
fn format_extensions() {
    assert_eq!(OutputFormat::Lossless.extension(), "png");
    assert_eq!(OutputFormat::Lossy { quality: 0.8 }.extension(), "jpg");
}
