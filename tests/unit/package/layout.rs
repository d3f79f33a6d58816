use super::*;

#[test]
fn direct_entries_follow_format() {
    let id = ItemId(7);
    assert_eq!(
        ArchiveLayout::Direct.entry_paths(id, OutputFormat::Lossless),
        vec!["images/7.png", "json/7"]
    );
    assert_eq!(
        direct_image(id, OutputFormat::Lossy { quality: 0.8 }).path(),
        "images/7.jpg"
    );
}

#[test]
fn shadow_entries_always_png_and_json() {
    let id = ItemId(12);
    assert_eq!(
        ArchiveLayout::Shadow.entry_paths(id, OutputFormat::Lossy { quality: 0.5 }),
        vec!["shadows/12.png", "metadata/12.json", "reveal_data/12.json"]
    );
    assert_eq!(shadow_image_path(id), "shadows/12.png");
}

#[test]
fn placeholder_entries_have_no_extension() {
    assert_eq!(
        ArchiveLayout::Placeholder.entry_paths(ItemId(3), OutputFormat::Lossless),
        vec!["metadata/3"]
    );
    assert_eq!(ArchiveLayout::Placeholder.folders(), &[METADATA_DIR]);
}
