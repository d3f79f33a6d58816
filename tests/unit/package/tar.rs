use super::*;

fn build(f: impl FnOnce(&mut TarWriter<Vec<u8>>)) -> Vec<u8> {
    let mut w = TarWriter::new(Vec::new());
    f(&mut w);
    w.finish().unwrap()
}

#[test]
fn entries_are_block_aligned_and_indexed() {
    let bytes = build(|w| {
        w.append_dir("images").unwrap();
        w.append_file("images/1.png", b"hello").unwrap();
        w.append_file("json/1", &[7u8; 600]).unwrap();
    });
    assert_eq!(bytes.len() % 512, 0);
    // 3 headers + 1 + 2 data blocks + 2 end blocks
    assert_eq!(bytes.len(), 512 * 8);

    let entries = read_entries(&bytes).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].path, "images/");
    assert!(entries[0].is_dir);
    assert_eq!(entries[1].path, "images/1.png");
    assert_eq!(&bytes[entries[1].offset..entries[1].offset + entries[1].len], b"hello");
    assert_eq!(entries[2].len, 600);
}

#[test]
fn header_carries_ustar_magic() {
    let bytes = build(|w| w.append_file("a", b"x").unwrap());
    assert_eq!(&bytes[257..263], b"ustar\0");
    assert_eq!(bytes[156], b'0');
}

#[test]
fn long_paths_use_the_prefix_field() {
    let dir = "d".repeat(80);
    let path = format!("{dir}/{}", "f".repeat(60));
    let bytes = build(|w| w.append_file(&path, b"z").unwrap());
    let entries = read_entries(&bytes).unwrap();
    assert_eq!(entries[0].path, path);
}

#[test]
fn unsplittable_paths_are_rejected() {
    let mut w = TarWriter::new(Vec::new());
    let err = w.append_file(&"x".repeat(120), b"").unwrap_err();
    assert!(matches!(err, MintError::ArchiveDeposit(_)));
}

#[test]
fn corrupted_header_fails_checksum() {
    let mut bytes = build(|w| w.append_file("a", b"x").unwrap());
    bytes[0] = b'b';
    assert!(read_entries(&bytes).is_err());
}

#[test]
fn output_is_deterministic() {
    let a = build(|w| w.append_file("a/b", b"same").unwrap());
    let b = build(|w| w.append_file("a/b", b"same").unwrap());
    assert_eq!(a, b);
}
