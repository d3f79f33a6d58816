use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "traitmint_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn memory_archive_seals_readable_blob() {
    let mut a = MemoryArchive::new();
    a.create_folder("images").unwrap();
    a.create_folder("json").unwrap();
    a.deposit("images", "1.png", vec![1, 2, 3]).unwrap();
    a.deposit("json", "1", b"{}".to_vec()).unwrap();
    assert!(a.buffered_len() > 0);

    let sealed = a.seal().unwrap();
    assert_eq!(sealed.len(), 2);
    assert_eq!(sealed.folders(), ["images".to_string(), "json".to_string()]);
    assert_eq!(sealed.read("images/1.png"), Some(&[1u8, 2, 3][..]));
    assert_eq!(sealed.read("json/1"), Some(&b"{}"[..]));
    assert_eq!(sealed.read("json/2"), None);
    assert_eq!(
        sealed.entry_names().collect::<Vec<_>>(),
        vec!["images/1.png", "json/1"]
    );

    let reopened = SealedArchive::from_bytes(sealed.into_bytes()).unwrap();
    assert_eq!(reopened.len(), 2);
}

#[test]
fn sealed_blob_is_lz4_compressed_tar() {
    let mut a = MemoryArchive::new();
    a.create_folder("json").unwrap();
    for id in 1..=50 {
        a.deposit("json", &id.to_string(), vec![b'x'; 100]).unwrap();
    }
    let tar_len = a.buffered_len();

    let sealed = a.seal().unwrap();
    let blob = sealed.as_bytes();
    assert_eq!(&blob[..4], &[0x04, 0x22, 0x4d, 0x18]);
    assert!((blob.len() as u64) < tar_len / 4);
    assert_eq!(sealed.tar_bytes().len() as u64, tar_len + 1024);
    assert_eq!(&sealed.tar_bytes()[..5], b"json/");
    assert_eq!(sealed.read("json/50"), Some(&[b'x'; 100][..]));
}

#[test]
fn garbage_blob_is_rejected() {
    assert!(matches!(
        SealedArchive::from_bytes(b"json/1 not an archive".to_vec()),
        Err(MintError::ArchiveDeposit(_))
    ));
}

#[test]
fn deposit_requires_folder_and_unique_names() {
    let mut a = MemoryArchive::new();
    assert!(matches!(
        a.deposit("json", "1", vec![]),
        Err(MintError::ArchiveDeposit(_))
    ));
    a.create_folder("json").unwrap();
    a.create_folder("json").unwrap();
    a.deposit("json", "1", vec![]).unwrap();
    assert!(a.deposit("json", "1", vec![]).is_err());
    assert!(a.deposit("json", "../x", vec![]).is_err());
    assert!(a.create_folder("a/b").is_err());
}

#[test]
fn dir_archive_appears_only_on_seal() {
    let root = temp_dir("dir_archive_seal");
    std::fs::create_dir_all(&root).unwrap();
    let target = root.join("out");

    let mut a = DirArchive::create(&target).unwrap();
    a.create_folder("metadata").unwrap();
    a.deposit("metadata", "1", b"{}".to_vec()).unwrap();
    assert!(!target.exists());

    let sealed = a.seal().unwrap();
    assert_eq!(sealed, target);
    assert_eq!(std::fs::read(target.join("metadata/1")).unwrap(), b"{}");
    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 1);

    assert!(DirArchive::create(&target).is_err());
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn dir_archive_abort_and_drop_leave_nothing() {
    let root = temp_dir("dir_archive_abort");
    std::fs::create_dir_all(&root).unwrap();

    let mut a = DirArchive::create(root.join("aborted")).unwrap();
    a.create_folder("images").unwrap();
    a.deposit("images", "1.png", vec![0]).unwrap();
    a.abort();

    {
        let mut b = DirArchive::create(root.join("dropped")).unwrap();
        b.create_folder("images").unwrap();
    }

    assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    std::fs::remove_dir_all(&root).ok();
}
