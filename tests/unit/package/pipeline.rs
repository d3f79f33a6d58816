use std::io::Cursor;

use serde_json::json;

use super::*;
use crate::assets::source::MemoryLayerSource;
use crate::generate::combination::TraitCombination;
use crate::metadata::validate::Violation;
use crate::package::archive::MemoryArchive;

fn png(px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn catalog() -> TraitCatalog {
    TraitCatalog::from_value(json!({
        "categories": [
            { "name": "background", "required": true, "options": [
                { "name": "blue", "asset": "bg/blue.png" },
                { "name": "green", "asset": "bg/green.png" }
            ]},
            { "name": "hat", "options": [
                { "name": "none" },
                { "name": "cap", "asset": "hat/cap.png" }
            ]}
        ]
    }))
    .unwrap()
}

fn source() -> MemoryLayerSource {
    MemoryLayerSource::new()
        .with("bg/blue.png", png([0, 0, 255, 255]))
        .with("bg/green.png", png([0, 255, 0, 255]))
        .with("hat/cap.png", png([255, 0, 0, 255]))
}

fn info() -> CollectionInfo {
    CollectionInfo::new("Caps", "A small test collection", "ipfs://cid")
}

fn items() -> Vec<GeneratedItem> {
    [("blue", "none"), ("blue", "cap"), ("green", "none"), ("green", "cap")]
        .iter()
        .enumerate()
        .map(|(i, (bg, hat))| GeneratedItem {
            id: ItemId::from_index(i).unwrap(),
            traits: TraitCombination::from_pairs([("background", *bg), ("hat", *hat)]),
        })
        .collect()
}

#[test]
fn direct_run_deposits_in_order_with_progress() {
    let cat = catalog();
    let mut pipeline = PackagingPipeline::new(&cat, source(), info(), PipelineOpts::default());
    let spec = SurfaceSpec::lossless(4, 4).unwrap();

    let mut seen = Vec::new();
    let mut cb = |p: &Progress| seen.push(p.current);
    let sealed = pipeline
        .run(&items(), &spec, ArchiveLayout::Direct, MemoryArchive::new(), Some(&mut cb))
        .unwrap();

    assert_eq!(seen, vec![1, 2, 3, 4]);
    assert_eq!(sealed.len(), 8);
    for id in 1..=4 {
        assert!(sealed.read(&format!("images/{id}.png")).is_some());
        assert!(sealed.read(&format!("json/{id}")).is_some());
    }

    let stats = pipeline.stats();
    assert_eq!(stats.items, 4);
    assert_eq!(stats.layers_drawn, 6);
    assert_eq!(stats.layers_skipped, 0);
    assert_eq!(stats.batches, 2);
    assert!(stats.bytes_deposited > 0);
}

#[derive(Clone, Default)]
struct SharedSource(std::rc::Rc<std::cell::RefCell<MemoryLayerSource>>);

impl LayerSource for SharedSource {
    fn read(&self, asset: &str) -> MintResult<Vec<u8>> {
        self.0.borrow().read(asset)
    }
}

#[test]
fn each_run_reloads_layer_assets() {
    let cat = catalog();
    let shared = SharedSource::default();
    shared.0.borrow_mut().insert("bg/blue.png", png([0, 0, 255, 255]));
    shared.0.borrow_mut().insert("bg/green.png", png([0, 255, 0, 255]));
    let mut pipeline =
        PackagingPipeline::new(&cat, shared.clone(), info(), PipelineOpts::default());
    let spec = SurfaceSpec::lossless(4, 4).unwrap();

    pipeline
        .run(&items(), &spec, ArchiveLayout::Direct, MemoryArchive::new(), None)
        .unwrap();
    assert_eq!(pipeline.stats().layers_skipped, 2);

    shared.0.borrow_mut().insert("hat/cap.png", png([255, 0, 0, 255]));
    pipeline
        .run(&items(), &spec, ArchiveLayout::Direct, MemoryArchive::new(), None)
        .unwrap();
    assert_eq!(pipeline.stats().layers_skipped, 0);
    assert_eq!(pipeline.stats().layers_drawn, 6);
}

#[derive(Clone, Default)]
struct LogBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn item_stages_are_logged_in_order() {
    let logs = LogBuf::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let cat = catalog();
    let spec = SurfaceSpec::lossless(4, 4).unwrap();
    tracing::subscriber::with_default(subscriber, || {
        PackagingPipeline::new(&cat, source(), info(), PipelineOpts::default())
            .run(&items()[..1], &spec, ArchiveLayout::Direct, MemoryArchive::new(), None)
            .unwrap();
    });

    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let stages: Vec<&str> = text
        .lines()
        .filter(|l| l.contains("item stage") && l.contains("id=1 "))
        .filter_map(|l| l.split("stage=").nth(1))
        .filter_map(|rest| rest.split_whitespace().next())
        .collect();
    assert_eq!(stages, vec!["pending", "rendering", "encoded", "deposited"]);
}

#[test]
fn invalid_items_are_rejected_before_rendering() {
    let cat = catalog();
    let mut pipeline = PackagingPipeline::new(&cat, source(), info(), PipelineOpts::default());
    let spec = SurfaceSpec::lossless(4, 4).unwrap();
    let mut dup = items();
    dup[1].traits = dup[0].traits.clone();

    let err = pipeline
        .run(&dup, &spec, ArchiveLayout::Direct, MemoryArchive::new(), None)
        .unwrap_err();
    let MintError::Invalid(report) = err else {
        panic!("expected invalid collection, got {err:?}");
    };
    assert_eq!(report.violations.len(), 1);
    assert_eq!(pipeline.stats().items, 0);
}

#[test]
fn image_scheme_is_enforced() {
    let cat = catalog();
    let mut info = info();
    info.image_base_uri = "https://example.com".to_string();
    let mut pipeline = PackagingPipeline::new(&cat, source(), info, PipelineOpts::default());
    let spec = SurfaceSpec::lossless(4, 4).unwrap();
    let err = pipeline
        .run(&items(), &spec, ArchiveLayout::Direct, MemoryArchive::new(), None)
        .unwrap_err();
    assert!(matches!(err, MintError::Invalid(_)));
}

#[test]
fn item_failures_name_the_item_and_stage() {
    let cat = catalog();
    let src = MemoryLayerSource::new()
        .with("bg/blue.png", png([0, 0, 255, 255]))
        .with("hat/cap.png", png([255, 0, 0, 255]));
    let mut pipeline = PackagingPipeline::new(&cat, src, info(), PipelineOpts::default());
    let spec = SurfaceSpec::lossless(4, 4).unwrap();

    let err = pipeline
        .run(&items(), &spec, ArchiveLayout::Direct, MemoryArchive::new(), None)
        .unwrap_err();
    match &err {
        MintError::Item { id, stage, .. } => {
            assert_eq!(*id, ItemId(3));
            assert_eq!(*stage, ItemStage::Rendering);
        }
        other => panic!("expected item error, got {other:?}"),
    }
    assert!(matches!(err.root_cause(), MintError::EmptyRender(_)));
}

#[test]
fn cancellation_stops_at_batch_boundary() {
    let cat = catalog();
    let token = CancelToken::new();
    let opts = PipelineOpts {
        batch_size: 2,
        cancel: Some(token.clone()),
        ..PipelineOpts::default()
    };
    let mut pipeline = PackagingPipeline::new(&cat, source(), info(), opts);
    let spec = SurfaceSpec::lossless(4, 4).unwrap();

    let mut cb = |p: &Progress| {
        if p.current == 1 {
            token.cancel();
        }
    };
    let err = pipeline
        .run(&items(), &spec, ArchiveLayout::Direct, MemoryArchive::new(), Some(&mut cb))
        .unwrap_err();
    assert!(matches!(
        err,
        MintError::Cancelled {
            completed: 2,
            total: 4
        }
    ));
}

#[test]
fn placeholders_fill_metadata_folder() {
    let cat = catalog();
    let mut info = info();
    info.placeholder_image = "https://example.com/placeholder.png".to_string();
    let mut pipeline = PackagingPipeline::new(&cat, source(), info, PipelineOpts::default());

    let sealed = pipeline.run_placeholders(5, MemoryArchive::new()).unwrap();
    assert_eq!(sealed.len(), 5);
    let v: serde_json::Value = serde_json::from_slice(sealed.read("metadata/5").unwrap()).unwrap();
    assert_eq!(v["name"], "");
    assert_eq!(v["image"], "https://example.com/placeholder.png");
    assert_eq!(v["attributes"], json!([]));
    assert_eq!(pipeline.stats().batches, 2);
}

#[test]
fn placeholders_without_image_are_rejected() {
    let cat = catalog();
    let mut pipeline = PackagingPipeline::new(
        &cat,
        source(),
        CollectionInfo::new("Caps", "desc", "ipfs://cid"),
        PipelineOpts::default(),
    );
    let err = pipeline.run_placeholders(2, MemoryArchive::new()).unwrap_err();
    let MintError::Invalid(report) = err else {
        panic!("expected an invalid-collection error, got {err}");
    };
    assert_eq!(report.violations, vec![Violation::MissingPlaceholderImage]);
    assert_eq!(pipeline.stats().items, 0);
}

#[test]
fn placeholder_layout_is_not_an_item_run() {
    let cat = catalog();
    let mut pipeline = PackagingPipeline::new(&cat, source(), info(), PipelineOpts::default());
    let spec = SurfaceSpec::lossless(4, 4).unwrap();
    let err = pipeline
        .run(&items(), &spec, ArchiveLayout::Placeholder, MemoryArchive::new(), None)
        .unwrap_err();
    assert!(matches!(err, MintError::Validation(_)));
}

#[test]
fn zero_batch_size_is_rejected() {
    let cat = catalog();
    let opts = PipelineOpts {
        batch_size: 0,
        ..PipelineOpts::default()
    };
    let mut pipeline = PackagingPipeline::new(&cat, source(), info(), opts);
    assert!(pipeline.run_placeholders(1, MemoryArchive::new()).is_err());
}
