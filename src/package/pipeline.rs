use crate::assets::source::LayerSource;
use crate::catalog::model::TraitCatalog;
use crate::foundation::core::{ItemId, ItemStage, SurfaceSpec};
use crate::foundation::error::{MintError, MintResult};
use crate::generate::combination::GeneratedItem;
use crate::metadata::builder::MetadataBuilder;
use crate::metadata::record::CollectionInfo;
use crate::metadata::validate::{validate_items, validate_metadata, validate_placeholder};
use crate::package::archive::ArchiveSink;
use crate::package::layout::{self, ArchiveLayout, EntryName};
use crate::package::progress::{CancelToken, Progress, ProgressReporter, RunClock};
use crate::render::compositor::{Compositor, RenderedImage, ShadowStyle};

/// Options for [`PackagingPipeline`].
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Items rendered between two cooperative yield points.
    pub batch_size: usize,
    /// Extra yield cadence, in items, for shadow runs.
    pub shadow_yield_every: usize,
    /// Look of shadow placeholder renders.
    pub shadow_style: ShadowStyle,
    /// Checked at every batch boundary.
    pub cancel: Option<CancelToken>,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            batch_size: 3,
            shadow_yield_every: 10,
            shadow_style: ShadowStyle::default(),
            cancel: None,
        }
    }
}

/// Counters of the last run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackageStats {
    /// Items deposited.
    pub items: usize,
    /// Layers drawn across all renders.
    pub layers_drawn: usize,
    /// Layers skipped because their asset could not be loaded.
    pub layers_skipped: usize,
    /// Entry bytes handed to the archive.
    pub bytes_deposited: u64,
    /// Batches started.
    pub batches: usize,
}

/// Drives sample output through render, encode and deposit, one item at a time, in id order.
///
/// Any item failure aborts the archive; a failed run never returns a sealed archive.
pub struct PackagingPipeline<'a, S: LayerSource> {
    catalog: &'a TraitCatalog,
    compositor: Compositor<'a, S>,
    info: CollectionInfo,
    opts: PipelineOpts,
    stats: PackageStats,
}

impl<'a, S: LayerSource> PackagingPipeline<'a, S> {
    /// Create a pipeline reading layer assets from `source`.
    pub fn new(
        catalog: &'a TraitCatalog,
        source: S,
        info: CollectionInfo,
        opts: PipelineOpts,
    ) -> Self {
        Self {
            catalog,
            compositor: Compositor::new(catalog, source),
            info,
            opts,
            stats: PackageStats::default(),
        }
    }

    /// Counters of the last run.
    pub fn stats(&self) -> PackageStats {
        self.stats
    }

    /// Options in use.
    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Render and deposit `items` in `layout`, then seal `archive`.
    ///
    /// `on_progress` is called after every deposited item, in id order.
    #[tracing::instrument(skip_all, fields(items = items.len(), layout = ?layout))]
    pub fn run<A: ArchiveSink>(
        &mut self,
        items: &[GeneratedItem],
        spec: &SurfaceSpec,
        layout: ArchiveLayout,
        mut archive: A,
        on_progress: Option<&mut dyn FnMut(&Progress)>,
    ) -> MintResult<A::Sealed> {
        match self.run_items(items, spec, layout, &mut archive, on_progress) {
            Ok(()) => {
                let sealed = archive.seal()?;
                tracing::info!(
                    items = self.stats.items,
                    bytes = self.stats.bytes_deposited,
                    skipped_layers = self.stats.layers_skipped,
                    "archive sealed"
                );
                Ok(sealed)
            }
            Err(err) => {
                tracing::error!(error = %err, "run failed, archive discarded");
                archive.abort();
                Err(err)
            }
        }
    }

    /// Deposit `count` blank metadata records as `metadata/<id>`, then seal `archive`.
    #[tracing::instrument(skip_all, fields(count = count))]
    pub fn run_placeholders<A: ArchiveSink>(
        &mut self,
        count: usize,
        mut archive: A,
    ) -> MintResult<A::Sealed> {
        match self.run_blank(count, &mut archive) {
            Ok(()) => archive.seal(),
            Err(err) => {
                archive.abort();
                Err(err)
            }
        }
    }

    fn run_items<A: ArchiveSink>(
        &mut self,
        items: &[GeneratedItem],
        spec: &SurfaceSpec,
        layout: ArchiveLayout,
        archive: &mut A,
        mut on_progress: Option<&mut dyn FnMut(&Progress)>,
    ) -> MintResult<()> {
        if layout == ArchiveLayout::Placeholder {
            return Err(MintError::validation(
                "placeholder archives carry no items; use run_placeholders",
            ));
        }
        spec.validate()?;
        self.check_batching()?;

        let builder = MetadataBuilder::new(self.catalog, self.info.clone())
            .with_image_extension(spec.format.extension());
        self.preflight(&builder, items, layout)?;

        self.stats = PackageStats::default();
        self.compositor.clear_assets();
        for folder in layout.folders() {
            archive.create_folder(folder)?;
        }
        tracing::info!(total = items.len(), "packaging started");

        let clock = RunClock::start();
        let total = items.len();
        let mut completed = 0usize;
        for batch in items.chunks(self.opts.batch_size) {
            self.batch_boundary(completed, total)?;

            for item in batch {
                tracing::debug!(id = %item.id, stage = %ItemStage::Pending, "item stage");
                match layout {
                    ArchiveLayout::Shadow => self.package_shadow(item, spec, &builder, archive)?,
                    _ => self.package_direct(item, spec, &builder, archive)?,
                }
                completed += 1;
                self.stats.items = completed;

                if let Some(cb) = on_progress.as_deref_mut()
                    && let Some(p) = ProgressReporter::report(completed, total, clock.elapsed_secs())
                {
                    cb(&p);
                }
                if layout == ArchiveLayout::Shadow
                    && completed.is_multiple_of(self.opts.shadow_yield_every)
                {
                    tracing::debug!(completed, "shadow yield");
                    std::thread::yield_now();
                }
            }
        }
        Ok(())
    }

    fn run_blank<A: ArchiveSink>(&mut self, count: usize, archive: &mut A) -> MintResult<()> {
        self.check_batching()?;
        let builder = MetadataBuilder::new(self.catalog, self.info.clone());
        let placeholder = builder.empty();
        validate_placeholder(&placeholder).into_result()?;
        let record = placeholder.to_json_bytes()?;

        self.stats = PackageStats::default();
        archive.create_folder(layout::METADATA_DIR)?;
        let mut completed = 0usize;
        while completed < count {
            self.batch_boundary(completed, count)?;
            let end = (completed + self.opts.batch_size).min(count);
            for index in completed..end {
                let id = ItemId::from_index(index)?;
                self.deposit(archive, layout::placeholder(id), record.clone())
                    .map_err(|e| e.at_item(id, ItemStage::Encoded))?;
            }
            completed = end;
            self.stats.items = completed;
        }
        Ok(())
    }

    fn check_batching(&self) -> MintResult<()> {
        if self.opts.batch_size == 0 {
            return Err(MintError::validation("batch_size must be >= 1"));
        }
        if self.opts.shadow_yield_every == 0 {
            return Err(MintError::validation("shadow_yield_every must be >= 1"));
        }
        Ok(())
    }

    fn preflight(
        &self,
        builder: &MetadataBuilder<'_>,
        items: &[GeneratedItem],
        layout: ArchiveLayout,
    ) -> MintResult<()> {
        let mut report = validate_items(self.catalog, items);
        let scheme = Some(self.info.required_image_scheme.as_str()).filter(|s| !s.is_empty());
        for item in items {
            match layout {
                ArchiveLayout::Shadow => {
                    let records = builder.shadow(item);
                    report.merge(validate_metadata(item.id, &records.public, None));
                    report.merge(validate_metadata(item.id, &records.reveal.full_metadata, scheme));
                }
                _ => report.merge(validate_metadata(item.id, &builder.build(item), scheme)),
            }
        }
        if report.is_empty() {
            return Ok(());
        }
        tracing::warn!(violations = report.violations.len(), "collection rejected before packaging");
        Err(MintError::Invalid(report))
    }

    fn batch_boundary(&mut self, completed: usize, total: usize) -> MintResult<()> {
        if self
            .opts
            .cancel
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
        {
            tracing::info!(completed, total, "run cancelled");
            return Err(MintError::Cancelled { completed, total });
        }
        if self.stats.batches > 0 {
            std::thread::yield_now();
        }
        self.stats.batches += 1;
        Ok(())
    }

    fn package_direct<A: ArchiveSink>(
        &mut self,
        item: &GeneratedItem,
        spec: &SurfaceSpec,
        builder: &MetadataBuilder<'_>,
        archive: &mut A,
    ) -> MintResult<()> {
        let id = item.id;
        let rendered = self.render_item(item, |c| c.render(&item.traits, spec))?;

        let json = builder
            .build(item)
            .to_json_bytes()
            .map_err(|e| e.at_item(id, ItemStage::Encoded))?;
        self.deposit(archive, layout::direct_image(id, spec.format), rendered.bytes)
            .and_then(|()| self.deposit(archive, layout::direct_json(id), json))
            .map_err(|e| e.at_item(id, ItemStage::Encoded))?;

        tracing::debug!(id = %id, stage = %ItemStage::Deposited, "item stage");
        Ok(())
    }

    fn package_shadow<A: ArchiveSink>(
        &mut self,
        item: &GeneratedItem,
        spec: &SurfaceSpec,
        builder: &MetadataBuilder<'_>,
        archive: &mut A,
    ) -> MintResult<()> {
        let id = item.id;
        let style = self.opts.shadow_style.clone();
        let rendered = self.render_item(item, |c| c.render_shadow(&item.traits, spec, &style))?;

        let records = builder.shadow(item);
        let public = records
            .public
            .to_json_bytes()
            .map_err(|e| e.at_item(id, ItemStage::Encoded))?;
        let reveal = records
            .reveal
            .to_json_bytes()
            .map_err(|e| e.at_item(id, ItemStage::Encoded))?;
        self.deposit(archive, layout::shadow_image(id), rendered.bytes)
            .and_then(|()| self.deposit(archive, layout::shadow_metadata(id), public))
            .and_then(|()| self.deposit(archive, layout::reveal_record(id), reveal))
            .map_err(|e| e.at_item(id, ItemStage::Encoded))?;

        tracing::debug!(id = %id, stage = %ItemStage::Deposited, "item stage");
        Ok(())
    }

    fn render_item(
        &mut self,
        item: &GeneratedItem,
        render: impl FnOnce(&mut Compositor<'a, S>) -> MintResult<RenderedImage>,
    ) -> MintResult<RenderedImage> {
        tracing::debug!(id = %item.id, stage = %ItemStage::Rendering, "item stage");
        let rendered =
            render(&mut self.compositor).map_err(|e| e.at_item(item.id, ItemStage::Rendering))?;
        self.stats.layers_drawn += rendered.layers_drawn;
        self.stats.layers_skipped += rendered.warnings.len();
        tracing::debug!(
            id = %item.id,
            stage = %ItemStage::Encoded,
            bytes = rendered.bytes.len(),
            skipped = rendered.warnings.len(),
            "item stage"
        );
        Ok(rendered)
    }

    fn deposit<A: ArchiveSink>(
        &mut self,
        archive: &mut A,
        entry: EntryName,
        bytes: Vec<u8>,
    ) -> MintResult<()> {
        let len = bytes.len() as u64;
        archive.deposit(entry.folder, &entry.file, bytes)?;
        self.stats.bytes_deposited += len;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/package/pipeline.rs"]
mod tests;
