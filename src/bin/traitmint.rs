use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use traitmint::{
    ArchiveLayout, DirArchive, DirLayerSource, GeneratedItem, MemoryArchive,
    PackagingPipeline, Progress, ProjectConfig, TraitCatalog, UniquenessGuarantor,
    validate_items,
};

#[derive(Parser, Debug)]
#[command(name = "traitmint", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample a unique collection and write it as items JSON.
    Generate(GenerateArgs),
    /// Render and package a collection into a directory or `.tar.lz4` archive.
    Package(PackageArgs),
    /// Write blank metadata records for a collection that has not been generated yet.
    Placeholders(PlaceholderArgs),
    /// Check an items file against the catalog.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Project JSON.
    #[arg(long)]
    config: PathBuf,

    /// Output items JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Override `generation.count`.
    #[arg(long)]
    count: Option<usize>,

    /// Override `generation.seed`.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct PackageArgs {
    /// Project JSON.
    #[arg(long)]
    config: PathBuf,

    /// Root directory layer assets are resolved against. Defaults to the project file's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Items JSON from `generate`. A fresh collection is sampled when omitted.
    #[arg(long)]
    items: Option<PathBuf>,

    /// Output path. A `.tar.lz4` name writes one compressed archive, anything else a directory.
    #[arg(long)]
    out: PathBuf,

    /// Archive layout.
    #[arg(long, value_enum, default_value_t = LayoutChoice::Direct)]
    layout: LayoutChoice,
}

#[derive(Parser, Debug)]
struct PlaceholderArgs {
    /// Project JSON.
    #[arg(long)]
    config: PathBuf,

    /// Number of records. Defaults to `generation.count`.
    #[arg(long)]
    count: Option<usize>,

    /// Output path (`.tar.lz4` file or directory).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Project JSON.
    #[arg(long)]
    config: PathBuf,

    /// Items JSON to check.
    #[arg(long)]
    items: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutChoice {
    Direct,
    Shadow,
}

impl From<LayoutChoice> for ArchiveLayout {
    fn from(choice: LayoutChoice) -> Self {
        match choice {
            LayoutChoice::Direct => ArchiveLayout::Direct,
            LayoutChoice::Shadow => ArchiveLayout::Shadow,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Package(args) => cmd_package(args),
        Command::Placeholders(args) => cmd_placeholders(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn load_project(path: &Path) -> anyhow::Result<(ProjectConfig, TraitCatalog)> {
    let cfg = ProjectConfig::from_path(path)?;
    let catalog = cfg.validate()?;
    Ok((cfg, catalog))
}

fn read_items(path: &Path) -> anyhow::Result<Vec<GeneratedItem>> {
    let f = File::open(path).with_context(|| format!("open items '{}'", path.display()))?;
    let items = serde_json::from_reader(BufReader::new(f)).context("parse items JSON")?;
    Ok(items)
}

fn sample(
    cfg: &ProjectConfig,
    catalog: &TraitCatalog,
    count: usize,
    seed: Option<u64>,
) -> anyhow::Result<Vec<GeneratedItem>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let guarantor =
        UniquenessGuarantor::new(catalog)?.with_attempt_factor(cfg.generation.attempt_factor);
    let generation = guarantor.generate(count, &mut rng);
    if cfg.generation.allow_underfill {
        Ok(generation.items)
    } else {
        Ok(generation.into_full()?)
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let (cfg, catalog) = load_project(&args.config)?;
    let count = args.count.unwrap_or(cfg.generation.count);
    let items = sample(&cfg, &catalog, count, args.seed.or(cfg.generation.seed))?;

    let f = File::create(&args.out)
        .with_context(|| format!("create items file '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(f), &items).context("write items JSON")?;
    eprintln!("wrote {} items to {}", items.len(), args.out.display());
    Ok(())
}

fn is_archive_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(".tar.lz4"))
}

fn log_progress(p: &Progress) {
    let step = (p.total / 10).max(1);
    if p.current % step == 0 || p.current == p.total {
        tracing::info!(
            current = p.current,
            total = p.total,
            percent = format_args!("{:.1}", p.percentage),
            eta_s = format_args!("{:.1}", p.estimated_time_remaining),
            "progress"
        );
    }
}

fn cmd_package(args: PackageArgs) -> anyhow::Result<()> {
    let (cfg, catalog) = load_project(&args.config)?;
    let spec = cfg.render.surface_spec()?;
    let items = match &args.items {
        Some(path) => read_items(path)?,
        None => sample(&cfg, &catalog, cfg.generation.count, cfg.generation.seed)?,
    };

    let assets_root = match args.assets {
        Some(root) => root,
        None => args
            .config
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    let mut pipeline = PackagingPipeline::new(
        &catalog,
        DirLayerSource::new(assets_root),
        cfg.collection.clone(),
        cfg.packaging.pipeline_opts(),
    );
    let layout = ArchiveLayout::from(args.layout);
    let mut progress = log_progress;

    if is_archive_file(&args.out) {
        let sealed =
            pipeline.run(&items, &spec, layout, MemoryArchive::new(), Some(&mut progress))?;
        std::fs::write(&args.out, sealed.as_bytes())
            .with_context(|| format!("write archive '{}'", args.out.display()))?;
    } else {
        pipeline.run(
            &items,
            &spec,
            layout,
            DirArchive::create(&args.out)?,
            Some(&mut progress),
        )?;
    }

    let stats = pipeline.stats();
    eprintln!(
        "wrote {} ({} items, {} layers skipped)",
        args.out.display(),
        stats.items,
        stats.layers_skipped
    );
    Ok(())
}

fn cmd_placeholders(args: PlaceholderArgs) -> anyhow::Result<()> {
    let (cfg, catalog) = load_project(&args.config)?;
    let count = args.count.unwrap_or(cfg.generation.count);
    let mut pipeline = PackagingPipeline::new(
        &catalog,
        DirLayerSource::new("."),
        cfg.collection.clone(),
        cfg.packaging.pipeline_opts(),
    );

    if is_archive_file(&args.out) {
        let sealed = pipeline.run_placeholders(count, MemoryArchive::new())?;
        std::fs::write(&args.out, sealed.as_bytes())
            .with_context(|| format!("write archive '{}'", args.out.display()))?;
    } else {
        pipeline.run_placeholders(count, DirArchive::create(&args.out)?)?;
    }
    eprintln!("wrote {count} placeholder records to {}", args.out.display());
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let (_, catalog) = load_project(&args.config)?;
    let items = read_items(&args.items)?;
    let report = validate_items(&catalog, &items);
    if report.is_empty() {
        eprintln!("{} items ok", items.len());
        return Ok(());
    }
    for v in &report.violations {
        eprintln!("  {v}");
    }
    Err(traitmint::MintError::Invalid(report).into())
}
