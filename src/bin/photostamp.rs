use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "photostamp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite one photo and write a JPEG.
    Compose(ComposeArgs),
    /// Composite every entry of a JSON manifest in parallel.
    Batch(BatchArgs),
    /// Print which band font the configuration resolves to.
    Fonts(FontsArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Compositor config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset root override (stickers/, packages/, fonts/).
    #[arg(long)]
    assets: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Source photo (any common raster format).
    #[arg(long)]
    photo: PathBuf,

    /// Annotation set JSON.
    #[arg(long)]
    annotations: PathBuf,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// JSON array of `{ "photo", "annotations", "out" }`; paths are relative to the manifest.
    #[arg(long)]
    manifest: PathBuf,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct FontsArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Deserialize, Debug)]
struct ManifestEntry {
    photo: PathBuf,
    annotations: PathBuf,
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Batch(args) => cmd_batch(args),
        Command::Fonts(args) => cmd_fonts(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<photostamp::CompositorConfig> {
    let config = match &args.config {
        Some(path) => photostamp::CompositorConfig::from_json_file(path)?,
        None => photostamp::CompositorConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(root) = &args.assets {
        config.asset_root = root.clone();
    }
    Ok(config)
}

fn read_annotations(path: &Path) -> anyhow::Result<photostamp::AnnotationSet> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read annotations '{}'", path.display()))?;
    Ok(photostamp::AnnotationSet::from_json(&json)?)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write jpeg '{}'", path.display()))
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let compositor = photostamp::Compositor::new(load_config(&args.config)?)?;
    let photo = std::fs::read(&args.photo)
        .with_context(|| format!("read photo '{}'", args.photo.display()))?;
    let annotations = read_annotations(&args.annotations)?;

    let jpeg = compositor.composite(&photo, &annotations)?;
    write_output(&args.out, &jpeg)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let compositor = photostamp::Compositor::new(load_config(&args.config)?)?;
    let base = args.manifest.parent().unwrap_or_else(|| Path::new("."));
    let f = std::fs::File::open(&args.manifest)
        .with_context(|| format!("open manifest '{}'", args.manifest.display()))?;
    let entries: Vec<ManifestEntry> = serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| "parse manifest JSON")?;

    // Entries whose inputs cannot be read fail on their own; the rest still run.
    let mut jobs = Vec::with_capacity(entries.len());
    let mut loaded = Vec::with_capacity(entries.len());
    for e in &entries {
        match load_job(base, e) {
            Ok(job) => {
                jobs.push(job);
                loaded.push(Ok(()));
            }
            Err(err) => loaded.push(Err(err)),
        }
    }

    let mut results = compositor.composite_batch(&jobs, args.threads)?.into_iter();
    let mut failed = 0usize;
    for (entry, load) in entries.iter().zip(loaded) {
        let outcome = load.and_then(|()| {
            let jpeg = results
                .next()
                .context("batch returned fewer results than jobs")??;
            let out = base.join(&entry.out);
            write_output(&out, &jpeg)?;
            Ok(out)
        });
        match outcome {
            Ok(out) => eprintln!("wrote {}", out.display()),
            Err(e) => {
                failed += 1;
                eprintln!("failed {}: {e:#}", entry.photo.display());
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} photos failed", entries.len());
    }
    Ok(())
}

fn load_job(base: &Path, entry: &ManifestEntry) -> anyhow::Result<photostamp::CompositeJob> {
    let photo_path = base.join(&entry.photo);
    let photo = std::fs::read(&photo_path)
        .with_context(|| format!("read photo '{}'", photo_path.display()))?;
    let annotations = read_annotations(&base.join(&entry.annotations))?;
    Ok(photostamp::CompositeJob { photo, annotations })
}

fn cmd_fonts(args: FontsArgs) -> anyhow::Result<()> {
    let compositor = photostamp::Compositor::new(load_config(&args.config)?)?;
    println!("{}", compositor.font_description());
    Ok(())
}
