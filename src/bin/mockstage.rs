use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use mockstage::{CanvasSize, ExportImage, FrameCatalog, Project, SoftwareRenderer};

#[derive(Parser, Debug)]
#[command(name = "mockstage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the whole canvas as a PNG.
    Scene(SceneArgs),
    /// Render one composition alone, without its canvas placement.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Pixel-density multiplier for the export.
    #[arg(long, default_value_t = 4.0)]
    pixel_ratio: f64,

    /// Frame catalog JSON; the builtin catalog is used when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Composition index in project order (0-based).
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Frame catalog JSON; the builtin catalog is used when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Scene(args) => cmd_scene(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn cmd_scene(args: SceneArgs) -> anyhow::Result<()> {
    let mut studio = load_studio(&args.in_path, args.catalog.as_deref())?;
    let img = studio.export_scene(args.pixel_ratio)?;
    write_png(&args.out, img)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut studio = load_studio(&args.in_path, args.catalog.as_deref())?;

    let id = studio
        .scene()
        .compositions()
        .get(args.index)
        .map(|c| c.id)
        .with_context(|| format!("project has no composition at index {}", args.index))?;
    studio.select_composition(Some(id))?;

    let img = studio
        .export_selected_frame()?
        .context("no composition selected for frame export")?;
    write_png(&args.out, img)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn load_studio(
    in_path: &Path,
    catalog: Option<&Path>,
) -> anyhow::Result<mockstage::Studio<SoftwareRenderer>> {
    let project = Project::from_path(in_path)?;
    let catalog = match catalog {
        Some(path) => FrameCatalog::from_path(path)?,
        None => FrameCatalog::builtin(),
    };
    let assets_root = in_path.parent().unwrap_or_else(|| Path::new("."));

    let canvas = project
        .config
        .as_ref()
        .map(|c| c.canvas)
        .unwrap_or(CanvasSize {
            width: 900,
            height: 600,
        });
    let backend = SoftwareRenderer::new(canvas);
    Ok(project.build(backend, catalog, assets_root)?)
}

fn write_png(path: &Path, img: ExportImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let (width, height) = (img.width, img.height);
    let data = img.into_straight_rgba();
    image::save_buffer_with_format(
        path,
        &data,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
