use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use sketchbook::{
    BackgroundFit, Canvas, DirectoryExportSink, DrawingSession, DrawingSurface, Intent, Page,
    Point, Rgba8, SessionOpts, Stroke, VectorSurface,
};

#[derive(Parser, Debug)]
#[command(name = "sketchbook", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON drawing script through a session and write its exports and pages.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Input script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory (receives `exports/` and `pages/`).
    #[arg(long)]
    out: PathBuf,

    /// JPEG quality for page composites (overrides the script).
    #[arg(long)]
    quality: Option<u8>,

    /// Raster scale in pixels per point (overrides the script).
    #[arg(long)]
    scale: Option<f64>,

    /// Template fit mode (overrides the script).
    #[arg(long, value_enum)]
    fit: Option<FitChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FitChoice {
    Stretch,
    AspectFill,
}

#[derive(Debug, serde::Deserialize)]
struct Script {
    canvas: Canvas,
    #[serde(default)]
    opts: SessionOpts,
    #[serde(default)]
    pages: Vec<PageSpec>,
    steps: Vec<Step>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct PageSpec {
    #[serde(default)]
    background_color: Option<Rgba8>,
    #[serde(default)]
    template: Option<PathBuf>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Stroke {
        points: Vec<[f64; 2]>,
        #[serde(default = "default_width")]
        width: f64,
        #[serde(default = "default_ink")]
        color: Rgba8,
    },
    Previous,
    Next,
    AddPage(PageSpec),
    Close,
}

fn default_width() -> f64 {
    3.0
}

fn default_ink() -> Rgba8 {
    Rgba8::BLACK
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
    }
}

fn read_script(path: &Path) -> anyhow::Result<Script> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let r = BufReader::new(f);
    let script: Script = serde_json::from_reader(r).with_context(|| "parse script JSON")?;
    Ok(script)
}

fn build_page(spec: &PageSpec, script_dir: &Path) -> anyhow::Result<Page> {
    if let Some(rel) = &spec.template {
        let path = script_dir.join(rel);
        let bytes =
            std::fs::read(&path).with_context(|| format!("read template '{}'", path.display()))?;
        let image = sketchbook::decode_image(&bytes)?;
        return Ok(Page::with_template(image));
    }
    Ok(Page::with_color(spec.background_color.unwrap_or_default()))
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    let script_dir = args.in_path.parent().unwrap_or_else(|| Path::new("."));

    let mut opts = script.opts;
    if let Some(q) = args.quality {
        opts.jpeg_quality = q;
    }
    if let Some(s) = args.scale {
        opts.raster_scale = s;
    }
    if let Some(fit) = args.fit {
        opts.background_fit = match fit {
            FitChoice::Stretch => BackgroundFit::Stretch,
            FitChoice::AspectFill => BackgroundFit::AspectFill,
        };
    }

    let pages = if script.pages.is_empty() {
        vec![Page::blank()]
    } else {
        script
            .pages
            .iter()
            .map(|spec| build_page(spec, script_dir))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let sink = DirectoryExportSink::new(args.out.join("exports"))?;
    let surface = VectorSurface::new(script.canvas);
    let mut session = DrawingSession::new(pages, surface, sink, opts)?;

    for (i, step) in script.steps.into_iter().enumerate() {
        let view = match step {
            Step::Stroke {
                points,
                width,
                color,
            } => {
                let points = points.into_iter().map(|[x, y]| Point::new(x, y)).collect();
                let stroke = Stroke::new(points, width, color)
                    .with_context(|| format!("step {i}: invalid stroke"))?;
                let event = session.surface_mut().push_stroke(stroke)?;
                session.handle_surface_event(event)?
            }
            Step::Previous => session.dispatch(Intent::Previous)?,
            Step::Next => session.dispatch(Intent::Next)?,
            Step::AddPage(spec) => session.dispatch(Intent::AddPage(build_page(&spec, script_dir)?))?,
            Step::Close => session.dispatch(Intent::Close)?,
        };
        tracing::debug!(step = i, page = %view.page_label(), "step applied");
    }
    if !session.is_closed() {
        session.close()?;
    }

    session.flush_composites();
    let view = session.view();
    let stats = session.composite_stats();
    let strokes_on_surface = session.surface().strokes().len();
    let content = session.surface().content_rect();
    let pages = session.into_pages();

    let pages_dir = args.out.join("pages");
    std::fs::create_dir_all(&pages_dir)
        .with_context(|| format!("create '{}'", pages_dir.display()))?;
    for (i, page) in pages.iter().enumerate() {
        if let Some(data) = page.stroke_data() {
            let path = pages_dir.join(format!("page-{:03}.strokes.json", i + 1));
            std::fs::write(&path, data).with_context(|| format!("write '{}'", path.display()))?;
        }
        if let Some(composite) = page.composite_image() {
            let path = pages_dir.join(format!("page-{:03}.jpg", i + 1));
            std::fs::write(&path, composite.bytes())
                .with_context(|| format!("write '{}'", path.display()))?;
        }
    }

    println!(
        "closed on page {} ({}x{} pt, {} strokes on surface)",
        view.page_label(),
        content.width(),
        content.height(),
        strokes_on_surface
    );
    println!(
        "saves: {} dispatched, {} superseded, {} exported, {} failed",
        stats.dispatched,
        stats.superseded,
        stats.exported,
        stats.raster_failures + stats.encode_failures + stats.export_failures
    );
    Ok(())
}
