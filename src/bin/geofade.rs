use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use geofade::{
    ColorScale, Dataset, Gradient, RenderConfig, RenderJob, RenderMode,
    data::backdate::{DEFAULT_PRECISION, backdate_file, default_output_path},
    render::{
        gradient::{GradientBarStyle, render_gradient_bar},
        pipeline::write_png,
    },
};

#[derive(Parser, Debug)]
#[command(name = "geofade", version)]
struct Cli {
    /// Log at DEBUG instead of INFO.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the animation as MP4 (requires `ffmpeg` on PATH), or only its final frame as PNG.
    Render(RenderArgs),
    /// Keep only the earliest record per rounded coordinate.
    Backdate(BackdateArgs),
    /// Render the year color bar as PNG.
    Gradient(GradientArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Point records (.csv or .json).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Background coverage documents (JSON).
    #[arg(long = "background")]
    backgrounds: Vec<PathBuf>,

    /// GeoJSON outlines. The first one frames the map.
    #[arg(long = "region")]
    regions: Vec<PathBuf>,

    /// Output path. Defaults to `videos/<stem>.mp4`, or `videos/<stem>.png` with `--final-frame`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Per-year date range summary.
    #[arg(long, default_value = "DATE_RANGES.json")]
    ranges_out: PathBuf,

    #[arg(long)]
    min_year: Option<i32>,

    #[arg(long)]
    max_year: Option<i32>,

    /// Render only the terminal frame.
    #[arg(long)]
    final_frame: bool,

    #[arg(long)]
    fps: Option<u32>,

    /// Hold each date on screen for this many milliseconds.
    #[arg(long)]
    interval_ms: Option<u32>,

    /// Print `i/N` frame progress to stderr.
    #[arg(long)]
    progress: bool,

    /// JSON render config; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BackdateArgs {
    /// Coordinate document (JSON).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Defaults to `<stem>_backdated.<ext>` next to the input.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Decimal places coordinates are rounded to before grouping.
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    precision: u32,
}

#[derive(Parser, Debug)]
struct GradientArgs {
    /// Take the year domain from these point records.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    #[arg(long)]
    min_year: Option<i32>,

    #[arg(long)]
    max_year: Option<i32>,

    #[arg(long, default_value = "gradient_bar.png")]
    out: PathBuf,

    #[arg(long, default_value_t = 3000)]
    width: u32,

    #[arg(long, default_value_t = 240)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Backdate(args) => cmd_backdate(args),
        Command::Gradient(args) => cmd_gradient(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_json_path(path)?,
        None => RenderConfig::default(),
    };
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if args.interval_ms.is_some() {
        config.interval_ms = args.interval_ms;
    }
    if args.min_year.is_some() {
        config.min_year = args.min_year;
    }
    if args.max_year.is_some() {
        config.max_year = args.max_year;
    }

    let mode = if args.final_frame {
        RenderMode::FinalFrame
    } else {
        RenderMode::Animation
    };
    let out = args.out.unwrap_or_else(|| {
        let stem = args
            .in_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "geofade".to_string());
        let ext = match mode {
            RenderMode::FinalFrame => "png",
            RenderMode::Animation => "mp4",
        };
        PathBuf::from("videos").join(format!("{stem}.{ext}"))
    });

    let job = RenderJob {
        input: args.in_path,
        backgrounds: args.backgrounds,
        regions: args.regions,
        out,
        ranges_out: args.ranges_out,
        mode,
        config,
        progress: args.progress,
    };
    let stats = job.run()?;

    eprintln!(
        "wrote {} ({} dates, {} frames)",
        job.out.display(),
        stats.dates,
        stats.frames_written
    );
    Ok(())
}

fn cmd_backdate(args: BackdateArgs) -> anyhow::Result<()> {
    let out = args
        .out
        .unwrap_or_else(|| default_output_path(&args.in_path));
    let report = backdate_file(&args.in_path, &out, args.precision)?;
    eprintln!(
        "kept {} of {} records, wrote {}",
        report.kept,
        report.input,
        out.display()
    );
    Ok(())
}

fn cmd_gradient(args: GradientArgs) -> anyhow::Result<()> {
    let years: Vec<i32> = match &args.in_path {
        Some(path) => Dataset::load(path, &[])
            .with_context(|| format!("load years from '{}'", path.display()))?
            .points
            .iter()
            .map(|p| p.year)
            .collect(),
        None => Vec::new(),
    };
    let scale = ColorScale::from_years(years, args.min_year, args.max_year)?
        .with_gradient(Gradient::Rainbow);

    let style = GradientBarStyle {
        canvas: geofade::Canvas {
            width: args.width,
            height: args.height,
        },
        ..GradientBarStyle::default()
    };
    let bar = render_gradient_bar(&scale, &style)?;
    write_png(&args.out, &bar, style.background)?;

    eprintln!(
        "wrote {} ({}-{})",
        args.out.display(),
        scale.min_year,
        scale.max_year
    );
    Ok(())
}
