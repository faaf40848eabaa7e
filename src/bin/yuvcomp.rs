use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "yuvcomp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a playback timeline into a directory of raw YUV frames.
    Render(RenderArgs),
    /// Print the padded buffer layout for an output size.
    Layout(LayoutArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThumbMode {
    Raw,
    Ascii,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output directory for `<prefix>_NNNN.yuv` frames.
    #[arg(long)]
    out_dir: PathBuf,

    /// Output width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Input timings JSON (duration and playback events).
    #[arg(long)]
    timings: PathBuf,

    /// Directory of sparse `<root>vl_NNNN.json` / `<root>fg_NNNN.json` scene files.
    #[arg(long)]
    scene_dir: Option<PathBuf>,

    /// Directory foreground image assets are loaded from.
    #[arg(long, default_value = ".")]
    resource_dir: PathBuf,

    /// Multiplier applied to video-layer coordinates from the scene files.
    #[arg(long, default_value_t = 1.0)]
    layer_scale: f64,

    /// Output file-name prefix.
    #[arg(long, default_value = yuvcomp::render::sink::DEFAULT_OUTPUT_PREFIX)]
    prefix: String,

    /// Capture thumbnails every N frames (0 disables).
    #[arg(long, default_value_t = 0)]
    thumb_interval: u64,

    /// Thumbnail encoding.
    #[arg(long, value_enum, default_value_t = ThumbMode::Ascii)]
    thumb_mode: ThumbMode,

    /// Thumbnail directory (defaults to the output directory).
    #[arg(long)]
    thumb_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Width in pixels.
    #[arg(long)]
    width: u32,

    /// Height in pixels.
    #[arg(long)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let timings = yuvcomp::InputTimings::from_path(&args.timings)
        .with_context(|| format!("load timings '{}'", args.timings.display()))?;

    let thumbnails = (args.thumb_interval > 0).then(|| yuvcomp::ThumbnailOpts {
        interval_frames: args.thumb_interval,
        mode: match args.thumb_mode {
            ThumbMode::Raw => yuvcomp::ThumbnailMode::RawLuma,
            ThumbMode::Ascii => yuvcomp::ThumbnailMode::Ascii,
        },
        ..yuvcomp::ThumbnailOpts::default()
    });
    let comp = yuvcomp::YuvCompositor::new(
        args.width,
        args.height,
        &args.resource_dir,
        yuvcomp::CompositorOpts {
            thumbnails,
            ..yuvcomp::CompositorOpts::from_env()
        },
    )?;

    let batch_opts = yuvcomp::BatchOpts {
        thumb_dir: thumbnails.map(|_| args.thumb_dir.clone().unwrap_or_else(|| args.out_dir.clone())),
        thumb_prefix: args.prefix.clone(),
    };
    let mut renderer = yuvcomp::BatchRenderer::new(comp, &timings, batch_opts)?;
    if let Some(dir) = &args.scene_dir {
        let scenes = yuvcomp::SceneSequencer::open(dir)
            .with_context(|| format!("open scene dir '{}'", dir.display()))?
            .with_layer_scale(args.layer_scale);
        renderer = renderer.with_scenes(scenes);
    }

    let mut sink = yuvcomp::YuvFileSink::new(&args.out_dir, &args.prefix);
    let stats = renderer.run(&mut sink)?;

    eprintln!(
        "wrote {} frames to {} (avg {:.2} ms/frame)",
        stats.frames_rendered,
        args.out_dir.display(),
        stats.mean_render_ms
    );
    if stats.interrupted {
        anyhow::bail!("interrupted after {} frames", stats.frames_rendered);
    }
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    yuvcomp::Canvas::new(args.width, args.height)?;
    let layout = yuvcomp::Yuv420Layout::padded(args.width, args.height);
    println!("row_bytes_y={}", layout.row_bytes_y);
    println!("row_bytes_chroma={}", layout.row_bytes_chroma);
    println!("data_size={}", layout.data_size());
    Ok(())
}
