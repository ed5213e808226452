use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use watermarker::{
    CompositorOpts, FontSource, PreviewSessionOpts, RenderOutcome, SourceImageRef,
    WatermarkConfig, Watermarker,
};

/// Stamp a text watermark onto an image and write `watermarked-image.png`.
#[derive(Parser, Debug)]
#[command(name = "watermark_png")]
struct Args {
    /// Input image (any format the `image` crate decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory the PNG is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON file with a full watermark config; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watermark text.
    #[arg(long)]
    text: Option<String>,

    /// Vertical anchor, percent of image height.
    #[arg(long)]
    top: Option<f64>,

    /// Horizontal anchor, percent of image width.
    #[arg(long)]
    left: Option<f64>,

    /// Fill opacity in 0..=1.
    #[arg(long)]
    opacity: Option<f32>,

    /// Font size in pixels.
    #[arg(long)]
    font_size: Option<f32>,

    /// Draw the text horizontally instead of at -45 degrees.
    #[arg(long)]
    no_rotate: bool,

    /// Font file to use instead of system lookup.
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            WatermarkConfig::from_json(&json)?
        }
        None => WatermarkConfig::default(),
    };
    if let Some(text) = args.text {
        config.text = text;
    }
    if let Some(top) = args.top {
        config.top = top;
    }
    if let Some(left) = args.left {
        config.left = left;
    }
    if let Some(opacity) = args.opacity {
        config.opacity = opacity;
    }
    if let Some(font_size) = args.font_size {
        config.font_size = font_size;
    }
    if args.no_rotate {
        config.rotated = false;
    }

    let compositor = match args.font {
        Some(path) => CompositorOpts::default().with_font(FontSource::File(path)),
        None => CompositorOpts::from_env(),
    };
    let mut wm = Watermarker::with_preview(PreviewSessionOpts::default().with_compositor(compositor))?;
    wm.replace_config(config);
    wm.set_source_image(SourceImageRef::from_path(&args.in_path)?);

    for outcome in wm.session_mut().wait_idle()? {
        if let RenderOutcome::Failed { error, .. } = outcome {
            return Err(error).context("preview render failed");
        }
    }

    let artifact = wm.export()?;
    let path = artifact.write_to_dir(&args.out_dir)?;
    println!(
        "wrote {} ({}x{}, {} bytes)",
        path.display(),
        artifact.width,
        artifact.height,
        artifact.bytes.len()
    );
    Ok(())
}
