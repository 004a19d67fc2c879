#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use picomac::{BridgeConfig, KeyScript, PixelFormatKind, SimReport, Simulation};
use picomac_video::{PixelFormat, Rgb111, Rgb565};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Rgb565,
    Rgb111,
}

impl From<FormatArg> for PixelFormatKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Rgb565 => PixelFormatKind::Rgb565,
            FormatArg::Rgb111 => PixelFormatKind::Rgb111,
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Run the picomac input bridge and scan-out against a synthetic Mac")]
struct Args {
    /// JSON config file. `PICOMAC_*` environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON key script replayed through the simulated keyboard controller.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Write the final LCD contents to a PNG file.
    #[arg(long)]
    png: Option<PathBuf>,

    /// Override the configured LCD pixel format.
    #[arg(long, value_enum)]
    pixel_format: Option<FormatArg>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = BridgeConfig::load(args.config.as_deref()).context("loading config")?;
    if let Some(format) = args.pixel_format {
        config.pixel_format = format.into();
    }

    let words = match &args.script {
        Some(path) => KeyScript::from_file(path)
            .and_then(|script| script.fifo_words())
            .with_context(|| format!("loading key script {}", path.display()))?,
        None => Vec::new(),
    };

    let report = match config.pixel_format {
        PixelFormatKind::Rgb565 => run::<Rgb565>(&config, words, &args)?,
        PixelFormatKind::Rgb111 => run::<Rgb111>(&config, words, &args)?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run<P: PixelFormat>(config: &BridgeConfig, words: Vec<u16>, args: &Args) -> Result<SimReport> {
    let mut sim = Simulation::<P>::new(config).context("building simulation")?;
    sim.feed(words);
    let report = sim.run(args.frames);
    tracing::info!(frames = report.frames, keys = report.keys_delivered, "run finished");

    if let Some(path) = &args.png {
        dump_lcd_png(&sim, path)?;
    }
    Ok(report)
}

fn dump_lcd_png<P: PixelFormat>(sim: &Simulation<P>, path: &Path) -> Result<()> {
    let lcd = sim.lcd();
    let (w, h) = (lcd.width(), lcd.height());
    if w == 0 || h == 0 {
        bail!("LCD has no pixels ({w}x{h})");
    }
    let rgb = lcd.to_rgb8();
    let img = image::RgbImage::from_raw(w, h, rgb).context("LCD buffer size mismatch")?;
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
