#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the holiday scene.

mod headless;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use holiday_scene_core::MotionTiming;
use holiday_scene_rendering::RenderingBackend;
use holiday_scene_rendering_macroquad::MacroquadBackend;
use holiday_scene_system_bootstrap::{Showcase, ShowcaseConfig};
use tracing::{debug, info};

/// Command-line arguments accepted by the holiday scene binary.
#[derive(Debug, Parser)]
#[command(
    name = "holiday-scene",
    version,
    about = "Animated holiday tree with a star topper and a floating greeting"
)]
struct CliArgs {
    /// TOML file with showcase settings; flags below override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for every random placement in the scene.
    #[arg(long)]
    seed: Option<u64>,

    /// How per-frame motion constants scale with frame duration.
    #[arg(long, value_enum)]
    timing: Option<TimingArg>,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,

    /// Log frame timing metrics at `info` once per second.
    #[arg(long)]
    show_fps: bool,

    /// Simulate this many 60 Hz frames without opening a window.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Frame at which headless playback switches to the exploded layout.
    #[arg(long, value_name = "FRAME", requires = "headless")]
    explode_at: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TimingArg {
    /// Apply motion constants once per rendered frame.
    PerFrame,
    /// Scale motion constants by frame duration relative to 60 Hz.
    Normalized,
}

/// Entry point for the holiday scene command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = load_config(&args)?;
    let mut showcase = Showcase::new(config).context("invalid showcase configuration")?;

    if let Some(frames) = args.headless {
        headless::run(&mut showcase, frames, args.explode_at).report();
        return Ok(());
    }

    let presentation = showcase
        .presentation()
        .context("failed to prepare the scene presentation")?;
    info!(
        seed = showcase.config().seed,
        vsync = args.vsync,
        "opening holiday scene window"
    );

    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, scene| {
            showcase.step(dt, input);
            showcase.populate(scene);
        })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(args: &CliArgs) -> Result<ShowcaseConfig> {
    let base = match &args.config {
        Some(path) => {
            let document = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ShowcaseConfig::from_toml_str(&document)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => ShowcaseConfig::default(),
    };
    Ok(apply_overrides(base, args))
}

fn apply_overrides(mut config: ShowcaseConfig, args: &CliArgs) -> ShowcaseConfig {
    if let Some(seed) = args.seed {
        debug!(seed, "seed overridden from the command line");
        config.seed = seed;
    }

    if let Some(timing) = args.timing {
        config.motion_timing = match (timing, config.motion_timing) {
            (TimingArg::PerFrame, _) => MotionTiming::PerFrame,
            (TimingArg::Normalized, normalized @ MotionTiming::Normalized { .. }) => normalized,
            (TimingArg::Normalized, MotionTiming::PerFrame) => MotionTiming::default(),
        };
        debug!(timing = ?config.motion_timing, "motion timing overridden from the command line");
    }

    config
}
