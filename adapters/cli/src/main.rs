#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Gridcaster renderer.

use std::{cell::RefCell, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use gridcaster_cli::{GameConfig, Simulation};
use gridcaster_rendering::{HeadlessBackend, Presentation, RenderingBackend};
use gridcaster_rendering_macroquad::{MacroquadBackend, SpriteKey, SpriteSheet};

const WINDOW_TITLE: &str = "Gridcaster";

#[derive(Debug, Parser)]
#[command(name = "gridcaster")]
#[command(about = "First-person ray caster over a tile grid")]
struct Args {
    /// TOML configuration; built-in defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Sprite manifest providing the weapon overlay.
    #[arg(long, value_name = "PATH")]
    sprite_manifest: Option<PathBuf>,

    /// Log frame timings once per second.
    #[arg(long)]
    show_fps: bool,

    /// Present frames without waiting for the display refresh.
    #[arg(long)]
    no_vsync: bool,

    /// Run this many 1/60 s frames without a window, then log a summary.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,
}

/// Entry point for the Gridcaster command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let weapon_sprite = match &args.sprite_manifest {
        Some(path) => {
            let mut sheet = SpriteSheet::from_manifest_path(path)?;
            sheet.take(SpriteKey::Weapon)
        }
        None => None,
    };

    let simulation =
        Simulation::new(&config, weapon_sprite).context("failed to construct the world")?;
    let presentation = Presentation::new(WINDOW_TITLE, config.screen.width, config.screen.height)?;

    if let Some(frames) = args.headless {
        let simulation = Rc::new(RefCell::new(simulation));
        let stepper = Rc::clone(&simulation);
        HeadlessBackend::new(frames).run(presentation, move |dt, input, frame| {
            stepper.borrow_mut().step(dt, input, frame)
        })?;
        simulation.borrow().log_summary();
        return Ok(());
    }

    let mut simulation = simulation;
    MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .with_pixel_scale(config.screen.pixel_scale)
        .run(presentation, move |dt, input, frame| {
            simulation.step(dt, input, frame)
        })
}
