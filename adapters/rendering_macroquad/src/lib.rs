#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed presentation adapter for Gridcaster.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The software frame buffer is uploaded into a single texture every frame
//! and stretched over the window with nearest-neighbour filtering.

mod sprites;

pub use self::sprites::{decode_sprite, SpriteKey, SpriteSheet};

use anyhow::{Context, Result};
use gridcaster_rendering::{
    FrameBuffer, FrameInput, FramePacer, FrameSimulationBreakdown, Presentation, RenderingBackend,
};
use macroquad::{
    color::{BLACK, WHITE},
    input::{is_key_down, is_key_pressed, KeyCode},
    math::vec2,
    texture::{draw_texture_ex, DrawTextureParams, FilterMode, Image, Texture2D},
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Reads the keyboard into a frame input snapshot.
///
/// Movement, turning and the trigger are level triggered; quitting and the
/// minimap toggle react to the press edge only.
fn poll_frame_input() -> FrameInput {
    FrameInput {
        forward: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
        backward: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
        turn_left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
        turn_right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
        fire: is_key_down(KeyCode::Space),
        quit: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        toggle_minimap: is_key_pressed(KeyCode::M),
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    pixel_scale: u32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            pixel_scale: 2,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as the frame pacer allows.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Sets how many window pixels each frame buffer pixel covers.
    #[must_use]
    pub fn with_pixel_scale(mut self, scale: u32) -> Self {
        self.pixel_scale = scale.max(1);
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    raycast: Duration,
    composite: Duration,
    present: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    stages: FrameBreakdown,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_raycast: Duration,
    avg_composite: Duration,
    avg_present: Duration,
}

impl FpsCounter {
    /// Records a presented frame and returns the per-second and trailing ten-second averages
    /// once one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);

        self.stages.simulation += breakdown.simulation;
        self.stages.raycast += breakdown.raycast;
        self.stages.composite += breakdown.composite;
        self.stages.present += breakdown.present;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let stages = self.stages;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.stages = FrameBreakdown::default();

        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };

        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: stages.simulation / frames,
            avg_raycast: stages.raycast / frames,
            avg_composite: stages.composite / frames,
            avg_present: stages.present / frames,
        })
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut FrameBuffer) -> FrameSimulationBreakdown + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            pixel_scale,
        } = self;

        let Presentation {
            window_title,
            width,
            height,
        } = presentation;

        let texture_width = u16::try_from(width).context("frame width exceeds texture limits")?;
        let texture_height =
            u16::try_from(height).context("frame height exceeds texture limits")?;
        let window_width = i32::try_from(width.saturating_mul(pixel_scale))
            .context("window width overflows")?;
        let window_height = i32::try_from(height.saturating_mul(pixel_scale))
            .context("window height overflows")?;
        let mut frame = FrameBuffer::new(width, height)?;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut image = Image {
                bytes: Vec::new(),
                width: texture_width,
                height: texture_height,
            };
            frame.write_rgba(&mut image.bytes);
            let texture = Texture2D::from_rgba8(texture_width, texture_height, &image.bytes);
            texture.set_filter(FilterMode::Nearest);

            let mut pacer = FramePacer::default();
            let mut fps_counter = FpsCounter::default();

            loop {
                let frame_dt = pacer.begin_frame();
                let input = poll_frame_input();
                if input.quit {
                    log::info!("quit requested");
                    break;
                }

                let simulation = update_frame(frame_dt, input, &mut frame);

                let present_start = Instant::now();
                frame.write_rgba(&mut image.bytes);
                texture.update(&image);
                macroquad::window::clear_background(BLACK);
                draw_texture_ex(
                    texture,
                    0.0,
                    0.0,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(vec2(
                            macroquad::window::screen_width(),
                            macroquad::window::screen_height(),
                        )),
                        ..DrawTextureParams::default()
                    },
                );
                let present = present_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation.simulation,
                    raycast: simulation.raycast,
                    composite: simulation.composite,
                    present,
                });
                if show_fps {
                    if let Some(metrics) = fps_metrics {
                        log::info!(
                            "FPS: {:.2} (10s avg: {:.2}) | sim: {:>6.2}ms raycast: {:>6.2}ms composite: {:>6.2}ms present: {:>6.2}ms",
                            metrics.per_second,
                            metrics.trailing_ten_seconds,
                            millis(metrics.avg_simulation),
                            millis(metrics.avg_raycast),
                            millis(metrics.avg_composite),
                            millis(metrics.avg_present),
                        );
                    }
                }

                pacer.sleep_remainder();
                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}
