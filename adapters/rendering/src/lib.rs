#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Gridcaster adapters.
//!
//! The crate owns the software frame buffer and the compositor that paints
//! column strips, the minimap and the weapon overlay into it. Backends only
//! present finished buffers and report input through [`FrameInput`].

mod compositor;
mod framebuffer;
mod pacer;

use anyhow::Result as AnyResult;
use gridcaster_core::{MotionIntent, MoveIntent, TurnIntent};
use std::time::Duration;

pub use self::compositor::{Compositor, MinimapScene, Scene, WeaponOverlay, MINIMAP_MARGIN};
pub use self::framebuffer::{pack_rgb, FrameBuffer, Sprite};
pub use self::pacer::FramePacer;

/// Keyboard snapshot gathered by adapters before updating the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Move along the heading.
    pub forward: bool,
    /// Move against the heading.
    pub backward: bool,
    /// Rotate counter-clockwise (decreasing heading).
    pub turn_left: bool,
    /// Rotate clockwise (increasing heading).
    pub turn_right: bool,
    /// Trigger held this frame.
    pub fire: bool,
    /// Leave the game loop.
    pub quit: bool,
    /// Minimap visibility toggle pressed this frame.
    pub toggle_minimap: bool,
}

impl FrameInput {
    /// Translation intent; opposing keys cancel out.
    #[must_use]
    pub fn move_intent(&self) -> MoveIntent {
        match (self.forward, self.backward) {
            (true, false) => MoveIntent::Forward,
            (false, true) => MoveIntent::Backward,
            _ => MoveIntent::None,
        }
    }

    /// Rotation intent; opposing keys cancel out.
    #[must_use]
    pub fn turn_intent(&self) -> TurnIntent {
        match (self.turn_left, self.turn_right) {
            (true, false) => TurnIntent::Left,
            (false, true) => TurnIntent::Right,
            _ => TurnIntent::None,
        }
    }

    /// Combined motion intent for the pose integrator.
    #[must_use]
    pub fn motion_intent(&self) -> MotionIntent {
        MotionIntent::new(self.move_intent(), self.turn_intent())
    }
}

/// Time spent in the simulation stages of a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSimulationBreakdown {
    /// World ticks, motion, weapon and damage application.
    pub simulation: Duration,
    /// Ray casting across all columns.
    pub raycast: Duration,
    /// Writing the frame buffer.
    pub composite: Duration,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Frame buffer width in pixels.
    pub width: u32,
    /// Frame buffer height in pixels.
    pub height: u32,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    pub fn new<T>(window_title: T, width: u32, height: u32) -> Result<Self, RenderingError>
    where
        T: Into<String>,
    {
        if width == 0 || height == 0 {
            return Err(RenderingError::ZeroDimension { width, height });
        }
        Ok(Self {
            window_title: window_title.into(),
            width,
            height,
        })
    }
}

/// Rendering backend capable of presenting Gridcaster frames.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_frame` closure receives the frame delta and the
    /// input captured by the adapter, and must fully repaint the buffer
    /// before the backend presents it.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut FrameBuffer) -> FrameSimulationBreakdown + 'static;
}

/// Errors that can occur when constructing rendering resources.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderingError {
    /// Buffers and sprites need at least one pixel in each direction.
    #[error("dimensions must be positive (received {width}x{height})")]
    ZeroDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Sprite pixel data does not match its dimensions.
    #[error("sprite of {width}x{height} received {pixels} pixels")]
    SpriteSize {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Number of pixels supplied.
        pixels: usize,
    },
}

/// Windowless backend that drives a fixed number of frames with scripted input.
#[derive(Clone, Debug)]
pub struct HeadlessBackend {
    frames: u32,
    dt: Duration,
    script: Vec<FrameInput>,
}

impl HeadlessBackend {
    /// Runs `frames` frames of 1/60 s each with no input.
    #[must_use]
    pub fn new(frames: u32) -> Self {
        Self {
            frames,
            dt: Duration::from_secs(1) / FramePacer::DEFAULT_HZ,
            script: Vec::new(),
        }
    }

    /// Overrides the fixed frame delta.
    #[must_use]
    pub fn with_dt(mut self, dt: Duration) -> Self {
        self.dt = dt;
        self
    }

    /// Supplies per-frame input; frames past the end of the script receive no input.
    #[must_use]
    pub fn with_script(mut self, script: Vec<FrameInput>) -> Self {
        self.script = script;
        self
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut FrameBuffer) -> FrameSimulationBreakdown + 'static,
    {
        let mut frame = FrameBuffer::new(presentation.width, presentation.height)?;
        let mut total = FrameSimulationBreakdown::default();
        let mut rendered = 0_u32;

        for index in 0..self.frames {
            let input = self
                .script
                .get(index as usize)
                .copied()
                .unwrap_or_default();
            if input.quit {
                break;
            }
            let breakdown = update_frame(self.dt, input, &mut frame);
            total.simulation += breakdown.simulation;
            total.raycast += breakdown.raycast;
            total.composite += breakdown.composite;
            rendered += 1;
        }

        log::info!(
            "{}: rendered {rendered} headless frames (sim {:?}, raycast {:?}, composite {:?})",
            presentation.window_title,
            total.simulation,
            total.raycast,
            total.composite,
        );
        Ok(())
    }
}
