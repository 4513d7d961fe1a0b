#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pose integrator that turns input intents into collision-checked pose updates.

use glam::Vec2;
use gridcaster_core::{Command, Event, MotionConfig, MotionIntent, Pose};

/// Pure system that reacts to frame ticks and emits pose commands.
#[derive(Debug)]
pub struct Motion {
    config: MotionConfig,
}

impl Motion {
    /// Creates a motion system with the provided speeds.
    #[must_use]
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Integrates `intent` over the frame's `dt` and emits `Command::UpdatePose`.
    ///
    /// The translation is rejected as a whole when `is_blocked` reports the
    /// destination as solid; the heading still updates. Nothing is emitted
    /// without a `TimeAdvanced` event or when the pose would not change.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        intent: MotionIntent,
        pose: Pose,
        is_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(Vec2) -> bool,
    {
        let dt: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
                _ => None,
            })
            .sum();
        if dt <= 0.0 {
            return;
        }

        let next = integrate(&self.config, pose, intent, dt, is_blocked);
        if next != pose {
            out.push(Command::UpdatePose { pose: next });
        }
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

/// Advances `pose` by one step of `dt` seconds.
///
/// Translation uses the heading held before this step's rotation.
#[must_use]
pub fn integrate<F>(
    config: &MotionConfig,
    pose: Pose,
    intent: MotionIntent,
    dt: f32,
    is_blocked: F,
) -> Pose
where
    F: Fn(Vec2) -> bool,
{
    let mut position = pose.position;
    let direction = intent.movement.sign();
    if direction != 0.0 {
        let candidate = pose.position + pose.forward() * direction * config.move_speed * dt;
        if is_blocked(candidate) {
            log::debug!(
                "move to ({:.1}, {:.1}) blocked",
                candidate.x,
                candidate.y
            );
        } else {
            position = candidate;
        }
    }

    let heading = pose.heading + intent.turn.sign() * config.rotation_speed * dt;
    Pose::new(position, heading)
}
