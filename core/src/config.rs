//! Construction-time configuration shared by the world, systems and adapters.
//!
//! Every section deserialises from TOML with per-field defaults so partial
//! files only override what they name.

use std::{f32::consts::PI, time::Duration};

use serde::{Deserialize, Serialize};

use crate::Rgb;

/// Layout used when no configuration overrides it.
pub const DEFAULT_LAYOUT: [&str; 12] = [
    "%%%%%%%%%%%%",
    "%..........%",
    "%..##......%",
    "%..#.......%",
    "%.......#..%",
    "%....###...%",
    "%..........%",
    "%.#........%",
    "%.#....##..%",
    "%..........%",
    "%..........%",
    "%%%%%%%%%%%%",
];

/// Errors raised when a configuration section holds unusable values.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A length, speed or divisor was zero, negative or not finite.
    #[error("{field} must be a positive finite number (received {value})")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// The field of view must open strictly between zero and a half turn.
    #[error("fov must lie strictly between 0 and pi radians (received {fov})")]
    FieldOfView {
        /// Value that failed validation.
        fov: f32,
    },
    /// `max_distance / march_step` asks for more steps per ray than the caster allows.
    #[error("view.max_distance / view.march_step must not exceed {limit} steps (received {steps})")]
    MarchSteps {
        /// Requested steps per ray.
        steps: f32,
        /// Largest accepted step count.
        limit: u32,
    },
    /// An integer dimension was zero.
    #[error("{field} must be non-zero")]
    Zero {
        /// Name of the offending field.
        field: &'static str,
    },
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_zero(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { field })
    } else {
        Ok(())
    }
}

/// Player pose at world construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStart {
    /// Horizontal position in world units.
    pub x: f32,
    /// Vertical position in world units.
    pub y: f32,
    /// Heading in radians.
    #[serde(default)]
    pub heading: f32,
}

/// Actor placement at world construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSpawn {
    /// Horizontal position in world units.
    pub x: f32,
    /// Vertical position in world units.
    pub y: f32,
}

/// Grid layout, player start and actor roster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Rows of layout glyphs: `.` empty, `#` wall, `%` boundary.
    pub layout: Vec<String>,
    /// Side length of one cell in world units.
    pub tile_size: u32,
    /// Initial player pose.
    pub player_start: PlayerStart,
    /// Initial actor positions, in registry order.
    pub actors: Vec<ActorSpawn>,
    /// Health every actor starts with.
    pub actor_health: u32,
    /// Half the side length of every actor's square hit box.
    pub actor_half_width: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT.iter().map(|row| (*row).to_owned()).collect(),
            tile_size: 64,
            player_start: PlayerStart {
                x: 96.0,
                y: 96.0,
                heading: 0.0,
            },
            actors: vec![
                ActorSpawn { x: 416.0, y: 224.0 },
                ActorSpawn { x: 608.0, y: 416.0 },
                ActorSpawn { x: 288.0, y: 608.0 },
            ],
            actor_health: 3,
            actor_half_width: 16.0,
        }
    }
}

impl WorldConfig {
    /// Checks the scalar fields; the layout itself is validated by the world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero("world.tile_size", self.tile_size)?;
        non_zero("world.actor_health", self.actor_health)?;
        positive("world.actor_half_width", self.actor_half_width)
    }
}

/// Ray marching, projection and shading parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Angular width of the view cone in radians.
    pub fov: f32,
    /// Distance advanced by each march step in world units.
    pub march_step: f32,
    /// Distance after which a ray gives up without a wall hit.
    pub max_distance: f32,
    /// Distance beyond which strips are shaded black.
    pub view_distance: f32,
    /// Distance divided by this value is subtracted from every color channel.
    pub shade_divisor: f32,
    /// Scale applied to projected wall heights.
    pub wall_height_fraction: f32,
    /// Scale applied to projected actor heights.
    pub actor_height_fraction: f32,
    /// Largest angular deviation from the heading that still counts as aimed.
    pub aim_tolerance: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov: PI / 3.0,
            march_step: 1.0,
            max_distance: 1000.0,
            view_distance: 900.0,
            shade_divisor: 4.0,
            wall_height_fraction: 0.5,
            actor_height_fraction: 0.25,
            aim_tolerance: 0.02,
        }
    }
}

impl ViewConfig {
    /// Upper bound on march steps per ray.
    pub const MAX_MARCH_STEPS: u32 = 65_536;

    /// Steps a ray takes before giving up, capped at [`Self::MAX_MARCH_STEPS`].
    #[must_use]
    pub fn march_steps(&self) -> u32 {
        if !(self.march_step > 0.0) || !(self.max_distance >= 0.0) {
            return 0;
        }
        let steps = (self.max_distance / self.march_step).floor();
        if steps >= Self::MAX_MARCH_STEPS as f32 {
            Self::MAX_MARCH_STEPS
        } else {
            steps as u32
        }
    }

    /// Rejects values that would stall or invert the projection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(ConfigError::FieldOfView { fov: self.fov });
        }
        positive("view.march_step", self.march_step)?;
        positive("view.max_distance", self.max_distance)?;
        let steps = self.max_distance / self.march_step;
        if steps > Self::MAX_MARCH_STEPS as f32 {
            return Err(ConfigError::MarchSteps {
                steps,
                limit: Self::MAX_MARCH_STEPS,
            });
        }
        positive("view.view_distance", self.view_distance)?;
        positive("view.shade_divisor", self.shade_divisor)?;
        positive("view.wall_height_fraction", self.wall_height_fraction)?;
        positive("view.actor_height_fraction", self.actor_height_fraction)?;
        positive("view.aim_tolerance", self.aim_tolerance)
    }
}

/// Player translation and rotation speeds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// World units travelled per second.
    pub move_speed: f32,
    /// Radians turned per second.
    pub rotation_speed: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 128.0,
            rotation_speed: PI / 2.0,
        }
    }
}

impl MotionConfig {
    /// Rejects non-positive speeds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("motion.move_speed", self.move_speed)?;
        positive("motion.rotation_speed", self.rotation_speed)
    }
}

/// Fire-rate and recoil timers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Minimum time between two shots in milliseconds.
    pub fire_cooldown_ms: u64,
    /// Length of the recoil animation in milliseconds.
    pub recoil_ms: u64,
    /// Pixels the weapon overlay drops at the start of the recoil.
    pub recoil_offset: u32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            fire_cooldown_ms: 250,
            recoil_ms: 120,
            recoil_offset: 12,
        }
    }
}

impl WeaponConfig {
    /// Cooldown as a duration.
    #[must_use]
    pub const fn fire_cooldown(&self) -> Duration {
        Duration::from_millis(self.fire_cooldown_ms)
    }

    /// Recoil animation length as a duration.
    #[must_use]
    pub const fn recoil(&self) -> Duration {
        Duration::from_millis(self.recoil_ms)
    }
}

/// Render target dimensions and minimap placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Frame buffer width in pixels, one ray per column.
    pub width: u32,
    /// Frame buffer height in pixels.
    pub height: u32,
    /// Pixels per grid cell on the minimap.
    pub minimap_scale: u32,
    /// Whether the minimap is shown at start-up.
    pub minimap_enabled: bool,
    /// Window pixels per frame buffer pixel along each axis.
    pub pixel_scale: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            minimap_scale: 5,
            minimap_enabled: true,
            pixel_scale: 2,
        }
    }
}

impl ScreenConfig {
    /// Rejects empty render targets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_zero("screen.width", self.width)?;
        non_zero("screen.height", self.height)?;
        non_zero("screen.minimap_scale", self.minimap_scale)?;
        non_zero("screen.pixel_scale", self.pixel_scale)
    }
}

/// Colors used by the caster, compositor and minimap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Upper half fill.
    pub sky: Rgb,
    /// Lower half fill.
    pub floor: Rgb,
    /// Base color of interior walls.
    pub wall: Rgb,
    /// Base color of boundary tiles.
    pub boundary: Rgb,
    /// Base color of actors at full health.
    pub actor: Rgb,
    /// Minimap color of solid cells.
    pub minimap_wall: Rgb,
    /// Minimap color of empty cells.
    pub minimap_floor: Rgb,
    /// Minimap color of the player's cell.
    pub minimap_player: Rgb,
    /// Minimap color of cells holding a live actor.
    pub minimap_actor: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            sky: Rgb::from_rgb(46, 52, 88),
            floor: Rgb::from_rgb(58, 50, 44),
            wall: Rgb::from_rgb(200, 200, 210),
            boundary: Rgb::from_rgb(150, 110, 220),
            actor: Rgb::from_rgb(220, 40, 40),
            minimap_wall: Rgb::from_rgb(230, 230, 230),
            minimap_floor: Rgb::from_rgb(20, 20, 20),
            minimap_player: Rgb::from_rgb(255, 220, 0),
            minimap_actor: Rgb::from_rgb(230, 30, 30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
        assert_eq!(ViewConfig::default().validate(), Ok(()));
        assert_eq!(MotionConfig::default().validate(), Ok(()));
        assert_eq!(ScreenConfig::default().validate(), Ok(()));
    }

    #[test]
    fn fov_outside_half_turn_is_rejected() {
        let view = ViewConfig {
            fov: PI,
            ..ViewConfig::default()
        };
        assert_eq!(view.validate(), Err(ConfigError::FieldOfView { fov: PI }));
    }

    #[test]
    fn zero_march_step_is_rejected() {
        let view = ViewConfig {
            march_step: 0.0,
            ..ViewConfig::default()
        };
        assert!(matches!(
            view.validate(),
            Err(ConfigError::NotPositive {
                field: "view.march_step",
                ..
            })
        ));
    }

    #[test]
    fn tiny_march_step_is_rejected() {
        let view = ViewConfig {
            march_step: 1e-4,
            ..ViewConfig::default()
        };
        assert!(matches!(
            view.validate(),
            Err(ConfigError::MarchSteps {
                limit: ViewConfig::MAX_MARCH_STEPS,
                ..
            })
        ));
        assert_eq!(view.march_steps(), ViewConfig::MAX_MARCH_STEPS);
    }

    #[test]
    fn march_steps_follow_distance_over_step() {
        let view = ViewConfig {
            march_step: 0.5,
            max_distance: 100.0,
            ..ViewConfig::default()
        };
        assert_eq!(view.march_steps(), 200);
        assert_eq!(ViewConfig::default().march_steps(), 1000);
    }

    #[test]
    fn zero_pixel_scale_is_rejected() {
        let screen = ScreenConfig {
            pixel_scale: 0,
            ..ScreenConfig::default()
        };
        assert_eq!(
            screen.validate(),
            Err(ConfigError::Zero {
                field: "screen.pixel_scale"
            })
        );
    }

    #[test]
    fn nan_speed_is_rejected() {
        let motion = MotionConfig {
            move_speed: f32::NAN,
            ..MotionConfig::default()
        };
        assert!(motion.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let view: ViewConfig = toml::from_str("fov = 1.0\nmarch_step = 0.5").expect("parse view");
        assert!((view.fov - 1.0).abs() < f32::EPSILON);
        assert!((view.march_step - 0.5).abs() < f32::EPSILON);
        assert_eq!(view.max_distance, ViewConfig::default().max_distance);

        let palette: Palette = toml::from_str("sky = [1, 2, 3]").expect("parse palette");
        assert_eq!(palette.sky, Rgb::from_rgb(1, 2, 3));
        assert_eq!(palette.floor, Palette::default().floor);
    }

    #[test]
    fn world_config_round_trips_through_bincode() {
        let config = WorldConfig::default();
        let bytes = bincode::serialize(&config).expect("serialize");
        let restored: WorldConfig = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, config);
    }
}
