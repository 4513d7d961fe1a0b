#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step ray caster that projects walls and actors into screen columns.
//!
//! One ray is marched per screen column. Each ray records the first solid
//! tile it enters and, independently, the first live actor whose square hit
//! box it crosses. When the weapon fired this frame, the most centred column
//! that crossed an actor resolves the shot as a single damage command.

use glam::Vec2;
use gridcaster_core::{
    ActorHit, ActorSnapshot, ActorStrip, ActorView, ColumnStrip, Command, Event, Palette, Pose,
    RayHit, Rgb, TileCode, TileView, ViewConfig, WallHit, WallStrip,
};

/// Per-ray "already intersected" flags, indexed by the actor's slot in the live list.
///
/// The caster clears the flags at the start of every ray.
#[derive(Clone, Debug, Default)]
pub struct RayMarks {
    flags: Vec<bool>,
}

impl RayMarks {
    /// Clears all flags and sizes the buffer for `actors` slots.
    pub fn reset(&mut self, actors: usize) {
        self.flags.clear();
        self.flags.resize(actors, false);
    }

    /// Flags `slot`, returning `true` only when it was not flagged yet.
    pub fn mark(&mut self, slot: usize) -> bool {
        match self.flags.get_mut(slot) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct AimCandidate {
    deviation: f32,
    distance: f32,
    hit: ActorHit,
}

impl AimCandidate {
    fn beats(&self, other: &Self) -> bool {
        (self.deviation, self.distance) < (other.deviation, other.distance)
    }
}

/// Ray caster system holding scratch buffers reused across frames.
#[derive(Debug)]
pub struct RayCaster {
    config: ViewConfig,
    palette: Palette,
    marks: RayMarks,
    live: Vec<ActorSnapshot>,
    strips: Vec<ColumnStrip>,
}

impl RayCaster {
    /// Creates a ray caster with the provided view parameters and base colors.
    #[must_use]
    pub fn new(config: ViewConfig, palette: Palette) -> Self {
        Self {
            config,
            palette,
            marks: RayMarks::default(),
            live: Vec::new(),
            strips: Vec::new(),
        }
    }

    /// Casts one ray per column of a `width × height` screen.
    ///
    /// Emits at most one `Command::DamageActor` when `events` contain
    /// `Event::WeaponFired`. Returns the projected strips, one per column.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        events: &[Event],
        pose: Pose,
        tiles: TileView<'_>,
        actors: &ActorView,
        width: u32,
        height: u32,
        out: &mut Vec<Command>,
    ) -> &[ColumnStrip] {
        let shot_fired = events
            .iter()
            .any(|event| matches!(event, Event::WeaponFired));

        self.live.clear();
        self.live.extend(actors.iter_live().copied());
        self.strips.clear();
        self.strips.reserve(width as usize);

        let mut aimed: Option<AimCandidate> = None;
        for column in 0..width {
            let offset = ray_offset(self.config.fov, column, width);
            let hit = cast_ray(
                &self.config,
                pose.position,
                pose.heading + offset,
                tiles,
                &self.live,
                &mut self.marks,
            );

            if shot_fired {
                if let Some(actor_hit) = hit.actor {
                    let candidate = AimCandidate {
                        deviation: offset.abs(),
                        distance: actor_hit.distance,
                        hit: actor_hit,
                    };
                    let within = candidate.deviation < self.config.aim_tolerance;
                    if within && aimed.map_or(true, |best| candidate.beats(&best)) {
                        aimed = Some(candidate);
                    }
                }
            }

            let strip = self.project(column, hit, height, tiles.tile_size());
            self.strips.push(strip);
        }

        if let Some(candidate) = aimed {
            out.push(Command::DamageActor {
                actor: candidate.hit.actor,
            });
        }

        &self.strips
    }

    fn project(&self, column: u32, hit: RayHit, screen_height: u32, tile_size: u32) -> ColumnStrip {
        let wall = hit.wall.map(|wall| WallStrip {
            distance: wall.distance,
            tile: wall.tile,
            height: projected_height(
                self.config.wall_height_fraction,
                screen_height,
                tile_size,
                wall.distance,
            ),
            color: shade(self.wall_color(wall.tile), wall.distance, &self.config),
        });

        let actor = hit.actor.and_then(|actor_hit| {
            let snapshot = self.live.iter().find(|actor| actor.id == actor_hit.actor)?;
            let base = self.palette.actor.scale(snapshot.health_fraction());
            Some(ActorStrip {
                actor: actor_hit.actor,
                distance: actor_hit.distance,
                height: projected_height(
                    self.config.actor_height_fraction,
                    screen_height,
                    tile_size,
                    actor_hit.distance,
                ),
                color: shade(base, actor_hit.distance, &self.config),
            })
        });

        ColumnStrip {
            column,
            wall,
            actor,
        }
    }

    fn wall_color(&self, tile: TileCode) -> Rgb {
        match tile {
            TileCode::Boundary => self.palette.boundary,
            TileCode::Wall | TileCode::Empty => self.palette.wall,
        }
    }
}

/// Angle of column `column` relative to the heading: `−fov/2 + column/width × fov`.
#[must_use]
pub fn ray_offset(fov: f32, column: u32, width: u32) -> f32 {
    if width == 0 {
        return 0.0;
    }
    -fov / 2.0 + (column as f32 / width as f32) * fov
}

/// Marches a single ray from `origin` along `angle` in fixed steps.
///
/// The march ends on the first solid tile, when the point leaves the grid, or
/// once the distance would exceed `max_distance`. The step count is capped by
/// [`ViewConfig::march_steps`]. At every step, including the
/// one that reaches the wall, live actors not yet flagged for this ray are
/// tested against their hit boxes; the first newly flagged actor becomes the
/// ray's actor hit, so earlier steps win and lower slots win within a step.
pub fn cast_ray(
    config: &ViewConfig,
    origin: Vec2,
    angle: f32,
    tiles: TileView<'_>,
    actors: &[ActorSnapshot],
    marks: &mut RayMarks,
) -> RayHit {
    marks.reset(actors.len());

    let tile_size = tiles.tile_size() as f32;
    if !(config.march_step > 0.0) || tile_size <= 0.0 {
        return RayHit::default();
    }

    let direction = Vec2::new(angle.cos(), angle.sin());
    let max_steps = config.march_steps();
    let mut actor_hit: Option<ActorHit> = None;

    for step in 0..=max_steps {
        let distance = step as f32 * config.march_step;
        let point = origin + direction * distance;
        if !tiles.contains(point) {
            break;
        }

        for (slot, actor) in actors.iter().enumerate() {
            if actor.is_alive() && actor.contains(point) && marks.mark(slot) && actor_hit.is_none()
            {
                actor_hit = Some(ActorHit {
                    actor: actor.id,
                    distance,
                });
            }
        }

        let tile = tiles.tile_at(
            (point.x / tile_size).floor() as i64,
            (point.y / tile_size).floor() as i64,
        );
        if tile.is_solid() {
            debug_assert!(
                actor_hit.map_or(true, |hit| hit.distance <= distance),
                "actor recorded beyond the wall that ended the ray"
            );
            return RayHit {
                wall: Some(WallHit { distance, tile }),
                actor: actor_hit,
            };
        }
    }

    RayHit {
        wall: None,
        actor: actor_hit,
    }
}

/// Projected half-extent of a strip: `fraction × screen_height × tile_size / max(distance, 1)`.
#[must_use]
pub fn projected_height(fraction: f32, screen_height: u32, tile_size: u32, distance: f32) -> f32 {
    if !distance.is_finite() {
        return 0.0;
    }
    fraction * (screen_height as f32 * tile_size as f32 / distance.max(1.0))
}

/// Darkens `base` by `distance / shade_divisor`; black beyond `view_distance`.
#[must_use]
pub fn shade(base: Rgb, distance: f32, config: &ViewConfig) -> Rgb {
    if distance > config.view_distance {
        return Rgb::BLACK;
    }
    base.darken(distance / config.shade_divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcaster_core::ActorId;

    #[test]
    fn ray_offsets_span_the_field_of_view() {
        let fov = 1.0;
        assert!((ray_offset(fov, 0, 100) + 0.5).abs() < 1e-6);
        assert!(ray_offset(fov, 50, 100).abs() < 1e-6);
        assert!((ray_offset(fov, 99, 100) - 0.49).abs() < 1e-5);
        assert_eq!(ray_offset(fov, 0, 0), 0.0);
    }

    #[test]
    fn projected_height_guards_zero_distance() {
        assert_eq!(projected_height(0.5, 100, 10, 0.0), 500.0);
        assert_eq!(projected_height(0.5, 100, 10, 0.5), 500.0);
        assert_eq!(projected_height(0.5, 100, 10, 10.0), 50.0);
        assert_eq!(projected_height(0.5, 100, 10, f32::INFINITY), 0.0);
    }

    #[test]
    fn projected_height_never_grows_with_distance() {
        let mut previous = f32::INFINITY;
        for step in 0..2000 {
            let height = projected_height(0.5, 480, 64, step as f32 * 0.5);
            assert!(height <= previous);
            previous = height;
        }
    }

    #[test]
    fn shading_turns_black_past_view_distance() {
        let config = ViewConfig {
            view_distance: 100.0,
            shade_divisor: 2.0,
            ..ViewConfig::default()
        };
        let base = Rgb::from_rgb(200, 100, 10);

        assert_eq!(shade(base, 0.0, &config), base);
        assert_eq!(shade(base, 40.0, &config), Rgb::from_rgb(180, 80, 0));
        assert_eq!(shade(base, 100.5, &config), Rgb::BLACK);
    }

    #[test]
    fn ray_marks_flag_each_slot_once() {
        let mut marks = RayMarks::default();
        marks.reset(2);

        assert!(marks.mark(1));
        assert!(!marks.mark(1));
        assert!(!marks.mark(5));

        marks.reset(2);
        assert!(marks.mark(1));
    }

    #[test]
    fn dead_actors_are_skipped_even_when_passed_in() {
        let tiles = [TileCode::Empty, TileCode::Empty, TileCode::Wall];
        let view = TileView::new(&tiles, 3, 1, 10);
        let dead = ActorSnapshot {
            id: ActorId::new(0),
            position: Vec2::new(15.0, 5.0),
            half_width: 3.0,
            health: 0,
            max_health: 2,
        };
        let mut marks = RayMarks::default();

        let hit = cast_ray(
            &ViewConfig::default(),
            Vec2::new(2.0, 5.0),
            0.0,
            view,
            &[dead],
            &mut marks,
        );

        assert!(hit.actor.is_none());
        assert_eq!(
            hit.wall,
            Some(WallHit {
                distance: 18.0,
                tile: TileCode::Wall
            })
        );
    }
}
