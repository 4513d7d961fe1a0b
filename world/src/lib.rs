#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Gridcaster.
//!
//! The world owns the immutable tile grid, the player pose, the actor
//! registry and the weapon timers. It changes only through [`apply`] and is
//! observed through the [`query`] module.

mod actors;
mod tiles;

use std::time::Duration;

use glam::Vec2;
use gridcaster_core::{
    Command, ConfigError, Event, Pose, WeaponConfig, WeaponSnapshot, WorldConfig,
};

use self::actors::ActorRegistry;
pub use self::tiles::{LayoutError, TileMap};

/// Errors raised while constructing a world from configuration.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A scalar configuration field was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The layout could not be parsed.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// The player would start inside a wall or outside the grid.
    #[error("player start ({x}, {y}) lies in a solid or out-of-grid cell")]
    BlockedStart {
        /// Horizontal start position.
        x: f32,
        /// Vertical start position.
        y: f32,
    },
    /// An actor spawn lies outside the grid.
    #[error("actor {index} at ({x}, {y}) lies outside the grid")]
    ActorOutsideGrid {
        /// Registry slot of the offending spawn.
        index: usize,
        /// Horizontal spawn position.
        x: f32,
        /// Vertical spawn position.
        y: f32,
    },
}

#[derive(Clone, Copy, Debug)]
struct WeaponTimers {
    cooldown: Duration,
    recoil: Duration,
    ready_in: Duration,
    recoil_remaining: Duration,
}

impl WeaponTimers {
    fn new(config: &WeaponConfig) -> Self {
        Self {
            cooldown: config.fire_cooldown(),
            recoil: config.recoil(),
            ready_in: Duration::ZERO,
            recoil_remaining: Duration::ZERO,
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.ready_in = self.ready_in.saturating_sub(dt);
        self.recoil_remaining = self.recoil_remaining.saturating_sub(dt);
    }

    fn try_fire(&mut self) -> bool {
        if !self.ready_in.is_zero() {
            return false;
        }
        self.ready_in = self.cooldown;
        self.recoil_remaining = self.recoil;
        true
    }

    fn snapshot(&self) -> WeaponSnapshot {
        WeaponSnapshot {
            ready_in: self.ready_in,
            recoil_remaining: self.recoil_remaining,
            recoil_duration: self.recoil,
        }
    }
}

/// Represents the authoritative Gridcaster world state.
#[derive(Debug)]
pub struct World {
    tile_map: TileMap,
    pose: Pose,
    actors: ActorRegistry,
    weapon: WeaponTimers,
    frame_index: u64,
    elapsed: Duration,
}

impl World {
    /// Creates a world from validated configuration.
    pub fn new(config: &WorldConfig, weapon: &WeaponConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let tile_map = TileMap::from_rows(&config.layout, config.tile_size)?;

        let start = config.player_start;
        let position = Vec2::new(start.x, start.y);
        if tile_map.is_solid_at(position) {
            return Err(WorldError::BlockedStart {
                x: start.x,
                y: start.y,
            });
        }

        if let Some((index, spawn)) = config
            .actors
            .iter()
            .enumerate()
            .find(|(_, spawn)| tile_map.cell_at(Vec2::new(spawn.x, spawn.y)).is_none())
        {
            return Err(WorldError::ActorOutsideGrid {
                index,
                x: spawn.x,
                y: spawn.y,
            });
        }

        let actors =
            ActorRegistry::from_spawns(&config.actors, config.actor_health, config.actor_half_width);

        Ok(Self {
            tile_map,
            pose: Pose::new(position, start.heading),
            actors,
            weapon: WeaponTimers::new(weapon),
            frame_index: 0,
            elapsed: Duration::ZERO,
        })
    }

    fn push_contacts(&self, out_events: &mut Vec<Event>) {
        for actor in self.actors.iter_live() {
            if actor.contains(self.pose.position) {
                out_events.push(Event::ActorContact { actor: actor.id });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.frame_index = world.frame_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            world.actors.begin_frame();
            world.weapon.advance(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::UpdatePose { pose } => {
            let from = world.pose;
            let mut to = Pose::new(pose.position, pose.heading);
            if world.tile_map.is_solid_at(to.position) {
                log::debug!(
                    "rejecting pose inside solid cell at ({:.1}, {:.1})",
                    to.position.x,
                    to.position.y
                );
                to.position = from.position;
            }
            if to == from {
                return;
            }
            world.pose = to;
            out_events.push(Event::PoseUpdated { from, to });
            world.push_contacts(out_events);
        }
        Command::FireWeapon => {
            if world.weapon.try_fire() {
                log::info!("weapon fired on frame {}", world.frame_index);
                out_events.push(Event::WeaponFired);
            } else {
                log::debug!("weapon not ready; fire request ignored");
            }
        }
        Command::DamageActor { actor } => match world.actors.apply_damage(actor) {
            Ok(remaining) => {
                out_events.push(Event::ActorDamaged { actor, remaining });
                if remaining == 0 {
                    log::info!("actor {} killed", actor.get());
                    out_events.push(Event::ActorKilled { actor });
                }
            }
            Err(reason) => {
                log::debug!("damage to actor {} rejected: {reason}", actor.get());
                out_events.push(Event::DamageRejected { actor, reason });
            }
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use gridcaster_core::{ActorView, Pose, TileView, WeaponSnapshot};

    use super::World;

    /// Borrows the tile grid as a view for systems.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        world.tile_map.view()
    }

    /// Current player pose.
    #[must_use]
    pub fn pose(world: &World) -> Pose {
        world.pose
    }

    /// Captures a read-only view of every actor in registry order.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        world.actors.view()
    }

    /// Current weapon timers.
    #[must_use]
    pub fn weapon(world: &World) -> WeaponSnapshot {
        world.weapon.snapshot()
    }

    /// Number of frames started so far.
    #[must_use]
    pub fn frame_index(world: &World) -> u64 {
        world.frame_index
    }

    /// Total simulated time.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcaster_core::{ActorId, ActorSpawn, DamageError, PlayerStart};

    fn small_world() -> World {
        let config = WorldConfig {
            layout: vec![
                "%%%%%".to_owned(),
                "%...%".to_owned(),
                "%.#.%".to_owned(),
                "%...%".to_owned(),
                "%%%%%".to_owned(),
            ],
            tile_size: 10,
            player_start: PlayerStart {
                x: 15.0,
                y: 15.0,
                heading: 0.0,
            },
            actors: vec![ActorSpawn { x: 35.0, y: 15.0 }],
            actor_health: 2,
            actor_half_width: 3.0,
        };
        World::new(&config, &WeaponConfig::default()).expect("valid world")
    }

    #[test]
    fn construction_rejects_start_inside_wall() {
        let config = WorldConfig {
            player_start: PlayerStart {
                x: 5.0,
                y: 5.0,
                heading: 0.0,
            },
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::new(&config, &WeaponConfig::default()),
            Err(WorldError::BlockedStart { .. })
        ));
    }

    #[test]
    fn construction_rejects_actor_outside_grid() {
        let config = WorldConfig {
            actors: vec![ActorSpawn { x: -4.0, y: 10.0 }],
            ..WorldConfig::default()
        };
        assert!(matches!(
            World::new(&config, &WeaponConfig::default()),
            Err(WorldError::ActorOutsideGrid { index: 0, .. })
        ));
    }

    #[test]
    fn tick_resets_damage_latch() {
        let mut world = small_world();
        let mut events = Vec::new();
        let actor = ActorId::new(0);

        apply(&mut world, Command::DamageActor { actor }, &mut events);
        apply(&mut world, Command::DamageActor { actor }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::ActorDamaged {
                    actor,
                    remaining: 1
                },
                Event::DamageRejected {
                    actor,
                    reason: DamageError::AlreadyDamaged
                },
            ]
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        apply(&mut world, Command::DamageActor { actor }, &mut events);
        assert!(events.contains(&Event::ActorKilled { actor }));
        assert_eq!(query::actor_view(&world).iter_live().count(), 0);
    }

    #[test]
    fn pose_into_wall_keeps_position_but_turns() {
        let mut world = small_world();
        let mut events = Vec::new();
        let before = query::pose(&world);

        apply(
            &mut world,
            Command::UpdatePose {
                pose: Pose::new(Vec2::new(25.0, 25.0), 1.0),
            },
            &mut events,
        );

        let after = query::pose(&world);
        assert_eq!(after.position, before.position);
        assert!((after.heading - 1.0).abs() < 1e-6);
    }

    #[test]
    fn walking_into_actor_reports_contact() {
        let mut world = small_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::UpdatePose {
                pose: Pose::new(Vec2::new(33.0, 15.0), 0.0),
            },
            &mut events,
        );

        assert!(events.contains(&Event::ActorContact {
            actor: ActorId::new(0)
        }));
    }

    #[test]
    fn weapon_respects_cooldown() {
        let mut world = small_world();
        let mut events = Vec::new();

        apply(&mut world, Command::FireWeapon, &mut events);
        apply(&mut world, Command::FireWeapon, &mut events);
        assert_eq!(events, vec![Event::WeaponFired]);
        assert!(!query::weapon(&world).is_ready());

        apply(
            &mut world,
            Command::Tick {
                dt: WeaponConfig::default().fire_cooldown(),
            },
            &mut events,
        );
        assert!(query::weapon(&world).is_ready());
        assert_eq!(query::weapon(&world).recoil_remaining, Duration::ZERO);
        assert_eq!(query::frame_index(&world), 1);
    }
}
