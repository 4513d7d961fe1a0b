use std::time::{Duration, Instant};

use gridcaster_core::{Command, Event};
use gridcaster_rendering::{
    Compositor, FrameBuffer, FrameInput, FrameSimulationBreakdown, MinimapScene, Scene, Sprite,
    WeaponOverlay,
};
use gridcaster_system_motion::Motion;
use gridcaster_system_raycaster::RayCaster;
use gridcaster_system_weapon::Weapon;
use gridcaster_world::{self as world, query, World, WorldError};

use crate::GameConfig;

/// Owns the world and every system, and advances them one frame at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    motion: Motion,
    weapon: Weapon,
    caster: RayCaster,
    compositor: Compositor,
    weapon_sprite: Option<Sprite>,
    minimap_enabled: bool,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Builds the world described by `config`; `weapon_sprite` is drawn over the view when given.
    pub fn new(config: &GameConfig, weapon_sprite: Option<Sprite>) -> Result<Self, WorldError> {
        config.validate()?;
        let world = World::new(&config.world, &config.weapon)?;
        Ok(Self {
            world,
            motion: Motion::new(config.motion),
            weapon: Weapon::new(),
            caster: RayCaster::new(config.view, config.palette),
            compositor: Compositor::new(
                config.palette,
                config.screen.minimap_scale,
                config.weapon.recoil_offset,
            ),
            weapon_sprite,
            minimap_enabled: config.screen.minimap_enabled,
            events: Vec::new(),
            commands: Vec::new(),
        })
    }

    /// Advances one frame of `dt` and repaints `frame`.
    ///
    /// Order: tick, motion, weapon, ray casting, damage, composition.
    pub fn step(
        &mut self,
        dt: Duration,
        input: FrameInput,
        frame: &mut FrameBuffer,
    ) -> FrameSimulationBreakdown {
        let simulation_start = Instant::now();
        if input.toggle_minimap {
            self.minimap_enabled = !self.minimap_enabled;
            log::debug!("minimap {}", if self.minimap_enabled { "shown" } else { "hidden" });
        }

        self.events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let tiles = query::tile_view(&self.world);
        self.motion.handle(
            &self.events,
            input.motion_intent(),
            query::pose(&self.world),
            |point| tiles.is_solid_at(point),
            &mut self.commands,
        );
        self.weapon
            .handle(input.fire, query::weapon(&self.world), &mut self.commands);
        self.flush_commands();
        let mut simulation = simulation_start.elapsed();

        let raycast_start = Instant::now();
        let actors = query::actor_view(&self.world);
        let strips = self.caster.handle(
            &self.events,
            query::pose(&self.world),
            query::tile_view(&self.world),
            &actors,
            frame.width(),
            frame.height(),
            &mut self.commands,
        );
        let raycast = raycast_start.elapsed();

        let damage_start = Instant::now();
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        simulation += damage_start.elapsed();

        let composite_start = Instant::now();
        let actors = query::actor_view(&self.world);
        let weapon = query::weapon(&self.world);
        let scene = Scene {
            strips,
            minimap: self.minimap_enabled.then(|| MinimapScene {
                tiles: query::tile_view(&self.world),
                player: query::pose(&self.world).position,
                actors: &actors,
            }),
            weapon: self.weapon_sprite.as_ref().map(|sprite| WeaponOverlay {
                sprite,
                recoil: weapon.recoil_fraction(),
            }),
        };
        self.compositor.compose(frame, &scene);
        let composite = composite_start.elapsed();

        for event in &self.events {
            if let Event::ActorContact { actor } = event {
                log::debug!("player touching actor {}", actor.get());
            }
        }

        FrameSimulationBreakdown {
            simulation,
            raycast,
            composite,
        }
    }

    /// Borrows the world for inspection.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events produced during the most recent frame.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether the minimap is currently drawn.
    #[must_use]
    pub fn minimap_enabled(&self) -> bool {
        self.minimap_enabled
    }

    /// Logs the current frame count, pose and surviving actors.
    pub fn log_summary(&self) {
        let pose = query::pose(&self.world);
        let actors = query::actor_view(&self.world);
        log::info!(
            "frame {} after {:.2}s: player at ({:.1}, {:.1}) heading {:.2}, {}/{} actors alive",
            query::frame_index(&self.world),
            query::elapsed(&self.world).as_secs_f32(),
            pose.position.x,
            pose.position.y,
            pose.heading,
            actors.iter_live().count(),
            actors.len(),
        );
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
