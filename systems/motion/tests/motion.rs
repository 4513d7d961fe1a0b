use std::time::Duration;

use glam::Vec2;
use gridcaster_core::{
    Command, Event, MotionConfig, MotionIntent, MoveIntent, PlayerStart, TurnIntent,
    WeaponConfig, WorldConfig,
};
use gridcaster_system_motion::Motion;
use gridcaster_world::{self as world, query, World};

fn corridor_world(start_x: f32) -> World {
    let config = WorldConfig {
        layout: vec![
            "%%%%%%".to_owned(),
            "%..#.%".to_owned(),
            "%%%%%%".to_owned(),
        ],
        tile_size: 10,
        player_start: PlayerStart {
            x: start_x,
            y: 15.0,
            heading: 0.0,
        },
        actors: Vec::new(),
        actor_health: 1,
        actor_half_width: 1.0,
    };
    World::new(&config, &WeaponConfig::default()).expect("valid world")
}

fn step(world: &mut World, motion: &mut Motion, intent: MotionIntent, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let pose = query::pose(world);
    let tiles = query::tile_view(world);
    let mut commands = Vec::new();
    motion.handle(
        &events,
        intent,
        pose,
        |point| tiles.is_solid_at(point),
        &mut commands,
    );

    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[test]
fn open_floor_moves_player_forward() {
    let mut world = corridor_world(12.0);
    let mut motion = Motion::new(MotionConfig {
        move_speed: 5.0,
        rotation_speed: 1.0,
    });

    let events = step(
        &mut world,
        &mut motion,
        MotionIntent::new(MoveIntent::Forward, TurnIntent::None),
        Duration::from_secs(1),
    );

    let pose = query::pose(&world);
    assert!((pose.position.x - 17.0).abs() < 1e-4);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PoseUpdated { .. })));
}

#[test]
fn blocked_move_keeps_position_but_still_turns() {
    let mut world = corridor_world(27.0);
    let mut motion = Motion::new(MotionConfig {
        move_speed: 5.0,
        rotation_speed: 0.5,
    });
    let before = query::pose(&world);

    let _ = step(
        &mut world,
        &mut motion,
        MotionIntent::new(MoveIntent::Forward, TurnIntent::Right),
        Duration::from_secs(1),
    );

    let after = query::pose(&world);
    assert_eq!(after.position, before.position);
    assert!((after.heading - 0.5).abs() < 1e-5);
}

#[test]
fn rejection_is_atomic_rather_than_sliding() {
    let mut world = corridor_world(27.0);
    let mut motion = Motion::new(MotionConfig {
        move_speed: 5.0,
        rotation_speed: 1.0,
    });

    // Heading diagonally into the wall: the free vertical component is not applied either.
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UpdatePose {
            pose: gridcaster_core::Pose::new(Vec2::new(27.0, 15.0), 0.3),
        },
        &mut events,
    );
    let before = query::pose(&world);

    let _ = step(
        &mut world,
        &mut motion,
        MotionIntent::new(MoveIntent::Forward, TurnIntent::None),
        Duration::from_secs(1),
    );

    assert_eq!(query::pose(&world).position, before.position);
}

#[test]
fn leaving_the_grid_is_blocked() {
    let mut world = corridor_world(12.0);
    let mut motion = Motion::new(MotionConfig {
        move_speed: 100.0,
        rotation_speed: 1.0,
    });
    let before = query::pose(&world);

    let _ = step(
        &mut world,
        &mut motion,
        MotionIntent::new(MoveIntent::Backward, TurnIntent::None),
        Duration::from_secs(1),
    );

    assert_eq!(query::pose(&world).position, before.position);
}
