use std::{cell::RefCell, rc::Rc, time::Duration};

use gridcaster_cli::{GameConfig, Simulation};
use gridcaster_core::{
    ActorId, ActorSpawn, Event, PlayerStart, ScreenConfig, WorldConfig,
};
use gridcaster_rendering::{
    pack_rgb, FrameBuffer, FrameInput, HeadlessBackend, Presentation, RenderingBackend, Sprite,
    MINIMAP_MARGIN,
};
use gridcaster_world::query;

const FRAME: Duration = Duration::from_millis(16);

fn config() -> GameConfig {
    GameConfig {
        world: WorldConfig {
            layout: vec![
                "%%%%%%%%%%".to_owned(),
                "%........%".to_owned(),
                "%........%".to_owned(),
                "%........%".to_owned(),
                "%%%%%%%%%%".to_owned(),
            ],
            tile_size: 16,
            player_start: PlayerStart {
                x: 24.0,
                y: 40.0,
                heading: 0.0,
            },
            actors: vec![ActorSpawn { x: 100.0, y: 40.0 }],
            actor_health: 2,
            actor_half_width: 8.0,
        },
        screen: ScreenConfig {
            width: 64,
            height: 48,
            minimap_scale: 2,
            minimap_enabled: true,
            pixel_scale: 1,
        },
        ..GameConfig::default()
    }
}

fn frame_buffer() -> FrameBuffer {
    FrameBuffer::new(64, 48).expect("valid frame")
}

fn fire() -> FrameInput {
    FrameInput {
        fire: true,
        ..FrameInput::default()
    }
}

fn actor_health(simulation: &Simulation) -> u32 {
    query::actor_view(simulation.world())
        .get(ActorId::new(0))
        .expect("actor registered")
        .health
}

#[test]
fn firing_at_an_actor_in_view_removes_one_health() {
    let mut simulation = Simulation::new(&config(), None).expect("valid config");
    let mut frame = frame_buffer();

    let _ = simulation.step(FRAME, fire(), &mut frame);

    assert!(simulation.events().contains(&Event::WeaponFired));
    assert!(simulation.events().contains(&Event::ActorDamaged {
        actor: ActorId::new(0),
        remaining: 1
    }));
    assert_eq!(actor_health(&simulation), 1);
}

#[test]
fn held_trigger_respects_the_cooldown() {
    let mut simulation = Simulation::new(&config(), None).expect("valid config");
    let mut frame = frame_buffer();

    for _ in 0..10 {
        let _ = simulation.step(FRAME, fire(), &mut frame);
    }

    assert_eq!(actor_health(&simulation), 1);
}

#[test]
fn second_shot_after_cooldown_kills_the_actor() {
    let mut simulation = Simulation::new(&config(), None).expect("valid config");
    let mut frame = frame_buffer();
    let mut killed = false;

    for _ in 0..20 {
        let _ = simulation.step(FRAME, fire(), &mut frame);
        killed |= simulation.events().contains(&Event::ActorKilled {
            actor: ActorId::new(0),
        });
    }

    assert!(killed);
    assert_eq!(query::actor_view(simulation.world()).iter_live().count(), 0);
}

#[test]
fn forward_input_moves_the_player() {
    let mut simulation = Simulation::new(&config(), None).expect("valid config");
    let mut frame = frame_buffer();
    let input = FrameInput {
        forward: true,
        ..FrameInput::default()
    };

    let _ = simulation.step(Duration::from_millis(100), input, &mut frame);

    let pose = query::pose(simulation.world());
    assert!((pose.position.x - 36.8).abs() < 1e-3);
    assert!((pose.position.y - 40.0).abs() < 1e-3);
}

#[test]
fn minimap_toggle_hides_the_overlay() {
    let config = config();
    let minimap_wall = pack_rgb(config.palette.minimap_wall);
    let corner = i64::from(MINIMAP_MARGIN);
    let mut simulation = Simulation::new(&config, None).expect("valid config");
    let mut frame = frame_buffer();

    let _ = simulation.step(FRAME, FrameInput::default(), &mut frame);
    assert!(simulation.minimap_enabled());
    assert_eq!(frame.pixel(corner, corner), Some(minimap_wall));

    let toggle = FrameInput {
        toggle_minimap: true,
        ..FrameInput::default()
    };
    let _ = simulation.step(FRAME, toggle, &mut frame);
    assert!(!simulation.minimap_enabled());
    assert_ne!(frame.pixel(corner, corner), Some(minimap_wall));
}

#[test]
fn weapon_sprite_is_drawn_bottom_centre() {
    let sprite = Sprite::new(2, 2, vec![0xFF12_3456; 4]).expect("valid sprite");
    let mut simulation = Simulation::new(&config(), Some(sprite)).expect("valid config");
    let mut frame = frame_buffer();

    let _ = simulation.step(FRAME, FrameInput::default(), &mut frame);

    assert_eq!(frame.pixel(31, 46), Some(0xFF12_3456));
    assert_eq!(frame.pixel(32, 47), Some(0xFF12_3456));
}

#[test]
fn blocked_start_is_reported() {
    let mut config = config();
    config.world.player_start = PlayerStart {
        x: 4.0,
        y: 4.0,
        heading: 0.0,
    };

    assert!(Simulation::new(&config, None).is_err());
}

#[test]
fn headless_backend_drives_the_simulation_until_quit() {
    let simulation = Rc::new(RefCell::new(
        Simulation::new(&config(), None).expect("valid config"),
    ));
    let stepper = Rc::clone(&simulation);
    let mut script = vec![FrameInput::default(); 3];
    script.push(FrameInput {
        quit: true,
        ..FrameInput::default()
    });
    let presentation = Presentation::new("test", 64, 48).expect("valid presentation");

    HeadlessBackend::new(60)
        .with_dt(FRAME)
        .with_script(script)
        .run(presentation, move |dt, input, frame| {
            stepper.borrow_mut().step(dt, input, frame)
        })
        .expect("headless run");

    assert_eq!(query::frame_index(simulation.borrow().world()), 3);
}
