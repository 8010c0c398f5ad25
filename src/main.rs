//! physdraw demo
//!
//! Headless run: builds a seeded scene in a `MemoryWorld`, drags one ball with
//! a scripted pointer and logs what the drawer emits each frame.
//!
//! Usage: `physdraw-demo [config.json]` (set `RUST_LOG=debug` to see grabs)

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use physdraw::camera::Camera;
use physdraw::input::{PointerEvent, PointerInput};
use physdraw::renderer::{Drawer, MeshBatch, plan_passes};
use physdraw::theme::DrawerConfig;
use physdraw::world::{
    Body, BodyHandle, Constraint, ConstraintKind, ContactManifold, ContactPoint, MemoryWorld,
    PhysicsWorld, Shape, ShapeFilter,
};

const SEED: u64 = 0x0d15_ea5e;
const BALL_COUNT: usize = 12;
const FRAMES: usize = 24;
const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

/// Walls, random balls, a box, a spring and a pin; returns the ball to drag
fn build_scene(world: &mut MemoryWorld, rng: &mut Pcg32) -> Option<BodyHandle> {
    let ground = world.add_body(Body::fixed());
    let walls = [
        (Vec2::new(-320.0, 0.0), Vec2::new(320.0, 0.0)),
        (Vec2::new(-320.0, 0.0), Vec2::new(-320.0, 480.0)),
        (Vec2::new(320.0, 0.0), Vec2::new(320.0, 480.0)),
    ];
    for (a, b) in walls {
        world.add_shape(Shape::segment(ground, a, b, 4.0).with_filter(ShapeFilter::NOT_GRABBABLE))?;
    }

    let mut balls = Vec::with_capacity(BALL_COUNT);
    for _ in 0..BALL_COUNT {
        let radius = rng.random_range(8.0..24.0);
        let position = Vec2::new(rng.random_range(-280.0..280.0), rng.random_range(40.0..440.0));
        let mut body = Body::dynamic(radius * radius * 0.01)
            .at(position)
            .rotated(rng.random_range(0.0..std::f32::consts::TAU));
        body.idle_time = rng.random_range(0.0..1.0);
        body.sleeping = rng.random_bool(0.2);
        let handle = world.add_body(body);
        world.add_shape(Shape::circle(handle, radius, Vec2::ZERO))?;
        balls.push(handle);
    }

    let crate_body = world.add_body(Body::dynamic(4.0).at(Vec2::new(0.0, 30.0)).rotated(0.3));
    world.add_shape(Shape::boxed(crate_body, 60.0, 40.0, 2.0))?;
    world.add_contact(ContactManifold {
        body_a: crate_body,
        body_b: ground,
        normal: Vec2::new(0.0, -1.0),
        points: vec![
            ContactPoint {
                r1: Vec2::new(-25.0, -25.0),
                r2: Vec2::new(-25.0, 0.0),
            },
            ContactPoint {
                r1: Vec2::new(25.0, -20.0),
                r2: Vec2::new(25.0, 0.0),
            },
        ],
    });

    if let &[first, second, ..] = balls.as_slice() {
        world.add_constraint(Constraint::new(
            first,
            second,
            ConstraintKind::DampedSpring {
                anchor_a: Vec2::ZERO,
                anchor_b: Vec2::ZERO,
                rest_length: 100.0,
                stiffness: 20.0,
                damping: 0.5,
            },
        ));
        world.add_constraint(Constraint::new(
            ground,
            second,
            ConstraintKind::Pin {
                anchor_a: Vec2::new(0.0, 470.0),
                anchor_b: Vec2::ZERO,
            },
        ));
    }

    balls.last().copied()
}

fn load_config() -> DrawerConfig {
    let Some(path) = std::env::args().nth(1) else {
        return DrawerConfig::default();
    };
    let loaded = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| DrawerConfig::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(config) => {
            log::info!("Loaded config from {}", path);
            config
        }
        Err(e) => {
            log::error!("Config {} unusable ({}), using defaults", path, e);
            DrawerConfig::default()
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("physdraw demo starting (seed {:#x})", SEED);

    let mut rng = Pcg32::seed_from_u64(SEED);
    let mut world = MemoryWorld::new();
    let Some(target) = build_scene(&mut world, &mut rng) else {
        log::error!("Scene setup failed");
        return;
    };

    let camera = Camera::new(Vec2::new(0.0, 240.0), VIEWPORT).with_y_up();
    let mut drawer = Drawer::with_config(load_config());
    drawer.set_view(camera.transform());

    let mut input = PointerInput::new();
    let mut batch = MeshBatch::new();

    for frame in 0..FRAMES {
        let Some(position) = world.body(target).map(|b| b.position) else {
            break;
        };
        let grip = camera.world_to_screen(position);

        // Press on the ball, drag it right for a while, let go
        match frame {
            0 => {
                input.apply(PointerEvent::CursorMoved(grip));
                input.apply(PointerEvent::LeftPressed);
            }
            f if f < FRAMES - 4 => {
                input.apply(PointerEvent::CursorMoved(grip + Vec2::new(6.0 * f as f32, 0.0)));
            }
            f if f == FRAMES - 4 => input.apply(PointerEvent::LeftReleased),
            _ => {}
        }

        drawer.handle_mouse_event(&mut world, &input);
        input.end_frame();

        batch.clear();
        let stats = drawer.draw_space(&world, &mut batch);
        let passes = plan_passes(batch.calls());
        log::info!(
            "frame {:2}: {:?} | {} shapes, {} constraints, {} contacts, {} triangles in {} calls, {} GPU passes",
            frame,
            drawer.drag().state(),
            stats.static_shapes + stats.dynamic_shapes,
            stats.constraints,
            stats.contacts,
            stats.triangles,
            batch.calls().len(),
            passes.len(),
        );
    }

    drawer.drag_mut().detach(&mut world);
    log::info!(
        "physdraw demo finished: {} bodies, {} constraints left",
        world.body_count(),
        world.constraint_count()
    );
}
