//! Example: Basic scene graph usage
//!
//! Builds a ship with a turret child, moves the ship with a processor and
//! lets the turret track a target on its own.

use scene_graph::prelude::*;
use std::time::Duration;

#[derive(Default)]
struct Thruster {
    state: ComponentState,
    speed: f32,
}
impl_component!(Thruster);

/// Turns its owner toward a fixed world point every frame.
struct Tracker {
    state: ComponentState,
    target: Vec2,
}
impl_component!(Tracker, self_updating);

impl SelfUpdatingComponent for Tracker {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Result<()> {
        ctx.scene.look_at(ctx.owner, self.target)
    }
}

fn thrust(thruster: &mut Thruster, ctx: &mut UpdateContext<'_>) -> Result<()> {
    let distance = Vec2::new(thruster.speed * ctx.delta_seconds(), 0.0);
    ctx.scene.translate(ctx.owner, distance)
}

fn main() -> Result<()> {
    let mut scene = Scene::new();

    println!("Creating game objects...");
    let ship = scene.spawn("ship");
    let turret = scene.spawn_child(ship, "turret")?;
    scene.set_local_position(turret, Vec2::new(0.0, -1.0))?;
    scene.add(
        turret,
        Tracker {
            state: ComponentState::new(),
            target: Vec2::new(10.0, 10.0),
        },
    )?;

    let mut thrusters = ComponentProcessor::<Thruster, _>::new(thrust);
    thrusters.add(&mut scene, ship)?.speed = 2.0;

    let mut time = Time::new();
    for _ in 0..60 {
        let frame = time.advance(Duration::from_millis(16));
        thrusters.update(&mut scene, frame)?;
        scene.update(frame)?;
    }

    println!("After {} frames:", time.frame_count());
    SceneInspector::print_summary(&scene);
    Ok(())
}
