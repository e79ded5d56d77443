#![allow(dead_code, unused_imports)]

use scene_graph::prelude::*;
use std::{fs::File, time::Duration};

#[derive(Default)]
struct Spin {
    state: ComponentState,
    speed: f32,
}
impl_component!(Spin);

impl Recyclable for Spin {
    fn recycle(&mut self) {
        self.speed = 0.0;
    }
}

fn spin(spin: &mut Spin, ctx: &mut UpdateContext<'_>) -> Result<()> {
    let radians = spin.speed * ctx.delta_seconds();
    let current = ctx.scene.transform(ctx.owner)?.local_rotation();
    ctx.scene.set_local_rotation(ctx.owner, current + radians)
}

#[cfg(feature = "profiling")]
#[tracing::instrument(skip(scene))]
fn build_forest(scene: &mut Scene, roots: usize, depth: usize) -> Result<Vec<GameObjectId>> {
    let mut leaves = Vec::with_capacity(roots);
    for r in 0..roots {
        if r % 100 == 0 {
            tracing::info!("Building tree {}/{}", r, roots);
        }
        let mut parent = scene.spawn(format!("root{r}"));
        scene.set_local_position(parent, Vec2::new(r as f32, 0.0))?;
        for d in 0..depth {
            parent = scene.spawn_child(parent, format!("node{r}.{d}"))?;
            scene.set_local_position(parent, Vec2::new(1.0, 0.0))?;
        }
        leaves.push(parent);
    }
    Ok(leaves)
}

#[cfg(feature = "profiling")]
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Set up tracing subscriber to write to a file
    let file = File::create("trace.json")?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut scene = Scene::new();
    let mut processor = PooledComponentProcessor::<Spin, _>::new(spin);

    println!("Building hierarchy...");
    let leaves = {
        let _span = tracing::info_span!("build").entered();
        build_forest(&mut scene, 1_000, 8)?
    };
    for &leaf in &leaves {
        processor.add(&mut scene, leaf)?.speed = 1.0;
    }

    println!("Profiling 300 frames over {} game objects...", scene.len());
    let mut time = Time::new();
    let mut diagnostics = Diagnostics::new();
    for _ in 0..300 {
        let frame = time.advance(Duration::from_millis(16));
        diagnostics.record_frame(frame);
        diagnostics.measure("processor.update", || processor.update(&mut scene, frame))?;
        diagnostics.measure("scene.update", || scene.update(frame))?;
    }

    println!("Simulated rate: {:.1} fps", diagnostics.frame_rate());
    println!("{}", serde_json::to_string_pretty(&diagnostics.report())?);
    let dump = processor.dump_debug_info(&scene)?;
    for line in dump.lines().take(8) {
        println!("{line}");
    }
    Ok(())
}

#[cfg(not(feature = "profiling"))]
fn main() {
    println!("profile_scene binary requires --features profiling");
}
