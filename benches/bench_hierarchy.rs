use criterion::{criterion_group, criterion_main, Criterion};
use scene_graph::prelude::*;
use scene_graph::transform::Frame;
use std::hint::black_box;

fn bench_flat_objects(c: &mut Criterion) {
    c.bench_function("flat_1000_objects", |b| {
        b.iter(|| {
            let mut scene = Scene::new();
            for i in 0..1000 {
                black_box(scene.spawn(format!("object{i}")));
            }
        })
    });
}

fn bench_hierarchy_creation(c: &mut Criterion) {
    c.bench_function("hierarchy_1_root_100_children", |b| {
        b.iter(|| {
            let mut scene = Scene::new();
            let root = scene.spawn("root");
            for _ in 0..100 {
                black_box(scene.spawn_child(root, "child").unwrap());
            }
        })
    });
}

fn bench_hierarchy_deep_tree(c: &mut Criterion) {
    c.bench_function("hierarchy_deep_20_levels", |b| {
        b.iter(|| {
            let mut scene = Scene::new();
            let mut parent = scene.spawn("root");
            for _ in 0..20 {
                parent = black_box(scene.spawn_child(parent, "node").unwrap());
            }
        })
    });
}

fn bench_root_move_propagation(c: &mut Criterion) {
    let mut scene = Scene::new();
    let root = scene.spawn("root");
    let mut frontier = vec![root];
    // 4-ary tree, 5 levels
    for _ in 0..5 {
        let mut next = Vec::new();
        for &parent in &frontier {
            for _ in 0..4 {
                let child = scene.spawn_child(parent, "node").unwrap();
                scene.set_local_position(child, Vec2::new(1.0, 0.5)).unwrap();
                next.push(child);
            }
        }
        frontier = next;
    }

    let mut x = 0.0;
    c.bench_function("propagate_root_move_1365_objects", |b| {
        b.iter(|| {
            x += 1.0;
            scene.set_local_position(root, Vec2::new(x, 0.0)).unwrap();
            black_box(scene.transform(frontier[0]).unwrap().world_position());
        })
    });
}

fn bench_reparent(c: &mut Criterion) {
    let mut scene = Scene::new();
    let a = scene.spawn("a");
    let b = scene.spawn("b");
    let child = scene.spawn_child(a, "child").unwrap();
    for _ in 0..50 {
        scene.spawn_child(child, "leaf").unwrap();
    }

    let mut flip = false;
    c.bench_function("reparent_subtree_51_objects", |bench| {
        bench.iter(|| {
            flip = !flip;
            let target = if flip { b } else { a };
            scene.set_parent(child, Some(target)).unwrap();
        })
    });
}

fn bench_frame_composition(c: &mut Criterion) {
    c.bench_function("frame_transform_point", |b| {
        let parent = Frame {
            position: Vec2::new(100.0, 200.0),
            rotation: 0.5,
            scale: Vec2::splat(2.0),
        };
        let local = Vec2::new(10.0, 20.0);

        b.iter(|| {
            black_box(parent.transform_point(black_box(local)));
        })
    });
}

criterion_group!(
    benches,
    bench_flat_objects,
    bench_hierarchy_creation,
    bench_hierarchy_deep_tree,
    bench_root_move_propagation,
    bench_reparent,
    bench_frame_composition
);
criterion_main!(benches);
