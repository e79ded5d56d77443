use scene_graph::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

fn approx(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < 0.001
}

fn approx_angle(a: f32, b: f32) -> bool {
    let diff = (a - b).rem_euclid(TAU);
    diff < 0.001 || TAU - diff < 0.001
}

fn world(scene: &Scene, id: GameObjectId) -> Vec2 {
    scene.transform(id).unwrap().world_position()
}

/// root -> a -> b -> c with local offsets (1,0), (0,1), (2,0)
fn chain() -> (Scene, [GameObjectId; 4]) {
    let mut scene = Scene::new();
    let root = scene.spawn("root");
    let a = scene.spawn_child(root, "a").unwrap();
    let b = scene.spawn_child(a, "b").unwrap();
    let c = scene.spawn_child(b, "c").unwrap();
    scene.set_local_position(a, Vec2::new(1.0, 0.0)).unwrap();
    scene.set_local_position(b, Vec2::new(0.0, 1.0)).unwrap();
    scene.set_local_position(c, Vec2::new(2.0, 0.0)).unwrap();
    (scene, [root, a, b, c])
}

#[test]
fn test_chain_accumulates_positions() {
    let (scene, [_, _, _, c]) = chain();
    assert!(approx(world(&scene, c), Vec2::new(3.0, 1.0)));
}

#[test]
fn test_moving_ancestor_moves_descendants_by_same_delta() {
    let (mut scene, [_, a, _, c]) = chain();
    let before = world(&scene, c);

    scene.set_local_position(a, Vec2::new(5.0, 5.0)).unwrap();

    assert!(approx(world(&scene, c) - before, Vec2::new(4.0, 5.0)));
}

#[test]
fn test_parent_rotation_rotates_child_offset() {
    let mut scene = Scene::new();
    let parent = scene.spawn("parent");
    let child = scene.spawn_child(parent, "child").unwrap();
    scene.set_local_position(parent, Vec2::new(10.0, 20.0)).unwrap();
    scene.set_local_position(child, Vec2::new(5.0, 0.0)).unwrap();

    scene.set_local_rotation(parent, FRAC_PI_2).unwrap();

    let transform = scene.transform(child).unwrap();
    assert!(approx(transform.world_position(), Vec2::new(10.0, 25.0)));
    assert!(approx_angle(transform.world_rotation(), FRAC_PI_2));
    assert!(approx(transform.forward(), Vec2::new(0.0, 1.0)));
}

#[test]
fn test_parent_scale_scales_child_offset() {
    let mut scene = Scene::new();
    let parent = scene.spawn("parent");
    let child = scene.spawn_child(parent, "child").unwrap();
    scene.set_local_scale(parent, Vec2::splat(2.0)).unwrap();
    scene.set_local_position(child, Vec2::new(1.0, 3.0)).unwrap();

    let transform = scene.transform(child).unwrap();
    assert!(approx(transform.world_position(), Vec2::new(2.0, 6.0)));
    assert_eq!(transform.world_scale(), Vec2::splat(2.0));
}

#[test]
fn test_rotation_is_normalized() {
    let mut scene = Scene::new();
    let go = scene.spawn("go");

    scene.set_local_rotation(go, -FRAC_PI_2).unwrap();
    let rotation = scene.transform(go).unwrap().local_rotation();
    assert!((rotation - 3.0 * FRAC_PI_2).abs() < 0.001);

    scene.set_local_rotation(go, 5.0 * PI).unwrap();
    assert!(approx_angle(scene.transform(go).unwrap().world_rotation(), PI));
}

#[test]
fn test_set_world_position_under_transformed_parent() {
    let mut scene = Scene::new();
    let parent = scene.spawn("parent");
    let child = scene.spawn_child(parent, "child").unwrap();
    scene.set_local_position(parent, Vec2::new(-3.0, 7.0)).unwrap();
    scene.set_local_rotation(parent, 0.8).unwrap();
    scene.set_local_scale(parent, Vec2::new(2.0, 0.5)).unwrap();

    let target = Vec2::new(12.0, -4.0);
    scene.set_world_position(child, target).unwrap();

    assert!(approx(world(&scene, child), target));
}

#[test]
fn test_set_world_position_unrotated_parent_subtracts() {
    let mut scene = Scene::new();
    let parent = scene.spawn("parent");
    let child = scene.spawn_child(parent, "child").unwrap();
    scene.set_local_position(parent, Vec2::new(4.0, 4.0)).unwrap();

    scene.set_world_position(child, Vec2::new(10.0, 6.0)).unwrap();

    let local = scene.transform(child).unwrap().local_position();
    assert!(approx(local, Vec2::new(6.0, 2.0)));
}

#[test]
fn test_set_world_rotation_subtracts_parent() {
    let mut scene = Scene::new();
    let parent = scene.spawn("parent");
    let child = scene.spawn_child(parent, "child").unwrap();
    scene.set_local_rotation(parent, 1.0).unwrap();

    scene.set_world_rotation(child, 0.5).unwrap();

    let transform = scene.transform(child).unwrap();
    assert!(approx_angle(transform.world_rotation(), 0.5));
    assert!(approx_angle(transform.local_rotation(), -0.5));
}

#[test]
fn test_reparent_keeps_local_values() {
    let mut scene = Scene::new();
    let left = scene.spawn("left");
    let right = scene.spawn("right");
    scene.set_local_position(left, Vec2::new(10.0, 0.0)).unwrap();
    scene.set_local_position(right, Vec2::new(0.0, 10.0)).unwrap();
    let child = scene.spawn_child(left, "child").unwrap();
    scene.set_local_position(child, Vec2::new(1.0, 0.0)).unwrap();
    assert!(approx(world(&scene, child), Vec2::new(11.0, 0.0)));

    scene.set_parent(child, Some(right)).unwrap();
    assert!(approx(world(&scene, child), Vec2::new(1.0, 10.0)));

    scene.set_parent(child, None).unwrap();
    assert!(approx(world(&scene, child), Vec2::new(1.0, 0.0)));
}

#[test]
fn test_replace_transform() {
    let mut scene = Scene::new();
    let parent = scene.spawn("parent");
    let go = scene.spawn_child(parent, "go").unwrap();
    scene.set_local_position(parent, Vec2::new(1.0, 0.0)).unwrap();

    assert!(scene.remove::<TransformComponent>(go).unwrap());
    assert!(matches!(
        scene.transform(go),
        Err(SceneError::ComponentNotFound { .. })
    ));
    assert!(scene.try_get::<TransformComponent>(go).is_none());

    scene
        .add(go, TransformComponent::from_position(Vec2::new(3.0, 0.0)))
        .unwrap();

    let transform = scene.transform(go).unwrap();
    assert_eq!(transform.owner(), Some(go));
    assert_eq!(transform.local_position(), Vec2::new(3.0, 0.0));
    assert!(approx(transform.world_position(), Vec2::new(4.0, 0.0)));
}

#[test]
fn test_look_at_turns_forward() {
    let mut scene = Scene::new();
    let go = scene.spawn("go");

    scene.look_at(go, Vec2::new(0.0, 5.0)).unwrap();
    let transform = scene.transform(go).unwrap();
    assert!(approx_angle(transform.world_rotation(), FRAC_PI_2));
    assert!(approx(transform.forward(), Vec2::new(0.0, 1.0)));

    // Looking at itself leaves the rotation alone.
    scene.look_at(go, Vec2::ZERO).unwrap();
    assert!(approx_angle(scene.transform(go).unwrap().world_rotation(), FRAC_PI_2));
}

#[test]
fn test_translate_along_own_axes() {
    let mut scene = Scene::new();
    let go = scene.spawn("go");
    scene.set_local_rotation(go, FRAC_PI_2).unwrap();

    scene.translate(go, Vec2::new(2.0, 0.0)).unwrap();

    assert!(approx(world(&scene, go), Vec2::new(0.0, 2.0)));
}

#[test]
fn test_rotate_around_point() {
    let mut scene = Scene::new();
    let go = scene.spawn("go");
    scene.set_local_position(go, Vec2::new(1.0, 0.0)).unwrap();

    scene.rotate_around(go, Vec2::ZERO, FRAC_PI_2).unwrap();

    let transform = scene.transform(go).unwrap();
    assert!(approx(transform.world_position(), Vec2::new(0.0, 1.0)));
    assert!(approx_angle(transform.world_rotation(), FRAC_PI_2));
}

#[test]
fn test_inverse_transform_round_trip() {
    let (mut scene, [_, a, _, c]) = chain();
    scene.set_local_rotation(a, 0.6).unwrap();
    scene.set_local_scale(a, Vec2::new(1.5, 3.0)).unwrap();

    let transform = scene.transform(c).unwrap();
    let point = Vec2::new(-2.0, 9.0);
    let direction = Vec2::new(0.6, 0.8);
    assert!(approx(
        transform.inverse_transform_position(transform.transform_position(point)),
        point
    ));
    assert!(approx(
        transform.inverse_transform_direction(transform.transform_direction(direction)),
        direction
    ));
    assert!(approx(
        transform.world_matrix().transform_point2(Vec2::ZERO),
        transform.world_position()
    ));
}

#[test]
fn test_display_shows_world_state() {
    let mut scene = Scene::new();
    let go = scene.spawn("ship");
    scene.set_local_position(go, Vec2::new(2.0, 3.0)).unwrap();

    let text = scene.object(go).unwrap().to_string();
    assert!(text.starts_with("ship (worldpos = "));
}
