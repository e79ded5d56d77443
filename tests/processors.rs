use scene_graph::prelude::*;

#[derive(Default)]
struct Velocity {
    state: ComponentState,
    value: Vec2,
    steps: u32,
}
impl_component!(Velocity);

impl Recyclable for Velocity {
    fn recycle(&mut self) {
        self.value = Vec2::ZERO;
        self.steps = 0;
    }
}

fn integrate(velocity: &mut Velocity, ctx: &mut UpdateContext<'_>) -> Result<()> {
    velocity.steps += 1;
    let step = velocity.value * ctx.delta_seconds();
    let position = ctx.scene.transform(ctx.owner)?.local_position();
    ctx.scene.set_local_position(ctx.owner, position + step)
}

/// Strategy that counts lifecycle callbacks.
#[derive(Default)]
struct Lifecycle {
    created: Vec<GameObjectId>,
    destroyed: Vec<GameObjectId>,
    updated: usize,
}

impl ComponentUpdater<Velocity> for Lifecycle {
    fn update(&mut self, _component: &mut Velocity, _ctx: &mut UpdateContext<'_>) -> Result<()> {
        self.updated += 1;
        Ok(())
    }

    fn on_component_created(&mut self, _component: &mut Velocity, owner: GameObjectId) {
        self.created.push(owner);
    }

    fn on_component_destroyed(&mut self, _component: &mut Velocity, owner: GameObjectId) {
        self.destroyed.push(owner);
    }
}

#[test]
fn test_get_versus_try_get() {
    let mut scene = Scene::new();
    let go = scene.spawn("go");

    assert!(matches!(
        scene.get::<Velocity>(go),
        Err(SceneError::ComponentNotFound { .. })
    ));
    assert!(scene.try_get::<Velocity>(go).is_none());
    assert!(scene.try_get_mut::<Velocity>(go).is_none());
}

#[test]
fn test_processor_moves_transforms() {
    let mut scene = Scene::new();
    let parent = scene.spawn("parent");
    let child = scene.spawn_child(parent, "child").unwrap();
    let mut processor = ComponentProcessor::<Velocity, _>::new(integrate);
    processor.add(&mut scene, parent).unwrap().value = Vec2::new(60.0, 0.0);

    let mut time = Time::new();
    for _ in 0..3 {
        let frame = time.advance(std::time::Duration::from_secs_f32(1.0 / 60.0));
        processor.update(&mut scene, frame).unwrap();
    }

    let position = scene.transform(child).unwrap().world_position();
    assert!((position.x - 3.0).abs() < 0.01);
    assert_eq!(scene.get::<Velocity>(parent).unwrap().steps, 3);
}

#[test]
fn test_processor_updates_only_active_components() {
    let mut scene = Scene::new();
    let active = scene.spawn("active");
    let inactive_owner = scene.spawn("inactive owner");
    let disabled = scene.spawn("disabled");

    let mut processor = ComponentProcessor::<Velocity, _>::new(integrate);
    for id in [active, inactive_owner, disabled] {
        processor.add(&mut scene, id).unwrap();
    }
    scene.set_active(inactive_owner, false).unwrap();
    scene.get_mut::<Velocity>(disabled).unwrap().set_enabled(false);

    processor.update(&mut scene, GameTime::ZERO).unwrap();

    let steps = |id| scene.get::<Velocity>(id).unwrap().steps;
    assert_eq!(steps(active), 1);
    assert_eq!(steps(inactive_owner), 0);
    assert_eq!(steps(disabled), 0);
}

#[test]
fn test_processor_updates_in_insertion_order() {
    let mut scene = Scene::new();
    let ids: Vec<_> = (0..4).map(|i| scene.spawn(format!("go{i}"))).collect();
    let mut order = Vec::new();
    let mut processor = ComponentProcessor::<Velocity, _>::new(
        |_: &mut Velocity, ctx: &mut UpdateContext<'_>| -> Result<()> {
            order.push(ctx.owner);
            Ok(())
        },
    );
    for &id in ids.iter().rev() {
        processor.add(&mut scene, id).unwrap();
    }

    processor.update(&mut scene, GameTime::ZERO).unwrap();
    drop(processor);

    assert_eq!(order, ids.iter().rev().copied().collect::<Vec<_>>());
}

#[test]
fn test_lifecycle_callbacks() {
    let mut scene = Scene::new();
    let go = scene.spawn("go");
    let mut processor = ComponentProcessor::<Velocity, _>::new(Lifecycle::default());

    processor.add(&mut scene, go).unwrap();
    processor.update(&mut scene, GameTime::ZERO).unwrap();
    assert!(processor.remove(&mut scene, go));

    let strategy = processor.updater();
    assert_eq!(strategy.created, vec![go]);
    assert_eq!(strategy.destroyed, vec![go]);
    assert_eq!(strategy.updated, 1);
    assert!(processor.is_empty());
}

#[test]
fn test_removing_through_scene_keeps_processor_consistent() {
    let mut scene = Scene::new();
    let a = scene.spawn("a");
    let b = scene.spawn("b");
    let mut processor = ComponentProcessor::<Velocity, _>::new(integrate);
    processor.add(&mut scene, a).unwrap();
    processor.add(&mut scene, b).unwrap();

    scene.remove::<Velocity>(a).unwrap();
    processor.update(&mut scene, GameTime::ZERO).unwrap();

    assert_eq!(processor.owners(), &[b]);
}

#[test]
fn test_pooled_slots_are_reused() {
    const N: usize = 5;
    let mut scene = Scene::new();
    let ids: Vec<_> = (0..N).map(|i| scene.spawn(format!("go{i}"))).collect();
    let mut processor =
        PooledComponentProcessor::<Velocity, _>::with_pool(integrate, InstancePool::new(N));

    for &id in &ids {
        processor.add(&mut scene, id).unwrap();
    }
    assert_eq!(processor.stats().free_instances, 0);

    for &id in &ids {
        processor.remove(&mut scene, id).unwrap();
    }
    let stats = processor.stats();
    assert_eq!(stats.free_instances, N);
    assert_eq!(stats.active_instances, 0);

    for &id in &ids {
        processor.add(&mut scene, id).unwrap();
    }
    let stats = processor.stats();
    assert_eq!(stats.total_instances, N);
    assert_eq!(stats.grow_count, 0);
}

#[test]
fn test_destroyed_subtree_gives_slots_back() {
    const N: usize = 4;
    let mut scene = Scene::new();
    let parent = scene.spawn("parent");
    let mut processor =
        PooledComponentProcessor::<Velocity, _>::with_pool(integrate, InstancePool::new(N));
    for i in 0..N {
        let id = scene.spawn_child(parent, format!("go{i}")).unwrap();
        processor.add(&mut scene, id).unwrap();
    }

    assert!(scene.destroy(parent));
    processor.update(&mut scene, GameTime::ZERO).unwrap();
    assert!(processor.is_empty());
    assert_eq!(processor.pool().outstanding(), 0);

    for i in 0..N {
        let id = scene.spawn(format!("again{i}"));
        processor.add(&mut scene, id).unwrap();
    }
    let stats = processor.stats();
    assert_eq!(stats.total_instances, N);
    assert_eq!(stats.grow_count, 0);
}

#[test]
fn test_pooled_processor_grows_on_demand() {
    let mut scene = Scene::new();
    let json = r#"{ "pool_capacity": 1, "pool_growth": 2 }"#;
    let config = SceneConfig::from_json_str(json).unwrap();
    let mut processor = PooledComponentProcessor::<Velocity, _>::from_config(integrate, &config);

    for i in 0..3 {
        let id = scene.spawn(format!("go{i}"));
        processor.add(&mut scene, id).unwrap();
    }

    let stats = processor.stats();
    assert_eq!(stats.total_instances, 3);
    assert_eq!(stats.active_instances, 3);
    assert_eq!(stats.grow_count, 1);
}

#[test]
fn test_pooled_update_and_recycle() {
    let mut scene = Scene::new();
    let go = scene.spawn("go");
    let mut processor = PooledComponentProcessor::<Velocity, _>::new(integrate);
    processor.add(&mut scene, go).unwrap().value = Vec2::new(1.0, 0.0);

    processor
        .update(&mut scene, GameTime::from_secs_f32(1.0, 1.0))
        .unwrap();
    assert!((scene.transform(go).unwrap().world_position().x - 1.0).abs() < 0.001);

    processor.remove(&mut scene, go).unwrap();
    assert!(!scene.contains_component::<Velocity>(go));

    let reused = processor.add(&mut scene, go).unwrap();
    assert_eq!(reused.value, Vec2::ZERO);
    assert_eq!(reused.steps, 0);
}

#[test]
fn test_strategy_error_aborts_tick() {
    let mut scene = Scene::new();
    let first = scene.spawn("first");
    let second = scene.spawn("second");
    let mut visits = 0;
    let mut processor = ComponentProcessor::<Velocity, _>::new(
        |_: &mut Velocity, _: &mut UpdateContext<'_>| -> Result<()> {
            visits += 1;
            Err(SceneError::ProcessorError("stop".to_string()))
        },
    );
    processor.add(&mut scene, first).unwrap();
    processor.add(&mut scene, second).unwrap();

    assert!(processor.update(&mut scene, GameTime::ZERO).is_err());
    drop(processor);
    assert_eq!(visits, 1);
}
