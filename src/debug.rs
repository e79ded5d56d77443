use std::collections::VecDeque;
use std::fmt::Write;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::entity::GameObjectId;
use crate::scene::Scene;
use crate::time::GameTime;

/// Scene inspector for debugging
pub struct SceneInspector;

impl SceneInspector {
    /// Get total game object count
    pub fn object_count(scene: &Scene) -> usize {
        scene.len()
    }

    /// Get per-object summary, roots first then depth-first
    pub fn object_summary(scene: &Scene) -> Vec<ObjectInfo> {
        let mut infos = Vec::with_capacity(scene.len());
        for &root in scene.roots() {
            for id in std::iter::once(root).chain(scene.descendants(root)) {
                if let Some(info) = Self::object_info(scene, id) {
                    infos.push(info);
                }
            }
        }
        infos
    }

    pub fn object_info(scene: &Scene, id: GameObjectId) -> Option<ObjectInfo> {
        let object = scene.object(id)?;
        Some(ObjectInfo {
            id,
            name: object.name().to_string(),
            depth: scene.depth(id),
            active: object.is_active(),
            components: object
                .component_keys()
                .map(|key| key.name().to_string())
                .collect(),
            child_count: scene.child_count(id),
        })
    }

    /// Indented hierarchy, one object per line
    pub fn tree(scene: &Scene) -> String {
        let mut out = String::new();
        for info in Self::object_summary(scene) {
            let object = match scene.object(info.id) {
                Some(object) => object,
                None => continue,
            };
            let marker = if info.active { "" } else { " [inactive]" };
            // Writing to a String cannot fail.
            let _ = writeln!(
                out,
                "{:indent$}{}{}",
                "",
                object,
                marker,
                indent = info.depth * 2
            );
        }
        out
    }

    /// Print scene summary to console
    pub fn print_summary(scene: &Scene) {
        println!("=== Scene Summary ===");
        println!("Game objects: {}", Self::object_count(scene));
        println!("Roots: {}", scene.roots().len());

        println!("\n=== Hierarchy ===");
        print!("{}", Self::tree(scene));
    }

    /// Print game object details
    pub fn print_object(scene: &Scene, id: GameObjectId) {
        match Self::object_info(scene, id) {
            Some(info) => {
                println!("=== Game object {id:?} ===");
                println!("Name: {}", info.name);
                println!("Depth: {}", info.depth);
                println!("Active: {}", info.active);
                println!("Children: {}", info.child_count);
                println!("Components: {}", info.components.join(", "));
            }
            None => println!("Game object {id:?} not found"),
        }
    }
}

/// Game object information for debugging
#[derive(Clone, Debug)]
pub struct ObjectInfo {
    pub id: GameObjectId,
    pub name: String,
    pub depth: usize,
    pub active: bool,
    pub components: Vec<String>,
    pub child_count: usize,
}

/// Timing of one named update phase over the recent frames
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhaseReport {
    pub phase: &'static str,
    pub samples: usize,
    pub avg_ms: f64,
    pub max_ms: f64,
}

/// Rolling frame and update-phase timings.
///
/// Frames are recorded as the [`GameTime`] handed to updates; phases are
/// wall-clock durations of work such as a processor or scene update.
#[derive(Clone, Debug)]
pub struct Diagnostics {
    frame_deltas: VecDeque<Duration>,
    /// Phase samples in first-recorded order
    phases: Vec<(&'static str, VecDeque<Duration>)>,
    max_samples: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_samples(60)
    }

    pub fn with_samples(max_samples: usize) -> Self {
        Self {
            frame_deltas: VecDeque::new(),
            phases: Vec::new(),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record_frame(&mut self, time: GameTime) {
        push_bounded(&mut self.frame_deltas, time.delta, self.max_samples);
    }

    /// Frames per second implied by the recorded deltas.
    pub fn frame_rate(&self) -> f64 {
        match average(&self.frame_deltas) {
            Some(avg) if !avg.is_zero() => 1.0 / avg.as_secs_f64(),
            _ => 0.0,
        }
    }

    pub fn record_phase(&mut self, phase: &'static str, elapsed: Duration) {
        let max_samples = self.max_samples;
        match self.phases.iter_mut().find(|(name, _)| *name == phase) {
            Some((_, samples)) => push_bounded(samples, elapsed, max_samples),
            None => self.phases.push((phase, VecDeque::from([elapsed]))),
        }
    }

    /// Run `f` and record how long it took under `phase`.
    pub fn measure<R>(&mut self, phase: &'static str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        self.record_phase(phase, start.elapsed());
        result
    }

    pub fn phase_average(&self, phase: &str) -> Option<Duration> {
        self.samples(phase).and_then(average)
    }

    pub fn phase_max(&self, phase: &str) -> Option<Duration> {
        self.samples(phase)?.iter().copied().max()
    }

    pub fn report(&self) -> Vec<PhaseReport> {
        self.phases
            .iter()
            .map(|(phase, samples)| PhaseReport {
                phase: *phase,
                samples: samples.len(),
                avg_ms: average(samples).map_or(0.0, |d| d.as_secs_f64() * 1000.0),
                max_ms: samples
                    .iter()
                    .max()
                    .map_or(0.0, |d| d.as_secs_f64() * 1000.0),
            })
            .collect()
    }

    fn samples(&self, phase: &str) -> Option<&VecDeque<Duration>> {
        self.phases
            .iter()
            .find(|(name, _)| *name == phase)
            .map(|(_, samples)| samples)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded(samples: &mut VecDeque<Duration>, value: Duration, max: usize) {
    samples.push_back(value);
    while samples.len() > max {
        samples.pop_front();
    }
}

fn average(samples: &VecDeque<Duration>) -> Option<Duration> {
    let count = u32::try_from(samples.len()).ok().filter(|&n| n > 0)?;
    Some(samples.iter().sum::<Duration>() / count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_from_game_time() {
        let mut diag = Diagnostics::new();
        for _ in 0..10 {
            diag.record_frame(GameTime::from_secs_f32(0.0, 0.02));
        }
        assert!((diag.frame_rate() - 50.0).abs() < 0.01);
        assert_eq!(Diagnostics::new().frame_rate(), 0.0);
    }

    #[test]
    fn test_phase_window_is_bounded() {
        let mut diag = Diagnostics::with_samples(2);
        for ms in [30, 10, 20] {
            diag.record_phase("scene.update", Duration::from_millis(ms));
        }

        assert_eq!(diag.phase_average("scene.update"), Some(Duration::from_millis(15)));
        assert_eq!(diag.phase_max("scene.update"), Some(Duration::from_millis(20)));
        assert_eq!(diag.phase_average("missing"), None);
    }

    #[test]
    fn test_measure_scene_update() {
        let mut scene = Scene::new();
        scene.spawn("root");
        let mut diag = Diagnostics::new();

        let result = diag.measure("scene.update", || scene.update(GameTime::ZERO));
        assert!(result.is_ok());
        diag.measure("processor", || ());

        let report = diag.report();
        let phases: Vec<_> = report.iter().map(|r| r.phase).collect();
        assert_eq!(phases, vec!["scene.update", "processor"]);
        assert_eq!(report[0].samples, 1);
    }

    #[test]
    fn test_scene_inspector() {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let child = scene.spawn_child(root, "child").unwrap();
        scene.set_active(child, false).unwrap();

        assert_eq!(SceneInspector::object_count(&scene), 2);
        let info = SceneInspector::object_info(&scene, child).unwrap();
        assert_eq!(info.depth, 1);
        assert_eq!(info.components, vec!["TransformComponent".to_string()]);

        let tree = SceneInspector::tree(&scene);
        let lines: Vec<&str> = tree.lines().collect();
        assert!(lines[0].starts_with("root ("));
        assert!(lines[1].starts_with("  child ("));
        assert!(lines[1].ends_with("[inactive]"));
    }
}
