//! Frame timing.
//!
//! This module provides:
//! - [`GameTime`] - the `(current time, delta time)` pair handed to every update
//! - [`Time`] - frame clock producing monotonically increasing [`GameTime`]s
//!
//! # Examples
//!
//! ```
//! use scene_graph::time::Time;
//! use std::time::Duration;
//!
//! let mut time = Time::new();
//!
//! // In your game loop:
//! let frame = time.advance(Duration::from_millis(16));
//! assert_eq!(frame.delta, Duration::from_millis(16));
//! ```

use std::time::{Duration, Instant};

/// Simulation time passed to update hooks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GameTime {
    /// Total simulated time, monotonically increasing
    pub total: Duration,
    /// Time elapsed since the previous tick
    pub delta: Duration,
}

impl GameTime {
    pub const ZERO: GameTime = GameTime {
        total: Duration::ZERO,
        delta: Duration::ZERO,
    };

    pub fn new(total: Duration, delta: Duration) -> Self {
        Self { total, delta }
    }

    /// Build from seconds. Negative inputs clamp to zero.
    pub fn from_secs_f32(total: f32, delta: f32) -> Self {
        Self {
            total: Duration::from_secs_f32(total.max(0.0)),
            delta: Duration::from_secs_f32(delta.max(0.0)),
        }
    }

    pub fn total_seconds(&self) -> f32 {
        self.total.as_secs_f32()
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// The tick that follows this one after `delta`.
    pub fn next(&self, delta: Duration) -> GameTime {
        GameTime {
            total: self.total + delta,
            delta,
        }
    }
}

/// Frame clock
#[derive(Clone, Debug)]
pub struct Time {
    /// Current tick (scaled)
    current: GameTime,
    /// Frame counter
    frame_count: u64,
    /// Time scale multiplier (1.0 = normal speed)
    time_scale: f32,
    /// Wall clock at the previous `update`
    last_update: Instant,
}

impl Time {
    pub fn new() -> Self {
        Self {
            current: GameTime::ZERO,
            frame_count: 0,
            time_scale: 1.0,
            last_update: Instant::now(),
        }
    }

    /// Advance by wall-clock time since the previous call (call once per frame)
    pub fn update(&mut self) -> GameTime {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update);
        self.last_update = now;
        self.advance(elapsed)
    }

    /// Advance by an explicit delta. Used by deterministic drivers and tests.
    pub fn advance(&mut self, delta: Duration) -> GameTime {
        let scaled = delta.mul_f32(self.time_scale);
        self.current = self.current.next(scaled);
        self.frame_count += 1;
        self.current
    }

    /// The most recent tick
    pub fn current(&self) -> GameTime {
        self.current
    }

    /// Get current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Set time scale (1.0 = normal, 0.5 = half speed, 2.0 = double speed)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Pause time (set scale to 0)
    pub fn pause(&mut self) {
        self.time_scale = 0.0;
    }

    /// Resume time (set scale to 1)
    pub fn resume(&mut self) {
        self.time_scale = 1.0;
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
