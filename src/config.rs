//! Scene and processor configuration.
//!
//! Loaded once at startup, typically from JSON:
//!
//! ```
//! use scene_graph::config::SceneConfig;
//!
//! let config = SceneConfig::from_json_str(r#"{ "pool_capacity": 32 }"#).unwrap();
//! assert_eq!(config.pool_capacity, 32);
//! assert_eq!(config.processor_capacity, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::game_object::INITIAL_COMPONENT_CAPACITY;

/// Number of components a processor reserves room for up front.
pub const DEFAULT_PROCESSOR_CAPACITY: usize = 100;

/// Number of instances a pool pre-allocates.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Game objects reserved in the arena at construction
    pub object_capacity: usize,
    /// Component slots reserved per game object
    pub component_capacity: usize,
    /// Tracked components reserved per processor
    pub processor_capacity: usize,
    /// Instances pre-allocated per pooled processor
    pub pool_capacity: usize,
    /// Slots added when a pool runs dry; 0 doubles the pool
    pub pool_growth: usize,
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.component_capacity == 0 {
            return Err(SceneError::ConfigError(
                "component_capacity must hold at least the transform".to_string(),
            ));
        }
        Ok(())
    }

    /// How many slots a pool of `total` instances grows by.
    pub fn growth_for(&self, total: usize) -> usize {
        growth_step(self.pool_growth, total)
    }
}

pub(crate) fn growth_step(growth: usize, total: usize) -> usize {
    if growth == 0 {
        total.max(1)
    } else {
        growth
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            object_capacity: 256,
            component_capacity: INITIAL_COMPONENT_CAPACITY,
            processor_capacity: DEFAULT_PROCESSOR_CAPACITY,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            pool_growth: 0,
        }
    }
}
