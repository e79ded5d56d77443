// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

use crate::entity::GameObjectId;

/// Scene error type
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Game object handle is stale or was never spawned
    GameObjectNotFound(GameObjectId),

    /// Component type is not attached to the game object
    ComponentNotFound {
        object: GameObjectId,
        component: &'static str,
    },

    /// A component of the same type is already attached
    ComponentAlreadyAdded {
        object: GameObjectId,
        component: &'static str,
    },

    /// Component ownership is write-once
    ComponentOwnerAlreadySet {
        component: &'static str,
        owner: GameObjectId,
        attempted: GameObjectId,
    },

    /// Hierarchy operation error (cycle, self-parenting, corrupt child list)
    HierarchyError(String),

    /// Rejected at the API boundary before any state was touched
    InvalidArgument(String),

    /// Instance pool misuse (foreign or double-returned instance)
    PoolError(String),

    /// Processor bookkeeping error
    ProcessorError(String),

    /// Invalid or unreadable configuration
    ConfigError(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::GameObjectNotFound(id) => write!(f, "Game object not found: {id:?}"),
            SceneError::ComponentNotFound { object, component } => {
                write!(f, "Component {component} does not exist on game object {object:?}")
            }
            SceneError::ComponentAlreadyAdded { object, component } => {
                write!(f, "Component {component} was already added to game object {object:?}")
            }
            SceneError::ComponentOwnerAlreadySet {
                component,
                owner,
                attempted,
            } => write!(
                f,
                "Cannot change owner of component {component} from {owner:?} to {attempted:?}"
            ),
            SceneError::HierarchyError(msg) => write!(f, "Hierarchy error: {msg}"),
            SceneError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            SceneError::PoolError(msg) => write!(f, "Instance pool error: {msg}"),
            SceneError::ProcessorError(msg) => write!(f, "Processor error: {msg}"),
            SceneError::ConfigError(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        SceneError::ConfigError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SceneError>;
