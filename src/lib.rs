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

//! Scene graph - entity composition core for 2D games
//!
//! Game objects aggregate typed components, carry a hierarchical 2D
//! transform, and are updated either by themselves or in batches by
//! component processors.

pub mod component;
pub mod config;
pub mod debug;
pub mod entity;
pub mod error;
pub mod game_object;
pub mod hierarchy;
pub mod pool;
pub mod pooled_processor;
pub mod prelude;
pub mod processor;
pub mod scene;
pub mod time;
pub mod transform;

pub use component::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use game_object::*;
pub use hierarchy::*;
pub use pool::*;
pub use pooled_processor::*;
pub use processor::*;
pub use scene::*;
pub use time::*;
pub use transform::*;
