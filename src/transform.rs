//! Hierarchical 2D transform component.
//!
//! A transform holds position, rotation and scale relative to its parent
//! and caches the resulting world-space values. World values are kept
//! consistent on write: every local change regenerates this transform and
//! every descendant before the setter returns.
//!
//! The coordinate system is Y-down: rotation 0 faces +X and positive
//! rotation turns toward +Y.

use std::f32::consts::TAU;
use std::fmt;

use glam::{Affine2, Vec2};

use crate::component::{Component, ComponentState};
use crate::entity::GameObjectId;
use crate::error::Result;
use crate::scene::Scene;

/// Wrap an angle in radians into `[0, 2π)`.
pub fn normalize_angle(radians: f32) -> f32 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Rotate a vector counter-clockwise (in Y-up terms) by `radians`.
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    Vec2::from_angle(radians).rotate(v)
}

/// World-space frame a child transform is composed against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Frame {
    pub const IDENTITY: Frame = Frame {
        position: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::ONE,
    };

    /// Local point to world point.
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + rotate(local * self.scale, self.rotation)
    }

    /// World point to local point. Zero scale axes collapse to zero.
    pub fn inverse_transform_point(&self, world: Vec2) -> Vec2 {
        let unrotated = rotate(world - self.position, -self.rotation);
        Vec2::new(
            safe_div(unrotated.x, self.scale.x),
            safe_div(unrotated.y, self.scale.y),
        )
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn safe_div(value: f32, divisor: f32) -> f32 {
    if divisor == 0.0 {
        0.0
    } else {
        value / divisor
    }
}

/// Position, rotation and scale of a game object relative to its parent
/// and to the world.
#[derive(Clone, Debug)]
pub struct TransformComponent {
    state: ComponentState,
    local_position: Vec2,
    local_rotation: f32,
    local_scale: Vec2,
    world_position: Vec2,
    world_rotation: f32,
    world_scale: Vec2,
    // Cached from world_rotation.
    forward: Vec2,
}

impl TransformComponent {
    pub fn new() -> Self {
        Self {
            state: ComponentState::new(),
            local_position: Vec2::ZERO,
            local_rotation: 0.0,
            local_scale: Vec2::ONE,
            world_position: Vec2::ZERO,
            world_rotation: 0.0,
            world_scale: Vec2::ONE,
            forward: Vec2::X,
        }
    }

    /// The transform every game object is born with.
    pub(crate) fn owned_by(owner: GameObjectId) -> Self {
        Self {
            state: ComponentState::owned_by(owner),
            ..Self::new()
        }
    }

    /// Unattached transform at `position`. World values are regenerated
    /// once the transform is added to a game object.
    pub fn from_position(position: Vec2) -> Self {
        let mut transform = Self::new();
        transform.local_position = position;
        transform.regenerate(&Frame::IDENTITY);
        transform
    }

    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.local_rotation = normalize_angle(radians);
        self.regenerate(&Frame::IDENTITY);
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.local_scale = scale;
        self.regenerate(&Frame::IDENTITY);
        self
    }

    pub fn local_position(&self) -> Vec2 {
        self.local_position
    }

    pub fn local_rotation(&self) -> f32 {
        self.local_rotation
    }

    pub fn local_scale(&self) -> Vec2 {
        self.local_scale
    }

    pub fn world_position(&self) -> Vec2 {
        self.world_position
    }

    /// World rotation in radians, in `[0, 2π)`.
    pub fn world_rotation(&self) -> f32 {
        self.world_rotation
    }

    pub fn world_scale(&self) -> Vec2 {
        self.world_scale
    }

    /// Unit vector along the transform's +X axis.
    pub fn forward(&self) -> Vec2 {
        self.forward
    }

    /// Unit vector along the transform's -X axis.
    pub fn backward(&self) -> Vec2 {
        -self.forward
    }

    /// 90 degrees left of forward.
    pub fn left(&self) -> Vec2 {
        Vec2::new(self.forward.y, -self.forward.x)
    }

    /// 90 degrees right of forward.
    pub fn right(&self) -> Vec2 {
        Vec2::new(-self.forward.y, self.forward.x)
    }

    pub fn world_frame(&self) -> Frame {
        Frame {
            position: self.world_position,
            rotation: self.world_rotation,
            scale: self.world_scale,
        }
    }

    pub fn local_matrix(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(
            self.local_scale,
            self.local_rotation,
            self.local_position,
        )
    }

    pub fn world_matrix(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(
            self.world_scale,
            self.world_rotation,
            self.world_position,
        )
    }

    /// Local direction to world direction. Ignores position and scale.
    pub fn transform_direction(&self, direction: Vec2) -> Vec2 {
        rotate(direction, self.world_rotation)
    }

    /// World direction to local direction. Ignores position and scale.
    pub fn inverse_transform_direction(&self, direction: Vec2) -> Vec2 {
        rotate(direction, -self.world_rotation)
    }

    /// Point in this transform's space to world space.
    pub fn transform_position(&self, position: Vec2) -> Vec2 {
        self.world_frame().transform_point(position)
    }

    /// World point to this transform's space.
    pub fn inverse_transform_position(&self, position: Vec2) -> Vec2 {
        self.world_frame().inverse_transform_point(position)
    }

    pub(crate) fn replace_local_position(&mut self, position: Vec2) -> bool {
        if self.local_position == position {
            return false;
        }
        self.local_position = position;
        true
    }

    pub(crate) fn replace_local_rotation(&mut self, radians: f32) -> bool {
        let radians = normalize_angle(radians);
        if self.local_rotation == radians {
            return false;
        }
        self.local_rotation = radians;
        true
    }

    pub(crate) fn replace_local_scale(&mut self, scale: Vec2) -> bool {
        if self.local_scale == scale {
            return false;
        }
        self.local_scale = scale;
        true
    }

    /// Recompute world values from `parent` and the local values.
    pub(crate) fn regenerate(&mut self, parent: &Frame) {
        self.world_position = parent.transform_point(self.local_position);
        self.world_rotation = normalize_angle(parent.rotation + self.local_rotation);
        self.world_scale = parent.scale * self.local_scale;
        self.forward = Vec2::from_angle(self.world_rotation);
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for TransformComponent {
    fn state(&self) -> &ComponentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ComponentState {
        &mut self.state
    }
}

impl fmt::Display for TransformComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "worldpos = {}, worldrot = {}",
            self.world_position, self.world_rotation
        )
    }
}

/// Transform mutation. Every setter regenerates the object's subtree.
impl Scene {
    pub fn set_local_position(&mut self, id: GameObjectId, position: Vec2) -> Result<()> {
        if self.transform_component_mut(id)?.replace_local_position(position) {
            self.regenerate_transforms(id);
        }
        Ok(())
    }

    pub fn set_local_rotation(&mut self, id: GameObjectId, radians: f32) -> Result<()> {
        if self.transform_component_mut(id)?.replace_local_rotation(radians) {
            self.regenerate_transforms(id);
        }
        Ok(())
    }

    pub fn set_local_scale(&mut self, id: GameObjectId, scale: Vec2) -> Result<()> {
        if self.transform_component_mut(id)?.replace_local_scale(scale) {
            self.regenerate_transforms(id);
        }
        Ok(())
    }

    /// Move to a world position by solving for the equivalent local position.
    pub fn set_world_position(&mut self, id: GameObjectId, position: Vec2) -> Result<()> {
        if self.transform(id)?.world_position() == position {
            return Ok(());
        }
        let local = self.parent_frame(id).inverse_transform_point(position);
        self.set_local_position(id, local)
    }

    pub fn set_world_rotation(&mut self, id: GameObjectId, radians: f32) -> Result<()> {
        let radians = normalize_angle(radians);
        if self.transform(id)?.world_rotation() == radians {
            return Ok(());
        }
        let parent_rotation = self.parent_frame(id).rotation;
        self.set_local_rotation(id, radians - parent_rotation)
    }

    /// Move by `distance` expressed along the transform's own axes.
    pub fn translate(&mut self, id: GameObjectId, distance: Vec2) -> Result<()> {
        let transform = self.transform(id)?;
        let target = transform.world_position() + transform.transform_direction(distance);
        self.set_world_position(id, target)
    }

    /// Turn so that `forward` points at a world position. No-op when the
    /// target coincides with the transform's position.
    pub fn look_at(&mut self, id: GameObjectId, target: Vec2) -> Result<()> {
        let offset = target - self.transform(id)?.world_position();
        if offset == Vec2::ZERO {
            return Ok(());
        }
        self.set_world_rotation(id, offset.y.atan2(offset.x))
    }

    /// Orbit a world point by `radians`, turning the transform by the same angle.
    pub fn rotate_around(&mut self, id: GameObjectId, point: Vec2, radians: f32) -> Result<()> {
        let transform = self.transform(id)?;
        let position = point + rotate(transform.world_position() - point, radians);
        let rotation = transform.world_rotation() + radians;
        self.set_world_position(id, position)?;
        self.set_world_rotation(id, rotation)
    }
}
