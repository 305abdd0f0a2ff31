//! First-person character movement.
//!
//! Each fixed tick turns an intent snapshot plus proximity queries into a
//! linear velocity for an external rigid body. The pieces run in a strict
//! order, driven by [`MovementController::tick`]:
//!
//! ground check -> velocity snapshot -> wall check / wall-run (airborne only)
//! -> acceleration + drag -> jump -> gravity -> velocity write -> look.
//!
//! The rigid body, spatial queries and the camera are collaborators reached
//! through the traits below, so the same logic runs against Rapier
//! ([`crate::game::physics::CharacterView`]) or a scripted mock in tests.

pub mod controller;
pub mod ground;
pub mod state;
pub mod velocity;
pub mod wall;
pub mod wall_run;

#[cfg(test)]
pub(crate) mod test_support;

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

pub use controller::MovementController;
pub use state::{CharacterBody, MovementMode, MovementModeKind, WallContact};

pub type Vec3 = Vector3<f32>;
pub type Vec2 = Vector2<f32>;

/// Tag carried by every collider a query can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceTag {
    Ground,
    Wall,
    Untagged,
}

/// Restricts which surfaces a cast may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFilter {
    Any,
    Only(SurfaceTag),
}

/// Nearest surface reported by a cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub distance: f32,
    pub normal: Vec3,
    pub tag: SurfaceTag,
}

/// World-space pose of the character body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl BodyTransform {
    /// Upright pose at `position` facing -Z.
    pub fn upright(position: Vec3) -> Self {
        Self {
            position,
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::x(),
            up: Vec3::y(),
        }
    }

    /// Rotate a local planar input (x = strafe, y = forward) into world space.
    pub fn local_to_world(&self, input: Vec2) -> Vec3 {
        self.forward * input.y + self.right * input.x
    }
}

/// Proximity queries against the level.
pub trait SpatialQuery {
    /// Cast a ray and return the nearest hit within `max_distance`, if any.
    /// The character's own body is never reported.
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: LayerFilter,
    ) -> Option<SurfaceHit>;
}

/// The rigid body that owns collision response and integrates forces.
pub trait CharacterRigidBody {
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    /// Accumulate a continuous force for the next physics step.
    fn add_force(&mut self, force: Vec3);
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);
    fn transform(&self) -> BodyTransform;
    /// Rotate about the body's up axis; positive degrees turn toward `right`.
    fn rotate_yaw(&mut self, degrees: f32);
}

/// Receives the vertical look component.
pub trait CameraRig {
    fn rotate_camera(&mut self, pitch_delta_degrees: f32);
}

/// Per-tick read-only input snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntentSnapshot {
    /// Local planar move input (x = strafe, y = forward), magnitude <= 1.
    pub move_input: Vec2,
    /// Look delta (x = yaw, y = pitch).
    pub look: Vec2,
    pub jump_pressed: bool,
    pub crouch_held: bool,
}
