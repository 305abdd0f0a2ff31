use serde::{Deserialize, Serialize};

use super::Vec3;
use crate::game::constants::movement::MAX_JUMPS;

/// Wall found by the most recent lateral probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    /// Unit surface normal, pointing away from the wall.
    pub normal: Vec3,
    /// Tangent along the wall: `normal x up`.
    pub forward: Vec3,
}

/// Movement mode of the character.
///
/// A single tag instead of independent flags: a body is never grounded and
/// wall-running at the same time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementMode {
    Grounded,
    Airborne,
    WallRunning {
        /// Normal of the wall currently being run on.
        normal: Vec3,
        /// Run direction chosen at entry (aligned with the body's facing).
        forward: Vec3,
        /// Seconds spent on this wall.
        timer: f32,
    },
}

/// Payload-free view of [`MovementMode`] for reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementModeKind {
    Grounded,
    Airborne,
    WallRunning,
}

impl MovementMode {
    pub fn kind(&self) -> MovementModeKind {
        match self {
            MovementMode::Grounded => MovementModeKind::Grounded,
            MovementMode::Airborne => MovementModeKind::Airborne,
            MovementMode::WallRunning { .. } => MovementModeKind::WallRunning,
        }
    }
}

/// Movement state carried across ticks for one controllable body.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterBody {
    /// Working velocity: read from the rigid body at tick start, written back at tick end.
    pub velocity: Vec3,
    pub mode: MovementMode,
    /// Jumps left before the next landing, in `0..=MAX_JUMPS`.
    pub remaining_jumps: u8,
    /// Normal of the last wall that was run on (`up` after landing).
    pub previous_wall_normal: Vec3,
    /// Wall reported by this tick's lateral probe, if any.
    pub wall: Option<WallContact>,
    /// Ramp factor for ground drag, not raw time.
    pub desired_speed_timer: f32,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            mode: MovementMode::Airborne,
            remaining_jumps: 0,
            previous_wall_normal: Vec3::y(),
            wall: None,
            desired_speed_timer: 0.0,
        }
    }
}

impl CharacterBody {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn grounded(&self) -> bool {
        matches!(self.mode, MovementMode::Grounded)
    }

    #[inline]
    pub fn wall_running(&self) -> bool {
        matches!(self.mode, MovementMode::WallRunning { .. })
    }

    /// Seconds spent on the current wall, `0` when not wall-running.
    pub fn wall_run_timer(&self) -> f32 {
        match self.mode {
            MovementMode::WallRunning { timer, .. } => timer,
            _ => 0.0,
        }
    }

    /// Grant the full jump budget and forget the last wall.
    pub(crate) fn land(&mut self) {
        self.mode = MovementMode::Grounded;
        self.remaining_jumps = MAX_JUMPS;
        self.previous_wall_normal = Vec3::y();
    }

    /// Spend one jump. Returns false when the budget is empty.
    pub(crate) fn spend_jump(&mut self) -> bool {
        if self.remaining_jumps == 0 {
            return false;
        }
        self.remaining_jumps -= 1;
        true
    }

    /// Horizontal (XZ) speed of the working velocity.
    pub fn horizontal_speed(&self) -> f32 {
        (self.velocity.x * self.velocity.x + self.velocity.z * self.velocity.z).sqrt()
    }
}
