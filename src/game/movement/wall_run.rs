//! Wall-run sub-state: entry, sustained stick force, timed expiry and exit.
//!
//! Runs only while airborne. Entry redirects the horizontal velocity along the
//! wall, the running tick pushes the body into the wall, and every exit path
//! goes through [`stop`], which remembers the wall so it cannot be latched
//! again before the body touches ground.

use tracing::debug;

use super::state::{CharacterBody, MovementMode, WallContact};
use super::wall::WallSample;
use super::{BodyTransform, CharacterRigidBody, Vec3};
use crate::config::MovementConfig;
use crate::game::constants::movement::WALL_RUN_JUMPS;

/// Wall-run direction: the sign of `forward` that best matches `facing`.
#[inline]
pub fn aligned_forward(wall_forward: Vec3, facing: Vec3) -> Vec3 {
    if (facing - wall_forward).norm() > (facing + wall_forward).norm() {
        -wall_forward
    } else {
        wall_forward
    }
}

/// Enter the wall-run on `contact`.
///
/// Vertical velocity on the rigid body is zeroed, the remaining speed is
/// redirected along the wall, and a one-time upward force is applied.
pub fn start<B: CharacterRigidBody + ?Sized>(
    body: &mut CharacterBody,
    rigid_body: &mut B,
    contact: WallContact,
    transform: &BodyTransform,
    config: &MovementConfig,
) {
    let up = transform.up;
    let current = rigid_body.velocity();
    let flattened = current - up * current.dot(&up);
    rigid_body.set_velocity(flattened);
    body.velocity = flattened;

    let forward = aligned_forward(contact.forward, transform.forward);
    body.velocity = forward * body.velocity.norm();
    rigid_body.add_force(up * config.wall_run_vertical_start_force);

    body.mode = MovementMode::WallRunning {
        normal: contact.normal,
        forward,
        timer: 0.0,
    };
    body.remaining_jumps = WALL_RUN_JUMPS;

    debug!(normal = ?contact.normal, ?forward, "wall-run started");
}

/// One wall-run tick on `contact`: start if needed, stick, advance the timer,
/// and stop once the timer reaches `wall_run_max_duration`.
pub fn run<B: CharacterRigidBody + ?Sized>(
    body: &mut CharacterBody,
    rigid_body: &mut B,
    contact: WallContact,
    transform: &BodyTransform,
    config: &MovementConfig,
    dt: f32,
) {
    if !body.wall_running() {
        start(body, rigid_body, contact, transform, config);
    }

    let MovementMode::WallRunning { normal, timer, .. } = &mut body.mode else {
        return;
    };
    *normal = contact.normal;
    rigid_body.add_force(-contact.normal * config.wall_stick_force);
    *timer += dt;

    if *timer >= config.wall_run_max_duration {
        stop(body, "timeout");
    }
}

/// Leave the wall-run, whatever the cause. No-op when not wall-running.
pub fn stop(body: &mut CharacterBody, cause: &'static str) {
    let MovementMode::WallRunning { normal, timer, .. } = body.mode else {
        return;
    };
    body.previous_wall_normal = normal;
    body.mode = MovementMode::Airborne;
    body.remaining_jumps = WALL_RUN_JUMPS;
    debug!(cause, ?normal, timer, "wall-run stopped");
}

/// Apply this tick's wall probe to the wall-run state.
///
/// A newly detected wall starts or continues the run; anything else ends an
/// active run.
pub fn sync_with_wall<B: CharacterRigidBody + ?Sized>(
    body: &mut CharacterBody,
    rigid_body: &mut B,
    sample: WallSample,
    transform: &BodyTransform,
    config: &MovementConfig,
    dt: f32,
) {
    match sample.contact.filter(|_| sample.newly_detected) {
        Some(contact) => run(body, rigid_body, contact, transform, config, dt),
        None => stop(body, "wall lost"),
    }
}
