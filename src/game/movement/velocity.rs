//! Per-tick velocity integration: acceleration toward the desired speed,
//! ground drag, jump injection and gravity. The steps run in that order on
//! `CharacterBody::velocity`.

use serde::Serialize;

use super::state::{CharacterBody, MovementMode};
use super::wall_run;
use super::Vec3;
use crate::config::MovementConfig;

/// Outcome of the jump step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JumpOutcome {
    NotRequested,
    /// Requested with an empty budget.
    Denied,
    Jumped,
    /// Jumped off a wall, ending the wall-run.
    WallJumped,
}

/// Loose float equality in the style of a game engine's `Approximately`.
///
/// Relative tolerance is `1e-6`. The absolute floor is `8 * f32::EPSILON`
/// rather than eight of the smallest denormal, so drag residues near zero
/// speed compare equal to zero.
#[inline]
pub fn approximately(a: f32, b: f32) -> bool {
    (a - b).abs() < (1.0e-6 * a.abs().max(b.abs())).max(f32::EPSILON * 8.0)
}

/// Top speed the body is accelerating toward this tick.
pub fn desired_max_speed(config: &MovementConfig, grounded: bool, crouching: bool) -> f32 {
    let max = if grounded {
        config.max_ground_speed
    } else {
        config.max_air_speed
    };
    if crouching {
        max * config.crouch_speed_mult
    } else {
        max
    }
}

/// Add speed along `move_dir` toward the desired top speed.
///
/// `move_dir` is the world-space move intent (magnitude <= 1). The added speed
/// is clamped to `[0, acceleration * dt]`, so this never brakes.
pub fn accelerate(
    body: &mut CharacterBody,
    config: &MovementConfig,
    move_dir: Vec3,
    crouching: bool,
    dt: f32,
) {
    let grounded = body.grounded();
    let acceleration = if grounded {
        config.ground_acceleration
    } else {
        config.air_acceleration
    };

    let current_speed = body.velocity.dot(&move_dir);
    let target = desired_max_speed(config, grounded, crouching);
    let speed_to_add = (target - current_speed).clamp(0.0, acceleration * dt);

    body.velocity += move_dir * speed_to_add;
}

/// Pull horizontal speed down toward `max_ground_speed * |move_dir|` while grounded.
///
/// The interpolation factor is `desired_speed_timer`, which ramps up by
/// `dt / (drag_time * multiplier)` each tick and resets once the speed matches.
pub fn apply_ground_drag(
    body: &mut CharacterBody,
    config: &MovementConfig,
    move_dir: Vec3,
    crouching: bool,
    dt: f32,
) {
    let desired_speed = config.max_ground_speed * move_dir.norm();
    let speed = body.horizontal_speed();

    if !body.grounded() || speed <= desired_speed {
        body.desired_speed_timer = 0.0;
        return;
    }

    let scale = desired_speed / speed;
    let target_x = body.velocity.x * scale;
    let target_z = body.velocity.z * scale;

    let t = body.desired_speed_timer.clamp(0.0, 1.0);
    body.velocity.x += (target_x - body.velocity.x) * t;
    body.velocity.z += (target_z - body.velocity.z) * t;

    let multiplier = if crouching {
        1.0 + config.current_to_desired_speed_time_crouch_multiplier
    } else {
        1.0
    };
    body.desired_speed_timer += dt / (config.current_to_desired_speed_time * multiplier);

    if approximately(body.horizontal_speed(), desired_speed) {
        body.desired_speed_timer = 0.0;
    }
}

/// Inject a jump if one was requested and the budget allows it.
///
/// Downward motion is cancelled first; existing upward motion is kept. A jump
/// while wall-running also pushes away along the wall normal and ends the run.
pub fn apply_jump(
    body: &mut CharacterBody,
    config: &MovementConfig,
    up: Vec3,
    requested: bool,
    dt: f32,
) -> JumpOutcome {
    if !requested {
        return JumpOutcome::NotRequested;
    }
    if !body.spend_jump() {
        return JumpOutcome::Denied;
    }

    let vertical = body.velocity.dot(&up);
    if vertical < 0.0 {
        body.velocity -= up * vertical;
    }
    body.velocity += up * (config.jump_speed * dt);

    if let MovementMode::WallRunning { normal, .. } = body.mode {
        body.velocity += normal * config.wall_jump_force;
        wall_run::stop(body, "jump");
        return JumpOutcome::WallJumped;
    }

    JumpOutcome::Jumped
}

/// Integrate gravity while airborne.
pub fn apply_gravity(body: &mut CharacterBody, config: &MovementConfig, dt: f32) {
    if body.grounded() || !config.apply_gravity {
        return;
    }
    let gravity = Vec3::from(config.gravity);
    body.velocity += gravity * (dt * config.gravity_scale);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::movement::{MAX_JUMPS, WALL_RUN_JUMPS};

    const DT: f32 = 0.02;

    fn config() -> MovementConfig {
        MovementConfig {
            max_ground_speed: 5.0,
            max_air_speed: 3.0,
            ground_acceleration: 10.0,
            air_acceleration: 4.0,
            crouch_speed_mult: 0.5,
            jump_speed: 250.0,
            gravity_scale: 2.0,
            current_to_desired_speed_time: 0.5,
            current_to_desired_speed_time_crouch_multiplier: 1.0,
            wall_jump_force: 6.0,
            ..MovementConfig::default()
        }
    }

    fn grounded_body() -> CharacterBody {
        let mut body = CharacterBody::new();
        body.land();
        body
    }

    fn forward() -> Vec3 {
        Vec3::new(0.0, 0.0, -1.0)
    }

    #[test]
    fn test_first_tick_from_rest_adds_accel_times_dt() {
        let mut body = grounded_body();
        accelerate(&mut body, &config(), forward(), false, DT);
        let speed = body.velocity.dot(&forward());
        assert!((speed - 0.2).abs() < 1e-5, "got {speed}");
    }

    #[test]
    fn test_acceleration_converges_to_ground_max() {
        let cfg = config();
        let mut body = grounded_body();
        let mut last = 0.0;
        for _ in 0..200 {
            accelerate(&mut body, &cfg, forward(), false, DT);
            apply_ground_drag(&mut body, &cfg, forward(), false, DT);
            let speed = body.velocity.dot(&forward());
            assert!(speed + 1e-5 >= last);
            last = speed;
        }
        assert!((last - 5.0).abs() < 1e-4, "got {last}");

        accelerate(&mut body, &cfg, forward(), false, DT);
        assert!((body.velocity.dot(&forward()) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_acceleration_never_brakes() {
        let mut body = grounded_body();
        body.velocity = forward() * 9.0;
        accelerate(&mut body, &config(), forward(), false, DT);
        assert_eq!(body.velocity, forward() * 9.0);
    }

    #[test]
    fn test_crouch_and_air_limits() {
        let cfg = config();
        assert_eq!(desired_max_speed(&cfg, true, false), 5.0);
        assert_eq!(desired_max_speed(&cfg, true, true), 2.5);
        assert_eq!(desired_max_speed(&cfg, false, false), 3.0);
        assert_eq!(desired_max_speed(&cfg, false, true), 1.5);
    }

    #[test]
    fn test_airborne_uses_air_acceleration() {
        let mut body = CharacterBody::new();
        accelerate(&mut body, &config(), forward(), false, DT);
        assert!((body.velocity.dot(&forward()) - 4.0 * DT).abs() < 1e-6);
    }

    #[test]
    fn test_drag_skipped_when_airborne() {
        let mut body = CharacterBody::new();
        body.velocity = Vec3::new(10.0, 0.0, 0.0);
        body.desired_speed_timer = 0.3;
        apply_ground_drag(&mut body, &config(), Vec3::zeros(), false, DT);
        assert_eq!(body.velocity.x, 10.0);
        assert_eq!(body.desired_speed_timer, 0.0);
    }

    #[test]
    fn test_drag_first_tick_only_starts_ramp() {
        let cfg = config();
        let mut body = grounded_body();
        body.velocity = Vec3::new(10.0, 0.0, 0.0);

        apply_ground_drag(&mut body, &cfg, forward(), false, DT);

        assert_eq!(body.velocity.x, 10.0);
        assert!((body.desired_speed_timer - DT / 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_drag_converges_monotonically_and_resets_timer() {
        let cfg = config();
        let mut body = grounded_body();
        body.velocity = Vec3::new(6.0, 0.0, -8.0);
        let mut last = body.horizontal_speed();
        let mut converged = false;

        for _ in 0..100 {
            apply_ground_drag(&mut body, &cfg, forward(), false, DT);
            let speed = body.horizontal_speed();
            assert!(speed <= last + 1e-5, "speed rose from {last} to {speed}");
            assert!(speed + 1e-4 >= 5.0);
            last = speed;
            if approximately(speed, 5.0) {
                converged = true;
                break;
            }
        }

        assert!(converged, "never reached desired speed, last {last}");
        assert_eq!(body.desired_speed_timer, 0.0);
        // direction is preserved
        assert!((body.velocity.x / body.velocity.z - 6.0 / -8.0).abs() < 1e-4);
    }

    #[test]
    fn test_drag_ramp_is_slower_while_crouching() {
        let cfg = config();
        let mut standing = grounded_body();
        let mut crouching = grounded_body();
        standing.velocity = Vec3::new(10.0, 0.0, 0.0);
        crouching.velocity = Vec3::new(10.0, 0.0, 0.0);

        apply_ground_drag(&mut standing, &cfg, Vec3::zeros(), false, DT);
        apply_ground_drag(&mut crouching, &cfg, Vec3::zeros(), true, DT);

        assert!((crouching.desired_speed_timer * 2.0 - standing.desired_speed_timer).abs() < 1e-6);
    }

    #[test]
    fn test_drag_ignores_vertical_speed() {
        let cfg = config();
        let mut body = grounded_body();
        body.velocity = Vec3::new(0.0, 20.0, -3.0);
        body.desired_speed_timer = 0.5;
        apply_ground_drag(&mut body, &cfg, forward(), false, DT);
        assert_eq!(body.velocity, Vec3::new(0.0, 20.0, -3.0));
        assert_eq!(body.desired_speed_timer, 0.0);
    }

    #[test]
    fn test_airborne_jump_consumes_one() {
        let cfg = config();
        let mut body = CharacterBody::new();
        body.remaining_jumps = MAX_JUMPS;
        body.velocity = Vec3::new(1.0, 2.0, 0.0);

        let outcome = apply_jump(&mut body, &cfg, Vec3::y(), true, DT);

        assert_eq!(outcome, JumpOutcome::Jumped);
        assert_eq!(body.remaining_jumps, 1);
        assert!(body.velocity.y >= 2.0 + cfg.jump_speed * DT - 1e-5);
        assert_eq!(body.velocity.x, 1.0);
    }

    #[test]
    fn test_jump_cancels_downward_motion() {
        let cfg = config();
        let mut body = CharacterBody::new();
        body.remaining_jumps = 1;
        body.velocity = Vec3::new(0.0, -7.0, 0.0);

        apply_jump(&mut body, &cfg, Vec3::y(), true, DT);

        assert!((body.velocity.y - cfg.jump_speed * DT).abs() < 1e-5);
    }

    #[test]
    fn test_jump_denied_without_budget() {
        let cfg = config();
        let mut body = CharacterBody::new();
        body.velocity = Vec3::new(0.0, -3.0, 0.0);

        let outcome = apply_jump(&mut body, &cfg, Vec3::y(), true, DT);

        assert_eq!(outcome, JumpOutcome::Denied);
        assert_eq!(body.remaining_jumps, 0);
        assert_eq!(body.velocity.y, -3.0);
    }

    #[test]
    fn test_no_request_no_jump() {
        let mut body = grounded_body();
        let outcome = apply_jump(&mut body, &config(), Vec3::y(), false, DT);
        assert_eq!(outcome, JumpOutcome::NotRequested);
        assert_eq!(body.remaining_jumps, MAX_JUMPS);
    }

    #[test]
    fn test_wall_jump_pushes_off_and_stops_run() {
        let cfg = config();
        let mut body = CharacterBody::new();
        body.remaining_jumps = WALL_RUN_JUMPS;
        body.mode = MovementMode::WallRunning {
            normal: Vec3::x(),
            forward: forward(),
            timer: 0.2,
        };
        body.velocity = forward() * 4.0;

        let outcome = apply_jump(&mut body, &cfg, Vec3::y(), true, DT);

        assert_eq!(outcome, JumpOutcome::WallJumped);
        assert!(!body.wall_running());
        assert_eq!(body.wall_run_timer(), 0.0);
        assert_eq!(body.remaining_jumps, WALL_RUN_JUMPS);
        assert_eq!(body.previous_wall_normal, Vec3::x());
        assert!((body.velocity.x - cfg.wall_jump_force).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_only_while_airborne() {
        let cfg = config();
        let mut grounded = grounded_body();
        apply_gravity(&mut grounded, &cfg, DT);
        assert_eq!(grounded.velocity, Vec3::zeros());

        let mut airborne = CharacterBody::new();
        apply_gravity(&mut airborne, &cfg, DT);
        let expected = cfg.gravity[1] * DT * cfg.gravity_scale;
        assert!((airborne.velocity.y - expected).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_can_be_disabled() {
        let cfg = MovementConfig {
            apply_gravity: false,
            ..config()
        };
        let mut body = CharacterBody::new();
        apply_gravity(&mut body, &cfg, DT);
        assert_eq!(body.velocity, Vec3::zeros());
    }

    #[test]
    fn test_approximately() {
        assert!(approximately(5.0, 5.0 + 1e-7));
        assert!(!approximately(5.0, 5.001));
        assert!(approximately(0.0, 1e-8));
    }

    #[test]
    fn test_approximately_absolute_floor_near_zero() {
        let floor = 8.0 * f32::EPSILON;
        assert!(approximately(0.0, floor * 0.5));
        assert!(!approximately(0.0, floor * 2.0));
        assert!(!approximately(0.0, 1e-5));
    }
}
