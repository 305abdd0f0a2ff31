use tracing::trace;

use super::ground::{check_ground, GroundSample};
use super::state::CharacterBody;
use super::velocity::{self, JumpOutcome};
use super::wall::{check_walls, WallSample};
use super::wall_run::sync_with_wall;
use super::{CameraRig, CharacterRigidBody, IntentSnapshot, SpatialQuery, Vec3};
use crate::config::MovementConfig;

/// What happened during one controller tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub ground: GroundSample,
    /// `WallSample::NONE` on grounded ticks, where walls are not probed.
    pub wall: WallSample,
    pub jump: JumpOutcome,
}

/// Drives one character body through the fixed per-tick movement pipeline.
#[derive(Debug, Clone)]
pub struct MovementController {
    config: MovementConfig,
    body: CharacterBody,
    dt: f32,
}

impl MovementController {
    pub fn new(config: MovementConfig, dt: f32) -> Self {
        Self {
            config,
            body: CharacterBody::new(),
            dt,
        }
    }

    pub fn body(&self) -> &CharacterBody {
        &self.body
    }

    /// Run one fixed tick.
    ///
    /// `world` is both the spatial query and the character's rigid body.
    /// The caller owns the jump edge and must clear it after this returns,
    /// whether or not the jump was granted.
    pub fn tick<W, C>(&mut self, world: &mut W, camera: &mut C, intent: &IntentSnapshot) -> TickOutcome
    where
        W: SpatialQuery + CharacterRigidBody + ?Sized,
        C: CameraRig + ?Sized,
    {
        let config = &self.config;
        let body = &mut self.body;
        let dt = self.dt;

        world.set_angular_velocity(Vec3::zeros());

        let transform = world.transform();
        let ground = check_ground(
            body,
            &*world,
            transform.position,
            -transform.up,
            config.player_height,
        );

        body.velocity = world.velocity();

        let mut wall = WallSample::NONE;
        if !ground.grounded {
            wall = check_walls(body, &*world, &transform, config.wall_detection_range);
            sync_with_wall(body, world, wall, &transform, config, dt);
        } else {
            body.wall = None;
        }

        let move_dir = transform.local_to_world(intent.move_input);
        velocity::accelerate(body, config, move_dir, intent.crouch_held, dt);
        velocity::apply_ground_drag(body, config, move_dir, intent.crouch_held, dt);
        let jump = velocity::apply_jump(body, config, transform.up, intent.jump_pressed, dt);
        velocity::apply_gravity(body, config, dt);

        world.set_velocity(body.velocity);

        world.rotate_yaw(intent.look.x * config.horizontal_look_sensitivity);
        camera.rotate_camera(-intent.look.y * config.vertical_look_sensitivity);

        trace!(
            mode = ?body.mode.kind(),
            remaining_jumps = body.remaining_jumps,
            velocity = ?body.velocity,
            "movement tick"
        );

        TickOutcome { ground, wall, jump }
    }
}
