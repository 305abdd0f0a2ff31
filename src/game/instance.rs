use rapier3d::prelude::RigidBodyHandle;
use serde::Serialize;

use super::camera::FirstPersonCamera;
use super::intent::{intent_channel, IntentReceiver, IntentSender};
use super::movement::velocity::JumpOutcome;
use super::movement::{MovementController, MovementModeKind, Vec3};
use super::physics::PhysicsWorld;
use super::scenario::Scenario;
use crate::config::{ConfigError, SimConfig};

mod tick_pipeline;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("character body is missing from the physics world")]
    MissingCharacter,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Observable state after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub mode: MovementModeKind,
    pub remaining_jumps: u8,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub wall_run_timer: f32,
    /// What the jump step did on this tick
    pub jump: JumpOutcome,
}

/// One simulated character in its level.
///
/// Owns the physics world, the movement controller, the camera and the tick
/// side of the intent buffer. Input arrives through [`Self::intent_sender`].
pub struct SimulationInstance {
    pub config: SimConfig,
    pub physics: PhysicsWorld,
    pub controller: MovementController,
    pub camera: FirstPersonCamera,
    pub character: RigidBodyHandle,
    pub tick: u64,
    last_jump: JumpOutcome,
    intent_tx: IntentSender,
    intent_rx: IntentReceiver,
}

impl SimulationInstance {
    /// Build the configured level and spawn the character
    pub fn new(config: SimConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let mut physics = PhysicsWorld::new();
        for ground in &config.level.ground {
            physics.add_ground(ground);
        }
        for wall in &config.level.walls {
            physics.add_wall(wall);
        }
        let character = physics.add_character(
            Vec3::from(config.spawn),
            config.movement.player_height,
            config.movement.body_mass,
        );

        Self::from_parts(config, physics, character)
    }

    /// Wrap an existing world whose `character` body is driven by this instance
    pub fn from_parts(
        config: SimConfig,
        mut physics: PhysicsWorld,
        character: RigidBodyHandle,
    ) -> Result<Self, SetupError> {
        if !physics.has_character(character) {
            return Err(SetupError::MissingCharacter);
        }
        physics.update_queries();

        let (intent_tx, intent_rx) = intent_channel();
        let controller = MovementController::new(config.movement.clone(), config.tick_duration());
        let camera = FirstPersonCamera::new(&config.camera);

        tracing::debug!(
            tick_rate = config.tick_rate,
            grounds = config.level.ground.len(),
            walls = config.level.walls.len(),
            "simulation instance ready"
        );

        Ok(Self {
            config,
            physics,
            controller,
            camera,
            character,
            tick: 0,
            last_jump: JumpOutcome::NotRequested,
            intent_tx,
            intent_rx,
        })
    }

    /// A sender for frame-rate input; may be cloned onto other threads
    pub fn intent_sender(&self) -> IntentSender {
        self.intent_tx.clone()
    }

    /// Run one fixed tick and report the result
    pub fn tick(&mut self) -> TickReport {
        let dt = self.config.tick_duration();
        tick_pipeline::run_tick_phases(self, dt);
        self.report()
    }

    /// Snapshot of the current state
    pub fn report(&self) -> TickReport {
        let body = self.controller.body();
        let position = self
            .physics
            .get_position(self.character)
            .unwrap_or_else(Vec3::zeros);
        let velocity = self
            .physics
            .get_velocity(self.character)
            .unwrap_or_else(Vec3::zeros);

        TickReport {
            tick: self.tick,
            position: position.into(),
            velocity: velocity.into(),
            mode: body.mode.kind(),
            remaining_jumps: body.remaining_jumps,
            yaw_degrees: self.physics.get_yaw_degrees(self.character).unwrap_or(0.0),
            pitch_degrees: self.camera.pitch_degrees(),
            wall_run_timer: body.wall_run_timer(),
            jump: self.last_jump,
        }
    }

    /// Feed one scenario sample per tick, as fast as possible
    pub fn run_headless(&mut self, scenario: &Scenario) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(scenario.total_ticks() as usize);
        for sample in scenario.samples() {
            self.intent_tx.submit(sample);
            reports.push(self.tick());
        }
        reports
    }
}
