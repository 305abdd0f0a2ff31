//! Simulation configuration parsing from TOML files

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::constants::camera as camera_consts;
use crate::game::constants::physics as physics_consts;

/// Movement tunables, immutable for the lifetime of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Top horizontal speed while grounded (m/s)
    pub max_ground_speed: f32,
    /// Top horizontal speed while airborne (m/s)
    pub max_air_speed: f32,
    /// Acceleration toward the top speed while grounded (m/s²)
    pub ground_acceleration: f32,
    /// Acceleration toward the top speed while airborne (m/s²)
    pub air_acceleration: f32,
    /// Top speed multiplier while crouching
    pub crouch_speed_mult: f32,
    /// Vertical speed added per jump, scaled by the tick duration
    pub jump_speed: f32,
    /// Multiplier applied to `gravity`
    pub gravity_scale: f32,
    /// Gravity vector (m/s²)
    pub gravity: [f32; 3],
    /// Whether gravity is integrated while airborne
    pub apply_gravity: bool,
    /// Seconds for ground drag to bring an over-speed body down to the desired speed
    pub current_to_desired_speed_time: f32,
    /// Extra drag time fraction while crouching (1.0 doubles the time)
    pub current_to_desired_speed_time_crouch_multiplier: f32,
    /// Total body height (m)
    pub player_height: f32,
    /// Body mass (kg)
    pub body_mass: f32,
    /// Length of the lateral wall probes (m)
    pub wall_detection_range: f32,
    /// Force pressing the body into the wall while wall-running (N)
    pub wall_stick_force: f32,
    /// Longest a single wall-run may last (s)
    pub wall_run_max_duration: f32,
    /// One-time upward force applied when a wall-run starts (N)
    pub wall_run_vertical_start_force: f32,
    /// Speed added along the wall normal by a wall jump (m/s)
    pub wall_jump_force: f32,
    /// Degrees of pitch per unit of vertical look input
    pub vertical_look_sensitivity: f32,
    /// Degrees of yaw per unit of horizontal look input
    pub horizontal_look_sensitivity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_ground_speed: 8.0,
            max_air_speed: 6.0,
            ground_acceleration: 60.0,
            air_acceleration: 20.0,
            crouch_speed_mult: 0.5,
            jump_speed: 300.0,
            gravity_scale: 2.0,
            gravity: [0.0, -physics_consts::DEFAULT_GRAVITY, 0.0],
            apply_gravity: true,
            current_to_desired_speed_time: 0.5,
            current_to_desired_speed_time_crouch_multiplier: 1.0,
            player_height: physics_consts::CHARACTER_HEIGHT,
            body_mass: physics_consts::CHARACTER_MASS,
            wall_detection_range: 1.0,
            wall_stick_force: 20.0,
            wall_run_max_duration: 1.5,
            wall_run_vertical_start_force: 250.0,
            wall_jump_force: 8.0,
            vertical_look_sensitivity: 0.1,
            horizontal_look_sensitivity: 0.1,
        }
    }
}

/// First-person camera limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_pitch_degrees: f32,
    pub max_pitch_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_pitch_degrees: camera_consts::MIN_PITCH_DEGREES,
            max_pitch_degrees: camera_consts::MAX_PITCH_DEGREES,
        }
    }
}

/// Axis-aligned static box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDef {
    pub translation: [f32; 3],
    pub half_extents: [f32; 3],
}

/// Static level geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub ground: Vec<BoxDef>,
    pub walls: Vec<BoxDef>,
}

impl Default for LevelConfig {
    /// A floor with a corridor of two parallel walls running along -Z.
    fn default() -> Self {
        Self {
            ground: vec![BoxDef {
                translation: [0.0, -0.5, 0.0],
                half_extents: [100.0, 0.5, 100.0],
            }],
            walls: vec![
                BoxDef {
                    translation: [-1.75, 4.0, -40.0],
                    half_extents: [0.25, 4.0, 30.0],
                },
                BoxDef {
                    translation: [4.75, 4.0, -40.0],
                    half_extents: [0.25, 4.0, 30.0],
                },
            ],
        }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed ticks per second
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Character spawn position (capsule center)
    #[serde(default = "default_spawn")]
    pub spawn: [f32; 3],
    #[serde(default)]
    pub movement: MovementConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub level: LevelConfig,
}

fn default_tick_rate() -> u32 {
    physics_consts::DEFAULT_TICK_RATE
}

fn default_spawn() -> [f32; 3] {
    [0.0, physics_consts::CHARACTER_HEIGHT / 2.0, 0.0]
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            spawn: default_spawn(),
            movement: MovementConfig::default(),
            camera: CameraConfig::default(),
            level: LevelConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: SimConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Render this configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Duration of one fixed tick in seconds
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Reject values the movement model cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be at least 1".into()));
        }
        if self.spawn.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("spawn must be finite".into()));
        }

        let m = &self.movement;
        let scalars = [
            ("max_ground_speed", m.max_ground_speed),
            ("max_air_speed", m.max_air_speed),
            ("ground_acceleration", m.ground_acceleration),
            ("air_acceleration", m.air_acceleration),
            ("crouch_speed_mult", m.crouch_speed_mult),
            ("jump_speed", m.jump_speed),
            ("gravity_scale", m.gravity_scale),
            (
                "current_to_desired_speed_time_crouch_multiplier",
                m.current_to_desired_speed_time_crouch_multiplier,
            ),
            ("wall_stick_force", m.wall_stick_force),
            ("wall_run_vertical_start_force", m.wall_run_vertical_start_force),
            ("wall_jump_force", m.wall_jump_force),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "movement.{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        let positive = [
            ("current_to_desired_speed_time", m.current_to_desired_speed_time),
            ("wall_run_max_duration", m.wall_run_max_duration),
            ("wall_detection_range", m.wall_detection_range),
            ("body_mass", m.body_mass),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "movement.{name} must be greater than zero (got {value})"
                )));
            }
        }

        if m.gravity.iter().any(|v| !v.is_finite())
            || !m.vertical_look_sensitivity.is_finite()
            || !m.horizontal_look_sensitivity.is_finite()
        {
            return Err(ConfigError::Invalid(
                "movement.gravity and look sensitivities must be finite".into(),
            ));
        }

        if !(m.player_height > 2.0 * physics_consts::CHARACTER_RADIUS) {
            return Err(ConfigError::Invalid(format!(
                "movement.player_height must exceed the capsule diameter {}",
                2.0 * physics_consts::CHARACTER_RADIUS
            )));
        }

        if !(self.camera.min_pitch_degrees <= self.camera.max_pitch_degrees) {
            return Err(ConfigError::Invalid(
                "camera.min_pitch_degrees must not exceed camera.max_pitch_degrees".into(),
            ));
        }

        let boxes = self.level.ground.iter().chain(self.level.walls.iter());
        for b in boxes {
            if b.translation.iter().any(|v| !v.is_finite())
                || b.half_extents.iter().any(|v| !v.is_finite() || *v <= 0.0)
            {
                return Err(ConfigError::Invalid(
                    "level boxes need finite translations and positive half extents".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Errors that can occur when loading or writing configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
