//! Movement and physics constants.
//! Centralizing these prevents bugs from duplicated hardcoded values.

/// Physics constants
pub mod physics {
    use rapier3d::prelude::Group;

    /// Default gravity in m/s² (downward)
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Default fixed tick rate (50 Hz)
    pub const DEFAULT_TICK_RATE: u32 = 50;

    /// Character capsule radius
    pub const CHARACTER_RADIUS: f32 = 0.5;

    /// Character capsule total height
    pub const CHARACTER_HEIGHT: f32 = 2.0;

    /// Character body mass in kilograms
    pub const CHARACTER_MASS: f32 = 1.0;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;

    // Surface layers. Characters query against ground and walls but never
    // against each other.
    pub const GROUP_GROUND: Group = Group::GROUP_1;
    pub const GROUP_WALL: Group = Group::GROUP_2;
    pub const GROUP_CHARACTER: Group = Group::GROUP_3;
    pub const GROUP_UNTAGGED: Group = Group::GROUP_4;
}

/// Character movement constants
pub mod movement {
    /// Jump budget granted on landing
    pub const MAX_JUMPS: u8 = 2;

    /// Jump budget left after a wall-run starts or stops
    pub const WALL_RUN_JUMPS: u8 = 1;

    /// Extra length added to the downward ground probe beyond half the body height
    pub const GROUND_PROBE_MARGIN: f32 = 0.05;

    /// Shortest normal accepted from a surface hit before it is treated as degenerate
    pub const MIN_NORMAL_LENGTH: f32 = 1.0e-6;
}

/// Camera defaults
pub mod camera {
    /// Lowest pitch the first-person camera may reach (degrees)
    pub const MIN_PITCH_DEGREES: f32 = -89.0;

    /// Highest pitch the first-person camera may reach (degrees)
    pub const MAX_PITCH_DEGREES: f32 = 89.0;
}
