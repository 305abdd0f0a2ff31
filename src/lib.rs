//! Wallrunner movement simulator library
//!
//! A tick-driven first-person character controller with ground detection,
//! multi-jump and wall-running, backed by a Rapier3D world. Exposed as a
//! library for the CLI and for testing.

pub mod config;
pub mod game;
pub mod logging;
