//! Scripted input timelines for headless runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::intent::IntentSample;

/// A stretch of ticks with constant input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub ticks: u32,
    #[serde(default)]
    pub move_input: [f32; 2],
    /// Look delta applied on every tick of the segment
    #[serde(default)]
    pub look: [f32; 2],
    /// Press jump on the first tick of the segment
    #[serde(default)]
    pub jump: bool,
    #[serde(default)]
    pub crouch: bool,
}

impl Segment {
    fn idle(ticks: u32) -> Self {
        Self {
            ticks,
            move_input: [0.0, 0.0],
            look: [0.0, 0.0],
            jump: false,
            crouch: false,
        }
    }

    fn forward(ticks: u32) -> Self {
        Self {
            move_input: [0.0, 1.0],
            ..Self::idle(ticks)
        }
    }

    fn jump(mut self) -> Self {
        self.jump = true;
        self
    }
}

/// Ordered list of input segments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse scenario {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Scenario {
    /// Load a scenario from a TOML file with `[[segments]]` tables
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Built-in run through the default corridor: settle on the floor, sprint
    /// forward, veer left into the wall, run along it, then kick off.
    pub fn corridor_run() -> Self {
        Self {
            segments: vec![
                Segment::idle(25),
                Segment::forward(40),
                Segment {
                    move_input: [-0.7, 0.7],
                    ..Segment::forward(8).jump()
                },
                Segment::forward(30),
                Segment::forward(20).jump(),
                Segment::idle(60),
            ],
        }
    }

    /// Reproducible random input of `ticks` total length.
    pub fn random(seed: u64, ticks: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut segments = Vec::new();
        let mut remaining = ticks;

        while remaining > 0 {
            let len = rng.gen_range(1..=30).min(remaining);
            segments.push(Segment {
                ticks: len,
                move_input: [rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)],
                look: [rng.gen_range(-20.0..=20.0), rng.gen_range(-10.0..=10.0)],
                jump: rng.gen_bool(0.35),
                crouch: rng.gen_bool(0.15),
            });
            remaining -= len;
        }

        Self { segments }
    }

    pub fn total_ticks(&self) -> u64 {
        self.segments.iter().map(|s| s.ticks as u64).sum()
    }

    /// One intent sample per tick.
    pub fn samples(&self) -> impl Iterator<Item = IntentSample> + '_ {
        self.segments.iter().flat_map(|segment| {
            (0..segment.ticks).map(move |i| IntentSample {
                move_input: segment.move_input,
                look: segment.look,
                jump: segment.jump && i == 0,
                crouch: segment.crouch,
            })
        })
    }
}
