use crate::config::CameraConfig;
use crate::game::movement::CameraRig;

/// First-person camera pitch, accumulated from look input and clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPersonCamera {
    pitch_degrees: f32,
    min_pitch_degrees: f32,
    max_pitch_degrees: f32,
}

impl FirstPersonCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            pitch_degrees: 0.0,
            min_pitch_degrees: config.min_pitch_degrees,
            max_pitch_degrees: config.max_pitch_degrees,
        }
    }

    /// Current pitch; positive looks up
    pub fn pitch_degrees(&self) -> f32 {
        self.pitch_degrees
    }
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl CameraRig for FirstPersonCamera {
    fn rotate_camera(&mut self, pitch_delta_degrees: f32) {
        self.pitch_degrees = (self.pitch_degrees + pitch_delta_degrees)
            .clamp(self.min_pitch_degrees, self.max_pitch_degrees);
    }
}
