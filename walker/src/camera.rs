use bevy_math::{EulerRot, Quat, Vec3};
use navigation::CameraRig;

use crate::constants::{LOOK_DISTANCE, MAX_PITCH_DEGREES};

// ============================================================================
// Simulated First-Person Camera
// ============================================================================

/// Headless stand-in for the host camera: an eye position, a look-at target
/// and the yaw/pitch the target was last derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimCamera {
    position: Vec3,
    target: Vec3,
    yaw: f32,   // radians, 0 looks down -Z
    pitch: f32, // radians, positive looks up
}

impl SimCamera {
    #[must_use]
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            target: position,
            yaw,
            pitch: clamp_pitch(pitch),
        };
        camera.target = camera.position + camera.view_direction() * LOOK_DISTANCE;
        camera
    }

    #[must_use]
    pub fn view_direction(&self) -> Vec3 {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0) * Vec3::NEG_Z
    }

    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    // Orbit the look-at target around the eye by yaw/pitch deltas (radians)
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if !yaw_delta.is_finite() || !pitch_delta.is_finite() {
            return;
        }
        self.yaw = (self.yaw + yaw_delta).rem_euclid(std::f32::consts::TAU);
        self.pitch = clamp_pitch(self.pitch + pitch_delta);
        self.target = self.position + self.view_direction() * LOOK_DISTANCE;
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    let limit = MAX_PITCH_DEGREES.to_radians();
    pitch.clamp(-limit, limit)
}

impl CameraRig for SimCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_default_view_looks_down_negative_z() {
        let camera = SimCamera::new(Vec3::new(0.0, 2.0, 0.0), 0.0, 0.0);
        assert!((camera.target() - Vec3::new(0.0, 2.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_look_turns_left_with_positive_yaw() {
        let mut camera = SimCamera::new(Vec3::ZERO, 0.0, 0.0);
        camera.look(FRAC_PI_2, 0.0);
        assert!((camera.view_direction() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = SimCamera::new(Vec3::ZERO, 0.0, 0.0);
        camera.look(0.0, 10.0);
        assert!((camera.pitch() - MAX_PITCH_DEGREES.to_radians()).abs() < 1e-6);
        assert!(camera.view_direction().y < 1.0);
    }

    #[test]
    fn test_translate_keeps_view_direction() {
        let mut camera = SimCamera::new(Vec3::ZERO, 0.3, 0.1);
        let before = camera.target() - camera.position();
        camera.translate(Vec3::new(1.0, 0.5, -2.0));
        assert!((camera.target() - camera.position() - before).length() < 1e-5);
    }
}
