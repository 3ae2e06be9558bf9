use bevy_math::Vec3;

/// Camera handle owned by the host: a position and a look-at target.
pub trait CameraRig {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn target(&self) -> Vec3;
    fn set_target(&mut self, target: Vec3);

    // Rigid translation that keeps the view direction
    fn translate(&mut self, delta: Vec3) {
        let position = self.position();
        let target = self.target();
        self.set_position(position + delta);
        self.set_target(target + delta);
    }
}

/// Minimal look-at camera for hosts without their own camera type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAtCamera {
    pub position: Vec3,
    pub target: Vec3,
}

impl LookAtCamera {
    #[must_use]
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }
}

impl CameraRig for LookAtCamera {
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
