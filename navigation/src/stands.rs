use bevy_math::{Affine3A, Quat, Vec3};

use crate::{
    geometry::Aabb,
    scene::{ObjectId, SceneObject},
};

// ============================================================================
// Exhibit Stand Builders
// ============================================================================

// Default names carry the stand keyword so the classifier tags them
pub const BOX_STAND_NAME: &str = "dizuo_custom";
pub const CYLINDER_STAND_NAME: &str = "dizuo_cylinder";

/// Box-shaped pedestal.
#[derive(Debug, Clone)]
pub struct BoxStand {
    pub name: String,
    pub position: Vec3,
    pub size: Vec3,
    pub yaw: f32, // radians
}

impl Default for BoxStand {
    fn default() -> Self {
        Self {
            name: BOX_STAND_NAME.to_string(),
            position: Vec3::ZERO,
            size: Vec3::new(1.0, 0.5, 1.0),
            yaw: 0.0,
        }
    }
}

impl BoxStand {
    #[must_use]
    pub fn build(&self, id: ObjectId) -> SceneObject {
        SceneObject::new(
            id,
            self.name.clone(),
            Aabb::from_center_size(Vec3::ZERO, self.size),
            Affine3A::from_rotation_translation(Quat::from_rotation_y(self.yaw), self.position),
        )
    }
}

/// Round pedestal, bounded by its enclosing box.
#[derive(Debug, Clone)]
pub struct CylinderStand {
    pub name: String,
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Default for CylinderStand {
    fn default() -> Self {
        Self {
            name: CYLINDER_STAND_NAME.to_string(),
            position: Vec3::ZERO,
            radius: 0.5,
            height: 0.5,
        }
    }
}

impl CylinderStand {
    #[must_use]
    pub fn build(&self, id: ObjectId) -> SceneObject {
        let diameter = self.radius.abs() * 2.0;
        SceneObject::new(
            id,
            self.name.clone(),
            Aabb::from_center_size(Vec3::ZERO, Vec3::new(diameter, self.height, diameter)),
            Affine3A::from_translation(self.position),
        )
    }
}
