use bevy_math::Vec3;
use tracing::debug;

use crate::{
    classify::CollisionSet,
    oracle::{CollisionOracle, ProxyFilter},
};

// ============================================================================
// View Collision Guard
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGuard {
    pub collision_distance: f32,
    pub pullback: f32,
}

impl ViewGuard {
    #[must_use]
    pub const fn new(collision_distance: f32, pullback: f32) -> Self {
        Self {
            collision_distance,
            pullback,
        }
    }

    /// Safe look-at target for a camera at `position` looking at `target`,
    /// or None when the view ray is clear. Floors never carry view proxies, so
    /// looking down is never clamped.
    #[must_use]
    pub fn clamp_target(&self, oracle: &CollisionOracle, set: &CollisionSet, position: Vec3, target: Vec3) -> Option<Vec3> {
        if set.is_empty() {
            return None;
        }
        let result = oracle.cast(position, target - position, set, ProxyFilter::View);
        let hit = result.hit?;
        if hit.flags.is_floor || hit.distance >= self.collision_distance / 2.0 {
            return None;
        }

        // Stay short of the hit but never behind the camera
        let pullback = self.pullback.min(hit.distance / 2.0);
        let safe = hit.point - result.direction * pullback;
        debug!("view target clamped from {target} to {safe}");
        Some(safe)
    }
}
