#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_math::{Affine3A, Vec3};

use crate::constants::PHYSICS_EPSILON;

/// Where a ray enters a box: distance along the (normalized) ray and the
/// outward normal of the face it crossed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub normal: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    #[must_use]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    // Same center, every extent multiplied by the matching component of `factor`
    #[must_use]
    pub fn scaled(&self, factor: Vec3) -> Self {
        Self::from_center_size(self.center(), self.size() * factor)
    }

    // Grow (or shrink, for negative values) each side by `amount`
    #[must_use]
    pub fn expanded(&self, amount: Vec3) -> Self {
        Self::new(self.min - amount, self.max + amount)
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    #[must_use]
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    // Euclidean distance from a point to the box surface; zero when inside.
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        point.distance(self.closest_point(point))
    }

    // Axis-aligned hull of this box after an affine transform (all eight corners).
    #[must_use]
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let world = transform.transform_point3(corner);
            min = min.min(world);
            max = max.max(world);
        }
        Self { min, max }
    }

    /// Cast a ray against the box surface.
    ///
    /// `direction` must be normalized. Rays starting inside the box report no
    /// hit, so an avatar that ends up inside a proxy can always leave it.
    #[must_use]
    pub fn ray_hit(&self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
        let center = self.center();
        let half = self.size() / 2.0;
        let local = origin - center;

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut hit_normal = Vec3::ZERO;

        for axis in 0..3 {
            let dir = direction[axis];
            let pos = local[axis];
            let extent = half[axis];

            if dir.abs() < PHYSICS_EPSILON {
                if pos.abs() > extent {
                    return None;
                }
                continue;
            }

            let t1 = (-extent - pos) / dir;
            let t2 = (extent - pos) / dir;
            let (t_min, t_max) = if t1 < t2 { (t1, t2) } else { (t2, t1) };

            if t_min > t_enter {
                t_enter = t_min;
                let mut normal = Vec3::ZERO;
                normal[axis] = if dir > 0.0 { -1.0 } else { 1.0 };
                hit_normal = normal;
            }
            t_exit = t_exit.min(t_max);
            if t_enter > t_exit {
                return None;
            }
        }

        // Box behind the ray, or origin inside it
        if t_exit < 0.0 || t_enter < 0.0 {
            return None;
        }

        Some(RayHit {
            distance: t_enter,
            normal: hit_normal,
        })
    }
}
