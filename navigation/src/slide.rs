use bevy_math::Vec3;
use tracing::trace;

use crate::{
    classify::CollisionSet,
    constants::PHYSICS_EPSILON,
    oracle::{CollisionOracle, Obstruction},
};

// ============================================================================
// Slide Resolver
// ============================================================================

// Flatten a vector onto the horizontal plane and normalize it
fn horizontal(v: Vec3) -> Option<Vec3> {
    Vec3::new(v.x, 0.0, v.z).try_normalize()
}

// Quarter turn clockwise about +Y: (x, z) -> (z, -x)
const fn clockwise(v: Vec3) -> Vec3 {
    Vec3::new(v.z, 0.0, -v.x)
}

/// The two horizontal directions orthogonal to the blocking surface (when its
/// normal has a horizontal component) or to the move itself.
///
/// The one that keeps forward progress comes first. When neither does (a
/// head-on block) the clockwise turn of the move is preferred.
#[must_use]
pub fn slide_candidates(move_dir: Vec3, normal: Option<Vec3>) -> Option<[Vec3; 2]> {
    let flat_move = horizontal(move_dir)?;
    let axis = normal.and_then(horizontal).unwrap_or(flat_move);

    let tangent = clockwise(axis);
    let progress = tangent.dot(flat_move);
    let first = if progress > PHYSICS_EPSILON {
        tangent
    } else if progress < -PHYSICS_EPSILON {
        -tangent
    } else if tangent.dot(clockwise(flat_move)) >= 0.0 {
        tangent
    } else {
        -tangent
    };

    Some([first, -first])
}

// Displacement to commit for a rejected move, or zero when neither side is clear
#[must_use]
pub fn resolve_slide(
    oracle: &CollisionOracle,
    set: &CollisionSet,
    position: Vec3,
    move_dir: Vec3,
    obstruction: Option<&Obstruction>,
    step: f32,
) -> Vec3 {
    if step.is_nan() || step <= 0.0 {
        return Vec3::ZERO;
    }
    let Some(candidates) = slide_candidates(move_dir, obstruction.map(|o| o.normal)) else {
        return Vec3::ZERO;
    };

    for direction in candidates {
        if oracle.check(position, direction, set).is_some() {
            continue;
        }
        let delta = direction * step;
        if oracle.admits(position, position + delta, set) {
            trace!("sliding along {direction}");
            return delta;
        }
    }
    Vec3::ZERO
}
