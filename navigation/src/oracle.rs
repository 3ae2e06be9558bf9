use bevy_math::Vec3;
use tracing::{debug, trace};

use crate::{
    classify::{Classification, CollisionObject, CollisionSet},
    config::Thresholds,
    constants::{DOWNWARD_CANT_Y, DOWNWARD_DIRECTION_Y, PHYSICS_EPSILON},
    diagnostics::ThrottledLog,
};

// ============================================================================
// Cast Types
// ============================================================================

// Which proxies a cast considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyFilter {
    Movement,
    View,
}

impl ProxyFilter {
    #[must_use]
    pub const fn accepts(self, proxy: &CollisionObject) -> bool {
        match self {
            Self::Movement => proxy.usage.movement,
            Self::View => proxy.usage.view,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    pub index: usize, // Position of the proxy in the collision set
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub flags: Classification,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastResult {
    pub origin: Vec3,
    pub direction: Vec3,
    pub hit: Option<CastHit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstructionCause {
    Ray,       // A cast found geometry within threshold
    Clearance, // The move would end too close to a proxy
}

/// Why a move was rejected, with the outward normal of the blocking surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstruction {
    pub index: usize,
    pub distance: f32,
    pub normal: Vec3,
    pub flags: Classification,
    pub cause: ObstructionCause,
}

// ============================================================================
// Collision Oracle
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CollisionOracle {
    thresholds: Thresholds,
    empty_set: ThrottledLog,
    bad_direction: ThrottledLog,
}

impl CollisionOracle {
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub const fn set_thresholds(&mut self, thresholds: Thresholds) {
        self.thresholds = thresholds;
    }

    // Unit direction, or None (logged) for zero-length and non-finite input
    fn unit_direction(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        let unit = if origin.is_finite() {
            direction.try_normalize()
        } else {
            None
        };
        if unit.is_none()
            && let Some(count) = self.bad_direction.tick()
        {
            debug!(count, "degenerate cast (origin {origin}, direction {direction}), treating as clear");
        }
        unit
    }

    fn fails_open(&self, set: &CollisionSet) -> bool {
        if set.is_empty() {
            if let Some(count) = self.empty_set.tick() {
                debug!(count, "collision set is empty, treating every cast as clear");
            }
            return true;
        }
        false
    }

    #[must_use]
    pub fn query(&self, origin: Vec3, direction: Vec3, set: &CollisionSet) -> CastResult {
        self.cast(origin, direction, set, ProxyFilter::Movement)
    }

    /// Cast against the proxies accepted by `filter`. Proxies that contain
    /// the origin are ignored, so a cast never traps the avatar inside one.
    #[must_use]
    pub fn cast(&self, origin: Vec3, direction: Vec3, set: &CollisionSet, filter: ProxyFilter) -> CastResult {
        let Some(direction) = self.unit_direction(origin, direction) else {
            return CastResult {
                origin,
                direction,
                hit: None,
            };
        };

        let hit = set
            .iter()
            .enumerate()
            .filter(|(_, proxy)| filter.accepts(proxy))
            .filter_map(|(index, proxy)| {
                proxy.bounds.ray_hit(origin, direction).map(|hit| CastHit {
                    index,
                    distance: hit.distance,
                    point: direction.mul_add(Vec3::splat(hit.distance), origin),
                    normal: hit.normal,
                    flags: proxy.flags,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        CastResult { origin, direction, hit }
    }

    // Rejection distance for a hit; None when the hit is bypassed entirely
    fn rejection_distance(&self, hit: &CastHit, origin: Vec3, downward: bool) -> Option<f32> {
        if !hit.flags.is_exhibit_stand {
            return Some(self.thresholds.collision_distance);
        }

        let distance = origin.distance(hit.point);
        if self.thresholds.is_ultra_far(distance) {
            return None;
        }
        let base = if downward {
            self.thresholds.downward_stand_distance()
        } else {
            self.thresholds.stand_distance
        };
        Some(self.thresholds.stand_threshold(distance, base))
    }

    // Apply acceptance rules to a cast; `stands_only` ignores every other role
    fn obstruction(&self, result: &CastResult, stands_only: bool) -> Option<Obstruction> {
        let hit = result.hit?;
        if stands_only && !hit.flags.is_exhibit_stand {
            return None;
        }
        let downward = result.direction.y < DOWNWARD_DIRECTION_Y;
        let limit = self.rejection_distance(&hit, result.origin, downward)?;
        (hit.distance < limit).then_some(Obstruction {
            index: hit.index,
            distance: hit.distance,
            normal: hit.normal,
            flags: hit.flags,
            cause: ObstructionCause::Ray,
        })
    }

    // Single cast with classification-aware acceptance
    #[must_use]
    pub fn check(&self, origin: Vec3, direction: Vec3, set: &CollisionSet) -> Option<Obstruction> {
        if self.fails_open(set) {
            return None;
        }
        self.obstruction(&self.query(origin, direction, set), false)
    }

    /// Straight down plus four canted probes. The canted probes only count
    /// exhibit stands, so thin or off-center pedestal tops are caught before
    /// the origin sinks below them.
    #[must_use]
    pub fn check_downward(&self, origin: Vec3, set: &CollisionSet) -> Option<Obstruction> {
        if self.fails_open(set) {
            return None;
        }
        if let Some(obstruction) = self.obstruction(&self.query(origin, Vec3::NEG_Y, set), false) {
            return Some(obstruction);
        }

        let cant = self.thresholds.downward_cant;
        [
            Vec3::new(cant, DOWNWARD_CANT_Y, 0.0),
            Vec3::new(-cant, DOWNWARD_CANT_Y, 0.0),
            Vec3::new(0.0, DOWNWARD_CANT_Y, cant),
            Vec3::new(0.0, DOWNWARD_CANT_Y, -cant),
        ]
        .into_iter()
        .find_map(|probe| self.obstruction(&self.query(origin, probe, set), true))
    }

    /// Validate a move along `direction`: the primary cast plus two lateral
    /// casts perpendicular to it in the horizontal plane. Downward moves use
    /// the multi-probe downward check instead.
    #[must_use]
    pub fn check_move(&self, origin: Vec3, direction: Vec3, set: &CollisionSet) -> Option<Obstruction> {
        if self.fails_open(set) {
            return None;
        }
        let direction = self.unit_direction(origin, direction)?;
        if direction.y < DOWNWARD_DIRECTION_Y {
            return self.check_downward(origin, set);
        }

        if let Some(obstruction) = self.obstruction(&self.query(origin, direction, set), false) {
            trace!("primary cast blocked at {:.3}", obstruction.distance);
            return Some(obstruction);
        }

        // Lateral casts only make sense for moves with a horizontal component
        let lateral = direction.cross(Vec3::Y);
        if lateral.length_squared() < PHYSICS_EPSILON {
            return None;
        }
        [lateral, -lateral]
            .into_iter()
            .find_map(|side| self.obstruction(&self.query(origin, side, set), false))
    }

    // ========================================================================
    // Clearance Guard
    // ========================================================================

    // Distance to the proxy minus its rejection threshold; None for stands far
    // enough away to be ignored
    fn margin(&self, proxy: &CollisionObject, position: Vec3) -> Option<f32> {
        let distance = proxy.bounds.distance_to_point(position);
        let threshold = if proxy.flags.is_exhibit_stand {
            if self.thresholds.is_ultra_far(distance) {
                return None;
            }
            self.thresholds.stand_threshold(distance, self.thresholds.stand_distance)
        } else {
            self.thresholds.collision_distance
        };
        Some(distance - threshold)
    }

    // Smallest margin to any movement proxy; infinite for an empty set
    #[must_use]
    pub fn clearance(&self, position: Vec3, set: &CollisionSet) -> f32 {
        set.iter()
            .filter(|proxy| proxy.usage.movement)
            .filter_map(|proxy| self.margin(proxy, position))
            .fold(f32::INFINITY, f32::min)
    }

    /// First proxy that a move from `from` to `to` would bring within its
    /// threshold without improving on the starting margin.
    #[must_use]
    pub fn violation(&self, from: Vec3, to: Vec3, set: &CollisionSet) -> Option<Obstruction> {
        if !to.is_finite() {
            return None;
        }

        let mut worst: Option<(f32, usize)> = None;
        for (index, proxy) in set.iter().enumerate().filter(|(_, p)| p.usage.movement) {
            let Some(after) = self.margin(proxy, to) else {
                continue;
            };
            if after >= 0.0 {
                continue;
            }
            let before = self.margin(proxy, from).unwrap_or(f32::INFINITY);
            if after >= before - PHYSICS_EPSILON {
                continue;
            }
            if worst.is_none_or(|(margin, _)| after < margin) {
                worst = Some((after, index));
            }
        }

        let (_, index) = worst?;
        let proxy = set.get(index)?;
        let closest = proxy.bounds.closest_point(to);
        let normal = (to - closest)
            .try_normalize()
            .or_else(|| (from - proxy.bounds.closest_point(from)).try_normalize())
            .or_else(|| (from - to).try_normalize())
            .unwrap_or(Vec3::ZERO);

        Some(Obstruction {
            index,
            distance: to.distance(closest),
            normal,
            flags: proxy.flags,
            cause: ObstructionCause::Clearance,
        })
    }

    #[must_use]
    pub fn admits(&self, from: Vec3, to: Vec3, set: &CollisionSet) -> bool {
        self.violation(from, to, set).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classify::{ProxyKind, ProxyUsage, Role},
        geometry::Aabb,
        scene::ObjectId,
    };

    fn proxy(role: Option<Role>, bounds: Aabb) -> CollisionObject {
        let usage = if matches!(role, Some(Role::Floor)) {
            ProxyUsage::MOVEMENT
        } else {
            ProxyUsage::BOTH
        };
        CollisionObject::new(ObjectId(0), "proxy", role, ProxyKind::Body, usage, bounds)
    }

    fn wall_at_x(x: f32) -> CollisionObject {
        proxy(
            Some(Role::Wall),
            Aabb::new(Vec3::new(x, -100.0, -100.0), Vec3::new(x + 0.2, 100.0, 100.0)),
        )
    }

    fn stand_at(center: Vec3) -> CollisionObject {
        proxy(Some(Role::ExhibitStand), Aabb::from_center_size(center, Vec3::ONE))
    }

    #[test]
    fn test_wall_within_threshold_blocks() {
        let oracle = CollisionOracle::default();
        let set = CollisionSet::from_objects(vec![wall_at_x(1.0)]);

        let blocked = oracle.check(Vec3::new(0.5, 0.0, 0.0), Vec3::X, &set).expect("blocked");
        assert_eq!(blocked.normal, Vec3::NEG_X);
        assert!((blocked.distance - 0.5).abs() < 1e-5);
        assert!(oracle.check(Vec3::ZERO, Vec3::X, &set).is_none());
    }

    #[test]
    fn test_query_returns_nearest_hit() {
        let oracle = CollisionOracle::default();
        let set = CollisionSet::from_objects(vec![wall_at_x(3.0), wall_at_x(1.0)]);
        let result = oracle.query(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), &set);
        let hit = result.hit.expect("hit");
        assert_eq!(hit.index, 1);
        assert!((hit.point.x - 1.0).abs() < 1e-5);
        assert_eq!(result.direction, Vec3::X);
    }

    #[test]
    fn test_empty_set_and_degenerate_direction_fail_open() {
        let oracle = CollisionOracle::default();
        assert!(oracle.check(Vec3::ZERO, Vec3::X, &CollisionSet::default()).is_none());

        let set = CollisionSet::from_objects(vec![wall_at_x(0.1)]);
        assert!(oracle.check(Vec3::ZERO, Vec3::ZERO, &set).is_none());
        assert!(oracle.check(Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0), &set).is_none());
        assert!(oracle.check_move(Vec3::ZERO, Vec3::ZERO, &set).is_none());
    }

    #[test]
    fn test_cast_from_inside_ignores_proxy() {
        let oracle = CollisionOracle::default();
        let set = CollisionSet::from_objects(vec![stand_at(Vec3::ZERO)]);
        assert!(oracle.check(Vec3::ZERO, Vec3::X, &set).is_none());
    }

    #[test]
    fn test_ultra_far_stand_never_blocks() {
        let oracle = CollisionOracle::new(Thresholds {
            stand_distance: 100.0,
            ..Thresholds::default()
        });
        let set = CollisionSet::from_objects(vec![stand_at(Vec3::new(20.0, 0.0, 0.0))]);
        assert!(oracle.check(Vec3::ZERO, Vec3::X, &set).is_none());
        assert!(oracle.admits(Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0), &set));
    }

    #[test]
    fn test_far_stand_threshold_decays() {
        // A large base threshold makes the decay observable: 8 * (5/7.5)^2 = 3.56
        let oracle = CollisionOracle::new(Thresholds {
            stand_distance: 8.0,
            ..Thresholds::default()
        });
        let set = CollisionSet::from_objects(vec![stand_at(Vec3::new(8.0, 0.0, 0.0))]);
        assert!(oracle.check(Vec3::ZERO, Vec3::X, &set).is_none());
        assert!(oracle.check(Vec3::new(4.0, 0.0, 0.0), Vec3::X, &set).is_some());
    }

    #[test]
    fn test_downward_probes_catch_off_center_stand() {
        let oracle = CollisionOracle::default();
        let stand = proxy(
            Some(Role::ExhibitStand),
            Aabb::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 1.0, 0.5)),
        );
        let set = CollisionSet::from_objects(vec![stand]);

        // Straight down misses the stand, a canted probe hits its side
        let origin = Vec3::new(0.7, 1.5, 0.0);
        assert!(oracle.check(origin, Vec3::NEG_Y, &set).is_none());
        assert!(oracle.check_downward(origin, &set).is_some());
        assert!(oracle.check_move(origin, Vec3::NEG_Y, &set).is_some());
    }

    #[test]
    fn test_downward_stand_threshold_enlarged() {
        let oracle = CollisionOracle::default();
        let set = CollisionSet::from_objects(vec![stand_at(Vec3::ZERO)]);
        // 0.8 above the top: beyond 0.6, inside 0.6 * 1.5
        let origin = Vec3::new(0.0, 1.3, 0.0);
        assert!(oracle.check_downward(origin, &set).is_some());
        assert!(oracle.check(Vec3::new(-1.3, 0.0, 0.0), Vec3::X, &set).is_none());
    }

    #[test]
    fn test_lateral_cast_blocks_move() {
        let oracle = CollisionOracle::default();
        let set = CollisionSet::from_objects(vec![proxy(
            Some(Role::Wall),
            Aabb::new(Vec3::new(-100.0, -100.0, 0.5), Vec3::new(100.0, 100.0, 0.7)),
        )]);
        let blocked = oracle.check_move(Vec3::ZERO, Vec3::X, &set).expect("lateral hit");
        assert_eq!(blocked.normal, Vec3::NEG_Z);
    }

    #[test]
    fn test_clearance_guard() {
        let oracle = CollisionOracle::default();
        let set = CollisionSet::from_objects(vec![wall_at_x(1.0)]);

        assert!((oracle.clearance(Vec3::new(0.2, 0.0, 0.0), &set) - 0.2).abs() < 1e-5);
        assert!(oracle.admits(Vec3::new(0.3, 0.0, 0.0), Vec3::new(0.4, 0.0, 0.0), &set));

        let violation = oracle
            .violation(Vec3::new(0.4, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0), &set)
            .expect("too close");
        assert_eq!(violation.cause, ObstructionCause::Clearance);
        assert_eq!(violation.normal, Vec3::NEG_X);

        // Already too close: moving away or parallel is still allowed
        let near = Vec3::new(0.5, 0.0, 0.0);
        assert!(oracle.admits(near, Vec3::new(0.45, 0.0, 0.0), &set));
        assert!(oracle.admits(near, Vec3::new(0.5, 0.0, 0.1), &set));
        assert_eq!(oracle.clearance(Vec3::ZERO, &CollisionSet::default()), f32::INFINITY);
    }
}
