use bevy_math::Vec3;
use tracing::trace;

use crate::{
    classify::CollisionSet,
    config::NavigationConfig,
    constants::{GRAVITY_BASE_FACTOR, GRAVITY_HEIGHT_SCALE, PHYSICS_EPSILON},
    oracle::CollisionOracle,
};

// ============================================================================
// Vertical Intent
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSource {
    Idle,
    Manual,
    Gravity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalIntent {
    pub value: f32, // Signed, in [-1, 1]
    pub source: IntentSource,
}

impl VerticalIntent {
    pub const IDLE: Self = Self {
        value: 0.0,
        source: IntentSource::Idle,
    };
}

/// Resolve this frame's vertical intent. Held input always wins over passive
/// gravity, and ascend wins when both directions are held.
#[must_use]
pub fn vertical_intent(ascend: bool, descend: bool, height: f32, config: &NavigationConfig) -> VerticalIntent {
    if ascend || descend {
        return VerticalIntent {
            value: if ascend { 1.0 } else { -1.0 },
            source: IntentSource::Manual,
        };
    }

    let diff = height - config.resting_height;
    if config.gravity_enabled && diff > PHYSICS_EPSILON {
        let factor = (diff / GRAVITY_HEIGHT_SCALE + GRAVITY_BASE_FACTOR).min(1.0);
        return VerticalIntent {
            value: -factor,
            source: IntentSource::Gravity,
        };
    }

    VerticalIntent::IDLE
}

// ============================================================================
// Vertical Step
// ============================================================================

/// Planned vertical displacement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalStep {
    pub delta: f32,
    pub target_height: f32, // Snapped exactly to the resting height when clamped
    pub needs_check: bool,  // Whether the move is fast enough to warrant casts
}

impl VerticalStep {
    // Shrink the step toward its start height, keeping the check decision.
    // A snapped target only moves back up, never past the resting height.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        if factor >= 1.0 {
            return self;
        }
        let delta = self.delta * factor.max(0.0);
        Self {
            delta,
            target_height: self.target_height - (self.delta - delta),
            ..self
        }
    }
}

/// Plan a vertical step. `cap` bounds the displacement magnitude.
#[must_use]
pub fn plan_vertical_step(
    intent: VerticalIntent,
    height: f32,
    delta_secs: f32,
    cap: f32,
    config: &NavigationConfig,
) -> Option<VerticalStep> {
    if intent.source == IntentSource::Idle || intent.value == 0.0 {
        return None;
    }

    let speed = match intent.source {
        IntentSource::Gravity => config.gravity_strength,
        _ => config.move_speed,
    };
    let cap = cap.max(0.0);
    let mut delta = (intent.value * speed * delta_secs).clamp(-cap, cap);
    let mut target_height = height + delta;

    // Never sink below the resting height while gravity is on; the overshoot
    // is absorbed by snapping, and an avatar already below it is not lifted
    if config.gravity_enabled && delta < 0.0 {
        let floor = config.resting_height;
        if height <= floor {
            delta = 0.0;
            target_height = height;
        } else if target_height <= floor {
            delta = floor - height;
            target_height = floor;
        }
    }

    if delta == 0.0 {
        return None;
    }

    Some(VerticalStep {
        delta,
        target_height,
        needs_check: intent.value > 0.0 || intent.value < -config.vertical_check_threshold,
    })
}

/// Apply collision checks to a planned step and return the committed height.
/// A blocked step leaves the height unchanged.
#[must_use]
pub fn resolve_vertical_step(
    oracle: &CollisionOracle,
    set: &CollisionSet,
    position: Vec3,
    step: &VerticalStep,
    collision_enabled: bool,
) -> f32 {
    if !collision_enabled {
        return step.target_height;
    }

    if step.needs_check {
        let blocked = if step.delta < 0.0 {
            oracle.check_downward(position, set)
        } else {
            oracle.check(position, Vec3::Y, set)
        };
        if let Some(obstruction) = blocked {
            trace!("vertical step blocked at {:.3}", obstruction.distance);
            return position.y;
        }
    }

    let target = Vec3::new(position.x, step.target_height, position.z);
    if oracle.admits(position, target, set) {
        step.target_height
    } else {
        position.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_input_overrides_gravity() {
        let config = NavigationConfig::default();
        let intent = vertical_intent(true, false, 5.0, &config);
        assert_eq!(intent.source, IntentSource::Manual);
        assert_eq!(intent.value, 1.0);

        let intent = vertical_intent(false, true, 5.0, &config);
        assert_eq!(intent.value, -1.0);
    }

    #[test]
    fn test_ascend_wins_when_both_held() {
        let config = NavigationConfig::default();
        let intent = vertical_intent(true, true, 5.0, &config);
        assert_eq!(intent.source, IntentSource::Manual);
        assert_eq!(intent.value, 1.0);

        let intent = vertical_intent(true, true, config.resting_height, &config);
        assert_eq!(intent.value, 1.0);
    }

    #[test]
    fn test_gravity_factor_grows_with_height() {
        let config = NavigationConfig::default();
        let low = vertical_intent(false, false, 2.5, &config);
        assert_eq!(low.source, IntentSource::Gravity);
        assert!((low.value + 0.25).abs() < 1e-6);

        let high = vertical_intent(false, false, 30.0, &config);
        assert_eq!(high.value, -1.0);

        assert_eq!(vertical_intent(false, false, 2.0, &config), VerticalIntent::IDLE);
    }

    #[test]
    fn test_gravity_disabled_is_idle() {
        let config = NavigationConfig {
            gravity_enabled: false,
            ..Default::default()
        };
        assert_eq!(vertical_intent(false, false, 8.0, &config), VerticalIntent::IDLE);
    }

    #[test]
    fn test_step_snaps_to_resting_height() {
        let config = NavigationConfig::default();
        let intent = vertical_intent(false, false, 2.05, &config);
        let step = plan_vertical_step(intent, 2.05, 0.1, config.frame_cap, &config).expect("step");
        assert_eq!(step.target_height, 2.0);
        assert!(!step.needs_check);
    }

    #[test]
    fn test_step_respects_frame_cap() {
        let config = NavigationConfig::default();
        let intent = vertical_intent(true, false, 2.0, &config);
        let step = plan_vertical_step(intent, 2.0, 1.0, config.frame_cap, &config).expect("step");
        assert!((step.delta - config.frame_cap).abs() < 1e-6);
        assert!(step.needs_check);
    }

    #[test]
    fn test_scaled_step_stays_above_rest() {
        let config = NavigationConfig::default();
        let intent = vertical_intent(false, false, 2.05, &config);
        let step = plan_vertical_step(intent, 2.05, 0.1, config.frame_cap, &config).expect("step");
        let half = step.scaled(0.5);
        assert!((half.delta - step.delta * 0.5).abs() < 1e-6);
        assert!((half.target_height - 2.025).abs() < 1e-5);
        assert_eq!(half.needs_check, step.needs_check);
    }

    #[test]
    fn test_manual_descent_stops_at_rest_with_gravity() {
        let config = NavigationConfig::default();
        let intent = vertical_intent(false, true, 2.0, &config);
        assert!(plan_vertical_step(intent, 2.0, 0.1, config.frame_cap, &config).is_none());

        let free = NavigationConfig {
            gravity_enabled: false,
            ..Default::default()
        };
        let step = plan_vertical_step(intent, 2.0, 0.1, free.frame_cap, &free).expect("step");
        assert!(step.delta < 0.0);
    }
}
