use anyhow::Result;
use bevy_math::Vec3;
use tracing::{debug, info, warn};

use crate::{
    camera::CameraRig,
    classify::CollisionSet,
    config::NavigationConfig,
    constants::PHYSICS_EPSILON,
    diagnostics::ThrottledLog,
    input::{InputState, KeyBindings, NavKey},
    oracle::CollisionOracle,
    slide::resolve_slide,
    vertical::{VerticalStep, plan_vertical_step, resolve_vertical_step, vertical_intent},
    view_guard::ViewGuard,
};

// ============================================================================
// Movement State
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MoveState {
    #[default]
    Idle,
    Moving,
    Blocked,
    Sliding,
}

// View-relative horizontal basis: forward flattened onto the ground plane,
// right = forward x up
fn view_basis(position: Vec3, target: Vec3) -> Option<(Vec3, Vec3)> {
    let look = target - position;
    let forward = Vec3::new(look.x, 0.0, look.z).try_normalize()?;
    Some((forward, forward.cross(Vec3::Y)))
}

// ============================================================================
// Walkthrough Controller
// ============================================================================

pub struct WalkthroughController<C: CameraRig> {
    camera: Option<C>,
    config: NavigationConfig,
    oracle: CollisionOracle,
    view_guard: ViewGuard,
    collision: CollisionSet,
    input: InputState,
    bindings: KeyBindings,
    state: MoveState,
    enabled: bool,
    operational: bool,
    blocked_log: ThrottledLog,
}

impl<C: CameraRig> WalkthroughController<C> {
    /// A controller built without a camera, or with an invalid configuration,
    /// stays permanently disabled: every call becomes a no-op.
    #[must_use]
    pub fn new(camera: Option<C>, config: NavigationConfig) -> Self {
        let mut operational = camera.is_some();
        if !operational {
            warn!("no camera supplied, navigation stays disabled");
        }
        if let Err(e) = config.validate() {
            warn!("invalid navigation config, navigation stays disabled: {e:#}");
            operational = false;
        }

        Self {
            camera,
            oracle: CollisionOracle::new(config.thresholds()),
            view_guard: ViewGuard::new(config.view_collision_distance, config.view_pullback),
            config,
            collision: CollisionSet::default(),
            input: InputState::default(),
            bindings: KeyBindings::default(),
            state: MoveState::Idle,
            enabled: false,
            operational,
            blocked_log: ThrottledLog::default(),
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn enable(&mut self) {
        if !self.operational || self.enabled {
            return;
        }
        self.enabled = true;
        info!("navigation enabled");
    }

    // Drops every held key so no stale intent survives a re-enable
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.input.clear();
        self.state = MoveState::Idle;
        info!("navigation disabled");
    }

    pub fn dispose(&mut self) {
        if !self.operational && self.camera.is_none() {
            return;
        }
        self.disable();
        self.camera = None;
        self.collision = CollisionSet::default();
        self.operational = false;
        debug!("navigation disposed");
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn is_operational(&self) -> bool {
        self.operational
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    #[must_use]
    pub const fn config(&self) -> &NavigationConfig {
        &self.config
    }

    // Applies from the next `update`; an invalid config keeps the current one
    pub fn set_config(&mut self, config: NavigationConfig) -> Result<()> {
        config.validate()?;
        self.oracle.set_thresholds(config.thresholds());
        self.view_guard = ViewGuard::new(config.view_collision_distance, config.view_pullback);
        self.config = config;
        Ok(())
    }

    pub fn set_move_speed(&mut self, speed: f32) -> Result<()> {
        self.set_config(NavigationConfig {
            move_speed: speed,
            ..self.config.clone()
        })
    }

    // Atomic swap of the classified proxy set
    pub fn set_collision_objects(&mut self, collision: CollisionSet) {
        debug!("collision set replaced ({} proxies)", collision.len());
        self.collision = collision;
    }

    #[must_use]
    pub const fn collision_objects(&self) -> &CollisionSet {
        &self.collision
    }

    #[must_use]
    pub const fn oracle(&self) -> &CollisionOracle {
        &self.oracle
    }

    // ========================================================================
    // Input
    // ========================================================================

    // Returns whether the code is bound and was applied
    pub fn handle_key(&mut self, code: &str, pressed: bool) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(key) = self.bindings.resolve(code) else {
            return false;
        };
        self.input.set(key, pressed);
        true
    }

    pub fn press(&mut self, key: NavKey) {
        if self.enabled {
            self.input.set(key, true);
        }
    }

    pub fn release(&mut self, key: NavKey) {
        if self.enabled {
            self.input.set(key, false);
        }
    }

    #[must_use]
    pub const fn input(&self) -> InputState {
        self.input
    }

    #[must_use]
    pub const fn state(&self) -> MoveState {
        self.state
    }

    // ========================================================================
    // Camera
    // ========================================================================

    #[must_use]
    pub const fn camera(&self) -> Option<&C> {
        self.camera.as_ref()
    }

    // For host-driven orbit rotation; follow up with `on_view_rotated`
    pub fn camera_mut(&mut self) -> Option<&mut C> {
        self.camera.as_mut()
    }

    /// Rotation hook: keep the look-at target out of walls, ceilings and
    /// stands. Returns whether the target was clamped.
    pub fn on_view_rotated(&mut self) -> bool {
        if !self.enabled || !self.config.view_collision_enabled {
            return false;
        }
        let Some(camera) = self.camera.as_mut() else {
            return false;
        };
        let position = camera.position();
        match self
            .view_guard
            .clamp_target(&self.oracle, &self.collision, position, camera.target())
        {
            Some(safe) => {
                camera.set_target(safe);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Frame Update
    // ========================================================================

    /// Advance one frame. Negative or non-finite `delta_secs` counts as zero.
    pub fn update(&mut self, delta_secs: f32) -> MoveState {
        let dt = if delta_secs.is_finite() { delta_secs.max(0.0) } else { 0.0 };
        if !self.enabled {
            return self.state;
        }
        let Some(position) = self.camera.as_ref().map(CameraRig::position) else {
            return self.state;
        };

        // Both axes are planned against the full frame cap, then shrunk by the
        // same factor so the combined displacement stays within it
        let horizontal = self.plan_horizontal(dt);
        let vertical = self.plan_vertical(position.y, dt);
        let length = horizontal.map_or(0.0, |(_, step)| step).hypot(vertical.map_or(0.0, |step| step.delta));
        let scale = if length > self.config.frame_cap {
            self.config.frame_cap / length
        } else {
            1.0
        };

        let state = horizontal.map_or(MoveState::Idle, |(direction, step)| {
            self.move_horizontal(position, direction, step * scale)
        });
        let climbed = vertical.is_some_and(|step| self.move_vertical(step.scaled(scale)));

        self.state = if state == MoveState::Idle && climbed {
            MoveState::Moving
        } else {
            state
        };
        self.state
    }

    // Unit move direction and capped step length from the held keys
    fn plan_horizontal(&self, dt: f32) -> Option<(Vec3, f32)> {
        let camera = self.camera.as_ref()?;
        let (forward, right) = view_basis(camera.position(), camera.target())?;

        let input = &self.input;
        let axis = |pos: bool, neg: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        let raw = forward * axis(input.forward, input.backward) + right * axis(input.right, input.left);
        let direction = raw.try_normalize()?;

        let step = (self.config.move_speed * dt).min(self.config.frame_cap);
        (step > PHYSICS_EPSILON).then_some((direction, step))
    }

    fn plan_vertical(&self, height: f32, dt: f32) -> Option<VerticalStep> {
        let config = &self.config;
        let intent = vertical_intent(self.input.ascend, self.input.descend, height, config);
        plan_vertical_step(intent, height, dt, config.frame_cap, config)
    }

    fn move_horizontal(&mut self, position: Vec3, direction: Vec3, step: f32) -> MoveState {
        let Some(camera) = self.camera.as_mut() else {
            return MoveState::Idle;
        };
        let config = &self.config;
        let delta = direction * step;

        if !config.collision_enabled {
            camera.translate(delta);
            return MoveState::Moving;
        }

        let obstruction = self
            .oracle
            .check_move(position, direction, &self.collision)
            .or_else(|| self.oracle.violation(position, position + delta, &self.collision));

        let Some(obstruction) = obstruction else {
            camera.translate(delta);
            return MoveState::Moving;
        };

        if let Some(count) = self.blocked_log.tick() {
            debug!(
                count,
                "move blocked by {:?} at {:.3} ({:?})",
                obstruction.cause,
                obstruction.distance,
                obstruction.flags.role()
            );
        }

        if !config.slide_enabled {
            return MoveState::Blocked;
        }

        let slide = resolve_slide(
            &self.oracle,
            &self.collision,
            position,
            direction,
            Some(&obstruction),
            step * config.slide_speed_factor,
        );
        if slide == Vec3::ZERO {
            return MoveState::Blocked;
        }
        camera.translate(slide);
        MoveState::Sliding
    }

    // Returns whether the height changed
    fn move_vertical(&mut self, step: VerticalStep) -> bool {
        let Some(camera) = self.camera.as_mut() else {
            return false;
        };
        let position = camera.position();

        let height = resolve_vertical_step(
            &self.oracle,
            &self.collision,
            position,
            &step,
            self.config.collision_enabled,
        );
        if height == position.y {
            return false;
        }

        let lift = height - position.y;
        let target = camera.target();
        camera.set_position(Vec3::new(position.x, height, position.z));
        camera.set_target(Vec3::new(target.x, target.y + lift, target.z));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::LookAtCamera,
        classify::{CollisionObject, ProxyKind, ProxyUsage, Role},
        geometry::Aabb,
        scene::ObjectId,
    };

    fn controller_at(position: Vec3, config: NavigationConfig) -> WalkthroughController<LookAtCamera> {
        let camera = LookAtCamera::new(position, position + Vec3::X);
        let mut controller = WalkthroughController::new(Some(camera), config);
        controller.enable();
        controller
    }

    fn flat_config() -> NavigationConfig {
        NavigationConfig {
            gravity_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_camera_is_permanently_disabled() {
        let mut controller = WalkthroughController::<LookAtCamera>::new(None, NavigationConfig::default());
        controller.enable();
        assert!(!controller.is_enabled());
        assert!(!controller.is_operational());
        assert_eq!(controller.update(0.1), MoveState::Idle);
    }

    #[test]
    fn test_invalid_config_is_permanently_disabled() {
        let config = NavigationConfig {
            frame_cap: -1.0,
            ..Default::default()
        };
        let mut controller = WalkthroughController::new(Some(LookAtCamera::new(Vec3::ZERO, Vec3::X)), config);
        controller.enable();
        assert!(!controller.is_enabled());
    }

    #[test]
    fn test_forward_moves_rigidly() {
        let mut controller = controller_at(Vec3::new(0.0, 2.0, 0.0), flat_config());
        controller.press(NavKey::Forward);
        assert_eq!(controller.update(0.01), MoveState::Moving);

        let camera = controller.camera().expect("camera");
        assert!((camera.position.x - 0.03).abs() < 1e-5);
        assert!((camera.target - camera.position - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_right_is_clockwise_from_forward() {
        let mut controller = controller_at(Vec3::ZERO, flat_config());
        controller.press(NavKey::Right);
        controller.update(0.01);
        let position = controller.camera().expect("camera").position;
        // Looking along +X, right is +Z
        assert!(position.z > 0.0);
        assert!(position.x.abs() < 1e-6);
    }

    #[test]
    fn test_bad_delta_is_zero() {
        let mut controller = controller_at(Vec3::ZERO, flat_config());
        controller.press(NavKey::Forward);
        assert_eq!(controller.update(f32::NAN), MoveState::Idle);
        assert_eq!(controller.update(-1.0), MoveState::Idle);
        assert_eq!(controller.camera().expect("camera").position, Vec3::ZERO);
    }

    #[test]
    fn test_disable_clears_input_and_ignores_keys() {
        let mut controller = controller_at(Vec3::ZERO, flat_config());
        assert!(controller.handle_key("KeyW", true));
        assert!(controller.input().forward);

        controller.disable();
        controller.disable();
        assert!(!controller.input().any());
        assert!(!controller.handle_key("KeyW", true));

        controller.enable();
        assert_eq!(controller.update(0.1), MoveState::Idle);
    }

    #[test]
    fn test_blocked_then_slide_along_wall() {
        let mut controller = controller_at(Vec3::new(0.4, 0.0, 0.0), flat_config());
        controller.set_collision_objects(CollisionSet::from_objects(vec![CollisionObject::new(
            ObjectId(0),
            "wall",
            Some(Role::Wall),
            ProxyKind::Body,
            ProxyUsage::BOTH,
            Aabb::new(Vec3::new(1.0, -100.0, -100.0), Vec3::new(1.2, 100.0, 100.0)),
        )]));
        controller.press(NavKey::Forward);
        assert_eq!(controller.update(0.01), MoveState::Sliding);

        // Slide runs at 0.7 of move speed, tangent to the wall, turning
        // clockwise from a head-on block
        let position = controller.camera().expect("camera").position;
        assert!((position.x - 0.4).abs() < 1e-5);
        assert!((position.z + 0.021).abs() < 1e-5);

        let mut config = flat_config();
        config.slide_enabled = false;
        controller.set_config(config).expect("valid config");
        assert_eq!(controller.update(0.1), MoveState::Blocked);
    }

    #[test]
    fn test_capped_slide_is_still_reduced() {
        let mut controller = controller_at(Vec3::new(0.4, 0.0, 0.0), flat_config());
        controller.set_collision_objects(CollisionSet::from_objects(vec![CollisionObject::new(
            ObjectId(0),
            "wall",
            Some(Role::Wall),
            ProxyKind::Body,
            ProxyUsage::BOTH,
            Aabb::new(Vec3::new(1.0, -100.0, -100.0), Vec3::new(1.2, 100.0, 100.0)),
        )]));
        controller.press(NavKey::Forward);

        // 3 u/s over 0.1 s hits the 0.1 frame cap; the slide takes 0.7 of that
        assert_eq!(controller.update(0.1), MoveState::Sliding);
        let moved = controller.camera().expect("camera").position - Vec3::new(0.4, 0.0, 0.0);
        assert!((moved.length() - 0.07).abs() < 1e-5, "slid {moved}");
    }

    #[test]
    fn test_gravity_works_while_walking_at_frame_cap() {
        let config = NavigationConfig::default();
        let mut controller = controller_at(Vec3::new(0.0, 5.0, 0.0), config.clone());
        controller.press(NavKey::Forward);

        let mut last = 5.0;
        for _ in 0..50 {
            assert_eq!(controller.update(0.1), MoveState::Moving);
            let position = controller.camera().expect("camera").position;
            assert!(position.y <= last);
            assert!(position.y >= config.resting_height);
            last = position.y;
        }
        let position = controller.camera().expect("camera").position;
        assert!(position.y < config.resting_height + 1e-3, "still hovering at {}", position.y);
        assert!(position.x > 3.0);
    }

    #[test]
    fn test_ascend_works_while_walking_at_frame_cap() {
        let mut controller = controller_at(Vec3::new(0.0, 5.0, 0.0), NavigationConfig::default());
        controller.press(NavKey::Forward);
        controller.press(NavKey::Ascend);
        for _ in 0..10 {
            let before = controller.camera().expect("camera").position;
            controller.update(0.1);
            let after = controller.camera().expect("camera").position;
            assert!(after.y > before.y);
            assert!(after.distance(before) <= 0.1 + 1e-5);
        }
    }

    #[test]
    fn test_set_move_speed_validates() {
        let mut controller = controller_at(Vec3::ZERO, flat_config());
        assert!(controller.set_move_speed(-2.0).is_err());
        assert!(controller.set_move_speed(1.0).is_ok());
        assert_eq!(controller.config().move_speed, 1.0);
    }

    #[test]
    fn test_view_guard_on_rotation() {
        let mut controller = controller_at(Vec3::ZERO, flat_config());
        controller.set_collision_objects(CollisionSet::from_objects(vec![CollisionObject::new(
            ObjectId(0),
            "wall",
            Some(Role::Wall),
            ProxyKind::View,
            ProxyUsage::VIEW,
            Aabb::new(Vec3::new(-5.0, -5.0, 0.1), Vec3::new(5.0, 5.0, 0.3)),
        )]));

        if let Some(camera) = controller.camera_mut() {
            camera.set_target(Vec3::Z);
        }
        assert!(controller.on_view_rotated());
        let target = controller.camera().expect("camera").target;
        assert!(target.z > 0.0 && target.z < 0.1);
    }

    #[test]
    fn test_dispose_is_repeatable() {
        let mut controller = controller_at(Vec3::ZERO, flat_config());
        controller.dispose();
        controller.dispose();
        assert!(controller.camera().is_none());
        controller.enable();
        assert!(!controller.is_enabled());
    }
}
