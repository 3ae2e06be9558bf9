pub mod camera;
pub mod config;
pub mod constants;
pub mod hall;
pub mod resources;
pub mod scene;
pub mod script;
pub mod systems;

use std::time::Duration;

use bevy_ecs::prelude::*;
use bevy_time::Time;
use navigation::{SceneClassifier, StaticScene, WalkthroughController};

use crate::{
    camera::SimCamera,
    resources::{Navigation, SceneState, ScriptPlayer, WalkStats, Wanderer},
    script::InputScript,
    systems::*,
};

// ============================================================================
// Input Source
// ============================================================================

pub enum InputSource {
    Script(InputScript),
    Wander { seed: u64 },
    None,
}

// ============================================================================
// Walker
// ============================================================================

/// Headless host: an ECS world holding the controller, the scene and the
/// input source, advanced one frame per `step`.
pub struct Walker {
    world: World,
    schedule: Schedule,
}

impl Walker {
    #[must_use]
    pub fn new(
        scene: StaticScene,
        classifier: SceneClassifier,
        controller: WalkthroughController<SimCamera>,
        input: InputSource,
    ) -> Self {
        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        world.insert_resource(Navigation(controller));
        world.insert_resource(SceneState::new(scene, classifier));
        world.insert_resource(WalkStats::default());
        match input {
            InputSource::Script(script) => world.insert_resource(ScriptPlayer::new(script)),
            InputSource::Wander { seed } => world.insert_resource(Wanderer::new(seed)),
            InputSource::None => {}
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                // Input first, then any reclassification it triggered, then
                // the frame itself
                script_system,
                wander_system,
                scene_reclassify_system,
                navigation_update_system,
                status_report_system,
            )
                .chain(),
        );

        Self { world, schedule }
    }

    pub fn step(&mut self, delta: Duration) {
        self.world.resource_mut::<Time>().advance_by(delta);
        self.schedule.run(&mut self.world);
    }

    #[must_use]
    pub fn controller(&self) -> &WalkthroughController<SimCamera> {
        &self.world.resource::<Navigation>().0
    }

    pub fn controller_mut(&mut self) -> &mut WalkthroughController<SimCamera> {
        &mut self.world.resource_mut::<Navigation>().into_inner().0
    }

    #[must_use]
    pub fn stats(&self) -> &WalkStats {
        self.world.resource::<WalkStats>()
    }

    #[must_use]
    pub fn scene(&self) -> &SceneState {
        self.world.resource::<SceneState>()
    }

    #[must_use]
    pub fn script_finished(&self) -> bool {
        self.world
            .get_resource::<ScriptPlayer>()
            .is_none_or(|player| player.script.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hall::demo_gallery;
    use bevy_math::Vec3;
    use navigation::{CameraRig, NavigationConfig};

    const FRAME: Duration = Duration::from_millis(16);

    fn walker(input: InputSource) -> Walker {
        let camera = SimCamera::new(Vec3::new(0.0, 2.0, 6.0), 0.0, 0.0);
        let mut controller = WalkthroughController::new(Some(camera), NavigationConfig::gallery());
        controller.enable();
        Walker::new(demo_gallery(), SceneClassifier::default(), controller, input)
    }

    fn position(walker: &Walker) -> Vec3 {
        walker.controller().camera().map(CameraRig::position).unwrap_or(Vec3::NAN)
    }

    #[test]
    fn test_first_frame_classifies_scene() {
        let mut walker = walker(InputSource::None);
        assert!(walker.controller().collision_objects().is_empty());
        walker.step(FRAME);
        assert!(!walker.controller().collision_objects().is_empty());
        assert!(!walker.scene().dirty);
        assert_eq!(walker.stats().frames, 1);
    }

    #[test]
    fn test_scripted_walk_stops_at_north_wall() {
        let script = InputScript::parse(r#"[ { "at": 0.0, "action": "key_down", "code": "KeyW" } ]"#).expect("script");
        let mut walker = walker(InputSource::Script(script));
        for _ in 0..2000 {
            walker.step(FRAME);
        }
        // Wall inner face at z = -10, body proxy thickened by 0.1, gallery distance 0.8
        let z = position(&walker).z;
        assert!(z >= -10.0 + 0.1 + 0.8 - 1e-3, "walked into the wall: {z}");
        assert!(z < -8.0);
        assert!(walker.script_finished());
    }

    #[test]
    fn test_spawned_stand_joins_collision_set() {
        let script = InputScript::parse(
            r#"[ { "at": 0.05, "action": "spawn_stand",
                   "stand": { "shape": "box", "position": [0.0, 0.1, 3.0], "size": [1.0, 0.2, 1.0] } } ]"#,
        )
        .expect("script");
        let mut walker = walker(InputSource::Script(script));
        walker.step(FRAME);
        let before = walker.controller().collision_objects().len();
        for _ in 0..5 {
            walker.step(FRAME);
        }
        // Precise plus tall proxy for the new flat stand
        assert_eq!(walker.controller().collision_objects().len(), before + 2);
    }

    #[test]
    fn test_disable_action_stops_motion() {
        let script = InputScript::parse(
            r#"[ { "at": 0.0, "action": "key_down", "code": "KeyW" },
                 { "at": 0.1, "action": "disable" } ]"#,
        )
        .expect("script");
        let mut walker = walker(InputSource::Script(script));
        for _ in 0..10 {
            walker.step(FRAME);
        }
        let stopped = position(&walker);
        for _ in 0..30 {
            walker.step(FRAME);
        }
        assert_eq!(position(&walker), stopped);
        assert!(!walker.controller().is_enabled());
    }

    #[test]
    fn test_wander_stays_inside_hall() {
        let mut walker = walker(InputSource::Wander { seed: 5 });
        for _ in 0..3000 {
            walker.step(FRAME);
            let p = position(&walker);
            assert!(p.x.abs() < 10.0 && p.z.abs() < 10.0, "left the hall at {p}");
            assert!(p.y > 0.0 && p.y < 4.5);
        }
        assert!(walker.stats().moving > 0);
    }
}
