use std::{path::PathBuf, time::Duration};

use bevy_math::Vec3;
use navigation::{CameraRig, NavigationConfig, SceneClassifier, WalkthroughController};
use walker::{InputSource, Walker, camera::SimCamera, scene::SceneFile, script::InputScript};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../demos").join(name)
}

#[test]
fn test_corridor_walk_replays_to_completion() {
    let scene = SceneFile::load(&demo("corridor.json")).expect("scene").into_scene();
    let script = InputScript::load(&demo("walk.json")).expect("script");
    let config = NavigationConfig::load(demo("gallery_nav.json")).expect("config");
    assert_eq!(config, NavigationConfig::gallery());

    let camera = SimCamera::new(Vec3::new(0.0, 2.0, 12.0), 0.0, 0.0);
    let mut controller = WalkthroughController::new(Some(camera), config);
    controller.enable();
    let mut walker = Walker::new(scene, SceneClassifier::default(), controller, InputSource::Script(script));

    let frame = Duration::from_millis(20);
    for _ in 0..1000 {
        walker.step(frame);
        let p = walker.controller().camera().map(CameraRig::position).unwrap_or(Vec3::NAN);
        assert!(p.is_finite());
        assert!(p.x.abs() < 3.0 - 0.8 + 1e-3, "too close to a side wall at {p}");
        assert!(p.z > -15.0 + 0.8 - 1e-3, "too close to the end wall at {p}");
        assert!(p.y >= 2.0 && p.y < 4.0);
    }

    assert!(walker.script_finished());
    assert!(walker.controller().is_enabled());
    assert!(walker.stats().moving > 0);
}
