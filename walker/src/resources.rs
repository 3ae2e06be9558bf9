use bevy_ecs::prelude::*;
use bevy_time::{Timer, TimerMode};
use navigation::{SceneClassifier, StaticScene, WalkthroughController};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    camera::SimCamera,
    constants::{STATUS_REPORT_INTERVAL, WANDER_INTERVAL},
    script::InputScript,
};

// ============================================================================
// Walker Resources
// ============================================================================

// The navigation controller driving the simulated camera
#[derive(Resource)]
pub struct Navigation(pub WalkthroughController<SimCamera>);

// Static scene plus its classifier; `dirty` requests a reclassification
// before the next navigation update
#[derive(Resource)]
pub struct SceneState {
    pub scene: StaticScene,
    pub classifier: SceneClassifier,
    pub dirty: bool,
}

impl SceneState {
    #[must_use]
    pub const fn new(scene: StaticScene, classifier: SceneClassifier) -> Self {
        Self {
            scene,
            classifier,
            dirty: true,
        }
    }
}

// Scripted input, replayed against simulated time
#[derive(Resource)]
pub struct ScriptPlayer {
    pub script: InputScript,
    pub elapsed: f32,
}

impl ScriptPlayer {
    #[must_use]
    pub const fn new(script: InputScript) -> Self {
        Self { script, elapsed: 0.0 }
    }
}

// Random wander input when no script is given
#[derive(Resource)]
pub struct Wanderer {
    pub rng: StdRng,
    pub timer: Timer,
}

impl Wanderer {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            timer: Timer::from_seconds(WANDER_INTERVAL, TimerMode::Repeating),
        }
    }
}

// Per-state frame counters and the periodic report timer
#[derive(Resource)]
pub struct WalkStats {
    pub timer: Timer,
    pub frames: u64,
    pub moving: u64,
    pub blocked: u64,
    pub sliding: u64,
    pub view_clamps: u64,
}

impl Default for WalkStats {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(STATUS_REPORT_INTERVAL, TimerMode::Repeating),
            frames: 0,
            moving: 0,
            blocked: 0,
            sliding: 0,
            view_clamps: 0,
        }
    }
}
