use bevy_ecs::prelude::*;
use bevy_time::Time;
use navigation::{CameraRig, MoveState, NavKey, WalkthroughController};
use rand::Rng;
use tracing::{debug, info};

use crate::{
    camera::SimCamera,
    constants::{
        WANDER_FORWARD_PROBABILITY, WANDER_MAX_TURN_DEGREES, WANDER_STRAFE_PROBABILITY, WANDER_VERTICAL_PROBABILITY,
    },
    resources::{Navigation, SceneState, ScriptPlayer, WalkStats, Wanderer},
    script::Action,
};

// ============================================================================
// Input Systems
// ============================================================================

// Turn the simulated camera and run the view guard on the new orientation
fn look(nav: &mut WalkthroughController<SimCamera>, stats: &mut WalkStats, yaw: f32, pitch: f32) {
    if let Some(camera) = nav.camera_mut() {
        camera.look(yaw, pitch);
    }
    if nav.on_view_rotated() {
        stats.view_clamps += 1;
    }
}

pub fn apply_action(
    action: &Action,
    nav: &mut WalkthroughController<SimCamera>,
    scene: &mut SceneState,
    stats: &mut WalkStats,
) {
    match action {
        Action::KeyDown { code } => {
            if !nav.handle_key(code, true) {
                debug!("ignored key down {code}");
            }
        }
        Action::KeyUp { code } => {
            if !nav.handle_key(code, false) {
                debug!("ignored key up {code}");
            }
        }
        Action::Look { yaw, pitch } => look(nav, stats, yaw.to_radians(), pitch.to_radians()),
        Action::Enable => nav.enable(),
        Action::Disable => nav.disable(),
        Action::SpawnStand { stand } => {
            let id = scene.scene.next_id();
            let object = stand.build(id);
            info!("spawning {} ({:?}) at {}", object.name, id, object.world_bounds().center());
            scene.scene.insert(object);
            scene.dirty = true;
        }
    }
}

// Replay scripted actions that became due this frame
pub fn script_system(
    time: Res<Time>,
    player: Option<ResMut<ScriptPlayer>>,
    mut nav: ResMut<Navigation>,
    mut scene: ResMut<SceneState>,
    mut stats: ResMut<WalkStats>,
) {
    let Some(mut player) = player else {
        return;
    };
    player.elapsed += time.delta_secs();
    let elapsed = player.elapsed;
    for action in player.script.due(elapsed) {
        apply_action(&action, &mut nav.0, &mut scene, &mut stats);
    }
}

// Random walk: every interval pick new held keys and turn a bit
pub fn wander_system(
    time: Res<Time>,
    wanderer: Option<ResMut<Wanderer>>,
    mut nav: ResMut<Navigation>,
    mut stats: ResMut<WalkStats>,
) {
    let Some(mut wanderer) = wanderer else {
        return;
    };
    wanderer.timer.tick(time.delta());
    if !wanderer.timer.just_finished() {
        return;
    }

    let rng = &mut wanderer.rng;
    let nav = &mut nav.0;
    let set = |nav: &mut WalkthroughController<SimCamera>, key, held| {
        if held {
            nav.press(key);
        } else {
            nav.release(key);
        }
    };

    set(nav, NavKey::Forward, rng.random_bool(WANDER_FORWARD_PROBABILITY));
    let strafe = rng.random_bool(WANDER_STRAFE_PROBABILITY);
    let left = rng.random_bool(0.5);
    set(nav, NavKey::Left, strafe && left);
    set(nav, NavKey::Right, strafe && !left);
    let vertical = rng.random_bool(WANDER_VERTICAL_PROBABILITY);
    let up = rng.random_bool(0.5);
    set(nav, NavKey::Ascend, vertical && up);
    set(nav, NavKey::Descend, vertical && !up);

    // Turn harder after running into something
    let max_turn = if nav.state() == MoveState::Blocked {
        WANDER_MAX_TURN_DEGREES * 2.0
    } else {
        WANDER_MAX_TURN_DEGREES
    };
    let yaw = rng.random_range(-max_turn..=max_turn).to_radians();
    look(nav, &mut stats, yaw, 0.0);
}

// ============================================================================
// Navigation Systems
// ============================================================================

// Rebuild the collision set between frames when scene content changed
pub fn scene_reclassify_system(mut scene: ResMut<SceneState>, mut nav: ResMut<Navigation>) {
    if !scene.dirty {
        return;
    }
    let state = &mut *scene;
    let set = state.classifier.classify(&state.scene);
    nav.0.set_collision_objects(set);
    state.dirty = false;
}

pub fn navigation_update_system(time: Res<Time>, mut nav: ResMut<Navigation>, mut stats: ResMut<WalkStats>) {
    let state = nav.0.update(time.delta_secs());
    stats.frames += 1;
    match state {
        MoveState::Idle => {}
        MoveState::Moving => stats.moving += 1,
        MoveState::Blocked => stats.blocked += 1,
        MoveState::Sliding => stats.sliding += 1,
    }
}

pub fn status_report_system(time: Res<Time>, nav: Res<Navigation>, mut stats: ResMut<WalkStats>) {
    stats.timer.tick(time.delta());
    if !stats.timer.just_finished() {
        return;
    }
    let Some(camera) = nav.0.camera() else {
        return;
    };
    let position = camera.position();
    info!(
        "pos ({:.2}, {:.2}, {:.2}) state {:?} enabled {} | frames {} moving {} sliding {} blocked {} view clamps {}",
        position.x,
        position.y,
        position.z,
        nav.0.state(),
        nav.0.is_enabled(),
        stats.frames,
        stats.moving,
        stats.sliding,
        stats.blocked,
        stats.view_clamps
    );
}
