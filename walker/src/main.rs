use std::path::PathBuf;

use anyhow::{Result, ensure};
use bevy_math::Vec3;
use clap::Parser;
use navigation::{CameraRig, SceneClassifier, WalkthroughController};
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{info, warn};

use walker::{
    InputSource, Walker,
    camera::SimCamera,
    config::{init_tracing, load_classifier_config, load_navigation_config},
    constants::{DEFAULT_DURATION, DEFAULT_FRAME_FREQUENCY, LOG_FILTER, START_POSITION},
    hall::demo_gallery,
    scene::SceneFile,
    script::InputScript,
};

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "Headless walkthrough driver", long_about = None)]
struct Args {
    // Scene description (JSON); the built-in gallery is used when omitted
    #[arg(long)]
    scene: Option<PathBuf>,

    // Navigation tunables (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    // Classifier role table and proxy constants (JSON)
    #[arg(long)]
    classifier: Option<PathBuf>,

    // Timed input script (JSON); random wander when omitted
    #[arg(long)]
    script: Option<PathBuf>,

    // Use the wider gallery margins when no config file is given
    #[arg(long, default_value_t = false)]
    gallery_tuning: bool,

    // Frame rate in Hz
    #[arg(short, long, default_value_t = DEFAULT_FRAME_FREQUENCY)]
    frequency: u64,

    // Simulated seconds to run
    #[arg(short, long, default_value_t = DEFAULT_DURATION)]
    duration: f32,

    // Pace frames in real time instead of running back to back
    #[arg(long, default_value_t = false)]
    realtime: bool,

    // Seed for random wander
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(LOG_FILTER);
    let args = Args::parse();
    ensure!(args.frequency > 0, "frequency must be positive");
    ensure!(
        args.duration.is_finite() && args.duration >= 0.0,
        "duration must be finite and non-negative"
    );

    let scene = match &args.scene {
        Some(path) => SceneFile::load(path)?.into_scene(),
        None => demo_gallery(),
    };
    info!("scene has {} objects", scene.len());

    let config = load_navigation_config(args.config.as_deref(), args.gallery_tuning)?;
    let classifier = SceneClassifier::new(load_classifier_config(args.classifier.as_deref())?);

    let input = match &args.script {
        Some(path) => {
            let script = InputScript::load(path)?;
            info!("replaying {} scripted actions", script.len());
            InputSource::Script(script)
        }
        None => InputSource::Wander { seed: args.seed },
    };

    let camera = SimCamera::new(Vec3::from_array(START_POSITION), 0.0, 0.0);
    let mut controller = WalkthroughController::new(Some(camera), config);
    controller.enable();

    let mut walker = Walker::new(scene, classifier, controller, input);

    let tick_duration = Duration::from_nanos(1_000_000_000 / args.frequency);
    let frames = (f64::from(args.duration) * args.frequency as f64).ceil() as u64;
    info!(
        "walking {} frames at {} Hz ({})",
        frames,
        args.frequency,
        if args.realtime { "real time" } else { "fast" }
    );

    if args.realtime {
        let mut interval = time::interval(tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        for frame in 0..frames {
            interval.tick().await;

            let update_start = Instant::now();
            walker.step(tick_duration);
            let update_elapsed = update_start.elapsed();

            if update_elapsed > tick_duration {
                warn!(
                    "frame {} took {:.2}ms (exceeded {:.2}ms budget)",
                    frame,
                    update_elapsed.as_secs_f64() * 1000.0,
                    tick_duration.as_secs_f64() * 1000.0
                );
            }
        }
    } else {
        for _ in 0..frames {
            walker.step(tick_duration);
        }
    }

    let stats = walker.stats();
    let position = walker.controller().camera().map(CameraRig::position).unwrap_or_default();
    info!(
        "done: final position ({:.2}, {:.2}, {:.2}), {} frames, {} moving, {} sliding, {} blocked, {} view clamps",
        position.x, position.y, position.z, stats.frames, stats.moving, stats.sliding, stats.blocked, stats.view_clamps
    );
    if !walker.script_finished() {
        warn!("script still had pending actions when the walk ended");
    }

    Ok(())
}
