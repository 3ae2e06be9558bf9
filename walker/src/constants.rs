// ============================================================================
// Walker Constants
// ============================================================================

// Frame loop
pub const DEFAULT_FRAME_FREQUENCY: u64 = 60; // Hz
pub const DEFAULT_DURATION: f32 = 30.0; // seconds of simulated walk

// Default log filter, overridden by RUST_LOG
pub const LOG_FILTER: &str = "info,navigation=info,walker=info";

// Status report interval (seconds)
pub const STATUS_REPORT_INTERVAL: f32 = 1.0;

// Camera
pub const LOOK_DISTANCE: f32 = 1.0; // Distance from eye to look-at target
pub const MAX_PITCH_DEGREES: f32 = 85.0;
pub const START_POSITION: [f32; 3] = [0.0, 2.0, 6.0];

// Random wander
pub const WANDER_INTERVAL: f32 = 0.75; // seconds between input changes
pub const WANDER_MAX_TURN_DEGREES: f32 = 60.0;
pub const WANDER_FORWARD_PROBABILITY: f64 = 0.7;
pub const WANDER_STRAFE_PROBABILITY: f64 = 0.2;
pub const WANDER_VERTICAL_PROBABILITY: f64 = 0.05;
