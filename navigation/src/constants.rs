// ============================================================================
// Floating-Point Comparisons
// ============================================================================

// Small value for floating-point comparisons (near-zero checks, division guards).
pub const PHYSICS_EPSILON: f32 = 1e-6;

// ============================================================================
// Avatar Motion
// ============================================================================

// Speeds (units per second)
pub const MOVE_SPEED: f32 = 3.0;
pub const GRAVITY_STRENGTH: f32 = 10.0;

pub const FRAME_CAP: f32 = 0.1; // Hard per-frame displacement limit (units)
pub const SLIDE_SPEED_FACTOR: f32 = 0.7; // Fraction of move speed used while sliding
pub const PLAYER_RADIUS: f32 = 0.4;

// Height the avatar settles to when no vertical input is held
pub const RESTING_HEIGHT: f32 = 2.0;

// Vertical intent magnitude above which vertical casts are issued
pub const VERTICAL_CHECK_THRESHOLD: f32 = 0.5;

// Passive gravity factor = min(1, GRAVITY_BASE_FACTOR + height_diff / GRAVITY_HEIGHT_SCALE)
pub const GRAVITY_BASE_FACTOR: f32 = 0.2;
pub const GRAVITY_HEIGHT_SCALE: f32 = 10.0;

// ============================================================================
// Collision Thresholds
// ============================================================================

pub const COLLISION_DISTANCE: f32 = 0.6;
pub const STAND_COLLISION_DISTANCE: f32 = 0.6;
pub const DOWNWARD_STAND_FACTOR: f32 = 1.5; // Enlarged stand threshold for downward casts
pub const FAR_EXHIBIT_DISTANCE: f32 = 5.0; // Stand thresholds decay beyond this distance
pub const MIN_FAR_EXHIBIT_DISTANCE: f32 = 0.2; // Floor of the decayed stand threshold
pub const ULTRA_FAR_DISTANCE: f32 = 15.0; // Stands beyond this never block

// A cast counts as downward once its Y component drops below this
pub const DOWNWARD_DIRECTION_Y: f32 = -0.5;

// Canted downward probes: Y component, and lateral spread as a ratio of player radius
pub const DOWNWARD_CANT_Y: f32 = -0.95;
pub const DOWNWARD_CANT_RADIUS_RATIO: f32 = 0.75;

// ============================================================================
// View Guard
// ============================================================================

pub const VIEW_COLLISION_DISTANCE: f32 = 0.3;
pub const VIEW_PULLBACK: f32 = 0.1; // Safe target sits this far short of the hit

// ============================================================================
// Proxy Construction
// ============================================================================

// Stands
pub const FLAT_STAND_HEIGHT: f32 = 0.5; // Stands lower than this get a tall proxy
pub const TALL_PROXY_HEIGHT: f32 = 1.0;
pub const TALL_PROXY_SPREAD: f32 = 1.1; // Footprint scale of the tall proxy
pub const STAND_PROXY_SCALE_XZ: f32 = 1.05;
pub const STAND_PROXY_SCALE_Y: f32 = 1.1;

// Walls
pub const WALL_THICKENING: f32 = 0.2; // Added to both horizontal extents of wall proxies

// View proxies for large walls and ceilings
pub const VIEW_PROXY_MIN_SPAN: f32 = 1.0;
pub const VIEW_PROXY_SHRINK: f32 = 0.98;
pub const VIEW_PROXY_MIN_SIZE: f32 = 0.1;

// ============================================================================
// Diagnostics
// ============================================================================

// Hot-path diagnostics log the first occurrence, then every Nth
pub const DIAGNOSTIC_LOG_EVERY: u64 = 300;
