#[cfg(feature = "json")]
use anyhow::Context;
use anyhow::{Result, ensure};
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::{classify::Role, constants::*};

// ============================================================================
// Navigation Configuration
// ============================================================================

/// Flat configuration surface of the controller. Changes take effect on the
/// next `update`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct NavigationConfig {
    // Motion
    pub move_speed: f32,
    pub frame_cap: f32,
    pub slide_speed_factor: f32,
    pub player_radius: f32,

    // Feature switches
    pub collision_enabled: bool,
    pub slide_enabled: bool,
    pub view_collision_enabled: bool,

    // Collision thresholds
    pub collision_distance: f32,
    pub stand_collision_distance: f32,
    pub downward_stand_factor: f32,
    pub far_exhibit_distance: f32,
    pub min_far_exhibit_distance: f32,
    pub ultra_far_distance: f32,

    // View guard
    pub view_collision_distance: f32,
    pub view_pullback: f32,

    // Vertical motion
    pub gravity_enabled: bool,
    pub gravity_strength: f32,
    pub resting_height: f32,
    pub vertical_check_threshold: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            frame_cap: FRAME_CAP,
            slide_speed_factor: SLIDE_SPEED_FACTOR,
            player_radius: PLAYER_RADIUS,

            collision_enabled: true,
            slide_enabled: true,
            view_collision_enabled: true,

            collision_distance: COLLISION_DISTANCE,
            stand_collision_distance: STAND_COLLISION_DISTANCE,
            downward_stand_factor: DOWNWARD_STAND_FACTOR,
            far_exhibit_distance: FAR_EXHIBIT_DISTANCE,
            min_far_exhibit_distance: MIN_FAR_EXHIBIT_DISTANCE,
            ultra_far_distance: ULTRA_FAR_DISTANCE,

            view_collision_distance: VIEW_COLLISION_DISTANCE,
            view_pullback: VIEW_PULLBACK,

            gravity_enabled: true,
            gravity_strength: GRAVITY_STRENGTH,
            resting_height: RESTING_HEIGHT,
            vertical_check_threshold: VERTICAL_CHECK_THRESHOLD,
        }
    }
}

impl NavigationConfig {
    /// Wider margins for halls with dense exhibits.
    #[must_use]
    pub fn gallery() -> Self {
        Self {
            collision_distance: 0.8,
            stand_collision_distance: 0.8,
            view_collision_distance: 0.5,
            player_radius: 0.45,
            ..Default::default()
        }
    }

    // Thresholds consumed by the collision oracle
    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        Thresholds {
            collision_distance: self.collision_distance,
            stand_distance: self.stand_collision_distance,
            downward_stand_factor: self.downward_stand_factor,
            far_exhibit_distance: self.far_exhibit_distance,
            min_far_exhibit_distance: self.min_far_exhibit_distance,
            ultra_far_distance: self.ultra_far_distance,
            downward_cant: self.player_radius * DOWNWARD_CANT_RADIUS_RATIO,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("move_speed", self.move_speed),
            ("frame_cap", self.frame_cap),
            ("slide_speed_factor", self.slide_speed_factor),
            ("player_radius", self.player_radius),
            ("collision_distance", self.collision_distance),
            ("stand_collision_distance", self.stand_collision_distance),
            ("downward_stand_factor", self.downward_stand_factor),
            ("far_exhibit_distance", self.far_exhibit_distance),
            ("min_far_exhibit_distance", self.min_far_exhibit_distance),
            ("ultra_far_distance", self.ultra_far_distance),
            ("view_collision_distance", self.view_collision_distance),
            ("view_pullback", self.view_pullback),
            ("gravity_strength", self.gravity_strength),
            ("vertical_check_threshold", self.vertical_check_threshold),
        ];
        for (name, value) in non_negative {
            ensure!(value.is_finite() && value >= 0.0, "{name} must be finite and non-negative, got {value}");
        }
        ensure!(self.resting_height.is_finite(), "resting_height must be finite");
        ensure!(self.frame_cap > 0.0, "frame_cap must be positive");
        ensure!(
            self.far_exhibit_distance <= self.ultra_far_distance,
            "far_exhibit_distance ({}) must not exceed ultra_far_distance ({})",
            self.far_exhibit_distance,
            self.ultra_far_distance
        );
        Ok(())
    }

    #[cfg(feature = "json")]
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("Failed to parse navigation config")?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "json")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid navigation config in {}", path.display()))
    }
}

/// Per-classification cast distances below which a move is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub collision_distance: f32,
    pub stand_distance: f32,
    pub downward_stand_factor: f32,
    pub far_exhibit_distance: f32,
    pub min_far_exhibit_distance: f32,
    pub ultra_far_distance: f32,
    pub downward_cant: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        NavigationConfig::default().thresholds()
    }
}

impl Thresholds {
    // Stand threshold at a given distance: `base` up to the far distance, then
    // quadratic decay floored at the configured minimum.
    #[must_use]
    pub fn stand_threshold(&self, distance: f32, base: f32) -> f32 {
        if distance > self.far_exhibit_distance && distance > 0.0 {
            let ratio = self.far_exhibit_distance / distance;
            (base * ratio * ratio).max(self.min_far_exhibit_distance)
        } else {
            base
        }
    }

    #[must_use]
    pub fn downward_stand_distance(&self) -> f32 {
        self.stand_distance * self.downward_stand_factor
    }

    #[must_use]
    pub fn is_ultra_far(&self, distance: f32) -> bool {
        distance > self.ultra_far_distance
    }
}

// ============================================================================
// Classifier Configuration
// ============================================================================

// One entry of the ordered role table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct RoleKeywords {
    pub role: Role,
    pub keywords: Vec<String>,
}

impl RoleKeywords {
    #[must_use]
    pub fn new(role: Role, keywords: &[&str]) -> Self {
        Self {
            role,
            keywords: keywords.iter().map(|k| (*k).to_lowercase()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct ClassifierConfig {
    // First matching entry wins
    pub roles: Vec<RoleKeywords>,
    pub include_unclassified: bool,

    pub flat_stand_height: f32,
    pub tall_proxy_height: f32,
    pub tall_proxy_spread: f32,
    pub stand_scale_xz: f32,
    pub stand_scale_y: f32,

    pub wall_thickening: f32,

    pub view_proxy_min_span: f32,
    pub view_proxy_shrink: f32,
    pub view_proxy_min_size: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            roles: vec![
                RoleKeywords::new(
                    Role::ExhibitStand,
                    &[
                        "dizuo", "zhuotai", "zhantai", "table", "desk", "stand", "platform", "exhibit", "display",
                        "booth", "showcase", "pedestal", "zhuo", "tai",
                    ],
                ),
                RoleKeywords::new(Role::Ceiling, &["ceiling", "roof", "ding"]),
                RoleKeywords::new(Role::Wall, &["wall", "qiang", "men", "door"]),
                RoleKeywords::new(Role::Floor, &["floor", "ground", "dimian", "di"]),
            ],
            include_unclassified: true,

            flat_stand_height: FLAT_STAND_HEIGHT,
            tall_proxy_height: TALL_PROXY_HEIGHT,
            tall_proxy_spread: TALL_PROXY_SPREAD,
            stand_scale_xz: STAND_PROXY_SCALE_XZ,
            stand_scale_y: STAND_PROXY_SCALE_Y,

            wall_thickening: WALL_THICKENING,

            view_proxy_min_span: VIEW_PROXY_MIN_SPAN,
            view_proxy_shrink: VIEW_PROXY_SHRINK,
            view_proxy_min_size: VIEW_PROXY_MIN_SIZE,
        }
    }
}

impl ClassifierConfig {
    #[cfg(feature = "json")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid classifier config in {}", path.display()))
    }
}
