use std::path::Path;

use anyhow::{Context, Result, ensure};
use bevy_math::Vec3;
use navigation::{BoxStand, CylinderStand, ObjectId, SceneObject};
use serde::{Deserialize, Serialize};

// ============================================================================
// Script Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum StandSpec {
    Box {
        position: Vec3,
        size: Vec3,
        #[serde(default)]
        yaw_degrees: f32,
    },
    Cylinder {
        position: Vec3,
        radius: f32,
        height: f32,
    },
}

impl StandSpec {
    #[must_use]
    pub fn build(&self, id: ObjectId) -> SceneObject {
        match *self {
            Self::Box {
                position,
                size,
                yaw_degrees,
            } => BoxStand {
                position,
                size,
                yaw: yaw_degrees.to_radians(),
                ..BoxStand::default()
            }
            .build(id),
            Self::Cylinder {
                position,
                radius,
                height,
            } => CylinderStand {
                position,
                radius,
                height,
                ..CylinderStand::default()
            }
            .build(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    KeyDown { code: String },
    KeyUp { code: String },
    Look { yaw: f32, pitch: f32 }, // degrees
    Enable,
    Disable,
    SpawnStand { stand: StandSpec },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub at: f32,
    #[serde(flatten)]
    pub action: Action,
}

// ============================================================================
// Input Script
// ============================================================================

// Actions stamped with the simulated time (seconds) at which they fire, e.g.
// `{ "at": 1.5, "action": "key_down", "code": "KeyW" }`
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    events: Vec<ScriptEvent>,
    cursor: usize,
}

impl InputScript {
    // Events are replayed in time order; ties keep file order
    pub fn new(mut events: Vec<ScriptEvent>) -> Result<Self> {
        for event in &events {
            ensure!(
                event.at.is_finite() && event.at >= 0.0,
                "script event time must be finite and non-negative, got {}",
                event.at
            );
        }
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(Self { events, cursor: 0 })
    }

    pub fn parse(text: &str) -> Result<Self> {
        let events: Vec<ScriptEvent> = serde_json::from_str(text).context("Failed to parse input script")?;
        Self::new(events)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid input script {}", path.display()))
    }

    /// Actions that became due up to `elapsed` seconds, each returned once.
    pub fn due(&mut self, elapsed: f32) -> Vec<Action> {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].at <= elapsed {
            self.cursor += 1;
        }
        self.events[start..self.cursor].iter().map(|e| e.action.clone()).collect()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        { "at": 2.0, "action": "key_up", "code": "KeyW" },
        { "at": 0.0, "action": "enable" },
        { "at": 0.5, "action": "key_down", "code": "KeyW" },
        { "at": 1.0, "action": "look", "yaw": 45.0, "pitch": 0.0 },
        { "at": 1.0, "action": "spawn_stand",
          "stand": { "shape": "cylinder", "position": [1.0, 0.2, 1.0], "radius": 0.4, "height": 0.4 } }
    ]"#;

    #[test]
    fn test_events_replayed_in_time_order() {
        let mut script = InputScript::parse(SAMPLE).expect("valid script");
        assert_eq!(script.len(), 5);
        assert_eq!(script.due(0.0), vec![Action::Enable]);
        assert!(script.due(0.2).is_empty());

        let due = script.due(1.0);
        assert_eq!(due.len(), 3);
        assert!(matches!(due[0], Action::KeyDown { .. }));
        assert!(matches!(due[2], Action::SpawnStand { .. }));

        assert!(!script.is_finished());
        assert_eq!(script.due(10.0).len(), 1);
        assert!(script.is_finished());
    }

    #[test]
    fn test_negative_time_rejected() {
        assert!(InputScript::parse(r#"[ { "at": -1.0, "action": "disable" } ]"#).is_err());
        assert!(InputScript::parse(r#"[ { "at": 1.0, "action": "jump" } ]"#).is_err());
    }

    #[test]
    fn test_spawned_stand_uses_stand_name() {
        let spec = StandSpec::Box {
            position: Vec3::new(0.0, 0.1, 0.0),
            size: Vec3::new(1.0, 0.2, 1.0),
            yaw_degrees: 0.0,
        };
        let object = spec.build(ObjectId(9));
        assert_eq!(object.name, navigation::stands::BOX_STAND_NAME);
        assert_eq!(object.id, ObjectId(9));
    }
}
