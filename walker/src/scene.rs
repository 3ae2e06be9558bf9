use std::path::Path;

use anyhow::{Context, Result, ensure};
use bevy_math::{Affine3A, Quat, Vec3};
use navigation::{Aabb, SceneObject, StaticScene};
use serde::{Deserialize, Serialize};

// ============================================================================
// Scene File
// ============================================================================

// One box-shaped object; the box is centered on `center` and turned by
// `yaw_degrees` about +Y
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub name: String,
    pub center: Vec3,
    pub size: Vec3,
    #[serde(default)]
    pub yaw_degrees: f32,
    #[serde(default)]
    pub ancestors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub objects: Vec<SceneEntry>,
}

impl SceneFile {
    pub fn parse(text: &str) -> Result<Self> {
        let file: Self = serde_json::from_str(text).context("Failed to parse scene file")?;
        for entry in &file.objects {
            ensure!(
                entry.center.is_finite() && entry.size.is_finite() && entry.yaw_degrees.is_finite(),
                "object {} has non-finite placement",
                entry.name
            );
        }
        Ok(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid scene file {}", path.display()))
    }

    #[must_use]
    pub fn into_scene(self) -> StaticScene {
        let mut scene = StaticScene::new();
        for entry in self.objects {
            let id = scene.next_id();
            let transform = Affine3A::from_rotation_translation(Quat::from_rotation_y(entry.yaw_degrees.to_radians()), entry.center);
            scene.insert(
                SceneObject::new(id, entry.name, Aabb::from_center_size(Vec3::ZERO, entry.size), transform)
                    .with_ancestors(entry.ancestors),
            );
        }
        scene
    }
}
