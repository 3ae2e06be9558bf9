#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_math::{Affine3A, Vec3};

use crate::geometry::Aabb;

// ============================================================================
// Scene Objects
// ============================================================================

// Stable identity of a piece of scene geometry, assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct ObjectId(pub u32);

/// A leaf piece of static geometry as the host scene graph reports it.
///
/// `ancestors` holds the names of the enclosing groups, nearest first, so the
/// classifier can resolve roles carried by a parent without walking a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    pub ancestors: Vec<String>,
    pub local_bounds: Aabb,
    pub transform: Affine3A,
}

impl SceneObject {
    #[must_use]
    pub fn new(id: ObjectId, name: impl Into<String>, local_bounds: Aabb, transform: Affine3A) -> Self {
        Self {
            id,
            name: name.into(),
            ancestors: Vec::new(),
            local_bounds,
            transform,
        }
    }

    // Box of `size` centered at `center`, no rotation
    #[must_use]
    pub fn cuboid(id: ObjectId, name: impl Into<String>, center: Vec3, size: Vec3) -> Self {
        Self::new(
            id,
            name,
            Aabb::from_center_size(Vec3::ZERO, size),
            Affine3A::from_translation(center),
        )
    }

    #[must_use]
    pub fn with_ancestors<I, S>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ancestors = ancestors.into_iter().map(Into::into).collect();
        self
    }

    // World-space bounding volume (hull of the transformed local box)
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.transform)
    }
}

// ============================================================================
// Scene Source
// ============================================================================

// Anything that can enumerate the current leaf geometry of the static scene
pub trait SceneSource {
    fn objects(&self) -> Vec<SceneObject>;
}

/// Owned scene graph snapshot; geometry can be added or removed between frames.
#[derive(Debug, Clone, Default)]
pub struct StaticScene {
    objects: Vec<SceneObject>,
    next_id: u32,
}

impl StaticScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn next_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    // Insert or replace (same id) an object
    pub fn insert(&mut self, object: SceneObject) {
        self.next_id = self.next_id.max(object.id.0 + 1);
        if let Some(existing) = self.objects.iter_mut().find(|o| o.id == object.id) {
            *existing = object;
        } else {
            self.objects.push(object);
        }
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl SceneSource for StaticScene {
    fn objects(&self) -> Vec<SceneObject> {
        self.objects.clone()
    }
}
