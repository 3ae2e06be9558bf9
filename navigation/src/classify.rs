use std::{collections::HashMap, sync::Arc};

use bevy_math::Vec3;
#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::ClassifierConfig,
    geometry::Aabb,
    scene::{ObjectId, SceneObject, SceneSource},
};

// ============================================================================
// Roles and Flags
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum Role {
    Wall,
    Floor,
    Ceiling,
    ExhibitStand,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_wall: bool,
    pub is_floor: bool,
    pub is_ceiling: bool,
    pub is_exhibit_stand: bool,
    pub is_view_collider: bool,
}

impl Classification {
    #[must_use]
    pub const fn from_role(role: Option<Role>) -> Self {
        Self {
            is_wall: matches!(role, Some(Role::Wall)),
            is_floor: matches!(role, Some(Role::Floor)),
            is_ceiling: matches!(role, Some(Role::Ceiling)),
            is_exhibit_stand: matches!(role, Some(Role::ExhibitStand)),
            is_view_collider: false,
        }
    }

    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        if self.is_exhibit_stand {
            Some(Role::ExhibitStand)
        } else if self.is_ceiling {
            Some(Role::Ceiling)
        } else if self.is_wall {
            Some(Role::Wall)
        } else if self.is_floor {
            Some(Role::Floor)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_classified(&self) -> bool {
        self.is_wall || self.is_floor || self.is_ceiling || self.is_exhibit_stand
    }
}

// ============================================================================
// Collision Proxies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    Body,    // Wall, floor, ceiling or unclassified volume
    Precise, // Stand bounds, slightly enlarged
    Tall,    // Raised stand-in for a flat stand
    View,    // Shrunk panel used for view rays only
}

// Which queries a proxy takes part in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyUsage {
    pub movement: bool,
    pub view: bool,
}

impl ProxyUsage {
    pub const MOVEMENT: Self = Self {
        movement: true,
        view: false,
    };
    pub const VIEW: Self = Self {
        movement: false,
        view: true,
    };
    pub const BOTH: Self = Self {
        movement: true,
        view: true,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionObject {
    pub source: ObjectId,
    pub name: String,
    pub kind: ProxyKind,
    pub flags: Classification,
    pub usage: ProxyUsage,
    pub bounds: Aabb,
}

impl CollisionObject {
    // Proxy with flags derived from `role`; the view flag follows the usage
    #[must_use]
    pub fn new(
        source: ObjectId,
        name: impl Into<String>,
        role: Option<Role>,
        kind: ProxyKind,
        usage: ProxyUsage,
        bounds: Aabb,
    ) -> Self {
        let mut flags = Classification::from_role(role);
        flags.is_view_collider = usage.view;
        Self {
            source,
            name: name.into(),
            kind,
            flags,
            usage,
            bounds,
        }
    }
}

/// Immutable, cheaply clonable set of proxies. Replacing the set swaps the
/// whole slice, so a reader never observes a partially rebuilt set.
#[derive(Debug, Clone)]
pub struct CollisionSet(Arc<[CollisionObject]>);

impl Default for CollisionSet {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

impl CollisionSet {
    #[must_use]
    pub fn from_objects(objects: Vec<CollisionObject>) -> Self {
        Self(Arc::from(objects))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionObject> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CollisionObject> {
        self.0.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[CollisionObject] {
        &self.0
    }
}

impl From<Vec<CollisionObject>> for CollisionSet {
    fn from(objects: Vec<CollisionObject>) -> Self {
        Self::from_objects(objects)
    }
}

// ============================================================================
// Scene Classifier
// ============================================================================

// Cached result for one source object; reused while name, ancestry and world
// bounds are unchanged
#[derive(Debug, Clone)]
struct CacheEntry {
    name: String,
    ancestors: Vec<String>,
    bounds: Aabb,
    proxies: Vec<CollisionObject>,
}

impl CacheEntry {
    fn matches(&self, object: &SceneObject, bounds: &Aabb) -> bool {
        self.name == object.name && self.ancestors == object.ancestors && self.bounds == *bounds
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneClassifier {
    config: ClassifierConfig,
    table: HashMap<ObjectId, Classification>,
    cache: HashMap<ObjectId, CacheEntry>,
}

impl SceneClassifier {
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            table: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    // New rules invalidate every cached proxy
    pub fn set_config(&mut self, config: ClassifierConfig) {
        self.config = config;
        self.table.clear();
        self.cache.clear();
    }

    #[must_use]
    pub fn classification(&self, id: ObjectId) -> Option<Classification> {
        self.table.get(&id).copied()
    }

    /// Resolve the role of an object by keyword: its own name first, then the
    /// ancestor names nearest first. Within one name the first matching table
    /// entry wins.
    #[must_use]
    pub fn resolve_role(&self, object: &SceneObject) -> Option<Role> {
        std::iter::once(&object.name)
            .chain(object.ancestors.iter())
            .find_map(|name| self.match_name(name))
    }

    fn match_name(&self, name: &str) -> Option<Role> {
        let lowered = name.to_lowercase();
        self.config
            .roles
            .iter()
            .find(|entry| entry.keywords.iter().any(|k| !k.is_empty() && lowered.contains(k.as_str())))
            .map(|entry| entry.role)
    }

    /// Classify the current scene content and return the full proxy set.
    /// Re-running is idempotent: unchanged objects reuse their cached proxies,
    /// changed objects are rebuilt and removed objects are dropped.
    pub fn classify(&mut self, scene: &impl SceneSource) -> CollisionSet {
        let objects = scene.objects();
        let mut cache = HashMap::with_capacity(objects.len());
        let mut proxies = Vec::new();
        let mut rebuilt = 0_usize;
        let mut skipped = 0_usize;

        self.table.clear();
        for object in &objects {
            let bounds = object.world_bounds();
            if !bounds.is_finite() {
                debug!("skipping {} ({:?}): non-finite bounds", object.name, object.id);
                skipped += 1;
                continue;
            }

            let entry = match self.cache.remove(&object.id) {
                Some(entry) if entry.matches(object, &bounds) => entry,
                _ => {
                    rebuilt += 1;
                    CacheEntry {
                        name: object.name.clone(),
                        ancestors: object.ancestors.clone(),
                        bounds,
                        proxies: self.build_proxies(object, bounds),
                    }
                }
            };

            let role = self.resolve_role(object);
            if role.is_none() && !self.config.include_unclassified {
                cache.insert(object.id, entry);
                continue;
            }

            let mut classification = Classification::from_role(role);
            classification.is_view_collider = entry.proxies.iter().any(|p| p.usage.view);
            self.table.insert(object.id, classification);

            proxies.extend(entry.proxies.iter().cloned());
            cache.insert(object.id, entry);
        }

        let dropped = self.cache.len();
        self.cache = cache;

        info!(
            "classified {} objects into {} proxies ({} rebuilt, {} dropped, {} skipped)",
            objects.len(),
            proxies.len(),
            rebuilt,
            dropped,
            skipped
        );

        CollisionSet::from_objects(proxies)
    }

    fn build_proxies(&self, object: &SceneObject, bounds: Aabb) -> Vec<CollisionObject> {
        let role = self.resolve_role(object);
        let cfg = &self.config;
        let proxy = |kind, usage, bounds| CollisionObject::new(object.id, object.name.clone(), role, kind, usage, bounds);

        match role {
            Some(Role::ExhibitStand) => {
                let mut out = vec![proxy(
                    ProxyKind::Precise,
                    ProxyUsage::BOTH,
                    bounds.scaled(Vec3::new(cfg.stand_scale_xz, cfg.stand_scale_y, cfg.stand_scale_xz)),
                )];

                // A flat stand gets a taller stand-in so a descending avatar
                // stops well above its real top surface
                let size = bounds.size();
                if size.y < cfg.flat_stand_height {
                    let center = bounds.center();
                    let footprint = Vec3::new(size.x * cfg.tall_proxy_spread, 0.0, size.z * cfg.tall_proxy_spread);
                    let tall = Aabb::from_center_size(
                        Vec3::new(center.x, bounds.min.y + cfg.tall_proxy_height / 2.0, center.z),
                        Vec3::new(footprint.x, cfg.tall_proxy_height, footprint.z),
                    );
                    out.push(proxy(ProxyKind::Tall, ProxyUsage::MOVEMENT, tall));
                }
                out
            }
            Some(role @ (Role::Wall | Role::Ceiling)) => {
                let body_bounds = if role == Role::Wall {
                    let half = cfg.wall_thickening / 2.0;
                    bounds.expanded(Vec3::new(half, 0.0, half))
                } else {
                    bounds
                };

                let view = self.view_proxy_bounds(&bounds);
                let body_usage = if view.is_some() {
                    ProxyUsage::MOVEMENT
                } else {
                    ProxyUsage::BOTH
                };

                let mut out = vec![proxy(ProxyKind::Body, body_usage, body_bounds)];
                if let Some(view) = view {
                    out.push(proxy(ProxyKind::View, ProxyUsage::VIEW, view));
                }
                out
            }
            Some(Role::Floor) | None => vec![proxy(ProxyKind::Body, ProxyUsage::MOVEMENT, bounds)],
        }
    }

    // Slightly shrunk copy of a large panel, used only by the view guard
    fn view_proxy_bounds(&self, bounds: &Aabb) -> Option<Aabb> {
        let cfg = &self.config;
        let size = bounds.size();
        if size.x <= cfg.view_proxy_min_span && size.z <= cfg.view_proxy_min_span {
            return None;
        }
        let shrunk = (size * cfg.view_proxy_shrink).max(Vec3::splat(cfg.view_proxy_min_size));
        Some(Aabb::from_center_size(bounds.center(), shrunk))
    }
}
