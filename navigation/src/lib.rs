pub mod camera;
pub mod classify;
pub mod config;
pub mod constants;
pub mod controller;
pub mod diagnostics;
pub mod geometry;
pub mod input;
pub mod oracle;
pub mod scene;
pub mod slide;
pub mod stands;
pub mod vertical;
pub mod view_guard;

pub use camera::{CameraRig, LookAtCamera};
pub use classify::{Classification, CollisionObject, CollisionSet, ProxyKind, ProxyUsage, Role, SceneClassifier};
pub use config::{ClassifierConfig, NavigationConfig, RoleKeywords, Thresholds};
pub use controller::{MoveState, WalkthroughController};
pub use geometry::Aabb;
pub use input::{InputState, KeyBindings, NavKey};
pub use oracle::{CastHit, CastResult, CollisionOracle, Obstruction, ObstructionCause, ProxyFilter};
pub use scene::{ObjectId, SceneObject, SceneSource, StaticScene};
pub use stands::{BoxStand, CylinderStand};
pub use view_guard::ViewGuard;
