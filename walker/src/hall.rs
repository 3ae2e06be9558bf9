use bevy_math::Vec3;
use navigation::{BoxStand, CylinderStand, SceneObject, StaticScene};

// ============================================================================
// Built-in Demo Gallery
// ============================================================================

const HALL_HALF_WIDTH: f32 = 10.0;
const HALL_HEIGHT: f32 = 4.5;
const WALL_THICKNESS: f32 = 0.2;
const FLOOR_THICKNESS: f32 = 0.1;

fn add(scene: &mut StaticScene, name: &str, center: Vec3, size: Vec3) {
    let id = scene.next_id();
    scene.insert(SceneObject::cuboid(id, name, center, size));
}

/// Square hall with a floor, a ceiling, four walls, a doorway pillar and a
/// few pedestals of both heights.
#[must_use]
pub fn demo_gallery() -> StaticScene {
    let mut scene = StaticScene::new();
    let span = HALL_HALF_WIDTH * 2.0;
    let mid_height = HALL_HEIGHT / 2.0;

    add(
        &mut scene,
        "floor_main",
        Vec3::new(0.0, -FLOOR_THICKNESS / 2.0, 0.0),
        Vec3::new(span, FLOOR_THICKNESS, span),
    );
    add(
        &mut scene,
        "ceiling_main",
        Vec3::new(0.0, HALL_HEIGHT + FLOOR_THICKNESS / 2.0, 0.0),
        Vec3::new(span, FLOOR_THICKNESS, span),
    );

    // Walls
    let edge = HALL_HALF_WIDTH + WALL_THICKNESS / 2.0;
    add(
        &mut scene,
        "wall_north",
        Vec3::new(0.0, mid_height, -edge),
        Vec3::new(span, HALL_HEIGHT, WALL_THICKNESS),
    );
    add(
        &mut scene,
        "wall_south",
        Vec3::new(0.0, mid_height, edge),
        Vec3::new(span, HALL_HEIGHT, WALL_THICKNESS),
    );
    add(
        &mut scene,
        "wall_east",
        Vec3::new(edge, mid_height, 0.0),
        Vec3::new(WALL_THICKNESS, HALL_HEIGHT, span),
    );
    add(
        &mut scene,
        "wall_west",
        Vec3::new(-edge, mid_height, 0.0),
        Vec3::new(WALL_THICKNESS, HALL_HEIGHT, span),
    );

    // Narrow pillar by the entrance, below the view-proxy span
    add(
        &mut scene,
        "men_pillar",
        Vec3::new(3.0, mid_height, 7.0),
        Vec3::new(0.6, HALL_HEIGHT, 0.6),
    );

    // Pedestals: one tall, one flat, one round, and an unnamed mesh that
    // inherits its role from the group it sits in
    let tall = BoxStand {
        name: "zhantai_tall".to_string(),
        position: Vec3::new(-4.0, 0.6, -3.0),
        size: Vec3::new(1.2, 1.2, 1.2),
        yaw: 0.4,
    };
    let id = scene.next_id();
    scene.insert(tall.build(id));

    let flat = BoxStand {
        position: Vec3::new(4.0, 0.15, -3.0),
        size: Vec3::new(1.5, 0.3, 1.0),
        ..BoxStand::default()
    };
    let id = scene.next_id();
    scene.insert(flat.build(id));

    let round = CylinderStand {
        position: Vec3::new(0.0, 0.4, -6.0),
        radius: 0.6,
        height: 0.8,
        ..CylinderStand::default()
    };
    let id = scene.next_id();
    scene.insert(round.build(id));

    let id = scene.next_id();
    scene.insert(
        SceneObject::cuboid(id, "Mesh_7", Vec3::new(-6.0, 0.5, 4.0), Vec3::new(0.8, 1.0, 0.8))
            .with_ancestors(["exhibit_group", "hall_root"]),
    );

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigation::{ProxyKind, SceneClassifier};

    #[test]
    fn test_gallery_classifies_every_role() {
        let scene = demo_gallery();
        let mut classifier = SceneClassifier::default();
        let set = classifier.classify(&scene);

        assert!(set.iter().any(|p| p.flags.is_floor));
        assert!(set.iter().any(|p| p.flags.is_ceiling));
        assert_eq!(set.iter().filter(|p| p.flags.is_wall && p.kind == ProxyKind::Body).count(), 5);
        assert_eq!(set.iter().filter(|p| p.kind == ProxyKind::Tall).count(), 1);
        // Four stands including the grouped mesh
        assert_eq!(set.iter().filter(|p| p.kind == ProxyKind::Precise).count(), 4);
        // The pillar is narrow, so its body doubles as the view collider
        assert_eq!(set.iter().filter(|p| p.kind == ProxyKind::View).count(), 5);
    }
}
