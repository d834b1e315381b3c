//! Integration tests for scene-level hierarchy edits

use studio_core::ecs::components::HierarchyComponent;
use studio_core::ecs::Entity;
use studio_core::foundation::math::Vec3;
use studio_core::scene::{SceneError, SceneManager};

fn children(scene: &SceneManager, entity: Entity) -> Vec<Entity> {
    scene
        .world()
        .component::<HierarchyComponent>(entity)
        .map(|node| node.children.clone())
        .unwrap_or_default()
}

/// Every child lists its parent and every parent lists its children, exactly once
fn assert_forest_consistent(scene: &SceneManager) {
    for (entity, node) in scene.world().query::<HierarchyComponent>() {
        if let Some(parent) = node.parent() {
            let listed = children(scene, parent)
                .into_iter()
                .filter(|&child| child == entity)
                .count();
            assert_eq!(listed, 1, "{entity} listed {listed} times under {parent}");
        }
        for &child in &node.children {
            assert_eq!(scene.get_parent(child), Some(entity));
        }
    }
}

#[test]
fn reparenting_moves_child_between_parents() {
    let mut scene = SceneManager::new().unwrap();
    let a = scene.create_entity("A").unwrap();
    let b = scene.create_entity("B").unwrap();
    let c = scene.create_entity("C").unwrap();

    scene.set_parent(a, c).unwrap();
    scene.set_parent(b, c).unwrap();

    assert_eq!(scene.get_parent(c), Some(b));
    assert!(!children(&scene, a).contains(&c));
    assert_eq!(children(&scene, b).iter().filter(|&&x| x == c).count(), 1);
    assert_forest_consistent(&scene);
}

#[test]
fn forest_stays_consistent_through_edits() {
    let mut scene = SceneManager::new().unwrap();
    let nodes: Vec<Entity> = (0..8)
        .map(|i| scene.create_object(&format!("node{i}"), Vec3::new(i as f32, 0.0, 0.0)).unwrap())
        .collect();

    for pair in nodes.windows(2) {
        scene.set_parent(pair[0], pair[1]).unwrap();
    }
    assert!(matches!(
        scene.set_parent(nodes[7], nodes[0]),
        Err(SceneError::HierarchyCycle { .. })
    ));
    scene.set_parent(nodes[0], nodes[5]).unwrap();
    scene.remove_parent(nodes[3]).unwrap();
    scene.destroy_entity(nodes[1]).unwrap();
    assert_forest_consistent(&scene);

    scene.update(0.016);
    assert_eq!(scene.destroy_recursive(nodes[3]).unwrap(), 2);
    assert_forest_consistent(&scene);
    assert_eq!(scene.world().entity_count(), 5);
}

#[test]
fn statistics_render_as_text() {
    let mut scene = SceneManager::new().unwrap();
    scene.create_object("cube", Vec3::zeros()).unwrap();
    scene.update(0.016);
    let text = scene.statistics().to_string();
    assert!(text.contains("Entities: 1 / 5000"));
    assert!(text.contains("RenderSystem"));
}
