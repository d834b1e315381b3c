//! Hierarchy system
//!
//! Propagates transforms from roots down to children and caches the resulting
//! world matrices. Runs first each tick so later systems see this tick's
//! world-space placement.

use crate::ecs::components::{HierarchyComponent, TransformComponent};
use crate::ecs::error::Result;
use crate::ecs::{Entity, Signature, System, SystemType, World};
use crate::foundation::math::Mat4;
use std::collections::{HashMap, HashSet};

/// Computes world matrices for entities with Transform and Hierarchy
#[derive(Debug, Default)]
pub struct HierarchySystem {
    world_matrices: HashMap<Entity, Mat4>,
}

impl HierarchySystem {
    /// Create a new hierarchy system
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached world matrix of a hierarchy member from the last update
    pub fn world_matrix(&self, entity: Entity) -> Option<&Mat4> {
        self.world_matrices.get(&entity)
    }

    /// Number of cached matrices
    pub fn cached_count(&self) -> usize {
        self.world_matrices.len()
    }

    fn propagate(
        &mut self,
        world: &World,
        entity: Entity,
        parent_matrix: &Mat4,
        visited: &mut HashSet<Entity>,
    ) {
        if !visited.insert(entity) {
            log::error!("Hierarchy cycle through entity {entity}, skipping subtree");
            return;
        }
        let Some(transform) = world.get_component::<TransformComponent>(entity) else {
            return;
        };
        let matrix = parent_matrix * transform.to_matrix();
        self.world_matrices.insert(entity, matrix);

        let children = world
            .get_component::<HierarchyComponent>(entity)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.propagate(world, child, &matrix, visited);
        }
    }
}

impl System for HierarchySystem {
    fn update(&mut self, world: &mut World, entities: &[Entity], _delta_time: f32) {
        self.world_matrices.clear();
        let members: HashSet<Entity> = entities.iter().copied().collect();
        let mut visited = HashSet::with_capacity(entities.len());

        // A node is a root when it has no parent or its parent is outside the hierarchy set.
        let roots: Vec<Entity> = entities
            .iter()
            .copied()
            .filter(|&entity| {
                world
                    .get_component::<HierarchyComponent>(entity)
                    .and_then(HierarchyComponent::parent)
                    .map_or(true, |parent| !members.contains(&parent))
            })
            .collect();

        for root in roots {
            let base = world
                .get_component::<HierarchyComponent>(root)
                .and_then(HierarchyComponent::parent)
                .map_or_else(Mat4::identity, |parent| ancestor_matrix(world, parent));
            self.propagate(world, root, &base, &mut visited);
        }
        log::trace!("HierarchySystem: propagated {} world matrices", self.world_matrices.len());
    }
}

impl SystemType for HierarchySystem {
    const TYPE_NAME: &'static str = "HierarchySystem";

    fn required_signature(world: &World) -> Result<Signature> {
        Ok(Signature::EMPTY
            .with(world.component_type::<TransformComponent>()?)
            .with(world.component_type::<HierarchyComponent>()?))
    }
}

/// World matrix of `entity` composed by walking its parent chain, without
/// relying on the cached matrices of the last update.
pub fn compose_world_matrix(world: &World, entity: Entity) -> Option<Mat4> {
    let local = world.get_component::<TransformComponent>(entity)?.to_matrix();
    let base = world
        .get_component::<HierarchyComponent>(entity)
        .and_then(HierarchyComponent::parent)
        .map_or_else(Mat4::identity, |parent| ancestor_matrix(world, parent));
    Some(base * local)
}

/// Product of the transforms from the topmost ancestor down to `entity`.
/// Links without a transform contribute identity.
fn ancestor_matrix(world: &World, entity: Entity) -> Mat4 {
    let mut matrix = Mat4::identity();
    let mut current = Some(entity);
    let mut steps = 0;
    while let Some(node) = current {
        if steps > world.entity_count() {
            log::error!("Hierarchy cycle above entity {entity}, truncating parent chain");
            break;
        }
        if let Some(transform) = world.get_component::<TransformComponent>(node) {
            matrix = transform.to_matrix() * matrix;
        }
        current = world
            .get_component::<HierarchyComponent>(node)
            .and_then(HierarchyComponent::parent);
        steps += 1;
    }
    matrix
}

/// World matrix of `entity`: the propagated one when the entity is in a
/// hierarchy, else its local transform. `None` without a transform.
pub fn resolve_world_matrix(world: &World, entity: Entity) -> Option<Mat4> {
    world
        .system::<HierarchySystem>()
        .and_then(|system| system.world_matrix(entity).copied())
        .or_else(|| {
            world
                .get_component::<TransformComponent>(entity)
                .map(TransformComponent::to_matrix)
        })
}
