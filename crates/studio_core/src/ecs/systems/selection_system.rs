//! Selection system
//!
//! The selection flags live on [`SelectableComponent`]; this system keeps the
//! order in which entities were selected so the last one can act as the
//! primary selection. The associated functions edit both sides in one call.

use crate::ecs::components::SelectableComponent;
use crate::ecs::error::Result;
use crate::ecs::{Entity, Signature, System, SystemType, World};

/// Ordered selection plus hover tracking
#[derive(Debug, Default)]
pub struct SelectionSystem {
    order: Vec<Entity>,
    hovered: Option<Entity>,
}

impl SelectionSystem {
    /// Create a new selection system
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected entities, oldest first
    pub fn selected(&self) -> &[Entity] {
        &self.order
    }

    /// Most recently selected entity
    pub fn primary(&self) -> Option<Entity> {
        self.order.last().copied()
    }

    /// Entity under the pointer
    pub fn hovered(&self) -> Option<Entity> {
        self.hovered
    }

    /// Whether `entity` is in the selection
    pub fn is_selected(&self, entity: Entity) -> bool {
        self.order.contains(&entity)
    }

    /// Number of selected entities
    pub fn selection_count(&self) -> usize {
        self.order.len()
    }

    /// Select `entity`. Without `additive` the previous selection is cleared first.
    /// Returns false for entities that are not selectable.
    pub fn select(world: &mut World, entity: Entity, additive: bool) -> bool {
        let accepts = world
            .get_component::<SelectableComponent>(entity)
            .is_some_and(|selectable| selectable.selectable);
        if !accepts {
            log::debug!("Entity {entity} is not selectable");
            return false;
        }
        if !additive {
            Self::clear(world);
        }
        let changed = world
            .get_component_mut::<SelectableComponent>(entity)
            .is_some_and(SelectableComponent::select);
        if changed {
            if let Some(system) = world.system_mut::<SelectionSystem>() {
                system.order.push(entity);
            }
        }
        true
    }

    /// Remove `entity` from the selection; returns whether it was selected
    pub fn deselect(world: &mut World, entity: Entity) -> bool {
        let changed = world
            .get_component_mut::<SelectableComponent>(entity)
            .is_some_and(SelectableComponent::deselect);
        if let Some(system) = world.system_mut::<SelectionSystem>() {
            system.order.retain(|&selected| selected != entity);
        }
        changed
    }

    /// Flip `entity`'s membership in the selection, keeping the rest
    pub fn toggle(world: &mut World, entity: Entity) -> bool {
        let selected = world
            .get_component::<SelectableComponent>(entity)
            .is_some_and(|selectable| selectable.selected);
        if selected {
            Self::deselect(world, entity)
        } else {
            Self::select(world, entity, true)
        }
    }

    /// Deselect everything
    pub fn clear(world: &mut World) {
        let selected: Vec<Entity> = world
            .query::<SelectableComponent>()
            .filter(|(_, selectable)| selectable.selected)
            .map(|(entity, _)| entity)
            .collect();
        for entity in selected {
            if let Some(selectable) = world.get_component_mut::<SelectableComponent>(entity) {
                selectable.deselect();
            }
        }
        if let Some(system) = world.system_mut::<SelectionSystem>() {
            system.order.clear();
        }
    }

    /// Move the hover highlight to `entity`, or drop it with `None`
    pub fn set_hovered(world: &mut World, entity: Option<Entity>) {
        let previous = world.system::<SelectionSystem>().and_then(SelectionSystem::hovered);
        if previous == entity {
            return;
        }
        if let Some(previous) = previous {
            if let Some(selectable) = world.get_component_mut::<SelectableComponent>(previous) {
                selectable.set_hovered(false);
            }
        }
        let accepted = entity.filter(|&target| {
            world
                .get_component_mut::<SelectableComponent>(target)
                .is_some_and(|selectable| {
                    selectable.set_hovered(true);
                    selectable.hovered
                })
        });
        if let Some(system) = world.system_mut::<SelectionSystem>() {
            system.hovered = accepted;
        }
    }
}

impl System for SelectionSystem {
    fn update(&mut self, world: &mut World, entities: &[Entity], _delta_time: f32) {
        // Flags may have been edited directly on components; follow them.
        self.order.retain(|&entity| {
            world
                .get_component::<SelectableComponent>(entity)
                .is_some_and(|selectable| selectable.selected)
        });
        for &entity in entities {
            let selected = world
                .get_component::<SelectableComponent>(entity)
                .is_some_and(|selectable| selectable.selected);
            if selected && !self.order.contains(&entity) {
                self.order.push(entity);
            }
        }
        if let Some(hovered) = self.hovered {
            let still_hovered = world
                .get_component::<SelectableComponent>(hovered)
                .is_some_and(|selectable| selectable.hovered);
            if !still_hovered {
                self.hovered = None;
            }
        }
    }
}

impl SystemType for SelectionSystem {
    const TYPE_NAME: &'static str = "SelectionSystem";

    fn required_signature(world: &World) -> Result<Signature> {
        Ok(Signature::EMPTY.with(world.component_type::<SelectableComponent>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::WorldConfig;

    fn selection_world(count: usize) -> (World, Vec<Entity>) {
        let mut world = World::with_config(&WorldConfig { max_entities: 16 });
        world.register_component::<SelectableComponent>().unwrap();
        world.add_system(SelectionSystem::new()).unwrap();
        let entities = (0..count)
            .map(|_| {
                let entity = world.create_entity().unwrap();
                world.add_component(entity, SelectableComponent::new()).unwrap();
                entity
            })
            .collect();
        (world, entities)
    }

    #[test]
    fn test_single_selection_replaces() {
        let (mut world, entities) = selection_world(2);
        assert!(SelectionSystem::select(&mut world, entities[0], false));
        assert!(SelectionSystem::select(&mut world, entities[1], false));

        let system = world.system::<SelectionSystem>().unwrap();
        assert_eq!(system.selected(), &[entities[1]]);
        assert!(!world.component::<SelectableComponent>(entities[0]).unwrap().selected);
    }

    #[test]
    fn test_additive_selection_keeps_order() {
        let (mut world, entities) = selection_world(3);
        SelectionSystem::select(&mut world, entities[2], true);
        SelectionSystem::select(&mut world, entities[0], true);

        let system = world.system::<SelectionSystem>().unwrap();
        assert_eq!(system.selected(), &[entities[2], entities[0]]);
        assert_eq!(system.primary(), Some(entities[0]));
    }

    #[test]
    fn test_locked_entity_rejected() {
        let (mut world, entities) = selection_world(1);
        *world.component_mut::<SelectableComponent>(entities[0]).unwrap() =
            SelectableComponent::locked();
        assert!(!SelectionSystem::select(&mut world, entities[0], false));
        assert_eq!(world.system::<SelectionSystem>().unwrap().selection_count(), 0);
    }

    #[test]
    fn test_toggle_and_clear() {
        let (mut world, entities) = selection_world(2);
        SelectionSystem::toggle(&mut world, entities[0]);
        SelectionSystem::toggle(&mut world, entities[1]);
        SelectionSystem::toggle(&mut world, entities[0]);
        assert_eq!(world.system::<SelectionSystem>().unwrap().selected(), &[entities[1]]);

        SelectionSystem::clear(&mut world);
        assert_eq!(world.system::<SelectionSystem>().unwrap().selection_count(), 0);
        assert!(!world.component::<SelectableComponent>(entities[1]).unwrap().selected);
    }

    #[test]
    fn test_update_follows_component_flags() {
        let (mut world, entities) = selection_world(2);
        world.component_mut::<SelectableComponent>(entities[1]).unwrap().select();
        world.update(0.0);
        assert_eq!(world.system::<SelectionSystem>().unwrap().selected(), &[entities[1]]);

        world.destroy_entity(entities[1]).unwrap();
        world.update(0.0);
        assert_eq!(world.system::<SelectionSystem>().unwrap().selection_count(), 0);
    }

    #[test]
    fn test_hover_moves() {
        let (mut world, entities) = selection_world(2);
        SelectionSystem::set_hovered(&mut world, Some(entities[0]));
        SelectionSystem::set_hovered(&mut world, Some(entities[1]));

        assert_eq!(world.system::<SelectionSystem>().unwrap().hovered(), Some(entities[1]));
        assert!(!world.component::<SelectableComponent>(entities[0]).unwrap().hovered);
        assert!(world.component::<SelectableComponent>(entities[1]).unwrap().hovered);
    }
}
