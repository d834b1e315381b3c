//! ECS World implementation
//!
//! The world owns the entity registry, the component store and the system
//! registry and keeps them in step. Adding or removing a component updates the
//! store, then the signature, then system membership, with no system running
//! in between. Destroying an entity clears its components, then its system
//! memberships, then releases the id.

use super::component::Component;
use super::entity::{ComponentType, Entity, EntityManager, Signature, MAX_ENTITIES};
use super::error::{fail, EcsError, Result};
use super::storage::{ComponentArray, ComponentStore};
use super::system::{SystemHandle, SystemManager, SystemType};
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// World construction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Size of the entity id pool (id 0 is reserved)
    pub max_entities: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: MAX_ENTITIES,
        }
    }
}

impl Config for WorldConfig {}

/// ECS World containing all entities, components and systems
pub struct World {
    entities: EntityManager,
    components: ComponentStore,
    systems: SystemManager,
}

impl World {
    /// Create a new world with the default entity pool
    pub fn new() -> Self {
        Self::with_config(&WorldConfig::default())
    }

    /// Create a world from explicit settings
    pub fn with_config(config: &WorldConfig) -> Self {
        Self {
            entities: EntityManager::new(config.max_entities),
            components: ComponentStore::new(config.max_entities as usize),
            systems: SystemManager::new(),
        }
    }

    // ----- entities -----

    /// Create a new entity with an empty signature
    pub fn create_entity(&mut self) -> Result<Entity> {
        let entity = self.entities.create()?;
        // Systems with an empty mask track every living entity.
        self.systems.entity_signature_changed(entity, Signature::EMPTY);
        Ok(entity)
    }

    /// Destroy an entity and everything attached to it
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        if !self.entities.is_alive(entity) {
            return fail(EcsError::InvalidEntity(entity));
        }
        self.components.entity_destroyed(entity);
        self.systems.entity_destroyed(entity);
        self.entities.destroy(entity)
    }

    /// Alive and carrying at least one component
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.entities.is_valid(entity)
    }

    /// Alive, regardless of components
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Signature of a living entity
    pub fn signature(&self, entity: Entity) -> Result<Signature> {
        self.entities.signature(entity)
    }

    /// Number of living entities
    pub fn entity_count(&self) -> usize {
        self.entities.living_count() as usize
    }

    /// Living entities in ascending id order
    pub fn living_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.living_entities()
    }

    /// Entity registry, read-only
    pub fn entity_manager(&self) -> &EntityManager {
        &self.entities
    }

    // ----- components -----

    /// Register a component type; returns its signature bit
    pub fn register_component<T: Component>(&mut self) -> Result<ComponentType> {
        self.components.register::<T>()
    }

    /// Whether `T` is registered
    pub fn is_component_registered<T: Component>(&self) -> bool {
        self.components.is_registered::<T>()
    }

    /// Signature bit of `T`
    pub fn component_type<T: Component>(&self) -> Result<ComponentType> {
        self.components.type_index::<T>()
    }

    /// Add a component to an entity
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        let mut signature = self.entities.signature(entity)?;
        let component_type = self.components.type_index::<T>()?;
        self.components.insert(entity, component)?;
        signature.set(component_type);
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature);
        Ok(())
    }

    /// Remove a component from an entity and return it
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<T> {
        let mut signature = self.entities.signature(entity)?;
        let component_type = self.components.type_index::<T>()?;
        let removed = self.components.remove::<T>(entity)?;
        signature.reset(component_type);
        self.entities.set_signature(entity, signature)?;
        self.systems.entity_signature_changed(entity, signature);
        Ok(removed)
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.components.is_registered::<T>() {
            return None;
        }
        self.components.get::<T>(entity).ok()
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.components.is_registered::<T>() {
            return None;
        }
        self.components.get_mut::<T>(entity).ok()
    }

    /// Like [`get_component`](Self::get_component) but reports why it failed
    pub fn component<T: Component>(&self, entity: Entity) -> Result<&T> {
        self.components.get::<T>(entity)
    }

    /// Like [`get_component_mut`](Self::get_component_mut) but reports why it failed
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.components.get_mut::<T>(entity)
    }

    /// Whether an entity has a component of type `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components.has::<T>(entity)
    }

    /// Iterate every `(entity, component)` of type `T` in packed order
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.components
            .array::<T>()
            .ok()
            .into_iter()
            .flat_map(|array| array.iter())
    }

    /// Packed array of `T`, for renderers that iterate linearly
    pub fn component_array<T: Component>(&self) -> Result<&ComponentArray<T>> {
        self.components.array::<T>()
    }

    /// Component store, read-only
    pub fn component_store(&self) -> &ComponentStore {
        &self.components
    }

    // ----- systems -----

    /// Register a system. Update order is registration order.
    pub fn register_system<S: SystemType>(&mut self, system: S) -> Result<SystemHandle> {
        self.systems.register(system)
    }

    /// Set the components a system requires and recompute its entity set
    pub fn set_system_signature<S: SystemType>(&mut self, signature: Signature) -> Result<()> {
        let handle = self.systems.set_signature::<S>(signature)?;
        self.systems.rebuild(handle, self.entities.living_signatures());
        Ok(())
    }

    /// Register a system and apply its declared required signature
    pub fn add_system<S: SystemType>(&mut self, system: S) -> Result<SystemHandle> {
        let signature = S::required_signature(self)?;
        let handle = self.register_system(system)?;
        self.set_system_signature::<S>(signature)?;
        Ok(handle)
    }

    /// Typed access to a registered system
    pub fn system<S: SystemType>(&self) -> Option<&S> {
        self.systems.get::<S>()
    }

    /// Typed mutable access to a registered system
    pub fn system_mut<S: SystemType>(&mut self) -> Option<&mut S> {
        self.systems.get_mut::<S>()
    }

    /// Entities currently maintained by `S`
    pub fn system_entities<S: SystemType>(&self) -> Result<&BTreeSet<Entity>> {
        self.systems.entities::<S>()
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// System registry, read-only
    pub fn system_manager(&self) -> &SystemManager {
        &self.systems
    }

    /// Run `initialize` on every system in registration order
    pub fn initialize_systems(&mut self) {
        let handles: Vec<SystemHandle> = self.systems.handles().collect();
        for handle in handles {
            if let Some(mut system) = self.systems.take(handle) {
                system.initialize(self);
                self.systems.restore(handle, system);
            }
        }
    }

    /// Update the world: run every system once, in registration order
    pub fn update(&mut self, delta_time: f32) {
        let handles: Vec<SystemHandle> = self.systems.handles().collect();
        for handle in handles {
            let Some(mut system) = self.systems.take(handle) else {
                continue;
            };
            let entities: Vec<Entity> = self
                .systems
                .entities_of(handle)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            system.update(self, &entities, delta_time);
            self.systems.restore(handle, system);
        }
    }

    /// Run `shutdown` on every system in reverse registration order
    pub fn shutdown_systems(&mut self) {
        let handles: Vec<SystemHandle> = self.systems.handles().collect();
        for handle in handles.into_iter().rev() {
            if let Some(mut system) = self.systems.take(handle) {
                system.shutdown(self);
                self.systems.restore(handle, system);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::system::System;

    #[derive(Debug, Clone, PartialEq)]
    struct Position(f32);

    impl Component for Position {
        const TYPE_NAME: &'static str = "test::Position";
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity(f32);

    impl Component for Velocity {
        const TYPE_NAME: &'static str = "test::Velocity";
    }

    #[derive(Default)]
    struct Integrate {
        ticks: u32,
    }

    impl System for Integrate {
        fn update(&mut self, world: &mut World, entities: &[Entity], delta_time: f32) {
            self.ticks += 1;
            for &entity in entities {
                let v = world.get_component::<Velocity>(entity).map_or(0.0, |v| v.0);
                if let Some(p) = world.get_component_mut::<Position>(entity) {
                    p.0 += v * delta_time;
                }
            }
        }
    }

    impl SystemType for Integrate {
        const TYPE_NAME: &'static str = "test::Integrate";

        fn required_signature(world: &World) -> Result<Signature> {
            Ok(Signature::EMPTY
                .with(world.component_type::<Position>()?)
                .with(world.component_type::<Velocity>()?))
        }
    }

    #[derive(Default)]
    struct Census;

    impl System for Census {
        fn update(&mut self, _world: &mut World, _entities: &[Entity], _delta_time: f32) {}
    }

    impl SystemType for Census {
        const TYPE_NAME: &'static str = "test::Census";

        fn required_signature(_world: &World) -> Result<Signature> {
            Ok(Signature::EMPTY)
        }
    }

    fn world() -> World {
        let mut world = World::with_config(&WorldConfig { max_entities: 16 });
        world.register_component::<Position>().unwrap();
        world.register_component::<Velocity>().unwrap();
        world
    }

    #[test]
    fn test_signature_tracks_components() {
        let mut world = world();
        let e = world.create_entity().unwrap();
        world.add_component(e, Position(1.0)).unwrap();
        assert_eq!(world.signature(e).unwrap(), Signature::EMPTY.with(0));

        world.add_component(e, Velocity(2.0)).unwrap();
        let removed = world.remove_component::<Position>(e).unwrap();
        assert_eq!(removed, Position(1.0));
        assert_eq!(world.signature(e).unwrap(), Signature::EMPTY.with(1));
        assert!(!world.has_component::<Position>(e));
    }

    #[test]
    fn test_duplicate_add_leaves_state_untouched() {
        let mut world = world();
        let e = world.create_entity().unwrap();
        world.add_component(e, Position(1.0)).unwrap();
        assert!(world.add_component(e, Position(5.0)).is_err());
        assert_eq!(world.get_component::<Position>(e), Some(&Position(1.0)));
    }

    #[test]
    fn test_system_runs_on_matching_entities() {
        let mut world = world();
        world.add_system(Integrate::default()).unwrap();

        let moving = world.create_entity().unwrap();
        world.add_component(moving, Position(0.0)).unwrap();
        world.add_component(moving, Velocity(2.0)).unwrap();

        let still = world.create_entity().unwrap();
        world.add_component(still, Position(0.0)).unwrap();

        world.update(0.5);
        assert_eq!(world.get_component::<Position>(moving), Some(&Position(1.0)));
        assert_eq!(world.get_component::<Position>(still), Some(&Position(0.0)));
        assert_eq!(world.system::<Integrate>().unwrap().ticks, 1);
    }

    #[test]
    fn test_late_signature_rebuilds_membership() {
        let mut world = world();
        let e = world.create_entity().unwrap();
        world.add_component(e, Position(0.0)).unwrap();
        world.add_component(e, Velocity(0.0)).unwrap();

        world.register_system(Integrate::default()).unwrap();
        let mask = Integrate::required_signature(&world).unwrap();
        world.set_system_signature::<Integrate>(mask).unwrap();
        assert!(world.system_entities::<Integrate>().unwrap().contains(&e));
    }

    #[test]
    fn test_destroy_clears_everything() {
        let mut world = world();
        world.add_system(Integrate::default()).unwrap();
        let e = world.create_entity().unwrap();
        world.add_component(e, Position(0.0)).unwrap();
        world.add_component(e, Velocity(0.0)).unwrap();

        world.destroy_entity(e).unwrap();
        assert!(!world.component_store().holds_entity(e));
        assert!(world.system_entities::<Integrate>().unwrap().is_empty());
        assert!(world.entity_manager().is_available(e));
        assert_eq!(world.destroy_entity(e), Err(EcsError::InvalidEntity(e)));
    }

    #[test]
    fn test_empty_mask_tracks_every_living_entity() {
        let mut world = world();
        let before = world.create_entity().unwrap();
        world.add_system(Census).unwrap();
        let fresh = world.create_entity().unwrap();
        let tagged = world.create_entity().unwrap();
        world.add_component(tagged, Position(0.0)).unwrap();

        let members = world.system_entities::<Census>().unwrap();
        assert_eq!(members.iter().copied().collect::<Vec<_>>(), vec![before, fresh, tagged]);

        world.destroy_entity(fresh).unwrap();
        assert!(!world.system_entities::<Census>().unwrap().contains(&fresh));
    }

    #[test]
    fn test_world_config_from_toml() {
        let config = WorldConfig::from_toml_str("max_entities = 64").unwrap();
        assert_eq!(config.max_entities, 64);
        assert_eq!(WorldConfig::from_toml_str("").unwrap(), WorldConfig::default());
    }
}
