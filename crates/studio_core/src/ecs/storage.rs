//! Dense component storage
//!
//! One [`ComponentArray`] per registered type keeps its components packed in
//! `0..len` with entity→index and index→entity maps. Removal swaps the last
//! element into the hole, so indices are only stable until the next insert or
//! remove on that type; use entity-keyed access.

use super::component::Component;
use super::entity::{ComponentType, Entity, MAX_COMPONENTS};
use super::error::{fail, EcsError, Result};
use std::any::Any;
use std::collections::HashMap;

/// Densely packed array of one component type
#[derive(Debug, Clone)]
pub struct ComponentArray<T: Component> {
    components: Vec<T>,
    index_to_entity: Vec<Entity>,
    entity_to_index: HashMap<Entity, usize>,
}

impl<T: Component> ComponentArray<T> {
    /// Array preallocated for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            components: Vec::with_capacity(capacity),
            index_to_entity: Vec::with_capacity(capacity),
            entity_to_index: HashMap::with_capacity(capacity),
        }
    }

    /// Append a component for `entity`
    pub fn insert(&mut self, entity: Entity, component: T) -> Result<()> {
        if self.entity_to_index.contains_key(&entity) {
            return fail(EcsError::DuplicateComponent {
                entity,
                component: T::TYPE_NAME,
            });
        }
        let index = self.components.len();
        self.components.push(component);
        self.index_to_entity.push(entity);
        self.entity_to_index.insert(entity, index);
        Ok(())
    }

    /// Remove `entity`'s component, moving the last element into its slot
    pub fn remove(&mut self, entity: Entity) -> Result<T> {
        let Some(index) = self.entity_to_index.remove(&entity) else {
            return fail(EcsError::MissingComponent {
                entity,
                component: T::TYPE_NAME,
            });
        };

        let removed = self.components.swap_remove(index);
        self.index_to_entity.swap_remove(index);

        // Re-point the element that was moved into `index`, if any.
        if let Some(&moved) = self.index_to_entity.get(index) {
            self.entity_to_index.insert(moved, index);
        }
        Ok(removed)
    }

    /// Shared access by entity
    pub fn get(&self, entity: Entity) -> Result<&T> {
        match self.entity_to_index.get(&entity) {
            Some(&index) => Ok(&self.components[index]),
            None => Err(EcsError::MissingComponent {
                entity,
                component: T::TYPE_NAME,
            }),
        }
    }

    /// Mutable access by entity
    pub fn get_mut(&mut self, entity: Entity) -> Result<&mut T> {
        match self.entity_to_index.get(&entity) {
            Some(&index) => Ok(&mut self.components[index]),
            None => Err(EcsError::MissingComponent {
                entity,
                component: T::TYPE_NAME,
            }),
        }
    }

    /// Whether `entity` has a component in this array
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Packed component slice, for linear iteration by renderers
    pub fn as_slice(&self) -> &[T] {
        &self.components
    }

    /// Owning entity of each slot, parallel to [`as_slice`](Self::as_slice)
    pub fn entities(&self) -> &[Entity] {
        &self.index_to_entity
    }

    /// Iterate `(entity, component)` in packed order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.index_to_entity.iter().copied().zip(self.components.iter())
    }

    /// Iterate `(entity, component)` mutably in packed order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.index_to_entity.iter().copied().zip(self.components.iter_mut())
    }
}

/// Type-erased view the store uses for destruction notifications
trait ErasedComponentArray: Any + Send + Sync {
    fn entity_destroyed(&mut self, entity: Entity) -> bool;
    fn contains_entity(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedComponentArray for ComponentArray<T> {
    fn entity_destroyed(&mut self, entity: Entity) -> bool {
        if self.contains(entity) {
            let _ = self.remove(entity);
            true
        } else {
            false
        }
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn len(&self) -> usize {
        ComponentArray::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct ComponentSlot {
    component_type: ComponentType,
    type_name: &'static str,
    array: Box<dyn ErasedComponentArray>,
}

/// Component store: one array per registered type, keyed by `TYPE_NAME`
pub struct ComponentStore {
    slots: Vec<ComponentSlot>,
    by_name: HashMap<&'static str, usize>,
    capacity: usize,
}

impl ComponentStore {
    /// Store whose arrays are preallocated for `capacity` entities
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            by_name: HashMap::new(),
            capacity,
        }
    }

    /// Allocate the array for `T` and assign the next bit index
    pub fn register<T: Component>(&mut self) -> Result<ComponentType> {
        if self.by_name.contains_key(T::TYPE_NAME) {
            return fail(EcsError::AlreadyRegistered(T::TYPE_NAME));
        }
        if self.slots.len() >= MAX_COMPONENTS {
            return fail(EcsError::ComponentLimitReached {
                component: T::TYPE_NAME,
                max: MAX_COMPONENTS,
            });
        }

        let component_type = self.slots.len() as ComponentType;
        self.by_name.insert(T::TYPE_NAME, self.slots.len());
        self.slots.push(ComponentSlot {
            component_type,
            type_name: T::TYPE_NAME,
            array: Box::new(ComponentArray::<T>::with_capacity(self.capacity)),
        });
        log::debug!("Registered component {} as bit {}", T::TYPE_NAME, component_type);
        Ok(component_type)
    }

    /// Whether `T` has been registered
    pub fn is_registered<T: Component>(&self) -> bool {
        self.by_name.contains_key(T::TYPE_NAME)
    }

    /// Bit index of `T`
    pub fn type_index<T: Component>(&self) -> Result<ComponentType> {
        self.slot_index::<T>()
            .map(|slot| self.slots[slot].component_type)
    }

    /// Typed array for `T`
    pub fn array<T: Component>(&self) -> Result<&ComponentArray<T>> {
        let slot = self.slot_index::<T>()?;
        self.slots[slot]
            .array
            .as_any()
            .downcast_ref::<ComponentArray<T>>()
            .ok_or(EcsError::NotRegistered(T::TYPE_NAME))
    }

    /// Mutable typed array for `T`
    pub fn array_mut<T: Component>(&mut self) -> Result<&mut ComponentArray<T>> {
        let slot = self.slot_index::<T>()?;
        self.slots[slot]
            .array
            .as_any_mut()
            .downcast_mut::<ComponentArray<T>>()
            .ok_or(EcsError::NotRegistered(T::TYPE_NAME))
    }

    /// Attach `component` to `entity`
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        self.array_mut::<T>()?.insert(entity, component)
    }

    /// Detach and return `entity`'s `T`
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Result<T> {
        self.array_mut::<T>()?.remove(entity)
    }

    /// Shared access to `entity`'s `T`
    pub fn get<T: Component>(&self, entity: Entity) -> Result<&T> {
        self.array::<T>()?.get(entity)
    }

    /// Mutable access to `entity`'s `T`
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        self.array_mut::<T>()?.get_mut(entity)
    }

    /// Whether `entity` has a `T`; false for unregistered types
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.is_registered::<T>() && self.array::<T>().is_ok_and(|array| array.contains(entity))
    }

    /// Drop every component `entity` owns. Absent components are skipped silently.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        let mut removed = 0;
        for slot in &mut self.slots {
            if slot.array.entity_destroyed(entity) {
                removed += 1;
            }
        }
        log::trace!("Entity {entity} destroyed: removed {removed} components");
    }

    /// Whether any array still holds `entity`
    pub fn holds_entity(&self, entity: Entity) -> bool {
        self.slots.iter().any(|slot| slot.array.contains_entity(entity))
    }

    /// Number of registered component types
    pub fn registered_count(&self) -> usize {
        self.slots.len()
    }

    /// `(type name, bit, stored count)` for every registered type, in bit order
    pub fn summary(&self) -> Vec<(&'static str, ComponentType, usize)> {
        self.slots
            .iter()
            .map(|slot| (slot.type_name, slot.component_type, slot.array.len()))
            .collect()
    }

    fn slot_index<T: Component>(&self) -> Result<usize> {
        match self.by_name.get(T::TYPE_NAME) {
            Some(&slot) => Ok(slot),
            None => fail(EcsError::NotRegistered(T::TYPE_NAME)),
        }
    }
}
