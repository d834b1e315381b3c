//! Systems and the system registry
//!
//! A system declares the components it needs through a required signature.
//! The registry keeps, per system, the set of living entities whose signature
//! contains that mask, and hands the set to `update` every tick.

use super::entity::{Entity, Signature};
use super::error::{fail, EcsError, Result};
use super::world::World;
use std::any::Any;
use std::collections::{BTreeSet, HashMap};

/// Upcast helper so typed system lookups can downcast trait objects
pub trait AsAny: Any {
    /// `self` as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// `self` as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// System trait for processing entities and components
///
/// While a hook runs the system is detached from the world, so it can take
/// `&mut World` freely; looking itself up through the world returns `None`.
pub trait System: AsAny {
    /// Called once before the first update
    fn initialize(&mut self, _world: &mut World) {}

    /// Called once per tick with the entities currently matching the system
    fn update(&mut self, world: &mut World, entities: &[Entity], delta_time: f32);

    /// Called once when the host tears the world down
    fn shutdown(&mut self, _world: &mut World) {}
}

/// Static description of a system type
pub trait SystemType: System + Sized {
    /// Unique, stable name for this system type
    const TYPE_NAME: &'static str;

    /// Components an entity needs to be handed to this system
    fn required_signature(_world: &World) -> Result<Signature> {
        Ok(Signature::EMPTY)
    }
}

/// Index of a registered system, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemHandle(usize);

impl SystemHandle {
    /// Position in registration order
    pub const fn index(self) -> usize {
        self.0
    }
}

struct SystemEntry {
    type_name: &'static str,
    signature: Signature,
    entities: BTreeSet<Entity>,
    system: Option<Box<dyn System>>,
}

/// System registry
#[derive(Default)]
pub struct SystemManager {
    entries: Vec<SystemEntry>,
    by_name: HashMap<&'static str, SystemHandle>,
}

impl SystemManager {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one instance of `S`. Its required signature starts empty.
    pub fn register<S: SystemType>(&mut self, system: S) -> Result<SystemHandle> {
        if self.by_name.contains_key(S::TYPE_NAME) {
            return fail(EcsError::AlreadyRegistered(S::TYPE_NAME));
        }
        let handle = SystemHandle(self.entries.len());
        self.entries.push(SystemEntry {
            type_name: S::TYPE_NAME,
            signature: Signature::EMPTY,
            entities: BTreeSet::new(),
            system: Some(Box::new(system)),
        });
        self.by_name.insert(S::TYPE_NAME, handle);
        log::debug!("Registered system {} at position {}", S::TYPE_NAME, handle.0);
        Ok(handle)
    }

    /// Handle of `S`
    pub fn handle<S: SystemType>(&self) -> Result<SystemHandle> {
        match self.by_name.get(S::TYPE_NAME) {
            Some(&handle) => Ok(handle),
            None => fail(EcsError::NotRegistered(S::TYPE_NAME)),
        }
    }

    /// Record the required signature of `S`.
    ///
    /// The entity set is not touched; the world rebuilds it afterwards.
    pub fn set_signature<S: SystemType>(&mut self, signature: Signature) -> Result<SystemHandle> {
        let handle = self.handle::<S>()?;
        self.entries[handle.0].signature = signature;
        Ok(handle)
    }

    /// Required signature of the system at `handle`
    pub fn signature(&self, handle: SystemHandle) -> Option<Signature> {
        self.entries.get(handle.0).map(|entry| entry.signature)
    }

    /// Re-evaluate membership of `entity` in every system
    pub fn entity_signature_changed(&mut self, entity: Entity, signature: Signature) {
        for entry in &mut self.entries {
            if signature.contains(entry.signature) {
                entry.entities.insert(entity);
            } else {
                entry.entities.remove(&entity);
            }
        }
    }

    /// Drop `entity` from every system's set
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for entry in &mut self.entries {
            entry.entities.remove(&entity);
        }
    }

    /// Replace the entity set at `handle` from a full list of living entities
    pub fn rebuild(&mut self, handle: SystemHandle, living: impl IntoIterator<Item = (Entity, Signature)>) {
        if let Some(entry) = self.entries.get_mut(handle.0) {
            let required = entry.signature;
            entry.entities = living
                .into_iter()
                .filter(|(_, signature)| signature.contains(required))
                .map(|(entity, _)| entity)
                .collect();
        }
    }

    /// Entities currently matching `S`
    pub fn entities<S: SystemType>(&self) -> Result<&BTreeSet<Entity>> {
        let handle = self.handle::<S>()?;
        Ok(&self.entries[handle.0].entities)
    }

    /// Entities currently matching the system at `handle`
    pub fn entities_of(&self, handle: SystemHandle) -> Option<&BTreeSet<Entity>> {
        self.entries.get(handle.0).map(|entry| &entry.entities)
    }

    /// Typed access to the registered `S`
    pub fn get<S: SystemType>(&self) -> Option<&S> {
        let handle = *self.by_name.get(S::TYPE_NAME)?;
        let system: &dyn System = self.entries[handle.0].system.as_deref()?;
        system.as_any().downcast_ref::<S>()
    }

    /// Typed mutable access to the registered `S`
    pub fn get_mut<S: SystemType>(&mut self) -> Option<&mut S> {
        let handle = *self.by_name.get(S::TYPE_NAME)?;
        let system: &mut dyn System = self.entries[handle.0].system.as_deref_mut()?;
        system.as_any_mut().downcast_mut::<S>()
    }

    /// Detach the system at `handle` so it can run against the world
    pub(crate) fn take(&mut self, handle: SystemHandle) -> Option<Box<dyn System>> {
        self.entries.get_mut(handle.0)?.system.take()
    }

    /// Reattach a system taken with [`take`](Self::take)
    pub(crate) fn restore(&mut self, handle: SystemHandle, system: Box<dyn System>) {
        if let Some(entry) = self.entries.get_mut(handle.0) {
            entry.system = Some(system);
        }
    }

    /// Handles in registration order
    pub fn handles(&self) -> impl Iterator<Item = SystemHandle> {
        (0..self.entries.len()).map(SystemHandle)
    }

    /// Number of registered systems
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no system is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(type name, matching entity count)` in registration order
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        self.entries
            .iter()
            .map(|entry| (entry.type_name, entry.entities.len()))
            .collect()
    }
}
