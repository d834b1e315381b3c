//! Entity identifiers, signatures and the entity registry

use super::error::{fail, EcsError, Result};
use std::collections::VecDeque;
use std::fmt;

/// Default number of entity ids in the pool (id 0 is reserved, so one less can be alive)
pub const MAX_ENTITIES: u32 = 5000;

/// Signature width: the maximum number of registered component types
pub const MAX_COMPONENTS: usize = 32;

/// Entity identifier
///
/// Ids are recycled; `Entity::NULL` (id 0) is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Entity {
    id: u32,
}

impl Entity {
    /// Reserved null entity
    pub const NULL: Self = Self { id: 0 };

    /// Wrap a raw id
    pub const fn from_raw(id: u32) -> Self {
        Self { id }
    }

    /// Get the entity ID
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Whether this is the reserved null id
    pub const fn is_null(&self) -> bool {
        self.id == 0
    }

    const fn index(self) -> usize {
        self.id as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Bit index assigned to a component type at registration
pub type ComponentType = u8;

/// Fixed-width component bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(u32);

impl Signature {
    /// No components
    pub const EMPTY: Self = Self(0);

    /// Signature from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builder form of [`Signature::set`]
    #[must_use]
    pub const fn with(self, component: ComponentType) -> Self {
        Self(self.0 | (1 << component))
    }

    /// Set bit `component`
    pub fn set(&mut self, component: ComponentType) {
        self.0 |= 1 << component;
    }

    /// Clear bit `component`
    pub fn reset(&mut self, component: ComponentType) {
        self.0 &= !(1 << component);
    }

    /// Whether bit `component` is set
    pub const fn test(self, component: ComponentType) -> bool {
        self.0 & (1 << component) != 0
    }

    /// Whether every bit of `required` is also set here
    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Whether no bits are set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of set bits
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate the set bit indices in ascending order
    pub fn iter(self) -> impl Iterator<Item = ComponentType> {
        (0..MAX_COMPONENTS as u8).filter(move |&bit| self.test(bit))
    }
}

impl FromIterator<ComponentType> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032b}", self.0)
    }
}

/// Entity registry: allocates ids and stores their signatures.
///
/// Free ids sit in a FIFO queue so a destroyed id is reused as late as
/// possible, which makes stale handles easier to catch.
#[derive(Debug, Clone)]
pub struct EntityManager {
    available: VecDeque<Entity>,
    signatures: Vec<Signature>,
    alive: Vec<bool>,
    living_count: u32,
    max_entities: u32,
}

impl EntityManager {
    /// Registry with `max_entities` ids (ids `1..max_entities` are usable)
    pub fn new(max_entities: u32) -> Self {
        let max_entities = max_entities.max(1);
        Self {
            available: (1..max_entities).map(Entity::from_raw).collect(),
            signatures: vec![Signature::EMPTY; max_entities as usize],
            alive: vec![false; max_entities as usize],
            living_count: 0,
            max_entities,
        }
    }

    /// Take the next free id. Its signature starts empty.
    pub fn create(&mut self) -> Result<Entity> {
        let Some(entity) = self.available.pop_front() else {
            return fail(EcsError::ResourceExhausted {
                max_entities: self.max_entities,
                living: self.living_count,
            });
        };
        self.alive[entity.index()] = true;
        self.signatures[entity.index()] = Signature::EMPTY;
        self.living_count += 1;
        Ok(entity)
    }

    /// Clear the signature and return the id to the back of the pool
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        self.check_alive(entity)?;
        self.signatures[entity.index()] = Signature::EMPTY;
        self.alive[entity.index()] = false;
        self.available.push_back(entity);
        self.living_count -= 1;
        Ok(())
    }

    /// Overwrite an entity's signature
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> Result<()> {
        self.check_alive(entity)?;
        self.signatures[entity.index()] = signature;
        Ok(())
    }

    /// Read an entity's signature
    pub fn signature(&self, entity: Entity) -> Result<Signature> {
        self.check_alive(entity)?;
        Ok(self.signatures[entity.index()])
    }

    /// Non-null, in range, alive and carrying at least one component.
    ///
    /// A freshly created entity with no components is not yet valid.
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.is_alive(entity) && !self.signatures[entity.index()].is_empty()
    }

    /// Non-null, in range and not destroyed
    pub fn is_alive(&self, entity: Entity) -> bool {
        !entity.is_null() && entity.id < self.max_entities && self.alive[entity.index()]
    }

    /// Whether the id currently sits in the free pool
    pub fn is_available(&self, entity: Entity) -> bool {
        self.available.contains(&entity)
    }

    /// Number of entities alive
    pub fn living_count(&self) -> u32 {
        self.living_count
    }

    /// Number of ids left in the pool
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Pool size this registry was created with
    pub fn max_entities(&self) -> u32 {
        self.max_entities
    }

    /// Living entities in ascending id order
    pub fn living_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, &alive)| alive)
            .map(|(id, _)| Entity::from_raw(id as u32))
    }

    /// Living entities paired with their signatures, in ascending id order
    pub fn living_signatures(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.living_entities()
            .map(|entity| (entity, self.signatures[entity.index()]))
    }

    fn check_alive(&self, entity: Entity) -> Result<()> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            fail(EcsError::InvalidEntity(entity))
        }
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new(MAX_ENTITIES)
    }
}
