//! Scene Manager - domain layer over the ECS world
//!
//! The Scene Manager:
//! 1. Registers the core components and systems in a fixed order
//! 2. Creates objects, cameras and lights with their conventional components
//! 3. Finds entities by name
//! 4. Edits the parent/child forest, keeping both sides of every edge in sync

use super::error::{fail, Result, SceneError};
use super::statistics::SceneStatistics;
use crate::assets::MeshHandle;
use crate::config::Config;
use crate::ecs::components::{
    CameraComponent, HierarchyComponent, LightComponent, LightKind, MaterialComponent,
    MeshComponent, NameComponent, RenderableComponent, SelectableComponent, TransformComponent,
    TransformFactory,
};
use crate::ecs::systems::{
    CameraSystem, HierarchySystem, LightingSystem, MeshSystem, RenderSystem, SelectionSystem,
};
use crate::ecs::{EcsError, Entity, World, WorldConfig};
use crate::foundation::math::{utils, Vec3, WORLD_UP};
use serde::{Deserialize, Serialize};

/// Scene Manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Settings of the owned world
    pub world: WorldConfig,

    /// Register the six core systems on construction
    pub register_default_systems: bool,

    /// Aspect ratio given to cameras created by [`SceneManager::create_camera`]
    pub main_camera_aspect: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            register_default_systems: true,
            main_camera_aspect: 16.0 / 9.0,
        }
    }
}

impl Config for SceneConfig {}

/// Owns the world and offers scene-level editing on top of it
pub struct SceneManager {
    world: World,
    config: SceneConfig,
}

impl SceneManager {
    /// Scene with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(SceneConfig::default())
    }

    /// Scene with custom configuration
    pub fn with_config(config: SceneConfig) -> Result<Self> {
        let mut world = World::with_config(&config.world);
        Self::register_core_components(&mut world)?;
        if config.register_default_systems {
            Self::register_core_systems(&mut world)?;
        }
        log::info!(
            "Scene created: {} entity slots, {} systems",
            config.world.max_entities,
            world.system_count()
        );
        Ok(Self { world, config })
    }

    /// Register the nine core component types. Bit indices follow this order.
    pub fn register_core_components(world: &mut World) -> Result<()> {
        world.register_component::<TransformComponent>()?;
        world.register_component::<MeshComponent>()?;
        world.register_component::<MaterialComponent>()?;
        world.register_component::<RenderableComponent>()?;
        world.register_component::<NameComponent>()?;
        world.register_component::<HierarchyComponent>()?;
        world.register_component::<SelectableComponent>()?;
        world.register_component::<CameraComponent>()?;
        world.register_component::<LightComponent>()?;
        Ok(())
    }

    /// Register the core systems. Update order is registration order:
    /// Hierarchy, Mesh, Render, Camera, Selection, Lighting.
    pub fn register_core_systems(world: &mut World) -> Result<()> {
        world.add_system(HierarchySystem::new())?;
        world.add_system(MeshSystem::new())?;
        world.add_system(RenderSystem::new())?;
        world.add_system(CameraSystem::new())?;
        world.add_system(SelectionSystem::new())?;
        world.add_system(LightingSystem::new())?;
        Ok(())
    }

    /// The owned world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The owned world, mutable
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Active configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // ----- factories -----

    /// Entity with a Name and an identity Transform
    pub fn create_entity(&mut self, name: &str) -> Result<Entity> {
        let entity = self.world.create_entity()?;
        self.world.add_component(entity, NameComponent::new(name))?;
        self.world.add_component(entity, TransformComponent::identity())?;
        log::debug!("Created entity {entity} '{name}'");
        Ok(entity)
    }

    /// Selectable, renderable object at `position` with no mesh yet
    pub fn create_object(&mut self, name: &str, position: Vec3) -> Result<Entity> {
        let entity = self.world.create_entity()?;
        self.world.add_component(entity, NameComponent::new(name))?;
        self.world.add_component(entity, TransformComponent::from_position(position))?;
        self.world.add_component(entity, MeshComponent::empty())?;
        self.world.add_component(entity, MaterialComponent::default())?;
        self.world.add_component(entity, RenderableComponent::new())?;
        self.world.add_component(entity, SelectableComponent::new())?;
        self.world.add_component(entity, HierarchyComponent::root())?;
        log::debug!("Created object {entity} '{name}' at {position:?}");
        Ok(entity)
    }

    /// Camera at `position` looking at `target`. The first camera created becomes the main one.
    pub fn create_camera(&mut self, name: &str, position: Vec3, target: Vec3) -> Result<Entity> {
        let is_main = self.world.query::<CameraComponent>().next().is_none();
        let camera = CameraComponent {
            aspect: self.config.main_camera_aspect,
            is_main,
            ..CameraComponent::default()
        };

        let entity = self.world.create_entity()?;
        self.world.add_component(entity, NameComponent::new(name))?;
        self.world
            .add_component(entity, TransformFactory::look_at(position, target, Vec3::from(WORLD_UP)))?;
        self.world.add_component(entity, camera)?;
        self.world.add_component(entity, HierarchyComponent::root())?;
        log::debug!("Created camera {entity} '{name}' (main: {is_main})");
        Ok(entity)
    }

    /// Light of `kind` at `position`
    pub fn create_light(
        &mut self,
        name: &str,
        kind: LightKind,
        position: Vec3,
        color: Vec3,
        intensity: f32,
    ) -> Result<Entity> {
        let entity = self.world.create_entity()?;
        self.world.add_component(entity, NameComponent::new(name))?;
        self.world.add_component(entity, TransformComponent::from_position(position))?;
        self.world.add_component(entity, LightComponent::new(kind, color, intensity))?;
        self.world.add_component(entity, HierarchyComponent::root())?;
        log::debug!("Created {kind:?} light {entity} '{name}'");
        Ok(entity)
    }

    // ----- names -----

    /// Lowest-id entity named `name`
    pub fn get_entity_by_name(&self, name: &str) -> Option<Entity> {
        self.world
            .query::<NameComponent>()
            .filter(|(_, component)| component.as_str() == name)
            .map(|(entity, _)| entity)
            .min()
    }

    /// Every entity named `name`, in ascending id order
    pub fn get_entities_by_name(&self, name: &str) -> Vec<Entity> {
        let mut matches: Vec<Entity> = self
            .world
            .query::<NameComponent>()
            .filter(|(_, component)| component.as_str() == name)
            .map(|(entity, _)| entity)
            .collect();
        matches.sort_unstable();
        matches
    }

    /// Rename `entity`, attaching a Name if it has none
    pub fn set_name(&mut self, entity: Entity, name: &str) -> Result<()> {
        match self.world.get_component_mut::<NameComponent>(entity) {
            Some(component) => component.name = name.to_owned(),
            None => self.world.add_component(entity, NameComponent::new(name))?,
        }
        Ok(())
    }

    /// Name of `entity`
    pub fn name_of(&self, entity: Entity) -> Option<&str> {
        self.world
            .get_component::<NameComponent>(entity)
            .map(NameComponent::as_str)
    }

    // ----- hierarchy -----

    /// Make `child` a child of `parent`, detaching it from any previous parent first
    pub fn set_parent(&mut self, parent: Entity, child: Entity) -> Result<()> {
        self.ensure_alive(parent)?;
        self.ensure_alive(child)?;
        if parent == child {
            return fail(SceneError::SelfParent(child));
        }
        if self.is_ancestor(child, parent) {
            return fail(SceneError::HierarchyCycle { parent, child });
        }

        self.ensure_hierarchy(parent)?;
        self.ensure_hierarchy(child)?;

        if let Some(previous) = self.get_parent(child) {
            if let Some(node) = self.world.get_component_mut::<HierarchyComponent>(previous) {
                node.remove_child(child);
            }
        }
        self.world.component_mut::<HierarchyComponent>(child)?.parent = parent;
        self.world.component_mut::<HierarchyComponent>(parent)?.add_child(child);
        log::trace!("Parented {child} under {parent}");
        Ok(())
    }

    /// Detach `child` from its parent; roots are left untouched
    pub fn remove_parent(&mut self, child: Entity) -> Result<()> {
        self.ensure_alive(child)?;
        let Some(node) = self.world.get_component_mut::<HierarchyComponent>(child) else {
            return fail(SceneError::NoHierarchy(child));
        };
        let previous = std::mem::replace(&mut node.parent, Entity::NULL);
        if !previous.is_null() {
            if let Some(parent) = self.world.get_component_mut::<HierarchyComponent>(previous) {
                parent.remove_child(child);
            }
        }
        Ok(())
    }

    /// Parent of `entity`, if it has one
    pub fn get_parent(&self, entity: Entity) -> Option<Entity> {
        self.world
            .get_component::<HierarchyComponent>(entity)
            .and_then(HierarchyComponent::parent)
    }

    /// Children of `entity` in attachment order
    pub fn get_children(&self, entity: Entity) -> Vec<Entity> {
        self.world
            .get_component::<HierarchyComponent>(entity)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Whether `ancestor` appears on the parent chain of `entity` (or is `entity`)
    pub fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let mut current = Some(entity);
        let mut steps = 0;
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            // A corrupted chain longer than the pool cannot be a forest.
            steps += 1;
            if steps > self.world.entity_count() {
                log::error!("Parent chain of {entity} does not terminate");
                return true;
            }
            current = self.get_parent(node);
        }
        false
    }

    // ----- lifecycle -----

    /// Destroy `entity`: detach it from its parent, orphan its children, release the id
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        self.ensure_alive(entity)?;
        if self.world.has_component::<HierarchyComponent>(entity) {
            self.remove_parent(entity)?;
            for child in self.get_children(entity) {
                if let Some(node) = self.world.get_component_mut::<HierarchyComponent>(child) {
                    node.parent = Entity::NULL;
                }
            }
        }
        self.world.destroy_entity(entity)?;
        log::debug!("Destroyed entity {entity}");
        Ok(())
    }

    /// Destroy `entity` and all its descendants; returns how many were destroyed
    pub fn destroy_recursive(&mut self, entity: Entity) -> Result<usize> {
        self.ensure_alive(entity)?;
        let mut subtree = Vec::new();
        let mut stack = vec![entity];
        while let Some(node) = stack.pop() {
            if subtree.contains(&node) {
                continue;
            }
            subtree.push(node);
            stack.extend(self.get_children(node));
        }
        // Leaves first, so every destroy sees a consistent parent.
        for &node in subtree.iter().rev() {
            self.destroy_entity(node)?;
        }
        Ok(subtree.len())
    }

    // ----- components -----

    /// Attach `mesh` to `entity`, marking it for upload
    pub fn set_mesh(&mut self, entity: Entity, mesh: MeshHandle) -> Result<()> {
        match self.world.get_component_mut::<MeshComponent>(entity) {
            Some(component) => component.set_mesh(mesh),
            None => self.world.add_component(entity, MeshComponent::new(mesh))?,
        }
        Ok(())
    }

    /// Rotate `entity` so its -Z axis faces `target`, with +Y as up
    pub fn look_at(&mut self, entity: Entity, target: Vec3) -> Result<()> {
        let transform = self.world.component_mut::<TransformComponent>(entity)?;
        match utils::look_rotation(transform.position, target, Vec3::from(WORLD_UP)) {
            Some(rotation) => transform.rotation = rotation,
            None => log::warn!("look_at: {entity} already at {target:?} or looking straight up"),
        }
        Ok(())
    }

    // ----- ticking -----

    /// Run `initialize` on all systems
    pub fn initialize(&mut self) {
        self.world.initialize_systems();
    }

    /// Advance the scene by one tick
    pub fn update(&mut self, delta_time: f32) {
        self.world.update(delta_time);
    }

    /// Run `shutdown` on all systems
    pub fn shutdown(&mut self) {
        self.world.shutdown_systems();
    }

    /// Snapshot of entity and system counts
    pub fn statistics(&self) -> SceneStatistics {
        SceneStatistics {
            entity_count: self.world.entity_count(),
            max_entities: self.world.entity_manager().max_entities(),
            component_types: self.world.component_store().registered_count(),
            system_count: self.world.system_count(),
            named_entities: self.world.query::<NameComponent>().count(),
            root_entities: self
                .world
                .query::<HierarchyComponent>()
                .filter(|(_, node)| node.is_root())
                .count(),
            systems: self.world.system_manager().summary(),
        }
    }

    fn ensure_alive(&self, entity: Entity) -> Result<()> {
        if self.world.is_alive(entity) {
            Ok(())
        } else {
            fail(SceneError::Ecs(EcsError::InvalidEntity(entity)))
        }
    }

    fn ensure_hierarchy(&mut self, entity: Entity) -> Result<()> {
        if !self.world.has_component::<HierarchyComponent>(entity) {
            self.world.add_component(entity, HierarchyComponent::root())?;
        }
        Ok(())
    }
}
