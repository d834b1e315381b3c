//! Edit-preview engine
//!
//! Runs one non-destructive edit session at a time. The target keeps its
//! original mesh while a ghost entity shows the edited result; commit swaps
//! the ghost's mesh handle into the target, cancel throws the ghost away.
//!
//! ```text
//!              start_preview        commit_preview
//!   [None] ───────────────▶ [Active] ─────────────▶ [Committed] ──▶ [None]
//!     ▲                        │
//!     │                        │ cancel_preview
//!     └──────── [Cancelled] ◀──┘
//! ```
//!
//! Public entry points return `bool`; the reason for the last failure is kept
//! in [`EditPreviewEngine::last_error`].

use super::error::{PreviewError, Result};
use super::history::{PreviewHistory, DEFAULT_HISTORY_CAPACITY};
use super::operations::{OperationFn, OperationId, OperationKind, OperationRegistry};
use super::params::PreviewParams;
use crate::assets::{Mesh, MeshHandle};
use crate::config::Config;
use crate::ecs::components::{
    LayerMask, MaterialComponent, MeshComponent, NameComponent, RenderableComponent,
    SelectableComponent, TransformComponent,
};
use crate::ecs::systems::compose_world_matrix;
use crate::ecs::{Component, Entity, World};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Edit-preview settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Record every update in the undo ring
    pub history_enabled: bool,
    /// Maximum number of history entries
    pub history_capacity: usize,
    /// Keep the target visible while the ghost is shown
    pub show_original_during_preview: bool,
    /// Appended to the target's name to name the ghost
    pub ghost_name_suffix: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            history_enabled: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            show_original_during_preview: false,
            ghost_name_suffix: " (preview)".to_owned(),
        }
    }
}

impl Config for PreviewConfig {}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// No session
    #[default]
    None,
    /// Ghost shown, parameters may change
    Active,
    /// Ghost mesh moved into the target
    Committed,
    /// Ghost discarded
    Cancelled,
}

/// Data of the active session
#[derive(Debug, Clone)]
pub struct PreviewSession {
    /// Entity being edited
    pub target: Entity,
    /// Transient entity showing the result
    pub ghost: Entity,
    /// Operation applied to the original mesh
    pub operation: OperationId,
    /// Parameters of the mesh currently on the ghost
    pub params: PreviewParams,
    /// Target's mesh when the session started
    pub original_mesh: MeshHandle,
    /// Target's transform when the session started
    pub original_transform: Option<TransformComponent>,
    /// Target's visibility before it was hidden, if the engine hid it
    pub original_visible: Option<bool>,
    /// Further entities the committed parameters are applied to
    pub batch: Vec<Entity>,
    /// When the session started
    pub started_at: Instant,
}

type StartedCallback = Box<dyn Fn(Entity, Entity) + Send + Sync>;
type UpdatedCallback = Box<dyn Fn(Entity, &MeshHandle) + Send + Sync>;
type FinishedCallback = Box<dyn Fn(Entity, bool) + Send + Sync>;

/// Non-destructive edit sessions over entity meshes
pub struct EditPreviewEngine {
    config: PreviewConfig,
    operations: OperationRegistry,
    state: PreviewState,
    last_outcome: Option<PreviewState>,
    session: Option<PreviewSession>,
    history: PreviewHistory,
    last_error: Option<PreviewError>,
    on_started: Option<StartedCallback>,
    on_updated: Option<UpdatedCallback>,
    on_finished: Option<FinishedCallback>,
}

impl EditPreviewEngine {
    /// Engine with default settings and the built-in operations
    pub fn new() -> Self {
        Self::with_config(PreviewConfig::default())
    }

    /// Engine with custom settings
    pub fn with_config(config: PreviewConfig) -> Self {
        let history = PreviewHistory::new(config.history_capacity);
        Self {
            config,
            operations: OperationRegistry::new(),
            state: PreviewState::None,
            last_outcome: None,
            session: None,
            history,
            last_error: None,
            on_started: None,
            on_updated: None,
            on_finished: None,
        }
    }

    /// Active settings
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    // ----- callbacks -----

    /// Called with `(target, ghost)` when a session starts
    pub fn on_preview_started(&mut self, callback: impl Fn(Entity, Entity) + Send + Sync + 'static) {
        self.on_started = Some(Box::new(callback));
    }

    /// Called with `(ghost, mesh)` whenever the ghost's mesh changes after the start
    pub fn on_preview_updated(
        &mut self,
        callback: impl Fn(Entity, &MeshHandle) + Send + Sync + 'static,
    ) {
        self.on_updated = Some(Box::new(callback));
    }

    /// Called with `(target, committed)` when a session ends
    pub fn on_preview_finished(&mut self, callback: impl Fn(Entity, bool) + Send + Sync + 'static) {
        self.on_finished = Some(Box::new(callback));
    }

    // ----- operations -----

    /// Register or replace a custom operation
    pub fn register_custom_operation(&mut self, name: impl Into<String>, operation: OperationFn) {
        self.operations.register_custom(name, operation);
    }

    /// Install the geometry kernel behind a built-in tag
    pub fn install_kernel(&mut self, kind: OperationKind, operation: OperationFn) {
        self.operations.install_kernel(kind, operation);
    }

    /// Operation registry, read-only
    pub fn operations(&self) -> &OperationRegistry {
        &self.operations
    }

    // ----- session control -----

    /// Start previewing `kind` on `entity`. Cancels any active session first.
    pub fn start_preview(
        &mut self,
        world: &mut World,
        entity: Entity,
        kind: OperationKind,
        params: PreviewParams,
    ) -> bool {
        self.start(world, entity, OperationId::Builtin(kind), params, Vec::new())
    }

    /// Start previewing the custom operation registered as `name`
    pub fn start_custom_preview(
        &mut self,
        world: &mut World,
        entity: Entity,
        name: &str,
        params: PreviewParams,
    ) -> bool {
        self.start(world, entity, OperationId::Named(name.to_owned()), params, Vec::new())
    }

    /// Preview `kind` on the first of `entities`; commit applies the final
    /// parameters to the rest
    pub fn start_batch_preview(
        &mut self,
        world: &mut World,
        entities: &[Entity],
        kind: OperationKind,
        params: PreviewParams,
    ) -> bool {
        let Some((&first, rest)) = entities.split_first() else {
            return self.reject(PreviewError::PreconditionFailed {
                entity: Entity::NULL,
                reason: "empty batch",
            });
        };
        self.start(world, first, OperationId::Builtin(kind), params, rest.to_vec())
    }

    /// Re-run the operation on the original mesh with new parameters
    pub fn update_preview(&mut self, world: &mut World, params: PreviewParams) -> bool {
        let Some((ghost, operation, original)) = self
            .session
            .as_ref()
            .map(|session| (session.ghost, session.operation.clone(), session.original_mesh.clone()))
        else {
            return self.reject(PreviewError::NoActiveSession);
        };
        let mesh = self.run_operation(&operation, &original, &params);

        if let Err(err) = Self::replace_ghost_mesh(world, ghost, mesh.clone()) {
            self.abort(world, err);
            return false;
        }
        if let Some(session) = self.session.as_mut() {
            session.params = params.clone();
        }
        if self.config.history_enabled {
            self.history.push(params, mesh.clone());
        }
        log::debug!("Preview updated (history {} entries)", self.history.len());
        self.fire_updated(ghost, &mesh);
        true
    }

    /// Move the ghost's mesh into the target and end the session
    pub fn commit_preview(&mut self, world: &mut World) -> bool {
        let Some(session) = self.session.as_ref() else {
            return self.reject(PreviewError::NoActiveSession);
        };
        let (target, ghost) = (session.target, session.ghost);

        let Some(mesh) = world
            .get_component::<MeshComponent>(ghost)
            .and_then(|component| component.mesh.clone())
        else {
            log::error!("Ghost {ghost} has no mesh at commit, cancelling instead");
            self.abort(world, PreviewError::GhostMeshLost(ghost));
            return false;
        };

        let Some(component) = world.get_component_mut::<MeshComponent>(target) else {
            self.abort(
                world,
                PreviewError::PreconditionFailed {
                    entity: target,
                    reason: "target lost its mesh component during the session",
                },
            );
            return false;
        };
        component.set_mesh(mesh);

        let Some(session) = self.session.take() else {
            return false;
        };
        self.apply_to_batch(world, &session);
        self.teardown(world, &session, false);
        self.finish(PreviewState::Committed, target, true);
        log::info!("Preview committed on {target} ({})", session.operation);
        true
    }

    /// Discard the ghost and end the session
    pub fn cancel_preview(&mut self, world: &mut World) -> bool {
        let Some(session) = self.session.take() else {
            return self.reject(PreviewError::NoActiveSession);
        };
        self.teardown(world, &session, true);
        self.finish(PreviewState::Cancelled, session.target, false);
        log::info!("Preview cancelled on {}", session.target);
        true
    }

    /// Show the previous history entry on the ghost
    pub fn undo_preview(&mut self, world: &mut World) -> bool {
        let Some(ghost) = self.session.as_ref().map(|session| session.ghost) else {
            return self.reject(PreviewError::NoActiveSession);
        };
        let Some(entry) = self.history.undo().cloned() else {
            log::debug!("Nothing to undo");
            return false;
        };
        self.show_history_entry(world, ghost, entry.params, entry.mesh)
    }

    /// Show the next history entry on the ghost
    pub fn redo_preview(&mut self, world: &mut World) -> bool {
        let Some(ghost) = self.session.as_ref().map(|session| session.ghost) else {
            return self.reject(PreviewError::NoActiveSession);
        };
        let Some(entry) = self.history.redo().cloned() else {
            log::debug!("Nothing to redo");
            return false;
        };
        self.show_history_entry(world, ghost, entry.params, entry.mesh)
    }

    // ----- inspection -----

    /// Current state; `Committed`/`Cancelled` are only observable via [`Self::last_outcome`]
    pub fn state(&self) -> PreviewState {
        self.state
    }

    /// Whether a session is active
    pub fn is_active(&self) -> bool {
        self.state == PreviewState::Active
    }

    /// How the last session ended
    pub fn last_outcome(&self) -> Option<PreviewState> {
        self.last_outcome
    }

    /// Active session
    pub fn session(&self) -> Option<&PreviewSession> {
        self.session.as_ref()
    }

    /// Ghost entity of the active session
    pub fn ghost(&self) -> Option<Entity> {
        self.session.as_ref().map(|session| session.ghost)
    }

    /// Most recent failure, cleared when a new session starts
    pub fn last_error(&self) -> Option<&PreviewError> {
        self.last_error.as_ref()
    }

    /// Number of history entries of the active session
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Whether an older history entry exists
    pub fn can_undo(&self) -> bool {
        self.session.is_some() && self.history.can_undo()
    }

    /// Whether a newer history entry exists
    pub fn can_redo(&self) -> bool {
        self.session.is_some() && self.history.can_redo()
    }

    /// History of the active session
    pub fn history(&self) -> &PreviewHistory {
        &self.history
    }

    // ----- internals -----

    fn start(
        &mut self,
        world: &mut World,
        entity: Entity,
        operation: OperationId,
        params: PreviewParams,
        batch: Vec<Entity>,
    ) -> bool {
        if self.session.is_some() {
            log::info!("Starting a new preview, cancelling the active one");
            self.cancel_preview(world);
        }
        self.last_error = None;

        let original_mesh = match Self::check_target(world, entity) {
            Ok(mesh) => mesh,
            Err(err) => return self.reject(err),
        };
        if !self.operations.contains(&operation) {
            return self.reject(PreviewError::UnknownOperation(operation.to_string()));
        }

        let mesh = self.run_operation(&operation, &original_mesh, &params);
        let ghost = match self.spawn_ghost(world, entity, mesh.clone()) {
            Ok(ghost) => ghost,
            Err(err) => return self.reject(err),
        };

        let original_visible = if self.config.show_original_during_preview {
            None
        } else {
            world
                .get_component_mut::<RenderableComponent>(entity)
                .map(|renderable| std::mem::replace(&mut renderable.visible, false))
        };

        self.history = PreviewHistory::new(self.config.history_capacity);
        if self.config.history_enabled {
            self.history.push(params.clone(), mesh);
        }
        log::info!("Preview started on {entity} ({operation}), ghost {ghost}");
        self.session = Some(PreviewSession {
            target: entity,
            ghost,
            operation,
            params,
            original_mesh,
            original_transform: world.get_component::<TransformComponent>(entity).cloned(),
            original_visible,
            batch,
            started_at: Instant::now(),
        });
        self.state = PreviewState::Active;
        if let Some(callback) = &self.on_started {
            callback(entity, ghost);
        }
        true
    }

    fn check_target(world: &World, entity: Entity) -> Result<MeshHandle> {
        if !world.is_valid(entity) {
            return Err(PreviewError::PreconditionFailed {
                entity,
                reason: "entity is not alive",
            });
        }
        let Some(component) = world.get_component::<MeshComponent>(entity) else {
            return Err(PreviewError::PreconditionFailed {
                entity,
                reason: "entity has no mesh component",
            });
        };
        component.mesh.clone().ok_or(PreviewError::PreconditionFailed {
            entity,
            reason: "mesh component holds no mesh",
        })
    }

    /// Apply `operation`; on failure record the diagnostic and fall back to a
    /// copy of the input
    fn run_operation(
        &mut self,
        operation: &OperationId,
        original: &MeshHandle,
        params: &PreviewParams,
    ) -> MeshHandle {
        match self.operations.apply(operation, original, params) {
            Ok(mesh) => MeshHandle::new(mesh),
            Err(err) => {
                log::warn!("{err}; previewing the unchanged mesh");
                self.last_error = Some(err);
                original.deep_copy()
            }
        }
    }

    fn spawn_ghost(&self, world: &mut World, target: Entity, mesh: MeshHandle) -> Result<Entity> {
        let ghost = world.create_entity()?;
        if let Err(err) = self.dress_ghost(world, target, ghost, mesh) {
            log::error!("Failed to build ghost for {target}: {err}");
            if world.is_alive(ghost) {
                world.destroy_entity(ghost)?;
            }
            return Err(err);
        }
        Ok(ghost)
    }

    /// The ghost is a root placed at the target's world matrix, so it lines up
    /// with the target wherever the target sits in the hierarchy. Optional
    /// components are skipped on worlds that never registered them.
    fn dress_ghost(&self, world: &mut World, target: Entity, ghost: Entity, mesh: MeshHandle) -> Result<()> {
        let name = world
            .get_component::<NameComponent>(target)
            .map_or_else(|| format!("{target}"), |name| name.name.clone());
        let transform = compose_world_matrix(world, target)
            .map(|matrix| TransformComponent::from_matrix(&matrix))
            .unwrap_or_default();
        let material = world.get_component::<MaterialComponent>(target).cloned();
        let mut renderable = world
            .get_component::<RenderableComponent>(target)
            .cloned()
            .unwrap_or_default();
        renderable.visible = true;
        renderable.render_mask |= LayerMask::PREVIEW;

        world.add_component(ghost, MeshComponent::new(mesh))?;
        attach_if_registered(world, ghost, transform)?;
        attach_if_registered(world, ghost, NameComponent::new(name + &self.config.ghost_name_suffix))?;
        if let Some(material) = material {
            attach_if_registered(world, ghost, material)?;
        }
        attach_if_registered(world, ghost, renderable)?;
        attach_if_registered(world, ghost, SelectableComponent::locked())?;
        Ok(())
    }

    fn replace_ghost_mesh(world: &mut World, ghost: Entity, mesh: MeshHandle) -> Result<()> {
        match world.get_component_mut::<MeshComponent>(ghost) {
            Some(component) => {
                component.set_mesh(mesh);
                Ok(())
            }
            None => Err(PreviewError::GhostMeshLost(ghost)),
        }
    }

    fn show_history_entry(
        &mut self,
        world: &mut World,
        ghost: Entity,
        params: PreviewParams,
        mesh: MeshHandle,
    ) -> bool {
        if let Err(err) = Self::replace_ghost_mesh(world, ghost, mesh.clone()) {
            self.abort(world, err);
            return false;
        }
        if let Some(session) = self.session.as_mut() {
            session.params = params;
        }
        self.fire_updated(ghost, &mesh);
        true
    }

    fn apply_to_batch(&mut self, world: &mut World, session: &PreviewSession) {
        for &entity in &session.batch {
            let original = match Self::check_target(world, entity) {
                Ok(mesh) => mesh,
                Err(err) => {
                    log::warn!("Skipping batch member: {err}");
                    continue;
                }
            };
            let mesh = self.run_operation(&session.operation, &original, &session.params);
            if let Some(component) = world.get_component_mut::<MeshComponent>(entity) {
                component.set_mesh(mesh);
            }
        }
    }

    /// Destroy the ghost and put the target back the way it was shown
    fn teardown(&mut self, world: &mut World, session: &PreviewSession, restore_transform: bool) {
        if world.is_alive(session.ghost) {
            if let Err(err) = world.destroy_entity(session.ghost) {
                log::warn!("Could not destroy ghost {}: {err}", session.ghost);
            }
        }
        if let Some(visible) = session.original_visible {
            if let Some(renderable) = world.get_component_mut::<RenderableComponent>(session.target) {
                renderable.visible = visible;
            }
        }
        if restore_transform {
            if let (Some(original), Some(transform)) = (
                session.original_transform.as_ref(),
                world.get_component_mut::<TransformComponent>(session.target),
            ) {
                *transform = original.clone();
            }
        }
        self.history.clear();
    }

    fn finish(&mut self, outcome: PreviewState, target: Entity, committed: bool) {
        self.state = outcome;
        self.last_outcome = Some(outcome);
        if let Some(callback) = &self.on_finished {
            callback(target, committed);
        }
        self.state = PreviewState::None;
    }

    /// Recoverable failure inside a session: record it and take the cancel path
    fn abort(&mut self, world: &mut World, err: PreviewError) {
        log::warn!("Preview aborted: {err}");
        self.cancel_preview(world);
        self.last_error = Some(err);
    }

    fn reject(&mut self, err: PreviewError) -> bool {
        log::warn!("Preview request rejected: {err}");
        self.last_error = Some(err);
        false
    }

    fn fire_updated(&self, ghost: Entity, mesh: &MeshHandle) {
        if let Some(callback) = &self.on_updated {
            callback(ghost, mesh);
        }
    }
}

impl Default for EditPreviewEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn attach_if_registered<T: Component>(world: &mut World, entity: Entity, component: T) -> Result<()> {
    if world.is_component_registered::<T>() {
        world.add_component(entity, component)?;
    }
    Ok(())
}

/// Convenience for operations that only need a closure
pub fn operation(
    f: impl Fn(&Mesh, &PreviewParams) -> Result<Mesh> + Send + Sync + 'static,
) -> OperationFn {
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::WorldConfig;
    use crate::scene::{SceneConfig, SceneManager};
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    fn setup() -> (SceneManager, Entity, MeshHandle) {
        let mut scene = SceneManager::with_config(SceneConfig {
            world: WorldConfig { max_entities: 64 },
            ..SceneConfig::default()
        })
        .unwrap();
        let entity = scene.create_object("cube", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let mesh = MeshHandle::new(Mesh::cube());
        scene.set_mesh(entity, mesh.clone()).unwrap();
        (scene, entity, mesh)
    }

    fn factor(value: f32) -> PreviewParams {
        PreviewParams::new().with("factor", value)
    }

    fn mesh_of(world: &World, entity: Entity) -> MeshHandle {
        world
            .component::<MeshComponent>(entity)
            .unwrap()
            .mesh
            .clone()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = PreviewConfig::default();
        assert!(config.history_enabled);
        assert_eq!(config.history_capacity, 50);
        assert!(!config.show_original_during_preview);
        assert_eq!(config.ghost_name_suffix, " (preview)");
    }

    #[test]
    fn test_start_requires_mesh() {
        let (mut scene, _, _) = setup();
        let bare = scene.create_object("empty", Vec3::zeros()).unwrap();
        let mut engine = EditPreviewEngine::new();

        assert!(!engine.start_preview(scene.world_mut(), bare, OperationKind::Scale, factor(2.0)));
        assert_eq!(engine.state(), PreviewState::None);
        assert!(matches!(
            engine.last_error(),
            Some(PreviewError::PreconditionFailed { .. })
        ));

        assert!(!engine.start_preview(
            scene.world_mut(),
            Entity::from_raw(42),
            OperationKind::Scale,
            factor(2.0)
        ));
    }

    #[test]
    fn test_ghost_mirrors_target() {
        let (mut scene, entity, original) = setup();
        let mut engine = EditPreviewEngine::new();
        assert!(engine.start_preview(scene.world_mut(), entity, OperationKind::Scale, factor(2.0)));

        let ghost = engine.ghost().unwrap();
        let world = scene.world();
        assert_eq!(world.component::<NameComponent>(ghost).unwrap().as_str(), "cube (preview)");
        assert_relative_eq!(
            world.component::<TransformComponent>(ghost).unwrap().to_matrix(),
            world.component::<TransformComponent>(entity).unwrap().to_matrix(),
            epsilon = 1e-5
        );
        assert!(!mesh_of(world, ghost).ptr_eq(&original));
        assert!(mesh_of(world, entity).ptr_eq(&original));
        assert!(!world.component::<SelectableComponent>(ghost).unwrap().selectable);
        assert!(world.component::<RenderableComponent>(ghost).unwrap().visible);
        assert!(!world.component::<RenderableComponent>(entity).unwrap().visible);
        assert_eq!(scene.get_entity_by_name("cube"), Some(entity));
    }

    #[test]
    fn test_preview_on_world_with_only_transform_and_mesh() {
        let mut world = World::with_config(&WorldConfig { max_entities: 16 });
        world.register_component::<TransformComponent>().unwrap();
        world.register_component::<MeshComponent>().unwrap();
        let entity = world.create_entity().unwrap();
        world
            .add_component(entity, TransformComponent::from_position(Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        world.add_component(entity, MeshComponent::new(MeshHandle::new(Mesh::cube()))).unwrap();

        let mut engine = EditPreviewEngine::new();
        assert!(engine.start_preview(&mut world, entity, OperationKind::Scale, factor(2.0)));
        assert!(engine.last_error().is_none());

        let ghost = engine.ghost().unwrap();
        assert!(world.has_component::<MeshComponent>(ghost));
        assert_relative_eq!(
            world.component::<TransformComponent>(ghost).unwrap().position,
            Vec3::new(2.0, 0.0, 0.0),
            epsilon = 1e-5
        );

        assert!(engine.commit_preview(&mut world));
        assert!(!world.is_alive(ghost));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_show_original_keeps_target_visible() {
        let (mut scene, entity, _) = setup();
        let mut engine = EditPreviewEngine::with_config(PreviewConfig {
            show_original_during_preview: true,
            ..PreviewConfig::default()
        });
        engine.start_preview(scene.world_mut(), entity, OperationKind::Scale, factor(2.0));
        assert!(scene.world().component::<RenderableComponent>(entity).unwrap().visible);
        assert!(engine.session().unwrap().original_visible.is_none());
    }

    #[test]
    fn test_update_is_idempotent_in_params() {
        let (mut scene, entity, _) = setup();
        let mut engine = EditPreviewEngine::new();
        engine.start_preview(scene.world_mut(), entity, OperationKind::Scale, factor(2.0));
        let ghost = engine.ghost().unwrap();
        let first = mesh_of(scene.world(), ghost);

        assert!(engine.update_preview(scene.world_mut(), factor(2.0)));
        let second = mesh_of(scene.world(), ghost);
        assert!(!first.ptr_eq(&second));
        assert!(first.same_content(&second));
    }

    #[test]
    fn test_missing_kernel_falls_back_to_input() {
        let (mut scene, entity, original) = setup();
        let mut engine = EditPreviewEngine::new();
        assert!(engine.start_preview(
            scene.world_mut(),
            entity,
            OperationKind::Subdivision,
            PreviewParams::new()
        ));
        let ghost_mesh = mesh_of(scene.world(), engine.ghost().unwrap());
        assert!(ghost_mesh.same_content(&original));
        assert!(!ghost_mesh.ptr_eq(&original));
        assert!(matches!(
            engine.last_error(),
            Some(PreviewError::OperationFailed { .. })
        ));
        assert!(engine.is_active());
    }

    #[test]
    fn test_installed_kernel_used() {
        let (mut scene, entity, _) = setup();
        let mut engine = EditPreviewEngine::new();
        engine.install_kernel(
            OperationKind::Decimate,
            operation(|mesh: &Mesh, _: &PreviewParams| {
                let mut out = mesh.clone();
                out.indices.truncate(6);
                Ok(out)
            }),
        );
        engine.start_preview(scene.world_mut(), entity, OperationKind::Decimate, PreviewParams::new());
        assert_eq!(mesh_of(scene.world(), engine.ghost().unwrap()).triangle_count(), 2);
        assert!(engine.last_error().is_none());
    }

    #[test]
    fn test_custom_operation_by_name() {
        let (mut scene, entity, _) = setup();
        let mut engine = EditPreviewEngine::new();
        assert!(!engine.start_custom_preview(scene.world_mut(), entity, "flatten", PreviewParams::new()));
        assert!(matches!(engine.last_error(), Some(PreviewError::UnknownOperation(_))));

        engine.register_custom_operation(
            "flatten",
            operation(|mesh: &Mesh, _: &PreviewParams| {
                let mut out = mesh.clone();
                for vertex in &mut out.vertices {
                    vertex.position[1] = 0.0;
                }
                Ok(out)
            }),
        );
        assert!(engine.start_custom_preview(scene.world_mut(), entity, "flatten", PreviewParams::new()));
        let (min, max) = mesh_of(scene.world(), engine.ghost().unwrap()).bounds().unwrap();
        assert_eq!(min.y, 0.0);
        assert_eq!(max.y, 0.0);
        assert_eq!(
            engine.session().unwrap().operation,
            OperationId::Named("flatten".to_owned())
        );
    }

    #[test]
    fn test_cancel_restores_transform() {
        let (mut scene, entity, _) = setup();
        let mut engine = EditPreviewEngine::new();
        engine.start_preview(scene.world_mut(), entity, OperationKind::Scale, factor(2.0));
        scene
            .world_mut()
            .component_mut::<TransformComponent>(entity)
            .unwrap()
            .position = Vec3::new(9.0, 9.0, 9.0);

        assert!(engine.cancel_preview(scene.world_mut()));
        assert_eq!(
            scene.world().component::<TransformComponent>(entity).unwrap().position,
            Vec3::new(1.0, 0.0, 0.0)
        );
        assert_eq!(engine.last_outcome(), Some(PreviewState::Cancelled));
        assert_eq!(engine.history_len(), 0);
    }

    #[test]
    fn test_commit_without_session_fails() {
        let (mut scene, _, _) = setup();
        let mut engine = EditPreviewEngine::new();
        assert!(!engine.commit_preview(scene.world_mut()));
        assert_eq!(engine.last_error(), Some(&PreviewError::NoActiveSession));
        assert!(!engine.undo_preview(scene.world_mut()));
    }

    #[test]
    fn test_commit_with_lost_ghost_mesh_cancels() {
        let (mut scene, entity, original) = setup();
        let finished = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&finished);
        let mut engine = EditPreviewEngine::new();
        engine.on_preview_finished(move |target, committed| {
            sink.lock().unwrap().push((target, committed));
        });

        engine.start_preview(scene.world_mut(), entity, OperationKind::Scale, factor(2.0));
        let ghost = engine.ghost().unwrap();
        scene.world_mut().remove_component::<MeshComponent>(ghost).unwrap();

        assert!(!engine.commit_preview(scene.world_mut()));
        assert_eq!(engine.state(), PreviewState::None);
        assert_eq!(engine.last_error(), Some(&PreviewError::GhostMeshLost(ghost)));
        assert!(!scene.world().is_alive(ghost));
        assert!(mesh_of(scene.world(), entity).ptr_eq(&original));
        assert!(scene.world().component::<RenderableComponent>(entity).unwrap().visible);
        assert_eq!(*finished.lock().unwrap(), vec![(entity, false)]);
    }

    #[test]
    fn test_batch_commit_applies_to_rest() {
        let (mut scene, first, _) = setup();
        let second = scene.create_object("cube2", Vec3::zeros()).unwrap();
        let second_mesh = MeshHandle::new(Mesh::cube());
        scene.set_mesh(second, second_mesh.clone()).unwrap();

        let mut engine = EditPreviewEngine::new();
        assert!(engine.start_batch_preview(
            scene.world_mut(),
            &[first, second],
            OperationKind::Scale,
            factor(2.0)
        ));
        assert_eq!(engine.session().unwrap().batch, vec![second]);
        engine.update_preview(scene.world_mut(), factor(3.0));
        assert!(engine.commit_preview(scene.world_mut()));

        let (_, max) = mesh_of(scene.world(), second).bounds().unwrap();
        assert_eq!(max, Vec3::new(3.0, 3.0, 3.0));
        assert!(!mesh_of(scene.world(), second).ptr_eq(&second_mesh));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let (mut scene, _, _) = setup();
        let mut engine = EditPreviewEngine::new();
        assert!(!engine.start_batch_preview(scene.world_mut(), &[], OperationKind::Scale, factor(2.0)));
        assert_eq!(engine.state(), PreviewState::None);
    }

    #[test]
    fn test_history_disabled() {
        let (mut scene, entity, _) = setup();
        let mut engine = EditPreviewEngine::with_config(PreviewConfig {
            history_enabled: false,
            ..PreviewConfig::default()
        });
        engine.start_preview(scene.world_mut(), entity, OperationKind::Scale, factor(2.0));
        engine.update_preview(scene.world_mut(), factor(3.0));
        assert_eq!(engine.history_len(), 0);
        assert!(!engine.can_undo());
        assert!(!engine.undo_preview(scene.world_mut()));
    }
}
