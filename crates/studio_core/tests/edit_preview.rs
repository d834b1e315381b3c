//! Integration tests for edit-preview sessions over a scene

use std::sync::{Arc, Mutex};
use studio_core::assets::{Mesh, MeshHandle};
use approx::assert_relative_eq;
use studio_core::ecs::components::{MeshComponent, RenderableComponent, TransformComponent};
use studio_core::ecs::systems::RenderSystem;
use studio_core::ecs::Entity;
use studio_core::foundation::logging;
use studio_core::foundation::math::{Quat, Vec3};
use studio_core::preview::{
    EditPreviewEngine, OperationKind, PreviewConfig, PreviewParams, PreviewState,
};
use studio_core::scene::SceneManager;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Started(Entity, Entity),
    Updated(Entity),
    Finished(Entity, bool),
}

struct Fixture {
    scene: SceneManager,
    target: Entity,
    original: MeshHandle,
    engine: EditPreviewEngine,
    events: Arc<Mutex<Vec<Event>>>,
}

impl Fixture {
    fn new(config: PreviewConfig) -> Self {
        logging::init_for_tests();
        let mut scene = SceneManager::new().unwrap();
        let target = scene.create_object("cube", Vec3::zeros()).unwrap();
        let original = MeshHandle::new(Mesh::cube());
        scene.set_mesh(target, original.clone()).unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let mut engine = EditPreviewEngine::with_config(config);
        let sink = Arc::clone(&events);
        engine.on_preview_started(move |target, ghost| {
            sink.lock().unwrap().push(Event::Started(target, ghost));
        });
        let sink = Arc::clone(&events);
        engine.on_preview_updated(move |ghost, _mesh| {
            sink.lock().unwrap().push(Event::Updated(ghost));
        });
        let sink = Arc::clone(&events);
        engine.on_preview_finished(move |target, committed| {
            sink.lock().unwrap().push(Event::Finished(target, committed));
        });

        Self {
            scene,
            target,
            original,
            engine,
            events,
        }
    }

    fn start(&mut self, factor: f32) -> bool {
        let target = self.target;
        let world = self.scene.world_mut();
        self.engine
            .start_preview(world, target, OperationKind::Scale, scale(factor))
    }

    fn update(&mut self, factor: f32) -> bool {
        let world = self.scene.world_mut();
        self.engine.update_preview(world, scale(factor))
    }

    fn mesh(&self, entity: Entity) -> MeshHandle {
        self.scene
            .world()
            .component::<MeshComponent>(entity)
            .unwrap()
            .mesh
            .clone()
            .unwrap()
    }

    fn visible(&self, entity: Entity) -> bool {
        self.scene
            .world()
            .component::<RenderableComponent>(entity)
            .unwrap()
            .visible
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

fn scale(factor: f32) -> PreviewParams {
    PreviewParams::new().with("factor", factor)
}

fn max_extent(mesh: &MeshHandle) -> f32 {
    mesh.bounds().unwrap().1.x
}

#[test]
fn preview_commit() {
    let mut fx = Fixture::new(PreviewConfig::default());
    assert!(fx.start(2.0));
    let ghost = fx.engine.ghost().unwrap();
    assert!(fx.scene.world().is_alive(ghost));
    assert!(!fx.visible(fx.target));
    assert_eq!(fx.engine.state(), PreviewState::Active);

    assert!(fx.update(3.0));
    assert_eq!(fx.engine.history_len(), 2);
    let last_ghost_mesh = fx.mesh(ghost);
    assert_eq!(max_extent(&last_ghost_mesh), 3.0);

    assert!(fx.engine.commit_preview(fx.scene.world_mut()));
    assert!(fx.mesh(fx.target).ptr_eq(&last_ghost_mesh));
    assert!(!fx.scene.world().is_alive(ghost));
    assert!(fx.visible(fx.target));
    assert!(fx.scene.world().component::<MeshComponent>(fx.target).unwrap().is_dirty);
    assert_eq!(fx.engine.state(), PreviewState::None);
    assert_eq!(fx.engine.last_outcome(), Some(PreviewState::Committed));
    assert_eq!(fx.events().last(), Some(&Event::Finished(fx.target, true)));
}

#[test]
fn preview_cancel() {
    let mut fx = Fixture::new(PreviewConfig::default());
    fx.start(2.0);
    let ghost = fx.engine.ghost().unwrap();
    fx.update(3.0);

    assert!(fx.engine.cancel_preview(fx.scene.world_mut()));
    assert!(fx.mesh(fx.target).ptr_eq(&fx.original));
    assert!(!fx.scene.world().is_alive(ghost));
    assert!(fx.visible(fx.target));
    assert_eq!(
        fx.events(),
        vec![
            Event::Started(fx.target, ghost),
            Event::Updated(ghost),
            Event::Finished(fx.target, false),
        ]
    );
}

#[test]
fn start_then_cancel_keeps_original_handle() {
    let mut fx = Fixture::new(PreviewConfig::default());
    fx.start(5.0);
    fx.engine.cancel_preview(fx.scene.world_mut());
    assert!(fx.mesh(fx.target).ptr_eq(&fx.original));
    assert_eq!(fx.original.ref_count(), 2);
}

#[test]
fn undo_redo_walks_history() {
    let mut fx = Fixture::new(PreviewConfig::default());
    fx.start(1.0);
    let ghost = fx.engine.ghost().unwrap();
    fx.update(2.0);
    fx.update(3.0);
    let p2 = fx.mesh(ghost);
    fx.update(4.0);

    assert!(fx.engine.undo_preview(fx.scene.world_mut()));
    assert!(fx.engine.undo_preview(fx.scene.world_mut()));
    assert!(fx.engine.redo_preview(fx.scene.world_mut()));
    assert!(fx.mesh(ghost).ptr_eq(&p2));
    assert_eq!(fx.engine.session().unwrap().params, scale(3.0));

    fx.update(5.0);
    assert!(!fx.engine.can_redo());
    assert!(!fx.engine.redo_preview(fx.scene.world_mut()));
    assert_eq!(max_extent(&fx.mesh(ghost)), 5.0);
}

#[test]
fn undo_then_redo_is_identity() {
    let mut fx = Fixture::new(PreviewConfig::default());
    fx.start(1.5);
    let ghost = fx.engine.ghost().unwrap();
    fx.update(2.5);
    let before = fx.mesh(ghost);

    fx.engine.undo_preview(fx.scene.world_mut());
    fx.engine.redo_preview(fx.scene.world_mut());
    assert!(fx.mesh(ghost).ptr_eq(&before));
}

#[test]
fn history_evicts_oldest_at_capacity() {
    let mut fx = Fixture::new(PreviewConfig {
        history_capacity: 3,
        ..PreviewConfig::default()
    });
    fx.start(1.0);
    for factor in [2.0, 3.0, 4.0, 5.0] {
        fx.update(factor);
    }
    assert_eq!(fx.engine.history_len(), 3);
    assert!(!fx.engine.can_redo());

    fx.engine.undo_preview(fx.scene.world_mut());
    fx.engine.undo_preview(fx.scene.world_mut());
    assert!(!fx.engine.can_undo());
    let ghost = fx.engine.ghost().unwrap();
    assert_eq!(max_extent(&fx.mesh(ghost)), 3.0);
}

#[test]
fn starting_again_cancels_previous_session() {
    let mut fx = Fixture::new(PreviewConfig::default());
    let other = fx.scene.create_object("other", Vec3::new(4.0, 0.0, 0.0)).unwrap();
    fx.scene.set_mesh(other, MeshHandle::new(Mesh::plane(1.0))).unwrap();

    fx.start(2.0);
    let first_ghost = fx.engine.ghost().unwrap();
    let world = fx.scene.world_mut();
    assert!(fx.engine.start_preview(world, other, OperationKind::Scale, scale(2.0)));
    let second_ghost = fx.engine.ghost().unwrap();

    assert!(!fx.scene.world().is_alive(first_ghost));
    assert_ne!(first_ghost, second_ghost);
    assert!(fx.visible(fx.target));
    assert_eq!(fx.engine.session().unwrap().target, other);

    let events = fx.events();
    let finished: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::Finished(..)))
        .collect();
    let started: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::Started(..)))
        .collect();
    assert_eq!(finished, vec![&Event::Finished(fx.target, false)]);
    assert_eq!(
        started,
        vec![
            &Event::Started(fx.target, first_ghost),
            &Event::Started(other, second_ghost)
        ]
    );
}

#[test]
fn restart_with_same_params_matches_update() {
    let mut fx = Fixture::new(PreviewConfig::default());
    fx.start(2.0);
    let ghost = fx.engine.ghost().unwrap();
    let single = fx.mesh(ghost);
    fx.update(2.0);
    assert!(fx.mesh(ghost).same_content(&single));
}

#[test]
fn ghost_renders_while_target_hidden() {
    let mut fx = Fixture::new(PreviewConfig::default());
    fx.start(2.0);
    let ghost = fx.engine.ghost().unwrap();
    fx.scene.update(0.016);

    let queue = fx
        .scene
        .world()
        .system::<RenderSystem>()
        .unwrap()
        .queue()
        .to_vec();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].entity, ghost);
}

#[test]
fn ghost_of_child_lines_up_with_target_in_world_space() {
    let mut fx = Fixture::new(PreviewConfig {
        show_original_during_preview: true,
        ..PreviewConfig::default()
    });
    let parent = fx.scene.create_object("arm", Vec3::new(10.0, 0.0, 0.0)).unwrap();
    fx.scene.set_parent(parent, fx.target).unwrap();
    {
        let world = fx.scene.world_mut();
        world.component_mut::<TransformComponent>(parent).unwrap().rotation =
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        world.component_mut::<TransformComponent>(fx.target).unwrap().position =
            Vec3::new(1.0, 0.0, 0.0);
    }

    assert!(fx.start(1.0));
    let ghost = fx.engine.ghost().unwrap();
    fx.scene.update(0.016);

    let render = fx.scene.world().system::<RenderSystem>().unwrap();
    let model_of = |entity: Entity| {
        render
            .queue()
            .iter()
            .find(|item| item.entity == entity)
            .map(|item| item.model)
            .unwrap()
    };
    let target_model = model_of(fx.target);
    let ghost_model = model_of(ghost);

    assert_relative_eq!(target_model.m14, 10.0, epsilon = 1e-5);
    assert_relative_eq!(target_model.m34, -1.0, epsilon = 1e-5);
    assert_relative_eq!(ghost_model, target_model, epsilon = 1e-5);
}
