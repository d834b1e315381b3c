//! Studio demo
//!
//! Builds a small scene, runs a scale preview through start, update, undo and
//! commit, and logs what the render and lighting systems see each step.
//!
//! Usage: `studio_demo [scene.toml|scene.ron] [preview.toml|preview.ron]`

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use studio_core::foundation::logging;
use studio_core::prelude::*;

const FRAME_TIME: f32 = 1.0 / 60.0;

struct StudioDemoApp {
    scene: SceneManager,
    engine: EditPreviewEngine,
    updates_seen: Arc<AtomicUsize>,
}

impl StudioDemoApp {
    fn new(scene_config: SceneConfig, preview_config: PreviewConfig) -> Result<Self, Box<dyn Error>> {
        let scene = SceneManager::with_config(scene_config)?;
        let mut engine = EditPreviewEngine::with_config(preview_config);

        let updates_seen = Arc::new(AtomicUsize::new(0));
        engine.on_preview_started(|target, ghost| {
            log::info!("Preview started on {target}, ghost {ghost}");
        });
        let counter = Arc::clone(&updates_seen);
        engine.on_preview_updated(move |ghost, mesh| {
            counter.fetch_add(1, Ordering::Relaxed);
            log::info!("Ghost {ghost} now has {} vertices", mesh.vertex_count());
        });
        engine.on_preview_finished(|target, committed| {
            log::info!("Preview on {target} finished (committed: {committed})");
        });

        Ok(Self { scene, engine, updates_seen })
    }

    fn build_scene(&mut self) -> Result<Entity, Box<dyn Error>> {
        log::info!("Building demo scene...");

        let cube = self.scene.create_object("cube", Vec3::new(0.0, 0.0, 0.0))?;
        self.scene.set_mesh(cube, MeshHandle::new(Mesh::cube()))?;

        let floor = self.scene.create_object("floor", Vec3::new(0.0, -1.0, 0.0))?;
        self.scene.set_mesh(floor, MeshHandle::new(Mesh::plane(10.0)))?;

        let pivot = self.scene.create_entity("pivot")?;
        self.scene.set_parent(pivot, cube)?;

        self.scene.create_camera("main camera", Vec3::new(4.0, 3.0, 6.0), Vec3::zeros())?;
        self.scene.create_light(
            "sun",
            LightKind::Directional,
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(1.0, 0.95, 0.9),
            1.2,
        )?;
        self.scene.create_light(
            "fill",
            LightKind::Point,
            Vec3::new(-3.0, 2.0, 2.0),
            Vec3::new(0.6, 0.7, 1.0),
            0.8,
        )?;

        self.scene.initialize();
        self.step();
        Ok(cube)
    }

    fn step(&mut self) {
        self.scene.update(FRAME_TIME);

        let world = self.scene.world();
        if let Some(render) = world.system::<RenderSystem>() {
            log::info!(
                "Render queue: {} items ({} hidden)",
                render.queue().len(),
                render.skipped_hidden()
            );
        }
        if let Some(lighting) = world.system::<LightingSystem>() {
            log::info!("Active lights: {}", lighting.environment().light_count());
        }
    }

    fn run_preview(&mut self, cube: Entity) -> Result<(), Box<dyn Error>> {
        let scale = |factor: f32| PreviewParams::new().with("factor", factor);

        if !self.engine.start_preview(self.scene.world_mut(), cube, OperationKind::Scale, scale(1.5)) {
            return Err(describe(self.engine.last_error()).into());
        }
        self.step();

        for factor in [2.0, 2.5] {
            self.engine.update_preview(self.scene.world_mut(), scale(factor));
            self.step();
        }
        log::info!(
            "History holds {} entries (undo: {}, redo: {})",
            self.engine.history_len(),
            self.engine.can_undo(),
            self.engine.can_redo()
        );

        self.engine.undo_preview(self.scene.world_mut());
        self.step();

        if !self.engine.commit_preview(self.scene.world_mut()) {
            return Err(describe(self.engine.last_error()).into());
        }
        self.step();

        if let Some(bounds) = self
            .scene
            .world()
            .get_component::<MeshComponent>(cube)
            .and_then(|component| component.mesh.as_ref())
            .and_then(|mesh| mesh.bounds())
        {
            log::info!("Committed cube bounds: {:?} .. {:?}", bounds.0, bounds.1);
        }
        log::info!("Ghost mesh updates observed: {}", self.updates_seen.load(Ordering::Relaxed));
        Ok(())
    }
}

fn describe(error: Option<&PreviewError>) -> String {
    error.map_or_else(|| "preview rejected".to_owned(), ToString::to_string)
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    log::info!("Starting studio demo");

    let mut args = std::env::args().skip(1);
    let scene_config = match args.next() {
        Some(path) => {
            log::info!("Loading scene config from {path}");
            SceneConfig::load_from_file(&path)?
        }
        None => SceneConfig::default(),
    };
    let preview_config = match args.next() {
        Some(path) => {
            log::info!("Loading preview config from {path}");
            PreviewConfig::load_from_file(&path)?
        }
        None => PreviewConfig::default(),
    };

    let mut app = StudioDemoApp::new(scene_config, preview_config)?;
    let cube = app.build_scene()?;
    app.run_preview(cube)?;

    log::info!("\n{}", app.scene.statistics());
    app.scene.shutdown();
    log::info!("Studio demo finished");
    Ok(())
}
