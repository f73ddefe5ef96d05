use std::fmt;

use crate::api::config::{ConfigError, EngineConfig};
use crate::api::definition::SceneDefinition;
use crate::api::types::{BodyId, DisplayFacts, SceneEvent, SelectionTarget};
use crate::assets::cache::{TextureCache, TextureHandle};
use crate::assets::catalog::{Catalog, CatalogError};
use crate::assets::preload::{
    AssetPreloader, LabelTable, LoadError, PreloadEvent, PreloadStatus, TextureSource,
};
use crate::core::scene::Scene;
use crate::core::surface::{SurfaceContinuityGuard, SurfaceState};
use crate::core::time::{FixedTimestep, FrameClock};
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::camera::{CameraFollowController, CameraState};
use crate::renderer::instance::{BodyTransform, FrameOutput};
use crate::systems::orbit::{world_positions, OrbitMotionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Waiting for textures; nothing is mounted.
    Preloading,
    /// Scene mounted and simulating.
    Running,
    TornDown,
}

/// Errors that prevent an engine from being built. Nothing fails after construction.
#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    Catalog(CatalogError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Catalog(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Catalog(e) => Some(e),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CatalogError> for EngineError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

/// Coordinator for one engine lifecycle.
///
/// Each fixed step computes every body's next position, then the camera's next
/// pose, and only then applies them, so no controller ever observes another's
/// half-written state.
pub struct SceneEngine {
    config: EngineConfig,
    catalog: Catalog,
    parents: Vec<Option<usize>>,
    phase: EnginePhase,

    clock: FrameClock,
    timestep: FixedTimestep,
    /// Simulation time fed to orbit motion, advanced in fixed steps.
    sim_time: f64,

    textures: TextureCache,
    preloader: AssetPreloader,
    scene: Option<Scene>,
    orbits: Vec<OrbitMotionState>,
    camera: CameraFollowController,
    guard: SurfaceContinuityGuard,

    hovered: Option<BodyId>,
    selection: Option<SelectionTarget>,
    input: InputQueue,
    events: Vec<SceneEvent>,
    frame: Option<FrameOutput>,
    /// Far-field value last published to the host.
    far_field: bool,
}

impl SceneEngine {
    pub fn new(config: EngineConfig, catalog: Catalog, labels: LabelTable) -> Result<Self, EngineError> {
        config.validate()?;
        catalog.validate()?;
        let parents = catalog.parent_indices()?;
        let orbits = catalog
            .bodies
            .iter()
            .map(|b| OrbitMotionState::new(b.speed, b.orbit_radius))
            .collect();

        Ok(Self {
            parents,
            phase: EnginePhase::Preloading,
            clock: FrameClock::new(),
            timestep: FixedTimestep::new(config.fixed_dt),
            sim_time: 0.0,
            textures: TextureCache::new(),
            preloader: AssetPreloader::new(labels, config.settle_delay, config.preload_watchdog),
            scene: None,
            orbits,
            camera: CameraFollowController::new(&config),
            guard: SurfaceContinuityGuard::new(config.remount_delay),
            hovered: None,
            selection: None,
            input: InputQueue::new(),
            events: Vec::with_capacity(config.max_events),
            frame: None,
            far_field: false,
            catalog,
            config,
        })
    }

    /// Build an engine from a scene definition.
    pub fn from_definition(definition: &impl SceneDefinition) -> Result<Self, EngineError> {
        let catalog = definition.catalog();
        let labels = definition.labels(&catalog);
        Self::new(definition.config(), catalog, labels)
    }

    // -- Preloading --

    /// Kick off texture preloading. Call once; the scene mounts when it completes.
    pub fn start_preload(&mut self, source: &mut dyn TextureSource) {
        let requests = self.catalog.asset_requests();
        let now = self.clock.elapsed();
        self.preloader.start(&requests, &mut self.textures, source, now);
        self.forward_preload_events();
    }

    /// A texture fetch succeeded.
    pub fn texture_loaded(&mut self, url: &str, handle: TextureHandle) {
        let now = self.clock.elapsed();
        self.preloader.settle(url, Ok(handle), &mut self.textures, now);
        self.forward_preload_events();
    }

    /// A texture fetch failed. Counted as settled; never fatal.
    pub fn texture_failed(&mut self, url: &str, reason: &str) {
        let now = self.clock.elapsed();
        self.preloader
            .settle(url, Err(LoadError::Failed(reason.to_string())), &mut self.textures, now);
        self.forward_preload_events();
    }

    // -- Surface lifecycle --

    /// The render surface was lost. Returns true: the host must prevent the default handling.
    pub fn surface_lost(&mut self) -> bool {
        self.guard.on_lost(self.clock.elapsed())
    }

    /// The render surface reported itself restored.
    pub fn surface_restored(&mut self) {
        if self.guard.on_restored() && self.phase != EnginePhase::TornDown {
            self.events.push(SceneEvent::SurfaceRestored);
        }
    }

    // -- Input & selection --

    /// Queue an input event for the next tick.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Select a body for the camera to follow. Returns false if the scene is
    /// not mounted or the body does not exist.
    pub fn select(&mut self, id: BodyId) -> bool {
        let Some(scene) = &self.scene else {
            return false;
        };
        let (Some(handle), Some(desc)) = (scene.handle(id), self.catalog.get(id)) else {
            return false;
        };
        let Some(snapshot) = scene.resolve(handle) else {
            return false;
        };
        let target = SelectionTarget {
            handle,
            snapshot,
            facts: DisplayFacts {
                name: desc.name.clone(),
                radius: desc.radius,
                orbit_radius: desc.orbit_radius,
                mass: desc.facts.as_ref().map(|f| f.mass.clone()),
                orbit_period: desc.facts.as_ref().map(|f| f.orbit_period.clone()),
                wiki: desc.wiki.clone(),
            },
        };
        self.selection = Some(target.clone());
        self.events.push(SceneEvent::Selected(Some(target)));
        true
    }

    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.catalog.find(name) {
            Some(id) => self.select(id),
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.events.push(SceneEvent::Selected(None));
        }
    }

    // -- Frame loop --

    /// Advance the engine by one host frame of `dt` seconds.
    /// Returns the latest frame once the scene is mounted.
    pub fn tick(&mut self, dt: f32) -> Option<&FrameOutput> {
        if self.phase == EnginePhase::TornDown {
            return None;
        }
        let now = self.clock.advance(dt as f64);

        self.preloader.poll(&mut self.textures, now);
        self.forward_preload_events();

        if let Some(generation) = self.guard.poll(now) {
            self.remount(generation);
        }

        if self.phase != EnginePhase::Running {
            self.input.drain();
            return None;
        }

        for event in self.input.drain() {
            self.handle_input(event);
        }

        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.sim_time += self.timestep.dt() as f64;
            self.step();
        }
        self.frame.as_ref()
    }

    /// Stop everything. Late callbacks and pending timers become no-ops.
    pub fn teardown(&mut self) {
        self.phase = EnginePhase::TornDown;
        self.preloader.teardown();
        self.guard.teardown();
        self.input.drain();
        self.events.clear();
    }

    /// Drain events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Accessors --

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn status(&self) -> &PreloadStatus {
        self.preloader.status()
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> CameraState {
        self.camera.state()
    }

    pub fn far_field(&self) -> bool {
        self.camera.far_field()
    }

    pub fn selection(&self) -> Option<&SelectionTarget> {
        self.selection.as_ref()
    }

    pub fn hovered(&self) -> Option<BodyId> {
        self.hovered
    }

    /// Remount key the host should use for its render surface.
    pub fn generation(&self) -> u32 {
        self.guard.generation()
    }

    pub fn surface_state(&self) -> SurfaceState {
        self.guard.state()
    }

    pub fn frame(&self) -> Option<&FrameOutput> {
        self.frame.as_ref()
    }

    pub fn orbit(&self, id: BodyId) -> Option<&OrbitMotionState> {
        self.orbits.get(id.index())
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    // -- Internals --

    fn forward_preload_events(&mut self) {
        for event in self.preloader.drain_events() {
            match event {
                PreloadEvent::Status(status) => self.events.push(SceneEvent::Status(status)),
                PreloadEvent::Ready => {
                    self.events.push(SceneEvent::Ready);
                    self.mount();
                }
            }
        }
    }

    fn mount(&mut self) {
        if self.phase != EnginePhase::Preloading {
            return;
        }
        self.scene = Some(Scene::mount(&self.catalog, &self.textures, self.guard.generation()));
        self.phase = EnginePhase::Running;
        let bodies = self.place_bodies(false);
        self.frame = Some(self.build_frame(bodies));
        self.far_field = self.camera.far_field();
        self.events.push(SceneEvent::FarField(self.far_field));
        log::info!("scene mounted with {} bodies", self.catalog.bodies.len());
    }

    fn remount(&mut self, generation: u32) {
        self.events.push(SceneEvent::Remount { generation });
        if self.phase != EnginePhase::Running {
            return;
        }
        if self.hovered.take().is_some() {
            self.events.push(SceneEvent::Hover(None));
        }
        // Orbit and camera state live in the engine and carry over, so motion
        // continues without a jump. Only the scene graph is rebuilt.
        self.scene = Some(Scene::mount(&self.catalog, &self.textures, generation));
        let bodies = self.place_bodies(false);
        self.rebind_selection();
        self.frame = Some(self.build_frame(bodies));
    }

    /// Point the selection at the same body in the freshly mounted scene.
    fn rebind_selection(&mut self) {
        let Some(id) = self.selection.as_ref().map(|s| s.handle.id) else {
            return;
        };
        match self.scene.as_ref().and_then(|scene| scene.handle(id)) {
            Some(handle) => {
                if let Some(selection) = self.selection.as_mut() {
                    selection.handle = handle;
                }
            }
            None => {
                log::debug!("selected body missing after remount; clearing selection");
                self.selection = None;
                self.events.push(SceneEvent::Selected(None));
            }
        }
    }

    fn move_camera(&mut self, state: CameraState) {
        if self.selection.is_some() {
            log::debug!("ignoring free camera move while following a body");
            return;
        }
        self.camera.set_state(state);
        if let Some(frame) = self.frame.as_mut() {
            frame.camera = state;
            frame.far_field = self.camera.far_field();
        }
        self.publish_far_field();
    }

    fn publish_far_field(&mut self) {
        let far_field = self.camera.far_field();
        if far_field != self.far_field {
            self.far_field = far_field;
            self.events.push(SceneEvent::FarField(far_field));
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerOver { body } => {
                if self.catalog.get(body).is_some() && self.hovered != Some(body) {
                    self.hovered = Some(body);
                    self.events.push(SceneEvent::Hover(Some(body)));
                }
            }
            InputEvent::PointerOut { body } => {
                if self.hovered == Some(body) {
                    self.hovered = None;
                    self.events.push(SceneEvent::Hover(None));
                }
            }
            InputEvent::Click { body } => {
                self.select(body);
            }
            InputEvent::SelectByName { name } => {
                self.select_by_name(&name);
            }
            InputEvent::ClearSelection => self.clear_selection(),
            InputEvent::CameraMoved { position, look_target } => {
                self.move_camera(CameraState::new(position, look_target));
            }
        }
    }

    /// One fixed step: motion, then camera, then publish.
    fn step(&mut self) {
        let bodies = self.place_bodies(true);

        let Some(scene) = &self.scene else {
            return;
        };
        let outcome = self.camera.update(self.selection.as_ref(), scene);
        if outcome.target_lost {
            log::debug!("selected body no longer resolves; clearing selection");
            self.selection = None;
            self.events.push(SceneEvent::Selected(None));
        }
        self.publish_far_field();
        self.frame = Some(self.build_frame(bodies));
    }

    /// Compute every body's position for the current sim time and write it to the scene.
    /// With `advance` false the pause state is left untouched.
    fn place_bodies(&mut self, advance: bool) -> Vec<BodyTransform> {
        let now = self.sim_time;
        let hovered = self.hovered;
        let local: Vec<(f32, f32)> = self
            .orbits
            .iter_mut()
            .enumerate()
            .map(|(i, orbit)| {
                if advance {
                    orbit.advance(now, hovered == Some(BodyId(i as u32)))
                } else {
                    orbit.position_at(now)
                }
            })
            .collect();
        let world = world_positions(&local, &self.parents);

        let mut transforms = Vec::with_capacity(world.len());
        for (i, pos) in world.into_iter().enumerate() {
            let radius = self.catalog.bodies[i].radius;
            if let Some(body) = self.scene.as_mut().and_then(|s| s.get_mut(BodyId(i as u32))) {
                body.pos = pos;
            }
            transforms.push(BodyTransform { x: pos.x, y: pos.y, z: pos.z, radius });
        }
        transforms
    }

    fn build_frame(&self, bodies: Vec<BodyTransform>) -> FrameOutput {
        FrameOutput {
            generation: self.scene.as_ref().map_or(0, Scene::generation),
            bodies,
            camera: self.camera.state(),
            far_field: self.camera.far_field(),
        }
    }
}
