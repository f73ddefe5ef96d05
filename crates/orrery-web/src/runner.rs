use std::marker::PhantomData;

use glam::Vec3;
use orrery_engine::{
    BodyId, EngineError, FrameBuffer, FrameLayout, InputEvent, SceneDefinition, SceneEngine,
    SceneEvent, TextureHandle, TextureSource,
};

/// Collects fetch requests from the engine until the host picks them up.
#[derive(Debug, Default)]
pub struct PendingFetches {
    urls: Vec<String>,
}

impl PendingFetches {
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.urls)
    }
}

impl TextureSource for PendingFetches {
    fn fetch(&mut self, url: &str) {
        self.urls.push(url.to_string());
    }
}

/// Generic scene runner that wires the engine to the browser host.
///
/// Each concrete scene (e.g., `solar-system`) creates a `thread_local!` SceneRunner
/// and exports free functions via `#[wasm_bindgen]`, because wasm-bindgen
/// cannot export generic structs directly.
pub struct SceneRunner<D: SceneDefinition> {
    engine: SceneEngine,
    fetches: PendingFetches,
    frame_buffer: FrameBuffer,
    started: bool,
    _scene: PhantomData<D>,
}

impl<D: SceneDefinition> SceneRunner<D> {
    pub fn new(definition: D) -> Result<Self, EngineError> {
        let engine = SceneEngine::from_definition(&definition)?;
        let layout = FrameLayout::new(engine.catalog().bodies.len());
        Ok(Self {
            engine,
            fetches: PendingFetches::default(),
            frame_buffer: FrameBuffer::new(layout),
            started: false,
            _scene: PhantomData,
        })
    }

    /// Begin preloading. Requested URLs become available through [`Self::take_fetches`].
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.engine.start_preload(&mut self.fetches);
        self.write_progress();
    }

    /// Run one host frame and repack the frame buffer.
    pub fn tick(&mut self, dt: f32) {
        if let Some(frame) = self.engine.tick(dt) {
            self.frame_buffer.write_frame(frame);
        }
        self.write_progress();
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.engine.push_input(event);
    }

    pub fn pointer_over(&mut self, body: u32) {
        self.push_input(InputEvent::PointerOver { body: BodyId(body) });
    }

    pub fn pointer_out(&mut self, body: u32) {
        self.push_input(InputEvent::PointerOut { body: BodyId(body) });
    }

    pub fn click(&mut self, body: u32) {
        self.push_input(InputEvent::Click { body: BodyId(body) });
    }

    pub fn select_by_name(&mut self, name: &str) {
        self.push_input(InputEvent::SelectByName { name: name.to_string() });
    }

    pub fn clear_selection(&mut self) {
        self.push_input(InputEvent::ClearSelection);
    }

    /// Pose reported by the host's free camera controls.
    pub fn camera_moved(&mut self, position: [f32; 3], look_target: [f32; 3]) {
        self.push_input(InputEvent::CameraMoved {
            position: Vec3::from_array(position),
            look_target: Vec3::from_array(look_target),
        });
    }

    pub fn take_fetches(&mut self) -> Vec<String> {
        self.fetches.take()
    }

    pub fn texture_loaded(&mut self, url: &str, handle: u32) {
        self.engine.texture_loaded(url, TextureHandle(handle));
        self.write_progress();
    }

    pub fn texture_failed(&mut self, url: &str, reason: &str) {
        log::warn!("texture {url} failed to load: {reason}");
        self.engine.texture_failed(url, reason);
        self.write_progress();
    }

    pub fn surface_lost(&mut self) -> bool {
        self.engine.surface_lost()
    }

    pub fn surface_restored(&mut self) {
        self.engine.surface_restored();
    }

    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        self.engine.drain_events()
    }

    /// Drain pending events as a JSON array.
    pub fn take_events_json(&mut self) -> String {
        let events = self.take_events();
        match serde_json::to_string(&events) {
            Ok(json) => json,
            Err(e) => {
                log::error!("failed to encode {} scene event(s): {e}", events.len());
                "[]".to_string()
            }
        }
    }

    pub fn teardown(&mut self) {
        self.engine.teardown();
    }

    fn write_progress(&mut self) {
        let status = self.engine.status();
        self.frame_buffer.write_progress(status.loaded, status.total);
    }

    // ---- Accessors read by the host ----

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame_buffer.as_ptr()
    }

    pub fn frame_slice(&self) -> &[f32] {
        self.frame_buffer.as_slice()
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.frame_buffer.layout().buffer_total_floats as u32
    }

    pub fn max_bodies(&self) -> u32 {
        self.frame_buffer.layout().max_bodies as u32
    }

    pub fn generation(&self) -> u32 {
        self.engine.generation()
    }

    pub fn status_message(&self) -> String {
        self.engine.status().message.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.engine.scene().is_some()
    }
}
