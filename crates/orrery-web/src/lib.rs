pub mod runner;

pub use runner::{PendingFetches, SceneRunner};

/// Generate all `#[wasm_bindgen]` exports for a scene.
///
/// Generates:
/// - `thread_local!` storage for the SceneRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (scene_init, scene_tick, input handlers, preload
///   callbacks, surface lifecycle, data accessors)
///
/// Calls made before `scene_init()` succeeds are ignored and return defaults.
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod bodies;
/// use bodies::SolarSystem;
///
/// orrery_web::export_scene!(SolarSystem, "solar-system");
/// ```
///
/// # Arguments
///
/// - `$scene_type`: The scene struct type that implements `orrery_engine::SceneDefinition`
///   and has a `new()` constructor
/// - `$scene_name`: A string literal used in log messages
#[macro_export]
macro_rules! export_scene {
    ($scene_type:ty, $scene_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::SceneRunner<$scene_type>>> = RefCell::new(None);
        }

        fn with_runner<R: Default>(f: impl FnOnce(&mut $crate::SceneRunner<$scene_type>) -> R) -> R {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => f(runner),
                None => {
                    log::warn!("{}: called before scene_init()", $scene_name);
                    R::default()
                }
            })
        }

        /// Build the engine and start preloading. Returns false if the scene
        /// definition is invalid.
        #[wasm_bindgen]
        pub fn scene_init() -> bool {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let runner = match $crate::SceneRunner::new(<$scene_type>::new()) {
                Ok(runner) => runner,
                Err(e) => {
                    log::error!("{}: {}", $scene_name, e);
                    return false;
                }
            };
            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.start());
            log::info!("{}: initialized", $scene_name);
            true
        }

        #[wasm_bindgen]
        pub fn scene_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn scene_teardown() {
            with_runner(|r| r.teardown());
            RUNNER.with(|cell| {
                *cell.borrow_mut() = None;
            });
        }

        // ---- Input ----

        #[wasm_bindgen]
        pub fn scene_pointer_over(body: u32) {
            with_runner(|r| r.pointer_over(body));
        }

        #[wasm_bindgen]
        pub fn scene_pointer_out(body: u32) {
            with_runner(|r| r.pointer_out(body));
        }

        #[wasm_bindgen]
        pub fn scene_click(body: u32) {
            with_runner(|r| r.click(body));
        }

        #[wasm_bindgen]
        pub fn scene_select_by_name(name: &str) {
            with_runner(|r| r.select_by_name(name));
        }

        #[wasm_bindgen]
        pub fn scene_clear_selection() {
            with_runner(|r| r.clear_selection());
        }

        /// Free camera pose from the host's orbit controls.
        #[wasm_bindgen]
        pub fn scene_camera_moved(x: f32, y: f32, z: f32, tx: f32, ty: f32, tz: f32) {
            with_runner(|r| r.camera_moved([x, y, z], [tx, ty, tz]));
        }

        // ---- Preload callbacks ----

        /// URLs the host should start fetching, drained on each call.
        #[wasm_bindgen]
        pub fn scene_take_fetches() -> js_sys::Array {
            let urls = RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => runner.take_fetches(),
                None => Vec::new(),
            });
            urls.into_iter()
                .map(|url| wasm_bindgen::JsValue::from_str(&url))
                .collect::<js_sys::Array>()
        }

        #[wasm_bindgen]
        pub fn scene_texture_loaded(url: &str, handle: u32) {
            with_runner(|r| r.texture_loaded(url, handle));
        }

        #[wasm_bindgen]
        pub fn scene_texture_failed(url: &str, reason: &str) {
            with_runner(|r| r.texture_failed(url, reason));
        }

        // ---- Surface lifecycle ----

        /// Returns true when the host must prevent the loss event's default handling.
        #[wasm_bindgen]
        pub fn scene_surface_lost() -> bool {
            with_runner(|r| r.surface_lost())
        }

        #[wasm_bindgen]
        pub fn scene_surface_restored() {
            with_runner(|r| r.surface_restored());
        }

        // ---- Data accessors ----

        /// Pending scene events as a JSON array.
        #[wasm_bindgen]
        pub fn scene_take_events() -> String {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => runner.take_events_json(),
                None => "[]".to_string(),
            })
        }

        #[wasm_bindgen]
        pub fn get_frame_ptr() -> *const f32 {
            RUNNER.with(|cell| match cell.borrow().as_ref() {
                Some(runner) => runner.frame_ptr(),
                None => std::ptr::null(),
            })
        }

        #[wasm_bindgen]
        pub fn get_buffer_total_floats() -> u32 {
            with_runner(|r| r.buffer_total_floats())
        }

        #[wasm_bindgen]
        pub fn get_max_bodies() -> u32 {
            with_runner(|r| r.max_bodies())
        }

        #[wasm_bindgen]
        pub fn get_generation() -> u32 {
            with_runner(|r| r.generation())
        }

        #[wasm_bindgen]
        pub fn get_status_message() -> String {
            with_runner(|r| r.status_message())
        }

        #[wasm_bindgen]
        pub fn get_is_ready() -> bool {
            with_runner(|r| r.is_ready())
        }
    };
}
