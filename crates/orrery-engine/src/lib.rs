pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;

// Re-export key types at crate root for convenience
pub use api::config::{ConfigError, EngineConfig, RestPolicy};
pub use api::definition::SceneDefinition;
pub use api::engine::{EngineError, EnginePhase, SceneEngine};
pub use api::types::{BodyHandle, BodyId, DisplayFacts, SceneEvent, SelectionTarget};
pub use assets::cache::{TextureCache, TextureHandle};
pub use assets::catalog::{AssetRequest, BodyDescriptor, BodyFacts, Catalog, CatalogError, OrbitCenter};
pub use assets::preload::{AssetPreloader, LabelTable, LoadError, PreloadPhase, PreloadStatus, TextureSource};
pub use bridge::protocol::{FrameBuffer, FrameLayout, HEADER_FLOATS, PROTOCOL_VERSION};
pub use components::body::Body;
pub use core::scene::Scene;
pub use core::surface::{SurfaceContinuityGuard, SurfaceState};
pub use core::time::{Countdown, FixedTimestep, FrameClock};
pub use input::queue::{InputEvent, InputQueue};
pub use renderer::camera::{CameraFollowController, CameraState};
pub use renderer::instance::{BodyTransform, FrameOutput};
pub use systems::orbit::{world_positions, OrbitMotionState};
