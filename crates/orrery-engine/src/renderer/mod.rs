pub mod camera;
pub mod instance;

// Re-export key types for convenient access
pub use camera::{CameraFollowController, CameraState, FollowOutcome};
pub use instance::{BodyTransform, CameraRecord, FrameOutput};
