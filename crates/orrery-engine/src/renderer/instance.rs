use bytemuck::{Pod, Zeroable};

use crate::renderer::camera::CameraState;

/// Per-body transform written to the frame buffer for the host renderer.
/// Must match the host protocol: 4 floats = 16 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct BodyTransform {
    /// X position in world space.
    pub x: f32,
    /// Y position in world space (orbital plane height).
    pub y: f32,
    /// Z position in world space.
    pub z: f32,
    /// Sphere radius in world units.
    pub radius: f32,
}

impl BodyTransform {
    pub const FLOATS: usize = 4;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn position(&self) -> glam::Vec3 {
        glam::Vec3::new(self.x, self.y, self.z)
    }
}

/// Camera pose in wire format: position then look target.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct CameraRecord {
    pub position: [f32; 3],
    pub look_target: [f32; 3],
}

impl CameraRecord {
    pub const FLOATS: usize = 6;
}

impl From<CameraState> for CameraRecord {
    fn from(state: CameraState) -> Self {
        Self {
            position: state.position.to_array(),
            look_target: state.look_target.to_array(),
        }
    }
}

/// Everything the renderer needs for one frame, produced by one fixed step.
/// Bodies are indexed by [`BodyId`](crate::api::types::BodyId).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Remount key of the scene these transforms belong to.
    pub generation: u32,
    pub bodies: Vec<BodyTransform>,
    pub camera: CameraState,
    /// Show the far-field backdrop.
    pub far_field: bool,
}
