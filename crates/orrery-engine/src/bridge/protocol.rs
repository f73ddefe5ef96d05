/// Flat frame buffer layout.
/// Must stay in sync with the host-side `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 8 floats]
/// [Camera: 6 floats]
/// [Bodies: max_bodies × 4 floats]
/// ```
///
/// The host reads capacities from the header to compute offsets.

use crate::renderer::instance::{BodyTransform, CameraRecord, FrameOutput};

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 8;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_GENERATION: usize = 2;
pub const HEADER_MAX_BODIES: usize = 3;
pub const HEADER_BODY_COUNT: usize = 4;
pub const HEADER_FAR_FIELD: usize = 5;
pub const HEADER_LOADED: usize = 6;
pub const HEADER_TOTAL: usize = 7;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub max_bodies: usize,
    /// Offset (in floats) where camera data begins.
    pub camera_offset: usize,
    /// Offset (in floats) where body data begins.
    pub body_data_offset: usize,
    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
}

impl FrameLayout {
    pub fn new(max_bodies: usize) -> Self {
        let camera_offset = HEADER_FLOATS;
        let body_data_offset = camera_offset + CameraRecord::FLOATS;
        let buffer_total_floats = body_data_offset + max_bodies * BodyTransform::FLOATS;
        Self {
            max_bodies,
            camera_offset,
            body_data_offset,
            buffer_total_floats,
        }
    }
}

/// Frame buffer the host reads through a raw pointer after every tick.
pub struct FrameBuffer {
    layout: FrameLayout,
    data: Vec<f32>,
    frame_counter: u32,
}

impl FrameBuffer {
    pub fn new(layout: FrameLayout) -> Self {
        let mut data = vec![0.0; layout.buffer_total_floats];
        data[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        data[HEADER_MAX_BODIES] = layout.max_bodies as f32;
        Self {
            layout,
            data,
            frame_counter: 0,
        }
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Record preload progress in the header (valid before the first frame).
    pub fn write_progress(&mut self, loaded: usize, total: usize) {
        self.data[HEADER_LOADED] = loaded as f32;
        self.data[HEADER_TOTAL] = total as f32;
    }

    /// Pack a frame. Bodies beyond `max_bodies` are dropped.
    pub fn write_frame(&mut self, frame: &FrameOutput) {
        self.frame_counter = self.frame_counter.wrapping_add(1);
        let count = frame.bodies.len().min(self.layout.max_bodies);

        self.data[HEADER_FRAME_COUNTER] = self.frame_counter as f32;
        self.data[HEADER_GENERATION] = frame.generation as f32;
        self.data[HEADER_BODY_COUNT] = count as f32;
        self.data[HEADER_FAR_FIELD] = if frame.far_field { 1.0 } else { 0.0 };

        let camera = CameraRecord::from(frame.camera);
        let cam_floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&camera));
        let cam_start = self.layout.camera_offset;
        self.data[cam_start..cam_start + CameraRecord::FLOATS].copy_from_slice(cam_floats);

        let body_floats: &[f32] = bytemuck::cast_slice(&frame.bodies[..count]);
        let body_start = self.layout.body_data_offset;
        self.data[body_start..body_start + body_floats.len()].copy_from_slice(body_floats);
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw pointer for zero-copy reads from the host.
    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::camera::CameraState;
    use glam::Vec3;

    #[test]
    fn offsets_are_contiguous() {
        let layout = FrameLayout::new(10);
        assert_eq!(layout.camera_offset, HEADER_FLOATS);
        assert_eq!(layout.body_data_offset, HEADER_FLOATS + 6);
        assert_eq!(layout.buffer_total_floats, HEADER_FLOATS + 6 + 10 * 4);
    }

    #[test]
    fn writes_header_camera_and_bodies() {
        let mut buffer = FrameBuffer::new(FrameLayout::new(2));
        let frame = FrameOutput {
            generation: 3,
            bodies: vec![
                BodyTransform { x: 1.0, y: 0.0, z: 2.0, radius: 0.5 },
                BodyTransform { x: 3.0, y: 0.0, z: 4.0, radius: 1.5 },
                BodyTransform { x: 9.0, y: 9.0, z: 9.0, radius: 9.0 },
            ],
            camera: CameraState::new(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO),
            far_field: true,
        };
        buffer.write_frame(&frame);
        let data = buffer.as_slice();

        assert_eq!(data[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
        assert_eq!(data[HEADER_FRAME_COUNTER], 1.0);
        assert_eq!(data[HEADER_GENERATION], 3.0);
        assert_eq!(data[HEADER_BODY_COUNT], 2.0);
        assert_eq!(data[HEADER_FAR_FIELD], 1.0);
        assert_eq!(data[HEADER_FLOATS + 2], 50.0);
        let bodies = &data[HEADER_FLOATS + 6..];
        assert_eq!(bodies, &[1.0, 0.0, 2.0, 0.5, 3.0, 0.0, 4.0, 1.5]);
    }
}
