use glam::{Mat4, Vec3};
use serde::Serialize;

use crate::api::config::{EngineConfig, RestPolicy};
use crate::api::types::SelectionTarget;
use crate::core::scene::Scene;

/// Camera pose read by the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub look_target: Vec3,
}

impl CameraState {
    pub fn new(position: Vec3, look_target: Vec3) -> Self {
        Self { position, look_target }
    }

    /// Right-handed, Y-up view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_target, Vec3::Y)
    }

    pub fn distance_from_origin(&self) -> f32 {
        self.position.length()
    }
}

/// Result of one follow step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowOutcome {
    pub camera: CameraState,
    pub far_field: bool,
    /// The selection's live reference no longer resolves; the caller should clear it.
    pub target_lost: bool,
}

/// Exponential-smoothing follow camera with a derived far-field signal.
/// Sole writer of [`CameraState`].
pub struct CameraFollowController {
    state: CameraState,
    /// Fraction of the remaining distance covered per step (0 < α ≤ 1).
    smoothing: f32,
    offset: Vec3,
    rest: RestPolicy,
    far_threshold: f32,
    dead_band: f32,
    far_field: bool,
}

/// One smoothing step: `from + α·(to − from)`.
#[inline]
pub fn approach(from: Vec3, to: Vec3, alpha: f32) -> Vec3 {
    from + (to - from) * alpha
}

impl CameraFollowController {
    pub fn new(config: &EngineConfig) -> Self {
        let state = CameraState::new(config.initial_camera_position, Vec3::ZERO);
        let mut controller = Self {
            state,
            smoothing: config.follow_smoothing,
            offset: config.follow_offset,
            rest: config.rest_policy,
            far_threshold: config.far_field_threshold,
            dead_band: config.far_field_dead_band,
            far_field: false,
        };
        controller.far_field = controller.compute_far_field();
        controller
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn far_field(&self) -> bool {
        self.far_field
    }

    /// Place the camera directly (e.g. from host orbit controls while nothing is followed).
    pub fn set_state(&mut self, state: CameraState) {
        self.state = state;
        self.far_field = self.compute_far_field();
    }

    /// Advance one fixed step toward the target.
    /// A target whose handle no longer resolves is treated as no target.
    pub fn update(&mut self, target: Option<&SelectionTarget>, scene: &Scene) -> FollowOutcome {
        let live = target.map(|t| scene.resolve(t.handle));
        let target_lost = matches!(live, Some(None));

        match live.flatten() {
            Some(body_pos) => {
                let desired = body_pos + self.offset;
                self.state.position = approach(self.state.position, desired, self.smoothing);
                // Orientation snaps; only position is smoothed.
                self.state.look_target = body_pos;
            }
            None => self.settle_at_rest(),
        }

        self.far_field = self.compute_far_field();
        FollowOutcome {
            camera: self.state,
            far_field: self.far_field,
            target_lost,
        }
    }

    fn settle_at_rest(&mut self) {
        match self.rest {
            RestPolicy::Hold => {}
            RestPolicy::EaseTo { position, smoothing } => {
                self.state.position = approach(self.state.position, position, smoothing);
                self.state.look_target = Vec3::ZERO;
            }
        }
    }

    fn compute_far_field(&self) -> bool {
        let distance = self.state.distance_from_origin();
        if self.dead_band <= 0.0 {
            return distance > self.far_threshold;
        }
        if self.far_field {
            distance > self.far_threshold - self.dead_band
        } else {
            distance > self.far_threshold + self.dead_band
        }
    }
}
