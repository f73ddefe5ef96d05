use glam::Vec3;

use crate::api::types::BodyId;

/// Pointer and UI events the engine understands.
/// Delivered by the host's input dispatch; hit-testing happens there.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The pointer entered a body.
    PointerOver { body: BodyId },
    /// The pointer left a body.
    PointerOut { body: BodyId },
    /// A body was clicked.
    Click { body: BodyId },
    /// A body was picked by name (mini-map strip).
    SelectByName { name: String },
    /// The "Reset View" control.
    ClearSelection,
    /// The host's free camera controls moved the camera.
    /// Ignored while a body is being followed.
    CameraMoved { position: Vec3, look_target: Vec3 },
}

/// A queue of input events.
/// The host pushes events as they arrive; the engine drains them once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event.
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
