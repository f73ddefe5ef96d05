use serde::Serialize;

use crate::assets::preload::PreloadStatus;

/// Unique identifier for a body in the catalog (its catalog index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BodyId(pub u32);

impl BodyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reference to a body inside one specific mount of the scene graph.
/// Stops resolving as soon as the scene is remounted under a new generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BodyHandle {
    pub id: BodyId,
    pub generation: u32,
}

/// Facts shown in the selection panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFacts {
    pub name: String,
    pub radius: f32,
    pub orbit_radius: f32,
    pub mass: Option<String>,
    pub orbit_period: Option<String>,
    pub wiki: Option<String>,
}

/// The body the camera is asked to follow.
///
/// `snapshot` is the body position at the moment of selection and never
/// changes afterwards; the live position is looked up through `handle`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionTarget {
    pub handle: BodyHandle,
    pub snapshot: glam::Vec3,
    pub facts: DisplayFacts,
}

/// Events emitted from the engine to the host, drained once per frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data")]
pub enum SceneEvent {
    /// Preload progress changed.
    Status(PreloadStatus),
    /// All assets settled and the settle delay elapsed; the scene is mounted.
    Ready,
    /// Selection changed. `None` means the selection was cleared.
    Selected(Option<SelectionTarget>),
    /// Pointer hover changed. `None` means nothing is hovered.
    Hover(Option<BodyId>),
    /// The far-field backdrop should be shown (`true`) or hidden.
    FarField(bool),
    /// The host must discard the render surface and rebuild it under this key.
    Remount { generation: u32 },
    /// The render surface reported that its context came back.
    SurfaceRestored,
}
