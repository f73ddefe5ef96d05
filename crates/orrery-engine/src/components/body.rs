use glam::Vec3;
use crate::api::types::BodyId;
use crate::assets::cache::TextureHandle;

/// A mounted body: one sphere in the scene graph.
/// Position is written by the coordinator every frame; nothing else mutates it.
#[derive(Debug, Clone)]
pub struct Body {
    /// Catalog identifier.
    pub id: BodyId,
    /// Display name, also used for tag lookups.
    pub name: String,
    /// Position in world space.
    pub pos: Vec3,
    /// Sphere radius in world units.
    pub radius: f32,
    /// Texture, if it loaded during preload.
    pub texture: Option<TextureHandle>,
}

impl Body {
    /// Create a new body with the given ID at the origin.
    pub fn new(id: BodyId) -> Self {
        Self {
            id,
            name: String::new(),
            pos: Vec3::ZERO,
            radius: 1.0,
            texture: None,
        }
    }

    // -- Builder methods --

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_texture(mut self, texture: Option<TextureHandle>) -> Self {
        self.texture = texture;
        self
    }
}
