use glam::Vec3;

use crate::api::types::{BodyHandle, BodyId};
use crate::assets::cache::TextureCache;
use crate::assets::catalog::Catalog;
use crate::components::body::Body;

/// One mount of the scene graph.
/// A remount replaces the whole scene with a new generation, so handles
/// taken from an earlier mount stop resolving.
pub struct Scene {
    generation: u32,
    bodies: Vec<Body>,
}

impl Scene {
    pub fn new(generation: u32) -> Self {
        Self {
            generation,
            bodies: Vec::with_capacity(16),
        }
    }

    /// Build every catalog body, attaching textures already in the cache.
    pub fn mount(catalog: &Catalog, textures: &TextureCache, generation: u32) -> Self {
        let mut scene = Self::new(generation);
        for (i, desc) in catalog.bodies.iter().enumerate() {
            scene.spawn(
                Body::new(BodyId(i as u32))
                    .with_name(desc.name.as_str())
                    .with_radius(desc.radius)
                    .with_texture(textures.get(&desc.texture)),
            );
        }
        scene
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Add a body to the scene.
    pub fn spawn(&mut self, body: Body) {
        self.bodies.push(body);
    }

    /// Handle to a body in this mount.
    pub fn handle(&self, id: BodyId) -> Option<BodyHandle> {
        self.get(id).map(|_| BodyHandle { id, generation: self.generation })
    }

    /// Live position behind a handle, or None if the handle belongs to another
    /// mount or the body is gone.
    pub fn resolve(&self, handle: BodyHandle) -> Option<Vec3> {
        if handle.generation != self.generation {
            return None;
        }
        self.get(handle.id).map(|b| b.pos)
    }

    /// Get a reference to a body by ID.
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Get a mutable reference to a body by ID.
    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id == id)
    }

    /// Find a body by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name == name)
    }

    /// Number of bodies in the scene.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::cache::TextureHandle;
    use crate::assets::catalog::BodyDescriptor;

    fn catalog() -> Catalog {
        Catalog {
            bodies: vec![
                BodyDescriptor::new("Sun", "/t/sun.jpg", 3.0),
                BodyDescriptor::new("Mars", "/t/mars.jpg", 1.0).with_orbit(10.0, 0.5),
            ],
            background: "/t/stars.jpg".into(),
        }
    }

    #[test]
    fn mount_attaches_cached_textures() {
        let mut textures = TextureCache::new();
        textures.insert("/t/mars.jpg", TextureHandle(4));
        let scene = Scene::mount(&catalog(), &textures, 1);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.find_by_name("Mars").unwrap().texture, Some(TextureHandle(4)));
        assert_eq!(scene.find_by_name("Sun").unwrap().texture, None);
    }

    #[test]
    fn handles_resolve_only_in_their_generation() {
        let textures = TextureCache::new();
        let mut old = Scene::mount(&catalog(), &textures, 0);
        old.get_mut(BodyId(1)).unwrap().pos = Vec3::new(10.0, 0.0, 0.0);
        let handle = old.handle(BodyId(1)).unwrap();
        assert_eq!(old.resolve(handle), Some(Vec3::new(10.0, 0.0, 0.0)));

        let remounted = Scene::mount(&catalog(), &textures, 1);
        assert_eq!(remounted.resolve(handle), None);
    }
}
