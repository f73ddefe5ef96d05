use std::collections::HashMap;

/// Host-assigned identifier of a decoded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Shared texture cache keyed by URL.
/// Append-only: URLs are immutable content keys, so entries are never replaced or evicted.
pub struct TextureCache {
    textures: HashMap<String, TextureHandle>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
        }
    }

    /// Record a loaded texture. Returns the handle now stored for `url`,
    /// which is the earlier one if the URL was already cached.
    pub fn insert(&mut self, url: &str, handle: TextureHandle) -> TextureHandle {
        *self.textures.entry(url.to_string()).or_insert(handle)
    }

    /// Look up a texture by URL. Returns None if not loaded.
    pub fn get(&self, url: &str) -> Option<TextureHandle> {
        self.textures.get(url).copied()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.textures.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins() {
        let mut cache = TextureCache::new();
        assert_eq!(cache.insert("/t/sun.jpg", TextureHandle(1)), TextureHandle(1));
        assert_eq!(cache.insert("/t/sun.jpg", TextureHandle(2)), TextureHandle(1));
        assert_eq!(cache.get("/t/sun.jpg"), Some(TextureHandle(1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unknown_returns_none() {
        let cache = TextureCache::new();
        assert!(cache.get("/t/nothing.jpg").is_none());
        assert!(cache.is_empty());
    }
}
