//! Texture and raster allocator.
//!
//! Owns every live texture behind a stable handle. The renderer never assumes
//! exclusive ownership of texture memory; heightfields and billboards refer
//! to textures only through handles resolved here.

use std::collections::HashMap;
use std::path::Path;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::texture::Texture;

/// Stable handle to a texture in a [`TextureStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Allocator for textures and output rasters.
///
/// Handles are positive and monotonically increasing for the store's
/// lifetime; destroying a texture invalidates its handle permanently.
pub struct TextureStore {
    textures: HashMap<u32, Texture>,
    next_handle: u32,
}

impl TextureStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            next_handle: 1,
        }
    }

    fn claim_handle(&mut self) -> Result<u32> {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.checked_add(1).ok_or(Error::HandleOverflow)?;
        Ok(handle)
    }

    /// Allocate a blank raster of the given dimensions.
    pub fn alloc(&mut self, width: u32, height: u32) -> Result<TextureHandle> {
        self.insert(Texture::new(width, height))
    }

    /// Register an existing texture and return its handle.
    pub fn insert(&mut self, texture: Texture) -> Result<TextureHandle> {
        let handle = self.claim_handle()?;
        self.textures.insert(handle, texture);
        Ok(TextureHandle(handle))
    }

    /// Decode an image file into a new texture.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle> {
        let texture = Texture::open(path)?;
        log::info!(
            "loaded texture {}x{}",
            texture.width(),
            texture.height()
        );
        self.insert(texture)
    }

    /// Release a texture. Fails on an unknown handle.
    pub fn destroy(&mut self, handle: TextureHandle) -> Result<()> {
        self.textures
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(Error::InvalidTexture(handle.0))
    }

    /// Look up a texture by handle.
    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(&handle.0)
    }

    /// Mutable lookup by handle.
    pub fn get_mut(&mut self, handle: TextureHandle) -> Option<&mut Texture> {
        self.textures.get_mut(&handle.0)
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_destroy() {
        let mut store = TextureStore::new();
        let handle = store.alloc(4, 4).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(handle).unwrap().width(), 4);

        store.destroy(handle).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.get(handle).is_none());
    }

    #[test]
    fn test_destroy_invalid_handle_fails() {
        let mut store = TextureStore::new();
        assert!(store.destroy(TextureHandle(99)).is_err());
    }

    #[test]
    fn test_handles_are_unique() {
        let mut store = TextureStore::new();
        let a = store.alloc(1, 1).unwrap();
        store.destroy(a).unwrap();
        let b = store.alloc(1, 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let mut store = TextureStore::new();
        assert!(store.load("/nonexistent/texture.png").is_err());
        assert!(store.is_empty());
    }
}
