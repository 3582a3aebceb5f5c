//! Bounded pool of heightfields addressed by stable handles.

use std::collections::HashMap;
use std::path::Path;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::heightfield::{Heightfield, MapKind};
use crate::texture::{decode_luma, TextureStore};

/// Default maximum number of simultaneously loaded heightfields.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Stable handle to a heightfield in a [`HeightfieldStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeightfieldHandle(pub u32);

/// Owns all loaded heightfields.
///
/// Handles are positive and monotonically increasing for the store's
/// lifetime; a destroyed handle is never reused, so a stale handle can only
/// miss, not alias a newer heightfield.
pub struct HeightfieldStore {
    fields: HashMap<u32, Heightfield>,
    capacity: usize,
    next_handle: u32,
}

impl HeightfieldStore {
    /// Create a store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a store bounded to `capacity` simultaneous heightfields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: HashMap::new(),
            capacity,
            next_handle: 1,
        }
    }

    fn register(&mut self, field: Heightfield) -> Result<HeightfieldHandle> {
        if self.fields.len() >= self.capacity {
            return Err(Error::PoolExhausted(self.capacity));
        }
        let handle = self.next_handle;
        self.next_handle = self.next_handle.checked_add(1).ok_or(Error::HandleOverflow)?;
        self.fields.insert(handle, field);
        Ok(HeightfieldHandle(handle))
    }

    /// Allocate a blank heightfield and build its cache.
    pub fn create(&mut self, width: u32, height: u32) -> Result<HeightfieldHandle> {
        let field = Heightfield::blank(width, height)?;
        let handle = self.register(field)?;
        log::info!("created blank heightfield {} ({width}x{height})", handle.0);
        Ok(handle)
    }

    /// Build a heightfield from raw elevation samples.
    pub fn create_from_heights(
        &mut self,
        width: u32,
        height: u32,
        samples: Vec<f32>,
    ) -> Result<HeightfieldHandle> {
        let field = Heightfield::build(width, height, samples, MapKind::Blank)?;
        self.register(field)
    }

    /// Decode an image and build a heightfield from its luminance.
    ///
    /// A decode failure propagates without registering anything, leaving the
    /// pool's free-slot count unchanged.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<HeightfieldHandle> {
        if self.fields.len() >= self.capacity {
            return Err(Error::PoolExhausted(self.capacity));
        }
        let (width, height, luma) = decode_luma(&path).inspect_err(|e| {
            log::warn!("heightfield load failed: {e}");
        })?;
        let field = Heightfield::build(width, height, luma, MapKind::Image)?;
        let handle = self.register(field)?;
        log::info!("loaded heightfield {} ({width}x{height})", handle.0);
        Ok(handle)
    }

    /// Release a heightfield and free its slot.
    pub fn destroy(&mut self, handle: HeightfieldHandle) -> Result<()> {
        match self.fields.remove(&handle.0) {
            Some(_) => {
                log::info!("destroyed heightfield {}", handle.0);
                Ok(())
            }
            None => Err(Error::InvalidHandle(handle.0)),
        }
    }

    /// Decode a color texture and bind it to a heightfield.
    pub fn bind_texture(
        &mut self,
        handle: HeightfieldHandle,
        path: impl AsRef<Path>,
        textures: &mut TextureStore,
    ) -> Result<()> {
        if !self.fields.contains_key(&handle.0) {
            return Err(Error::InvalidHandle(handle.0));
        }
        let texture = textures.load(path)?;
        // Lookup cannot fail here; the handle was checked above
        if let Some(field) = self.fields.get_mut(&handle.0) {
            field.color_texture = Some(texture);
        }
        Ok(())
    }

    /// Bilinear terrain height at `(x, y)`, or 0.0 for an invalid handle,
    /// unbuilt cache, or out-of-range coordinates.
    pub fn height_at(&self, handle: HeightfieldHandle, x: f32, y: f32) -> f32 {
        match self.fields.get(&handle.0) {
            Some(field) => field.height_at(x, y),
            None => 0.0,
        }
    }

    /// Boundary encoding of [`height_at`](Self::height_at): height x1000 as
    /// an integer, as exchanged with the host bridge.
    pub fn height_at_fixed(&self, handle: HeightfieldHandle, x: f32, y: f32) -> i32 {
        (self.height_at(handle, x, y) * 1000.0) as i32
    }

    /// Kind of the map behind `handle`, if it is live.
    pub fn map_type(&self, handle: HeightfieldHandle) -> Option<MapKind> {
        self.fields.get(&handle.0).map(|f| f.kind())
    }

    /// Look up a heightfield by handle.
    pub fn get(&self, handle: HeightfieldHandle) -> Option<&Heightfield> {
        self.fields.get(&handle.0)
    }

    /// Mutable lookup by handle.
    pub fn get_mut(&mut self, handle: HeightfieldHandle) -> Option<&mut Heightfield> {
        self.fields.get_mut(&handle.0)
    }

    /// Number of live heightfields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remaining free slots.
    pub fn free_slots(&self) -> usize {
        self.capacity - self.fields.len()
    }
}

impl Default for HeightfieldStore {
    fn default() -> Self {
        Self::new()
    }
}
