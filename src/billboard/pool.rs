//! Fixed-capacity billboard slot pools.

use crate::billboard::{Billboard, BillboardKind};
use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::texture::TextureHandle;

/// Capacity of the static (scenery) pool.
pub const STATIC_CAPACITY: usize = 500;

/// Capacity of the dynamic (player/enemy/projectile) pool.
pub const DYNAMIC_CAPACITY: usize = 256;

/// Which of the two disjoint pools a slot belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolKind {
    Static,
    Dynamic,
}

/// Stable identifier of a claimed billboard slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BillboardId {
    pub pool: PoolKind,
    pub index: u32,
}

/// The two billboard pools plus the sprite projection FOV.
///
/// Slots are fixed arrays; registering claims the first free slot and
/// unregistering clears it. All operations on an inactive or out-of-range
/// slot fail without side effects.
pub struct BillboardPools {
    static_slots: Vec<Billboard>,
    dynamic_slots: Vec<Billboard>,
    sprite_fov: f32,
}

impl BillboardPools {
    pub fn new() -> Self {
        Self {
            static_slots: vec![Billboard::empty(); STATIC_CAPACITY],
            dynamic_slots: vec![Billboard::empty(); DYNAMIC_CAPACITY],
            sprite_fov: std::f32::consts::FRAC_PI_3,
        }
    }

    fn slots_for(&mut self, kind: BillboardKind) -> (&mut Vec<Billboard>, PoolKind, &'static str) {
        if kind.is_static() {
            (&mut self.static_slots, PoolKind::Static, "static")
        } else {
            (&mut self.dynamic_slots, PoolKind::Dynamic, "dynamic")
        }
    }

    /// Claim a free slot for a new billboard.
    pub fn register(
        &mut self,
        kind: BillboardKind,
        position: Vec3,
        graphic: TextureHandle,
        scale: f32,
        owner: u32,
    ) -> Result<BillboardId> {
        let (slots, pool, name) = self.slots_for(kind);
        let capacity = slots.len();
        let Some(index) = slots.iter().position(|s| !s.active) else {
            log::warn!("billboard pool \"{name}\" exhausted");
            return Err(Error::BillboardPoolFull(name, capacity));
        };
        slots[index] = Billboard {
            active: true,
            position,
            graphic,
            owner,
            scale,
            kind,
        };
        Ok(BillboardId {
            pool,
            index: index as u32,
        })
    }

    fn slot_mut(&mut self, id: BillboardId) -> Result<&mut Billboard> {
        let slots = match id.pool {
            PoolKind::Static => &mut self.static_slots,
            PoolKind::Dynamic => &mut self.dynamic_slots,
        };
        match slots.get_mut(id.index as usize) {
            Some(slot) if slot.active => Ok(slot),
            _ => Err(Error::InvalidSlot),
        }
    }

    /// Move a billboard. Fails on a free or unknown slot.
    pub fn update(&mut self, id: BillboardId, position: Vec3) -> Result<()> {
        self.slot_mut(id)?.position = position;
        Ok(())
    }

    /// Swap a billboard's graphic. Fails on a free or unknown slot.
    pub fn update_graphic(&mut self, id: BillboardId, graphic: TextureHandle) -> Result<()> {
        self.slot_mut(id)?.graphic = graphic;
        Ok(())
    }

    /// Release a slot. Fails on a free or unknown slot.
    pub fn unregister(&mut self, id: BillboardId) -> Result<()> {
        let slot = self.slot_mut(id)?;
        *slot = Billboard::empty();
        Ok(())
    }

    /// Set the sprite projection FOV used for screen-X mapping.
    pub fn set_fov(&mut self, fov: f32) {
        self.sprite_fov = fov.clamp(crate::core::camera::MIN_FOV, crate::core::camera::MAX_FOV);
    }

    pub fn sprite_fov(&self) -> f32 {
        self.sprite_fov
    }

    /// Read a live slot.
    pub fn slot(&self, id: BillboardId) -> Option<&Billboard> {
        let slots = match id.pool {
            PoolKind::Static => &self.static_slots,
            PoolKind::Dynamic => &self.dynamic_slots,
        };
        slots.get(id.index as usize).filter(|s| s.active)
    }

    /// Iterate all active billboards across both pools.
    pub fn active(&self) -> impl Iterator<Item = &Billboard> {
        self.static_slots
            .iter()
            .chain(self.dynamic_slots.iter())
            .filter(|s| s.active)
    }

    /// Number of active billboards across both pools.
    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}

impl Default for BillboardPools {
    fn default() -> Self {
        Self::new()
    }
}
