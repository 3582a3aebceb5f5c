//! Billboard sprites: camera-facing 2D graphics positioned in world space.

pub mod pool;
pub mod projector;

pub use pool::{BillboardId, BillboardPools, PoolKind};
pub use projector::ProjectedBillboard;

use crate::core::types::Vec3;
use crate::texture::TextureHandle;

/// Billboard categories. Each kind carries its own projection scale rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BillboardKind {
    /// Scenery that never moves (trees, rocks, buildings)
    Static,
    /// The player avatar; the most stable scale
    Player,
    /// Enemies scale the most aggressively with distance
    Enemy,
    /// Short-lived projectiles
    Projectile,
}

/// Per-kind scale policy: base factor divided by forward depth, then clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleRule {
    pub base: f32,
    pub min: f32,
    pub max: f32,
}

impl BillboardKind {
    /// Scale rule for this kind.
    pub fn scale_rule(self) -> ScaleRule {
        match self {
            BillboardKind::Static => ScaleRule { base: 60.0, min: 0.2, max: 4.0 },
            BillboardKind::Player => ScaleRule { base: 30.0, min: 0.3, max: 1.2 },
            BillboardKind::Enemy => ScaleRule { base: 120.0, min: 0.1, max: 6.0 },
            BillboardKind::Projectile => ScaleRule { base: 80.0, min: 0.15, max: 3.0 },
        }
    }

    /// Whether this kind lives in the static pool.
    pub fn is_static(self) -> bool {
        self == BillboardKind::Static
    }
}

/// One billboard slot. A slot is free exactly when `active` is false.
#[derive(Clone, Copy, Debug)]
pub struct Billboard {
    pub active: bool,
    /// World position; z is the sprite's base height
    pub position: Vec3,
    /// Graphic resolved through the texture store at draw time
    pub graphic: TextureHandle,
    /// Identity of the host process that registered this billboard
    pub owner: u32,
    /// Additional uniform scale on top of the kind's rule
    pub scale: f32,
    pub kind: BillboardKind,
}

impl Billboard {
    /// An inactive, empty slot.
    pub fn empty() -> Self {
        Self {
            active: false,
            position: Vec3::ZERO,
            graphic: TextureHandle(0),
            owner: 0,
            scale: 1.0,
            kind: BillboardKind::Static,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_rules_match_policy() {
        let enemy = BillboardKind::Enemy.scale_rule();
        assert_eq!(enemy, ScaleRule { base: 120.0, min: 0.1, max: 6.0 });

        let player = BillboardKind::Player.scale_rule();
        assert_eq!(player, ScaleRule { base: 30.0, min: 0.3, max: 1.2 });

        // Enemies scale more aggressively than anything else
        for kind in [
            BillboardKind::Static,
            BillboardKind::Player,
            BillboardKind::Projectile,
        ] {
            assert!(kind.scale_rule().base < enemy.base);
        }
    }

    #[test]
    fn test_pool_assignment_by_kind() {
        assert!(BillboardKind::Static.is_static());
        assert!(!BillboardKind::Player.is_static());
        assert!(!BillboardKind::Enemy.is_static());
        assert!(!BillboardKind::Projectile.is_static());
    }
}
