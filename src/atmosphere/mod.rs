//! Atmospheric compositing: distance fog, sky, and water animation.

pub mod fog;
pub mod sky;
pub mod water;

pub use fog::FogTable;
