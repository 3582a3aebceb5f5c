//! Terravox - a voxel-space heightfield terrain renderer
//!
//! Renders a first-person view of a 2D heightfield without a polygon mesh:
//! every screen column ray-marches outward from the camera and paints the
//! newly revealed terrain spans, while billboards are projected into the same
//! frame and occluded against a per-pixel depth buffer.

pub mod core;
pub mod math;
pub mod heightfield;
pub mod texture;
pub mod atmosphere;
pub mod billboard;
pub mod render;

pub use crate::render::context::RenderContext;
