//! Core engine systems: errors, logging, types, camera.

pub mod camera;
pub mod error;
pub mod logging;
pub mod types;

pub use camera::Camera;
pub use error::Error;
pub use types::Result;
