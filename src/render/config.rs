//! Render and environment configuration.

use serde::{Deserialize, Serialize};

/// Billboard occlusion-test parameters.
///
/// The reference constants were tuned against a 320x240 output; they are
/// explicit fields rather than values scaled implicitly with resolution.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OcclusionConfig {
    /// Depth sampling grid pitch across the projected rectangle, in pixels
    pub grid_step: u32,
    /// Radius of the depth write around a drawn billboard's screen center
    pub write_radius: i32,
    /// Distance slack subtracted before comparing against the depth buffer
    pub tolerance: f32,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        Self {
            grid_step: 8,
            write_radius: 3,
            tolerance: 1.0,
        }
    }
}

/// Environment configuration read by every render pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Global light intensity, 0-255
    pub light: u8,
    /// Water level; `None` disables water rendering
    pub water_level: Option<f32>,
    /// Flat sky color (RGBA) used when no sky texture is bound
    pub sky_color: [u8; 4],
    /// Fog color (RGB) blended into distant terrain and billboards
    pub fog_color: [u8; 3],
    /// Fog intensity; above zero the attenuation table is floored
    pub fog_intensity: f32,
    /// Ceiling on the distance-fog tint blended into terrain colors
    pub fog_tint_ceiling: f32,
    /// Maximum ray-march distance in world units
    pub max_distance: f32,
    /// Chunk tile edge length in world units
    pub chunk_size: f32,
    /// Active-chunk radius around the camera, in chunks
    pub chunk_radius: i32,
    /// Wave amplitude of the animated water surface
    pub wave_amplitude: f32,
    /// Camera displacement per frame beyond which the quality stride doubles
    pub motion_threshold: f32,
    /// Billboard occlusion parameters
    pub occlusion: OcclusionConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            light: 255,
            water_level: None,
            sky_color: [120, 170, 255, 255],
            fog_color: [170, 180, 200],
            fog_intensity: 0.0,
            fog_tint_ceiling: 0.85,
            max_distance: 1000.0,
            chunk_size: 64.0,
            chunk_radius: 16,
            wave_amplitude: 1.5,
            motion_threshold: 3.0,
            occlusion: OcclusionConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Boundary semantic for the water level: negative disables water.
    pub fn set_water_level(&mut self, level: f32) {
        self.water_level = (level >= 0.0).then_some(level);
    }
}
