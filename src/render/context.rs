//! Render context: all renderer state plus per-frame orchestration.
//!
//! Every pool, buffer, and cached value the renderer touches lives here
//! explicitly, so independent contexts never interfere and tests can build
//! as many as they like.

use glam::Vec3;

use crate::atmosphere::fog::FogTable;
use crate::atmosphere::sky;
use crate::atmosphere::water::UNDERWATER_LIGHT_FACTOR;
use crate::billboard::{projector, BillboardPools};
use crate::core::camera::Camera;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::heightfield::{HeightfieldHandle, HeightfieldStore};
use crate::math::wrap_angle;
use crate::render::config::RenderConfig;
use crate::render::depth::DepthBuffer;
use crate::render::frame::Frame;
use crate::render::terrain;
use crate::texture::{TextureHandle, TextureStore};

/// Weight converting angular deltas into displacement units for the motion
/// heuristic.
const ANGLE_WEIGHT: f32 = 40.0;

/// Camera pose snapshot for frame-to-frame motion measurement.
#[derive(Clone, Copy, Debug)]
struct CameraPose {
    position: Vec3,
    yaw: f32,
    pitch: f32,
}

impl CameraPose {
    fn of(camera: &Camera) -> Self {
        Self {
            position: camera.position,
            yaw: camera.yaw,
            pitch: camera.pitch,
        }
    }

    /// Combined positional and angular displacement since another pose.
    fn displacement(&self, other: &Self) -> f32 {
        (self.position - other.position).length()
            + (wrap_angle(self.yaw - other.yaw).abs() + (self.pitch - other.pitch).abs())
                * ANGLE_WEIGHT
    }
}

/// Renderer session state carried across frames.
struct SessionState {
    /// Elapsed time driving water animation
    time: f32,
    /// Camera pose at the previous frame
    last_pose: Option<CameraPose>,
    /// Column/sky stride chosen for the most recent frame
    stride: u32,
}

/// Owns every renderer resource and produces frames.
pub struct RenderContext {
    pub heightfields: HeightfieldStore,
    pub textures: TextureStore,
    pub billboards: BillboardPools,
    pub camera: Camera,
    pub config: RenderConfig,
    /// Spherically mapped sky texture; `None` falls back to the flat color
    pub sky_texture: Option<TextureHandle>,
    /// Animated water surface texture; `None` falls back to the flat color
    pub water_texture: Option<TextureHandle>,
    fog: FogTable,
    depth: DepthBuffer,
    session: SessionState,
}

impl RenderContext {
    /// Create a context with default configuration and empty pools.
    pub fn new() -> Self {
        Self {
            heightfields: HeightfieldStore::new(),
            textures: TextureStore::new(),
            billboards: BillboardPools::new(),
            camera: Camera::default(),
            config: RenderConfig::default(),
            sky_texture: None,
            water_texture: None,
            fog: FogTable::new(),
            depth: DepthBuffer::new(),
            session: SessionState {
                time: 0.0,
                last_pose: None,
                stride: 1,
            },
        }
    }

    /// Advance the water animation clock.
    pub fn advance_time(&mut self, dt: f32) {
        self.session.time += dt;
    }

    /// Elapsed animation time.
    pub fn time(&self) -> f32 {
        self.session.time
    }

    /// Set the camera pose and field of view in one call.
    pub fn set_camera(&mut self, x: f32, y: f32, z: f32, yaw: f32, pitch: f32, fov: f32) {
        self.camera.set_pose(x, y, z, yaw, pitch);
        self.camera.set_fov(fov);
    }

    /// Column/sky stride used by the most recent frame.
    pub fn quality_stride(&self) -> u32 {
        self.session.stride
    }

    /// Depth buffer of the most recent frame.
    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    /// Fog table (built on first render, rebuilt when the range changes).
    pub fn fog(&self) -> &FogTable {
        &self.fog
    }

    /// Render one frame: sky, terrain columns, then billboards.
    ///
    /// The finished raster is registered with the texture store and returned
    /// by handle. Fails on an invalid heightfield handle or an unbuilt height
    /// cache; a failed render changes no renderer state.
    pub fn render(
        &mut self,
        handle: HeightfieldHandle,
        width: u32,
        height: u32,
    ) -> Result<TextureHandle> {
        let field = self
            .heightfields
            .get(handle)
            .ok_or(Error::InvalidHandle(handle.0))?;
        if !field.cache_valid() {
            return Err(Error::InvalidCache(handle.0));
        }

        self.fog
            .ensure(self.config.max_distance, self.config.fog_intensity);
        self.depth.reset(width, height, self.config.max_distance);

        // Motion-adaptive quality: fast camera movement halves resolution
        let pose = CameraPose::of(&self.camera);
        let stride = match self.session.last_pose {
            Some(prev) if pose.displacement(&prev) > self.config.motion_threshold => 2,
            _ => 1,
        };
        self.session.stride = stride;
        self.session.last_pose = Some(pose);

        let underwater = self
            .config
            .water_level
            .is_some_and(|level| self.camera.position.z < level);
        let light = self.config.light as f32 / 255.0
            * if underwater { UNDERWATER_LIGHT_FACTOR } else { 1.0 };

        let mut frame = Frame::new(width, height);

        let sky_tex = self.sky_texture.and_then(|h| self.textures.get(h));
        sky::render_sky(
            &mut frame,
            &self.camera,
            self.config.sky_color,
            sky_tex,
            stride,
            underwater,
        );

        let terrain_tex = field.color_texture.and_then(|h| self.textures.get(h));
        let water_tex = self.water_texture.and_then(|h| self.textures.get(h));
        terrain::render_terrain(
            &mut frame,
            &mut self.depth,
            field,
            terrain_tex,
            water_tex,
            &self.camera,
            &self.config,
            self.session.time,
            stride,
            light,
        );

        projector::render_billboards(
            &mut frame,
            &mut self.depth,
            &self.billboards,
            &self.textures,
            &self.camera,
            &self.config,
            &self.fog,
        );

        self.textures.insert(frame.into_texture())
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_context(size: u32, terrain_height: f32) -> (RenderContext, HeightfieldHandle) {
        let mut ctx = RenderContext::new();
        let handle = ctx
            .heightfields
            .create_from_heights(size, size, vec![terrain_height; (size * size) as usize])
            .unwrap();
        let mid = size as f32 / 2.0;
        ctx.set_camera(mid, mid, 30.0, 0.0, 0.0, std::f32::consts::FRAC_PI_3);
        ctx.config.max_distance = 240.0;
        (ctx, handle)
    }

    #[test]
    fn test_render_invalid_handle_fails() {
        let mut ctx = RenderContext::new();
        assert!(ctx.render(HeightfieldHandle(99), 64, 48).is_err());
    }

    #[test]
    fn test_render_produces_raster() {
        let (mut ctx, handle) = flat_context(512, 0.0);
        let raster = ctx.render(handle, 64, 48).unwrap();
        let tex = ctx.textures.get(raster).unwrap();
        assert_eq!(tex.width(), 64);
        assert_eq!(tex.height(), 48);

        // Each frame allocates a fresh raster
        let raster2 = ctx.render(handle, 64, 48).unwrap();
        assert_ne!(raster, raster2);
    }

    #[test]
    fn test_flat_plane_horizon_uniform_across_columns() {
        let (mut ctx, handle) = flat_context(512, 0.0);
        let raster = ctx.render(handle, 64, 48).unwrap();
        let tex = ctx.textures.get(raster).unwrap();

        let sky = ctx.config.sky_color;
        let first_terrain_row = |col: i32| -> Option<i32> {
            (0..48).find(|&row| tex.texel(col, row) != sky)
        };
        let expected = first_terrain_row(0).expect("terrain must be visible");
        for col in 1..64 {
            assert_eq!(first_terrain_row(col), Some(expected), "column {col}");
        }
    }

    #[test]
    fn test_motion_doubles_stride_and_settles() {
        let (mut ctx, handle) = flat_context(512, 0.0);

        // First frame has no previous pose: full resolution
        ctx.render(handle, 64, 48).unwrap();
        assert_eq!(ctx.quality_stride(), 1);

        // Large camera jump: half resolution
        let mid = 256.0;
        ctx.set_camera(mid + 50.0, mid, 30.0, 0.0, 0.0, std::f32::consts::FRAC_PI_3);
        ctx.render(handle, 64, 48).unwrap();
        assert_eq!(ctx.quality_stride(), 2);

        // Motion settled: back to full resolution
        ctx.render(handle, 64, 48).unwrap();
        assert_eq!(ctx.quality_stride(), 1);
    }

    #[test]
    fn test_underwater_tints_background() {
        let (mut ctx, handle) = flat_context(512, 0.0);
        ctx.config.set_water_level(100.0); // camera z=30 is below
        let raster = ctx.render(handle, 64, 48).unwrap();
        let tex = ctx.textures.get(raster).unwrap();

        // Top of frame is background, shifted toward blue
        let c = tex.texel(0, 0);
        assert_ne!(c, ctx.config.sky_color);
        assert!(c[2] >= c[0]);
    }

    #[test]
    fn test_advance_time_accumulates() {
        let mut ctx = RenderContext::new();
        ctx.advance_time(0.5);
        ctx.advance_time(0.25);
        assert!((ctx.time() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_fog_table_built_on_first_render() {
        let (mut ctx, handle) = flat_context(512, 0.0);
        assert!(ctx.fog().is_empty());
        ctx.render(handle, 32, 24).unwrap();
        assert_eq!(ctx.fog().len(), 240);
    }
}
