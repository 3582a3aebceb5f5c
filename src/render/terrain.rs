//! Column raymarcher: the advancing-horizon terrain pass.
//!
//! For every screen column a ray walks outward from the camera through the
//! heightfield. Each sample projects the terrain (or animated water) surface
//! to a screen row; rows above the column's current horizon cursor are newly
//! revealed, painted once, and recorded in the depth buffer. Nearer samples
//! are always visited first, so no pixel is ever painted twice.

use crate::atmosphere::water::{surface_uv, wave_height, WATER_COLOR};
use crate::core::camera::Camera;
use crate::heightfield::Heightfield;
use crate::math::lerp;
use crate::render::config::RenderConfig;
use crate::render::depth::DepthBuffer;
use crate::render::frame::Frame;
use crate::texture::Texture;

/// Rays start marching at this distance from the camera.
pub const MIN_DISTANCE: f32 = 1.0;

/// Step bands: fine at short range, coarser as perspective foreshortening
/// swallows the detail anyway.
const STEP_FINE: f32 = 0.5;
const STEP_MEDIUM: f32 = 2.0;
const STEP_COARSE: f32 = 5.0;
const FINE_LIMIT: f32 = 50.0;
const MEDIUM_LIMIT: f32 = 200.0;

/// Fraction of max range where distance-fog tinting begins.
const FOG_TINT_START: f32 = 0.2;

/// March step length for the current distance band.
#[inline]
pub fn march_step(distance: f32) -> f32 {
    if distance < FINE_LIMIT {
        STEP_FINE
    } else if distance < MEDIUM_LIMIT {
        STEP_MEDIUM
    } else {
        STEP_COARSE
    }
}

/// Integer coordinate of a square terrain chunk in the ground plane.
///
/// Chunks are purely a cheap visibility partition: samples whose chunk is
/// farther than the configured radius from the camera's chunk are skipped
/// without a height lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    /// Convert a ground-plane position to its chunk coordinate.
    pub fn from_world(x: f32, y: f32, chunk_size: f32) -> Self {
        Self {
            x: (x / chunk_size).floor() as i32,
            y: (y / chunk_size).floor() as i32,
        }
    }

    /// Chessboard distance to another chunk, in chunks.
    pub fn chebyshev(&self, other: &ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Procedural terrain color gradient keyed by elevation, used when no color
/// texture is bound. Stops span the luminance height range.
const GRADIENT: [(f32, [u8; 3]); 5] = [
    (0.0, [40, 104, 56]),
    (60.0, [102, 124, 62]),
    (140.0, [139, 115, 85]),
    (200.0, [150, 150, 150]),
    (255.0, [238, 240, 245]),
];

/// Gradient color for a terrain elevation. Clamps outside the stop range.
pub fn height_gradient(h: f32) -> [u8; 3] {
    if h <= GRADIENT[0].0 {
        return GRADIENT[0].1;
    }
    for pair in GRADIENT.windows(2) {
        let (h0, c0) = pair[0];
        let (h1, c1) = pair[1];
        if h < h1 {
            let t = (h - h0) / (h1 - h0);
            return [
                lerp(c0[0] as f32, c1[0] as f32, t) as u8,
                lerp(c0[1] as f32, c1[1] as f32, t) as u8,
                lerp(c0[2] as f32, c1[2] as f32, t) as u8,
            ];
        }
    }
    GRADIENT[GRADIENT.len() - 1].1
}

#[inline]
fn shade(rgb: [u8; 3], light: f32) -> [u8; 4] {
    [
        (rgb[0] as f32 * light) as u8,
        (rgb[1] as f32 * light) as u8,
        (rgb[2] as f32 * light) as u8,
        255,
    ]
}

/// Terrain span color: texture sample (or gradient fallback), fog tint,
/// light intensity.
fn terrain_color(
    field: &Heightfield,
    texture: Option<&Texture>,
    wx: f32,
    wy: f32,
    ground: f32,
    dist: f32,
    config: &RenderConfig,
    light: f32,
) -> [u8; 4] {
    let mut rgb = match texture {
        Some(tex) => {
            let tx = wx / field.width() as f32 * tex.width() as f32;
            let ty = wy / field.height() as f32 * tex.height() as f32;
            let c = tex.sample_bilinear(tx, ty);
            [c[0], c[1], c[2]]
        }
        None => height_gradient(ground),
    };

    // Quadratic fog tint beyond 20% of max range, saturating at the ceiling
    let fog_start = config.max_distance * FOG_TINT_START;
    if dist > fog_start && config.max_distance > fog_start {
        let t = ((dist - fog_start) / (config.max_distance - fog_start)).clamp(0.0, 1.0);
        let tint = (t * t).min(config.fog_tint_ceiling);
        for ch in 0..3 {
            rgb[ch] = lerp(rgb[ch] as f32, config.fog_color[ch] as f32, tint) as u8;
        }
    }

    shade(rgb, light)
}

/// Water span color: animated scrolling texture or the flat fallback.
/// Water gets no terrain fog tint.
fn water_color(texture: Option<&Texture>, wx: f32, wy: f32, time: f32, light: f32) -> [u8; 4] {
    let c = match texture {
        Some(tex) => {
            let (u, v) = surface_uv(wx, wy, time);
            tex.sample_nearest(u, v)
        }
        None => WATER_COLOR,
    };
    shade([c[0], c[1], c[2]], light)
}

/// Ray-march every screen column and paint the revealed terrain spans.
#[allow(clippy::too_many_arguments)]
pub fn render_terrain(
    frame: &mut Frame,
    depth: &mut DepthBuffer,
    field: &Heightfield,
    terrain_texture: Option<&Texture>,
    water_texture: Option<&Texture>,
    camera: &Camera,
    config: &RenderConfig,
    time: f32,
    stride: u32,
    light: f32,
) {
    let out_w = frame.width();
    let out_h = frame.height();
    if out_w == 0 || out_h == 0 {
        return;
    }

    let v_scale = out_h as f32;
    let horizon = out_h as f32 * 0.5 + camera.pitch.tan() * out_h as f32 * 0.5;
    let cam_chunk = ChunkCoord::from_world(camera.position.x, camera.position.y, config.chunk_size);

    let mut sx = 0u32;
    while sx < out_w {
        let angle = camera.yaw + (sx as f32 / out_w as f32 - 0.5) * camera.fov;
        let (dir_x, dir_y) = (angle.cos(), angle.sin());

        // Lowest unpainted row; rows at or below it are already covered
        let mut cursor = out_h as i32;
        let mut dist = MIN_DISTANCE;

        while dist < config.max_distance && cursor > 0 {
            let wx = camera.position.x + dir_x * dist;
            let wy = camera.position.y + dir_y * dist;

            let chunk = ChunkCoord::from_world(wx, wy, config.chunk_size);
            if chunk.chebyshev(&cam_chunk) > config.chunk_radius || !field.in_bounds(wx, wy) {
                dist += march_step(dist);
                continue;
            }

            let ground = field.height_at(wx, wy);
            let (surface, is_water) = match config.water_level {
                Some(level) if ground < level => {
                    (level + wave_height(wx, wy, time, config.wave_amplitude), true)
                }
                _ => (ground, false),
            };

            let projected = horizon + (camera.position.z - surface) / dist * v_scale;
            let top = (projected.floor() as i32).max(0);

            if top < cursor {
                let color = if is_water {
                    water_color(water_texture, wx, wy, time, light)
                } else {
                    terrain_color(field, terrain_texture, wx, wy, ground, dist, config, light)
                };
                for col in sx..(sx + stride).min(out_w) {
                    frame.fill_column_span(col, top as u32, cursor as u32, color);
                    for row in top..cursor {
                        depth.write(col as i32, row, dist);
                    }
                }
                cursor = top;
            }

            dist += march_step(dist);
        }

        sx += stride;
    }
}
