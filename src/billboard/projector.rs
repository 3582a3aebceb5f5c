//! Billboard projection, sorting, occlusion testing, and compositing.
//!
//! Active billboards are projected to screen-space rectangles, sorted
//! farthest-first, tested against the terrain depth buffer, and alpha-blended
//! back to front so nearer sprites overdraw farther ones.

use crate::atmosphere::fog::FogTable;
use crate::billboard::{Billboard, BillboardPools};
use crate::core::camera::Camera;
use crate::math::{lerp, wrap_angle};
use crate::render::config::{OcclusionConfig, RenderConfig};
use crate::render::depth::DepthBuffer;
use crate::render::frame::Frame;
use crate::texture::{Texture, TextureHandle, TextureStore};

/// Billboards farther than this multiple of max range are rejected outright.
const RANGE_MARGIN: f32 = 1.1;

/// Minimum distance; anything closer is degenerate.
const NEAR_LIMIT: f32 = 0.5;

/// Angular rejection margin as a multiple of half the terrain FOV.
const ANGLE_MARGIN: f32 = 1.2;

/// Horizontal screen margin, in screen widths beyond each edge.
const SCREEN_MARGIN_X: f32 = 1.25;

/// Vertical screen margin, in screen heights beyond each edge.
const SCREEN_MARGIN_Y: f32 = 1.0;

/// Forward depth below which a billboard sits on or behind the camera plane.
const MIN_FORWARD: f32 = 0.1;

/// Fractions of max range where fog attenuation and the linear fade begin.
const FOG_ALPHA_START: f32 = 0.3;
const FADE_START: f32 = 0.7;

/// Fraction of half-FOV where the angular fade begins.
const ANGLE_FADE_START: f32 = 0.7;

/// Cap on the fog color blend applied while compositing.
const FOG_BLEND_MAX: f32 = 0.5;

/// A billboard projected into screen space, ready for occlusion testing and
/// compositing.
#[derive(Clone, Copy, Debug)]
pub struct ProjectedBillboard {
    pub screen_x: f32,
    pub screen_y: f32,
    /// Projected sprite size in pixels
    pub width: f32,
    pub height: f32,
    /// Ground-plane distance from the camera
    pub distance: f32,
    /// Composite opacity (fog x distance fade x angular fade)
    pub alpha: u8,
    /// Fog color blend factor applied to the sprite's colors
    pub fog_blend: f32,
    pub graphic: TextureHandle,
}

impl ProjectedBillboard {
    /// Integer bounding rectangle `(x0, y0, x1, y1)`, centered on the
    /// projected position.
    pub fn rect(&self) -> (i32, i32, i32, i32) {
        let x0 = (self.screen_x - self.width * 0.5).round() as i32;
        let y0 = (self.screen_y - self.height * 0.5).round() as i32;
        let x1 = x0 + (self.width.max(1.0) as i32);
        let y1 = y0 + (self.height.max(1.0) as i32);
        (x0, y0, x1, y1)
    }
}

/// Project one billboard, or `None` if any rejection rule fires.
pub fn project(
    billboard: &Billboard,
    camera: &Camera,
    sprite_fov: f32,
    config: &RenderConfig,
    fog: &FogTable,
    textures: &TextureStore,
    out_w: u32,
    out_h: u32,
) -> Option<ProjectedBillboard> {
    let dx = billboard.position.x - camera.position.x;
    let dy = billboard.position.y - camera.position.y;

    let distance = (dx * dx + dy * dy).sqrt();
    if distance > config.max_distance * RANGE_MARGIN || distance < NEAR_LIMIT {
        return None;
    }

    let offset = wrap_angle(dy.atan2(dx) - camera.yaw);
    let half_fov = camera.fov * 0.5;
    if offset.abs() > half_fov * ANGLE_MARGIN {
        return None;
    }

    let w = out_w as f32;
    let h = out_h as f32;
    let screen_x = w * 0.5 + offset / sprite_fov * w;
    if screen_x < -SCREEN_MARGIN_X * w || screen_x > w + SCREEN_MARGIN_X * w {
        return None;
    }

    let forward = dx * camera.yaw.cos() + dy * camera.yaw.sin();
    if forward <= MIN_FORWARD {
        return None;
    }

    let horizon = h * 0.5 + camera.pitch.tan() * h * 0.5;
    let screen_y = horizon + (camera.position.z - billboard.position.z) / forward * h;
    if screen_y < -SCREEN_MARGIN_Y * h || screen_y > h + SCREEN_MARGIN_Y * h {
        return None;
    }

    let rule = billboard.kind.scale_rule();
    let scale = (rule.base / forward).clamp(rule.min, rule.max) * billboard.scale;
    let tex = textures.get(billboard.graphic)?;
    let width = tex.width() as f32 * scale;
    let height = tex.height() as f32 * scale;
    if width < 1.0 || height < 1.0 {
        return None;
    }

    // Opacity: fog attenuation, then linear distance fade, then angular fade
    let mut a = 1.0_f32;
    if distance > config.max_distance * FOG_ALPHA_START {
        a *= fog.factor(distance);
    }
    let fade_start = config.max_distance * FADE_START;
    if distance > fade_start {
        let span = config.max_distance * RANGE_MARGIN - fade_start;
        a *= (1.0 - (distance - fade_start) / span).clamp(0.0, 1.0);
    }
    let angle_fade_start = half_fov * ANGLE_FADE_START;
    if offset.abs() > angle_fade_start {
        let span = half_fov * ANGLE_MARGIN - angle_fade_start;
        a *= (1.0 - (offset.abs() - angle_fade_start) / span).clamp(0.0, 1.0);
    }
    let alpha = (a * 255.0) as u8;

    // Fog color blend, separate from opacity
    let blend_start = config.max_distance * FOG_ALPHA_START;
    let fog_blend = if distance > blend_start {
        let t = (distance - blend_start) / (config.max_distance - blend_start);
        (t * t).min(FOG_BLEND_MAX)
    } else {
        0.0
    };

    Some(ProjectedBillboard {
        screen_x,
        screen_y,
        width,
        height,
        distance,
        alpha,
        fog_blend,
        graphic: billboard.graphic,
    })
}

/// Project every active billboard from both pools and sort the survivors by
/// distance, farthest first (stable), for painter's-algorithm compositing.
pub fn project_all(
    pools: &BillboardPools,
    camera: &Camera,
    config: &RenderConfig,
    fog: &FogTable,
    textures: &TextureStore,
    out_w: u32,
    out_h: u32,
) -> Vec<ProjectedBillboard> {
    let mut list: Vec<ProjectedBillboard> = pools
        .active()
        .filter_map(|b| {
            project(
                b,
                camera,
                pools.sprite_fov(),
                config,
                fog,
                textures,
                out_w,
                out_h,
            )
        })
        .collect();
    list.sort_by(|a, b| b.distance.total_cmp(&a.distance));
    list
}

/// Occlusion test: sample the depth buffer on a fixed-pitch grid across the
/// rectangle. The billboard is culled when at least 75% of the sampled cells
/// already hold a nearer surface (the 75% boundary itself counts as
/// occluded).
pub fn is_occluded(
    depth: &DepthBuffer,
    rect: (i32, i32, i32, i32),
    distance: f32,
    occlusion: &OcclusionConfig,
) -> bool {
    let (x0, y0, x1, y1) = rect;
    let step = occlusion.grid_step.max(1) as i32;

    let mut total = 0u32;
    let mut hidden = 0u32;
    let mut y = y0;
    while y < y1 {
        let mut x = x0;
        while x < x1 {
            if let Some(d) = depth.get(x, y) {
                total += 1;
                if d < distance - occlusion.tolerance {
                    hidden += 1;
                }
            }
            x += step;
        }
        y += step;
    }

    total > 0 && hidden * 4 >= total * 3
}

fn blit(frame: &mut Frame, tex: &Texture, projected: &ProjectedBillboard, fog_color: [u8; 3]) {
    let (x0, y0, x1, y1) = projected.rect();
    let w = (x1 - x0) as f32;
    let h = (y1 - y0) as f32;

    for py in y0.max(0)..y1.min(frame.height() as i32) {
        for px in x0.max(0)..x1.min(frame.width() as i32) {
            let u = (px - x0) as f32 / w;
            let v = (py - y0) as f32 / h;
            let texel = tex.sample_nearest(u, v);
            if texel[3] == 0 {
                continue;
            }

            let mut rgb = [texel[0], texel[1], texel[2]];
            if projected.fog_blend > 0.0 {
                for ch in 0..3 {
                    rgb[ch] =
                        lerp(rgb[ch] as f32, fog_color[ch] as f32, projected.fog_blend) as u8;
                }
            }
            let a = (texel[3] as u16 * projected.alpha as u16 / 255) as u8;
            frame.blend(px, py, rgb, a);
        }
    }
}

/// Composite all billboards into the frame, back to front.
///
/// Drawn billboards stamp their distance into the depth buffer in a small
/// radius around their screen center so nearer billboards later in the list
/// can occlude them within the same frame.
pub fn render_billboards(
    frame: &mut Frame,
    depth: &mut DepthBuffer,
    pools: &BillboardPools,
    textures: &TextureStore,
    camera: &Camera,
    config: &RenderConfig,
    fog: &FogTable,
) {
    let list = project_all(
        pools,
        camera,
        config,
        fog,
        textures,
        frame.width(),
        frame.height(),
    );
    log::debug!("projected {} billboards", list.len());

    for projected in &list {
        if is_occluded(depth, projected.rect(), projected.distance, &config.occlusion) {
            continue;
        }
        let Some(tex) = textures.get(projected.graphic) else {
            continue;
        };
        blit(frame, tex, projected, config.fog_color);

        let cx = projected.screen_x.round() as i32;
        let cy = projected.screen_y.round() as i32;
        let r = config.occlusion.write_radius;
        for dy in -r..=r {
            for dx in -r..=r {
                depth.write(cx + dx, cy + dy, projected.distance);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billboard::BillboardKind;
    use crate::core::types::Vec3;

    fn scene() -> (BillboardPools, Camera, RenderConfig, FogTable, TextureStore, TextureHandle) {
        let pools = BillboardPools::new();
        let camera = Camera::new(Vec3::new(0.0, 0.0, 50.0));
        let config = RenderConfig::default();
        let mut fog = FogTable::new();
        fog.ensure(config.max_distance, config.fog_intensity);

        let mut textures = TextureStore::new();
        let sprite = textures
            .insert(Texture::from_pixels(16, 16, vec![[255, 255, 255, 255]; 256]).unwrap())
            .unwrap();
        (pools, camera, config, fog, textures, sprite)
    }

    fn enemy_at(x: f32, y: f32, graphic: TextureHandle) -> Billboard {
        Billboard {
            active: true,
            position: Vec3::new(x, y, 45.0),
            graphic,
            owner: 0,
            scale: 1.0,
            kind: BillboardKind::Enemy,
        }
    }

    #[test]
    fn test_project_ahead_succeeds() {
        let (_, camera, config, fog, textures, sprite) = scene();
        let b = enemy_at(100.0, 0.0, sprite);
        let p = project(&b, &camera, camera.fov, &config, &fog, &textures, 320, 240).unwrap();
        assert!((p.screen_x - 160.0).abs() < 1.0);
        assert!((p.distance - 100.0).abs() < 0.01);
        assert!(p.alpha > 0);
    }

    #[test]
    fn test_rejects_behind_and_out_of_range() {
        let (_, camera, config, fog, textures, sprite) = scene();

        // Behind the camera (angular offset ~PI)
        let behind = enemy_at(-100.0, 0.0, sprite);
        assert!(project(&behind, &camera, camera.fov, &config, &fog, &textures, 320, 240).is_none());

        // Too close
        let close = enemy_at(0.2, 0.0, sprite);
        assert!(project(&close, &camera, camera.fov, &config, &fog, &textures, 320, 240).is_none());

        // Past 1.1x max range
        let far = enemy_at(config.max_distance * 1.2, 0.0, sprite);
        assert!(project(&far, &camera, camera.fov, &config, &fog, &textures, 320, 240).is_none());
    }

    #[test]
    fn test_missing_graphic_rejected() {
        let (_, camera, config, fog, textures, _) = scene();
        let b = enemy_at(100.0, 0.0, TextureHandle(999));
        assert!(project(&b, &camera, camera.fov, &config, &fog, &textures, 320, 240).is_none());
    }

    #[test]
    fn test_alpha_fades_with_distance() {
        let (_, camera, config, fog, textures, sprite) = scene();
        let near = enemy_at(100.0, 0.0, sprite);
        let far = enemy_at(config.max_distance * 0.95, 0.0, sprite);

        let p_near =
            project(&near, &camera, camera.fov, &config, &fog, &textures, 320, 240).unwrap();
        let p_far = project(&far, &camera, camera.fov, &config, &fog, &textures, 320, 240).unwrap();
        assert!(p_far.alpha < p_near.alpha);
        assert!(p_far.fog_blend > p_near.fog_blend);
        assert!(p_far.fog_blend <= FOG_BLEND_MAX);
    }

    #[test]
    fn test_scale_clamped_by_kind_rule() {
        let (_, camera, config, fog, textures, sprite) = scene();
        // Player rule caps at 1.2, so a 16px sprite is at most ~19.2px wide
        let mut b = enemy_at(20.0, 0.0, sprite);
        b.kind = BillboardKind::Player;
        let p = project(&b, &camera, camera.fov, &config, &fog, &textures, 320, 240).unwrap();
        assert!(p.width <= 16.0 * 1.2 + 0.01);
    }

    #[test]
    fn test_sorted_farthest_first() {
        let (mut pools, camera, config, fog, textures, sprite) = scene();
        for x in [300.0, 50.0, 700.0, 120.0] {
            pools
                .register(BillboardKind::Enemy, Vec3::new(x, 0.0, 45.0), sprite, 1.0, 0)
                .unwrap();
        }

        let list = project_all(&pools, &camera, &config, &fog, &textures, 320, 240);
        assert_eq!(list.len(), 4);
        for pair in list.windows(2) {
            assert!(pair[0].distance >= pair[1].distance);
        }
    }

    #[test]
    fn test_occlusion_boundary_at_75_percent() {
        let config = OcclusionConfig {
            grid_step: 8,
            write_radius: 3,
            tolerance: 1.0,
        };
        let mut depth = DepthBuffer::new();
        depth.reset(32, 32, 1000.0);

        // 16x16 rect sampled at pitch 8 -> exactly 4 cells: (0,0) (8,0) (0,8) (8,8)
        let rect = (0, 0, 16, 16);
        let distance = 500.0;

        // 2 of 4 hidden: 50% < 75%, draw
        depth.write(0, 0, 100.0);
        depth.write(8, 0, 100.0);
        assert!(!is_occluded(&depth, rect, distance, &config));

        // 3 of 4 hidden: exactly 75% counts as occluded
        depth.write(0, 8, 100.0);
        assert!(is_occluded(&depth, rect, distance, &config));

        // Nearer surfaces within tolerance do not count as occluders
        let mut depth = DepthBuffer::new();
        depth.reset(32, 32, 1000.0);
        for &(x, y) in &[(0, 0), (8, 0), (0, 8), (8, 8)] {
            depth.write(x, y, distance - 0.5);
        }
        assert!(!is_occluded(&depth, rect, distance, &config));
    }

    #[test]
    fn test_occluded_billboard_not_blitted() {
        let (mut pools, camera, config, fog, textures, sprite) = scene();
        pools
            .register(BillboardKind::Enemy, Vec3::new(100.0, 0.0, 50.0), sprite, 1.0, 0)
            .unwrap();

        let mut frame = Frame::new(320, 240);
        let mut depth = DepthBuffer::new();
        depth.reset(320, 240, config.max_distance);

        // Everything on screen is nearer than the billboard
        for y in 0..240 {
            for x in 0..320 {
                depth.write(x, y, 10.0);
            }
        }

        render_billboards(&mut frame, &mut depth, &pools, &textures, &camera, &config, &fog);
        for y in 0..240 {
            for x in 0..320 {
                assert_eq!(frame.get(x, y), Some([0, 0, 0, 255]));
            }
        }
    }

    #[test]
    fn test_visible_billboard_blitted_and_depth_stamped() {
        let (mut pools, camera, config, fog, textures, sprite) = scene();
        pools
            .register(BillboardKind::Enemy, Vec3::new(100.0, 0.0, 50.0), sprite, 1.0, 0)
            .unwrap();

        let mut frame = Frame::new(320, 240);
        let mut depth = DepthBuffer::new();
        depth.reset(320, 240, config.max_distance);

        render_billboards(&mut frame, &mut depth, &pools, &textures, &camera, &config, &fog);

        // The white sprite landed near screen center
        let c = frame.get(160, 120).unwrap();
        assert!(c[0] > 200, "sprite not drawn: {c:?}");

        // Depth stamped around the center
        assert!((depth.get(160, 120).unwrap() - 100.0).abs() < 0.01);
    }
}
