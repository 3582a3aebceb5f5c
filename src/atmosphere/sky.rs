//! Sky pass: flat color fill or spherically mapped texture sampling.

use std::f32::consts::{PI, TAU};

use crate::atmosphere::water::apply_underwater_tint;
use crate::core::camera::Camera;
use crate::math::wrap_unit;
use crate::render::frame::Frame;
use crate::texture::Texture;

/// Fixed horizontal field of view of the sky mapping, independent of the
/// terrain FOV.
pub const SKY_FOV: f32 = std::f32::consts::FRAC_PI_2;

/// Fill the frame with sky before the terrain pass.
///
/// Without a texture this is a flat fill with the configured sky color. With
/// one, every pixel's ray direction (screen offset within [`SKY_FOV`],
/// combined with camera yaw/pitch) is normalized to UV and wrapped into the
/// texture. Sampling runs at the quality stride with block replication.
pub fn render_sky(
    frame: &mut Frame,
    camera: &Camera,
    sky_color: [u8; 4],
    sky_texture: Option<&Texture>,
    stride: u32,
    underwater: bool,
) {
    let tint = |c: [u8; 4]| if underwater { apply_underwater_tint(c) } else { c };

    let Some(tex) = sky_texture else {
        frame.fill(tint(sky_color));
        return;
    };

    let out_w = frame.width();
    let out_h = frame.height();
    if out_w == 0 || out_h == 0 {
        return;
    }
    let v_fov = SKY_FOV * out_h as f32 / out_w as f32;

    let mut sy = 0u32;
    while sy < out_h {
        let v_angle = camera.pitch + (0.5 - sy as f32 / out_h as f32) * v_fov;
        let v = wrap_unit(0.5 - v_angle / PI);

        let mut sx = 0u32;
        while sx < out_w {
            let h_angle = camera.yaw + (sx as f32 / out_w as f32 - 0.5) * SKY_FOV;
            let u = wrap_unit(h_angle / TAU);

            let color = tint(tex.sample_nearest(u, v));
            frame.fill_block(sx, sy, stride, stride, color);
            sx += stride;
        }
        sy += stride;
    }
}
