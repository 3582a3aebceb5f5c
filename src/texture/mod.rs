//! RGBA textures and the decode seam around the `image` crate.

pub mod store;

pub use store::{TextureHandle, TextureStore};

use std::path::Path;

use crate::core::types::Result;
use crate::math::lerp;

/// An RGBA8 pixel buffer. Used both for sampled textures (terrain color,
/// sky, billboard graphics) and for finished output rasters.
#[derive(Clone, Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Texture {
    /// Allocate an opaque black texture of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; (width * height) as usize],
        }
    }

    /// Build a texture from an existing pixel buffer.
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Option<Self> {
        if pixels.len() != (width * height) as usize {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Decode an image file into a texture.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| [p.0[0], p.0[1], p.0[2], p.0[3]])
            .collect();
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        &mut self.pixels
    }

    /// Texel at integer coordinates with wraparound addressing.
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> [u8; 4] {
        let tx = x.rem_euclid(self.width as i32) as u32;
        let ty = y.rem_euclid(self.height as i32) as u32;
        self.pixels[(ty * self.width + tx) as usize]
    }

    /// Nearest sample at normalized coordinates; `u`/`v` wrap into `[0, 1)`.
    #[inline]
    pub fn sample_nearest(&self, u: f32, v: f32) -> [u8; 4] {
        let x = (crate::math::wrap_unit(u) * self.width as f32) as i32;
        let y = (crate::math::wrap_unit(v) * self.height as f32) as i32;
        self.texel(x, y)
    }

    /// Bilinear sample at texel-space coordinates with wraparound.
    /// Degenerate textures (a dimension below 2) fall back to nearest.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> [u8; 4] {
        if self.width < 2 || self.height < 2 {
            return self.texel(x.floor() as i32, y.floor() as i32);
        }

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let c00 = self.texel(x0, y0);
        let c10 = self.texel(x0 + 1, y0);
        let c01 = self.texel(x0, y0 + 1);
        let c11 = self.texel(x0 + 1, y0 + 1);

        let mut out = [0u8; 4];
        for ch in 0..4 {
            let top = lerp(c00[ch] as f32, c10[ch] as f32, fx);
            let bottom = lerp(c01[ch] as f32, c11[ch] as f32, fx);
            out[ch] = lerp(top, bottom, fy).round() as u8;
        }
        out
    }
}

/// Decode an image file to a luminance buffer for heightfield construction.
/// Returns `(width, height, luma)` with luma values in `[0, 255]`.
pub fn decode_luma(path: impl AsRef<Path>) -> Result<(u32, u32, Vec<f32>)> {
    let img = image::open(path)?.to_luma8();
    let (width, height) = img.dimensions();
    let luma = img.pixels().map(|p| p.0[0] as f32).collect();
    Ok((width, height, luma))
}
