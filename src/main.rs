//! Terravox demo — renders a fly-through over procedural terrain to PNGs.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --size <N>       Heightfield size in samples (default: 512)
//!   --seed <SEED>    Terrain noise seed (default: 12345)
//!   --frames <N>     Number of frames to render (default: 8)
//!   --width <W>      Output width in pixels (default: 320)
//!   --height <H>     Output height in pixels (default: 240)
//!   --water <LEVEL>  Water level; negative disables (default: 60)
//!   --out <DIR>      Output directory (default: "frames")

use std::path::PathBuf;
use std::time::Instant;

use glam::Vec3;

use terravox::billboard::BillboardKind;
use terravox::core::logging;
use terravox::core::types::Result;
use terravox::heightfield::{HeightfieldGenerator, TerrainParams};
use terravox::texture::{Texture, TextureHandle};
use terravox::RenderContext;

fn main() {
    logging::init();
    if let Err(e) = run() {
        log::error!("demo failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let size = parse_u32_arg(&args, "--size").unwrap_or(512);
    let seed = parse_u32_arg(&args, "--seed").unwrap_or(12345);
    let frames = parse_u32_arg(&args, "--frames").unwrap_or(8);
    let width = parse_u32_arg(&args, "--width").unwrap_or(320);
    let height = parse_u32_arg(&args, "--height").unwrap_or(240);
    let water = parse_f32_arg(&args, "--water").unwrap_or(60.0);
    let out_dir = parse_str_arg(&args, "--out").unwrap_or_else(|| "frames".to_string());

    println!("=== Terravox Demo ===");
    println!("Heightfield: {size}x{size} (seed {seed})");
    println!("Output: {frames} frames at {width}x{height} -> {out_dir}/");
    println!();

    let out_dir = PathBuf::from(out_dir);
    std::fs::create_dir_all(&out_dir)?;

    let mut ctx = RenderContext::new();
    ctx.config.set_water_level(water);
    ctx.config.max_distance = 800.0;

    let generator = HeightfieldGenerator::new(TerrainParams {
        seed,
        ..Default::default()
    });
    let samples = generator.generate(size, size);
    let field = ctx.heightfields.create_from_heights(size, size, samples)?;

    // A few enemy billboards scattered ahead of the camera path
    let sprite = disc_sprite(&mut ctx)?;
    for i in 0..6u32 {
        let x = size as f32 * 0.5 + 40.0 + i as f32 * 30.0;
        let y = size as f32 * 0.5 + (i as f32 * 1.7).sin() * 50.0;
        let z = generator.height_at(x, y) + 8.0;
        ctx.billboards
            .register(BillboardKind::Enemy, Vec3::new(x, y, z), sprite, 1.0, 0)?;
    }

    let start = Instant::now();
    for frame in 0..frames {
        let t = frame as f32 / frames.max(1) as f32;
        let cam_x = size as f32 * 0.5 + t * 60.0;
        let cam_y = size as f32 * 0.5;
        let cam_z = generator.height_at(cam_x, cam_y) + 40.0;
        ctx.set_camera(cam_x, cam_y, cam_z, 0.0, -0.1, std::f32::consts::FRAC_PI_3);

        let raster = ctx.render(field, width, height)?;
        let path = out_dir.join(format!("frame_{frame:03}.png"));
        save_png(&ctx, raster, &path)?;
        ctx.textures.destroy(raster)?;

        log::info!(
            "frame {frame} (stride {}) -> {}",
            ctx.quality_stride(),
            path.display()
        );
        ctx.advance_time(1.0 / 30.0);
    }

    println!(
        "Rendered {frames} frames in {:.2}s",
        start.elapsed().as_secs_f32()
    );
    Ok(())
}

/// Register a simple circular sprite texture for the demo billboards.
fn disc_sprite(ctx: &mut RenderContext) -> Result<TextureHandle> {
    const SIZE: u32 = 16;
    let mut pixels = Vec::with_capacity((SIZE * SIZE) as usize);
    let center = SIZE as f32 / 2.0 - 0.5;
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if (dx * dx + dy * dy).sqrt() <= center {
                pixels.push([220, 40, 40, 255]);
            } else {
                pixels.push([0, 0, 0, 0]);
            }
        }
    }
    let texture = Texture::from_pixels(SIZE, SIZE, pixels)
        .ok_or_else(|| std::io::Error::other("sprite buffer mismatch"))?;
    ctx.textures.insert(texture)
}

/// Write a rendered raster out as a PNG.
fn save_png(ctx: &RenderContext, raster: TextureHandle, path: &PathBuf) -> Result<()> {
    let tex = ctx
        .textures
        .get(raster)
        .ok_or_else(|| std::io::Error::other("raster handle missing"))?;
    let bytes: Vec<u8> = tex.pixels().iter().flatten().copied().collect();
    image::save_buffer(
        path,
        &bytes,
        tex.width(),
        tex.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.clone())
}
