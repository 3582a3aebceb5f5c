//! Noise-based procedural heightfield generation

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Parameters controlling heightfield generation
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical scale (max height)
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 100.0,
            height_scale: 255.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Procedural heightfield generator using fractal Brownian motion (FBM)
pub struct HeightfieldGenerator {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl HeightfieldGenerator {
    /// Create a new generator with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Terrain height at grid position (x, y)
    pub fn height_at(&self, x: f32, y: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let ny = (y / self.params.scale) as f64;

        // Noise value in [-1, 1], mapped to [0, height_scale]
        let noise_value = self.noise.get([nx, ny]);
        let normalized = (noise_value + 1.0) / 2.0;
        (normalized * self.params.height_scale as f64) as f32
    }

    /// Generate a dense sample grid suitable for
    /// [`HeightfieldStore::create_from_heights`](crate::heightfield::HeightfieldStore::create_from_heights).
    pub fn generate(&self, width: u32, height: u32) -> Vec<f32> {
        let mut samples = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                samples.push(self.height_at(x as f32, y as f32));
            }
        }
        samples
    }
}
