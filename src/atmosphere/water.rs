//! Water surface animation and underwater tinting.

/// Light attenuation applied while the camera is below the water level.
pub const UNDERWATER_LIGHT_FACTOR: f32 = 0.7;

/// Blue-shifted tint blended into the background while underwater.
pub const UNDERWATER_TINT: [u8; 3] = [24, 70, 140];

/// Fallback water color when no water texture is bound.
pub const WATER_COLOR: [u8; 4] = [30, 90, 160, 255];

/// Animated wave height offset at a world position.
///
/// Sum of three sine waves at distinct frequencies and phases, driven by
/// elapsed session time and scaled by the configured wave amplitude.
pub fn wave_height(x: f32, y: f32, time: f32, amplitude: f32) -> f32 {
    let mut h = 0.0;

    // Large slow swells
    h += 0.5 * (x * 0.02 + time * 0.5).sin();
    // Medium cross-waves
    h += 0.3 * (y * 0.05 - time * 1.2).sin();
    // Small chop
    h += 0.2 * ((x + y) * 0.11 + time * 2.3).sin();

    amplitude * h
}

/// Scrolling UV for the animated water texture, derived from world position
/// and elapsed time. Values wrap in the sampler.
pub fn surface_uv(x: f32, y: f32, time: f32) -> (f32, f32) {
    (x * 0.05 + time * 0.03, y * 0.05 - time * 0.02)
}

/// Blend a color halfway toward the underwater tint.
pub fn apply_underwater_tint(color: [u8; 4]) -> [u8; 4] {
    [
        ((color[0] as u16 + UNDERWATER_TINT[0] as u16) / 2) as u8,
        ((color[1] as u16 + UNDERWATER_TINT[1] as u16) / 2) as u8,
        ((color[2] as u16 + UNDERWATER_TINT[2] as u16) / 2) as u8,
        color[3],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waves_animate_over_time() {
        let h1 = wave_height(10.0, 10.0, 0.0, 2.0);
        let h2 = wave_height(10.0, 10.0, 1.0, 2.0);
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_waves_vary_over_space() {
        let t = 3.0;
        assert_ne!(
            wave_height(0.0, 0.0, t, 2.0),
            wave_height(40.0, 25.0, t, 2.0)
        );
    }

    #[test]
    fn test_zero_amplitude_is_flat() {
        assert_eq!(wave_height(10.0, 20.0, 5.0, 0.0), 0.0);
    }

    #[test]
    fn test_wave_height_bounded_by_amplitude() {
        for i in 0..100 {
            let h = wave_height(i as f32 * 3.7, i as f32 * 1.3, i as f32 * 0.1, 1.0);
            assert!(h.abs() <= 1.0);
        }
    }

    #[test]
    fn test_surface_uv_scrolls() {
        let (u0, v0) = surface_uv(0.0, 0.0, 0.0);
        let (u1, v1) = surface_uv(0.0, 0.0, 10.0);
        assert_ne!(u0, u1);
        assert_ne!(v0, v1);
    }
}
