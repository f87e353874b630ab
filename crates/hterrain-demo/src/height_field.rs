//! Procedural terrain heights for the vertical bounds callback.
//!
//! Multi-octave fBm over simplex noise. A quadrant's bounds are estimated
//! from its four corners and its centre, which is coarse for large
//! quadrants but cheap and deterministic.

use hterrain_config::TerrainSettings;
use hterrain_lod::{QuadCoord, VerticalBounds, lod_factor};
use noise::{NoiseFn, Simplex};

/// Frequency multiplier between octaves.
const LACUNARITY: f64 = 2.0;
/// Amplitude multiplier between octaves.
const PERSISTENCE: f64 = 0.5;

/// Height sampler over the XZ plane.
pub struct HeightField {
    noise: Simplex,
    settings: TerrainSettings,
    base_size: u32,
}

impl HeightField {
    pub fn new(settings: TerrainSettings, base_size: u32) -> Self {
        Self {
            noise: Simplex::new(settings.seed),
            settings,
            base_size,
        }
    }

    /// Terrain height at world `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> f32 {
        let mut total = 0.0;
        let mut frequency = self.settings.base_frequency;
        let mut amplitude = f64::from(self.settings.amplitude);

        for _ in 0..self.settings.octaves {
            total += self.noise.get([x * frequency, z * frequency]) * amplitude;
            frequency *= LACUNARITY;
            amplitude *= PERSISTENCE;
        }

        total as f32
    }

    /// Height range over a quadrant, from its corners and centre.
    pub fn bounds(&self, coord: QuadCoord) -> VerticalBounds {
        let size = f64::from(self.base_size) * f64::from(lod_factor(coord.lod));
        let x0 = f64::from(coord.x) * size;
        let z0 = f64::from(coord.y) * size;
        let samples = [
            (x0, z0),
            (x0 + size, z0),
            (x0, z0 + size),
            (x0 + size, z0 + size),
            (x0 + size * 0.5, z0 + size * 0.5),
        ];

        let mut bounds = VerticalBounds::new(f32::INFINITY, f32::NEG_INFINITY);
        for (x, z) in samples {
            let height = self.sample(x, z);
            bounds.min = bounds.min.min(height);
            bounds.max = bounds.max.max(height);
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> HeightField {
        HeightField::new(TerrainSettings::default(), 16)
    }

    #[test]
    fn test_same_seed_same_height() {
        let a = field();
        let b = field();
        assert_eq!(a.sample(100.0, 200.0), b.sample(100.0, 200.0));
    }

    #[test]
    fn test_height_within_amplitude_sum() {
        let field = field();
        let settings = TerrainSettings::default();
        let limit = settings.amplitude * 2.0;
        for i in 0..50 {
            let h = field.sample(f64::from(i) * 37.0, f64::from(i) * -11.0);
            assert!(h.abs() <= limit, "height {h} exceeds {limit}");
        }
    }

    #[test]
    fn test_bounds_are_valid_and_cover_samples() {
        let field = field();
        let coord = QuadCoord::new(3, 2, 2);
        let bounds = field.bounds(coord);
        assert!(bounds.is_valid());

        // Corner (3 * 64, 2 * 64) is one of the sample points.
        let corner = field.sample(192.0, 128.0);
        assert!(bounds.min <= corner && corner <= bounds.max);
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let settings = TerrainSettings {
            octaves: 0,
            ..TerrainSettings::default()
        };
        let field = HeightField::new(settings, 16);
        assert_eq!(field.bounds(QuadCoord::root(4)), VerticalBounds::new(0.0, 0.0));
    }
}
