//! Normalized multi-octave noise fields.
//!
//! Composites octaves of Perlin noise over a finite grid, then rescales the
//! whole field so its minimum maps to `0.0` and its maximum to `1.0`. Each
//! octave is displaced by an offset drawn from a ChaCha stream seeded with the
//! field seed, so two fields with different seeds sample unrelated regions of
//! the same underlying noise lattice.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// A grid of noise values normalized to `[0.0, 1.0]`.
pub type NoiseField = Grid<f64>;

/// Smallest accepted noise scale. Non-positive scales are raised to this.
pub const MIN_SCALE: f64 = 0.0001;

/// Half-width of the range octave offsets are drawn from.
pub const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Value every cell takes when the raw field is perfectly flat.
pub const DEGENERATE_FIELD_VALUE: f64 = 0.5;

/// Parameters for a fractal noise field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Cells per noise unit at the first octave. Larger values zoom in.
    pub scale: f64,
    /// Number of octaves to composite.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Caller offset added to every octave offset, in noise units.
    pub offset: (f64, f64),
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: (0.0, 0.0),
        }
    }
}

/// Sample Perlin noise remapped from `[-1, 1]` to `[0, 1]`.
#[inline]
fn unit_perlin(perlin: &Perlin, x: f64, y: f64) -> f64 {
    ((perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Draw one offset pair per octave from a stream seeded exactly by `seed`.
pub fn octave_offsets(seed: u64, octaves: u32, offset: (f64, f64)) -> Vec<(f64, f64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..octaves)
        .map(|_| {
            let ox = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64 + offset.0;
            let oy = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64 + offset.1;
            (ox, oy)
        })
        .collect()
}

/// Generate a `width × height` noise field normalized to `[0, 1]`.
///
/// The output is a pure function of the arguments. A flat raw field (every
/// cell equal, e.g. zero octaves) maps uniformly to [`DEGENERATE_FIELD_VALUE`].
pub fn generate_noise_map(width: usize, height: usize, seed: u64, params: &NoiseParams) -> NoiseField {
    let scale = if params.scale <= 0.0 || !params.scale.is_finite() {
        tracing::warn!(scale = params.scale, "noise scale must be positive, clamping");
        MIN_SCALE
    } else {
        params.scale
    };

    let perlin = Perlin::default();
    let offsets = octave_offsets(seed, params.octaves, params.offset);

    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    let raw = Grid::from_fn(width, height, |x, y| {
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut noise_height = 0.0;

        for &(ox, oy) in &offsets {
            let sx = (x as f64 - half_width) / scale * frequency + ox;
            let sy = (y as f64 - half_height) / scale * frequency + oy;
            let sample = unit_perlin(&perlin, sx, sy);
            noise_height += (sample * 2.0 - 1.0) * amplitude;

            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }

        min = min.min(noise_height);
        max = max.max(noise_height);
        noise_height
    });

    let range = max - min;
    if !(range > 0.0) || !range.is_finite() {
        return Grid::filled(width, height, DEGENERATE_FIELD_VALUE);
    }

    Grid::from_fn(width, height, |x, y| {
        ((raw.get(x, y) - min) / range).clamp(0.0, 1.0)
    })
}
