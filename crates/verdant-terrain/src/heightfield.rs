//! Heightfield construction: edge falloff shaping and per-cell biome heights.
//!
//! Each cell's height is `noise * falloff * biome.height_multiplier +
//! biome.height_offset`, with the biome chosen from the moisture field. Cells
//! inside the falloff band are additionally flagged as shoreline, which
//! overrides the moisture classification for rendering and placement.

use serde::{Deserialize, Serialize};

use crate::biome::{BiomeId, BiomeTable};
use crate::grid::Grid;
use crate::noise_map::NoiseField;

/// Default width of the falloff band, in cells.
pub const DEFAULT_FALLOFF_BAND: f64 = 18.0;

/// How distance to the map boundary is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FalloffShape {
    /// Distance to the nearest map edge. Produces square islands.
    #[default]
    Square,
    /// Distance from the inscribed circle's rim. Produces round islands.
    Radial,
}

/// Multiplicative shaping that fades heights toward the map boundary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeFalloff {
    /// Boundary distance metric.
    pub shape: FalloffShape,
    /// Width of the band over which heights fade to zero, in cells.
    pub band: f64,
}

impl Default for EdgeFalloff {
    fn default() -> Self {
        Self {
            shape: FalloffShape::Square,
            band: DEFAULT_FALLOFF_BAND,
        }
    }
}

impl EdgeFalloff {
    /// Distance from cell `(x, y)` to the boundary under this shape.
    ///
    /// Negative for radial cells outside the inscribed circle.
    pub fn edge_distance(&self, x: usize, y: usize, width: usize, height: usize) -> f64 {
        match self.shape {
            FalloffShape::Square => {
                let right = width.saturating_sub(1).saturating_sub(x);
                let bottom = height.saturating_sub(1).saturating_sub(y);
                x.min(y).min(right).min(bottom) as f64
            }
            FalloffShape::Radial => {
                let cx = width as f64 / 2.0;
                let cy = height as f64 / 2.0;
                let rim = width.min(height) as f64 / 2.0;
                let dist = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
                rim - dist
            }
        }
    }

    /// Falloff factor in `[0, 1]`: zero on the boundary, one past the band.
    pub fn factor(&self, x: usize, y: usize, width: usize, height: usize) -> f64 {
        if self.band <= 0.0 {
            return 1.0;
        }
        let d = self.edge_distance(x, y, width, height);
        inverse_lerp(0.0, self.band, d).clamp(0.0, 1.0)
    }

    /// Returns `true` if the cell lies inside the falloff band.
    pub fn is_shoreline(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        self.band > 0.0 && self.edge_distance(x, y, width, height) < self.band
    }
}

#[inline]
fn inverse_lerp(a: f64, b: f64, v: f64) -> f64 {
    if a == b { 0.0 } else { (v - a) / (b - a) }
}

/// Final terrain data handed to mesh/collider construction.
#[derive(Clone, Debug)]
pub struct Heightfield {
    heights: Grid<f64>,
    biomes: Grid<BiomeId>,
    shoreline: Grid<bool>,
}

impl Heightfield {
    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.heights.width()
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.heights.height()
    }

    /// World-space height at cell `(x, y)`.
    pub fn height_at(&self, x: usize, y: usize) -> f64 {
        *self.heights.get(x, y)
    }

    /// Moisture-classified biome at cell `(x, y)`.
    pub fn biome_at(&self, x: usize, y: usize) -> BiomeId {
        *self.biomes.get(x, y)
    }

    /// Whether cell `(x, y)` lies in the shoreline band.
    pub fn is_shoreline(&self, x: usize, y: usize) -> bool {
        *self.shoreline.get(x, y)
    }

    /// All heights.
    pub fn heights(&self) -> &Grid<f64> {
        &self.heights
    }

    /// All biome IDs.
    pub fn biomes(&self) -> &Grid<BiomeId> {
        &self.biomes
    }

    /// All shoreline flags.
    pub fn shoreline(&self) -> &Grid<bool> {
        &self.shoreline
    }

    /// Minimum and maximum height, or `None` for an empty field.
    pub fn height_range(&self) -> Option<(f64, f64)> {
        let slice = self.heights.as_slice();
        if slice.is_empty() {
            return None;
        }
        let min = slice.iter().copied().fold(f64::INFINITY, f64::min);
        let max = slice.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

/// Combine a height noise field and a moisture field into a [`Heightfield`].
///
/// The output has the dimensions of `height_noise`; `moisture` is read with
/// border clamping should its dimensions differ.
pub fn build_heightfield(
    height_noise: &NoiseField,
    moisture: &NoiseField,
    table: &BiomeTable,
    falloff: &EdgeFalloff,
) -> Heightfield {
    let width = height_noise.width();
    let height = height_noise.height();

    let biomes = Grid::from_fn(width, height, |x, y| {
        let m = moisture
            .get_clamped(x as f64, y as f64)
            .copied()
            .unwrap_or(0.0);
        table.classify(m)
    });

    let heights = Grid::from_fn(width, height, |x, y| {
        let shaped = height_noise.get(x, y) * falloff.factor(x, y, width, height);
        table.get(*biomes.get(x, y)).apply_height(shaped)
    });

    let shoreline = Grid::from_fn(width, height, |x, y| falloff.is_shoreline(x, y, width, height));

    Heightfield {
        heights,
        biomes,
        shoreline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeDef;

    const EPSILON: f64 = 1e-12;

    fn two_biomes() -> BiomeTable {
        let mut low = BiomeDef::new("Low", 0.0, 0.5);
        low.height_multiplier = 2.0;
        low.height_offset = 1.0;
        let mut high = BiomeDef::new("High", 0.5, 1.0);
        high.height_multiplier = 10.0;
        high.height_offset = -3.0;
        BiomeTable::new(vec![low, high]).unwrap()
    }

    #[test]
    fn test_square_falloff_profile() {
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band: 4.0,
        };
        assert_eq!(falloff.factor(0, 10, 20, 20), 0.0);
        assert!((falloff.factor(2, 10, 20, 20) - 0.5).abs() < EPSILON);
        assert_eq!(falloff.factor(4, 10, 20, 20), 1.0);
        assert_eq!(falloff.factor(10, 10, 20, 20), 1.0);
        assert_eq!(falloff.factor(19, 10, 20, 20), 0.0, "far edge is distance 0");
    }

    #[test]
    fn test_radial_falloff_profile() {
        let falloff = EdgeFalloff {
            shape: FalloffShape::Radial,
            band: 5.0,
        };
        assert_eq!(falloff.factor(10, 10, 20, 20), 1.0, "center is inland");
        assert_eq!(falloff.factor(0, 0, 20, 20), 0.0, "corner lies outside the rim");
        assert!(!falloff.is_shoreline(10, 7, 20, 20));
        assert!(falloff.is_shoreline(10, 2, 20, 20));
    }

    #[test]
    fn test_zero_band_disables_falloff() {
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band: 0.0,
        };
        assert_eq!(falloff.factor(0, 0, 10, 10), 1.0);
        assert!(!falloff.is_shoreline(0, 0, 10, 10));
    }

    #[test]
    fn test_height_formula() {
        let table = two_biomes();
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band: 2.0,
        };
        let noise = Grid::filled(8, 8, 0.5);
        let moisture = Grid::from_fn(8, 8, |x, _| if x < 4 { 0.2 } else { 0.8 });
        let field = build_heightfield(&noise, &moisture, &table, &falloff);

        // Inland low cell: 0.5 * 1 * 2 + 1.
        assert!((field.height_at(3, 3) - 2.0).abs() < EPSILON);
        // Inland high cell: 0.5 * 1 * 10 - 3.
        assert!((field.height_at(4, 4) - 2.0).abs() < EPSILON);
        // Band cell at distance 1: 0.5 * 0.5 * 2 + 1.
        assert!((field.height_at(1, 3) - 1.5).abs() < EPSILON);
        // Boundary cell keeps only the offset.
        assert!((field.height_at(0, 3) - 1.0).abs() < EPSILON);
        assert!((field.height_at(7, 3) + 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_shoreline_band_overrides_moisture() {
        let table = two_biomes();
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band: 2.0,
        };
        let noise = Grid::filled(10, 10, 1.0);
        let moisture = Grid::filled(10, 10, 0.9);
        let field = build_heightfield(&noise, &moisture, &table, &falloff);

        for (x, y, &shore) in field.shoreline().iter() {
            let d = x.min(y).min(9 - x).min(9 - y);
            assert_eq!(shore, d < 2, "cell ({x}, {y}) shoreline flag");
            assert_eq!(field.biome_at(x, y), BiomeId(1), "biome id stays moisture-based");
        }
    }

    #[test]
    fn test_height_range() {
        let table = two_biomes();
        let noise = Grid::from_fn(6, 6, |x, _| x as f64 / 5.0);
        let moisture = Grid::filled(6, 6, 0.1);
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band: 0.0,
        };
        let field = build_heightfield(&noise, &moisture, &table, &falloff);
        let (min, max) = field.height_range().unwrap();
        assert!((min - 1.0).abs() < EPSILON);
        assert!((max - 3.0).abs() < EPSILON);
    }
}
