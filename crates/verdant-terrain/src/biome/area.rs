//! Sparse biome surface-area estimation over a moisture field.

use hashbrown::HashMap;

use super::{BiomeId, BiomeTable};
use crate::noise_map::NoiseField;

/// Default stride (cells) between area samples.
pub const AREA_SAMPLE_STRIDE: usize = 5;

/// Estimates the surface area of each biome by classifying every
/// `stride`-th cell of the moisture field and crediting it `stride²` cells.
///
/// Every biome in the table gets an entry, including those no sample hit.
/// A stride of zero is treated as one.
pub fn estimate_biome_areas(
    moisture: &NoiseField,
    table: &BiomeTable,
    stride: usize,
) -> HashMap<BiomeId, f64> {
    let stride = stride.max(1);
    let sample_area = (stride * stride) as f64;

    let mut areas: HashMap<BiomeId, f64> = table.iter().map(|(id, _)| (id, 0.0)).collect();
    for y in (0..moisture.height()).step_by(stride) {
        for x in (0..moisture.width()).step_by(stride) {
            let biome = table.classify(*moisture.get(x, y));
            *areas.entry(biome).or_insert(0.0) += sample_area;
        }
    }
    areas
}
