//! Biome system: moisture-interval definitions and first-match classification.
//!
//! Biomes are authored once as static configuration and looked up by the
//! moisture value of a cell. The first definition is the fallback for values
//! no interval covers.

mod area;
mod def;
mod table;

pub use area::{AREA_SAMPLE_STRIDE, estimate_biome_areas};
pub use def::{BiomeDef, GrassParams, VegetationSet};
pub use table::{BiomeId, BiomeTable, BiomeTableError};
