//! Procedural terrain generation: multi-octave noise, moisture-driven biome
//! assignment, heightfield shaping, and vegetation scattering.

mod grass;
mod grid;
mod ground;
mod heightfield;
mod mesh;
mod noise_map;
mod vegetation;
mod world;

pub mod biome;
pub mod debug_viz;
pub mod seed;

pub use biome::{
    AREA_SAMPLE_STRIDE, BiomeDef, BiomeId, BiomeTable, BiomeTableError, GrassParams,
    VegetationSet, estimate_biome_areas,
};
pub use grass::{GrassInstance, place_grass};
pub use grid::Grid;
pub use ground::{GroundHit, GroundQuery, VEGETATION_PROBE_ALTITUDE, VEGETATION_PROBE_DISTANCE};
pub use heightfield::{
    DEFAULT_FALLOFF_BAND, EdgeFalloff, FalloffShape, Heightfield, build_heightfield,
};
pub use mesh::{TerrainMesh, TerrainVertex, build_terrain_mesh};
pub use noise_map::{NoiseField, NoiseParams, generate_noise_map, octave_offsets};
pub use vegetation::{
    DEFAULT_VEGETATION_STRIDE, FlattenParams, INSTANCE_SCALE_RANGE, PropInstance,
    VegetationPlacement, flatten_around, place_props, select_placements,
};
pub use world::{
    BiomeLocator, MoistureParams, VegetationScatter, World, WorldGenerator, WorldParams,
};
