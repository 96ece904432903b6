//! World generation pipeline.
//!
//! seed → height and moisture noise → vegetation candidates → flattening →
//! heightfield → (ground committed) → props and grass.
//!
//! Scattering needs ground queries, and ground exists only once a [`World`]
//! has been built, so the type system enforces that ordering.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::biome::{BiomeId, BiomeTable};
use crate::grass::{GrassInstance, place_grass};
use crate::heightfield::{EdgeFalloff, Heightfield, build_heightfield};
use crate::mesh::{TerrainMesh, build_terrain_mesh};
use crate::noise_map::{NoiseField, NoiseParams, generate_noise_map};
use crate::seed::{STREAM_GRASS, STREAM_PROPS, STREAM_VEGETATION, stream_rng};
use crate::vegetation::{
    DEFAULT_VEGETATION_STRIDE, FlattenParams, PropInstance, VegetationPlacement, flatten_around,
    place_props, select_placements,
};

/// How the moisture field is derived from the height noise parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureParams {
    /// Multiplier on the height noise scale.
    pub scale_factor: f64,
    /// Number of octaves.
    pub octaves: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f64,
    /// Frequency multiplier between octaves.
    pub lacunarity: f64,
}

impl Default for MoistureParams {
    fn default() -> Self {
        Self {
            scale_factor: 2.0,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl MoistureParams {
    /// Noise parameters for the moisture field given the height parameters.
    pub fn noise_params(&self, height: &NoiseParams) -> NoiseParams {
        NoiseParams {
            scale: height.scale * self.scale_factor,
            octaves: self.octaves,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
            offset: height.offset,
        }
    }
}

/// Everything needed to generate a world, loaded once before generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Map width in cells.
    pub width: usize,
    /// Map height in cells.
    pub height: usize,
    /// World seed. The moisture field uses `seed + 1`.
    pub seed: u64,
    /// Height noise parameters.
    pub noise: NoiseParams,
    /// Moisture noise parameters.
    pub moisture: MoistureParams,
    /// Edge falloff shaping.
    pub falloff: EdgeFalloff,
    /// Flattening under vegetation.
    pub flatten: FlattenParams,
    /// Stride between vegetation candidates.
    pub vegetation_stride: usize,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            seed: 0,
            noise: NoiseParams::default(),
            moisture: MoistureParams::default(),
            falloff: EdgeFalloff::default(),
            flatten: FlattenParams::default(),
            vegetation_stride: DEFAULT_VEGETATION_STRIDE,
        }
    }
}

/// Resolves the biome at a world-space planar position.
pub trait BiomeLocator {
    /// Biome at world `(x, z)`.
    fn biome_at(&self, x: f64, z: f64) -> BiomeId;
}

/// Props and grass scattered over a generated world.
#[derive(Clone, Debug, Default)]
pub struct VegetationScatter {
    /// Trees, rocks, bushes.
    pub props: Vec<PropInstance>,
    /// Grass blades.
    pub grass: Vec<GrassInstance>,
}

/// Generates [`World`]s from parameters and a biome table.
pub struct WorldGenerator {
    params: WorldParams,
    table: BiomeTable,
}

impl WorldGenerator {
    /// Create a generator.
    pub fn new(params: WorldParams, table: BiomeTable) -> Self {
        Self { params, table }
    }

    /// Generation parameters.
    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    /// Run the generation pass. Blocking; the world is playable afterwards.
    pub fn generate(&self) -> World {
        let p = &self.params;

        let mut height_noise = generate_noise_map(p.width, p.height, p.seed, &p.noise);
        let moisture = generate_noise_map(
            p.width,
            p.height,
            p.seed.wrapping_add(1),
            &p.moisture.noise_params(&p.noise),
        );
        debug!(width = p.width, height = p.height, seed = p.seed, "noise fields generated");

        let mut rng = stream_rng(p.seed, STREAM_VEGETATION);
        let placements =
            select_placements(&moisture, &self.table, &p.falloff, p.vegetation_stride, &mut rng);
        flatten_around(&mut height_noise, &placements, &p.flatten);
        debug!(placements = placements.len(), "terrain flattened under vegetation");

        let heightfield = build_heightfield(&height_noise, &moisture, &self.table, &p.falloff);

        info!(
            width = p.width,
            height = p.height,
            seed = p.seed,
            placements = placements.len(),
            "world generated"
        );

        World {
            params: p.clone(),
            table: self.table.clone(),
            moisture,
            heightfield,
            placements,
        }
    }
}

/// A generated world: immutable terrain plus the vegetation plan.
#[derive(Clone, Debug)]
pub struct World {
    params: WorldParams,
    table: BiomeTable,
    moisture: NoiseField,
    heightfield: Heightfield,
    placements: Vec<VegetationPlacement>,
}

impl World {
    /// Parameters the world was generated from.
    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    /// Biome table.
    pub fn biomes(&self) -> &BiomeTable {
        &self.table
    }

    /// Moisture field.
    pub fn moisture(&self) -> &NoiseField {
        &self.moisture
    }

    /// Final heightfield.
    pub fn heightfield(&self) -> &Heightfield {
        &self.heightfield
    }

    /// Vegetation placements chosen during generation.
    pub fn placements(&self) -> &[VegetationPlacement] {
        &self.placements
    }

    /// Renderable/collidable mesh for the external engine.
    pub fn mesh(&self) -> TerrainMesh {
        build_terrain_mesh(&self.heightfield)
    }

    /// Instantiate props and grass against this world's ground.
    pub fn scatter_vegetation(&self) -> VegetationScatter {
        let seed = self.params.seed;
        let props = place_props(
            &self.placements,
            &self.table,
            &self.heightfield,
            &mut stream_rng(seed, STREAM_PROPS),
        );
        let grass = place_grass(
            &self.moisture,
            &self.table,
            &self.params.falloff,
            &self.heightfield,
            &mut stream_rng(seed, STREAM_GRASS),
        );
        debug!(props = props.len(), grass = grass.len(), "vegetation scattered");
        VegetationScatter { props, grass }
    }
}

impl BiomeLocator for World {
    /// Moisture classification at the nearest cell, clamped to the map.
    fn biome_at(&self, x: f64, z: f64) -> BiomeId {
        self.moisture
            .get_clamped(x, z)
            .map_or(BiomeId::FALLBACK, |&m| self.table.classify(m))
    }
}

impl crate::ground::GroundQuery for World {
    fn raycast_down(&self, origin: glam::DVec3, max_distance: f64) -> Option<crate::GroundHit> {
        self.heightfield.raycast_down(origin, max_distance)
    }
}
