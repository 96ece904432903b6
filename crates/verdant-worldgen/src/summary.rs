//! JSON run summary.

use serde::Serialize;
use verdant_terrain::{VegetationScatter, World, estimate_biome_areas};

use crate::sim::SimulationReport;

/// Per-biome statistics.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BiomeSummary {
    /// Biome name.
    pub name: String,
    /// Cells classified into this biome.
    pub cells: usize,
    /// Of those, cells inside the shoreline band.
    pub shoreline_cells: usize,
    /// Sparse-sampled area estimate used for population caps.
    pub estimated_area: f64,
    /// Props placed.
    pub props: usize,
    /// Grass blades placed.
    pub grass: usize,
}

/// Everything worth knowing about a generation run.
#[derive(Clone, Debug, Serialize)]
pub struct WorldSummary {
    /// World seed.
    pub seed: u64,
    /// Map width in cells.
    pub width: usize,
    /// Map height in cells.
    pub height: usize,
    /// Lowest terrain height.
    pub min_height: f64,
    /// Highest terrain height.
    pub max_height: f64,
    /// Vegetation placements chosen before flattening.
    pub placements: usize,
    /// Per-biome breakdown in table order.
    pub biomes: Vec<BiomeSummary>,
    /// Population simulation counters.
    pub population: SimulationReport,
}

/// Collect the summary for a generated, scattered, and simulated world.
pub fn summarize(
    world: &World,
    scatter: &VegetationScatter,
    population: SimulationReport,
) -> WorldSummary {
    let table = world.biomes();
    let field = world.heightfield();
    let params = world.params();
    let areas = estimate_biome_areas(world.moisture(), table, verdant_terrain::AREA_SAMPLE_STRIDE);

    let mut biomes: Vec<BiomeSummary> = table
        .iter()
        .map(|(id, def)| BiomeSummary {
            name: def.name.clone(),
            estimated_area: areas.get(&id).copied().unwrap_or(0.0),
            ..Default::default()
        })
        .collect();

    for (x, y, biome) in field.biomes().iter() {
        let entry = &mut biomes[biome.0 as usize];
        entry.cells += 1;
        entry.shoreline_cells += usize::from(field.is_shoreline(x, y));
    }
    for prop in &scatter.props {
        biomes[prop.biome.0 as usize].props += 1;
    }
    for blade in &scatter.grass {
        biomes[blade.biome.0 as usize].grass += 1;
    }

    let (min_height, max_height) = field.height_range().unwrap_or((0.0, 0.0));
    WorldSummary {
        seed: params.seed,
        width: field.width(),
        height: field.height(),
        min_height,
        max_height,
        placements: world.placements().len(),
        biomes,
        population,
    }
}
