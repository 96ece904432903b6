//! Grass patches: a dense per-cell pass snapped to committed ground.

use glam::{DVec2, DVec3};
use rand::Rng;

use crate::biome::{BiomeId, BiomeTable};
use crate::ground::GroundQuery;
use crate::heightfield::EdgeFalloff;
use crate::noise_map::NoiseField;
use crate::seed::inside_unit_circle;
use crate::vegetation::INSTANCE_SCALE_RANGE;

/// A single grass blade instance.
#[derive(Clone, Debug, PartialEq)]
pub struct GrassInstance {
    /// Grass prefab identifier.
    pub prefab: String,
    /// Ground point.
    pub position: DVec3,
    /// Surface normal the blade is aligned to.
    pub normal: DVec3,
    /// Rotation about the normal, in degrees.
    pub yaw_degrees: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Biome of the patch cell.
    pub biome: BiomeId,
}

/// Scatter grass patches over every non-shoreline cell whose biome has grass.
///
/// Each accepted cell spawns `per_patch` blades jittered within the biome's
/// spread radius. Blades whose probe finds no ground are dropped.
pub fn place_grass(
    moisture: &NoiseField,
    table: &BiomeTable,
    falloff: &EdgeFalloff,
    ground: &impl GroundQuery,
    rng: &mut impl Rng,
) -> Vec<GrassInstance> {
    let (w, h) = (moisture.width(), moisture.height());
    let mut blades = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if falloff.is_shoreline(x, y, w, h) {
                continue;
            }
            let biome = table.classify(*moisture.get(x, y));
            let Some(grass) = &table.get(biome).grass else {
                continue;
            };
            if rng.random::<f64>() >= grass.density {
                continue;
            }

            let center = DVec2::new(x as f64, y as f64);
            for _ in 0..grass.per_patch {
                let p = center + inside_unit_circle(rng) * grass.spread_radius;
                let Some(hit) = ground.probe_from_sky(p.x, p.y) else {
                    continue;
                };
                blades.push(GrassInstance {
                    prefab: grass.prefab.clone(),
                    position: hit.point,
                    normal: hit.normal,
                    yaw_degrees: rng.random_range(0.0..360.0),
                    scale: rng.random_range(INSTANCE_SCALE_RANGE.0..=INSTANCE_SCALE_RANGE.1),
                    biome,
                });
            }
        }
    }

    blades
}
