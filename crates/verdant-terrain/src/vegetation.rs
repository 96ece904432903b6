//! Vegetation placement: candidate selection, local terrain flattening, and
//! prop instantiation against committed ground.

use glam::{DVec2, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::biome::{BiomeId, BiomeTable};
use crate::grid::Grid;
use crate::ground::GroundQuery;
use crate::heightfield::EdgeFalloff;
use crate::noise_map::NoiseField;

/// Default stride (cells) between vegetation candidates.
pub const DEFAULT_VEGETATION_STRIDE: usize = 2;

/// Scale range applied to instantiated props and grass.
pub const INSTANCE_SCALE_RANGE: (f64, f64) = (0.8, 1.2);

/// A chosen vegetation point in fractional grid coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VegetationPlacement {
    /// Jittered grid position.
    pub position: DVec2,
    /// Biome of the sampled cell.
    pub biome: BiomeId,
}

/// Parameters for flattening terrain under vegetation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenParams {
    /// Radius of influence, in cells.
    pub radius: f64,
    /// Influence at the center, in `[0, 1]`.
    pub strength: f64,
}

impl Default for FlattenParams {
    fn default() -> Self {
        Self {
            radius: 1.5,
            strength: 0.8,
        }
    }
}

/// A prop ready to be instantiated by the external world.
#[derive(Clone, Debug, PartialEq)]
pub struct PropInstance {
    /// Prefab identifier from the biome's vegetation set.
    pub prefab: String,
    /// Ground point the prop stands on.
    pub position: DVec3,
    /// Rotation about the vertical axis, in degrees `[0, 360)`.
    pub yaw_degrees: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Biome the placement was selected in.
    pub biome: BiomeId,
}

/// Choose vegetation candidates from the moisture field.
///
/// Visits every `stride`-th cell, skips the shoreline band, and accepts cells
/// whose biome has props with probability equal to the biome's vegetation
/// density. Accepted positions are jittered by up to half a cell per axis.
pub fn select_placements(
    moisture: &NoiseField,
    table: &BiomeTable,
    falloff: &EdgeFalloff,
    stride: usize,
    rng: &mut impl Rng,
) -> Vec<VegetationPlacement> {
    let stride = stride.max(1);
    let (w, h) = (moisture.width(), moisture.height());
    let mut placements = Vec::new();

    for y in (0..h).step_by(stride) {
        for x in (0..w).step_by(stride) {
            if falloff.is_shoreline(x, y, w, h) {
                continue;
            }
            let biome = table.classify(*moisture.get(x, y));
            let def = table.get(biome);
            if def.vegetation.is_empty() {
                continue;
            }
            if rng.random::<f64>() < def.vegetation.density {
                let jx = rng.random_range(-0.5..0.5);
                let jy = rng.random_range(-0.5..0.5);
                placements.push(VegetationPlacement {
                    position: DVec2::new(x as f64 + jx, y as f64 + jy),
                    biome,
                });
            }
        }
    }

    placements
}

/// Blend heights around each placement toward the height at its center cell.
///
/// For every cell within `radius` of the rounded center, the height moves
/// toward the target by `strength * (1 - d / radius)²`. Placements apply in
/// order, so later ones blend over already-flattened values.
pub fn flatten_around(field: &mut Grid<f64>, placements: &[VegetationPlacement], params: &FlattenParams) {
    let radius = params.radius;
    if radius.is_nan() || radius <= 0.0 {
        return;
    }
    let strength = params.strength.clamp(0.0, 1.0);
    let reach = radius.ceil() as i64;

    for placement in placements {
        let cx = placement.position.x.round() as i64;
        let cy = placement.position.y.round() as i64;
        if !field.contains(cx, cy) {
            continue;
        }
        let target = *field.get(cx as usize, cy as usize);

        for y in (cy - reach)..=(cy + reach) {
            for x in (cx - reach)..=(cx + reach) {
                if !field.contains(x, y) {
                    continue;
                }
                let dist = (((x - cx).pow(2) + (y - cy).pow(2)) as f64).sqrt();
                if dist > radius {
                    continue;
                }
                let influence = (1.0 - dist / radius).powi(2) * strength;
                let cell = field.get_mut(x as usize, y as usize);
                *cell += (target - *cell) * influence;
            }
        }
    }
}

/// Turn placements into props standing on the ground.
///
/// Placements whose probe finds no ground are skipped silently.
pub fn place_props(
    placements: &[VegetationPlacement],
    table: &BiomeTable,
    ground: &impl GroundQuery,
    rng: &mut impl Rng,
) -> Vec<PropInstance> {
    let mut props = Vec::with_capacity(placements.len());
    for placement in placements {
        let prefabs = &table.get(placement.biome).vegetation.prefabs;
        if prefabs.is_empty() {
            continue;
        }
        let prefab = &prefabs[rng.random_range(0..prefabs.len())];
        let Some(hit) = ground.probe_from_sky(placement.position.x, placement.position.y) else {
            continue;
        };
        props.push(PropInstance {
            prefab: prefab.clone(),
            position: hit.point,
            yaw_degrees: rng.random_range(0.0..360.0),
            scale: rng.random_range(INSTANCE_SCALE_RANGE.0..=INSTANCE_SCALE_RANGE.1),
            biome: placement.biome,
        });
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeDef, VegetationSet};
    use crate::heightfield::FalloffShape;
    use crate::seed::stream_rng;

    const EPSILON: f64 = 1e-12;

    fn wooded_table(density: f64) -> BiomeTable {
        let mut forest = BiomeDef::new("Forest", 0.0, 1.0);
        forest.vegetation = VegetationSet {
            prefabs: vec!["oak".into(), "birch".into()],
            density,
        };
        BiomeTable::new(vec![forest]).unwrap()
    }

    fn at(x: f64, y: f64) -> VegetationPlacement {
        VegetationPlacement {
            position: DVec2::new(x, y),
            biome: BiomeId(0),
        }
    }

    fn no_band() -> EdgeFalloff {
        EdgeFalloff {
            shape: FalloffShape::Square,
            band: 0.0,
        }
    }

    #[test]
    fn test_full_density_fills_every_stride_cell() {
        let table = wooded_table(1.0);
        let moisture = Grid::filled(10, 10, 0.5);
        let mut rng = stream_rng(1, "test");
        let placements = select_placements(&moisture, &table, &no_band(), 2, &mut rng);
        assert_eq!(placements.len(), 25);
        for p in &placements {
            let cx = (p.position.x + 0.5).floor();
            let cy = (p.position.y + 0.5).floor();
            assert!(cx as usize % 2 == 0 && cy as usize % 2 == 0);
            assert!((p.position.x - cx).abs() <= 0.5 && (p.position.y - cy).abs() <= 0.5);
        }
    }

    #[test]
    fn test_zero_density_places_nothing() {
        let table = wooded_table(0.0);
        let moisture = Grid::filled(10, 10, 0.5);
        let mut rng = stream_rng(1, "test");
        assert!(select_placements(&moisture, &table, &no_band(), 2, &mut rng).is_empty());
    }

    #[test]
    fn test_barren_biome_places_nothing() {
        let table = BiomeTable::new(vec![BiomeDef::new("Rock", 0.0, 1.0)]).unwrap();
        let moisture = Grid::filled(6, 6, 0.5);
        let mut rng = stream_rng(1, "test");
        assert!(select_placements(&moisture, &table, &no_band(), 1, &mut rng).is_empty());
    }

    #[test]
    fn test_shoreline_band_excluded() {
        let table = wooded_table(1.0);
        let moisture = Grid::filled(20, 20, 0.5);
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band: 4.0,
        };
        let mut rng = stream_rng(2, "test");
        let placements = select_placements(&moisture, &table, &falloff, 2, &mut rng);
        assert!(!placements.is_empty());
        for p in &placements {
            let x = p.position.x.round() as usize;
            let y = p.position.y.round() as usize;
            assert!(!falloff.is_shoreline(x, y, 20, 20), "placement at ({x}, {y}) in band");
        }
    }

    #[test]
    fn test_selection_deterministic_per_seed() {
        let table = wooded_table(0.4);
        let moisture = Grid::filled(30, 30, 0.5);
        let a = select_placements(&moisture, &table, &no_band(), 2, &mut stream_rng(5, "veg"));
        let b = select_placements(&moisture, &table, &no_band(), 2, &mut stream_rng(5, "veg"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_strength_center_reaches_target() {
        let mut field = Grid::from_fn(7, 7, |x, y| (x * 7 + y) as f64);
        let target = *field.get(3, 3);
        let params = FlattenParams {
            radius: 2.0,
            strength: 1.0,
        };
        flatten_around(&mut field, &[at(3.0, 3.0)], &params);
        assert_eq!(*field.get(3, 3), target);
    }

    #[test]
    fn test_influence_falls_off_quadratically() {
        let mut field = Grid::filled(9, 9, 0.0);
        *field.get_mut(4, 4) = 10.0;
        let params = FlattenParams {
            radius: 2.0,
            strength: 1.0,
        };
        flatten_around(&mut field, &[at(4.2, 3.8)], &params);
        // Distance 1: influence (1 - 1/2)^2 = 0.25.
        assert!((field.get(5, 4) - 2.5).abs() < EPSILON);
        // Distance 2: influence 0.
        assert!((field.get(6, 4) - 0.0).abs() < EPSILON);
        // Outside radius untouched.
        assert_eq!(*field.get(6, 6), 0.0);
    }

    #[test]
    fn test_overlapping_placements_apply_in_order() {
        let params = FlattenParams {
            radius: 2.0,
            strength: 1.0,
        };
        let base = Grid::from_fn(6, 1, |x, _| x as f64);

        let mut forward = base.clone();
        flatten_around(&mut forward, &[at(1.0, 0.0), at(2.0, 0.0)], &params);
        let mut reverse = base.clone();
        flatten_around(&mut reverse, &[at(2.0, 0.0), at(1.0, 0.0)], &params);

        // After (1 then 2): cell 2 = 2 + (1-2)*0.25 = 1.75 becomes the second target.
        assert!((forward.get(2, 0) - 1.75).abs() < EPSILON);
        assert_ne!(forward, reverse, "flattening is order dependent");
    }

    #[test]
    fn test_out_of_bounds_placement_ignored() {
        let mut field = Grid::filled(4, 4, 1.0);
        let before = field.clone();
        flatten_around(&mut field, &[at(-3.0, 1.0), at(10.0, 10.0)], &FlattenParams::default());
        assert_eq!(field, before);
    }

    #[test]
    fn test_non_positive_radius_is_noop() {
        let mut field = Grid::from_fn(4, 4, |x, _| x as f64);
        let before = field.clone();
        let params = FlattenParams {
            radius: 0.0,
            strength: 1.0,
        };
        flatten_around(&mut field, &[at(1.0, 1.0)], &params);
        assert_eq!(field, before);
    }

    struct FlatGround(f64);

    impl GroundQuery for FlatGround {
        fn raycast_down(&self, origin: DVec3, max_distance: f64) -> Option<crate::GroundHit> {
            (origin.x >= 0.0 && origin.y - self.0 <= max_distance).then(|| crate::GroundHit {
                point: DVec3::new(origin.x, self.0, origin.z),
                normal: DVec3::Y,
            })
        }
    }

    #[test]
    fn test_props_snap_to_ground_and_skip_misses() {
        let table = wooded_table(1.0);
        let placements = [at(2.0, 3.0), at(-1.0, 3.0), at(4.0, 4.0)];
        let mut rng = stream_rng(9, "props");
        let props = place_props(&placements, &table, &FlatGround(7.0), &mut rng);
        assert_eq!(props.len(), 2, "the probe at x < 0 misses");
        for prop in &props {
            assert_eq!(prop.position.y, 7.0);
            assert!(prop.prefab == "oak" || prop.prefab == "birch");
            assert!((0.0..360.0).contains(&prop.yaw_degrees));
            assert!((0.8..=1.2).contains(&prop.scale));
        }
        assert_eq!(props[0].position.x, 2.0);
        assert_eq!(props[0].position.z, 3.0);
    }
}
