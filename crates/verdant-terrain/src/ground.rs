//! Downward ground probes against committed terrain.
//!
//! Placement code never reads raw noise values; it asks the terrain where the
//! surface actually is, the same way a physics raycast would against the
//! collision mesh built from the heightfield.

use glam::{DVec2, DVec3};

use crate::heightfield::Heightfield;

/// Altitude vegetation probes start from.
pub const VEGETATION_PROBE_ALTITUDE: f64 = 100.0;

/// Maximum travel of a vegetation probe.
pub const VEGETATION_PROBE_DISTANCE: f64 = 200.0;

/// Result of a successful ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    /// Surface point, `(x, height, z)`.
    pub point: DVec3,
    /// Unit surface normal at the hit.
    pub normal: DVec3,
}

/// Something that can answer "where is the ground below this point?".
pub trait GroundQuery {
    /// Casts a ray straight down from `origin`, travelling at most
    /// `max_distance`. Returns `None` when nothing is hit.
    fn raycast_down(&self, origin: DVec3, max_distance: f64) -> Option<GroundHit>;

    /// Probe from [`VEGETATION_PROBE_ALTITUDE`] at planar position `(x, z)`.
    fn probe_from_sky(&self, x: f64, z: f64) -> Option<GroundHit> {
        self.raycast_down(
            DVec3::new(x, VEGETATION_PROBE_ALTITUDE, z),
            VEGETATION_PROBE_DISTANCE,
        )
    }
}

impl Heightfield {
    /// Surface height and normal at fractional grid position `p`.
    ///
    /// Interpolates on the mesh triangulation: each quad is split along the
    /// diagonal from `(x, y)` to `(x + 1, y + 1)`. Returns `None` outside the
    /// grid or for grids narrower than two cells.
    pub fn surface_at(&self, p: DVec2) -> Option<(f64, DVec3)> {
        let (w, h) = (self.width(), self.height());
        if w < 2 || h < 2 || !p.x.is_finite() || !p.y.is_finite() {
            return None;
        }
        let max_x = (w - 1) as f64;
        let max_y = (h - 1) as f64;
        if p.x < 0.0 || p.y < 0.0 || p.x > max_x || p.y > max_y {
            return None;
        }

        let x0 = (p.x.floor() as usize).min(w - 2);
        let y0 = (p.y.floor() as usize).min(h - 2);
        let fx = p.x - x0 as f64;
        let fy = p.y - y0 as f64;

        let h00 = self.height_at(x0, y0);
        let h10 = self.height_at(x0 + 1, y0);
        let h01 = self.height_at(x0, y0 + 1);
        let h11 = self.height_at(x0 + 1, y0 + 1);

        let (height, dhdx, dhdy) = if fy >= fx {
            // Triangle (x0,y0) (x0,y0+1) (x0+1,y0+1).
            let dhdx = h11 - h01;
            let dhdy = h01 - h00;
            (h00 + fx * dhdx + fy * dhdy, dhdx, dhdy)
        } else {
            // Triangle (x0,y0) (x0+1,y0+1) (x0+1,y0).
            let dhdx = h10 - h00;
            let dhdy = h11 - h10;
            (h00 + fx * dhdx + fy * dhdy, dhdx, dhdy)
        };

        let normal = DVec3::new(-dhdx, 1.0, -dhdy).normalize();
        Some((height, normal))
    }
}

impl GroundQuery for Heightfield {
    fn raycast_down(&self, origin: DVec3, max_distance: f64) -> Option<GroundHit> {
        let (height, normal) = self.surface_at(DVec2::new(origin.x, origin.z))?;
        let drop = origin.y - height;
        if drop < 0.0 || drop > max_distance {
            return None;
        }
        Some(GroundHit {
            point: DVec3::new(origin.x, height, origin.z),
            normal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeDef, BiomeTable};
    use crate::grid::Grid;
    use crate::heightfield::{EdgeFalloff, FalloffShape, build_heightfield};

    const EPSILON: f64 = 1e-9;

    /// Heightfield whose height equals `f(x, y)` exactly.
    fn field_from(w: usize, h: usize, f: impl Fn(usize, usize) -> f64) -> Heightfield {
        let mut def = BiomeDef::new("Flat", 0.0, 1.0);
        def.height_multiplier = 1.0;
        let table = BiomeTable::new(vec![def]).unwrap();
        let noise = Grid::from_fn(w, h, f);
        let moisture = Grid::filled(w, h, 0.5);
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band: 0.0,
        };
        build_heightfield(&noise, &moisture, &table, &falloff)
    }

    #[test]
    fn test_hit_on_vertex_matches_cell_height() {
        let field = field_from(4, 4, |x, y| (x * 4 + y) as f64 * 0.01);
        for y in 0..4 {
            for x in 0..4 {
                let hit = field.probe_from_sky(x as f64, y as f64).unwrap();
                assert!((hit.point.y - field.height_at(x, y)).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_planar_slope_interpolates_linearly() {
        // h = 0.5 x + 0.25 y is planar, so both triangles agree.
        let field = field_from(5, 5, |x, y| 0.5 * x as f64 + 0.25 * y as f64);
        let hit = field.probe_from_sky(1.3, 2.6).unwrap();
        assert!((hit.point.y - (0.65 + 0.65)).abs() < EPSILON);

        let expected = DVec3::new(-0.5, 1.0, -0.25).normalize();
        assert!((hit.normal - expected).length() < EPSILON);
    }

    #[test]
    fn test_flat_ground_normal_is_up() {
        let field = field_from(3, 3, |_, _| 0.4);
        let hit = field.probe_from_sky(0.5, 1.5).unwrap();
        assert!((hit.normal - DVec3::Y).length() < EPSILON);
    }

    #[test]
    fn test_miss_outside_grid() {
        let field = field_from(3, 3, |_, _| 0.0);
        assert!(field.probe_from_sky(-0.1, 1.0).is_none());
        assert!(field.probe_from_sky(1.0, 2.01).is_none());
        assert!(field.probe_from_sky(2.0, 2.0).is_some(), "far corner is on the mesh");
    }

    #[test]
    fn test_miss_when_out_of_range() {
        let field = field_from(3, 3, |_, _| 0.5);
        assert!(field.raycast_down(DVec3::new(1.0, 0.2, 1.0), 10.0).is_none(), "origin below ground");
        assert!(field.raycast_down(DVec3::new(1.0, 50.0, 1.0), 10.0).is_none(), "too far");
        assert!(field.raycast_down(DVec3::new(1.0, 5.0, 1.0), 10.0).is_some());
    }

    #[test]
    fn test_degenerate_grid_never_hits() {
        let field = field_from(1, 5, |_, _| 0.0);
        assert!(field.probe_from_sky(0.0, 0.0).is_none());
    }
}
