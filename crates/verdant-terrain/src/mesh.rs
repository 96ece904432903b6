//! Grid-to-triangle mesh handoff for the external renderer and collider.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::biome::BiomeId;
use crate::heightfield::Heightfield;

/// A single terrain vertex, laid out for direct GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// `(x, height, y)` in world units.
    pub position: [f32; 3],
    /// Smooth vertex normal.
    pub normal: [f32; 3],
    /// `(x / width, y / height)`.
    pub uv: [f32; 2],
    /// Moisture-classified biome index.
    pub biome: u32,
    /// `1` inside the shoreline band, else `0`.
    pub shoreline: u32,
}

/// Terrain mesh: one vertex per cell, two triangles per quad.
#[derive(Clone, Debug, Default)]
pub struct TerrainMesh {
    /// Vertex buffer, row-major like the heightfield.
    pub vertices: Vec<TerrainVertex>,
    /// Index buffer (3 indices per triangle).
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Biome of the vertex at `index`.
    pub fn vertex_biome(&self, index: usize) -> BiomeId {
        BiomeId(self.vertices[index].biome as u16)
    }
}

/// Build a [`TerrainMesh`] from a heightfield.
///
/// Each quad `v = y * width + x` emits triangles `(v, v + w, v + w + 1)` and
/// `(v, v + w + 1, v + 1)`, so every triangle winds the same way and the
/// shared diagonal runs from `(x, y)` to `(x + 1, y + 1)`.
pub fn build_terrain_mesh(field: &Heightfield) -> TerrainMesh {
    let w = field.width();
    let h = field.height();
    if w == 0 || h == 0 {
        return TerrainMesh::default();
    }

    let positions: Vec<Vec3> = field
        .heights()
        .iter()
        .map(|(x, y, &height)| Vec3::new(x as f32, height as f32, y as f32))
        .collect();

    let mut indices = Vec::with_capacity(w.saturating_sub(1) * h.saturating_sub(1) * 6);
    for y in 0..h.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let v = (y * w + x) as u32;
            let w32 = w as u32;
            indices.extend_from_slice(&[v, v + w32, v + w32 + 1, v, v + w32 + 1, v + 1]);
        }
    }

    // Area-weighted smooth normals: accumulate unnormalized face normals.
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    let vertices = positions
        .iter()
        .zip(&normals)
        .enumerate()
        .map(|(i, (p, n))| {
            let (x, y) = (i % w, i / w);
            TerrainVertex {
                position: p.to_array(),
                normal: n.try_normalize().unwrap_or(Vec3::Y).to_array(),
                uv: [x as f32 / w as f32, y as f32 / h as f32],
                biome: field.biome_at(x, y).0 as u32,
                shoreline: field.is_shoreline(x, y) as u32,
            }
        })
        .collect();

    TerrainMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeDef, BiomeTable};
    use crate::grid::Grid;
    use crate::heightfield::{EdgeFalloff, FalloffShape, build_heightfield};

    fn flat_field(w: usize, h: usize) -> Heightfield {
        let table = BiomeTable::new(vec![
            BiomeDef::new("A", 0.0, 0.5),
            BiomeDef::new("B", 0.5, 1.0),
        ])
        .unwrap();
        let noise = Grid::filled(w, h, 0.0);
        let moisture = Grid::from_fn(w, h, |x, _| if x == 0 { 0.1 } else { 0.9 });
        let falloff = EdgeFalloff {
            shape: FalloffShape::Square,
            band: 1.0,
        };
        build_heightfield(&noise, &moisture, &table, &falloff)
    }

    #[test]
    fn test_counts() {
        let mesh = build_terrain_mesh(&flat_field(4, 3));
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.triangle_count(), 3 * 2 * 2);
    }

    #[test]
    fn test_first_quad_indices() {
        let mesh = build_terrain_mesh(&flat_field(3, 3));
        assert_eq!(&mesh.indices[..6], &[0, 3, 4, 0, 4, 1]);
    }

    #[test]
    fn test_flat_normals_point_up() {
        let mesh = build_terrain_mesh(&flat_field(5, 5));
        for v in &mesh.vertices {
            assert!(v.normal[1] > 0.999, "normal {:?} should face +Y", v.normal);
        }
    }

    #[test]
    fn test_vertex_attributes() {
        let mesh = build_terrain_mesh(&flat_field(4, 4));
        let corner = mesh.vertices[0];
        assert_eq!(corner.uv, [0.0, 0.0]);
        assert_eq!(corner.shoreline, 1);
        assert_eq!(mesh.vertex_biome(0), BiomeId(0));
        let inner = mesh.vertices[4 + 1];
        assert_eq!(inner.position, [1.0, 0.0, 1.0]);
        assert_eq!(inner.shoreline, 0);
        assert_eq!(mesh.vertex_biome(5), BiomeId(1));
    }

    #[test]
    fn test_vertex_is_pod() {
        let mesh = build_terrain_mesh(&flat_field(2, 2));
        let bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        assert_eq!(bytes.len(), 4 * std::mem::size_of::<TerrainVertex>());
    }
}
