/// Flat minimap plane meshes with holes wherever the road mask is closed
use crate::error::{Result, TerrainError};
use crate::road_mask::RoadMask;
use glam::{Vec2, Vec3};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Indexed triangle mesh of a planar grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaneMesh {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
}

/// Input for batch plane generation.
#[derive(Debug, Clone)]
pub struct PlaneRequest {
    pub mask: RoadMask,
    /// World size of the plane; only `x` and `z` are used.
    pub size: Vec3,
    pub elevation: f32,
}

impl PlaneMesh {
    /// Build the plane for `mask` and drop every vertex no triangle uses.
    ///
    /// Each quad contributes two triangles only when all four corners are open.
    pub fn from_mask(mask: &RoadMask, size: Vec3, elevation: f32) -> Result<Self> {
        let mut mesh = Self::uncompacted(mask, size, elevation)?;
        mesh.compact()?;
        Ok(mesh)
    }

    /// Full vertex grid with the mask's triangles, before compaction
    pub fn uncompacted(mask: &RoadMask, size: Vec3, elevation: f32) -> Result<Self> {
        let (columns, rows) = (mask.width(), mask.height());
        check_index_range(columns.checked_mul(rows).unwrap_or(usize::MAX))?;
        let fraction = |i: usize, len: usize| {
            if len > 1 {
                i as f32 / (len - 1) as f32
            } else {
                0.0
            }
        };

        let mut vertices = Vec::with_capacity(columns * rows);
        let mut uvs = Vec::with_capacity(columns * rows);
        for z in 0..rows {
            for x in 0..columns {
                let (u, v) = (fraction(x, columns), fraction(z, rows));
                vertices.push(Vec3::new(size.x * u, elevation, size.z * v));
                uvs.push(Vec2::new(u, v));
            }
        }

        let mut indices = Vec::new();
        for z in 0..rows.saturating_sub(1) {
            for x in 0..columns.saturating_sub(1) {
                if !(mask.is_open(x, z)
                    && mask.is_open(x + 1, z)
                    && mask.is_open(x, z + 1)
                    && mask.is_open(x + 1, z + 1))
                {
                    continue;
                }

                // In range: checked against the vertex count above.
                let i00 = (z * columns + x) as u32;
                let i01 = ((z + 1) * columns + x) as u32;
                let i10 = (z * columns + x + 1) as u32;
                let i11 = ((z + 1) * columns + x + 1) as u32;

                indices.extend_from_slice(&[i00, i11, i10]);
                indices.extend_from_slice(&[i00, i01, i11]);
            }
        }

        Ok(Self {
            vertices,
            uvs,
            indices,
        })
    }

    /// Remove unreferenced vertices, shifting each index down by the number
    /// of removed vertices before it. Vertex order is preserved.
    ///
    /// Fails without touching the mesh if a triangle refers to a missing vertex.
    pub fn compact(&mut self) -> Result<()> {
        let vertices = self.vertices.len();
        let mut referenced = vec![false; vertices];
        for &index in &self.indices {
            let slot = referenced
                .get_mut(index as usize)
                .ok_or(TerrainError::MeshIndex {
                    index: index as usize,
                    vertices,
                })?;
            *slot = true;
        }

        let mut remap = vec![0u32; vertices];
        let mut removed = 0usize;
        for (index, used) in referenced.iter().enumerate() {
            if *used {
                // Referenced vertices are below 2^32 since indices are u32.
                remap[index] = (index - removed) as u32;
            } else {
                removed += 1;
            }
        }

        let mut keep = referenced.iter();
        self.vertices.retain(|_| *keep.next().unwrap_or(&false));
        let mut keep = referenced.iter();
        self.uvs.retain(|_| *keep.next().unwrap_or(&false));

        for index in &mut self.indices {
            *index = remap[*index as usize];
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Write the mesh as Wavefront OBJ with texture coordinates and an up normal
    pub fn write_obj(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "# minimap plane")?;
        writeln!(out, "# vertices: {}", self.vertex_count())?;
        writeln!(out, "# triangles: {}", self.triangle_count())?;

        for v in &self.vertices {
            writeln!(out, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
        }
        for uv in &self.uvs {
            writeln!(out, "vt {:.6} {:.6}", uv.x, uv.y)?;
        }
        writeln!(out, "vn 0 1 0")?;

        // OBJ indices are 1-based.
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
            writeln!(out, "f {a}/{a}/1 {b}/{b}/1 {c}/{c}/1")?;
        }

        out.flush()?;
        Ok(())
    }
}

/// 32-bit indices address at most `u32::MAX + 1` vertices
fn check_index_range(vertices: usize) -> Result<()> {
    if vertices as u64 > u64::from(u32::MAX) + 1 {
        return Err(TerrainError::MeshTooLarge { vertices });
    }
    Ok(())
}

/// Build several planes at once, one per request
pub fn generate_planes(requests: &[PlaneRequest]) -> Result<Vec<PlaneMesh>> {
    requests
        .par_iter()
        .map(|request| PlaneMesh::from_mask(&request.mask, request.size, request.elevation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use std::collections::BTreeSet;

    fn mask(width: usize, height: usize, open: impl FnMut(usize, usize) -> bool) -> RoadMask {
        RoadMask::from_grid(Grid::from_fn(width, height, open).unwrap())
    }

    fn assert_compacted(mesh: &PlaneMesh) {
        let distinct: BTreeSet<u32> = mesh.indices.iter().copied().collect();
        assert_eq!(distinct.len(), mesh.vertex_count());
        assert_eq!(mesh.uvs.len(), mesh.vertex_count());
        if let Some(&max) = distinct.iter().next_back() {
            assert_eq!(max as usize, mesh.vertex_count() - 1);
        }
    }

    #[test]
    fn full_mask_yields_complete_grid() {
        let mesh = PlaneMesh::from_mask(&mask(5, 5, |_, _| true), Vec3::new(8.0, 0.0, 8.0), 0.0).unwrap();
        assert_eq!(mesh.triangle_count(), 2 * 4 * 4);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.vertices[24], Vec3::new(8.0, 0.0, 8.0));
        assert_compacted(&mesh);
    }

    #[test]
    fn closed_mask_yields_nothing() {
        let mesh = PlaneMesh::from_mask(&mask(6, 6, |_, _| false), Vec3::splat(10.0), 0.0).unwrap();
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn single_hole_removes_surrounding_quads() {
        let mesh = PlaneMesh::from_mask(&mask(3, 3, |x, z| (x, z) != (1, 1)), Vec3::splat(2.0), 0.0).unwrap();
        // Every quad touches the centre vertex.
        assert_eq!(mesh.triangle_count(), 0);

        let mesh = PlaneMesh::from_mask(&mask(3, 3, |x, z| (x, z) != (2, 2)), Vec3::splat(2.0), 0.0).unwrap();
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(mesh.vertex_count(), 8);
        assert_compacted(&mesh);
    }

    #[test]
    fn compaction_preserves_triangle_positions() {
        // Open island away from the origin so most leading vertices are dropped.
        let islands = mask(6, 5, |x, z| (3..=4).contains(&x) && (2..=3).contains(&z));
        let size = Vec3::new(5.0, 0.0, 4.0);
        let raw = PlaneMesh::uncompacted(&islands, size, 1.5).unwrap();
        let compacted = PlaneMesh::from_mask(&islands, size, 1.5).unwrap();

        assert_eq!(raw.triangle_count(), compacted.triangle_count());
        for (&before, &after) in raw.indices.iter().zip(&compacted.indices) {
            assert_eq!(raw.vertices[before as usize], compacted.vertices[after as usize]);
            assert_eq!(raw.uvs[before as usize], compacted.uvs[after as usize]);
        }
        assert_eq!(compacted.vertex_count(), 4);
        assert!(compacted.vertices.iter().all(|v| v.y == 1.5));
        assert_compacted(&compacted);
    }

    #[test]
    fn checkerboard_mask_compacts_consistently() {
        let checker = mask(7, 7, |x, z| (x / 2 + z / 2) % 2 == 0);
        let mesh = PlaneMesh::from_mask(&checker, Vec3::splat(6.0), 0.0).unwrap();
        assert!(mesh.triangle_count() > 0);
        assert_compacted(&mesh);
    }

    #[test]
    fn compaction_rejects_dangling_indices() {
        let mut mesh = PlaneMesh::from_mask(&mask(2, 2, |_, _| true), Vec3::splat(1.0), 0.0).unwrap();
        mesh.indices.extend_from_slice(&[0, 1, 9]);
        let before = mesh.clone();

        assert!(matches!(
            mesh.compact(),
            Err(TerrainError::MeshIndex { index: 9, vertices: 4 })
        ));
        assert_eq!(mesh, before);
    }

    #[test]
    fn vertex_count_is_limited_to_32_bit_indices() {
        let limit = u32::MAX as usize + 1;
        assert!(check_index_range(limit).is_ok());
        assert!(matches!(
            check_index_range(limit + 1),
            Err(TerrainError::MeshTooLarge { .. })
        ));
    }

    #[test]
    fn batch_generation_keeps_request_order() {
        let requests = vec![
            PlaneRequest {
                mask: mask(3, 3, |_, _| true),
                size: Vec3::splat(1.0),
                elevation: 0.0,
            },
            PlaneRequest {
                mask: mask(3, 3, |_, _| false),
                size: Vec3::splat(1.0),
                elevation: 0.0,
            },
        ];
        let meshes = generate_planes(&requests).unwrap();
        assert_eq!(meshes[0].triangle_count(), 8);
        assert_eq!(meshes[1].triangle_count(), 0);
    }
}
