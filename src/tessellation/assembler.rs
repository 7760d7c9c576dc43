//! Mesh assembly and vertex deduplication
//!
//! Neighboring cells reach the same lattice edge from up to four sides
//! and would each emit their own copy of its intersection vertex. Keying
//! vertices by the canonical edge identity (anchor lattice point plus
//! axis) collapses those copies exactly, with no positional tolerance.
//!
//! Extraction runs per k-slab; each slab collects a local vertex table
//! and local triangle indices, and a serial merge pass relabels them
//! into the global mesh. Merging slabs in ascending k order makes the
//! result identical to a sequential sweep.

use super::tables::EDGE_ANCHORS;
use crate::geometry::{Normal, Vec3f};
use crate::types::MeshBuffer;
use std::collections::HashMap;

/// Canonical identity of a lattice edge: the anchor point and the axis
/// the edge runs along.
pub(crate) type EdgeKey = (usize, usize, usize, u8);

/// Canonical key of `edge` of the cell at `(i, j, k)`.
#[inline]
pub(crate) fn edge_key(i: usize, j: usize, k: usize, edge: usize) -> EdgeKey {
    let (anchor, axis) = EDGE_ANCHORS[edge];
    (i + anchor[0], j + anchor[1], k + anchor[2], axis)
}

/// Vertex and triangle data collected by one extraction worker.
pub(crate) struct SlabMesh {
    /// Canonical keys in first-encounter order, parallel to the vertex data
    keys: Vec<EdgeKey>,
    positions: Vec<Vec3f>,
    normals: Vec<Normal<f32>>,
    /// Triangles as local vertex indices
    triangles: Vec<[u32; 3]>,
    local: HashMap<EdgeKey, u32>,
    /// First cell found to contain a non-finite sample, if any
    pub(crate) invalid_cell: Option<[usize; 3]>,
    /// Number of edge normals that hit the flat-gradient fallback
    pub(crate) flat_normals: usize,
}

impl SlabMesh {
    pub(crate) fn new() -> Self {
        Self {
            keys: Vec::new(),
            positions: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
            local: HashMap::new(),
            invalid_cell: None,
            flat_normals: 0,
        }
    }

    /// Returns the local index of an already-seen canonical key.
    pub(crate) fn lookup(&self, key: EdgeKey) -> Option<u32> {
        self.local.get(&key).copied()
    }

    /// Returns the local index of the vertex with the given canonical key,
    /// allocating it on first encounter.
    pub(crate) fn vertex(&mut self, key: EdgeKey, position: Vec3f, normal: Normal<f32>) -> u32 {
        if let Some(&index) = self.local.get(&key) {
            return index;
        }

        let index = self.keys.len() as u32;
        self.keys.push(key);
        self.positions.push(position);
        self.normals.push(normal);
        self.local.insert(key, index);
        index
    }

    /// Appends a triangle, dropping it when two of its vertices collapsed
    /// to the same index.
    pub(crate) fn triangle(&mut self, indices: [u32; 3]) {
        let [a, b, c] = indices;
        if a == b || b == c || a == c {
            return;
        }
        self.triangles.push(indices);
    }

    pub(crate) fn num_vertices(&self) -> usize {
        self.keys.len()
    }
}

/// Merges per-slab buffers into one indexed mesh.
///
/// Slabs must be supplied in ascending k order; vertices shared across a
/// slab boundary keep the identity assigned by the lower slab.
pub(crate) fn merge_slabs(slabs: Vec<SlabMesh>) -> MeshBuffer {
    let total_vertices: usize = slabs.iter().map(|s| s.num_vertices()).sum();
    let total_triangles: usize = slabs.iter().map(|s| s.triangles.len()).sum();

    let mut global: HashMap<EdgeKey, u32> = HashMap::with_capacity(total_vertices);
    let mut positions: Vec<f32> = Vec::with_capacity(total_vertices * 3);
    let mut normals: Vec<f32> = Vec::with_capacity(total_vertices * 3);
    let mut indices: Vec<u32> = Vec::with_capacity(total_triangles * 3);

    for slab in slabs {
        let mut relabel = Vec::with_capacity(slab.keys.len());

        for (local_index, key) in slab.keys.iter().enumerate() {
            let global_index = *global.entry(*key).or_insert_with(|| {
                let index = (positions.len() / 3) as u32;
                let p = slab.positions[local_index];
                let n = slab.normals[local_index];
                positions.extend_from_slice(&[p.x, p.y, p.z]);
                normals.extend_from_slice(&[n.x, n.y, n.z]);
                index
            });
            relabel.push(global_index);
        }

        for tri in slab.triangles {
            indices.push(relabel[tri[0] as usize]);
            indices.push(relabel[tri[1] as usize]);
            indices.push(relabel[tri[2] as usize]);
        }
    }

    MeshBuffer::from_raw(positions, normals, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_z() -> Normal<f32> {
        Normal::new(0.0, 0.0, 1.0)
    }

    #[test]
    fn test_edge_key_is_shared_between_neighbors() {
        // edge 2 of a cell is edge 0 of its +y neighbor
        assert_eq!(edge_key(4, 5, 6, 2), edge_key(4, 6, 6, 0));
        // edge 10 of a cell is edge 8 of its (+x, +y) neighbor
        assert_eq!(edge_key(4, 5, 6, 10), edge_key(5, 6, 6, 8));
        // edges on different axes never collide
        assert_ne!(edge_key(4, 5, 6, 0), edge_key(4, 5, 6, 3));
    }

    #[test]
    fn test_vertex_dedup_within_slab() {
        let mut slab = SlabMesh::new();
        let key = edge_key(0, 0, 0, 0);

        let a = slab.vertex(key, Vec3f::new(0.5, 0.0, 0.0), unit_z());
        let b = slab.vertex(key, Vec3f::new(0.5, 0.0, 0.0), unit_z());
        assert_eq!(a, b);
        assert_eq!(slab.num_vertices(), 1);
    }

    #[test]
    fn test_degenerate_triangle_dropped() {
        let mut slab = SlabMesh::new();
        slab.triangle([0, 1, 1]);
        slab.triangle([2, 2, 2]);
        slab.triangle([0, 1, 2]);
        assert_eq!(slab.triangles.len(), 1);
    }

    #[test]
    fn test_merge_relabels_shared_vertices() {
        // Two slabs meeting at a k boundary both emit the vertex on a
        // shared edge; the merged mesh keeps a single copy.
        let shared = edge_key(0, 0, 1, 0);

        let mut lower = SlabMesh::new();
        let a = lower.vertex(edge_key(0, 0, 0, 8), Vec3f::new(0.0, 0.0, 0.5), unit_z());
        let b = lower.vertex(shared, Vec3f::new(0.5, 0.0, 1.0), unit_z());
        let c = lower.vertex(edge_key(0, 0, 0, 3), Vec3f::new(0.0, 0.5, 0.0), unit_z());
        lower.triangle([a, b, c]);

        let mut upper = SlabMesh::new();
        let d = upper.vertex(shared, Vec3f::new(0.5, 0.0, 1.0), unit_z());
        let e = upper.vertex(edge_key(0, 0, 1, 8), Vec3f::new(0.0, 0.0, 1.5), unit_z());
        let f = upper.vertex(edge_key(0, 0, 1, 3), Vec3f::new(0.0, 0.5, 1.0), unit_z());
        upper.triangle([d, e, f]);

        let mesh = merge_slabs(vec![lower, upper]);
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_faces(), 2);

        // the shared vertex keeps the identity from the lower slab
        let faces: Vec<_> = mesh.faces().collect();
        assert_eq!(faces[0][1], faces[1][0]);
    }
}
