//! Mesh buffer for storing triangle mesh data
//!
//! A mesh buffer stores vertex positions, per-vertex normals and triangle
//! indices as three parallel flat arrays.

use crate::geometry::{BoundingBox, Vec3f};
use super::Channel;

/// A buffer for storing an indexed triangle mesh.
///
/// The buffer holds vertex positions, unit-length vertex normals, and
/// face indices. Positions and normals are parallel arrays; every face
/// is a triple of indices into them.
///
/// # Examples
///
/// ```
/// use isotessel::types::MeshBuffer;
/// use isotessel::geometry::Vec3f;
///
/// let mut mesh = MeshBuffer::new();
/// mesh.set_vertices(vec![
///     Vec3f::new(0.0, 0.0, 0.0),
///     Vec3f::new(1.0, 0.0, 0.0),
///     Vec3f::new(0.5, 1.0, 0.0),
/// ]);
/// mesh.set_normals_raw(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
/// mesh.set_faces(vec![0u32, 1, 2]);
///
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    /// Vertex positions (x, y, z)
    vertices: Channel<f32>,
    /// Vertex normals (nx, ny, nz), unit length
    normals: Channel<f32>,
    /// Face indices (3 indices per face)
    faces: Channel<u32>,
}

impl MeshBuffer {
    /// Creates an empty mesh buffer.
    pub fn new() -> Self {
        Self {
            vertices: Channel::with_width(3),
            normals: Channel::with_width(3),
            faces: Channel::with_width(3),
        }
    }

    /// Creates a mesh buffer from raw flat arrays.
    pub fn from_raw(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>) -> Self {
        assert_eq!(positions.len(), normals.len(), "Normal count must match vertex count");
        Self {
            vertices: Channel::new(positions, 3),
            normals: Channel::new(normals, 3),
            faces: Channel::new(indices, 3),
        }
    }

    /// Returns the number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of faces (triangles).
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Gets the vertex at the given index.
    pub fn get_vertex(&self, index: usize) -> Option<Vec3f> {
        self.vertices.get(index).map(|v| Vec3f::new(v[0], v[1], v[2]))
    }

    /// Returns an iterator over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = Vec3f> + '_ {
        self.vertices.into_iter().map(|v| Vec3f::new(v[0], v[1], v[2]))
    }

    /// Returns a reference to the raw vertex data.
    pub fn vertex_data(&self) -> &[f32] {
        self.vertices.data()
    }

    /// Sets the vertex array.
    pub fn set_vertices(&mut self, vertices: Vec<Vec3f>) {
        let mut data = Vec::with_capacity(vertices.len() * 3);
        for v in vertices {
            data.push(v.x);
            data.push(v.y);
            data.push(v.z);
        }
        self.vertices = Channel::new(data, 3);
    }

    /// Gets the vertex normal at the given index.
    pub fn get_normal(&self, index: usize) -> Option<Vec3f> {
        self.normals.get(index).map(|n| Vec3f::new(n[0], n[1], n[2]))
    }

    /// Returns an iterator over all vertex normals.
    pub fn normals(&self) -> impl Iterator<Item = Vec3f> + '_ {
        self.normals.into_iter().map(|n| Vec3f::new(n[0], n[1], n[2]))
    }

    /// Returns a reference to the raw vertex normal data.
    pub fn normal_data(&self) -> &[f32] {
        self.normals.data()
    }

    /// Sets the vertex normal array from raw data.
    pub fn set_normals_raw(&mut self, data: Vec<f32>) {
        self.normals = Channel::new(data, 3);
    }

    /// Gets the face indices at the given index.
    pub fn get_face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).map(|f| [f[0], f[1], f[2]])
    }

    /// Returns an iterator over all faces.
    pub fn faces(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces.into_iter().map(|f| [f[0], f[1], f[2]])
    }

    /// Returns a reference to the raw face index data.
    pub fn face_data(&self) -> &[u32] {
        self.faces.data()
    }

    /// Sets the face index array.
    pub fn set_faces(&mut self, faces: Vec<u32>) {
        self.faces = Channel::new(faces, 3);
    }

    /// Computes the bounding box of all vertices.
    pub fn bounding_box(&self) -> BoundingBox<f32> {
        self.vertices().collect()
    }
}

impl Default for MeshBuffer {
    fn default() -> Self {
        Self::new()
    }
}
