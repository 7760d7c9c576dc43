//! Isosurface extraction
//!
//! This module implements marching cubes over a scalar field on a
//! parallelepiped lattice: per-cell triangulation against the case
//! tables, gradient-based vertex normals, and exact vertex
//! deduplication across shared cell edges.

mod assembler;
mod cell;
mod gradient;
mod tables;

use crate::geometry::{SingularCellError, UnitCell, Vec3f};
use crate::types::{MeshBuffer, ScalarField};
use crate::util::Timer;
use assembler::{edge_key, merge_slabs, SlabMesh};
use gradient::GradientSampler;
use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during isosurface extraction
#[derive(Error, Debug)]
pub enum TessellationError {
    #[error("invalid grid dimensions {0}x{1}x{2}: every axis needs at least two samples")]
    InvalidDimensions(usize, usize, usize),

    #[error("scalar field holds {found} samples, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },

    #[error(transparent)]
    SingularBasis(#[from] SingularCellError),

    #[error("non-finite value in {0}")]
    NonFiniteInput(&'static str),

    #[error("non-finite field sample in cell ({0}, {1}, {2})")]
    NonFiniteField(usize, usize, usize),
}

/// Extracts the isosurface of a scalar field as an indexed triangle mesh.
///
/// # Arguments
///
/// * `field` - flat sample array of length `dims[0] * dims[1] * dims[2]`,
///   with `x` the fastest-varying axis and `z` the slowest
/// * `dims` - grid dimensions `(Nx, Ny, Nz)`, each at least 2
/// * `basis` - row-major 3x3 unit cell matrix `B`; lattice index
///   `(i, j, k)` sits at `B * (i/(Nx-1), j/(Ny-1), k/(Nz-1))`
/// * `isovalue` - the level to triangulate
///
/// The returned mesh carries deduplicated vertex positions, unit vertex
/// normals pointing from lower field values toward higher ones, and
/// triangle indices wound to match that orientation.
///
/// A field whose cells all lie entirely below or above the isovalue
/// yields an empty mesh, not an error.
///
/// # Example
///
/// ```
/// use isotessel::marching_cubes;
///
/// // f = z on a 2x2x2 grid: the iso plane cuts the cube in half
/// let field = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
/// let basis = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
///
/// let mesh = marching_cubes(&field, [2, 2, 2], basis, 0.5).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_faces(), 2);
/// ```
pub fn marching_cubes(
    field: &[f32],
    dims: [usize; 3],
    basis: [f32; 9],
    isovalue: f32,
) -> Result<MeshBuffer, TessellationError> {
    let [nx, ny, nz] = dims;
    if nx < 2 || ny < 2 || nz < 2 {
        return Err(TessellationError::InvalidDimensions(nx, ny, nz));
    }

    let expected = nx * ny * nz;
    if field.len() != expected {
        return Err(TessellationError::SizeMismatch {
            expected,
            found: field.len(),
        });
    }

    if !isovalue.is_finite() {
        return Err(TessellationError::NonFiniteInput("isovalue"));
    }
    if basis.iter().any(|v| !v.is_finite()) {
        return Err(TessellationError::NonFiniteInput("unit cell"));
    }
    let unit_cell = UnitCell::new(&basis)?;

    let field = ScalarField::new(field, dims);
    let timer = Timer::new("isosurface extraction");
    log::info!(
        "extracting isosurface at {} from a {}x{}x{} field",
        isovalue,
        nx,
        ny,
        nz
    );

    // One worker per k-slab; the merge below restores sweep order.
    let slabs: Vec<SlabMesh> = (0..nz - 1)
        .into_par_iter()
        .map(|k| extract_slab(&field, &unit_cell, isovalue, k))
        .collect();

    if let Some([i, j, k]) = slabs.iter().find_map(|slab| slab.invalid_cell) {
        return Err(TessellationError::NonFiniteField(i, j, k));
    }

    let flat_normals: usize = slabs.iter().map(|slab| slab.flat_normals).sum();
    if flat_normals > 0 {
        log::warn!(
            "{} edge normals fell back to (0, 0, 1) in flat field regions",
            flat_normals
        );
    }

    let mesh = merge_slabs(slabs);
    log::info!(
        "extracted {} vertices, {} faces",
        mesh.num_vertices(),
        mesh.num_faces()
    );
    timer.stop();

    Ok(mesh)
}

/// Extracts all cells of the k-th slab into a local buffer.
fn extract_slab(field: &ScalarField, unit_cell: &UnitCell, isovalue: f32, k: usize) -> SlabMesh {
    let [nx, ny, nz] = field.dims();
    let fractional = Vec3f::new(
        1.0 / (nx - 1) as f32,
        1.0 / (ny - 1) as f32,
        1.0 / (nz - 1) as f32,
    );

    let sampler = GradientSampler::new(field, unit_cell);
    let mut slab = SlabMesh::new();

    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let values = field.cell_corners(i, j, k);

            if values.iter().any(|v| !v.is_finite()) {
                if slab.invalid_cell.is_none() {
                    slab.invalid_cell = Some([i, j, k]);
                }
                continue;
            }

            let cfg = cell::configuration(&values, isovalue);
            if cfg == 0 || cfg == 255 {
                continue;
            }

            let mask = tables::EDGE_TABLE[cfg as usize];
            let t = cell::edge_parameters(&values, isovalue, mask);
            let gradients = sampler.cell_corners(i, j, k);

            let mut vertex_ids = [0u32; 12];
            for edge in 0..12 {
                if mask & (1 << edge) == 0 {
                    continue;
                }

                let key = edge_key(i, j, k, edge);
                if let Some(id) = slab.lookup(key) {
                    vertex_ids[edge] = id;
                    continue;
                }

                let lattice = cell::edge_position(i, j, k, edge, t[edge]);
                let position = unit_cell.to_cartesian(Vec3f::new(
                    lattice.x * fractional.x,
                    lattice.y * fractional.y,
                    lattice.z * fractional.z,
                ));

                let [a, b] = tables::EDGE_ENDPOINTS[edge];
                let (normal, flat) = gradient::edge_normal(&gradients[a], &gradients[b], t[edge]);
                if flat {
                    slab.flat_normals += 1;
                }

                vertex_ids[edge] = slab.vertex(key, position, normal);
            }

            for tri in cell::triangles(cfg) {
                slab.triangle([vertex_ids[tri[0]], vertex_ids[tri[1]], vertex_ids[tri[2]]]);
            }
        }
    }

    slab
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const IDENTITY: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

    fn diagonal(x: f32, y: f32, z: f32) -> [f32; 9] {
        [x, 0.0, 0.0, 0.0, y, 0.0, 0.0, 0.0, z]
    }

    /// Checks the universal mesh invariants.
    fn check_invariants(mesh: &MeshBuffer) {
        let v = mesh.num_vertices();
        assert_eq!(mesh.vertex_data().len(), 3 * v);
        assert_eq!(mesh.normal_data().len(), 3 * v);
        assert_eq!(mesh.face_data().len(), 3 * mesh.num_faces());

        for &index in mesh.face_data() {
            assert!((index as usize) < v);
        }
        for face in mesh.faces() {
            assert!(face[0] != face[1] && face[1] != face[2] && face[0] != face[2]);
        }
        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < 1e-5, "normal {} is not unit", n);
        }
    }

    /// Counts distinct undirected mesh edges.
    fn edge_count(mesh: &MeshBuffer) -> usize {
        let mut edges: HashMap<(u32, u32), usize> = HashMap::new();
        for face in mesh.faces() {
            for e in 0..3 {
                let a = face[e];
                let b = face[(e + 1) % 3];
                let key = (a.min(b), a.max(b));
                *edges.entry(key).or_insert(0) += 1;
            }
        }
        edges.len()
    }

    /// True when every undirected edge borders exactly two triangles.
    fn is_closed(mesh: &MeshBuffer) -> bool {
        let mut edges: HashMap<(u32, u32), usize> = HashMap::new();
        for face in mesh.faces() {
            for e in 0..3 {
                let a = face[e];
                let b = face[(e + 1) % 3];
                let key = (a.min(b), a.max(b));
                *edges.entry(key).or_insert(0) += 1;
            }
        }
        edges.values().all(|&count| count == 2)
    }

    fn euler_characteristic(mesh: &MeshBuffer) -> isize {
        mesh.num_vertices() as isize - edge_count(mesh) as isize + mesh.num_faces() as isize
    }

    // ---- validation ------------------------------------------------------

    #[test]
    fn test_rejects_invalid_dimensions() {
        let field = [0.0f32; 4];
        let result = marching_cubes(&field, [1, 2, 2], IDENTITY, 0.5);
        assert!(matches!(result, Err(TessellationError::InvalidDimensions(1, 2, 2))));
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let field = [0.0f32; 7];
        let result = marching_cubes(&field, [2, 2, 2], IDENTITY, 0.5);
        assert!(matches!(
            result,
            Err(TessellationError::SizeMismatch { expected: 8, found: 7 })
        ));
    }

    #[test]
    fn test_rejects_singular_basis() {
        let field = [0.0f32; 8];
        // two identical rows span no volume
        let basis = [1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 0.0, 0.0, 1.0];
        let result = marching_cubes(&field, [2, 2, 2], basis, 0.5);
        assert!(matches!(result, Err(TessellationError::SingularBasis(_))));
    }

    #[test]
    fn test_rejects_non_finite_inputs() {
        let field = [0.0f32; 8];
        assert!(matches!(
            marching_cubes(&field, [2, 2, 2], IDENTITY, f32::NAN),
            Err(TessellationError::NonFiniteInput("isovalue"))
        ));

        let mut basis = IDENTITY;
        basis[4] = f32::INFINITY;
        assert!(matches!(
            marching_cubes(&field, [2, 2, 2], basis, 0.5),
            Err(TessellationError::NonFiniteInput("unit cell"))
        ));
    }

    #[test]
    fn test_reports_nan_field_cell() {
        let mut field = vec![0.0f32; 27];
        // sample (1, 1, 1) is a corner of cell (0, 0, 0) first
        field[1 + 3 * (1 + 3 * 1)] = f32::NAN;
        let result = marching_cubes(&field, [3, 3, 3], IDENTITY, 0.5);
        assert!(matches!(result, Err(TessellationError::NonFiniteField(0, 0, 0))));
    }

    // ---- small deterministic meshes --------------------------------------

    #[test]
    fn test_empty_extraction() {
        let field = [1.0f32; 27];

        let below = marching_cubes(&field, [3, 3, 3], IDENTITY, 0.0).unwrap();
        assert_eq!(below.num_vertices(), 0);
        assert_eq!(below.num_faces(), 0);

        let above = marching_cubes(&field, [3, 3, 3], IDENTITY, 2.0).unwrap();
        assert_eq!(above.num_vertices(), 0);
        assert_eq!(above.num_faces(), 0);
    }

    #[test]
    fn test_single_spike_is_an_octahedron() {
        // one positive sample in a zero background; the surface around it
        // is a closed octahedron: 6 vertices, 8 faces
        let mut field = vec![0.0f32; 27];
        field[1 + 3 * (1 + 3 * 1)] = 1.0;

        let mesh = marching_cubes(&field, [3, 3, 3], IDENTITY, 0.5).unwrap();
        check_invariants(&mesh);

        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_faces(), 8);
        assert!(is_closed(&mesh));
        assert_eq!(euler_characteristic(&mesh), 2);
        assert_eq!(mesh.num_faces(), 2 * mesh.num_vertices() - 4);
    }

    #[test]
    fn test_shared_edges_are_deduplicated() {
        // f = y over two cells along x; the iso plane cuts every y edge
        // once, and the edges on the x=1 lattice plane are shared
        let field = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mesh = marching_cubes(&field, [3, 2, 2], IDENTITY, 0.5).unwrap();
        check_invariants(&mesh);

        // 3 x 2 cut edges, not 4 per cell
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_faces(), 4);
    }

    #[test]
    fn test_normals_follow_the_gradient() {
        // f = z: normals and triangle winding must both face +z
        let field = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let mesh = marching_cubes(&field, [2, 2, 2], IDENTITY, 0.5).unwrap();
        check_invariants(&mesh);

        for n in mesh.normals() {
            assert!((n.z - 1.0).abs() < 1e-5);
        }

        for face in mesh.faces() {
            let p0 = mesh.get_vertex(face[0] as usize).unwrap();
            let p1 = mesh.get_vertex(face[1] as usize).unwrap();
            let p2 = mesh.get_vertex(face[2] as usize).unwrap();
            let winding_normal = (p1 - p0).cross(&(p2 - p0));
            assert!(winding_normal.z > 0.0);
        }
    }

    #[test]
    fn test_isovalue_on_lattice_sample() {
        // f = x with the isovalue exactly on the middle sample plane;
        // the intersection parameters clamp to the corners cleanly
        let mut field = vec![0.0f32; 27];
        for k in 0..3 {
            for j in 0..3 {
                for i in 0..3 {
                    field[i + 3 * (j + 3 * k)] = i as f32;
                }
            }
        }

        let mesh = marching_cubes(&field, [3, 3, 3], IDENTITY, 1.0).unwrap();
        check_invariants(&mesh);
        assert_eq!(mesh.num_vertices(), 9);
        assert_eq!(mesh.num_faces(), 8);
    }

    // ---- bit-exactness properties ----------------------------------------

    fn spike_field() -> Vec<f32> {
        let mut field = vec![0.0f32; 125];
        field[2 + 5 * (2 + 5 * 2)] = 8.0;
        field
    }

    #[test]
    fn test_scaling_field_and_isovalue_is_bit_identical() {
        let field = spike_field();
        let scaled: Vec<f32> = field.iter().map(|v| v * 4.0).collect();

        let mesh = marching_cubes(&field, [5, 5, 5], diagonal(2.0, 2.0, 2.0), 2.0).unwrap();
        let mesh_scaled =
            marching_cubes(&scaled, [5, 5, 5], diagonal(2.0, 2.0, 2.0), 8.0).unwrap();

        assert_eq!(mesh.vertex_data(), mesh_scaled.vertex_data());
        assert_eq!(mesh.normal_data(), mesh_scaled.normal_data());
        assert_eq!(mesh.face_data(), mesh_scaled.face_data());
    }

    #[test]
    fn test_shifting_field_and_isovalue_is_bit_identical() {
        let field = spike_field();
        let shifted: Vec<f32> = field.iter().map(|v| v + 1.0).collect();

        let mesh = marching_cubes(&field, [5, 5, 5], diagonal(2.0, 2.0, 2.0), 2.0).unwrap();
        let mesh_shifted =
            marching_cubes(&shifted, [5, 5, 5], diagonal(2.0, 2.0, 2.0), 3.0).unwrap();

        assert_eq!(mesh.vertex_data(), mesh_shifted.vertex_data());
        assert_eq!(mesh.normal_data(), mesh_shifted.normal_data());
        assert_eq!(mesh.face_data(), mesh_shifted.face_data());
    }

    #[test]
    fn test_axis_permutation_yields_congruent_mesh() {
        // an off-center Gaussian blob on an anisotropic grid
        let dims = [6, 7, 8];
        let mut field = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    let x = 3.0 * i as f64 / (dims[0] - 1) as f64;
                    let y = 4.0 * j as f64 / (dims[1] - 1) as f64;
                    let z = 5.0 * k as f64 / (dims[2] - 1) as f64;
                    let r2 = (x - 1.0).powi(2) + (y - 2.0).powi(2) + (z - 2.5).powi(2);
                    field.push((-r2).exp() as f32);
                }
            }
        }

        // swap the x and y lattice axes together with the basis columns:
        // the Cartesian geometry is unchanged
        let swapped_dims = [dims[1], dims[0], dims[2]];
        let mut swapped = vec![0.0f32; field.len()];
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    swapped[j + swapped_dims[0] * (i + swapped_dims[1] * k)] =
                        field[i + dims[0] * (j + dims[1] * k)];
                }
            }
        }

        let basis = diagonal(3.0, 4.0, 5.0);
        let swapped_basis = [0.0, 3.0, 0.0, 4.0, 0.0, 0.0, 0.0, 0.0, 5.0];

        let mesh = marching_cubes(&field, dims, basis, 0.5).unwrap();
        let mesh_swapped = marching_cubes(&swapped, swapped_dims, swapped_basis, 0.5).unwrap();

        check_invariants(&mesh);
        check_invariants(&mesh_swapped);
        assert_eq!(mesh.num_vertices(), mesh_swapped.num_vertices());
        assert_eq!(mesh.num_faces(), mesh_swapped.num_faces());

        let sorted = |m: &MeshBuffer| {
            let mut points: Vec<[f32; 3]> = m.vertices().map(Into::into).collect();
            points.sort_by(|a, b| {
                a[0].total_cmp(&b[0])
                    .then(a[1].total_cmp(&b[1]))
                    .then(a[2].total_cmp(&b[2]))
            });
            points
        };

        for (a, b) in sorted(&mesh).iter().zip(sorted(&mesh_swapped).iter()) {
            for axis in 0..3 {
                assert!((a[axis] - b[axis]).abs() < 1e-4);
            }
        }
    }

    // ---- end-to-end scenarios --------------------------------------------

    fn gaussian_field(n: usize) -> Vec<f32> {
        let mut field = Vec::with_capacity(n * n * n);
        let axis = |m: usize| 10.0 * m as f64 / (n - 1) as f64;
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    let dx = axis(i) - 5.0;
                    let dy = axis(j) - 5.0;
                    let dz = axis(k) - 5.0;
                    field.push((-(dx * dx + dy * dy + dz * dz)).exp() as f32);
                }
            }
        }
        field
    }

    #[test]
    fn test_gaussian_sphere() {
        let field = gaussian_field(20);
        let mesh = marching_cubes(&field, [20, 20, 20], diagonal(10.0, 10.0, 10.0), 0.1).unwrap();
        check_invariants(&mesh);

        assert_eq!(mesh.num_vertices(), 144);
        assert_eq!(mesh.num_faces(), 284);

        // a topological sphere
        assert!(is_closed(&mesh));
        assert_eq!(euler_characteristic(&mesh), 2);
        assert_eq!(mesh.num_faces(), 2 * mesh.num_vertices() - 4);
    }

    fn icosahedron_field(dims: [usize; 3], size: f64) -> Vec<f32> {
        let phi = (1.0 + 5.0f64.sqrt()) / 2.0;
        let centers = [
            [0.0, 1.0, phi],
            [0.0, -1.0, -phi],
            [0.0, 1.0, -phi],
            [0.0, -1.0, phi],
            [1.0, phi, 0.0],
            [-1.0, -phi, 0.0],
            [1.0, -phi, 0.0],
            [-1.0, phi, 0.0],
            [phi, 0.0, 1.0],
            [-phi, 0.0, -1.0],
            [phi, 0.0, -1.0],
            [-phi, 0.0, 1.0],
        ];

        let axis = |n: usize, m: usize| -size + 2.0 * size * m as f64 / (n - 1) as f64;
        let mut field = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    let x = axis(dims[0], i);
                    let y = axis(dims[1], j);
                    let z = axis(dims[2], k);
                    let mut value = 0.0f64;
                    for c in &centers {
                        value += 1.0
                            / ((x - c[0]).powi(2) + (y - c[1]).powi(2) + (z - c[2]).powi(2));
                    }
                    field.push(value as f32);
                }
            }
        }
        field
    }

    #[test]
    fn test_icosahedral_metaballs() {
        // canonical edge keys make both counts deterministic: one vertex
        // per cut lattice edge, no positional tolerance involved
        let cases: [(usize, usize, usize); 4] = [
            (10, 192, 376),
            (20, 1296, 2632),
            (25, 2124, 4320),
            (50, 9168, 18408),
        ];

        for (n, vertices, faces) in cases {
            let field = icosahedron_field([n, n, n], 3.0);
            let mesh =
                marching_cubes(&field, [n, n, n], diagonal(6.0, 6.0, 6.0), 3.75).unwrap();
            check_invariants(&mesh);

            assert_eq!(mesh.num_vertices(), vertices, "vertex count at n = {}", n);
            assert_eq!(mesh.num_faces(), faces, "face count at n = {}", n);
        }
    }

    #[test]
    fn test_metaballs_on_rectangular_grid() {
        let dims = [30, 40, 50];
        let field = icosahedron_field(dims, 3.0);
        let mesh = marching_cubes(&field, dims, diagonal(6.0, 6.0, 6.0), 3.75).unwrap();
        check_invariants(&mesh);
        assert!(!mesh.is_empty());

        let mut bounds = UnitCell::new(&diagonal(6.0, 6.0, 6.0)).unwrap().bounding_box();
        bounds.inflate(1e-4);
        let mesh_bounds = mesh.bounding_box();
        assert!(bounds.contains(&mesh_bounds.min));
        assert!(bounds.contains(&mesh_bounds.max));
    }

    #[test]
    fn test_gyroid() {
        // f = sin x cos y + sin y cos z + sin z cos x on an open grid
        // covering two periods
        let n = 192usize;
        let step = (4.0 * std::f64::consts::PI / n as f64) as f32;

        let mut field = vec![0.0f32; n * n * n];
        field
            .par_chunks_mut(n * n)
            .enumerate()
            .for_each(|(k, plane)| {
                let z = k as f32 * step;
                for j in 0..n {
                    let y = j as f32 * step;
                    for i in 0..n {
                        let x = i as f32 * step;
                        plane[i + n * j] =
                            x.sin() * y.cos() + y.sin() * z.cos() + z.sin() * x.cos();
                    }
                }
            });

        let mesh = marching_cubes(&field, [n, n, n], IDENTITY, 0.0).unwrap();
        check_invariants(&mesh);
        assert!(!mesh.is_empty());

        let mut bounds = UnitCell::new(&IDENTITY).unwrap().bounding_box();
        bounds.inflate(1e-5);
        let mesh_bounds = mesh.bounding_box();
        assert!(bounds.contains(&mesh_bounds.min));
        assert!(bounds.contains(&mesh_bounds.max));
    }
}
