//! Per-cell triangulation
//!
//! Classifies a single cell against the isovalue, interpolates the
//! intersection points on its active edges, and yields the triangles
//! prescribed by the case table.

use super::tables::{CORNER_OFFSETS, EDGE_ENDPOINTS, TRI_TABLE};
use crate::geometry::Vec3f;

/// Endpoint values closer than this are treated as a flat edge and cut
/// at the midpoint instead of dividing by their difference.
pub(crate) const FLAT_EDGE_EPS: f32 = 1e-12;

/// Computes the 8-bit corner configuration of a cell. Bit `c` is set iff
/// corner `c` samples strictly below the isovalue.
#[inline]
pub(crate) fn configuration(values: &[f32; 8], isovalue: f32) -> u8 {
    let mut cfg = 0u8;
    for (corner, &value) in values.iter().enumerate() {
        if value < isovalue {
            cfg |= 1 << corner;
        }
    }
    cfg
}

/// Interpolation parameter of the isovalue crossing between two endpoint
/// values, clamped to `[0, 1]`.
#[inline]
pub(crate) fn interpolation_parameter(a: f32, b: f32, isovalue: f32) -> f32 {
    let delta = b - a;
    if delta.abs() < FLAT_EDGE_EPS {
        0.5
    } else {
        ((isovalue - a) / delta).clamp(0.0, 1.0)
    }
}

/// Per-edge interpolation parameters for the edges selected by `mask`.
/// Parameters run from the anchor endpoint toward the other, so every
/// cell sharing an edge performs identical arithmetic. Entries of
/// inactive edges are left at zero.
pub(crate) fn edge_parameters(values: &[f32; 8], isovalue: f32, mask: u16) -> [f32; 12] {
    let mut t = [0.0f32; 12];
    for (edge, endpoints) in EDGE_ENDPOINTS.iter().enumerate() {
        if mask & (1 << edge) != 0 {
            t[edge] = interpolation_parameter(values[endpoints[0]], values[endpoints[1]], isovalue);
        }
    }
    t
}

/// Lattice-space position of corner `corner` of the cell at `(i, j, k)`.
#[inline]
pub(crate) fn corner_position(i: usize, j: usize, k: usize, corner: usize) -> Vec3f {
    let offset = CORNER_OFFSETS[corner];
    Vec3f::new(
        (i + offset[0]) as f32,
        (j + offset[1]) as f32,
        (k + offset[2]) as f32,
    )
}

/// Lattice-space position of the intersection on `edge` of the cell at
/// `(i, j, k)`, given its interpolation parameter.
#[inline]
pub(crate) fn edge_position(i: usize, j: usize, k: usize, edge: usize, t: f32) -> Vec3f {
    let [a, b] = EDGE_ENDPOINTS[edge];
    let pa = corner_position(i, j, k, a);
    let pb = corner_position(i, j, k, b);
    pa.lerp(&pb, t)
}

/// Yields the triangles of a configuration as edge-index triples.
///
/// The stored table triples wind toward the below-isovalue side; the
/// second and third entries are swapped here so the right-hand-rule
/// normal points up-gradient, matching the emitted vertex normals.
pub(crate) fn triangles(cfg: u8) -> impl Iterator<Item = [usize; 3]> {
    let row = TRI_TABLE[cfg as usize];
    (0..5).map_while(move |tri| {
        let a = row[3 * tri];
        if a < 0 {
            None
        } else {
            Some([
                a as usize,
                row[3 * tri + 2] as usize,
                row[3 * tri + 1] as usize,
            ])
        }
    })
}
