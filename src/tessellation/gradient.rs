//! Field gradient sampling
//!
//! Per-corner gradients are taken by central differences in index space
//! (one-sided at the lattice boundary) and transformed into true spatial
//! gradients through the unit cell. Gradients point from lower field
//! values toward higher ones and double as unnormalized surface normals.

use crate::geometry::{Normal, UnitCell, Vec3f};
use crate::types::ScalarField;

/// Samples Cartesian field gradients at lattice points.
pub(crate) struct GradientSampler<'a> {
    field: &'a ScalarField<'a>,
    cell: &'a UnitCell,
    /// Index-space to fractional-coordinate scale, `N - 1` per axis
    scale: Vec3f,
}

impl<'a> GradientSampler<'a> {
    pub(crate) fn new(field: &'a ScalarField<'a>, cell: &'a UnitCell) -> Self {
        let [nx, ny, nz] = field.dims();
        Self {
            field,
            cell,
            scale: Vec3f::new((nx - 1) as f32, (ny - 1) as f32, (nz - 1) as f32),
        }
    }

    /// Field difference along one axis at `(i, j, k)`, in index units.
    fn axis_delta(&self, i: usize, j: usize, k: usize, axis: usize) -> f32 {
        let n = self.field.dims()[axis];
        let pos = [i, j, k][axis];

        let at = |p: usize| match axis {
            0 => self.field.value(p, j, k),
            1 => self.field.value(i, p, k),
            _ => self.field.value(i, j, p),
        };

        if pos == 0 {
            at(1) - at(0)
        } else if pos == n - 1 {
            at(pos) - at(pos - 1)
        } else {
            (at(pos + 1) - at(pos - 1)) * 0.5
        }
    }

    /// Cartesian gradient of the field at lattice point `(i, j, k)`.
    pub(crate) fn at(&self, i: usize, j: usize, k: usize) -> Vec3f {
        let fractional = Vec3f::new(
            self.axis_delta(i, j, k, 0) * self.scale.x,
            self.axis_delta(i, j, k, 1) * self.scale.y,
            self.axis_delta(i, j, k, 2) * self.scale.z,
        );
        self.cell.gradient_to_cartesian(fractional)
    }

    /// Gradients at the eight corners of the cell at `(i, j, k)`, in
    /// canonical corner order.
    pub(crate) fn cell_corners(&self, i: usize, j: usize, k: usize) -> [Vec3f; 8] {
        [
            self.at(i, j, k),
            self.at(i + 1, j, k),
            self.at(i + 1, j + 1, k),
            self.at(i, j + 1, k),
            self.at(i, j, k + 1),
            self.at(i + 1, j, k + 1),
            self.at(i + 1, j + 1, k + 1),
            self.at(i, j + 1, k + 1),
        ]
    }
}

/// Unit normal at an edge intersection: the endpoint gradients lerped
/// with the positional parameter, then renormalized. Returns the normal
/// and whether the interpolated gradient was too flat to normalize (the
/// `(0, 0, 1)` fallback kicked in).
#[inline]
pub(crate) fn edge_normal(ga: &Vec3f, gb: &Vec3f, t: f32) -> (Normal<f32>, bool) {
    let g = ga.lerp(gb, t);
    let flat = Normal::<f32>::is_degenerate(g.x, g.y, g.z);
    (Normal::new(g.x, g.y, g.z), flat)
}
