//! Parallelepiped unit cell of a regular lattice
//!
//! The unit cell maps fractional lattice coordinates to Cartesian space
//! and carries the inverse-transpose basis needed to transform field
//! gradients into true spatial gradients.

use super::{BoundingBox, Vec3f};
use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Raised when the supplied basis matrix cannot span a volume.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("unit cell basis is singular (det = {det:e})")]
pub struct SingularCellError {
    /// Determinant of the rejected basis
    pub det: f32,
}

/// A parallelepiped unit cell described by a 3x3 basis matrix `B`.
///
/// The matrix is supplied in row-major order and interpreted so that the
/// Cartesian position of fractional lattice coordinates `u` is `B * u`.
/// The lattice point `(i, j, k)` of an `Nx x Ny x Nz` grid has fractional
/// coordinates `(i/(Nx-1), j/(Ny-1), k/(Nz-1))`.
///
/// # Examples
///
/// ```
/// use isotessel::geometry::{UnitCell, Vec3f};
///
/// // A cubic cell with edge length 10
/// let cell = UnitCell::new(&[
///     10.0, 0.0, 0.0,
///     0.0, 10.0, 0.0,
///     0.0, 0.0, 10.0,
/// ]).unwrap();
///
/// let p = cell.to_cartesian(Vec3f::new(0.5, 0.5, 0.5));
/// assert!((p.x - 5.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UnitCell {
    basis: Matrix3<f32>,
    inv_transpose: Matrix3<f32>,
    det: f32,
}

impl UnitCell {
    /// Determinants below this magnitude are treated as singular.
    pub const MIN_DETERMINANT: f32 = 1e-30;

    /// Builds a unit cell from a row-major 3x3 basis matrix.
    pub fn new(elements: &[f32; 9]) -> Result<Self, SingularCellError> {
        let basis = Matrix3::from_row_slice(elements);
        let det = basis.determinant();

        if !det.is_finite() || det.abs() < Self::MIN_DETERMINANT {
            return Err(SingularCellError { det });
        }

        let inverse = basis.try_inverse().ok_or(SingularCellError { det })?;

        Ok(Self {
            basis,
            inv_transpose: inverse.transpose(),
            det,
        })
    }

    /// Returns the determinant of the basis (the signed cell volume).
    pub fn determinant(&self) -> f32 {
        self.det
    }

    /// Maps fractional lattice coordinates to Cartesian space.
    #[inline]
    pub fn to_cartesian(&self, fractional: Vec3f) -> Vec3f {
        let p = self.basis * Vector3::new(fractional.x, fractional.y, fractional.z);
        Vec3f::new(p.x, p.y, p.z)
    }

    /// Transforms a gradient taken in fractional coordinates into the true
    /// spatial gradient, using the inverse-transpose of the basis.
    #[inline]
    pub fn gradient_to_cartesian(&self, gradient: Vec3f) -> Vec3f {
        let g = self.inv_transpose * Vector3::new(gradient.x, gradient.y, gradient.z);
        Vec3f::new(g.x, g.y, g.z)
    }

    /// Returns the axis-aligned bounding box of the cell volume, i.e. of
    /// the eight Cartesian corners spanned by fractional `{0, 1}^3`.
    pub fn bounding_box(&self) -> BoundingBox<f32> {
        let mut bb = BoundingBox::new();
        for corner in 0..8 {
            let frac = Vec3f::new(
                (corner & 1) as f32,
                ((corner >> 1) & 1) as f32,
                ((corner >> 2) & 1) as f32,
            );
            bb.expand(self.to_cartesian(frac));
        }
        bb
    }
}
