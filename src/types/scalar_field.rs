//! Read-only view of a scalar field sampled on a regular lattice
//!
//! The field is a flat array with `x` the fastest-varying axis and `z`
//! the slowest, mirroring how volumetric data is usually laid out.

/// A borrowed scalar field of `Nx * Ny * Nz` samples.
///
/// The flat index of sample `(i, j, k)` is `i + Nx * (j + Ny * k)`.
/// The field is immutable through extraction.
///
/// # Examples
///
/// ```
/// use isotessel::types::ScalarField;
///
/// let data = vec![0.0f32; 2 * 3 * 4];
/// let field = ScalarField::new(&data, [2, 3, 4]);
/// assert_eq!(field.len(), 24);
/// assert_eq!(field.value(1, 2, 3), 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScalarField<'a> {
    data: &'a [f32],
    dims: [usize; 3],
}

impl<'a> ScalarField<'a> {
    /// Wraps a flat sample array. The caller is responsible for the length
    /// matching the dimensions; the driver validates this before building
    /// the view.
    pub fn new(data: &'a [f32], dims: [usize; 3]) -> Self {
        debug_assert_eq!(data.len(), dims[0] * dims[1] * dims[2]);
        Self { data, dims }
    }

    /// Returns the grid dimensions `(Nx, Ny, Nz)`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Returns the total number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the field holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the flat index of sample `(i, j, k)`.
    #[inline]
    pub fn index_of(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    /// Returns the sample value at `(i, j, k)`.
    #[inline]
    pub fn value(&self, i: usize, j: usize, k: usize) -> f32 {
        self.data[self.index_of(i, j, k)]
    }

    /// Returns the eight corner values of the cell at `(i, j, k)`, in
    /// canonical corner order.
    #[inline]
    pub fn cell_corners(&self, i: usize, j: usize, k: usize) -> [f32; 8] {
        [
            self.value(i, j, k),
            self.value(i + 1, j, k),
            self.value(i + 1, j + 1, k),
            self.value(i, j + 1, k),
            self.value(i, j, k + 1),
            self.value(i + 1, j, k + 1),
            self.value(i + 1, j + 1, k + 1),
            self.value(i, j + 1, k + 1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order() {
        // x fastest, z slowest
        let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let field = ScalarField::new(&data, [2, 3, 4]);

        assert_eq!(field.value(0, 0, 0), 0.0);
        assert_eq!(field.value(1, 0, 0), 1.0);
        assert_eq!(field.value(0, 1, 0), 2.0);
        assert_eq!(field.value(0, 0, 1), 6.0);
        assert_eq!(field.value(1, 2, 3), 23.0);
    }

    #[test]
    fn test_cell_corners() {
        let data: Vec<f32> = (0..8).map(|v| v as f32).collect();
        let field = ScalarField::new(&data, [2, 2, 2]);

        let corners = field.cell_corners(0, 0, 0);
        assert_eq!(corners, [0.0, 1.0, 3.0, 2.0, 4.0, 5.0, 7.0, 6.0]);
    }
}
