//! Axis-aligned bounding box
//!
//! Provides a 3D bounding box for bounds checking on lattices and meshes.

use super::vector::BaseVector;
use std::fmt;

/// An axis-aligned bounding box (AABB) in 3D space.
///
/// The bounding box is defined by its minimum and maximum corners.
/// It provides methods for testing point containment and expanding
/// to include new points.
///
/// # Examples
///
/// ```
/// use isotessel::geometry::{BoundingBox, Vec3f};
///
/// let mut bb = BoundingBox::<f32>::new();
/// bb.expand(Vec3f::new(0.0, 0.0, 0.0));
/// bb.expand(Vec3f::new(1.0, 1.0, 1.0));
///
/// assert!(bb.contains(&Vec3f::new(0.5, 0.5, 0.5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox<T> {
    /// Minimum corner of the bounding box
    pub min: BaseVector<T>,
    /// Maximum corner of the bounding box
    pub max: BaseVector<T>,
    /// Whether the bounding box has been initialized
    valid: bool,
}

impl<T: Copy + PartialOrd + Default> BoundingBox<T> {
    /// Creates a new empty bounding box.
    pub fn new() -> Self {
        Self {
            min: BaseVector::default(),
            max: BaseVector::default(),
            valid: false,
        }
    }

    /// Creates a bounding box from min and max points.
    pub fn from_points(min: BaseVector<T>, max: BaseVector<T>) -> Self {
        Self {
            min,
            max,
            valid: true,
        }
    }

    /// Returns whether the bounding box is valid (has at least one point).
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Expands the bounding box to include the given point.
    pub fn expand(&mut self, point: BaseVector<T>) {
        if !self.valid {
            self.min = point;
            self.max = point;
            self.valid = true;
        } else {
            if point.x < self.min.x {
                self.min.x = point.x;
            }
            if point.y < self.min.y {
                self.min.y = point.y;
            }
            if point.z < self.min.z {
                self.min.z = point.z;
            }
            if point.x > self.max.x {
                self.max.x = point.x;
            }
            if point.y > self.max.y {
                self.max.y = point.y;
            }
            if point.z > self.max.z {
                self.max.z = point.z;
            }
        }
    }

    /// Tests if a point is inside the bounding box.
    pub fn contains(&self, point: &BaseVector<T>) -> bool {
        if !self.valid {
            return false;
        }
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

impl<T> BoundingBox<T>
where
    T: Copy + PartialOrd + Default + std::ops::Sub<Output = T>,
{
    /// Returns the extent (size) of the bounding box along each axis.
    pub fn extent(&self) -> BaseVector<T> {
        BaseVector {
            x: self.max.x - self.min.x,
            y: self.max.y - self.min.y,
            z: self.max.z - self.min.z,
        }
    }
}

impl BoundingBox<f32> {
    /// Grows the box by the given margin on every side.
    pub fn inflate(&mut self, margin: f32) {
        if self.valid {
            self.min.x -= margin;
            self.min.y -= margin;
            self.min.z -= margin;
            self.max.x += margin;
            self.max.y += margin;
            self.max.z += margin;
        }
    }
}

impl<T: Copy + PartialOrd + Default> Default for BoundingBox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Display> fmt::Display for BoundingBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox: [{}, {}, {}] - [{}, {}, {}]",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}

impl<T: Copy + PartialOrd + Default> FromIterator<BaseVector<T>> for BoundingBox<T> {
    fn from_iter<I: IntoIterator<Item = BaseVector<T>>>(iter: I) -> Self {
        let mut bb = BoundingBox::new();
        for point in iter {
            bb.expand(point);
        }
        bb
    }
}
