//! Geometry primitives and operations
//!
//! This module provides fundamental geometric types like vectors, normals,
//! bounding boxes, and the lattice unit cell.

mod bounding_box;
mod normal;
mod unit_cell;
mod vector;

pub use bounding_box::BoundingBox;
pub use normal::Normal;
pub use unit_cell::{SingularCellError, UnitCell};
pub use vector::{BaseVector, Vec3f};
