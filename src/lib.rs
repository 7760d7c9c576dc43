//! # isotessel
//!
//! A Rust library for building triangulated isosurfaces from 3D scalar
//! fields sampled on a regular lattice.
//!
//! ## Features
//!
//! - Marching cubes extraction over an arbitrary parallelepiped unit cell
//! - Exact vertex deduplication across shared cell edges
//! - Per-vertex normals from the field gradient
//! - PLY (ascii / binary) and binary STL output
//!
//! ## Example
//!
//! ```rust,no_run
//! use isotessel::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // A flat scalar field, x fastest and z slowest
//!     let field: Vec<f32> = build_field();
//!
//!     // Cubic domain of edge length 10
//!     let basis = [10.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0];
//!
//!     let mesh = marching_cubes(&field, [64, 64, 64], basis, 0.1)?;
//!     isotessel::io::save_mesh("surface.ply", &mesh)?;
//!
//!     Ok(())
//! }
//! # fn build_field() -> Vec<f32> { vec![0.0; 64 * 64 * 64] }
//! ```

pub mod geometry;
pub mod io;
pub mod tessellation;
pub mod types;
pub mod util;

pub use tessellation::{marching_cubes, TessellationError};

/// Crate version, sourced from the package manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::geometry::{BaseVector, BoundingBox, Normal, UnitCell, Vec3f};
    pub use crate::io::{load_ply, save_mesh, save_ply, save_stl, PlyFormat};
    pub use crate::tessellation::{marching_cubes, TessellationError};
    pub use crate::types::{MeshBuffer, ScalarField};
}
