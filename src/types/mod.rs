//! Core data types for scalar fields and meshes
//!
//! This module provides the fundamental data structures for the field
//! consumed by the extraction and the mesh it produces.

mod channel;
mod mesh_buffer;
mod scalar_field;

pub use channel::Channel;
pub use mesh_buffer::MeshBuffer;
pub use scalar_field::ScalarField;
