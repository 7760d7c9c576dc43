//! Mesh serialization
//!
//! This module writes extracted meshes to PLY (ascii or binary
//! little-endian) and binary STL files, and reads PLY meshes back.

mod ply;
mod stl;

pub use ply::{load_ply, save_ply, PlyFormat};
pub use stl::save_stl;

use crate::types::MeshBuffer;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during file I/O
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Saves a mesh to a file, picking the format from the extension.
///
/// PLY files are written in ascii; use [`save_ply`] directly for binary
/// output.
pub fn save_mesh<P: AsRef<Path>>(path: P, mesh: &MeshBuffer) -> Result<(), IoError> {
    let path = path.as_ref();
    match extension_of(path).as_str() {
        "ply" => save_ply(path, mesh, PlyFormat::Ascii),
        "stl" => save_stl(path, mesh),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

/// Loads a mesh from a file, picking the format from the extension.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<MeshBuffer, IoError> {
    let path = path.as_ref();
    match extension_of(path).as_str() {
        "ply" => load_ply(path),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}
