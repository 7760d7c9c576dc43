//! Binary STL support
//!
//! Writes a mesh as a binary STL triangle list: an 80-byte header, a
//! little-endian triangle count, and one 50-byte record per triangle.

use super::IoError;
use crate::geometry::{Normal, Vec3f};
use crate::types::MeshBuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Saves a mesh to a binary STL file.
///
/// STL stores unindexed triangles, so shared vertices are written once
/// per incident face. Each record carries a face normal (the renormalized
/// average of the three vertex normals), the three vertex positions in
/// winding order, and a zero attribute word.
pub fn save_stl<P: AsRef<Path>>(path: P, mesh: &MeshBuffer) -> Result<(), IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let header = [0u8; 80];
    writer.write_all(&header)?;
    writer.write_all(&(mesh.num_faces() as u32).to_le_bytes())?;

    for face in mesh.faces() {
        let mut normal_sum = Vec3f::default();
        for &index in &face {
            if let Some(n) = mesh.get_normal(index as usize) {
                normal_sum += n;
            }
        }
        let face_normal = Normal::new(normal_sum.x, normal_sum.y, normal_sum.z);

        write_vec3(&mut writer, face_normal.to_vector())?;
        for &index in &face {
            let vertex = mesh.get_vertex(index as usize).ok_or_else(|| {
                IoError::ParseError(format!("face references missing vertex {}", index))
            })?;
            write_vec3(&mut writer, vertex)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

fn write_vec3<W: Write>(writer: &mut W, v: Vec3f) -> std::io::Result<()> {
    for value in [v.x, v.y, v.z] {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}
