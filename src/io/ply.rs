//! PLY file format support
//!
//! Writes meshes as PLY (Polygon File Format) with per-vertex positions
//! and normals, in ascii or binary little-endian, and reads them back.

use super::IoError;
use crate::types::MeshBuffer;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Payload encoding of a PLY file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

/// Saves a mesh to a PLY file.
///
/// The vertex element carries six float properties (x, y, z, nx, ny, nz);
/// the face element carries a `uchar` count followed by three `uint`
/// indices per triangle.
pub fn save_ply<P: AsRef<Path>>(
    path: P,
    mesh: &MeshBuffer,
    format: PlyFormat,
) -> Result<(), IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ply")?;
    match format {
        PlyFormat::Ascii => writeln!(writer, "format ascii 1.0")?,
        PlyFormat::BinaryLittleEndian => writeln!(writer, "format binary_little_endian 1.0")?,
    }
    writeln!(writer, "element vertex {}", mesh.num_vertices())?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "property float nx")?;
    writeln!(writer, "property float ny")?;
    writeln!(writer, "property float nz")?;
    writeln!(writer, "element face {}", mesh.num_faces())?;
    writeln!(writer, "property list uchar uint vertex_indices")?;
    writeln!(writer, "end_header")?;

    match format {
        PlyFormat::Ascii => {
            for i in 0..mesh.num_vertices() {
                let v = mesh.get_vertex(i).ok_or_else(missing_normals)?;
                let n = mesh.get_normal(i).ok_or_else(missing_normals)?;
                writeln!(writer, "{} {} {} {} {} {}", v.x, v.y, v.z, n.x, n.y, n.z)?;
            }
            for face in mesh.faces() {
                writeln!(writer, "3 {} {} {}", face[0], face[1], face[2])?;
            }
        }
        PlyFormat::BinaryLittleEndian => {
            for i in 0..mesh.num_vertices() {
                let v = mesh.get_vertex(i).ok_or_else(missing_normals)?;
                let n = mesh.get_normal(i).ok_or_else(missing_normals)?;
                for value in [v.x, v.y, v.z, n.x, n.y, n.z] {
                    writer.write_all(&value.to_le_bytes())?;
                }
            }
            for face in mesh.faces() {
                writer.write_all(&[3u8])?;
                for index in face {
                    writer.write_all(&index.to_le_bytes())?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}

fn missing_normals() -> IoError {
    IoError::ParseError("mesh has fewer normals than vertices".to_string())
}

/// Loads a mesh from an ascii or binary little-endian PLY file.
///
/// The file must carry positions and normals per vertex and triangular
/// faces, as written by [`save_ply`].
pub fn load_ply<P: AsRef<Path>>(path: P) -> Result<MeshBuffer, IoError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| IoError::FileNotFound(path.display().to_string()))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader)?;

    let empty = Vec::new();
    let vertices = ply.payload.get("vertex").unwrap_or(&empty);
    let faces = ply.payload.get("face").unwrap_or(&empty);

    let mut positions = Vec::with_capacity(vertices.len() * 3);
    let mut normals = Vec::with_capacity(vertices.len() * 3);
    for vertex in vertices {
        positions.push(float_property(vertex, "x")?);
        positions.push(float_property(vertex, "y")?);
        positions.push(float_property(vertex, "z")?);
        normals.push(float_property(vertex, "nx")?);
        normals.push(float_property(vertex, "ny")?);
        normals.push(float_property(vertex, "nz")?);
    }

    let mut indices = Vec::with_capacity(faces.len() * 3);
    for face in faces {
        let count = match face.get("vertex_indices") {
            Some(Property::ListUInt(list)) => {
                indices.extend_from_slice(list);
                list.len()
            }
            Some(Property::ListInt(list)) => {
                indices.extend(list.iter().map(|&i| i as u32));
                list.len()
            }
            _ => {
                return Err(IoError::ParseError(
                    "face element without vertex_indices list".to_string(),
                ))
            }
        };
        if count != 3 {
            return Err(IoError::ParseError(format!(
                "only triangular faces are supported, found a {}-gon",
                count
            )));
        }
    }

    Ok(MeshBuffer::from_raw(positions, normals, indices))
}

fn float_property(element: &DefaultElement, name: &str) -> Result<f32, IoError> {
    match element.get(name) {
        Some(Property::Float(value)) => Ok(*value),
        Some(Property::Double(value)) => Ok(*value as f32),
        _ => Err(IoError::ParseError(format!(
            "vertex element without float property {}",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marching_cubes;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("isotessel_{}_{}", std::process::id(), name))
    }

    fn plane_mesh() -> MeshBuffer {
        // f = z over a single cell: a quad at z = 0.5
        let field = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let basis = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        marching_cubes(&field, [2, 2, 2], basis, 0.5).unwrap()
    }

    #[test]
    fn test_ascii_round_trip() {
        let mesh = plane_mesh();
        let path = temp_path("ascii.ply");

        save_ply(&path, &mesh, PlyFormat::Ascii).unwrap();
        let loaded = load_ply(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.vertex_data(), mesh.vertex_data());
        assert_eq!(loaded.normal_data(), mesh.normal_data());
        assert_eq!(loaded.face_data(), mesh.face_data());
    }

    #[test]
    fn test_binary_round_trip() {
        let mesh = plane_mesh();
        let path = temp_path("binary.ply");

        save_ply(&path, &mesh, PlyFormat::BinaryLittleEndian).unwrap();
        let loaded = load_ply(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.vertex_data(), mesh.vertex_data());
        assert_eq!(loaded.normal_data(), mesh.normal_data());
        assert_eq!(loaded.face_data(), mesh.face_data());
    }

    #[test]
    fn test_binary_payload_layout() {
        let mesh = plane_mesh();
        let path = temp_path("layout.ply");

        save_ply(&path, &mesh, PlyFormat::BinaryLittleEndian).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let marker = b"end_header\n";
        let header_end = bytes
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap()
            + marker.len();

        // 24 bytes per vertex, 13 per face
        let expected = mesh.num_vertices() * 24 + mesh.num_faces() * 13;
        assert_eq!(bytes.len() - header_end, expected);
    }

    #[test]
    fn test_empty_mesh_round_trip() {
        let mesh = MeshBuffer::new();
        let path = temp_path("empty.ply");

        save_ply(&path, &mesh, PlyFormat::Ascii).unwrap();
        let loaded = load_ply(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_vertices(), 0);
        assert_eq!(loaded.num_faces(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_ply(temp_path("does_not_exist.ply"));
        assert!(matches!(result, Err(IoError::FileNotFound(_))));
    }
}
