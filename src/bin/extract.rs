//! Command line isosurface extractor
//!
//! Reads a flat scalar field from disk, runs marching cubes, and writes
//! the resulting mesh as PLY or STL.

use clap::Parser;
use isotessel::io::{save_mesh, save_ply, save_stl, PlyFormat};
use isotessel::marching_cubes;
use std::fs;
use std::path::{Path, PathBuf};

/// Build a triangulated isosurface from a 3D scalar field.
///
/// The field file holds `NX * NY * NZ` samples with x the fastest-varying
/// axis and z the slowest: little-endian f32 for binary files, one value
/// per whitespace-separated token for `.txt` files.
#[derive(Parser)]
#[command(name = "isotessel", version, about)]
struct Args {
    /// Input scalar field file
    field: PathBuf,

    /// Grid dimensions
    #[arg(long, num_args = 3, value_names = ["NX", "NY", "NZ"], required = true)]
    dims: Vec<usize>,

    /// Isovalue to triangulate
    #[arg(long, allow_negative_numbers = true, required = true)]
    isovalue: f32,

    /// Row-major 3x3 unit cell matrix
    #[arg(long, num_args = 9, allow_negative_numbers = true, conflicts_with = "size")]
    basis: Option<Vec<f32>>,

    /// Cubic cell edge length (shorthand for a diagonal basis)
    #[arg(long)]
    size: Option<f32>,

    /// Output mesh file (.ply or .stl)
    #[arg(short, long)]
    output: PathBuf,

    /// Write the PLY payload in binary instead of ascii
    #[arg(long)]
    binary: bool,
}

fn main() {
    env_logger::init();

    if let Err(error) = run(Args::parse()) {
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let dims = [args.dims[0], args.dims[1], args.dims[2]];
    let field = load_field(&args.field)?;

    let basis = match (&args.basis, args.size) {
        (Some(values), _) => {
            let mut basis = [0.0f32; 9];
            basis.copy_from_slice(values);
            basis
        }
        (None, Some(size)) => [size, 0.0, 0.0, 0.0, size, 0.0, 0.0, 0.0, size],
        (None, None) => [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    let mesh = marching_cubes(&field, dims, basis, args.isovalue)?;

    let extension = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match (extension.as_str(), args.binary) {
        ("ply", true) => save_ply(&args.output, &mesh, PlyFormat::BinaryLittleEndian)?,
        ("stl", _) => save_stl(&args.output, &mesh)?,
        _ => save_mesh(&args.output, &mesh)?,
    }

    println!(
        "{}: {} vertices, {} triangles",
        args.output.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );

    Ok(())
}

/// Loads field samples from a binary (little-endian f32) or text file.
fn load_field(path: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    if is_text {
        let content = fs::read_to_string(path)?;
        let mut field = Vec::new();
        for token in content.split_whitespace() {
            field.push(token.parse::<f32>()?);
        }
        Ok(field)
    } else {
        let bytes = fs::read(path)?;
        if bytes.len() % 4 != 0 {
            return Err(format!(
                "{}: length {} is not a whole number of f32 samples",
                path.display(),
                bytes.len()
            )
            .into());
        }
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }
}
