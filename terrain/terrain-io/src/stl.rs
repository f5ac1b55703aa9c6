//! Binary STL.
//!
//! # Layout
//!
//! | Offset | Size | Content |
//! |--------|------|---------|
//! | 0      | 80   | header text, space padded |
//! | 80     | 4    | triangle count, `u32` LE |
//! | 84     | 50·n | triangles |
//!
//! Each triangle is a unit normal and three vertices as `f32` LE triples,
//! followed by a zero `u16` attribute count.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use terrain_types::{SolidMesh, Vector3};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle record in bytes.
pub const TRIANGLE_SIZE: usize = 50;

/// Header text used when none is given.
pub const DEFAULT_HEADER: &str = "Binary STL generated by terraslab";

/// Exact encoded size of a solid with `triangles` faces.
#[must_use]
pub const fn stl_size(triangles: usize) -> usize {
    HEADER_SIZE + 4 + TRIANGLE_SIZE * triangles
}

/// Encode `mesh` as binary STL in memory.
///
/// # Errors
///
/// Returns an error if a face references a missing vertex or the face count
/// does not fit in `u32`.
///
/// # Example
///
/// ```
/// use terrain_io::{encode_stl, stl_size};
/// use terrain_types::{Point3, SolidMesh};
///
/// let mut mesh = SolidMesh::new();
/// let a = mesh.push_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.push_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.push_vertex(Point3::new(0.0, 1.0, 0.0));
/// mesh.push_face([a, b, c]);
///
/// let bytes = encode_stl(&mesh, "demo").unwrap();
/// assert_eq!(bytes.len(), stl_size(1));
/// assert_eq!(&bytes[..4], b"demo");
/// ```
pub fn encode_stl(mesh: &SolidMesh, header: &str) -> IoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(stl_size(mesh.face_count()));
    write_stl(mesh, header, &mut out)?;
    Ok(out)
}

/// Write `mesh` as binary STL.
///
/// Header text longer than 80 bytes is truncated.
///
/// # Errors
///
/// Returns an error on invalid faces, too many faces, or a failed write.
pub fn write_stl<W: Write>(mesh: &SolidMesh, header: &str, mut writer: W) -> IoResult<()> {
    let face_count = u32::try_from(mesh.face_count()).map_err(|_| IoError::TooManyTriangles {
        count: mesh.face_count(),
    })?;

    let mut padded = [b' '; HEADER_SIZE];
    let text = header.as_bytes();
    let len = text.len().min(HEADER_SIZE);
    padded[..len].copy_from_slice(&text[..len]);
    writer.write_all(&padded)?;
    writer.write_all(&face_count.to_le_bytes())?;

    let mut record = [0u8; TRIANGLE_SIZE];
    for face in 0..mesh.face_count() {
        let [v0, v1, v2] = mesh.triangle(face).ok_or(IoError::InvalidFace { face })?;
        let normal = mesh.face_normal(face).unwrap_or_else(Vector3::zeros);

        put_triple(&mut record[0..12], normal.x, normal.y, normal.z);
        put_triple(&mut record[12..24], v0.x, v0.y, v0.z);
        put_triple(&mut record[24..36], v1.x, v1.y, v1.z);
        put_triple(&mut record[36..48], v2.x, v2.y, v2.z);
        record[48..50].copy_from_slice(&0u16.to_le_bytes());
        writer.write_all(&record)?;
    }

    Ok(())
}

/// Write `mesh` to a file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_stl_file<P: AsRef<Path>>(mesh: &SolidMesh, header: &str, path: P) -> IoResult<()> {
    let path = path.as_ref();
    debug!("Writing {} triangles to {:?}", mesh.face_count(), path);
    let mut writer = BufWriter::new(File::create(path)?);
    write_stl(mesh, header, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Store three `f64` values as `f32` LE into a 12-byte slot.
#[allow(clippy::cast_possible_truncation)]
// Truncation: f64 to f32 is intentional for STL format
fn put_triple(slot: &mut [u8], x: f64, y: f64, z: f64) {
    slot[0..4].copy_from_slice(&(x as f32).to_le_bytes());
    slot[4..8].copy_from_slice(&(y as f32).to_le_bytes());
    slot[8..12].copy_from_slice(&(z as f32).to_le_bytes());
}

/// One decoded triangle record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StlTriangle {
    /// Stored facet normal.
    pub normal: [f32; 3],
    /// Corner positions.
    pub vertices: [[f32; 3]; 3],
    /// Attribute byte count.
    pub attribute: u16,
}

/// A decoded binary STL.
#[derive(Debug, Clone, PartialEq)]
pub struct StlFile {
    /// Header text with trailing spaces and NULs removed.
    pub header: String,
    /// Triangle records in file order.
    pub triangles: Vec<StlTriangle>,
}

/// Decode a binary STL buffer.
///
/// Bytes past the last declared triangle are ignored.
///
/// # Errors
///
/// Returns an error if the buffer is shorter than its header or than the
/// triangle count it declares.
pub fn read_stl_binary(bytes: &[u8]) -> IoResult<StlFile> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::TruncatedHeader { got: bytes.len() });
    }
    let header = String::from_utf8_lossy(&bytes[..HEADER_SIZE])
        .trim_end_matches([' ', '\0'])
        .to_owned();
    let declared = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let body = &bytes[HEADER_SIZE + 4..];
    let available = body.len() / TRIANGLE_SIZE;
    if (declared as usize) > available {
        return Err(IoError::TriangleCountMismatch {
            declared,
            available,
        });
    }

    let triangles = body
        .chunks_exact(TRIANGLE_SIZE)
        .take(declared as usize)
        .map(|record| StlTriangle {
            normal: get_triple(&record[0..12]),
            vertices: [
                get_triple(&record[12..24]),
                get_triple(&record[24..36]),
                get_triple(&record[36..48]),
            ],
            attribute: u16::from_le_bytes([record[48], record[49]]),
        })
        .collect();

    Ok(StlFile { header, triangles })
}

/// Read a binary STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub fn read_stl_file<P: AsRef<Path>>(path: P) -> IoResult<StlFile> {
    read_stl_binary(&std::fs::read(path)?)
}

fn get_triple(slot: &[u8]) -> [f32; 3] {
    let f = |i: usize| f32::from_le_bytes([slot[i], slot[i + 1], slot[i + 2], slot[i + 3]]);
    [f(0), f(4), f(8)]
}
