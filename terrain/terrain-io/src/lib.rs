//! Binary STL output for terrain solids.
//!
//! A [`SolidMesh`](terrain_types::SolidMesh) is written as an 80-byte
//! header, a `u32` triangle count and one 50-byte record per face. Normals
//! are recomputed from each face's winding, so they always point out of an
//! outward-wound solid.
//!
//! The reader exists for inspecting and testing output; it performs no
//! vertex welding.
//!
//! # Example
//!
//! ```no_run
//! use terrain_io::{read_stl_file, write_stl_file, DEFAULT_HEADER};
//! use terrain_types::SolidMesh;
//!
//! let mesh = SolidMesh::new();
//! write_stl_file(&mesh, DEFAULT_HEADER, "terrain.stl").unwrap();
//! let stl = read_stl_file("terrain.stl").unwrap();
//! assert_eq!(stl.triangles.len(), mesh.face_count());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod stl;

pub use error::{IoError, IoResult};
pub use stl::{
    encode_stl, read_stl_binary, read_stl_file, stl_size, write_stl, write_stl_file, StlFile,
    StlTriangle, DEFAULT_HEADER, HEADER_SIZE, TRIANGLE_SIZE,
};
