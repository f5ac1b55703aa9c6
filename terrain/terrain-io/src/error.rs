//! Error types for solid serialization.

use thiserror::Error;

/// Result type for STL operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while encoding or decoding STL.
#[derive(Debug, Error)]
pub enum IoError {
    /// The buffer is shorter than the 84-byte preamble.
    #[error("STL is {got} bytes, shorter than the 84-byte header")]
    TruncatedHeader {
        /// Bytes available.
        got: usize,
    },

    /// The declared triangle count disagrees with the payload length.
    #[error("STL declares {declared} triangles but carries {available}")]
    TriangleCountMismatch {
        /// Count from the header.
        declared: u32,
        /// Complete triangle records present.
        available: usize,
    },

    /// The solid has more faces than a binary STL can count.
    #[error("{count} triangles exceed the binary STL limit")]
    TooManyTriangles {
        /// Face count.
        count: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references a missing vertex")]
    InvalidFace {
        /// Face index.
        face: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
