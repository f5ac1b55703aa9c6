//! Error types for solid construction.

use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while building a solid.
///
/// All of these are recoverable at a coarser resolution; the pipeline
/// treats them as a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// The grid has no valid cells to place vertices on.
    #[error("grid has no valid cells")]
    NoVertices,

    /// No 2×2 block of valid cells survived, so there is no surface.
    #[error("no complete grid quads; surface is empty")]
    NoTriangles,

    /// A computed vertex coordinate was NaN or infinite.
    #[error("non-finite vertex at grid cell ({x}, {y})")]
    NonFiniteVertex {
        /// Grid column.
        x: usize,
        /// Grid row.
        y: usize,
    },

    /// The solid needs more vertices than 32-bit indices can address.
    #[error("solid needs {count} vertices, beyond the 32-bit index range")]
    IndexOverflow {
        /// Required vertex count.
        count: usize,
    },
}

impl MeshError {
    /// Create a non-finite vertex error.
    #[must_use]
    pub const fn non_finite(x: usize, y: usize) -> Self {
        Self::NonFiniteVertex { x, y }
    }
}
