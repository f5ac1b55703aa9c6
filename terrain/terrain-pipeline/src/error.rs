//! Error types for generation.

use terrain_fetch::FetchError;
use terrain_io::IoError;
use terrain_mesh::MeshError;
use terrain_types::RequestError;
use thiserror::Error;

/// Result type for generation.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that end a generation.
///
/// Source and geometry failures are wrapped transparently, so the message a
/// caller sees after the ladder is exhausted is the underlying one.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request was rejected before any fetch.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// No elevation source could serve the request.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The grid could not be turned into a solid.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// STL encoding failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The tier table produced no attempts.
    #[error("resolution ladder is empty")]
    EmptyLadder,
}

impl PipelineError {
    /// Whether a coarser attempt might succeed where this one failed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Mesh(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_and_mesh_failures_are_retryable() {
        assert!(PipelineError::from(FetchError::NoAssets).is_retryable());
        assert!(PipelineError::from(MeshError::NoTriangles).is_retryable());
        assert!(!PipelineError::EmptyLadder.is_retryable());
        assert!(!PipelineError::from(IoError::InvalidFace { face: 0 }).is_retryable());
    }

    #[test]
    fn wrapped_messages_are_unchanged() {
        let inner = FetchError::status("https://tiles.test/1/2/3.png", 503);
        let expected = inner.to_string();
        assert_eq!(PipelineError::from(inner).to_string(), expected);
    }
}
