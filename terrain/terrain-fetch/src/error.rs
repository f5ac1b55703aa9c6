//! Error types for elevation acquisition.

use thiserror::Error;

use crate::source::SourceKind;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors raised while acquiring elevation data.
///
/// Per-sample gaps are never errors; they surface as missing raster
/// samples. Everything here is a source-level failure that moves the
/// [`SourceChain`](crate::SourceChain) on to its next strategy.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, including timeouts.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// An image payload could not be decoded.
    #[error("image decoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// A raster window payload could not be decoded.
    #[error("raster decoding failed: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// A catalog response could not be parsed.
    #[error("catalog response is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// The raster window uses a sample type we cannot read.
    #[error("unsupported raster sample format: {0}")]
    UnsupportedSampleFormat(String),

    /// A windowed read returned a payload whose size disagrees with its header.
    #[error("raster window is {width}x{height} but carries {samples} samples")]
    WindowSizeMismatch {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Number of decoded samples.
        samples: usize,
    },

    /// The region is outside the source's coverage envelope.
    #[error("region {region} is outside the coverage of {kind}")]
    OutsideCoverage {
        /// Human-readable region.
        region: String,
        /// Source that declined.
        kind: SourceKind,
    },

    /// The catalog search returned no assets for the region.
    #[error("catalog search returned no assets")]
    NoAssets,

    /// Every read succeeded or was skipped, but no pixel received a sample.
    #[error("{kind} produced no elevation samples")]
    NoSamples {
        /// Source that came back empty.
        kind: SourceKind,
    },

    /// Every tile of a tiled fetch failed.
    #[error("all {attempted} tiles failed; last error: {last}")]
    AllTilesFailed {
        /// Number of tiles requested.
        attempted: usize,
        /// Message of the last failure.
        last: String,
    },

    /// A source chain was asked to fetch without any strategies.
    #[error("no elevation source is configured for this body")]
    NoSources,
}

impl FetchError {
    /// Create a status error for `url`.
    #[must_use]
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Whether the remote service could not be reached or refused the request.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}
