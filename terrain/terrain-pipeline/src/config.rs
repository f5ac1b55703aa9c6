//! Generation settings.

use serde::{Deserialize, Serialize};
use terrain_fetch::FetchConfig;
use terrain_grid::GridParams;
use terrain_io::DEFAULT_HEADER;
use terrain_mesh::MeshParams;

use crate::error::PipelineResult;
use crate::ladder::TierTable;

/// Largest tile canvas edge, in pixels, an attempt may stitch.
pub const DEFAULT_MAX_RASTER_PX: usize = 4096;

/// Everything a [`Pipeline`](crate::Pipeline) needs besides the request.
///
/// Every field has a default, so a configuration file only lists what it
/// changes:
///
/// ```
/// use terrain_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::from_json(r#"{
///     "max_raster_px": 1024,
///     "grid": { "median_passes": 0 },
///     "tiers": { "low": { "zoom": 9, "maxSegments": 64, "minZoom": 4 } }
/// }"#).unwrap();
///
/// assert_eq!(config.max_raster_px, 1024);
/// assert_eq!(config.grid.median_passes, 0);
/// assert_eq!(config.grid.proxy_median_passes, 2);
/// assert_eq!(config.tiers.low.zoom, 9);
/// assert_eq!(config.tiers.ultra.zoom, 13);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source endpoints and fetch limits.
    pub fetch: FetchConfig,
    /// Denoising.
    pub grid: GridParams,
    /// Height mapping.
    pub mesh: MeshParams,
    /// Resolution tiers.
    pub tiers: TierTable,
    /// Largest stitched canvas edge before an attempt lowers its zoom.
    pub max_raster_px: usize,
    /// STL header text.
    pub stl_header: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            grid: GridParams::default(),
            mesh: MeshParams::default(),
            tiers: TierTable::default(),
            max_raster_px: DEFAULT_MAX_RASTER_PX,
            stl_header: DEFAULT_HEADER.to_owned(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`](crate::PipelineError::Config) if the
    /// document is malformed.
    pub fn from_json(text: &str) -> PipelineResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the fetch settings.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Set the denoising parameters.
    #[must_use]
    pub fn with_grid(mut self, grid: GridParams) -> Self {
        self.grid = grid;
        self
    }

    /// Set the height mapping parameters.
    #[must_use]
    pub fn with_mesh(mut self, mesh: MeshParams) -> Self {
        self.mesh = mesh;
        self
    }

    /// Set the tier table.
    #[must_use]
    pub fn with_tiers(mut self, tiers: TierTable) -> Self {
        self.tiers = tiers;
        self
    }

    /// Set the stitched canvas limit.
    #[must_use]
    pub fn with_max_raster_px(mut self, px: usize) -> Self {
        self.max_raster_px = px;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(PipelineConfig::from_json("{}").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn malformed_document_is_rejected() {
        assert!(matches!(
            PipelineConfig::from_json(r#"{ "max_raster_px": "lots" }"#),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn defaults_survive_serialization() {
        let config = PipelineConfig::default().with_max_raster_px(512);
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(PipelineConfig::from_json(&text).unwrap(), config);
    }
}
