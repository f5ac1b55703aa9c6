//! Generation output.

use serde::Serialize;
use terrain_fetch::SourceKind;

use crate::ladder::Attempt;

/// What happened during a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// The successful attempt is coarser than the requested tier.
    pub fallback_triggered: bool,
    /// Strategy that supplied the elevation.
    pub elevation_source: SourceKind,
    /// Whether that strategy is a measured, high-resolution product.
    pub used_high_fidelity_source: bool,
    /// First rung of the ladder.
    pub requested: Attempt,
    /// The attempt that succeeded, with the zoom actually used.
    pub attempt: Attempt,
    /// Grid columns.
    pub grid_width: usize,
    /// Grid rows.
    pub grid_height: usize,
    /// Median passes applied.
    pub median_passes: u32,
    /// Elevation range the heights were mapped from, meters.
    pub elevation_range: (f64, f64),
    /// The region had no samples and a flat block was produced.
    pub synthetic_range: bool,
    /// Triangles in the solid.
    pub triangle_count: usize,
    /// Edge check of the solid passed.
    pub watertight: bool,
}

/// STL bytes plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    /// Complete binary STL.
    pub stl: Vec<u8>,
    /// How the STL was produced.
    pub diagnostics: Diagnostics,
}

impl GenerationResult {
    /// Whether a coarser attempt than requested produced the STL.
    #[must_use]
    pub const fn fallback_triggered(&self) -> bool {
        self.diagnostics.fallback_triggered
    }

    /// Strategy that supplied the elevation.
    #[must_use]
    pub const fn elevation_source(&self) -> SourceKind {
        self.diagnostics.elevation_source
    }

    /// Whether the elevation came from a high-fidelity strategy.
    #[must_use]
    pub const fn used_high_fidelity_source(&self) -> bool {
        self.diagnostics.used_high_fidelity_source
    }
}
