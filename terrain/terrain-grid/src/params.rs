//! Grid building parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Median passes applied to measured elevation.
pub const DEFAULT_MEDIAN_PASSES: u32 = 1;

/// Median passes applied to imagery-proxy elevation.
pub const PROXY_MEDIAN_PASSES: u32 = 2;

/// Range substituted when a grid has no valid cells, in meters.
pub const SYNTHETIC_RANGE: (f64, f64) = (0.0, 100.0);

/// Upper bound on rows, as a multiple of the column budget.
///
/// Keeps pathologically narrow regions from allocating unbounded grids.
pub const MAX_ROW_FACTOR: usize = 4;

/// Fewest rows and columns an oval grid gets.
///
/// The inscribed ellipse of a grid with 3 rows or columns leaves no cell
/// quad with all four corners inside.
pub const MIN_OVAL_SEGMENTS: usize = 4;

/// Denoising parameters.
///
/// # Example
///
/// ```
/// use terrain_grid::GridParams;
///
/// let params = GridParams::default().with_median_passes(3);
/// assert_eq!(params.passes_for(false), 3);
/// assert_eq!(params.passes_for(true), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridParams {
    /// 3×3 median passes for measured elevation.
    pub median_passes: u32,
    /// 3×3 median passes for imagery-proxy elevation.
    pub proxy_median_passes: u32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            median_passes: DEFAULT_MEDIAN_PASSES,
            proxy_median_passes: PROXY_MEDIAN_PASSES,
        }
    }
}

impl GridParams {
    /// No denoising at all.
    #[must_use]
    pub const fn raw() -> Self {
        Self {
            median_passes: 0,
            proxy_median_passes: 0,
        }
    }

    /// Set passes for measured elevation.
    #[must_use]
    pub const fn with_median_passes(mut self, passes: u32) -> Self {
        self.median_passes = passes;
        self
    }

    /// Set passes for imagery-proxy elevation.
    #[must_use]
    pub const fn with_proxy_median_passes(mut self, passes: u32) -> Self {
        self.proxy_median_passes = passes;
        self
    }

    /// Passes to run for a raster of the given fidelity.
    #[must_use]
    pub const fn passes_for(&self, low_fidelity_proxy: bool) -> u32 {
        if low_fidelity_proxy {
            self.proxy_median_passes
        } else {
            self.median_passes
        }
    }
}
