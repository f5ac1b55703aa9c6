//! Solid construction parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Share of the model width used for relief on bodies without a physical scale.
pub const RELIEF_FRACTION: f64 = 0.15;

/// Smallest elevation range, in meters, that relief is normalised against.
pub const MIN_RELIEF_RANGE_M: f64 = 1.0;

/// Lithophane thickness at the dark end, in model units.
pub const LITHOPHANE_MIN_THICKNESS: f64 = 0.8;

/// Lithophane thickness at the bright end, in model units.
pub const LITHOPHANE_MAX_THICKNESS: f64 = 4.0;

/// Parameters for turning elevation into model heights.
///
/// # Example
///
/// ```
/// use terrain_mesh::MeshParams;
///
/// let params = MeshParams::default().with_thickness(1.0, 3.0);
/// assert_eq!(params.lithophane_min_thickness, 1.0);
/// assert_eq!(params.relief_fraction, 0.15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeshParams {
    /// Relief height as a share of model width (non-Earth bodies).
    pub relief_fraction: f64,
    /// Lower bound of the range relief is normalised against, meters.
    pub min_relief_range_m: f64,
    /// Lithophane minimum thickness.
    pub lithophane_min_thickness: f64,
    /// Lithophane maximum thickness.
    pub lithophane_max_thickness: f64,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            relief_fraction: RELIEF_FRACTION,
            min_relief_range_m: MIN_RELIEF_RANGE_M,
            lithophane_min_thickness: LITHOPHANE_MIN_THICKNESS,
            lithophane_max_thickness: LITHOPHANE_MAX_THICKNESS,
        }
    }
}

impl MeshParams {
    /// Set the lithophane thickness band.
    #[must_use]
    pub const fn with_thickness(mut self, min: f64, max: f64) -> Self {
        self.lithophane_min_thickness = min;
        self.lithophane_max_thickness = max;
        self
    }

    /// Set the relief fraction.
    #[must_use]
    pub const fn with_relief_fraction(mut self, fraction: f64) -> Self {
        self.relief_fraction = fraction;
        self
    }
}
