//! Geographic bounding boxes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{RequestError, RequestResult};

/// A geographic bounding box in degrees.
///
/// Invariants, enforced by [`Region::new`]:
/// - all bounds are finite
/// - `north > south`, both within `[-90, 90]`
/// - `east > west`, both within `[-180, 180]`
///
/// # Example
///
/// ```
/// use terrain_types::Region;
///
/// let region = Region::new(40.5, 40.3, -111.5, -111.7).unwrap();
/// assert!((region.center_latitude() - 40.4).abs() < 1e-9);
///
/// assert!(Region::new(40.3, 40.5, -111.5, -111.7).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawRegion", into = "RawRegion"))]
pub struct Region {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl Region {
    /// Create a validated region.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if any invariant is violated.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> RequestResult<Self> {
        for (field, value) in [
            ("north", north),
            ("south", south),
            ("east", east),
            ("west", west),
        ] {
            if !value.is_finite() {
                return Err(RequestError::NonFiniteBound { field, value });
            }
        }
        for (field, value) in [("north", north), ("south", south)] {
            if !(-90.0..=90.0).contains(&value) {
                return Err(RequestError::BoundOutOfRange {
                    field,
                    value,
                    min: -90.0,
                    max: 90.0,
                });
            }
        }
        for (field, value) in [("east", east), ("west", west)] {
            if !(-180.0..=180.0).contains(&value) {
                return Err(RequestError::BoundOutOfRange {
                    field,
                    value,
                    min: -180.0,
                    max: 180.0,
                });
            }
        }
        if north <= south {
            return Err(RequestError::LatitudeOrder { north, south });
        }
        if east <= west {
            return Err(RequestError::LongitudeOrder { east, west });
        }
        Ok(Self {
            north,
            south,
            east,
            west,
        })
    }

    /// Northern bound in degrees.
    #[inline]
    #[must_use]
    pub const fn north(&self) -> f64 {
        self.north
    }

    /// Southern bound in degrees.
    #[inline]
    #[must_use]
    pub const fn south(&self) -> f64 {
        self.south
    }

    /// Eastern bound in degrees.
    #[inline]
    #[must_use]
    pub const fn east(&self) -> f64 {
        self.east
    }

    /// Western bound in degrees.
    #[inline]
    #[must_use]
    pub const fn west(&self) -> f64 {
        self.west
    }

    /// Latitude of the region center in degrees.
    #[must_use]
    pub fn center_latitude(&self) -> f64 {
        (self.north + self.south) / 2.0
    }

    /// Longitude of the region center in degrees.
    #[must_use]
    pub fn center_longitude(&self) -> f64 {
        (self.east + self.west) / 2.0
    }

    /// East-west extent in degrees.
    #[must_use]
    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    /// North-south extent in degrees.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    /// Footprint width over height, corrected for longitude compression.
    ///
    /// A region that is geographically square on the ground yields `1.0`.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        let compression = self.center_latitude().to_radians().cos().max(1e-6);
        self.lon_span() * compression / self.lat_span()
    }

    /// Whether this region lies entirely inside `other`.
    #[must_use]
    pub fn is_within(&self, other: &Self) -> bool {
        self.north <= other.north
            && self.south >= other.south
            && self.east <= other.east
            && self.west >= other.west
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[N {:.5}, S {:.5}, E {:.5}, W {:.5}]",
            self.north, self.south, self.east, self.west
        )
    }
}

/// Unvalidated wire form of a [`Region`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawRegion {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRegion> for Region {
    type Error = RequestError;

    fn try_from(raw: RawRegion) -> Result<Self, Self::Error> {
        Self::new(raw.north, raw.south, raw.east, raw.west)
    }
}

#[cfg(feature = "serde")]
impl From<Region> for RawRegion {
    fn from(region: Region) -> Self {
        Self {
            north: region.north,
            south: region.south,
            east: region.east,
            west: region.west,
        }
    }
}
