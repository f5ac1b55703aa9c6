//! Remote collaborator seams.
//!
//! Each trait is the narrowest contract a source needs from the outside
//! world. The HTTP implementations live in [`crate::http`]; tests swap in
//! in-memory implementations.

use terrain_types::{Raster, Region};

use crate::error::FetchResult;
use crate::tiles::TileCoord;

/// Fetches encoded tile images.
pub trait TileService: Send + Sync {
    /// Encoded image bytes for `tile`, or `None` when the service has no
    /// tile there (HTTP 404).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any other non-success status.
    fn fetch_tile(&self, tile: &TileCoord) -> FetchResult<Option<Vec<u8>>>;
}

/// Renders a region as a single image at a requested size.
pub trait ImageExportService: Send + Sync {
    /// Encoded image bytes covering `region` at `width × height`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    fn export(&self, region: &Region, width: usize, height: usize) -> FetchResult<Vec<u8>>;
}

/// Reference to one raster asset in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Catalog identifier, if the catalog provides one.
    pub id: Option<String>,
    /// Location of the raster.
    pub href: String,
}

impl AssetRef {
    /// An asset with no catalog identifier.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            id: None,
            href: href.into(),
        }
    }
}

/// Finds raster assets intersecting a region.
pub trait CatalogSearch: Send + Sync {
    /// Assets intersecting `region`, possibly empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the search request fails.
    fn search(&self, region: &Region) -> FetchResult<Vec<AssetRef>>;
}

/// A region projected into body-centred equirectangular meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedWindow {
    /// Western edge in meters.
    pub min_x: f64,
    /// Southern edge in meters.
    pub min_y: f64,
    /// Eastern edge in meters.
    pub max_x: f64,
    /// Northern edge in meters.
    pub max_y: f64,
}

impl ProjectedWindow {
    /// Project `region` on a sphere of `radius_m`.
    #[must_use]
    pub fn from_region(region: &Region, radius_m: f64) -> Self {
        let k = radius_m.to_radians();
        Self {
            min_x: region.west() * k,
            min_y: region.south() * k,
            max_x: region.east() * k,
            max_y: region.north() * k,
        }
    }
}

/// A decoded window of raw raster samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Row-major samples, row 0 at the north.
    pub values: Vec<f64>,
    /// Sentinel marking missing samples.
    pub no_data: Option<f64>,
}

impl SampleWindow {
    /// Convert to a [`Raster`], dropping no-data and non-finite samples.
    ///
    /// Returns `None` if `values` does not hold `width × height` samples.
    #[must_use]
    pub fn into_raster(self) -> Option<Raster> {
        let no_data = self.no_data;
        let samples = self
            .values
            .into_iter()
            .map(|v| {
                let missing = no_data.is_some_and(|nd| v == nd || (nd.is_nan() && v.is_nan()));
                (!missing).then_some(v)
            })
            .collect();
        Raster::from_samples(self.width, self.height, samples)
    }
}

/// Reads a window from a raster asset.
pub trait WindowReader: Send + Sync {
    /// Samples of `asset` inside `window`, resampled to `width × height`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or decode fails.
    fn read_window(
        &self,
        asset: &AssetRef,
        window: &ProjectedWindow,
        width: usize,
        height: usize,
    ) -> FetchResult<SampleWindow>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn projection_scales_by_radius() {
        let region = Region::new(1.0, -1.0, 2.0, -2.0).unwrap();
        let w = ProjectedWindow::from_region(&region, 1_737_400.0);
        let per_degree = 1_737_400.0 * std::f64::consts::PI / 180.0;
        assert_relative_eq!(w.max_x, 2.0 * per_degree, max_relative = 1e-12);
        assert_relative_eq!(w.min_y, -per_degree, max_relative = 1e-12);
    }

    #[test]
    fn no_data_becomes_missing() {
        let window = SampleWindow {
            width: 2,
            height: 2,
            values: vec![1.0, -32768.0, f64::NAN, 4.0],
            no_data: Some(-32768.0),
        };
        let raster = window.into_raster().unwrap();
        assert_eq!(raster.get(0, 0), Some(1.0));
        assert_eq!(raster.get(1, 0), None);
        assert_eq!(raster.get(0, 1), None);
        assert_eq!(raster.valid_count(), 2);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let window = SampleWindow {
            width: 3,
            height: 1,
            values: vec![0.0; 2],
            no_data: None,
        };
        assert!(window.into_raster().is_none());
    }
}
