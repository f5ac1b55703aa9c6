//! Tile addressing for slippy-map style tile pyramids.
//!
//! Two schemes are supported:
//!
//! - [`TileScheme::WebMercator`]: `2^z × 2^z` tiles, spherical Mercator rows
//! - [`TileScheme::Equirectangular`]: `2^(z+1) × 2^z` tiles, rows linear in latitude
//!
//! A [`TileRange`] is the set of tiles covering a region at one zoom, plus
//! the pixel window of the region inside the stitched canvas.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use terrain_types::Region;

/// Edge length of a tile in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Latitude limit of the spherical Mercator projection.
pub const MERCATOR_MAX_LATITUDE: f64 = 85.051_128_78;

/// Layout of a tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileScheme {
    /// Square Web Mercator pyramid.
    #[default]
    WebMercator,
    /// Plate carrée pyramid, twice as wide as tall.
    Equirectangular,
}

impl TileScheme {
    /// Tile columns at `zoom`.
    #[must_use]
    pub const fn columns(self, zoom: u8) -> u32 {
        match self {
            Self::WebMercator => 1 << zoom,
            Self::Equirectangular => 1 << (zoom + 1),
        }
    }

    /// Tile rows at `zoom`.
    #[must_use]
    pub const fn rows(self, zoom: u8) -> u32 {
        1 << zoom
    }

    /// Fractional tile column of a longitude.
    #[must_use]
    pub fn tile_x(self, lon: f64, zoom: u8) -> f64 {
        (lon + 180.0) / 360.0 * f64::from(self.columns(zoom))
    }

    /// Fractional tile row of a latitude, row 0 at the north.
    #[must_use]
    pub fn tile_y(self, lat: f64, zoom: u8) -> f64 {
        let rows = f64::from(self.rows(zoom));
        match self {
            Self::WebMercator => {
                let phi = lat
                    .clamp(-MERCATOR_MAX_LATITUDE, MERCATOR_MAX_LATITUDE)
                    .to_radians();
                let merc = (phi.tan() + 1.0 / phi.cos()).ln();
                (1.0 - merc / PI) / 2.0 * rows
            }
            Self::Equirectangular => (90.0 - lat) / 180.0 * rows,
        }
    }
}

/// One tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level.
    pub z: u8,
    /// Column.
    pub x: u32,
    /// Row, 0 at the north.
    pub y: u32,
}

impl TileCoord {
    /// Substitute `{z}`, `{x}` and `{y}` in a URL template.
    ///
    /// # Example
    ///
    /// ```
    /// use terrain_fetch::TileCoord;
    ///
    /// let tile = TileCoord { z: 3, x: 1, y: 2 };
    /// assert_eq!(tile.fill("https://t/{z}/{x}/{y}.png"), "https://t/3/1/2.png");
    /// ```
    #[must_use]
    pub fn fill(&self, template: &str) -> String {
        template
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Pixel window inside a stitched canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Width in pixels, at least 1.
    pub width: usize,
    /// Height in pixels, at least 1.
    pub height: usize,
}

/// The tiles covering a region at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    /// Zoom level.
    pub zoom: u8,
    /// First column.
    pub x_min: u32,
    /// Last column, inclusive.
    pub x_max: u32,
    /// First row.
    pub y_min: u32,
    /// Last row, inclusive.
    pub y_max: u32,
    /// Tile edge in pixels.
    pub tile_size: u32,
    /// The region's window inside the stitched canvas.
    pub window: PixelWindow,
}

impl TileRange {
    /// Tiles of `scheme` covering `region` at `zoom`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    // Truncation: tile indices are floored and clamped to the pyramid extent
    #[must_use]
    pub fn covering(region: &Region, zoom: u8, scheme: TileScheme, tile_size: u32) -> Self {
        let cols = scheme.columns(zoom);
        let rows = scheme.rows(zoom);

        let fx_w = scheme.tile_x(region.west(), zoom);
        let fx_e = scheme.tile_x(region.east(), zoom);
        let fy_n = scheme.tile_y(region.north(), zoom);
        let fy_s = scheme.tile_y(region.south(), zoom);

        let x_min = (fx_w.floor().max(0.0) as u32).min(cols - 1);
        let x_max = ((fx_e.ceil() - 1.0).max(0.0) as u32).clamp(x_min, cols - 1);
        let y_min = (fy_n.floor().max(0.0) as u32).min(rows - 1);
        let y_max = ((fy_s.ceil() - 1.0).max(0.0) as u32).clamp(y_min, rows - 1);

        let ts = f64::from(tile_size);
        let canvas_w = (x_max - x_min + 1) as usize * tile_size as usize;
        let canvas_h = (y_max - y_min + 1) as usize * tile_size as usize;

        let px0 = (((fx_w - f64::from(x_min)) * ts).round().max(0.0) as usize).min(canvas_w - 1);
        let px1 = (((fx_e - f64::from(x_min)) * ts).round().max(0.0) as usize).min(canvas_w);
        let py0 = (((fy_n - f64::from(y_min)) * ts).round().max(0.0) as usize).min(canvas_h - 1);
        let py1 = (((fy_s - f64::from(y_min)) * ts).round().max(0.0) as usize).min(canvas_h);

        Self {
            zoom,
            x_min,
            x_max,
            y_min,
            y_max,
            tile_size,
            window: PixelWindow {
                x: px0,
                y: py0,
                width: px1.saturating_sub(px0).max(1),
                height: py1.saturating_sub(py0).max(1),
            },
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn tiles_x(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn tiles_y(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Total number of tiles.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tiles_x() as usize * self.tiles_y() as usize
    }

    /// Always false; a range covers at least one tile.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Stitched canvas width in pixels.
    #[must_use]
    pub const fn canvas_width(&self) -> usize {
        self.tiles_x() as usize * self.tile_size as usize
    }

    /// Stitched canvas height in pixels.
    #[must_use]
    pub const fn canvas_height(&self) -> usize {
        self.tiles_y() as usize * self.tile_size as usize
    }

    /// All tiles, row-major from the north-west.
    #[must_use]
    pub fn tiles(&self) -> Vec<TileCoord> {
        (self.y_min..=self.y_max)
            .flat_map(|y| (self.x_min..=self.x_max).map(move |x| TileCoord { z: self.zoom, x, y }))
            .collect()
    }

    /// Canvas offset of `tile`'s top-left pixel.
    #[must_use]
    pub const fn offset_of(&self, tile: &TileCoord) -> (usize, usize) {
        (
            (tile.x - self.x_min) as usize * self.tile_size as usize,
            (tile.y - self.y_min) as usize * self.tile_size as usize,
        )
    }
}

/// Largest zoom in `min_zoom..=zoom` whose region window fits in
/// `max_px` pixels along both axes.
///
/// Falls back to `min_zoom` when even that exceeds the budget.
#[must_use]
pub fn fit_zoom(
    region: &Region,
    zoom: u8,
    min_zoom: u8,
    scheme: TileScheme,
    tile_size: u32,
    max_px: usize,
) -> u8 {
    let floor = min_zoom.min(zoom);
    (floor..=zoom)
        .rev()
        .find(|&z| {
            let window = TileRange::covering(region, z, scheme, tile_size).window;
            window.width <= max_px && window.height <= max_px
        })
        .unwrap_or(floor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wasatch() -> Region {
        Region::new(40.5, 40.3, -111.5, -111.7).unwrap()
    }

    #[test]
    fn mercator_origin_is_center() {
        let s = TileScheme::WebMercator;
        assert_relative_eq!(s.tile_x(0.0, 1), 1.0);
        assert_relative_eq!(s.tile_y(0.0, 1), 1.0, epsilon = 1e-12);
        assert_relative_eq!(s.tile_y(90.0, 0), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn equirectangular_is_twice_as_wide() {
        let s = TileScheme::Equirectangular;
        assert_eq!(s.columns(3), 16);
        assert_eq!(s.rows(3), 8);
        assert_relative_eq!(s.tile_y(0.0, 3), 4.0);
        assert_relative_eq!(s.tile_x(-180.0, 3), 0.0);
    }

    #[test]
    fn covering_range_contains_region() {
        let region = wasatch();
        let range = TileRange::covering(&region, 12, TileScheme::WebMercator, 256);

        let s = TileScheme::WebMercator;
        assert!(f64::from(range.x_min) <= s.tile_x(region.west(), 12));
        assert!(f64::from(range.x_max + 1) >= s.tile_x(region.east(), 12));
        assert!(f64::from(range.y_min) <= s.tile_y(region.north(), 12));
        assert!(f64::from(range.y_max + 1) >= s.tile_y(region.south(), 12));

        let w = range.window;
        assert!(w.x + w.width <= range.canvas_width());
        assert!(w.y + w.height <= range.canvas_height());
        assert_eq!(range.tiles().len(), range.len());
    }

    #[test]
    fn window_grows_with_zoom() {
        let region = wasatch();
        let lo = TileRange::covering(&region, 10, TileScheme::WebMercator, 256).window;
        let hi = TileRange::covering(&region, 11, TileScheme::WebMercator, 256).window;
        assert!(hi.width >= 2 * lo.width - 2);
    }

    #[test]
    fn fit_zoom_respects_budget() {
        let region = wasatch();
        let z = fit_zoom(&region, 14, 5, TileScheme::WebMercator, 256, 1024);
        let w = TileRange::covering(&region, z, TileScheme::WebMercator, 256).window;
        assert!(w.width <= 1024 && w.height <= 1024);
        assert!(z < 14);

        let z_next = z + 1;
        let w_next = TileRange::covering(&region, z_next, TileScheme::WebMercator, 256).window;
        assert!(w_next.width > 1024 || w_next.height > 1024);
    }

    #[test]
    fn fit_zoom_never_goes_below_floor() {
        let region = Region::new(80.0, -80.0, 179.0, -179.0).unwrap();
        assert_eq!(fit_zoom(&region, 12, 4, TileScheme::WebMercator, 256, 16), 4);
    }

    #[test]
    fn offsets_are_tile_aligned() {
        let range = TileRange::covering(&wasatch(), 12, TileScheme::WebMercator, 256);
        let last = *range.tiles().last().unwrap();
        let (ox, oy) = range.offset_of(&last);
        assert_eq!(ox, (range.tiles_x() as usize - 1) * 256);
        assert_eq!(oy, (range.tiles_y() as usize - 1) * 256);
    }
}
