//! Raster to mesh-grid conversion.

use terrain_types::{ElevationGrid, Raster, Shape};
use tracing::{debug, warn};

use crate::mask::in_shape;
use crate::median::median_filter;
use crate::params::{GridParams, MAX_ROW_FACTOR, MIN_OVAL_SEGMENTS, SYNTHETIC_RANGE};

/// Geometry of the grid to build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Column budget; the grid never has more columns than this.
    pub max_segments: usize,
    /// Footprint aspect ratio (width over height) of the region.
    pub aspect_ratio: f64,
    /// Footprint shape.
    pub shape: Shape,
}

impl GridLayout {
    /// Grid dimensions for a raster `raster_width` pixels wide.
    ///
    /// Columns follow the raster width, clamped to `[2, max_segments]`.
    /// Rows follow the aspect ratio, at least 2. Ovals get at least
    /// [`MIN_OVAL_SEGMENTS`] along each axis so the footprint always holds a
    /// complete cell.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn dimensions(&self, raster_width: usize) -> (usize, usize) {
        let floor = match self.shape {
            Shape::Rectangle => 2,
            Shape::Oval => MIN_OVAL_SEGMENTS,
        };
        let budget = self.max_segments.max(floor);
        let columns = raster_width.clamp(floor, budget);
        let aspect = if self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else {
            1.0
        };
        let rows = (columns as f64 / aspect).round();
        let rows = if rows.is_finite() { rows as usize } else { floor };
        (columns, rows.clamp(floor, budget * MAX_ROW_FACTOR))
    }
}

/// A denoised grid plus the elevation range the mesh should use.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltGrid {
    /// Elevation cells.
    pub grid: ElevationGrid,
    /// Exact `(min, max)` over valid cells after filtering.
    pub range: (f64, f64),
    /// Whether the grid had no data and was flattened to [`SYNTHETIC_RANGE`].
    pub synthetic_range: bool,
    /// Median passes that were applied.
    pub median_passes: u32,
}

/// Resample, mask and denoise `raster` into a mesh grid.
///
/// Never fails. A raster with no usable samples yields a flat grid: every
/// in-shape cell is set to `SYNTHETIC_RANGE.0` and the range is
/// [`SYNTHETIC_RANGE`].
///
/// # Example
///
/// ```
/// use terrain_grid::{build_grid, GridLayout, GridParams};
/// use terrain_types::{Raster, Shape};
///
/// let raster = Raster::from_fn(40, 20, |x, _| Some(x as f64));
/// let layout = GridLayout { max_segments: 16, aspect_ratio: 2.0, shape: Shape::Rectangle };
/// let built = build_grid(&raster, &layout, &GridParams::raw(), false);
///
/// assert_eq!((built.grid.width(), built.grid.height()), (16, 8));
/// assert_eq!(built.range, (0.0, 39.0));
/// ```
#[must_use]
pub fn build_grid(
    raster: &Raster,
    layout: &GridLayout,
    params: &GridParams,
    low_fidelity_proxy: bool,
) -> BuiltGrid {
    let (sx, sy) = layout.dimensions(raster.width());
    debug!(
        "Building {}x{} grid from {}x{} raster ({})",
        sx,
        sy,
        raster.width(),
        raster.height(),
        layout.shape
    );

    let resampled = raster.resample_nearest(sx, sy);
    let sampled = ElevationGrid::from_fn(sx, sy, |x, y| {
        if in_shape(layout.shape, x, y, sx, sy) {
            resampled.get(x, y)
        } else {
            None
        }
    });

    let passes = params.passes_for(low_fidelity_proxy);
    let mut grid = median_filter(&sampled, passes);

    match grid.elevation_range() {
        Some(range) => {
            debug!(
                "Grid has {} valid cells, range {:.1}..{:.1} m",
                grid.valid_count(),
                range.0,
                range.1
            );
            BuiltGrid {
                grid,
                range,
                synthetic_range: false,
                median_passes: passes,
            }
        }
        None => {
            warn!("No elevation samples in region; substituting a flat block");
            for y in 0..sy {
                for x in 0..sx {
                    if in_shape(layout.shape, x, y, sx, sy) {
                        grid.set(x, y, Some(SYNTHETIC_RANGE.0));
                    }
                }
            }
            BuiltGrid {
                grid,
                range: SYNTHETIC_RANGE,
                synthetic_range: true,
                median_passes: passes,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(max_segments: usize, aspect_ratio: f64, shape: Shape) -> GridLayout {
        GridLayout {
            max_segments,
            aspect_ratio,
            shape,
        }
    }

    #[test]
    fn dimensions_follow_raster_then_aspect() {
        let l = layout(128, 1.5, Shape::Rectangle);
        assert_eq!(l.dimensions(1000), (128, 85));
        assert_eq!(l.dimensions(60), (60, 40));
        assert_eq!(l.dimensions(0), (2, 2));
    }

    #[test]
    fn degenerate_budget_and_aspect() {
        assert_eq!(layout(0, 1.0, Shape::Rectangle).dimensions(10), (2, 2));
        assert_eq!(layout(8, f64::NAN, Shape::Rectangle).dimensions(10), (8, 8));
        assert_eq!(layout(8, 1e-9, Shape::Rectangle).dimensions(10), (8, 32));
    }

    #[test]
    fn thin_ovals_keep_a_complete_cell() {
        let wide = layout(128, 200.0, Shape::Oval);
        assert_eq!(wide.dimensions(1000), (128, MIN_OVAL_SEGMENTS));
        let tall = layout(128, 0.01, Shape::Oval);
        assert_eq!(tall.dimensions(1), (MIN_OVAL_SEGMENTS, 400));
        assert_eq!(layout(128, 200.0, Shape::Rectangle).dimensions(1000), (128, 2));

        for l in [wide, tall] {
            let built = build_grid(&Raster::empty(50, 3), &l, &GridParams::default(), false);
            assert!(built.synthetic_range);
            let (w, h) = (built.grid.width(), built.grid.height());
            let complete = (0..h - 1).any(|y| {
                (0..w - 1).any(|x| {
                    built.grid.is_valid(x, y)
                        && built.grid.is_valid(x + 1, y)
                        && built.grid.is_valid(x, y + 1)
                        && built.grid.is_valid(x + 1, y + 1)
                })
            });
            assert!(complete, "{w}x{h} oval has no complete cell");
        }
    }

    #[test]
    fn oval_excludes_corners() {
        let raster = Raster::from_fn(64, 64, |_, _| Some(5.0));
        let rect = build_grid(&raster, &layout(32, 1.0, Shape::Rectangle), &GridParams::default(), false);
        let oval = build_grid(&raster, &layout(32, 1.0, Shape::Oval), &GridParams::default(), false);
        assert_eq!(rect.grid.valid_count(), 32 * 32);
        assert!(oval.grid.valid_count() < rect.grid.valid_count());
        assert!(!oval.grid.is_valid(0, 0));
        assert!(oval.grid.is_valid(16, 16));
    }

    #[test]
    fn all_missing_becomes_flat_block() {
        let raster = Raster::empty(20, 20);
        let built = build_grid(&raster, &layout(10, 1.0, Shape::Oval), &GridParams::default(), false);
        assert!(built.synthetic_range);
        assert_eq!(built.range, SYNTHETIC_RANGE);
        assert!(built.grid.valid_count() > 0);
        assert!(built.grid.iter_valid().all(|(_, _, v)| v == 0.0));
        assert!(!built.grid.is_valid(0, 0));
    }

    #[test]
    fn range_is_measured_after_filtering() {
        let raster = Raster::from_fn(9, 9, |x, y| Some(if (x, y) == (4, 4) { 5000.0 } else { 100.0 }));
        let l = layout(9, 1.0, Shape::Rectangle);

        let raw = build_grid(&raster, &l, &GridParams::raw(), false);
        assert_eq!(raw.range, (100.0, 5000.0));

        let filtered = build_grid(&raster, &l, &GridParams::default(), false);
        assert_eq!(filtered.range, (100.0, 100.0));
        assert_eq!(filtered.median_passes, 1);
    }

    #[test]
    fn proxies_get_extra_passes() {
        let raster = Raster::from_fn(4, 4, |_, _| Some(1.0));
        let built = build_grid(&raster, &layout(4, 1.0, Shape::Rectangle), &GridParams::default(), true);
        assert_eq!(built.median_passes, 2);
    }
}
