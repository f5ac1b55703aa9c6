//! Elevation grid construction for the terrain pipeline.
//!
//! Converts a source [`Raster`](terrain_types::Raster) into an
//! [`ElevationGrid`](terrain_types::ElevationGrid) at mesh resolution:
//!
//! 1. Choose grid dimensions from the raster width, a column budget and the
//!    region's aspect ratio ([`GridLayout::dimensions`])
//! 2. Nearest-neighbour resample
//! 3. Mask cells outside the footprint ([`in_shape`])
//! 4. 3×3 median denoise over valid cells ([`median_filter`])
//! 5. Measure the exact elevation range, substituting a flat block when
//!    nothing is left
//!
//! # Example
//!
//! ```
//! use terrain_grid::{build_grid, GridLayout, GridParams};
//! use terrain_types::{Raster, Shape};
//!
//! let raster = Raster::from_fn(100, 100, |x, y| Some((x + y) as f64));
//! let layout = GridLayout { max_segments: 50, aspect_ratio: 1.0, shape: Shape::Oval };
//! let built = build_grid(&raster, &layout, &GridParams::default(), false);
//!
//! assert!(!built.synthetic_range);
//! assert!(built.grid.valid_count() < 50 * 50);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod build;
mod mask;
mod median;
mod params;

pub use build::{build_grid, BuiltGrid, GridLayout};
pub use mask::in_shape;
pub use median::{median_filter, median_pass};
pub use params::{
    GridParams, DEFAULT_MEDIAN_PASSES, MAX_ROW_FACTOR, MIN_OVAL_SEGMENTS, PROXY_MEDIAN_PASSES,
    SYNTHETIC_RANGE,
};
