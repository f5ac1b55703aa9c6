//! Watertight solids from elevation grids.
//!
//! Turns an [`ElevationGrid`](terrain_types::ElevationGrid) into a closed,
//! 2-manifold [`SolidMesh`](terrain_types::SolidMesh): a relief surface on
//! top, a flat bottom, and side walls along every boundary, including the
//! boundaries of holes and of oval footprints.
//!
//! # Height Modes
//!
//! - **Terrain**: relief above a base slab, physically scaled on Earth and
//!   normalised elsewhere
//! - **Lithophane**: thickness proportional to normalised elevation
//!
//! See [`HeightMapping`].
//!
//! # Validation
//!
//! [`validate_solid`] counts edge uses to confirm that a solid is closed,
//! manifold and wound outward.
//!
//! # Example
//!
//! ```
//! use terrain_mesh::{build_request_solid, validate_solid, MeshParams};
//! use terrain_types::{ElevationGrid, Region, RenderRequest};
//!
//! let region = Region::new(40.5, 40.3, -111.5, -111.7).unwrap();
//! let request = RenderRequest::builder(region).build().unwrap();
//! let grid = ElevationGrid::from_fn(8, 8, |x, y| Some(1500.0 + (x * y) as f64));
//!
//! let (solid, _) = build_request_solid(&grid, (1500.0, 1549.0), &request, &MeshParams::default())
//!     .unwrap();
//! assert!(validate_solid(&solid).is_printable());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod build;
mod error;
mod height;
mod params;
mod quads;
mod validate;

pub use build::{build_request_solid, build_solid, BuildStats};
pub use error::{MeshError, MeshResult};
pub use height::{vertical_scale, HeightMapping};
pub use params::{
    MeshParams, LITHOPHANE_MAX_THICKNESS, LITHOPHANE_MIN_THICKNESS, MIN_RELIEF_RANGE_M,
    RELIEF_FRACTION,
};
pub use quads::{QuadMask, Side};
pub use validate::{validate_solid, EdgeMap, SolidReport};
