//! Core data model for the terrain-to-solid pipeline.
//!
//! This crate provides the types every stage of the pipeline agrees on:
//!
//! - [`Region`] - A geographic bounding box in degrees
//! - [`RenderRequest`] - A validated, immutable generation request
//! - [`Raster`] - Elevation samples in source pixel space
//! - [`ElevationGrid`] - Elevation samples at mesh resolution
//! - [`SolidMesh`] - A closed triangle solid in model units
//!
//! # Units
//!
//! Elevations are meters. Mesh coordinates are model units (millimeters for
//! printing). All coordinates are `f64`; the serializer narrows to `f32`.
//!
//! # Coordinate System
//!
//! Grids and rasters store row 0 at the north edge and column 0 at the west
//! edge. Meshes are right-handed with Z up and north toward +Y.
//! Face winding is counter-clockwise when viewed from outside.
//!
//! # Example
//!
//! ```
//! use terrain_types::{Body, Region, RenderRequest, Resolution, Shape};
//!
//! let region = Region::new(40.5, 40.3, -111.5, -111.7).unwrap();
//! let request = RenderRequest::builder(region)
//!     .resolution(Resolution::Low)
//!     .shape(Shape::Oval)
//!     .body(Body::Earth)
//!     .build()
//!     .unwrap();
//!
//! assert!(request.region().aspect_ratio() > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod grid;
mod mesh;
mod raster;
mod region;
mod request;

pub use error::{RequestError, RequestResult};
pub use grid::ElevationGrid;
pub use mesh::SolidMesh;
pub use raster::Raster;
pub use region::Region;
pub use request::{
    Body, BoundsSpec, RenderRequest, RenderRequestBuilder, RequestSpec, Resolution, Shape,
    BASE_HEIGHT_RANGE, EXAGGERATION_RANGE, MODEL_WIDTH_RANGE,
};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
