//! Elevation acquisition for the terrain pipeline.
//!
//! Turns a [`Region`](terrain_types::Region) on a given body into a raster
//! of elevation samples in meters, trying several strategies in order:
//!
//! - [`TiledSource`] - Terrarium tiles or grayscale basemap tiles
//! - [`RegionalExportSource`] - a high-resolution export with a coverage envelope
//! - [`CatalogSource`] - catalog search plus averaged windowed reads
//! - [`GlobalRasterSource`] - one global raster read through a window
//!
//! [`SourceChain::for_body`] assembles the standard order for each body.
//!
//! # Collaborators
//!
//! Remote access goes through four small traits ([`TileService`],
//! [`ImageExportService`], [`CatalogSearch`], [`WindowReader`]). The
//! [`http`] module implements them over blocking `reqwest`; tests supply
//! in-memory versions.
//!
//! # Gaps
//!
//! Missing pixels are `None` samples, never errors. A strategy only fails
//! when it cannot produce a raster at all.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod chain;
mod config;
mod decode;
mod error;
pub mod http;
mod service;
mod source;
mod tiles;

pub use chain::{scheme_for, SourceChain};
pub use config::{BasemapConfig, EarthConfig, FetchConfig, MoonConfig, Services};
pub use decode::{
    decode_terrarium, encode_terrarium, PixelEncoding, StretchCalibration,
    GRAYSCALE_METERS_PER_LEVEL, TERRARIUM_OFFSET,
};
pub use error::{FetchError, FetchResult};
pub use service::{
    AssetRef, CatalogSearch, ImageExportService, ProjectedWindow, SampleWindow, TileService,
    WindowReader,
};
pub use source::{
    capped_dimensions, CatalogSource, ElevationSource, GlobalRasterSource, RegionalExportSource,
    SourceKind, SourceRaster, SourceRequest, TiledSource,
};
pub use tiles::{
    fit_zoom, PixelWindow, TileCoord, TileRange, TileScheme, DEFAULT_TILE_SIZE,
    MERCATOR_MAX_LATITUDE,
};
