//! Region to printable STL.
//!
//! Ties the workspace together: a validated
//! [`RenderRequest`](terrain_types::RenderRequest) is fetched through the
//! body's [`SourceChain`](terrain_fetch::SourceChain), gridded and denoised,
//! turned into a closed solid and encoded as binary STL.
//!
//! # Resolution Ladder
//!
//! Each request walks a list of [`Attempt`]s derived from the [`TierTable`],
//! starting at the requested tier and moving to coarser zooms and smaller
//! segment budgets. An attempt whose tile canvas would exceed
//! [`PipelineConfig::max_raster_px`] lowers its zoom first. The first
//! attempt that yields a solid wins; `fallback_triggered` reports whether
//! it was coarser than requested.
//!
//! # Failure
//!
//! A caller gets either a complete STL with [`Diagnostics`] or one
//! [`PipelineError`]. After the last attempt fails, its error is returned
//! as is.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod config;
mod error;
mod ladder;
mod pipeline;
mod result;

pub use config::{PipelineConfig, DEFAULT_MAX_RASTER_PX};
pub use error::{PipelineError, PipelineResult};
pub use ladder::{Attempt, Tier, TierTable};
pub use pipeline::Pipeline;
pub use result::{Diagnostics, GenerationResult};
