//! The generation loop.

use terrain_fetch::{
    fit_zoom, scheme_for, Services, SourceChain, SourceKind, SourceRequest, TileRange, TileScheme,
};
use terrain_grid::{build_grid, BuiltGrid, GridLayout};
use terrain_io::encode_stl;
use terrain_mesh::{build_request_solid, validate_solid};
use terrain_types::{RenderRequest, RequestSpec, SolidMesh};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::ladder::Attempt;
use crate::result::{Diagnostics, GenerationResult};

/// Output of one successful attempt.
struct AttemptOutput {
    kind: SourceKind,
    high_fidelity: bool,
    built: BuiltGrid,
    mesh: SolidMesh,
}

/// Turns requests into STL.
///
/// Holds configuration and the remote services; no state carries over
/// between requests.
///
/// # Example
///
/// ```no_run
/// use terrain_pipeline::{Pipeline, PipelineConfig};
/// use terrain_types::{BoundsSpec, RequestSpec};
///
/// let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
/// let spec = RequestSpec::new(BoundsSpec { north: 40.5, south: 40.3, east: -111.5, west: -111.7 });
///
/// let result = pipeline.generate_spec(&spec).unwrap();
/// std::fs::write("wasatch.stl", &result.stl).unwrap();
/// println!("source: {}", result.elevation_source());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    services: Services,
}

impl Pipeline {
    /// A pipeline talking to the endpoints in `config` over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let services = Services::http(&config.fetch)?;
        Ok(Self { config, services })
    }

    /// A pipeline over caller-supplied services.
    #[must_use]
    pub const fn with_services(config: PipelineConfig, services: Services) -> Self {
        Self { config, services }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate `spec` and generate it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRequest`] before any fetch if the spec
    /// is invalid, otherwise see [`Pipeline::generate`].
    pub fn generate_spec(&self, spec: &RequestSpec) -> PipelineResult<GenerationResult> {
        let request = spec.validate()?;
        self.generate(&request)
    }

    /// Generate `request` with the standard source chain for its body.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's error once the ladder is exhausted.
    pub fn generate(&self, request: &RenderRequest) -> PipelineResult<GenerationResult> {
        let chain = SourceChain::for_body(request.body(), &self.services, &self.config.fetch);
        self.generate_with(request, &chain)
    }

    /// Generate `request` with an explicit source chain.
    ///
    /// Walks the ladder for the requested tier. Source and geometry failures
    /// move on to the next attempt; any other failure ends the run. When the
    /// chain has a single strategy and its service is unreachable, the run
    /// ends at once since a coarser attempt asks the same service.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::EmptyLadder`] if the tier table yields no attempts
    /// - the last retryable error once every attempt has failed
    /// - [`PipelineError::Io`] if STL encoding fails
    pub fn generate_with(
        &self,
        request: &RenderRequest,
        chain: &SourceChain,
    ) -> PipelineResult<GenerationResult> {
        let attempts = self.config.tiers.attempts(request.resolution());
        let Some(requested) = attempts.first().copied() else {
            return Err(PipelineError::EmptyLadder);
        };
        let scheme = scheme_for(request.body(), &self.config.fetch);
        let tile_size = self.config.fetch.tile_size;

        info!(
            "Generating {} {} at {} ({} attempts)",
            request.body(),
            request.region(),
            request.resolution().as_str(),
            attempts.len()
        );

        let mut tried: Vec<(u8, usize)> = Vec::with_capacity(attempts.len());
        let mut last_error = None;
        for attempt in attempts {
            let zoom = fit_zoom(
                request.region(),
                attempt.zoom,
                attempt.min_zoom,
                scheme,
                tile_size,
                self.config.max_raster_px,
            );
            let effective = Attempt { zoom, ..attempt };
            if tried.contains(&(zoom, effective.max_segments)) {
                debug!(
                    "Skipping zoom {} / {} segments, already tried",
                    zoom, effective.max_segments
                );
                continue;
            }
            tried.push((zoom, effective.max_segments));

            match self.run_attempt(request, chain, &effective, scheme) {
                Ok(output) => return self.finish(output, requested, effective),
                Err(PipelineError::Fetch(err)) if !chain.has_fallback() && err.is_transport() => {
                    warn!("Only elevation source is unreachable, giving up: {}", err);
                    return Err(err.into());
                }
                Err(err) if err.is_retryable() => {
                    warn!(
                        "Attempt {} zoom {} / {} segments failed: {}",
                        effective.tier.as_str(),
                        zoom,
                        effective.max_segments,
                        err
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or(PipelineError::EmptyLadder))
    }

    fn run_attempt(
        &self,
        request: &RenderRequest,
        chain: &SourceChain,
        attempt: &Attempt,
        scheme: TileScheme,
    ) -> PipelineResult<AttemptOutput> {
        let region = *request.region();
        let window = TileRange::covering(&region, attempt.zoom, scheme, self.config.fetch.tile_size)
            .window;
        let layout = GridLayout {
            max_segments: attempt.max_segments,
            aspect_ratio: region.aspect_ratio(),
            shape: request.shape(),
        };
        let (grid_width, grid_height) = layout.dimensions(window.width);
        info!(
            "Attempt {}: zoom {}, {} segments, {}x{} px window, {}x{} grid",
            attempt.tier.as_str(),
            attempt.zoom,
            attempt.max_segments,
            window.width,
            window.height,
            grid_width,
            grid_height
        );

        // Windowed and export strategies read straight at grid resolution.
        let source = chain.fetch(&SourceRequest {
            region,
            body: request.body(),
            zoom: attempt.zoom,
            width: grid_width,
            height: grid_height,
        })?;

        let built = build_grid(
            &source.raster,
            &layout,
            &self.config.grid,
            source.low_fidelity_proxy,
        );
        let (mesh, stats) =
            build_request_solid(&built.grid, built.range, request, &self.config.mesh)?;
        debug!(
            "Solid from {} quads, {} walls, {} pinched",
            stats.quads, stats.walls, stats.pinched_quads
        );

        Ok(AttemptOutput {
            kind: source.kind,
            high_fidelity: source.is_high_fidelity(),
            built,
            mesh,
        })
    }

    fn finish(
        &self,
        output: AttemptOutput,
        requested: Attempt,
        attempt: Attempt,
    ) -> PipelineResult<GenerationResult> {
        let report = validate_solid(&output.mesh);
        if !report.is_printable() {
            warn!("Solid failed edge check:\n{}", report);
        }

        let stl = encode_stl(&output.mesh, &self.config.stl_header)?;
        let diagnostics = Diagnostics {
            fallback_triggered: attempt.is_below(&requested),
            elevation_source: output.kind,
            used_high_fidelity_source: output.high_fidelity,
            requested,
            attempt,
            grid_width: output.built.grid.width(),
            grid_height: output.built.grid.height(),
            median_passes: output.built.median_passes,
            elevation_range: output.built.range,
            synthetic_range: output.built.synthetic_range,
            triangle_count: output.mesh.face_count(),
            watertight: report.is_watertight(),
        };

        info!(
            "Generated {} triangles ({} bytes) from {}{}",
            diagnostics.triangle_count,
            stl.len(),
            diagnostics.elevation_source,
            if diagnostics.fallback_triggered {
                ", after fallback"
            } else {
                ""
            }
        );

        Ok(GenerationResult { stl, diagnostics })
    }
}
