//! Ordered fallback across elevation sources.

use terrain_types::Body;
use tracing::{info, warn};

use crate::config::{FetchConfig, Services};
use crate::error::{FetchError, FetchResult};
use crate::source::{
    CatalogSource, ElevationSource, GlobalRasterSource, RegionalExportSource, SourceKind,
    SourceRaster, SourceRequest, TiledSource,
};
use crate::tiles::TileScheme;

/// An ordered list of strategies tried until one succeeds.
///
/// # Example
///
/// ```no_run
/// use terrain_fetch::{FetchConfig, Services, SourceChain, SourceRequest};
/// use terrain_types::{Body, Region};
///
/// let config = FetchConfig::default();
/// let services = Services::http(&config).unwrap();
/// let chain = SourceChain::for_body(Body::Earth, &services, &config);
///
/// let region = Region::new(40.5, 40.3, -111.5, -111.7).unwrap();
/// let raster = chain
///     .fetch(&SourceRequest { region, body: Body::Earth, zoom: 11, width: 256, height: 200 })
///     .unwrap();
/// println!("{} samples from {}", raster.raster.valid_count(), raster.kind);
/// ```
#[derive(Default)]
pub struct SourceChain {
    sources: Vec<Box<dyn ElevationSource>>,
}

impl SourceChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy.
    #[must_use]
    pub fn with(mut self, source: impl ElevationSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Append a boxed strategy.
    pub fn push(&mut self, source: Box<dyn ElevationSource>) {
        self.sources.push(source);
    }

    /// Strategy kinds in the order they are tried.
    #[must_use]
    pub fn kinds(&self) -> Vec<SourceKind> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// Number of strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the chain has no strategies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Whether a failed strategy has another one behind it.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.sources.len() > 1
    }

    /// The standard chain for `body`.
    ///
    /// | Body  | Strategies, in order |
    /// |-------|----------------------|
    /// | Earth | regional export (if configured), Terrarium tiles |
    /// | Moon  | raster catalog (if configured), grayscale basemap |
    /// | Mars  | grayscale basemap |
    /// | Venus | global raster |
    #[must_use]
    pub fn for_body(body: Body, services: &Services, config: &FetchConfig) -> Self {
        let mut chain = Self::new();
        let px = config.max_fetch_px;
        let tile = config.tile_size;
        match body {
            Body::Earth => {
                if let (Some(export), Some(coverage)) =
                    (&services.regional_export, config.earth.coverage_region())
                {
                    chain.push(Box::new(RegionalExportSource::new(
                        export.clone(),
                        coverage,
                        config.earth.stretch,
                        px,
                    )));
                }
                chain.push(Box::new(TiledSource::terrarium(
                    services.terrarium.clone(),
                    config.earth.terrarium_max_zoom,
                    tile,
                    px,
                )));
            }
            Body::Moon => {
                if let Some(catalog) = &services.moon_catalog {
                    chain.push(Box::new(CatalogSource::new(
                        catalog.clone(),
                        services.windows.clone(),
                        px,
                    )));
                }
                chain.push(Box::new(TiledSource::grayscale(
                    services.moon_basemap.clone(),
                    config.moon.basemap.scheme,
                    config.grayscale_meters_per_level,
                    config.moon.basemap.max_zoom,
                    tile,
                    px,
                )));
            }
            Body::Mars => {
                chain.push(Box::new(TiledSource::grayscale(
                    services.mars_basemap.clone(),
                    config.mars.scheme,
                    config.grayscale_meters_per_level,
                    config.mars.max_zoom,
                    tile,
                    px,
                )));
            }
            Body::Venus => {
                chain.push(Box::new(GlobalRasterSource::new(
                    services.venus.clone(),
                    services.windows.clone(),
                    px,
                )));
            }
        }
        chain
    }

    /// Try each strategy in order and return the first success.
    ///
    /// # Errors
    ///
    /// Returns the last strategy's error when all fail, or
    /// [`FetchError::NoSources`] for an empty chain.
    pub fn fetch(&self, request: &SourceRequest) -> FetchResult<SourceRaster> {
        let mut last = FetchError::NoSources;
        for source in &self.sources {
            match source.fetch(request) {
                Ok(raster) => {
                    info!(
                        kind = %raster.kind,
                        valid = raster.raster.valid_count(),
                        width = raster.raster.width(),
                        height = raster.raster.height(),
                        "elevation acquired"
                    );
                    return Ok(raster);
                }
                Err(err) => {
                    warn!(kind = %source.kind(), error = %err, "elevation source failed");
                    last = err;
                }
            }
        }
        Err(last)
    }
}

/// Tile scheme used to size requests for `body`.
#[must_use]
pub fn scheme_for(body: Body, config: &FetchConfig) -> TileScheme {
    match body {
        Body::Earth | Body::Venus => TileScheme::WebMercator,
        Body::Moon => config.moon.basemap.scheme,
        Body::Mars => config.mars.scheme,
    }
}
