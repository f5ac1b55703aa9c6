//! Source endpoints, limits and the services built from them.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use terrain_types::{BoundsSpec, Region};

use crate::decode::{StretchCalibration, GRAYSCALE_METERS_PER_LEVEL};
use crate::error::FetchResult;
use crate::http::{build_client, HttpCatalog, HttpImageExport, HttpTileService, HttpWindowReader};
use crate::service::{AssetRef, CatalogSearch, ImageExportService, TileService, WindowReader};
use crate::tiles::{TileScheme, DEFAULT_TILE_SIZE};

/// A tiled basemap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasemapConfig {
    /// URL template with `{z}`, `{x}` and `{y}`.
    pub url: String,
    /// Pyramid layout.
    pub scheme: TileScheme,
    /// Deepest zoom the pyramid serves.
    pub max_zoom: u8,
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            scheme: TileScheme::Equirectangular,
            max_zoom: 7,
        }
    }
}

/// Earth sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarthConfig {
    /// Terrarium tile template.
    pub terrarium_url: String,
    /// Deepest Terrarium zoom.
    pub terrarium_max_zoom: u8,
    /// Regional export endpoint; `None` disables the regional strategy.
    pub regional_export_url: Option<String>,
    /// Optional rendering rule passed to the export endpoint.
    pub regional_rendering_rule: Option<String>,
    /// Coverage envelope of the regional export.
    pub regional_coverage: BoundsSpec,
    /// Calibration of the export's grayscale stretch.
    pub stretch: StretchCalibration,
}

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            terrarium_url: "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/{z}/{x}/{y}.png"
                .to_owned(),
            terrarium_max_zoom: 15,
            regional_export_url: Some(
                "https://elevation.nationalmap.gov/arcgis/rest/services/3DEPElevation/ImageServer/exportImage"
                    .to_owned(),
            ),
            regional_rendering_rule: None,
            regional_coverage: BoundsSpec {
                north: 50.0,
                south: 24.0,
                east: -66.0,
                west: -125.0,
            },
            stretch: StretchCalibration::default(),
        }
    }
}

impl EarthConfig {
    /// The coverage envelope as a validated region, `None` if malformed.
    #[must_use]
    pub fn coverage_region(&self) -> Option<Region> {
        let b = self.regional_coverage;
        Region::new(b.north, b.south, b.east, b.west).ok()
    }
}

/// Moon sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    /// STAC search endpoint; `None` disables the catalog strategy.
    pub catalog_url: Option<String>,
    /// Collections to search.
    pub collections: Vec<String>,
    /// Asset key holding elevation in each item.
    pub asset_key: String,
    /// Maximum items per search.
    pub catalog_limit: usize,
    /// Grayscale basemap fallback.
    pub basemap: BasemapConfig,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            catalog_url: Some("https://stac.astrogeology.usgs.gov/api/search".to_owned()),
            collections: vec!["lunar_orbiter_laser_altimeter".to_owned()],
            asset_key: "image".to_owned(),
            catalog_limit: 10,
            basemap: BasemapConfig {
                url: "https://trek.nasa.gov/tiles/Moon/EQ/LRO_WAC_Mosaic_Global_303ppd_v02/1.0.0/default/default028mm/{z}/{y}/{x}.jpg"
                    .to_owned(),
                scheme: TileScheme::Equirectangular,
                max_zoom: 7,
            },
        }
    }
}

/// Acquisition settings shared by every body.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use terrain_fetch::FetchConfig;
///
/// let config: FetchConfig = serde_json::from_str(r#"{ "max_fetch_px": 1024 }"#).unwrap();
/// assert_eq!(config.max_fetch_px, 1024);
/// assert_eq!(config.tile_size, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Tile edge in pixels.
    pub tile_size: u32,
    /// Largest edge requested from windowed and export services.
    pub max_fetch_px: usize,
    /// Meters per gray level for basemap proxies.
    pub grayscale_meters_per_level: f64,
    /// Windowed raster reader endpoint.
    pub window_service_url: String,
    /// No-data sentinel for windows that do not declare one.
    pub window_no_data: Option<f64>,
    /// Earth sources.
    pub earth: EarthConfig,
    /// Moon sources.
    pub moon: MoonConfig,
    /// Mars basemap.
    pub mars: BasemapConfig,
    /// Global Venus elevation raster.
    pub venus_raster_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("terraslab/", env!("CARGO_PKG_VERSION")).to_owned(),
            tile_size: DEFAULT_TILE_SIZE,
            max_fetch_px: 2048,
            grayscale_meters_per_level: GRAYSCALE_METERS_PER_LEVEL,
            window_service_url: "https://titiler.xyz/cog".to_owned(),
            window_no_data: Some(-32768.0),
            earth: EarthConfig::default(),
            moon: MoonConfig::default(),
            mars: BasemapConfig {
                url: "https://trek.nasa.gov/tiles/Mars/EQ/Mars_Viking_MDIM21_ClrMosaic_global_232m/1.0.0/default/default028mm/{z}/{y}/{x}.jpg"
                    .to_owned(),
                scheme: TileScheme::Equirectangular,
                max_zoom: 7,
            },
            venus_raster_url:
                "https://planetarymaps.usgs.gov/cogs/Venus/Venus_Magellan_Topography_Global_4641m_v02_cog.tif"
                    .to_owned(),
        }
    }
}

/// The remote collaborators every source chain draws from.
#[derive(Clone)]
pub struct Services {
    /// Terrarium tiles.
    pub terrarium: Arc<dyn TileService>,
    /// Regional export, when configured.
    pub regional_export: Option<Arc<dyn ImageExportService>>,
    /// Moon catalog, when configured.
    pub moon_catalog: Option<Arc<dyn CatalogSearch>>,
    /// Moon grayscale basemap.
    pub moon_basemap: Arc<dyn TileService>,
    /// Mars grayscale basemap.
    pub mars_basemap: Arc<dyn TileService>,
    /// Windowed raster reader.
    pub windows: Arc<dyn WindowReader>,
    /// Global Venus raster.
    pub venus: AssetRef,
}

impl Services {
    /// HTTP-backed services for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn http(config: &FetchConfig) -> FetchResult<Self> {
        let client = build_client(Duration::from_secs(config.timeout_secs), &config.user_agent)?;
        let tiles = |url: &str| -> Arc<dyn TileService> {
            Arc::new(HttpTileService::new(client.clone(), url))
        };

        let regional_export = config.earth.regional_export_url.as_ref().map(|url| {
            Arc::new(HttpImageExport::new(
                client.clone(),
                url.clone(),
                config.earth.regional_rendering_rule.clone(),
            )) as Arc<dyn ImageExportService>
        });
        let moon_catalog = config.moon.catalog_url.as_ref().map(|url| {
            Arc::new(HttpCatalog::new(
                client.clone(),
                url.clone(),
                config.moon.collections.clone(),
                config.moon.asset_key.clone(),
                config.moon.catalog_limit,
            )) as Arc<dyn CatalogSearch>
        });

        Ok(Self {
            terrarium: tiles(&config.earth.terrarium_url),
            regional_export,
            moon_catalog,
            moon_basemap: tiles(&config.moon.basemap.url),
            mars_basemap: tiles(&config.mars.url),
            windows: Arc::new(HttpWindowReader::new(
                client.clone(),
                config.window_service_url.clone(),
                config.window_no_data,
            )),
            venus: AssetRef::new(config.venus_raster_url.clone()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_conus() {
        let config = FetchConfig::default();
        let coverage = config.earth.coverage_region().unwrap();
        assert_eq!(coverage.north(), 50.0);
        assert_eq!(coverage.west(), -125.0);
        assert_eq!(config.max_fetch_px, 2048);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn malformed_coverage_disables_region() {
        let mut config = EarthConfig::default();
        config.regional_coverage.north = -10.0;
        assert!(config.coverage_region().is_none());
    }

    #[test]
    fn nested_partial_json() {
        let json = r#"{
            "earth": { "regional_export_url": null },
            "mars": { "max_zoom": 5 }
        }"#;
        let config: FetchConfig = serde_json::from_str(json).unwrap();
        assert!(config.earth.regional_export_url.is_none());
        assert_eq!(config.earth.terrarium_max_zoom, 15);
        assert_eq!(config.mars.max_zoom, 5);
        assert_eq!(config.mars.scheme, TileScheme::Equirectangular);
    }
}
