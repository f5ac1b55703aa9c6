//! Elevation acquisition strategies.
//!
//! Each [`ElevationSource`] turns a region into a [`Raster`] of meters.
//! Strategies differ in where the data comes from and how faithful it is;
//! see [`SourceKind`].

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use terrain_types::{Body, Raster, Region};
use tracing::{debug, warn};

use crate::decode::{PixelEncoding, StretchCalibration};
use crate::error::{FetchError, FetchResult};
use crate::service::{
    AssetRef, CatalogSearch, ImageExportService, ProjectedWindow, TileService, WindowReader,
};
use crate::tiles::{TileCoord, TileRange, TileScheme};

/// Identifies the strategy that produced a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Terrarium-encoded elevation tiles.
    TerrariumTiles,
    /// High-resolution regional export with a coverage envelope.
    RegionalExport,
    /// Catalog search plus windowed reads of the matching rasters.
    RasterCatalog,
    /// Grayscale visual basemap used as an elevation proxy.
    GrayscaleBasemap,
    /// A single global elevation raster.
    GlobalRaster,
}

impl SourceKind {
    /// Stable label used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TerrariumTiles => "terrarium-tiles",
            Self::RegionalExport => "regional-export",
            Self::RasterCatalog => "raster-catalog",
            Self::GrayscaleBasemap => "grayscale-basemap",
            Self::GlobalRaster => "global-raster",
        }
    }

    /// Whether the strategy reads survey-grade elevation rather than a
    /// global composite or an imagery proxy.
    #[must_use]
    pub const fn is_high_fidelity(self) -> bool {
        matches!(
            self,
            Self::RegionalExport | Self::RasterCatalog | Self::GlobalRaster
        )
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a source is asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRequest {
    /// Region to cover.
    pub region: Region,
    /// Body the region is on.
    pub body: Body,
    /// Tile zoom for tiled strategies.
    pub zoom: u8,
    /// Output width for windowed and export strategies, normally the mesh
    /// grid width. Tiled strategies size their raster from `zoom` instead.
    pub width: usize,
    /// Output height for windowed and export strategies.
    pub height: usize,
}

/// A raster plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRaster {
    /// Elevation in meters, row 0 at the north.
    pub raster: Raster,
    /// Strategy that produced it.
    pub kind: SourceKind,
    /// Whether values are an imagery proxy rather than measured elevation.
    pub low_fidelity_proxy: bool,
}

impl SourceRaster {
    /// Whether the raster came from a high-fidelity strategy.
    #[must_use]
    pub const fn is_high_fidelity(&self) -> bool {
        self.kind.is_high_fidelity()
    }
}

/// One way of acquiring elevation for a region.
pub trait ElevationSource: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> SourceKind;

    /// Acquire elevation for `request`.
    ///
    /// Missing pixels are not an error. An error means this strategy cannot
    /// serve the request and the next one should be tried.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why the strategy failed.
    fn fetch(&self, request: &SourceRequest) -> FetchResult<SourceRaster>;
}

/// Scale `width × height` down so neither exceeds `max_px`, keeping aspect.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
// Truncation: results are rounded and bounded by `max_px`
#[must_use]
pub fn capped_dimensions(width: usize, height: usize, max_px: usize) -> (usize, usize) {
    let width = width.max(1);
    let height = height.max(1);
    let max_px = max_px.max(1);
    let longest = width.max(height);
    if longest <= max_px {
        return (width, height);
    }
    let scale = max_px as f64 / longest as f64;
    (
        ((width as f64 * scale).round() as usize).clamp(1, max_px),
        ((height as f64 * scale).round() as usize).clamp(1, max_px),
    )
}

/// Decode every pixel of an encoded tile image.
fn decode_image(bytes: &[u8], encoding: PixelEncoding) -> FetchResult<Raster> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let (w, h) = image.dimensions();
    Ok(Raster::from_fn(w as usize, h as usize, |x, y| {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: x and y are below the u32 image dimensions
        let pixel = image.get_pixel(x as u32, y as u32);
        encoding.decode(pixel.0)
    }))
}

/// Tile pyramid source: stitch the covering tiles and crop to the region.
///
/// Tiles are fetched in parallel. Missing tiles (404) and individual tile
/// failures leave gaps; the fetch only fails when every tile fails.
///
/// The zoom is lowered until the region's pixel window fits in
/// `max_fetch_px`, and a window that still does not fit at zoom 0 is
/// resampled down to it.
pub struct TiledSource {
    service: Arc<dyn TileService>,
    kind: SourceKind,
    scheme: TileScheme,
    encoding: PixelEncoding,
    max_zoom: u8,
    tile_size: u32,
    max_fetch_px: usize,
}

impl TiledSource {
    /// Terrarium elevation tiles in Web Mercator.
    #[must_use]
    pub fn terrarium(
        service: Arc<dyn TileService>,
        max_zoom: u8,
        tile_size: u32,
        max_fetch_px: usize,
    ) -> Self {
        Self {
            service,
            kind: SourceKind::TerrariumTiles,
            scheme: TileScheme::WebMercator,
            encoding: PixelEncoding::Terrarium,
            max_zoom,
            tile_size,
            max_fetch_px,
        }
    }

    /// A grayscale basemap decoded as an elevation proxy.
    #[must_use]
    pub fn grayscale(
        service: Arc<dyn TileService>,
        scheme: TileScheme,
        meters_per_level: f64,
        max_zoom: u8,
        tile_size: u32,
        max_fetch_px: usize,
    ) -> Self {
        Self {
            service,
            kind: SourceKind::GrayscaleBasemap,
            scheme,
            encoding: PixelEncoding::GrayscaleProxy { meters_per_level },
            max_zoom,
            tile_size,
            max_fetch_px,
        }
    }

    /// Tile scheme of this pyramid.
    #[must_use]
    pub const fn scheme(&self) -> TileScheme {
        self.scheme
    }

    /// Covering range at the highest zoom not above `zoom` whose window fits.
    fn fitted_range(&self, region: &Region, zoom: u8) -> TileRange {
        let mut range = TileRange::covering(region, zoom, self.scheme, self.tile_size);
        while range.zoom > 0 && range.window.width.max(range.window.height) > self.max_fetch_px {
            range = TileRange::covering(region, range.zoom - 1, self.scheme, self.tile_size);
        }
        if range.zoom < zoom {
            debug!(
                kind = %self.kind,
                requested = zoom,
                zoom = range.zoom,
                max_px = self.max_fetch_px,
                "lowered tile zoom to fit the fetch cap"
            );
        }
        range
    }

    fn fetch_decoded(&self, tile: &TileCoord) -> FetchResult<Option<Raster>> {
        match self.service.fetch_tile(tile)? {
            Some(bytes) => decode_image(&bytes, self.encoding).map(Some),
            None => Ok(None),
        }
    }
}

impl ElevationSource for TiledSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn fetch(&self, request: &SourceRequest) -> FetchResult<SourceRaster> {
        let range = self.fitted_range(&request.region, request.zoom.min(self.max_zoom));
        let tiles = range.tiles();
        debug!(kind = %self.kind, zoom = range.zoom, tiles = tiles.len(), "fetching tile range");

        let results: Vec<(TileCoord, FetchResult<Option<Raster>>)> = tiles
            .par_iter()
            .map(|tile| (*tile, self.fetch_decoded(tile)))
            .collect();

        let mut canvas = Raster::empty(range.canvas_width(), range.canvas_height());
        let mut failures = 0usize;
        let mut last_error = None;
        for (tile, result) in results {
            match result {
                Ok(Some(pixels)) => {
                    let (ox, oy) = range.offset_of(&tile);
                    for y in 0..pixels.height() {
                        for x in 0..pixels.width() {
                            if let Some(v) = pixels.get(x, y) {
                                canvas.set(ox + x, oy + y, v);
                            }
                        }
                    }
                }
                Ok(None) => debug!(%tile, "tile not available"),
                Err(err) => {
                    warn!(%tile, error = %err, "tile fetch failed");
                    failures += 1;
                    last_error = Some(err.to_string());
                }
            }
        }

        if failures == tiles.len() {
            return Err(FetchError::AllTilesFailed {
                attempted: failures,
                last: last_error.unwrap_or_default(),
            });
        }

        let w = range.window;
        let (width, height) = capped_dimensions(w.width, w.height, self.max_fetch_px);
        let mut raster = canvas.crop(w.x, w.y, w.width, w.height);
        if (width, height) != (w.width, w.height) {
            raster = raster.resample_nearest(width, height);
        }
        Ok(SourceRaster {
            raster,
            kind: self.kind,
            low_fidelity_proxy: self.encoding.is_proxy(),
        })
    }
}

/// Regional export source with a rectangular coverage envelope.
pub struct RegionalExportSource {
    service: Arc<dyn ImageExportService>,
    coverage: Region,
    calibration: StretchCalibration,
    max_fetch_px: usize,
}

impl RegionalExportSource {
    /// Create a regional source covering `coverage`.
    #[must_use]
    pub fn new(
        service: Arc<dyn ImageExportService>,
        coverage: Region,
        calibration: StretchCalibration,
        max_fetch_px: usize,
    ) -> Self {
        Self {
            service,
            coverage,
            calibration,
            max_fetch_px,
        }
    }
}

impl ElevationSource for RegionalExportSource {
    fn kind(&self) -> SourceKind {
        SourceKind::RegionalExport
    }

    fn fetch(&self, request: &SourceRequest) -> FetchResult<SourceRaster> {
        if !request.region.is_within(&self.coverage) {
            return Err(FetchError::OutsideCoverage {
                region: request.region.to_string(),
                kind: self.kind(),
            });
        }

        let (w, h) = capped_dimensions(request.width, request.height, self.max_fetch_px);
        let bytes = self.service.export(&request.region, w, h)?;
        let raster = decode_image(&bytes, PixelEncoding::InvertedStretch(self.calibration))?;

        Ok(SourceRaster {
            raster: raster.resample_nearest(request.width, request.height),
            kind: self.kind(),
            low_fidelity_proxy: false,
        })
    }
}

/// Catalog source: search, then average windowed reads of every asset.
///
/// Assets are read one at a time; a failed read is skipped.
pub struct CatalogSource {
    catalog: Arc<dyn CatalogSearch>,
    reader: Arc<dyn WindowReader>,
    max_fetch_px: usize,
}

impl CatalogSource {
    /// Create a catalog source.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogSearch>,
        reader: Arc<dyn WindowReader>,
        max_fetch_px: usize,
    ) -> Self {
        Self {
            catalog,
            reader,
            max_fetch_px,
        }
    }
}

impl ElevationSource for CatalogSource {
    fn kind(&self) -> SourceKind {
        SourceKind::RasterCatalog
    }

    fn fetch(&self, request: &SourceRequest) -> FetchResult<SourceRaster> {
        let assets = self.catalog.search(&request.region)?;
        if assets.is_empty() {
            return Err(FetchError::NoAssets);
        }
        debug!(assets = assets.len(), "catalog search matched");

        let (w, h) = capped_dimensions(request.width, request.height, self.max_fetch_px);
        let window = ProjectedWindow::from_region(&request.region, request.body.radius_m());

        let mut sum = vec![0.0f64; w * h];
        let mut count = vec![0u32; w * h];
        for asset in &assets {
            let raster = match read_raster(self.reader.as_ref(), asset, &window, w, h) {
                Ok(raster) => raster,
                Err(err) => {
                    warn!(asset = %asset.href, error = %err, "skipping unreadable asset");
                    continue;
                }
            };
            for (i, sample) in raster.samples().iter().enumerate() {
                if let Some(v) = sample {
                    sum[i] += v;
                    count[i] += 1;
                }
            }
        }

        if count.iter().all(|&c| c == 0) {
            return Err(FetchError::NoSamples { kind: self.kind() });
        }

        let raster = Raster::from_fn(w, h, |x, y| {
            let i = y * w + x;
            (count[i] > 0).then(|| sum[i] / f64::from(count[i]))
        });

        Ok(SourceRaster {
            raster: raster.resample_nearest(request.width, request.height),
            kind: self.kind(),
            low_fidelity_proxy: false,
        })
    }
}

/// Read one asset window and bring it to `width × height`.
fn read_raster(
    reader: &dyn WindowReader,
    asset: &AssetRef,
    window: &ProjectedWindow,
    width: usize,
    height: usize,
) -> FetchResult<Raster> {
    let samples = reader.read_window(asset, window, width, height)?;
    let (sw, sh, n) = (samples.width, samples.height, samples.values.len());
    let raster = samples
        .into_raster()
        .ok_or(FetchError::WindowSizeMismatch {
            width: sw,
            height: sh,
            samples: n,
        })?;
    Ok(raster.resample_nearest(width, height))
}

/// A single global raster read through a window.
pub struct GlobalRasterSource {
    asset: AssetRef,
    reader: Arc<dyn WindowReader>,
    max_fetch_px: usize,
}

impl GlobalRasterSource {
    /// Create a source reading `asset`.
    #[must_use]
    pub fn new(asset: AssetRef, reader: Arc<dyn WindowReader>, max_fetch_px: usize) -> Self {
        Self {
            asset,
            reader,
            max_fetch_px,
        }
    }
}

impl ElevationSource for GlobalRasterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::GlobalRaster
    }

    fn fetch(&self, request: &SourceRequest) -> FetchResult<SourceRaster> {
        let (w, h) = capped_dimensions(request.width, request.height, self.max_fetch_px);
        let window = ProjectedWindow::from_region(&request.region, request.body.radius_m());
        let raster = read_raster(self.reader.as_ref(), &self.asset, &window, w, h)?;
        if raster.valid_count() == 0 {
            return Err(FetchError::NoSamples { kind: self.kind() });
        }
        Ok(SourceRaster {
            raster: raster.resample_nearest(request.width, request.height),
            kind: self.kind(),
            low_fidelity_proxy: false,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decode::encode_terrarium;
    use crate::service::SampleWindow;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    fn png(size: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_fn(size, size, |x, y| Rgba(pixel(x, y)));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    struct FlatTiles {
        meters: f64,
        fail_x: Option<u32>,
    }

    impl TileService for FlatTiles {
        fn fetch_tile(&self, tile: &TileCoord) -> FetchResult<Option<Vec<u8>>> {
            if Some(tile.x) == self.fail_x {
                return Err(FetchError::status("mock", 500));
            }
            let [r, g, b] = encode_terrarium(self.meters);
            Ok(Some(png(16, |_, _| [r, g, b, 255])))
        }
    }

    struct NoTiles;

    impl TileService for NoTiles {
        fn fetch_tile(&self, _: &TileCoord) -> FetchResult<Option<Vec<u8>>> {
            Err(FetchError::status("mock", 503))
        }
    }

    fn request(region: Region) -> SourceRequest {
        SourceRequest {
            region,
            body: Body::Earth,
            zoom: 10,
            width: 64,
            height: 48,
        }
    }

    fn wasatch() -> Region {
        Region::new(40.5, 40.3, -111.5, -111.7).unwrap()
    }

    #[test]
    fn capping_preserves_aspect() {
        assert_eq!(capped_dimensions(100, 50, 2048), (100, 50));
        assert_eq!(capped_dimensions(4096, 2048, 2048), (2048, 1024));
        assert_eq!(capped_dimensions(0, 0, 10), (1, 1));
    }

    #[test]
    fn terrarium_tiles_decode_and_crop() {
        let source = TiledSource::terrarium(
            Arc::new(FlatTiles {
                meters: 1500.0,
                fail_x: None,
            }),
            15,
            16,
            2048,
        );
        let out = source.fetch(&request(wasatch())).unwrap();
        assert_eq!(out.kind, SourceKind::TerrariumTiles);
        assert!(!out.low_fidelity_proxy);
        assert!(!out.is_high_fidelity());
        assert!(out.raster.valid_count() > 0);
        assert_eq!(out.raster.get(0, 0), Some(1500.0));
    }

    #[test]
    fn partial_tile_failure_leaves_gaps() {
        let region = Region::new(40.5, 40.3, -111.0, -112.5).unwrap();
        let probe = TileRange::covering(&region, 10, TileScheme::WebMercator, 16);
        assert!(probe.tiles_x() > 1);

        let source = TiledSource::terrarium(
            Arc::new(FlatTiles {
                meters: 10.0,
                fail_x: Some(probe.x_min),
            }),
            15,
            16,
            2048,
        );
        let out = source.fetch(&request(region)).unwrap();
        assert_eq!(out.raster.get(0, 0), None);
        assert!(out.raster.valid_count() > 0);
    }

    #[test]
    fn oversized_windows_are_capped() {
        let flat = || {
            Arc::new(FlatTiles {
                meters: 20.0,
                fail_x: None,
            })
        };
        let world_band = Region::new(20.0, 0.0, 180.0, -180.0).unwrap();

        // Zoom 10 would be 16384 px wide; the source steps down to zoom 2.
        let source = TiledSource::terrarium(flat(), 15, 16, 64);
        let out = source.fetch(&request(world_band)).unwrap();
        assert!(out.raster.width() <= 64, "width {}", out.raster.width());
        assert!(out.raster.height() <= 64, "height {}", out.raster.height());
        assert_eq!(out.raster.get(0, 0), Some(20.0));

        // Even zoom 0 is wider than the cap, so the window is resampled.
        let source = TiledSource::terrarium(flat(), 15, 16, 8);
        let out = source.fetch(&request(world_band)).unwrap();
        assert_eq!(out.raster.width(), 8);
        assert!(out.raster.height() >= 1 && out.raster.height() <= 8);
        assert!(out.raster.valid_count() > 0);
    }

    #[test]
    fn all_tiles_failing_is_an_error() {
        let source = TiledSource::terrarium(Arc::new(NoTiles), 15, 16, 2048);
        let err = source.fetch(&request(wasatch())).unwrap_err();
        assert!(matches!(err, FetchError::AllTilesFailed { .. }));
    }

    #[test]
    fn grayscale_is_a_proxy() {
        struct Gray;
        impl TileService for Gray {
            fn fetch_tile(&self, _: &TileCoord) -> FetchResult<Option<Vec<u8>>> {
                Ok(Some(png(16, |_, _| [10, 10, 10, 255])))
            }
        }
        let source = TiledSource::grayscale(Arc::new(Gray), TileScheme::Equirectangular, 100.0, 7, 16, 2048);
        let mut req = request(Region::new(10.0, -10.0, 20.0, 0.0).unwrap());
        req.body = Body::Moon;
        let out = source.fetch(&req).unwrap();
        assert!(out.low_fidelity_proxy);
        assert_eq!(out.kind, SourceKind::GrayscaleBasemap);
        assert_eq!(out.raster.get(0, 0), Some(1000.0));
    }

    struct FixedExport;

    impl ImageExportService for FixedExport {
        fn export(&self, _: &Region, width: usize, height: usize) -> FetchResult<Vec<u8>> {
            let img = RgbaImage::from_pixel(width as u32, height as u32, Rgba([0, 0, 0, 255]));
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, ImageFormat::Png)?;
            Ok(out.into_inner())
        }
    }

    #[test]
    fn regional_export_checks_coverage() {
        let coverage = Region::new(50.0, 24.0, -66.0, -125.0).unwrap();
        let source = RegionalExportSource::new(
            Arc::new(FixedExport),
            coverage,
            StretchCalibration::default(),
            2048,
        );

        let out = source.fetch(&request(wasatch())).unwrap();
        assert!(out.is_high_fidelity());
        assert_eq!(out.raster.width(), 64);
        assert_eq!(out.raster.get(3, 3), Some(6500.0));

        let alps = Region::new(46.5, 46.0, 8.0, 7.5).unwrap();
        let err = source.fetch(&request(alps)).unwrap_err();
        assert!(matches!(err, FetchError::OutsideCoverage { .. }));
    }

    struct Catalog(Vec<AssetRef>);

    impl CatalogSearch for Catalog {
        fn search(&self, _: &Region) -> FetchResult<Vec<AssetRef>> {
            Ok(self.0.clone())
        }
    }

    /// Serves constant windows keyed by href; `"bad"` fails, `"hole"` is all no-data.
    struct Windows {
        reads: Mutex<Vec<String>>,
    }

    impl WindowReader for Windows {
        fn read_window(
            &self,
            asset: &AssetRef,
            _: &ProjectedWindow,
            width: usize,
            height: usize,
        ) -> FetchResult<SampleWindow> {
            self.reads.lock().unwrap().push(asset.href.clone());
            let value = match asset.href.as_str() {
                "bad" => return Err(FetchError::status("mock", 500)),
                "hole" => -1.0,
                "low" => 100.0,
                _ => 300.0,
            };
            Ok(SampleWindow {
                width,
                height,
                values: vec![value; width * height],
                no_data: Some(-1.0),
            })
        }
    }

    fn windows() -> Arc<Windows> {
        Arc::new(Windows {
            reads: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn catalog_averages_readable_assets() {
        let reader = windows();
        let source = CatalogSource::new(
            Arc::new(Catalog(vec![
                AssetRef::new("low"),
                AssetRef::new("bad"),
                AssetRef::new("high"),
                AssetRef::new("hole"),
            ])),
            reader.clone(),
            2048,
        );
        let mut req = request(Region::new(1.0, 0.0, 1.0, 0.0).unwrap());
        req.body = Body::Moon;
        let out = source.fetch(&req).unwrap();
        assert_eq!(out.raster.get(10, 10), Some(200.0));
        assert_eq!(reader.reads.lock().unwrap().len(), 4);
    }

    #[test]
    fn catalog_without_assets_or_samples_fails() {
        let empty = CatalogSource::new(Arc::new(Catalog(Vec::new())), windows(), 2048);
        assert!(matches!(
            empty.fetch(&request(wasatch())),
            Err(FetchError::NoAssets)
        ));

        let holes = CatalogSource::new(
            Arc::new(Catalog(vec![AssetRef::new("hole"), AssetRef::new("bad")])),
            windows(),
            2048,
        );
        assert!(matches!(
            holes.fetch(&request(wasatch())),
            Err(FetchError::NoSamples { .. })
        ));
    }

    #[test]
    fn global_raster_propagates_failure() {
        let ok = GlobalRasterSource::new(AssetRef::new("venus"), windows(), 2048);
        let out = ok.fetch(&request(wasatch())).unwrap();
        assert!(out.is_high_fidelity());
        assert_eq!(out.raster.get(0, 0), Some(300.0));

        let bad = GlobalRasterSource::new(AssetRef::new("bad"), windows(), 2048);
        assert!(bad.fetch(&request(wasatch())).is_err());
    }
}
