//! HTTP implementations of the collaborator traits.
//!
//! All calls are blocking and share one [`Client`] carrying the configured
//! timeout and user agent. Concurrency comes from the callers (tiles are
//! fetched on the rayon pool).

use std::collections::BTreeMap;
use std::io::Cursor;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use terrain_types::Region;
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{FetchError, FetchResult};
use crate::service::{
    AssetRef, CatalogSearch, ImageExportService, ProjectedWindow, SampleWindow, TileService,
    WindowReader,
};
use crate::tiles::TileCoord;

/// TIFF tag GDAL uses for the no-data sentinel, stored as ASCII.
const GDAL_NODATA_TAG: u16 = 42113;

/// Build the shared blocking client.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client(timeout: Duration, user_agent: &str) -> FetchResult<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?)
}

/// Turn a response into its body, mapping non-success statuses to errors.
fn body_of(url: &str, response: reqwest::blocking::Response) -> FetchResult<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::status(url, status.as_u16()));
    }
    Ok(response.bytes()?.to_vec())
}

/// Tile pyramid behind a `{z}/{x}/{y}` URL template.
#[derive(Debug, Clone)]
pub struct HttpTileService {
    client: Client,
    template: String,
}

impl HttpTileService {
    /// Create a tile service for `template`.
    #[must_use]
    pub fn new(client: Client, template: impl Into<String>) -> Self {
        Self {
            client,
            template: template.into(),
        }
    }
}

impl TileService for HttpTileService {
    fn fetch_tile(&self, tile: &TileCoord) -> FetchResult<Option<Vec<u8>>> {
        let url = tile.fill(&self.template);
        debug!(%url, "fetching tile");
        let response = self.client.get(&url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        body_of(&url, response).map(Some)
    }
}

/// ArcGIS-style `exportImage` endpoint returning a PNG.
#[derive(Debug, Clone)]
pub struct HttpImageExport {
    client: Client,
    endpoint: String,
    rendering_rule: Option<String>,
}

impl HttpImageExport {
    /// Create an export service for `endpoint`.
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, rendering_rule: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            rendering_rule,
        }
    }
}

impl ImageExportService for HttpImageExport {
    fn export(&self, region: &Region, width: usize, height: usize) -> FetchResult<Vec<u8>> {
        let mut query = vec![
            (
                "bbox",
                format!(
                    "{},{},{},{}",
                    region.west(),
                    region.south(),
                    region.east(),
                    region.north()
                ),
            ),
            ("bboxSR", "4326".to_owned()),
            ("imageSR", "4326".to_owned()),
            ("size", format!("{width},{height}")),
            ("format", "png".to_owned()),
            ("f", "image".to_owned()),
        ];
        if let Some(rule) = &self.rendering_rule {
            query.push(("renderingRule", rule.clone()));
        }

        debug!(endpoint = %self.endpoint, width, height, "requesting export image");
        let response = self.client.get(&self.endpoint).query(&query).send()?;
        body_of(&self.endpoint, response)
    }
}

#[derive(Serialize)]
struct SearchBody<'a> {
    bbox: [f64; 4],
    collections: &'a [String],
    limit: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    id: Option<String>,
    #[serde(default)]
    assets: BTreeMap<String, Asset>,
}

#[derive(Deserialize)]
struct Asset {
    href: String,
}

/// STAC item search over POST.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    endpoint: String,
    collections: Vec<String>,
    asset_key: String,
    limit: usize,
}

impl HttpCatalog {
    /// Create a catalog client.
    ///
    /// `asset_key` names the asset in each item that holds elevation.
    #[must_use]
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        collections: Vec<String>,
        asset_key: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            collections,
            asset_key: asset_key.into(),
            limit,
        }
    }
}

impl CatalogSearch for HttpCatalog {
    fn search(&self, region: &Region) -> FetchResult<Vec<AssetRef>> {
        let body = SearchBody {
            bbox: [region.west(), region.south(), region.east(), region.north()],
            collections: &self.collections,
            limit: self.limit,
        };
        let response = self.client.post(&self.endpoint).json(&body).send()?;
        let bytes = body_of(&self.endpoint, response)?;
        parse_search(&bytes, &self.asset_key)
    }
}

/// Extract `features[].assets[asset_key].href` from a search response.
fn parse_search(bytes: &[u8], asset_key: &str) -> FetchResult<Vec<AssetRef>> {
    let response: SearchResponse = serde_json::from_slice(bytes)?;
    Ok(response
        .features
        .into_iter()
        .filter_map(|mut feature| {
            let asset = feature.assets.remove(asset_key)?;
            Some(AssetRef {
                id: feature.id,
                href: asset.href,
            })
        })
        .collect())
}

/// Tile server exposing `/bbox/{minx},{miny},{maxx},{maxy}/{w}x{h}.tif?url=...`.
#[derive(Debug, Clone)]
pub struct HttpWindowReader {
    client: Client,
    endpoint: String,
    no_data: Option<f64>,
}

impl HttpWindowReader {
    /// Create a reader for `endpoint`.
    ///
    /// `no_data` is used when a payload does not declare its own sentinel.
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, no_data: Option<f64>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            no_data,
        }
    }
}

impl WindowReader for HttpWindowReader {
    fn read_window(
        &self,
        asset: &AssetRef,
        window: &ProjectedWindow,
        width: usize,
        height: usize,
    ) -> FetchResult<SampleWindow> {
        let url = format!(
            "{}/bbox/{},{},{},{}/{}x{}.tif",
            self.endpoint.trim_end_matches('/'),
            window.min_x,
            window.min_y,
            window.max_x,
            window.max_y,
            width,
            height
        );
        debug!(%url, asset = %asset.href, "reading raster window");
        let response = self
            .client
            .get(&url)
            .query(&[("url", asset.href.as_str())])
            .send()?;
        let bytes = body_of(&url, response)?;
        decode_tiff(&bytes, self.no_data)
    }
}

/// Decode the first band of a TIFF payload.
///
/// A GDAL no-data tag in the file overrides `fallback_no_data`.
///
/// # Errors
///
/// Returns an error if the payload is not a readable TIFF or its sample
/// count disagrees with its dimensions.
pub fn decode_tiff(bytes: &[u8], fallback_no_data: Option<f64>) -> FetchResult<SampleWindow> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let declared = match decoder.find_tag(Tag::Unknown(GDAL_NODATA_TAG))? {
        Some(Value::Ascii(text)) => text.trim_end_matches('\0').trim().parse::<f64>().ok(),
        _ => None,
    };
    let no_data = declared.or(fallback_no_data);

    let values = samples_as_f64(decoder.read_image()?)?;
    let pixels = width * height;
    if pixels == 0 || values.len() % pixels != 0 {
        return Err(FetchError::WindowSizeMismatch {
            width,
            height,
            samples: values.len(),
        });
    }
    let bands = values.len() / pixels;
    let values = if bands == 1 {
        values
    } else {
        values.into_iter().step_by(bands).collect()
    };

    Ok(SampleWindow {
        width,
        height,
        values,
        no_data,
    })
}

#[allow(clippy::cast_precision_loss)]
// Precision: 64-bit integer elevations beyond 2^53 do not occur
fn samples_as_f64(result: DecodingResult) -> FetchResult<Vec<f64>> {
    let values = match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        #[allow(unreachable_patterns)]
        _ => {
            return Err(FetchError::UnsupportedSampleFormat(
                "unrecognised TIFF sample type".to_owned(),
            ))
        }
    };
    Ok(values)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tiff::encoder::{colortype, TiffEncoder};

    fn gray_f32_tiff(width: u32, height: u32, data: &[f32]) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        let mut encoder = TiffEncoder::new(&mut bytes).unwrap();
        encoder
            .write_image::<colortype::Gray32Float>(width, height, data)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn tiff_window_decodes_with_fallback_no_data() {
        let bytes = gray_f32_tiff(3, 2, &[1.0, 2.0, -9999.0, 4.0, 5.0, 6.0]);
        let window = decode_tiff(&bytes, Some(-9999.0)).unwrap();
        assert_eq!((window.width, window.height), (3, 2));
        assert_eq!(window.values[4], 5.0);

        let raster = window.into_raster().unwrap();
        assert_eq!(raster.get(2, 0), None);
        assert_eq!(raster.valid_count(), 5);
    }

    #[test]
    fn garbage_is_not_a_tiff() {
        assert!(decode_tiff(b"not a tiff", None).is_err());
    }

    #[test]
    fn search_response_picks_named_asset() {
        let json = br#"{
            "type": "FeatureCollection",
            "features": [
                {"id": "a", "assets": {"dem": {"href": "https://x/a.tif"}, "thumb": {"href": "t"}}},
                {"id": "b", "assets": {"thumb": {"href": "t"}}},
                {"assets": {"dem": {"href": "https://x/c.tif"}}}
            ]
        }"#;
        let assets = parse_search(json, "dem").unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].id.as_deref(), Some("a"));
        assert_eq!(assets[1].href, "https://x/c.tif");
    }

    #[test]
    fn empty_search_is_not_an_error() {
        assert!(parse_search(br#"{"features": []}"#, "dem").unwrap().is_empty());
        assert!(parse_search(b"{", "dem").is_err());
    }
}
