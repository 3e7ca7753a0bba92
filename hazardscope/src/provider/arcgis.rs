//! ArcGIS REST service adapters
//!
//! Feature layers are queried through `<layer>/query` with GeoJSON output.
//! Rasters are sampled through `<service>/identify`, either on a MapServer
//! (dynamic map service) or an ImageServer.

use futures::future::BoxFuture;
use reqwest::Url;
use tracing::debug;

use super::extract::ValueExtractor;
use super::http::AsyncHttpClient;
use super::types::{FeatureService, RasterService, RasterValue, ServiceError};
use crate::coord::GeoPoint;
use crate::geometry::{parse_feature_collection, Feature};

/// Spatial reference used for every request and response (WGS84).
const WGS84: &str = "4326";

/// Half-width in degrees of the map extent sent with MapServer identify.
const IDENTIFY_EXTENT_DEG: f64 = 0.05;

/// Image size sent with MapServer identify; with the extent above one pixel
/// is roughly 20 m.
const IDENTIFY_IMAGE_DISPLAY: &str = "500,500,96";

fn service_url(base: &str, operation: &str) -> Result<Url, ServiceError> {
    let joined = format!("{}/{}", base.trim_end_matches('/'), operation);
    Url::parse(&joined).map_err(|e| ServiceError::InvalidUrl {
        url: joined.clone(),
        reason: e.to_string(),
    })
}

fn point_param(point: GeoPoint) -> String {
    format!("{},{}", point.lon, point.lat)
}

/// ArcGIS FeatureServer / MapServer layer queried for polygons.
pub struct ArcGisFeatureService<C: AsyncHttpClient> {
    http_client: C,
    name: String,
    layer_url: String,
    where_clause: String,
}

impl<C: AsyncHttpClient> ArcGisFeatureService<C> {
    /// Creates a service for the layer at `layer_url` (ending in the layer id).
    pub fn new(http_client: C, name: impl Into<String>, layer_url: impl Into<String>) -> Self {
        Self {
            http_client,
            name: name.into(),
            layer_url: layer_url.into(),
            where_clause: "1=1".to_string(),
        }
    }

    /// Restricts every query with an attribute filter, e.g. `ozoneP IS NOT NULL`.
    pub fn with_where(mut self, where_clause: impl Into<String>) -> Self {
        self.where_clause = where_clause.into();
        self
    }

    /// Builds the query URL; `radius_m` turns the request into a range search.
    fn query_url(&self, point: GeoPoint, radius_m: Option<f64>) -> Result<Url, ServiceError> {
        let mut url = service_url(&self.layer_url, "query")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("geometry", &point_param(point))
                .append_pair("geometryType", "esriGeometryPoint")
                .append_pair("inSR", WGS84)
                .append_pair("spatialRel", "esriSpatialRelIntersects")
                .append_pair("outSR", WGS84)
                .append_pair("outFields", "*")
                .append_pair("returnGeometry", "true")
                .append_pair("where", &self.where_clause);
            if let Some(radius) = radius_m {
                pairs
                    .append_pair("distance", &radius.to_string())
                    .append_pair("units", "esriSRUnit_Meter");
            }
            pairs.append_pair("f", "geojson");
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<Vec<Feature>, ServiceError> {
        let body = self.http_client.get(url.as_str()).await?;
        let features = parse_feature_collection(&body)?;
        debug!(
            service = %self.name,
            features = features.len(),
            "Feature query returned"
        );
        Ok(features)
    }
}

impl<C: AsyncHttpClient> FeatureService for ArcGisFeatureService<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn query_contains(
        &self,
        point: GeoPoint,
    ) -> BoxFuture<'_, Result<Option<Feature>, ServiceError>> {
        Box::pin(async move {
            let url = self.query_url(point, None)?;
            let features = self.fetch(url).await?;
            Ok(features.into_iter().next())
        })
    }

    fn query_nearby(
        &self,
        point: GeoPoint,
        radius_m: f64,
    ) -> BoxFuture<'_, Result<Vec<Feature>, ServiceError>> {
        Box::pin(async move {
            let url = self.query_url(point, Some(radius_m))?;
            self.fetch(url).await
        })
    }
}

/// Kind of raster endpoint, which decides the identify request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterEndpoint {
    /// Dynamic map service (`.../MapServer`)
    MapServer,
    /// Image service (`.../ImageServer`)
    ImageServer,
}

impl RasterEndpoint {
    pub fn keyword(&self) -> &'static str {
        match self {
            RasterEndpoint::MapServer => "mapserver",
            RasterEndpoint::ImageServer => "imageserver",
        }
    }
}

impl std::str::FromStr for RasterEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapserver" => Ok(RasterEndpoint::MapServer),
            "imageserver" => Ok(RasterEndpoint::ImageServer),
            other => Err(format!(
                "unknown endpoint '{}', expected mapserver or imageserver",
                other
            )),
        }
    }
}

/// ArcGIS MapServer / ImageServer sampled with identify.
pub struct ArcGisRasterService<C: AsyncHttpClient> {
    http_client: C,
    name: String,
    service_url: String,
    endpoint: RasterEndpoint,
    extractor: ValueExtractor,
}

impl<C: AsyncHttpClient> ArcGisRasterService<C> {
    pub fn new(
        http_client: C,
        name: impl Into<String>,
        service_url: impl Into<String>,
        endpoint: RasterEndpoint,
    ) -> Self {
        Self {
            http_client,
            name: name.into(),
            service_url: service_url.into(),
            endpoint,
            extractor: ValueExtractor::default(),
        }
    }

    /// Replaces the default pixel-value extraction.
    pub fn with_extractor(mut self, extractor: ValueExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    fn identify_url(&self, point: GeoPoint, tolerance_cells: u32) -> Result<Url, ServiceError> {
        let mut url = service_url(&self.service_url, "identify")?;
        {
            let mut pairs = url.query_pairs_mut();
            match self.endpoint {
                RasterEndpoint::MapServer => {
                    let extent = format!(
                        "{},{},{},{}",
                        point.lon - IDENTIFY_EXTENT_DEG,
                        point.lat - IDENTIFY_EXTENT_DEG,
                        point.lon + IDENTIFY_EXTENT_DEG,
                        point.lat + IDENTIFY_EXTENT_DEG
                    );
                    pairs
                        .append_pair("geometry", &point_param(point))
                        .append_pair("geometryType", "esriGeometryPoint")
                        .append_pair("sr", WGS84)
                        .append_pair("layers", "all")
                        .append_pair("tolerance", &tolerance_cells.to_string())
                        .append_pair("mapExtent", &extent)
                        .append_pair("imageDisplay", IDENTIFY_IMAGE_DISPLAY)
                        .append_pair("returnGeometry", "false");
                }
                RasterEndpoint::ImageServer => {
                    let geometry = serde_json::json!({
                        "x": point.lon,
                        "y": point.lat,
                        "spatialReference": {"wkid": 4326}
                    });
                    pairs
                        .append_pair("geometry", &geometry.to_string())
                        .append_pair("geometryType", "esriGeometryPoint")
                        .append_pair("returnGeometry", "false")
                        .append_pair("returnCatalogItems", "false");
                }
            }
            pairs.append_pair("f", "json");
        }
        Ok(url)
    }
}

impl<C: AsyncHttpClient> RasterService for ArcGisRasterService<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify_at(
        &self,
        point: GeoPoint,
        tolerance_cells: u32,
    ) -> BoxFuture<'_, Result<Option<RasterValue>, ServiceError>> {
        Box::pin(async move {
            let url = self.identify_url(point, tolerance_cells)?;
            let body = self.http_client.get(url.as_str()).await?;
            let value = self.extractor.extract(&body)?;
            debug!(service = %self.name, value = ?value, "Identify returned");
            Ok(value)
        })
    }
}
