//! Source factory for building live report sources from configuration.
//!
//! Configuration describes each source declaratively (`[source.<id>]`
//! sections). The factory turns those descriptions into [`SourceConfig`]
//! values wired to ArcGIS adapters sharing a single HTTP client.
//!
//! ```ignore
//! use hazardscope::provider::{AsyncReqwestClient, SourceFactory};
//!
//! let http_client = AsyncReqwestClient::with_timeout(30)?;
//! let factory = SourceFactory::new(http_client);
//! let sources = factory.create_all(&config.sources);
//! ```

use std::sync::Arc;

use super::arcgis::{ArcGisFeatureService, ArcGisRasterService};
use super::extract::ValueExtractor;
use super::http::AsyncHttpClient;
use crate::config::{SourceKindSettings, SourceSettings};
use crate::report::SourceConfig;

/// Factory for creating report sources backed by ArcGIS services.
pub struct SourceFactory<C: AsyncHttpClient + Clone + 'static> {
    http_client: C,
}

impl<C: AsyncHttpClient + Clone + 'static> SourceFactory<C> {
    /// Creates a new factory; every created service shares `http_client`.
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Creates one source from its settings.
    pub fn create(&self, settings: &SourceSettings) -> SourceConfig {
        match &settings.kind {
            SourceKindSettings::Polygon(polygon) => {
                let mut service =
                    ArcGisFeatureService::new(self.http_client.clone(), &settings.id, &polygon.url);
                if let Some(where_clause) = &polygon.where_clause {
                    service = service.with_where(where_clause);
                }

                let mut source = SourceConfig::polygon(
                    &settings.id,
                    &settings.label,
                    Arc::new(service),
                    &polygon.field,
                );
                if let Some(template) = &polygon.template {
                    source = source.with_template(template.clone());
                }
                if let Some(note) = &polygon.note {
                    source = source.with_note(note);
                }
                source
            }
            SourceKindSettings::Raster(raster) => {
                let service = ArcGisRasterService::new(
                    self.http_client.clone(),
                    &settings.id,
                    &raster.url,
                    raster.endpoint,
                )
                .with_extractor(ValueExtractor::new(raster.extract.clone()));

                let mut source = SourceConfig::raster(
                    &settings.id,
                    &settings.label,
                    Arc::new(service),
                    raster.classifier.clone(),
                );
                if let Some(unit) = &raster.unit {
                    source = source.with_unit(unit);
                }
                source
            }
            SourceKindSettings::Static { text } => {
                SourceConfig::fixed(&settings.id, &settings.label, text)
            }
        }
    }

    /// Creates all sources, preserving declared order.
    pub fn create_all(&self, settings: &[SourceSettings]) -> Vec<SourceConfig> {
        settings.iter().map(|s| self.create(s)).collect()
    }
}
