//! Spatial service adapters
//!
//! This module wraps remote datasets behind two traits: [`FeatureService`]
//! for polygon layers (containment and range queries) and [`RasterService`]
//! for rasters (point identify). Live implementations talk to ArcGIS REST
//! endpoints through an [`AsyncHttpClient`]; in-memory implementations serve
//! fixtures for tests and offline runs.
//!
//! # Factory Pattern
//!
//! For building every configured source at once, use the [`SourceFactory`]:
//!
//! ```ignore
//! use hazardscope::provider::{AsyncReqwestClient, SourceFactory};
//!
//! let factory = SourceFactory::new(AsyncReqwestClient::new()?);
//! let sources = factory.create_all(&config.sources);
//! ```

mod arcgis;
mod extract;
mod factory;
mod http;
mod memory;
mod types;

pub use arcgis::{ArcGisFeatureService, ArcGisRasterService, RasterEndpoint};
pub use extract::{ExtractionStrategy, ValueExtractor};
pub use factory::SourceFactory;
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_HTTP_TIMEOUT_SECS};
pub use memory::{MemoryFeatureService, MemoryRasterService, PanickingService, StalledService};
pub use types::{FeatureService, RasterService, RasterValue, ServiceError};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
