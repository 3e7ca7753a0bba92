//! hazardscope - hazard site reports for a clicked map location
//!
//! A click on the map fans out to every configured hazard source (fire and
//! flood zones, landslide and shaking rasters, air and water quality tracts).
//! Each source answers with a hit, a nearest-zone fallback, an empty result or
//! an error, and the answers are rendered together as one report once every
//! source has reported.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use hazardscope::config::ConfigFile;
//! use hazardscope::coord::GeoPoint;
//! use hazardscope::provider::{AsyncReqwestClient, SourceFactory};
//! use hazardscope::report::{ChannelSink, HazardReportAggregator};
//!
//! let config = ConfigFile::load()?;
//! let client = AsyncReqwestClient::with_timeout(config.report.http_timeout_secs)?;
//! let sources = SourceFactory::new(client).create_all(&config.sources);
//!
//! let (sink, mut events) = ChannelSink::new();
//! let settings = config.aggregator_settings();
//! let aggregator = HazardReportAggregator::new(sources, settings, Arc::new(sink));
//! aggregator.click(GeoPoint::new(34.1, -118.2));
//! ```

pub mod config;
pub mod coord;
pub mod geometry;
pub mod logging;
pub mod provider;
pub mod report;
pub mod search;

/// Version of the hazardscope library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_not_empty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_coord_module_exists() {
        use crate::coord::GeoPoint;
        let result = GeoPoint::try_new(40.7128, -74.0060);
        assert!(result.is_ok());
    }
}
