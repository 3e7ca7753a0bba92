//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::provider::{ExtractionStrategy, RasterEndpoint};
use crate::report::{AggregatorSettings, Classifier, MessageTemplate};
use crate::search::RingProbe;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Report timing and search radius
    pub report: ReportSettings,
    /// Raster fallback search
    pub ring_probe: RingProbeSettings,
    /// Logging settings
    pub logging: LoggingSettings,
    /// Report sources in declared order
    pub sources: Vec<SourceSettings>,
}

impl ConfigFile {
    /// Lookup settings for the aggregator.
    pub fn aggregator_settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            source_timeout: match self.report.source_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            nearby_radius_m: self.report.nearby_radius_m,
            ring_probe: RingProbe {
                directions: self.ring_probe.directions,
                step_km: self.ring_probe.step_km,
                max_km: self.ring_probe.max_km,
                tolerance_cells: self.ring_probe.tolerance_cells,
            },
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    /// Deadline for one source's whole lookup, 0 = none
    pub source_timeout_secs: u64,
    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,
    /// Nearest-feature search radius in metres
    pub nearby_radius_m: f64,
}

/// `[ring_probe]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RingProbeSettings {
    pub directions: u32,
    pub step_km: f64,
    pub max_km: f64,
    pub tolerance_cells: u32,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

/// One `[source.<id>]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub id: String,
    pub label: String,
    pub kind: SourceKindSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceKindSettings {
    Polygon(PolygonSettings),
    Raster(RasterSettings),
    Static { text: String },
}

impl SourceKindSettings {
    pub fn keyword(&self) -> &'static str {
        match self {
            SourceKindSettings::Polygon(_) => "polygon",
            SourceKindSettings::Raster(_) => "raster",
            SourceKindSettings::Static { .. } => "static",
        }
    }

    /// Service URL, for kinds that have one.
    pub fn url(&self) -> Option<&str> {
        match self {
            SourceKindSettings::Polygon(p) => Some(&p.url),
            SourceKindSettings::Raster(r) => Some(&r.url),
            SourceKindSettings::Static { .. } => None,
        }
    }
}

/// Feature layer source (`kind = polygon`).
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonSettings {
    /// Layer URL, ending in the layer id
    pub url: String,
    /// Attribute shown for hits and nearest matches
    pub field: String,
    /// Attribute filter applied to every query
    pub where_clause: Option<String>,
    pub template: Option<MessageTemplate>,
    pub note: Option<String>,
}

/// Raster source (`kind = raster`).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSettings {
    /// MapServer or ImageServer URL
    pub url: String,
    pub endpoint: RasterEndpoint,
    /// Extraction strategies in the order they are tried
    pub extract: Vec<ExtractionStrategy>,
    pub classifier: Classifier,
    pub unit: Option<String>,
}
