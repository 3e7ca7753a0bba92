//! User configuration for hazardscope.
//!
//! Settings live in `~/.hazardscope/config.ini`. The file has one section
//! per concern plus one `[source.<id>]` section per report source:
//!
//! ```ini
//! [report]
//! source_timeout_secs = 20
//!
//! [source.fire]
//! kind = polygon
//! label = Fire Hazard Zone
//! url = https://services1.arcgis.com/.../FeatureServer/0
//! field = FHSZ_Description
//! ```
//!
//! A file without source sections uses [`default_sources`].

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    default_sources, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_FILE_NAME, DEFAULT_NEARBY_RADIUS_M,
    DEFAULT_RING_DIRECTIONS, DEFAULT_RING_MAX_KM, DEFAULT_RING_STEP_KM,
    DEFAULT_RING_TOLERANCE_CELLS, DEFAULT_SOURCE_TIMEOUT_SECS,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, LoggingSettings, PolygonSettings, RasterSettings, ReportSettings,
    RingProbeSettings, SourceKindSettings, SourceSettings,
};
