//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants, the built-in California source set,
//! and the `ConfigFile::default()` implementation.

use super::file::config_directory;
use super::settings::*;
use crate::provider::{ExtractionStrategy, RasterEndpoint};
use crate::report::{Classifier, MessageTemplate};

// =============================================================================
// Report and search defaults
// =============================================================================

/// Default per-source lookup deadline (seconds)
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 20;

/// Default per-request HTTP timeout (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default nearest-feature search radius: 50 miles
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 80_467.0;

pub const DEFAULT_RING_DIRECTIONS: u32 = 8;
pub const DEFAULT_RING_STEP_KM: f64 = 2.0;
pub const DEFAULT_RING_MAX_KM: f64 = 14.0;
pub const DEFAULT_RING_TOLERANCE_CELLS: u32 = 2;

/// Log file name inside the config directory's `logs/` folder
pub const DEFAULT_LOG_FILE_NAME: &str = "hazardscope.log";

// =============================================================================
// Built-in sources
// =============================================================================

const FIRE_URL: &str =
    "https://services1.arcgis.com/jUJYIo9tSA7EHvfZ/arcgis/rest/services/FHSZ_SRA_LRA_Combined/FeatureServer/0";
const FLOOD_URL: &str =
    "https://services2.arcgis.com/Uq9r85Potqm3MfRV/ArcGIS/rest/services/S_FLD_HAZ_AR_Reduced_Set_CA_wm/FeatureServer/0";
const LANDSLIDE_URL: &str =
    "https://gis.conservation.ca.gov/server/rest/services/CGS/MS58_LandslideSusceptibility_Classes/MapServer";
const SHAKING_URL: &str =
    "https://gis.conservation.ca.gov/server/rest/services/CGS/MS48_ShakingPotential/MapServer";
const CALENVIROSCREEN_URL: &str =
    "https://services1.arcgis.com/PCHfdHz4GlDNAhBb/arcgis/rest/services/CalEnviroScreen_4_0_Results_/FeatureServer/0";

const FIRE_NOTE: &str = "Fire hazard zones are designated by CAL FIRE to help guide planning \
    and mitigation efforts in wildfire-prone regions.";
const FLOOD_NOTE: &str = "FEMA flood zones help identify areas at high risk for flooding and \
    guide floodplain management decisions across California.";

fn template(text: &str) -> Option<MessageTemplate> {
    // Built-in templates are static text known to parse
    MessageTemplate::parse(text).ok()
}

fn polygon(
    id: &str,
    label: &str,
    url: &str,
    field: &str,
    where_clause: Option<&str>,
    hit_template: &str,
    note: Option<&str>,
) -> SourceSettings {
    SourceSettings {
        id: id.to_string(),
        label: label.to_string(),
        kind: SourceKindSettings::Polygon(PolygonSettings {
            url: url.to_string(),
            field: field.to_string(),
            where_clause: where_clause.map(str::to_string),
            template: template(hit_template),
            note: note.map(str::to_string),
        }),
    }
}

fn landslide_classes() -> Classifier {
    const NUMERALS: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];
    let mut entries = vec![("0".to_string(), "Class 0".to_string())];
    entries.extend(
        NUMERALS
            .iter()
            .enumerate()
            .map(|(i, numeral)| ((i + 1).to_string(), format!("Class {}", numeral))),
    );
    Classifier::Codes(entries)
}

/// The built-in California source set, in report order.
pub fn default_sources() -> Vec<SourceSettings> {
    vec![
        polygon(
            "fire",
            "Fire Hazard Zone",
            FIRE_URL,
            "FHSZ_Description",
            None,
            "This area falls within a {FHSZ_Description} fire hazard zone as defined by the \
             California Department of Forestry and Fire Protection (CAL FIRE).",
            Some(FIRE_NOTE),
        ),
        polygon(
            "flood",
            "Flood Hazard Zone",
            FLOOD_URL,
            "ESRI_SYMBOLOGY",
            None,
            "This location falls within a {ESRI_SYMBOLOGY} as designated by FEMA's National Flood \
             Hazard Layer.",
            Some(FLOOD_NOTE),
        ),
        SourceSettings {
            id: "landslide".to_string(),
            label: "Landslide Susceptibility".to_string(),
            kind: SourceKindSettings::Raster(RasterSettings {
                url: LANDSLIDE_URL.to_string(),
                endpoint: RasterEndpoint::MapServer,
                extract: vec![ExtractionStrategy::PixelValue],
                classifier: landslide_classes(),
                unit: None,
            }),
        },
        SourceSettings {
            id: "shaking".to_string(),
            label: "Shaking Potential".to_string(),
            kind: SourceKindSettings::Raster(RasterSettings {
                url: SHAKING_URL.to_string(),
                endpoint: RasterEndpoint::MapServer,
                extract: vec![ExtractionStrategy::PixelValue],
                classifier: Classifier::Passthrough,
                unit: Some("g".to_string()),
            }),
        },
        polygon(
            "ozone",
            "Ozone (Ground-Level)",
            CALENVIROSCREEN_URL,
            "ozoneP",
            Some("ozoneP IS NOT NULL"),
            "This census tract has a summed concentration of {ozone:.3} ppm. The ozone percentile \
             for this census tract is {ozoneP:.0}, meaning the summed concentration is higher \
             than {ozoneP:.0}% of the census tracts in California. (Data from 2017 to 2019)",
            None,
        ),
        polygon(
            "pm25",
            "PM2.5 Concentration",
            CALENVIROSCREEN_URL,
            "pmP",
            Some("pmP IS NOT NULL"),
            "This census tract has a concentration of {pm:.2} µg/m³. The PM2.5 percentile for \
             this census tract is {pmP:.0}, meaning it is higher than {pmP:.0}% of the census \
             tracts in California. (Data from 2015 to 2017)",
            None,
        ),
        polygon(
            "drinking_water",
            "Drinking Water Contaminants",
            CALENVIROSCREEN_URL,
            "drinkP",
            Some("drinkP IS NOT NULL"),
            "The drinking water contaminant score for this census tract is {drink:.2}, the sum of \
             the contaminant and violation percentiles. The drinking water contaminant \
             percentile is {drinkP:.0}, meaning it is higher than {drinkP:.0}% of census tracts \
             in California. (Data from 2011 to 2019)",
            None,
        ),
    ]
}

// =============================================================================
// ConfigFile::default()
// =============================================================================

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            report: ReportSettings {
                source_timeout_secs: DEFAULT_SOURCE_TIMEOUT_SECS,
                http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
                nearby_radius_m: DEFAULT_NEARBY_RADIUS_M,
            },
            ring_probe: RingProbeSettings {
                directions: DEFAULT_RING_DIRECTIONS,
                step_km: DEFAULT_RING_STEP_KM,
                max_km: DEFAULT_RING_MAX_KM,
                tolerance_cells: DEFAULT_RING_TOLERANCE_CELLS,
            },
            logging: LoggingSettings {
                file: config_directory().join("logs").join(DEFAULT_LOG_FILE_NAME),
            },
            sources: default_sources(),
        }
    }
}
