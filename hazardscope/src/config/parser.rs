//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::*;
use crate::provider::{ExtractionStrategy, RasterEndpoint};
use crate::report::{Classifier, MessageTemplate};

/// Prefix of per-source section names.
pub(super) const SOURCE_SECTION_PREFIX: &str = "source.";

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
/// Source sections replace the built-in source set as a whole.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [report] section
    if let Some(section) = ini.section(Some("report")) {
        if let Some(v) = section.get("source_timeout_secs") {
            config.report.source_timeout_secs = parse_number(
                "report",
                "source_timeout_secs",
                v,
                "must be a non-negative integer (seconds, 0 disables)",
            )?;
        }
        if let Some(v) = section.get("http_timeout_secs") {
            let secs: u64 = parse_number(
                "report",
                "http_timeout_secs",
                v,
                "must be a positive integer (seconds)",
            )?;
            if secs == 0 {
                return Err(invalid("report", "http_timeout_secs", v, "must be greater than 0"));
            }
            config.report.http_timeout_secs = secs;
        }
        if let Some(v) = section.get("nearby_radius_m") {
            let radius: f64 =
                parse_number("report", "nearby_radius_m", v, "must be a number (metres)")?;
            if !(radius.is_finite() && radius > 0.0) {
                return Err(invalid("report", "nearby_radius_m", v, "must be greater than 0"));
            }
            config.report.nearby_radius_m = radius;
        }
    }

    // [ring_probe] section
    if let Some(section) = ini.section(Some("ring_probe")) {
        if let Some(v) = section.get("directions") {
            let directions: u32 =
                parse_number("ring_probe", "directions", v, "must be a positive integer")?;
            if directions == 0 {
                return Err(invalid("ring_probe", "directions", v, "must be at least 1"));
            }
            config.ring_probe.directions = directions;
        }
        if let Some(v) = section.get("step_km") {
            let step: f64 = parse_number("ring_probe", "step_km", v, "must be a number (km)")?;
            if !(step.is_finite() && step > 0.0) {
                return Err(invalid("ring_probe", "step_km", v, "must be greater than 0"));
            }
            config.ring_probe.step_km = step;
        }
        if let Some(v) = section.get("max_km") {
            let max: f64 = parse_number("ring_probe", "max_km", v, "must be a number (km)")?;
            if !max.is_finite() {
                return Err(invalid("ring_probe", "max_km", v, "must be finite"));
            }
            config.ring_probe.max_km = max;
        }
        if let Some(v) = section.get("tolerance_cells") {
            config.ring_probe.tolerance_cells = parse_number(
                "ring_probe",
                "tolerance_cells",
                v,
                "must be a non-negative integer",
            )?;
        }
    }
    if config.ring_probe.max_km < config.ring_probe.step_km {
        return Err(invalid(
            "ring_probe",
            "max_km",
            &config.ring_probe.max_km.to_string(),
            format!("must be at least step_km ({})", config.ring_probe.step_km),
        ));
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    // [source.<id>] sections, in file order
    let mut sources = Vec::new();
    let mut seen = HashSet::new();
    for (name, properties) in ini.iter() {
        let Some(name) = name else { continue };
        let Some(id) = name.strip_prefix(SOURCE_SECTION_PREFIX) else {
            continue;
        };
        let id = id.trim();
        if id.is_empty() {
            return Err(invalid(name, "", "", "source section needs an id after 'source.'"));
        }
        if !seen.insert(id.to_string()) {
            return Err(invalid(name, "", "", "duplicate source id"));
        }
        sources.push(parse_source(name, id, properties)?);
    }
    if !sources.is_empty() {
        config.sources = sources;
    }

    Ok(config)
}

fn optional(properties: &Properties, key: &str) -> Option<String> {
    properties
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(section: &str, properties: &Properties, key: &str) -> Result<String, ConfigFileError> {
    optional(properties, key).ok_or_else(|| invalid(section, key, "", "is required"))
}

fn parse_source(
    section: &str,
    id: &str,
    properties: &Properties,
) -> Result<SourceSettings, ConfigFileError> {
    let label = optional(properties, "label").unwrap_or_else(|| id.to_string());
    let kind = required(section, properties, "kind")?;

    let kind = match kind.to_lowercase().as_str() {
        "polygon" => SourceKindSettings::Polygon(parse_polygon(section, properties)?),
        "raster" => SourceKindSettings::Raster(parse_raster(section, properties)?),
        "static" => SourceKindSettings::Static {
            text: required(section, properties, "text")?,
        },
        _ => {
            return Err(invalid(
                section,
                "kind",
                &kind,
                "must be one of: polygon, raster, static",
            ))
        }
    };

    Ok(SourceSettings {
        id: id.to_string(),
        label,
        kind,
    })
}

fn parse_polygon(
    section: &str,
    properties: &Properties,
) -> Result<PolygonSettings, ConfigFileError> {
    let template = match optional(properties, "template") {
        Some(text) => Some(
            MessageTemplate::parse(&text)
                .map_err(|e| invalid(section, "template", &text, e.to_string()))?,
        ),
        None => None,
    };

    Ok(PolygonSettings {
        url: required(section, properties, "url")?,
        field: required(section, properties, "field")?,
        where_clause: optional(properties, "where"),
        template,
        note: optional(properties, "note"),
    })
}

fn parse_raster(section: &str, properties: &Properties) -> Result<RasterSettings, ConfigFileError> {
    let endpoint = match optional(properties, "endpoint") {
        Some(v) => v
            .parse::<RasterEndpoint>()
            .map_err(|reason| invalid(section, "endpoint", &v, reason))?,
        None => RasterEndpoint::MapServer,
    };

    let classifier = match optional(properties, "classifier") {
        Some(v) => v
            .parse::<Classifier>()
            .map_err(|e| invalid(section, "classifier", &v, e.to_string()))?,
        None => Classifier::Passthrough,
    };

    let extract_list = optional(properties, "extract").unwrap_or_else(|| "pixel".to_string());
    let mut extract = Vec::new();
    for keyword in extract_list
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
    {
        let strategy = match keyword.to_lowercase().as_str() {
            "pixel" => ExtractionStrategy::PixelValue,
            "code" => {
                let codes_text = required(section, properties, "codes")?;
                ExtractionStrategy::CodedAttribute {
                    field: required(section, properties, "code_field")?,
                    codes: parse_codes(&codes_text)
                        .map_err(|reason| invalid(section, "codes", &codes_text, reason))?,
                }
            }
            "label" => ExtractionStrategy::TextLabel {
                field: required(section, properties, "label_field")?,
            },
            _ => {
                return Err(invalid(
                    section,
                    "extract",
                    &extract_list,
                    "entries must be one of: pixel, code, label",
                ))
            }
        };
        extract.push(strategy);
    }
    if extract.is_empty() {
        return Err(invalid(
            section,
            "extract",
            &extract_list,
            "needs at least one strategy",
        ));
    }

    Ok(RasterSettings {
        url: required(section, properties, "url")?,
        endpoint,
        extract,
        classifier,
        unit: optional(properties, "unit"),
    })
}

/// Parses a code table like `1=Low; 2=Moderate`.
pub(super) fn parse_codes(text: &str) -> Result<BTreeMap<i64, String>, String> {
    let mut codes = BTreeMap::new();
    for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (code, label) = entry
            .split_once('=')
            .ok_or_else(|| format!("entry '{}' is not of the form code=label", entry))?;
        let code: i64 = code
            .trim()
            .parse()
            .map_err(|_| format!("code '{}' is not an integer", code.trim()))?;
        codes.insert(code, label.trim().to_string());
    }
    if codes.is_empty() {
        return Err("code table is empty".to_string());
    }
    Ok(codes)
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
