//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::fmt::Write as _;
use std::path::Path;

use super::parser::SOURCE_SECTION_PREFIX;
use super::settings::{
    ConfigFile, PolygonSettings, RasterSettings, SourceKindSettings, SourceSettings,
};
use crate::provider::ExtractionStrategy;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let mut out = format!(
        r#"[report]
; Deadline for one source's whole lookup, in seconds (0 = wait forever)
; A source that misses it reports an error so the report can still complete
source_timeout_secs = {}
; Per-request HTTP timeout in seconds
http_timeout_secs = {}
; Radius for the nearest-zone fallback, in metres (80467 = 50 miles)
nearby_radius_m = {}

[ring_probe]
; Raster fallback: sample rings of points around the click until a value is found
; Number of bearings per ring, starting at north
directions = {}
; Distance between rings in km
step_km = {}
; Outermost ring in km
max_km = {}
; Pixel tolerance passed to identify requests
tolerance_cells = {}

[logging]
; Log file location (default: ~/.hazardscope/logs/hazardscope.log)
file = {}

; Report sources, one [source.<id>] section each, rendered in file order.
; Removing every source section restores the built-in California set.
;
;   kind     - polygon | raster | static
;   label    - heading shown in the report (default: the id)
;
; polygon:  url, field, where (optional), template (optional), note (optional)
;   template placeholders: {{FIELD}} or {{FIELD:.2}} for fixed decimals
; raster:   url, endpoint (mapserver | imageserver), extract, classifier, unit
;   extract    - comma list tried in order: pixel, code, label
;                code needs code_field and codes (1=Low; 2=High)
;                label needs label_field
;   classifier - passthrough | thresholds: 90=Very High; 50=High | codes: 1=Low; 2=High
; static:   text
"#,
        config.report.source_timeout_secs,
        config.report.http_timeout_secs,
        config.report.nearby_radius_m,
        config.ring_probe.directions,
        config.ring_probe.step_km,
        config.ring_probe.max_km,
        config.ring_probe.tolerance_cells,
        path_to_string(&config.logging.file),
    );

    for source in &config.sources {
        out.push('\n');
        write_source(&mut out, source);
    }

    out
}

fn write_source(out: &mut String, source: &SourceSettings) {
    let _ = writeln!(out, "[{}{}]", SOURCE_SECTION_PREFIX, source.id);
    write_key(out, "kind", source.kind.keyword());
    write_key(out, "label", &source.label);

    match &source.kind {
        SourceKindSettings::Polygon(polygon) => write_polygon(out, polygon),
        SourceKindSettings::Raster(raster) => write_raster(out, raster),
        SourceKindSettings::Static { text } => write_key(out, "text", text),
    }
}

fn write_polygon(out: &mut String, polygon: &PolygonSettings) {
    write_key(out, "url", &polygon.url);
    write_key(out, "field", &polygon.field);
    if let Some(where_clause) = &polygon.where_clause {
        write_key(out, "where", where_clause);
    }
    if let Some(template) = &polygon.template {
        write_key(out, "template", template.as_str());
    }
    if let Some(note) = &polygon.note {
        write_key(out, "note", note);
    }
}

fn write_raster(out: &mut String, raster: &RasterSettings) {
    write_key(out, "url", &raster.url);
    write_key(out, "endpoint", raster.endpoint.keyword());

    let keywords: Vec<_> = raster.extract.iter().map(|s| s.keyword()).collect();
    write_key(out, "extract", &keywords.join(", "));
    for strategy in &raster.extract {
        match strategy {
            ExtractionStrategy::CodedAttribute { field, codes } => {
                let table: Vec<_> = codes
                    .iter()
                    .map(|(code, label)| format!("{}={}", code, label))
                    .collect();
                write_key(out, "code_field", field);
                write_key(out, "codes", &table.join("; "));
            }
            ExtractionStrategy::TextLabel { field } => write_key(out, "label_field", field),
            ExtractionStrategy::PixelValue => {}
        }
    }

    write_key(out, "classifier", &raster.classifier.to_string());
    if let Some(unit) = &raster.unit {
        write_key(out, "unit", unit);
    }
}

fn write_key(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{} = {}", key, escape_value(value));
}

/// Escapes characters the INI reader would otherwise interpret.
fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            // A leading quote would start a quoted value
            '"' | '\'' if i == 0 => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
