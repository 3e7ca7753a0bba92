//! Finding texts and attribute templates.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::geometry::{AttributeValue, Feature, UNKNOWN_LABEL};

/// Error parsing a message template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' at byte {0}")]
    Unclosed(usize),

    #[error("empty field name at byte {0}")]
    EmptyField(usize),

    #[error("invalid precision '{spec}' for field {field}")]
    InvalidPrecision { field: String, spec: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field {
        name: String,
        precision: Option<usize>,
    },
}

/// A text with `{FIELD}` / `{FIELD:.N}` placeholders filled from feature
/// attributes. `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl MessageTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut inner = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(pos));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_field(&inner, pos)?);
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Fills the placeholders from `feature`. Missing and null attributes
    /// render as `unknown`.
    pub fn render(&self, feature: &Feature) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { name, precision } => {
                    out.push_str(&render_value(feature.attribute(name), *precision))
                }
            }
        }
        out
    }
}

fn parse_field(inner: &str, pos: usize) -> Result<Segment, TemplateError> {
    let (name, spec) = match inner.split_once(':') {
        Some((name, spec)) => (name.trim(), Some(spec.trim())),
        None => (inner.trim(), None),
    };
    if name.is_empty() {
        return Err(TemplateError::EmptyField(pos));
    }

    let precision = match spec {
        None => None,
        Some(spec) => Some(
            spec.strip_prefix('.')
                .and_then(|digits| digits.parse::<usize>().ok())
                .ok_or_else(|| TemplateError::InvalidPrecision {
                    field: name.to_string(),
                    spec: spec.to_string(),
                })?,
        ),
    };

    Ok(Segment::Field {
        name: name.to_string(),
        precision,
    })
}

fn render_value(value: Option<&AttributeValue>, precision: Option<usize>) -> String {
    match (value, precision) {
        (None, _) | (Some(AttributeValue::Null), _) => UNKNOWN_LABEL.to_string(),
        (Some(v), Some(p)) => match v.as_f64() {
            // Whole numbers round half away from zero, not half to even
            Some(n) if p == 0 => format!("{:.0}", n.round()),
            Some(n) => format!("{:.*}", p, n),
            None => v.to_string(),
        },
        (Some(v), None) => v.to_string(),
    }
}

impl FromStr for MessageTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// Finding texts. Each finding starts with the source label so the joined
// report reads as one entry per source.

pub(crate) fn hit(label: &str, value: &str) -> String {
    format!("{}: {}", label, value)
}

pub(crate) fn nearest_polygon(label: &str, value: &str, distance_miles: f64) -> String {
    format!(
        "Nearest {}: {}\nDistance: {:.2} mi",
        label, value, distance_miles
    )
}

pub(crate) fn no_nearby_zones(label: &str) -> String {
    format!("{}: No nearby zones", label)
}

pub(crate) fn unmeasurable(label: &str) -> String {
    format!("{}: Unable to measure distance", label)
}

pub(crate) fn nearest_raster(
    label: &str,
    value: &str,
    distance_km: f64,
    bearing_deg: f64,
) -> String {
    format!(
        "Nearest {}: {}\nNearest value at {:.2} km {}",
        label,
        value,
        distance_km,
        compass_point(bearing_deg)
    )
}

pub(crate) fn no_mapped_value(label: &str) -> String {
    format!("{}: No mapped value nearby", label)
}

pub(crate) fn error(label: &str, reason: &str) -> String {
    format!("{}: Error ({})", label, reason)
}

pub(crate) fn with_note(text: String, note: Option<&str>) -> String {
    match note {
        Some(note) => format!("{}\nNote: {}", text, note),
        None => text,
    }
}

/// Eight-wind compass name for a bearing in degrees.
pub fn compass_point(bearing_deg: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = (bearing_deg.rem_euclid(360.0) / 45.0).round() as usize % 8;
    POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Attributes, Geometry};

    fn tract() -> Feature {
        Feature::new(Geometry::Unsupported("null".to_string()), Attributes::new())
            .with_attribute("ozone", 0.0612345)
            .with_attribute("ozoneP", 84.6)
            .with_attribute("County", "Fresno")
            .with_attribute("drink", AttributeValue::Null)
    }

    #[test]
    fn test_render_fields_and_precision() {
        let t =
            MessageTemplate::parse("{ozone:.3} ppm, percentile {ozoneP:.0} in {County}").unwrap();
        assert_eq!(t.render(&tract()), "0.061 ppm, percentile 85 in Fresno");
    }

    #[test]
    fn test_whole_number_precision_rounds_half_up() {
        let t = MessageTemplate::parse("{ozoneP:.0} / {pm:.0} / {pm:.1}").unwrap();
        let feature = tract()
            .with_attribute("ozoneP", 84.5)
            .with_attribute("pm", 2.5);
        assert_eq!(t.render(&feature), "85 / 3 / 2.5");
    }

    #[test]
    fn test_missing_and_null_render_unknown() {
        let t = MessageTemplate::parse("{drink:.2} / {pm} / {drink}").unwrap();
        assert_eq!(t.render(&tract()), "unknown / unknown / unknown");
    }

    #[test]
    fn test_precision_on_text_keeps_text() {
        let t = MessageTemplate::parse("{County:.2}").unwrap();
        assert_eq!(t.render(&tract()), "Fresno");
    }

    #[test]
    fn test_escaped_braces() {
        let t = MessageTemplate::parse("{{literal}} {County}").unwrap();
        assert_eq!(t.render(&tract()), "{literal} Fresno");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            MessageTemplate::parse("a {b"),
            Err(TemplateError::Unclosed(2))
        );
        assert_eq!(
            MessageTemplate::parse("{}"),
            Err(TemplateError::EmptyField(0))
        );
        assert!(matches!(
            MessageTemplate::parse("{x:3}"),
            Err(TemplateError::InvalidPrecision { .. })
        ));
    }

    #[test]
    fn test_display_is_source() {
        let text = "Zone {FHSZ_Description}";
        assert_eq!(MessageTemplate::parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn test_texts() {
        assert_eq!(
            nearest_polygon("Flood Hazard Zone", "AE", 1.2427),
            "Nearest Flood Hazard Zone: AE\nDistance: 1.24 mi"
        );
        assert_eq!(
            with_note(no_nearby_zones("Fire Hazard Zone"), Some("See CAL FIRE.")),
            "Fire Hazard Zone: No nearby zones\nNote: See CAL FIRE."
        );
        assert_eq!(
            nearest_raster("Shaking Potential", "Strong", 4.0, 90.0),
            "Nearest Shaking Potential: Strong\nNearest value at 4.00 km E"
        );
    }

    #[test]
    fn test_compass_point() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(44.0), "NE");
        assert_eq!(compass_point(225.0), "SW");
        assert_eq!(compass_point(359.0), "N");
        assert_eq!(compass_point(-90.0), "W");
    }
}
