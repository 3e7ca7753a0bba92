//! Mapping of raw raster values to display labels.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::provider::RasterValue;

/// Turns a raster sample into the text shown in a report.
///
/// Textual form (used in configuration):
///
/// - `passthrough`
/// - `thresholds: 90=Very High; 70=High; 0=Low`
/// - `codes: 1=Low; 2=Moderate; 3=High`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Classifier {
    /// Show the value as-is
    #[default]
    Passthrough,
    /// Largest threshold not above the value wins; kept sorted descending
    Thresholds(Vec<(f64, String)>),
    /// Exact match on an integer code or a text value
    Codes(Vec<(String, String)>),
}

impl Classifier {
    /// Builds a threshold classifier, sorting thresholds descending.
    pub fn thresholds(mut entries: Vec<(f64, String)>) -> Self {
        entries.sort_by(|a, b| b.0.total_cmp(&a.0));
        Classifier::Thresholds(entries)
    }

    /// Classifies `value`. Values that match nothing fall back to the raw
    /// value, with `unit` appended to numbers.
    pub fn classify(&self, value: &RasterValue, unit: Option<&str>) -> String {
        let matched = match self {
            Classifier::Passthrough => None,
            Classifier::Thresholds(entries) => value.as_f64().and_then(|n| {
                entries
                    .iter()
                    .find(|(threshold, _)| *threshold <= n)
                    .map(|(_, label)| label.clone())
            }),
            Classifier::Codes(entries) => {
                let key = code_key(value);
                entries
                    .iter()
                    .find(|(code, _)| *code == key)
                    .map(|(_, label)| label.clone())
            }
        };

        matched.unwrap_or_else(|| raw_text(value, unit))
    }
}

fn code_key(value: &RasterValue) -> String {
    match value {
        RasterValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        RasterValue::Number(n) => n.to_string(),
        RasterValue::Label(s) => s.trim().to_string(),
    }
}

fn raw_text(value: &RasterValue, unit: Option<&str>) -> String {
    match (value, unit) {
        (RasterValue::Number(n), Some(unit)) => format!("{} {}", n, unit),
        _ => value.to_string(),
    }
}

/// Error parsing a classifier description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ClassifierParseError(pub String);

fn parse_entries(body: &str) -> Result<Vec<(String, String)>, ClassifierParseError> {
    body.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, label) = entry.split_once('=').ok_or_else(|| {
                ClassifierParseError(format!("entry '{}' is not of the form key=label", entry))
            })?;
            let (key, label) = (key.trim(), label.trim());
            if key.is_empty() || label.is_empty() {
                return Err(ClassifierParseError(format!(
                    "entry '{}' has an empty key or label",
                    entry
                )));
            }
            Ok((key.to_string(), label.to_string()))
        })
        .collect()
}

impl FromStr for Classifier {
    type Err = ClassifierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (kind, body) = match s.split_once(':') {
            Some((kind, body)) => (kind.trim(), body),
            None => (s, ""),
        };

        match kind.to_ascii_lowercase().as_str() {
            "passthrough" | "" => Ok(Classifier::Passthrough),
            "thresholds" => {
                let entries = parse_entries(body)?
                    .into_iter()
                    .map(|(key, label)| {
                        key.parse::<f64>()
                            .ok()
                            .filter(|t| t.is_finite())
                            .map(|t| (t, label))
                            .ok_or_else(|| {
                                ClassifierParseError(format!("threshold '{}' is not a number", key))
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if entries.is_empty() {
                    return Err(ClassifierParseError("thresholds list is empty".to_string()));
                }
                Ok(Classifier::thresholds(entries))
            }
            "codes" => {
                let entries = parse_entries(body)?;
                if entries.is_empty() {
                    return Err(ClassifierParseError("codes list is empty".to_string()));
                }
                Ok(Classifier::Codes(entries))
            }
            other => Err(ClassifierParseError(format!(
                "unknown classifier '{}', expected passthrough, thresholds or codes",
                other
            ))),
        }
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classifier::Passthrough => f.write_str("passthrough"),
            Classifier::Thresholds(entries) => {
                let body: Vec<String> = entries
                    .iter()
                    .map(|(t, label)| format!("{}={}", t, label))
                    .collect();
                write!(f, "thresholds: {}", body.join("; "))
            }
            Classifier::Codes(entries) => {
                let body: Vec<String> = entries
                    .iter()
                    .map(|(code, label)| format!("{}={}", code, label))
                    .collect();
                write!(f, "codes: {}", body.join("; "))
            }
        }
    }
}
