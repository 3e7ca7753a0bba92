//! Raster identify response decoding.
//!
//! Raster services report a sample in one of three shapes: a direct pixel
//! value, a class code that needs a lookup table, or a text label. Rather
//! than guessing with nested conditionals, a [`ValueExtractor`] holds an
//! ordered list of [`ExtractionStrategy`] values and returns the first one
//! that yields a value.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::types::{RasterValue, ServiceError};

/// Attribute names under which identify responses carry a pixel value.
const PIXEL_KEYS: &[&str] = &["value", "Pixel Value", "Stretch.Pixel Value"];

/// One way of reading a value out of an identify record.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionStrategy {
    /// Direct numeric sample (`value`, `Pixel Value`, `Stretch.Pixel Value`)
    PixelValue,
    /// Integer class code in `field`, translated through `codes`
    CodedAttribute {
        field: String,
        codes: BTreeMap<i64, String>,
    },
    /// Text label stored in `field`
    TextLabel { field: String },
}

impl ExtractionStrategy {
    /// Configuration keyword for this strategy.
    pub fn keyword(&self) -> &'static str {
        match self {
            ExtractionStrategy::PixelValue => "pixel",
            ExtractionStrategy::CodedAttribute { .. } => "code",
            ExtractionStrategy::TextLabel { .. } => "label",
        }
    }

    /// Applies the strategy to a single identify record.
    ///
    /// `Ok(None)` means the record has nothing for this strategy; `Err` means
    /// the expected field is present but cannot be interpreted.
    pub fn apply(&self, record: &Map<String, Value>) -> Result<Option<RasterValue>, ServiceError> {
        match self {
            ExtractionStrategy::PixelValue => {
                for key in PIXEL_KEYS {
                    if let Some(value) = record.get(*key) {
                        return parse_pixel(key, value);
                    }
                }
                Ok(None)
            }
            ExtractionStrategy::CodedAttribute { field, codes } => {
                let Some(value) = record.get(field) else {
                    return Ok(None);
                };
                let code = match value {
                    Value::Null => return Ok(None),
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) if is_nodata(s) => return Ok(None),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                let code = code
                    .filter(|c| c.fract() == 0.0)
                    .map(|c| c as i64)
                    .ok_or_else(|| {
                        ServiceError::MalformedResponse(format!(
                            "{} is not an integer class code: {}",
                            field, value
                        ))
                    })?;
                codes
                    .get(&code)
                    .map(|label| Some(RasterValue::Label(label.clone())))
                    .ok_or_else(|| {
                        ServiceError::MalformedResponse(format!(
                            "class code {} in {} has no lookup entry",
                            code, field
                        ))
                    })
            }
            ExtractionStrategy::TextLabel { field } => match record.get(field) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) if is_nodata(s) => Ok(None),
                Some(Value::String(s)) => Ok(Some(RasterValue::Label(s.trim().to_string()))),
                Some(Value::Number(n)) => Ok(Some(RasterValue::Label(n.to_string()))),
                Some(other) => Err(ServiceError::MalformedResponse(format!(
                    "{} is not a text label: {}",
                    field, other
                ))),
            },
        }
    }
}

/// Ordered list of extraction strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueExtractor {
    strategies: Vec<ExtractionStrategy>,
}

impl Default for ValueExtractor {
    fn default() -> Self {
        Self::new(vec![ExtractionStrategy::PixelValue])
    }
}

impl ValueExtractor {
    pub fn new(strategies: Vec<ExtractionStrategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[ExtractionStrategy] {
        &self.strategies
    }

    /// Decodes an identify response body.
    ///
    /// Strategies are tried in order, each against every record; the first
    /// value found wins. If nothing is found but some strategy hit an
    /// uninterpretable value, that first failure is returned.
    pub fn extract(&self, body: &[u8]) -> Result<Option<RasterValue>, ServiceError> {
        let doc: Value = serde_json::from_slice(body)
            .map_err(|e| ServiceError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        if let Some(error) = doc.get("error") {
            return Err(ServiceError::Remote {
                code: error
                    .get("code")
                    .and_then(Value::as_i64)
                    .unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        let records = identify_records(&doc)?;
        let mut first_failure = None;

        for strategy in &self.strategies {
            for record in &records {
                match strategy.apply(record) {
                    Ok(Some(value)) => return Ok(Some(value)),
                    Ok(None) => {}
                    Err(e) => {
                        first_failure.get_or_insert(e);
                    }
                }
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}

/// Collects the attribute records of a MapServer or ImageServer identify
/// response.
fn identify_records(doc: &Value) -> Result<Vec<&Map<String, Value>>, ServiceError> {
    if let Some(results) = doc.get("results") {
        let results = results.as_array().ok_or_else(|| {
            ServiceError::MalformedResponse("'results' is not an array".to_string())
        })?;
        return Ok(results
            .iter()
            .filter_map(|r| r.get("attributes").and_then(Value::as_object))
            .collect());
    }

    // ImageServer responses carry the sample at the top level
    match doc.as_object() {
        Some(object) if object.contains_key("value") => Ok(vec![object]),
        _ => Err(ServiceError::MalformedResponse(
            "identify response has neither 'results' nor 'value'".to_string(),
        )),
    }
}

fn parse_pixel(key: &str, value: &Value) -> Result<Option<RasterValue>, ServiceError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64().map(RasterValue::Number)),
        Value::String(s) if is_nodata(s) => Ok(None),
        Value::String(s) => {
            // Multi-band samples are space or comma separated; the first band is the value
            let first = s
                .split(|c: char| c == ',' || c.is_whitespace())
                .find(|part| !part.is_empty())
                .unwrap_or_default();
            first
                .parse::<f64>()
                .map(|n| Some(RasterValue::Number(n)))
                .map_err(|_| {
                    ServiceError::MalformedResponse(format!("{} is not numeric: '{}'", key, s))
                })
        }
        other => Err(ServiceError::MalformedResponse(format!("{} is not numeric: {}", key, other))),
    }
}

fn is_nodata(s: &str) -> bool {
    let s = s.trim();
    s.is_empty()
        || s.eq_ignore_ascii_case("nodata")
        || s.eq_ignore_ascii_case("null")
        || s.eq_ignore_ascii_case("none")
}
