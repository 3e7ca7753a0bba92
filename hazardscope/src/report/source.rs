//! Report source definitions.

use std::fmt;
use std::sync::Arc;

use super::classify::Classifier;
use super::format::MessageTemplate;
use crate::provider::{FeatureService, RasterService};

/// A polygon dataset queried for containment, with nearest-feature fallback.
#[derive(Clone)]
pub struct PolygonSource {
    pub service: Arc<dyn FeatureService>,
    /// Attribute shown for hits and nearest matches
    pub contains_field: String,
    /// Hit text; defaults to the `contains_field` value
    pub template: Option<MessageTemplate>,
    /// Appended to fallback findings
    pub note: Option<String>,
}

/// A raster dataset sampled at the point, with ring probe fallback.
#[derive(Clone)]
pub struct RasterSource {
    pub service: Arc<dyn RasterService>,
    pub classifier: Classifier,
    /// Appended to unclassified numeric values
    pub unit: Option<String>,
}

#[derive(Clone)]
pub enum SourceKind {
    Polygon(PolygonSource),
    Raster(RasterSource),
    /// Fixed text, no lookup
    Static { text: String },
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Polygon(_) => "polygon",
            SourceKind::Raster(_) => "raster",
            SourceKind::Static { .. } => "static",
        }
    }
}

/// One configured report source. Declaration order is report order.
#[derive(Clone)]
pub struct SourceConfig {
    pub id: String,
    /// Display name used in finding texts
    pub label: String,
    pub kind: SourceKind,
}

impl SourceConfig {
    pub fn polygon(
        id: impl Into<String>,
        label: impl Into<String>,
        service: Arc<dyn FeatureService>,
        contains_field: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: SourceKind::Polygon(PolygonSource {
                service,
                contains_field: contains_field.into(),
                template: None,
                note: None,
            }),
        }
    }

    pub fn raster(
        id: impl Into<String>,
        label: impl Into<String>,
        service: Arc<dyn RasterService>,
        classifier: Classifier,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: SourceKind::Raster(RasterSource {
                service,
                classifier,
                unit: None,
            }),
        }
    }

    pub fn fixed(id: impl Into<String>, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: SourceKind::Static { text: text.into() },
        }
    }

    /// Sets the hit template. No effect on non-polygon sources.
    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        if let SourceKind::Polygon(polygon) = &mut self.kind {
            polygon.template = Some(template);
        }
        self
    }

    /// Sets the fallback note. No effect on non-polygon sources.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        if let SourceKind::Polygon(polygon) = &mut self.kind {
            polygon.note = Some(note.into());
        }
        self
    }

    /// Sets the value unit. No effect on non-raster sources.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        if let SourceKind::Raster(raster) = &mut self.kind {
            raster.unit = Some(unit.into());
        }
        self
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SourceConfig");
        s.field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind.as_str());
        match &self.kind {
            SourceKind::Polygon(p) => s
                .field("service", &p.service.name())
                .field("contains_field", &p.contains_field),
            SourceKind::Raster(r) => s
                .field("service", &r.service.name())
                .field("classifier", &r.classifier),
            SourceKind::Static { text } => s.field("text", text),
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MemoryFeatureService, MemoryRasterService};

    #[test]
    fn test_builders_apply_to_matching_kind() {
        let polygon = SourceConfig::polygon(
            "fire",
            "Fire Hazard Zone",
            Arc::new(MemoryFeatureService::new("fire", Vec::new())),
            "FHSZ_Description",
        )
        .with_note("See CAL FIRE.")
        .with_unit("ignored");

        match &polygon.kind {
            SourceKind::Polygon(p) => assert_eq!(p.note.as_deref(), Some("See CAL FIRE.")),
            _ => panic!("expected polygon source"),
        }

        let raster = SourceConfig::raster(
            "shaking",
            "Shaking Potential",
            Arc::new(MemoryRasterService::new("shaking", |_| None)),
            Classifier::Passthrough,
        )
        .with_unit("g")
        .with_note("ignored");

        match &raster.kind {
            SourceKind::Raster(r) => assert_eq!(r.unit.as_deref(), Some("g")),
            _ => panic!("expected raster source"),
        }
    }

    #[test]
    fn test_debug_names_service() {
        let source = SourceConfig::polygon(
            "flood",
            "Flood Hazard Zone",
            Arc::new(MemoryFeatureService::new("fema-nfhl", Vec::new())),
            "ESRI_SYMBOLOGY",
        );
        let debug = format!("{:?}", source);
        assert!(debug.contains("fema-nfhl"));
        assert!(debug.contains("polygon"));
    }
}
