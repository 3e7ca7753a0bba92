//! Hazard report aggregation.
//!
//! A click fans out to one lookup per configured source. Each lookup
//! resolves to exactly one [`Finding`] (hit, fallback, empty or error), and
//! the [`HazardReportAggregator`] renders the [`Report`] to its
//! [`ReportSink`] once every source has reported.
//!
//! # Example
//!
//! ```ignore
//! use hazardscope::report::{AggregatorSettings, ChannelSink, HazardReportAggregator};
//!
//! let (sink, mut events) = ChannelSink::new();
//! let settings = AggregatorSettings::default();
//! let aggregator = HazardReportAggregator::new(sources, settings, Arc::new(sink));
//! aggregator.click(GeoPoint::new(37.77, -122.42));
//! ```

mod aggregator;
mod classify;
mod finding;
mod format;
mod lookup;
mod sink;
mod source;
mod state;

pub use aggregator::{Delivery, HazardReportAggregator};
pub use classify::{Classifier, ClassifierParseError};
pub use finding::{Finding, FindingStatus};
pub use format::{compass_point, MessageTemplate, TemplateError};
pub use lookup::{lookup, AggregatorSettings, LookupError, DEFAULT_SOURCE_TIMEOUT};
pub use sink::{ChannelSink, ReportSink, SinkEvent};
pub use source::{PolygonSource, RasterSource, SourceConfig, SourceKind};
pub use state::{ClickId, Phase, RecordError, Report, ReportState};
