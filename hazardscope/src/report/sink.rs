//! Report consumers.

use tokio::sync::mpsc;
use tracing::trace;

use super::state::{ClickId, Report};
use crate::coord::GeoPoint;

/// Receives click lifecycle signals and the finished report.
///
/// The aggregator calls these while holding its state lock, so calls for a
/// superseded click never interleave with a newer one. Implementations must
/// not block.
pub trait ReportSink: Send + Sync {
    /// A click started; also replaces any clicked-location marker.
    fn begin_loading(&self, click: ClickId, point: GeoPoint);

    /// All sources reported for `report.click`.
    fn render(&self, report: &Report);

    /// The click's fan-out is over.
    fn end_loading(&self, click: ClickId);
}

/// Sink calls as values.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    BeginLoading { click: ClickId, point: GeoPoint },
    Render(Report),
    EndLoading { click: ClickId },
}

/// Forwards sink calls over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: SinkEvent) {
        // A dropped receiver just means nobody is listening any more
        if self.tx.send(event).is_err() {
            trace!("Report sink receiver dropped");
        }
    }
}

impl ReportSink for ChannelSink {
    fn begin_loading(&self, click: ClickId, point: GeoPoint) {
        self.send(SinkEvent::BeginLoading { click, point });
    }

    fn render(&self, report: &Report) {
        self.send(SinkEvent::Render(report.clone()));
    }

    fn end_loading(&self, click: ClickId) {
        self.send(SinkEvent::EndLoading { click });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        let point = GeoPoint::new(1.0, 2.0);
        let report = Report {
            click: ClickId(1),
            point,
            findings: Vec::new(),
        };

        sink.begin_loading(ClickId(1), point);
        sink.render(&report);
        sink.end_loading(ClickId(1));

        assert_eq!(
            rx.try_recv().unwrap(),
            SinkEvent::BeginLoading {
                click: ClickId(1),
                point
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SinkEvent::Render(report));
        assert_eq!(
            rx.try_recv().unwrap(),
            SinkEvent::EndLoading { click: ClickId(1) }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.end_loading(ClickId(3));
    }
}
