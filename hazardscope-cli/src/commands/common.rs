//! Common helpers shared across CLI commands.

use hazardscope::report::{ClickId, Report, SinkEvent};
use tokio::sync::mpsc::UnboundedReceiver;

/// Waits for the report of `click`, skipping loading signals and reports of
/// other clicks. Returns `None` if the sink goes away first.
pub async fn next_report(
    events: &mut UnboundedReceiver<SinkEvent>,
    click: ClickId,
) -> Option<Report> {
    while let Some(event) = events.recv().await {
        if let SinkEvent::Render(report) = event {
            if report.click == click {
                return Some(report);
            }
        }
    }
    None
}

/// Prints a report followed by a separator line.
pub fn print_report(report: &Report) {
    println!("{}", report);
    println!("{}", "-".repeat(40));
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazardscope::coord::GeoPoint;
    use hazardscope::report::{ChannelSink, ReportSink};

    fn report(click: u64) -> Report {
        Report {
            click: ClickId(click),
            point: GeoPoint::new(0.0, 0.0),
            findings: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_next_report_skips_other_clicks() {
        let (sink, mut rx) = ChannelSink::new();
        sink.begin_loading(ClickId(2), GeoPoint::new(0.0, 0.0));
        sink.render(&report(1));
        sink.render(&report(2));

        let found = next_report(&mut rx, ClickId(2)).await.unwrap();
        assert_eq!(found.click, ClickId(2));
    }

    #[tokio::test]
    async fn test_next_report_none_when_sink_dropped() {
        let (sink, mut rx) = ChannelSink::new();
        sink.render(&report(1));
        drop(sink);

        assert!(next_report(&mut rx, ClickId(5)).await.is_none());
    }
}
