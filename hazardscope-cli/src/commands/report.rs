//! Report command - one click, one printed report.

use std::sync::Arc;

use hazardscope::coord::GeoPoint;
use hazardscope::report::ChannelSink;
use tracing::info;

use super::common::{next_report, print_report};
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Arguments for the report command.
pub struct ReportArgs {
    pub lat: f64,
    pub lon: f64,
    /// Print each finding's status after the report
    pub show_status: bool,
}

/// Run the report command.
pub fn run(options: &GlobalOptions, args: ReportArgs) -> Result<(), CliError> {
    let point = GeoPoint::try_new(args.lat, args.lon)?;

    let runner = CliRunner::new(options)?;
    runner.log_startup("report");

    let (sink, mut events) = ChannelSink::new();
    let aggregator = runner.create_aggregator(Arc::new(sink))?;

    let report = runner.runtime().block_on(async move {
        let click = aggregator.click(point);
        next_report(&mut events, click).await
    });

    let report = report.ok_or(CliError::ReportAborted)?;
    info!(click = %report.click, "Report printed");

    print_report(&report);
    if args.show_status {
        for finding in &report.findings {
            match finding.distance_miles() {
                Some(miles) => println!(
                    "  {:<16} {} ({:.2} mi)",
                    finding.source_id, finding.status, miles
                ),
                None => println!("  {:<16} {}", finding.source_id, finding.status),
            }
        }
    }

    Ok(())
}
