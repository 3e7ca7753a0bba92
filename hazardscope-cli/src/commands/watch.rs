//! Watch command - a stream of clicks read from stdin.
//!
//! Each `lat,lon` line is a new click that supersedes the previous one, the
//! same way a second map click abandons an unfinished report. Reports are
//! printed as they flush; superseded clicks print nothing.

use std::sync::Arc;

use hazardscope::coord::GeoPoint;
use hazardscope::report::{ChannelSink, ClickId, SinkEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use super::common::print_report;
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions};

/// Run the watch command.
pub fn run(options: &GlobalOptions) -> Result<(), CliError> {
    let runner = CliRunner::new(options)?;
    runner.log_startup("watch");

    let (sink, mut events) = ChannelSink::new();
    let aggregator = runner.create_aggregator(Arc::new(sink))?;

    eprintln!("Reading clicks as 'lat,lon' lines from stdin (Ctrl-D to finish)");

    runner.runtime().block_on(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut input_open = true;
        let mut current: Option<ClickId> = None;
        let mut last_rendered: Option<ClickId> = None;

        loop {
            // Once input is exhausted, only the latest click is worth waiting for
            if !input_open && (current.is_none() || current == last_rendered) {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line.map_err(CliError::Input)? {
                        Some(line) => match parse_point(&line) {
                            Ok(Some(point)) => current = Some(aggregator.click(point)),
                            Ok(None) => {}
                            Err(reason) => {
                                warn!(line = %line, reason = %reason, "Ignoring input line");
                                eprintln!("Skipping '{}': {}", line.trim(), reason);
                            }
                        },
                        None => {
                            debug!("Input closed");
                            input_open = false;
                        }
                    }
                }

                event = events.recv() => match event {
                    Some(SinkEvent::Render(report)) => {
                        print_report(&report);
                        last_rendered = Some(report.click);
                    }
                    Some(SinkEvent::BeginLoading { click, point }) => {
                        eprintln!("Loading {} ({})", click, point);
                    }
                    Some(SinkEvent::EndLoading { .. }) => {}
                    None => return Err(CliError::ReportAborted),
                },
            }
        }

        Ok(())
    })
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_point(line: &str) -> Result<Option<GeoPoint>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parts: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    let [lat, lon] = parts.as_slice() else {
        return Err("expected two numbers: lat,lon".to_string());
    };

    let lat: f64 = lat
        .parse()
        .map_err(|_| format!("'{}' is not a latitude", lat))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| format!("'{}' is not a longitude", lon))?;

    GeoPoint::try_new(lat, lon)
        .map(Some)
        .map_err(|e| e.to_string())
}
