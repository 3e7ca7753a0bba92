//! Click fan-out and report barrier.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::finding::Finding;
use super::lookup::{lookup, AggregatorSettings};
use super::sink::ReportSink;
use super::source::SourceConfig;
use super::state::{ClickId, ReportState};
use crate::coord::GeoPoint;

/// What happened to a delivered finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Recorded; the barrier is still open
    Accepted,
    /// Recorded and the report was rendered
    Flushed,
    /// The click was superseded; the finding was dropped
    Stale,
    /// The click is current but the slot cannot take this finding
    Rejected,
}

struct ActiveClick {
    state: ReportState,
    token: CancellationToken,
}

#[derive(Default)]
struct ClickCell {
    last: u64,
    active: Option<ActiveClick>,
}

struct Shared {
    sources: Arc<[SourceConfig]>,
    settings: AggregatorSettings,
    sink: Arc<dyn ReportSink>,
    cell: Mutex<ClickCell>,
}

impl Shared {
    fn deliver(&self, click: ClickId, index: usize, finding: Finding) -> Delivery {
        let mut cell = self.cell.lock();

        let Some(active) = cell
            .active
            .as_mut()
            .filter(|active| active.state.click() == click)
        else {
            debug!(click = %click, slot = index, "Dropping stale finding");
            return Delivery::Stale;
        };

        match active.state.record(index, finding) {
            Ok(Some(report)) => {
                info!(click = %click, findings = report.findings.len(), "Report complete");
                self.sink.render(&report);
                self.sink.end_loading(click);
                Delivery::Flushed
            }
            Ok(None) => {
                debug!(
                    click = %click,
                    completed = active.state.completed(),
                    expected = active.state.expected(),
                    "Finding recorded"
                );
                Delivery::Accepted
            }
            Err(e) => {
                warn!(click = %click, slot = index, error = %e, "Finding rejected");
                Delivery::Rejected
            }
        }
    }
}

/// Runs every configured source for each click and renders one report per
/// click once all sources have reported.
///
/// A new click supersedes the previous one: its in-flight lookups are
/// cancelled and anything they still deliver is dropped as stale.
pub struct HazardReportAggregator {
    shared: Arc<Shared>,
}

impl HazardReportAggregator {
    pub fn new(
        sources: Vec<SourceConfig>,
        settings: AggregatorSettings,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                sources: sources.into(),
                settings,
                sink,
                cell: Mutex::new(ClickCell::default()),
            }),
        }
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.shared.sources
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.shared.settings
    }

    /// Number of findings each report waits for.
    pub fn expected(&self) -> usize {
        self.shared.sources.len()
    }

    /// The most recent click, if any.
    pub fn current_click(&self) -> Option<ClickId> {
        self.shared
            .cell
            .lock()
            .active
            .as_ref()
            .map(|active| active.state.click())
    }

    /// True once the report for `click` has been rendered.
    pub fn is_flushed(&self, click: ClickId) -> bool {
        self.shared
            .cell
            .lock()
            .active
            .as_ref()
            .is_some_and(|active| active.state.click() == click && active.state.is_flushed())
    }

    /// Starts a report for `point`, superseding any earlier click.
    ///
    /// Lookups run as spawned tasks, so this must be called from within a
    /// Tokio runtime.
    pub fn click(&self, point: GeoPoint) -> ClickId {
        let token = CancellationToken::new();
        let expected = self.expected();

        let click = {
            let mut cell = self.shared.cell.lock();
            cell.last += 1;
            let click = ClickId(cell.last);

            if let Some(previous) = cell.active.take() {
                previous.token.cancel();
                if !previous.state.is_flushed() {
                    debug!(
                        click = %previous.state.click(),
                        completed = previous.state.completed(),
                        "Superseded unfinished report"
                    );
                }
            }

            info!(click = %click, point = %point, sources = expected, "Click started");
            self.shared.sink.begin_loading(click, point);

            let mut state = ReportState::new(click, point, expected);
            if let Some(report) = state.flush_if_complete() {
                self.shared.sink.render(&report);
                self.shared.sink.end_loading(click);
            }
            cell.active = Some(ActiveClick {
                state,
                token: token.clone(),
            });
            click
        };

        for index in 0..expected {
            let shared = Arc::clone(&self.shared);
            let token = token.clone();

            tokio::spawn(async move {
                let source = &shared.sources[index];
                let finding = tokio::select! {
                    biased;

                    _ = token.cancelled() => {
                        debug!(click = %click, source = %source.id, "Lookup cancelled");
                        return;
                    }

                    // Panics inside the lookup come back as Error findings
                    finding = lookup(source, point, &shared.settings) => finding,
                };
                shared.deliver(click, index, finding);
            });
        }

        click
    }

    /// Delivers the finding for source slot `index` of `click`.
    ///
    /// Findings for any click other than the current one are dropped.
    pub fn deliver(&self, click: ClickId, index: usize, finding: Finding) -> Delivery {
        self.shared.deliver(click, index, finding)
    }

    /// Cancels the lookups of the current click, if any.
    pub fn cancel(&self) {
        if let Some(active) = self.shared.cell.lock().active.as_ref() {
            active.token.cancel();
        }
    }
}

impl Drop for HazardReportAggregator {
    fn drop(&mut self) {
        self.cancel();
    }
}
