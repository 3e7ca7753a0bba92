//! Per-click collection state and the rendered report.

use std::fmt;

use thiserror::Error;

use super::finding::Finding;
use crate::coord::GeoPoint;

/// Monotonically increasing click sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClickId(pub u64);

impl fmt::Display for ClickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collecting,
    Flushed,
}

/// Reasons a finding cannot be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("report for click {0} already flushed")]
    AlreadyFlushed(ClickId),

    #[error("source slot {0} already reported")]
    Duplicate(usize),

    #[error("source slot {index} out of range ({expected} sources)")]
    OutOfRange { index: usize, expected: usize },
}

/// Findings collected for one click.
///
/// Acts as the completion barrier: the report is produced exactly once, when
/// every one of the `expected` source slots has reported.
#[derive(Debug, Clone)]
pub struct ReportState {
    click: ClickId,
    point: GeoPoint,
    expected: usize,
    /// In completion order, tagged with the declared source index
    findings: Vec<(usize, Finding)>,
    phase: Phase,
}

impl ReportState {
    pub fn new(click: ClickId, point: GeoPoint, expected: usize) -> Self {
        Self {
            click,
            point,
            expected,
            findings: Vec::with_capacity(expected),
            phase: Phase::Collecting,
        }
    }

    pub fn click(&self) -> ClickId {
        self.click
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn completed(&self) -> usize {
        self.findings.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_flushed(&self) -> bool {
        self.phase == Phase::Flushed
    }

    /// Findings in the order they arrived.
    pub fn completion_order(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().map(|(_, finding)| finding)
    }

    /// Records the finding for source slot `index`.
    ///
    /// Returns the report when this finding closes the barrier.
    pub fn record(
        &mut self,
        index: usize,
        finding: Finding,
    ) -> Result<Option<Report>, RecordError> {
        if self.is_flushed() {
            return Err(RecordError::AlreadyFlushed(self.click));
        }
        if index >= self.expected {
            return Err(RecordError::OutOfRange {
                index,
                expected: self.expected,
            });
        }
        if self.findings.iter().any(|(slot, _)| *slot == index) {
            return Err(RecordError::Duplicate(index));
        }

        self.findings.push((index, finding));
        Ok(self.flush_if_complete())
    }

    /// Flushes if every slot has reported. Only needed directly when there
    /// are no sources at all.
    pub fn flush_if_complete(&mut self) -> Option<Report> {
        if self.is_flushed() || self.findings.len() < self.expected {
            return None;
        }
        self.phase = Phase::Flushed;

        let mut ordered = self.findings.clone();
        ordered.sort_by_key(|(slot, _)| *slot);
        Some(Report {
            click: self.click,
            point: self.point,
            findings: ordered.into_iter().map(|(_, finding)| finding).collect(),
        })
    }
}

/// The combined report for a click, in declared source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub click: ClickId,
    pub point: GeoPoint,
    pub findings: Vec<Finding>,
}

impl Report {
    /// Finding of the source with the given id.
    pub fn finding(&self, source_id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.source_id == source_id)
    }

    /// Display text: location header, then one paragraph per finding.
    pub fn text(&self) -> String {
        std::iter::once(format!("Location: {}", self.point))
            .chain(self.findings.iter().map(|f| f.text.clone()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::FindingStatus;

    fn finding(id: &str) -> Finding {
        Finding::new(id, FindingStatus::Hit, format!("{}: ok", id))
    }

    fn state(expected: usize) -> ReportState {
        ReportState::new(ClickId(1), GeoPoint::new(37.123456, -122.5), expected)
    }

    #[test]
    fn test_flushes_only_when_all_reported() {
        let mut s = state(3);
        assert_eq!(s.record(2, finding("c")).unwrap(), None);
        assert_eq!(s.record(0, finding("a")).unwrap(), None);
        assert_eq!(s.phase(), Phase::Collecting);

        let report = s.record(1, finding("b")).unwrap().unwrap();
        assert!(s.is_flushed());
        let ids: Vec<_> = report
            .findings
            .iter()
            .map(|f| f.source_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let arrival: Vec<_> = s.completion_order().map(|f| f.source_id.as_str()).collect();
        assert_eq!(arrival, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_two_of_three_never_flushes() {
        let mut s = state(3);
        s.record(0, finding("a")).unwrap();
        s.record(1, finding("b")).unwrap();
        assert_eq!(s.flush_if_complete(), None);
        assert_eq!(s.completed(), 2);
        assert!(!s.is_flushed());
    }

    #[test]
    fn test_flushed_state_rejects_findings() {
        let mut s = state(1);
        assert!(s.record(0, finding("a")).unwrap().is_some());
        assert_eq!(
            s.record(0, finding("a")),
            Err(RecordError::AlreadyFlushed(ClickId(1)))
        );
        assert_eq!(s.flush_if_complete(), None);
    }

    #[test]
    fn test_duplicate_and_out_of_range() {
        let mut s = state(2);
        s.record(0, finding("a")).unwrap();
        assert_eq!(s.record(0, finding("a")), Err(RecordError::Duplicate(0)));
        assert_eq!(
            s.record(5, finding("z")),
            Err(RecordError::OutOfRange {
                index: 5,
                expected: 2
            })
        );
        assert_eq!(s.completed(), 1);
    }

    #[test]
    fn test_zero_sources_flush_immediately() {
        let mut s = state(0);
        let report = s.flush_if_complete().unwrap();
        assert!(report.findings.is_empty());
        assert_eq!(report.text(), "Location: Lat: 37.12346, Lng: -122.50000");
    }

    #[test]
    fn test_report_text() {
        let mut s = state(2);
        s.record(1, finding("flood")).unwrap();
        let report = s.record(0, finding("fire")).unwrap().unwrap();
        assert_eq!(
            report.to_string(),
            "Location: Lat: 37.12346, Lng: -122.50000\n\nfire: ok\n\nflood: ok"
        );
        assert_eq!(report.finding("flood").unwrap().text, "flood: ok");
        assert!(report.finding("ozone").is_none());
    }

    #[test]
    fn test_click_id_display() {
        assert_eq!(ClickId(7).to_string(), "#7");
        assert!(ClickId(2) > ClickId(1));
    }
}
