//! Gauge sink and Prometheus text exposition.
//!
//! Instead of a process-global registry, the gauges live in an explicitly
//! owned `MetricsSink` that is constructed once in `main`, written by the
//! refresh loop and read by the `/metrics` handler. Per-label values are
//! plain atomics, so writers and scrapers need no lock.

use crate::classifier::WipReport;
use dashmap::DashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicI64, Ordering};

const METRIC_NAME: &str = "github_gitpod_io_pull_requests_count";

pub const STATE_DRAFT: &str = "draft";
pub const STATE_APPROVED: &str = "approved";
pub const STATE_OVERDUE: &str = "overdue";
pub const STATE_COMMENTED: &str = "commented";

const STATES: [&str; 4] = [STATE_DRAFT, STATE_APPROVED, STATE_OVERDUE, STATE_COMMENTED];

/// Holds the exported gauge values, one per `state` label.
///
/// All labels are registered at construction and start at zero, so the
/// endpoint serves a complete (all-zero) gauge set before the first
/// successful refresh. Values survive failed refreshes untouched; a failed
/// cycle simply never writes.
pub struct MetricsSink {
    gauges: DashMap<&'static str, AtomicI64>,
}

impl MetricsSink {
    pub fn new() -> Self {
        let gauges = DashMap::new();
        for state in STATES {
            gauges.insert(state, AtomicI64::new(0));
        }
        Self { gauges }
    }

    /// Overwrites the value of one label. Labels outside the registered
    /// set are ignored; registration is closed at construction.
    pub fn set_gauge(&self, state: &str, value: i64) {
        if let Some(gauge) = self.gauges.get(state) {
            gauge.store(value, Ordering::Relaxed);
        }
    }

    pub fn gauge(&self, state: &str) -> Option<i64> {
        self.gauges.get(state).map(|g| g.load(Ordering::Relaxed))
    }

    /// Renders the gauge set in Prometheus text exposition format, sorted
    /// by label for deterministic output.
    pub fn render(&self) -> String {
        let mut entries: Vec<(&str, i64)> = self
            .gauges
            .iter()
            .map(|entry| (*entry.key(), entry.value().load(Ordering::Relaxed)))
            .collect();
        entries.sort();

        let mut out = String::new();
        let _ = writeln!(out, "# TYPE {METRIC_NAME} gauge");
        for (state, value) in entries {
            let _ = writeln!(out, "{METRIC_NAME}{{state=\"{state}\"}} {value}");
        }
        out
    }
}

impl Default for MetricsSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes a report onto the sink: one gauge per bucket, written in
/// quick succession. `open` is not exported.
pub fn publish(sink: &MetricsSink, report: &WipReport<'_>) {
    sink.set_gauge(STATE_DRAFT, report.draft.len() as i64);
    sink.set_gauge(STATE_APPROVED, report.approved.len() as i64);
    sink.set_gauge(STATE_OVERDUE, report.overdue_review.len() as i64);
    sink.set_gauge(STATE_COMMENTED, report.commented.len() as i64);
}
