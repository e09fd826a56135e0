use std::path::Path;
use std::time::Duration;

use serde_json::{Value, json};

use crate::domain::{Resolution, Transition};
use crate::engine::DomainReport;
use crate::error::{AppError, AppResult, ReportError};

use super::RunReport;

/// JSON form of the report.
#[must_use]
pub fn render_json(report: &RunReport) -> Value {
    let domains: Vec<Value> = report.domains.iter().map(domain_json).collect();
    json!({
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.to_rfc3339(),
        "duration_ms": millis(report.duration),
        "elapsed_ms": millis(report.elapsed),
        "total_requests": report.total_requests(),
        "throughput_x100": report.throughput_x100(),
        "domains": domains
    })
}

fn domain_json(report: &DomainReport) -> Value {
    let snapshot = &report.snapshot;
    let transitions: Vec<Value> = snapshot.transitions.iter().map(transition_json).collect();
    let addresses: Vec<String> = snapshot
        .domain
        .addresses()
        .iter()
        .map(ToString::to_string)
        .collect();
    let resolution = match snapshot.domain.resolution() {
        Resolution::Probed => "probed",
        Resolution::Fallback => "fallback",
    };
    json!({
        "domain": snapshot.domain.name(),
        "url": snapshot.domain.url(),
        "resolution": resolution,
        "addresses": addresses,
        "total": snapshot.counters.total,
        "success": snapshot.counters.success,
        "failure": snapshot.counters.failure,
        "status": snapshot.status.as_str(),
        "down_since": snapshot.down_since.map(|since| since.to_rfc3339()),
        "latency_ms": {
            "count": report.latency.count,
            "p50": report.latency.p50_ms,
            "p90": report.latency.p90_ms,
            "p99": report.latency.p99_ms,
            "max": report.latency.max_ms
        },
        "transitions": transitions
    })
}

fn transition_json(transition: &Transition) -> Value {
    match transition {
        Transition::Down { at, cause } => json!({
            "kind": "down",
            "at": at.to_rfc3339(),
            "cause": cause.to_string()
        }),
        Transition::Up { at, downtime } => json!({
            "kind": "up",
            "at": at.to_rfc3339(),
            "downtime_ms": millis(*downtime)
        }),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Writes the pretty-printed JSON report to `path`.
///
/// # Errors
///
/// Returns an error when serialization or the write fails.
pub async fn write_json(path: &Path, report: &RunReport) -> AppResult<()> {
    let body = serde_json::to_string_pretty(&render_json(report))
        .map_err(|err| AppError::report(ReportError::SerializeJson { source: err }))?;
    tokio::fs::write(path, body).await.map_err(|err| {
        AppError::report(ReportError::WriteJson {
            path: path.to_path_buf(),
            source: err,
        })
    })
}
