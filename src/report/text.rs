
use crate::domain::{Resolution, Status};
use crate::engine::DomainReport;

use super::{RunReport, format_duration, format_hundredths, per_second_x100, percent_x100};

const SEPARATOR_WIDTH: usize = 50;

/// Renders the report as the plain-text document printed at the end of a
/// run and written to the output directory.
#[must_use]
pub fn render_text(report: &RunReport) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();

    push_line(
        &mut out,
        &format!("SITESTRESS REPORT - {}", report.started_at.to_rfc2822()),
    );
    push_line(
        &mut out,
        &format!(
            "Test duration: {} (elapsed {})",
            format_duration(report.duration),
            format_duration(report.elapsed)
        ),
    );
    push_line(
        &mut out,
        &format!("Finished: {}", report.finished_at.to_rfc2822()),
    );
    push_line(
        &mut out,
        &format!(
            "Total requests: {} ({} req/s)",
            report.total_requests(),
            format_hundredths(report.throughput_x100())
        ),
    );
    push_line(&mut out, &separator);

    for domain in &report.domains {
        render_domain(&mut out, domain, report);
        push_line(&mut out, &separator);
    }
    out
}

fn render_domain(out: &mut String, report: &DomainReport, run: &RunReport) {
    let snapshot = &report.snapshot;
    let counters = snapshot.counters;
    let name = snapshot.domain.name();

    push_line(out, &format!("DOMAIN: {}", name));
    push_line(out, &format!("Target: {}", snapshot.domain.url()));
    if snapshot.domain.resolution() == Resolution::Fallback {
        push_line(out, "Resolution: fallback (no scheme answered at startup)");
    }
    if !snapshot.domain.addresses().is_empty() {
        let addresses = snapshot
            .domain
            .addresses()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        push_line(out, &format!("Addresses: {}", addresses));
    }
    push_line(out, &format!("Total requests: {}", counters.total));
    push_line(
        out,
        &format!(
            "Successful: {} ({}%)",
            counters.success,
            format_hundredths(percent_x100(counters.success, counters.total))
        ),
    );
    push_line(
        out,
        &format!(
            "Failed: {} ({}%)",
            counters.failure,
            format_hundredths(percent_x100(counters.failure, counters.total))
        ),
    );
    push_line(
        out,
        &format!(
            "Throughput: {} req/s",
            format_hundredths(per_second_x100(counters.total, run.elapsed))
        ),
    );
    push_line(
        out,
        &format!(
            "Latency p50/p90/p99: {}ms / {}ms / {}ms (max {}ms)",
            report.latency.p50_ms, report.latency.p90_ms, report.latency.p99_ms, report.latency.max_ms
        ),
    );
    match (snapshot.status, snapshot.down_since) {
        (Status::Down, Some(since)) => push_line(
            out,
            &format!("Final status: DOWN (since {})", since.format("%H:%M:%S")),
        ),
        (status, _) => push_line(out, &format!("Final status: {}", status)),
    }

    push_line(out, "Downtime log:");
    if snapshot.transitions.is_empty() {
        push_line(out, "  (No downtime events recorded)");
    }
    for transition in &snapshot.transitions {
        push_line(out, &format!("  {}", transition.describe(name)));
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
