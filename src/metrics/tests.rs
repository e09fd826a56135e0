use super::LatencyHistogram;
use crate::error::{AppError, AppResult, ValidationError};

fn expect(condition: bool, message: &'static str) -> AppResult<()> {
    if condition {
        Ok(())
    } else {
        Err(AppError::validation(ValidationError::from(message)))
    }
}

#[test]
fn empty_histogram_reports_zeroes() -> AppResult<()> {
    let hist = LatencyHistogram::new()?;
    let summary = hist.summary();
    expect(summary.count == 0, "Expected empty count")?;
    expect(hist.percentiles() == (0, 0, 0), "Expected zero percentiles")?;
    expect(summary.max_ms == 0, "Expected zero max")
}

#[test]
fn record_clamps_sub_millisecond_values() -> AppResult<()> {
    let mut hist = LatencyHistogram::new()?;
    hist.record(0)?;
    let (p50, _, _) = hist.percentiles();
    expect(p50 == 1, "Expected zero latency to count as 1ms")
}

#[test]
fn merge_combines_worker_histograms() -> AppResult<()> {
    let mut fast = LatencyHistogram::new()?;
    let mut slow = LatencyHistogram::new()?;
    for _ in 0..90 {
        fast.record(10)?;
    }
    for _ in 0..10 {
        slow.record(1_000)?;
    }

    fast.merge(&slow)?;
    let summary = fast.summary();
    expect(summary.count == 100, "Expected merged count of 100")?;
    expect(summary.p50_ms == 10, "Expected median from the fast worker")?;
    expect(
        (995..=1_005).contains(&summary.p99_ms),
        "Expected p99 from the slow worker",
    )?;
    expect(summary.max_ms >= 995, "Expected max near 1000ms")
}
