use hdrhistogram::Histogram;

use crate::error::{AppError, AppResult, MetricsError};

/// Significant figures kept by every latency histogram.
const SIGNIFICANT_FIGURES: u8 = 3;

/// Auto-resizing latency histogram in milliseconds. Each worker owns one and
/// the pool merges them per domain after the join.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

/// Percentiles of one domain's responses, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub count: u64,
    pub p50_ms: u64,
    pub p90_ms: u64,
    pub p99_ms: u64,
    pub max_ms: u64,
}

impl LatencyHistogram {
    /// Create an empty histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> AppResult<Self> {
        let hist = Histogram::<u64>::new(SIGNIFICANT_FIGURES).map_err(|err| {
            AppError::from(MetricsError::CreateHistogram {
                reason: err.to_string(),
            })
        })?;
        Ok(Self { hist })
    }

    /// Record a latency value in milliseconds. Sub-millisecond responses
    /// count as 1ms.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_ms: u64) -> AppResult<()> {
        let value = latency_ms.max(1);
        self.hist.record(value).map_err(|err| {
            AppError::from(MetricsError::RecordLatency {
                value_ms: value,
                reason: err.to_string(),
            })
        })
    }

    /// Merge another histogram into this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the merge fails.
    pub fn merge(&mut self, other: &LatencyHistogram) -> AppResult<()> {
        self.hist.add(&other.hist).map_err(|err| {
            AppError::from(MetricsError::MergeHistogram {
                reason: err.to_string(),
            })
        })
    }

    #[must_use]
    pub fn percentiles(&self) -> (u64, u64, u64) {
        if self.count() == 0 {
            return (0, 0, 0);
        }

        (
            self.hist.value_at_quantile(0.5),
            self.hist.value_at_quantile(0.9),
            self.hist.value_at_quantile(0.99),
        )
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    #[must_use]
    pub fn summary(&self) -> LatencySummary {
        let (p50_ms, p90_ms, p99_ms) = self.percentiles();
        LatencySummary {
            count: self.count(),
            p50_ms,
            p90_ms,
            p99_ms,
            max_ms: if self.count() == 0 { 0 } else { self.hist.max() },
        }
    }
}
