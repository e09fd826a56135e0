use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to create latency histogram: {reason}")]
    CreateHistogram { reason: String },
    #[error("Failed to record latency of {value_ms}ms: {reason}")]
    RecordLatency { value_ms: u64, reason: String },
    #[error("Failed to merge latency histograms: {reason}")]
    MergeHistogram { reason: String },
}
