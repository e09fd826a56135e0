//! Latency histograms and their per-domain summaries.
mod histogram;

#[cfg(test)]
mod tests;

pub use histogram::{LatencyHistogram, LatencySummary};
