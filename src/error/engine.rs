use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Run duration of {secs}s does not fit after the start instant.")]
    DeadlineOverflow { secs: u64 },
    #[error("Worker for '{domain}' failed to join: {source}")]
    WorkerJoin {
        domain: String,
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("Monitor task failed to join: {source}")]
    MonitorJoin {
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("Worker reported domain index {index}, but only {count} domains are running.")]
    UnknownDomainIndex { index: usize, count: usize },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
