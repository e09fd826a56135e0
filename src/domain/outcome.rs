use std::collections::BTreeSet;
use std::fmt;

/// Status that signals the target is shedding load.
const TOO_MANY_REQUESTS: u16 = 429;

/// Raw result of one request, before any policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestResult {
    Status(u16),
    Transport(TransportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Connect,
    Other,
}

impl TransportError {
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect
        } else {
            TransportError::Other
        }
    }
}

/// Why a request counted against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    Status(u16),
    Transport(TransportError),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Status(code) => write!(f, "status {}", code),
            FailureCause::Transport(TransportError::Timeout) => f.write_str("timeout"),
            FailureCause::Transport(TransportError::Connect) => f.write_str("connection error"),
            FailureCause::Transport(TransportError::Other) => f.write_str("request error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure(FailureCause),
}

impl Verdict {
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Verdict::Failure(_))
    }
}

/// Decides which responses mean "the target is down".
///
/// The default treats transport errors, 5xx and 429 as failures and every
/// other status (including the remaining 4xx) as the target being reachable.
/// `client_errors_fail` and `extra_failures` tighten that rule per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationPolicy {
    pub client_errors_fail: bool,
    pub extra_failures: BTreeSet<u16>,
}

impl ClassificationPolicy {
    #[must_use]
    pub fn classify(&self, result: RequestResult) -> Verdict {
        match result {
            RequestResult::Transport(err) => Verdict::Failure(FailureCause::Transport(err)),
            RequestResult::Status(code) if self.status_fails(code) => {
                Verdict::Failure(FailureCause::Status(code))
            }
            RequestResult::Status(_) => Verdict::Success,
        }
    }

    fn status_fails(&self, code: u16) -> bool {
        code >= 500
            || code == TOO_MANY_REQUESTS
            || (self.client_errors_fail && (400..500).contains(&code))
            || self.extra_failures.contains(&code)
    }
}
