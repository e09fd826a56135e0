use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::args::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MONITOR_INTERVAL, DEFAULT_REDIRECT_LIMIT,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT, PositiveUsize, SiteStressArgs,
    default_workers_per_domain,
};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::resolve::normalize_domain;

use super::outcome::ClassificationPolicy;

/// Fully validated settings for one run. Nothing downstream re-validates.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub domains: Vec<String>,
    pub duration: Duration,
    pub workers_per_domain: PositiveUsize,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub monitor_interval: Duration,
    pub headers: Vec<(String, String)>,
    pub user_agent: String,
    pub redirect_limit: u32,
    pub insecure: bool,
    pub policy: ClassificationPolicy,
    pub output_dir: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

impl RunConfig {
    /// Builds a config with built-in defaults for everything but the targets
    /// and the run length.
    ///
    /// # Errors
    ///
    /// Returns an error when no usable domain remains after normalization or
    /// the duration is zero.
    pub fn new(domains: &[String], duration: Duration) -> AppResult<Self> {
        let domains = normalize_all(domains)?;
        if duration.is_zero() {
            return Err(AppError::validation(ValidationError::DurationZero));
        }
        let workers = PositiveUsize::try_from(default_workers_per_domain(domains.len()))?;
        Ok(Self {
            domains,
            duration,
            workers_per_domain: workers,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
            headers: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            insecure: false,
            policy: ClassificationPolicy::default(),
            output_dir: None,
            export_json: None,
        })
    }

    /// Validates merged CLI/config arguments into a run config.
    ///
    /// # Errors
    ///
    /// Returns an error when domains or duration are missing or invalid.
    pub fn from_args(args: &SiteStressArgs) -> AppResult<Self> {
        let duration = args
            .duration
            .ok_or_else(|| AppError::validation(ValidationError::MissingDuration))?;
        let mut config = Self::new(&args.domains, duration)?;

        if let Some(workers) = args.workers {
            config.workers_per_domain = workers;
        }
        config.request_timeout = args.request_timeout;
        config.connect_timeout = args.connect_timeout;
        config.monitor_interval = args.monitor_interval;
        config.headers.clone_from(&args.headers);
        if let Some(user_agent) = args.user_agent.as_ref() {
            config.user_agent.clone_from(user_agent);
        }
        config.redirect_limit = args.redirect_limit;
        config.insecure = args.insecure;
        config.policy = ClassificationPolicy {
            client_errors_fail: args.fail_on_4xx,
            extra_failures: args.fail_statuses.iter().copied().collect::<BTreeSet<u16>>(),
        };
        config.output_dir = args.output_dir.as_ref().map(PathBuf::from);
        config.export_json = args.export_json.as_ref().map(PathBuf::from);
        Ok(config)
    }

    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers_per_domain.get()
    }

    /// Workers across every domain.
    #[must_use]
    pub fn total_workers(&self) -> usize {
        self.workers().saturating_mul(self.domains.len())
    }
}

fn normalize_all(domains: &[String]) -> AppResult<Vec<String>> {
    if domains.is_empty() {
        return Err(AppError::validation(ValidationError::MissingDomains));
    }
    let mut normalized = Vec::with_capacity(domains.len());
    for (index, raw) in domains.iter().enumerate() {
        let name = normalize_domain(raw);
        if name.is_empty() {
            return Err(AppError::validation(ValidationError::EmptyDomain { index }));
        }
        normalized.push(name);
    }
    Ok(normalized)
}
