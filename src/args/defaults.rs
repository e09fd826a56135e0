use std::time::Duration;

/// Browser-like User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 sitestress/",
    env!("CARGO_PKG_VERSION")
);

/// Config filenames checked when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["sitestress.toml", "sitestress.json"];

pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub(crate) const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(5);
pub(crate) const DEFAULT_REDIRECT_LIMIT: u32 = 10;

/// Workers per domain when a single domain is targeted.
const SINGLE_DOMAIN_WORKERS: usize = 1000;
/// Workers per domain when several domains share the run's sockets.
const MULTI_DOMAIN_WORKERS: usize = 500;

#[must_use]
pub const fn default_workers_per_domain(domain_count: usize) -> usize {
    if domain_count > 1 {
        MULTI_DOMAIN_WORKERS
    } else {
        SINGLE_DOMAIN_WORKERS
    }
}
