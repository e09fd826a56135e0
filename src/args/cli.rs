use clap::Parser;
use std::time::Duration;

use super::defaults::DEFAULT_REDIRECT_LIMIT;
use super::parsers::{
    parse_duration_arg, parse_header, parse_positive_usize, parse_run_duration,
    parse_status_code,
};
use super::types::PositiveUsize;

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "sitestress",
    version,
    about = "Sustained HTTP stress test with per-domain availability tracking. Only use this against systems you are authorized to test.",
    after_help = "Examples:\n  sitestress -d example.com -t 5\n  sitestress -d example.com -t 10 -o logs\n  sitestress -d one.example,two.example -t 90s"
)]
pub struct SiteStressArgs {
    /// Domain(s) to test, comma-separated (e.g. example.com,test.example)
    #[arg(long = "domain", short = 'd', value_delimiter = ',')]
    pub domains: Vec<String>,

    /// Run duration; a bare number is minutes (supports ms/s/m/h)
    #[arg(long = "duration", short = 't', value_parser = parse_run_duration)]
    pub duration: Option<Duration>,

    /// Directory to store the run report in (created if missing)
    #[arg(long = "output-dir", short = 'o')]
    pub output_dir: Option<String>,

    /// Workers per domain (default: 1000 for one domain, 500 each for several)
    #[arg(long = "workers", short = 'w', value_parser = parse_positive_usize)]
    pub workers: Option<PositiveUsize>,

    /// Per-request timeout; a bare number is seconds (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "4s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Connect timeout; a bare number is seconds (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "3s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Progress line refresh interval (supports ms/s/m/h)
    #[arg(long = "monitor-interval", default_value = "5s", value_parser = parse_duration_arg)]
    pub monitor_interval: Duration,

    /// Extra HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Override the browser-like User-Agent
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    /// Maximum redirects to follow (0 disables following)
    #[arg(long = "redirect", default_value_t = DEFAULT_REDIRECT_LIMIT)]
    pub redirect_limit: u32,

    /// Accept invalid TLS certificates and hostnames
    #[arg(long = "insecure")]
    pub insecure: bool,

    /// Count every 4xx response as the target being down
    #[arg(long = "fail-on-4xx")]
    pub fail_on_4xx: bool,

    /// Additional status codes that count as the target being down (repeatable)
    #[arg(long = "fail-status", value_parser = parse_status_code)]
    pub fail_statuses: Vec<u16>,

    /// Also write the final report as JSON to this path
    #[arg(long = "export-json")]
    pub export_json: Option<String>,

    /// Path to config file (TOML or JSON)
    #[arg(long = "config")]
    pub config: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Skip the banner and authorization notice
    #[arg(long = "no-banner")]
    pub no_banner: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}
