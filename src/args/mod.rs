//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::SiteStressArgs;
pub use types::PositiveUsize;

pub(crate) use defaults::{
    DEFAULT_CONFIG_FILES, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MONITOR_INTERVAL, DEFAULT_REDIRECT_LIMIT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use defaults::{DEFAULT_USER_AGENT, default_workers_per_domain};
pub(crate) use parsers::{parse_header, parse_status_code};
