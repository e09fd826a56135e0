//! HTTP client construction, request execution and target resolution.
mod client;
mod executor;
pub mod resolve;


pub use client::{build_client, build_headers};
pub use executor::{HttpExecutor, RequestExecutor};
pub use resolve::{discover_addresses, normalize_domain, resolve_target, split_host_port};
