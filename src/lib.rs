//! Core library for the `sitestress` CLI.
//!
//! `sitestress` drives sustained HTTP load against one or more domains and
//! records, per domain, when the target stops answering and when it comes
//! back. The binary is a thin wrapper around [`run`]; the modules below are
//! the building blocks it uses: argument and config parsing, the per-domain
//! availability state, the worker engine, the HTTP transport, latency
//! metrics, and the final report.
pub mod args;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http;
pub mod metrics;
pub mod report;

mod app;
mod entry;
mod system;

/// Parses the process arguments, runs the attack, and prints the report.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, or when the run
/// cannot be set up.
pub fn run() -> error::AppResult<()> {
    entry::run()
}
