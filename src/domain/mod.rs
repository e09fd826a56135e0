//! Core data model: targets, request outcomes, per-domain availability and
//! the validated run configuration.
pub mod availability;
pub mod outcome;
pub mod run;
pub mod target;

#[cfg(test)]
mod tests;

pub use availability::{Counters, DomainSnapshot, DomainState, Status, Transition};
pub use outcome::{ClassificationPolicy, FailureCause, RequestResult, TransportError, Verdict};
pub use run::RunConfig;
pub use target::{Domain, Resolution};
