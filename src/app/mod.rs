//! Run orchestration: resolve, attack, watch, report.
mod finalize;
mod monitor;
mod runner;

pub(crate) use finalize::finalize_run;
pub(crate) use runner::run_attack;
