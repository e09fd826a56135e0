use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::args::PositiveUsize;
use crate::domain::{ClassificationPolicy, DomainSnapshot, DomainState, Transition};
use crate::error::{AppError, AppResult, EngineError};
use crate::http::RequestExecutor;
use crate::metrics::{LatencyHistogram, LatencySummary};

use super::clock::Clock;
use super::pacing::Pacing;
use super::worker::{WorkerContext, WorkerOutcome, run_worker};

/// An edge reported by the worker that recorded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionNotice {
    pub domain: String,
    pub transition: Transition,
}

impl TransitionNotice {
    #[must_use]
    pub fn describe(&self) -> String {
        self.transition.describe(&self.domain)
    }
}

/// Everything needed to start the workers of a run.
pub struct PoolPlan {
    pub states: Vec<Arc<DomainState>>,
    pub workers_per_domain: PositiveUsize,
    pub executor: Arc<dyn RequestExecutor>,
    pub pacing: Arc<dyn Pacing>,
    pub clock: Arc<dyn Clock>,
    pub policy: ClassificationPolicy,
    pub notices: Option<mpsc::UnboundedSender<TransitionNotice>>,
}

/// Final, race-free view of one domain after every worker has exited.
#[derive(Debug, Clone)]
pub struct DomainReport {
    pub snapshot: DomainSnapshot,
    pub latency: LatencySummary,
}

pub struct WorkerPool {
    states: Vec<Arc<DomainState>>,
    handles: Vec<(usize, JoinHandle<AppResult<WorkerOutcome>>)>,
}

impl WorkerPool {
    /// Spawns `workers_per_domain` tasks for every domain on the current
    /// tokio runtime.
    #[must_use]
    pub fn launch(plan: PoolPlan) -> Self {
        let PoolPlan {
            states,
            workers_per_domain,
            executor,
            pacing,
            clock,
            policy,
            notices,
        } = plan;
        let policy = Arc::new(policy);
        let per_domain = workers_per_domain.get();
        let mut handles = Vec::with_capacity(per_domain.saturating_mul(states.len()));

        for (domain_index, state) in states.iter().enumerate() {
            debug!(
                domain = state.domain().name(),
                url = state.domain().url(),
                workers = per_domain,
                "Launching workers"
            );
            for _ in 0..per_domain {
                let ctx = WorkerContext {
                    state: Arc::clone(state),
                    executor: Arc::clone(&executor),
                    pacing: Arc::clone(&pacing),
                    clock: Arc::clone(&clock),
                    policy: Arc::clone(&policy),
                    notices: notices.clone(),
                };
                handles.push((domain_index, tokio::spawn(run_worker(ctx))));
            }
        }

        Self { states, handles }
    }

    #[must_use]
    pub fn states(&self) -> &[Arc<DomainState>] {
        &self.states
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker, then hands back one report per domain in
    /// launch order. All workers are awaited even if one of them failed; the
    /// first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns an error when a worker panicked or its latency histogram
    /// failed.
    pub async fn join(self) -> AppResult<Vec<DomainReport>> {
        let Self { states, handles } = self;
        let mut merged = Vec::with_capacity(states.len());
        for _ in 0..states.len() {
            merged.push(LatencyHistogram::new()?);
        }

        let mut first_error: Option<AppError> = None;
        for (domain_index, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) => {
                    first_error.get_or_insert(err);
                    continue;
                }
                Err(source) => {
                    first_error.get_or_insert(AppError::engine(EngineError::WorkerJoin {
                        domain: states
                            .get(domain_index)
                            .map(|state| state.domain().name().to_owned())
                            .unwrap_or_default(),
                        source,
                    }));
                    continue;
                }
            };
            let count = merged.len();
            let Some(slot) = merged.get_mut(domain_index) else {
                first_error.get_or_insert(AppError::engine(EngineError::UnknownDomainIndex {
                    index: domain_index,
                    count,
                }));
                continue;
            };
            if let Err(err) = slot.merge(&outcome.latency) {
                first_error.get_or_insert(err);
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        Ok(states
            .into_iter()
            .zip(merged)
            .map(|(state, latency)| DomainReport {
                snapshot: state.into_snapshot(),
                latency: latency.summary(),
            })
            .collect())
    }
}
