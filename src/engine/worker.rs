use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{ClassificationPolicy, DomainState, RequestResult};
use crate::error::AppResult;
use crate::http::RequestExecutor;
use crate::metrics::LatencyHistogram;

use super::clock::Clock;
use super::pacing::Pacing;
use super::pool::TransitionNotice;

pub(super) struct WorkerContext {
    pub(super) state: Arc<DomainState>,
    pub(super) executor: Arc<dyn RequestExecutor>,
    pub(super) pacing: Arc<dyn Pacing>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) policy: Arc<ClassificationPolicy>,
    pub(super) notices: Option<mpsc::UnboundedSender<TransitionNotice>>,
}

pub(super) struct WorkerOutcome {
    pub(super) latency: LatencyHistogram,
}

/// Issues requests back to back until pacing refuses the next one.
pub(super) async fn run_worker(ctx: WorkerContext) -> AppResult<WorkerOutcome> {
    let mut latency = LatencyHistogram::new()?;

    loop {
        let started = ctx.clock.now();
        if !ctx.pacing.admit(started.instant) {
            break;
        }

        let result = ctx.executor.execute(ctx.state.domain()).await;
        let finished = ctx.clock.now();
        if matches!(result, RequestResult::Status(_)) {
            let elapsed_ms = u64::try_from(finished.since(started).as_millis()).unwrap_or(u64::MAX);
            latency.record(elapsed_ms)?;
        }

        let verdict = ctx.policy.classify(result);
        if let Some(transition) = ctx.state.record_outcome(verdict, started, finished) {
            let domain = ctx.state.domain().name();
            debug!(domain, kind = %transition.entered(), "Availability changed");
            if let Some(notices) = ctx.notices.as_ref() {
                drop(notices.send(TransitionNotice {
                    domain: domain.to_owned(),
                    transition,
                }));
            }
        }
    }

    Ok(WorkerOutcome { latency })
}
