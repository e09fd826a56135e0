
use std::sync::Arc;
use std::time::Duration;

use sitestress::args::PositiveUsize;
use sitestress::domain::{DomainState, RunConfig, Status, Transition};
use sitestress::engine::{Deadline, PoolPlan, SystemClock, WorkerPool};
use sitestress::http::{HttpExecutor, build_client, resolve_target};

use support_single::{always_ok, spawn_http_server_or_skip};

const OUTAGE: Duration = Duration::from_secs(2);
const RUN: Duration = Duration::from_secs(4);
// Resolution runs after the server starts, so the first failure and the
// measured downtime land a little inside the outage.
const DOWNTIME_SLACK: Duration = Duration::from_secs(1);

fn unavailable_at_first(elapsed: Duration) -> u16 {
    if elapsed < OUTAGE { 503 } else { 200 }
}

fn single_outage_downtime(transitions: &[Transition]) -> Result<Duration, String> {
    match transitions {
        [Transition::Down { .. }, Transition::Up { downtime, .. }] => Ok(*downtime),
        other => Err(format!(
            "expected exactly one DOWN then one UP, got {:?}",
            other.iter().map(Transition::entered).collect::<Vec<_>>()
        )),
    }
}

#[test]
fn e2e_outage_then_recovery_over_http() -> Result<(), String> {
    let Some((flaky_addr, _flaky)) = spawn_http_server_or_skip(unavailable_at_first)? else {
        return Ok(());
    };
    let Some((steady_addr, _steady)) = spawn_http_server_or_skip(always_ok)? else {
        return Ok(());
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;

    let reports = runtime.block_on(async {
        let mut config = RunConfig::new(&[flaky_addr.clone(), steady_addr.clone()], RUN)
            .map_err(|err| err.to_string())?;
        config.workers_per_domain = PositiveUsize::try_from(4).map_err(|err| err.to_string())?;
        config.request_timeout = Duration::from_secs(2);
        let client = build_client(&config).map_err(|err| err.to_string())?;

        let mut states = Vec::new();
        for name in &config.domains {
            let domain = resolve_target(&client, name)
                .await
                .map_err(|err| err.to_string())?;
            states.push(Arc::new(DomainState::new(domain)));
        }

        let deadline = Deadline::after(tokio::time::Instant::now(), RUN)
            .map_err(|err| err.to_string())?;
        let pool = WorkerPool::launch(PoolPlan {
            states,
            workers_per_domain: config.workers_per_domain,
            executor: Arc::new(HttpExecutor::new(client)),
            pacing: Arc::new(deadline),
            clock: Arc::new(SystemClock),
            policy: config.policy.clone(),
            notices: None,
        });
        pool.join().await.map_err(|err| err.to_string())
    })?;

    let [flaky, steady] = reports.as_slice() else {
        return Err(format!("expected two reports, got {}", reports.len()));
    };
    if flaky.snapshot.domain.name() != flaky_addr || steady.snapshot.domain.name() != steady_addr {
        return Err("reports out of domain order".to_owned());
    }
    if !flaky.snapshot.domain.url().starts_with("http://") {
        return Err(format!("unexpected target {}", flaky.snapshot.domain.url()));
    }

    for report in [flaky, steady] {
        let counters = report.snapshot.counters;
        if counters.total == 0 || !counters.is_settled() {
            return Err(format!(
                "{}: bad counters {:?}",
                report.snapshot.domain.name(),
                counters
            ));
        }
    }

    let downtime = single_outage_downtime(&flaky.snapshot.transitions)?;
    let shortest = OUTAGE.saturating_sub(DOWNTIME_SLACK);
    let longest = OUTAGE.saturating_add(Duration::from_millis(500));
    if downtime < shortest || downtime > longest {
        return Err(format!(
            "downtime {:?} outside {:?}..={:?}",
            downtime, shortest, longest
        ));
    }
    if flaky.snapshot.status != Status::Up || flaky.snapshot.counters.failure == 0 {
        return Err("expected recovered domain with failures".to_owned());
    }

    if !steady.snapshot.transitions.is_empty() || steady.snapshot.status != Status::Up {
        return Err(format!(
            "steady domain should never go down: {:?}",
            steady.snapshot.transitions
        ));
    }
    if steady.latency.count != steady.snapshot.counters.total {
        return Err("every steady response should carry a latency sample".to_owned());
    }
    Ok(())
}
