use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::domain::{DomainState, RunConfig};
use crate::engine::{Clock, Deadline, PoolPlan, SystemClock, WorkerPool};
use crate::error::{AppError, AppResult, EngineError};
use crate::http::{HttpExecutor, build_client, resolve_target};
use crate::report::{RunReport, format_duration, prepare_output_dir};
use crate::system::shutdown_handlers;

use super::monitor::{MonitorSettings, spawn_monitor};

/// Runs one attack from resolution to the final report. Per-request
/// failures never surface here; only setup and join errors do.
///
/// # Errors
///
/// Returns an error when the output directory cannot be prepared, the HTTP
/// client cannot be built, or a worker fails to join.
pub(crate) async fn run_attack(config: &RunConfig, no_color: bool) -> AppResult<RunReport> {
    if let Some(dir) = config.output_dir.as_deref() {
        prepare_output_dir(dir).await?;
    }

    let client = build_client(config)?;
    let mut states = Vec::with_capacity(config.domains.len());
    for name in &config.domains {
        println!("Resolving {}...", name);
        let domain = resolve_target(&client, name).await?;
        println!(
            "  Target: {} ({} address(es))",
            domain.url(),
            domain.addresses().len()
        );
        states.push(Arc::new(DomainState::new(domain)));
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let started = clock.now();
    let deadline = Arc::new(Deadline::after(started.instant, config.duration)?);

    let (shutdown_tx, _shutdown_rx) = shutdown_handlers::shutdown_channel();
    let signal_handle = shutdown_handlers::setup_signal_shutdown_handler(&shutdown_tx);
    let halt_handle = shutdown_handlers::setup_deadline_halt(&shutdown_tx, &deadline);

    let (notice_tx, notice_rx) = mpsc::unbounded_channel();
    let workers = config.workers();
    println!(
        "\nStarting attack on {} domain(s) with {} workers each for {} (Ctrl+C stops early)\n",
        states.len(),
        workers,
        format_duration(config.duration)
    );
    info!(
        domains = states.len(),
        workers_per_domain = workers,
        total_workers = config.total_workers(),
        duration_secs = config.duration.as_secs(),
        "Attack started"
    );

    let pool = WorkerPool::launch(PoolPlan {
        states,
        workers_per_domain: config.workers_per_domain,
        executor: Arc::new(HttpExecutor::new(client)),
        pacing: deadline.clone(),
        clock: Arc::clone(&clock),
        policy: config.policy.clone(),
        notices: Some(notice_tx),
    });

    let monitor = spawn_monitor(
        pool.states().to_vec(),
        Arc::clone(&deadline),
        notice_rx,
        &shutdown_tx,
        MonitorSettings {
            started: started.instant,
            interval: config.monitor_interval,
            no_color,
        },
    );
    let (monitored, joined) = tokio::join!(monitor, pool.join());

    drop(shutdown_tx.send(()));
    signal_handle.abort();
    halt_handle.abort();

    monitored.map_err(|source| AppError::engine(EngineError::MonitorJoin { source }))?;
    let domains = joined?;
    let finished = clock.now();
    info!(
        elapsed_ms = u64::try_from(finished.since(started).as_millis()).unwrap_or(u64::MAX),
        "Attack finished"
    );

    Ok(RunReport {
        started_at: started.wall,
        finished_at: finished.wall,
        duration: config.duration,
        elapsed: finished.since(started),
        domains,
    })
}
