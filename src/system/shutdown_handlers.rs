use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::engine::Deadline;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

/// One pending stop is enough; later signals carry no extra meaning.
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Broadcasts a shutdown on Ctrl+C or SIGTERM. Exits quietly once any
/// shutdown has been broadcast.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_rx.recv() => {}
            signal_name = wait_for_signal() => {
                info!(signal = signal_name, "Stopping early, no new requests will start");
                drop(shutdown_tx.send(()));
            }
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(err) => {
            warn!(error = %err, "Failed to register SIGTERM handler");
            None
        }
    };
    let sigterm = async {
        match terminate.as_mut() {
            Some(stream) => {
                stream.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => "SIGINT",
            Err(err) => {
                warn!(error = %err, "Failed to listen for Ctrl+C");
                std::future::pending::<&'static str>().await
            }
        },
        () = sigterm => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "Ctrl+C",
        Err(err) => {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<&'static str>().await
        }
    }
}

/// Halts the deadline when a shutdown is broadcast, so workers stop at
/// their next loop check.
pub fn setup_deadline_halt(
    shutdown_tx: &ShutdownSender,
    deadline: &Arc<Deadline>,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let deadline = Arc::clone(deadline);
    tokio::spawn(async move {
        tokio::select! {
            result = shutdown_rx.recv() => {
                if !matches!(result, Err(broadcast::error::RecvError::Closed)) {
                    deadline.halt();
                }
            }
            () = tokio::time::sleep_until(deadline.at()) => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use std::future::Future;
    use std::time::Duration;
    use tokio::time::Instant;

    const SIGNAL_HANDLER_SETTLE: Duration = Duration::from_millis(10);
    const SHUTDOWN_HANDLER_TIMEOUT: Duration = Duration::from_secs(1);

    fn run_async_test<F>(future: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
        runtime.block_on(future)
    }

    #[test]
    fn signal_handler_exits_on_shutdown() -> AppResult<()> {
        run_async_test(async {
            let (shutdown_tx, _) = shutdown_channel();
            let handle = setup_signal_shutdown_handler(&shutdown_tx);

            tokio::time::sleep(SIGNAL_HANDLER_SETTLE).await;
            if shutdown_tx.send(()).is_err() {
                return Err(AppError::validation("Failed to send shutdown"));
            }

            tokio::time::timeout(SHUTDOWN_HANDLER_TIMEOUT, handle)
                .await
                .map_err(|err| {
                    AppError::validation(format!("Timed out waiting for shutdown handler: {}", err))
                })?
                .map_err(|err| {
                    AppError::validation(format!("Shutdown task join error: {}", err))
                })?;
            Ok(())
        })
    }

    #[test]
    fn shutdown_halts_deadline() -> AppResult<()> {
        run_async_test(async {
            let (shutdown_tx, _) = shutdown_channel();
            let deadline = Arc::new(Deadline::after(Instant::now(), Duration::from_secs(60))?);
            let handle = setup_deadline_halt(&shutdown_tx, &deadline);

            tokio::time::sleep(SIGNAL_HANDLER_SETTLE).await;
            if shutdown_tx.send(()).is_err() {
                return Err(AppError::validation("Failed to send shutdown"));
            }
            tokio::time::timeout(SHUTDOWN_HANDLER_TIMEOUT, handle)
                .await
                .map_err(|err| {
                    AppError::validation(format!("Timed out waiting for halt bridge: {}", err))
                })?
                .map_err(|err| AppError::validation(format!("Halt task join error: {}", err)))?;

            if !deadline.is_halted() || deadline.remaining(Instant::now()) != Duration::ZERO {
                return Err(AppError::validation("Expected deadline to be halted"));
            }
            Ok(())
        })
    }
}
