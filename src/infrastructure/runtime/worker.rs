//! Async worker - runs in Tokio runtime and talks to the analysis backend

use std::any::Any;
use std::future::Future;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::interval;
use tracing::{error, info};

use crate::infrastructure::gateway::{ExportKind, Gateway};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent, TaskKind};

/// Run the async worker loop until `Shutdown` or the TUI side hangs up
pub async fn run_async_worker(
    gateway: Arc<Gateway>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let mut poll_interval = interval(Duration::from_millis(25));
    info!(backend = gateway.base_url(), "worker started");

    loop {
        poll_interval.tick().await;

        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };

            match cmd {
                RuntimeCommand::Shutdown => {
                    info!("worker shutting down");
                    return Ok(());
                }

                RuntimeCommand::Analyze {
                    generation,
                    chain,
                    address,
                    range,
                } => {
                    let gateway = Arc::clone(&gateway);
                    spawn_guarded(TaskKind::Analysis, Some(generation), evt_tx.clone(), async move {
                        match gateway.fetch(chain, &address, range).await {
                            Ok(result) => RuntimeEvent::AnalysisReady { generation, result },
                            Err(error) => RuntimeEvent::AnalysisFailed { generation, error },
                        }
                    });
                }

                RuntimeCommand::Export { kind, request } => {
                    let gateway = Arc::clone(&gateway);
                    spawn_guarded(TaskKind::Export, None, evt_tx.clone(), async move {
                        let outcome = match kind {
                            ExportKind::Pdf => gateway.export_pdf(&request).await,
                            ExportKind::Csv => gateway.export_csv(&request).await,
                        };
                        match outcome {
                            Ok(file) => RuntimeEvent::ExportReady { file },
                            Err(error) => RuntimeEvent::ExportFailed { error },
                        }
                    });
                }

                RuntimeCommand::Health => {
                    let gateway = Arc::clone(&gateway);
                    spawn_guarded(TaskKind::Health, None, evt_tx.clone(), async move {
                        match gateway.health().await {
                            Ok(status) => RuntimeEvent::HealthReady { status },
                            Err(error) => RuntimeEvent::HealthFailed { error },
                        }
                    });
                }

                RuntimeCommand::Invalidate => gateway.invalidate().await,
            }
        }
    }
}

/// Spawn a task whose panic is reported as an event instead of being lost
fn spawn_guarded<F>(
    task: TaskKind,
    generation: Option<u64>,
    evt_tx: Sender<RuntimeEvent>,
    fut: F,
)
where
    F: Future<Output = RuntimeEvent> + Send + 'static,
{
    let handle = tokio::spawn(fut);
    tokio::spawn(async move {
        let event = match handle.await {
            Ok(event) => event,
            Err(err) => {
                let message = if err.is_panic() {
                    panic_message(err.into_panic().as_ref())
                } else {
                    "task cancelled".to_string()
                };
                error!(?task, ?generation, %message, "background task failed");
                RuntimeEvent::Unexpected {
                    task,
                    generation,
                    message,
                }
            }
        };
        let _ = evt_tx.send(event);
    });
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
