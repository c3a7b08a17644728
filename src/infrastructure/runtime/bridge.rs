//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI never blocks on the network: it queues commands here and drains
//! events once per tick.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tokio::runtime::Builder;

use crate::domain::{AnalysisResult, Chain, DateRange};
use crate::error::GatewayError;
use crate::infrastructure::gateway::{
    ExportKind, ExportRequest, ExportedFile, Gateway, HealthStatus,
};
use crate::infrastructure::runtime::worker::run_async_worker;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Fetch an analysis; the generation is echoed back on the reply
    Analyze {
        generation: u64,
        chain: Chain,
        address: String,
        range: DateRange,
    },
    /// Render a statement on the backend
    Export {
        kind: ExportKind,
        request: Box<ExportRequest>,
    },
    /// Probe the backend
    Health,
    /// Drop cached analyses
    Invalidate,
    /// Shutdown the worker
    Shutdown,
}

/// Which background task an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Analysis,
    Export,
    Health,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    AnalysisReady {
        generation: u64,
        result: Arc<AnalysisResult>,
    },
    AnalysisFailed {
        generation: u64,
        error: GatewayError,
    },
    ExportReady {
        file: ExportedFile,
    },
    ExportFailed {
        error: GatewayError,
    },
    HealthReady {
        status: HealthStatus,
    },
    HealthFailed {
        error: GatewayError,
    },
    /// A task panicked; the worker keeps running. Analysis tasks carry
    /// their generation so stale failures can be ignored.
    Unexpected {
        task: TaskKind,
        generation: Option<u64>,
        message: String,
    },
    /// Worker-level error
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Start the worker thread with its own Tokio runtime
    pub fn new(gateway: Arc<Gateway>) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("screener-runtime".to_string())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(gateway, cmd_rx, evt_tx.clone()).await {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
