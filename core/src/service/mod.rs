//! Snapshot service: one ordered queue, one interpreter worker.
//!
//! ```text
//!  capturer ──ServiceCommand──► worker (throttle, dedup, interpret)
//!                                 │            │
//!                     ScreenUpdate│            │finished records
//!                                 ▼            ▼
//!                            consumers    persistence task ──► RecordSink
//! ```
//!
//! Item assessments run as detached tasks so the network never stalls the
//! queue; their results come back as [`ScreenUpdate::ItemAssessed`].

mod sink;
mod throttle;
mod worker;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use ornalens_types::ScannerConfig;

pub use sink::{MemorySink, RecordSink, SinkError};
pub use throttle::Throttle;

use crate::assess::{AssessError, AssessmentClient};
use crate::interpreter::{ScreenInterpreter, ScreenUpdate};
use crate::screen::ScreenSnapshot;
use crate::state::InterpreterState;
use worker::Worker;

#[derive(Debug)]
pub enum ServiceCommand {
    Snapshot(ScreenSnapshot),
    /// Finish everything in flight without stopping the worker.
    Flush,
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("service is not running")]
    Closed,
    #[error("snapshot queue is full")]
    QueueFull,
    #[error("failed to build assessment client: {0}")]
    Assess(#[from] AssessError),
}

/// Handle used by the capturer to feed snapshots.
#[derive(Clone)]
pub struct ServiceHandle {
    pub cmd_tx: mpsc::Sender<ServiceCommand>,
}

impl ServiceHandle {
    /// Queue a snapshot, waiting for room.
    pub async fn submit(&self, snapshot: ScreenSnapshot) -> Result<(), ServiceError> {
        self.cmd_tx
            .send(ServiceCommand::Snapshot(snapshot))
            .await
            .map_err(|_| ServiceError::Closed)
    }

    /// Queue a snapshot without waiting. A full queue drops it.
    pub fn try_submit(&self, snapshot: ScreenSnapshot) -> Result<(), ServiceError> {
        self.cmd_tx
            .try_send(ServiceCommand::Snapshot(snapshot))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => ServiceError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => ServiceError::Closed,
            })
    }

    pub async fn flush(&self) -> Result<(), ServiceError> {
        self.cmd_tx
            .send(ServiceCommand::Flush)
            .await
            .map_err(|_| ServiceError::Closed)
    }

    /// Ask the worker to flush and stop. Await the join handle returned by
    /// [`spawn_service`] to know when records are stored.
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.cmd_tx
            .send(ServiceCommand::Shutdown)
            .await
            .map_err(|_| ServiceError::Closed)
    }
}

/// Start the worker and persistence tasks on the current runtime.
pub fn spawn_service(
    config: &ScannerConfig,
    sink: Arc<dyn RecordSink>,
) -> Result<(ServiceHandle, mpsc::UnboundedReceiver<ScreenUpdate>, JoinHandle<()>), ServiceError> {
    let assessor = if config.assessment.enabled {
        Some(AssessmentClient::new(&config.assessment)?)
    } else {
        None
    };

    let (cmd_tx, cmd_rx) = mpsc::channel(config.queue_capacity.max(1));
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let (persist_tx, persist_rx) = mpsc::unbounded_channel();

    let id_base = sink.next_id();
    tracing::debug!(id_base, "Starting interpreter worker");
    let persistence = tokio::spawn(worker::run_persistence(persist_rx, sink));
    let interpreter_worker = Worker {
        interpreter: ScreenInterpreter::new(config.berserk_marker.clone()),
        state: InterpreterState::starting_at(id_base),
        throttle: Throttle::new(config.throttle.min_interval_ms),
        last_snapshot: None,
        updates_tx,
        persist_tx,
        assessor,
    };

    let join = tokio::spawn(async move {
        interpreter_worker.run(cmd_rx).await;
        if let Err(e) = persistence.await {
            tracing::error!("Persistence task failed: {}", e);
        }
    });

    Ok((ServiceHandle { cmd_tx }, updates_rx, join))
}
