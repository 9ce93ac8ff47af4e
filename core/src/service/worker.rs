use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use super::{RecordSink, ServiceCommand, SinkError, Throttle};
use crate::assess::{AssessmentClient, ItemAssessment, ItemAssessmentRequest};
use crate::interpreter::{ScreenInterpreter, ScreenUpdate};
use crate::screen::ScreenSnapshot;
use crate::state::InterpreterState;
use crate::tracking::{DungeonVisit, WayvesselSession};

#[derive(Debug)]
pub(super) enum PersistJob {
    Visit(DungeonVisit),
    Session(WayvesselSession),
    Assessment(ItemAssessment),
}

impl PersistJob {
    fn store(&self, sink: &dyn RecordSink) -> Result<(), SinkError> {
        match self {
            Self::Visit(v) => sink.save_visit(v),
            Self::Session(s) => sink.save_session(s),
            Self::Assessment(a) => sink.save_assessment(a),
        }
    }
}

/// Stores finished records, retrying each once.
pub(super) async fn run_persistence(
    mut rx: mpsc::UnboundedReceiver<PersistJob>,
    sink: Arc<dyn RecordSink>,
) {
    while let Some(job) = rx.recv().await {
        if let Err(e) = job.store(sink.as_ref()) {
            tracing::warn!(error = %e, "[PERSIST] Save failed, retrying once");
            if let Err(e) = job.store(sink.as_ref()) {
                tracing::error!(error = %e, record = ?job, "[PERSIST] Dropping record");
            }
        }
    }
}

pub(super) struct Worker {
    pub interpreter: ScreenInterpreter,
    pub state: InterpreterState,
    pub throttle: Throttle,
    pub last_snapshot: Option<ScreenSnapshot>,
    pub updates_tx: mpsc::UnboundedSender<ScreenUpdate>,
    pub persist_tx: mpsc::UnboundedSender<PersistJob>,
    pub assessor: Option<AssessmentClient>,
}

impl Worker {
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<ServiceCommand>) {
        // Newest snapshot refused by the throttle, waiting for its turn
        let mut pending: Option<ScreenSnapshot> = None;

        loop {
            let deadline = self.throttle.ready_at(Instant::now());
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(ServiceCommand::Snapshot(snapshot)) => {
                        if self.throttle.try_accept(Instant::now()) {
                            pending = None;
                            self.process(snapshot);
                        } else {
                            if pending.is_some() {
                                tracing::trace!("Coalescing throttled snapshot");
                            }
                            pending = Some(snapshot);
                        }
                    }
                    Some(ServiceCommand::Flush) => {
                        if let Some(snapshot) = pending.take() {
                            self.process(snapshot);
                        }
                        self.flush();
                    }
                    Some(ServiceCommand::Shutdown) | None => break,
                },
                _ = sleep_until(deadline), if pending.is_some() => {
                    if let Some(snapshot) = pending.take() {
                        self.throttle.mark(Instant::now());
                        self.process(snapshot);
                    }
                }
            }
        }

        if let Some(snapshot) = pending.take() {
            self.process(snapshot);
        }
        self.flush();
        tracing::info!("Interpreter worker stopped");
    }

    fn process(&mut self, snapshot: ScreenSnapshot) {
        if self
            .last_snapshot
            .as_ref()
            .is_some_and(|last| last.same_content(&snapshot))
        {
            tracing::trace!("Skipping unchanged snapshot");
            return;
        }

        let updates = self.interpreter.interpret(&snapshot, &mut self.state);
        self.last_snapshot = Some(snapshot);
        self.dispatch(updates);
    }

    fn flush(&mut self) {
        let now = self
            .last_snapshot
            .as_ref()
            .map(|s| s.captured_at)
            .unwrap_or_else(|| chrono::Local::now().naive_local());
        let updates = self.interpreter.flush(&mut self.state, now);
        self.dispatch(updates);
    }

    fn dispatch(&self, updates: Vec<ScreenUpdate>) {
        for update in updates {
            match &update {
                ScreenUpdate::DungeonDone { visit } | ScreenUpdate::DungeonFailed { visit } => {
                    let _ = self.persist_tx.send(PersistJob::Visit(visit.clone()));
                }
                ScreenUpdate::SessionFinished { session } => {
                    let _ = self.persist_tx.send(PersistJob::Session(session.clone()));
                }
                ScreenUpdate::AssessmentRequested { request } => self.spawn_assessment(request),
                _ => {}
            }
            // Consumers may have gone away; the worker keeps interpreting.
            let _ = self.updates_tx.send(update);
        }
    }

    fn spawn_assessment(&self, request: &ItemAssessmentRequest) {
        let Some(client) = self.assessor.clone() else {
            return;
        };
        let request = request.clone();
        let updates_tx = self.updates_tx.clone();
        let persist_tx = self.persist_tx.clone();

        tokio::spawn(async move {
            match client.assess_with_retry(&request).await {
                Ok(assessment) => {
                    tracing::info!(
                        item = %request.item_name,
                        quality = assessment.quality,
                        "[ASSESS] Item assessed"
                    );
                    let _ = persist_tx.send(PersistJob::Assessment(assessment.clone()));
                    let _ = updates_tx.send(ScreenUpdate::ItemAssessed { assessment });
                }
                Err(e) => {
                    tracing::warn!(item = %request.item_name, error = %e, "[ASSESS] Giving up");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ornalens_types::ScannerConfig;

    use crate::screen::ScreenType;
    use crate::screen::test_support::snapshot_at;
    use crate::service::{MemorySink, spawn_service};
    use crate::interpreter::ScreenUpdate;

    fn config(min_interval_ms: u64) -> ScannerConfig {
        let mut config = ScannerConfig::default();
        config.throttle.min_interval_ms = min_interval_ms;
        config.assessment.enabled = false;
        config
    }

    async fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ScreenUpdate>) -> Vec<ScreenUpdate> {
        let mut out = Vec::new();
        while let Some(update) = rx.recv().await {
            out.push(update);
        }
        out
    }

    #[tokio::test]
    async fn test_run_is_persisted_once() {
        let sink = Arc::new(MemorySink::new());
        let (handle, mut rx, join) = spawn_service(&config(0), sink.clone()).unwrap();

        let victory = snapshot_at(&["Victory", "Floor: 1 / 10", "500", "gold"], 2);
        handle
            .submit(snapshot_at(&["World dungeon", "Frost Dungeon", "Continue floor"], 0))
            .await
            .unwrap();
        handle
            .submit(snapshot_at(&["Codex", "SKILL", "Floor: 1 / 10"], 1))
            .await
            .unwrap();
        handle.submit(victory.clone()).await.unwrap();
        handle.submit(victory).await.unwrap();
        handle
            .submit(snapshot_at(&["Dungeon complete", "Floor: 1 / 10"], 3))
            .await
            .unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap();

        let updates = drain(&mut rx).await;
        let loot_updates = updates
            .iter()
            .filter(|u| matches!(u, ScreenUpdate::LootDelta { .. }))
            .count();
        assert_eq!(loot_updates, 1);

        let visits = sink.visits();
        assert_eq!(visits.len(), 1);
        assert!(visits[0].completed);
        assert_eq!(visits[0].gold, 500);
    }

    #[tokio::test]
    async fn test_throttled_snapshots_coalesce_to_newest() {
        let sink = Arc::new(MemorySink::new());
        let (handle, mut rx, join) = spawn_service(&config(60_000), sink).unwrap();

        handle.submit(snapshot_at(&["Codex", "SKILL"], 0)).await.unwrap();
        handle
            .submit(snapshot_at(&["Ghost's Wayvessel"], 1))
            .await
            .unwrap();
        handle
            .submit(snapshot_at(&["Notifications"], 2))
            .await
            .unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap();

        let screens: Vec<ScreenType> = drain(&mut rx)
            .await
            .into_iter()
            .filter_map(|u| match u {
                ScreenUpdate::ScreenChanged { screen } => Some(screen),
                _ => None,
            })
            .collect();
        assert_eq!(screens, vec![ScreenType::Battle, ScreenType::Notifications]);
    }

    #[tokio::test]
    async fn test_ids_continue_across_runs() {
        let sink = Arc::new(MemorySink::new());

        for minute in [0, 10] {
            let (handle, _rx, join) = spawn_service(&config(0), sink.clone()).unwrap();
            handle
                .submit(snapshot_at(&["Ghost's Wayvessel"], minute))
                .await
                .unwrap();
            handle
                .submit(snapshot_at(&["World dungeon", "Frost Dungeon"], minute + 1))
                .await
                .unwrap();
            handle.shutdown().await.unwrap();
            join.await.unwrap();
        }

        let visits = sink.visits();
        let sessions = sink.sessions();
        assert_eq!(visits.len(), 2);
        assert_eq!(sessions.len(), 2);
        assert_ne!(visits[0].id, visits[1].id);
        assert_ne!(sessions[0].id, sessions[1].id);
        assert_eq!(visits[1].session_id, Some(sessions[1].id));
    }

    #[tokio::test]
    async fn test_teardown_flushes_open_visit() {
        let sink = Arc::new(MemorySink::new());
        let (handle, _rx, join) = spawn_service(&config(0), sink.clone()).unwrap();

        handle
            .submit(snapshot_at(&["World dungeon", "Fire Dungeon"], 0))
            .await
            .unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap();

        let visits = sink.visits();
        assert_eq!(visits.len(), 1);
        assert!(!visits[0].completed);
        assert_eq!(visits[0].duration_seconds, Some(0));
    }
}
