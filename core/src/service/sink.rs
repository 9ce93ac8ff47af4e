use std::sync::Mutex;

use crate::assess::ItemAssessment;
use crate::tracking::{DungeonVisit, WayvesselSession};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage collaborator for finished records.
///
/// Called from the persistence task only, never from the interpreter worker.
pub trait RecordSink: Send + Sync {
    fn save_visit(&self, visit: &DungeonVisit) -> Result<(), SinkError>;
    fn save_session(&self, session: &WayvesselSession) -> Result<(), SinkError>;
    fn save_assessment(&self, assessment: &ItemAssessment) -> Result<(), SinkError>;

    /// First id a new service run may hand out. Must be above every stored
    /// visit and session id; the default derives it from the wall clock.
    fn next_id(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_micros()).unwrap_or(0)
    }
}

/// Keeps records in memory. Used by the replay tool and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    visits: Mutex<Vec<DungeonVisit>>,
    sessions: Mutex<Vec<WayvesselSession>>,
    assessments: Mutex<Vec<ItemAssessment>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<DungeonVisit> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn sessions(&self) -> Vec<WayvesselSession> {
        self.sessions.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn assessments(&self) -> Vec<ItemAssessment> {
        self.assessments.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

fn push<T: Clone>(store: &Mutex<Vec<T>>, record: &T) -> Result<(), SinkError> {
    store
        .lock()
        .map_err(|e| SinkError::Unavailable(e.to_string()))?
        .push(record.clone());
    Ok(())
}

impl RecordSink for MemorySink {
    fn save_visit(&self, visit: &DungeonVisit) -> Result<(), SinkError> {
        push(&self.visits, visit)
    }

    fn save_session(&self, session: &WayvesselSession) -> Result<(), SinkError> {
        push(&self.sessions, session)
    }

    fn save_assessment(&self, assessment: &ItemAssessment) -> Result<(), SinkError> {
        push(&self.assessments, assessment)
    }

    fn next_id(&self) -> u64 {
        let visits = self.visits().into_iter().map(|v| v.id);
        let sessions = self.sessions().into_iter().map(|s| s.id);
        visits.chain(sessions).max().map_or(0, |id| id + 1)
    }
}
