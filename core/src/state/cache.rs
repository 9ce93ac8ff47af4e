use chrono::NaiveDateTime;
use hashbrown::HashMap;

use crate::assess::ItemAssessmentRequest;
use crate::extract::DungeonContext;
use crate::screen::ScreenType;
use crate::tracking::{CooldownLedger, DungeonVisit, GauntletRoster, WayvesselSession};

/// Everything the interpreter remembers between snapshots.
///
/// Pure storage: routing of facts lives in the lifecycle tracker. Owned by the
/// single interpreter worker and passed into every call, so tests can build
/// any prior state directly.
#[derive(Debug, Clone, Default)]
pub struct InterpreterState {
    pub last_screen: ScreenType,
    pub dungeon: DungeonContext,

    // Visit tracking: one current visit, others parked by dungeon name
    current_visit: Option<DungeonVisit>,
    on_hold: HashMap<String, DungeonVisit>,
    next_visit_id: u64,

    current_session: Option<WayvesselSession>,
    next_session_id: u64,

    pub cooldowns: CooldownLedger,
    pub roster: GauntletRoster,

    /// Last item sent for assessment, so a lingering detail screen is only
    /// assessed once.
    pub last_item_request: Option<ItemAssessmentRequest>,
}

impl InterpreterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty state whose visit and session ids start at `id_base`, so records
    /// from a new run never reuse ids already stored.
    pub fn starting_at(id_base: u64) -> Self {
        Self {
            next_visit_id: id_base,
            next_session_id: id_base,
            ..Self::default()
        }
    }

    // --- Visits ---

    pub fn current_visit(&self) -> Option<&DungeonVisit> {
        self.current_visit.as_ref()
    }

    pub fn current_visit_mut(&mut self) -> Option<&mut DungeonVisit> {
        self.current_visit.as_mut()
    }

    pub fn take_current_visit(&mut self) -> Option<DungeonVisit> {
        self.current_visit.take()
    }

    /// Create a fresh current visit, attached to the active session if any.
    /// The caller must have parked or finished the previous current visit.
    pub fn start_visit(&mut self, name: &str, start_time: NaiveDateTime) -> &DungeonVisit {
        let id = self.next_visit_id;
        self.next_visit_id += 1;

        let session_id = self.current_session.as_mut().map(|s| {
            s.dungeons_visited += 1;
            s.id
        });

        tracing::info!(
            "[VISIT] Starting visit ID={} name={} session={:?}",
            id,
            name,
            session_id
        );

        self.current_visit
            .insert(DungeonVisit::new(id, name, self.dungeon.mode, session_id, start_time))
    }

    /// Move the current visit into the on-hold map. Returns its name.
    pub fn park_current_visit(&mut self) -> Option<String> {
        let visit = self.current_visit.take()?;
        let name = visit.name.clone();
        tracing::info!("[VISIT] Parking visit ID={} name={}", visit.id, name);
        self.on_hold.insert(name.clone(), visit);
        Some(name)
    }

    /// Make the on-hold visit named `name` current again.
    /// Returns false if there is none.
    pub fn resume_visit(&mut self, name: &str) -> bool {
        let Some(visit) = self.on_hold.remove(name) else {
            return false;
        };
        tracing::info!("[VISIT] Resuming visit ID={} name={}", visit.id, name);
        self.current_visit = Some(visit);
        true
    }

    pub fn on_hold_visit(&self, name: &str) -> Option<&DungeonVisit> {
        self.on_hold.get(name)
    }

    /// Names of parked visits, sorted for stable output.
    pub fn on_hold_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.on_hold.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove every parked visit belonging to `session_id`.
    pub fn take_on_hold_for_session(&mut self, session_id: u64) -> Vec<DungeonVisit> {
        let names: Vec<String> = self
            .on_hold
            .iter()
            .filter(|(_, v)| v.session_id == Some(session_id))
            .map(|(name, _)| name.clone())
            .collect();
        let mut visits: Vec<DungeonVisit> =
            names.iter().filter_map(|n| self.on_hold.remove(n)).collect();
        visits.sort_by_key(|v| v.id);
        visits
    }

    pub fn take_all_on_hold(&mut self) -> Vec<DungeonVisit> {
        let mut visits: Vec<DungeonVisit> = self.on_hold.drain().map(|(_, v)| v).collect();
        visits.sort_by_key(|v| v.id);
        visits
    }

    // --- Sessions ---

    pub fn current_session(&self) -> Option<&WayvesselSession> {
        self.current_session.as_ref()
    }

    pub fn current_session_mut(&mut self) -> Option<&mut WayvesselSession> {
        self.current_session.as_mut()
    }

    pub fn take_current_session(&mut self) -> Option<WayvesselSession> {
        self.current_session.take()
    }

    /// Start a new session and adopt an unattached current visit into it.
    /// The caller must have finished the previous session.
    pub fn start_session(&mut self, name: &str, start_time: NaiveDateTime) -> u64 {
        let id = self.next_session_id;
        self.next_session_id += 1;

        let mut session = WayvesselSession::new(id, name, start_time);
        if let Some(visit) = self.current_visit.as_mut()
            && visit.session_id.is_none()
        {
            visit.session_id = Some(id);
            session.dungeons_visited += 1;
        }

        tracing::info!("[SESSION] Starting session ID={} name={}", id, name);
        self.current_session = Some(session);
        id
    }
}
