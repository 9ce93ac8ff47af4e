use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::assess::{ItemAssessment, ItemAssessmentRequest};
use crate::extract::{DungeonMode, LootDelta, PartyInvite};
use crate::screen::ScreenType;
use crate::tracking::{DungeonVisit, RosterEntry, WayvesselSession};

/// Updates emitted for overlay, persistence and notification consumers.
/// These are the engine's only output; consumers apply them independently.
///
/// Serialized as `{"kind": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ScreenUpdate {
    ScreenChanged {
        screen: ScreenType,
    },

    // Dungeon visit lifecycle
    NewDungeon {
        visit_id: u64,
        name: String,
        resumed: bool,
        on_hold: Vec<String>,
    },
    DungeonEntered {
        visit_id: u64,
        name: String,
        floor: u32,
    },
    ModeChanged {
        visit_id: Option<u64>,
        mode: DungeonMode,
        cooldown_hours: u32,
    },
    FloorChanged {
        visit_id: u64,
        floor: u32,
    },
    FloorCleared {
        visit_id: u64,
        floor: u32,
    },
    GodforgeIncremented {
        visit_id: u64,
        total: u32,
    },
    LootDelta {
        visit_id: u64,
        loot: LootDelta,
    },
    DungeonDone {
        visit: DungeonVisit,
    },
    DungeonFailed {
        visit: DungeonVisit,
    },
    CooldownStarted {
        name: String,
        ready_at: NaiveDateTime,
    },

    // Wayvessel session lifecycle
    SessionStarted {
        session_id: u64,
        name: String,
    },
    SessionFinished {
        session: WayvesselSession,
    },

    InviterList {
        invites: Vec<PartyInvite>,
    },
    AssessmentRequested {
        request: ItemAssessmentRequest,
    },
    ItemAssessed {
        assessment: ItemAssessment,
    },
    GauntletRoster {
        members: Vec<RosterEntry>,
    },
}

impl ScreenUpdate {
    /// Finished visit carried by this update, if any.
    pub fn finished_visit(&self) -> Option<&DungeonVisit> {
        match self {
            Self::DungeonDone { visit } | Self::DungeonFailed { visit } => Some(visit),
            _ => None,
        }
    }

    pub fn finished_session(&self) -> Option<&WayvesselSession> {
        match self {
            Self::SessionFinished { session } => Some(session),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let update = ScreenUpdate::FloorChanged {
            visit_id: 3,
            floor: 7,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["kind"], "floor_changed");
        assert_eq!(json["payload"]["floor"], 7);
    }
}
