use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::extract::{DungeonMode, DungeonModeKind, LootDelta};

/// Hours until a world dungeon can be entered again, by mode.
pub fn cooldown_hours(name: &str, mode: DungeonMode) -> u32 {
    if name.split_whitespace().last() != Some("Dungeon") {
        return 0;
    }
    match (mode.kind, mode.is_hard) {
        (DungeonModeKind::Normal, true) => 6,
        (DungeonModeKind::Normal, false) => 11,
        (DungeonModeKind::Boss, true) => 11,
        (DungeonModeKind::Boss, false) => 22,
        (DungeonModeKind::Endless, _) => 22,
    }
}

/// One run through a dungeon. Serialized as the persistence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonVisit {
    pub id: u64,
    pub session_id: Option<u64>,
    pub name: String,
    pub mode: DungeonMode,
    pub start_time: NaiveDateTime,
    pub duration_seconds: Option<i64>,
    pub orns: i64,
    pub gold: i64,
    pub experience: i64,
    pub floor: u32,
    pub godforges: u32,
    pub completed: bool,
}

impl DungeonVisit {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        mode: DungeonMode,
        session_id: Option<u64>,
        start_time: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            session_id,
            name: name.into(),
            mode,
            start_time,
            duration_seconds: None,
            orns: 0,
            gold: 0,
            experience: 0,
            floor: 0,
            godforges: 0,
            completed: false,
        }
    }

    pub fn apply_loot(&mut self, loot: &LootDelta) {
        self.orns += loot.orns.unwrap_or(0).max(0);
        self.gold += loot.gold.unwrap_or(0).max(0);
        self.experience += loot.experience.unwrap_or(0).max(0);
    }

    pub fn cooldown_hours(&self) -> u32 {
        cooldown_hours(&self.name, self.mode)
    }

    /// Floor is only set once the dungeon was actually entered.
    pub fn was_entered(&self) -> bool {
        self.floor > 0
    }

    pub fn is_finished(&self) -> bool {
        self.duration_seconds.is_some()
    }

    /// Stamp the duration. Only the first call has any effect.
    pub fn finish(&mut self, now: NaiveDateTime, completed: bool) {
        if self.is_finished() {
            return;
        }
        let secs = now.signed_duration_since(self.start_time).num_seconds();
        self.duration_seconds = Some(secs.max(0));
        self.completed = completed;
    }
}
