use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::extract::LootDelta;

/// A named play session inside someone's wayvessel, spanning many visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WayvesselSession {
    pub id: u64,
    pub name: String,
    pub start_time: NaiveDateTime,
    pub duration_seconds: Option<i64>,
    pub orns: i64,
    pub gold: i64,
    pub experience: i64,
    pub dungeons_visited: u32,
}

impl WayvesselSession {
    pub fn new(id: u64, name: impl Into<String>, start_time: NaiveDateTime) -> Self {
        Self {
            id,
            name: name.into(),
            start_time,
            duration_seconds: None,
            orns: 0,
            gold: 0,
            experience: 0,
            dungeons_visited: 0,
        }
    }

    pub fn apply_loot(&mut self, loot: &LootDelta) {
        self.orns += loot.orns.unwrap_or(0).max(0);
        self.gold += loot.gold.unwrap_or(0).max(0);
        self.experience += loot.experience.unwrap_or(0).max(0);
    }

    pub fn finish(&mut self, now: NaiveDateTime) {
        if self.duration_seconds.is_none() {
            let secs = now.signed_duration_since(self.start_time).num_seconds();
            self.duration_seconds = Some(secs.max(0));
        }
    }
}
