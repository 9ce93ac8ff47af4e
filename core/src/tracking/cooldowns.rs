//! Dungeon cooldown ledger, keyed by canonical dungeon name.

use chrono::{Duration, NaiveDateTime};
use hashbrown::HashMap;

use crate::extract::primitives::strip_prefixes;

#[derive(Debug, Clone, Default)]
pub struct CooldownLedger {
    ready_at: HashMap<String, NaiveDateTime>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cooldown starting at `finished_at`. Returns the ready time, or
    /// `None` when `hours` is zero.
    pub fn start(&mut self, name: &str, finished_at: NaiveDateTime, hours: u32) -> Option<NaiveDateTime> {
        if hours == 0 {
            return None;
        }
        let ready = finished_at + Duration::hours(i64::from(hours));
        self.ready_at.insert(strip_prefixes(name), ready);
        Some(ready)
    }

    /// Time left before `name` can be entered again, if still cooling down.
    pub fn remaining(&self, name: &str, now: NaiveDateTime) -> Option<Duration> {
        let ready = self.ready_at.get(&strip_prefixes(name))?;
        let left = *ready - now;
        (left > Duration::zero()).then_some(left)
    }

    /// Drop expired entries.
    pub fn prune(&mut self, now: NaiveDateTime) {
        self.ready_at.retain(|_, ready| *ready > now);
    }

    pub fn len(&self) -> usize {
        self.ready_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready_at.is_empty()
    }
}
