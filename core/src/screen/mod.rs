//! Screen model: the flat observation list captured from the game UI.
//!
//! A snapshot is the only input to the engine. Observations carry no
//! identity across snapshots, so everything downstream matches by text and
//! tree depth.

pub mod classifier;

pub use classifier::{ScreenType, classify};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// On-screen bounding box of an observation, in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// One text fragment from the UI tree walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenObservation {
    pub text: String,
    #[serde(default)]
    pub bounds: Rect,
    /// Nesting level in the UI tree at capture time.
    pub depth: u32,
    /// Position in the depth-first, pre-order traversal.
    #[serde(default)]
    pub sequence_index: u32,
}

/// Ordered observations captured atomically at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenSnapshot {
    pub captured_at: NaiveDateTime,
    pub observations: Vec<ScreenObservation>,
}

impl ScreenSnapshot {
    pub fn new(captured_at: NaiveDateTime, observations: Vec<ScreenObservation>) -> Self {
        Self {
            captured_at,
            observations,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&ScreenObservation> {
        self.observations.get(idx)
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.observations.iter().map(|o| o.text.as_str())
    }

    /// True if any observation contains `needle` (case-sensitive).
    pub fn contains(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    /// True if any observation contains `needle`, ignoring ASCII case.
    /// `needle` must already be lowercase.
    pub fn contains_ci(&self, needle: &str) -> bool {
        self.texts().any(|t| t.to_lowercase().contains(needle))
    }

    /// True if any observation's trimmed text equals `needle`, ignoring case.
    pub fn has_token_ci(&self, needle: &str) -> bool {
        self.texts().any(|t| t.trim().eq_ignore_ascii_case(needle))
    }

    /// Deepest nesting level of any observation (0 for an empty snapshot).
    pub fn highest_depth(&self) -> u32 {
        self.observations.iter().map(|o| o.depth).max().unwrap_or(0)
    }

    /// Same texts at the same depths, in the same order. Timestamps and bounds
    /// are ignored: a re-delivered screen is still the same screen.
    pub fn same_content(&self, other: &ScreenSnapshot) -> bool {
        self.observations.len() == other.observations.len()
            && self
                .observations
                .iter()
                .zip(&other.observations)
                .all(|(a, b)| a.text == b.text && a.depth == b.depth)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::NaiveDate;

    pub fn at_minute(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(12, minute, 0))
            .unwrap()
    }

    pub fn obs(text: &str, depth: u32) -> ScreenObservation {
        ScreenObservation {
            text: text.to_string(),
            bounds: Rect::default(),
            depth,
            sequence_index: 0,
        }
    }

    pub fn snapshot_with_depths(items: &[(&str, u32)], minute: u32) -> ScreenSnapshot {
        let observations = items
            .iter()
            .enumerate()
            .map(|(i, (text, depth))| ScreenObservation {
                sequence_index: i as u32,
                ..obs(text, *depth)
            })
            .collect();
        ScreenSnapshot::new(at_minute(minute), observations)
    }

    pub fn snapshot_at(texts: &[&str], minute: u32) -> ScreenSnapshot {
        let items: Vec<(&str, u32)> = texts.iter().map(|t| (*t, 1)).collect();
        snapshot_with_depths(&items, minute)
    }

    pub fn snapshot(texts: &[&str]) -> ScreenSnapshot {
        snapshot_at(texts, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[test]
    fn test_highest_depth() {
        let snap = snapshot_with_depths(&[("a", 2), ("b", 7), ("c", 3)], 0);
        assert_eq!(snap.highest_depth(), 7);
        assert_eq!(snapshot(&[]).highest_depth(), 0);
    }

    #[test]
    fn test_same_content_ignores_timestamp() {
        let a = snapshot_at(&["Floor: 1 / 10", "Victory"], 1);
        let b = snapshot_at(&["Floor: 1 / 10", "Victory"], 2);
        let c = snapshot_at(&["Floor: 2 / 10", "Victory"], 2);
        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn test_contains_ci() {
        let snap = snapshot(&["World Dungeon", "Hold to enter"]);
        assert!(snap.contains_ci("world dungeon"));
        assert!(!snap.contains("world dungeon"));
        assert!(snap.has_token_ci("hold to enter"));
    }
}
