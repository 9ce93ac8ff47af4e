//! Dungeon entry / floor / loot extraction.
//!
//! The dungeon context survives between snapshots: the game never shows the
//! dungeon name, the floor and the loot on the same screen, so the extractor
//! remembers what it last saw and reports only what a snapshot adds to it.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ScreenFact;
use super::primitives::scan_loot;
use crate::screen::ScreenSnapshot;
use crate::screen::classifier::markers;

/// Dungeon name used for the rune gauntlet screen, which has no name row.
pub const PERSONAL_GAUNTLET: &str = "Personal gauntlet";

static FLOOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)floor:?\s*(\d+)\s*/\s*(\d+|∞)").unwrap());

static MODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\w+)\s+mode\s*$").unwrap());

// Result banners are whole observations; words like "incomplete" or
// "defeated" inside other rows must not match.
static VICTORY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*victory\s*!?\s*$").unwrap());

static COMPLETE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:dungeon\s+)?complete\s*!?\s*$").unwrap());

static DEFEAT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*defeat\s*!?\s*$").unwrap());

const CHECKMARKS: &[char] = &['✓', '✔', '☑', '✅'];
const CONTINUE_FLOOR: &str = "continue floor";
const HOLD_TO_ENTER: &str = "hold to enter";
const GODFORGED: &str = "Godforged";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DungeonModeKind {
    #[default]
    Normal,
    Boss,
    Endless,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DungeonMode {
    pub kind: DungeonModeKind,
    pub is_hard: bool,
}

/// What the extractor remembers about the dungeon currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DungeonContext {
    pub dungeon_name: Option<String>,
    pub has_entered: bool,
    pub is_entering_new_dungeon: bool,
    pub floor_number: Option<u32>,
    pub mode: DungeonMode,
    pub victory_screen_handled_for_floor: bool,
}

impl DungeonContext {
    fn reset_progress(&mut self) {
        self.has_entered = false;
        self.floor_number = None;
        self.victory_screen_handled_for_floor = false;
    }
}

/// Dungeon name shown on an entry screen, if any.
pub fn detect_dungeon_name(snapshot: &ScreenSnapshot) -> Option<String> {
    if snapshot.contains_ci(markers::SERIES_OF_OPPONENTS) && snapshot.contains_ci(markers::RUNESHOP)
    {
        return Some(PERSONAL_GAUNTLET.to_string());
    }

    let obs = &snapshot.observations;
    obs.iter()
        .position(|o| {
            let t = o.text.to_lowercase();
            t.contains(markers::WORLD_DUNGEON) || t.contains(markers::SPECIAL_DUNGEON)
        })
        .and_then(|idx| obs.get(idx + 1))
        .map(|o| o.text.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Current floor from a `Floor: n / m` (or `/ ∞`) observation.
pub fn detect_floor(snapshot: &ScreenSnapshot) -> Option<u32> {
    snapshot.texts().find_map(|t| {
        FLOOR_PATTERN
            .captures(t)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

/// Apply any `<word> mode` toggles on screen to `mode`.
///
/// A toggle is on when one of the next two observations carries a checkmark.
/// Returns `None` if the screen shows no mode toggles at all.
pub fn detect_mode(snapshot: &ScreenSnapshot, mode: DungeonMode) -> Option<DungeonMode> {
    let obs = &snapshot.observations;
    let mut mode = mode;
    let mut seen = false;

    for (idx, o) in obs.iter().enumerate() {
        let Some(word) = MODE_PATTERN
            .captures(&o.text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase())
        else {
            continue;
        };
        let checked = obs
            .iter()
            .skip(idx + 1)
            .take(2)
            .any(|next| next.text.contains(CHECKMARKS));

        match word.as_str() {
            "hard" => mode.is_hard = checked,
            "boss" | "endless" => {
                let kind = if word == "boss" {
                    DungeonModeKind::Boss
                } else {
                    DungeonModeKind::Endless
                };
                if checked {
                    mode.kind = kind;
                } else if mode.kind == kind {
                    mode.kind = DungeonModeKind::Normal;
                }
            }
            _ => continue,
        }
        seen = true;
    }

    seen.then_some(mode)
}

fn has_banner(snapshot: &ScreenSnapshot, pattern: &Regex) -> bool {
    snapshot.texts().any(|t| pattern.is_match(t))
}

/// Run the dungeon extractor over one snapshot, updating `ctx` and returning
/// facts in the order the lifecycle tracker must apply them.
pub fn extract_dungeon(snapshot: &ScreenSnapshot, ctx: &mut DungeonContext) -> Vec<ScreenFact> {
    let mut facts = Vec::new();

    if let Some(name) = detect_dungeon_name(snapshot) {
        if ctx.dungeon_name.as_deref() != Some(name.as_str()) {
            ctx.dungeon_name = Some(name.clone());
            ctx.reset_progress();
        }
        facts.push(ScreenFact::DungeonSighted { name });
    }

    if snapshot.contains_ci(CONTINUE_FLOOR) {
        ctx.is_entering_new_dungeon = false;
    }
    if snapshot.contains_ci(HOLD_TO_ENTER) {
        ctx.is_entering_new_dungeon = true;
    }

    if let Some(mode) = detect_mode(snapshot, ctx.mode)
        && mode != ctx.mode
    {
        ctx.mode = mode;
        facts.push(ScreenFact::ModeDetected(mode));
    }

    // Nothing below means anything without a dungeon to attribute it to.
    if ctx.dungeon_name.is_none() {
        return facts;
    }

    let defeat = has_banner(snapshot, &DEFEAT_PATTERN);
    let complete = has_banner(snapshot, &COMPLETE_PATTERN);
    let victory = has_banner(snapshot, &VICTORY_PATTERN);

    if let Some(floor) = detect_floor(snapshot) {
        if !ctx.has_entered && !ctx.is_entering_new_dungeon && !(floor == 1 && defeat) {
            ctx.has_entered = true;
            facts.push(ScreenFact::DungeonEntered { floor });
        }
        if ctx.has_entered && ctx.floor_number != Some(floor) {
            ctx.floor_number = Some(floor);
            ctx.victory_screen_handled_for_floor = false;
            facts.push(ScreenFact::FloorReached { floor });
        }
    }

    if (victory || complete || defeat) && !ctx.victory_screen_handled_for_floor {
        ctx.victory_screen_handled_for_floor = true;

        let loot = scan_loot(&snapshot.observations);
        if !loot.is_empty() {
            facts.push(ScreenFact::LootFound(loot));
        }
        let godforges = snapshot
            .texts()
            .filter(|t| t.trim_start().starts_with(GODFORGED))
            .count() as u32;
        if godforges > 0 {
            facts.push(ScreenFact::GodforgesFound(godforges));
        }
        if victory {
            facts.push(ScreenFact::FloorCleared);
        }
    }

    if complete || defeat {
        facts.push(ScreenFact::DungeonFinished {
            completed: !defeat,
        });
        ctx.dungeon_name = None;
        ctx.reset_progress();
    }

    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::primitives::LootDelta;
    use crate::screen::test_support::snapshot;

    fn entered_ctx(name: &str, floor: u32) -> DungeonContext {
        DungeonContext {
            dungeon_name: Some(name.to_string()),
            has_entered: true,
            floor_number: Some(floor),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_follows_world_dungeon_marker() {
        let snap = snapshot(&["World dungeon", "Frost Dungeon", "Hold to enter"]);
        assert_eq!(detect_dungeon_name(&snap).as_deref(), Some("Frost Dungeon"));
    }

    #[test]
    fn test_personal_gauntlet_name() {
        let snap = snapshot(&["Battle a series of opponents", "Runeshop", "Special dungeon", "X"]);
        assert_eq!(detect_dungeon_name(&snap).as_deref(), Some(PERSONAL_GAUNTLET));
    }

    #[test]
    fn test_marker_as_last_observation_has_no_name() {
        let snap = snapshot(&["Special dungeon"]);
        assert_eq!(detect_dungeon_name(&snap), None);
    }

    #[test]
    fn test_floor_pattern() {
        assert_eq!(detect_floor(&snapshot(&["Floor: 3 / 10"])), Some(3));
        assert_eq!(detect_floor(&snapshot(&["Floor: 12 / ∞"])), Some(12));
        assert_eq!(detect_floor(&snapshot(&["Floor 3"])), None);
    }

    #[test]
    fn test_mode_toggles() {
        let base = DungeonMode::default();
        let snap = snapshot(&["Hard mode", "✓", "Boss mode", "", "✓", "Endless mode", "off"]);
        let mode = detect_mode(&snap, base).unwrap();
        assert!(mode.is_hard);
        assert_eq!(mode.kind, DungeonModeKind::Boss);

        let snap = snapshot(&["Hard mode", "off", "Boss mode", "off"]);
        let cleared = detect_mode(&snap, mode).unwrap();
        assert_eq!(cleared, DungeonMode::default());

        assert_eq!(detect_mode(&snapshot(&["Floor: 1 / 10"]), mode), None);
    }

    #[test]
    fn test_entry_waits_for_continue_floor() {
        let mut ctx = DungeonContext::default();
        let facts = extract_dungeon(
            &snapshot(&["World dungeon", "Frost Dungeon", "Hold to enter"]),
            &mut ctx,
        );
        assert_eq!(
            facts,
            vec![ScreenFact::DungeonSighted {
                name: "Frost Dungeon".into()
            }]
        );
        assert!(ctx.is_entering_new_dungeon);

        // Still on the entry animation: floor visible, not yet entered.
        let facts = extract_dungeon(&snapshot(&["Floor: 1 / 10"]), &mut ctx);
        assert!(facts.is_empty());

        let facts = extract_dungeon(&snapshot(&["Floor: 1 / 10", "Continue floor"]), &mut ctx);
        assert_eq!(
            facts,
            vec![
                ScreenFact::DungeonEntered { floor: 1 },
                ScreenFact::FloorReached { floor: 1 }
            ]
        );
        assert!(ctx.has_entered);
    }

    #[test]
    fn test_defeat_on_floor_one_is_not_an_entry() {
        let mut ctx = DungeonContext {
            dungeon_name: Some("Frost Dungeon".into()),
            ..Default::default()
        };
        let facts = extract_dungeon(&snapshot(&["Floor: 1 / 10", "Defeat"]), &mut ctx);
        assert_eq!(facts, vec![ScreenFact::DungeonFinished { completed: false }]);
    }

    #[test]
    fn test_victory_loot_once_per_floor() {
        let mut ctx = entered_ctx("Frost Dungeon", 2);
        let screen = snapshot(&["Floor: 2 / 10", "Victory", "120", "Orns", "Godforged Sword"]);

        let facts = extract_dungeon(&screen, &mut ctx);
        assert_eq!(
            facts,
            vec![
                ScreenFact::LootFound(LootDelta {
                    orns: Some(120),
                    ..Default::default()
                }),
                ScreenFact::GodforgesFound(1),
                ScreenFact::FloorCleared,
            ]
        );

        // Same victory screen again: already handled.
        assert!(extract_dungeon(&screen, &mut ctx).is_empty());

        // Next floor re-arms the victory handler.
        let facts = extract_dungeon(&snapshot(&["Floor: 3 / 10"]), &mut ctx);
        assert_eq!(facts, vec![ScreenFact::FloorReached { floor: 3 }]);
        assert!(!ctx.victory_screen_handled_for_floor);
    }

    #[test]
    fn test_complete_finishes_and_resets() {
        let mut ctx = entered_ctx("Frost Dungeon", 10);
        let facts = extract_dungeon(&snapshot(&["Dungeon complete!", "50", "gold"]), &mut ctx);
        assert_eq!(
            facts,
            vec![
                ScreenFact::LootFound(LootDelta {
                    gold: Some(50),
                    ..Default::default()
                }),
                ScreenFact::DungeonFinished { completed: true },
            ]
        );
        assert_eq!(ctx.dungeon_name, None);
        assert!(!ctx.has_entered);
    }

    #[test]
    fn test_result_words_inside_other_rows_are_ignored() {
        let mut ctx = entered_ctx("Frost Dungeon", 3);
        for texts in [
            &["Quests", "2 incomplete"][..],
            &["Completed achievements"][..],
            &["Arisen Golem defeated", "Floor: 3 / 10"][..],
            &["Victory points: 12"][..],
        ] {
            assert!(extract_dungeon(&snapshot(texts), &mut ctx).is_empty(), "{texts:?}");
        }
        assert_eq!(ctx.dungeon_name.as_deref(), Some("Frost Dungeon"));
        assert!(ctx.has_entered);
    }

    #[test]
    fn test_result_banners_match_whole_row() {
        let mut ctx = entered_ctx("Frost Dungeon", 3);
        let facts = extract_dungeon(&snapshot(&["  DEFEAT  "]), &mut ctx);
        assert_eq!(facts, vec![ScreenFact::DungeonFinished { completed: false }]);
    }

    #[test]
    fn test_no_context_no_progress_facts() {
        let mut ctx = DungeonContext::default();
        let facts = extract_dungeon(&snapshot(&["Floor: 4 / 10", "Victory", "5", "gold"]), &mut ctx);
        assert!(facts.is_empty());
    }
}
