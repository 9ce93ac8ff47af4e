//! Kingdom gauntlet roster extraction.
//!
//! The gauntlet view lists, per floor, the kingdom member assigned to it and
//! the mob they face:
//!
//! ```text
//! Floor: 1
//!   <character>   Level 250
//!   VS
//!   <mob>         Level 260
//! Floor: 2
//!   ...
//! +
//! ```
//!
//! The game does not print who won. It does, however, nest the row of the
//! eliminated side one level deeper (the greyed-out overlay), so the outcome
//! is read from tree depth relative to the deepest row on screen.

use std::sync::LazyLock;

use hashbrown::HashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::primitives::reaches_depth;
use crate::screen::ScreenSnapshot;

static FLOOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*floor:\s*(\d+)\s*$").unwrap());

const KINGDOM_GAUNTLET: &str = "kingdom gauntlet";
const ALLIES: &str = "Allies";
const VS: &str = "vs";
const LEVEL_PREFIX: &str = "level ";
const NEXT_FLOOR: &str = "+";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GauntletFloor {
    pub number: u32,
    pub mob_name: String,
    pub loss: bool,
    pub win: bool,
}

impl GauntletFloor {
    pub fn in_progress(&self) -> bool {
        !self.loss && !self.win
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingdomMember {
    pub character_name: String,
    pub floors: HashMap<u32, GauntletFloor>,
}

impl KingdomMember {
    pub fn new(character_name: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
            floors: HashMap::new(),
        }
    }

    /// Floors this member is still fighting.
    pub fn num_floors(&self) -> usize {
        self.floors.values().filter(|f| f.in_progress()).count()
    }

    pub fn has_berserk_floor(&self, berserk_marker: &str) -> bool {
        self.floors
            .values()
            .any(|f| f.in_progress() && f.mob_name.contains(berserk_marker))
    }
}

/// Outcome of one gauntlet floor as `(win, loss)`.
///
/// A side whose row reaches the deepest level on screen has been eliminated:
/// the mob being there means the member won, the member being there means
/// they lost.
pub fn floor_outcome(highest_depth: u32, mob_depth: u32, character_depth: u32) -> (bool, bool) {
    (
        reaches_depth(mob_depth, highest_depth),
        reaches_depth(character_depth, highest_depth),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GauntletParse {
    /// Recognised view whose layout cannot be read (the allies tab).
    Unsupported,
    Members(Vec<KingdomMember>),
}

pub fn is_gauntlet_view(snapshot: &ScreenSnapshot) -> bool {
    snapshot.contains_ci(KINGDOM_GAUNTLET)
}

#[derive(Default)]
struct FloorBlock {
    character: Option<(String, u32)>,
    mob: Option<(String, u32)>,
}

pub fn extract_gauntlet(snapshot: &ScreenSnapshot) -> GauntletParse {
    if snapshot.texts().any(|t| t.contains(ALLIES)) {
        return GauntletParse::Unsupported;
    }

    let highest_depth = snapshot.highest_depth();
    let mut members: Vec<KingdomMember> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut block = FloorBlock::default();
    let mut first_floor_seen = false;
    let mut vs_after_floor = false;
    let mut floor_number: u32 = 0;
    let mut prev: Option<(&str, u32)> = None;

    let mut commit = |block: &mut FloorBlock, number: u32| {
        let Some((character, character_depth)) = block.character.take() else {
            block.mob = None;
            return;
        };
        let (mob_name, mob_depth) = block.mob.take().unwrap_or_default();
        let (win, loss) = floor_outcome(highest_depth, mob_depth, character_depth);
        let idx = *index.entry(character.clone()).or_insert_with(|| {
            members.push(KingdomMember::new(character.clone()));
            members.len() - 1
        });
        members[idx].floors.insert(
            number,
            GauntletFloor {
                number,
                mob_name,
                loss,
                win,
            },
        );
    };

    for obs in &snapshot.observations {
        let text = obs.text.trim();

        let next_floor = if let Some(n) = FLOOR_PATTERN
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            Some(n)
        } else if text == NEXT_FLOOR && first_floor_seen {
            Some(floor_number + 1)
        } else {
            None
        };

        if let Some(n) = next_floor {
            floor_number = n;
            first_floor_seen = true;
            vs_after_floor = false;
            commit(&mut block, floor_number.saturating_sub(1));
            prev = Some((text, obs.depth));
            continue;
        }

        if first_floor_seen {
            if text.eq_ignore_ascii_case(VS) {
                vs_after_floor = true;
            } else if text.to_lowercase().starts_with(LEVEL_PREFIX)
                && let Some((prev_text, prev_depth)) = prev
            {
                if vs_after_floor {
                    block.mob = Some((prev_text.to_string(), obs.depth));
                } else {
                    block.character = Some((prev_text.to_string(), prev_depth));
                }
            }
        }

        prev = Some((text, obs.depth));
    }

    // The last block has no following floor marker when the view is
    // scrolled so the `+` row is off screen.
    commit(&mut block, floor_number);

    GauntletParse::Members(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::test_support::snapshot_with_depths;

    fn members(parse: GauntletParse) -> Vec<KingdomMember> {
        match parse {
            GauntletParse::Members(m) => m,
            GauntletParse::Unsupported => panic!("unexpected unsupported layout"),
        }
    }

    #[test]
    fn test_floor_outcome() {
        assert_eq!(floor_outcome(9, 9, 7), (true, false));
        assert_eq!(floor_outcome(9, 7, 9), (false, true));
        assert_eq!(floor_outcome(9, 7, 7), (false, false));
    }

    #[test]
    fn test_win_when_mob_is_deepest() {
        let snap = snapshot_with_depths(
            &[
                ("Kingdom Gauntlet", 2),
                ("Floor: 1", 3),
                ("Ghost", 4),
                ("Level 250", 4),
                ("VS", 4),
                ("Arisen Dragon", 5),
                ("Level 260", 6),
                ("+", 3),
            ],
            0,
        );
        let roster = members(extract_gauntlet(&snap));
        assert_eq!(roster.len(), 1);
        let floor = &roster[0].floors[&1];
        assert_eq!(floor.mob_name, "Arisen Dragon");
        assert!(floor.win);
        assert!(!floor.loss);
    }

    #[test]
    fn test_swapped_depths_swap_flags() {
        let snap = snapshot_with_depths(
            &[
                ("Kingdom Gauntlet", 2),
                ("Floor: 1", 3),
                ("Ghost", 6),
                ("Level 250", 4),
                ("VS", 4),
                ("Arisen Dragon", 4),
                ("Level 260", 4),
                ("+", 3),
            ],
            0,
        );
        let roster = members(extract_gauntlet(&snap));
        let floor = &roster[0].floors[&1];
        assert!(!floor.win);
        assert!(floor.loss);
    }

    #[test]
    fn test_multiple_floors_and_members() {
        let snap = snapshot_with_depths(
            &[
                ("Floor: 1", 3),
                ("Ghost", 4),
                ("Level 250", 4),
                ("VS", 4),
                ("Berserk Golem", 4),
                ("Level 260", 4),
                ("Floor: 2", 3),
                ("Mira", 4),
                ("Level 200", 4),
                ("VS", 4),
                ("Imp", 4),
                ("Level 100", 6),
                ("Floor: 3", 3),
                ("Ghost", 4),
                ("Level 250", 4),
                ("VS", 4),
                ("Bat", 4),
                ("Level 10", 4),
                ("+", 3),
            ],
            0,
        );
        let roster = members(extract_gauntlet(&snap));
        assert_eq!(roster.len(), 2);

        let ghost = roster.iter().find(|m| m.character_name == "Ghost").unwrap();
        assert_eq!(ghost.floors.len(), 2);
        assert_eq!(ghost.num_floors(), 2);
        assert!(ghost.has_berserk_floor("Berserk"));

        let mira = roster.iter().find(|m| m.character_name == "Mira").unwrap();
        assert!(mira.floors[&2].win);
        assert_eq!(mira.num_floors(), 0);
        assert!(!mira.has_berserk_floor("Berserk"));
    }

    #[test]
    fn test_trailing_block_without_plus() {
        let snap = snapshot_with_depths(
            &[
                ("Floor: 4", 3),
                ("Ghost", 4),
                ("Level 250", 4),
                ("VS", 4),
                ("Bat", 4),
                ("Level 10", 4),
            ],
            0,
        );
        let roster = members(extract_gauntlet(&snap));
        assert!(roster[0].floors.contains_key(&4));
    }

    #[test]
    fn test_allies_layout_is_skipped() {
        let snap = snapshot_with_depths(&[("Kingdom Gauntlet", 1), ("Allies", 2), ("Floor: 1", 3)], 0);
        assert_eq!(extract_gauntlet(&snap), GauntletParse::Unsupported);
    }

    #[test]
    fn test_level_before_first_floor_is_ignored() {
        let snap = snapshot_with_depths(&[("Ghost", 2), ("Level 250", 2)], 0);
        assert!(members(extract_gauntlet(&snap)).is_empty());
    }
}
