use serde::{Deserialize, Serialize};

use crate::extract::{GauntletFloor, KingdomMember};

/// Per-member summary carried by the gauntlet roster update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub character_name: String,
    pub num_floors: usize,
    pub has_berserk_floor: bool,
    pub floors: Vec<GauntletFloor>,
}

/// Kingdom gauntlet roster merged across snapshots. The gauntlet view
/// scrolls, so any one snapshot only shows part of it.
#[derive(Debug, Clone, Default)]
pub struct GauntletRoster {
    members: Vec<KingdomMember>,
}

impl GauntletRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge freshly parsed members; floors are overwritten by number.
    pub fn merge(&mut self, parsed: Vec<KingdomMember>) {
        for member in parsed {
            match self
                .members
                .iter_mut()
                .find(|m| m.character_name == member.character_name)
            {
                Some(existing) => existing.floors.extend(member.floors),
                None => self.members.push(member),
            }
        }
    }

    pub fn entries(&self, berserk_marker: &str) -> Vec<RosterEntry> {
        self.members
            .iter()
            .map(|m| {
                let mut floors: Vec<GauntletFloor> = m.floors.values().cloned().collect();
                floors.sort_by_key(|f| f.number);
                RosterEntry {
                    character_name: m.character_name.clone(),
                    num_floors: m.num_floors(),
                    has_berserk_floor: m.has_berserk_floor(berserk_marker),
                    floors,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
