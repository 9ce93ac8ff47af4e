//! Snapshot classification.
//!
//! Rules are evaluated in a fixed order and the first match wins. The order
//! matters: an item popup opened from the inventory still shows the inventory
//! markers underneath it, so item detail must be tested first.

use serde::{Deserialize, Serialize};

use super::ScreenSnapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenType {
    Inventory,
    ItemDetail,
    Wayvessel,
    Notifications,
    DungeonEntry,
    Battle,
    #[default]
    Unknown,
}

pub(crate) mod markers {
    pub const ACQUIRED: &str = "acquired";
    pub const NEW: &str = "new";
    pub const INVENTORY: &str = "inventory";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const WAYVESSEL_ACTIVE: &str = "this wayvessel is active";
    pub const WAYVESSEL_SUFFIX: &str = "'s wayvessel";
    pub const WORLD_DUNGEON: &str = "world dungeon";
    pub const SPECIAL_DUNGEON: &str = "special dungeon";
    pub const SERIES_OF_OPPONENTS: &str = "battle a series of opponents";
    pub const RUNESHOP: &str = "runeshop";
    pub const CODEX: &str = "Codex";
    pub const SKILL: &str = "SKILL";
}

/// Label a snapshot. Pure: no memory of earlier classifications.
pub fn classify(snapshot: &ScreenSnapshot) -> ScreenType {
    use markers::*;

    // Lowercase once; every rule below is a substring test.
    let lowered: Vec<String> = snapshot.texts().map(str::to_lowercase).collect();
    let any = |needle: &str| lowered.iter().any(|t| t.contains(needle));

    if any(ACQUIRED) {
        return ScreenType::ItemDetail;
    }
    if lowered.iter().any(|t| t.trim() == NEW) && any(INVENTORY) {
        return ScreenType::Inventory;
    }
    if lowered.iter().any(|t| t.trim() == NOTIFICATIONS) {
        return ScreenType::Notifications;
    }
    if any(WAYVESSEL_ACTIVE) || any(WAYVESSEL_SUFFIX) {
        return ScreenType::Wayvessel;
    }
    if any(WORLD_DUNGEON) || any(SPECIAL_DUNGEON) || (any(SERIES_OF_OPPONENTS) && any(RUNESHOP)) {
        return ScreenType::DungeonEntry;
    }
    if snapshot.texts().any(|t| t.trim() == CODEX) && snapshot.contains(SKILL) {
        return ScreenType::Battle;
    }
    ScreenType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::test_support::snapshot;

    #[test]
    fn test_item_detail_beats_inventory() {
        let snap = snapshot(&["Inventory", "New", "Acquired: 2 days ago", "Sword"]);
        assert_eq!(classify(&snap), ScreenType::ItemDetail);
    }

    #[test]
    fn test_inventory_needs_both_markers() {
        assert_eq!(classify(&snapshot(&["Inventory", "New"])), ScreenType::Inventory);
        assert_eq!(classify(&snapshot(&["Inventory"])), ScreenType::Unknown);
        assert_eq!(classify(&snapshot(&["New"])), ScreenType::Unknown);
    }

    #[test]
    fn test_notifications_beats_wayvessel_and_dungeon() {
        let snap = snapshot(&[
            "Notifications",
            "Ghost's Wayvessel",
            "World dungeon",
            "Frost Dungeon",
        ]);
        assert_eq!(classify(&snap), ScreenType::Notifications);
    }

    #[test]
    fn test_wayvessel_beats_dungeon_entry() {
        let snap = snapshot(&["This wayvessel is active", "World dungeon", "Frost Dungeon"]);
        assert_eq!(classify(&snap), ScreenType::Wayvessel);
    }

    #[test]
    fn test_dungeon_entry_variants() {
        assert_eq!(
            classify(&snapshot(&["Special dungeon", "Underworld Portal"])),
            ScreenType::DungeonEntry
        );
        assert_eq!(
            classify(&snapshot(&["Battle a series of opponents to earn rewards", "Runeshop"])),
            ScreenType::DungeonEntry
        );
        assert_eq!(
            classify(&snapshot(&["Battle a series of opponents to earn rewards"])),
            ScreenType::Unknown
        );
    }

    #[test]
    fn test_dungeon_entry_beats_battle() {
        let snap = snapshot(&["World dungeon", "Codex", "SKILL"]);
        assert_eq!(classify(&snap), ScreenType::DungeonEntry);
    }

    #[test]
    fn test_battle_requires_codex_and_skill() {
        assert_eq!(classify(&snapshot(&["Codex", "SKILL"])), ScreenType::Battle);
        assert_eq!(classify(&snapshot(&["Codex", "skill"])), ScreenType::Unknown);
        assert_eq!(classify(&snapshot(&["SKILL"])), ScreenType::Unknown);
    }

    #[test]
    fn test_empty_snapshot_is_unknown() {
        assert_eq!(classify(&snapshot(&[])), ScreenType::Unknown);
    }
}
