//! Structured extractors.
//!
//! Each extractor reads one snapshot (plus, for dungeons, the context it
//! kept from earlier snapshots) and reports what it found as [`ScreenFact`]s.
//! Facts carry no aggregate state; the lifecycle tracker decides what they
//! mean for the current visit and session.

pub mod dungeon;
pub mod gauntlet;
pub mod item;
pub mod notifications;
pub mod primitives;
pub mod wayvessel;

pub use dungeon::{DungeonContext, DungeonMode, DungeonModeKind, extract_dungeon};
pub use gauntlet::{GauntletFloor, GauntletParse, KingdomMember, extract_gauntlet};
pub use item::extract_item;
pub use notifications::{PartyInvite, extract_invites};
pub use primitives::LootDelta;
pub use wayvessel::extract_wayvessel;

use crate::assess::ItemAssessmentRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenFact {
    // Dungeon entry screen and in-dungeon screens
    DungeonSighted { name: String },
    DungeonEntered { floor: u32 },
    ModeDetected(DungeonMode),
    FloorReached { floor: u32 },
    FloorCleared,
    LootFound(LootDelta),
    GodforgesFound(u32),
    DungeonFinished { completed: bool },

    // Wayvessel / party
    WayvesselSighted { name: String },
    PartyLeft,

    InvitesListed(Vec<PartyInvite>),
    GauntletMembers(Vec<KingdomMember>),
    ItemDisplayed(ItemAssessmentRequest),
}
