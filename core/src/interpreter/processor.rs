use chrono::NaiveDateTime;

use super::ScreenUpdate;
use crate::extract::gauntlet::is_gauntlet_view;
use crate::extract::wayvessel::detect_party_left;
use crate::extract::{
    GauntletParse, ScreenFact, extract_dungeon, extract_gauntlet, extract_invites, extract_item,
    extract_wayvessel,
};
use crate::screen::{ScreenSnapshot, ScreenType, classify};
use crate::state::InterpreterState;
use crate::tracking;

/// Turns snapshots into updates: classify, run the extractors that apply
/// to the screen, then fold their facts into the tracked aggregates.
#[derive(Debug, Clone)]
pub struct ScreenInterpreter {
    berserk_marker: String,
}

impl ScreenInterpreter {
    pub fn new(berserk_marker: impl Into<String>) -> Self {
        Self {
            berserk_marker: berserk_marker.into(),
        }
    }

    /// Interpret one snapshot. Snapshots must arrive in capture order.
    pub fn interpret(&self, snapshot: &ScreenSnapshot, state: &mut InterpreterState) -> Vec<ScreenUpdate> {
        let screen = classify(snapshot);
        let mut updates = Vec::new();

        if screen != state.last_screen {
            tracing::debug!("Screen changed {:?} -> {:?}", state.last_screen, screen);
            state.last_screen = screen;
            updates.push(ScreenUpdate::ScreenChanged { screen });
        }

        let now = snapshot.captured_at;
        for fact in self.extract_facts(screen, snapshot, state) {
            updates.extend(tracking::apply_fact(fact, state, now, &self.berserk_marker));
        }
        updates
    }

    /// Finish in-flight visits and the session, e.g. on teardown.
    pub fn flush(&self, state: &mut InterpreterState, now: NaiveDateTime) -> Vec<ScreenUpdate> {
        tracking::flush(state, now)
    }

    fn extract_facts(
        &self,
        screen: ScreenType,
        snapshot: &ScreenSnapshot,
        state: &mut InterpreterState,
    ) -> Vec<ScreenFact> {
        let mut facts = Vec::new();
        if detect_party_left(snapshot) {
            facts.push(ScreenFact::PartyLeft);
        }

        match screen {
            ScreenType::ItemDetail => {
                if let Some(request) = extract_item(snapshot) {
                    facts.push(ScreenFact::ItemDisplayed(request));
                }
            }
            ScreenType::Inventory => {}
            ScreenType::Notifications => {
                let invites = extract_invites(snapshot);
                if !invites.is_empty() {
                    facts.push(ScreenFact::InvitesListed(invites));
                }
            }
            ScreenType::Wayvessel => facts.extend(extract_wayvessel(snapshot)),
            ScreenType::DungeonEntry | ScreenType::Battle | ScreenType::Unknown => {
                if is_gauntlet_view(snapshot) {
                    match extract_gauntlet(snapshot) {
                        GauntletParse::Members(members) if !members.is_empty() => {
                            facts.push(ScreenFact::GauntletMembers(members));
                        }
                        GauntletParse::Members(_) => {}
                        GauntletParse::Unsupported => {
                            tracing::debug!("Skipping unsupported gauntlet layout");
                        }
                    }
                } else {
                    facts.extend(extract_dungeon(snapshot, &mut state.dungeon));
                }
            }
        }
        facts
    }
}
