//! Visit and session lifecycle.
//!
//! Folds extractor facts into the current [`DungeonVisit`] and
//! [`WayvesselSession`]:
//! - a new dungeon name parks the current visit and resumes or starts another
//! - completion / defeat finishes the current visit
//! - a new wayvessel (or leaving the party) finishes the session and every
//!   visit still attached to it
//!
//! Finished aggregates leave the state here and travel only inside updates.

use chrono::NaiveDateTime;

use super::{DungeonVisit, WayvesselSession};
use crate::extract::ScreenFact;
use crate::interpreter::ScreenUpdate;
use crate::state::InterpreterState;

/// Apply one fact and return the updates it produced.
pub fn apply_fact(
    fact: ScreenFact,
    state: &mut InterpreterState,
    now: NaiveDateTime,
    berserk_marker: &str,
) -> Vec<ScreenUpdate> {
    match fact {
        ScreenFact::DungeonSighted { name } => switch_dungeon(state, &name, now),
        ScreenFact::DungeonEntered { floor } => {
            let Some(visit) = state.current_visit_mut() else {
                return Vec::new();
            };
            visit.floor = floor;
            tracing::info!("[VISIT] Entered visit ID={} name={}", visit.id, visit.name);
            vec![ScreenUpdate::DungeonEntered {
                visit_id: visit.id,
                name: visit.name.clone(),
                floor,
            }]
        }
        ScreenFact::ModeDetected(mode) => {
            let (visit_id, cooldown_hours) = match state.current_visit_mut() {
                Some(visit) => {
                    visit.mode = mode;
                    (Some(visit.id), visit.cooldown_hours())
                }
                None => (None, 0),
            };
            vec![ScreenUpdate::ModeChanged {
                visit_id,
                mode,
                cooldown_hours,
            }]
        }
        ScreenFact::FloorReached { floor } => {
            let Some(visit) = state.current_visit_mut() else {
                return Vec::new();
            };
            visit.floor = floor;
            vec![ScreenUpdate::FloorChanged {
                visit_id: visit.id,
                floor,
            }]
        }
        ScreenFact::FloorCleared => state
            .current_visit()
            .map(|v| ScreenUpdate::FloorCleared {
                visit_id: v.id,
                floor: v.floor,
            })
            .into_iter()
            .collect(),
        ScreenFact::LootFound(loot) => {
            let Some(visit) = state.current_visit_mut() else {
                return Vec::new();
            };
            visit.apply_loot(&loot);
            let (visit_id, session_id) = (visit.id, visit.session_id);

            if let Some(session) = state.current_session_mut()
                && Some(session.id) == session_id
            {
                session.apply_loot(&loot);
            }
            vec![ScreenUpdate::LootDelta { visit_id, loot }]
        }
        ScreenFact::GodforgesFound(count) => {
            let Some(visit) = state.current_visit_mut() else {
                return Vec::new();
            };
            visit.godforges += count;
            vec![ScreenUpdate::GodforgeIncremented {
                visit_id: visit.id,
                total: visit.godforges,
            }]
        }
        ScreenFact::DungeonFinished { completed } => match state.take_current_visit() {
            Some(visit) => finish_visit(state, visit, now, completed),
            None => Vec::new(),
        },
        ScreenFact::WayvesselSighted { name } => {
            if state.current_session().is_some_and(|s| s.name == name) {
                return Vec::new();
            }
            let mut updates = finish_session(state, now);
            let session_id = state.start_session(&name, now);
            updates.push(ScreenUpdate::SessionStarted { session_id, name });
            updates
        }
        ScreenFact::PartyLeft => finish_session(state, now),
        ScreenFact::InvitesListed(invites) => vec![ScreenUpdate::InviterList { invites }],
        ScreenFact::GauntletMembers(members) => {
            state.roster.merge(members);
            vec![ScreenUpdate::GauntletRoster {
                members: state.roster.entries(berserk_marker),
            }]
        }
        ScreenFact::ItemDisplayed(request) => {
            if state.last_item_request.as_ref() == Some(&request) {
                return Vec::new();
            }
            state.last_item_request = Some(request.clone());
            vec![ScreenUpdate::AssessmentRequested { request }]
        }
    }
}

fn switch_dungeon(state: &mut InterpreterState, name: &str, now: NaiveDateTime) -> Vec<ScreenUpdate> {
    if name.is_empty() || state.current_visit().is_some_and(|v| v.name == name) {
        return Vec::new();
    }

    state.park_current_visit();
    let resumed = state.resume_visit(name);
    let visit_id = match state.current_visit().filter(|_| resumed).map(|v| v.id) {
        Some(id) => id,
        None => state.start_visit(name, now).id,
    };

    vec![ScreenUpdate::NewDungeon {
        visit_id,
        name: name.to_string(),
        resumed,
        on_hold: state.on_hold_names(),
    }]
}

/// Stamp a visit, start its cooldown and wrap it for persistence.
pub fn finish_visit(
    state: &mut InterpreterState,
    mut visit: DungeonVisit,
    now: NaiveDateTime,
    completed: bool,
) -> Vec<ScreenUpdate> {
    visit.finish(now, completed);
    tracing::info!(
        "[VISIT] Finished visit ID={} name={} completed={} duration={}",
        visit.id,
        visit.name,
        visit.completed,
        ornalens_types::formatting::format_elapsed(visit.duration_seconds.unwrap_or(0))
    );

    let mut updates = Vec::with_capacity(2);
    state.cooldowns.prune(now);
    if visit.was_entered()
        && let Some(ready_at) = state.cooldowns.start(&visit.name, now, visit.cooldown_hours())
    {
        updates.push(ScreenUpdate::CooldownStarted {
            name: visit.name.clone(),
            ready_at,
        });
    }
    updates.insert(
        0,
        if visit.completed {
            ScreenUpdate::DungeonDone { visit }
        } else {
            ScreenUpdate::DungeonFailed { visit }
        },
    );
    updates
}

/// Finish the current session and every visit still attached to it.
pub fn finish_session(state: &mut InterpreterState, now: NaiveDateTime) -> Vec<ScreenUpdate> {
    let Some(mut session) = state.take_current_session() else {
        return Vec::new();
    };
    let mut updates = Vec::new();

    if state
        .current_visit()
        .is_some_and(|v| v.session_id == Some(session.id))
        && let Some(visit) = state.take_current_visit()
    {
        updates.extend(finish_visit(state, visit, now, false));
    }
    for visit in state.take_on_hold_for_session(session.id) {
        updates.extend(finish_visit(state, visit, now, false));
    }

    session.finish(now);
    tracing::info!(
        "[SESSION] Finished session ID={} name={} dungeons={}",
        session.id,
        session.name,
        session.dungeons_visited
    );
    updates.push(ScreenUpdate::SessionFinished { session });
    updates
}

/// Finish everything still in flight, e.g. on shutdown.
pub fn flush(state: &mut InterpreterState, now: NaiveDateTime) -> Vec<ScreenUpdate> {
    let mut updates = Vec::new();
    if let Some(visit) = state.take_current_visit() {
        updates.extend(finish_visit(state, visit, now, false));
    }
    for visit in state.take_all_on_hold() {
        updates.extend(finish_visit(state, visit, now, false));
    }
    updates.extend(finish_session(state, now));
    updates
}

/// Session totals as they stand, for consumers polling between updates.
pub fn session_snapshot(state: &InterpreterState) -> Option<WayvesselSession> {
    state.current_session().cloned()
}
