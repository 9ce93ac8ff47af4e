//! Aggregates built up from screen facts.
//!
//! - **Visits**: one run through a dungeon, parked while another is visited
//! - **Sessions**: a wayvessel party spanning many visits
//! - **Cooldowns**: when each finished dungeon can be entered again
//! - **Roster**: kingdom gauntlet progress merged across scrolls
//!
//! ```text
//!   ScreenFact ──► apply_fact ──► InterpreterState (current visit/session)
//!                      │
//!                      ▼
//!               Vec<ScreenUpdate>  (finished records leave here)
//! ```

mod cooldowns;
mod lifecycle;
mod roster;
mod session;
mod visit;


pub use cooldowns::CooldownLedger;
pub use lifecycle::{apply_fact, finish_session, finish_visit, flush, session_snapshot};
pub use roster::{GauntletRoster, RosterEntry};
pub use session::WayvesselSession;
pub use visit::{DungeonVisit, cooldown_hours};
