use serde::{Deserialize, Serialize};

use crate::screen::{Rect, ScreenSnapshot};

const INVITE_SUFFIX: &str = "invited you to their party";

/// One pending party invite, with the on-screen box of the invite row so the
/// overlay can anchor next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInvite {
    pub inviter: String,
    pub bounds: Rect,
}

/// Pair each invite row with the next `accept` button after it.
pub fn extract_invites(snapshot: &ScreenSnapshot) -> Vec<PartyInvite> {
    let mut invites = Vec::new();
    let mut pending: Option<(String, Rect)> = None;

    for obs in &snapshot.observations {
        if let Some(idx) = obs.text.find(INVITE_SUFFIX) {
            let inviter = obs.text[..idx].trim().to_string();
            pending = Some((inviter, obs.bounds));
        } else if obs.text.to_lowercase().contains("accept")
            && let Some((inviter, bounds)) = pending.take()
        {
            invites.push(PartyInvite { inviter, bounds });
        }
    }

    invites
}
