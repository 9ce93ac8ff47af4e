use std::sync::LazyLock;

use regex::Regex;

use super::ScreenFact;
use super::primitives::normalize_text;
use crate::screen::ScreenSnapshot;
use crate::screen::classifier::markers;

static OWNER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)'s wayvessel").unwrap());

// Only the player's own notice; "<name> left the party" is someone else.
static PARTY_LEFT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*you\s+(?:have\s+)?left\s+the\s+party\b").unwrap());

/// Wayvessel owner shown on screen, unless the screen is the
/// "this wayvessel is active" confirmation for the one already joined.
pub fn detect_wayvessel_name(snapshot: &ScreenSnapshot) -> Option<String> {
    if snapshot.contains_ci(markers::WAYVESSEL_ACTIVE) {
        return None;
    }
    snapshot.texts().find_map(|t| {
        let normalized = normalize_text(t);
        let name = OWNER_PATTERN.captures(&normalized)?.get(1)?.as_str().trim();
        (!name.is_empty()).then(|| name.to_string())
    })
}

pub fn extract_wayvessel(snapshot: &ScreenSnapshot) -> Vec<ScreenFact> {
    detect_wayvessel_name(snapshot)
        .map(|name| vec![ScreenFact::WayvesselSighted { name }])
        .unwrap_or_default()
}

/// Checked on every screen: the party can be left from anywhere.
pub fn detect_party_left(snapshot: &ScreenSnapshot) -> bool {
    snapshot.texts().any(|t| PARTY_LEFT_PATTERN.is_match(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::test_support::snapshot;

    #[test]
    fn test_name_is_prefix_of_suffix() {
        let snap = snapshot(&["Ghost's Wayvessel", "Members: 4"]);
        assert_eq!(detect_wayvessel_name(&snap).as_deref(), Some("Ghost"));
    }

    #[test]
    fn test_curly_apostrophe() {
        let snap = snapshot(&["Ghost\u{2019}s Wayvessel"]);
        assert_eq!(detect_wayvessel_name(&snap).as_deref(), Some("Ghost"));
    }

    #[test]
    fn test_active_marker_suppresses() {
        let snap = snapshot(&["Ghost's Wayvessel", "This wayvessel is active"]);
        assert_eq!(detect_wayvessel_name(&snap), None);
        assert!(extract_wayvessel(&snap).is_empty());
    }

    #[test]
    fn test_empty_owner_is_ignored() {
        assert_eq!(detect_wayvessel_name(&snapshot(&["'s Wayvessel"])), None);
    }

    #[test]
    fn test_party_left() {
        assert!(detect_party_left(&snapshot(&["You have left the party."])));
        assert!(!detect_party_left(&snapshot(&["Party"])));
    }

    #[test]
    fn test_other_member_leaving_is_not_party_left() {
        assert!(detect_party_left(&snapshot(&["You left the party"])));
        assert!(!detect_party_left(&snapshot(&["Ghost left the party"])));
        assert!(!detect_party_left(&snapshot(&["Mira has left the party."])));
    }
}
