use std::sync::LazyLock;

use regex::Regex;

use super::primitives::{AttributeScanner, strip_prefixes};
use crate::assess::ItemAssessmentRequest;
use crate::screen::ScreenSnapshot;

static LEVEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*level\s+(\d+)\s*$").unwrap());

/// Build an assessment request from an item detail screen.
///
/// The first row is the item name, unless the screen opens with the
/// "You are ..." banner shown when inspecting someone else's gear.
pub fn extract_item(snapshot: &ScreenSnapshot) -> Option<ItemAssessmentRequest> {
    let obs = &snapshot.observations;
    let name_idx = match obs.first() {
        Some(first) if first.text.contains("You are") => 1,
        Some(_) => 0,
        None => return None,
    };
    let item_name = strip_prefixes(&obs.get(name_idx)?.text);
    if item_name.is_empty() {
        return None;
    }

    let rest = &obs[name_idx + 1..];

    let level = rest.iter().find_map(|o| {
        LEVEL_PATTERN
            .captures(&o.text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    })?;

    let mut scanner = AttributeScanner::new();
    for o in rest {
        scanner.feed(&o.text);
    }
    let attributes = scanner.finish();
    if attributes.values().all(|v| *v == 0) {
        return None;
    }

    Some(ItemAssessmentRequest {
        item_name,
        level,
        attributes,
    })
}
