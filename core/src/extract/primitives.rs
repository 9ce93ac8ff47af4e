//! Stateless text helpers shared by the extractors.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::assess::Attribute;
use crate::screen::ScreenObservation;

/// `<Letters>: <-?Digits>` as printed on item detail screens.
static ATTRIBUTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z]+):\s*(-?[\d,]+)\s*$").unwrap());

/// Section header after which item attributes are bonus deltas.
pub const ADORNMENTS_MARKER: &str = "ADORNMENTS";

/// Checked in order, repeatedly, so stacked prefixes all come off.
const QUALITY_PREFIXES: &[&str] = &[
    "Broken ",
    "Poor ",
    "Superior ",
    "Famed ",
    "Legendary ",
    "Ornate ",
    "Masterforged ",
    "Demonforged ",
    "Godforged ",
];

/// Matched against the lowercased name.
const ENCHANTMENT_PREFIXES: &[&str] = &[
    "arcane ",
    "burning ",
    "dark ",
    "draconic ",
    "earthly ",
    "flaming ",
    "frozen ",
    "holy ",
    "shocking ",
    "chaotic ",
    "lawful ",
    "righteous ",
    "unholy ",
];

/// Replace the unicode look-alikes that OCR-free text still carries
/// (minus signs, full-width punctuation, curly apostrophes, odd spaces).
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2212}' | '\u{2012}' | '\u{2013}' | '\u{FE63}' | '\u{FF0D}' => '-',
            '\u{FF0C}' | '\u{201A}' => ',',
            '\u{FF0E}' => '.',
            '\u{2019}' | '\u{2018}' => '\'',
            '\u{00A0}' | '\u{202F}' | '\u{2009}' => ' ',
            other => other,
        })
        .collect()
}

/// Parse a whole token as an integer, tolerating thousands separators,
/// a leading `+` and unicode minus variants.
pub fn parse_number(token: &str) -> Option<i64> {
    let normalized = normalize_text(token);
    let cleaned: String = normalized
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|c| *c != ',' && *c != ' ')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootLabel {
    Orns,
    Gold,
    Experience,
}

impl LootLabel {
    /// Label contained in `text`, if any. Covers "party experience" too.
    pub fn find_in(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        if lowered.contains("orns") {
            Some(Self::Orns)
        } else if lowered.contains("gold") {
            Some(Self::Gold)
        } else if lowered.contains("experience") {
            Some(Self::Experience)
        } else {
            None
        }
    }
}

/// Partial loot seen on one screen. Absent fields were not shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootDelta {
    pub orns: Option<i64>,
    pub gold: Option<i64>,
    pub experience: Option<i64>,
}

impl LootDelta {
    pub fn is_empty(&self) -> bool {
        self.orns.is_none() && self.gold.is_none() && self.experience.is_none()
    }

    fn bind(&mut self, label: LootLabel, value: i64) {
        let slot = match label {
            LootLabel::Orns => &mut self.orns,
            LootLabel::Gold => &mut self.gold,
            LootLabel::Experience => &mut self.experience,
        };
        *slot = Some(value);
    }
}

/// Bind each number to the label immediately following it.
///
/// A number is remembered until the next observation. If that observation is
/// another number it replaces the memory; if it carries a loot label the pair
/// is bound; anything else forgets the number.
pub fn scan_loot(observations: &[ScreenObservation]) -> LootDelta {
    let mut delta = LootDelta::default();
    let mut pending: Option<i64> = None;

    for obs in observations {
        if let Some(n) = parse_number(&obs.text) {
            pending = Some(n);
            continue;
        }
        if let Some(n) = pending.take()
            && let Some(label) = LootLabel::find_in(&obs.text)
        {
            delta.bind(label, n);
        }
    }

    delta
}

/// Running attribute totals for one item screen.
#[derive(Debug, Default)]
pub struct AttributeScanner {
    totals: BTreeMap<Attribute, i64>,
    in_adornments: bool,
}

impl AttributeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation. Base values set the total; values after the
    /// adornments header are subtracted from it.
    pub fn feed(&mut self, text: &str) {
        if text.contains(ADORNMENTS_MARKER) {
            self.in_adornments = true;
            return;
        }
        let Some((attr, value)) = match_attribute(text) else {
            return;
        };
        if self.in_adornments {
            *self.totals.entry(attr).or_insert(0) -= value;
        } else {
            self.totals.insert(attr, value);
        }
    }

    pub fn finish(self) -> BTreeMap<Attribute, i64> {
        self.totals
    }
}

/// Match `<Attr>: <value>` restricted to the accepted attribute set.
pub fn match_attribute(text: &str) -> Option<(Attribute, i64)> {
    let normalized = normalize_text(text);
    let caps = ATTRIBUTE_PATTERN.captures(&normalized)?;
    let attr = Attribute::from_label(caps.get(1)?.as_str())?;
    let value = parse_number(caps.get(2)?.as_str())?;
    Some((attr, value))
}

/// Strip quality and enchantment prefixes to get the canonical item or
/// dungeon name.
pub fn strip_prefixes(name: &str) -> String {
    let mut current = normalize_text(name).trim().to_string();
    loop {
        let before = current.len();
        for prefix in QUALITY_PREFIXES {
            if let Some(rest) = current.strip_prefix(prefix) {
                current = rest.trim_start().to_string();
            }
        }
        let lowered = current.to_lowercase();
        for prefix in ENCHANTMENT_PREFIXES {
            // Prefixes are ASCII, so byte offsets line up with the original.
            if lowered.starts_with(prefix) && current.is_char_boundary(prefix.len()) {
                current = current[prefix.len()..].trim_start().to_string();
                break;
            }
        }
        if current.len() == before {
            return current;
        }
    }
}

/// True if `depth` is nested at least as deep as `threshold`.
#[inline]
pub fn reaches_depth(depth: u32, threshold: u32) -> bool {
    depth >= threshold
}
