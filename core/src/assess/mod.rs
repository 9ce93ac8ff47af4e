//! Item quality assessment: request/result model and the HTTP client.

mod client;

pub use client::{AssessError, AssessmentClient, decode_response};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attributes shown on an item detail screen that the assessment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Hp,
    Att,
    Mag,
    Def,
    Res,
    Dex,
    Crit,
    Mana,
    Ward,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::Hp,
        Attribute::Att,
        Attribute::Mag,
        Attribute::Def,
        Attribute::Res,
        Attribute::Dex,
        Attribute::Crit,
        Attribute::Mana,
        Attribute::Ward,
    ];

    /// Parse the label exactly as the game prints it (`HP`, `Att`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "HP" => Some(Self::Hp),
            "Att" => Some(Self::Att),
            "Mag" => Some(Self::Mag),
            "Def" => Some(Self::Def),
            "Res" => Some(Self::Res),
            "Dex" => Some(Self::Dex),
            "Crit" => Some(Self::Crit),
            "Mana" => Some(Self::Mana),
            "Ward" => Some(Self::Ward),
            _ => None,
        }
    }

    /// Field name in the assessment API request. Crit is not assessed.
    pub fn api_field(self) -> Option<&'static str> {
        match self {
            Self::Hp => Some("hp"),
            Self::Att => Some("attack"),
            Self::Mag => Some("magic"),
            Self::Def => Some("defense"),
            Self::Res => Some("resistance"),
            Self::Dex => Some("dexterity"),
            Self::Mana => Some("mana"),
            Self::Ward => Some("ward"),
            Self::Crit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAssessmentRequest {
    pub item_name: String,
    pub level: u32,
    pub attributes: BTreeMap<Attribute, i64>,
}

impl ItemAssessmentRequest {
    /// JSON body for the assessment API. Only known, nonzero attributes are sent.
    pub fn to_api_body(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert("name".into(), self.item_name.clone().into());
        body.insert("level".into(), self.level.into());
        for (attr, value) in &self.attributes {
            if *value == 0 {
                continue;
            }
            if let Some(field) = attr.api_field() {
                body.insert(field.into(), (*value).into());
            }
        }
        serde_json::Value::Object(body)
    }
}

/// Forge tiers reported for each stat, in API order.
pub const FORGE_TIERS: [&str; 4] = ["10★", "masterforge", "demonforge", "godforge"];

/// Assessment outcome, persisted keyed by name/level/attributes/timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAssessment {
    pub request: ItemAssessmentRequest,
    pub quality: f64,
    /// Per-stat values at each of [`FORGE_TIERS`].
    pub stats: BTreeMap<String, [f64; 4]>,
    pub materials: [i64; 4],
    pub assessed_at: NaiveDateTime,
}
