//! Shared configuration types for ornalens.
//!
//! These are plain serde structs so they can be loaded by the core crate
//! (via confy) and embedded by any host that drives the interpreter.

pub mod formatting;

use serde::{Deserialize, Serialize};

/// Default public endpoint of the item quality assessment API.
pub const DEFAULT_ASSESS_ENDPOINT: &str = "https://orna.guide/api/v1/assess";

/// Marker used by the game for gauntlet mobs that enrage.
pub const DEFAULT_BERSERK_MARKER: &str = "Berserk";

/// Top-level scanner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub throttle: ThrottleConfig,
    pub assessment: AssessmentConfig,
    /// Capacity of the ordered snapshot queue feeding the interpreter.
    pub queue_capacity: usize,
    /// Substring identifying a berserk mob on a gauntlet floor.
    pub berserk_marker: String,
    /// Swap `.` and `,` when formatting numbers for display.
    pub european_numbers: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            assessment: AssessmentConfig::default(),
            queue_capacity: 64,
            berserk_marker: DEFAULT_BERSERK_MARKER.to_string(),
            european_numbers: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Snapshots arriving closer together than this are coalesced.
    pub min_interval_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Extra attempts after the first failure. Values above 1 are clamped.
    pub max_retries: u8,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ASSESS_ENDPOINT.to_string(),
            timeout_secs: 10,
            max_retries: 1,
        }
    }
}

impl AssessmentConfig {
    /// Retry budget actually honoured by the client (never more than one).
    pub fn effective_retries(&self) -> u8 {
        self.max_retries.min(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
queue_capacity = 8

[throttle]
min_interval_ms = 100
"#;
        let config: ScannerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.throttle.min_interval_ms, 100);
        assert_eq!(config.assessment, AssessmentConfig::default());
        assert_eq!(config.berserk_marker, "Berserk");
    }

    #[test]
    fn test_retries_are_clamped() {
        let config = AssessmentConfig {
            max_retries: 5,
            ..Default::default()
        };
        assert_eq!(config.effective_retries(), 1);

        let config = AssessmentConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_retries(), 0);
    }

    #[test]
    fn test_round_trip() {
        let config = ScannerConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: ScannerConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, back);
    }
}
