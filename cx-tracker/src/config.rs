//! Tracker configuration
//!
//! Everything that used to be ambient session state (languages, thresholds,
//! timer windows) lives in one [`TrackerConfig`] handed to the tracker at
//! construction time. Missing fields in a JSON file fall back to defaults.

use crate::error::{TrackerError, TrackerResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HELP_URL: &str =
    "https://www.mediawiki.org/wiki/Help:Content_translation/Translating/Translation_quality";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub source_language: String,
    pub target_language: String,
    /// Unmodified ratio above which machine translated content is flagged
    pub mt_threshold: f64,
    /// Unmodified ratio above which content copied from the source is flagged
    pub source_threshold: f64,
    /// Sections with fewer source tokens are never validated
    pub min_source_tokens: usize,
    /// Share of unmodified MT in the whole translation that blocks publishing
    pub publish_threshold: f64,
    pub validation_delay_ms: u64,
    pub change_debounce_ms: u64,
    pub help_url: String,
    pub alignment: AlignmentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub debounce_ms: u64,
    pub step_px: f32,
    pub max_steps: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            mt_threshold: 0.8,
            source_threshold: 0.6,
            min_source_tokens: 10,
            publish_threshold: 0.95,
            validation_delay_ms: 15_000,
            change_debounce_ms: 500,
            help_url: DEFAULT_HELP_URL.to_string(),
            alignment: AlignmentConfig::default(),
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            step_px: 10.0,
            max_steps: 10,
        }
    }
}

impl TrackerConfig {
    /// Default thresholds for the given language pair
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file and validate it
    pub fn from_file(path: &Path) -> TrackerResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: TrackerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if self.source_language.trim().is_empty() || self.target_language.trim().is_empty() {
            return Err(TrackerError::Config(
                "source and target languages must be set".to_string(),
            ));
        }
        for (name, value) in [
            ("mt_threshold", self.mt_threshold),
            ("source_threshold", self.source_threshold),
            ("publish_threshold", self.publish_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrackerError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.alignment.step_px <= 0.0 {
            return Err(TrackerError::Config(
                "alignment step must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validation_delay(&self) -> Duration {
        Duration::from_millis(self.validation_delay_ms)
    }

    pub fn change_debounce(&self) -> Duration {
        Duration::from_millis(self.change_debounce_ms)
    }
}

impl AlignmentConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::new("en", "fr");
        assert_eq!(config.source_language, "en");
        assert_eq!(config.target_language, "fr");
        assert_eq!(config.mt_threshold, 0.8);
        assert_eq!(config.source_threshold, 0.6);
        assert_eq!(config.min_source_tokens, 10);
        assert_eq!(config.validation_delay(), Duration::from_secs(15));
        assert_eq!(config.alignment.debounce(), Duration::from_millis(500));
        assert_eq!(config.alignment.max_steps, 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"source_language": "en", "target_language": "ja", "mt_threshold": 0.75}"#)
                .unwrap();
        assert_eq!(config.target_language, "ja");
        assert_eq!(config.mt_threshold, 0.75);
        assert_eq!(config.source_threshold, 0.6);
        assert_eq!(config.alignment.step_px, 10.0);
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = TrackerConfig::new("en", "fr");
        config.mt_threshold = 1.5;
        match config.validate() {
            Err(TrackerError::Config(msg)) => assert!(msg.contains("mt_threshold")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_language() {
        let config = TrackerConfig::new("", "fr");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("cx-tracker-config-test.json");
        fs::write(&path, r#"{"source_language": "en", "target_language": "ml"}"#).unwrap();
        let config = TrackerConfig::from_file(&path).unwrap();
        assert_eq!(config.target_language, "ml");
        fs::remove_file(&path).ok();
    }
}
