//! Offline provider
//!
//! Produces recognizable "translations" without a server, so tracker and CLI
//! flows can be exercised end to end. The output keeps the input markup.
//!
//! # Example
//!
//! ```ignore
//! use cx_tracker_mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("<p>hello</p>", "en", "fr").await.unwrap();
//!     assert_eq!(result, "<p>hello_fr</p>");
//! }
//! ```

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// How the mock answers
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target locale to every word outside tags:
    /// `<p>hello</p>` → `<p>hello_fr</p>`
    Suffix,

    /// Predefined (html, target_locale) → translation, falling back to Suffix
    Mappings(HashMap<(String, String), String>),

    /// Simulate service errors
    Error(String),

    /// Echo the input, as an engine with no model for the pair would
    NoOp,
}

/// Provider answering from a [`MockMode`] instead of a server
#[derive(Debug, Clone)]
pub struct MockTranslator {
    id: String,
    mode: MockMode,
    /// Latency added before answering, in milliseconds
    delay_ms: u64,
}

impl MockTranslator {
    /// Create a mock with the provider id `"Mock"`
    ///
    /// # Arguments
    ///
    /// * `mode` - How translations are produced
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mock = MockTranslator::new(MockMode::Suffix);
    /// assert_eq!(mock.provider_id(), "Mock");
    /// ```
    pub fn new(mode: MockMode) -> Self {
        Self::named("Mock", mode)
    }

    /// Create a mock answering under a given provider id
    ///
    /// The id becomes the origin of the content, so a tracker sees the mock
    /// exactly as it would see the real engine.
    ///
    /// # Arguments
    ///
    /// * `id` - Provider id, e.g. `"MinT"`
    /// * `mode` - How translations are produced
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mint = MockTranslator::named("MinT", MockMode::Suffix);
    /// let html = mint.translate("<p>cat</p>", "en", "fr").await?; // "<p>cat_fr</p>"
    /// ```
    pub fn named(id: &str, mode: MockMode) -> Self {
        Self {
            id: id.to_string(),
            mode,
            delay_ms: 0,
        }
    }

    /// Create a mock that answers after a delay, for timing-sensitive flows
    ///
    /// # Arguments
    ///
    /// * `mode` - How translations are produced
    /// * `delay_ms` - Latency added to every call, in milliseconds
    ///
    /// # Example
    ///
    /// ```ignore
    /// let slow = MockTranslator::with_delay(MockMode::NoOp, 200);
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, html: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(suffix_words(html, target)),
            MockMode::Mappings(map) => {
                let key = (html.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| suffix_words(html, target)))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::NoOp => Ok(html.to_string()),
        }
    }
}

/// Suffix each word of the text between tags, leaving markup untouched
fn suffix_words(html: &str, target: &str) -> String {
    let tag = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
    let suffix_text = |text: &str| {
        text.split(' ')
            .map(|word| {
                if word.trim().is_empty() {
                    word.to_string()
                } else {
                    format!("{}_{}", word, target)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut result = String::with_capacity(html.len() * 2);
    let mut last = 0;
    for m in tag.find_iter(html) {
        result.push_str(&suffix_text(&html[last..m.start()]));
        result.push_str(m.as_str());
        last = m.end();
    }
    result.push_str(&suffix_text(&html[last..]));
    result
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        html: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        self.apply_delay().await;
        self.apply_translation(html, target_locale)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_suffix_keeps_markup() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock
            .translate("<p>hello <b>big</b> world</p>", "en", "fr")
            .await
            .unwrap();
        assert_eq!(result, "<p>hello_fr <b>big_fr</b> world_fr</p>");
    }

    #[tokio::test]
    async fn test_suffix_plain_text() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.translate("hello", "en", "ru").await.unwrap(), "hello_ru");
        assert_eq!(mock.translate("", "en", "ru").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_mapping_and_fallback() {
        let mut map = HashMap::new();
        map.insert(
            ("<p>hello</p>".to_string(), "fr".to_string()),
            "<p>bonjour</p>".to_string(),
        );
        let mock = MockTranslator::new(MockMode::Mappings(map));
        assert_eq!(mock.translate("<p>hello</p>", "en", "fr").await.unwrap(), "<p>bonjour</p>");
        assert_eq!(mock.translate("<p>bye</p>", "en", "fr").await.unwrap(), "<p>bye_fr</p>");
    }

    #[tokio::test]
    async fn test_error_mode_returns_error() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello", "en", "fr").await {
            Err(MtError::TranslationError(msg)) => assert_eq!(msg, "API unavailable"),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_noop_returns_unchanged() {
        let mock = MockTranslator::new(MockMode::NoOp);
        assert_eq!(mock.translate("<p>Hello</p>", "en", "fr").await.unwrap(), "<p>Hello</p>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_adds_latency() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
        let start = tokio::time::Instant::now();
        mock.translate("hello", "en", "fr").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_provider_id() {
        assert_eq!(MockTranslator::new(MockMode::Suffix).provider_id(), "Mock");
        assert_eq!(MockTranslator::named("MinT", MockMode::NoOp).provider_id(), "MinT");
    }
}
