//! Detection of unreviewed machine translation ("MT abuse")
//!
//! A section is flagged when too much of the translator's content is still
//! the frozen baseline it started from. Content copied from the source
//! article is held to a stricter threshold than machine translation, since
//! leaving it untranslated is the worse outcome.

use crate::config::TrackerConfig;
use crate::content::ContentOrigin;
use crate::issues::{Issue, Severity};
use crate::progress::unmodified_ratio;
use crate::section::SectionState;
use crate::tokenizer::token_count;

pub const MT_ABUSE_ISSUE: &str = "mt-abuse";
pub const MT_ABUSE_PUBLISH_ISSUE: &str = "mt-abuse-publish";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The source has fewer tokens than the configured floor
    TooShort,
    NoBaseline,
    NoTranslation,
    Untranslated,
}

/// Result of validating one section
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validation {
    Skipped(SkipReason),
    /// Unmodified ratio above the threshold
    Warn(f64),
    Clear(f64),
}

/// Threshold that applies to content of the given origin
pub fn threshold_for(origin: &ContentOrigin, config: &TrackerConfig) -> Option<f64> {
    match origin {
        ContentOrigin::Provider(_) => Some(config.mt_threshold),
        ContentOrigin::Source => Some(config.source_threshold),
        ContentOrigin::Untranslated => None,
    }
}

pub fn validate_section(section: &SectionState, config: &TrackerConfig) -> Validation {
    let Some(threshold) = threshold_for(section.current_provider(), config) else {
        return Validation::Skipped(SkipReason::Untranslated);
    };
    if token_count(&section.source().text, &config.source_language) < config.min_source_tokens {
        return Validation::Skipped(SkipReason::TooShort);
    }
    let Some(baseline) = section.unmodified_mt() else {
        return Validation::Skipped(SkipReason::NoBaseline);
    };
    let user = match section.user_translation() {
        Some(user) if !user.is_blank() => user,
        _ => return Validation::Skipped(SkipReason::NoTranslation),
    };

    let ratio = unmodified_ratio(&baseline.text, &user.text, &config.target_language);
    if ratio > threshold {
        Validation::Warn(ratio)
    } else {
        Validation::Clear(ratio)
    }
}

/// Build the warning shown on a flagged section
pub fn mt_abuse_issue(ratio: f64, origin: &ContentOrigin, config: &TrackerConfig) -> Issue {
    let kind = match origin {
        ContentOrigin::Source => "source text",
        _ => "machine translation",
    };
    Issue {
        name: MT_ABUSE_ISSUE.to_string(),
        message: format!(
            "{}% of the text in this section is unmodified {}. Review and improve it before publishing.",
            (ratio * 100.0).round() as u32,
            kind
        ),
        severity: Severity::Warning,
        resolvable: true,
        help_url: Some(config.help_url.clone()),
    }
}

/// Error shown on the whole translation when it is mostly unmodified MT
pub fn publish_issue(mt_share: f64, config: &TrackerConfig) -> Issue {
    Issue {
        name: MT_ABUSE_PUBLISH_ISSUE.to_string(),
        message: format!(
            "{}% of this translation is unmodified machine translation. Edit the translation to publish it.",
            (mt_share * 100.0).round() as u32
        ),
        severity: Severity::Error,
        resolvable: false,
        help_url: Some(config.help_url.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;

    const TWENTY: &str = "t1 t2 t3 t4 t5 t6 t7 t8 t9 t10 t11 t12 t13 t14 t15 t16 t17 t18 t19 t20";
    /// 13 of the 20 baseline tokens kept, giving a ratio of 0.65
    const THIRTEEN_KEPT: &str = "t1 t2 t3 t4 t5 t6 t7 t8 t9 t10 t11 t12 t13 n1 n2 n3 n4 n5 n6 n7";

    fn section(source: &str, origin: ContentOrigin, baseline: &str, user: &str) -> SectionState {
        let mut state = SectionState::new(1, Content::from_html(source));
        state.restore(
            origin,
            Some(Content::from_html(baseline)),
            Some(Content::from_html(user)),
        );
        state
    }

    fn mint() -> ContentOrigin {
        ContentOrigin::Provider("MinT".to_string())
    }

    #[test]
    fn test_source_copy_uses_lower_threshold() {
        let config = TrackerConfig::new("en", "fr");
        let copied = section(TWENTY, ContentOrigin::Source, TWENTY, THIRTEEN_KEPT);
        match validate_section(&copied, &config) {
            Validation::Warn(ratio) => assert!((ratio - 0.65).abs() < 1e-9),
            other => panic!("Expected warning, got {:?}", other),
        }

        let translated = section(TWENTY, mint(), TWENTY, THIRTEEN_KEPT);
        assert!(matches!(validate_section(&translated, &config), Validation::Clear(_)));
    }

    #[test]
    fn test_short_sections_are_skipped() {
        let config = TrackerConfig::new("en", "fr");
        let short = "one two three four five six seven eight";
        let state = section(short, mint(), "a b c d e f g h i j k l m n o p q r s t", "a b c d e f g h i j k l m n o p q r s x");
        assert_eq!(
            validate_section(&state, &config),
            Validation::Skipped(SkipReason::TooShort)
        );
    }

    #[test]
    fn test_unmodified_mt_warns() {
        let config = TrackerConfig::new("en", "fr");
        let state = section(TWENTY, mint(), TWENTY, TWENTY);
        assert_eq!(validate_section(&state, &config), Validation::Warn(1.0));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut config = TrackerConfig::new("en", "fr");
        config.source_threshold = 0.65;
        let state = section(TWENTY, ContentOrigin::Source, TWENTY, THIRTEEN_KEPT);
        assert!(matches!(validate_section(&state, &config), Validation::Clear(_)));
    }

    #[test]
    fn test_missing_baseline_or_translation() {
        let config = TrackerConfig::new("en", "fr");
        let mut state = SectionState::new(1, Content::from_html(TWENTY));
        assert_eq!(
            validate_section(&state, &config),
            Validation::Skipped(SkipReason::Untranslated)
        );

        state.begin_episode(mint());
        assert_eq!(
            validate_section(&state, &config),
            Validation::Skipped(SkipReason::NoBaseline)
        );

        state.capture_baseline(&Content::from_html(TWENTY));
        assert_eq!(
            validate_section(&state, &config),
            Validation::Skipped(SkipReason::NoTranslation)
        );
    }

    #[test]
    fn test_issue_message() {
        let config = TrackerConfig::new("en", "fr");
        let issue = mt_abuse_issue(0.654, &ContentOrigin::Source, &config);
        assert_eq!(issue.name, MT_ABUSE_ISSUE);
        assert!(issue.message.starts_with("65% "));
        assert!(issue.message.contains("source text"));
        assert_eq!(issue.severity, Severity::Warning);
        assert!(issue.resolvable);
        assert_eq!(issue.help_url.as_deref(), Some(config.help_url.as_str()));

        let issue = mt_abuse_issue(0.9, &mint(), &config);
        assert!(issue.message.contains("machine translation"));
    }
}
