//! Per-section translation state

use crate::content::{Content, ContentOrigin};
use crate::progress::{section_progress_across, unmodified_ratio};

/// Metrics derived from a section's source, baseline and user content
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectionMetrics {
    /// Overlap of the user translation with the unmodified baseline, in [0, 1]
    pub unmodified_percentage: f64,
    /// Token count of the user translation relative to the source
    pub translation_progress: f64,
    pub is_modified: bool,
}

/// State of one source section and its translation
///
/// Derived metrics are dropped on every mutation and only come back through
/// [`SectionState::recompute`], so they can not be read stale.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionState {
    section_number: u32,
    source: Content,
    unmodified_mt: Option<Content>,
    user_translation: Option<Content>,
    current_provider: ContentOrigin,
    metrics: Option<SectionMetrics>,
}

impl SectionState {
    pub fn new(section_number: u32, source: Content) -> Self {
        Self {
            section_number,
            source,
            unmodified_mt: None,
            user_translation: None,
            current_provider: ContentOrigin::Untranslated,
            metrics: None,
        }
    }

    pub fn section_number(&self) -> u32 {
        self.section_number
    }

    pub fn source(&self) -> &Content {
        &self.source
    }

    pub fn unmodified_mt(&self) -> Option<&Content> {
        self.unmodified_mt.as_ref()
    }

    pub fn user_translation(&self) -> Option<&Content> {
        self.user_translation.as_ref()
    }

    pub fn current_provider(&self) -> &ContentOrigin {
        &self.current_provider
    }

    /// Metrics from the last recomputation, `None` if content changed since
    pub fn metrics(&self) -> Option<&SectionMetrics> {
        self.metrics.as_ref()
    }

    /// Populate from a previously saved translation unit
    pub fn restore(
        &mut self,
        provider: ContentOrigin,
        unmodified_mt: Option<Content>,
        user_translation: Option<Content>,
    ) {
        self.current_provider = provider;
        self.unmodified_mt = unmodified_mt;
        self.user_translation = user_translation;
        self.metrics = None;
    }

    /// Start a new provider episode: the old translation and baseline are discarded
    pub fn begin_episode(&mut self, provider: ContentOrigin) {
        self.current_provider = provider;
        self.unmodified_mt = None;
        self.user_translation = None;
        self.metrics = None;
    }

    /// Freeze `content` as the baseline unless this episode already has one
    ///
    /// Untranslated content has nothing machine produced to compare against
    /// and never captures a baseline.
    pub fn capture_baseline(&mut self, content: &Content) -> bool {
        if self.unmodified_mt.is_some() || !self.current_provider.has_baseline() {
            return false;
        }
        self.unmodified_mt = Some(content.clone());
        self.metrics = None;
        true
    }

    /// Store the live content, returning whether it differed
    pub fn set_user_translation(&mut self, content: Content) -> bool {
        if self.user_translation.as_ref() == Some(&content) {
            return false;
        }
        self.user_translation = Some(content);
        self.metrics = None;
        true
    }

    /// Forget provider and content, e.g. when the section became a placeholder
    pub fn reset(&mut self) {
        self.begin_episode(ContentOrigin::Untranslated);
    }

    pub fn is_modified(&self) -> bool {
        match (&self.unmodified_mt, &self.user_translation) {
            (Some(baseline), Some(user)) => baseline.text != user.text,
            (None, Some(user)) => !user.is_blank(),
            (_, None) => false,
        }
    }

    pub fn recompute(&mut self, source_language: &str, target_language: &str) -> SectionMetrics {
        let user_text = self
            .user_translation
            .as_ref()
            .map(|content| content.text.as_str())
            .unwrap_or("");
        let unmodified_percentage = match &self.unmodified_mt {
            Some(baseline) => unmodified_ratio(&baseline.text, user_text, target_language),
            None => 0.0,
        };
        let metrics = SectionMetrics {
            unmodified_percentage,
            translation_progress: section_progress_across(
                &self.source.text,
                source_language,
                user_text,
                target_language,
            ),
            is_modified: self.is_modified(),
        };
        self.metrics = Some(metrics);
        metrics
    }
}
