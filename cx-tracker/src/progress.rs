//! Translation progress metrics
//!
//! All metrics are coarse token counts: how much of the source has a
//! counterpart in the translation, and how much of the translation is still
//! the untouched machine output. Degenerate inputs return well defined values
//! instead of failing.

use crate::content::Content;
use crate::section::SectionState;
use crate::tokenizer::{token_count, tokenize};
use serde::{Deserialize, Serialize};

/// Relative size of a translation against its source, in tokens
///
/// Returns 1.0 for identical strings and 0.0 when either side is empty.
/// Values above 1.0 mean the translation grew and are not clamped.
pub fn section_progress(source: &str, current: &str, language: &str) -> f64 {
    section_progress_across(source, language, current, language)
}

/// Same as [`section_progress`], tokenizing each side in its own language
pub fn section_progress_across(
    source: &str,
    source_language: &str,
    current: &str,
    target_language: &str,
) -> f64 {
    if source == current {
        return 1.0;
    }
    if source.trim().is_empty() || current.trim().is_empty() {
        return 0.0;
    }
    let source_tokens = token_count(source, source_language);
    if source_tokens == 0 {
        return 0.0;
    }
    token_count(current, target_language) as f64 / source_tokens as f64
}

/// Share of `current` that is still present in `reference`, in [0, 1]
///
/// The token list with more entries is the reference set; every token of the
/// other list found anywhere in it counts once per occurrence, and the count
/// is divided by the size of the reference set. Order is ignored, so this is
/// a bag-of-tokens overlap and not an edit distance. Ties in size are broken
/// by comparing the token lists, which keeps the result independent of
/// argument order.
pub fn unmodified_ratio(reference: &str, current: &str, language: &str) -> f64 {
    if reference.trim().is_empty() || current.trim().is_empty() {
        return 0.0;
    }
    if reference == current {
        return 1.0;
    }
    let a = tokenize(reference, language);
    let b = tokenize(current, language);
    let (larger, smaller) = if a.len() > b.len() || (a.len() == b.len() && a >= b) {
        (a, b)
    } else {
        (b, a)
    };
    if larger.is_empty() {
        return 0.0;
    }
    let present = smaller.iter().filter(|token| larger.contains(token)).count();
    present as f64 / larger.len() as f64
}

/// Aggregate progress of a whole translation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationProgress {
    pub any: f64,
    pub human: f64,
    pub mt: f64,
    pub mt_sections_count: usize,
    pub translated_sections_count: usize,
}

impl TranslationProgress {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Compare the ratios within `tolerance` and the counts exactly
    pub fn approx_eq(&self, other: &TranslationProgress, tolerance: f64) -> bool {
        (self.any - other.any).abs() <= tolerance
            && (self.human - other.human).abs() <= tolerance
            && (self.mt - other.mt).abs() <= tolerance
            && self.mt_sections_count == other.mt_sections_count
            && self.translated_sections_count == other.translated_sections_count
    }

    /// Fraction of the translated content that is unmodified MT
    pub fn mt_share(&self) -> f64 {
        if self.any > 0.0 { self.mt / self.any } else { 0.0 }
    }
}

/// Recompute every section and sum up their progress
///
/// A section counts once it has non-blank user content or a non-blank MT
/// baseline: its progress goes to `any` and to `mt` when the content is still
/// the unmodified baseline, `human` otherwise. Sums are divided by the total
/// number of sections.
pub fn translation_progress<'a, I>(
    sections: I,
    source_language: &str,
    target_language: &str,
) -> TranslationProgress
where
    I: IntoIterator<Item = &'a mut SectionState>,
{
    let mut total = 0usize;
    let mut progress = TranslationProgress::zero();

    for section in sections {
        total += 1;
        let metrics = section.recompute(source_language, target_language);
        let non_blank = |content: Option<&Content>| content.is_some_and(|c| !c.is_blank());
        let has_user = non_blank(section.user_translation());
        if !has_user && !non_blank(section.unmodified_mt()) {
            continue;
        }
        progress.translated_sections_count += 1;
        progress.any += metrics.translation_progress;
        if metrics.is_modified || !has_user {
            progress.human += metrics.translation_progress;
        } else {
            progress.mt += metrics.translation_progress;
            progress.mt_sections_count += 1;
        }
    }

    if total == 0 {
        return TranslationProgress::zero();
    }
    progress.any /= total as f64;
    progress.human /= total as f64;
    progress.mt /= total as f64;
    progress
}
