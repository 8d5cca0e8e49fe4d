//! Translation tracker
//!
//! Reacts to content changes reported by the editor, keeps one
//! [`SectionState`] per source section up to date and decides when sections
//! are validated for unreviewed machine translation and when they need
//! saving.
//!
//! A section goes through three informal states, derived from its fields:
//! untranslated (no provider), freshly translated (provider just set and
//! baseline just captured) and validated (steady state). Any change of the
//! content origin starts a new episode and sends the section back to freshly
//! translated.
//!
//! Nothing here runs on its own. Events are fed in with a timestamp, and the
//! debounced work (draining the change queue, flushing validations) runs from
//! [`Tracker::poll`] once its deadline has passed. [`crate::session`] drives
//! a tracker from an async event loop.

use crate::config::TrackerConfig;
use crate::content::Content;
use crate::debounce::Debounce;
use crate::document::SourceDocument;
use crate::editor::{SectionLookup, StructuredEditor};
use crate::error::{TrackerError, TrackerResult};
use crate::issues::{Issue, IssueRegistry, IssueTarget};
use crate::persistence::{SavedUnit, SavedUnits};
use crate::progress::{TranslationProgress, translation_progress};
use crate::queue::WorkQueue;
use crate::section::SectionState;
use crate::validator::{
    MT_ABUSE_ISSUE, MT_ABUSE_PUBLISH_ISSUE, Validation, mt_abuse_issue, publish_issue,
    validate_section,
};
use std::collections::BTreeMap;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Tolerance when comparing restored progress with recomputed progress
const PROGRESS_TOLERANCE: f64 = 0.01;

/// What a call to [`Tracker::poll`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollResult {
    pub changes_processed: bool,
    pub validations_flushed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublishReadiness {
    pub can_publish: bool,
    /// Share of translated content that is unmodified machine translation
    pub mt_share: f64,
    pub blocked_by_mt: bool,
}

pub struct Tracker<E: StructuredEditor> {
    config: TrackerConfig,
    editor: E,
    sections: BTreeMap<u32, SectionState>,
    change_queue: WorkQueue,
    validation_delay_queue: WorkQueue,
    save_queue: WorkQueue,
    issues: IssueRegistry,
    change_debounce: Debounce,
    validation_debounce: Debounce,
    last_focused: Option<u32>,
    progress: watch::Sender<TranslationProgress>,
}

impl<E: StructuredEditor> Tracker<E> {
    /// Create the section states for a translation session
    ///
    /// Sections with a saved unit are populated from it and queued for
    /// change processing so they get reconciled with the live editor
    /// content. A restored aggregate that does not match the recomputed one
    /// is logged and the recomputed value is used.
    pub fn new(
        config: TrackerConfig,
        document: &SourceDocument,
        saved: &SavedUnits,
        persisted_progress: Option<TranslationProgress>,
        editor: E,
    ) -> TrackerResult<Self> {
        config.validate()?;
        let (progress, _) = watch::channel(TranslationProgress::zero());
        let mut tracker = Self {
            change_debounce: Debounce::new(config.change_debounce()),
            validation_debounce: Debounce::new(config.validation_delay()),
            config,
            editor,
            sections: BTreeMap::new(),
            change_queue: WorkQueue::new("change"),
            validation_delay_queue: WorkQueue::new("validation"),
            save_queue: WorkQueue::new("save"),
            issues: IssueRegistry::new(),
            last_focused: None,
            progress,
        };

        for source_section in document.sections() {
            let mut state =
                SectionState::new(source_section.number, Content::from_html(&source_section.html));
            if let Some(unit) = saved.get(&source_section.number) {
                let baseline = unit
                    .mt
                    .as_ref()
                    .filter(|mt| !mt.content.is_empty())
                    .map(|mt| Content::from_html(&mt.content));
                state.restore(unit.origin(), baseline, Some(Content::from_html(&unit.user.content)));
                tracker.change_queue.push(source_section.number);
            }
            tracker.sections.insert(source_section.number, state);
        }

        for number in saved.keys().filter(|n| !tracker.sections.contains_key(*n)) {
            warn!(section = number, "Saved translation unit has no source section, ignoring");
        }

        let recomputed = tracker.recompute_progress();
        if let Some(persisted) = persisted_progress {
            if !persisted.approx_eq(&recomputed, PROGRESS_TOLERANCE) {
                warn!(
                    ?persisted,
                    ?recomputed,
                    "Restored translation progress does not match the recomputed progress"
                );
            }
        }
        info!(
            sections = tracker.sections.len(),
            restored = tracker.change_queue.len(),
            progress = recomputed.any,
            "Translation tracker initialized"
        );
        Ok(tracker)
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn section(&self, section_number: u32) -> Option<&SectionState> {
        self.sections.get(&section_number)
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionState> {
        self.sections.values()
    }

    pub fn nodes_with_issues(&self) -> Vec<IssueTarget> {
        self.issues.nodes_with_issues()
    }

    pub fn change_queue(&self) -> &WorkQueue {
        &self.change_queue
    }

    pub fn validation_delay_queue(&self) -> &WorkQueue {
        &self.validation_delay_queue
    }

    pub fn save_queue(&self) -> &WorkQueue {
        &self.save_queue
    }

    /// Receive every published aggregate progress
    pub fn subscribe(&self) -> watch::Receiver<TranslationProgress> {
        self.progress.subscribe()
    }

    /// Last published aggregate progress
    pub fn current_progress(&self) -> TranslationProgress {
        *self.progress.borrow()
    }

    /// Recompute every section, publish and return the aggregate progress
    pub fn recompute_progress(&mut self) -> TranslationProgress {
        let progress = translation_progress(
            self.sections.values_mut(),
            &self.config.source_language,
            &self.config.target_language,
        );
        self.progress.send_replace(progress);
        progress
    }

    /// The editor reported a content change in a section
    pub fn on_section_change(&mut self, section_number: u32, now: Instant) {
        if !self.sections.contains_key(&section_number) {
            debug!(section = section_number, "Change in a node that is not a tracked section");
            return;
        }
        self.change_queue.push(section_number);
        self.change_debounce.schedule(now);
    }

    /// Arm the change debounce for sections queued without an editor event,
    /// such as the ones restored at construction
    pub fn schedule_changes(&mut self, now: Instant) {
        if !self.change_queue.is_empty() {
            self.change_debounce.schedule(now);
        }
    }

    /// Editing focus moved; leaving a section processes its pending changes
    /// and validates everything queued
    pub fn on_focus(&mut self, section_number: u32, now: Instant) {
        if self.last_focused != Some(section_number) {
            self.last_focused = Some(section_number);
            self.process_change_queue(now);
            self.flush_validations();
        }
    }

    /// Run debounced work whose deadline has passed
    pub fn poll(&mut self, now: Instant) -> PollResult {
        let mut result = PollResult::default();
        if self.change_debounce.fire(now) {
            self.process_change_queue(now);
            result.changes_processed = true;
        }
        if self.validation_debounce.fire(now) {
            self.flush_validations();
            result.validations_flushed = true;
        }
        result
    }

    /// Earliest deadline [`Tracker::poll`] is waiting for
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.change_debounce.deadline(), self.validation_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Process every pending change and validation right away
    pub fn flush(&mut self, now: Instant) {
        self.process_change_queue(now);
        self.flush_validations();
    }

    /// Drain the change queue and publish the new aggregate progress
    pub fn process_change_queue(&mut self, now: Instant) {
        self.change_debounce.cancel();
        let queued = self.change_queue.drain();
        if queued.is_empty() {
            return;
        }
        debug!(count = queued.len(), "Processing change queue");
        let mut fresh = Vec::new();
        for section_number in queued {
            self.process_change(section_number, now, &mut fresh);
        }
        self.recompute_progress();
    }

    /// `fresh` collects the sections that started an episode in this drain;
    /// they stay queued for validation instead of being flushed by each other
    fn process_change(&mut self, section_number: u32, now: Instant, fresh: &mut Vec<u32>) {
        let live = match self.editor.section_content(section_number) {
            SectionLookup::Live(live) => live,
            SectionLookup::Placeholder => {
                self.reset_section(section_number);
                return;
            }
            SectionLookup::Missing => {
                debug!(section = section_number, "Section model not available, skipping");
                return;
            }
        };
        let source_language = self.config.source_language.as_str();
        let target_language = self.config.target_language.as_str();
        let Some(state) = self.sections.get_mut(&section_number) else {
            return;
        };

        let fresh_translation = state.current_provider() != &live.origin;
        if fresh_translation {
            debug!(
                section = section_number,
                from = %state.current_provider(),
                to = %live.origin,
                "Content origin changed, starting a new translation episode"
            );
            state.begin_episode(live.origin);
        }

        let content = Content::from_html(&live.html);
        state.capture_baseline(&content);
        state.set_user_translation(content);
        let metrics = state.recompute(source_language, target_language);
        debug!(
            section = section_number,
            progress = metrics.translation_progress,
            unmodified = metrics.unmodified_percentage,
            modified = metrics.is_modified,
            "Section updated"
        );
        self.save_queue.push(section_number);

        if fresh_translation {
            // Old warnings elsewhere should not linger while this one is being edited
            self.validation_delay_queue.discard(section_number);
            self.flush_validations_except(fresh);
            fresh.push(section_number);
            self.validation_delay_queue.push(section_number);
            return;
        }

        self.validation_delay_queue.push(section_number);
        self.validation_debounce.schedule(now);
    }

    fn reset_section(&mut self, section_number: u32) {
        let Some(state) = self.sections.get_mut(&section_number) else {
            return;
        };
        debug!(section = section_number, "Section became a placeholder, resetting");
        state.reset();
        self.validation_delay_queue.discard(section_number);
        self.save_queue.discard(section_number);
        self.clear_issue(IssueTarget::Section(section_number), MT_ABUSE_ISSUE);
    }

    /// Validate every section waiting in the validation queue
    pub fn flush_validations(&mut self) {
        self.flush_validations_except(&[]);
    }

    fn flush_validations_except(&mut self, keep: &[u32]) {
        self.validation_debounce.cancel();
        let mut kept = Vec::new();
        for section_number in self.validation_delay_queue.drain() {
            if keep.contains(&section_number) {
                kept.push(section_number);
            } else {
                self.validate(section_number);
            }
        }
        // Drain order is reversed; push back in the original order
        for section_number in kept.into_iter().rev() {
            self.validation_delay_queue.push(section_number);
        }
    }

    /// Check one section and add or clear its MT abuse warning
    ///
    /// A warning already shown is sent again only when its message changed.
    pub fn validate(&mut self, section_number: u32) -> Option<Validation> {
        let state = self.sections.get(&section_number)?;
        let outcome = validate_section(state, &self.config);
        let target = IssueTarget::Section(section_number);
        match outcome {
            Validation::Warn(ratio) => {
                let issue = mt_abuse_issue(ratio, state.current_provider(), &self.config);
                if self.issues.record(target, &issue) {
                    info!(section = section_number, ratio, "Unmodified content above threshold");
                    self.editor.add_issues(target, &[issue]);
                }
            }
            Validation::Clear(_) | Validation::Skipped(_) => {
                self.clear_issue(target, MT_ABUSE_ISSUE);
            }
        }
        Some(outcome)
    }

    /// Attach an issue found by the host, e.g. on the title
    pub fn report_issue(&mut self, target: IssueTarget, issue: Issue) {
        if self.issues.record(target, &issue) {
            self.editor.add_issues(target, &[issue]);
        }
    }

    pub fn resolve_issue(&mut self, target: IssueTarget, name: &str) -> bool {
        self.clear_issue(target, name)
    }

    fn clear_issue(&mut self, target: IssueTarget, name: &str) -> bool {
        if self.issues.resolve(target, name) {
            self.editor.resolve_issues(target, &[name]);
            true
        } else {
            false
        }
    }

    /// Decide whether the translation may be published
    ///
    /// A translation made almost entirely of unmodified machine translation
    /// gets a blocking error on the global target.
    pub fn publish_readiness(&mut self) -> PublishReadiness {
        let progress = self.recompute_progress();
        let mt_share = progress.mt_share();
        let blocked_by_mt = mt_share > self.config.publish_threshold;
        if blocked_by_mt {
            let issue = publish_issue(mt_share, &self.config);
            self.report_issue(IssueTarget::Global, issue);
        } else {
            self.clear_issue(IssueTarget::Global, MT_ABUSE_PUBLISH_ISSUE);
        }
        PublishReadiness {
            can_publish: progress.any > 0.0 && !blocked_by_mt,
            mt_share,
            blocked_by_mt,
        }
    }

    /// Hand the sections waiting to be saved to the persistence layer
    pub fn take_save_queue(&mut self) -> Vec<(u32, SavedUnit)> {
        self.save_queue
            .drain()
            .into_iter()
            .filter_map(|number| {
                self.sections
                    .get(&number)
                    .map(|state| (number, SavedUnit::from_state(state)))
            })
            .collect()
    }

    /// Put a section back on the save queue after a failed save
    pub fn requeue_save(&mut self, section_number: u32) -> TrackerResult<()> {
        if !self.sections.contains_key(&section_number) {
            return Err(TrackerError::UnknownSection(section_number));
        }
        self.save_queue.push(section_number);
        Ok(())
    }
}
