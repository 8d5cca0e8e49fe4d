//! Async driver for a translation session
//!
//! Everything runs on one task: editor events arrive through a channel and
//! the loop sleeps until the earliest debounce deadline when no event comes
//! first. Saving is the only awaited I/O; a failed save puts the section
//! back on the save queue for the next flush.

use crate::alignment::{Aligner, Layout};
use crate::config::TrackerConfig;
use crate::document::SourceDocument;
use crate::editor::StructuredEditor;
use crate::error::TrackerResult;
use crate::progress::TranslationProgress;
use crate::persistence::TranslationStore;
use crate::tracker::Tracker;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    Change(u32),
    Focus(u32),
    Resize,
    /// Flush everything and stop
    Close,
}

pub struct TrackerSession<E: StructuredEditor, L: Layout> {
    translation_id: String,
    tracker: Tracker<E>,
    aligner: Aligner,
    layout: L,
    store: Arc<dyn TranslationStore>,
}

impl<E: StructuredEditor, L: Layout> TrackerSession<E, L> {
    /// Load the saved translation units and build the tracker
    pub async fn start(
        translation_id: &str,
        config: TrackerConfig,
        document: &SourceDocument,
        editor: E,
        layout: L,
        store: Arc<dyn TranslationStore>,
    ) -> TrackerResult<Self> {
        let saved = store.load_saved_translation_units(translation_id).await?;
        let persisted = store.load_progress(translation_id).await?;
        let aligner = Aligner::new(config.alignment.clone());
        let mut tracker = Tracker::new(config, document, &saved, persisted, editor)?;
        tracker.schedule_changes(Instant::now());
        info!(translation = translation_id, units = saved.len(), "Translation session started");
        Ok(Self {
            translation_id: translation_id.to_string(),
            tracker,
            aligner,
            layout,
            store,
        })
    }

    pub fn tracker(&self) -> &Tracker<E> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut Tracker<E> {
        &mut self.tracker
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.tracker.next_deadline(), self.aligner.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Consume events until `Close` or the sender goes away
    ///
    /// Returns the final aggregate progress after all pending work is done.
    pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<EditorEvent>) -> TranslationProgress {
        loop {
            let event = match self.next_deadline() {
                Some(deadline) => tokio::select! {
                    event = events.recv() => event,
                    _ = tokio::time::sleep_until(deadline) => {
                        self.poll(Instant::now()).await;
                        continue;
                    }
                },
                None => events.recv().await,
            };

            let now = Instant::now();
            match event {
                Some(EditorEvent::Change(section_number)) => {
                    self.tracker.on_section_change(section_number, now);
                    self.aligner.schedule(now);
                }
                Some(EditorEvent::Focus(section_number)) => {
                    self.tracker.on_focus(section_number, now);
                    self.flush_saves().await;
                }
                Some(EditorEvent::Resize) => self.aligner.schedule(now),
                Some(EditorEvent::Close) | None => break,
            }
        }

        self.tracker.flush(Instant::now());
        self.aligner.align_all(&mut self.layout);
        self.flush_saves().await;
        let progress = self.tracker.current_progress();
        info!(translation = %self.translation_id, progress = progress.any, "Translation session closed");
        progress
    }

    async fn poll(&mut self, now: Instant) {
        let result = self.tracker.poll(now);
        if result.changes_processed {
            self.flush_saves().await;
        }
        self.aligner.poll(now, &mut self.layout);
    }

    /// Save every queued section and the aggregate progress
    pub async fn flush_saves(&mut self) {
        let pending = self.tracker.take_save_queue();
        if pending.is_empty() {
            return;
        }
        for (section_number, unit) in pending {
            if let Err(e) = self.store.save(&self.translation_id, section_number, &unit).await {
                warn!(section = section_number, error = %e, "Saving section failed, will retry");
                if let Err(e) = self.tracker.requeue_save(section_number) {
                    warn!(error = %e, "Could not requeue section");
                }
            }
        }
        let progress = self.tracker.current_progress();
        if let Err(e) = self.store.save_progress(&self.translation_id, &progress).await {
            warn!(error = %e, "Saving translation progress failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::NoLayout;
    use crate::content::ContentOrigin;
    use crate::document::SourceSection;
    use crate::editor::MemoryEditor;
    use crate::error::TrackerError;
    use crate::issues::IssueTarget;
    use crate::persistence::{MemoryStore, SavedUnit, SavedUnits};
    use async_trait::async_trait;
    use std::time::Duration;

    const SOURCE: &str = "<p>one two three four five six seven eight nine ten eleven</p>";
    const MT: &str = "<p>un deux trois quatre cinq six sept huit neuf dix onze</p>";

    fn document() -> SourceDocument {
        SourceDocument::new(
            "Numbers",
            vec![
                SourceSection { number: 0, html: SOURCE.to_string() },
                SourceSection { number: 1, html: SOURCE.to_string() },
            ],
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_processes_and_saves() {
        let store = Arc::new(MemoryStore::new());
        let mut editor = MemoryEditor::new();
        editor.set_section(0, MT, ContentOrigin::Provider("MinT".to_string()));
        let mut session = TrackerSession::start(
            "t1",
            TrackerConfig::new("en", "fr"),
            &document(),
            editor,
            NoLayout,
            store.clone(),
        )
        .await
        .unwrap();

        let (sender, mut receiver) = mpsc::unbounded_channel();
        sender.send(EditorEvent::Focus(0)).unwrap();
        sender.send(EditorEvent::Change(0)).unwrap();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            sender.send(EditorEvent::Focus(1)).unwrap();
            sender.send(EditorEvent::Close).unwrap();
        });
        let progress = session.run(&mut receiver).await;
        handle.await.unwrap();

        assert_eq!(progress.translated_sections_count, 1);
        assert_eq!(session.tracker().nodes_with_issues(), vec![IssueTarget::Section(0)]);

        let saved = store.snapshot("t1").unwrap();
        assert_eq!(saved.units[&0].user.engine.as_deref(), Some("MinT"));
        assert_eq!(saved.progress, Some(progress));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_fires_after_quiet_period() {
        let store = Arc::new(MemoryStore::new());
        let mut saved = SavedUnits::new();
        let mut restored = crate::section::SectionState::new(0, crate::content::Content::from_html(SOURCE));
        restored.begin_episode(ContentOrigin::Provider("MinT".to_string()));
        restored.capture_baseline(&crate::content::Content::from_html(MT));
        restored.set_user_translation(crate::content::Content::from_html(MT));
        saved.insert(0, SavedUnit::from_state(&restored));
        store.save("t2", 0, &saved[&0]).await.unwrap();

        let mut editor = MemoryEditor::new();
        editor.set_section(0, MT, ContentOrigin::Provider("MinT".to_string()));
        let mut session = TrackerSession::start(
            "t2",
            TrackerConfig::new("en", "fr"),
            &document(),
            editor,
            NoLayout,
            store.clone(),
        )
        .await
        .unwrap();

        let (sender, mut receiver) = mpsc::unbounded_channel();
        sender.send(EditorEvent::Change(0)).unwrap();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(14)).await;
            sender.send(EditorEvent::Resize).unwrap();
            tokio::time::sleep(Duration::from_secs(3)).await;
            sender.send(EditorEvent::Close).unwrap();
        });
        session.run(&mut receiver).await;
        handle.await.unwrap();
        assert_eq!(session.tracker().nodes_with_issues(), vec![IssueTarget::Section(0)]);
        assert_eq!(session.tracker().editor().add_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_change_right_after_insert_validates_and_saves() {
        let store = Arc::new(MemoryStore::new());
        let mut editor = MemoryEditor::new();
        editor.set_section(0, MT, ContentOrigin::Provider("MinT".to_string()));
        let mut session = TrackerSession::start(
            "t4",
            TrackerConfig::new("en", "fr"),
            &document(),
            editor,
            NoLayout,
            store.clone(),
        )
        .await
        .unwrap();

        let (sender, mut receiver) = mpsc::unbounded_channel();
        sender.send(EditorEvent::Focus(0)).unwrap();
        sender.send(EditorEvent::Change(0)).unwrap();
        sender.send(EditorEvent::Focus(1)).unwrap();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(120)).await;
            sender.send(EditorEvent::Close).unwrap();
        });

        // Stop short of Close: the focus event alone must have validated section 0
        tokio::select! {
            _ = session.run(&mut receiver) => panic!("session closed early"),
            _ = tokio::time::sleep(Duration::from_secs(60)) => {}
        }
        assert_eq!(session.tracker().nodes_with_issues(), vec![IssueTarget::Section(0)]);
        assert!(session.tracker().save_queue().is_empty());
        assert!(store.snapshot("t4").unwrap().units.contains_key(&0));
        handle.abort();
    }

    struct FailingStore;

    #[async_trait]
    impl TranslationStore for FailingStore {
        async fn load_saved_translation_units(&self, _translation_id: &str) -> TrackerResult<SavedUnits> {
            Ok(SavedUnits::new())
        }

        async fn save(&self, _translation_id: &str, _section_number: u32, _unit: &SavedUnit) -> TrackerResult<()> {
            Err(TrackerError::Store("database unavailable".to_string()))
        }

        async fn save_progress(&self, _translation_id: &str, _progress: &TranslationProgress) -> TrackerResult<()> {
            Err(TrackerError::Store("database unavailable".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_saves_are_requeued() {
        let mut editor = MemoryEditor::new();
        editor.set_section(1, MT, ContentOrigin::Source);
        let mut session = TrackerSession::start(
            "t3",
            TrackerConfig::new("en", "fr"),
            &document(),
            editor,
            NoLayout,
            Arc::new(FailingStore),
        )
        .await
        .unwrap();

        let (sender, mut receiver) = mpsc::unbounded_channel();
        sender.send(EditorEvent::Change(1)).unwrap();
        sender.send(EditorEvent::Close).unwrap();
        session.run(&mut receiver).await;
        assert_eq!(session.tracker().save_queue().entries(), &[1]);
    }
}
