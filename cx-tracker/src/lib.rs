//! Translation progress tracking for section-based article translation
//!
//! A translator works on an article section by section, starting each
//! section from machine translation, from a copy of the source, or from
//! scratch. This crate follows what happens to every section and reports:
//!
//! 1. **Progress** - how much of the source has been translated, and how much
//!    of that is human edited versus untouched machine output
//! 2. **MT abuse warnings** - sections whose content is still mostly the
//!    unmodified machine translation (or source copy) they began from
//! 3. **Alignment** - minimum heights that keep paired source and target
//!    sections level with each other
//!
//! # Workflow Example
//!
//! ```ignore
//! use cx_tracker::{MemoryEditor, ContentOrigin, SourceDocument, Tracker, TrackerConfig};
//! use tokio::time::Instant;
//!
//! let document = SourceDocument::from_file("article.json".as_ref())?;
//! let mut editor = MemoryEditor::new();
//! editor.set_section(0, "<p>El gato se sentó</p>", ContentOrigin::Provider("MinT".into()));
//!
//! let mut tracker = Tracker::new(
//!     TrackerConfig::new("en", "es"),
//!     &document,
//!     &Default::default(),
//!     None,
//!     editor,
//! )?;
//! tracker.on_section_change(0, Instant::now());
//! tracker.flush(Instant::now());
//! println!("{:?}", tracker.current_progress());
//! ```

pub mod alignment;
pub mod config;
pub mod content;
pub mod debounce;
pub mod document;
pub mod editor;
pub mod error;
pub mod issues;
pub mod persistence;
pub mod progress;
pub mod queue;
pub mod section;
pub mod session;
pub mod tokenizer;
pub mod tracker;
pub mod validator;

#[cfg(test)]
mod integration_tests;

pub use alignment::{AlignOutcome, Aligner, Layout, NoLayout, Side, align_pair};
pub use config::{AlignmentConfig, TrackerConfig};
pub use content::{Content, ContentOrigin, html_to_text};
pub use debounce::Debounce;
pub use document::{SourceDocument, SourceSection};
pub use editor::{LiveSection, MemoryEditor, SectionLookup, StructuredEditor};
pub use error::{TrackerError, TrackerResult};
pub use issues::{Issue, IssueRegistry, IssueTarget, Severity};
pub use persistence::{
    JsonFileStore, MemoryStore, SavedContent, SavedTranslation, SavedUnit, SavedUnits,
    TranslationStore,
};
pub use progress::{
    TranslationProgress, section_progress, section_progress_across, translation_progress,
    unmodified_ratio,
};
pub use queue::WorkQueue;
pub use section::{SectionMetrics, SectionState};
pub use session::{EditorEvent, TrackerSession};
pub use tokenizer::{is_cjk_language, token_count, tokenize};
pub use tracker::{PollResult, PublishReadiness, Tracker};
pub use validator::{
    MT_ABUSE_ISSUE, MT_ABUSE_PUBLISH_ISSUE, SkipReason, Validation, threshold_for,
    validate_section,
};
