//! Saved translation units and the store they live in

use crate::content::ContentOrigin;
use crate::error::{TrackerError, TrackerResult};
use crate::progress::TranslationProgress;
use crate::section::SectionState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

/// Content of one side of a saved unit and the engine that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedContent {
    pub engine: Option<String>,
    pub content: String,
}

/// A persisted section translation: what the user has and the MT it began from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedUnit {
    pub user: SavedContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mt: Option<SavedContent>,
}

pub type SavedUnits = BTreeMap<u32, SavedUnit>;

impl SavedUnit {
    pub fn origin(&self) -> ContentOrigin {
        ContentOrigin::from_engine(self.user.engine.as_deref())
    }

    pub fn from_state(state: &SectionState) -> Self {
        let engine = state.current_provider().engine().map(str::to_string);
        Self {
            user: SavedContent {
                engine: engine.clone(),
                content: state
                    .user_translation()
                    .map(|content| content.html.clone())
                    .unwrap_or_default(),
            },
            mt: state.unmodified_mt().map(|content| SavedContent {
                engine,
                content: content.html.clone(),
            }),
        }
    }
}

/// Stored form of a whole translation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedTranslation {
    #[serde(default)]
    pub units: SavedUnits,
    #[serde(default)]
    pub progress: Option<TranslationProgress>,
}

#[async_trait]
pub trait TranslationStore: Send + Sync {
    async fn load_saved_translation_units(&self, translation_id: &str) -> TrackerResult<SavedUnits>;

    /// Aggregate progress stored alongside the translation, if any
    async fn load_progress(&self, _translation_id: &str) -> TrackerResult<Option<TranslationProgress>> {
        Ok(None)
    }

    async fn save(&self, translation_id: &str, section_number: u32, unit: &SavedUnit) -> TrackerResult<()>;

    async fn save_progress(
        &self,
        translation_id: &str,
        progress: &TranslationProgress,
    ) -> TrackerResult<()>;
}

/// Store keeping every translation as `<dir>/<translation_id>.json`
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn path_for(&self, translation_id: &str) -> TrackerResult<PathBuf> {
        if translation_id.is_empty()
            || !translation_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TrackerError::Store(format!(
                "invalid translation id: {:?}",
                translation_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", translation_id)))
    }

    pub async fn load(&self, translation_id: &str) -> TrackerResult<SavedTranslation> {
        let path = self.path_for(translation_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SavedTranslation::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn update<F>(&self, translation_id: &str, apply: F) -> TrackerResult<()>
    where
        F: FnOnce(&mut SavedTranslation) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut saved = self.load(translation_id).await?;
        apply(&mut saved);
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(&saved)?;
        tokio::fs::write(self.path_for(translation_id)?, json).await?;
        Ok(())
    }
}

#[async_trait]
impl TranslationStore for JsonFileStore {
    async fn load_saved_translation_units(&self, translation_id: &str) -> TrackerResult<SavedUnits> {
        Ok(self.load(translation_id).await?.units)
    }

    async fn load_progress(&self, translation_id: &str) -> TrackerResult<Option<TranslationProgress>> {
        Ok(self.load(translation_id).await?.progress)
    }

    async fn save(&self, translation_id: &str, section_number: u32, unit: &SavedUnit) -> TrackerResult<()> {
        let unit = unit.clone();
        self.update(translation_id, move |saved| {
            saved.units.insert(section_number, unit);
        })
        .await
    }

    async fn save_progress(
        &self,
        translation_id: &str,
        progress: &TranslationProgress,
    ) -> TrackerResult<()> {
        let progress = *progress;
        self.update(translation_id, move |saved| {
            saved.progress = Some(progress);
        })
        .await
    }
}

/// Store holding translations in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    translations: Mutex<HashMap<String, SavedTranslation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(translation_id: &str, translation: SavedTranslation) -> Self {
        let store = Self::new();
        if let Ok(mut translations) = store.translations.lock() {
            translations.insert(translation_id.to_string(), translation);
        }
        store
    }

    pub fn snapshot(&self, translation_id: &str) -> TrackerResult<SavedTranslation> {
        let translations = self
            .translations
            .lock()
            .map_err(|_| TrackerError::Store("memory store poisoned".to_string()))?;
        Ok(translations.get(translation_id).cloned().unwrap_or_default())
    }

    fn with_entry<F>(&self, translation_id: &str, apply: F) -> TrackerResult<()>
    where
        F: FnOnce(&mut SavedTranslation),
    {
        let mut translations = self
            .translations
            .lock()
            .map_err(|_| TrackerError::Store("memory store poisoned".to_string()))?;
        apply(translations.entry(translation_id.to_string()).or_default());
        Ok(())
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn load_saved_translation_units(&self, translation_id: &str) -> TrackerResult<SavedUnits> {
        Ok(self.snapshot(translation_id)?.units)
    }

    async fn load_progress(&self, translation_id: &str) -> TrackerResult<Option<TranslationProgress>> {
        Ok(self.snapshot(translation_id)?.progress)
    }

    async fn save(&self, translation_id: &str, section_number: u32, unit: &SavedUnit) -> TrackerResult<()> {
        self.with_entry(translation_id, |saved| {
            saved.units.insert(section_number, unit.clone());
        })
    }

    async fn save_progress(
        &self,
        translation_id: &str,
        progress: &TranslationProgress,
    ) -> TrackerResult<()> {
        self.with_entry(translation_id, |saved| {
            saved.progress = Some(*progress);
        })
    }
}
