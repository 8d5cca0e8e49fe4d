//! Initial content for a section, by origin
//!
//! A translator picks how to start a section: machine translation from one of
//! the registered providers, a copy of the source, or an empty section. When
//! the chosen provider fails, the section falls back to a copy of the source
//! and the translator gets a notice, so there is always something to edit.

use crate::error::{MtError, MtResult};
use crate::translator::MachineTranslator;
use cx_tracker::ContentOrigin;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Origin the editor should declare for `html`
    pub origin: ContentOrigin,
    pub html: String,
    /// Message for the translator, set when the requested origin was not available
    pub notice: Option<String>,
}

pub struct SectionTranslator {
    providers: BTreeMap<String, Arc<dyn MachineTranslator>>,
    source_locale: String,
    target_locale: String,
}

impl SectionTranslator {
    /// Create a translator for one language pair, with no providers yet
    ///
    /// # Arguments
    ///
    /// * `source_locale` - Language of the article being translated
    /// * `target_locale` - Language of the translation
    ///
    /// # Example
    ///
    /// ```ignore
    /// let translator = SectionTranslator::new("en", "es")
    ///     .with_provider(Arc::new(MockTranslator::named("MinT", MockMode::Suffix)));
    /// ```
    pub fn new(source_locale: &str, target_locale: &str) -> Self {
        Self {
            providers: BTreeMap::new(),
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn MachineTranslator>) -> Self {
        self.providers.insert(provider.provider_id().to_string(), provider);
        self
    }

    /// Registered provider ids, sorted
    pub fn providers(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Translate with a specific provider, without fallback
    pub async fn machine_translate(&self, provider_id: &str, source_html: &str) -> MtResult<String> {
        let provider = self
            .providers
            .get(provider_id)
            .ok_or_else(|| MtError::UnknownProvider(provider_id.to_string()))?;
        provider
            .translate(source_html, &self.source_locale, &self.target_locale)
            .await
    }

    /// Initial content for a section started from `origin`
    ///
    /// # Arguments
    ///
    /// * `source_html` - HTML of the source section
    /// * `origin` - The origin the translator picked
    ///
    /// # Returns
    ///
    /// Always a usable suggestion. When a provider fails or is not registered
    /// the suggestion is a source copy with origin `Source` and a `notice`.
    pub async fn suggest(&self, source_html: &str, origin: &ContentOrigin) -> Suggestion {
        match origin {
            ContentOrigin::Untranslated => Suggestion {
                origin: ContentOrigin::Untranslated,
                html: String::new(),
                notice: None,
            },
            ContentOrigin::Source => Suggestion {
                origin: ContentOrigin::Source,
                html: source_html.to_string(),
                notice: None,
            },
            ContentOrigin::Provider(id) => match self.machine_translate(id, source_html).await {
                Ok(html) => Suggestion {
                    origin: origin.clone(),
                    html,
                    notice: None,
                },
                Err(e) => {
                    warn!(provider = %id, error = %e, "Machine translation failed, copying source");
                    Suggestion {
                        origin: ContentOrigin::Source,
                        html: source_html.to_string(),
                        notice: Some(format!(
                            "Machine translation from {} is not available ({}). The source content was copied instead.",
                            id, e
                        )),
                    }
                }
            },
        }
    }
}
