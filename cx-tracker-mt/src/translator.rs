//! Provider seam and language code helpers
//!
//! Providers take the HTML of a single section and return it translated with
//! the markup in place. Language codes are wiki language codes (`en`,
//! `be-tarask`, `zh`), not full BCP 47 tags.

use crate::error::{MtError, MtResult};
use async_trait::async_trait;

/// An MT engine that can translate section HTML
///
/// Implementations must be shareable across tasks; the section translator
/// keeps them behind `Arc<dyn MachineTranslator>`.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate the HTML of one section
    ///
    /// # Arguments
    ///
    /// * `html` - Section HTML; tags and attributes come back unchanged
    /// * `source_locale` - Wiki language code of the article (e.g. "en")
    /// * `target_locale` - Wiki language code to translate into (e.g. "be-tarask")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated HTML, empty for blank input
    /// * `Err(MtError)` - Invalid language codes, or an engine or network failure
    ///
    /// # Example
    ///
    /// ```ignore
    /// let provider = CxServerProvider::from_env("MinT")?;
    /// let html = provider.translate("<p>Hello</p>", "en", "es").await?;
    /// ```
    async fn translate(&self, html: &str, source_locale: &str, target_locale: &str)
    -> MtResult<String>;

    /// Engine name recorded as the origin of the returned content
    ///
    /// # Returns
    ///
    /// The id stored in saved units (`"MinT"`, `"Google"`), never `"source"`.
    fn provider_id(&self) -> &str;
}

/// Reduce a locale tag to the wiki language code the server routes on
///
/// Script and region subtags are dropped (`zh-Hans` → `zh`, `pt_BR` → `pt`)
/// while variant subtags are part of the code and kept (`be-tarask`).
pub fn normalize_locale(locale: &str) -> String {
    let mut subtags = locale.split(['-', '_']).filter(|s| !s.is_empty());
    let Some(language) = subtags.next() else {
        return String::new();
    };
    let mut code = language.to_ascii_lowercase();
    for subtag in subtags {
        let is_script = subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic());
        let is_region = (subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()))
            || (subtag.len() == 3 && subtag.chars().all(|c| c.is_ascii_digit()));
        if !is_script && !is_region {
            code.push('-');
            code.push_str(&subtag.to_ascii_lowercase());
        }
    }
    code
}

/// Reject codes that could not be a language code, before they end up in a URL path
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("empty language code".to_string()));
    }
    match locale
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        Some(c) => Err(MtError::InvalidLocale(format!(
            "unexpected {:?} in language code {:?}",
            c, locale
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_and_region_are_dropped() {
        assert_eq!(normalize_locale("en-US"), "en");
        assert_eq!(normalize_locale("zh-Hans"), "zh");
        assert_eq!(normalize_locale("zh-Hant-TW"), "zh");
        assert_eq!(normalize_locale("pt_BR"), "pt");
        assert_eq!(normalize_locale("es-419"), "es");
        assert_eq!(normalize_locale("ML"), "ml");
    }

    #[test]
    fn test_variants_are_kept() {
        assert_eq!(normalize_locale("be-tarask"), "be-tarask");
        assert_eq!(normalize_locale("sr-Latn-ekavsk"), "sr-ekavsk");
        assert_eq!(normalize_locale(""), "");
    }

    #[test]
    fn test_validate_locale() {
        assert!(validate_locale("be-tarask").is_ok());
        assert!(validate_locale("de_DE").is_ok());
        assert!(validate_locale("").is_err());
        match validate_locale("en/../fr") {
            Err(MtError::InvalidLocale(msg)) => assert!(msg.contains("'/'")),
            other => panic!("expected InvalidLocale, got {:?}", other),
        }
    }
}
