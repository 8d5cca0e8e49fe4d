//! Section content and its provenance

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
static SPACE_REGEX: OnceLock<Regex> = OnceLock::new();

/// HTML of a section together with its plain text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Content {
    pub html: String,
    pub text: String,
}

impl Content {
    pub fn from_html(html: &str) -> Self {
        Self {
            html: html.to_string(),
            text: html_to_text(html),
        }
    }

    /// True when there is no visible text
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract visible text from an HTML fragment
///
/// Tags are replaced by spaces so adjacent block elements do not glue their
/// words together, entities are decoded and whitespace is collapsed.
pub fn html_to_text(html: &str) -> String {
    let tag = TAG_REGEX.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").unwrap());
    let entity =
        ENTITY_REGEX.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());
    let space = SPACE_REGEX.get_or_init(|| Regex::new(r"\s+").unwrap());

    let stripped = tag.replace_all(html, " ");
    let decoded = entity.replace_all(&stripped, |caps: &regex::Captures| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    space.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entity(name: &str) -> Option<String> {
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or(name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

/// Where the content of a target section came from
///
/// Persisted and exchanged with the editor as the engine string: a provider
/// id, the literal `"source"` or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentOrigin {
    /// A machine translation engine (e.g. "MinT", "Google")
    Provider(String),
    /// Copied verbatim from the source language section
    Source,
    Untranslated,
}

impl ContentOrigin {
    pub fn from_engine(engine: Option<&str>) -> Self {
        match engine.map(str::trim) {
            None | Some("") => ContentOrigin::Untranslated,
            Some("source") => ContentOrigin::Source,
            Some(id) => ContentOrigin::Provider(id.to_string()),
        }
    }

    pub fn engine(&self) -> Option<&str> {
        match self {
            ContentOrigin::Provider(id) => Some(id.as_str()),
            ContentOrigin::Source => Some("source"),
            ContentOrigin::Untranslated => None,
        }
    }

    /// Whether content with this origin has a baseline to measure edits against
    pub fn has_baseline(&self) -> bool {
        !matches!(self, ContentOrigin::Untranslated)
    }
}

impl fmt::Display for ContentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.engine().unwrap_or("untranslated"))
    }
}

impl Serialize for ContentOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.engine() {
            Some(engine) => serializer.serialize_some(engine),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ContentOrigin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let engine = Option::<String>::deserialize(deserializer)?;
        Ok(ContentOrigin::from_engine(engine.as_deref()))
    }
}
