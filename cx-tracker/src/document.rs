//! The decomposed source article

use crate::content::Content;
use crate::error::{TrackerError, TrackerResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSection {
    pub number: u32,
    pub html: String,
}

/// Source sections in document order, numbered uniquely
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    title: String,
    sections: Vec<SourceSection>,
}

#[derive(Deserialize)]
struct SourceDocumentFile {
    #[serde(default)]
    title: String,
    sections: Vec<SourceSection>,
}

impl SourceDocument {
    pub fn new(title: &str, sections: Vec<SourceSection>) -> TrackerResult<Self> {
        let mut seen = HashSet::new();
        for section in &sections {
            if !seen.insert(section.number) {
                return Err(TrackerError::DuplicateSection(section.number));
            }
        }
        Ok(Self {
            title: title.to_string(),
            sections,
        })
    }

    /// Load `{"title": ..., "sections": [{"number": 0, "html": ...}]}`
    pub fn from_file(path: &Path) -> TrackerResult<Self> {
        let content = fs::read_to_string(path)?;
        let file: SourceDocumentFile = serde_json::from_str(&content)?;
        Self::new(&file.title, file.sections)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sections(&self) -> &[SourceSection] {
        &self.sections
    }

    pub fn section_content(&self, number: u32) -> Option<Content> {
        self.sections
            .iter()
            .find(|section| section.number == number)
            .map(|section| Content::from_html(&section.html))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
