//! Interface to the structured document editor
//!
//! The tracker never edits content. It reads the live html of target
//! sections and pushes issues back, both through [`StructuredEditor`].
//! [`MemoryEditor`] is a complete in-process implementation used by the
//! CLI and the tests.

use crate::content::ContentOrigin;
use crate::issues::{Issue, IssueTarget};
use std::collections::{BTreeMap, HashMap};

/// Live editable content of a target section
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSection {
    pub html: String,
    /// The origin the editor declares for the content
    pub origin: ContentOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionLookup {
    Live(LiveSection),
    /// The section exists but holds no translation (e.g. after an undo)
    Placeholder,
    /// The editor has no model for this section right now
    Missing,
}

pub trait StructuredEditor {
    fn section_content(&self, section_number: u32) -> SectionLookup;

    fn add_issues(&mut self, target: IssueTarget, issues: &[Issue]);

    fn resolve_issues(&mut self, target: IssueTarget, names: &[&str]);

    /// Show a transient message to the translator
    fn notify(&mut self, _message: &str) {}
}

#[derive(Debug, Clone, Default)]
pub struct MemoryEditor {
    sections: HashMap<u32, SectionLookup>,
    issues: BTreeMap<IssueTarget, Vec<Issue>>,
    notifications: Vec<String>,
    add_calls: usize,
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_section(&mut self, section_number: u32, html: &str, origin: ContentOrigin) {
        self.sections.insert(
            section_number,
            SectionLookup::Live(LiveSection {
                html: html.to_string(),
                origin,
            }),
        );
    }

    pub fn set_placeholder(&mut self, section_number: u32) {
        self.sections.insert(section_number, SectionLookup::Placeholder);
    }

    pub fn remove_section(&mut self, section_number: u32) {
        self.sections.remove(&section_number);
    }

    pub fn issues(&self, target: IssueTarget) -> &[Issue] {
        self.issues.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of `add_issues` calls received
    pub fn add_calls(&self) -> usize {
        self.add_calls
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }
}

impl StructuredEditor for MemoryEditor {
    fn section_content(&self, section_number: u32) -> SectionLookup {
        self.sections
            .get(&section_number)
            .cloned()
            .unwrap_or(SectionLookup::Missing)
    }

    fn add_issues(&mut self, target: IssueTarget, issues: &[Issue]) {
        self.add_calls += 1;
        let existing = self.issues.entry(target).or_default();
        for issue in issues {
            existing.retain(|known| known.name != issue.name);
            existing.push(issue.clone());
        }
    }

    fn resolve_issues(&mut self, target: IssueTarget, names: &[&str]) {
        if let Some(existing) = self.issues.get_mut(&target) {
            existing.retain(|issue| !names.contains(&issue.name.as_str()));
            if existing.is_empty() {
                self.issues.remove(&target);
            }
        }
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}
