//! Issues reported to the editor and the registry of flagged nodes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Something an issue can be attached to
///
/// Ordering puts the sentinels first and sections by ascending number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueTarget {
    Global,
    Title,
    Section(u32),
}

impl fmt::Display for IssueTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueTarget::Global => write!(f, "global"),
            IssueTarget::Title => write!(f, "title"),
            IssueTarget::Section(number) => write!(f, "{}", number),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub name: String,
    pub message: String,
    pub severity: Severity,
    /// Whether the translator may dismiss the issue
    pub resolvable: bool,
    pub help_url: Option<String>,
}

/// Unresolved issues per target, by name, with the last message sent for each
#[derive(Debug, Clone, Default)]
pub struct IssueRegistry {
    issues: BTreeMap<IssueTarget, BTreeMap<String, String>>,
}

impl IssueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue, returning false if it was already present
    pub fn add(&mut self, target: IssueTarget, name: &str) -> bool {
        let names = self.issues.entry(target).or_default();
        if names.contains_key(name) {
            return false;
        }
        names.insert(name.to_string(), String::new());
        true
    }

    /// Record an issue, returning true when it is new or its message changed
    pub fn record(&mut self, target: IssueTarget, issue: &Issue) -> bool {
        let names = self.issues.entry(target).or_default();
        if names.get(&issue.name) == Some(&issue.message) {
            return false;
        }
        names.insert(issue.name.clone(), issue.message.clone());
        true
    }

    /// Forget an issue, returning whether it was present
    pub fn resolve(&mut self, target: IssueTarget, name: &str) -> bool {
        let Some(names) = self.issues.get_mut(&target) else {
            return false;
        };
        let removed = names.remove(name).is_some();
        if names.is_empty() {
            self.issues.remove(&target);
        }
        removed
    }

    pub fn has(&self, target: IssueTarget, name: &str) -> bool {
        self.issues
            .get(&target)
            .map(|names| names.contains_key(name))
            .unwrap_or(false)
    }

    /// Targets with at least one unresolved issue, sentinels first
    pub fn nodes_with_issues(&self) -> Vec<IssueTarget> {
        self.issues.keys().copied().collect()
    }

    pub fn issues_for(&self, target: IssueTarget) -> Vec<String> {
        self.issues
            .get(&target)
            .map(|names| names.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_places_sentinels_first() {
        let mut registry = IssueRegistry::new();
        registry.add(IssueTarget::Section(12), "mt-abuse");
        registry.add(IssueTarget::Section(3), "mt-abuse");
        registry.add(IssueTarget::Title, "title-exists");
        registry.add(IssueTarget::Global, "mt-abuse-publish");
        assert_eq!(
            registry.nodes_with_issues(),
            vec![
                IssueTarget::Global,
                IssueTarget::Title,
                IssueTarget::Section(3),
                IssueTarget::Section(12),
            ]
        );
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = IssueRegistry::new();
        assert!(registry.add(IssueTarget::Section(1), "mt-abuse"));
        assert!(!registry.add(IssueTarget::Section(1), "mt-abuse"));
        assert_eq!(registry.issues_for(IssueTarget::Section(1)).len(), 1);
    }

    #[test]
    fn test_record_reports_changed_messages() {
        let mut registry = IssueRegistry::new();
        let mut issue = Issue {
            name: "mt-abuse".to_string(),
            message: "91% unmodified".to_string(),
            severity: Severity::Warning,
            resolvable: true,
            help_url: None,
        };
        assert!(registry.record(IssueTarget::Section(2), &issue));
        assert!(!registry.record(IssueTarget::Section(2), &issue));
        issue.message = "85% unmodified".to_string();
        assert!(registry.record(IssueTarget::Section(2), &issue));
        assert_eq!(registry.issues_for(IssueTarget::Section(2)), vec!["mt-abuse"]);
        assert!(!registry.add(IssueTarget::Section(2), "mt-abuse"));
    }

    #[test]
    fn test_resolve_removes_empty_targets() {
        let mut registry = IssueRegistry::new();
        registry.add(IssueTarget::Section(1), "mt-abuse");
        assert!(registry.resolve(IssueTarget::Section(1), "mt-abuse"));
        assert!(!registry.resolve(IssueTarget::Section(1), "mt-abuse"));
        assert!(registry.is_empty());
        assert!(registry.nodes_with_issues().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(IssueTarget::Global.to_string(), "global");
        assert_eq!(IssueTarget::Title.to_string(), "title");
        assert_eq!(IssueTarget::Section(7).to_string(), "7");
    }
}
