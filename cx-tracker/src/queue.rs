//! Set-backed work queue of section numbers

use tracing::warn;

/// Ordered queue without duplicates
///
/// Pushing an entry that is already queued does nothing. A drain hands out
/// every entry queued so far and leaves the queue empty, so entries pushed
/// while the drained ones are processed wait for the next drain.
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    name: &'static str,
    entries: Vec<u32>,
}

impl WorkQueue {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Insert if absent, returning whether the entry was added
    pub fn push(&mut self, section_number: u32) -> bool {
        if self.contains(section_number) {
            return false;
        }
        self.entries.push(section_number);
        true
    }

    pub fn contains(&self, section_number: u32) -> bool {
        self.entries.contains(&section_number)
    }

    /// Remove an entry; a missing entry is logged, not an error
    pub fn remove(&mut self, section_number: u32) -> bool {
        match self.entries.iter().position(|&n| n == section_number) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => {
                warn!(
                    queue = self.name,
                    section = section_number,
                    "Tried to remove a section that is not queued"
                );
                false
            }
        }
    }

    /// Remove an entry if present, without complaining when it is not
    pub fn discard(&mut self, section_number: u32) -> bool {
        if self.contains(section_number) {
            self.remove(section_number)
        } else {
            false
        }
    }

    /// Take all entries, most recently queued first
    pub fn drain(&mut self) -> Vec<u32> {
        let mut drained = std::mem::take(&mut self.entries);
        drained.reverse();
        drained
    }

    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
