//! # Selection Tracker
//!
//! The set of grounding documents the user picked, keyed by entry id and
//! kept in insertion order. It knows nothing about folders or navigation,
//! so moving around the file store never drops a selection.

use std::collections::HashMap;

use log::debug;

use crate::api::FileEntry;
use crate::core::error::SessionError;

#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    /// Ids in the order they were first selected.
    order: Vec<String>,
    entries: HashMap<String, FileEntry>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry` if absent, removes it if present. Returns whether the
    /// entry is selected afterwards.
    ///
    /// Folders are navigated, not selected: toggling one is rejected and
    /// leaves the set untouched.
    pub fn toggle(&mut self, entry: &FileEntry) -> Result<bool, SessionError> {
        if entry.is_folder() {
            return Err(SessionError::InvalidOperation("folders cannot be selected"));
        }

        if self.entries.remove(&entry.id).is_some() {
            self.order.retain(|id| id != &entry.id);
            debug!("Deselected {} ({} selected)", entry.id, self.order.len());
            return Ok(false);
        }

        self.order.push(entry.id.clone());
        self.entries.insert(entry.id.clone(), entry.clone());
        debug!("Selected {} ({} selected)", entry.id, self.order.len());
        Ok(true)
    }

    /// Owned copy of the selection in insertion order. Later toggles do not
    /// affect a snapshot already taken.
    pub fn snapshot(&self) -> Vec<FileEntry> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
