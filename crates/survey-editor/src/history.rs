//! Linear undo/redo history
//!
//! [`History`] keeps full snapshots. Entry 0 is the initial state; a push
//! after an undo drops every entry after the current one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use survey_model::{Fingerprint, HashError};

/// One recorded state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry<S> {
    /// Position in the history
    pub index: usize,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Blake3 hash of the snapshot's JSON encoding
    pub fingerprint: Fingerprint,
    pub snapshot: S,
}

/// History errors; none of them changes the history
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Already at the first entry
    #[error("nothing to undo")]
    NoMoreUndo,

    /// Already at the last entry
    #[error("nothing to redo")]
    NoMoreRedo,

    /// Jump target outside `[0, len)`
    #[error("history index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Snapshot could not be fingerprinted
    #[error("snapshot fingerprint failed: {0}")]
    Fingerprint(#[from] HashError),

    /// Deserialized history breaks its invariants
    #[error("invalid history state: {reason}")]
    InvalidState { reason: String },
}

/// Linear snapshot history with a movable cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History<S> {
    entries: Vec<HistoryEntry<S>>,
    current_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_entries: Option<usize>,
}

impl<S: Serialize> History<S> {
    /// History holding only the initial state
    ///
    /// # Errors
    /// Returns [`HistoryError::Fingerprint`] if the snapshot cannot be encoded.
    pub fn new(description: impl Into<String>, initial: S) -> Result<Self, HistoryError> {
        Ok(Self {
            entries: vec![make_entry(0, description.into(), initial)?],
            current_index: 0,
            max_entries: None,
        })
    }

    /// Builder: keep at most `max` entries, dropping the oldest
    #[must_use]
    pub fn with_max_entries(mut self, max: Option<usize>) -> Self {
        self.max_entries = max.map(|m| m.max(1));
        self.trim();
        self
    }

    /// Record a new state after the current one
    ///
    /// Entries after the current index are discarded. Returns the new
    /// current index.
    ///
    /// # Errors
    /// Returns [`HistoryError::Fingerprint`] if the snapshot cannot be encoded.
    pub fn push(&mut self, description: impl Into<String>, snapshot: S) -> Result<usize, HistoryError> {
        let entry = make_entry(self.current_index + 1, description.into(), snapshot)?;
        self.entries.truncate(self.current_index + 1);
        self.entries.push(entry);
        self.current_index = self.entries.len() - 1;
        self.trim();
        Ok(self.current_index)
    }

    fn trim(&mut self) {
        let Some(max) = self.max_entries else {
            return;
        };
        if self.entries.len() <= max {
            return;
        }
        let excess = self.entries.len() - max;
        self.entries.drain(..excess);
        self.current_index = self.current_index.saturating_sub(excess);
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.index = index;
        }
    }
}

impl<S> History<S> {
    /// Move the cursor to `index` and return that snapshot
    ///
    /// # Errors
    /// Returns [`HistoryError::IndexOutOfRange`] if `index` is not in `[0, len)`.
    pub fn jump_to_index(&mut self, index: usize) -> Result<&S, HistoryError> {
        if index >= self.entries.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.current_index = index;
        Ok(&self.entries[index].snapshot)
    }

    /// Step back one entry
    ///
    /// # Errors
    /// Returns [`HistoryError::NoMoreUndo`] at the first entry.
    pub fn undo(&mut self) -> Result<&S, HistoryError> {
        if !self.can_undo() {
            return Err(HistoryError::NoMoreUndo);
        }
        self.jump_to_index(self.current_index - 1)
    }

    /// Step forward one entry
    ///
    /// # Errors
    /// Returns [`HistoryError::NoMoreRedo`] at the last entry.
    pub fn redo(&mut self) -> Result<&S, HistoryError> {
        if !self.can_redo() {
            return Err(HistoryError::NoMoreRedo);
        }
        self.jump_to_index(self.current_index + 1)
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.entries.len()
    }

    /// Cursor position
    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Entry under the cursor
    #[must_use]
    pub fn current(&self) -> &HistoryEntry<S> {
        &self.entries[self.current_index]
    }

    /// All entries, oldest first
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry<S>] {
        &self.entries
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a constructed history
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry bound, if any
    #[inline]
    #[must_use]
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Check invariants of a deserialized history
    ///
    /// # Errors
    /// Returns [`HistoryError::InvalidState`] if there are no entries, the
    /// cursor is out of range, or entry indices are not `0..len`.
    pub fn validate(&self) -> Result<(), HistoryError> {
        let invalid = |reason: String| Err(HistoryError::InvalidState { reason });
        if self.entries.is_empty() {
            return invalid("no entries".to_string());
        }
        if self.current_index >= self.entries.len() {
            return invalid(format!(
                "current index {} with {} entries",
                self.current_index,
                self.entries.len()
            ));
        }
        if let Some((position, entry)) = self
            .entries
            .iter()
            .enumerate()
            .find(|(position, entry)| entry.index != *position)
        {
            return invalid(format!("entry at {position} claims index {}", entry.index));
        }
        Ok(())
    }
}

fn make_entry<S: Serialize>(index: usize, description: String, snapshot: S) -> Result<HistoryEntry<S>, HistoryError> {
    Ok(HistoryEntry {
        index,
        description,
        timestamp: Utc::now(),
        fingerprint: Fingerprint::of(&snapshot)?,
        snapshot,
    })
}
