//! Whole-session snapshots
//!
//! An [`EditorSnapshot`] captures everything needed to rebuild a session:
//! the document, the full history and the session id.

use crate::error::EditorError;
use crate::history::History;
use serde::{Deserialize, Serialize};
use survey_document::SurveyDocument;
use ulid::Ulid;

/// Current snapshot format
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Serializable session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub format_version: u32,
    pub session_id: Ulid,
    pub document: SurveyDocument,
    pub history: History<SurveyDocument>,
}

impl EditorSnapshot {
    /// Compact JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and check a snapshot
    ///
    /// # Errors
    /// Returns [`EditorError::Json`] for malformed JSON and the errors of
    /// [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check format, history, tree invariants and that the document matches
    /// the current history entry
    ///
    /// # Errors
    /// - [`EditorError::InvalidSnapshot`] for version or consistency problems
    /// - [`EditorError::History`] if the history breaks its invariants
    /// - [`EditorError::Store`] if the document tree is corrupted
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(EditorError::InvalidSnapshot {
                reason: format!("unsupported format version {}", self.format_version),
            });
        }
        self.history.validate()?;
        for entry in self.history.entries() {
            entry.snapshot.check_integrity()?;
        }
        if self.history.current().snapshot != self.document {
            return Err(EditorError::InvalidSnapshot {
                reason: "document differs from the current history entry".to_string(),
            });
        }
        Ok(())
    }
}
