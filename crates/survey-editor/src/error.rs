//! Editor errors

use crate::history::HistoryError;
use survey_document::StoreError;
use survey_model::KeyError;

/// Errors surfaced by the editing session
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Structural failure; the document was not changed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Undo/redo failure; nothing changed
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Malformed key passed to a query
    #[error(transparent)]
    Key(#[from] KeyError),

    /// An invariant was violated earlier; load a snapshot to continue
    #[error("session requires reload: {reason}")]
    RequiresReload { reason: String },

    /// Snapshot is inconsistent
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// Snapshot JSON could not be read or written
    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    /// True if the error leaves the session blocked until reload
    #[inline]
    #[must_use]
    pub fn requires_reload(&self) -> bool {
        match self {
            Self::RequiresReload { .. } => true,
            Self::Store(err) => err.is_corruption(),
            _ => false,
        }
    }
}
