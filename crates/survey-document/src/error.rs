//! Document store errors

use survey_model::{ItemType, KeyError};
use thiserror::Error;

/// Structural errors of the document store
///
/// Every failing operation leaves the document unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Parent key not in the document
    #[error("parent item '{parent}' not found")]
    ParentNotFound { parent: String },

    /// Full key already taken
    #[error("an item with key '{key}' already exists")]
    DuplicateKey { key: String },

    /// Parent cannot hold children
    #[error("parent '{parent}' is a {item_type}, not a group")]
    ParentNotGroup { parent: String, item_type: ItemType },

    /// Item key does not sit directly below the given parent
    #[error("item '{key}' does not belong under '{parent}'")]
    ParentMismatch { key: String, parent: String },

    /// Item cannot be inserted or updated as given
    #[error("invalid item '{key}': {reason}")]
    InvalidItem { key: String, reason: String },

    /// Position outside a child list
    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Key not in the document
    #[error("item '{key}' not found")]
    ItemNotFound { key: String },

    /// The root item is permanent
    #[error("the survey root '{key}' cannot be removed")]
    CannotRemoveRoot { key: String },

    /// Key text violates key rules
    #[error(transparent)]
    InvalidKeySyntax(#[from] KeyError),

    /// Subtree cannot move to the requested place
    #[error("cannot move '{key}' under '{target}': {reason}")]
    InvalidMove {
        key: String,
        target: String,
        reason: String,
    },

    /// Internal invariant violated; the document must be reloaded
    #[error("document corrupted: {reason}")]
    Corrupted { reason: String },

    /// Document JSON could not be read or written
    #[error("malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True for invariant violations that require a reload
    #[inline]
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupted { .. })
    }

    pub(crate) fn corrupted(reason: impl Into<String>) -> Self {
        Self::Corrupted {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(key: impl Into<String>) -> Self {
        Self::ItemNotFound { key: key.into() }
    }
}
