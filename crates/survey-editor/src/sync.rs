//! Cross-session synchronization
//!
//! Sessions share state through a [`SnapshotStore`]. Each publish writes the
//! whole [`EditorSnapshot`] under a higher revision; [`SessionSync::reconcile`]
//! replaces the local state when a newer revision shows up. The last write
//! wins.

use crate::editor::SurveyEditor;
use crate::error::EditorError;
use crate::snapshot::EditorSnapshot;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use ulid::Ulid;

/// Sync failures
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Storage backend failure
    #[error("snapshot store: {0}")]
    Backend(String),

    #[error("snapshot store I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot store JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored snapshot could not be applied
    #[error("stored snapshot rejected: {0}")]
    Rejected(#[from] EditorError),
}

/// Snapshot as kept by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSnapshot {
    pub revision: u64,
    pub saved_at: DateTime<Utc>,
    pub snapshot: EditorSnapshot,
}

/// Shared storage for session snapshots
///
/// Implementations keep at most one snapshot per session id.
pub trait SnapshotStore {
    /// Latest snapshot for `session`, if any
    ///
    /// # Errors
    /// Returns error on storage failure; a missing snapshot is `Ok(None)`.
    fn load(&self, session: &Ulid) -> Result<Option<StoredSnapshot>, SyncError>;

    /// Replace the snapshot for `session`
    ///
    /// # Errors
    /// Returns error on storage failure.
    fn save(&self, session: &Ulid, stored: &StoredSnapshot) -> Result<(), SyncError>;
}

/// In-memory store; clones share the same storage
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<Mutex<HashMap<Ulid, StoredSnapshot>>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, session: &Ulid) -> Result<Option<StoredSnapshot>, SyncError> {
        Ok(self.entries.lock().get(session).cloned())
    }

    fn save(&self, session: &Ulid, stored: &StoredSnapshot) -> Result<(), SyncError> {
        self.entries.lock().insert(*session, stored.clone());
        Ok(())
    }
}

/// Per-session sync cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSync {
    last_revision: u64,
}

impl SessionSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Revision last published or applied by this session
    #[inline]
    #[must_use]
    pub fn last_revision(&self) -> u64 {
        self.last_revision
    }

    /// Write the editor state under the next revision
    ///
    /// # Errors
    /// Returns the store's errors.
    pub fn publish(
        &mut self,
        editor: &SurveyEditor,
        store: &impl SnapshotStore,
    ) -> Result<u64, SyncError> {
        let session = editor.session_id();
        let stored_revision = store.load(&session)?.map_or(0, |s| s.revision);
        let revision = stored_revision.max(self.last_revision) + 1;
        store.save(
            &session,
            &StoredSnapshot {
                revision,
                saved_at: Utc::now(),
                snapshot: editor.to_snapshot(),
            },
        )?;
        self.last_revision = revision;
        tracing::debug!(session = %session, revision, "Published snapshot");
        Ok(revision)
    }

    /// Replace the editor state if the store holds a newer revision
    ///
    /// Returns true if the state was replaced.
    ///
    /// # Errors
    /// Returns the store's errors or [`SyncError::Rejected`] if the stored
    /// snapshot fails validation; the editor is unchanged on error.
    pub fn reconcile(
        &mut self,
        editor: &mut SurveyEditor,
        store: &impl SnapshotStore,
    ) -> Result<bool, SyncError> {
        let session = editor.session_id();
        let Some(stored) = store.load(&session)? else {
            return Ok(false);
        };
        if stored.revision <= self.last_revision {
            return Ok(false);
        }
        editor.load_snapshot(stored.snapshot)?;
        self.last_revision = stored.revision;
        tracing::info!(session = %session, revision = stored.revision, "Applied newer snapshot");
        Ok(true)
    }
}
