//! File-backed snapshot store
//!
//! One `<session>.snapshot.json` file per session inside a directory.

use crate::error::SerializeError;
use crate::file::write_atomic;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use survey_editor::{SnapshotStore, StoredSnapshot, SyncError};
use ulid::Ulid;

/// Snapshot store shared through a directory
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    /// Store rooted at `root`; the directory is created on first save
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `session`
    #[must_use]
    pub fn path_for(&self, session: &Ulid) -> PathBuf {
        self.root.join(format!("{session}.snapshot.json"))
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn load(&self, session: &Ulid) -> Result<Option<StoredSnapshot>, SyncError> {
        let path = self.path_for(session);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, session: &Ulid, stored: &StoredSnapshot) -> Result<(), SyncError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string(stored)?;
        write_atomic(&self.path_for(session), &json).map_err(|e| match e {
            SerializeError::Io { source, .. } => SyncError::Io(source),
            SerializeError::Json(e) => SyncError::Json(e),
        })
    }
}
