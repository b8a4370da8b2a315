//! Error types for file exchange
//!
//! - Parse operations (file → document or session)
//! - Serialize operations (document or session → file)
//! - Configuration loading

use std::path::PathBuf;
use survey_document::StoreError;
use survey_editor::EditorError;

/// Errors while reading survey files
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Content is neither a document nor a snapshot
    #[error("unrecognized survey content in {path}: {reason}")]
    UnknownFormat { path: PathBuf, reason: String },

    /// Malformed JSON
    #[error("syntax error in {path}: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed document that breaks the tree invariants
    #[error("invalid document in {path}: {source}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// Well-formed snapshot that fails validation
    #[error("invalid snapshot in {path}: {source}")]
    InvalidSnapshot {
        path: PathBuf,
        #[source]
        source: EditorError,
    },

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while writing survey files
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SerializeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors while loading editor configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
