//! Survey file exchange
//!
//! - [`read_survey`] / [`write_survey`]: `.json` documents and `.csurvey`
//!   editor snapshots, with content sniffing for other extensions
//! - [`load_config`]: [`survey_editor::EditorConfig`] from TOML
//! - [`FsSnapshotStore`]: directory-backed [`survey_editor::SnapshotStore`]

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod file;
mod store;

pub use config::{load_config, parse_config};
pub use error::{ConfigError, ParseError, SerializeError};
pub use file::{
    parse_survey, read_survey, write_document, write_snapshot, write_survey, SurveyFile,
    SurveyFormat, DOCUMENT_EXTENSION, SNAPSHOT_EXTENSION,
};
pub use store::FsSnapshotStore;
