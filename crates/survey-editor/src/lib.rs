//! Survey editing session
//!
//! # Core Concepts
//!
//! - [`SurveyEditor`]: facade over one [`survey_document::SurveyDocument`];
//!   every successful mutation becomes one [`HistoryEntry`]
//! - [`History`]: linear undo/redo log of full snapshots
//! - [`ObserverRegistry`] / [`Subscription`]: change callbacks with
//!   drop-guard unsubscribe
//! - [`EditorSnapshot`]: serializable session state
//! - [`SnapshotStore`] / [`SessionSync`]: last-write-wins sharing between sessions
//!
//! # Example
//!
//! ```rust
//! use survey_editor::{EditorConfig, SurveyEditor};
//! use survey_model::{ItemBody, ItemKey, SurveyItem};
//!
//! let mut editor = SurveyEditor::new("survey", EditorConfig::default()).unwrap();
//! let group = SurveyItem::new(ItemKey::from_full_key("survey.G1").unwrap(), ItemBody::group());
//! editor.add_item("survey", group, None).unwrap();
//! assert_eq!(editor.current_index(), 1);
//!
//! editor.undo().unwrap();
//! assert!(!editor.document().contains("survey.G1"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod editor;
mod error;
mod history;
mod observer;
mod snapshot;
mod sync;

pub use config::EditorConfig;
pub use editor::{ItemExpressionIssue, SurveyEditor};
pub use error::EditorError;
pub use history::{History, HistoryEntry, HistoryError};
pub use observer::{ChangeKind, ObserverRegistry, Subscription};
pub use snapshot::{EditorSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use sync::{MemorySnapshotStore, SessionSync, SnapshotStore, StoredSnapshot, SyncError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
