//! Survey document store and reference scanner
//!
//! # Core Concepts
//!
//! - [`SurveyDocument`]: key-addressed item graph with add, remove, move,
//!   rename and reparent operations that keep the tree and every reference
//!   consistent
//! - [`UsageRecord`]: where a [`survey_model::ValueReference`] occurs
//! - [`ReferenceScanner`]: finds invalid usages and usages of a subtree
//! - [`ReferenceIndex`]: radix-tree reverse index from referenced key to usages
//!
//! # Example
//!
//! ```rust
//! use survey_document::SurveyDocument;
//! use survey_model::{ItemBody, ItemKey, SurveyItem};
//!
//! let mut doc = SurveyDocument::new("survey").unwrap();
//! let group = SurveyItem::new(ItemKey::from_full_key("survey.G1").unwrap(), ItemBody::group());
//! doc.add_item("survey", group, None).unwrap();
//!
//! let removed = doc.remove_item("survey.G1").unwrap();
//! assert_eq!(removed, vec!["survey.G1"]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod extract;
mod index;
mod scanner;
mod store;
mod usage;

pub use error::StoreError;
pub use extract::{describe_usage, extract_references, extract_usages};
pub use index::ReferenceIndex;
pub use scanner::ReferenceScanner;
pub use store::SurveyDocument;
pub use usage::{Diagnostic, InvalidReason, UsageRecord, UsageType};
