//! Survey data model
//!
//! Plain value types shared by every survey crate.
//!
//! # Core Concepts
//!
//! - [`ItemKey`]: dotted hierarchical key of an item (`survey.G1.Q1`)
//! - [`SurveyItem`]: one node of the survey graph, tagged by [`ItemType`]
//! - [`Expression`]: immutable condition/action tree with a closed argument union
//! - [`ValueReference`]: pointer from an expression to an item or response slot
//! - [`Fingerprint`]: Blake3 hash of a value's JSON encoding
//!
//! # Example
//!
//! ```rust
//! use survey_model::{ItemKey, ValueReference};
//!
//! let key = ItemKey::from_full_key("survey.G1.Q1").unwrap();
//! assert_eq!(key.parent_full_key().as_deref(), Some("survey.G1"));
//!
//! let reference: ValueReference = "survey.G1.Q1...rg.scg".parse().unwrap();
//! assert!(reference.points_into(&key));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod expression;
mod hash;
mod item;
mod key;
mod reference;

pub use expression::{ArgDType, Expression, ExpressionArg, ReturnType};
pub use hash::{Fingerprint, HashError};
pub use item::{
    ChoiceOption, ChoiceQuestion, ConfidentialMode, DateInputQuestion, DisplayContent,
    GroupContent, ItemBody, ItemLogic, ItemType, LogicSlot, NumericInputQuestion, QuestionHeader,
    ScaleQuestion, SurveyEndContent, SurveyItem, TemplateValue, TextComponent, TextInputQuestion,
    META_EDITOR_ITEM_COLOR, META_ITEM_LABEL,
};
pub use key::{validate_segment, ItemKey, KeyError, KEY_SEPARATOR};
pub use reference::{ValueReference, REFERENCE_SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
