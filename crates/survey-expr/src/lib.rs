//! Survey expression engine
//!
//! Typed operator slots, exhaustive validation and reference traversal for
//! [`survey_model::Expression`] trees.
//!
//! # Core Concepts
//!
//! - [`OperatorRegistry`]: operator name to [`OperatorDef`] (return type + [`SlotSpec`]s)
//! - [`standard`]: shared registry with the built-in logic, comparison,
//!   response query and action operators
//! - [`validate_expression`]: every [`ExpressionIssue`] in a tree, with paths
//! - [`value_refs`] / [`map_value_refs`]: find and rewrite value references

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod refs;
mod registry;
mod slot;
mod validate;

pub use refs::{map_value_refs, value_refs, FoundReference};
pub use registry::{standard, Arity, OperatorDef, OperatorRegistry};
pub use slot::{AllowedType, SlotKind, SlotSpec};
pub use validate::{validate_expression, ExprPath, ExpressionIssue};
