//! Expression validation
//!
//! [`validate_expression`] walks a whole tree and reports every issue it
//! finds. Issues are plain data: a document may hold invalid expressions and
//! editing continues regardless.

use crate::registry::{Arity, OperatorDef, OperatorRegistry};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use survey_model::{Expression, ExpressionArg, ReturnType, ValueReference};

/// Position of a node inside an expression tree
///
/// Each entry is the argument index taken from the parent. Displayed as
/// `$` for the root and `$[1][0]` for nested nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ExprPath(Vec<usize>);

impl ExprPath {
    /// Root path
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the argument at `index` below this node
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Argument indices from the root
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl Display for ExprPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for index in &self.0 {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExpressionIssue {
    /// Operator not in the registry
    #[error("{path}: unknown operator '{name}'")]
    UnknownOperator { path: ExprPath, name: String },

    /// Declared return type differs from the operator's
    #[error("{path}: '{name}' returns {expected}, node declares {actual}")]
    ReturnTypeMismatch {
        path: ExprPath,
        name: String,
        expected: ReturnType,
        actual: ReturnType,
    },

    /// Wrong number of arguments
    #[error("{path}: '{name}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        path: ExprPath,
        name: String,
        expected: Arity,
        actual: usize,
    },

    /// Argument kind not allowed in its slot
    #[error("{path}: argument {index} of '{name}' ({slot}) expects {expected}, got {actual}")]
    TypeMismatch {
        path: ExprPath,
        name: String,
        index: usize,
        slot: String,
        expected: String,
        actual: String,
    },

    /// Reference slot holds an unparsable reference
    #[error("{path}: argument {index} of '{name}' is not a valid reference '{value}': {reason}")]
    MalformedReference {
        path: ExprPath,
        name: String,
        index: usize,
        value: String,
        reason: String,
    },
}

impl ExpressionIssue {
    /// Node the issue was found at
    #[must_use]
    pub fn path(&self) -> &ExprPath {
        match self {
            Self::UnknownOperator { path, .. }
            | Self::ReturnTypeMismatch { path, .. }
            | Self::ArityMismatch { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::MalformedReference { path, .. } => path,
        }
    }
}

/// Validate `expression` and every nested node against `registry`
///
/// Never stops at the first finding. Nested expressions are validated even
/// when their parent operator is unknown.
#[must_use]
pub fn validate_expression(expression: &Expression, registry: &OperatorRegistry) -> Vec<ExpressionIssue> {
    let mut issues = Vec::new();
    validate_node(expression, registry, &ExprPath::root(), &mut issues);
    issues
}

fn validate_node(
    expression: &Expression,
    registry: &OperatorRegistry,
    path: &ExprPath,
    issues: &mut Vec<ExpressionIssue>,
) {
    match registry.get(expression.name()) {
        Some(def) => check_against(expression, def, path, issues),
        None => issues.push(ExpressionIssue::UnknownOperator {
            path: path.clone(),
            name: expression.name().to_string(),
        }),
    }

    for (index, arg) in expression.data().iter().enumerate() {
        if let ExpressionArg::Exp { expression: nested } = arg {
            validate_node(nested, registry, &path.child(index), issues);
        }
    }
}

fn check_against(
    expression: &Expression,
    def: &OperatorDef,
    path: &ExprPath,
    issues: &mut Vec<ExpressionIssue>,
) {
    let name = expression.name();

    if expression.return_type() != def.return_type {
        issues.push(ExpressionIssue::ReturnTypeMismatch {
            path: path.clone(),
            name: name.to_string(),
            expected: def.return_type,
            actual: expression.return_type(),
        });
    }

    let arity = def.arity();
    let count = expression.data().len();
    // Missing trailing required slots or surplus arguments
    let required_fixed = def
        .slots
        .iter()
        .take_while(|s| !s.is_list_slot)
        .enumerate()
        .filter(|(_, s)| s.required)
        .map(|(i, _)| i + 1)
        .max()
        .unwrap_or(0);
    let list_unfilled = def
        .slots
        .iter()
        .enumerate()
        .any(|(i, s)| s.is_list_slot && s.required && count <= i);
    if !arity.admits(count) || count < required_fixed || list_unfilled {
        issues.push(ExpressionIssue::ArityMismatch {
            path: path.clone(),
            name: name.to_string(),
            expected: arity,
            actual: count,
        });
    }

    for (index, arg) in expression.data().iter().enumerate() {
        let Some(slot) = def.slot_for(index) else {
            continue;
        };

        if !slot.accepts(arg) {
            issues.push(ExpressionIssue::TypeMismatch {
                path: path.clone(),
                name: name.to_string(),
                index,
                slot: slot.label.clone(),
                expected: slot.expected(),
                actual: describe_arg(arg),
            });
            continue;
        }

        if let (true, ExpressionArg::Str { value }) = (slot.holds_reference(), arg) {
            if let Err(err) = value.parse::<ValueReference>() {
                issues.push(ExpressionIssue::MalformedReference {
                    path: path.clone(),
                    name: name.to_string(),
                    index,
                    value: value.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
}

fn describe_arg(arg: &ExpressionArg) -> String {
    match arg {
        ExpressionArg::Num { .. } => "num".to_string(),
        ExpressionArg::Str { .. } => "str".to_string(),
        ExpressionArg::Exp { expression } => format!("exp<{}>", expression.return_type()),
    }
}
