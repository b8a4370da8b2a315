//! Typed argument slots
//!
//! Each operator declares an ordered list of [`SlotSpec`]s. A slot accepts
//! one argument (or, for a list slot, any number of trailing arguments)
//! whose kind is in its `allowed_types`.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use survey_model::{ExpressionArg, ReturnType};

/// What an argument position accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKind {
    /// Numeric literal
    Num,
    /// Free string literal
    Str,
    /// String literal holding a value reference (`item` or `item...slot`)
    ValueRef,
    /// Nested expression
    Exp,
}

impl Display for SlotKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Num => "num",
            Self::Str => "str",
            Self::ValueRef => "valueRef",
            Self::Exp => "exp",
        })
    }
}

/// One accepted type of a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedType {
    pub kind: SlotKind,

    /// Accepted return types for nested expressions; `None` accepts any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_expression_types: Option<Vec<ReturnType>>,
}

impl AllowedType {
    /// Numeric literal
    #[must_use]
    pub const fn num() -> Self {
        Self {
            kind: SlotKind::Num,
            allowed_expression_types: None,
        }
    }

    /// String literal
    #[must_use]
    pub const fn str() -> Self {
        Self {
            kind: SlotKind::Str,
            allowed_expression_types: None,
        }
    }

    /// Value reference
    #[must_use]
    pub const fn value_ref() -> Self {
        Self {
            kind: SlotKind::ValueRef,
            allowed_expression_types: None,
        }
    }

    /// Nested expression returning one of `types`
    #[must_use]
    pub fn exp(types: &[ReturnType]) -> Self {
        Self {
            kind: SlotKind::Exp,
            allowed_expression_types: Some(types.to_vec()),
        }
    }

    /// Nested expression of any return type
    #[must_use]
    pub const fn any_exp() -> Self {
        Self {
            kind: SlotKind::Exp,
            allowed_expression_types: None,
        }
    }

    /// Check whether `arg` fits this type
    ///
    /// String literals fit both `Str` and `ValueRef`; reference syntax is
    /// checked separately.
    #[must_use]
    pub fn accepts(&self, arg: &ExpressionArg) -> bool {
        match (self.kind, arg) {
            (SlotKind::Num, ExpressionArg::Num { .. })
            | (SlotKind::Str | SlotKind::ValueRef, ExpressionArg::Str { .. }) => true,
            (SlotKind::Exp, ExpressionArg::Exp { expression }) => self
                .allowed_expression_types
                .as_ref()
                .map_or(true, |types| types.contains(&expression.return_type())),
            _ => false,
        }
    }
}

impl Display for AllowedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.allowed_expression_types) {
            (SlotKind::Exp, Some(types)) => {
                let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
                write!(f, "exp<{}>", names.join("|"))
            }
            (kind, _) => write!(f, "{kind}"),
        }
    }
}

/// Argument position of an operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSpec {
    /// Label used in diagnostics
    pub label: String,
    pub required: bool,
    /// Absorbs every remaining argument; only valid as the last slot
    pub is_list_slot: bool,
    pub allowed_types: Vec<AllowedType>,
}

impl SlotSpec {
    /// Required single-argument slot
    #[must_use]
    pub fn required(label: impl Into<String>, allowed_types: Vec<AllowedType>) -> Self {
        Self {
            label: label.into(),
            required: true,
            is_list_slot: false,
            allowed_types,
        }
    }

    /// Optional single-argument slot
    #[must_use]
    pub fn optional(label: impl Into<String>, allowed_types: Vec<AllowedType>) -> Self {
        Self {
            required: false,
            ..Self::required(label, allowed_types)
        }
    }

    /// Trailing list slot; `required` means at least one argument
    #[must_use]
    pub fn list(label: impl Into<String>, required: bool, allowed_types: Vec<AllowedType>) -> Self {
        Self {
            label: label.into(),
            required,
            is_list_slot: true,
            allowed_types,
        }
    }

    /// Check whether `arg` fits any allowed type
    #[must_use]
    pub fn accepts(&self, arg: &ExpressionArg) -> bool {
        self.allowed_types.iter().any(|t| t.accepts(arg))
    }

    /// True if string arguments in this slot are value references
    #[must_use]
    pub fn holds_reference(&self) -> bool {
        self.allowed_types.iter().any(|t| t.kind == SlotKind::ValueRef)
    }

    /// Human-readable list of allowed types
    #[must_use]
    pub fn expected(&self) -> String {
        let names: Vec<String> = self.allowed_types.iter().map(ToString::to_string).collect();
        names.join(" or ")
    }
}
