//! Expression trees for conditions, validations and actions
//!
//! Nodes are immutable: every edit builds a new [`Expression`]. Arguments are
//! a closed union ([`ExpressionArg`]) so every consumer matches all dtypes.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Declared return type of an expression node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    /// Boolean (conditions, validations)
    Boolean,
    /// Number
    Numeric,
    /// String
    String,
    /// Side-effecting action
    Action,
    /// List of values
    List,
}

impl ReturnType {
    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Action => "action",
            Self::List => "list",
        }
    }
}

impl Display for ReturnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument dtype tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgDType {
    /// Numeric literal
    Num,
    /// String literal
    Str,
    /// Nested expression
    Exp,
}

impl Display for ArgDType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Num => "num",
            Self::Str => "str",
            Self::Exp => "exp",
        })
    }
}

/// One argument of an expression node
///
/// Serialized as `{"dtype":"num","num":1}`, `{"dtype":"str","str":"x"}` or
/// `{"dtype":"exp","exp":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", rename_all = "lowercase")]
pub enum ExpressionArg {
    /// Numeric literal
    Num {
        #[serde(rename = "num")]
        value: f64,
    },
    /// String literal
    Str {
        #[serde(rename = "str")]
        value: String,
    },
    /// Nested expression
    Exp {
        #[serde(rename = "exp")]
        expression: Box<Expression>,
    },
}

impl ExpressionArg {
    /// Numeric literal argument
    #[inline]
    #[must_use]
    pub fn num(value: f64) -> Self {
        Self::Num { value }
    }

    /// String literal argument
    #[inline]
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str {
            value: value.into(),
        }
    }

    /// Nested expression argument
    #[inline]
    #[must_use]
    pub fn exp(expression: Expression) -> Self {
        Self::Exp {
            expression: Box::new(expression),
        }
    }

    /// Dtype tag
    #[inline]
    #[must_use]
    pub fn dtype(&self) -> ArgDType {
        match self {
            Self::Num { .. } => ArgDType::Num,
            Self::Str { .. } => ArgDType::Str,
            Self::Exp { .. } => ArgDType::Exp,
        }
    }

    /// Nested expression, if any
    #[inline]
    #[must_use]
    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Self::Exp { expression } => Some(expression),
            Self::Num { .. } | Self::Str { .. } => None,
        }
    }

    /// String literal, if any
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str { value } => Some(value),
            Self::Num { .. } | Self::Exp { .. } => None,
        }
    }
}

impl From<Expression> for ExpressionArg {
    fn from(expression: Expression) -> Self {
        Self::exp(expression)
    }
}

/// Expression node
///
/// # Invariants
/// - Never mutated in place; `with_arg`/`push_arg` return new nodes
/// - `name` identifies the operator in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    name: String,
    return_type: ReturnType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    data: Vec<ExpressionArg>,
}

impl Expression {
    /// Create a node
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: ReturnType, data: Vec<ExpressionArg>) -> Self {
        Self {
            name: name.into(),
            return_type,
            data,
        }
    }

    /// Boolean node
    #[inline]
    #[must_use]
    pub fn boolean(name: impl Into<String>, data: Vec<ExpressionArg>) -> Self {
        Self::new(name, ReturnType::Boolean, data)
    }

    /// Numeric node
    #[inline]
    #[must_use]
    pub fn numeric(name: impl Into<String>, data: Vec<ExpressionArg>) -> Self {
        Self::new(name, ReturnType::Numeric, data)
    }

    /// Action node
    #[inline]
    #[must_use]
    pub fn action(name: impl Into<String>, data: Vec<ExpressionArg>) -> Self {
        Self::new(name, ReturnType::Action, data)
    }

    /// Operator name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared return type
    #[inline]
    #[must_use]
    pub fn return_type(&self) -> ReturnType {
        self.return_type
    }

    /// Arguments
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[ExpressionArg] {
        &self.data
    }

    /// Argument at position
    #[inline]
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&ExpressionArg> {
        self.data.get(index)
    }

    /// New node with the argument at `index` replaced
    ///
    /// Returns `None` if `index` is past the end.
    #[must_use]
    pub fn with_arg(&self, index: usize, arg: ExpressionArg) -> Option<Self> {
        if index >= self.data.len() {
            return None;
        }
        let mut data = self.data.clone();
        data[index] = arg;
        Some(Self::new(self.name.clone(), self.return_type, data))
    }

    /// New node with an argument appended
    #[must_use]
    pub fn push_arg(&self, arg: ExpressionArg) -> Self {
        let mut data = self.data.clone();
        data.push(arg);
        Self::new(self.name.clone(), self.return_type, data)
    }

    /// New node with the same operator and return type but new arguments
    #[must_use]
    pub fn with_data(&self, data: Vec<ExpressionArg>) -> Self {
        Self::new(self.name.clone(), self.return_type, data)
    }

    /// Visit this node and every nested node, depth-first, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        visit(self);
        for arg in &self.data {
            if let ExpressionArg::Exp { expression } = arg {
                expression.walk(visit);
            }
        }
    }

    /// Number of nodes in this tree
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// First NaN or infinite numeric literal in this tree
    ///
    /// JSON has no encoding for these, so a tree holding one cannot be
    /// written and read back.
    #[must_use]
    pub fn non_finite_literal(&self) -> Option<f64> {
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() {
                found = node.data.iter().find_map(|arg| match arg {
                    ExpressionArg::Num { value } if !value.is_finite() => Some(*value),
                    _ => None,
                });
            }
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Expression {
        Expression::boolean(
            "and",
            vec![
                ExpressionArg::exp(Expression::boolean("isDefined", vec![ExpressionArg::str("survey.Q1")])),
                ExpressionArg::exp(Expression::boolean(
                    "gt",
                    vec![ExpressionArg::num(3.5), ExpressionArg::num(1.0)],
                )),
            ],
        )
    }

    #[test]
    fn serializes_with_dtype_tags() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["name"], "and");
        assert_eq!(json["returnType"], "boolean");
        assert_eq!(json["data"][0]["dtype"], "exp");
        assert_eq!(json["data"][0]["exp"]["data"][0]["dtype"], "str");
        assert_eq!(json["data"][0]["exp"]["data"][0]["str"], "survey.Q1");
        assert_eq!(json["data"][1]["exp"]["data"][0]["num"], 3.5);
    }

    #[test]
    fn deserializes_without_data() {
        let e: Expression = serde_json::from_str(r#"{"name":"now","returnType":"numeric"}"#).unwrap();
        assert_eq!(e.name(), "now");
        assert!(e.data().is_empty());
    }

    #[test]
    fn with_arg_builds_new_node() {
        let original = sample();
        let edited = original.with_arg(1, ExpressionArg::num(2.0)).unwrap();
        assert_ne!(original, edited);
        assert_eq!(original.arg(1).unwrap().dtype(), ArgDType::Exp);
        assert_eq!(edited.arg(1).unwrap().dtype(), ArgDType::Num);
        assert!(original.with_arg(7, ExpressionArg::num(0.0)).is_none());
    }

    #[test]
    fn push_arg_leaves_original_untouched() {
        let original = sample();
        let longer = original.push_arg(ExpressionArg::str("x"));
        assert_eq!(original.data().len(), 2);
        assert_eq!(longer.data().len(), 3);
    }

    #[test]
    fn finds_non_finite_literals_at_any_depth() {
        assert_eq!(sample().non_finite_literal(), None);
        let nested = sample().push_arg(ExpressionArg::exp(Expression::numeric(
            "sum",
            vec![ExpressionArg::num(1.0), ExpressionArg::num(f64::INFINITY)],
        )));
        assert_eq!(nested.non_finite_literal(), Some(f64::INFINITY));
        let top = Expression::boolean("eq", vec![ExpressionArg::num(f64::NAN)]);
        assert!(top.non_finite_literal().is_some_and(f64::is_nan));
    }

    #[test]
    fn walk_visits_parents_first() {
        let mut names = Vec::new();
        sample().walk(&mut |e| names.push(e.name().to_string()));
        assert_eq!(names, vec!["and", "isDefined", "gt"]);
        assert_eq!(sample().node_count(), 3);
    }

    #[test]
    fn unknown_dtype_is_rejected() {
        let raw = r#"{"name":"x","returnType":"boolean","data":[{"dtype":"date","date":1}]}"#;
        assert!(serde_json::from_str::<Expression>(raw).is_err());
    }
}
