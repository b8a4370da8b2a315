//! Value references inside expressions
//!
//! Only string arguments sitting in a slot whose allowed types include
//! `valueRef` are references. Arguments of unknown operators are never
//! treated as references.

use crate::registry::OperatorRegistry;
use crate::validate::ExprPath;
use survey_model::{Expression, ExpressionArg, ValueReference};

/// A reference found in an expression tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundReference {
    /// Node holding the reference
    pub path: ExprPath,
    /// Argument index within that node
    pub index: usize,
    pub reference: ValueReference,
}

/// Collect every well-formed value reference, parents first
///
/// Malformed reference strings are skipped; `validate_expression` reports them.
#[must_use]
pub fn value_refs(expression: &Expression, registry: &OperatorRegistry) -> Vec<FoundReference> {
    let mut found = Vec::new();
    collect(expression, registry, &ExprPath::root(), &mut found);
    found
}

fn collect(
    expression: &Expression,
    registry: &OperatorRegistry,
    path: &ExprPath,
    found: &mut Vec<FoundReference>,
) {
    let def = registry.get(expression.name());
    for (index, arg) in expression.data().iter().enumerate() {
        match arg {
            ExpressionArg::Str { value } => {
                let is_ref = def
                    .and_then(|d| d.slot_for(index))
                    .is_some_and(|s| s.holds_reference());
                if let (true, Ok(reference)) = (is_ref, value.parse::<ValueReference>()) {
                    found.push(FoundReference {
                        path: path.clone(),
                        index,
                        reference,
                    });
                }
            }
            ExpressionArg::Exp { expression: nested } => {
                collect(nested, registry, &path.child(index), found);
            }
            ExpressionArg::Num { .. } => {}
        }
    }
}

/// Build a new tree with value references passed through `rewrite`
///
/// `rewrite` returns `Some(new)` to replace a reference and `None` to keep it.
/// Subtrees without replacements are cloned unchanged.
#[must_use]
pub fn map_value_refs(
    expression: &Expression,
    registry: &OperatorRegistry,
    rewrite: &mut impl FnMut(&ValueReference) -> Option<ValueReference>,
) -> Expression {
    let def = registry.get(expression.name());
    let data = expression
        .data()
        .iter()
        .enumerate()
        .map(|(index, arg)| match arg {
            ExpressionArg::Str { value } => {
                let is_ref = def
                    .and_then(|d| d.slot_for(index))
                    .is_some_and(|s| s.holds_reference());
                if !is_ref {
                    return arg.clone();
                }
                value
                    .parse::<ValueReference>()
                    .ok()
                    .and_then(|r| rewrite(&r))
                    .map_or_else(|| arg.clone(), |r| ExpressionArg::str(r.to_string()))
            }
            ExpressionArg::Exp { expression: nested } => {
                ExpressionArg::exp(map_value_refs(nested, registry, rewrite))
            }
            ExpressionArg::Num { .. } => arg.clone(),
        })
        .collect();
    expression.with_data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::standard;
    use survey_model::ItemKey;

    fn sample() -> Expression {
        Expression::boolean(
            "and",
            vec![
                ExpressionArg::exp(Expression::boolean("isDefined", vec![ExpressionArg::str("survey.A.x")])),
                ExpressionArg::exp(Expression::boolean(
                    "responseHasKeysAny",
                    vec![ExpressionArg::str("survey.B...rg.scg"), ExpressionArg::str("survey.A")],
                )),
            ],
        )
    }

    #[test]
    fn collects_only_reference_slots() {
        let found = value_refs(&sample(), standard());
        let refs: Vec<String> = found.iter().map(|f| f.reference.to_string()).collect();
        // The option key "survey.A" sits in a plain string slot
        assert_eq!(refs, vec!["survey.A.x", "survey.B...rg.scg"]);
        assert_eq!(found[1].path.to_string(), "$[1]");
        assert_eq!(found[1].index, 0);
    }

    #[test]
    fn unknown_operators_hold_no_references() {
        let e = Expression::boolean("custom", vec![ExpressionArg::str("survey.A")]);
        assert!(value_refs(&e, standard()).is_empty());
    }

    #[test]
    fn malformed_references_are_skipped() {
        let e = Expression::boolean("isDefined", vec![ExpressionArg::str("survey..A")]);
        assert!(value_refs(&e, standard()).is_empty());
    }

    #[test]
    fn map_rewrites_references_and_keeps_original() {
        let old = ItemKey::from_full_key("survey.A").unwrap();
        let new = ItemKey::from_full_key("survey.A2").unwrap();
        let original = sample();
        let mapped = map_value_refs(&original, standard(), &mut |r| r.rebase(&old, &new));

        let refs: Vec<String> = value_refs(&mapped, standard())
            .into_iter()
            .map(|f| f.reference.to_string())
            .collect();
        assert_eq!(refs, vec!["survey.A2.x", "survey.B...rg.scg"]);
        // Plain string option untouched
        let nested = mapped.arg(1).unwrap().as_expression().unwrap();
        assert_eq!(nested.arg(1).unwrap().as_str(), Some("survey.A"));
        assert_ne!(original, mapped);
    }

    #[test]
    fn map_without_changes_is_identity() {
        let original = sample();
        let mapped = map_value_refs(&original, standard(), &mut |_| None);
        assert_eq!(original, mapped);
    }
}
