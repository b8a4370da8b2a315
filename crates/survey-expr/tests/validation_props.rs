//! Property tests for expression validation and reference rewriting

use proptest::prelude::*;
use survey_expr::{map_value_refs, standard, validate_expression, value_refs, ExpressionIssue};
use survey_model::{Expression, ExpressionArg, ItemKey, ReturnType};

fn leaf() -> impl Strategy<Value = ExpressionArg> {
    prop_oneof![
        (-1000.0f64..1000.0).prop_map(ExpressionArg::num),
        "[a-z]{1,4}(\\.[a-z]{1,4}){0,2}".prop_map(ExpressionArg::str),
    ]
}

fn expression() -> impl Strategy<Value = Expression> {
    let names = prop::sample::select(vec!["and", "or", "not", "eq", "isDefined", "unknownOp"]);
    let return_types = prop::sample::select(vec![ReturnType::Boolean, ReturnType::Numeric]);
    let base = (names.clone(), return_types.clone(), prop::collection::vec(leaf(), 0..3))
        .prop_map(|(n, rt, data)| Expression::new(n, rt, data));
    base.prop_recursive(3, 16, 3, move |inner| {
        (
            names.clone(),
            return_types.clone(),
            prop::collection::vec(
                prop_oneof![leaf(), inner.prop_map(ExpressionArg::exp)],
                0..3,
            ),
        )
            .prop_map(|(n, rt, data)| Expression::new(n, rt, data))
    })
}

proptest! {
    #[test]
    fn every_unknown_operator_is_reported(e in expression()) {
        let mut unknown = 0;
        e.walk(&mut |node| if node.name() == "unknownOp" { unknown += 1 });
        let issues = validate_expression(&e, standard());
        let reported = issues
            .iter()
            .filter(|i| matches!(i, ExpressionIssue::UnknownOperator { .. }))
            .count();
        prop_assert_eq!(reported, unknown);
    }

    #[test]
    fn identity_rewrite_preserves_tree(e in expression()) {
        let mapped = map_value_refs(&e, standard(), &mut |_| None);
        prop_assert_eq!(mapped, e);
    }

    #[test]
    fn rebase_moves_every_matching_reference(e in expression()) {
        let old = ItemKey::from_full_key("a").unwrap();
        let new = ItemKey::from_full_key("zz").unwrap();
        let before = value_refs(&e, standard());
        let mapped = map_value_refs(&e, standard(), &mut |r| r.rebase(&old, &new));
        let after = value_refs(&mapped, standard());

        prop_assert_eq!(before.len(), after.len());
        for f in &after {
            prop_assert!(!f.reference.points_into(&old));
        }
    }
}
