//! Property tests over random editing sessions

use proptest::prelude::*;
use survey_editor::{EditorConfig, EditorSnapshot, SurveyEditor};
use survey_model::{Expression, ExpressionArg};
use survey_test_utils::{
    empty_document, group, is_defined, setup_test_editor, single_choice, text_input,
};

#[derive(Debug, Clone)]
enum Op {
    AddGroup { parent: usize },
    AddChoice { parent: usize },
    AddText { parent: usize },
    Remove { pick: usize },
    Move { parent: usize, from: usize, to: usize },
    Rename { pick: usize, name: u8 },
    Reparent { pick: usize, target: usize, index: usize },
    Condition { pick: usize, refers_to: usize },
    Validation { pick: usize, bound: i32 },
    Label { pick: usize, label: u8 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<usize>().prop_map(|parent| Op::AddGroup { parent }),
        any::<usize>().prop_map(|parent| Op::AddChoice { parent }),
        any::<usize>().prop_map(|parent| Op::AddText { parent }),
        any::<usize>().prop_map(|pick| Op::Remove { pick }),
        (any::<usize>(), any::<usize>(), any::<usize>())
            .prop_map(|(parent, from, to)| Op::Move { parent, from, to }),
        (any::<usize>(), 0u8..4).prop_map(|(pick, name)| Op::Rename { pick, name }),
        (any::<usize>(), any::<usize>(), any::<usize>())
            .prop_map(|(pick, target, index)| Op::Reparent { pick, target, index }),
        (any::<usize>(), any::<usize>()).prop_map(|(pick, refers_to)| Op::Condition { pick, refers_to }),
        (any::<usize>(), -100i32..100).prop_map(|(pick, bound)| Op::Validation { pick, bound }),
        (any::<usize>(), 0u8..3).prop_map(|(pick, label)| Op::Label { pick, label }),
    ]
}

fn containers(editor: &SurveyEditor) -> Vec<String> {
    editor
        .survey_items()
        .iter()
        .filter(|(_, item)| item.body.children().is_some())
        .map(|(k, _)| k.clone())
        .collect()
}

fn non_root(editor: &SurveyEditor) -> Vec<String> {
    editor.survey_items().keys().skip(1).cloned().collect()
}

fn nth(keys: &[String], n: usize) -> Option<&str> {
    (!keys.is_empty()).then(|| keys[n % keys.len()].as_str())
}

/// Apply one edit; failures are allowed and must leave the session as it was
fn apply(editor: &mut SurveyEditor, step: usize, op: &Op) -> Result<(), TestCaseError> {
    let before = editor.document().clone();
    let entries = editor.history().len();
    let all = non_root(editor);
    let groups = containers(editor);

    let result = match op {
        Op::AddGroup { parent } | Op::AddChoice { parent } | Op::AddText { parent } => {
            let parent = groups[parent % groups.len()].clone();
            let full_key = format!("{parent}.n{step}");
            let item = match op {
                Op::AddGroup { .. } => group(&full_key),
                Op::AddChoice { .. } => single_choice(&full_key, &["a", "b"]),
                _ => text_input(&full_key),
            };
            editor.add_item(&parent, item, None).map(drop)
        }
        Op::Remove { pick } => match nth(&all, *pick) {
            Some(target) => editor.remove_item(target).map(drop),
            None => return Ok(()),
        },
        Op::Move { parent, from, to } => {
            let parent = groups[parent % groups.len()].clone();
            let len = editor.document().children_of(&parent).map_or(0, <[String]>::len);
            if len == 0 {
                return Ok(());
            }
            editor.move_item(&parent, from % len, to % len).map(drop)
        }
        Op::Rename { pick, name } => match nth(&all, *pick) {
            Some(target) => editor.rename_item(target, &format!("r{name}")).map(drop),
            None => return Ok(()),
        },
        Op::Reparent { pick, target, index } => match nth(&all, *pick) {
            Some(item) => {
                let target = groups[target % groups.len()].clone();
                let len = editor.document().children_of(&target).map_or(0, <[String]>::len);
                editor
                    .reparent_item(item, &target, Some(index % (len + 1)))
                    .map(drop)
            }
            None => return Ok(()),
        },
        Op::Condition { pick, refers_to } => match (nth(&all, *pick), nth(&all, *refers_to)) {
            (Some(item), Some(other)) => editor
                .set_display_condition(item, Some(is_defined(other)))
                .map(drop),
            _ => return Ok(()),
        },
        Op::Validation { pick, bound } => match nth(&all, *pick) {
            Some(item) => {
                let rule = Expression::boolean(
                    "gt",
                    vec![
                        ExpressionArg::exp(Expression::numeric("getResponseValueAsNum", vec![ExpressionArg::str(item)])),
                        ExpressionArg::num(f64::from(*bound) / 4.0),
                    ],
                );
                editor.set_validation(item, "range", Some(rule)).map(drop)
            }
            None => return Ok(()),
        },
        Op::Label { pick, label } => match nth(&all, *pick) {
            Some(item) => editor
                .set_metadata(item, "itemLabel", &format!("label {label}"))
                .map(drop),
            None => return Ok(()),
        },
    };

    if result.is_err() {
        prop_assert_eq!(editor.document(), &before);
        prop_assert_eq!(editor.history().len(), entries);
    }
    prop_assert!(!editor.requires_reload());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn snapshot_json_round_trips(ops in prop::collection::vec(op(), 0..32)) {
        let mut editor = setup_test_editor(empty_document());
        for (step, op) in ops.iter().enumerate() {
            apply(&mut editor, step, op)?;
        }
        let json = editor.to_json().unwrap();
        prop_assert_eq!(EditorSnapshot::from_json(&json).unwrap(), editor.to_snapshot());

        let restored = SurveyEditor::from_json(&json, EditorConfig::default()).unwrap();
        prop_assert_eq!(restored.document(), editor.document());
        prop_assert_eq!(restored.current_index(), editor.current_index());
    }

    #[test]
    fn undo_and_redo_revisit_every_entry(ops in prop::collection::vec(op(), 1..32)) {
        let mut editor = setup_test_editor(empty_document());
        for (step, op) in ops.iter().enumerate() {
            apply(&mut editor, step, op)?;
        }
        let states: Vec<_> = editor.history().iter().map(|e| e.snapshot.clone()).collect();
        let last = states.len() - 1;
        prop_assert_eq!(editor.current_index(), last);
        prop_assert_eq!(editor.document(), &states[last]);

        for i in (0..last).rev() {
            editor.undo().unwrap();
            prop_assert_eq!(editor.document(), &states[i]);
        }
        prop_assert!(!editor.can_undo());
        for state in &states[1..] {
            editor.redo().unwrap();
            prop_assert_eq!(editor.document(), state);
        }
        prop_assert!(!editor.can_redo());

        for (i, state) in states.iter().enumerate() {
            editor.jump_to_index(i).unwrap();
            prop_assert_eq!(editor.document(), state);
            prop_assert!(editor.document().check_integrity().is_ok());
        }
    }
}
