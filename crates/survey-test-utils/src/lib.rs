//! Testing utilities for the survey editor workspace
//!
//! Shared item builders, expressions and document fixtures.

#![allow(missing_docs)]

use survey_document::SurveyDocument;
use survey_editor::{EditorConfig, SurveyEditor};
use survey_model::{
    ChoiceOption, ChoiceQuestion, Expression, ExpressionArg, ItemBody, ItemKey, QuestionHeader,
    SurveyItem, TextInputQuestion,
};

pub const SURVEY_KEY: &str = "survey";

pub fn key(full_key: &str) -> ItemKey {
    ItemKey::from_full_key(full_key).unwrap()
}

pub fn group(full_key: &str) -> SurveyItem {
    SurveyItem::new(key(full_key), ItemBody::group())
}

pub fn page_break(full_key: &str) -> SurveyItem {
    SurveyItem::new(key(full_key), ItemBody::PageBreak)
}

pub fn single_choice(full_key: &str, options: &[&str]) -> SurveyItem {
    let body = ItemBody::SingleChoiceQuestion(ChoiceQuestion {
        header: Some(QuestionHeader {
            title: Some(format!("Question {}", key(full_key).item_key())),
            subtitle: None,
        }),
        options: options
            .iter()
            .map(|o| ChoiceOption::new(*o, o.to_uppercase()))
            .collect(),
    });
    SurveyItem::new(key(full_key), body)
}

pub fn text_input(full_key: &str) -> SurveyItem {
    SurveyItem::new(key(full_key), ItemBody::TextInputQuestion(TextInputQuestion::default()))
}

/// `isDefined(reference)`
pub fn is_defined(reference: &str) -> Expression {
    Expression::boolean("isDefined", vec![ExpressionArg::str(reference)])
}

/// `responseHasKeysAny(reference, keys...)`
pub fn has_keys_any(reference: &str, keys: &[&str]) -> Expression {
    let mut data = vec![ExpressionArg::str(reference)];
    data.extend(keys.iter().map(|k| ExpressionArg::str(*k)));
    Expression::boolean("responseHasKeysAny", data)
}

pub fn not(expression: Expression) -> Expression {
    Expression::boolean("not", vec![ExpressionArg::exp(expression)])
}

pub fn and(expressions: Vec<Expression>) -> Expression {
    Expression::boolean("and", expressions.into_iter().map(ExpressionArg::exp).collect())
}

pub fn empty_document() -> SurveyDocument {
    SurveyDocument::new(SURVEY_KEY).unwrap()
}

/// `survey > G1 > [Q1, Q2]`; Q1's `rg` disable condition reads Q2
pub fn e2e_document() -> SurveyDocument {
    let mut doc = empty_document();
    doc.add_item(SURVEY_KEY, group("survey.G1"), None).unwrap();
    let mut q1 = single_choice("survey.G1.Q1", &["a", "b"]);
    q1.logic
        .disabled_conditions
        .insert("rg".to_string(), has_keys_any("survey.G1.Q2...rg.scg", &["a"]));
    doc.add_item("survey.G1", q1, None).unwrap();
    doc.add_item("survey.G1", single_choice("survey.G1.Q2", &["a", "b"]), None)
        .unwrap();
    doc
}

/// `survey > [A > [x, y], B, C]` with B and C referring into A
///
/// B's display condition reads `survey.A.x`; C's validation `v1` reads
/// `survey.A.y`'s choice slot and its `rg` display condition reads `survey.A`.
pub fn rename_document() -> SurveyDocument {
    let mut doc = empty_document();
    doc.add_item(SURVEY_KEY, group("survey.A"), None).unwrap();
    doc.add_item("survey.A", single_choice("survey.A.x", &["1", "2"]), None)
        .unwrap();
    doc.add_item("survey.A", single_choice("survey.A.y", &["1", "2"]), None)
        .unwrap();

    let mut b = text_input("survey.B");
    b.logic.display_condition = Some(is_defined("survey.A.x"));
    doc.add_item(SURVEY_KEY, b, None).unwrap();

    let mut c = single_choice("survey.C", &["yes", "no"]);
    c.logic
        .validations
        .insert("v1".to_string(), has_keys_any("survey.A.y...rg.scg", &["1"]));
    c.logic
        .component_display_conditions
        .insert("rg".to_string(), not(is_defined("survey.A")));
    doc.add_item(SURVEY_KEY, c, None).unwrap();
    doc
}

/// Nested groups three levels deep, for cascading deletes
pub fn nested_document() -> SurveyDocument {
    let mut doc = empty_document();
    doc.add_item(SURVEY_KEY, group("survey.G"), None).unwrap();
    doc.add_item("survey.G", group("survey.G.H"), None).unwrap();
    doc.add_item("survey.G.H", text_input("survey.G.H.q1"), None)
        .unwrap();
    doc.add_item("survey.G.H", text_input("survey.G.H.q2"), None)
        .unwrap();
    doc.add_item("survey.G", page_break("survey.G.pb"), None)
        .unwrap();
    doc.add_item(SURVEY_KEY, text_input("survey.last"), None)
        .unwrap();
    doc
}

pub fn setup_test_editor(document: SurveyDocument) -> SurveyEditor {
    SurveyEditor::from_document(document, EditorConfig::default()).unwrap()
}
