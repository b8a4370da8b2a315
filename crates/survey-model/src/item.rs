//! Survey items
//!
//! A [`SurveyItem`] is one node of the survey graph: a common envelope (key,
//! metadata, confidentiality, logic) around a type-specific [`ItemBody`].
//!
//! # Response slots
//!
//! Question bodies expose the slot keys a [`ValueReference`](crate::ValueReference)
//! may point at, e.g. `rg.scg` for a single choice group and `rg.scg.<option>`
//! for one of its options.

use crate::expression::{Expression, ReturnType};
use crate::key::ItemKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Metadata key holding the editor label of an item
pub const META_ITEM_LABEL: &str = "itemLabel";

/// Metadata key holding the editor color of an item
pub const META_EDITOR_ITEM_COLOR: &str = "editorItemColor";

/// Response group prefix shared by all question slots
const RESPONSE_GROUP: &str = "rg";

/// Item type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    Root,
    Group,
    PageBreak,
    SurveyEnd,
    Display,
    SingleChoiceQuestion,
    MultipleChoiceQuestion,
    TextInputQuestion,
    NumericInputQuestion,
    DateInputQuestion,
    ScaleQuestion,
}

impl ItemType {
    /// Root and groups hold child items
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Root | Self::Group)
    }

    /// Items collecting a response
    #[inline]
    #[must_use]
    pub const fn is_question(self) -> bool {
        matches!(
            self,
            Self::SingleChoiceQuestion
                | Self::MultipleChoiceQuestion
                | Self::TextInputQuestion
                | Self::NumericInputQuestion
                | Self::DateInputQuestion
                | Self::ScaleQuestion
        )
    }

    /// Stable camelCase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Group => "group",
            Self::PageBreak => "pageBreak",
            Self::SurveyEnd => "surveyEnd",
            Self::Display => "display",
            Self::SingleChoiceQuestion => "singleChoiceQuestion",
            Self::MultipleChoiceQuestion => "multipleChoiceQuestion",
            Self::TextInputQuestion => "textInputQuestion",
            Self::NumericInputQuestion => "numericInputQuestion",
            Self::DateInputQuestion => "dateInputQuestion",
            Self::ScaleQuestion => "scaleQuestion",
        }
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How responses of a confidential item are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidentialMode {
    /// Store a confidential copy in addition to the regular response
    Add,
    /// Store only the confidential copy
    Replace,
}

/// Children of the root or a group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupContent {
    /// Full keys of the children, in display order
    #[serde(default)]
    pub items: Vec<String>,

    /// Present children in random order
    #[serde(default, skip_serializing_if = "is_false")]
    pub shuffle_items: bool,
}

/// Closing screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyEndContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Text block of a display item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextComponent {
    pub key: String,
    pub content: String,
}

/// Display-only item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayContent {
    #[serde(default)]
    pub components: Vec<TextComponent>,
}

/// Title block shared by question types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

/// One selectable option (or one scale row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub key: String,
    #[serde(default)]
    pub label: String,
}

impl ChoiceOption {
    /// Create an option
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// Single or multiple choice configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<QuestionHeader>,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

/// Free text configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInputQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<QuestionHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

/// Numeric input configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericInputQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<QuestionHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// Date input configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateInputQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<QuestionHeader>,
}

/// Likert-style scale: every row is answered on the same options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<QuestionHeader>,
    #[serde(default)]
    pub rows: Vec<ChoiceOption>,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

/// Type-specific content, tagged by `itemType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "itemType", rename_all = "camelCase")]
pub enum ItemBody {
    Root(GroupContent),
    Group(GroupContent),
    PageBreak,
    SurveyEnd(SurveyEndContent),
    Display(DisplayContent),
    SingleChoiceQuestion(ChoiceQuestion),
    MultipleChoiceQuestion(ChoiceQuestion),
    TextInputQuestion(TextInputQuestion),
    NumericInputQuestion(NumericInputQuestion),
    DateInputQuestion(DateInputQuestion),
    ScaleQuestion(ScaleQuestion),
}

impl ItemBody {
    /// Empty group
    #[inline]
    #[must_use]
    pub fn group() -> Self {
        Self::Group(GroupContent::default())
    }

    /// Type tag
    #[must_use]
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Root(_) => ItemType::Root,
            Self::Group(_) => ItemType::Group,
            Self::PageBreak => ItemType::PageBreak,
            Self::SurveyEnd(_) => ItemType::SurveyEnd,
            Self::Display(_) => ItemType::Display,
            Self::SingleChoiceQuestion(_) => ItemType::SingleChoiceQuestion,
            Self::MultipleChoiceQuestion(_) => ItemType::MultipleChoiceQuestion,
            Self::TextInputQuestion(_) => ItemType::TextInputQuestion,
            Self::NumericInputQuestion(_) => ItemType::NumericInputQuestion,
            Self::DateInputQuestion(_) => ItemType::DateInputQuestion,
            Self::ScaleQuestion(_) => ItemType::ScaleQuestion,
        }
    }

    /// Child keys for containers
    #[must_use]
    pub fn children(&self) -> Option<&[String]> {
        match self {
            Self::Root(g) | Self::Group(g) => Some(&g.items),
            _ => None,
        }
    }

    /// Mutable child keys for containers
    pub fn children_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Self::Root(g) | Self::Group(g) => Some(&mut g.items),
            _ => None,
        }
    }

    /// Question header, if this is a question
    #[must_use]
    pub fn header(&self) -> Option<&QuestionHeader> {
        match self {
            Self::SingleChoiceQuestion(q) | Self::MultipleChoiceQuestion(q) => q.header.as_ref(),
            Self::TextInputQuestion(q) => q.header.as_ref(),
            Self::NumericInputQuestion(q) => q.header.as_ref(),
            Self::DateInputQuestion(q) => q.header.as_ref(),
            Self::ScaleQuestion(q) => q.header.as_ref(),
            _ => None,
        }
    }

    /// Response slots a reference may point at
    #[must_use]
    pub fn response_slots(&self) -> Vec<String> {
        let with_options = |component: &str, options: &[ChoiceOption]| {
            let base = format!("{RESPONSE_GROUP}.{component}");
            let mut slots = Vec::with_capacity(options.len() + 1);
            slots.push(base.clone());
            slots.extend(options.iter().map(|o| format!("{base}.{}", o.key)));
            slots
        };

        match self {
            Self::SingleChoiceQuestion(q) => with_options("scg", &q.options),
            Self::MultipleChoiceQuestion(q) => with_options("mcg", &q.options),
            Self::TextInputQuestion(_) => vec![format!("{RESPONSE_GROUP}.txt")],
            Self::NumericInputQuestion(_) => vec![format!("{RESPONSE_GROUP}.num")],
            Self::DateInputQuestion(_) => vec![format!("{RESPONSE_GROUP}.date")],
            Self::ScaleQuestion(q) => q
                .rows
                .iter()
                .flat_map(|row| with_options(&format!("scale.{}", row.key), &q.options))
                .collect(),
            Self::Root(_) | Self::Group(_) | Self::PageBreak | Self::SurveyEnd(_) | Self::Display(_) => {
                Vec::new()
            }
        }
    }

    /// First NaN or infinite number in the body's configuration
    #[must_use]
    pub fn non_finite_number(&self) -> Option<f64> {
        match self {
            Self::NumericInputQuestion(q) => [q.min, q.max, q.step]
                .into_iter()
                .flatten()
                .find(|v| !v.is_finite()),
            _ => None,
        }
    }

    /// Check if `slot` is one of this body's response slots
    #[must_use]
    pub fn has_slot(&self, slot: &ItemKey) -> bool {
        let wanted = slot.full_key();
        self.response_slots().iter().any(|s| *s == wanted)
    }
}

/// Computed value exposed to the item's texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateValue {
    pub return_type: ReturnType,
    pub expression: Expression,
}

/// Structural place of an expression inside an item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicSlot {
    /// Display condition of the whole item
    DisplayCondition,
    /// Display condition of one component
    ComponentDisplayCondition(String),
    /// Disable condition of one component
    DisabledCondition(String),
    /// Named validation rule
    Validation(String),
    /// Named template value
    TemplateValue(String),
    /// Survey submit action at position
    SubmitAction(usize),
}

impl LogicSlot {
    /// Component (or rule) key the slot is attached to
    #[must_use]
    pub fn component_key(&self) -> Option<String> {
        match self {
            Self::DisplayCondition => None,
            Self::ComponentDisplayCondition(k)
            | Self::DisabledCondition(k)
            | Self::Validation(k)
            | Self::TemplateValue(k) => Some(k.clone()),
            Self::SubmitAction(i) => Some(format!("submitActions[{i}]")),
        }
    }
}

impl Display for LogicSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisplayCondition => f.write_str("displayCondition"),
            Self::ComponentDisplayCondition(k) => write!(f, "componentDisplayConditions.{k}"),
            Self::DisabledCondition(k) => write!(f, "disabledConditions.{k}"),
            Self::Validation(k) => write!(f, "validations.{k}"),
            Self::TemplateValue(k) => write!(f, "templateValues.{k}"),
            Self::SubmitAction(i) => write!(f, "submitActions[{i}]"),
        }
    }
}

/// Conditions, validations, template values and actions of an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLogic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_condition: Option<Expression>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub component_display_conditions: IndexMap<String, Expression>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub disabled_conditions: IndexMap<String, Expression>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub validations: IndexMap<String, Expression>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub template_values: IndexMap<String, TemplateValue>,

    /// Only meaningful on the root item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submit_actions: Vec<Expression>,
}

impl ItemLogic {
    /// Every expression with its slot, in a fixed order
    #[must_use]
    pub fn expressions(&self) -> Vec<(LogicSlot, &Expression)> {
        let mut out = Vec::new();
        if let Some(e) = &self.display_condition {
            out.push((LogicSlot::DisplayCondition, e));
        }
        out.extend(
            self.component_display_conditions
                .iter()
                .map(|(k, e)| (LogicSlot::ComponentDisplayCondition(k.clone()), e)),
        );
        out.extend(
            self.disabled_conditions
                .iter()
                .map(|(k, e)| (LogicSlot::DisabledCondition(k.clone()), e)),
        );
        out.extend(
            self.validations
                .iter()
                .map(|(k, e)| (LogicSlot::Validation(k.clone()), e)),
        );
        out.extend(
            self.template_values
                .iter()
                .map(|(k, t)| (LogicSlot::TemplateValue(k.clone()), &t.expression)),
        );
        out.extend(
            self.submit_actions
                .iter()
                .enumerate()
                .map(|(i, e)| (LogicSlot::SubmitAction(i), e)),
        );
        out
    }

    /// Copy of this logic with every expression passed through `f`
    #[must_use]
    pub fn map_expressions(&self, mut f: impl FnMut(&Expression) -> Expression) -> Self {
        Self {
            display_condition: self.display_condition.as_ref().map(&mut f),
            component_display_conditions: self
                .component_display_conditions
                .iter()
                .map(|(k, e)| (k.clone(), f(e)))
                .collect(),
            disabled_conditions: self
                .disabled_conditions
                .iter()
                .map(|(k, e)| (k.clone(), f(e)))
                .collect(),
            validations: self
                .validations
                .iter()
                .map(|(k, e)| (k.clone(), f(e)))
                .collect(),
            template_values: self
                .template_values
                .iter()
                .map(|(k, t)| {
                    (
                        k.clone(),
                        TemplateValue {
                            return_type: t.return_type,
                            expression: f(&t.expression),
                        },
                    )
                })
                .collect(),
            submit_actions: self.submit_actions.iter().map(&mut f).collect(),
        }
    }

    /// True when no expression is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expressions().is_empty()
    }

    /// First NaN or infinite literal with the slot holding it
    #[must_use]
    pub fn non_finite_literal(&self) -> Option<(LogicSlot, f64)> {
        self.expressions()
            .into_iter()
            .find_map(|(slot, e)| e.non_finite_literal().map(|v| (slot, v)))
    }
}

/// One node of the survey graph
///
/// # Invariants
/// - `key` is only changed by the document store (rename/reparent)
/// - container children are managed by the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyItem {
    key: ItemKey,

    #[serde(flatten)]
    pub body: ItemBody,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidentiality: Option<ConfidentialMode>,

    #[serde(flatten)]
    pub logic: ItemLogic,
}

impl SurveyItem {
    /// Create an item with empty metadata and logic
    #[must_use]
    pub fn new(key: ItemKey, body: ItemBody) -> Self {
        Self {
            key,
            body,
            metadata: IndexMap::new(),
            confidentiality: None,
            logic: ItemLogic::default(),
        }
    }

    /// Item key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ItemKey {
        &self.key
    }

    /// Dotted full key
    #[inline]
    #[must_use]
    pub fn full_key(&self) -> String {
        self.key.full_key()
    }

    /// Type tag
    #[inline]
    #[must_use]
    pub fn item_type(&self) -> ItemType {
        self.body.item_type()
    }

    /// Same item under a different key
    #[must_use]
    pub fn with_key(mut self, key: ItemKey) -> Self {
        self.key = key;
        self
    }

    /// Builder: attach logic
    #[must_use]
    pub fn with_logic(mut self, logic: ItemLogic) -> Self {
        self.logic = logic;
        self
    }

    /// Builder: set a metadata entry
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Editor label from metadata
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.metadata.get(META_ITEM_LABEL).map(String::as_str)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ExpressionArg;
    use pretty_assertions::assert_eq;

    fn key(s: &str) -> ItemKey {
        ItemKey::from_full_key(s).unwrap()
    }

    fn single_choice() -> SurveyItem {
        SurveyItem::new(
            key("survey.G1.Q1"),
            ItemBody::SingleChoiceQuestion(ChoiceQuestion {
                header: Some(QuestionHeader {
                    title: Some("How are you?".into()),
                    subtitle: None,
                }),
                options: vec![ChoiceOption::new("a", "Fine"), ChoiceOption::new("b", "Bad")],
            }),
        )
        .with_metadata(META_ITEM_LABEL, "Mood")
    }

    #[test]
    fn item_type_classification() {
        assert!(ItemType::Root.is_container());
        assert!(ItemType::Group.is_container());
        assert!(!ItemType::Display.is_container());
        assert!(ItemType::ScaleQuestion.is_question());
        assert!(!ItemType::PageBreak.is_question());
    }

    #[test]
    fn single_choice_slots() {
        let item = single_choice();
        assert_eq!(item.body.response_slots(), vec!["rg.scg", "rg.scg.a", "rg.scg.b"]);
        assert!(item.body.has_slot(&key("rg.scg.b")));
        assert!(!item.body.has_slot(&key("rg.mcg")));
    }

    #[test]
    fn scale_slots_cover_rows_and_options() {
        let body = ItemBody::ScaleQuestion(ScaleQuestion {
            header: None,
            rows: vec![ChoiceOption::new("r1", "")],
            options: vec![ChoiceOption::new("1", ""), ChoiceOption::new("2", "")],
        });
        assert_eq!(
            body.response_slots(),
            vec!["rg.scale.r1", "rg.scale.r1.1", "rg.scale.r1.2"]
        );
    }

    #[test]
    fn non_questions_have_no_slots() {
        assert!(ItemBody::group().response_slots().is_empty());
        assert!(ItemBody::PageBreak.response_slots().is_empty());
    }

    #[test]
    fn item_json_shape() {
        let json = serde_json::to_value(single_choice()).unwrap();
        assert_eq!(json["key"], "survey.G1.Q1");
        assert_eq!(json["itemType"], "singleChoiceQuestion");
        assert_eq!(json["options"][1]["key"], "b");
        assert_eq!(json["metadata"]["itemLabel"], "Mood");
        assert!(json.get("validations").is_none());
    }

    #[test]
    fn item_json_round_trip_with_logic() {
        let mut logic = ItemLogic::default();
        logic.disabled_conditions.insert(
            "rg.scg.a".into(),
            Expression::boolean("isDefined", vec![ExpressionArg::str("survey.G1.Q2")]),
        );
        logic.template_values.insert(
            "count".into(),
            TemplateValue {
                return_type: ReturnType::Numeric,
                expression: Expression::numeric("countResponseItems", vec![ExpressionArg::num(0.25)]),
            },
        );
        let item = single_choice().with_logic(logic);

        let json = serde_json::to_string(&item).unwrap();
        let back: SurveyItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn group_round_trip_keeps_child_order() {
        let mut item = SurveyItem::new(key("survey.G1"), ItemBody::group());
        item.body
            .children_mut()
            .unwrap()
            .extend(["survey.G1.b".to_string(), "survey.G1.a".to_string()]);
        let back: SurveyItem = serde_json::from_str(&serde_json::to_string(&item).unwrap()).unwrap();
        assert_eq!(back.body.children().unwrap(), &["survey.G1.b", "survey.G1.a"]);
    }

    #[test]
    fn page_break_round_trip() {
        let item = SurveyItem::new(key("survey.pb1"), ItemBody::PageBreak);
        let json = serde_json::to_string(&item).unwrap();
        let back: SurveyItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.item_type(), ItemType::PageBreak);
    }

    #[test]
    fn logic_expressions_order_is_fixed() {
        let cond = Expression::boolean("isDefined", vec![ExpressionArg::str("survey.X")]);
        let mut logic = ItemLogic::default();
        logic.validations.insert("v1".into(), cond.clone());
        logic.display_condition = Some(cond.clone());
        logic.disabled_conditions.insert("c1".into(), cond);

        let slots: Vec<LogicSlot> = logic.expressions().into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            slots,
            vec![
                LogicSlot::DisplayCondition,
                LogicSlot::DisabledCondition("c1".into()),
                LogicSlot::Validation("v1".into()),
            ]
        );
    }

    #[test]
    fn map_expressions_preserves_shape() {
        let cond = Expression::boolean("isDefined", vec![ExpressionArg::str("survey.X")]);
        let mut logic = ItemLogic::default();
        logic.component_display_conditions.insert("c".into(), cond.clone());
        logic.submit_actions.push(Expression::action("UPDATE_FLAG", vec![]));

        let mapped = logic.map_expressions(|e| e.push_arg(ExpressionArg::num(1.0)));
        assert_eq!(mapped.component_display_conditions["c"].data().len(), 2);
        assert_eq!(mapped.submit_actions[0].data().len(), 1);
        assert_eq!(logic.component_display_conditions["c"], cond);
    }

    #[test]
    fn logic_slot_component_keys() {
        assert_eq!(LogicSlot::DisplayCondition.component_key(), None);
        assert_eq!(
            LogicSlot::DisabledCondition("rg.scg".into()).component_key().as_deref(),
            Some("rg.scg")
        );
        assert_eq!(LogicSlot::SubmitAction(2).to_string(), "submitActions[2]");
    }

    #[test]
    fn non_finite_numbers_are_located() {
        let mut logic = ItemLogic::default();
        logic.validations.insert("ok".into(), Expression::boolean("gt", vec![ExpressionArg::num(1.0)]));
        assert_eq!(logic.non_finite_literal(), None);
        logic
            .validations
            .insert("bad".into(), Expression::boolean("lt", vec![ExpressionArg::num(f64::NEG_INFINITY)]));
        assert_eq!(
            logic.non_finite_literal(),
            Some((LogicSlot::Validation("bad".into()), f64::NEG_INFINITY))
        );

        let body = ItemBody::NumericInputQuestion(NumericInputQuestion {
            min: Some(0.0),
            step: Some(f64::NAN),
            ..NumericInputQuestion::default()
        });
        assert!(body.non_finite_number().is_some_and(f64::is_nan));
        assert_eq!(ItemBody::PageBreak.non_finite_number(), None);
    }
}
