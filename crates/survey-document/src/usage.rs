//! Usage records
//!
//! A [`UsageRecord`] says where a [`ValueReference`] occurs: which item,
//! which component of it, and in which kind of structural slot.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use survey_model::{LogicSlot, ValueReference};

/// Kind of structural slot holding a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageType {
    DisplayCondition,
    ComponentDisplayCondition,
    DisabledCondition,
    Validation,
    TemplateValue,
    ActionArgument,
}

impl UsageType {
    /// Usage type of a logic slot
    #[must_use]
    pub fn of(slot: &LogicSlot) -> Self {
        match slot {
            LogicSlot::DisplayCondition => Self::DisplayCondition,
            LogicSlot::ComponentDisplayCondition(_) => Self::ComponentDisplayCondition,
            LogicSlot::DisabledCondition(_) => Self::DisabledCondition,
            LogicSlot::Validation(_) => Self::Validation,
            LogicSlot::TemplateValue(_) => Self::TemplateValue,
            LogicSlot::SubmitAction(_) => Self::ActionArgument,
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DisplayCondition => "display condition",
            Self::ComponentDisplayCondition => "component display condition",
            Self::DisabledCondition => "disable condition",
            Self::Validation => "validation",
            Self::TemplateValue => "template value",
            Self::ActionArgument => "action argument",
        }
    }
}

impl Display for UsageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One occurrence of a reference inside an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Item holding the reference
    pub full_item_key: String,

    /// Component, rule or action the reference belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_component_key: Option<String>,

    pub usage_type: UsageType,

    pub value_reference: ValueReference,
}

impl Display for UsageRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_item_key)?;
        if let Some(component) = &self.full_component_key {
            write!(f, " [{component}]")?;
        }
        write!(f, " {} -> {}", self.usage_type, self.value_reference)
    }
}

/// Why a usage does not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidReason {
    /// Referenced item does not exist
    MissingItem,
    /// Item exists but has no such response slot
    MissingSlot,
}

impl Display for InvalidReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingItem => "missing item",
            Self::MissingSlot => "missing slot",
        })
    }
}

/// Invalid usage with its reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub usage: UsageRecord,
    pub reason: InvalidReason,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.usage)
    }
}
