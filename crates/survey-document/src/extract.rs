//! Reference extraction from items

use crate::usage::{UsageRecord, UsageType};
use survey_expr::{value_refs, OperatorRegistry};
use survey_model::{LogicSlot, SurveyItem, ValueReference};

/// Every reference held by `item`, in slot order then tree order
#[must_use]
pub fn extract_references(item: &SurveyItem, registry: &OperatorRegistry) -> Vec<ValueReference> {
    item.logic
        .expressions()
        .into_iter()
        .flat_map(|(_, expression)| value_refs(expression, registry))
        .map(|found| found.reference)
        .collect()
}

/// Tag a reference with where it occurs in `item`
#[must_use]
pub fn describe_usage(item: &SurveyItem, slot: &LogicSlot, reference: ValueReference) -> UsageRecord {
    UsageRecord {
        full_item_key: item.full_key(),
        full_component_key: slot.component_key(),
        usage_type: UsageType::of(slot),
        value_reference: reference,
    }
}

/// All usages of `item`
#[must_use]
pub fn extract_usages(item: &SurveyItem, registry: &OperatorRegistry) -> Vec<UsageRecord> {
    let mut usages = Vec::new();
    for (slot, expression) in item.logic.expressions() {
        for found in value_refs(expression, registry) {
            usages.push(describe_usage(item, &slot, found.reference));
        }
    }
    usages
}
