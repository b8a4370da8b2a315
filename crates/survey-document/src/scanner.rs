//! Reference scanner
//!
//! Walks the document in item order, extracts every usage and resolves it
//! against the current items. Nothing is cached here; callers decide when
//! to rescan.
//!
//! A string in a reference slot that does not parse as a reference is not a
//! usage, so it never appears in [`ReferenceScanner::diagnose`]. Expression
//! validation reports it as a malformed reference instead.

use crate::extract::extract_usages;
use crate::index::ReferenceIndex;
use crate::store::SurveyDocument;
use crate::usage::{Diagnostic, InvalidReason, UsageRecord};
use survey_expr::OperatorRegistry;
use survey_model::{ItemKey, ValueReference};

/// Read-only scan over one document
#[derive(Debug, Clone, Copy)]
pub struct ReferenceScanner<'a> {
    document: &'a SurveyDocument,
    registry: &'a OperatorRegistry,
}

impl<'a> ReferenceScanner<'a> {
    /// Create scanner
    #[inline]
    #[must_use]
    pub fn new(document: &'a SurveyDocument, registry: &'a OperatorRegistry) -> Self {
        Self { document, registry }
    }

    /// Every usage in the document, in item order
    #[must_use]
    pub fn all_usages(&self) -> Vec<UsageRecord> {
        self.document
            .survey_items()
            .values()
            .flat_map(|item| extract_usages(item, self.registry))
            .collect()
    }

    /// Why `reference` does not resolve, or `None` if it does
    #[must_use]
    pub fn resolve(&self, reference: &ValueReference) -> Option<InvalidReason> {
        let Some(item) = self.document.get(&reference.item_key.full_key()) else {
            return Some(InvalidReason::MissingItem);
        };
        match &reference.slot_key {
            Some(slot) if !item.body.has_slot(slot) => Some(InvalidReason::MissingSlot),
            _ => None,
        }
    }

    /// Usages whose reference does not resolve, in document order
    ///
    /// Malformed reference strings are not included; see the module docs.
    #[must_use]
    pub fn find_invalid_reference_usages(&self) -> Vec<UsageRecord> {
        self.diagnose().into_iter().map(|d| d.usage).collect()
    }

    /// Invalid usages with their reasons
    #[must_use]
    pub fn diagnose(&self) -> Vec<Diagnostic> {
        self.all_usages()
            .into_iter()
            .filter_map(|usage| {
                self.resolve(&usage.value_reference)
                    .map(|reason| Diagnostic { usage, reason })
            })
            .collect()
    }

    /// Usages referencing `target` or its descendants
    ///
    /// Only references to items that currently exist are returned; dangling
    /// ones show up in [`Self::find_invalid_reference_usages`] instead.
    #[must_use]
    pub fn get_reference_usages(&self, target: &ItemKey) -> Vec<UsageRecord> {
        self.index()
            .within(target)
            .into_iter()
            .filter(|u| self.document.contains(&u.value_reference.item_key.full_key()))
            .cloned()
            .collect()
    }

    /// Usages located in `key` or any item below it
    #[must_use]
    pub fn usages_by_item(&self, key: &ItemKey) -> Vec<UsageRecord> {
        self.document
            .survey_items()
            .values()
            .filter(|item| key.contains(item.key()))
            .flat_map(|item| extract_usages(item, self.registry))
            .collect()
    }

    /// Reverse index over all usages
    #[must_use]
    pub fn index(&self) -> ReferenceIndex {
        ReferenceIndex::build(self.all_usages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageType;
    use survey_expr::standard;
    use survey_model::{
        ChoiceOption, ChoiceQuestion, Expression, ExpressionArg, ItemBody, SurveyItem,
    };

    fn key(s: &str) -> ItemKey {
        ItemKey::from_full_key(s).unwrap()
    }

    fn question(s: &str) -> SurveyItem {
        SurveyItem::new(
            key(s),
            ItemBody::SingleChoiceQuestion(ChoiceQuestion {
                header: None,
                options: vec![ChoiceOption::new("yes", "Yes")],
            }),
        )
    }

    fn has_keys(r: &str) -> Expression {
        Expression::boolean(
            "responseHasKeysAny",
            vec![ExpressionArg::str(r), ExpressionArg::str("yes")],
        )
    }

    fn document() -> SurveyDocument {
        let mut doc = SurveyDocument::new("s").unwrap();
        doc.add_item("s", SurveyItem::new(key("s.G"), ItemBody::group()), None).unwrap();
        doc.add_item("s.G", question("s.G.A"), None).unwrap();
        doc.add_item("s.G", question("s.G.B"), None).unwrap();
        doc.set_display_condition("s.G.B", Some(has_keys("s.G.A...rg.scg"))).unwrap();
        doc.set_validation("s.G.B", "v1", Some(has_keys("s.G.A...rg.mcg"))).unwrap();
        doc.set_disabled_condition("s.G.B", "rg.scg.yes", Some(has_keys("s.G.Z...rg.scg")))
            .unwrap();
        doc
    }

    #[test]
    fn resolves_items_and_slots() {
        let doc = document();
        let scanner = doc.scanner(standard());
        assert_eq!(scanner.resolve(&"s.G.A...rg.scg.yes".parse().unwrap()), None);
        assert_eq!(
            scanner.resolve(&"s.G.A...rg.txt".parse().unwrap()),
            Some(InvalidReason::MissingSlot)
        );
        assert_eq!(
            scanner.resolve(&"s.nope".parse().unwrap()),
            Some(InvalidReason::MissingItem)
        );
        assert_eq!(scanner.resolve(&"s.G".parse().unwrap()), None);
    }

    #[test]
    fn diagnose_reports_reasons_in_order() {
        let doc = document();
        let diagnostics = doc.scanner(standard()).diagnose();
        let reasons: Vec<(UsageType, InvalidReason)> = diagnostics
            .iter()
            .map(|d| (d.usage.usage_type, d.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (UsageType::DisabledCondition, InvalidReason::MissingItem),
                (UsageType::Validation, InvalidReason::MissingSlot),
            ]
        );
    }

    #[test]
    fn reference_usages_skip_dangling_targets() {
        let doc = document();
        let scanner = doc.scanner(standard());
        let usages = scanner.get_reference_usages(&key("s.G"));
        assert_eq!(usages.len(), 2);
        assert!(usages.iter().all(|u| u.value_reference.item_key == key("s.G.A")));
        assert!(scanner.get_reference_usages(&key("s.G.Z")).is_empty());
    }

    #[test]
    fn usages_by_item_covers_subtree() {
        let doc = document();
        let scanner = doc.scanner(standard());
        assert_eq!(scanner.usages_by_item(&key("s.G")).len(), 3);
        assert!(scanner.usages_by_item(&key("s.G.A")).is_empty());
    }

    #[test]
    fn scan_is_deterministic() {
        let doc = document();
        let scanner = doc.scanner(standard());
        assert_eq!(scanner.all_usages(), scanner.all_usages());
    }

    #[test]
    fn malformed_reference_is_left_to_validation() {
        let mut doc = document();
        doc.set_display_condition("s.G.A", Some(has_keys("s.G B"))).unwrap();
        let scanner = doc.scanner(standard());

        assert!(scanner.usages_by_item(&key("s.G.A")).is_empty());
        assert_eq!(scanner.diagnose().len(), 2);

        let condition = doc.get("s.G.A").unwrap().logic.display_condition.as_ref().unwrap();
        assert!(matches!(
            survey_expr::validate_expression(condition, standard()).as_slice(),
            [survey_expr::ExpressionIssue::MalformedReference { index: 0, .. }]
        ));
    }
}
