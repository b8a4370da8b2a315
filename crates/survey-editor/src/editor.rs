//! Editing session facade
//!
//! [`SurveyEditor`] owns one document, its history and its observers. Every
//! mutation runs on a working copy; only a successful result is committed,
//! recorded as one history entry and announced to observers.

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::history::{History, HistoryEntry};
use crate::observer::{ChangeKind, ObserverRegistry, Subscription};
use crate::snapshot::{EditorSnapshot, SNAPSHOT_FORMAT_VERSION};
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use survey_document::{Diagnostic, StoreError, SurveyDocument, UsageRecord};
use survey_expr::{standard, validate_expression, ExpressionIssue, OperatorRegistry};
use survey_model::{ConfidentialMode, Expression, ItemBody, ItemKey, SurveyItem, TemplateValue};
use ulid::Ulid;

/// Expression issue located in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemExpressionIssue {
    pub item_key: String,
    /// Logic slot holding the expression, e.g. `validations.v1`
    pub location: String,
    pub issue: ExpressionIssue,
}

/// One editing session
pub struct SurveyEditor {
    session_id: Ulid,
    document: SurveyDocument,
    history: History<SurveyDocument>,
    registry: Arc<OperatorRegistry>,
    config: EditorConfig,
    observers: ObserverRegistry,
    invalid_usages: OnceCell<Vec<UsageRecord>>,
    reload_reason: Option<String>,
}

impl SurveyEditor {
    /// New session on an empty survey
    ///
    /// # Errors
    /// Returns error if `survey_key` is not a valid key segment.
    pub fn new(survey_key: &str, config: EditorConfig) -> Result<Self, EditorError> {
        Self::from_document(SurveyDocument::new(survey_key)?, config)
    }

    /// New session on an existing document
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupted`] if the document breaks the tree invariants.
    pub fn from_document(document: SurveyDocument, config: EditorConfig) -> Result<Self, EditorError> {
        document.check_integrity()?;
        let history = History::new(config.initial_description.clone(), document.clone())?
            .with_max_entries(config.max_history);
        let session_id = Ulid::new();
        tracing::info!(
            session = %session_id,
            survey = document.survey_key(),
            items = document.len(),
            "Opened survey editor session"
        );
        Ok(Self {
            session_id,
            document,
            history,
            registry: Arc::new(standard().clone()),
            config,
            observers: ObserverRegistry::new(),
            invalid_usages: OnceCell::new(),
            reload_reason: None,
        })
    }

    /// Restore a session from a snapshot
    ///
    /// # Errors
    /// Returns the validation errors of [`EditorSnapshot::validate`].
    pub fn from_snapshot(snapshot: EditorSnapshot, config: EditorConfig) -> Result<Self, EditorError> {
        let mut editor = Self::from_document(snapshot.document.clone(), config)?;
        editor.load_snapshot(snapshot)?;
        Ok(editor)
    }

    /// Restore a session from snapshot JSON
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the snapshot inconsistent.
    pub fn from_json(json: &str, config: EditorConfig) -> Result<Self, EditorError> {
        Self::from_snapshot(EditorSnapshot::from_json(json)?, config)
    }

    /// Builder: use a custom operator registry
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<OperatorRegistry>) -> Self {
        self.registry = registry;
        self.invalid_usages = OnceCell::new();
        self
    }

    // ---- queries ----

    #[inline]
    #[must_use]
    pub fn session_id(&self) -> Ulid {
        self.session_id
    }

    #[inline]
    #[must_use]
    pub fn document(&self) -> &SurveyDocument {
        &self.document
    }

    /// Read-only item map
    #[inline]
    #[must_use]
    pub fn survey_items(&self) -> &IndexMap<String, SurveyItem> {
        self.document.survey_items()
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry<SurveyDocument>] {
        self.history.entries()
    }

    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.history.current_index()
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// True after an invariant violation until a snapshot is loaded
    #[inline]
    #[must_use]
    pub fn requires_reload(&self) -> bool {
        self.reload_reason.is_some()
    }

    /// Invalid usages of the current state, computed on first read
    pub fn find_invalid_reference_usages(&self) -> &[UsageRecord] {
        self.invalid_usages.get_or_init(|| {
            self.document
                .scanner(&self.registry)
                .find_invalid_reference_usages()
        })
    }

    /// Invalid usages with reasons
    #[must_use]
    pub fn diagnose(&self) -> Vec<Diagnostic> {
        self.document.scanner(&self.registry).diagnose()
    }

    /// Usages of `target` or anything below it
    ///
    /// # Errors
    /// Returns [`EditorError::Key`] if `target` is malformed.
    pub fn get_reference_usages(&self, target: &str) -> Result<Vec<UsageRecord>, EditorError> {
        let target = ItemKey::from_full_key(target)?;
        Ok(self.document.scanner(&self.registry).get_reference_usages(&target))
    }

    /// References held by `full_key` or items below it
    ///
    /// # Errors
    /// Returns [`EditorError::Key`] if `full_key` is malformed.
    pub fn usages_by_item(&self, full_key: &str) -> Result<Vec<UsageRecord>, EditorError> {
        let key = ItemKey::from_full_key(full_key)?;
        Ok(self.document.scanner(&self.registry).usages_by_item(&key))
    }

    /// Expression issues across the whole document, in item order
    #[must_use]
    pub fn validate_expressions(&self) -> Vec<ItemExpressionIssue> {
        let mut found = Vec::new();
        for item in self.document.survey_items().values() {
            for (slot, expression) in item.logic.expressions() {
                found.extend(validate_expression(expression, &self.registry).into_iter().map(
                    |issue| ItemExpressionIssue {
                        item_key: item.full_key(),
                        location: slot.to_string(),
                        issue,
                    },
                ));
            }
        }
        found
    }

    /// Register a change callback
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ChangeKind) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    // ---- mutations ----

    /// Insert an item below `parent`
    ///
    /// # Errors
    /// See [`SurveyDocument::add_item`].
    pub fn add_item(&mut self, parent: &str, item: SurveyItem, index: Option<usize>) -> Result<(), EditorError> {
        let description = format!("Added {} '{}'", item.item_type(), item.full_key());
        self.apply(description, |doc, _| doc.add_item(parent, item, index))
    }

    /// Delete an item and its subtree; returns the removed keys
    ///
    /// # Errors
    /// See [`SurveyDocument::remove_item`].
    pub fn remove_item(&mut self, full_key: &str) -> Result<Vec<String>, EditorError> {
        let removed = self.apply(format!("Removed '{full_key}'"), |doc, _| doc.remove_item(full_key))?;
        tracing::debug!(key = full_key, count = removed.len(), "Removed subtree");
        Ok(removed)
    }

    /// Reorder a container's children
    ///
    /// # Errors
    /// See [`SurveyDocument::move_item`].
    pub fn move_item(&mut self, parent: &str, from: usize, to: usize) -> Result<(), EditorError> {
        let description = format!("Moved item in '{parent}' from {from} to {to}");
        self.apply(description, |doc, _| doc.move_item(parent, from, to))
    }

    /// Rename an item; keys and references follow
    ///
    /// # Errors
    /// See [`SurveyDocument::rename_item`].
    pub fn rename_item(&mut self, old_full_key: &str, new_local_key: &str) -> Result<String, EditorError> {
        let description = format!("Renamed '{old_full_key}' to '{new_local_key}'");
        self.apply(description, |doc, registry| {
            doc.rename_item(old_full_key, new_local_key, registry)
        })
    }

    /// Move a subtree below another container
    ///
    /// # Errors
    /// See [`SurveyDocument::reparent_item`].
    pub fn reparent_item(
        &mut self,
        full_key: &str,
        new_parent: &str,
        index: Option<usize>,
    ) -> Result<String, EditorError> {
        let description = format!("Moved '{full_key}' into '{new_parent}'");
        self.apply(description, |doc, registry| {
            doc.reparent_item(full_key, new_parent, index, registry)
        })
    }

    /// Set a metadata entry
    ///
    /// # Errors
    /// See [`SurveyDocument::set_metadata`].
    pub fn set_metadata(&mut self, full_key: &str, name: &str, value: &str) -> Result<(), EditorError> {
        self.apply(format!("Updated {name} of '{full_key}'"), |doc, _| {
            doc.set_metadata(full_key, name, value)
        })
    }

    /// Remove a metadata entry
    ///
    /// # Errors
    /// See [`SurveyDocument::remove_metadata`].
    pub fn remove_metadata(&mut self, full_key: &str, name: &str) -> Result<Option<String>, EditorError> {
        self.apply(format!("Removed {name} of '{full_key}'"), |doc, _| {
            doc.remove_metadata(full_key, name)
        })
    }

    /// Set or clear confidentiality
    ///
    /// # Errors
    /// See [`SurveyDocument::set_confidentiality`].
    pub fn set_confidentiality(
        &mut self,
        full_key: &str,
        mode: Option<ConfidentialMode>,
    ) -> Result<(), EditorError> {
        self.apply(format!("Updated confidentiality of '{full_key}'"), |doc, _| {
            doc.set_confidentiality(full_key, mode)
        })
    }

    /// Replace type-specific content
    ///
    /// # Errors
    /// See [`SurveyDocument::replace_body`].
    pub fn replace_body(&mut self, full_key: &str, body: ItemBody) -> Result<(), EditorError> {
        self.apply(format!("Updated content of '{full_key}'"), |doc, _| {
            doc.replace_body(full_key, body)
        })
    }

    /// Set or clear the item display condition
    ///
    /// # Errors
    /// See [`SurveyDocument::set_display_condition`].
    pub fn set_display_condition(
        &mut self,
        full_key: &str,
        condition: Option<Expression>,
    ) -> Result<(), EditorError> {
        let description = condition_description("display condition", full_key, None, condition.is_some());
        self.apply(description, |doc, _| doc.set_display_condition(full_key, condition))
    }

    /// Set or clear a component display condition
    ///
    /// # Errors
    /// See [`SurveyDocument::set_component_display_condition`].
    pub fn set_component_display_condition(
        &mut self,
        full_key: &str,
        component: &str,
        condition: Option<Expression>,
    ) -> Result<(), EditorError> {
        let description = condition_description(
            "component display condition",
            full_key,
            Some(component),
            condition.is_some(),
        );
        self.apply(description, |doc, _| {
            doc.set_component_display_condition(full_key, component, condition)
        })
    }

    /// Set or clear a disable condition
    ///
    /// # Errors
    /// See [`SurveyDocument::set_disabled_condition`].
    pub fn set_disabled_condition(
        &mut self,
        full_key: &str,
        component: &str,
        condition: Option<Expression>,
    ) -> Result<(), EditorError> {
        let description =
            condition_description("disable condition", full_key, Some(component), condition.is_some());
        self.apply(description, |doc, _| {
            doc.set_disabled_condition(full_key, component, condition)
        })
    }

    /// Set or clear a validation rule
    ///
    /// # Errors
    /// See [`SurveyDocument::set_validation`].
    pub fn set_validation(
        &mut self,
        full_key: &str,
        rule: &str,
        expression: Option<Expression>,
    ) -> Result<(), EditorError> {
        let description = condition_description("validation", full_key, Some(rule), expression.is_some());
        self.apply(description, |doc, _| doc.set_validation(full_key, rule, expression))
    }

    /// Set or clear a template value
    ///
    /// # Errors
    /// See [`SurveyDocument::set_template_value`].
    pub fn set_template_value(
        &mut self,
        full_key: &str,
        name: &str,
        value: Option<TemplateValue>,
    ) -> Result<(), EditorError> {
        let description = condition_description("template value", full_key, Some(name), value.is_some());
        self.apply(description, |doc, _| doc.set_template_value(full_key, name, value))
    }

    /// Replace the survey submit actions
    ///
    /// # Errors
    /// See [`SurveyDocument::set_submit_actions`].
    pub fn set_submit_actions(&mut self, actions: Vec<Expression>) -> Result<(), EditorError> {
        let root = self.document.survey_key().to_string();
        self.apply("Updated submit actions".to_string(), |doc, _| {
            doc.set_submit_actions(&root, actions)
        })
    }

    // ---- history ----

    /// Step back one entry
    ///
    /// # Errors
    /// Returns [`crate::HistoryError::NoMoreUndo`] at the first entry.
    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.ensure_loaded()?;
        let snapshot = self.history.undo()?.clone();
        self.restore(snapshot, ChangeKind::Undo);
        Ok(())
    }

    /// Step forward one entry
    ///
    /// # Errors
    /// Returns [`crate::HistoryError::NoMoreRedo`] at the last entry.
    pub fn redo(&mut self) -> Result<(), EditorError> {
        self.ensure_loaded()?;
        let snapshot = self.history.redo()?.clone();
        self.restore(snapshot, ChangeKind::Redo);
        Ok(())
    }

    /// Restore the state recorded at `index`
    ///
    /// # Errors
    /// Returns [`crate::HistoryError::IndexOutOfRange`] for an unknown index.
    pub fn jump_to_index(&mut self, index: usize) -> Result<(), EditorError> {
        self.ensure_loaded()?;
        let snapshot = self.history.jump_to_index(index)?.clone();
        self.restore(snapshot, ChangeKind::Jump);
        Ok(())
    }

    // ---- snapshots ----

    /// Capture the whole session
    #[must_use]
    pub fn to_snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            session_id: self.session_id,
            document: self.document.clone(),
            history: self.history.clone(),
        }
    }

    /// Session as JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, EditorError> {
        self.to_snapshot().to_json()
    }

    /// Replace the whole session state
    ///
    /// Clears a pending reload. Observers keep their subscriptions.
    ///
    /// # Errors
    /// Returns the validation errors of [`EditorSnapshot::validate`]; the
    /// session is unchanged on error.
    pub fn load_snapshot(&mut self, snapshot: EditorSnapshot) -> Result<(), EditorError> {
        snapshot.validate()?;
        let EditorSnapshot {
            session_id,
            document,
            mut history,
            ..
        } = snapshot;
        if history.max_entries().is_none() {
            history = history.with_max_entries(self.config.max_history);
        }
        self.session_id = session_id;
        self.document = document;
        self.history = history;
        self.invalid_usages = OnceCell::new();
        self.reload_reason = None;
        tracing::info!(
            session = %self.session_id,
            items = self.document.len(),
            entries = self.history.len(),
            "Loaded editor snapshot"
        );
        self.observers.notify(ChangeKind::Replaced);
        Ok(())
    }

    // ---- internals ----

    fn ensure_loaded(&self) -> Result<(), EditorError> {
        match &self.reload_reason {
            Some(reason) => Err(EditorError::RequiresReload {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn apply<T>(
        &mut self,
        description: String,
        op: impl FnOnce(&mut SurveyDocument, &OperatorRegistry) -> Result<T, StoreError>,
    ) -> Result<T, EditorError> {
        self.ensure_loaded()?;

        let mut working = self.document.clone();
        let value = match op(&mut working, self.registry.as_ref()).and_then(|value| {
            if self.config.verify_integrity {
                working.check_integrity()?;
            }
            Ok(value)
        }) {
            Ok(value) => value,
            Err(err) => {
                if err.is_corruption() {
                    tracing::error!(error = %err, "Document invariant violated, session requires reload");
                    self.reload_reason = Some(err.to_string());
                } else {
                    tracing::debug!(error = %err, operation = %description, "Edit rejected");
                }
                return Err(err.into());
            }
        };

        if working == self.document {
            tracing::debug!(operation = %description, "Edit left the document unchanged");
            return Ok(value);
        }

        let index = self.history.push(description.clone(), working.clone())?;
        self.document = working;
        self.invalid_usages = OnceCell::new();
        tracing::debug!(operation = %description, history_index = index, "Applied edit");

        if self.config.warn_on_invalid_references {
            let invalid = self.find_invalid_reference_usages().len();
            if invalid > 0 {
                tracing::warn!(operation = %description, invalid, "Document has invalid references");
            }
        }

        self.observers.notify(ChangeKind::Edited);
        Ok(value)
    }

    fn restore(&mut self, snapshot: SurveyDocument, kind: ChangeKind) {
        self.document = snapshot;
        self.invalid_usages = OnceCell::new();
        tracing::debug!(?kind, history_index = self.history.current_index(), "Restored history entry");
        self.observers.notify(kind);
    }
}

impl std::fmt::Debug for SurveyEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyEditor")
            .field("session_id", &self.session_id)
            .field("survey_key", &self.document.survey_key())
            .field("items", &self.document.len())
            .field("current_index", &self.history.current_index())
            .field("requires_reload", &self.requires_reload())
            .finish_non_exhaustive()
    }
}

fn condition_description(kind: &str, full_key: &str, component: Option<&str>, set: bool) -> String {
    let verb = if set { "Set" } else { "Cleared" };
    match component {
        Some(component) => format!("{verb} {kind} '{component}' of '{full_key}'"),
        None => format!("{verb} {kind} of '{full_key}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use survey_model::ExpressionArg;

    fn key(s: &str) -> ItemKey {
        ItemKey::from_full_key(s).unwrap()
    }

    fn editor() -> SurveyEditor {
        let mut editor = SurveyEditor::new("s", EditorConfig::default()).unwrap();
        editor
            .add_item("s", SurveyItem::new(key("s.G"), ItemBody::group()), None)
            .unwrap();
        editor
            .add_item("s.G", SurveyItem::new(key("s.G.T"), ItemBody::PageBreak), None)
            .unwrap();
        editor
    }

    #[test]
    fn each_edit_adds_one_entry() {
        let editor = editor();
        assert_eq!(editor.history().len(), 3);
        assert_eq!(editor.current_index(), 2);
        assert_eq!(editor.history()[1].description, "Added group 's.G'");
        assert_eq!(editor.history()[0].description, "Initial state");
    }

    #[test]
    fn failed_edit_pushes_nothing() {
        let mut editor = editor();
        let before = editor.document().clone();
        let err = editor
            .add_item("s.G", SurveyItem::new(key("s.G.T"), ItemBody::PageBreak), None)
            .unwrap_err();
        assert!(matches!(err, EditorError::Store(StoreError::DuplicateKey { .. })));
        assert_eq!(editor.history().len(), 3);
        assert_eq!(editor.document(), &before);
    }

    #[test]
    fn no_op_edit_pushes_nothing() {
        let mut editor = editor();
        editor.move_item("s.G", 0, 0).unwrap();
        editor.rename_item("s.G", "G").unwrap();
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn observers_see_edits_and_history_moves() {
        let mut editor = editor();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = editor.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        editor.set_metadata("s.G", "itemLabel", "Group").unwrap();
        editor.undo().unwrap();
        editor.redo().unwrap();
        assert!(editor.set_metadata("s.nope", "x", "y").is_err());
        assert_eq!(count.load(Ordering::SeqCst), 3);

        drop(sub);
        editor.undo().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn invalid_usages_follow_edits() {
        let mut editor = editor();
        let condition = Expression::boolean("isDefined", vec![ExpressionArg::str("s.G.X")]);
        editor.set_display_condition("s.G.T", Some(condition)).unwrap();
        assert_eq!(editor.find_invalid_reference_usages().len(), 1);

        editor
            .add_item("s.G", SurveyItem::new(key("s.G.X"), ItemBody::PageBreak), None)
            .unwrap();
        assert!(editor.find_invalid_reference_usages().is_empty());

        editor.undo().unwrap();
        assert_eq!(editor.find_invalid_reference_usages().len(), 1);
    }

    #[test]
    fn validate_expressions_locates_issues() {
        let mut editor = editor();
        editor
            .set_validation("s.G.T", "v1", Some(Expression::boolean("not", vec![])))
            .unwrap();
        let issues = editor.validate_expressions();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].item_key, "s.G.T");
        assert_eq!(issues[0].location, "validations.v1");
    }

    #[test]
    fn history_errors_surface() {
        let mut editor = SurveyEditor::new("s", EditorConfig::default()).unwrap();
        assert!(matches!(
            editor.undo(),
            Err(EditorError::History(HistoryError::NoMoreUndo))
        ));
        assert!(matches!(
            editor.jump_to_index(3),
            Err(EditorError::History(HistoryError::IndexOutOfRange { .. }))
        ));
    }

    #[test]
    fn corruption_blocks_until_reload() {
        let mut editor = editor();
        let good = editor.to_snapshot();

        // Point the group at a child that does not exist
        let mut broken = editor.document().to_json().unwrap();
        broken = broken.replace(r#""items":["s.G.T"]"#, r#""items":["s.G.T","s.G.ghost"]"#);
        editor.document = serde_json::from_str(&broken).unwrap();

        let err = editor.remove_item("s.G").unwrap_err();
        assert!(err.requires_reload());
        assert!(editor.requires_reload());
        assert!(matches!(
            editor.set_metadata("s.G", "a", "b"),
            Err(EditorError::RequiresReload { .. })
        ));
        assert!(matches!(editor.undo(), Err(EditorError::RequiresReload { .. })));

        editor.load_snapshot(good.clone()).unwrap();
        assert!(!editor.requires_reload());
        assert_eq!(editor.document(), &good.document);
        editor.set_metadata("s.G", "a", "b").unwrap();
    }

    #[test]
    fn json_round_trip_restores_session() {
        let editor = editor();
        let json = editor.to_json().unwrap();
        let restored = SurveyEditor::from_json(&json, EditorConfig::default()).unwrap();
        assert_eq!(restored.to_snapshot(), editor.to_snapshot());
        assert_eq!(restored.session_id(), editor.session_id());
    }
}
