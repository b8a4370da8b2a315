//! Survey document store
//!
//! [`SurveyDocument`] owns the map from full key to item and keeps the tree
//! invariants:
//! - exactly one root, stored under `survey_key`
//! - every map key equals its item's full key
//! - every non-root item is listed exactly once by its parent container
//! - every listed child exists and sits directly below its container
//! - only the root carries submit actions
//! - every number is finite, so the document survives a JSON round trip
//!
//! All operations check first and mutate afterwards, so a failed call leaves
//! the document unchanged.

use crate::error::StoreError;
use crate::scanner::ReferenceScanner;
use crate::usage::UsageRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use survey_expr::{map_value_refs, OperatorRegistry};
use survey_model::{
    ConfidentialMode, Expression, GroupContent, ItemBody, ItemKey, ItemType, SurveyItem,
    TemplateValue,
};

/// Survey item graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDocument {
    survey_key: String,
    survey_items: IndexMap<String, SurveyItem>,
}

impl SurveyDocument {
    /// Empty document holding only the root item
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidKeySyntax`] if `survey_key` is not a
    /// single valid key segment.
    pub fn new(survey_key: &str) -> Result<Self, StoreError> {
        let key = ItemKey::root(survey_key)?;
        let root = SurveyItem::new(key, ItemBody::Root(GroupContent::default()));
        let mut survey_items = IndexMap::new();
        survey_items.insert(survey_key.to_string(), root);
        Ok(Self {
            survey_key: survey_key.to_string(),
            survey_items,
        })
    }

    /// Parse a document and check its structure
    ///
    /// # Errors
    /// Returns [`StoreError::Json`] for malformed JSON and
    /// [`StoreError::Corrupted`] when the tree invariants do not hold.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let document: Self = serde_json::from_str(json)?;
        document.check_integrity()?;
        Ok(document)
    }

    /// Compact JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Root key
    #[inline]
    #[must_use]
    pub fn survey_key(&self) -> &str {
        &self.survey_key
    }

    /// Read-only view of all items, in insertion order
    #[inline]
    #[must_use]
    pub fn survey_items(&self) -> &IndexMap<String, SurveyItem> {
        &self.survey_items
    }

    /// Look up an item
    #[inline]
    #[must_use]
    pub fn get(&self, full_key: &str) -> Option<&SurveyItem> {
        self.survey_items.get(full_key)
    }

    /// Check if an item exists
    #[inline]
    #[must_use]
    pub fn contains(&self, full_key: &str) -> bool {
        self.survey_items.contains_key(full_key)
    }

    /// Number of items, root included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.survey_items.len()
    }

    /// Always false for a well-formed document
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.survey_items.is_empty()
    }

    /// Root item
    #[must_use]
    pub fn root(&self) -> Option<&SurveyItem> {
        self.survey_items.get(&self.survey_key)
    }

    /// Child keys of a container
    #[must_use]
    pub fn children_of(&self, full_key: &str) -> Option<&[String]> {
        self.survey_items.get(full_key)?.body.children()
    }

    /// Reference scanner over this document
    #[must_use]
    pub fn scanner<'a>(&'a self, registry: &'a OperatorRegistry) -> ReferenceScanner<'a> {
        ReferenceScanner::new(self, registry)
    }

    /// Usages of `target` or anything below it, among existing items
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidKeySyntax`] if `target` is malformed.
    pub fn get_reference_usages(
        &self,
        target: &str,
        registry: &OperatorRegistry,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        let target = ItemKey::from_full_key(target)?;
        Ok(self.scanner(registry).get_reference_usages(&target))
    }

    /// Full keys of `full_key` and its descendants, pre-order
    ///
    /// # Errors
    /// Returns [`StoreError::ItemNotFound`] for an unknown key and
    /// [`StoreError::Corrupted`] if a child list is inconsistent.
    pub fn subtree_keys(&self, full_key: &str) -> Result<Vec<String>, StoreError> {
        let top = self
            .survey_items
            .get(full_key)
            .ok_or_else(|| StoreError::not_found(full_key))?;

        let mut keys = Vec::new();
        let mut stack = vec![top];
        while let Some(item) = stack.pop() {
            keys.push(item.full_key());
            let Some(children) = item.body.children() else {
                continue;
            };
            for child_key in children.iter().rev() {
                let child = self.survey_items.get(child_key).ok_or_else(|| {
                    StoreError::corrupted(format!(
                        "'{child_key}' listed in '{}' does not exist",
                        item.key()
                    ))
                })?;
                if child.key().parent().as_ref() != Some(item.key()) {
                    return Err(StoreError::corrupted(format!(
                        "'{child_key}' listed in '{}' belongs elsewhere",
                        item.key()
                    )));
                }
                stack.push(child);
            }
        }
        Ok(keys)
    }

    /// Insert `item` below `parent`, at `index` or at the end
    ///
    /// # Errors
    /// - [`StoreError::ParentNotFound`] if `parent` does not exist
    /// - [`StoreError::DuplicateKey`] if the item's full key is taken
    /// - [`StoreError::ParentNotGroup`] if `parent` is not a root or group
    /// - [`StoreError::ParentMismatch`] if the item key's parent is not `parent`
    /// - [`StoreError::InvalidItem`] for a second root, pre-filled children,
    ///   submit actions off the root or a NaN/infinite number
    /// - [`StoreError::IndexOutOfRange`] if `index` is past the end
    pub fn add_item(
        &mut self,
        parent: &str,
        item: SurveyItem,
        index: Option<usize>,
    ) -> Result<(), StoreError> {
        let parent_item = self
            .survey_items
            .get(parent)
            .ok_or_else(|| StoreError::ParentNotFound {
                parent: parent.to_string(),
            })?;
        let full_key = item.full_key();
        if self.survey_items.contains_key(&full_key) {
            return Err(StoreError::DuplicateKey { key: full_key });
        }
        let Some(siblings) = parent_item.body.children() else {
            return Err(StoreError::ParentNotGroup {
                parent: parent.to_string(),
                item_type: parent_item.item_type(),
            });
        };
        if item.key().parent_full_key().as_deref() != Some(parent) {
            return Err(StoreError::ParentMismatch {
                key: full_key,
                parent: parent.to_string(),
            });
        }
        if item.item_type() == ItemType::Root {
            return Err(StoreError::InvalidItem {
                key: full_key,
                reason: "a survey has exactly one root".to_string(),
            });
        }
        if item.body.children().is_some_and(|c| !c.is_empty()) {
            return Err(StoreError::InvalidItem {
                key: full_key,
                reason: "children must be added one by one".to_string(),
            });
        }
        if !item.logic.submit_actions.is_empty() {
            return Err(StoreError::InvalidItem {
                key: full_key,
                reason: "submit actions belong to the root".to_string(),
            });
        }
        ensure_finite_item(&item)?;
        let len = siblings.len();
        let index = index.unwrap_or(len);
        if index > len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }

        self.children_mut(parent)?.insert(index, full_key.clone());
        self.survey_items.insert(full_key, item);
        Ok(())
    }

    /// Remove an item and everything below it
    ///
    /// Returns the removed full keys, the item first and then its
    /// descendants in pre-order. References to removed items elsewhere are
    /// left as they are.
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if the key does not exist
    /// - [`StoreError::CannotRemoveRoot`] for the root
    pub fn remove_item(&mut self, full_key: &str) -> Result<Vec<String>, StoreError> {
        let item = self
            .survey_items
            .get(full_key)
            .ok_or_else(|| StoreError::not_found(full_key))?;
        let Some(parent) = item.key().parent_full_key() else {
            return Err(StoreError::CannotRemoveRoot {
                key: full_key.to_string(),
            });
        };
        let removed = self.subtree_keys(full_key)?;
        let listed = self
            .children_of(&parent)
            .is_some_and(|c| c.iter().any(|k| k == full_key));
        if !listed {
            return Err(StoreError::corrupted(format!(
                "'{full_key}' is not listed by its parent '{parent}'"
            )));
        }

        self.children_mut(&parent)?.retain(|k| k != full_key);
        for key in &removed {
            self.survey_items.shift_remove(key);
        }
        Ok(removed)
    }

    /// Move the child at `from` to position `to` within `parent`
    ///
    /// # Errors
    /// - [`StoreError::ParentNotFound`] / [`StoreError::ParentNotGroup`]
    /// - [`StoreError::IndexOutOfRange`] if either index is invalid
    pub fn move_item(&mut self, parent: &str, from: usize, to: usize) -> Result<(), StoreError> {
        let len = self.container(parent)?.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let children = self.children_mut(parent)?;
        let key = children.remove(from);
        children.insert(to, key);
        Ok(())
    }

    /// Give an item a new local key
    ///
    /// Descendant keys, the parent's child list and every reference in the
    /// document pointing at the item or below it follow the new key. The
    /// rewrite is built on a copy and swapped in at once.
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if `old_full_key` does not exist
    /// - [`StoreError::InvalidKeySyntax`] if `new_local_key` is not a valid segment
    /// - [`StoreError::DuplicateKey`] if a sibling already uses `new_local_key`
    pub fn rename_item(
        &mut self,
        old_full_key: &str,
        new_local_key: &str,
        registry: &OperatorRegistry,
    ) -> Result<String, StoreError> {
        let old_key = self
            .survey_items
            .get(old_full_key)
            .ok_or_else(|| StoreError::not_found(old_full_key))?
            .key()
            .clone();
        let new_key = old_key.with_new_segment(new_local_key)?;
        if new_key == old_key {
            return Ok(old_key.full_key());
        }
        let new_full_key = new_key.full_key();
        if self.survey_items.contains_key(&new_full_key) {
            return Err(StoreError::DuplicateKey { key: new_full_key });
        }

        let rebuilt = self.rebased_items(&old_key, &new_key, registry)?;
        self.survey_items = rebuilt;
        if old_key.is_root() {
            self.survey_key.clone_from(&new_full_key);
        }
        Ok(new_full_key)
    }

    /// Move a subtree below another container
    ///
    /// Keys and references follow the move as for a rename. `index` is the
    /// position in the target's child list after the item left its old
    /// place; `None` appends.
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] / [`StoreError::ParentNotFound`]
    /// - [`StoreError::ParentNotGroup`] if the target is not a container
    /// - [`StoreError::InvalidMove`] for the root or a target inside the subtree
    /// - [`StoreError::DuplicateKey`] if the target already has a child with this local key
    /// - [`StoreError::IndexOutOfRange`] if `index` is past the end
    pub fn reparent_item(
        &mut self,
        full_key: &str,
        new_parent: &str,
        index: Option<usize>,
        registry: &OperatorRegistry,
    ) -> Result<String, StoreError> {
        let old_key = self
            .survey_items
            .get(full_key)
            .ok_or_else(|| StoreError::not_found(full_key))?
            .key()
            .clone();
        let Some(old_parent) = old_key.parent_full_key() else {
            return Err(StoreError::InvalidMove {
                key: full_key.to_string(),
                target: new_parent.to_string(),
                reason: "the root cannot be moved".to_string(),
            });
        };
        let target = self
            .survey_items
            .get(new_parent)
            .ok_or_else(|| StoreError::ParentNotFound {
                parent: new_parent.to_string(),
            })?;
        let Some(target_children) = target.body.children() else {
            return Err(StoreError::ParentNotGroup {
                parent: new_parent.to_string(),
                item_type: target.item_type(),
            });
        };
        if old_key.contains(target.key()) {
            return Err(StoreError::InvalidMove {
                key: full_key.to_string(),
                target: new_parent.to_string(),
                reason: "target lies inside the moved subtree".to_string(),
            });
        }
        let new_key = target.key().child(old_key.item_key())?;
        let new_full_key = new_key.full_key();
        let same_parent = old_parent == new_parent;
        if !same_parent && self.survey_items.contains_key(&new_full_key) {
            return Err(StoreError::DuplicateKey { key: new_full_key });
        }
        let len = target_children.len() - usize::from(same_parent);
        let index = index.unwrap_or(len);
        if index > len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }

        let mut rebuilt = if same_parent {
            self.survey_items.clone()
        } else {
            self.rebased_items(&old_key, &new_key, registry)?
        };
        // The old parent's entry was rebased along with the subtree
        container_children_mut(&mut rebuilt, &old_parent)?.retain(|k| *k != new_full_key);
        container_children_mut(&mut rebuilt, new_parent)?.insert(index, new_full_key.clone());
        self.survey_items = rebuilt;
        Ok(new_full_key)
    }

    /// Set a metadata entry
    ///
    /// # Errors
    /// Returns [`StoreError::ItemNotFound`] if the key does not exist.
    pub fn set_metadata(&mut self, full_key: &str, name: &str, value: &str) -> Result<(), StoreError> {
        self.item_mut(full_key)?
            .metadata
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Remove a metadata entry, returning its old value
    ///
    /// # Errors
    /// Returns [`StoreError::ItemNotFound`] if the key does not exist.
    pub fn remove_metadata(&mut self, full_key: &str, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.item_mut(full_key)?.metadata.shift_remove(name))
    }

    /// Set or clear the confidentiality mode
    ///
    /// # Errors
    /// Returns [`StoreError::ItemNotFound`] if the key does not exist.
    pub fn set_confidentiality(
        &mut self,
        full_key: &str,
        mode: Option<ConfidentialMode>,
    ) -> Result<(), StoreError> {
        self.item_mut(full_key)?.confidentiality = mode;
        Ok(())
    }

    /// Replace the type-specific content of an item
    ///
    /// Containers keep their type and child list; an empty child list in
    /// `body` is filled from the current one.
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if the key does not exist
    /// - [`StoreError::InvalidItem`] if the change would alter the tree
    pub fn replace_body(&mut self, full_key: &str, mut body: ItemBody) -> Result<(), StoreError> {
        let item = self
            .survey_items
            .get(full_key)
            .ok_or_else(|| StoreError::not_found(full_key))?;
        let (old_type, new_type) = (item.item_type(), body.item_type());
        let invalid = |reason: &str| StoreError::InvalidItem {
            key: full_key.to_string(),
            reason: reason.to_string(),
        };

        if old_type.is_container() {
            if new_type != old_type {
                return Err(invalid("containers keep their type"));
            }
            let current = item.body.children().unwrap_or_default();
            if let Some(children) = body.children_mut() {
                if children.is_empty() {
                    children.extend(current.iter().cloned());
                } else if children.as_slice() != current {
                    return Err(invalid("child list changes through add, remove and move"));
                }
            }
        } else if new_type == ItemType::Root {
            return Err(invalid("a survey has exactly one root"));
        } else if body.children().is_some_and(|c| !c.is_empty()) {
            return Err(invalid("children must be added one by one"));
        }
        if let Some(value) = body.non_finite_number() {
            return Err(invalid(&format!("number {value} has no JSON form")));
        }

        self.item_mut(full_key)?.body = body;
        Ok(())
    }

    /// Set or clear the item's display condition
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if the key does not exist
    /// - [`StoreError::InvalidItem`] for a NaN/infinite literal
    pub fn set_display_condition(
        &mut self,
        full_key: &str,
        condition: Option<Expression>,
    ) -> Result<(), StoreError> {
        ensure_finite(full_key, condition.as_ref())?;
        self.item_mut(full_key)?.logic.display_condition = condition;
        Ok(())
    }

    /// Set or clear a component display condition
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if the key does not exist
    /// - [`StoreError::InvalidItem`] for a NaN/infinite literal
    pub fn set_component_display_condition(
        &mut self,
        full_key: &str,
        component: &str,
        condition: Option<Expression>,
    ) -> Result<(), StoreError> {
        ensure_finite(full_key, condition.as_ref())?;
        let map = &mut self.item_mut(full_key)?.logic.component_display_conditions;
        set_or_clear(map, component, condition);
        Ok(())
    }

    /// Set or clear a component disable condition
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if the key does not exist
    /// - [`StoreError::InvalidItem`] for a NaN/infinite literal
    pub fn set_disabled_condition(
        &mut self,
        full_key: &str,
        component: &str,
        condition: Option<Expression>,
    ) -> Result<(), StoreError> {
        ensure_finite(full_key, condition.as_ref())?;
        let map = &mut self.item_mut(full_key)?.logic.disabled_conditions;
        set_or_clear(map, component, condition);
        Ok(())
    }

    /// Set or clear a validation rule
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if the key does not exist
    /// - [`StoreError::InvalidItem`] for a NaN/infinite literal
    pub fn set_validation(
        &mut self,
        full_key: &str,
        rule: &str,
        expression: Option<Expression>,
    ) -> Result<(), StoreError> {
        ensure_finite(full_key, expression.as_ref())?;
        let map = &mut self.item_mut(full_key)?.logic.validations;
        set_or_clear(map, rule, expression);
        Ok(())
    }

    /// Set or clear a template value
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if the key does not exist
    /// - [`StoreError::InvalidItem`] for a NaN/infinite literal
    pub fn set_template_value(
        &mut self,
        full_key: &str,
        name: &str,
        value: Option<TemplateValue>,
    ) -> Result<(), StoreError> {
        ensure_finite(full_key, value.as_ref().map(|t| &t.expression))?;
        let map = &mut self.item_mut(full_key)?.logic.template_values;
        set_or_clear(map, name, value);
        Ok(())
    }

    /// Replace the survey submit actions
    ///
    /// # Errors
    /// - [`StoreError::ItemNotFound`] if the key does not exist
    /// - [`StoreError::InvalidItem`] if the item is not the root or an
    ///   action holds a NaN/infinite literal
    pub fn set_submit_actions(
        &mut self,
        full_key: &str,
        actions: Vec<Expression>,
    ) -> Result<(), StoreError> {
        let item = self.item_mut(full_key)?;
        if item.item_type() != ItemType::Root {
            return Err(StoreError::InvalidItem {
                key: full_key.to_string(),
                reason: "submit actions belong to the root".to_string(),
            });
        }
        for action in &actions {
            ensure_finite(full_key, Some(action))?;
        }
        item.logic.submit_actions = actions;
        Ok(())
    }

    /// Verify every structural invariant
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupted`] naming the first violation found.
    pub fn check_integrity(&self) -> Result<(), StoreError> {
        let root_key = ItemKey::from_full_key(&self.survey_key)
            .map_err(|e| StoreError::corrupted(format!("survey key: {e}")))?;
        if !root_key.is_root() {
            return Err(StoreError::corrupted(format!(
                "survey key '{}' has more than one segment",
                self.survey_key
            )));
        }
        match self.root() {
            Some(root) if root.item_type() == ItemType::Root => {}
            Some(root) => {
                return Err(StoreError::corrupted(format!(
                    "root '{}' is a {}",
                    self.survey_key,
                    root.item_type()
                )))
            }
            None => return Err(StoreError::corrupted("root item missing")),
        }

        for (full_key, item) in &self.survey_items {
            if *full_key != item.full_key() {
                return Err(StoreError::corrupted(format!(
                    "map key '{full_key}' holds item '{}'",
                    item.key()
                )));
            }
            if item.key().root_key() != self.survey_key {
                return Err(StoreError::corrupted(format!(
                    "'{full_key}' lies outside survey '{}'",
                    self.survey_key
                )));
            }
            if let Some(parent) = item.key().parent_full_key() {
                if item.item_type() == ItemType::Root {
                    return Err(StoreError::corrupted(format!("'{full_key}' is a second root")));
                }
                if !item.logic.submit_actions.is_empty() {
                    return Err(StoreError::corrupted(format!(
                        "'{full_key}' carries submit actions but is not the root"
                    )));
                }
                let siblings = self.children_of(&parent).ok_or_else(|| {
                    StoreError::corrupted(format!("parent '{parent}' of '{full_key}' is missing or not a group"))
                })?;
                let listed = siblings.iter().filter(|k| *k == full_key).count();
                if listed != 1 {
                    return Err(StoreError::corrupted(format!(
                        "'{full_key}' is listed {listed} times by '{parent}'"
                    )));
                }
            }
            if let Err(e) = ensure_finite_item(item) {
                return Err(StoreError::corrupted(e.to_string()));
            }
            for child in item.body.children().unwrap_or_default() {
                let belongs = self
                    .survey_items
                    .get(child)
                    .is_some_and(|c| c.key().parent_full_key().as_deref() == Some(full_key.as_str()));
                if !belongs {
                    return Err(StoreError::corrupted(format!(
                        "'{full_key}' lists '{child}' which is missing or belongs elsewhere"
                    )));
                }
            }
        }
        Ok(())
    }

    fn item_mut(&mut self, full_key: &str) -> Result<&mut SurveyItem, StoreError> {
        self.survey_items
            .get_mut(full_key)
            .ok_or_else(|| StoreError::not_found(full_key))
    }

    fn container(&self, parent: &str) -> Result<&[String], StoreError> {
        let item = self
            .survey_items
            .get(parent)
            .ok_or_else(|| StoreError::ParentNotFound {
                parent: parent.to_string(),
            })?;
        item.body.children().ok_or_else(|| StoreError::ParentNotGroup {
            parent: parent.to_string(),
            item_type: item.item_type(),
        })
    }

    fn children_mut(&mut self, parent: &str) -> Result<&mut Vec<String>, StoreError> {
        container_children_mut(&mut self.survey_items, parent)
    }

    /// Copy of all items with `old` and everything below it moved to `new`
    fn rebased_items(
        &self,
        old: &ItemKey,
        new: &ItemKey,
        registry: &OperatorRegistry,
    ) -> Result<IndexMap<String, SurveyItem>, StoreError> {
        let mut rebuilt = IndexMap::with_capacity(self.survey_items.len());
        for item in self.survey_items.values() {
            let key = item.key().rebase(old, new).unwrap_or_else(|| item.key().clone());
            let mut next = item.clone().with_key(key);
            if let Some(children) = next.body.children_mut() {
                for child in children.iter_mut() {
                    let child_key = ItemKey::from_full_key(child)
                        .map_err(|e| StoreError::corrupted(format!("child key: {e}")))?;
                    if let Some(moved) = child_key.rebase(old, new) {
                        *child = moved.full_key();
                    }
                }
            }
            next.logic = next
                .logic
                .map_expressions(|e| map_value_refs(e, registry, &mut |r| r.rebase(old, new)));

            let full_key = next.full_key();
            if rebuilt.insert(full_key.clone(), next).is_some() {
                return Err(StoreError::DuplicateKey { key: full_key });
            }
        }
        Ok(rebuilt)
    }
}

fn container_children_mut<'a>(
    items: &'a mut IndexMap<String, SurveyItem>,
    parent: &str,
) -> Result<&'a mut Vec<String>, StoreError> {
    items
        .get_mut(parent)
        .and_then(|p| p.body.children_mut())
        .ok_or_else(|| StoreError::corrupted(format!("container '{parent}' vanished")))
}

fn ensure_finite(full_key: &str, expression: Option<&Expression>) -> Result<(), StoreError> {
    match expression.and_then(Expression::non_finite_literal) {
        Some(value) => Err(StoreError::InvalidItem {
            key: full_key.to_string(),
            reason: format!("literal {value} has no JSON form"),
        }),
        None => Ok(()),
    }
}

fn ensure_finite_item(item: &SurveyItem) -> Result<(), StoreError> {
    let invalid = |reason: String| StoreError::InvalidItem {
        key: item.full_key(),
        reason,
    };
    if let Some(value) = item.body.non_finite_number() {
        return Err(invalid(format!("number {value} has no JSON form")));
    }
    if let Some((slot, value)) = item.logic.non_finite_literal() {
        return Err(invalid(format!("literal {value} in {slot} has no JSON form")));
    }
    Ok(())
}

fn set_or_clear<V>(map: &mut IndexMap<String, V>, key: &str, value: Option<V>) {
    match value {
        Some(value) => {
            map.insert(key.to_string(), value);
        }
        None => {
            map.shift_remove(key);
        }
    }
}
