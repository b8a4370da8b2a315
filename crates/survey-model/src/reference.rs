//! Value references
//!
//! A [`ValueReference`] names another item, and optionally one of its
//! response slots, from inside an expression.

use crate::key::{ItemKey, KeyError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between the item key and the slot key in the string form
pub const REFERENCE_SEPARATOR: &str = "...";

/// Reference to an item or to a response slot of an item
///
/// String form: `survey.G1.Q2` or `survey.G1.Q2...rg.scg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueReference {
    /// Referenced item
    pub item_key: ItemKey,

    /// Referenced response slot, relative to the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_key: Option<ItemKey>,
}

impl ValueReference {
    /// Reference to a whole item
    #[inline]
    #[must_use]
    pub fn item(item_key: ItemKey) -> Self {
        Self {
            item_key,
            slot_key: None,
        }
    }

    /// Reference to a slot inside an item
    #[inline]
    #[must_use]
    pub fn slot(item_key: ItemKey, slot_key: ItemKey) -> Self {
        Self {
            item_key,
            slot_key: Some(slot_key),
        }
    }

    /// Check if the referenced item is `key` or lies below it
    #[inline]
    #[must_use]
    pub fn points_into(&self, key: &ItemKey) -> bool {
        key.contains(&self.item_key)
    }

    /// Re-target the reference after `old_prefix` moved to `new_prefix`
    ///
    /// Returns `None` when the reference is unaffected.
    #[must_use]
    pub fn rebase(&self, old_prefix: &ItemKey, new_prefix: &ItemKey) -> Option<Self> {
        self.item_key
            .rebase(old_prefix, new_prefix)
            .map(|item_key| Self {
                item_key,
                slot_key: self.slot_key.clone(),
            })
    }
}

impl Display for ValueReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.slot_key {
            Some(slot) => write!(f, "{}{REFERENCE_SEPARATOR}{}", self.item_key, slot),
            None => write!(f, "{}", self.item_key),
        }
    }
}

impl FromStr for ValueReference {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(REFERENCE_SEPARATOR) {
            Some((item, slot)) => Ok(Self::slot(
                ItemKey::from_full_key(item)?,
                ItemKey::from_full_key(slot)?,
            )),
            None => Ok(Self::item(ItemKey::from_full_key(s)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_item_only_reference() {
        let r: ValueReference = "survey.G1.Q2".parse().unwrap();
        assert_eq!(r.item_key.full_key(), "survey.G1.Q2");
        assert!(r.slot_key.is_none());
    }

    #[test]
    fn parses_slot_reference() {
        let r: ValueReference = "survey.G1.Q2...rg.scg".parse().unwrap();
        assert_eq!(r.item_key.full_key(), "survey.G1.Q2");
        assert_eq!(r.slot_key.unwrap().full_key(), "rg.scg");
    }

    #[test]
    fn display_matches_parse_input() {
        let raw = "survey.Q1...rg.mcg.a";
        let r: ValueReference = raw.parse().unwrap();
        assert_eq!(r.to_string(), raw);
    }

    #[test]
    fn rejects_malformed_parts() {
        assert!("survey..Q1".parse::<ValueReference>().is_err());
        assert!("survey.Q1...".parse::<ValueReference>().is_err());
        assert!("survey.Q1....rg".parse::<ValueReference>().is_err());
    }

    #[test]
    fn rebase_follows_renamed_subtree() {
        let r: ValueReference = "survey.A.x...rg.txt".parse().unwrap();
        let old = ItemKey::from_full_key("survey.A").unwrap();
        let new = ItemKey::from_full_key("survey.A2").unwrap();
        let moved = r.rebase(&old, &new).unwrap();
        assert_eq!(moved.to_string(), "survey.A2.x...rg.txt");

        let other: ValueReference = "survey.AB".parse().unwrap();
        assert!(other.rebase(&old, &new).is_none());
    }

    #[test]
    fn points_into_subtree() {
        let r: ValueReference = "survey.G1.Q2".parse().unwrap();
        assert!(r.points_into(&ItemKey::from_full_key("survey.G1").unwrap()));
        assert!(r.points_into(&ItemKey::from_full_key("survey.G1.Q2").unwrap()));
        assert!(!r.points_into(&ItemKey::from_full_key("survey.G1.Q").unwrap()));
    }
}
