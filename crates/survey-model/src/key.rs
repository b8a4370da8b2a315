//! Hierarchical item keys
//!
//! Provides [`ItemKey`] for addressing items inside a survey document.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between key segments
pub const KEY_SEPARATOR: char = '.';

/// Full key of a survey item
///
/// A non-empty list of segments joined with `.`. The first segment is the
/// survey (root) key, the last one is the item's local key.
///
/// # Examples
/// - `["survey"]` → `survey` (root)
/// - `["survey", "G1", "Q1"]` → `survey.G1.Q1`
///
/// Keys are immutable values: renaming or moving an item produces a new key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey(Vec<String>);

impl ItemKey {
    /// Parse a dotted full key
    ///
    /// # Errors
    /// Returns [`KeyError::MalformedKey`] if any segment is empty or contains
    /// a separator or whitespace.
    pub fn from_full_key(full_key: &str) -> Result<Self, KeyError> {
        if full_key.is_empty() {
            return Err(KeyError::EmptyKey);
        }

        let segments = full_key
            .split(KEY_SEPARATOR)
            .map(|seg| {
                validate_segment(seg).map_err(|reason| KeyError::MalformedKey {
                    key: full_key.to_string(),
                    reason,
                })?;
                Ok(seg.to_string())
            })
            .collect::<Result<Vec<_>, KeyError>>()?;

        Ok(Self(segments))
    }

    /// Create a root key from a single segment
    ///
    /// # Errors
    /// Returns error if the segment is not a valid key segment.
    pub fn root(segment: &str) -> Result<Self, KeyError> {
        validate_segment(segment).map_err(|reason| KeyError::MalformedKey {
            key: segment.to_string(),
            reason,
        })?;
        Ok(Self(vec![segment.to_string()]))
    }

    /// Build a key from an optional parent full key and a local key
    ///
    /// # Errors
    /// Returns error if the parent key or the local key is malformed.
    pub fn from_parts(parent_full_key: Option<&str>, item_key: &str) -> Result<Self, KeyError> {
        match parent_full_key {
            Some(parent) => Self::from_full_key(parent)?.child(item_key),
            None => Self::root(item_key),
        }
    }

    /// Local key (last segment)
    #[inline]
    #[must_use]
    pub fn item_key(&self) -> &str {
        // Non-empty by construction
        self.0.last().map_or("", String::as_str)
    }

    /// Dotted full key
    #[inline]
    #[must_use]
    pub fn full_key(&self) -> String {
        self.0.join(".")
    }

    /// Key segments from root to leaf
    #[inline]
    #[must_use]
    pub fn key_parts(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// True for the survey root key
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// First segment (the survey key)
    #[inline]
    #[must_use]
    pub fn root_key(&self) -> &str {
        self.0.first().map_or("", String::as_str)
    }

    /// Full key of the parent, `None` for the root
    #[must_use]
    pub fn parent_full_key(&self) -> Option<String> {
        self.parent().map(|p| p.full_key())
    }

    /// Parent key, `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append a segment, returning the child key
    ///
    /// # Errors
    /// Returns error if the segment is malformed.
    pub fn child(&self, segment: &str) -> Result<Self, KeyError> {
        validate_segment(segment).map_err(|reason| KeyError::MalformedKey {
            key: format!("{self}.{segment}"),
            reason,
        })?;
        let mut new = self.clone();
        new.0.push(segment.to_string());
        Ok(new)
    }

    /// Replace the last segment
    ///
    /// Uniqueness of the resulting key is the caller's concern.
    ///
    /// # Errors
    /// Returns error if the segment is malformed.
    pub fn with_new_segment(&self, segment: &str) -> Result<Self, KeyError> {
        validate_segment(segment).map_err(|reason| KeyError::MalformedKey {
            key: segment.to_string(),
            reason,
        })?;
        let mut new = self.clone();
        if let Some(last) = new.0.last_mut() {
            *last = segment.to_string();
        }
        Ok(new)
    }

    /// Check if this key is a strict ancestor of another
    ///
    /// # Examples
    /// - `survey.G1` is ancestor of `survey.G1.Q1`
    /// - `survey.G1` is NOT ancestor of `survey.G10`
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Check if this key equals or is an ancestor of another
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self == other || self.is_ancestor_of(other)
    }

    /// Segments of `self` below `ancestor`
    ///
    /// # Errors
    /// Returns error if `ancestor` does not contain `self`.
    pub fn relative_to(&self, ancestor: &Self) -> Result<&[String], KeyError> {
        if !ancestor.contains(self) {
            return Err(KeyError::NotDescendant {
                key: self.to_string(),
                ancestor: ancestor.to_string(),
            });
        }
        Ok(&self.0[ancestor.0.len()..])
    }

    /// Move this key from under `old_prefix` to under `new_prefix`
    ///
    /// Returns `None` when `self` is outside `old_prefix`.
    #[must_use]
    pub fn rebase(&self, old_prefix: &Self, new_prefix: &Self) -> Option<Self> {
        let rest = self.relative_to(old_prefix).ok()?;
        let mut segments = new_prefix.0.clone();
        segments.extend(rest.iter().cloned());
        Some(Self(segments))
    }
}

/// Check a single key segment
///
/// # Errors
/// Returns a human-readable reason when the segment is empty or contains a
/// separator or whitespace.
pub fn validate_segment(segment: &str) -> Result<(), String> {
    if segment.is_empty() {
        return Err("empty segment".to_string());
    }
    if segment.contains(KEY_SEPARATOR) {
        return Err(format!("segment '{segment}' contains '{KEY_SEPARATOR}'"));
    }
    if segment.chars().any(char::is_whitespace) {
        return Err(format!("segment '{segment}' contains whitespace"));
    }
    Ok(())
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for ItemKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_full_key(s)
    }
}

impl serde::Serialize for ItemKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.full_key())
    }
}

impl<'de> serde::Deserialize<'de> for ItemKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_full_key(&raw).map_err(serde::de::Error::custom)
    }
}

/// Errors related to item keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Empty key string
    #[error("item key cannot be empty")]
    EmptyKey,

    /// Malformed key or segment
    #[error("malformed key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    /// Not a descendant key
    #[error("key '{key}' is not inside '{ancestor}'")]
    NotDescendant { key: String, ancestor: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ItemKey {
        ItemKey::from_full_key(s).unwrap()
    }

    #[test]
    fn key_parts_and_derived_values() {
        let k = key("survey.G1.Q1");
        assert_eq!(k.key_parts(), &["survey", "G1", "Q1"]);
        assert_eq!(k.item_key(), "Q1");
        assert_eq!(k.full_key(), "survey.G1.Q1");
        assert_eq!(k.root_key(), "survey");
        assert_eq!(k.depth(), 3);
        assert!(!k.is_root());
    }

    #[test]
    fn root_has_no_parent() {
        let root = key("survey");
        assert!(root.is_root());
        assert!(root.parent().is_none());
        assert!(root.parent_full_key().is_none());
    }

    #[test]
    fn parent_full_key_drops_last_segment() {
        assert_eq!(key("survey.G1.Q1").parent_full_key().as_deref(), Some("survey.G1"));
    }

    #[test]
    fn from_full_key_rejects_empty_segment() {
        assert!(matches!(
            ItemKey::from_full_key("survey..Q1"),
            Err(KeyError::MalformedKey { .. })
        ));
        assert!(matches!(
            ItemKey::from_full_key("survey.Q1."),
            Err(KeyError::MalformedKey { .. })
        ));
    }

    #[test]
    fn from_full_key_rejects_whitespace() {
        assert!(matches!(
            ItemKey::from_full_key("survey.Q 1"),
            Err(KeyError::MalformedKey { .. })
        ));
    }

    #[test]
    fn from_full_key_rejects_empty_string() {
        assert_eq!(ItemKey::from_full_key(""), Err(KeyError::EmptyKey));
    }

    #[test]
    fn segments_may_contain_dashes() {
        assert_eq!(key("survey.q-1_a").item_key(), "q-1_a");
    }

    #[test]
    fn from_parts_builds_child_or_root() {
        assert_eq!(ItemKey::from_parts(Some("survey.G1"), "Q2").unwrap(), key("survey.G1.Q2"));
        assert_eq!(ItemKey::from_parts(None, "survey").unwrap(), key("survey"));
        assert!(ItemKey::from_parts(Some("survey"), "a.b").is_err());
    }

    #[test]
    fn with_new_segment_replaces_last() {
        let renamed = key("survey.G1.Q1").with_new_segment("Q9").unwrap();
        assert_eq!(renamed.full_key(), "survey.G1.Q9");
        assert!(key("survey.G1").with_new_segment("x y").is_err());
    }

    #[test]
    fn ancestor_respects_segment_boundaries() {
        let g1 = key("survey.G1");
        assert!(g1.is_ancestor_of(&key("survey.G1.Q1")));
        assert!(!g1.is_ancestor_of(&key("survey.G10")));
        assert!(!g1.is_ancestor_of(&g1));
        assert!(g1.contains(&g1));
    }

    #[test]
    fn relative_to_and_rebase() {
        let k = key("survey.G1.A.x");
        let old = key("survey.G1.A");
        let new = key("survey.G2.A2");
        assert_eq!(k.relative_to(&old).unwrap(), &["x"]);
        assert_eq!(k.rebase(&old, &new).unwrap(), key("survey.G2.A2.x"));
        assert_eq!(old.rebase(&old, &new).unwrap(), new);
        assert!(key("survey.G1.B").rebase(&old, &new).is_none());
    }

    #[test]
    fn relative_to_fails_outside_ancestor() {
        let binding = key("survey.X");
        let result = binding.relative_to(&key("survey.G1"));
        assert!(matches!(result, Err(KeyError::NotDescendant { .. })));
    }

    #[test]
    fn serde_uses_full_key_string() {
        let k = key("survey.G1");
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "\"survey.G1\"");
        let back: ItemKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, k);
        assert!(serde_json::from_str::<ItemKey>("\"a..b\"").is_err());
    }
}
