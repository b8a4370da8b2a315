//! Reverse reference index with radix tree
//!
//! Provides [`ReferenceIndex`] mapping a referenced item key to the usages
//! pointing at it, with subtree lookups through `radix_trie`.

use crate::usage::UsageRecord;
use radix_trie::{Trie, TrieCommon};
use survey_model::ItemKey;

/// Usages indexed by referenced item
///
/// Trie keys are full keys with a trailing `.`, so the raw prefix
/// `survey.A.` matches `survey.A` and `survey.A.x` but not `survey.AB`.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    trie: Trie<String, Vec<(usize, UsageRecord)>>,
    len: usize,
}

impl ReferenceIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            trie: Trie::new(),
            len: 0,
        }
    }

    /// Index usages, remembering their order
    #[must_use]
    pub fn build(usages: impl IntoIterator<Item = UsageRecord>) -> Self {
        let mut index = Self::new();
        for usage in usages {
            index.insert(usage);
        }
        index
    }

    /// Add one usage
    pub fn insert(&mut self, usage: UsageRecord) {
        let key = trie_key(&usage.value_reference.item_key);
        let seq = self.len;
        self.len += 1;
        match self.trie.get_mut(&key) {
            Some(entries) => entries.push((seq, usage)),
            None => {
                self.trie.insert(key, vec![(seq, usage)]);
            }
        }
    }

    /// Usages pointing exactly at `key`
    #[must_use]
    pub fn exact(&self, key: &ItemKey) -> Vec<&UsageRecord> {
        self.trie
            .get(&trie_key(key))
            .map(|entries| entries.iter().map(|(_, u)| u).collect())
            .unwrap_or_default()
    }

    /// Usages pointing at `key` or anything below it, in insertion order
    #[must_use]
    pub fn within(&self, key: &ItemKey) -> Vec<&UsageRecord> {
        let Some(subtrie) = self.trie.get_raw_descendant(&trie_key(key)) else {
            return Vec::new();
        };
        let mut entries: Vec<&(usize, UsageRecord)> = subtrie.values().flatten().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, u)| u).collect()
    }

    /// Referenced keys, sorted
    #[must_use]
    pub fn referenced_keys(&self) -> Vec<String> {
        self.trie
            .keys()
            .map(|k| k.trim_end_matches('.').to_string())
            .collect()
    }

    /// Number of indexed usages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn trie_key(key: &ItemKey) -> String {
    format!("{}.", key.full_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageType;

    fn usage(from: &str, to: &str) -> UsageRecord {
        UsageRecord {
            full_item_key: from.to_string(),
            full_component_key: None,
            usage_type: UsageType::DisplayCondition,
            value_reference: to.parse().unwrap(),
        }
    }

    fn key(s: &str) -> ItemKey {
        ItemKey::from_full_key(s).unwrap()
    }

    #[test]
    fn index_empty() {
        let index = ReferenceIndex::new();
        assert!(index.is_empty());
        assert!(index.within(&key("s")).is_empty());
    }

    #[test]
    fn within_respects_segment_boundaries() {
        let index = ReferenceIndex::build(vec![
            usage("s.X", "s.A.x"),
            usage("s.Y", "s.AB"),
            usage("s.Z", "s.A...rg.txt"),
        ]);
        let found: Vec<&str> = index
            .within(&key("s.A"))
            .iter()
            .map(|u| u.full_item_key.as_str())
            .collect();
        assert_eq!(found, vec!["s.X", "s.Z"]);
        assert_eq!(index.exact(&key("s.A")).len(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn within_keeps_insertion_order_across_keys() {
        let index = ReferenceIndex::build(vec![
            usage("s.1", "s.G.b"),
            usage("s.2", "s.G.a"),
            usage("s.3", "s.G.b"),
        ]);
        let found: Vec<&str> = index
            .within(&key("s.G"))
            .iter()
            .map(|u| u.full_item_key.as_str())
            .collect();
        assert_eq!(found, vec!["s.1", "s.2", "s.3"]);
    }

    #[test]
    fn referenced_keys_are_listed() {
        let index = ReferenceIndex::build(vec![usage("s.1", "s.b"), usage("s.2", "s.a")]);
        assert_eq!(index.referenced_keys(), vec!["s.a", "s.b"]);
    }
}
