//! Property tests for keys and references

use proptest::prelude::*;
use survey_model::{Fingerprint, ItemKey, ValueReference};

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,8}"
}

fn key() -> impl Strategy<Value = ItemKey> {
    prop::collection::vec(segment(), 1..6)
        .prop_map(|parts| ItemKey::from_full_key(&parts.join(".")).unwrap())
}

proptest! {
    #[test]
    fn full_key_parses_back(k in key()) {
        prop_assert_eq!(ItemKey::from_full_key(&k.full_key()).unwrap(), k);
    }

    #[test]
    fn child_has_parent(k in key(), s in segment()) {
        let child = k.child(&s).unwrap();
        prop_assert_eq!(child.parent(), Some(k.clone()));
        prop_assert!(k.is_ancestor_of(&child));
        prop_assert_eq!(child.item_key(), s.as_str());
    }

    #[test]
    fn rebase_moves_descendants(k in key(), s in segment(), t in segment()) {
        let child = k.child(&s).unwrap();
        let target = ItemKey::root(&t).unwrap();
        let moved = child.rebase(&k, &target).unwrap();
        prop_assert_eq!(moved.parent(), Some(target));
        prop_assert_eq!(moved.item_key(), s.as_str());
    }

    #[test]
    fn slot_reference_text_parses_back(item in key(), slot in key()) {
        let reference = ValueReference::slot(item, slot);
        let parsed: ValueReference = reference.to_string().parse().unwrap();
        prop_assert_eq!(parsed, reference);
    }

    #[test]
    fn fingerprint_tracks_content(a in key(), b in key()) {
        let fa = Fingerprint::of(&a).unwrap();
        let fb = Fingerprint::of(&b).unwrap();
        prop_assert_eq!(fa == fb, a == b);
    }
}
