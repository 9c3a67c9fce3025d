//! Property-based tests for hashing and deduplication.

use proptest::prelude::*;
use scim_prop::Property;
use scim_schema::{Attribute, AttributeType, Metadata};
use serde_json::{Value, json};
use std::sync::Arc;

fn tags_attr() -> Arc<Attribute> {
    Arc::new(
        Attribute::new("tags", AttributeType::String)
            .with_multi_valued(true)
            .with_case_exact(true)
            .finalized(),
    )
}

fn counts_attr() -> Arc<Attribute> {
    Arc::new(
        Attribute::new("counts", AttributeType::Integer)
            .with_multi_valued(true)
            .finalized(),
    )
}

fn member_attr() -> Arc<Attribute> {
    Arc::new(
        Attribute::complex(
            "member",
            [
                Attribute::new("value", AttributeType::String)
                    .with_case_exact(true)
                    .with_metadata(Metadata::identity()),
                Attribute::new("display", AttributeType::String),
            ],
        )
        .finalized(),
    )
}

fn tag_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

proptest! {
    #[test]
    fn multi_hash_ignores_order(tags in prop::collection::vec(tag_strategy(), 0..12), rotate in 0usize..12) {
        let mut rotated = tags.clone();
        if !rotated.is_empty() {
            let by = rotate % rotated.len();
            rotated.rotate_left(by);
        }

        let mut a = Property::new(tags_attr());
        let mut b = Property::new(tags_attr());
        a.add(json!(tags)).unwrap();
        b.add(json!(rotated)).unwrap();

        prop_assert_eq!(a.hash(), b.hash());
        prop_assert!(a.matches(&b));
    }

    #[test]
    fn re_adding_is_idempotent(counts in prop::collection::vec(-50i64..50, 0..20)) {
        let mut prop = Property::new(counts_attr());
        prop.add(json!(counts)).unwrap();
        let raw = prop.raw();
        let hash = prop.hash();

        prop.add(json!(counts)).unwrap();

        prop_assert_eq!(prop.raw(), raw);
        prop_assert_eq!(prop.hash(), hash);
    }

    #[test]
    fn raw_keeps_first_occurrences_in_order(counts in prop::collection::vec(0i64..10, 0..30)) {
        let mut expected: Vec<i64> = Vec::new();
        for c in &counts {
            if !expected.contains(c) {
                expected.push(*c);
            }
        }

        let prop = Property::with_value(counts_attr(), json!(counts)).unwrap();

        prop_assert_eq!(prop.raw(), json!(expected));
    }

    #[test]
    fn identity_hash_depends_only_on_identity(
        value in "[0-9a-f]{8}",
        display_a in "[A-Za-z ]{0,12}",
        display_b in "[A-Za-z ]{0,12}",
    ) {
        let a = Property::with_value(member_attr(), json!({"value": value, "display": display_a})).unwrap();
        let b = Property::with_value(member_attr(), json!({"value": value, "display": display_b})).unwrap();
        prop_assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn delete_restores_the_fresh_hash(tags in prop::collection::vec(tag_strategy(), 1..8)) {
        let fresh = Property::new(tags_attr()).hash();
        let mut prop = Property::with_value(tags_attr(), Value::from(tags)).unwrap();
        prop.delete().unwrap();
        prop_assert_eq!(prop.hash(), fresh);
        prop_assert!(prop.touched());
    }
}
