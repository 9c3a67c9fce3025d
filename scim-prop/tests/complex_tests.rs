use pretty_assertions::assert_eq;
use scim_prop::{ChildKey, ComplexProperty, Container, Property, StructuralHasher};
use scim_schema::{Attribute, AttributeType, Metadata, ScimError};
use serde_json::{Value, json};
use std::sync::Arc;

fn name_attr() -> Arc<Attribute> {
    Arc::new(
        Attribute::complex(
            "name",
            [
                Attribute::new("givenName", AttributeType::String),
                Attribute::new("familyName", AttributeType::String),
            ],
        )
        .finalized(),
    )
}

/// A group member entry: `value` is the identity key.
fn member_attr() -> Arc<Attribute> {
    Arc::new(
        Attribute::complex(
            "member",
            [
                Attribute::new("value", AttributeType::String)
                    .with_case_exact(true)
                    .with_metadata(Metadata::identity()),
                Attribute::new("display", AttributeType::String),
                Attribute::new("type", AttributeType::String),
            ],
        )
        .finalized(),
    )
}

fn enterprise_attr() -> Arc<Attribute> {
    Arc::new(
        Attribute::complex(
            "enterprise",
            [
                Attribute::new("employeeNumber", AttributeType::String),
                Attribute::complex(
                    "manager",
                    [
                        Attribute::new("value", AttributeType::String),
                        Attribute::new("displayName", AttributeType::String),
                    ],
                ),
                Attribute::new("costCenters", AttributeType::String).with_multi_valued(true),
            ],
        )
        .finalized(),
    )
}

// ── Lifecycle ────────────────────────────────────────────────────

#[test]
fn fresh_complex_is_unassigned_and_untouched() {
    let prop = Property::new(name_attr());
    assert!(prop.is_unassigned());
    assert!(!prop.touched());
    assert!(!prop.present());
    assert_eq!(prop.raw(), json!({}));
}

#[test]
fn children_mirror_sub_attributes() {
    let prop = Property::new(name_attr());
    let container = prop.as_container().unwrap();
    assert_eq!(container.count_children(), 2);

    let mut seen = Vec::new();
    container
        .for_each_child(&mut |i, child| {
            seen.push((i, child.attribute().name.clone()));
            Ok(())
        })
        .unwrap();
    assert_eq!(seen, vec![(0, "givenName".to_string()), (1, "familyName".to_string())]);
}

#[test]
fn delete_on_unassigned_complex_changes_nothing() {
    let mut prop = Property::new(name_attr());
    let hash = prop.hash();
    prop.delete().unwrap();
    assert!(prop.is_unassigned());
    assert!(!prop.touched());
    assert_eq!(prop.hash(), hash);
}

// ── Add ──────────────────────────────────────────────────────────

#[test]
fn partial_adds_merge_into_children() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"givenName": "Ada", "familyName": "Lovelace"})).unwrap();
    prop.add(json!({"givenName": "Ada", "familyName": "King"})).unwrap();

    assert_eq!(prop.raw(), json!({"givenName": "Ada", "familyName": "King"}));
    assert!(prop.touched());
}

#[test]
fn add_resolves_keys_case_insensitively_and_drops_unknown() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"GIVENNAME": "Grace", "middleName": "Brewster"})).unwrap();

    assert_eq!(prop.raw(), json!({"givenName": "Grace"}));
}

#[test]
fn add_with_only_unknown_keys_stays_untouched() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"nickname": "x"})).unwrap();
    assert!(prop.is_unassigned());
    assert!(!prop.touched());
}

#[test]
fn add_rejects_non_objects() {
    let mut prop = Property::new(name_attr());
    for value in [json!("Ada"), json!(1), json!([{"givenName": "Ada"}]), json!(true)] {
        let err = prop.add(value).unwrap_err();
        assert!(err.is_invalid_value());
    }
    assert!(prop.is_unassigned());
}

#[test]
fn add_null_is_ignored() {
    let mut prop = Property::new(name_attr());
    prop.add(Value::Null).unwrap();
    assert!(!prop.touched());
}

#[test]
fn child_errors_propagate_unchanged() {
    let mut prop = Property::new(name_attr());
    let err = prop.add(json!({"givenName": 12})).unwrap_err();
    match err {
        ScimError::InvalidValue { found, path } => {
            assert_eq!(found, "number");
            assert_eq!(path, "name.givenName");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn nested_values_round_trip() {
    let mut prop = Property::new(enterprise_attr());
    let value = json!({
        "employeeNumber": "701984",
        "manager": {"value": "26118915-6090-4610-87e4-49d8ca9f808d", "displayName": "John Smith"},
        "costCenters": ["4130", "4140"]
    });
    prop.add(value.clone()).unwrap();
    assert_eq!(prop.raw(), value);
}

// ── Replace ──────────────────────────────────────────────────────

#[test]
fn replace_null_is_a_no_op() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"givenName": "Ada"})).unwrap();
    prop.replace(Value::Null).unwrap();
    assert_eq!(prop.raw(), json!({"givenName": "Ada"}));
}

#[test]
fn replace_discards_fields_not_supplied() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"givenName": "Ada", "familyName": "Lovelace"})).unwrap();
    prop.replace(json!({"familyName": "King"})).unwrap();
    assert_eq!(prop.raw(), json!({"familyName": "King"}));
}

#[test]
fn failed_replace_reports_this_attribute_and_empties() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"givenName": "Ada"})).unwrap();

    let err = prop.replace(json!({"familyName": false})).unwrap_err();

    match err {
        ScimError::InvalidValue { found, path } => {
            assert_eq!(found, "object");
            assert_eq!(path, "name");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(prop.is_unassigned());
    assert_eq!(prop.hash(), Property::new(name_attr()).hash());
}

#[test]
fn replace_with_non_object_fails_against_this_attribute() {
    let mut prop = Property::new(name_attr());
    let err = prop.replace(json!("Ada")).unwrap_err();
    assert!(matches!(err, ScimError::InvalidValue { found: "string", .. }));
}

// ── Delete ───────────────────────────────────────────────────────

#[test]
fn delete_clears_every_child() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"givenName": "Ada", "familyName": "King"})).unwrap();
    prop.delete().unwrap();
    assert!(prop.is_unassigned());
    assert!(prop.touched());
    assert_eq!(prop.raw(), json!({}));
}

// ── Relational operators ─────────────────────────────────────────

#[test]
fn relational_operators_are_incompatible() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"givenName": "Ada"})).unwrap();

    let results = [
        prop.equals_to(&json!({"givenName": "Ada"})),
        prop.starts_with("A"),
        prop.ends_with("a"),
        prop.contains("d"),
        prop.greater_than(&json!(1)),
        prop.less_than(&json!(1)),
    ];
    for result in results {
        assert!(result.unwrap_err().is_incompatible_op());
    }
}

// ── Container surface ────────────────────────────────────────────

#[test]
fn child_lookup_by_name() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"givenName": "Ada"})).unwrap();

    assert_eq!(prop.child("givenname").unwrap().raw(), json!("Ada"));
    assert!(prop.child("GIVENNAME").is_some());
    assert!(prop.child("middleName").is_none());
    assert!(prop.child(0usize).is_none(), "positions do not address complex children");
}

#[test]
fn new_child_is_not_applicable_and_compact_is_a_no_op() {
    let mut prop = ComplexProperty::new(name_attr());
    assert_eq!(prop.new_child(), None);
    prop.compact();
    assert_eq!(prop.count_children(), 2);
}

#[test]
fn for_each_child_stops_on_error() {
    let prop = Property::new(name_attr());
    let mut visited = 0;
    let err = prop
        .as_container()
        .unwrap()
        .for_each_child(&mut |_, child| {
            visited += 1;
            Err(ScimError::incompatible_op("eq", child.attribute().path()))
        })
        .unwrap_err();
    assert_eq!(visited, 1);
    assert!(err.is_incompatible_op());
}

#[test]
fn mutation_through_child_refreshes_parent_hash() {
    let mut via_child = Property::new(name_attr());
    via_child.add(json!({"givenName": "Ada"})).unwrap();
    let before = via_child.hash();

    via_child
        .child_mut(ChildKey::Name("familyName"))
        .unwrap()
        .add(json!("King"))
        .unwrap();

    let mut direct = Property::new(name_attr());
    direct.add(json!({"givenName": "Ada", "familyName": "King"})).unwrap();

    assert_ne!(via_child.hash(), before);
    assert_eq!(via_child.hash(), direct.hash());
    assert!(via_child.matches(&direct));
}

// ── Hashing ──────────────────────────────────────────────────────

#[test]
fn hash_follows_name_then_digest_framing() {
    let mut prop = Property::new(name_attr());
    prop.add(json!({"givenName": "Ada"})).unwrap();

    let mut expected = StructuralHasher::new();
    expected.write_name("givenName");
    expected.write_digest(prop.child("givenName").unwrap().hash());
    expected.write_name("familyName");

    assert_eq!(prop.hash(), expected.finish());
}

#[test]
fn identity_hash_ignores_non_identity_fields() {
    let mut a = Property::new(member_attr());
    let mut b = Property::new(member_attr());
    a.add(json!({"value": "2819c223", "display": "Babs Jensen", "type": "User"})).unwrap();
    b.add(json!({"value": "2819c223", "display": "Barbara J."})).unwrap();

    assert_eq!(a.hash(), b.hash());
    assert!(a.matches(&b));
}

#[test]
fn identity_hash_diverges_on_identity_field() {
    let mut a = Property::new(member_attr());
    let mut b = Property::new(member_attr());
    a.add(json!({"value": "2819c223", "display": "Babs"})).unwrap();
    b.add(json!({"value": "902c246b", "display": "Babs"})).unwrap();

    assert_ne!(a.hash(), b.hash());
    assert!(!a.matches(&b));
}

#[test]
fn without_identity_every_field_counts() {
    let mut a = Property::new(name_attr());
    let mut b = Property::new(name_attr());
    a.add(json!({"givenName": "Ada", "familyName": "Lovelace"})).unwrap();
    b.add(json!({"givenName": "Ada", "familyName": "King"})).unwrap();
    assert_ne!(a.hash(), b.hash());
}

#[test]
fn complexes_of_different_attributes_do_not_match() {
    let other = Arc::new(
        Attribute::complex(
            "nickname",
            [
                Attribute::new("givenName", AttributeType::String),
                Attribute::new("familyName", AttributeType::String),
            ],
        )
        .finalized(),
    );
    let a = Property::new(name_attr());
    let b = Property::new(other);
    assert!(!a.matches(&b));
}

#[test]
fn complex_never_matches_a_leaf() {
    let complex = Property::new(name_attr());
    let leaf = Property::new(Arc::new(Attribute::new("name", AttributeType::String)));
    assert!(!complex.matches(&leaf));
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn with_value_builds_and_fills() {
    let prop = Property::with_value(name_attr(), json!({"givenName": "Ada"})).unwrap();
    assert_eq!(prop.raw(), json!({"givenName": "Ada"}));
    assert!(Property::with_value(name_attr(), json!(3)).is_err());
}

#[test]
#[should_panic(expected = "invalid attribute for complex property")]
fn complex_constructor_rejects_multi_valued_attribute() {
    let attr = Attribute::complex("emails", [Attribute::new("value", AttributeType::String)])
        .with_multi_valued(true);
    let _ = ComplexProperty::new(Arc::new(attr));
}

#[test]
#[should_panic(expected = "invalid attribute for complex property")]
fn complex_constructor_rejects_leaf_attribute() {
    let _ = ComplexProperty::new(Arc::new(Attribute::new("title", AttributeType::String)));
}
