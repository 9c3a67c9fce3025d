//! Property-based tests for attribute addressing and copying.

use proptest::prelude::*;
use scim_schema::{Attribute, AttributeType};
use std::sync::Arc;

fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9$]{0,20}").unwrap()
}

/// Flips the case of characters selected by `mask`.
fn recase(name: &str, mask: &[bool]) -> String {
    name.chars()
        .zip(mask.iter().cycle())
        .map(|(c, flip)| {
            if *flip {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn goes_by_own_name_in_any_case(
        name in name_strategy(),
        mask in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let attr = Attribute::new(name.clone(), AttributeType::String);
        prop_assert!(attr.goes_by(&name));
        prop_assert!(attr.goes_by(&recase(&name, &mask)));
    }

    #[test]
    fn never_goes_by_a_different_name(a in name_strategy(), b in name_strategy()) {
        prop_assume!(a.to_lowercase() != b.to_lowercase());
        let attr = Attribute::new(a, AttributeType::String);
        prop_assert!(!attr.goes_by(&b));
    }

    #[test]
    fn copy_survives_mutation_of_the_copy(
        names in prop::collection::vec(name_strategy(), 1..6),
        replacement in name_strategy(),
    ) {
        let attr = Attribute::complex(
            "parent",
            names.iter().map(|n| Attribute::new(n.clone(), AttributeType::String)),
        )
        .finalized();
        let before = serde_json::to_value(&attr).unwrap();

        let mut copied = attr.copy();
        prop_assert!(attr.equals(&copied));
        for sub in &mut copied.sub_attributes {
            Arc::get_mut(sub).unwrap().name = replacement.clone();
        }

        prop_assert_eq!(serde_json::to_value(&attr).unwrap(), before);
    }
}
