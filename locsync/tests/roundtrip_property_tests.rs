use indexmap::IndexMap;
use locsync::plural::PLURAL_FORMS;
use locsync::types::{FlatResource, FlatValue, Node};
use locsync::{flatten, prepare_export, prepare_import, unflatten};
use proptest::prelude::*;

fn segment_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z_]{0,7}").expect("valid segment regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z][a-z ]{0,10}[a-z]").expect("valid value regex")
}

/// Trees whose containers are never empty, so flattening loses nothing.
fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = value_strategy().prop_map(Node::leaf);
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Node::Seq),
            prop::collection::vec((segment_strategy(), inner), 1..4)
                .prop_map(|entries| Node::Map(entries.into_iter().collect())),
        ]
    })
}

fn root_strategy() -> impl Strategy<Value = Node> {
    prop::collection::vec((segment_strategy(), node_strategy()), 1..5)
        .prop_map(|entries| Node::Map(entries.into_iter().collect::<IndexMap<_, _>>()))
}

fn forms_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), PLURAL_FORMS.len())
}

/// One side of a bilingual pair: plain keys plus plural families.
fn build_side(plain: &[(String, String)], families: &[(String, Vec<bool>)], value: &str) -> FlatResource {
    let mut flat: FlatResource = plain
        .iter()
        .map(|(k, v)| (format!("txt{}", k), FlatValue::from(v.as_str())))
        .collect();
    for (base, forms) in families {
        for (form, present) in PLURAL_FORMS.iter().zip(forms) {
            if *present {
                flat.insert(format!("p{}_{}", base, form), FlatValue::from(format!("{} {}", value, form)));
            }
        }
    }
    flat
}

fn pair_strategy() -> impl Strategy<Value = (FlatResource, FlatResource)> {
    let plain = prop::collection::vec(
        (
            proptest::string::string_regex("[a-z]{1,6}").expect("valid key regex"),
            value_strategy(),
        ),
        0..4,
    );
    let families = prop::collection::btree_map(
        proptest::string::string_regex("[a-z]{1,5}").expect("valid base regex"),
        (forms_strategy(), forms_strategy()),
        0..4,
    );
    (plain, families).prop_map(|(plain, families)| {
        let reference_forms: Vec<(String, Vec<bool>)> =
            families.iter().map(|(b, (r, _))| (b.clone(), r.clone())).collect();
        let target_forms: Vec<(String, Vec<bool>)> =
            families.iter().map(|(b, (_, t))| (b.clone(), t.clone())).collect();
        (
            build_side(&plain, &reference_forms, "ref"),
            build_side(&plain, &target_forms, "trg"),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn nested_tree_survives_flatten_unflatten(root in root_strategy()) {
        let flat = flatten(&root).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(unflatten(&flat, false), root);
    }

    #[test]
    fn flat_keys_survive_unflatten_flatten(root in root_strategy()) {
        let flat = flatten(&root).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let again = flatten(&unflatten(&flat, false)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(
            again.keys().collect::<Vec<_>>(),
            flat.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn export_then_import_restores_both_sides((reference, target) in pair_strategy()) {
        let exported = prepare_export(&reference, &target).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let reference_back = prepare_import(&exported.reference).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let target_back = prepare_import(&exported.target).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(reference_back, reference);
        prop_assert_eq!(target_back, target);
    }

    #[test]
    fn export_is_idempotent((reference, target) in pair_strategy()) {
        let once = prepare_export(&reference, &target).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let twice = prepare_export(&once.reference, &once.target).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(twice, once);
    }
}
