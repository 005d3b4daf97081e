//! End-to-end assembly tests over the shared scenarios

use grapht_core::{
    assemble, check_equivalence, AssemblerConfig, Path, TreeAssembler, TreeError, TypeName,
    TypeOptions,
};
use grapht_test_fixtures::{scenario, scenarios, Expected};
use pretty_assertions::assert_eq;
use serde_json::json;

fn path(keys: &[&str]) -> Path {
    keys.iter().copied().collect()
}

#[test]
fn test_every_scenario_matches_expectation() {
    for scenario in scenarios() {
        let result = TreeAssembler::new()
            .with_required_input_types(scenario.required.clone())
            .with_optional_input_types(scenario.optional.clone())
            .with_default_input(scenario.defaults.clone())
            .with_user_input(scenario.user.clone())
            .assemble_tree();

        match (&scenario.expected, result) {
            (Expected::Tree(expected), Ok(tree)) => {
                assert_eq!(&tree, expected, "scenario {}", scenario.name);
                assert!(check_equivalence(expected, &tree));
            }
            (Expected::MissingParameter(keys), Err(TreeError::MissingParameter { path: p })) => {
                assert_eq!(p, path(keys), "scenario {}", scenario.name);
            }
            (Expected::TypeMismatch(keys), Err(TreeError::TypeMismatch { path: p, .. })) => {
                assert_eq!(p, path(keys), "scenario {}", scenario.name);
            }
            (Expected::UnsupportedType(token), Err(TreeError::UnsupportedType { token: t, .. })) => {
                assert_eq!(&t, token, "scenario {}", scenario.name);
            }
            (expected, result) => panic!(
                "scenario {}: expected {:?}, got {:?}",
                scenario.name, expected, result
            ),
        }
    }
}

#[test]
fn test_default_fill_scenario() {
    let tree = assemble(
        &json!({"x": "int"}),
        &json!({}),
        &json!({"y": 5}),
        &json!({"x": 3}),
    )
    .unwrap();
    assert_eq!(tree, json!({"x": 3, "y": 5}));
}

#[test]
fn test_missing_required_names_path() {
    let err = assemble(&json!({"x": "int"}), &json!({}), &json!({}), &json!({})).unwrap_err();
    match err {
        TreeError::MissingParameter { path: p } => assert_eq!(p, path(&["x"])),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_union_declaration_accepts_float() {
    let tree = assemble(
        &json!({"x": ["int", "float"]}),
        &json!({}),
        &json!({}),
        &json!({"x": 2.5}),
    )
    .unwrap();
    assert_eq!(tree, json!({"x": 2.5}));
}

#[test]
fn test_optional_absent_is_tolerated_but_checked_when_present() {
    let optional = json!({"seed": "int"});
    assert!(assemble(&json!({}), &optional, &json!({}), &json!({})).is_ok());

    let err = assemble(&json!({}), &optional, &json!({}), &json!({"seed": "abc"})).unwrap_err();
    match err {
        TreeError::TypeMismatch {
            path: p,
            expected,
            actual,
        } => {
            assert_eq!(p, path(&["seed"]));
            assert!(expected.contains(TypeName::Int));
            assert_eq!(actual, json!("abc"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unsupported_type_even_when_value_absent() {
    let err = assemble(&json!({"x": "foo"}), &json!({}), &json!({}), &json!({})).unwrap_err();
    assert!(matches!(err, TreeError::UnsupportedType { .. }));
}

#[test]
fn test_defaults_never_override_user_values() {
    let user = json!({"a": 1, "g": {"b": [1], "c": null}, "s": "user"});
    let defaults = json!({"a": 2, "g": {"b": [9, 9], "c": 0, "d": true}, "s": "default"});
    let tree = assemble(&json!({}), &json!({}), &defaults, &user).unwrap();

    assert_eq!(
        tree,
        json!({"a": 1, "g": {"b": [1], "c": null, "d": true}, "s": "user"})
    );
}

#[test]
fn test_bool_is_int_config() {
    let required = json!({"flag": "int"});
    let user = json!({"flag": true});

    let strict = assemble(&required, &json!({}), &json!({}), &user);
    assert!(matches!(strict, Err(TreeError::TypeMismatch { .. })));

    let config = AssemblerConfig::default().with_types(TypeOptions { bool_is_int: true });
    let lenient = TreeAssembler::with_config(config)
        .with_required_input_types(required)
        .with_user_input(user.clone())
        .assemble_tree()
        .unwrap();
    assert_eq!(lenient, user);
}

#[test]
fn test_scenario_lookup() {
    let scenario = scenario("simulation").unwrap();
    assert!(matches!(scenario.expected, Expected::Tree(_)));
    assert!(grapht_test_fixtures::scenario("nope").is_none());
}
