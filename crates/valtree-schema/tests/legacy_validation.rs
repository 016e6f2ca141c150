//! # Legacy Error Envelope
//!
//! Validation of a small user-profile schema with `useLegacyValidation`
//! enabled in the environment defaults. Structural violations of nested
//! objects and arrays are reported under a `schema` key at each level; the
//! outermost envelope is removed before the tree is returned.

use serde_json::{json, Value};
use valtree_schema::{Environment, Options, PartialOptions};

fn user_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "firstname": {"type": "string"},
            "lastname": {"type": "string"}
        },
        "additionalProperties": false,
        "required": ["firstname", "lastname"],
        "definitions": {
            "location": {
                "type": "object",
                "properties": {
                    "address": {"type": "string"},
                    "latlng": {
                        "type": "object",
                        "properties": {"lat": {"type": "number"}, "lon": {"type": "number"}},
                        "required": ["lat", "lon"]
                    }
                },
                "required": ["address", "latlng"]
            },
            "path": {
                "type": "object",
                "properties": {
                    "device": {"type": "string"},
                    "readings": {
                        "type": "array",
                        "default": [],
                        "items": {
                            "type": "object",
                            "default": {"lat": 45, "lon": 45},
                            "properties": {"lat": {"type": "number"}, "lon": {"type": "number"}},
                            "required": ["lat", "lon"]
                        }
                    }
                },
                "required": ["device", "readings"]
            }
        }
    })
}

fn legacy_env() -> Environment {
    let mut env = Environment::new();
    env.set_default_options(Options {
        use_legacy_validation: true,
        ..Options::default()
    });
    env.add_type_coercion("array", |value| match value {
        Value::Null => json!([]),
        Value::Array(items) => Value::Array(items),
        other => json!([other]),
    });
    env
}

/// An environment holding the user schema with one extra property.
fn user_env_with(property: &str, schema: Value) -> Environment {
    let mut user = user_schema();
    user["properties"][property] = schema;
    let mut env = legacy_env();
    env.add_schema_as("user", user).unwrap();
    env
}

fn user() -> Value {
    json!({"firstname": "first", "lastname": "last"})
}

fn user_with(property: &str, value: Value) -> Value {
    let mut user = user();
    user[property] = value;
    user
}

fn errors_of(env: &Environment, value: Value, options: PartialOptions) -> Option<Value> {
    let mut value = value;
    env.validate_with("user", &mut value, &options)
        .unwrap()
        .map(|errors| errors.to_value())
}

fn errors(env: &Environment, value: Value) -> Option<Value> {
    errors_of(env, value, PartialOptions::new())
}

fn at<'v>(errors: &'v Option<Value>, pointer: &str) -> Option<&'v Value> {
    errors.as_ref().and_then(|tree| tree.pointer(pointer))
}

#[test]
fn test_required_fields() {
    let mut env = legacy_env();
    env.add_schema_as("user", user_schema()).unwrap();

    let found = errors(&env, json!({"firstname": "first"}));
    assert_eq!(at(&found, "/lastname"), Some(&json!({"required": true})));
    assert_eq!(errors(&env, user()), None);
}

#[test]
fn test_additional_field_is_flagged() {
    let mut env = legacy_env();
    env.add_schema_as("user", user_schema()).unwrap();

    let found = errors(&env, user_with("nonexistentfield", json!("hello there!")));
    assert_eq!(at(&found, "/nonexistentfield/additional"), Some(&json!(true)));
}

#[test]
fn test_optional_property() {
    let env = user_env_with("gender", json!({"type": "string"}));
    assert_eq!(errors(&env, user()), None);
    assert_eq!(errors(&env, user_with("gender", json!("vampire"))), None);
}

#[test]
fn test_type_violations_carry_declared_type() {
    let cases = [
        ("string", json!(42), json!("whale")),
        ("number", json!("whale"), json!(42.5)),
        ("integer", json!(42.5), json!(1)),
        ("boolean", json!(33), json!(false)),
    ];
    for (type_name, bad, good) in cases {
        let env = user_env_with("field", json!({"type": type_name}));
        let found = errors(&env, user_with("field", bad));
        assert_eq!(at(&found, "/field/type"), Some(&json!(type_name)), "{type_name}");
        assert_eq!(errors(&env, user_with("field", good)), None, "{type_name}");
    }
}

#[test]
fn test_string_formats() {
    let cases = [
        ("alpha", "a42", "undisclosed"),
        ("numeric", "a42", "42"),
        ("alphanumeric", "test%-", "a42"),
        ("hexadecimal", "x44", "deadbeef"),
    ];
    for (format, bad, good) in cases {
        let env = user_env_with("gender", json!({"type": "string", "format": format}));
        let found = errors(&env, user_with("gender", json!(bad)));
        assert_eq!(at(&found, "/gender/format"), Some(&json!(true)), "{format}");
        assert_eq!(errors(&env, user_with("gender", json!(good))), None, "{format}");
    }
}

#[test]
fn test_generic_keywords() {
    let env = user_env_with("gender", json!({"type": "string", "pattern": "ale$"}));
    let found = errors(&env, user_with("gender", json!("girl")));
    assert_eq!(at(&found, "/gender/pattern"), Some(&json!(true)));
    assert_eq!(errors(&env, user_with("gender", json!("male"))), None);

    let env = user_env_with("gender", json!({"type": "string", "enum": ["male", "female"]}));
    let found = errors(&env, user_with("gender", json!("girl")));
    assert_eq!(at(&found, "/gender/enum"), Some(&json!(true)));
    assert_eq!(errors(&env, user_with("gender", json!("male"))), None);
}

#[test]
fn test_number_keywords() {
    let cases = [
        (json!({"type": "number", "multipleOf": 10}), "multipleOf", 21, 20),
        (json!({"type": "number", "minimum": 18}), "minimum", 17, 18),
        (json!({"type": "number", "maximum": 100}), "maximum", 101, 28),
    ];
    for (schema, keyword, bad, good) in cases {
        let env = user_env_with("age", schema);
        let found = errors(&env, user_with("age", json!(bad)));
        assert_eq!(at(&found, &format!("/age/{keyword}")), Some(&json!(true)), "{keyword}");
        assert_eq!(errors(&env, user_with("age", json!(good))), None, "{keyword}");
    }
}

fn role_env() -> Environment {
    user_env_with(
        "role",
        json!({"oneOf": [
            {
                "type": "object",
                "properties": {
                    "role_name": {"type": "string", "enum": ["admin"]},
                    "owner_of": {"type": "array"},
                    "super_admin": {"type": "boolean"}
                },
                "required": ["role_name", "owner_of", "super_admin"]
            },
            {
                "type": "object",
                "properties": {
                    "role_name": {"type": "string", "enum": ["user"]},
                    "member_of": {"type": "array"}
                },
                "required": ["role_name", "member_of"]
            }
        ]}),
    )
}

#[test]
fn test_one_of_rejects_partial_roles() {
    let env = role_env();
    for role in [
        json!({"role_name": "guest"}),
        json!({"role_name": "user"}),
        json!({"role_name": "admin"}),
        json!({"role_name": "admin", "member_of": []}),
        json!({"role_name": "user", "owner_of": []}),
    ] {
        let found = errors(&env, user_with("role", role.clone()));
        assert!(at(&found, "/role").is_some(), "{role}");
    }
}

#[test]
fn test_one_of_reports_closest_branch() {
    let env = role_env();
    let role = json!({"role_name": "admin", "member_of": [], "super_admin": false});

    let found = errors(&env, user_with("role", role.clone()));
    assert_eq!(at(&found, "/role/schema/owner_of"), Some(&json!({"required": true})));

    let coerced = errors_of(&env, user_with("role", role), PartialOptions::new().use_coerce(true));
    assert_eq!(at(&coerced, "/role/schema/owner_of"), Some(&json!({"required": true})));
}

#[test]
fn test_one_of_accepts_complete_roles() {
    let env = role_env();
    let admin = json!({"role_name": "admin", "owner_of": [], "super_admin": true});
    assert_eq!(errors(&env, user_with("role", admin)), None);
    let member = json!({"role_name": "user", "member_of": []});
    assert_eq!(errors(&env, user_with("role", member)), None);
}

#[test]
fn test_nested_reference_wraps_structural_errors() {
    let env = user_env_with("loc", json!({"$ref": "#/definitions/location"}));
    assert_eq!(errors(&env, user()), None);

    let found = errors(&env, user_with("loc", json!({})));
    assert_eq!(
        at(&found, "/loc/schema"),
        Some(&json!({"address": {"required": true}, "latlng": {"required": true}}))
    );

    let found = errors(&env, user_with("loc", json!({"latlng": {"lat": 44, "lon": 23}})));
    assert_eq!(at(&found, "/loc/schema/address/required"), Some(&json!(true)));

    let complete = json!({"address": "some street address", "latlng": {"lat": 44, "lon": 23}});
    assert_eq!(errors(&env, user_with("loc", complete)), None);
}

fn path_env() -> Environment {
    user_env_with("path", json!({"$ref": "#/definitions/path"}))
}

fn device(readings: Value) -> Value {
    user_with("path", json!({"device": "some gps device", "readings": readings}))
}

#[test]
fn test_default_does_not_replace_wrong_type() {
    let env = path_env();
    let options = PartialOptions::new().use_default(true);
    for readings in [json!({"lat": 44, "lon": 23}), json!(0), json!(false)] {
        let found = errors_of(&env, device(readings.clone()), options);
        assert_eq!(
            at(&found, "/path/schema/readings/type"),
            Some(&json!("array")),
            "{readings}"
        );
    }
}

#[test]
fn test_array_item_errors_are_enveloped_per_level() {
    let env = path_env();
    let options = PartialOptions::new().use_coerce(true).use_default(true);
    let found = errors_of(&env, device(json!([{"lat": 44, "long": 23}])), options);
    assert_eq!(
        at(&found, "/path/schema/readings/schema/0/schema/lon/required"),
        Some(&json!(true))
    );
}

#[test]
fn test_coercion_then_item_default() {
    let env = path_env();
    let options = PartialOptions::new().use_coerce(true).use_default(true);
    for readings in [json!([{}]), json!([""]), json!("")] {
        let mut value = device(readings.clone());
        let found = env.validate_with("user", &mut value, &options).unwrap();
        assert!(found.is_none(), "{readings}");
        assert_eq!(value["path"]["readings"][0], json!({"lat": 45, "lon": 45}), "{readings}");
    }
}

#[test]
fn test_valid_readings_are_left_alone() {
    let env = path_env();
    let options = PartialOptions::new().use_coerce(true).use_default(true);
    let mut value = device(json!([{"lat": 44, "lon": 23}]));
    assert!(env.validate_with("user", &mut value, &options).unwrap().is_none());
    assert_eq!(value["path"]["readings"], json!([{"lat": 44, "lon": 23}]));
}

#[test]
fn test_defaults_are_independent_copies() {
    let env = legacy_env();
    let schema = json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {"apples": {"type": "array", "default": []}}
        }
    });
    let mut value = json!([{}, {}]);
    let options = PartialOptions::new().use_default(true);
    assert!(env.validate_with(&schema, &mut value, &options).unwrap().is_none());
    assert_eq!(value, json!([{"apples": []}, {"apples": []}]));

    value[0]["apples"].as_array_mut().unwrap().push(json!(5));
    assert_eq!(value, json!([{"apples": [5]}, {"apples": []}]));
}

#[test]
fn test_object_default_with_awkward_keys() {
    let env = legacy_env();
    let schema = json!({
        "type": "object",
        "properties": {"prop": {"type": "object", "default": {"hasOwnProperty": "yes"}}}
    });
    let mut value = json!({});
    let options = PartialOptions::new().use_default(true);
    assert!(env.validate_with(&schema, &mut value, &options).unwrap().is_none());
    assert_eq!(value, json!({"prop": {"hasOwnProperty": "yes"}}));
}

#[test]
fn test_per_call_override_disables_envelope() {
    let env = user_env_with("loc", json!({"$ref": "#/definitions/location"}));
    let found = errors_of(
        &env,
        user_with("loc", json!({})),
        PartialOptions::new().use_legacy_validation(false),
    );
    assert_eq!(
        found,
        Some(json!({"loc": {"address": {"required": true}, "latlng": {"required": true}}}))
    );
}
