//! # User Extensions
//!
//! Keyword checks, formats, types and coercions registered on an
//! [`Environment`] take part in validation alongside the built-ins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use valtree_schema::{Environment, PartialOptions};

fn object_with_check() -> Value {
    json!({"type": "object", "properties": {}, "checkTest": true})
}

#[test]
fn test_passing_check_yields_no_errors() {
    let mut env = Environment::new();
    env.add_check("checkTest", |_| true);
    assert!(env.validate(&object_with_check(), &mut json!({})).unwrap().is_none());
}

#[test]
fn test_failing_check_is_flagged_under_keyword() {
    let mut env = Environment::new();
    env.add_check("checkTest", |_| false);
    let errors = env.validate(&object_with_check(), &mut json!({})).unwrap().unwrap();
    assert_eq!(errors.to_value(), json!({"checkTest": true}));
}

#[test]
fn test_required_and_check_failures_are_both_reported() {
    let mut env = Environment::new();
    env.add_check("checkTest", |_| false);
    let mut schema = object_with_check();
    schema["required"] = json!(["test"]);

    let errors = env.validate(&schema, &mut json!({})).unwrap().unwrap();
    assert_eq!(
        errors.to_value(),
        json!({"test": {"required": true}, "checkTest": true})
    );
}

#[test]
fn test_later_registration_replaces_earlier() {
    let mut env = Environment::new();
    env.add_check("checkTest", |_| false);
    env.add_check("checkTest", |_| true);
    assert!(env.validate(&object_with_check(), &mut json!({})).unwrap().is_none());
}

#[test]
fn test_check_receives_parameter_and_value() {
    let mut env = Environment::new();
    env.add_check("divisibleBy", |ctx| match (ctx.value.as_i64(), ctx.param.as_i64()) {
        (Some(value), Some(divisor)) if divisor != 0 => value % divisor == 0,
        _ => true,
    });
    let schema = json!({"properties": {"n": {"divisibleBy": 3}}});
    assert!(env.validate(&schema, &mut json!({"n": 9})).unwrap().is_none());
    let errors = env.validate(&schema, &mut json!({"n": 10})).unwrap().unwrap();
    assert_eq!(errors.to_value(), json!({"n": {"divisibleBy": true}}));
}

#[test]
fn test_check_parameter_may_come_from_data_reference() {
    let mut env = Environment::new();
    env.add_check("differsFrom", |ctx| ctx.value != ctx.param);
    let schema = json!({
        "properties": {
            "password": {"type": "string"},
            "confirm": {"type": "string"},
            "username": {"differsFrom": {"$data": "1/password"}}
        }
    });
    assert!(env
        .validate(&schema, &mut json!({"username": "alice", "password": "s3cret"}))
        .unwrap()
        .is_none());
    let errors = env
        .validate(&schema, &mut json!({"username": "same", "password": "same"}))
        .unwrap()
        .unwrap();
    assert_eq!(errors.to_value(), json!({"username": {"differsFrom": true}}));
}

#[test]
fn test_check_sees_sibling_keywords() {
    let mut env = Environment::new();
    env.add_check("lengthBetween", |ctx| {
        let Some(text) = ctx.value.as_str() else { return true };
        let low = ctx.param.as_u64().unwrap_or(0) as usize;
        let high = ctx
            .schema
            .get("lengthUpTo")
            .and_then(Value::as_u64)
            .map_or(usize::MAX, |n| n as usize);
        (low..=high).contains(&text.chars().count())
    });
    let schema = json!({"lengthBetween": 2, "lengthUpTo": 4});
    assert!(env.validate(&schema, &mut json!("abc")).unwrap().is_none());
    assert!(env.validate(&schema, &mut json!("abcde")).unwrap().is_some());
}

#[test]
fn test_custom_format_and_override() {
    let mut env = Environment::new();
    env.add_format("semver", |value| {
        value
            .as_str()
            .is_some_and(|text| text.split('.').count() == 3 && text.split('.').all(|p| p.parse::<u64>().is_ok()))
    });
    env.add_format("email", |_| true);

    let schema = json!({"properties": {"version": {"format": "semver"}, "contact": {"format": "email"}}});
    assert!(env
        .validate(&schema, &mut json!({"version": "1.2.3", "contact": "not an address"}))
        .unwrap()
        .is_none());
    let errors = env.validate(&schema, &mut json!({"version": "1.2"})).unwrap().unwrap();
    assert_eq!(errors.to_value(), json!({"version": {"format": true}}));
}

#[test]
fn test_custom_type_predicate() {
    let mut env = Environment::new();
    env.add_type("positive", |value| value.as_f64().is_some_and(|n| n > 0.0));
    let schema = json!({"type": "positive"});
    assert!(env.validate(&schema, &mut json!(2)).unwrap().is_none());
    let errors = env.validate(&schema, &mut json!(-1)).unwrap().unwrap();
    assert_eq!(errors.to_value(), json!({"type": "positive"}));
}

#[test]
fn test_coercion_runs_only_with_use_coerce() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut env = Environment::new();
    env.add_type_coercion("boolean", move |value| {
        counter.fetch_add(1, Ordering::SeqCst);
        match value.as_str() {
            Some("yes") => json!(true),
            Some("no") => json!(false),
            _ => value,
        }
    });
    let schema = json!({"properties": {"opt_in": {"type": "boolean"}}});

    let mut value = json!({"opt_in": "yes"});
    assert!(env.validate(&schema, &mut value).unwrap().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let options = PartialOptions::new().use_coerce(true);
    assert!(env.validate_with(&schema, &mut value, &options).unwrap().is_none());
    assert_eq!(value, json!({"opt_in": true}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_environments_are_independent() {
    let mut strict = Environment::new();
    strict.add_check("checkTest", |_| false);
    let lenient = Environment::new();

    let schema = object_with_check();
    assert!(strict.validate(&schema, &mut json!({})).unwrap().is_some());
    assert!(lenient.validate(&schema, &mut json!({})).unwrap().is_none());
}

#[test]
fn test_shared_environment_across_threads() {
    let mut env = Environment::new();
    env.add_schema_as("count", json!({"type": "integer", "minimum": 0})).unwrap();
    let env = Arc::new(env);

    let handles: Vec<_> = (0..4i64)
        .map(|n| {
            let env = Arc::clone(&env);
            std::thread::spawn(move || env.validate("count", &mut json!(n - 2)).unwrap().is_none())
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![false, false, true, true]);
}
