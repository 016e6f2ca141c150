//! # Keyword Validators
//!
//! Built-in validators for schema keywords the engine does not consume
//! itself. Each validator receives a [`CheckContext`] and answers whether
//! the value satisfies the keyword. A validator passes values of a kind it
//! does not constrain: `minLength` never fails a number, `minimum` never
//! fails a string.
//!
//! User validators registered with
//! [`Environment::add_check`](crate::Environment::add_check) see the same
//! context and take precedence over the built-ins.

use std::str::FromStr;

use serde_json::Value;
use valtree_core::{json_eq, ValueView};

use crate::node::SchemaNode;
use crate::options::Options;
use crate::patterns::PatternCache;

/// Everything a keyword validator may inspect.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// The value under validation.
    pub value: &'a Value,
    /// The keyword's parameter, already resolved when it was a `$data`
    /// reference.
    pub param: &'a Value,
    /// The schema node declaring the keyword, for sibling parameters.
    pub schema: SchemaNode<'a>,
    /// Path from the document root to the value.
    pub values: ValueView<'a>,
    /// Options of the running validation.
    pub options: &'a Options,
}

/// Built-in keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// Lower bound, exclusive when the node sets `exclusiveMinimum: true`.
    Minimum,
    /// Upper bound, exclusive when the node sets `exclusiveMaximum: true`.
    Maximum,
    MultipleOf,
    /// Regular expression searched anywhere in a string.
    Pattern,
    MinLength,
    MaxLength,
    MinItems,
    MaxItems,
    UniqueItems,
    MinProperties,
    MaxProperties,
    Enum,
    /// `constant`, also spelled `const`.
    Constant,
    /// Fails whenever the node declares `readOnly: true`.
    ReadOnly,
}

impl Keyword {
    /// All built-in keywords.
    pub const ALL: [Keyword; 14] = [
        Keyword::Minimum,
        Keyword::Maximum,
        Keyword::MultipleOf,
        Keyword::Pattern,
        Keyword::MinLength,
        Keyword::MaxLength,
        Keyword::MinItems,
        Keyword::MaxItems,
        Keyword::UniqueItems,
        Keyword::MinProperties,
        Keyword::MaxProperties,
        Keyword::Enum,
        Keyword::Constant,
        Keyword::ReadOnly,
    ];

    /// Canonical schema spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Minimum => "minimum",
            Keyword::Maximum => "maximum",
            Keyword::MultipleOf => "multipleOf",
            Keyword::Pattern => "pattern",
            Keyword::MinLength => "minLength",
            Keyword::MaxLength => "maxLength",
            Keyword::MinItems => "minItems",
            Keyword::MaxItems => "maxItems",
            Keyword::UniqueItems => "uniqueItems",
            Keyword::MinProperties => "minProperties",
            Keyword::MaxProperties => "maxProperties",
            Keyword::Enum => "enum",
            Keyword::Constant => "constant",
            Keyword::ReadOnly => "readOnly",
        }
    }

    /// Run the validator.
    pub fn check(&self, ctx: &CheckContext<'_>, patterns: &PatternCache) -> bool {
        let value = ctx.value;
        let param = ctx.param;
        match self {
            Keyword::Minimum => check_bound(value, param, ctx.schema.exclusive_minimum(), |v, p| v < p),
            Keyword::Maximum => check_bound(value, param, ctx.schema.exclusive_maximum(), |v, p| v > p),
            Keyword::MultipleOf => check_multiple_of(value, param),
            Keyword::Pattern => check_pattern(value, param, patterns),
            Keyword::MinLength => check_count(value.as_str().map(|s| s.chars().count()), param, |n, p| n >= p),
            Keyword::MaxLength => check_count(value.as_str().map(|s| s.chars().count()), param, |n, p| n <= p),
            Keyword::MinItems => check_count(value.as_array().map(Vec::len), param, |n, p| n >= p),
            Keyword::MaxItems => check_count(value.as_array().map(Vec::len), param, |n, p| n <= p),
            Keyword::UniqueItems => check_unique(value, param),
            Keyword::MinProperties => check_count(value.as_object().map(|m| m.len()), param, |n, p| n >= p),
            Keyword::MaxProperties => check_count(value.as_object().map(|m| m.len()), param, |n, p| n <= p),
            Keyword::Enum => param
                .as_array()
                .is_some_and(|choices| choices.iter().any(|choice| json_eq(value, choice))),
            Keyword::Constant => json_eq(value, param),
            Keyword::ReadOnly => param != &Value::Bool(true),
        }
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name == "const" {
            return Ok(Keyword::Constant);
        }
        Keyword::ALL
            .into_iter()
            .find(|keyword| keyword.as_str() == name)
            .ok_or(())
    }
}

/// `violates(value, bound)` is the inclusive violation test; an exclusive
/// bound also rejects equality.
fn check_bound(value: &Value, param: &Value, exclusive: bool, violates: impl Fn(f64, f64) -> bool) -> bool {
    let (Some(v), Some(p)) = (value.as_f64(), param.as_f64()) else {
        return true;
    };
    !(violates(v, p) || (exclusive && v == p))
}

fn check_multiple_of(value: &Value, param: &Value) -> bool {
    let Value::Number(v) = value else {
        return true;
    };
    let Value::Number(p) = param else {
        return true;
    };
    if let (Some(v), Some(p)) = (v.as_i64(), p.as_i64()) {
        // Only `i64::MIN % -1` overflows, and its remainder is zero.
        return p != 0 && v.checked_rem(p).unwrap_or(0) == 0;
    }
    let (Some(v), Some(p)) = (v.as_f64(), p.as_f64()) else {
        return true;
    };
    if p == 0.0 {
        return false;
    }
    let quotient = v / p;
    quotient.is_finite() && (quotient - quotient.round()).abs() <= 1e-9 * quotient.abs().max(1.0)
}

fn check_pattern(value: &Value, param: &Value, patterns: &PatternCache) -> bool {
    let Some(text) = value.as_str() else {
        return true;
    };
    let (pattern, flags) = match param {
        Value::String(pattern) => (pattern.as_str(), ""),
        Value::Array(pair) => match (pair.first().and_then(Value::as_str), pair.get(1)) {
            (Some(pattern), flags) => (pattern, flags.and_then(Value::as_str).unwrap_or("")),
            (None, _) => return true,
        },
        _ => return true,
    };
    patterns.is_match(pattern, flags, text)
}

fn check_count(count: Option<usize>, param: &Value, holds: impl Fn(f64, f64) -> bool) -> bool {
    match (count, param.as_f64()) {
        (Some(n), Some(p)) => holds(n as f64, p),
        _ => true,
    }
}

fn check_unique(value: &Value, param: &Value) -> bool {
    if param != &Value::Bool(true) {
        return true;
    }
    let Some(items) = value.as_array() else {
        return true;
    };
    items
        .iter()
        .enumerate()
        .all(|(i, item)| items[i + 1..].iter().all(|other| !json_eq(item, other)))
}
