//! Built-in type predicates for the `type` keyword.

use std::str::FromStr;

use serde_json::Value;

/// The JSON types a `type` declaration can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `null`
    Null,
    /// `boolean`
    Boolean,
    /// `string`
    String,
    /// `number`: any JSON number.
    Number,
    /// `integer`: a number with no fractional part, including `1.0`.
    Integer,
    /// `object`: a map, not an array.
    Object,
    /// `array`
    Array,
}

impl PrimitiveType {
    /// All built-in types.
    pub const ALL: [PrimitiveType; 7] = [
        PrimitiveType::Null,
        PrimitiveType::Boolean,
        PrimitiveType::String,
        PrimitiveType::Number,
        PrimitiveType::Integer,
        PrimitiveType::Object,
        PrimitiveType::Array,
    ];

    /// The name used in schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Null => "null",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Object => "object",
            PrimitiveType::Array => "array",
        }
    }

    /// True when `value` is of this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            PrimitiveType::Null => value.is_null(),
            PrimitiveType::Boolean => value.is_boolean(),
            PrimitiveType::String => value.is_string(),
            PrimitiveType::Number => value.is_number(),
            PrimitiveType::Integer => is_integer(value),
            PrimitiveType::Object => value.is_object(),
            PrimitiveType::Array => value.is_array(),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        PrimitiveType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == name)
            .ok_or(())
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        _ => false,
    }
}
