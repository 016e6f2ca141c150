//! # Schema Nodes
//!
//! A schema document stays a plain `serde_json::Value` so that `$ref`
//! pointers can walk any part of it, including places that are not schema
//! keywords (`#/definitions/...`, `#/integer`). [`SchemaNode`] is a typed,
//! borrowed view over one fragment: each keyword the engine handles has an
//! accessor returning its parameter in typed form, and every other keyword
//! is reached through [`SchemaNode::keywords`] for generic dispatch.
//!
//! A fragment that is not an object behaves as a schema with no keywords.

use serde_json::{Map, Value};

/// Keywords consumed by the engine itself and never dispatched to keyword
/// validators.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "type",
    "not",
    "anyOf",
    "allOf",
    "oneOf",
    "$ref",
    "$schema",
    "id",
    "exclusiveMaximum",
    "exclusiveMinimum",
    "properties",
    "patternProperties",
    "additionalProperties",
    "items",
    "additionalItems",
    "required",
    "default",
    "title",
    "description",
    "definitions",
    "dependencies",
];

/// True when `keyword` is handled by the engine rather than dispatched.
pub fn is_reserved(keyword: &str) -> bool {
    RESERVED_KEYWORDS.contains(&keyword)
}

/// Declared `type` of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl<'s> {
    /// `"type": "string"`
    Single(&'s str),
    /// `"type": ["string", "null"]`. Entries that are not strings are
    /// dropped and never match; a malformed declaration is an empty list.
    Any(Vec<&'s str>),
}

/// Parameter of `items`.
#[derive(Debug, Clone, Copy)]
pub enum Items<'s> {
    /// Positional schemas.
    Tuple(&'s [Value]),
    /// One schema for every element.
    Each(&'s Value),
}

/// Parameter of `additionalProperties` / `additionalItems`.
#[derive(Debug, Clone, Copy)]
pub enum Additional<'s> {
    /// `true`
    Allowed,
    /// `false`
    Forbidden,
    /// Any non-boolean parameter, applied as a schema.
    Schema(&'s Value),
}

impl<'s> Additional<'s> {
    fn from_value(value: &'s Value) -> Self {
        match value {
            Value::Bool(true) => Additional::Allowed,
            Value::Bool(false) => Additional::Forbidden,
            other => Additional::Schema(other),
        }
    }
}

/// Borrowed view of one schema fragment.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'s> {
    raw: &'s Value,
    map: Option<&'s Map<String, Value>>,
}

impl<'s> SchemaNode<'s> {
    /// View a fragment.
    pub fn new(raw: &'s Value) -> Self {
        Self {
            raw,
            map: raw.as_object(),
        }
    }

    /// The underlying fragment.
    pub fn raw(&self) -> &'s Value {
        self.raw
    }

    /// The fragment as a keyword map, when it is an object.
    pub fn as_map(&self) -> Option<&'s Map<String, Value>> {
        self.map
    }

    /// Raw parameter of a keyword.
    pub fn get(&self, keyword: &str) -> Option<&'s Value> {
        self.map.and_then(|map| map.get(keyword))
    }

    /// All keywords in document order.
    pub fn keywords(&self) -> impl Iterator<Item = (&'s str, &'s Value)> {
        self.map
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// `$ref` parameter.
    pub fn reference(&self) -> Option<&'s Value> {
        self.get("$ref")
    }

    /// Self-describing identifier (`id`).
    pub fn id(&self) -> Option<&'s str> {
        self.get("id").and_then(Value::as_str)
    }

    /// Declared `type`.
    pub fn type_decl(&self) -> Option<TypeDecl<'s>> {
        self.get("type").map(|param| match param {
            Value::String(name) => TypeDecl::Single(name),
            Value::Array(names) => TypeDecl::Any(names.iter().filter_map(Value::as_str).collect()),
            _ => TypeDecl::Any(Vec::new()),
        })
    }

    /// Declared `default`.
    pub fn default_value(&self) -> Option<&'s Value> {
        self.get("default")
    }

    fn schema_list(&self, keyword: &str) -> Option<&'s [Value]> {
        self.get(keyword)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// `allOf` branches.
    pub fn all_of(&self) -> Option<&'s [Value]> {
        self.schema_list("allOf")
    }

    /// `anyOf` branches.
    pub fn any_of(&self) -> Option<&'s [Value]> {
        self.schema_list("anyOf")
    }

    /// `oneOf` branches.
    pub fn one_of(&self) -> Option<&'s [Value]> {
        self.schema_list("oneOf")
    }

    /// `not` sub-schema.
    pub fn not(&self) -> Option<&'s Value> {
        self.get("not")
    }

    /// `dependencies` map from trigger property to property list or schema.
    pub fn dependencies(&self) -> Option<&'s Map<String, Value>> {
        self.get("dependencies").and_then(Value::as_object)
    }

    /// Names listed in `required`.
    pub fn required(&self) -> impl Iterator<Item = &'s str> {
        self.schema_list("required")
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// `properties` map.
    pub fn properties(&self) -> Option<&'s Map<String, Value>> {
        self.get("properties").and_then(Value::as_object)
    }

    /// `patternProperties` map.
    pub fn pattern_properties(&self) -> Option<&'s Map<String, Value>> {
        self.get("patternProperties").and_then(Value::as_object)
    }

    /// `additionalProperties`.
    pub fn additional_properties(&self) -> Option<Additional<'s>> {
        self.get("additionalProperties").map(Additional::from_value)
    }

    /// `items`.
    pub fn items(&self) -> Option<Items<'s>> {
        self.get("items").map(|param| match param {
            Value::Array(list) => Items::Tuple(list),
            other => Items::Each(other),
        })
    }

    /// `additionalItems`.
    pub fn additional_items(&self) -> Option<Additional<'s>> {
        self.get("additionalItems").map(Additional::from_value)
    }

    /// Draft-04 boolean `exclusiveMinimum`.
    pub fn exclusive_minimum(&self) -> bool {
        self.get("exclusiveMinimum").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Draft-04 boolean `exclusiveMaximum`.
    pub fn exclusive_maximum(&self) -> bool {
        self.get("exclusiveMaximum").and_then(Value::as_bool).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_declarations() {
        let single = json!({"type": "string"});
        assert_eq!(SchemaNode::new(&single).type_decl(), Some(TypeDecl::Single("string")));

        let many = json!({"type": ["string", 3, "null"]});
        assert_eq!(
            SchemaNode::new(&many).type_decl(),
            Some(TypeDecl::Any(vec!["string", "null"]))
        );

        let malformed = json!({"type": 4});
        assert_eq!(SchemaNode::new(&malformed).type_decl(), Some(TypeDecl::Any(vec![])));

        let none = json!({});
        assert_eq!(SchemaNode::new(&none).type_decl(), None);
    }

    #[test]
    fn test_items_forms() {
        let tuple = json!({"items": [{"type": "integer"}, {"type": "string"}]});
        assert!(matches!(SchemaNode::new(&tuple).items(), Some(Items::Tuple(list)) if list.len() == 2));

        let each = json!({"items": {"type": "integer"}});
        assert!(matches!(SchemaNode::new(&each).items(), Some(Items::Each(_))));
    }

    #[test]
    fn test_additional_forms() {
        let node = json!({
            "additionalProperties": false,
            "additionalItems": {"type": "string"}
        });
        let node = SchemaNode::new(&node);
        assert!(matches!(node.additional_properties(), Some(Additional::Forbidden)));
        assert!(matches!(node.additional_items(), Some(Additional::Schema(_))));
    }

    #[test]
    fn test_non_object_fragment_has_no_keywords() {
        let fragment = json!("just a string");
        let node = SchemaNode::new(&fragment);
        assert_eq!(node.keywords().count(), 0);
        assert!(node.reference().is_none());
        assert_eq!(node.required().count(), 0);
    }

    #[test]
    fn test_reserved_keywords() {
        assert!(is_reserved("properties"));
        assert!(is_reserved("exclusiveMinimum"));
        assert!(!is_reserved("format"));
        assert!(!is_reserved("minimum"));
    }

    #[test]
    fn test_required_ignores_non_strings() {
        let node = json!({"required": ["a", 1, "b"]});
        let names: Vec<_> = SchemaNode::new(&node).required().collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
