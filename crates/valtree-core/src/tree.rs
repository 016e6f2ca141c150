//! # Error Trees
//!
//! An [`ErrorTree`] is the structured result of a failed validation. Its
//! shape mirrors the document: field names and array indices map to nested
//! trees, and keyword names map to leaf markers.
//!
//! ```text
//! { "a": { "required": true } }          missing required field `a`
//! { "a": { "type": "string" } }          `a` has the wrong type
//! { "$ref": "other.json#/defs/x" }       reference did not resolve
//! { "schema": { "a": { ... } } }         legacy envelope around field errors
//! ```
//!
//! A tree returned by validation always holds at least one entry; absence of
//! a tree means the document is valid.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::pointer::escape_segment;

/// Entry name of the legacy envelope that wraps per-field errors.
pub const ENVELOPE_KEY: &str = "schema";

/// One entry of an [`ErrorTree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorNode {
    /// Nested violations for a field, an array element, or the legacy envelope.
    Nested(ErrorTree),
    /// Leaf marker for a violated keyword: `true`, the declared type(s), or
    /// an unresolved `$ref` uri.
    Violation(Value),
}

/// Field-shaped map of validation errors.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ErrorTree(BTreeMap<String, ErrorNode>);

impl ErrorTree {
    /// An empty tree. Validation never returns one; it is the accumulator
    /// the engine fills while checking a node.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding a single keyword violation.
    pub fn violation(keyword: impl Into<String>, marker: impl Into<Value>) -> Self {
        let mut tree = Self::new();
        tree.insert_violation(keyword, marker);
        tree
    }

    /// A tree holding `{ keyword: true }`.
    pub fn flag(keyword: impl Into<String>) -> Self {
        Self::violation(keyword, true)
    }

    /// Wrap per-field errors in the legacy `schema` envelope.
    pub fn envelope(inner: ErrorTree) -> Self {
        let mut tree = Self::new();
        tree.insert_nested(ENVELOPE_KEY, inner);
        tree
    }

    /// Record a keyword violation, replacing any entry with the same name.
    pub fn insert_violation(&mut self, keyword: impl Into<String>, marker: impl Into<Value>) {
        self.0
            .insert(keyword.into(), ErrorNode::Violation(marker.into()));
    }

    /// Record `{ keyword: true }`.
    pub fn insert_flag(&mut self, keyword: impl Into<String>) {
        self.insert_violation(keyword, true);
    }

    /// Record nested errors for a field or element.
    pub fn insert_nested(&mut self, key: impl Into<String>, tree: ErrorTree) {
        self.0.insert(key.into(), ErrorNode::Nested(tree));
    }

    /// Entry by name.
    pub fn get(&self, key: &str) -> Option<&ErrorNode> {
        self.0.get(key)
    }

    /// Nested tree by name.
    pub fn nested(&self, key: &str) -> Option<&ErrorTree> {
        match self.0.get(key) {
            Some(ErrorNode::Nested(tree)) => Some(tree),
            _ => None,
        }
    }

    /// Leaf marker by keyword.
    pub fn marker(&self, keyword: &str) -> Option<&Value> {
        match self.0.get(keyword) {
            Some(ErrorNode::Violation(marker)) => Some(marker),
            _ => None,
        }
    }

    /// Follow a path of entry names through nested trees.
    pub fn lookup(&self, path: &[&str]) -> Option<&ErrorNode> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for key in parents {
            tree = tree.nested(key)?;
        }
        tree.get(last)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over top-level entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ErrorNode)> {
        self.0.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Inner tree of the legacy envelope, if this tree carries one.
    pub fn envelope_inner(&self) -> Option<&ErrorTree> {
        self.nested(ENVELOPE_KEY)
    }

    /// Size used to rank failing combinator branches: the envelope's entry
    /// count when present, otherwise the top-level entry count.
    pub fn weight(&self) -> usize {
        self.envelope_inner()
            .map_or(self.len(), ErrorTree::len)
    }

    /// Strip a top-level legacy envelope.
    pub fn into_unwrapped(mut self) -> ErrorTree {
        match self.0.remove(ENVELOPE_KEY) {
            Some(ErrorNode::Nested(inner)) => inner,
            Some(other) => {
                self.0.insert(ENVELOPE_KEY.to_string(), other);
                self
            }
            None => self,
        }
    }

    /// The tree as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, node)| {
                    let value = match node {
                        ErrorNode::Nested(tree) => tree.to_value(),
                        ErrorNode::Violation(marker) => marker.clone(),
                    };
                    (key.clone(), value)
                })
                .collect(),
        )
    }

    /// Flatten the tree into one record per violated keyword. Legacy
    /// envelopes do not contribute a path segment.
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        self.collect_violations(&mut Vec::new(), &mut out);
        out
    }

    fn collect_violations(&self, path: &mut Vec<String>, out: &mut Vec<Violation>) {
        for (key, node) in &self.0 {
            match node {
                ErrorNode::Violation(marker) => out.push(Violation {
                    path: path.clone(),
                    keyword: key.clone(),
                    marker: marker.clone(),
                }),
                ErrorNode::Nested(tree) if key == ENVELOPE_KEY => {
                    tree.collect_violations(path, out);
                }
                ErrorNode::Nested(tree) => {
                    path.push(key.clone());
                    tree.collect_violations(path, out);
                    path.pop();
                }
            }
        }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A single flattened violation.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Field names and indices from the document root.
    pub path: Vec<String>,
    /// The violated keyword.
    pub keyword: String,
    /// The keyword's leaf marker.
    pub marker: Value,
}

impl Violation {
    /// The path as a JSON pointer.
    pub fn pointer(&self) -> String {
        self.path
            .iter()
            .map(|segment| format!("/{}", escape_segment(segment)))
            .collect()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.keyword)?;
        } else {
            write!(f, "  {}: {}", self.pointer(), self.keyword)?;
        }
        match &self.marker {
            Value::Bool(true) => Ok(()),
            other => write!(f, " ({other})"),
        }
    }
}
