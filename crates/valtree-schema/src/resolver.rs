//! # Schema Resolution
//!
//! Resolves `$ref` strings to a [`SchemaStack`]: the chain of schema
//! fragments from an enclosing document down to the referenced node.
//!
//! ## Reference forms
//!
//! - `name`: a document identifier, looked up in the registry.
//! - `name#/a/b`: a JSON pointer inside the named document. When `name`
//!   is the identifier of the current stack's root document, resolution
//!   stays inside that in-memory document. Anonymous schemas
//!   that carry only an `id` refer to themselves this way before
//!   registration.
//! - `#`: the root of the current document.
//! - `#/a/b`: a JSON pointer inside the current document.
//!
//! Pointer segments are used literally. Any other fragment is unsupported.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use valtree_core::Key;

use crate::node::SchemaNode;

/// Key-value store of schema documents by normalized identifier.
pub trait SchemaLookup {
    /// The document registered under `id`.
    fn lookup(&self, id: &str) -> Option<&Value>;
}

impl SchemaLookup for HashMap<String, Arc<Value>> {
    fn lookup(&self, id: &str) -> Option<&Value> {
        self.get(id).map(|doc| doc.as_ref())
    }
}

impl SchemaLookup for HashMap<String, Value> {
    fn lookup(&self, id: &str) -> Option<&Value> {
        self.get(id)
    }
}

/// Strip the fragment from a document identifier.
pub fn normalize_id(id: &str) -> &str {
    id.split_once('#').map_or(id, |(document, _)| document)
}

/// Ordered schema fragments from an enclosing document (entry 0) down to
/// the node currently applied. Extending a stack produces a new stack;
/// fragments are shared borrows and never mutated.
#[derive(Debug, Clone)]
pub struct SchemaStack<'s> {
    nodes: Vec<&'s Value>,
}

impl<'s> SchemaStack<'s> {
    /// A stack holding a single document.
    pub fn new(root: &'s Value) -> Self {
        Self { nodes: vec![root] }
    }

    /// The enclosing document.
    pub fn root(&self) -> &'s Value {
        self.nodes[0]
    }

    /// The node currently applied.
    pub fn top(&self) -> &'s Value {
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of fragments on the stack.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Stacks are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Fragments, enclosing document first.
    pub fn nodes(&self) -> &[&'s Value] {
        &self.nodes
    }

    /// A copy of this stack extended with `node`.
    pub fn push(&self, node: &'s Value) -> Self {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(node);
        Self { nodes }
    }

    fn push_in_place(&mut self, node: &'s Value) {
        self.nodes.push(node);
    }
}

/// Resolve `uri` relative to `stack` against `registry`.
pub fn resolve<'s, R>(
    registry: &'s R,
    stack: Option<&SchemaStack<'s>>,
    uri: &str,
) -> Option<SchemaStack<'s>>
where
    R: SchemaLookup + ?Sized,
{
    let Some((document, fragment)) = uri.split_once('#') else {
        return registry.lookup(uri).map(SchemaStack::new);
    };

    let base = if document.is_empty() {
        stack?.root()
    } else {
        match stack {
            Some(stack)
                if SchemaNode::new(stack.root()).id().map(normalize_id) == Some(document) =>
            {
                stack.root()
            }
            _ => registry.lookup(document)?,
        }
    };

    let mut resolved = SchemaStack::new(base);
    if fragment.is_empty() {
        return Some(resolved);
    }

    let path = fragment.strip_prefix('/')?;
    let mut current = base;
    for segment in path.split('/') {
        current = valtree_core::stack::child(current, &Key::Field(segment.to_string()))?;
        resolved.push_in_place(current);
    }
    Some(resolved)
}
