//! # Validation Engine
//!
//! [`Engine::check`] applies the node on top of a [`SchemaStack`] to the
//! value on top of a [`ValueStack`] and returns the violations found, or
//! `None` when the value is valid. Nodes are processed in a fixed order:
//!
//! 1. `$ref`, which is exclusive: the referenced schema's result is the
//!    node's result and no sibling keyword is evaluated.
//! 2. `type`, preceded by coercion and defaulting when those options are
//!    active. A mismatch halts the node.
//! 3. `allOf`, sharing the value stack. The first failing branch is
//!    returned as-is.
//! 4. `oneOf`, `anyOf`, `not`.
//! 5. `dependencies`.
//! 6. Structural descent into object fields or array elements. Every
//!    per-field violation is collected before the node returns.
//! 7. Generic dispatch of the remaining keywords to format, user and
//!    built-in validators.
//!
//! ## Speculative branches
//!
//! When an option may write into the document (`useDefault`, `useCoerce`,
//! `removeAdditional`), each `oneOf`/`anyOf`/`not` branch is checked
//! against a [`Snapshot`] of the document. A rejected branch leaves no
//! trace. An accepted branch's value is moved back into the document at
//! the current frame, for `oneOf` only once the branch is known to be the
//! single match.
//!
//! Failing combinators report the failing branch with the smallest
//! [`ErrorTree::weight`]; ties keep the earliest branch.

use std::borrow::Cow;

use serde_json::Value;
use valtree_core::{resolve_data, ErrorTree, Key, Snapshot, ValueStack};

use crate::environment::Environment;
use crate::keywords::{CheckContext, Keyword};
use crate::node::{is_reserved, Additional, Items, SchemaNode, TypeDecl};
use crate::options::Options;
use crate::resolver::SchemaStack;

/// Recursive validator bound to an [`Environment`].
#[derive(Debug, Clone, Copy)]
pub struct Engine<'s> {
    env: &'s Environment,
}

/// Outcome of checking one combinator branch.
enum Probe {
    /// The branch holds. Carries the trial copy when the run could mutate.
    Accepted(Option<Snapshot>),
    Rejected(ErrorTree),
}

impl<'s> Engine<'s> {
    /// An engine reading registrations and tables from `env`.
    pub fn new(env: &'s Environment) -> Self {
        Self { env }
    }

    /// Check the value on top of `values` against the node on top of
    /// `schemas`.
    pub fn check(
        &self,
        schemas: &SchemaStack<'s>,
        values: &mut ValueStack<'_>,
        options: &Options,
    ) -> Option<ErrorTree> {
        let node = SchemaNode::new(schemas.top());

        if let Some(reference) = node.reference() {
            return self.check_reference(schemas, reference, values, options);
        }

        if let Some(errors) = self.check_type(&node, values, options) {
            return Some(errors);
        }

        for branch in node.all_of().into_iter().flatten() {
            if let Some(errors) = self.check(&schemas.push(branch), values, options) {
                return Some(errors);
            }
        }

        if let Some(branches) = node.one_of() {
            if let Some(errors) = self.check_one_of(schemas, branches, values, options) {
                return Some(errors);
            }
        }
        if let Some(branches) = node.any_of() {
            if let Some(errors) = self.check_any_of(schemas, branches, values, options) {
                return Some(errors);
            }
        }
        if let Some(negated) = node.not() {
            if let Probe::Accepted(_) = self.probe(schemas, negated, values, options) {
                return Some(ErrorTree::flag("not"));
            }
        }

        if let Some(errors) = self.check_dependencies(schemas, &node, values, options) {
            return Some(errors);
        }

        let mut errors = ErrorTree::new();
        if values.current().is_array() {
            if let Some(halt) = self.check_array(schemas, &node, values, options, &mut errors) {
                return Some(halt);
            }
        } else {
            self.check_object(schemas, &node, values, options, &mut errors);
        }
        if !errors.is_empty() && options.use_legacy_validation {
            return Some(ErrorTree::envelope(errors));
        }

        self.check_keywords(&node, values, options, &mut errors);
        (!errors.is_empty()).then_some(errors)
    }

    fn check_reference(
        &self,
        schemas: &SchemaStack<'s>,
        reference: &'s Value,
        values: &mut ValueStack<'_>,
        options: &Options,
    ) -> Option<ErrorTree> {
        let target = reference
            .as_str()
            .and_then(|uri| self.env.resolve_ref(Some(schemas), uri));
        match target {
            Some(target) => {
                tracing::trace!(reference = %reference, depth = target.len(), "resolved $ref");
                self.check(&target, values, options)
            }
            None => {
                tracing::trace!(reference = %reference, "unresolved $ref");
                Some(ErrorTree::violation("$ref", reference.clone()))
            }
        }
    }

    fn check_type(
        &self,
        node: &SchemaNode<'s>,
        values: &mut ValueStack<'_>,
        options: &Options,
    ) -> Option<ErrorTree> {
        let declared = node.get("type")?;
        let matched = match node.type_decl()? {
            TypeDecl::Single(name) => {
                if options.use_coerce {
                    if let Some(coerce) = self.env.coercion(name) {
                        if let Some(current) = values.take_current() {
                            values.replace_current(coerce(current));
                        }
                    }
                }
                if options.use_default {
                    if let Some(default) = node.default_value() {
                        if needs_default(values.current(), name) {
                            values.replace_current(default.clone());
                        }
                    }
                }
                self.env.type_matches(name, values.current())
            }
            TypeDecl::Any(names) => names
                .iter()
                .any(|name| self.env.type_matches(name, values.current())),
        };
        (!matched).then(|| ErrorTree::violation("type", declared.clone()))
    }

    /// Run `branch` against the current value, on a snapshot when the
    /// options may mutate.
    fn probe(
        &self,
        schemas: &SchemaStack<'s>,
        branch: &'s Value,
        values: &mut ValueStack<'_>,
        options: &Options,
    ) -> Probe {
        let branch = schemas.push(branch);
        if !options.mutates() {
            return match self.check(&branch, values, options) {
                None => Probe::Accepted(None),
                Some(errors) => Probe::Rejected(errors),
            };
        }

        let mut snapshot = Snapshot::capture(values);
        let outcome = {
            let mut trial = snapshot.stack();
            self.check(&branch, &mut trial, options)
        };
        match outcome {
            None => Probe::Accepted(Some(snapshot)),
            Some(errors) => Probe::Rejected(errors),
        }
    }

    fn check_one_of(
        &self,
        schemas: &SchemaStack<'s>,
        branches: &'s [Value],
        values: &mut ValueStack<'_>,
        options: &Options,
    ) -> Option<ErrorTree> {
        let mut matches = 0usize;
        let mut winner = None;
        let mut best = None;
        for branch in branches {
            match self.probe(schemas, branch, values, options) {
                Probe::Accepted(snapshot) => {
                    matches += 1;
                    if matches > 1 {
                        return Some(ErrorTree::flag("oneOf"));
                    }
                    winner = snapshot;
                }
                Probe::Rejected(errors) => keep_lightest(&mut best, errors),
            }
        }

        if matches == 0 {
            return Some(best.unwrap_or_else(|| ErrorTree::flag("oneOf")));
        }
        if let Some(snapshot) = winner {
            snapshot.commit(values);
        }
        None
    }

    fn check_any_of(
        &self,
        schemas: &SchemaStack<'s>,
        branches: &'s [Value],
        values: &mut ValueStack<'_>,
        options: &Options,
    ) -> Option<ErrorTree> {
        let mut best = None;
        for branch in branches {
            match self.probe(schemas, branch, values, options) {
                Probe::Accepted(snapshot) => {
                    if let Some(snapshot) = snapshot {
                        snapshot.commit(values);
                    }
                    return None;
                }
                Probe::Rejected(errors) => keep_lightest(&mut best, errors),
            }
        }
        // No branches means nothing was rejected.
        best
    }

    fn check_dependencies(
        &self,
        schemas: &SchemaStack<'s>,
        node: &SchemaNode<'s>,
        values: &mut ValueStack<'_>,
        options: &Options,
    ) -> Option<ErrorTree> {
        for (trigger, dependency) in node.dependencies()? {
            let present = values
                .current()
                .as_object()
                .is_some_and(|object| object.contains_key(trigger));
            if !present {
                continue;
            }
            match dependency {
                Value::Array(names) => {
                    let current = values.current();
                    let satisfied = names
                        .iter()
                        .filter_map(Value::as_str)
                        .all(|name| current.get(name).is_some());
                    if !satisfied {
                        return Some(ErrorTree::flag("dependencies"));
                    }
                }
                schema => {
                    if let Some(errors) = self.check(&schemas.push(schema), values, options) {
                        return Some(errors);
                    }
                }
            }
        }
        None
    }

    /// Structural checks for anything that is not an array. Values other
    /// than objects have no fields, so only `required` can fail for them.
    fn check_object(
        &self,
        schemas: &SchemaStack<'s>,
        node: &SchemaNode<'s>,
        values: &mut ValueStack<'_>,
        options: &Options,
        errors: &mut ErrorTree,
    ) {
        let fields: Vec<String> = values
            .current()
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();

        if options.check_required {
            let current = values.current();
            for name in node.required() {
                if current.get(name).is_none() {
                    errors.insert_nested(name, ErrorTree::flag("required"));
                }
            }
        }

        let properties = node.properties();
        let pattern_properties = node.pattern_properties();
        let mut unmatched = Vec::new();
        for field in fields {
            let mut matched = false;
            if let Some(schema) = properties.and_then(|declared| declared.get(&field)) {
                matched = true;
                if let Some(found) = self.check_child(schemas, schema, values, field.as_str(), options) {
                    errors.insert_nested(field.as_str(), found);
                }
            }
            for (pattern, schema) in pattern_properties.into_iter().flatten() {
                if !self.env.patterns().is_match(pattern, "", &field) {
                    continue;
                }
                matched = true;
                if let Some(found) = self.check_child(schemas, schema, values, field.as_str(), options) {
                    errors.insert_nested(field.as_str(), found);
                }
            }
            if !matched {
                unmatched.push(field);
            }
        }

        if options.use_default && errors.is_empty() {
            if let (Some(declared), Some(object)) = (
                properties,
                values.current_mut().and_then(Value::as_object_mut),
            ) {
                for (name, schema) in declared {
                    if object.contains_key(name) {
                        continue;
                    }
                    if let Some(default) = property_default(schema) {
                        object.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        if unmatched.is_empty() {
            return;
        }
        let additional = node.additional_properties();
        let keeps_additional = matches!(
            additional,
            Some(Additional::Allowed | Additional::Schema(_))
        );
        if options.remove_additional && properties.is_some() && !keeps_additional {
            if let Some(object) = values.current_mut().and_then(Value::as_object_mut) {
                for field in &unmatched {
                    object.remove(field);
                }
            }
            return;
        }
        match additional {
            Some(Additional::Forbidden) => {
                for field in unmatched {
                    errors.insert_nested(field, ErrorTree::flag("additional"));
                }
            }
            Some(Additional::Schema(schema)) => {
                for field in unmatched {
                    if let Some(found) = self.check_child(schemas, schema, values, field.as_str(), options) {
                        errors.insert_nested(field, found);
                    }
                }
            }
            Some(Additional::Allowed) | None => {}
        }
    }

    /// Structural checks for arrays. Returns a tree only when the node must
    /// halt; element violations go into `errors`.
    fn check_array(
        &self,
        schemas: &SchemaStack<'s>,
        node: &SchemaNode<'s>,
        values: &mut ValueStack<'_>,
        options: &Options,
        errors: &mut ErrorTree,
    ) -> Option<ErrorTree> {
        let len = values.current().as_array().map_or(0, Vec::len);
        match (node.items(), node.additional_items()) {
            (Some(Items::Tuple(tuple)), additional) => {
                for (index, schema) in tuple.iter().enumerate().take(len) {
                    self.check_element(schemas, schema, values, index, options, errors);
                }
                if len > tuple.len() {
                    match additional {
                        Some(Additional::Forbidden) => return Some(ErrorTree::flag("additionalItems")),
                        Some(Additional::Schema(schema)) => {
                            for index in tuple.len()..len {
                                self.check_element(schemas, schema, values, index, options, errors);
                            }
                        }
                        Some(Additional::Allowed) | None => {}
                    }
                }
            }
            (Some(Items::Each(schema)), _) | (None, Some(Additional::Schema(schema))) => {
                for index in 0..len {
                    self.check_element(schemas, schema, values, index, options, errors);
                }
            }
            (None, _) => {}
        }
        None
    }

    fn check_element(
        &self,
        schemas: &SchemaStack<'s>,
        schema: &'s Value,
        values: &mut ValueStack<'_>,
        index: usize,
        options: &Options,
        errors: &mut ErrorTree,
    ) {
        if let Some(found) = self.check_child(schemas, schema, values, index, options) {
            errors.insert_nested(index.to_string(), found);
        }
    }

    fn check_child(
        &self,
        schemas: &SchemaStack<'s>,
        schema: &'s Value,
        values: &mut ValueStack<'_>,
        key: impl Into<Key>,
        options: &Options,
    ) -> Option<ErrorTree> {
        values.push(key);
        let found = self.check(&schemas.push(schema), values, options);
        values.pop();
        found
    }

    fn check_keywords(
        &self,
        node: &SchemaNode<'s>,
        values: &ValueStack<'_>,
        options: &Options,
        errors: &mut ErrorTree,
    ) {
        let view = values.view();
        let value = view.current();
        for (keyword, param) in node.keywords() {
            if is_reserved(keyword) {
                continue;
            }

            if keyword == "format" {
                let valid = param
                    .as_str()
                    .is_some_and(|name| self.env.format_matches(name, value));
                if !valid {
                    errors.insert_flag(keyword);
                }
                continue;
            }

            let param: Cow<'_, Value> = match data_reference(param) {
                Some(reference) => match resolve_data(&view, reference) {
                    Some(resolved) => resolved,
                    None => continue,
                },
                None => Cow::Borrowed(param),
            };
            let ctx = CheckContext {
                value,
                param: &param,
                schema: *node,
                values: view,
                options,
            };
            let valid = if let Some(check) = self.env.check_fn(keyword) {
                check(&ctx)
            } else if let Ok(builtin) = keyword.parse::<Keyword>() {
                builtin.check(&ctx, self.env.patterns())
            } else {
                continue;
            };
            if !valid {
                errors.insert_flag(keyword);
            }
        }
    }
}

fn keep_lightest(best: &mut Option<ErrorTree>, candidate: ErrorTree) {
    let lighter = best
        .as_ref()
        .map_or(true, |current| candidate.weight() < current.weight());
    if lighter {
        *best = Some(candidate);
    }
}

/// Values `useDefault` replaces: null, the empty string, and an empty
/// container of the declared container type.
fn needs_default(value: &Value, type_name: &str) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => type_name == "array" && items.is_empty(),
        Value::Object(fields) => type_name == "object" && fields.is_empty(),
        _ => false,
    }
}

fn property_default(schema: &Value) -> Option<&Value> {
    let node = SchemaNode::new(schema);
    node.default_value()
        .or_else(|| node.get("items").and_then(|items| SchemaNode::new(items).default_value()))
}

fn data_reference(param: &Value) -> Option<&str> {
    param.get("$data").and_then(Value::as_str)
}
