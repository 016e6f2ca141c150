//! # Environment
//!
//! An [`Environment`] owns everything a validation call reads: the schema
//! registry, the extension tables for types, coercions, keyword checks and
//! formats, the default options, and the compiled pattern cache. There is
//! no global instance; independent environments coexist freely.
//!
//! ## Design
//!
//! - Registration takes `&mut self`, validation takes `&self`. Once set up,
//!   an environment can be shared across threads behind an `Arc`.
//! - Handlers are `Arc<dyn Fn .. + Send + Sync>`. A later registration
//!   under the same name replaces the earlier one, and user registrations
//!   shadow the built-in tables.
//! - Validation results are data. Only configuration mistakes, such as an
//!   unknown schema name, surface as [`ValtreeError`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use valtree_core::{ErrorTree, ValtreeError, ValueStack};

use crate::engine::Engine;
use crate::formats::Format;
use crate::keywords::CheckContext;
use crate::node::SchemaNode;
use crate::options::{Options, PartialOptions};
use crate::patterns::PatternCache;
use crate::resolver::{self, normalize_id, SchemaLookup, SchemaStack};
use crate::types::PrimitiveType;

/// User keyword validator.
pub type CheckFn = Arc<dyn Fn(&CheckContext<'_>) -> bool + Send + Sync>;
/// User format predicate.
pub type FormatFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
/// User type predicate.
pub type TypeFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
/// Type coercion applied before a `type` check when `useCoerce` is set.
pub type CoerceFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// The schema a validation call starts from.
#[derive(Debug, Clone, Copy)]
pub enum SchemaRef<'a> {
    /// A registered document, optionally with a `#/pointer` fragment.
    Named(&'a str),
    /// A schema supplied inline; it is the only entry of the schema stack.
    Inline(&'a Value),
}

impl<'a> From<&'a str> for SchemaRef<'a> {
    fn from(name: &'a str) -> Self {
        SchemaRef::Named(name)
    }
}

impl<'a> From<&'a String> for SchemaRef<'a> {
    fn from(name: &'a String) -> Self {
        SchemaRef::Named(name)
    }
}

impl<'a> From<&'a Value> for SchemaRef<'a> {
    fn from(schema: &'a Value) -> Self {
        SchemaRef::Inline(schema)
    }
}

/// Schema registry plus extension tables.
#[derive(Default)]
pub struct Environment {
    registry: HashMap<String, Arc<Value>>,
    types: HashMap<String, TypeFn>,
    coercions: HashMap<String, CoerceFn>,
    checks: HashMap<String, CheckFn>,
    formats: HashMap<String, FormatFn>,
    default_options: Options,
    patterns: PatternCache,
}

impl Environment {
    /// An environment with the built-in tables and no schemas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its own `id`.
    pub fn add_schema(&mut self, schema: Value) -> Result<(), ValtreeError> {
        self.register(None, schema)
    }

    /// Register a schema under `name`, and also under its `id` when it
    /// carries a different one.
    pub fn add_schema_as(&mut self, name: &str, schema: Value) -> Result<(), ValtreeError> {
        self.register(Some(name), schema)
    }

    fn register(&mut self, name: Option<&str>, schema: Value) -> Result<(), ValtreeError> {
        let id = SchemaNode::new(&schema)
            .id()
            .filter(|id| Some(*id) != name)
            .map(str::to_string);

        match (&id, name) {
            (Some(id), _) if id.starts_with('/') => {
                return Err(ValtreeError::InvalidIdentifier(id.clone()));
            }
            (None, None) => return Err(ValtreeError::MissingIdentifier),
            _ => {}
        }

        let schema = Arc::new(schema);
        if let Some(id) = &id {
            self.insert_schema(normalize_id(id), Arc::clone(&schema));
        }
        if let Some(name) = name {
            self.insert_schema(normalize_id(name), schema);
        }
        Ok(())
    }

    fn insert_schema(&mut self, key: &str, schema: Arc<Value>) {
        let replaced = self.registry.insert(key.to_string(), schema).is_some();
        tracing::debug!(schema = %key, replaced, "registered schema");
    }

    /// Register or replace a type predicate.
    pub fn add_type<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.types.insert(name.to_string(), Arc::new(predicate));
    }

    /// Register or replace the coercion for a type name.
    pub fn add_type_coercion<F>(&mut self, type_name: &str, coerce: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.coercions.insert(type_name.to_string(), Arc::new(coerce));
    }

    /// Register or replace a keyword validator.
    pub fn add_check<F>(&mut self, keyword: &str, check: F)
    where
        F: Fn(&CheckContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.checks.insert(keyword.to_string(), Arc::new(check));
    }

    /// Register or replace a format predicate.
    pub fn add_format<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.to_string(), Arc::new(predicate));
    }

    /// A registered document. The fragment of `id`, if any, is ignored.
    pub fn schema(&self, id: &str) -> Option<&Value> {
        self.registry.lookup(normalize_id(id))
    }

    /// True when a document is registered under `id`.
    pub fn contains_schema(&self, id: &str) -> bool {
        self.schema(id).is_some()
    }

    /// Registered identifiers, sorted.
    pub fn schema_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve a `$ref` string against the registry, relative to `stack`.
    pub fn resolve_ref<'s>(
        &'s self,
        stack: Option<&SchemaStack<'s>>,
        uri: &str,
    ) -> Option<SchemaStack<'s>> {
        resolver::resolve(&self.registry, stack, uri)
    }

    /// Options used for every field a call does not override.
    pub fn default_options(&self) -> &Options {
        &self.default_options
    }

    /// Replace the default options.
    pub fn set_default_options(&mut self, options: Options) {
        self.default_options = options;
    }

    /// Validate `value` with the default options.
    pub fn validate<'a>(
        &self,
        schema: impl Into<SchemaRef<'a>>,
        value: &mut Value,
    ) -> Result<Option<ErrorTree>, ValtreeError> {
        self.validate_with(schema, value, &PartialOptions::default())
    }

    /// Validate `value`, applying `overrides` over the default options.
    ///
    /// Returns `Ok(None)` when the value is valid and `Ok(Some(tree))`
    /// describing every violation otherwise. Mutating options write into
    /// `value` in place. An unresolvable schema name is an error.
    pub fn validate_with<'a>(
        &self,
        schema: impl Into<SchemaRef<'a>>,
        value: &mut Value,
        overrides: &PartialOptions,
    ) -> Result<Option<ErrorTree>, ValtreeError> {
        let options = overrides.resolve(&self.default_options);
        let schema = schema.into();
        let schemas = match schema {
            SchemaRef::Named(name) => self
                .resolve_ref(None, name)
                .ok_or_else(|| ValtreeError::SchemaNotFound(name.to_string()))?,
            SchemaRef::Inline(inline) => SchemaStack::new(inline),
        };

        let mut values = ValueStack::new(value);
        let mut errors = Engine::new(self).check(&schemas, &mut values, &options);
        if options.use_legacy_validation {
            errors = errors.map(ErrorTree::into_unwrapped);
        }

        tracing::debug!(
            schema = %schema_label(&schema),
            valid = errors.is_none(),
            "validation finished"
        );
        Ok(errors)
    }

    pub(crate) fn type_matches(&self, name: &str, value: &Value) -> bool {
        if let Some(predicate) = self.types.get(name) {
            return predicate(value);
        }
        name.parse::<PrimitiveType>()
            .is_ok_and(|ty| ty.matches(value))
    }

    pub(crate) fn coercion(&self, type_name: &str) -> Option<&CoerceFn> {
        self.coercions.get(type_name)
    }

    pub(crate) fn format_matches(&self, name: &str, value: &Value) -> bool {
        if let Some(predicate) = self.formats.get(name) {
            return predicate(value);
        }
        name.parse::<Format>()
            .is_ok_and(|format| format.matches(value))
    }

    pub(crate) fn check_fn(&self, keyword: &str) -> Option<&CheckFn> {
        self.checks.get(keyword)
    }

    pub(crate) fn patterns(&self) -> &PatternCache {
        &self.patterns
    }
}

fn schema_label<'a>(schema: &SchemaRef<'a>) -> &'a str {
    match *schema {
        SchemaRef::Named(name) => name,
        SchemaRef::Inline(inline) => SchemaNode::new(inline).id().unwrap_or("<inline>"),
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut checks: Vec<&String> = self.checks.keys().collect();
        checks.sort_unstable();
        let mut formats: Vec<&String> = self.formats.keys().collect();
        formats.sort_unstable();
        let mut types: Vec<&String> = self.types.keys().collect();
        types.sort_unstable();
        let mut coercions: Vec<&String> = self.coercions.keys().collect();
        coercions.sort_unstable();

        f.debug_struct("Environment")
            .field("schemas", &self.schema_ids())
            .field("types", &types)
            .field("coercions", &coercions)
            .field("checks", &checks)
            .field("formats", &formats)
            .field("default_options", &self.default_options)
            .finish()
    }
}
