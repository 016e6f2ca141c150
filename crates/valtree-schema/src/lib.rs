//! # valtree-schema: Schema Resolution and Validation
//!
//! Validates `serde_json::Value` documents against JSON-Schema-style
//! schema documents and reports violations as an
//! [`ErrorTree`](valtree_core::ErrorTree) shaped like the document.
//!
//! ```
//! use serde_json::json;
//! use valtree_schema::Environment;
//!
//! let mut env = Environment::new();
//! env.add_schema_as("user", json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}},
//!     "required": ["name"]
//! })).unwrap();
//!
//! let errors = env.validate("user", &mut json!({})).unwrap().unwrap();
//! assert_eq!(errors.to_value(), json!({"name": {"required": true}}));
//! ```
//!
//! ## Modules
//!
//! - [`environment`]: the registry and extension tables, and the
//!   `validate` entry points.
//! - [`engine`]: the recursive checker, including speculative evaluation
//!   of `oneOf`/`anyOf`/`not` branches when validation may mutate.
//! - [`resolver`]: `$ref` resolution into [`SchemaStack`]s.
//! - [`node`]: typed accessors over a schema fragment.
//! - [`keywords`], [`formats`], [`types`]: built-in tables.
//! - [`loader`], [`config`]: reading schema directories and environment
//!   configuration files.
//!
//! ## Crate Policy
//!
//! - Depends only on `valtree-core` internally.
//! - Validation findings are returned as data; `ValtreeError` is reserved
//!   for configuration mistakes.
//! - No panics on caller data. The one exception is compiling the
//!   built-in format regexes in `formats`, which are constants checked by
//!   that module's tests.
//! - No `unsafe` code.

pub mod config;
pub mod engine;
pub mod environment;
pub mod formats;
pub mod keywords;
pub mod loader;
pub mod node;
pub mod options;
pub mod patterns;
pub mod resolver;
pub mod types;

pub use config::EnvironmentConfig;
pub use engine::Engine;
pub use environment::{CheckFn, CoerceFn, Environment, FormatFn, SchemaRef, TypeFn};
pub use formats::Format;
pub use keywords::{CheckContext, Keyword};
pub use loader::{load_document, yaml_to_json_value};
pub use node::{SchemaNode, RESERVED_KEYWORDS};
pub use options::{Options, PartialOptions};
pub use patterns::PatternCache;
pub use resolver::{normalize_id, resolve, SchemaLookup, SchemaStack};
pub use types::PrimitiveType;
