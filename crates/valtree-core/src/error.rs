//! # Error Types
//!
//! Fatal conditions raised by valtree. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Validation findings are never errors. A document that violates its
//!   schema produces an [`ErrorTree`](crate::ErrorTree) value.
//! - `ValtreeError` is reserved for configuration mistakes: an unknown
//!   schema name, a schema that cannot be registered, or a file that
//!   cannot be loaded.

use thiserror::Error;

/// Top-level error type for valtree.
#[derive(Error, Debug)]
pub enum ValtreeError {
    /// Validation was requested against a schema reference that does not
    /// resolve in the registry.
    #[error("could not find schema '{0}'")]
    SchemaNotFound(String),

    /// A schema was registered with neither a name nor an `id`.
    #[error("schema needs either a name or an id attribute")]
    MissingIdentifier,

    /// A schema `id` starting with `/` was registered.
    #[error("schema id '{0}' is invalid: ids starting with '/' are not allowed")]
    InvalidIdentifier(String),

    /// A schema file could not be parsed or registered.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoad {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// A document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// An environment configuration file is malformed.
    #[error("configuration error in '{path}': {reason}")]
    Config {
        /// Path to the configuration file.
        path: String,
        /// Reason the configuration was rejected.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
