//! # valtree-core: Value-Side Foundations
//!
//! Types shared by the validation engine and its callers that know nothing
//! about schemas:
//!
//! - [`ValueStack`] / [`ValueView`]: the path from the caller's document
//!   root to the value under validation, used to read and write values in
//!   place.
//! - [`resolve_data`]: resolution of `$data` references against a value
//!   stack, for keyword parameters that come from the document itself.
//! - [`Snapshot`]: disposable deep copies for speculative validation of
//!   combinator branches.
//! - [`ErrorTree`]: the field-shaped validation result.
//! - [`json_eq`]: numeric-aware JSON equality.
//! - [`ValtreeError`]: fatal configuration errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `valtree-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod equality;
pub mod error;
pub mod pointer;
pub mod snapshot;
pub mod stack;
pub mod tree;

pub use equality::json_eq;
pub use error::ValtreeError;
pub use pointer::{escape_segment, resolve_data, unescape_segment};
pub use snapshot::Snapshot;
pub use stack::{Key, ValueStack, ValueView, ROOT_KEY};
pub use tree::{ErrorNode, ErrorTree, Violation, ENVELOPE_KEY};
