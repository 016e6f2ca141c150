//! # valtree-cli: Command-Line Front End
//!
//! Provides the `valtree` binary over `valtree-schema`.
//!
//! ```bash
//! valtree validate order.yaml --schema order.json --schema-dir schemas/
//! valtree validate order.json --schema lib://order --config valtree.yaml --use-default --write
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in the subcommand modules; validation logic
//!   stays in `valtree-schema`.
//! - Handlers return `anyhow::Result<u8>`, the process exit code.

pub mod validate;
