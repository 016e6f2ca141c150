//! # Validation Options
//!
//! [`Options`] is the fully resolved option set an engine run uses.
//! [`PartialOptions`] is what callers and configuration files supply: any
//! field left unset inherits from the [`Environment`](crate::Environment)'s
//! default options.
//!
//! Both use the camelCase field names (`useDefault`, `useCoerce`,
//! `checkRequired`, `removeAdditional`, `useLegacyValidation`) when
//! serialized.

use serde::{Deserialize, Serialize};

/// Resolved validation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Substitute declared defaults for missing or empty values.
    pub use_default: bool,
    /// Apply registered type coercions before type checks.
    pub use_coerce: bool,
    /// Enforce the `required` keyword.
    pub check_required: bool,
    /// Delete properties not covered by `properties` / `patternProperties`
    /// unless `additionalProperties` allows them.
    pub remove_additional: bool,
    /// Wrap structural violations of an object or array in a `schema`
    /// envelope instead of reporting them at the node's own level.
    pub use_legacy_validation: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_default: false,
            use_coerce: false,
            check_required: true,
            remove_additional: false,
            use_legacy_validation: false,
        }
    }
}

impl Options {
    /// True when validation may write into the document. Combinator
    /// branches are then probed against snapshots.
    pub fn mutates(&self) -> bool {
        self.use_default || self.use_coerce || self.remove_additional
    }
}

/// Per-call option overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialOptions {
    /// Override for [`Options::use_default`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_default: Option<bool>,
    /// Override for [`Options::use_coerce`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_coerce: Option<bool>,
    /// Override for [`Options::check_required`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_required: Option<bool>,
    /// Override for [`Options::remove_additional`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_additional: Option<bool>,
    /// Override for [`Options::use_legacy_validation`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_legacy_validation: Option<bool>,
}

impl PartialOptions {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `useDefault`.
    pub fn use_default(mut self, enabled: bool) -> Self {
        self.use_default = Some(enabled);
        self
    }

    /// Set `useCoerce`.
    pub fn use_coerce(mut self, enabled: bool) -> Self {
        self.use_coerce = Some(enabled);
        self
    }

    /// Set `checkRequired`.
    pub fn check_required(mut self, enabled: bool) -> Self {
        self.check_required = Some(enabled);
        self
    }

    /// Set `removeAdditional`.
    pub fn remove_additional(mut self, enabled: bool) -> Self {
        self.remove_additional = Some(enabled);
        self
    }

    /// Set `useLegacyValidation`.
    pub fn use_legacy_validation(mut self, enabled: bool) -> Self {
        self.use_legacy_validation = Some(enabled);
        self
    }

    /// Fill every unset field from `base`.
    pub fn resolve(&self, base: &Options) -> Options {
        Options {
            use_default: self.use_default.unwrap_or(base.use_default),
            use_coerce: self.use_coerce.unwrap_or(base.use_coerce),
            check_required: self.check_required.unwrap_or(base.check_required),
            remove_additional: self.remove_additional.unwrap_or(base.remove_additional),
            use_legacy_validation: self
                .use_legacy_validation
                .unwrap_or(base.use_legacy_validation),
        }
    }
}
