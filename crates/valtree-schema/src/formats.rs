//! # Built-in Formats
//!
//! Predicates for the `format` keyword. Formats constrain strings; any
//! other value passes. Unknown format names are rejected by the engine,
//! not here.

use std::net::Ipv6Addr;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ALPHA: Lazy<Regex> = Lazy::new(|| compile(r"^[a-zA-Z]+$"));
static ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| compile(r"^[a-zA-Z0-9]+$"));
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| compile(r"^[-_a-zA-Z0-9]+$"));
static HEXADECIMAL: Lazy<Regex> = Lazy::new(|| compile(r"^[a-fA-F0-9]+$"));
static NUMERIC: Lazy<Regex> = Lazy::new(|| compile(r"^[0-9]+$"));
static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"^([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])(\.([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]{0,61}[a-zA-Z0-9]))*$",
    )
});
static URI: Lazy<Regex> = Lazy::new(|| {
    compile(r"[-a-zA-Z0-9@:%_+.~#?&/=]{2,256}\.[a-z]{2,4}\b(/[-a-zA-Z0-9@:%_+.~#?&/=]*)?")
});
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"^(?:[\w!#$%&'*+\-/=?^`{|}~]+\.)*[\w!#$%&'*+\-/=?^`{|}~]+@",
        r"(?:(?:(?:[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)",
        r"|(?:\[(?:(?:[01]?\d{1,2}|2[0-4]\d|25[0-5])\.){3}(?:[01]?\d{1,2}|2[0-4]\d|25[0-5])\]))$",
    ))
});
static PHONE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?:\+\d{1,3}|0\d{1,3}|00\d{1,2})?(?:\s?\(\d+\))?(?:[-/\s.]|\d)+$")
});
static IPV4: Lazy<Regex> = Lazy::new(|| compile(r"^(\d?\d?\d)\.(\d?\d?\d)\.(\d?\d?\d)\.(\d?\d?\d)$"));

fn compile(pattern: &str) -> Regex {
    // Built-in patterns are constants covered by the tests below.
    Regex::new(pattern).unwrap_or_else(|e| panic!("built-in format pattern is invalid: {e}"))
}

/// Built-in `format` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// ASCII letters only.
    Alpha,
    /// ASCII letters and digits.
    Alphanumeric,
    /// ASCII letters, digits, `-` and `_`.
    Identifier,
    /// Hex digits.
    Hexadecimal,
    /// Decimal digits.
    Numeric,
    /// A date or date-time that parses as RFC 3339, RFC 2822, or
    /// `YYYY-MM-DD[( |T)HH:MM:SS]`. Slash-separated dates are rejected.
    DateTime,
    /// Unchanged by upper-casing.
    Uppercase,
    /// Unchanged by lower-casing.
    Lowercase,
    /// DNS host name.
    Hostname,
    /// Contains something that looks like a web address.
    Uri,
    /// E-mail address.
    Email,
    /// Phone number in common European and US notations.
    Phone,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// IPv6 address.
    Ipv6,
    /// A regular expression that compiles.
    Regex,
}

impl Format {
    /// All built-in formats.
    pub const ALL: [Format; 15] = [
        Format::Alpha,
        Format::Alphanumeric,
        Format::Identifier,
        Format::Hexadecimal,
        Format::Numeric,
        Format::DateTime,
        Format::Uppercase,
        Format::Lowercase,
        Format::Hostname,
        Format::Uri,
        Format::Email,
        Format::Phone,
        Format::Ipv4,
        Format::Ipv6,
        Format::Regex,
    ];

    /// The name used in schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Alpha => "alpha",
            Format::Alphanumeric => "alphanumeric",
            Format::Identifier => "identifier",
            Format::Hexadecimal => "hexadecimal",
            Format::Numeric => "numeric",
            Format::DateTime => "date-time",
            Format::Uppercase => "uppercase",
            Format::Lowercase => "lowercase",
            Format::Hostname => "hostname",
            Format::Uri => "uri",
            Format::Email => "email",
            Format::Phone => "phone",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Regex => "regex",
        }
    }

    /// True when `value` satisfies the format.
    pub fn matches(&self, value: &Value) -> bool {
        match value {
            Value::String(text) => self.matches_str(text),
            _ => true,
        }
    }

    fn matches_str(&self, text: &str) -> bool {
        match self {
            Format::Alpha => ALPHA.is_match(text),
            Format::Alphanumeric => ALPHANUMERIC.is_match(text),
            Format::Identifier => IDENTIFIER.is_match(text),
            Format::Hexadecimal => HEXADECIMAL.is_match(text),
            Format::Numeric => NUMERIC.is_match(text),
            Format::DateTime => is_date_time(text),
            Format::Uppercase => text == text.to_uppercase(),
            Format::Lowercase => text == text.to_lowercase(),
            Format::Hostname => text.len() < 256 && HOSTNAME.is_match(text),
            Format::Uri => URI.is_match(text),
            Format::Email => EMAIL.is_match(text),
            Format::Phone => PHONE.is_match(text),
            Format::Ipv4 => is_ipv4(text),
            Format::Ipv6 => Ipv6Addr::from_str(text).is_ok(),
            Format::Regex => Regex::new(text).is_ok(),
        }
    }
}

impl FromStr for Format {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|format| format.as_str() == name)
            .ok_or(())
    }
}

fn is_date_time(text: &str) -> bool {
    if text.contains('/') {
        return false;
    }
    DateTime::parse_from_rfc3339(text).is_ok()
        || DateTime::parse_from_rfc2822(text).is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

fn is_ipv4(text: &str) -> bool {
    IPV4.captures(text).is_some_and(|caps| {
        caps.iter()
            .skip(1)
            .flatten()
            .all(|octet| octet.as_str().parse::<u16>().is_ok_and(|n| n <= 255))
    })
}
