//! # Pattern Cache
//!
//! `pattern` and `patternProperties` compile their regular expressions on
//! first use and keep them for the life of the [`Environment`](crate::Environment).
//! A pattern that does not compile is cached as a permanent non-match and
//! logged once at `warn` level.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;

/// Compiled regular expressions keyed by source and flags.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RwLock<HashMap<String, Option<Arc<Regex>>>>,
}

impl PatternCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled form of `pattern` with the given flag letters. Flags
    /// `i`, `m` and `s` are honoured; any other letter is ignored.
    pub fn get(&self, pattern: &str, flags: &str) -> Option<Arc<Regex>> {
        let source = with_inline_flags(pattern, flags);
        if let Some(entry) = self.compiled.read().get(&source) {
            return entry.clone();
        }

        let compiled = match Regex::new(&source) {
            Ok(regex) => Some(Arc::new(regex)),
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "pattern does not compile");
                None
            }
        };
        self.compiled.write().insert(source, compiled.clone());
        compiled
    }

    /// True when `pattern` matches anywhere in `text`. Invalid patterns
    /// never match.
    pub fn is_match(&self, pattern: &str, flags: &str, text: &str) -> bool {
        self.get(pattern, flags)
            .is_some_and(|regex| regex.is_match(text))
    }

    /// Number of distinct patterns seen.
    pub fn len(&self) -> usize {
        self.compiled.read().len()
    }

    /// True when no pattern has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.compiled.read().is_empty()
    }
}

fn with_inline_flags(pattern: &str, flags: &str) -> String {
    let mut inline: Vec<char> = flags
        .chars()
        .filter(|flag| matches!(flag, 'i' | 'm' | 's'))
        .collect();
    inline.sort_unstable();
    inline.dedup();
    if inline.is_empty() {
        pattern.to_string()
    } else {
        let letters: String = inline.into_iter().collect();
        format!("(?{letters}){pattern}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_anywhere() {
        let cache = PatternCache::new();
        assert!(cache.is_match("ale$", "", "male"));
        assert!(!cache.is_match("ale$", "", "girl"));
        assert!(cache.is_match("b", "", "abc"));
    }

    #[test]
    fn test_flags() {
        let cache = PatternCache::new();
        assert!(!cache.is_match("^abc$", "", "ABC"));
        assert!(cache.is_match("^abc$", "i", "ABC"));
        assert!(cache.is_match("^b$", "m", "a\nb\nc"));
        assert!(cache.is_match("^abc$", "gi", "ABC"), "unknown flags are ignored");
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        let cache = PatternCache::new();
        assert!(!cache.is_match("(unclosed", "", "(unclosed"));
        assert!(cache.get("(unclosed", "").is_none());
    }

    #[test]
    fn test_compiles_once() {
        let cache = PatternCache::new();
        assert!(cache.is_empty());
        cache.is_match("^a", "", "abc");
        cache.is_match("^a", "", "xyz");
        cache.is_match("^a", "i", "ABC");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_inline_flag_order_is_canonical() {
        assert_eq!(with_inline_flags("x", "si"), "(?is)x");
        assert_eq!(with_inline_flags("x", "ii"), "(?i)x");
        assert_eq!(with_inline_flags("x", ""), "x");
    }
}
