//! # `$data` References
//!
//! Resolves a `$data` reference string against the frames of a
//! [`ValueView`], so a keyword parameter can be read from the document
//! being validated instead of the schema.
//!
//! ## Reference forms
//!
//! - `N`: leading decimal digits skip `N` frames up from the deepest
//!   frame. `0` is the value under validation, `1` its container.
//! - `N#`: the key of the selected frame instead of its value.
//! - `N/a/b`: a JSON pointer descended from the selected frame, with
//!   `~1` and `~0` unescaped per segment.
//! - `/a/b`: with no digit prefix the pointer starts at the document root.
//!
//! Anything else, an out-of-range skip, or a missing segment resolves to
//! `None`.

use std::borrow::Cow;

use serde_json::Value;

use crate::stack::{child, Key, ValueView};

/// Resolve a `$data` reference.
pub fn resolve_data<'a>(view: &ValueView<'a>, reference: &str) -> Option<Cow<'a, Value>> {
    let digits = reference.bytes().take_while(u8::is_ascii_digit).count();
    let (frame, rest) = if digits > 0 {
        let skip: usize = reference[..digits].parse().ok()?;
        let last = view.depth().checked_sub(1)?;
        if skip > last {
            return None;
        }
        let frame = last - skip;
        let rest = &reference[digits..];
        if rest == "#" {
            return view.frame_key(frame).map(|key| Cow::Owned(key.to_value()));
        }
        (frame, rest)
    } else {
        (0, reference)
    };

    let value = view.frame_value(frame)?;
    if rest.is_empty() {
        return Some(Cow::Borrowed(value));
    }

    let path = rest.strip_prefix('/')?;
    path.split('/')
        .try_fold(value, |value, segment| {
            child(value, &Key::Field(unescape_segment(segment)))
        })
        .map(Cow::Borrowed)
}

/// Undo JSON pointer escaping for one segment.
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Apply JSON pointer escaping to one segment.
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
