//! # Value Stacks
//!
//! A [`ValueStack`] locates the value currently being validated inside the
//! caller's document. It holds an exclusive borrow of the document root and
//! an ordered list of frame keys, one per level of descent. Frame 0 is the
//! synthetic root frame keyed `__root__`; the container of frame `i` is the
//! value reached by following frames `1..i` from the root.
//!
//! Frames never own the values they point at. Reading the current value
//! walks the frame keys from the root, and writing replaces the value at
//! the last key in place, so coercions and defaults land directly in the
//! caller's document.
//!
//! [`ValueView`] is the shared-borrow counterpart handed to keyword
//! validators and to the `$data` resolver.

use std::fmt;

use serde_json::Value;

/// Key of the synthetic root frame.
pub const ROOT_KEY: &str = "__root__";

pub(crate) static NULL: Value = Value::Null;

/// The key a frame uses to address its value inside the parent container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Object field name.
    Field(String),
    /// Array position.
    Index(usize),
}

impl Key {
    /// The key as a JSON value: a string for fields, a number for indices.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Field(name) => Value::String(name.clone()),
            Key::Index(index) => Value::from(*index),
        }
    }

    /// The key rendered as an error-tree entry name.
    pub fn to_entry(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Field(name) => f.write_str(name),
            Key::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Field(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Field(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// Look up a key in a container. Field keys address array positions when
/// they parse as an index, matching JSON pointer semantics.
pub fn child<'a>(container: &'a Value, key: &Key) -> Option<&'a Value> {
    match (container, key) {
        (Value::Object(map), Key::Field(name)) => map.get(name),
        (Value::Array(items), Key::Index(index)) => items.get(*index),
        (Value::Array(items), Key::Field(name)) => {
            name.parse::<usize>().ok().and_then(|index| items.get(index))
        }
        _ => None,
    }
}

fn child_mut<'a>(container: &'a mut Value, key: &Key) -> Option<&'a mut Value> {
    match (container, key) {
        (Value::Object(map), Key::Field(name)) => map.get_mut(name),
        (Value::Array(items), Key::Index(index)) => items.get_mut(*index),
        (Value::Array(items), Key::Field(name)) => match name.parse::<usize>() {
            Ok(index) => items.get_mut(index),
            Err(_) => None,
        },
        _ => None,
    }
}

fn descend<'a>(root: &'a Value, frames: &[Key]) -> Option<&'a Value> {
    frames
        .iter()
        .skip(1)
        .try_fold(root, |value, key| child(value, key))
}

/// Mutable path from the document root to the value under validation.
#[derive(Debug)]
pub struct ValueStack<'v> {
    root: &'v mut Value,
    frames: Vec<Key>,
}

impl<'v> ValueStack<'v> {
    /// Start a stack at the root of a document.
    pub fn new(root: &'v mut Value) -> Self {
        Self {
            root,
            frames: vec![Key::Field(ROOT_KEY.to_string())],
        }
    }

    pub(crate) fn from_parts(root: &'v mut Value, frames: Vec<Key>) -> Self {
        Self { root, frames }
    }

    /// Number of frames, including the synthetic root frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// All frame keys, root first.
    pub fn frames(&self) -> &[Key] {
        &self.frames
    }

    /// Key of the deepest frame.
    pub fn key(&self) -> &Key {
        // frames always holds the root frame
        &self.frames[self.frames.len() - 1]
    }

    /// The whole document.
    pub fn root(&self) -> &Value {
        &*self.root
    }

    /// The value under validation. A frame whose key no longer exists in
    /// its container reads as `null`.
    pub fn current(&self) -> &Value {
        descend(&*self.root, &self.frames).unwrap_or(&NULL)
    }

    /// Mutable access to the value under validation.
    pub fn current_mut(&mut self) -> Option<&mut Value> {
        let mut value: &mut Value = &mut *self.root;
        for key in &self.frames[1..] {
            value = child_mut(value, key)?;
        }
        Some(value)
    }

    /// Replace the value under validation, returning the previous value.
    /// Returns `None` and leaves the document untouched when the frame
    /// path no longer exists.
    pub fn replace_current(&mut self, value: Value) -> Option<Value> {
        self.current_mut()
            .map(|slot| std::mem::replace(slot, value))
    }

    /// Move the value under validation out of the document, leaving `null`.
    pub fn take_current(&mut self) -> Option<Value> {
        self.current_mut().map(std::mem::take)
    }

    /// Descend one level.
    pub fn push(&mut self, key: impl Into<Key>) {
        self.frames.push(key.into());
    }

    /// Return to the parent frame. The root frame is never removed.
    pub fn pop(&mut self) -> Option<Key> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Shared view of the same path.
    pub fn view(&self) -> ValueView<'_> {
        ValueView {
            root: &*self.root,
            frames: &self.frames,
        }
    }
}

/// Read-only path from the document root to the value under validation.
#[derive(Debug, Clone, Copy)]
pub struct ValueView<'a> {
    root: &'a Value,
    frames: &'a [Key],
}

impl<'a> ValueView<'a> {
    /// Build a view over a document and a frame path. `frames` must start
    /// with the root frame.
    pub fn new(root: &'a Value, frames: &'a [Key]) -> Self {
        Self { root, frames }
    }

    /// Number of frames, including the synthetic root frame.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// All frame keys, root first.
    pub fn frames(&self) -> &'a [Key] {
        self.frames
    }

    /// The whole document.
    pub fn root(&self) -> &'a Value {
        &*self.root
    }

    /// Key of frame `index`.
    pub fn frame_key(&self, index: usize) -> Option<&'a Key> {
        self.frames.get(index)
    }

    /// Value addressed by frame `index`.
    pub fn frame_value(&self, index: usize) -> Option<&'a Value> {
        if index >= self.frames.len() {
            return None;
        }
        descend(self.root, &self.frames[..=index])
    }

    /// The value under validation.
    pub fn current(&self) -> &'a Value {
        descend(self.root, self.frames).unwrap_or(&NULL)
    }
}
