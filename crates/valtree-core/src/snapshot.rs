//! # Speculative Snapshots
//!
//! Combinator branches that may mutate the document (defaulting, coercion,
//! stripping of additional fields) are validated against a [`Snapshot`]: a
//! deep copy of the document taken together with the current frame path.
//! The copy is disposable. When a branch is accepted, only the value at the
//! snapshot's frame path is moved back into the real document with
//! [`Snapshot::commit`], so a rejected branch never leaves side effects.

use serde_json::Value;

use crate::stack::{child, Key, ValueStack, NULL};

/// A disposable deep copy of a document and a frame path into it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    root: Value,
    frames: Vec<Key>,
}

impl Snapshot {
    /// Deep-copy the document behind `stack` and remember its frame path.
    pub fn capture(stack: &ValueStack<'_>) -> Self {
        Self {
            root: stack.root().clone(),
            frames: stack.frames().to_vec(),
        }
    }

    /// A value stack over the copy, positioned at the captured frame.
    pub fn stack(&mut self) -> ValueStack<'_> {
        ValueStack::from_parts(&mut self.root, self.frames.clone())
    }

    /// The copied value at the captured frame.
    pub fn current(&self) -> &Value {
        self.frames
            .iter()
            .skip(1)
            .try_fold(&self.root, |value, key| child(value, key))
            .unwrap_or(&NULL)
    }

    /// Move the copied value at the captured frame out of the snapshot.
    pub fn into_current(mut self) -> Value {
        let frames = std::mem::take(&mut self.frames);
        let mut stack = ValueStack::from_parts(&mut self.root, frames);
        stack.take_current().unwrap_or(Value::Null)
    }

    /// Write the copied value at the captured frame into `target`, which
    /// must be positioned at the same frame path. Returns `false` when the
    /// target path does not exist.
    pub fn commit(self, target: &mut ValueStack<'_>) -> bool {
        debug_assert_eq!(self.frames.as_slice(), target.frames());
        let leaf = self.into_current();
        target.replace_current(leaf).is_some()
    }
}
