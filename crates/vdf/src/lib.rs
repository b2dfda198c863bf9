//! Text KeyValues (VDF) parsing for Steam manifest files.
//!
//! Steam describes installed apps and library folders with a nested
//! key/value text format: unordered `"key" "value"` pairs and
//! `"key" { ... }` blocks, double-quote delimited strings with backslash
//! escaping, no comments. This crate parses that format into a string-keyed
//! tree and can serialize a tree back out.
//!
//! Duplicate keys are legal in the wire format; the last occurrence wins.
//! Callers never observe insertion order.

mod parse;
mod ser;

pub use parse::parse;
pub use ser::serialize;

use std::collections::BTreeMap;

/// A parsed KeyValues node: a leaf string value or a nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VdfNode {
    Value(String),
    Block(BTreeMap<String, VdfNode>),
}

impl VdfNode {
    /// Returns the leaf string value, if this node is a value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VdfNode::Value(s) => Some(s),
            VdfNode::Block(_) => None,
        }
    }

    /// Returns the child node for a key, if this node is a block.
    pub fn get(&self, key: &str) -> Option<&VdfNode> {
        match self {
            VdfNode::Block(map) => map.get(key),
            VdfNode::Value(_) => None,
        }
    }

    /// Returns the child's leaf value for a key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Walks a nested key path and returns the node at its end.
    pub fn lookup(&self, path: &[&str]) -> Option<&VdfNode> {
        let mut node = self;
        for key in path {
            node = node.get(key)?;
        }
        Some(node)
    }
}

/// Errors produced while parsing KeyValues text.
///
/// Every variant carries the byte offset in the input where parsing failed;
/// callers that parse files attach the file path themselves.
#[derive(Debug, thiserror::Error)]
pub enum VdfError {
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),

    #[error("unbalanced closing brace at byte {0}")]
    UnbalancedBrace(usize),

    #[error("missing closing brace for block opened at byte {0}")]
    UnclosedBlock(usize),

    #[error("unexpected character {found:?} at byte {offset}")]
    UnexpectedToken { offset: usize, found: char },

    #[error("key {key:?} at byte {offset} has no value")]
    MissingValue { key: String, offset: usize },
}

impl VdfError {
    /// Byte offset in the input where parsing failed.
    pub fn offset(&self) -> usize {
        match self {
            VdfError::UnterminatedString(o)
            | VdfError::UnbalancedBrace(o)
            | VdfError::UnclosedBlock(o) => *o,
            VdfError::UnexpectedToken { offset, .. } => *offset,
            VdfError::MissingValue { offset, .. } => *offset,
        }
    }
}
