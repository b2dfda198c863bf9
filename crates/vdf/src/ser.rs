//! Serializer emitting the same grammar the parser accepts.

use std::collections::BTreeMap;

use crate::VdfNode;

/// Serializes a node tree back into KeyValues text.
///
/// Output uses tab indentation and LF line endings. Feeding the output back
/// through [`crate::parse`] yields an equal tree.
pub fn serialize(node: &VdfNode) -> String {
    let mut out = String::new();
    match node {
        VdfNode::Value(v) => {
            push_quoted(&mut out, v);
            out.push('\n');
        }
        VdfNode::Block(map) => write_block_body(&mut out, map, 0),
    }
    out
}

fn write_block_body(out: &mut String, map: &BTreeMap<String, VdfNode>, depth: usize) {
    for (key, node) in map {
        indent(out, depth);
        push_quoted(out, key);
        match node {
            VdfNode::Value(v) => {
                out.push_str("\t\t");
                push_quoted(out, v);
                out.push('\n');
            }
            VdfNode::Block(inner) => {
                out.push('\n');
                indent(out, depth);
                out.push_str("{\n");
                write_block_body(out, inner, depth + 1);
                indent(out, depth);
                out.push_str("}\n");
            }
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}
