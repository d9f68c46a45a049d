//! Writing a tree into the binary format.

use crate::header::{MAGIC, VERSION};
use rbparse_ast::{FieldVisitor, Node, Token};
use rbparse_core::ensure_sufficient_stack;
use rbparse_core::text::Location;

/// Serialize the tree rooted at `root` into a fresh buffer.
pub fn serialize(root: &Node<'_>) -> Vec<u8> {
    let mut buffer = Vec::new();
    serialize_into(&mut buffer, root);
    buffer
}

/// Append the dump of the tree rooted at `root` to `buffer`.
pub fn serialize_into(buffer: &mut Vec<u8>, root: &Node<'_>) {
    let start = buffer.len();
    buffer.extend_from_slice(MAGIC);
    buffer.extend_from_slice(&[VERSION.major, VERSION.minor, VERSION.patch]);

    let mut writer = Writer { buffer };
    writer.node(root);
    writer.buffer.push(0);

    tracing::trace!(bytes = writer.buffer.len() - start, "serialized tree");
}

struct Writer<'b> {
    buffer: &'b mut Vec<u8>,
}

impl Writer<'_> {
    fn node(&mut self, node: &Node<'_>) {
        self.buffer.push(node.kind().tag());
        self.location(node.location());
        ensure_sufficient_stack(|| node.for_each_field(self));
    }

    fn location(&mut self, location: Location) {
        self.u32(location.start);
        self.u32(location.end - location.start);
    }

    fn u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    fn len(&mut self, len: usize) {
        // Sources are addressed with u32 offsets, so no list can exceed it.
        self.u32(u32::try_from(len).unwrap_or(u32::MAX));
    }

    fn string(&mut self, bytes: &[u8]) {
        self.len(bytes.len());
        self.buffer.extend_from_slice(bytes);
    }
}

impl<'a> FieldVisitor<'a> for Writer<'_> {
    fn visit_node(&mut self, node: &'a Node<'a>) {
        self.node(node);
    }

    fn visit_optional_node(&mut self, node: Option<&'a Node<'a>>) {
        match node {
            Some(node) => self.node(node),
            None => self.buffer.push(0),
        }
    }

    fn visit_node_list(&mut self, nodes: &'a [Node<'a>]) {
        self.len(nodes.len());
        for node in nodes {
            self.node(node);
        }
    }

    fn visit_token(&mut self, token: Token) {
        self.location(token.location);
    }

    fn visit_optional_token(&mut self, token: Option<Token>) {
        match token {
            Some(token) => {
                self.buffer.push(1);
                self.location(token.location);
            }
            None => self.buffer.push(0),
        }
    }

    fn visit_token_list(&mut self, tokens: &'a [Token]) {
        self.len(tokens.len());
        for token in tokens {
            self.location(token.location);
        }
    }

    fn visit_bytes(&mut self, bytes: &'a [u8]) {
        self.string(bytes);
    }

    fn visit_name(&mut self, name: &'a str) {
        self.string(name.as_bytes());
    }

    fn visit_locals(&mut self, locals: &'a [&'a str]) {
        self.len(locals.len());
        for local in locals {
            self.string(local.as_bytes());
        }
    }

    fn visit_integer(&mut self, value: u32) {
        self.u32(value);
    }

    fn visit_flags(&mut self, bits: u32) {
        self.u32(bits);
    }
}
