//! Typed access to node fields.
//!
//! Each node variant declares its fields in a fixed order. Walking a node's
//! fields through a `FieldVisitor` is how child iteration, the tree walker
//! and the binary serializer see every variant without a hand-written match
//! per consumer.

use crate::flags::{CallFlags, RangeFlags, RegexFlags, StringFlags};
use crate::node::Node;
use crate::token::Token;

/// Receives the fields of one node, in declaration order.
pub trait FieldVisitor<'a> {
    fn visit_node(&mut self, node: &'a Node<'a>);

    fn visit_optional_node(&mut self, node: Option<&'a Node<'a>>) {
        if let Some(node) = node {
            self.visit_node(node);
        }
    }

    fn visit_node_list(&mut self, nodes: &'a [Node<'a>]) {
        for node in nodes {
            self.visit_node(node);
        }
    }

    fn visit_token(&mut self, _token: Token) {}

    fn visit_optional_token(&mut self, token: Option<Token>) {
        if let Some(token) = token {
            self.visit_token(token);
        }
    }

    fn visit_token_list(&mut self, tokens: &'a [Token]) {
        for token in tokens {
            self.visit_token(*token);
        }
    }

    /// Owned, unescaped literal contents.
    fn visit_bytes(&mut self, _bytes: &'a [u8]) {}

    /// A resolved name such as a method or variable name.
    fn visit_name(&mut self, _name: &'a str) {}

    /// The local variable table of a scope-introducing node.
    fn visit_locals(&mut self, _locals: &'a [&'a str]) {}

    fn visit_integer(&mut self, _value: u32) {}

    fn visit_flags(&mut self, _bits: u32) {}
}

/// A value that can appear as a node field.
pub trait Field<'a> {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V);
}

impl<'a> Field<'a> for &'a Node<'a> {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_node(*self)
    }
}

impl<'a> Field<'a> for Option<&'a Node<'a>> {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_optional_node(*self)
    }
}

impl<'a> Field<'a> for &'a [Node<'a>] {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_node_list(*self)
    }
}

impl<'a> Field<'a> for Token {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_token(*self)
    }
}

impl<'a> Field<'a> for Option<Token> {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_optional_token(*self)
    }
}

impl<'a> Field<'a> for &'a [Token] {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_token_list(*self)
    }
}

impl<'a> Field<'a> for &'a [u8] {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_bytes(*self)
    }
}

impl<'a> Field<'a> for &'a str {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_name(*self)
    }
}

impl<'a> Field<'a> for &'a [&'a str] {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_locals(*self)
    }
}

impl<'a> Field<'a> for u32 {
    fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_integer(*self)
    }
}

macro_rules! flags_field {
    ($($flags:ty),*) => {
        $(
            impl<'a> Field<'a> for $flags {
                fn accept<V: FieldVisitor<'a> + ?Sized>(&self, visitor: &mut V) {
                    visitor.visit_flags(self.bits())
                }
            }
        )*
    };
}

flags_field!(CallFlags, RegexFlags, StringFlags, RangeFlags);
