//! Tree traversal.
//!
//! `AstVisitor` is the customizable walker: override `visit_node` to act on
//! each node and call `walk_children` to descend. `for_each_child` is the
//! plain iteration form for callers that only need the direct children.

use crate::field::FieldVisitor;
use crate::node::{Node, NodeKind};

/// A visitor over the syntax tree. The default implementation visits every
/// node in pre-order.
pub trait AstVisitor<'a> {
    fn visit_node(&mut self, node: &'a Node<'a>) {
        walk_children(self, node);
    }
}

/// Visit each direct child of `node` with `visitor`.
pub fn walk_children<'a, V: AstVisitor<'a> + ?Sized>(visitor: &mut V, node: &'a Node<'a>) {
    struct Walker<'v, V: ?Sized> {
        visitor: &'v mut V,
    }

    impl<'a, 'v, V: AstVisitor<'a> + ?Sized> FieldVisitor<'a> for Walker<'v, V> {
        fn visit_node(&mut self, node: &'a Node<'a>) {
            self.visitor.visit_node(node);
        }
    }

    node.for_each_field(&mut Walker { visitor });
}

/// Call `f` for each direct child of `node`, in field order.
pub fn for_each_child<'a, F: FnMut(&'a Node<'a>)>(node: &'a Node<'a>, f: F) {
    struct Each<F> {
        f: F,
    }

    impl<'a, F: FnMut(&'a Node<'a>)> FieldVisitor<'a> for Each<F> {
        fn visit_node(&mut self, node: &'a Node<'a>) {
            (self.f)(node);
        }
    }

    node.for_each_field(&mut Each { f });
}

/// Collects the kinds of every node in pre-order. Handy for tests and dumps.
#[derive(Debug, Default)]
pub struct KindCollector {
    pub kinds: Vec<NodeKind>,
}

impl<'a> AstVisitor<'a> for KindCollector {
    fn visit_node(&mut self, node: &'a Node<'a>) {
        self.kinds.push(node.kind());
        walk_children(self, node);
    }
}

/// Count every node in the tree rooted at `node`, including `node` itself.
pub fn count_nodes<'a>(node: &'a Node<'a>) -> usize {
    struct Counter(usize);

    impl<'a> AstVisitor<'a> for Counter {
        fn visit_node(&mut self, node: &'a Node<'a>) {
            self.0 += 1;
            walk_children(self, node);
        }
    }

    let mut counter = Counter(0);
    counter.visit_node(node);
    counter.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Token, TokenKind};
    use rbparse_core::text::Location;

    #[test]
    fn test_pre_order_walk() {
        let one = Node::Integer { location: Location::new(0, 1) };
        let two = Node::Integer { location: Location::new(4, 5) };
        let list = [one, two];
        let statements = Node::Statements {
            location: Location::new(0, 5),
            body: &list,
        };
        let program = Node::Program {
            location: Location::new(0, 5),
            locals: &[],
            statements: &statements,
        };

        let mut collector = KindCollector::default();
        collector.visit_node(&program);
        assert_eq!(
            collector.kinds,
            vec![NodeKind::Program, NodeKind::Statements, NodeKind::Integer, NodeKind::Integer]
        );
        assert_eq!(count_nodes(&program), 4);
    }

    #[test]
    fn test_for_each_child_skips_absent_fields() {
        let value = Node::Nil { location: Location::new(7, 10) };
        let node = Node::Return {
            location: Location::new(0, 10),
            keyword: Token::new(TokenKind::KeywordReturn, 0, 6),
            arguments: None,
        };
        let mut seen = 0;
        for_each_child(&node, |_| seen += 1);
        assert_eq!(seen, 0);

        let splat = Node::Splat {
            location: Location::new(6, 10),
            operator: Token::new(TokenKind::UStar, 6, 7),
            expression: Some(&value),
        };
        let mut locations = Vec::new();
        for_each_child(&splat, |child| locations.push(child.location()));
        assert_eq!(locations, vec![Location::new(7, 10)]);
    }
}
