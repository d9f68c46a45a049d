//! Assignment: turning parsed expressions into write targets, single and
//! multiple writes, and operator-assignment.

use rbparse_ast::flags::CallFlags;
use rbparse_ast::node::Node;
use rbparse_ast::token::{Token, TokenKind};
use rbparse_diagnostics::messages;

use super::expression::starts_expression;
use super::{join, Parser};
use crate::precedence::BindingPower;

impl<'a> Parser<'a> {
    /// Whether `node` can stand on the left of a multiple assignment.
    pub(super) fn is_target_candidate(&self, node: &Node<'a>) -> bool {
        match node {
            Node::LocalVariableRead { .. }
            | Node::InstanceVariableRead { .. }
            | Node::ClassVariableRead { .. }
            | Node::GlobalVariableRead { .. }
            | Node::ConstantRead { .. }
            | Node::ConstantPath { .. }
            | Node::Splat { .. }
            | Node::MultiTarget { .. } => true,
            Node::Call { .. } => is_variable_call(node) || is_attribute_call(node) || is_index_call(node),
            Node::Parentheses { body: Some(body), .. } => {
                matches!(body.statements_body(), [Node::MultiTarget { .. }])
            }
            _ => false,
        }
    }

    /// Convert an expression to the target it names. Nodes that cannot be
    /// assigned are reported and returned unchanged.
    pub(super) fn to_target(&mut self, node: Node<'a>) -> Node<'a> {
        match node {
            Node::LocalVariableRead { location, name, depth } => Node::LocalVariableTarget { location, name, depth },
            Node::InstanceVariableRead { location, name } => Node::InstanceVariableTarget { location, name },
            Node::ClassVariableRead { location, name } => Node::ClassVariableTarget { location, name },
            Node::GlobalVariableRead { location, name } => Node::GlobalVariableTarget { location, name },
            Node::ConstantRead { location, name } => Node::ConstantTarget { location, name },
            Node::ConstantPath {
                location,
                parent,
                child,
                delimiter,
            } => Node::ConstantPathTarget {
                location,
                parent,
                child,
                delimiter,
            },
            Node::Splat {
                location,
                operator,
                expression,
            } => {
                let expression = match expression {
                    Some(inner) => {
                        let inner = self.to_target(*inner);
                        Some(self.alloc(inner))
                    }
                    None => None,
                };
                Node::Splat {
                    location,
                    operator,
                    expression,
                }
            }
            Node::MultiTarget { .. } => node,
            Node::Parentheses {
                location,
                body: Some(body),
                opening,
                closing,
            } => match body.statements_body() {
                [Node::MultiTarget { targets, .. }] => Node::MultiTarget {
                    location,
                    targets,
                    lparen: Some(opening),
                    rparen: Some(closing),
                },
                _ => self.invalid_target(node),
            },
            Node::Call { location, name, .. } if is_variable_call(&node) => {
                self.scopes.add_local(name);
                Node::LocalVariableTarget { location, name, depth: 0 }
            }
            Node::Call {
                location,
                receiver,
                operator,
                message,
                opening,
                arguments,
                closing,
                block,
                flags,
                name,
            } if is_attribute_call(&node) || is_index_call(&node) => {
                let name = if is_index_call(&node) {
                    "[]="
                } else {
                    &*self.arena.alloc_str(&format!("{name}="))
                };
                Node::Call {
                    location,
                    receiver,
                    operator,
                    message,
                    opening,
                    arguments,
                    closing,
                    block,
                    flags: flags | CallFlags::ATTRIBUTE_WRITE,
                    name,
                }
            }
            Node::SelfReference { location }
            | Node::Nil { location }
            | Node::True { location }
            | Node::False { location }
            | Node::SourceFile { location, .. }
            | Node::SourceLine { location }
            | Node::SourceEncoding { location }
            | Node::BackReferenceRead { location, .. }
            | Node::NumberedReferenceRead { location, .. } => {
                let text = self.name_at(location);
                self.error(location, &messages::ASSIGNMENT_TO_READONLY, &[text]);
                node
            }
            Node::Missing { .. } => node,
            _ => self.invalid_target(node),
        }
    }

    fn invalid_target(&mut self, node: Node<'a>) -> Node<'a> {
        self.error(node.location(), &messages::ASSIGNMENT_TO_INVALID_TARGET, &[]);
        node
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// `target = value`. The target is bound before the value is parsed,
    /// so `a = a` reads the new local.
    pub(super) fn parse_write(&mut self, target: Node<'a>, bp: BindingPower) -> Node<'a> {
        let target = self.to_target(target);
        let operator = self.bump();
        let value = self.parse_assignment_value(bp, operator, true);
        let location = join(target.location(), value.location());
        let target_location = target.location();
        let name_token = |kind| Token {
            kind,
            location: target_location,
        };

        match target {
            Node::LocalVariableTarget { name, depth, .. } => Node::LocalVariableWrite {
                location,
                name,
                depth,
                name_token: name_token(TokenKind::Identifier),
                value: self.alloc(value),
                operator,
            },
            Node::InstanceVariableTarget { name, .. } => Node::InstanceVariableWrite {
                location,
                name,
                name_token: name_token(TokenKind::InstanceVariable),
                value: self.alloc(value),
                operator,
            },
            Node::ClassVariableTarget { name, .. } => Node::ClassVariableWrite {
                location,
                name,
                name_token: name_token(TokenKind::ClassVariable),
                value: self.alloc(value),
                operator,
            },
            Node::GlobalVariableTarget { name, .. } => Node::GlobalVariableWrite {
                location,
                name,
                name_token: name_token(TokenKind::GlobalVariable),
                value: self.alloc(value),
                operator,
            },
            Node::ConstantTarget { name, .. } => {
                self.check_constant_write(target);
                Node::ConstantWrite {
                    location,
                    name,
                    name_token: name_token(TokenKind::Constant),
                    value: self.alloc(value),
                    operator,
                }
            }
            Node::ConstantPathTarget {
                location: path_location,
                parent,
                child,
                delimiter,
            } => {
                self.check_constant_write(target);
                let path = self.alloc(Node::ConstantPath {
                    location: path_location,
                    parent,
                    child,
                    delimiter,
                });
                Node::ConstantPathWrite {
                    location,
                    target: path,
                    operator,
                    value: self.alloc(value),
                }
            }
            Node::Call { .. } if is_attribute_write(&target) => self.attribute_write(target, value),
            Node::MultiTarget {
                targets, lparen, rparen, ..
            } => Node::MultiWrite {
                location,
                targets,
                lparen,
                rparen,
                operator,
                value: self.alloc(value),
            },
            // Splats and anything that failed to convert.
            _ => Node::MultiWrite {
                location,
                targets: self.alloc_nodes(vec![target]),
                lparen: None,
                rparen: None,
                operator,
                value: self.alloc(value),
            },
        }
    }

    fn check_constant_write(&mut self, target: Node<'a>) {
        if self.scopes.in_def() {
            self.error(target.location(), &messages::DYNAMIC_CONSTANT_ASSIGNMENT, &[]);
        }
    }

    /// `a.b = v` becomes `a.b=(v)`; `a[i] = v` becomes `a.[]=(i, v)`.
    fn attribute_write(&self, call: Node<'a>, value: Node<'a>) -> Node<'a> {
        let Node::Call {
            location,
            receiver,
            operator,
            message,
            opening,
            arguments,
            closing,
            block,
            flags,
            name,
        } = call
        else {
            return call;
        };
        let mut list: Vec<Node<'a>> = match arguments {
            Some(Node::Arguments { arguments, .. }) => arguments.to_vec(),
            _ => Vec::new(),
        };
        list.push(value);
        Node::Call {
            location: join(location, value.location()),
            receiver,
            operator,
            message,
            opening,
            arguments: self.arguments_node(list),
            closing,
            block,
            flags,
            name,
        }
    }

    /// The right-hand side of an assignment. At statement level a list
    /// becomes an array and a `rescue` modifier applies to the value alone.
    fn parse_assignment_value(&mut self, bp: BindingPower, operator: Token, allow_list: bool) -> Node<'a> {
        let operator_text = self.name_at(operator.location);
        self.skip_newlines();
        let mut value =
            self.parse_expression_with(BindingPower::Assignment, &messages::EXPECTED_ASSIGNMENT_VALUE, &[operator_text]);

        if bp == BindingPower::Statement && allow_list {
            if self.at(TokenKind::Comma) || matches!(value, Node::Splat { .. }) {
                let mut elements = vec![value];
                while self.accept(TokenKind::Comma).is_some() {
                    elements.push(self.parse_expression(BindingPower::Assignment, &messages::EXPECTED_ELEMENT));
                }
                let location = join(elements[0].location(), elements[elements.len() - 1].location());
                value = Node::Array {
                    location,
                    elements: self.alloc_nodes(elements),
                    opening: None,
                    closing: None,
                };
            }
        }
        if bp == BindingPower::Statement && self.at(TokenKind::KeywordRescueModifier) {
            value = self.parse_rescue_modifier(value);
        }
        value
    }

    /// `target op= value`, including `||=` and `&&=`.
    pub(super) fn parse_operator_write(&mut self, target: Node<'a>, bp: BindingPower) -> Node<'a> {
        let target = if is_attribute_call(&target) || is_index_call(&target) {
            target
        } else {
            self.to_target(target)
        };
        let operator = self.bump();
        let value = self.parse_assignment_value(bp, operator, false);
        let location = join(target.location(), value.location());
        let target = self.alloc(target);
        let value = self.alloc(value);
        match operator.kind {
            TokenKind::PipePipeEqual => Node::OrWrite {
                location,
                target,
                operator,
                value,
            },
            TokenKind::AmpersandAmpersandEqual => Node::AndWrite {
                location,
                target,
                operator,
                value,
            },
            _ => Node::OperatorWrite {
                location,
                target,
                operator,
                value,
            },
        }
    }

    // ========================================================================
    // Multiple assignment
    // ========================================================================

    /// Collect targets after `first` while commas follow.
    pub(super) fn parse_target_list(&mut self, first: Node<'a>) -> Vec<Node<'a>> {
        let mut targets = vec![self.to_target(first)];
        while self.accept(TokenKind::Comma).is_some() {
            // `a, = list` leaves the rest unassigned.
            if self.at_any(&[TokenKind::Equal, TokenKind::KeywordIn, TokenKind::ParenthesisRight]) {
                break;
            }
            if self.at(TokenKind::UStar) {
                let operator = self.bump();
                let expression = if starts_expression(self.current.kind) {
                    let inner = self.parse_expression(BindingPower::Index, &messages::EXPECTED_MULTI_TARGET);
                    let inner = self.to_target(inner);
                    Some(self.alloc(inner))
                } else {
                    None
                };
                let location = match expression {
                    Some(inner) => join(operator.location, inner.location()),
                    None => operator.location,
                };
                targets.push(Node::Splat {
                    location,
                    operator,
                    expression,
                });
                continue;
            }
            let target = self.parse_expression(BindingPower::Index, &messages::EXPECTED_MULTI_TARGET);
            targets.push(self.to_target(target));
        }
        targets
    }

    /// `a, b = value`, or the inner list of `(a, b)`.
    pub(super) fn parse_multi_assignment(&mut self, first: Node<'a>) -> Node<'a> {
        let targets = self.parse_target_list(first);
        let first_location = targets[0].location();
        let last_location = targets[targets.len() - 1].location();

        if self.at(TokenKind::ParenthesisRight) {
            return Node::MultiTarget {
                location: join(first_location, last_location),
                targets: self.alloc_nodes(targets),
                lparen: None,
                rparen: None,
            };
        }

        let (operator, value) = if self.at(TokenKind::Equal) {
            let operator = self.bump();
            let value = self.parse_assignment_value(BindingPower::Statement, operator, true);
            (operator, value)
        } else {
            self.error_at_current(&messages::EXPECTED_MULTI_WRITE_OPERATOR, &[]);
            (self.missing_token(), self.missing_node())
        };
        Node::MultiWrite {
            location: join(first_location, value.location()),
            targets: self.alloc_nodes(targets),
            lparen: None,
            rparen: None,
            operator,
            value: self.alloc(value),
        }
    }
}

/// A bare identifier that could have been a local: no receiver, arguments
/// or block.
pub(super) fn is_variable_call(node: &Node<'_>) -> bool {
    matches!(node, Node::Call { flags, .. } if flags.contains(CallFlags::VARIABLE_CALL))
}

/// `receiver.name` with nothing after the name.
fn is_attribute_call(node: &Node<'_>) -> bool {
    matches!(
        node,
        Node::Call {
            receiver: Some(_),
            operator: Some(_),
            message: Some(message),
            opening: None,
            arguments: None,
            block: None,
            ..
        } if matches!(message.kind, TokenKind::Identifier | TokenKind::Constant)
    )
}

/// `receiver[...]` without a block.
fn is_index_call(node: &Node<'_>) -> bool {
    matches!(
        node,
        Node::Call {
            receiver: Some(_),
            message: None,
            opening: Some(Token { kind: TokenKind::BracketLeft, .. }),
            block: None,
            ..
        }
    )
}

fn is_attribute_write(node: &Node<'_>) -> bool {
    matches!(node, Node::Call { flags, .. } if flags.contains(CallFlags::ATTRIBUTE_WRITE))
}
