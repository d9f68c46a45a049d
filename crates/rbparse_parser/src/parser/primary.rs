//! Primary expressions: names, variables, numbers, collection literals,
//! parentheses and lambdas.

use rbparse_ast::flags::CallFlags;
use rbparse_ast::node::Node;
use rbparse_ast::token::{Token, TokenKind};
use rbparse_core::text::Location;
use rbparse_diagnostics::messages;
use rbparse_lexer::LexState;

use super::definitions::ParamsContext;
use super::expression::starts_expression;
use super::{join, Parser};
use crate::precedence::BindingPower;
use crate::scope::ScopeKind;

impl<'a> Parser<'a> {
    // ========================================================================
    // Names
    // ========================================================================

    /// A local variable read when the name is bound and not immediately
    /// called, otherwise a method call.
    pub(super) fn parse_identifier(&mut self, bp: BindingPower) -> Node<'a> {
        let token = self.current;
        let name = self.name_at(token.location);
        if self.source.get(token.end() as usize) != Some(&b'(') {
            if let Some(depth) = self.scopes.resolve(name) {
                // A local ends an expression: `a [0]` indexes and `a -1` subtracts.
                self.lexer.set_state(LexState::END | LexState::LABEL);
                self.advance();
                return Node::LocalVariableRead {
                    location: token.location,
                    name,
                    depth,
                };
            }
        }
        self.advance();
        self.parse_call_tail(None, None, Some(token), name, CallFlags::NONE, bp)
    }

    pub(super) fn parse_constant(&mut self, bp: BindingPower) -> Node<'a> {
        let token = self.bump();
        let name = self.name_at(token.location);
        if self.at(TokenKind::ParenthesisLeft)
            || (bp <= BindingPower::Assignment && self.starts_command_argument())
        {
            return self.parse_call_tail(None, None, Some(token), name, CallFlags::NONE, bp);
        }
        Node::ConstantRead {
            location: token.location,
            name,
        }
    }

    /// `::Constant`
    pub(super) fn parse_top_constant(&mut self) -> Node<'a> {
        let delimiter = self.bump();
        let child = if self.at(TokenKind::Constant) {
            let token = self.bump();
            Node::ConstantRead {
                location: token.location,
                name: self.name_at(token.location),
            }
        } else {
            self.error_at_current(&messages::EXPECTED_IDENTIFIER_OR_CONSTANT, &[]);
            self.missing_node()
        };
        let child = self.alloc(child);
        Node::ConstantPath {
            location: join(delimiter.location, child.location()),
            parent: None,
            child,
            delimiter,
        }
    }

    /// Read of an instance, class or global variable, or a regexp match
    /// reference.
    pub(super) fn variable_read(&self, token: Token) -> Node<'a> {
        let location = token.location;
        let name = self.name_at(location);
        match token.kind {
            TokenKind::InstanceVariable => Node::InstanceVariableRead { location, name },
            TokenKind::ClassVariable => Node::ClassVariableRead { location, name },
            TokenKind::BackReference => Node::BackReferenceRead { location, name },
            TokenKind::NthReference => Node::NumberedReferenceRead {
                location,
                number: name[1..].parse().unwrap_or(0),
            },
            _ => Node::GlobalVariableRead { location, name },
        }
    }

    /// `key:` in a hash or argument list, as a symbol.
    pub(super) fn parse_label_key(&mut self) -> Node<'a> {
        let token = self.bump();
        let colon_at = token.end().saturating_sub(1).max(token.start());
        let value = Token::new(TokenKind::Identifier, token.start(), colon_at);
        let closing = Token::new(TokenKind::Colon, colon_at, token.end());
        Node::Symbol {
            location: token.location,
            opening: None,
            value: Some(value),
            closing: Some(closing),
            unescaped: self.text(value.location),
        }
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    pub(super) fn parse_number(&mut self) -> Node<'a> {
        let token = self.bump();
        let location = token.location;
        match token.kind {
            TokenKind::RationalNumber => {
                let numeric = self.numeric_literal(Location::new(location.start, location.end - 1));
                Node::Rational {
                    location,
                    numeric: self.alloc(numeric),
                }
            }
            TokenKind::ImaginaryNumber => {
                let digits_end = location.end - 1;
                let numeric = if self.text(location).ends_with(b"ri") {
                    let inner = self.numeric_literal(Location::new(location.start, digits_end - 1));
                    Node::Rational {
                        location: Location::new(location.start, digits_end),
                        numeric: self.alloc(inner),
                    }
                } else {
                    self.numeric_literal(Location::new(location.start, digits_end))
                };
                Node::Imaginary {
                    location,
                    numeric: self.alloc(numeric),
                }
            }
            _ => self.numeric_literal(location),
        }
    }

    /// An integer or float covering `location`, judged from its text.
    fn numeric_literal(&self, location: Location) -> Node<'a> {
        let text = self.text(location);
        let digits = text.strip_prefix(b"-").unwrap_or(text);
        let prefixed = digits.len() > 1
            && digits[0] == b'0'
            && matches!(digits[1].to_ascii_lowercase(), b'x' | b'b' | b'o' | b'd');
        if !prefixed && digits.iter().any(|byte| matches!(byte, b'.' | b'e' | b'E')) {
            Node::Float { location }
        } else {
            Node::Integer { location }
        }
    }

    // ========================================================================
    // Collections
    // ========================================================================

    pub(super) fn parse_array(&mut self) -> Node<'a> {
        let opening = self.bump();
        let list = self.parse_argument_list(Some(TokenKind::BracketRight));
        self.skip_newlines();
        let closing = self.expect(TokenKind::BracketRight, &messages::EXPECTED_CLOSING_BRACKET, &[]);
        let (arguments, block) = self.finish_argument_list(list);
        let mut elements: Vec<Node<'a>> = match arguments {
            Some(Node::Arguments { arguments, .. }) => arguments.to_vec(),
            _ => Vec::new(),
        };
        if let Some(block) = block {
            elements.push(*block);
        }
        Node::Array {
            location: join(opening.location, closing.location),
            elements: self.alloc_nodes(elements),
            opening: Some(opening),
            closing: Some(closing),
        }
    }

    pub(super) fn parse_hash(&mut self) -> Node<'a> {
        let opening = self.bump();
        let mut elements = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(TokenKind::BraceRight) || self.at(TokenKind::Eof) {
                break;
            }
            let before = self.current;
            let element = self.parse_hash_element();
            if self.current == before {
                break;
            }
            elements.push(element);
            self.skip_newlines();
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.skip_newlines();
        let closing = self.expect(TokenKind::BraceRight, &messages::EXPECTED_CLOSING_BRACE, &[]);
        Node::Hash {
            location: join(opening.location, closing.location),
            opening,
            elements: self.alloc_nodes(elements),
            closing,
        }
    }

    fn parse_hash_element(&mut self) -> Node<'a> {
        match self.current.kind {
            TokenKind::Label => {
                let key = self.parse_label_key();
                // `{x:}` takes its value from `x`.
                let value = if starts_expression(self.current.kind) {
                    let value = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_HASH_VALUE);
                    Some(self.alloc(value))
                } else {
                    None
                };
                let key = self.alloc(key);
                Node::Assoc {
                    location: join(key.location(), value.map_or(key.location(), |value| value.location())),
                    key,
                    value,
                    operator: None,
                }
            }
            TokenKind::UStarStar => {
                let operator = self.bump();
                let value = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_DOUBLE_SPLAT_VALUE);
                let value = self.alloc(value);
                Node::AssocSplat {
                    location: join(operator.location, value.location()),
                    value: Some(value),
                    operator,
                }
            }
            _ => {
                let key = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_HASH_KEY);
                if key.is_missing() {
                    return key;
                }
                let labeled = self.previous.kind == TokenKind::LabelEnd
                    && matches!(key, Node::Symbol { .. } | Node::InterpolatedSymbol { .. });
                self.parse_assoc_value(key, labeled)
            }
        }
    }

    // ========================================================================
    // Grouping and lambdas
    // ========================================================================

    pub(super) fn parse_parentheses(&mut self) -> Node<'a> {
        let opening = self.bump();
        let body = self.parse_statements();
        let closing = self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_CLOSING_PARENTHESIS, &[]);
        Node::Parentheses {
            location: join(opening.location, closing.location),
            body,
            opening,
            closing,
        }
    }

    /// `->(params) { body }` or `-> params do body end`.
    pub(super) fn parse_lambda(&mut self) -> Node<'a> {
        let operator = self.bump();
        self.scopes.push(ScopeKind::Lambda);

        let parameters = if self.at_any(&[TokenKind::ParenthesisLeft, TokenKind::ParenthesisLeftParentheses]) {
            let opening = self.bump();
            let parameters = self.parse_parameters(ParamsContext::Lambda, Some(TokenKind::ParenthesisRight));
            let locals = self.parse_block_locals();
            let closing = self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_DEF_PARAMETERS_CLOSE, &[]);
            Some(self.alloc(Node::BlockParameters {
                location: join(opening.location, closing.location),
                parameters,
                locals,
                opening: Some(opening),
                closing: Some(closing),
            }))
        } else {
            self.parse_parameters(ParamsContext::Lambda, None).map(|parameters| {
                self.alloc(Node::BlockParameters {
                    location: parameters.location(),
                    parameters: Some(parameters),
                    locals: &[],
                    opening: None,
                    closing: None,
                })
            })
        };

        let (opening, body, closing) = match self.current.kind {
            TokenKind::BraceLeft => {
                let opening = self.bump();
                let body = self.parse_statements();
                let closing = self.expect(TokenKind::BraceRight, &messages::EXPECTED_LAMBDA_BRACE, &[]);
                (opening, body, closing)
            }
            TokenKind::KeywordDo => {
                let opening = self.bump();
                let body = self.parse_body_with_rescue();
                let closing = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_LAMBDA_END, &[]);
                (opening, body, closing)
            }
            _ => {
                self.error_at_current(&messages::EXPECTED_LAMBDA_BODY, &[]);
                let missing = self.missing_token();
                (missing, None, missing)
            }
        };

        let locals = self.scopes.pop();
        Node::Lambda {
            location: join(operator.location, closing.location),
            locals: self.alloc_locals(locals),
            operator,
            opening,
            closing,
            parameters,
            body,
        }
    }
}
