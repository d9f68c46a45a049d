//! Patterns for `case/in`, `expr => pattern` and `expr in pattern`.

use rbparse_ast::location::span;
use rbparse_ast::node::Node;
use rbparse_ast::token::{Token, TokenKind};
use rbparse_core::text::Location;
use rbparse_diagnostics::{messages, DiagnosticMessage};

use super::expression::{range_flags, starts_expression};
use super::{join, Parser};
use crate::precedence::BindingPower;

impl<'a> Parser<'a> {
    /// A full pattern after `keyword`. At the top level the brackets of an
    /// array or find pattern and the braces of a hash pattern may be left
    /// out.
    pub(super) fn parse_pattern_top(&mut self, keyword: &str) -> Node<'a> {
        if self.at(TokenKind::Label) {
            return self.parse_hash_pattern(None, None, None);
        }
        if !starts_pattern(self.current.kind) {
            self.error_at_current(&messages::EXPECTED_PATTERN, &[keyword]);
            return self.missing_node();
        }

        let first = self.parse_pattern_element();
        if !self.at(TokenKind::Comma) && !matches!(first, Node::Splat { .. }) {
            return first;
        }
        let mut elements = vec![first];
        while self.accept(TokenKind::Comma).is_some() {
            // A trailing comma leaves the remaining elements unchecked.
            if !starts_pattern(self.current.kind) {
                break;
            }
            elements.push(self.parse_pattern_element());
        }
        self.sequence_pattern(None, elements, None, None)
    }

    /// An element of an array or find pattern: `*rest` or a pattern.
    fn parse_pattern_element(&mut self) -> Node<'a> {
        if self.at_any(&[TokenKind::UStar, TokenKind::Star]) {
            let operator = self.bump();
            let expression = if self.at(TokenKind::Identifier) {
                let target = self.parse_pattern_binding();
                Some(self.alloc(target))
            } else {
                None
            };
            return Node::Splat {
                location: span(&[&operator], &[&expression, &operator]),
                operator,
                expression,
            };
        }
        self.parse_pattern()
    }

    /// Alternatives joined by `|`, optionally captured with `=> name`.
    fn parse_pattern(&mut self) -> Node<'a> {
        let mut pattern = self.parse_pattern_primitive();
        while self.at(TokenKind::Pipe) {
            let operator = self.bump();
            let right = self.parse_pattern_primitive();
            pattern = Node::AlternationPattern {
                location: join(pattern.location(), right.location()),
                left: self.alloc(pattern),
                right: self.alloc(right),
                operator,
            };
        }

        if self.at(TokenKind::EqualGreater) {
            let operator = self.bump();
            let target = if self.at(TokenKind::Identifier) {
                self.parse_pattern_binding()
            } else {
                self.error_at_current(&messages::EXPECTED_PATTERN_CAPTURE, &[]);
                self.missing_node()
            };
            pattern = Node::CapturePattern {
                location: join(pattern.location(), target.location()),
                value: self.alloc(pattern),
                target: self.alloc(target),
                operator,
            };
        }
        pattern
    }

    fn parse_pattern_primitive(&mut self) -> Node<'a> {
        self.nested(Self::parse_pattern_term)
    }

    fn parse_pattern_term(&mut self) -> Node<'a> {
        match self.current.kind {
            TokenKind::BracketLeftArray | TokenKind::BracketLeft => {
                self.parse_delimited_pattern(None, TokenKind::BracketRight, &messages::EXPECTED_PATTERN_BRACKET)
            }
            TokenKind::BraceLeft => {
                let opening = self.bump();
                self.parse_hash_pattern(None, Some(opening), Some(TokenKind::BraceRight))
            }
            TokenKind::ParenthesisLeft | TokenKind::ParenthesisLeftParentheses => {
                self.bump();
                let pattern = self.parse_pattern();
                self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_PATTERN_PAREN, &[]);
                pattern
            }
            TokenKind::Caret => self.parse_pin(),
            TokenKind::Identifier => self.parse_pattern_binding(),
            TokenKind::Constant | TokenKind::UColonColon => self.parse_constant_pattern(),
            TokenKind::UDotDot | TokenKind::UDotDotDot => {
                let operator = self.bump();
                let right = self.parse_expression(BindingPower::Max, &messages::EXPECTED_RANGE_END);
                let right = self.alloc(right);
                Node::Range {
                    location: join(operator.location, right.location()),
                    left: None,
                    right: Some(right),
                    operator,
                    flags: range_flags(operator),
                }
            }
            kind if starts_expression(kind) => {
                let value = self.parse_expression(BindingPower::Max, &messages::EXPECTED_PATTERN_TERM);
                if self.at_any(&[TokenKind::DotDot, TokenKind::DotDotDot]) {
                    return self.parse_pattern_range(value);
                }
                value
            }
            _ => {
                self.error_at_current(&messages::EXPECTED_PATTERN_TERM, &[]);
                self.missing_node()
            }
        }
    }

    /// `low..high` and endless `low..` between values.
    fn parse_pattern_range(&mut self, left: Node<'a>) -> Node<'a> {
        let operator = self.bump();
        let right = if starts_expression(self.current.kind) && !self.at(TokenKind::KeywordThen) {
            let right = self.parse_expression(BindingPower::Max, &messages::EXPECTED_RANGE_END);
            Some(self.alloc(right))
        } else {
            None
        };
        let left = self.alloc(left);
        Node::Range {
            location: span(&[&left], &[&right, &operator]),
            left: Some(left),
            right,
            operator,
            flags: range_flags(operator),
        }
    }

    /// A bare name in a pattern binds a local in the current scope.
    fn parse_pattern_binding(&mut self) -> Node<'a> {
        let token = self.bump();
        let name = self.name_at(token.location);
        self.scopes.add_local(name);
        Node::LocalVariableTarget {
            location: token.location,
            name,
            depth: 0,
        }
    }

    /// `^name`, `^@ivar` or `^(expression)`.
    fn parse_pin(&mut self) -> Node<'a> {
        let operator = self.bump();
        match self.current.kind {
            TokenKind::Identifier => {
                let token = self.bump();
                let name = self.name_at(token.location);
                let depth = self.scopes.resolve(name).unwrap_or(0);
                let variable = self.alloc(Node::LocalVariableRead {
                    location: token.location,
                    name,
                    depth,
                });
                Node::PinnedVariable {
                    location: join(operator.location, token.location),
                    variable,
                    operator,
                }
            }
            TokenKind::InstanceVariable | TokenKind::ClassVariable | TokenKind::GlobalVariable => {
                let token = self.bump();
                let variable = self.alloc(self.variable_read(token));
                Node::PinnedVariable {
                    location: join(operator.location, token.location),
                    variable,
                    operator,
                }
            }
            TokenKind::ParenthesisLeft | TokenKind::ParenthesisLeftParentheses => {
                let lparen = self.bump();
                let expression = self.parse_expression(BindingPower::Statement, &messages::EXPECTED_PIN_EXPRESSION);
                let rparen = self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_PATTERN_PAREN, &[]);
                Node::PinnedExpression {
                    location: join(operator.location, rparen.location),
                    expression: self.alloc(expression),
                    operator,
                    lparen,
                    rparen,
                }
            }
            _ => {
                self.error_at_current(&messages::EXPECTED_PIN_VARIABLE, &[]);
                let variable = self.alloc(self.missing_node());
                Node::PinnedVariable {
                    location: operator.location,
                    variable,
                    operator,
                }
            }
        }
    }

    /// A constant or constant path, alone or followed by `(...)` or `[...]`.
    fn parse_constant_pattern(&mut self) -> Node<'a> {
        let mut constant = if self.at(TokenKind::UColonColon) {
            self.parse_top_constant()
        } else {
            let token = self.bump();
            Node::ConstantRead {
                location: token.location,
                name: self.name_at(token.location),
            }
        };
        while self.at(TokenKind::ColonColon) {
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
            constant = Node::ConstantPath {
                location: join(constant.location(), child.location()),
                parent: Some(self.alloc(constant)),
                child,
                delimiter,
            };
        }

        match self.current.kind {
            TokenKind::ParenthesisLeft => {
                self.parse_delimited_pattern(Some(constant), TokenKind::ParenthesisRight, &messages::EXPECTED_PATTERN_PAREN)
            }
            TokenKind::BracketLeft => {
                self.parse_delimited_pattern(Some(constant), TokenKind::BracketRight, &messages::EXPECTED_PATTERN_BRACKET)
            }
            TokenKind::DotDot | TokenKind::DotDotDot => self.parse_pattern_range(constant),
            _ => constant,
        }
    }

    /// `[...]`, `Const[...]` or `Const(...)`. Inside, labels make a hash
    /// pattern; anything else is an array or find pattern.
    fn parse_delimited_pattern(
        &mut self,
        constant: Option<Node<'a>>,
        closing_kind: TokenKind,
        message: &DiagnosticMessage,
    ) -> Node<'a> {
        let opening = self.bump();
        self.skip_newlines();
        if self.at_any(&[TokenKind::Label, TokenKind::UStarStar, TokenKind::StarStar]) {
            return self.parse_hash_pattern(constant, Some(opening), Some(closing_kind));
        }

        let mut elements = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(closing_kind) || self.at(TokenKind::Eof) {
                break;
            }
            let before = self.current;
            let element = self.parse_pattern_element();
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
        let closing = self.expect(closing_kind, message, &[]);
        self.sequence_pattern(constant, elements, Some(opening), Some(closing))
    }

    /// An array pattern, or a find pattern when the elements are bracketed
    /// by two splats.
    fn sequence_pattern(
        &mut self,
        constant: Option<Node<'a>>,
        elements: Vec<Node<'a>>,
        opening: Option<Token>,
        closing: Option<Token>,
    ) -> Node<'a> {
        let constant = constant.map(|node| self.alloc(node));
        let splats: Vec<usize> = elements
            .iter()
            .enumerate()
            .filter(|(_, element)| matches!(element, Node::Splat { .. }))
            .map(|(index, _)| index)
            .collect();

        if splats.len() == 2 && splats[0] == 0 && splats[1] == elements.len() - 1 && elements.len() >= 3 {
            let location = span(
                &[&constant, &opening, &elements[0].location()],
                &[&closing, &elements[elements.len() - 1].location()],
            );
            let left = self.alloc(elements[0]);
            let right = self.alloc(elements[elements.len() - 1]);
            let requireds = self.alloc_nodes(elements[1..elements.len() - 1].to_vec());
            return Node::FindPattern {
                location,
                constant,
                left,
                requireds,
                right,
                opening,
                closing,
            };
        }

        let elements_bound = elements
            .first()
            .zip(elements.last())
            .map(|(first, last)| first.location().join(&last.location()));
        let location = match (elements_bound, opening) {
            (None, None) => self.current.location,
            _ => span(&[&constant, &opening, &elements_bound], &[&closing, &elements_bound]),
        };

        let mut requireds = Vec::new();
        let mut rest = None;
        let mut posts = Vec::new();
        for element in elements {
            if matches!(element, Node::Splat { .. }) {
                if rest.is_none() {
                    rest = Some(self.alloc(element));
                    continue;
                }
                self.error(element.location(), &messages::EXPECTED_PATTERN_REST, &[]);
            }
            if rest.is_none() {
                requireds.push(element);
            } else {
                posts.push(element);
            }
        }

        Node::ArrayPattern {
            location,
            constant,
            requireds: self.alloc_nodes(requireds),
            rest,
            posts: self.alloc_nodes(posts),
            opening,
            closing,
        }
    }

    /// `key: pattern` pairs with an optional `**rest` or `**nil`.
    fn parse_hash_pattern(
        &mut self,
        constant: Option<Node<'a>>,
        opening: Option<Token>,
        closing_kind: Option<TokenKind>,
    ) -> Node<'a> {
        let mut assocs = Vec::new();
        let mut kwrest = None;
        loop {
            if let Some(closing_kind) = closing_kind {
                self.skip_newlines();
                if self.at(closing_kind) || self.at(TokenKind::Eof) {
                    break;
                }
            }
            match self.current.kind {
                TokenKind::Label => {
                    let label = self.current;
                    let key = self.parse_label_key();
                    // `key:` alone binds a local named after the key.
                    let value = if starts_pattern(self.current.kind) && !self.on_new_line() {
                        let value = self.parse_pattern();
                        Some(self.alloc(value))
                    } else {
                        let name_end = label.end().saturating_sub(1).max(label.start());
                        let name = self.name_at(Location::new(label.start(), name_end));
                        self.scopes.add_local(name);
                        None
                    };
                    let key = self.alloc(key);
                    assocs.push(Node::Assoc {
                        location: span(&[&key], &[&value, &key]),
                        key,
                        value,
                        operator: None,
                    });
                }
                TokenKind::UStarStar | TokenKind::StarStar => {
                    let operator = self.bump();
                    let rest = if self.at(TokenKind::KeywordNil) {
                        let keyword = self.bump();
                        Node::NoKeywordsParameter {
                            location: join(operator.location, keyword.location),
                            operator,
                            keyword,
                        }
                    } else {
                        let value = if self.at(TokenKind::Identifier) {
                            let target = self.parse_pattern_binding();
                            Some(self.alloc(target))
                        } else {
                            None
                        };
                        Node::AssocSplat {
                            location: span(&[&operator], &[&value, &operator]),
                            value,
                            operator,
                        }
                    };
                    kwrest = Some(self.alloc(rest));
                }
                _ => {
                    self.error_at_current(&messages::EXPECTED_PATTERN_KEY, &[]);
                    break;
                }
            }
            if kwrest.is_some() || self.accept(TokenKind::Comma).is_none() {
                break;
            }
            // A trailing comma at the top level ends the pattern.
            if closing_kind.is_none() && !self.at_any(&[TokenKind::Label, TokenKind::UStarStar]) {
                break;
            }
        }

        let closing = closing_kind.map(|kind| {
            self.skip_newlines();
            let message = if kind == TokenKind::BraceRight {
                &messages::EXPECTED_PATTERN_BRACE
            } else if kind == TokenKind::BracketRight {
                &messages::EXPECTED_PATTERN_BRACKET
            } else {
                &messages::EXPECTED_PATTERN_PAREN
            };
            self.expect(kind, message, &[])
        });

        let assocs = self.alloc_nodes(assocs);
        let constant = constant.map(|node| self.alloc(node));
        let location = match (assocs.is_empty() && kwrest.is_none(), opening) {
            (true, None) => self.current.location,
            _ => span(&[&constant, &opening, &assocs, &kwrest], &[&closing, &kwrest, &assocs]),
        };
        Node::HashPattern {
            location,
            constant,
            assocs,
            kwrest,
            opening,
            closing,
        }
    }

    /// Whether a line break separates the current token from the previous
    /// one. Lexing after a label skips the newline token itself.
    pub(super) fn on_new_line(&self) -> bool {
        let from = self.previous.end() as usize;
        let to = (self.current.start() as usize).max(from);
        self.source[from..to].contains(&b'\n')
    }
}

fn starts_pattern(kind: TokenKind) -> bool {
    kind == TokenKind::Caret || kind == TokenKind::Star || starts_expression(kind)
}
