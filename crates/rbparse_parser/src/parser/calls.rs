//! Method calls: argument lists, blocks, `super`, `yield` and `defined?`.

use rbparse_ast::flags::CallFlags;
use rbparse_ast::location::span;
use rbparse_ast::node::{Node, OptionalNode};
use rbparse_ast::token::{Token, TokenKind};
use rbparse_core::text::Location;
use rbparse_diagnostics::messages;

use super::definitions::ParamsContext;
use super::expression::starts_expression;
use super::{join, Parser};
use crate::precedence::BindingPower;
use crate::scope::ScopeKind;

/// Arguments collected between delimiters or after a command name.
#[derive(Default)]
pub(super) struct ArgumentList<'a> {
    arguments: Vec<Node<'a>>,
    /// A `&block` argument.
    block: Option<Node<'a>>,
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Call tails
    // ========================================================================

    /// Everything after a method name: parenthesized or command arguments,
    /// then a literal block.
    pub(super) fn parse_call_tail(
        &mut self,
        receiver: OptionalNode<'a>,
        operator: Option<Token>,
        message: Option<Token>,
        name: &'a str,
        mut flags: CallFlags,
        bp: BindingPower,
    ) -> Node<'a> {
        let mut opening = None;
        let mut closing = None;
        let mut list = ArgumentList::default();
        let mut command = false;

        if self.at(TokenKind::ParenthesisLeft) {
            opening = Some(self.bump());
            list = self.parse_argument_list(Some(TokenKind::ParenthesisRight));
            closing = Some(self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_ARGUMENTS_CLOSE, &[]));
        } else if bp <= BindingPower::Assignment && self.starts_command_argument() {
            list = self.parse_command_arguments();
            command = true;
        }

        let (arguments, mut block) = self.finish_argument_list(list);
        if block.is_none() {
            block = self.parse_literal_block(!command);
        }

        let bare = receiver.is_none() && opening.is_none() && arguments.is_none() && block.is_none();
        if bare
            && message.map_or(false, |token| token.kind == TokenKind::Identifier)
            && !name.ends_with(&['?', '!'][..])
        {
            flags |= CallFlags::VARIABLE_CALL;
        }

        let start = receiver
            .map(|node| node.location().start)
            .or_else(|| message.map(|token| token.start()))
            .or_else(|| operator.map(|token| token.start()))
            .unwrap_or(self.previous.end());
        let end = [
            block.map(|node| node.location().end),
            closing.map(|token| token.end()),
            arguments.map(|node| node.location().end),
            message.map(|token| token.end()),
            operator.map(|token| token.end()),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(start);

        Node::Call {
            location: Location::new(start, end.max(start)),
            receiver,
            operator,
            message,
            opening,
            arguments,
            closing,
            block,
            flags,
            name,
        }
    }

    /// Whether the current token begins the first argument of a call
    /// written without parentheses.
    pub(super) fn starts_command_argument(&self) -> bool {
        if !self.space_before {
            return false;
        }
        match self.current.kind {
            TokenKind::Bang => self
                .source
                .get(self.current.end() as usize)
                .map_or(false, |byte| !byte.is_ascii_whitespace()),
            TokenKind::Identifier
            | TokenKind::Constant
            | TokenKind::InstanceVariable
            | TokenKind::ClassVariable
            | TokenKind::GlobalVariable
            | TokenKind::BackReference
            | TokenKind::NthReference
            | TokenKind::Label
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::RationalNumber
            | TokenKind::ImaginaryNumber
            | TokenKind::UMinusNum
            | TokenKind::CharacterLiteral
            | TokenKind::StringBegin
            | TokenKind::HeredocStart
            | TokenKind::SymbolBegin
            | TokenKind::RegexpBegin
            | TokenKind::Backtick
            | TokenKind::PercentLowerX
            | TokenKind::PercentLowerW
            | TokenKind::PercentUpperW
            | TokenKind::PercentLowerI
            | TokenKind::PercentUpperI
            | TokenKind::UStar
            | TokenKind::UStarStar
            | TokenKind::UAmpersand
            | TokenKind::UMinus
            | TokenKind::UColonColon
            | TokenKind::UDotDot
            | TokenKind::UDotDotDot
            | TokenKind::BracketLeftArray
            | TokenKind::ParenthesisLeftParentheses
            | TokenKind::MinusGreater
            | TokenKind::KeywordNil
            | TokenKind::KeywordTrue
            | TokenKind::KeywordFalse
            | TokenKind::KeywordSelf
            | TokenKind::KeywordFile
            | TokenKind::KeywordLine
            | TokenKind::KeywordEncoding
            | TokenKind::KeywordDefined
            | TokenKind::KeywordSuper
            | TokenKind::KeywordYield
            | TokenKind::KeywordDef
            | TokenKind::KeywordCase => true,
            _ => false,
        }
    }

    /// Command arguments. A `do` after them belongs to the command, not to
    /// its last argument.
    pub(super) fn parse_command_arguments(&mut self) -> ArgumentList<'a> {
        let accepts_do_block = std::mem::replace(&mut self.accepts_do_block, false);
        let list = self.parse_argument_list(None);
        self.accepts_do_block = accepts_do_block;
        list
    }

    // ========================================================================
    // Argument lists
    // ========================================================================

    /// Comma separated arguments. With `closing`, newlines are allowed and
    /// the list may be empty; without it the list runs until no comma follows.
    pub(super) fn parse_argument_list(&mut self, closing: Option<TokenKind>) -> ArgumentList<'a> {
        let mut list = ArgumentList::default();
        let mut keywords: Vec<Node<'a>> = Vec::new();
        let mut forwarding = false;

        loop {
            if let Some(closing) = closing {
                self.skip_newlines();
                if self.at(closing) || self.at(TokenKind::Eof) {
                    break;
                }
            }

            if list.block.is_some() {
                self.error_at_current(&messages::ARGUMENT_AFTER_BLOCK, &[]);
            } else if forwarding {
                self.error_at_current(&messages::ARGUMENT_AFTER_FORWARDING, &[]);
            }

            let before = self.current;
            match self.current.kind {
                TokenKind::UAmpersand => {
                    let operator = self.bump();
                    let expression = if starts_expression(self.current.kind) {
                        let value =
                            self.parse_expression(BindingPower::Defined, &messages::EXPECTED_BLOCK_ARGUMENT_VALUE);
                        Some(self.alloc(value))
                    } else {
                        None
                    };
                    list.block = Some(Node::BlockArgument {
                        location: span(&[&operator], &[&expression, &operator]),
                        expression,
                        operator,
                    });
                }
                TokenKind::UStarStar => {
                    let operator = self.bump();
                    let value = if starts_expression(self.current.kind) {
                        let value =
                            self.parse_expression(BindingPower::Defined, &messages::EXPECTED_DOUBLE_SPLAT_VALUE);
                        Some(self.alloc(value))
                    } else {
                        None
                    };
                    keywords.push(Node::AssocSplat {
                        location: span(&[&operator], &[&value, &operator]),
                        value,
                        operator,
                    });
                }
                TokenKind::Label => {
                    let key = self.parse_label_key();
                    let value = if starts_expression(self.current.kind) {
                        let value = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_HASH_VALUE);
                        Some(self.alloc(value))
                    } else {
                        None
                    };
                    let key = self.alloc(key);
                    keywords.push(Node::Assoc {
                        location: span(&[&key], &[&value, &key]),
                        key,
                        value,
                        operator: None,
                    });
                }
                TokenKind::UDotDotDot => {
                    let dots = self.bump();
                    if self.at(TokenKind::ParenthesisRight) {
                        if !self.scopes.forwarding_allowed() {
                            self.error(dots.location, &messages::ARGUMENT_NO_FORWARDING, &[]);
                        }
                        self.flush_keywords(&mut list, &mut keywords);
                        list.arguments.push(Node::ForwardingArguments { location: dots.location });
                        forwarding = true;
                    } else {
                        let range = self.parse_beginless_range(dots);
                        let argument = self.parse_infix_loop(range, BindingPower::Defined);
                        self.flush_keywords(&mut list, &mut keywords);
                        list.arguments.push(argument);
                    }
                }
                _ => {
                    let argument = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_ARGUMENT);
                    let labeled = self.previous.kind == TokenKind::LabelEnd
                        && matches!(argument, Node::Symbol { .. } | Node::InterpolatedSymbol { .. });
                    if labeled || self.at(TokenKind::EqualGreater) {
                        let pair = self.parse_assoc_value(argument, labeled);
                        keywords.push(pair);
                    } else {
                        self.flush_keywords(&mut list, &mut keywords);
                        list.arguments.push(argument);
                    }
                }
            }

            if self.current == before {
                // Nothing could start an argument here; the fault is reported.
                break;
            }
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }

        self.flush_keywords(&mut list, &mut keywords);
        list
    }

    /// Bare `key => value` pairs collected so far become one keyword hash.
    fn flush_keywords(&self, list: &mut ArgumentList<'a>, keywords: &mut Vec<Node<'a>>) {
        if keywords.is_empty() {
            return;
        }
        let elements = self.alloc_nodes(std::mem::take(keywords));
        list.arguments.push(Node::KeywordHash {
            location: span(&[&elements], &[&elements]),
            elements,
        });
    }

    /// The value half of `key => value` or `"key": value`.
    pub(super) fn parse_assoc_value(&mut self, key: Node<'a>, labeled: bool) -> Node<'a> {
        let operator = if labeled {
            None
        } else {
            Some(self.expect(TokenKind::EqualGreater, &messages::EXPECTED_HASH_ROCKET, &[]))
        };
        self.skip_newlines();
        let value = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_HASH_VALUE);
        let key = self.alloc(key);
        let value = self.alloc(value);
        Node::Assoc {
            location: join(key.location(), value.location()),
            key,
            value: Some(value),
            operator,
        }
    }

    /// Split a collected list into the `Arguments` node and the block argument.
    pub(super) fn finish_argument_list(&self, list: ArgumentList<'a>) -> (OptionalNode<'a>, OptionalNode<'a>) {
        let block = list.block.map(|node| self.alloc(node));
        (self.arguments_node(list.arguments), block)
    }

    /// An `Arguments` node, or `None` for an empty list.
    pub(super) fn arguments_node(&self, arguments: Vec<Node<'a>>) -> OptionalNode<'a> {
        if arguments.is_empty() {
            return None;
        }
        let arguments = self.alloc_nodes(arguments);
        Some(self.alloc(Node::Arguments {
            location: span(&[&arguments], &[&arguments]),
            arguments,
        }))
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// A `{ }` block when `braces` allows it, or a `do ... end` block where
    /// one may attach.
    pub(super) fn parse_literal_block(&mut self, braces: bool) -> OptionalNode<'a> {
        if braces && self.at(TokenKind::BraceLeft) {
            let block = self.parse_block(TokenKind::BraceRight);
            return Some(self.alloc(block));
        }
        if self.accepts_do_block && self.at(TokenKind::KeywordDo) {
            let block = self.parse_block(TokenKind::KeywordEnd);
            return Some(self.alloc(block));
        }
        None
    }

    fn parse_block(&mut self, closing_kind: TokenKind) -> Node<'a> {
        let opening = self.bump();
        self.scopes.push(ScopeKind::Block);

        let parameters = if self.at(TokenKind::Pipe) {
            let parameters = self.parse_block_parameters();
            Some(self.alloc(parameters))
        } else {
            None
        };

        let (body, closing) = if closing_kind == TokenKind::BraceRight {
            let body = self.parse_statements();
            (body, self.expect(TokenKind::BraceRight, &messages::EXPECTED_BLOCK_BRACE, &[]))
        } else {
            let body = self.parse_body_with_rescue();
            (body, self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_BLOCK_END, &[]))
        };

        let locals = self.scopes.pop();
        Node::Block {
            location: join(opening.location, closing.location),
            locals: self.alloc_locals(locals),
            parameters,
            body,
            opening,
            closing,
        }
    }

    /// `|a, b; c|`
    fn parse_block_parameters(&mut self) -> Node<'a> {
        let opening = self.bump();
        let parameters = self.parse_parameters(ParamsContext::Block, Some(TokenKind::Pipe));
        let locals = self.parse_block_locals();
        let closing = self.expect(TokenKind::Pipe, &messages::EXPECTED_BLOCK_PARAMETERS_CLOSE, &[]);
        Node::BlockParameters {
            location: join(opening.location, closing.location),
            parameters,
            locals,
            opening: Some(opening),
            closing: Some(closing),
        }
    }

    /// Block-local names after `;` in block or lambda parameters.
    pub(super) fn parse_block_locals(&mut self) -> &'a [Token] {
        let mut locals = Vec::new();
        if self.accept(TokenKind::Semicolon).is_none() {
            return &[];
        }
        loop {
            let name = self.expect(TokenKind::Identifier, &messages::EXPECTED_BLOCK_LOCAL, &[]);
            if !name.is_missing() {
                let text = self.name_at(name.location);
                self.scopes.add_local(text);
                locals.push(name);
            }
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.alloc_tokens(locals)
    }

    // ========================================================================
    // super, yield, defined?
    // ========================================================================

    pub(super) fn parse_super(&mut self) -> Node<'a> {
        let keyword = self.bump();
        let mut lparen = None;
        let mut rparen = None;
        let mut list = ArgumentList::default();
        let mut explicit = false;

        if self.at(TokenKind::ParenthesisLeft) {
            lparen = Some(self.bump());
            list = self.parse_argument_list(Some(TokenKind::ParenthesisRight));
            rparen = Some(self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_ARGUMENTS_CLOSE, &[]));
            explicit = true;
        } else if self.starts_command_argument() {
            list = self.parse_command_arguments();
            explicit = true;
        }

        let (arguments, mut block) = self.finish_argument_list(list);
        if block.is_none() {
            block = self.parse_literal_block(true);
        }

        if !explicit {
            return Node::ForwardingSuper {
                location: span(&[&keyword], &[&block, &keyword]),
                block,
            };
        }
        let end = [
            block.map(|node| node.location().end),
            rparen.map(|token| token.end()),
            arguments.map(|node| node.location().end),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(keyword.end());
        Node::Super {
            location: Location::new(keyword.start(), end.max(keyword.start())),
            keyword,
            lparen,
            arguments,
            rparen,
            block,
        }
    }

    pub(super) fn parse_yield(&mut self) -> Node<'a> {
        let keyword = self.bump();
        let mut lparen = None;
        let mut rparen = None;
        let mut list = ArgumentList::default();

        if self.at(TokenKind::ParenthesisLeft) {
            lparen = Some(self.bump());
            list = self.parse_argument_list(Some(TokenKind::ParenthesisRight));
            rparen = Some(self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_ARGUMENTS_CLOSE, &[]));
        } else if self.starts_command_argument() {
            list = self.parse_command_arguments();
        }

        let (arguments, block) = self.finish_argument_list(list);
        // A block argument is still an argument to yield.
        let arguments = match block {
            Some(block) => {
                let mut all: Vec<Node<'a>> = match arguments {
                    Some(Node::Arguments { arguments, .. }) => arguments.to_vec(),
                    _ => Vec::new(),
                };
                all.push(*block);
                self.arguments_node(all)
            }
            None => arguments,
        };
        Node::Yield {
            location: span(&[&keyword], &[&rparen, &arguments, &keyword]),
            keyword,
            lparen,
            arguments,
            rparen,
        }
    }

    pub(super) fn parse_defined(&mut self) -> Node<'a> {
        let keyword = self.bump();
        if self.at(TokenKind::ParenthesisLeft) {
            let lparen = self.bump();
            self.skip_newlines();
            let value = self.parse_expression(BindingPower::Composition, &messages::EXPECTED_DEFINED_OPERAND);
            self.skip_newlines();
            let rparen = self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_PARENTHESIZED_DEFINED, &[]);
            return Node::Defined {
                location: join(keyword.location, rparen.location),
                lparen: Some(lparen),
                value: self.alloc(value),
                rparen: Some(rparen),
                keyword,
            };
        }
        let value = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_DEFINED_OPERAND);
        Node::Defined {
            location: join(keyword.location, value.location()),
            lparen: None,
            value: self.alloc(value),
            rparen: None,
            keyword,
        }
    }
}
