//! The expression loop: prefix dispatch, then infix operators while they
//! bind at least as tightly as the caller's level.

use rbparse_ast::flags::{CallFlags, RangeFlags};
use rbparse_ast::location::span;
use rbparse_ast::node::Node;
use rbparse_ast::token::{Token, TokenKind};
use rbparse_core::text::Location;
use rbparse_diagnostics::{messages, DiagnosticMessage};
use rbparse_lexer::LexState;

use super::{join, Parser};
use crate::precedence::{binding_power, Binding, BindingPower};

impl<'a> Parser<'a> {
    pub(super) fn parse_expression(&mut self, bp: BindingPower, message: &DiagnosticMessage) -> Node<'a> {
        self.parse_expression_with(bp, message, &[])
    }

    /// Parse an expression whose operators bind at `bp` or tighter. When no
    /// expression starts here, report `message` and return a `Missing` node
    /// without consuming anything.
    pub(super) fn parse_expression_with(
        &mut self,
        bp: BindingPower,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Node<'a> {
        if !starts_expression(self.current.kind) {
            self.error_at_current(message, args);
            return self.missing_node();
        }
        self.nested(|parser| {
            let mut node = parser.parse_prefix(bp);
            node = parser.parse_infix_loop(node, bp);
            if bp == BindingPower::Statement && parser.at(TokenKind::Comma) && parser.is_target_candidate(&node) {
                node = parser.parse_multi_assignment(node);
                node = parser.parse_infix_loop(node, bp);
            }
            node
        })
    }

    pub(super) fn parse_infix_loop(&mut self, mut node: Node<'a>, bp: BindingPower) -> Node<'a> {
        let mut last: Option<Binding> = None;
        loop {
            let binding = binding_power(self.current.kind);
            if binding.left == BindingPower::Unset || bp > binding.left {
                break;
            }
            if binding.nonassoc && last.map_or(false, |prior| prior.nonassoc && prior.left == binding.left) {
                break;
            }
            node = self.parse_infix(node, binding, bp);
            last = Some(binding);
        }
        node
    }

    // ========================================================================
    // Prefix forms
    // ========================================================================

    fn parse_prefix(&mut self, bp: BindingPower) -> Node<'a> {
        let token = self.current;
        match token.kind {
            TokenKind::Identifier => self.parse_identifier(bp),
            TokenKind::Constant => self.parse_constant(bp),
            TokenKind::InstanceVariable
            | TokenKind::ClassVariable
            | TokenKind::GlobalVariable
            | TokenKind::BackReference
            | TokenKind::NthReference => {
                self.advance();
                self.variable_read(token)
            }

            TokenKind::Integer | TokenKind::Float | TokenKind::RationalNumber | TokenKind::ImaginaryNumber => {
                self.parse_number()
            }
            TokenKind::UMinusNum => self.parse_negative_number(),
            TokenKind::CharacterLiteral => self.parse_character_literal(),
            TokenKind::StringBegin => self.parse_string_literal(),
            TokenKind::HeredocStart => self.parse_heredoc(),
            TokenKind::SymbolBegin => self.parse_symbol(),
            TokenKind::RegexpBegin => self.parse_regexp(),
            TokenKind::Backtick | TokenKind::PercentLowerX => self.parse_xstring(),
            TokenKind::PercentLowerW
            | TokenKind::PercentUpperW
            | TokenKind::PercentLowerI
            | TokenKind::PercentUpperI => self.parse_list(),

            TokenKind::BracketLeftArray | TokenKind::BracketLeft => self.parse_array(),
            TokenKind::BraceLeft => self.parse_hash(),
            TokenKind::ParenthesisLeft | TokenKind::ParenthesisLeftParentheses => self.parse_parentheses(),
            TokenKind::MinusGreater => self.parse_lambda(),

            TokenKind::UMinus => self.parse_unary("-@", BindingPower::UMinus),
            TokenKind::UPlus => self.parse_unary("+@", BindingPower::Unary),
            TokenKind::Bang => self.parse_unary("!", BindingPower::Unary),
            TokenKind::Tilde => self.parse_unary("~", BindingPower::Unary),
            TokenKind::KeywordNot => self.parse_not(),
            TokenKind::UStar => self.parse_splat(bp),
            TokenKind::UColonColon => self.parse_top_constant(),
            TokenKind::UDotDot | TokenKind::UDotDotDot => {
                let operator = self.bump();
                self.parse_beginless_range(operator)
            }

            TokenKind::KeywordNil => self.leaf(|location| Node::Nil { location }),
            TokenKind::KeywordTrue => self.leaf(|location| Node::True { location }),
            TokenKind::KeywordFalse => self.leaf(|location| Node::False { location }),
            TokenKind::KeywordSelf => self.leaf(|location| Node::SelfReference { location }),
            TokenKind::KeywordLine => self.leaf(|location| Node::SourceLine { location }),
            TokenKind::KeywordEncoding => self.leaf(|location| Node::SourceEncoding { location }),
            TokenKind::KeywordRedo => self.leaf(|location| Node::Redo { location }),
            TokenKind::KeywordRetry => {
                if !self.in_rescue {
                    self.error_at_current(&messages::INVALID_RETRY, &[]);
                }
                self.leaf(|location| Node::Retry { location })
            }
            TokenKind::KeywordFile => {
                let filepath = self.filepath;
                self.leaf(|location| Node::SourceFile { location, filepath })
            }

            TokenKind::KeywordDefined => self.parse_defined(),
            TokenKind::KeywordSuper => self.parse_super(),
            TokenKind::KeywordYield => self.parse_yield(),
            TokenKind::KeywordAlias => self.parse_alias(),
            TokenKind::KeywordUndef => self.parse_undef(),
            TokenKind::KeywordDef => self.parse_def(),
            TokenKind::KeywordClass => self.parse_class(),
            TokenKind::KeywordModule => self.parse_module(),

            TokenKind::KeywordIf => self.parse_conditional(false),
            TokenKind::KeywordUnless => self.parse_conditional(true),
            TokenKind::KeywordWhile | TokenKind::KeywordUntil => self.parse_loop(),
            TokenKind::KeywordFor => self.parse_for(),
            TokenKind::KeywordCase => self.parse_case(),
            TokenKind::KeywordBegin => self.parse_begin(),
            TokenKind::KeywordBeginUpcase | TokenKind::KeywordEndUpcase => self.parse_execution_block(),
            TokenKind::KeywordReturn | TokenKind::KeywordBreak | TokenKind::KeywordNext => self.parse_jump(),

            // The lexer already reported the bad bytes.
            TokenKind::Invalid => {
                self.advance();
                Node::Missing {
                    location: token.location,
                }
            }

            _ => {
                self.error_at_current(&messages::CANNOT_PARSE_EXPRESSION, &[]);
                self.missing_node()
            }
        }
    }

    /// Consume a single-token node.
    fn leaf(&mut self, build: impl FnOnce(Location) -> Node<'a>) -> Node<'a> {
        let token = self.bump();
        build(token.location)
    }

    /// A prefix operator applied as a method call on its operand.
    fn parse_unary(&mut self, name: &'static str, operand_bp: BindingPower) -> Node<'a> {
        let operator = self.bump();
        let operand = self.parse_expression(operand_bp, &messages::EXPECTED_UNARY_OPERAND);
        self.unary_call(operator, operand, name)
    }

    pub(super) fn unary_call(&self, operator: Token, operand: Node<'a>, name: &'a str) -> Node<'a> {
        Node::Call {
            location: join(operator.location, operand.location()),
            receiver: Some(self.alloc(operand)),
            operator: None,
            message: Some(operator),
            opening: None,
            arguments: None,
            closing: None,
            block: None,
            flags: CallFlags::NONE,
            name,
        }
    }

    fn parse_not(&mut self) -> Node<'a> {
        let keyword = self.bump();
        let operand = self.parse_expression(BindingPower::Not, &messages::EXPECTED_NOT_OPERAND);
        self.unary_call(keyword, operand, "!")
    }

    /// `-2`, folding the sign into the literal. `-2 ** 2` is `-(2 ** 2)`.
    fn parse_negative_number(&mut self) -> Node<'a> {
        let minus = self.bump();
        if !matches!(
            self.current.kind,
            TokenKind::Integer | TokenKind::Float | TokenKind::RationalNumber | TokenKind::ImaginaryNumber
        ) {
            let operand = self.parse_expression(BindingPower::UMinus, &messages::EXPECTED_UNARY_OPERAND);
            return self.unary_call(minus, operand, "-@");
        }

        let number = self.parse_number();
        if self.at(TokenKind::StarStar) {
            let power = self.parse_infix_loop(number, BindingPower::Exponent);
            return self.unary_call(minus, power, "-@");
        }
        self.with_sign(number, minus.start())
    }

    /// Extend a numeric literal, and any literal it wraps, to start at `start`.
    fn with_sign(&self, node: Node<'a>, start: u32) -> Node<'a> {
        let location = Location::new(start, node.location().end);
        match node {
            Node::Integer { .. } => Node::Integer { location },
            Node::Float { .. } => Node::Float { location },
            Node::Rational { numeric, .. } => Node::Rational {
                location,
                numeric: self.alloc(self.with_sign(*numeric, start)),
            },
            Node::Imaginary { numeric, .. } => Node::Imaginary {
                location,
                numeric: self.alloc(self.with_sign(*numeric, start)),
            },
            other => other,
        }
    }

    fn parse_splat(&mut self, bp: BindingPower) -> Node<'a> {
        let operator = self.bump();
        let operand_bp = if bp == BindingPower::Statement {
            BindingPower::Index
        } else {
            BindingPower::Defined
        };
        let expression = if starts_expression(self.current.kind) {
            let operand = self.parse_expression(operand_bp, &messages::EXPECTED_SPLAT_VALUE);
            Some(self.alloc(operand))
        } else {
            None
        };
        Node::Splat {
            location: span(&[&operator], &[&expression, &operator]),
            operator,
            expression,
        }
    }

    pub(super) fn parse_beginless_range(&mut self, operator: Token) -> Node<'a> {
        let right = self.parse_expression(BindingPower::Range.tighter(), &messages::EXPECTED_RANGE_END);
        let right = self.alloc(right);
        Node::Range {
            location: join(operator.location, right.location()),
            left: None,
            right: Some(right),
            operator,
            flags: range_flags(operator),
        }
    }

    // ========================================================================
    // Infix forms
    // ========================================================================

    fn parse_infix(&mut self, left: Node<'a>, binding: Binding, bp: BindingPower) -> Node<'a> {
        match self.current.kind {
            TokenKind::Equal => self.parse_write(left, bp),
            kind if kind.is_assignment() => self.parse_operator_write(left, bp),

            TokenKind::AmpersandAmpersand | TokenKind::KeywordAnd => {
                let operator = self.bump();
                let right = self.parse_expression(binding.right, &messages::EXPECTED_VALUE_AFTER_OPERATOR);
                Node::And {
                    location: join(left.location(), right.location()),
                    left: self.alloc(left),
                    right: self.alloc(right),
                    operator,
                }
            }
            TokenKind::PipePipe | TokenKind::KeywordOr => {
                let operator = self.bump();
                let right = self.parse_expression(binding.right, &messages::EXPECTED_VALUE_AFTER_OPERATOR);
                Node::Or {
                    location: join(left.location(), right.location()),
                    left: self.alloc(left),
                    right: self.alloc(right),
                    operator,
                }
            }

            TokenKind::KeywordIfModifier
            | TokenKind::KeywordUnlessModifier
            | TokenKind::KeywordWhileModifier
            | TokenKind::KeywordUntilModifier => self.parse_modifier(left, binding),
            TokenKind::KeywordRescueModifier => self.parse_rescue_modifier(left),

            TokenKind::QuestionMark => self.parse_ternary(left),
            TokenKind::DotDot | TokenKind::DotDotDot => self.parse_range(left),

            TokenKind::EqualGreater | TokenKind::KeywordIn => self.parse_one_line_match(left),

            TokenKind::Dot | TokenKind::AmpersandDot => self.parse_method_call(left, bp),
            TokenKind::ColonColon => self.parse_scope_resolution(left, bp),
            TokenKind::BracketLeft => self.parse_index(left),

            _ => self.parse_binary_call(left, binding),
        }
    }

    /// `left op right` as the method call `left.op(right)`.
    fn parse_binary_call(&mut self, left: Node<'a>, binding: Binding) -> Node<'a> {
        let operator = self.bump();
        let name = self.name_at(operator.location);
        let right = self.parse_expression(binding.right, &messages::EXPECTED_VALUE_AFTER_OPERATOR);
        let location = join(left.location(), right.location());
        let arguments = self.arguments_node(vec![right]);
        Node::Call {
            location,
            receiver: Some(self.alloc(left)),
            operator: None,
            message: Some(operator),
            opening: None,
            arguments,
            closing: None,
            block: None,
            flags: CallFlags::NONE,
            name,
        }
    }

    fn parse_modifier(&mut self, statement: Node<'a>, binding: Binding) -> Node<'a> {
        let keyword = self.bump();
        let keyword_text = self.name_at(keyword.location);
        let saved = std::mem::replace(&mut self.accepts_do_block, true);
        let predicate =
            self.parse_expression_with(binding.right, &messages::EXPECTED_MODIFIER_PREDICATE, &[keyword_text]);
        self.accepts_do_block = saved;

        let location = join(statement.location(), predicate.location());
        let statements = Some(self.single_statement(statement));
        let predicate = self.alloc(predicate);
        match keyword.kind {
            TokenKind::KeywordIfModifier => Node::If {
                location,
                if_keyword: keyword,
                predicate,
                statements,
                consequent: None,
                end_keyword: None,
            },
            TokenKind::KeywordUnlessModifier => Node::Unless {
                location,
                keyword,
                predicate,
                statements,
                consequent: None,
                end_keyword: None,
            },
            TokenKind::KeywordWhileModifier => Node::While {
                location,
                keyword,
                closing: None,
                predicate,
                statements,
            },
            _ => Node::Until {
                location,
                keyword,
                closing: None,
                predicate,
                statements,
            },
        }
    }

    pub(super) fn parse_rescue_modifier(&mut self, expression: Node<'a>) -> Node<'a> {
        let keyword = self.bump();
        let fallback = self.parse_expression(BindingPower::Composition.tighter(), &messages::EXPECTED_RESCUE_VALUE);
        Node::RescueModifier {
            location: join(expression.location(), fallback.location()),
            expression: self.alloc(expression),
            keyword,
            rescue_expression: self.alloc(fallback),
        }
    }

    fn parse_ternary(&mut self, predicate: Node<'a>) -> Node<'a> {
        let question_mark = self.bump();
        let true_expression = self.parse_expression(BindingPower::Ternary, &messages::EXPECTED_TERNARY_TRUE);
        self.skip_newlines();
        let colon = self.expect(TokenKind::Colon, &messages::EXPECTED_TERNARY_COLON, &[]);
        let false_expression = self.parse_expression(BindingPower::Ternary, &messages::EXPECTED_TERNARY_FALSE);
        Node::Ternary {
            location: join(predicate.location(), false_expression.location()),
            predicate: self.alloc(predicate),
            question_mark,
            true_expression: self.alloc(true_expression),
            colon,
            false_expression: self.alloc(false_expression),
        }
    }

    /// `a..b`, or endless `a..` when nothing that can start an operand follows.
    fn parse_range(&mut self, left: Node<'a>) -> Node<'a> {
        let operator = self.bump();
        let right = if starts_expression(self.current.kind) && !self.at(TokenKind::KeywordThen) {
            let right = self.parse_expression(BindingPower::Range.tighter(), &messages::EXPECTED_RANGE_END);
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

    /// `value => pattern` and `value in pattern`.
    fn parse_one_line_match(&mut self, value: Node<'a>) -> Node<'a> {
        // Labels may open a bare hash pattern.
        self.lexer.set_state(LexState::BEG | LexState::LABEL);
        let operator = self.bump();
        let keyword = if operator.kind == TokenKind::KeywordIn { "in" } else { "=>" };
        let pattern = self.parse_pattern_top(keyword);
        let location = join(value.location(), pattern.location());
        let value = self.alloc(value);
        let pattern = self.alloc(pattern);
        if operator.kind == TokenKind::KeywordIn {
            Node::MatchPredicate {
                location,
                value,
                pattern,
                operator,
            }
        } else {
            Node::MatchRequired {
                location,
                value,
                pattern,
                operator,
            }
        }
    }

    /// `receiver.message` and `receiver&.message`, with optional arguments
    /// and block.
    fn parse_method_call(&mut self, receiver: Node<'a>, bp: BindingPower) -> Node<'a> {
        let operator = self.bump();
        let flags = if operator.kind == TokenKind::AmpersandDot {
            CallFlags::SAFE_NAVIGATION
        } else {
            CallFlags::NONE
        };
        let receiver = self.alloc(receiver);

        if self.at(TokenKind::ParenthesisLeft) {
            // `receiver.()` calls `call`.
            return self.parse_call_tail(Some(receiver), Some(operator), None, "call", flags, bp);
        }
        if is_message_token(self.current.kind) {
            let message = self.bump();
            let name = self.name_at(message.location);
            return self.parse_call_tail(Some(receiver), Some(operator), Some(message), name, flags, bp);
        }

        let operator_text = self.name_at(operator.location);
        self.error_at_current(&messages::EXPECTED_MESSAGE_NAME, &[operator_text]);
        let message = self.missing_token();
        Node::Call {
            location: join(receiver.location(), operator.location),
            receiver: Some(receiver),
            operator: Some(operator),
            message: Some(message),
            opening: None,
            arguments: None,
            closing: None,
            block: None,
            flags,
            name: "",
        }
    }

    /// `Parent::Child` or `receiver::method`.
    fn parse_scope_resolution(&mut self, parent: Node<'a>, bp: BindingPower) -> Node<'a> {
        let delimiter = self.bump();
        let parent = self.alloc(parent);
        let token = self.current;
        match token.kind {
            TokenKind::Constant if self.source.get(token.end() as usize) != Some(&b'(') => {
                self.advance();
                let child = self.alloc(Node::ConstantRead {
                    location: token.location,
                    name: self.name_at(token.location),
                });
                Node::ConstantPath {
                    location: join(parent.location(), token.location),
                    parent: Some(parent),
                    child,
                    delimiter,
                }
            }
            TokenKind::Constant | TokenKind::Identifier => {
                self.advance();
                let name = self.name_at(token.location);
                self.parse_call_tail(Some(parent), Some(delimiter), Some(token), name, CallFlags::NONE, bp)
            }
            kind => {
                self.error_at_current(&messages::EXPECTED_IDENTIFIER_OR_CONSTANT, &[]);
                // A stray name or literal on the same line cannot continue
                // anything else, so it becomes the missing child.
                let child_location = if is_stray_path_token(kind) {
                    self.advance();
                    token.location
                } else {
                    Location::empty(delimiter.end())
                };
                let child = self.alloc(Node::Missing {
                    location: child_location,
                });
                Node::ConstantPath {
                    location: join(parent.location(), child_location),
                    parent: Some(parent),
                    child,
                    delimiter,
                }
            }
        }
    }

    /// `receiver[index]`
    fn parse_index(&mut self, receiver: Node<'a>) -> Node<'a> {
        let opening = self.bump();
        let list = self.parse_argument_list(Some(TokenKind::BracketRight));
        let closing = self.expect(TokenKind::BracketRight, &messages::EXPECTED_INDEX_CLOSE, &[]);
        let receiver = self.alloc(receiver);
        let (arguments, block) = self.finish_argument_list(list);
        Node::Call {
            location: join(receiver.location(), closing.location),
            receiver: Some(receiver),
            operator: None,
            message: None,
            opening: Some(opening),
            arguments,
            closing: Some(closing),
            block,
            flags: CallFlags::NONE,
            name: "[]",
        }
    }
}

/// Whether a token can begin an expression.
pub(super) fn starts_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Constant
            | TokenKind::InstanceVariable
            | TokenKind::ClassVariable
            | TokenKind::GlobalVariable
            | TokenKind::BackReference
            | TokenKind::NthReference
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
            | TokenKind::BracketLeftArray
            | TokenKind::BracketLeft
            | TokenKind::BraceLeft
            | TokenKind::ParenthesisLeft
            | TokenKind::ParenthesisLeftParentheses
            | TokenKind::MinusGreater
            | TokenKind::UMinus
            | TokenKind::UPlus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::KeywordNot
            | TokenKind::UStar
            | TokenKind::UColonColon
            | TokenKind::UDotDot
            | TokenKind::UDotDotDot
            | TokenKind::KeywordNil
            | TokenKind::KeywordTrue
            | TokenKind::KeywordFalse
            | TokenKind::KeywordSelf
            | TokenKind::KeywordLine
            | TokenKind::KeywordEncoding
            | TokenKind::KeywordFile
            | TokenKind::KeywordRedo
            | TokenKind::KeywordRetry
            | TokenKind::KeywordDefined
            | TokenKind::KeywordSuper
            | TokenKind::KeywordYield
            | TokenKind::KeywordAlias
            | TokenKind::KeywordUndef
            | TokenKind::KeywordDef
            | TokenKind::KeywordClass
            | TokenKind::KeywordModule
            | TokenKind::KeywordIf
            | TokenKind::KeywordUnless
            | TokenKind::KeywordWhile
            | TokenKind::KeywordUntil
            | TokenKind::KeywordFor
            | TokenKind::KeywordCase
            | TokenKind::KeywordBegin
            | TokenKind::KeywordBeginUpcase
            | TokenKind::KeywordEndUpcase
            | TokenKind::KeywordReturn
            | TokenKind::KeywordBreak
            | TokenKind::KeywordNext
            | TokenKind::Invalid
    )
}

/// Tokens that can name a method after `.` or `&.`.
fn is_message_token(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier | TokenKind::Constant) || kind.is_keyword() || is_operator_name(kind)
}

/// Operator tokens that are also method names, as after `def` or `.`.
pub(super) fn is_operator_name(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::StarStar
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::EqualEqual
            | TokenKind::EqualEqualEqual
            | TokenKind::EqualTilde
            | TokenKind::BangEqual
            | TokenKind::BangTilde
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::LessEqualGreater
            | TokenKind::LessLess
            | TokenKind::GreaterGreater
            | TokenKind::Ampersand
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::BracketLeftRight
            | TokenKind::BracketLeftRightEqual
            | TokenKind::Backtick
    )
}

/// Tokens after `::` that are consumed into the missing child.
fn is_stray_path_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::InstanceVariable
            | TokenKind::ClassVariable
            | TokenKind::GlobalVariable
            | TokenKind::BackReference
            | TokenKind::NthReference
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::RationalNumber
            | TokenKind::ImaginaryNumber
            | TokenKind::Invalid
    )
}

pub(super) fn range_flags(operator: Token) -> RangeFlags {
    match operator.kind {
        TokenKind::DotDotDot | TokenKind::UDotDotDot => RangeFlags::EXCLUDE_END,
        _ => RangeFlags::NONE,
    }
}
