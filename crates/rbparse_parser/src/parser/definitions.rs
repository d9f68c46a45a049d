//! Definitions: parameter lists, `def`, `class`, `module`, `alias` and `undef`.

use rbparse_ast::flags::CallFlags;
use rbparse_ast::node::{Node, OptionalNode};
use rbparse_ast::token::{Token, TokenKind};
use rbparse_core::text::Location;
use rbparse_diagnostics::{messages, DiagnosticMessage};
use rbparse_lexer::LexState;

use super::expression::{is_operator_name, starts_expression};
use super::strings::is_symbol_name;
use super::{join, Parser};
use crate::precedence::BindingPower;
use crate::scope::ScopeKind;

/// Where a parameter list appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParamsContext {
    Def,
    Block,
    Lambda,
}

/// Parameter kinds in the order they must appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Required,
    Optional,
    Rest,
    Post,
    Keyword,
    KeywordRest,
    Block,
    Forwarding,
}

#[derive(Default)]
struct ParameterSet<'a> {
    requireds: Vec<Node<'a>>,
    optionals: Vec<Node<'a>>,
    rest: Option<Node<'a>>,
    posts: Vec<Node<'a>>,
    keywords: Vec<Node<'a>>,
    keyword_rest: Option<Node<'a>>,
    block: Option<Node<'a>>,
}

impl<'a> ParameterSet<'a> {
    fn location(&self) -> Option<Location> {
        let all = self
            .requireds
            .iter()
            .chain(&self.optionals)
            .chain(&self.rest)
            .chain(&self.posts)
            .chain(&self.keywords)
            .chain(&self.keyword_rest)
            .chain(&self.block)
            .map(Node::location);
        all.reduce(|left, right| left.join(&right))
    }
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Parameters
    // ========================================================================

    /// A parameter list. With `closing`, the list runs up to that token;
    /// without it, it is the bare list after a method name or `->`, and
    /// `None` is returned when no parameter starts here.
    pub(super) fn parse_parameters(&mut self, context: ParamsContext, closing: Option<TokenKind>) -> OptionalNode<'a> {
        if closing.is_none() && !starts_parameter(self.current.kind) {
            return None;
        }
        let default_bp = match context {
            ParamsContext::Block => BindingPower::BitwiseOr.tighter(),
            ParamsContext::Def | ParamsContext::Lambda => BindingPower::Defined,
        };

        let mut set = ParameterSet::default();
        let mut phase = Phase::Required;
        loop {
            if let Some(closing) = closing {
                self.skip_newlines();
                if self.at(closing) || self.at(TokenKind::Eof) {
                    break;
                }
            }
            // Block locals follow a `;`.
            if context != ParamsContext::Def && self.at(TokenKind::Semicolon) {
                break;
            }
            if phase == Phase::Forwarding {
                self.error_at_current(&messages::FORWARDING_NOT_LAST, &[]);
            }

            let before = self.current;
            match self.current.kind {
                TokenKind::Identifier => {
                    let name_token = self.bump();
                    let name = self.declare_parameter(name_token);
                    if self.at(TokenKind::Equal) {
                        let operator = self.bump();
                        let value = self.parse_expression(default_bp, &messages::EXPECTED_PARAMETER_DEFAULT);
                        self.check_phase(name_token, &mut phase, Phase::Optional);
                        let value = self.alloc(value);
                        set.optionals.push(Node::OptionalParameter {
                            location: join(name_token.location, value.location()),
                            name,
                            name_token,
                            operator,
                            value,
                        });
                    } else {
                        let parameter = Node::RequiredParameter {
                            location: name_token.location,
                            name,
                        };
                        self.push_required(&mut set, &mut phase, parameter);
                    }
                }
                TokenKind::ParenthesisLeft | TokenKind::ParenthesisLeftParentheses => {
                    let parameter = self.parse_destructured_parameter();
                    self.push_required(&mut set, &mut phase, parameter);
                }
                TokenKind::UStar | TokenKind::Star => {
                    let operator = self.bump();
                    let name = self.accept(TokenKind::Identifier);
                    if let Some(token) = name {
                        self.declare_parameter(token);
                    }
                    if set.rest.is_some() {
                        self.error(operator.location, &messages::UNEXPECTED_MULTIPLE_REST, &[]);
                    } else {
                        self.check_phase(operator, &mut phase, Phase::Rest);
                    }
                    let parameter = Node::RestParameter {
                        location: join(operator.location, name.map_or(operator.location, |token| token.location)),
                        operator,
                        name,
                    };
                    if set.rest.is_none() {
                        set.rest = Some(parameter);
                    }
                }
                TokenKind::Label => {
                    let label = self.bump();
                    let name_end = label.end().saturating_sub(1).max(label.start());
                    self.declare_parameter(Token::new(TokenKind::Identifier, label.start(), name_end));
                    let value = if starts_expression(self.current.kind) {
                        let value = self.parse_expression(default_bp, &messages::EXPECTED_PARAMETER_DEFAULT);
                        Some(self.alloc(value))
                    } else {
                        None
                    };
                    self.check_phase(label, &mut phase, Phase::Keyword);
                    set.keywords.push(Node::KeywordParameter {
                        location: join(label.location, value.map_or(label.location, |value| value.location())),
                        name: label,
                        value,
                    });
                }
                TokenKind::UStarStar | TokenKind::StarStar => {
                    let operator = self.bump();
                    let parameter = if self.at(TokenKind::KeywordNil) {
                        let keyword = self.bump();
                        Node::NoKeywordsParameter {
                            location: join(operator.location, keyword.location),
                            operator,
                            keyword,
                        }
                    } else {
                        let name = self.accept(TokenKind::Identifier);
                        if let Some(token) = name {
                            self.declare_parameter(token);
                        }
                        Node::KeywordRestParameter {
                            location: join(operator.location, name.map_or(operator.location, |token| token.location)),
                            operator,
                            name,
                        }
                    };
                    self.check_phase(operator, &mut phase, Phase::KeywordRest);
                    set.keyword_rest = Some(parameter);
                }
                TokenKind::UAmpersand | TokenKind::Ampersand => {
                    let operator = self.bump();
                    let name = self.accept(TokenKind::Identifier);
                    if let Some(token) = name {
                        self.declare_parameter(token);
                    }
                    self.check_phase(operator, &mut phase, Phase::Block);
                    set.block = Some(Node::BlockParameter {
                        location: join(operator.location, name.map_or(operator.location, |token| token.location)),
                        name,
                        operator,
                    });
                }
                TokenKind::UDotDotDot | TokenKind::DotDotDot => {
                    let dots = self.bump();
                    if context == ParamsContext::Def {
                        self.scopes.mark_forwarding();
                    } else {
                        self.error(dots.location, &messages::FORWARDING_IN_BLOCK, &[]);
                    }
                    self.check_phase(dots, &mut phase, Phase::Forwarding);
                    set.keyword_rest = Some(Node::ForwardingParameter { location: dots.location });
                }
                _ => {
                    self.error_at_current(&messages::EXPECTED_PARAMETER, &[]);
                }
            }

            if self.current == before {
                break;
            }
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }

        let location = set.location()?;
        Some(self.alloc(Node::Parameters {
            location,
            requireds: self.alloc_nodes(set.requireds),
            optionals: self.alloc_nodes(set.optionals),
            rest: set.rest.map(|node| self.alloc(node)),
            posts: self.alloc_nodes(set.posts),
            keywords: self.alloc_nodes(set.keywords),
            keyword_rest: set.keyword_rest.map(|node| self.alloc(node)),
            block: set.block.map(|node| self.alloc(node)),
        }))
    }

    /// Bind a parameter name, reporting duplicates. Names starting with `_`
    /// may repeat.
    fn declare_parameter(&mut self, token: Token) -> &'a str {
        let name = self.name_at(token.location);
        if !self.scopes.add_local(name) && !name.starts_with('_') {
            self.error(token.location, &messages::DUPLICATED_PARAMETER, &[]);
        }
        name
    }

    /// Move to `next`, reporting a parameter that comes after a later kind.
    fn check_phase(&mut self, token: Token, phase: &mut Phase, next: Phase) {
        if next < *phase || (next == *phase && matches!(next, Phase::KeywordRest | Phase::Block | Phase::Forwarding)) {
            self.error(token.location, &messages::UNEXPECTED_PARAMETER_ORDER, &[]);
            return;
        }
        *phase = next;
    }

    /// Required parameters before the optional ones are leading; after
    /// optionals or a rest they are trailing.
    fn push_required(&mut self, set: &mut ParameterSet<'a>, phase: &mut Phase, parameter: Node<'a>) {
        match *phase {
            Phase::Required => set.requireds.push(parameter),
            Phase::Optional | Phase::Rest | Phase::Post => {
                *phase = Phase::Post;
                set.posts.push(parameter);
            }
            _ => {
                self.error(parameter.location(), &messages::UNEXPECTED_PARAMETER_ORDER, &[]);
                set.posts.push(parameter);
            }
        }
    }

    /// `(a, (b, *c))` in a parameter list.
    fn parse_destructured_parameter(&mut self) -> Node<'a> {
        let opening = self.bump();
        let mut parameters = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Identifier => {
                    let token = self.bump();
                    let name = self.declare_parameter(token);
                    parameters.push(Node::RequiredParameter {
                        location: token.location,
                        name,
                    });
                }
                TokenKind::UStar | TokenKind::Star => {
                    let operator = self.bump();
                    let name = self.accept(TokenKind::Identifier);
                    if let Some(token) = name {
                        self.declare_parameter(token);
                    }
                    parameters.push(Node::RestParameter {
                        location: join(operator.location, name.map_or(operator.location, |token| token.location)),
                        operator,
                        name,
                    });
                }
                TokenKind::ParenthesisLeft | TokenKind::ParenthesisLeftParentheses => {
                    parameters.push(self.nested(Self::parse_destructured_parameter));
                }
                _ => {
                    self.error_at_current(&messages::EXPECTED_PARAMETER, &[]);
                    break;
                }
            }
            if self.accept(TokenKind::Comma).is_none() {
                break;
            }
        }
        let closing = self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_MULTI_TARGET_CLOSE, &[]);
        Node::RequiredDestructuredParameter {
            location: join(opening.location, closing.location),
            parameters: self.alloc_nodes(parameters),
            opening,
            closing,
        }
    }

    // ========================================================================
    // def
    // ========================================================================

    pub(super) fn parse_def(&mut self) -> Node<'a> {
        let def_keyword = self.bump();
        let (receiver, operator, name_token) = self.parse_def_name();
        let name = if name_token.is_missing() {
            ""
        } else {
            self.name_at(name_token.location)
        };

        self.scopes.push(ScopeKind::Def);
        let (lparen, parameters, rparen) =
            if self.at_any(&[TokenKind::ParenthesisLeft, TokenKind::ParenthesisLeftParentheses]) {
                let lparen = self.bump();
                let parameters = self.parse_parameters(ParamsContext::Def, Some(TokenKind::ParenthesisRight));
                let rparen = self.expect(TokenKind::ParenthesisRight, &messages::EXPECTED_DEF_PARAMETERS_CLOSE, &[]);
                (Some(lparen), parameters, Some(rparen))
            } else {
                (None, self.parse_parameters(ParamsContext::Def, None), None)
            };

        let in_rescue = std::mem::replace(&mut self.in_rescue, false);
        let (equal, body, end_keyword) = if self.at(TokenKind::Equal) {
            let equal = self.bump();
            self.skip_newlines();
            let mut body = self.parse_expression(BindingPower::Assignment, &messages::EXPECTED_DEF_BODY);
            if self.at(TokenKind::KeywordRescueModifier) {
                body = self.parse_rescue_modifier(body);
            }
            (Some(equal), Some(self.single_statement(body)), None)
        } else {
            let body = self.parse_body_with_rescue();
            let end = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &["def"]);
            (None, body, Some(end))
        };
        self.in_rescue = in_rescue;
        let locals = self.scopes.pop();

        let end = [
            end_keyword.map(|token| token.end()),
            body.map(|node| node.location().end),
            rparen.map(|token| token.end()),
            parameters.map(|node| node.location().end),
            Some(name_token.end()),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(def_keyword.end());

        Node::Def {
            location: Location::new(def_keyword.start(), end.max(def_keyword.start())),
            name,
            name_token,
            receiver,
            parameters,
            body,
            locals: self.alloc_locals(locals),
            def_keyword,
            operator,
            lparen,
            rparen,
            equal,
            end_keyword,
        }
    }

    /// The method name after `def`, with an optional `receiver.` prefix.
    fn parse_def_name(&mut self) -> (OptionalNode<'a>, Option<Token>, Token) {
        let first = self.current;
        if !is_def_name(first.kind) && !is_def_receiver(first.kind) {
            self.error_at_current(&messages::EXPECTED_DEF_NAME, &[]);
            return (None, None, self.missing_token());
        }
        self.advance();
        if !self.at_any(&[TokenKind::Dot, TokenKind::ColonColon]) {
            return (None, None, first);
        }

        let receiver = self.def_receiver(first);
        // The name after the dot lexes as a method name.
        self.lexer.set_state(LexState::FNAME);
        let operator = self.bump();
        let name_token = if is_def_name(self.current.kind) {
            self.bump()
        } else {
            self.error_at_current(&messages::EXPECTED_DEF_NAME, &[]);
            self.missing_token()
        };
        (Some(self.alloc(receiver)), Some(operator), name_token)
    }

    fn def_receiver(&mut self, token: Token) -> Node<'a> {
        let location = token.location;
        match token.kind {
            TokenKind::KeywordSelf => Node::SelfReference { location },
            TokenKind::KeywordNil => Node::Nil { location },
            TokenKind::KeywordTrue => Node::True { location },
            TokenKind::KeywordFalse => Node::False { location },
            TokenKind::Constant => Node::ConstantRead {
                location,
                name: self.name_at(location),
            },
            TokenKind::Identifier => {
                let name = self.name_at(location);
                match self.scopes.resolve(name) {
                    Some(depth) => Node::LocalVariableRead { location, name, depth },
                    None => Node::Call {
                        location,
                        receiver: None,
                        operator: None,
                        message: Some(token),
                        opening: None,
                        arguments: None,
                        closing: None,
                        block: None,
                        flags: CallFlags::VARIABLE_CALL,
                        name,
                    },
                }
            }
            TokenKind::InstanceVariable | TokenKind::ClassVariable | TokenKind::GlobalVariable => {
                self.variable_read(token)
            }
            _ => {
                self.error(location, &messages::EXPECTED_DEF_NAME, &[]);
                Node::Missing { location }
            }
        }
    }

    // ========================================================================
    // class and module
    // ========================================================================

    pub(super) fn parse_class(&mut self) -> Node<'a> {
        let class_keyword = self.bump();
        if self.at(TokenKind::LessLess) {
            return self.parse_singleton_class(class_keyword);
        }
        if self.scopes.in_def() {
            self.error(class_keyword.location, &messages::CLASS_IN_METHOD, &[]);
        }

        if !starts_expression(self.current.kind) {
            self.error_at_current(&messages::EXPECTED_CLASS_NAME, &[]);
            let constant_path = self.alloc(self.missing_node());
            let end_keyword = self.missing_token();
            return Node::Class {
                location: join(class_keyword.location, end_keyword.location),
                locals: &[],
                class_keyword,
                constant_path,
                inheritance_operator: None,
                superclass: None,
                body: None,
                end_keyword,
                name: "",
            };
        }

        let constant_path = self.parse_expression(BindingPower::Index, &messages::EXPECTED_CLASS_NAME);
        self.check_constant_path(&constant_path);
        let (inheritance_operator, superclass) = if self.at(TokenKind::Less) {
            let operator = self.bump();
            let superclass = self.parse_expression(BindingPower::Index, &messages::EXPECTED_SUPERCLASS);
            (Some(operator), Some(self.alloc(superclass)))
        } else {
            (None, None)
        };

        self.scopes.push(ScopeKind::Class);
        let body = self.parse_body_with_rescue();
        let end_keyword = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &["class"]);
        let locals = self.scopes.pop();

        Node::Class {
            location: join(class_keyword.location, end_keyword.location),
            locals: self.alloc_locals(locals),
            class_keyword,
            name: constant_name(&constant_path),
            constant_path: self.alloc(constant_path),
            inheritance_operator,
            superclass,
            body,
            end_keyword,
        }
    }

    fn check_constant_path(&mut self, path: &Node<'a>) {
        if !matches!(
            path,
            Node::ConstantRead { .. } | Node::ConstantPath { .. } | Node::Missing { .. }
        ) {
            self.error(path.location(), &messages::CLASS_NAME_NOT_CONSTANT, &[]);
        }
    }

    /// `class << expression`
    fn parse_singleton_class(&mut self, class_keyword: Token) -> Node<'a> {
        let operator = self.bump();
        let expression = self.parse_expression(BindingPower::Defined, &messages::EXPECTED_SINGLETON_CLASS_EXPRESSION);
        self.scopes.push(ScopeKind::SingletonClass);
        let body = self.parse_body_with_rescue();
        let end_keyword = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &["class"]);
        let locals = self.scopes.pop();
        Node::SingletonClass {
            location: join(class_keyword.location, end_keyword.location),
            locals: self.alloc_locals(locals),
            class_keyword,
            operator,
            expression: self.alloc(expression),
            body,
            end_keyword,
        }
    }

    pub(super) fn parse_module(&mut self) -> Node<'a> {
        let module_keyword = self.bump();
        if self.scopes.in_def() {
            self.error(module_keyword.location, &messages::MODULE_IN_METHOD, &[]);
        }

        if !starts_expression(self.current.kind) {
            self.error_at_current(&messages::EXPECTED_MODULE_NAME, &[]);
            let constant_path = self.alloc(self.missing_node());
            let end_keyword = self.missing_token();
            return Node::Module {
                location: join(module_keyword.location, end_keyword.location),
                locals: &[],
                module_keyword,
                constant_path,
                body: None,
                end_keyword,
                name: "",
            };
        }

        let constant_path = self.parse_expression(BindingPower::Index, &messages::EXPECTED_MODULE_NAME);
        self.check_constant_path(&constant_path);
        self.scopes.push(ScopeKind::Module);
        let body = self.parse_body_with_rescue();
        let end_keyword = self.expect(TokenKind::KeywordEnd, &messages::EXPECTED_END, &["module"]);
        let locals = self.scopes.pop();

        Node::Module {
            location: join(module_keyword.location, end_keyword.location),
            locals: self.alloc_locals(locals),
            module_keyword,
            name: constant_name(&constant_path),
            constant_path: self.alloc(constant_path),
            body,
            end_keyword,
        }
    }

    // ========================================================================
    // alias and undef
    // ========================================================================

    pub(super) fn parse_alias(&mut self) -> Node<'a> {
        let keyword = self.bump();

        if is_global_name(self.current.kind) {
            let new_token = self.bump();
            let new_name = self.variable_read(new_token);
            let old_name = if is_global_name(self.current.kind) {
                let old_token = self.bump();
                self.variable_read(old_token)
            } else {
                self.error_at_current(&messages::EXPECTED_ALIAS_GLOBAL, &[]);
                self.missing_node()
            };
            return self.alias_node(keyword, new_name, old_name);
        }

        // The second name lexes as a method name too.
        self.name_state = Some(LexState::FNAME | LexState::FITEM);
        let new_name = self.parse_method_name_symbol(&messages::EXPECTED_ALIAS_NAME);
        self.name_state = None;
        // A missing first name is reported once, not again for the second.
        let old_name = if new_name.is_missing() {
            self.missing_node()
        } else {
            self.parse_method_name_symbol(&messages::EXPECTED_ALIAS_NAME)
        };
        self.alias_node(keyword, new_name, old_name)
    }

    fn alias_node(&self, keyword: Token, new_name: Node<'a>, old_name: Node<'a>) -> Node<'a> {
        Node::Alias {
            location: join(keyword.location, old_name.location()),
            new_name: self.alloc(new_name),
            old_name: self.alloc(old_name),
            keyword,
        }
    }

    pub(super) fn parse_undef(&mut self) -> Node<'a> {
        let keyword = self.bump();
        let mut names = Vec::new();
        loop {
            let name = self.parse_method_name_symbol(&messages::EXPECTED_UNDEF_NAME);
            let missing = name.is_missing();
            names.push(name);
            if missing || !self.at(TokenKind::Comma) {
                break;
            }
            self.lexer.set_state(LexState::FNAME | LexState::FITEM);
            self.advance();
        }
        let last = names.last().map_or(keyword.location, |name| name.location());
        Node::Undef {
            location: join(keyword.location, last),
            names: self.alloc_nodes(names),
            keyword,
        }
    }

    /// A method name given to `alias` or `undef`: a symbol literal or a
    /// bare name, which becomes a symbol without an opening.
    fn parse_method_name_symbol(&mut self, message: &DiagnosticMessage) -> Node<'a> {
        if self.at(TokenKind::SymbolBegin) {
            return self.parse_symbol();
        }
        if is_symbol_name(self.current.kind) && !is_global_name(self.current.kind) {
            let value = self.current;
            self.advance_name();
            return Node::Symbol {
                location: value.location,
                opening: None,
                value: Some(value),
                closing: None,
                unescaped: self.text(value.location),
            };
        }
        self.error_at_current(message, &[]);
        self.missing_node()
    }
}

/// The name a class or module is declared with: the last constant of its path.
fn constant_name<'a>(path: &Node<'a>) -> &'a str {
    match path {
        Node::ConstantRead { name, .. } => *name,
        Node::ConstantPath { child, .. } => constant_name(child),
        _ => "",
    }
}

fn starts_parameter(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Label
            | TokenKind::UStar
            | TokenKind::Star
            | TokenKind::UStarStar
            | TokenKind::StarStar
            | TokenKind::UAmpersand
            | TokenKind::Ampersand
            | TokenKind::UDotDotDot
            | TokenKind::DotDotDot
    )
}

/// Tokens that can name a method after `def`.
fn is_def_name(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier | TokenKind::Constant) || kind.is_keyword() || is_operator_name(kind)
}

/// Tokens that can only be a singleton receiver after `def`.
fn is_def_receiver(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::InstanceVariable | TokenKind::ClassVariable | TokenKind::GlobalVariable
    )
}

fn is_global_name(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::GlobalVariable | TokenKind::BackReference | TokenKind::NthReference
    )
}
