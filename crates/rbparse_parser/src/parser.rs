//! The Ruby parser.
//!
//! A recursive descent parser with a Pratt loop for operators. It pulls
//! tokens from the lexer one at a time and builds an arena-allocated tree.
//! Syntax errors never stop the parse: a missing token becomes a zero-width
//! `Missing` token, a missing expression becomes a `Missing` node, and the
//! fault is recorded as a diagnostic.

use bumpalo::Bump;
use rbparse_ast::comment::Comment;
use rbparse_ast::node::{Bytes, Locals, Node, NodeList, OptionalNode, TokenList};
use rbparse_ast::token::{Token, TokenKind};
use rbparse_config::ParseOptions;
use rbparse_core::ensure_sufficient_stack;
use rbparse_core::text::Location;
use rbparse_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use rbparse_lexer::{LexState, Lexer};
use tracing::debug;

use crate::precedence::BindingPower;
use crate::scope::{ScopeKind, ScopeStack};

mod calls;
mod control;
mod definitions;
mod expression;
mod patterns;
mod primary;
mod strings;
mod targets;

/// Maximum nesting of expressions and patterns before the parser gives up
/// on a subtree. The stack grows on demand below this, so the limit only
/// bounds memory for pathological input.
const MAX_RECURSION_DEPTH: u32 = 5_000;

/// The outcome of a parse: a complete tree plus everything noticed on the way.
#[derive(Debug)]
pub struct ParseResult<'a> {
    /// Always a `Program` node, even when there are errors.
    pub root: &'a Node<'a>,
    /// Syntax errors, in source order.
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub comments: Vec<Comment>,
}

impl<'a> ParseResult<'a> {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct Parser<'a> {
    arena: &'a Bump,
    source: &'a [u8],
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    /// Whether whitespace separated `current` from the token before it.
    space_before: bool,
    diagnostics: DiagnosticCollection,
    scopes: ScopeStack<'a>,
    /// Value for `__FILE__`.
    filepath: &'a str,
    frozen_string_literal: bool,
    recursion_depth: u32,
    /// Whether a `do` here opens a block for the call being parsed. Off in
    /// loop predicates and in command arguments, where `do` belongs to the
    /// loop or to the outer command.
    accepts_do_block: bool,
    /// Lexer state to apply before lexing past the next name token. Set by
    /// `alias` so its second name lexes in method-name position.
    name_state: Option<LexState>,
    /// Inside the statements of a `rescue` clause, where `retry` is valid.
    in_rescue: bool,
    /// Every token pulled from the lexer, when recording.
    tokens: Option<Vec<Token>>,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, source: &'a [u8], options: &ParseOptions) -> Self {
        let mut scopes = ScopeStack::new();
        for locals in &options.scopes {
            scopes.push(ScopeKind::Eval);
            for name in locals {
                scopes.add_local(arena.alloc_str(name));
            }
        }
        scopes.push(ScopeKind::Top);

        let start = Token::new(TokenKind::Eof, 0, 0);
        Self {
            arena,
            source,
            lexer: Lexer::new(source),
            current: start,
            previous: start,
            space_before: false,
            diagnostics: DiagnosticCollection::new(),
            scopes,
            filepath: arena.alloc_str(&options.filepath),
            frozen_string_literal: options.frozen_string_literal,
            recursion_depth: 0,
            accepts_do_block: true,
            name_state: None,
            in_rescue: false,
            tokens: None,
        }
    }

    /// Keep every token the lexer produces, including comments and newlines.
    pub fn with_token_recording(mut self) -> Self {
        self.tokens = Some(Vec::new());
        self
    }

    pub fn parse(self) -> ParseResult<'a> {
        self.parse_with_tokens().0
    }

    /// Parse, also returning the recorded tokens (empty unless recording).
    pub fn parse_with_tokens(mut self) -> (ParseResult<'a>, Vec<Token>) {
        self.advance();
        let statements = self.parse_program_statements();
        let locals = self.scopes.pop();
        let locals = self.alloc_locals(locals);
        let root = self.alloc(Node::Program {
            location: statements.location(),
            locals,
            statements,
        });

        let comments = self.lexer.take_comments();
        let (mut errors, warnings): (Vec<_>, Vec<_>) = self
            .diagnostics
            .into_diagnostics()
            .into_iter()
            .partition(Diagnostic::is_error);
        errors.sort_by_key(|diagnostic| diagnostic.location.start);
        debug!(errors = errors.len(), warnings = warnings.len(), "parse finished");

        let result = ParseResult {
            root,
            errors,
            warnings,
            comments,
        };
        (result, self.tokens.unwrap_or_default())
    }

    // ========================================================================
    // Token management
    // ========================================================================

    /// Move to the next significant token. Comments and `__END__` are
    /// recorded by the lexer and skipped here.
    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            let token = self.lexer.next_token();
            let lexed = self.lexer.take_diagnostics();
            if !lexed.is_empty() {
                self.diagnostics.extend(lexed);
            }
            if let Some(tokens) = &mut self.tokens {
                if token.kind != TokenKind::Eof {
                    tokens.push(token);
                }
            }
            if token.kind.is_comment() || token.kind == TokenKind::EndData {
                continue;
            }
            self.current = token;
            self.space_before = self.lexer.space_seen();
            break;
        }
    }

    /// Advance past the last token of a name, applying a pending lexer
    /// state first.
    fn advance_name(&mut self) {
        if let Some(state) = self.name_state.take() {
            self.lexer.set_state(state);
        }
        self.advance();
    }

    #[inline]
    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    #[inline]
    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current.kind)
    }

    /// Consume the current token and return it.
    fn bump(&mut self) -> Token {
        let token = self.current;
        self.advance();
        token
    }

    fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    /// Consume a required token, or report `message` and stand in a
    /// `Missing` token without consuming anything.
    fn expect(&mut self, kind: TokenKind, message: &DiagnosticMessage, args: &[&str]) -> Token {
        if let Some(token) = self.accept(kind) {
            return token;
        }
        self.error_at_current(message, args);
        self.missing_token()
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Consume newlines and semicolons, returning whether there were any.
    fn accept_separators(&mut self) -> bool {
        let mut any = false;
        while self.at_any(&[TokenKind::Newline, TokenKind::Semicolon]) {
            self.advance();
            any = true;
        }
        any
    }

    #[inline]
    fn text(&self, location: Location) -> &'a [u8] {
        &self.source[location.to_range()]
    }

    /// The text at `location` as a name.
    fn name_at(&self, location: Location) -> &'a str {
        let bytes = self.text(location);
        match std::str::from_utf8(bytes) {
            Ok(name) => name,
            Err(_) => &*self.arena.alloc_str(&String::from_utf8_lossy(bytes)),
        }
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn error(&mut self, location: Location, message: &DiagnosticMessage, args: &[&str]) {
        debug!(code = message.code, %location, "syntax error");
        self.diagnostics.add(Diagnostic::new(location, message, args));
    }

    /// Report a fault at the token the parser is looking at.
    fn error_at_current(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let location = self.current.location;
        self.error(location, message, args);
    }

    /// Parse one level deeper. Past the nesting limit the production is
    /// skipped with an error and a `Missing` node in its place.
    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Node<'a>) -> Node<'a> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error_at_current(&messages::CANNOT_PARSE_EXPRESSION, &[]);
            return self.missing_node();
        }
        self.recursion_depth += 1;
        let node = ensure_sufficient_stack(|| parse(self));
        self.recursion_depth -= 1;
        node
    }

    // ========================================================================
    // Arena
    // ========================================================================

    // Nodes enter the arena only here, once their children are final, so
    // every stored node covers its children.

    #[inline]
    fn alloc(&self, node: Node<'a>) -> &'a Node<'a> {
        self.arena.alloc(node.covering_children())
    }

    fn alloc_nodes(&self, nodes: Vec<Node<'a>>) -> NodeList<'a> {
        if nodes.is_empty() {
            return &[];
        }
        self.arena
            .alloc_slice_fill_iter(nodes.into_iter().map(Node::covering_children))
    }

    fn alloc_tokens(&self, tokens: Vec<Token>) -> TokenList<'a> {
        if tokens.is_empty() {
            return &[];
        }
        self.arena.alloc_slice_copy(&tokens)
    }

    fn alloc_bytes(&self, bytes: Vec<u8>) -> Bytes<'a> {
        self.arena.alloc_slice_copy(&bytes)
    }

    fn alloc_locals(&self, locals: Vec<&'a str>) -> Locals<'a> {
        if locals.is_empty() {
            return &[];
        }
        self.arena.alloc_slice_copy(&locals)
    }

    /// A zero-width placeholder right after the last consumed token.
    fn missing_token(&self) -> Token {
        Token::missing(self.previous.end())
    }

    fn missing_node(&self) -> Node<'a> {
        Node::Missing {
            location: Location::empty(self.previous.end()),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_program_statements(&mut self) -> &'a Node<'a> {
        let mut body = Vec::new();
        loop {
            self.parse_statement_list_into(&mut body);
            if self.at(TokenKind::Eof) {
                break;
            }
            // A closing token with nothing open at the top level.
            let text = String::from_utf8_lossy(self.text(self.current.location)).into_owned();
            self.error_at_current(&messages::UNEXPECTED_TOKEN_IGNORED, &[&text]);
            self.advance();
        }
        let statements = self.statements_node(body);
        self.alloc(statements)
    }

    /// Parse statements up to a terminator of any enclosing construct.
    /// Returns `None` when there are none.
    fn parse_statements(&mut self) -> OptionalNode<'a> {
        let accepts_do_block = std::mem::replace(&mut self.accepts_do_block, true);
        let mut body = Vec::new();
        self.parse_statement_list_into(&mut body);
        self.accepts_do_block = accepts_do_block;
        if body.is_empty() {
            None
        } else {
            Some(self.alloc(self.statements_node(body)))
        }
    }

    fn parse_statement_list_into(&mut self, body: &mut Vec<Node<'a>>) {
        loop {
            self.accept_separators();
            if is_terminator(self.current.kind) {
                break;
            }

            let before = self.current;
            let statement = self.parse_statement();
            if self.current == before {
                // Nothing was consumed and the fault is already reported.
                self.advance();
                continue;
            }
            body.push(statement);

            if self.accept_separators() || is_terminator(self.current.kind) {
                continue;
            }
            self.error_at_current(&messages::EXPECTED_STATEMENT_SEPARATOR, &[]);
        }
    }

    fn parse_statement(&mut self) -> Node<'a> {
        self.parse_expression(BindingPower::Statement, &messages::CANNOT_PARSE_EXPRESSION)
    }

    fn statements_node(&self, body: Vec<Node<'a>>) -> Node<'a> {
        let location = match (body.first(), body.last()) {
            (Some(first), Some(last)) => first.location().join(&last.location()),
            _ => Location::empty(self.current.start().min(self.previous.end())),
        };
        Node::Statements {
            location,
            body: self.alloc_nodes(body),
        }
    }

    /// A statements node holding one statement.
    fn single_statement(&self, statement: Node<'a>) -> &'a Node<'a> {
        let location = statement.location();
        self.alloc(Node::Statements {
            location,
            body: self.alloc_nodes(vec![statement]),
        })
    }
}

/// Tokens that end a statement list because an enclosing construct owns them.
fn is_terminator(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Eof
            | TokenKind::KeywordEnd
            | TokenKind::BraceRight
            | TokenKind::ParenthesisRight
            | TokenKind::BracketRight
            | TokenKind::KeywordElse
            | TokenKind::KeywordElsif
            | TokenKind::KeywordWhen
            | TokenKind::KeywordIn
            | TokenKind::KeywordRescue
            | TokenKind::KeywordEnsure
            | TokenKind::EmbexprEnd
    )
}

/// Span from the start of `first` to the end of `last`, never inverted.
fn join(first: Location, last: Location) -> Location {
    Location::new(first.start, last.end.max(first.start))
}
