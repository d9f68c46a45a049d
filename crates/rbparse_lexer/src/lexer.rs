//! The lexer.
//!
//! A pull-based tokenizer: `next_token` lexes one token from the cursor in
//! the context of the top of the lex-mode stack. Lexical faults never stop
//! lexing; they are recorded as diagnostics and lexing continues, so the
//! parser always receives a token and eventually `Eof`.

use crate::char_codes::*;
use crate::mode::{HeredocIndent, HeredocQuote, LexMode};
use crate::state::LexState;
use rbparse_ast::comment::{Comment, CommentKind};
use rbparse_ast::token::{Token, TokenKind};
use rbparse_core::text::{Location, TextPos};
use rbparse_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use tracing::{debug, trace};

mod literal;
mod number;

pub struct Lexer<'a> {
    /// The source bytes being lexed.
    source: &'a [u8],
    /// Current position in the source.
    pos: usize,
    /// The lex-mode stack. Never empty; the bottom is `Default`.
    modes: Vec<LexMode>,
    state: LexState,
    /// Depth of unmatched `{` in the current code context.
    brace_depth: u32,
    /// End of the last heredoc body lexed on this line. Reaching the
    /// newline jumps here.
    heredoc_end: Option<usize>,
    /// Whether whitespace preceded the current token.
    space_seen: bool,
    /// `#` of an embedded variable was lexed; the variable comes next.
    embvar_pending: bool,
    /// Whether any code token has been lexed yet. Magic comments are only
    /// honored before the first one.
    seen_code: bool,
    frozen_string_literal: bool,
    diagnostics: DiagnosticCollection,
    comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            pos: 0,
            modes: vec![LexMode::Default],
            state: LexState::BEG,
            brace_depth: 0,
            heredoc_end: None,
            space_seen: false,
            embvar_pending: false,
            seen_code: false,
            frozen_string_literal: false,
            diagnostics: DiagnosticCollection::new(),
            comments: Vec::new(),
        }
    }

    #[inline]
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// The current position (end of the last token lexed).
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn state(&self) -> LexState {
        self.state
    }

    /// Override the lexer state. The parser uses this when it knows more
    /// than the lexer, e.g. that an identifier is a local variable.
    #[inline]
    pub fn set_state(&mut self, state: LexState) {
        self.state = state;
    }

    /// Whether whitespace preceded the last token lexed.
    #[inline]
    pub fn space_seen(&self) -> bool {
        self.space_seen
    }

    pub fn mode(&self) -> LexMode {
        self.modes.last().copied().unwrap_or(LexMode::Default)
    }

    /// Whether a `# frozen_string_literal: true` magic comment was seen.
    pub fn frozen_string_literal(&self) -> bool {
        self.frozen_string_literal
    }

    /// Take the diagnostics recorded so far.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Take the comments recorded so far.
    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    /// Lex the next token.
    pub fn next_token(&mut self) -> Token {
        let token = if self.embvar_pending {
            self.embvar_pending = false;
            self.lex_embedded_variable()
        } else {
            match self.mode() {
                LexMode::Default | LexMode::Embexpr { .. } => self.lex_code(),
                LexMode::String { .. } => self.lex_string(),
                LexMode::List { .. } => self.lex_list(),
                LexMode::Regexp { .. } => self.lex_regexp(),
                LexMode::Heredoc { .. } => self.lex_heredoc(),
                LexMode::Embdoc { .. } => self.lex_embdoc(),
            }
        };
        trace!(kind = ?token.kind, start = token.start(), end = token.end(), "token");
        token
    }

    // ========================================================================
    // Cursor helpers
    // ========================================================================

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    #[inline]
    pub(crate) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    #[inline]
    pub(crate) fn byte_at(&self, index: usize) -> Option<u8> {
        self.source.get(index).copied()
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    pub(crate) fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, start as TextPos, self.pos as TextPos)
    }

    pub(crate) fn error(&mut self, start: usize, end: usize, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics
            .add(Diagnostic::new(Location::from_offsets(start, end), message, args));
    }

    /// Start of the line after the one containing `from`, or the end of input.
    pub(crate) fn next_line_start(&self, from: usize) -> usize {
        match memchr::memchr(b'\n', &self.source[from.min(self.source.len())..]) {
            Some(offset) => from + offset + 1,
            None => self.source.len(),
        }
    }

    #[inline]
    fn is_line_start(&self, index: usize) -> bool {
        index == 0 || self.source.get(index - 1) == Some(&b'\n')
    }

    fn eof(&mut self) -> Token {
        let at = self.pos.min(self.source.len());
        self.pos = self.source.len();
        Token::new(TokenKind::Eof, at as TextPos, at as TextPos)
    }

    pub(crate) fn push_mode(&mut self, mode: LexMode) {
        debug!(mode = mode.name(), depth = self.modes.len() + 1, "push lex mode");
        self.modes.push(mode);
    }

    pub(crate) fn pop_mode(&mut self) {
        if self.modes.len() > 1 {
            if let Some(mode) = self.modes.pop() {
                debug!(mode = mode.name(), depth = self.modes.len(), "pop lex mode");
            }
        }
    }

    /// State after an operator: arguments follow in method-name position,
    /// an operand follows otherwise.
    #[inline]
    fn operator_state(&self) -> LexState {
        if self.state.is_fname() {
            LexState::ARG
        } else {
            LexState::BEG
        }
    }

    /// Whether the current byte, preceded by whitespace in argument
    /// position and not followed by whitespace, starts an argument.
    #[inline]
    fn is_spcarg(&self) -> bool {
        self.state.is_arg()
            && self.space_seen
            && !self.peek_at(1).map_or(true, is_whitespace)
    }

    // ========================================================================
    // Code
    // ========================================================================

    fn lex_code(&mut self) -> Token {
        self.space_seen = false;

        loop {
            let Some(byte) = self.peek() else {
                return self.eof();
            };
            let start = self.pos;
            match byte {
                b' ' | b'\t' | 0x0b | 0x0c | b'\r' => {
                    self.pos += 1;
                    self.space_seen = true;
                }
                b'\\' if self.peek_at(1) == Some(b'\n') => {
                    self.pos += 2;
                    self.space_seen = true;
                }
                b'\\' if self.peek_at(1) == Some(b'\r') && self.peek_at(2) == Some(b'\n') => {
                    self.pos += 3;
                    self.space_seen = true;
                }
                b'\n' => {
                    if let Some(token) = self.lex_newline() {
                        return token;
                    }
                }
                b'#' => return self.lex_comment(),
                b'=' if self.is_line_start(start) && self.starts_embdoc(start) => {
                    return self.lex_embdoc_begin();
                }
                b'_' if self.is_line_start(start) && self.starts_end_marker(start) => {
                    return self.lex_end_data();
                }
                0x00 | 0x04 | 0x1a => return self.eof(),
                _ => break,
            }
        }

        self.seen_code = true;
        let start = self.pos;
        let byte = self.source[start];
        let kind = match byte {
            b',' => self.op(1, TokenKind::Comma, LexState::BEG | LexState::LABEL),
            b';' => self.op(1, TokenKind::Semicolon, LexState::BEG),
            b'(' => {
                let kind = if self.state.is_beg() || (self.state.is_arg() && self.space_seen) {
                    TokenKind::ParenthesisLeftParentheses
                } else {
                    TokenKind::ParenthesisLeft
                };
                self.op(1, kind, LexState::BEG | LexState::LABEL)
            }
            b')' => self.op(1, TokenKind::ParenthesisRight, LexState::ENDFN),
            b'[' => self.lex_bracket(),
            b']' => self.op(1, TokenKind::BracketRight, LexState::END),
            b'{' => {
                self.brace_depth += 1;
                self.op(1, TokenKind::BraceLeft, LexState::BEG | LexState::LABEL)
            }
            b'}' => return self.lex_brace_right(),
            b'*' => self.lex_star(),
            b'!' => self.lex_bang(),
            b'=' => self.lex_equal(),
            b'<' => {
                if let Some(token) = self.lex_heredoc_start(start) {
                    return token;
                }
                self.lex_less()
            }
            b'>' => self.lex_greater(),
            b'"' => self.lex_string_begin(b'"', true),
            b'\'' => self.lex_string_begin(b'\'', false),
            b'`' => self.lex_backtick(),
            b'?' => self.lex_question(),
            b'&' => self.lex_ampersand(),
            b'|' => self.lex_pipe(),
            b'+' => self.lex_plus(),
            b'-' => self.lex_minus(),
            b'.' => self.lex_dot(),
            b':' => self.lex_colon(),
            b'/' => self.lex_slash(),
            b'^' => {
                if self.peek_at(1) == Some(b'=') {
                    self.op(2, TokenKind::CaretEqual, LexState::BEG)
                } else {
                    let state = self.operator_state();
                    self.op(1, TokenKind::Caret, state)
                }
            }
            b'~' => {
                if self.state.is_fname() && self.peek_at(1) == Some(b'@') {
                    self.op(2, TokenKind::Tilde, LexState::ARG)
                } else {
                    let state = self.operator_state();
                    self.op(1, TokenKind::Tilde, state)
                }
            }
            b'%' => self.lex_percent(),
            b'$' => self.lex_global_variable(),
            b'@' => self.lex_instance_variable(),
            b'0'..=b'9' => self.lex_number(),
            b'\\' => {
                self.pos += 1;
                self.error(start, self.pos, &messages::INVALID_CHARACTER, &["\\"]);
                TokenKind::Invalid
            }
            byte if is_identifier_start(byte) => self.lex_identifier(),
            byte => {
                self.pos += 1;
                let shown = (byte as char).escape_default().to_string();
                self.error(start, self.pos, &messages::INVALID_CHARACTER, &[&shown]);
                TokenKind::Invalid
            }
        };

        self.token(kind, start)
    }

    #[inline]
    fn op(&mut self, len: usize, kind: TokenKind, state: LexState) -> TokenKind {
        self.pos += len;
        self.state = state;
        kind
    }

    fn lex_newline(&mut self) -> Option<Token> {
        let start = self.pos;
        self.pos += 1;
        if let Some(end) = self.heredoc_end.take() {
            debug!(from = self.pos, to = end, "skip heredoc body");
            self.pos = end;
        }
        if self.state.ignores_newline() || self.next_line_continues_call() {
            self.space_seen = true;
            return None;
        }
        self.state = LexState::BEG;
        Some(Token::new(TokenKind::Newline, start as TextPos, (start + 1) as TextPos))
    }

    /// Whether the next non-blank line starts with `.` or `&.`, continuing a
    /// method chain.
    fn next_line_continues_call(&self) -> bool {
        let mut index = self.pos;
        while let Some(byte) = self.byte_at(index) {
            if is_whitespace(byte) {
                index += 1;
            } else {
                break;
            }
        }
        match (self.byte_at(index), self.byte_at(index + 1)) {
            (Some(b'.'), next) => next != Some(b'.'),
            (Some(b'&'), Some(b'.')) => true,
            _ => false,
        }
    }

    fn lex_comment(&mut self) -> Token {
        let start = self.pos;
        let end = match memchr::memchr(b'\n', &self.source[start..]) {
            Some(offset) => start + offset,
            None => self.source.len(),
        };
        self.pos = end;
        if !self.seen_code {
            self.check_magic_comment(start + 1, end);
        }
        self.comments
            .push(Comment::new(CommentKind::Inline, Location::from_offsets(start, end)));
        self.token(TokenKind::Comment, start)
    }

    /// Recognize `frozen_string_literal: true`, also in `-*- ... -*-` form.
    fn check_magic_comment(&mut self, start: usize, end: usize) {
        let text = String::from_utf8_lossy(&self.source[start..end]).to_ascii_lowercase();
        let text = text.replace('-', "_");
        for part in text.split(';') {
            let part = part.trim().trim_start_matches("_*_").trim_end_matches("_*_").trim();
            if let Some((key, value)) = part.split_once(':') {
                if key.trim() == "frozen_string_literal" {
                    self.frozen_string_literal = value.trim() == "true";
                    debug!(enabled = self.frozen_string_literal, "frozen_string_literal magic comment");
                }
            }
        }
    }

    fn starts_embdoc(&self, start: usize) -> bool {
        self.source[start..].starts_with(b"=begin")
            && self.byte_at(start + 6).map_or(true, is_whitespace)
    }

    fn starts_end_marker(&self, start: usize) -> bool {
        if !self.source[start..].starts_with(b"__END__") {
            return false;
        }
        match self.byte_at(start + 7) {
            None | Some(b'\n') => true,
            Some(b'\r') => self.byte_at(start + 8) == Some(b'\n'),
            _ => false,
        }
    }

    fn lex_embdoc_begin(&mut self) -> Token {
        let start = self.pos;
        self.pos = self.next_line_start(start);
        self.push_mode(LexMode::Embdoc { begin: start });
        self.token(TokenKind::EmbdocBegin, start)
    }

    fn lex_embdoc(&mut self) -> Token {
        let LexMode::Embdoc { begin } = self.mode() else {
            return self.eof();
        };
        let start = self.pos;
        if self.is_eof() {
            self.error(begin, begin + 6, &messages::UNTERMINATED_EMBDOC, &[]);
            self.comments.push(Comment::new(
                CommentKind::EmbeddedDocument,
                Location::from_offsets(begin, self.source.len()),
            ));
            self.pop_mode();
            return self.eof();
        }
        let line_end = self.next_line_start(start);
        self.pos = line_end;
        let line = &self.source[start..line_end];
        if line.starts_with(b"=end") && line.get(4).map_or(true, |b| is_whitespace(*b)) {
            self.comments.push(Comment::new(
                CommentKind::EmbeddedDocument,
                Location::from_offsets(begin, line_end),
            ));
            self.pop_mode();
            return self.token(TokenKind::EmbdocEnd, start);
        }
        self.token(TokenKind::EmbdocLine, start)
    }

    fn lex_end_data(&mut self) -> Token {
        let start = self.pos;
        self.pos = self.source.len();
        self.comments.push(Comment::new(
            CommentKind::TrailingDataMarker,
            Location::from_offsets(start, self.pos),
        ));
        self.token(TokenKind::EndData, start)
    }

    // ========================================================================
    // Identifiers and keywords
    // ========================================================================

    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        let prior = self.state;
        while self.peek().map_or(false, is_identifier_char) {
            self.pos += 1;
        }

        let mut has_suffix = false;
        if matches!(self.peek(), Some(b'?') | Some(b'!')) {
            let include = match self.peek_at(1) {
                Some(b'=') => matches!(self.peek_at(2), Some(b'=') | Some(b'~') | Some(b'>')),
                _ => true,
            };
            if include {
                self.pos += 1;
                has_suffix = true;
            }
        }

        // `name:` is a label where one may appear, but `name::` is a scope.
        if prior.allows_label() && self.peek() == Some(b':') && self.peek_at(1) != Some(b':') {
            self.pos += 1;
            self.state = LexState::BEG | LexState::LABELED;
            return TokenKind::Label;
        }

        // Setter names such as `def name=(value)` or `:name=`.
        if !has_suffix
            && prior.contains(LexState::FNAME)
            && self.peek() == Some(b'=')
            && !matches!(self.peek_at(1), Some(b'=') | Some(b'~') | Some(b'>'))
        {
            self.pos += 1;
            self.state = LexState::ENDFN;
            return TokenKind::Identifier;
        }

        let text = &self.source[start..self.pos];
        if !prior.contains(LexState::DOT) {
            if let Some(keyword) = TokenKind::keyword(text) {
                return self.keyword(keyword, prior);
            }
        }

        self.state = if prior.contains(LexState::FNAME) {
            LexState::ENDFN
        } else if prior.contains(LexState::DOT) {
            LexState::ARG
        } else if prior.is_beg() {
            LexState::CMDARG
        } else {
            LexState::ARG
        };

        if !has_suffix && text[0].is_ascii_uppercase() {
            TokenKind::Constant
        } else {
            TokenKind::Identifier
        }
    }

    fn keyword(&mut self, keyword: TokenKind, prior: LexState) -> TokenKind {
        if prior.contains(LexState::FNAME) {
            self.state = LexState::ENDFN;
            return keyword;
        }

        if let Some(modifier) = keyword.modifier_form() {
            if !prior.allows_statement_keyword() {
                self.state = LexState::BEG | LexState::LABEL;
                return modifier;
            }
        }

        self.state = match keyword {
            TokenKind::KeywordAlias | TokenKind::KeywordUndef => LexState::FNAME | LexState::FITEM,
            TokenKind::KeywordDef => LexState::FNAME,
            TokenKind::KeywordClass => LexState::CLASS,
            TokenKind::KeywordReturn
            | TokenKind::KeywordBreak
            | TokenKind::KeywordNext
            | TokenKind::KeywordRescue => LexState::MID,
            TokenKind::KeywordDefined | TokenKind::KeywordSuper | TokenKind::KeywordYield => LexState::ARG,
            TokenKind::KeywordEnd
            | TokenKind::KeywordSelf
            | TokenKind::KeywordNil
            | TokenKind::KeywordTrue
            | TokenKind::KeywordFalse
            | TokenKind::KeywordRedo
            | TokenKind::KeywordRetry
            | TokenKind::KeywordEncoding
            | TokenKind::KeywordFile
            | TokenKind::KeywordLine
            | TokenKind::KeywordBeginUpcase
            | TokenKind::KeywordEndUpcase => LexState::END,
            _ => LexState::BEG,
        };
        keyword
    }

    // ========================================================================
    // Variables
    // ========================================================================

    pub(crate) fn lex_global_variable(&mut self) -> TokenKind {
        let start = self.pos;
        self.pos += 1;
        self.state = LexState::END;
        match self.peek() {
            Some(byte) if is_identifier_start(byte) => {
                while self.peek().map_or(false, is_identifier_char) {
                    self.pos += 1;
                }
                TokenKind::GlobalVariable
            }
            Some(b'-') if self.peek_at(1).map_or(false, is_identifier_char) => {
                self.pos += 2;
                TokenKind::GlobalVariable
            }
            Some(byte) if is_back_reference(byte) => {
                self.pos += 1;
                TokenKind::BackReference
            }
            Some(b'1'..=b'9') => {
                while self.peek().map_or(false, is_decimal_digit) {
                    self.pos += 1;
                }
                TokenKind::NthReference
            }
            Some(byte) if is_special_global(byte) => {
                self.pos += 1;
                TokenKind::GlobalVariable
            }
            _ => {
                self.error(start, self.pos, &messages::INVALID_GLOBAL_VARIABLE, &[]);
                TokenKind::Invalid
            }
        }
    }

    pub(crate) fn lex_instance_variable(&mut self) -> TokenKind {
        let start = self.pos;
        let class = self.peek_at(1) == Some(b'@');
        self.pos += if class { 2 } else { 1 };
        self.state = LexState::END;
        match self.peek() {
            Some(byte) if is_identifier_start(byte) => {
                while self.peek().map_or(false, is_identifier_char) {
                    self.pos += 1;
                }
                if class {
                    TokenKind::ClassVariable
                } else {
                    TokenKind::InstanceVariable
                }
            }
            _ => {
                while self.peek().map_or(false, is_identifier_char) {
                    self.pos += 1;
                }
                let message = if class {
                    &messages::INVALID_CLASS_VARIABLE
                } else {
                    &messages::INVALID_INSTANCE_VARIABLE
                };
                self.error(start, self.pos, message, &[]);
                TokenKind::Invalid
            }
        }
    }

    // ========================================================================
    // Punctuation and operators
    // ========================================================================

    fn lex_bracket(&mut self) -> TokenKind {
        if self.state.is_fname() && self.peek_at(1) == Some(b']') {
            if self.peek_at(2) == Some(b'=') {
                return self.op(3, TokenKind::BracketLeftRightEqual, LexState::ARG);
            }
            return self.op(2, TokenKind::BracketLeftRight, LexState::ARG);
        }
        let kind = if self.state.is_beg() || (self.state.is_arg() && self.space_seen) {
            TokenKind::BracketLeftArray
        } else {
            TokenKind::BracketLeft
        };
        self.op(1, kind, LexState::BEG | LexState::LABEL)
    }

    fn lex_brace_right(&mut self) -> Token {
        let start = self.pos;
        if let LexMode::Embexpr { outer_brace_depth } = self.mode() {
            if self.brace_depth == 0 {
                self.pos += 1;
                self.pop_mode();
                self.brace_depth = outer_brace_depth;
                self.state = LexState::END;
                return self.token(TokenKind::EmbexprEnd, start);
            }
        }
        self.brace_depth = self.brace_depth.saturating_sub(1);
        self.pos += 1;
        self.state = LexState::END;
        self.token(TokenKind::BraceRight, start)
    }

    fn lex_star(&mut self) -> TokenKind {
        let unary = self.state.is_beg() || self.is_spcarg();
        if self.peek_at(1) == Some(b'*') {
            if self.peek_at(2) == Some(b'=') {
                return self.op(3, TokenKind::StarStarEqual, LexState::BEG);
            }
            if unary {
                return self.op(2, TokenKind::UStarStar, LexState::BEG);
            }
            let state = self.operator_state();
            return self.op(2, TokenKind::StarStar, state);
        }
        if self.peek_at(1) == Some(b'=') {
            return self.op(2, TokenKind::StarEqual, LexState::BEG);
        }
        if unary {
            return self.op(1, TokenKind::UStar, LexState::BEG);
        }
        let state = self.operator_state();
        self.op(1, TokenKind::Star, state)
    }

    fn lex_bang(&mut self) -> TokenKind {
        match self.peek_at(1) {
            Some(b'@') if self.state.is_fname() => self.op(2, TokenKind::Bang, LexState::ARG),
            Some(b'=') => self.op(2, TokenKind::BangEqual, LexState::BEG),
            Some(b'~') => self.op(2, TokenKind::BangTilde, LexState::BEG),
            _ => {
                let state = self.operator_state();
                self.op(1, TokenKind::Bang, state)
            }
        }
    }

    fn lex_equal(&mut self) -> TokenKind {
        let state = self.operator_state();
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(b'='), Some(b'=')) => self.op(3, TokenKind::EqualEqualEqual, state),
            (Some(b'='), _) => self.op(2, TokenKind::EqualEqual, state),
            (Some(b'~'), _) => self.op(2, TokenKind::EqualTilde, state),
            (Some(b'>'), _) => self.op(2, TokenKind::EqualGreater, LexState::BEG),
            _ => self.op(1, TokenKind::Equal, LexState::BEG),
        }
    }

    fn lex_less(&mut self) -> TokenKind {
        let state = self.operator_state();
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(b'<'), Some(b'=')) => self.op(3, TokenKind::LessLessEqual, LexState::BEG),
            (Some(b'<'), _) => self.op(2, TokenKind::LessLess, state),
            (Some(b'='), Some(b'>')) => self.op(3, TokenKind::LessEqualGreater, state),
            (Some(b'='), _) => self.op(2, TokenKind::LessEqual, state),
            _ => self.op(1, TokenKind::Less, state),
        }
    }

    fn lex_greater(&mut self) -> TokenKind {
        let state = self.operator_state();
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(b'>'), Some(b'=')) => self.op(3, TokenKind::GreaterGreaterEqual, LexState::BEG),
            (Some(b'>'), _) => self.op(2, TokenKind::GreaterGreater, state),
            (Some(b'='), _) => self.op(2, TokenKind::GreaterEqual, state),
            _ => self.op(1, TokenKind::Greater, state),
        }
    }

    fn lex_ampersand(&mut self) -> TokenKind {
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(b'&'), Some(b'=')) => self.op(3, TokenKind::AmpersandAmpersandEqual, LexState::BEG),
            (Some(b'&'), _) => self.op(2, TokenKind::AmpersandAmpersand, LexState::BEG),
            (Some(b'='), _) => self.op(2, TokenKind::AmpersandEqual, LexState::BEG),
            (Some(b'.'), _) => self.op(2, TokenKind::AmpersandDot, LexState::DOT),
            _ => {
                if self.state.is_beg() || self.is_spcarg() {
                    self.op(1, TokenKind::UAmpersand, LexState::BEG)
                } else {
                    let state = self.operator_state();
                    self.op(1, TokenKind::Ampersand, state)
                }
            }
        }
    }

    fn lex_pipe(&mut self) -> TokenKind {
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(b'|'), Some(b'=')) => self.op(3, TokenKind::PipePipeEqual, LexState::BEG),
            // `{ || }`: two empty block parameter delimiters.
            (Some(b'|'), _) if self.state.is_beg() => self.op(1, TokenKind::Pipe, LexState::BEG),
            (Some(b'|'), _) => self.op(2, TokenKind::PipePipe, LexState::BEG),
            (Some(b'='), _) => self.op(2, TokenKind::PipeEqual, LexState::BEG),
            _ => {
                let state = if self.state.is_fname() {
                    LexState::ARG
                } else {
                    LexState::BEG | LexState::LABEL
                };
                self.op(1, TokenKind::Pipe, state)
            }
        }
    }

    fn lex_plus(&mut self) -> TokenKind {
        if self.state.is_fname() {
            if self.peek_at(1) == Some(b'@') {
                return self.op(2, TokenKind::Plus, LexState::ARG);
            }
            return self.op(1, TokenKind::Plus, LexState::ARG);
        }
        if self.peek_at(1) == Some(b'=') {
            return self.op(2, TokenKind::PlusEqual, LexState::BEG);
        }
        if self.state.is_beg() || self.is_spcarg() {
            return self.op(1, TokenKind::UPlus, LexState::BEG);
        }
        self.op(1, TokenKind::Plus, LexState::BEG)
    }

    fn lex_minus(&mut self) -> TokenKind {
        let start = self.pos;
        if self.state.is_fname() {
            if self.peek_at(1) == Some(b'@') {
                return self.op(2, TokenKind::Minus, LexState::ARG);
            }
            return self.op(1, TokenKind::Minus, LexState::ARG);
        }
        match self.peek_at(1) {
            Some(b'=') => return self.op(2, TokenKind::MinusEqual, LexState::BEG),
            Some(b'>') => return self.op(2, TokenKind::MinusGreater, LexState::ENDFN),
            _ => {}
        }
        let spcarg = self.is_spcarg();
        if self.state.is_beg() || spcarg {
            if spcarg {
                self.diagnostics.add(Diagnostic::new(
                    Location::from_offsets(start, start + 1),
                    &messages::AMBIGUOUS_FIRST_ARGUMENT_MINUS,
                    &[],
                ));
            }
            if self.peek_at(1).map_or(false, is_decimal_digit) {
                return self.op(1, TokenKind::UMinusNum, LexState::BEG);
            }
            return self.op(1, TokenKind::UMinus, LexState::BEG);
        }
        self.op(1, TokenKind::Minus, LexState::BEG)
    }

    fn lex_dot(&mut self) -> TokenKind {
        let beg = self.state.is_beg();
        match (self.peek_at(1), self.peek_at(2)) {
            (Some(b'.'), Some(b'.')) => {
                let kind = if beg { TokenKind::UDotDotDot } else { TokenKind::DotDotDot };
                self.op(3, kind, LexState::BEG)
            }
            (Some(b'.'), _) => {
                let kind = if beg { TokenKind::UDotDot } else { TokenKind::DotDot };
                self.op(2, kind, LexState::BEG)
            }
            _ => self.op(1, TokenKind::Dot, LexState::DOT),
        }
    }

    fn lex_colon(&mut self) -> TokenKind {
        if self.state.is_end() && self.peek_at(1) != Some(b':') {
            return self.op(1, TokenKind::Colon, LexState::BEG);
        }
        match self.peek_at(1) {
            Some(b':') => {
                if self.state.is_beg() || (self.state.is_arg() && self.space_seen) {
                    self.op(2, TokenKind::UColonColon, LexState::DOT)
                } else {
                    self.op(2, TokenKind::ColonColon, LexState::DOT)
                }
            }
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 2;
                self.push_mode(LexMode::String {
                    terminator: quote,
                    incrementor: 0,
                    nesting: 0,
                    interpolation: quote == b'"',
                    label_allowed: false,
                });
                self.state = LexState::FNAME;
                TokenKind::SymbolBegin
            }
            next => {
                if self.state.is_end() || next.map_or(true, |b| is_whitespace(b) || b == b'#') {
                    self.op(1, TokenKind::Colon, LexState::BEG)
                } else {
                    self.op(1, TokenKind::SymbolBegin, LexState::FNAME)
                }
            }
        }
    }

    fn lex_slash(&mut self) -> TokenKind {
        let start = self.pos;
        let spcarg = self.is_spcarg() && self.peek_at(1) != Some(b'=');
        if self.state.is_beg() || spcarg {
            if spcarg {
                self.diagnostics.add(Diagnostic::new(
                    Location::from_offsets(start, start + 1),
                    &messages::AMBIGUOUS_SLASH,
                    &[],
                ));
            }
            self.pos += 1;
            self.push_mode(LexMode::Regexp {
                terminator: b'/',
                incrementor: 0,
                nesting: 0,
            });
            return TokenKind::RegexpBegin;
        }
        if self.peek_at(1) == Some(b'=') {
            return self.op(2, TokenKind::SlashEqual, LexState::BEG);
        }
        let state = self.operator_state();
        self.op(1, TokenKind::Slash, state)
    }

    fn lex_question(&mut self) -> TokenKind {
        let start = self.pos;
        if self.state.is_end() {
            return self.op(1, TokenKind::QuestionMark, LexState::BEG);
        }
        let Some(next) = self.peek_at(1) else {
            self.pos += 1;
            self.error(start, self.pos, &messages::UNTERMINATED_CHARACTER, &[]);
            return TokenKind::Invalid;
        };
        if is_whitespace(next) {
            return self.op(1, TokenKind::QuestionMark, LexState::BEG);
        }
        if !(self.state.is_beg() || self.state.is_arg()) {
            return self.op(1, TokenKind::QuestionMark, LexState::BEG);
        }
        if next != b'\\'
            && is_identifier_char(next)
            && next < 0x80
            && self.peek_at(2).map_or(false, is_identifier_char)
        {
            return self.op(1, TokenKind::QuestionMark, LexState::BEG);
        }

        self.pos += 1;
        if next == b'\\' {
            self.skip_character_escape();
        } else {
            self.pos += utf8_width(next).min(self.source.len() - self.pos);
        }
        self.state = LexState::END;
        TokenKind::CharacterLiteral
    }

    /// Skip one escape sequence of a character literal, starting at `\`.
    fn skip_character_escape(&mut self) {
        self.pos += 1;
        let Some(byte) = self.peek() else {
            return;
        };
        match byte {
            b'u' => {
                self.pos += 1;
                if self.peek() == Some(b'{') {
                    while let Some(byte) = self.peek() {
                        self.pos += 1;
                        if byte == b'}' || byte == b'\n' {
                            break;
                        }
                    }
                } else {
                    let mut count = 0;
                    while count < 4 && self.peek().map_or(false, is_hex_digit) {
                        self.pos += 1;
                        count += 1;
                    }
                }
            }
            b'x' => {
                self.pos += 1;
                let mut count = 0;
                while count < 2 && self.peek().map_or(false, is_hex_digit) {
                    self.pos += 1;
                    count += 1;
                }
            }
            b'0'..=b'7' => {
                let mut count = 0;
                while count < 3 && self.peek().map_or(false, is_octal_digit) {
                    self.pos += 1;
                    count += 1;
                }
            }
            b'C' | b'M' if self.peek_at(1) == Some(b'-') => {
                self.pos += 2;
                self.skip_escaped_target();
            }
            b'c' => {
                self.pos += 1;
                self.skip_escaped_target();
            }
            other => {
                self.pos += utf8_width(other).min(self.source.len() - self.pos);
            }
        }
    }

    fn skip_escaped_target(&mut self) {
        match self.peek() {
            Some(b'\\') => self.skip_character_escape(),
            Some(byte) => self.pos += utf8_width(byte).min(self.source.len() - self.pos),
            None => {}
        }
    }

    // ========================================================================
    // Literal openers
    // ========================================================================

    fn lex_string_begin(&mut self, quote: u8, interpolation: bool) -> TokenKind {
        let label_allowed = self.state.allows_label();
        self.pos += 1;
        self.push_mode(LexMode::String {
            terminator: quote,
            incrementor: 0,
            nesting: 0,
            interpolation,
            label_allowed,
        });
        TokenKind::StringBegin
    }

    fn lex_backtick(&mut self) -> TokenKind {
        if self.state.is_fname() {
            return self.op(1, TokenKind::Backtick, LexState::ARG);
        }
        self.pos += 1;
        self.push_mode(LexMode::String {
            terminator: b'`',
            incrementor: 0,
            nesting: 0,
            interpolation: true,
            label_allowed: false,
        });
        TokenKind::Backtick
    }

    fn lex_percent(&mut self) -> TokenKind {
        if self.state.is_beg() || self.is_spcarg() {
            if let Some(kind) = self.lex_percent_literal() {
                return kind;
            }
        }
        if self.peek_at(1) == Some(b'=') {
            return self.op(2, TokenKind::PercentEqual, LexState::BEG);
        }
        let state = self.operator_state();
        self.op(1, TokenKind::Percent, state)
    }

    /// `%w[...]`, `%q(...)`, `%(...)` and friends. Returns `None` without
    /// consuming anything when the bytes do not form a percent literal.
    fn lex_percent_literal(&mut self) -> Option<TokenKind> {
        let next = self.peek_at(1)?;
        let (letter, delimiter) = if next.is_ascii_alphabetic() {
            (Some(next), self.peek_at(2)?)
        } else {
            if !self.state.is_beg() && next == b'=' {
                return None;
            }
            (None, next)
        };
        if delimiter.is_ascii_alphanumeric() || is_whitespace(delimiter) {
            return None;
        }

        let terminator = terminator_for(delimiter);
        let incrementor = incrementor_for(delimiter);
        let string = |interpolation: bool| LexMode::String {
            terminator,
            incrementor,
            nesting: 0,
            interpolation,
            label_allowed: false,
        };
        let list = |interpolation: bool| LexMode::List {
            terminator,
            incrementor,
            nesting: 0,
            interpolation,
        };

        let (kind, mode) = match letter {
            None | Some(b'Q') => (TokenKind::StringBegin, string(true)),
            Some(b'q') => (TokenKind::StringBegin, string(false)),
            Some(b's') => (TokenKind::SymbolBegin, string(false)),
            Some(b'x') => (TokenKind::PercentLowerX, string(true)),
            Some(b'w') => (TokenKind::PercentLowerW, list(false)),
            Some(b'W') => (TokenKind::PercentUpperW, list(true)),
            Some(b'i') => (TokenKind::PercentLowerI, list(false)),
            Some(b'I') => (TokenKind::PercentUpperI, list(true)),
            Some(b'r') => (
                TokenKind::RegexpBegin,
                LexMode::Regexp {
                    terminator,
                    incrementor,
                    nesting: 0,
                },
            ),
            Some(_) => return None,
        };

        self.pos += if letter.is_some() { 3 } else { 2 };
        self.push_mode(mode);
        Some(kind)
    }

    /// `<<ID`, `<<-ID`, `<<~ID`, optionally quoted. On success the cursor
    /// moves to the heredoc body; lexing resumes after the opener once the
    /// body is finished.
    fn lex_heredoc_start(&mut self, start: usize) -> Option<Token> {
        if self.peek_at(1) != Some(b'<') {
            return None;
        }
        let allowed = (self.state.is_beg() && !self.state.contains(LexState::CLASS))
            || (self.state.is_arg() && self.space_seen && !self.peek_at(2).map_or(true, is_whitespace));
        if !allowed {
            return None;
        }

        let mut index = start + 2;
        let indent = match self.byte_at(index) {
            Some(b'-') => {
                index += 1;
                HeredocIndent::Dash
            }
            Some(b'~') => {
                index += 1;
                HeredocIndent::Squiggly
            }
            _ => HeredocIndent::Plain,
        };

        let (quote, ident_start, ident_end, opener_end) = match self.byte_at(index) {
            Some(q @ (b'\'' | b'"' | b'`')) => {
                let ident_start = index + 1;
                let mut end = ident_start;
                while let Some(byte) = self.byte_at(end) {
                    if byte == q || byte == b'\n' {
                        break;
                    }
                    end += 1;
                }
                if self.byte_at(end) != Some(q) {
                    self.pos = end;
                    self.error(start, end, &messages::INVALID_HEREDOC_IDENTIFIER, &[]);
                    self.state = LexState::END;
                    return Some(self.token(TokenKind::Invalid, start));
                }
                let quote = match q {
                    b'\'' => HeredocQuote::Single,
                    b'"' => HeredocQuote::Double,
                    _ => HeredocQuote::Backtick,
                };
                (quote, ident_start, end, end + 1)
            }
            Some(byte) if is_identifier_char(byte) => {
                let mut end = index;
                while self.byte_at(end).map_or(false, is_identifier_char) {
                    end += 1;
                }
                (HeredocQuote::None, index, end, end)
            }
            _ => return None,
        };

        let body_start = match self.heredoc_end {
            Some(end) => end,
            None => self.next_line_start(opener_end),
        };
        self.heredoc_end = None;
        self.pos = opener_end;
        let token = self.token(TokenKind::HeredocStart, start);

        debug!(body_start, resume = opener_end, "heredoc body");
        self.push_mode(LexMode::Heredoc {
            ident_start,
            ident_end,
            indent,
            quote,
            resume: opener_end,
        });
        self.pos = body_start;
        self.state = LexState::END;
        self.seen_code = true;
        Some(token)
    }

    // ========================================================================
    // Interpolation
    // ========================================================================

    /// At `#{`, `#@name`, `#@@name` or `#$name` in an interpolating literal,
    /// lex the opener.
    pub(crate) fn lex_interpolation_start(&mut self) -> Option<Token> {
        let start = self.pos;
        if !self.starts_interpolation(start) {
            return None;
        }
        if self.byte_at(start + 1) == Some(b'{') {
            self.pos = start + 2;
            self.push_mode(LexMode::Embexpr {
                outer_brace_depth: self.brace_depth,
            });
            self.brace_depth = 0;
            self.state = LexState::BEG;
            return Some(self.token(TokenKind::EmbexprBegin, start));
        }
        self.pos = start + 1;
        self.embvar_pending = true;
        Some(self.token(TokenKind::Embvar, start))
    }

    /// Whether interpolation begins at `index`.
    pub(crate) fn starts_interpolation(&self, index: usize) -> bool {
        if self.byte_at(index) != Some(b'#') {
            return false;
        }
        match self.byte_at(index + 1) {
            Some(b'{') => true,
            Some(b'@') => {
                let name = if self.byte_at(index + 2) == Some(b'@') { index + 3 } else { index + 2 };
                self.byte_at(name).map_or(false, |b| is_identifier_start(b))
            }
            Some(b'$') => self.byte_at(index + 2).map_or(false, |b| {
                is_identifier_start(b) || is_special_global(b) || is_back_reference(b) || is_decimal_digit(b)
            }),
            _ => false,
        }
    }

    fn lex_embedded_variable(&mut self) -> Token {
        let start = self.pos;
        let kind = match self.peek() {
            Some(b'@') => self.lex_instance_variable(),
            Some(b'$') => self.lex_global_variable(),
            _ => return self.next_token(),
        };
        self.token(kind, start)
    }
}

/// Width of the UTF-8 sequence introduced by `lead`.
#[inline]
pub(crate) fn utf8_width(lead: u8) -> usize {
    match lead {
        0xf0..=0xf7 => 4,
        0xe0..=0xef => 3,
        0xc0..=0xdf => 2,
        _ => 1,
    }
}

/// Lex `source` to the end, returning every token before `Eof`.
///
/// Comments, newlines and embedded document pieces are included. Without a
/// parser there is no knowledge of local variables, so a few ambiguous
/// constructs may lex differently than they do during a parse.
pub fn tokenize(source: &[u8]) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}
