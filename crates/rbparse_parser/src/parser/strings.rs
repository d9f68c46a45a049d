//! String-like literals: strings, symbols, regular expressions, xstrings,
//! word lists, heredocs and character literals.

use rbparse_ast::flags::{RegexFlags, StringFlags};
use rbparse_ast::node::Node;
use rbparse_ast::token::{Token, TokenKind};
use rbparse_core::text::Location;
use rbparse_diagnostics::messages;
use rbparse_lexer::char_codes::{incrementor_for, terminator_for};
use rbparse_lexer::{unescape, HeredocIndent, HeredocQuote, UnescapeKind};

use super::expression::is_operator_name;
use super::{join, Parser};

/// One piece of a heredoc body before indentation is removed.
enum HeredocPiece<'a> {
    Line(Token),
    Embedded(Node<'a>),
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Shared pieces
    // ========================================================================

    fn string_flags(&self) -> StringFlags {
        if self.frozen_string_literal || self.lexer.frozen_string_literal() {
            StringFlags::FROZEN
        } else {
            StringFlags::NONE
        }
    }

    /// How the contents of the literal opened by `opening` are unescaped.
    fn escape_kind(&self, opening: Token) -> UnescapeKind {
        let text = self.text(opening.location);
        let delimited = |delimiter: u8| (terminator_for(delimiter), incrementor_for(delimiter));
        match text {
            b"'" | b":'" => UnescapeKind::Minimal {
                terminator: b'\'',
                incrementor: 0,
            },
            b"/" => UnescapeKind::Regexp { terminator: b'/' },
            [b'%', letter, delimiter] => {
                let (terminator, incrementor) = delimited(*delimiter);
                match *letter {
                    b'q' | b's' => UnescapeKind::Minimal { terminator, incrementor },
                    b'w' | b'i' => UnescapeKind::Words { terminator, incrementor },
                    b'r' => UnescapeKind::Regexp { terminator },
                    _ => UnescapeKind::All,
                }
            }
            _ => UnescapeKind::All,
        }
    }

    fn unescape_token(&mut self, token: Token, kind: UnescapeKind) -> &'a [u8] {
        let raw = self.text(token.location);
        let bytes = unescape(raw, token.start() as usize, kind, &mut self.diagnostics);
        self.alloc_bytes(bytes)
    }

    /// A literal segment without delimiters.
    fn content_part(&mut self, token: Token, kind: UnescapeKind) -> Node<'a> {
        let unescaped = self.unescape_token(token, kind);
        Node::String {
            location: token.location,
            flags: StringFlags::NONE,
            opening: None,
            content: token,
            closing: None,
            unescaped,
        }
    }

    fn at_string_part(&self) -> bool {
        self.at_any(&[TokenKind::StringContent, TokenKind::EmbexprBegin, TokenKind::Embvar])
    }

    /// One content segment, `#{...}` or `#@var` of an interpolating literal.
    fn parse_string_part(&mut self, kind: UnescapeKind) -> Node<'a> {
        match self.current.kind {
            TokenKind::EmbexprBegin => {
                let opening = self.bump();
                let statements = self.parse_statements();
                let closing = self.expect(TokenKind::EmbexprEnd, &messages::EXPECTED_EMBEXPR_CLOSE, &[]);
                Node::EmbeddedStatements {
                    location: join(opening.location, closing.location),
                    opening,
                    statements,
                    closing,
                }
            }
            TokenKind::Embvar => {
                let operator = self.bump();
                let variable = match self.current.kind {
                    TokenKind::InstanceVariable
                    | TokenKind::ClassVariable
                    | TokenKind::GlobalVariable
                    | TokenKind::BackReference
                    | TokenKind::NthReference => {
                        let token = self.bump();
                        self.variable_read(token)
                    }
                    _ => {
                        self.error_at_current(&messages::EXPECTED_EMBEDDED_VARIABLE, &[]);
                        self.missing_node()
                    }
                };
                let variable = self.alloc(variable);
                Node::EmbeddedVariable {
                    location: join(operator.location, variable.location()),
                    operator,
                    variable,
                }
            }
            _ => {
                let token = self.bump();
                self.content_part(token, kind)
            }
        }
    }

    fn parse_string_parts(&mut self, kind: UnescapeKind) -> Vec<Node<'a>> {
        let mut parts = Vec::new();
        while self.at_string_part() {
            parts.push(self.parse_string_part(kind));
        }
        parts
    }

    /// An empty content token at `pos`.
    fn empty_content(pos: u32) -> Token {
        Token::new(TokenKind::StringContent, pos, pos)
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// A string literal, with adjacent literals joined: `"a" 'b'`.
    pub(super) fn parse_string_literal(&mut self) -> Node<'a> {
        let first = self.parse_single_string();
        if !(self.at(TokenKind::StringBegin) && self.previous.kind == TokenKind::StringEnd) {
            return first;
        }

        let mut parts = vec![first];
        while self.at(TokenKind::StringBegin) && self.previous.kind == TokenKind::StringEnd {
            parts.push(self.parse_single_string());
        }
        let location = join(parts[0].location(), parts[parts.len() - 1].location());
        Node::InterpolatedString {
            location,
            opening: None,
            parts: self.alloc_nodes(parts),
            closing: None,
        }
    }

    fn parse_single_string(&mut self) -> Node<'a> {
        let opening = self.bump();
        let kind = self.escape_kind(opening);
        let parts = self.parse_string_parts(kind);

        match self.current.kind {
            TokenKind::StringEnd => {
                let closing = self.bump();
                self.finish_string(opening, parts, closing)
            }
            TokenKind::LabelEnd => {
                let closing = self.bump();
                self.finish_symbol(opening, parts, Some(closing))
            }
            _ => {
                let message = if matches!(kind, UnescapeKind::All) {
                    &messages::UNTERMINATED_INTERPOLATED_STRING
                } else {
                    &messages::UNTERMINATED_STRING
                };
                self.error_at_current(message, &[]);
                let last = parts.last().map_or(opening.location, |part| part.location());
                Node::InterpolatedString {
                    location: join(opening.location, last),
                    opening: Some(opening),
                    parts: self.alloc_nodes(parts),
                    closing: None,
                }
            }
        }
    }

    fn finish_string(&self, opening: Token, parts: Vec<Node<'a>>, closing: Token) -> Node<'a> {
        let location = join(opening.location, closing.location);
        match parts.as_slice() {
            [] => Node::String {
                location,
                flags: self.string_flags(),
                opening: Some(opening),
                content: Self::empty_content(closing.start()),
                closing: Some(closing),
                unescaped: &[],
            },
            [Node::String { content, unescaped, .. }] => Node::String {
                location,
                flags: self.string_flags(),
                opening: Some(opening),
                content: *content,
                closing: Some(closing),
                unescaped: *unescaped,
            },
            _ => Node::InterpolatedString {
                location,
                opening: Some(opening),
                parts: self.alloc_nodes(parts),
                closing: Some(closing),
            },
        }
    }

    fn finish_symbol(&self, opening: Token, parts: Vec<Node<'a>>, closing: Option<Token>) -> Node<'a> {
        let location = join(opening.location, closing.map_or(opening.location, |token| token.location));
        match parts.as_slice() {
            [] => Node::Symbol {
                location,
                opening: Some(opening),
                value: None,
                closing,
                unescaped: &[],
            },
            [Node::String { content, unescaped, .. }] => Node::Symbol {
                location,
                opening: Some(opening),
                value: Some(*content),
                closing,
                unescaped: *unescaped,
            },
            _ => Node::InterpolatedSymbol {
                location,
                opening: Some(opening),
                parts: self.alloc_nodes(parts),
                closing,
            },
        }
    }

    /// `?a`
    pub(super) fn parse_character_literal(&mut self) -> Node<'a> {
        let token = self.bump();
        let opening = Token::new(TokenKind::QuestionMark, token.start(), token.start() + 1);
        let content = Token::new(TokenKind::StringContent, token.start() + 1, token.end());
        let unescaped = self.unescape_token(content, UnescapeKind::All);
        Node::String {
            location: token.location,
            flags: self.string_flags(),
            opening: Some(opening),
            content,
            closing: None,
            unescaped,
        }
    }

    // ========================================================================
    // Symbols
    // ========================================================================

    /// `:name`, `:"quoted #{x}"` or `%s(name)`.
    pub(super) fn parse_symbol(&mut self) -> Node<'a> {
        let opening = self.bump();
        if self.text(opening.location) == b":" {
            return self.parse_bare_symbol(opening);
        }

        let kind = self.escape_kind(opening);
        let parts = self.parse_string_parts(kind);
        if self.at(TokenKind::StringEnd) {
            let closing = self.bump();
            return self.finish_symbol(opening, parts, Some(closing));
        }
        self.error_at_current(&messages::UNTERMINATED_SYMBOL, &[]);
        let last = parts.last().map_or(opening.location, |part| part.location());
        Node::InterpolatedSymbol {
            location: join(opening.location, last),
            opening: Some(opening),
            parts: self.alloc_nodes(parts),
            closing: None,
        }
    }

    fn parse_bare_symbol(&mut self, opening: Token) -> Node<'a> {
        if !is_symbol_name(self.current.kind) {
            self.error_at_current(&messages::UNTERMINATED_SYMBOL, &[]);
            return Node::Symbol {
                location: opening.location,
                opening: Some(opening),
                value: None,
                closing: None,
                unescaped: &[],
            };
        }
        let value = self.current;
        self.advance_name();
        Node::Symbol {
            location: join(opening.location, value.location),
            opening: Some(opening),
            value: Some(value),
            closing: None,
            unescaped: self.text(value.location),
        }
    }

    // ========================================================================
    // Regular expressions and xstrings
    // ========================================================================

    pub(super) fn parse_regexp(&mut self) -> Node<'a> {
        let opening = self.bump();
        let kind = self.escape_kind(opening);
        let kind = match kind {
            UnescapeKind::Regexp { .. } => kind,
            _ => UnescapeKind::Regexp { terminator: b'/' },
        };
        let parts = self.parse_string_parts(kind);

        let (closing, flags) = if self.at(TokenKind::RegexpEnd) {
            let closing = self.bump();
            let options = self.text(closing.location).get(1..).unwrap_or_default();
            let flags = options
                .iter()
                .filter_map(|byte| RegexFlags::from_option(*byte))
                .fold(RegexFlags::NONE, |flags, flag| flags | flag);
            (closing, flags)
        } else {
            self.error_at_current(&messages::UNTERMINATED_REGEXP, &[]);
            (self.missing_token(), RegexFlags::NONE)
        };

        let location = join(opening.location, closing.location);
        match parts.as_slice() {
            [] => Node::RegularExpression {
                location,
                opening,
                content: Self::empty_content(opening.end()),
                closing,
                unescaped: &[],
                flags,
            },
            [Node::String { content, unescaped, .. }] => Node::RegularExpression {
                location,
                opening,
                content: *content,
                closing,
                unescaped: *unescaped,
                flags,
            },
            _ => Node::InterpolatedRegularExpression {
                location,
                opening,
                parts: self.alloc_nodes(parts),
                closing,
                flags,
            },
        }
    }

    /// `` `cmd` `` or `%x(cmd)`.
    pub(super) fn parse_xstring(&mut self) -> Node<'a> {
        let opening = self.bump();
        let parts = self.parse_string_parts(UnescapeKind::All);
        let closing = if self.at(TokenKind::StringEnd) {
            self.bump()
        } else {
            self.error_at_current(&messages::UNTERMINATED_XSTRING, &[]);
            self.missing_token()
        };
        let location = join(opening.location, closing.location);
        self.finish_xstring(location, opening, parts, closing)
    }

    fn finish_xstring(&self, location: Location, opening: Token, parts: Vec<Node<'a>>, closing: Token) -> Node<'a> {
        match parts.as_slice() {
            [] => Node::XString {
                location,
                opening,
                content: Self::empty_content(opening.end()),
                closing,
                unescaped: &[],
            },
            [Node::String { content, unescaped, .. }] => Node::XString {
                location,
                opening,
                content: *content,
                closing,
                unescaped: *unescaped,
            },
            _ => Node::InterpolatedXString {
                location,
                opening,
                parts: self.alloc_nodes(parts),
                closing,
            },
        }
    }

    // ========================================================================
    // Word and symbol lists
    // ========================================================================

    /// `%w[a b]`, `%W[a #{b}]`, `%i[a b]`, `%I[a #{b}]`.
    pub(super) fn parse_list(&mut self) -> Node<'a> {
        let opening = self.bump();
        let kind = self.escape_kind(opening);
        let symbols = matches!(opening.kind, TokenKind::PercentLowerI | TokenKind::PercentUpperI);

        let mut elements = Vec::new();
        let mut word = Vec::new();
        let closing = loop {
            match self.current.kind {
                TokenKind::WordsSep => {
                    self.advance();
                    self.flush_word(&mut elements, &mut word, symbols);
                }
                TokenKind::StringContent | TokenKind::EmbexprBegin | TokenKind::Embvar => {
                    word.push(self.parse_string_part(kind));
                }
                TokenKind::StringEnd => {
                    self.flush_word(&mut elements, &mut word, symbols);
                    break Some(self.bump());
                }
                _ => {
                    self.flush_word(&mut elements, &mut word, symbols);
                    let opener = self.text(opening.location);
                    let name = String::from_utf8_lossy(&opener[..opener.len().min(2)]).into_owned();
                    self.error_at_current(&messages::UNTERMINATED_LIST, &[&name]);
                    break None;
                }
            }
        };

        let elements = self.alloc_nodes(elements);
        let end = match closing {
            Some(token) => token.location,
            None => elements.last().map_or(opening.location, |element| element.location()),
        };
        Node::Array {
            location: join(opening.location, end),
            elements,
            opening: Some(opening),
            closing,
        }
    }

    fn flush_word(&self, elements: &mut Vec<Node<'a>>, word: &mut Vec<Node<'a>>, symbols: bool) {
        if word.is_empty() {
            return;
        }
        let parts = std::mem::take(word);
        let location = join(parts[0].location(), parts[parts.len() - 1].location());
        let element = match (parts.as_slice(), symbols) {
            ([Node::String { content, unescaped, .. }], true) => Node::Symbol {
                location,
                opening: None,
                value: Some(*content),
                closing: None,
                unescaped: *unescaped,
            },
            ([single @ Node::String { .. }], false) => *single,
            (_, true) => Node::InterpolatedSymbol {
                location,
                opening: None,
                parts: self.alloc_nodes(parts),
                closing: None,
            },
            (_, false) => Node::InterpolatedString {
                location,
                opening: None,
                parts: self.alloc_nodes(parts),
                closing: None,
            },
        };
        elements.push(element);
    }

    // ========================================================================
    // Heredocs
    // ========================================================================

    /// A heredoc. The node spans from the opener through the terminator
    /// line.
    pub(super) fn parse_heredoc(&mut self) -> Node<'a> {
        let opening = self.bump();
        let (indent, quote, ident) = parse_heredoc_header(self.text(opening.location));
        let kind = UnescapeKind::All;

        let mut pieces = Vec::new();
        while self.at_string_part() {
            if self.at(TokenKind::StringContent) {
                pieces.push(HeredocPiece::Line(self.bump()));
            } else {
                pieces.push(HeredocPiece::Embedded(self.parse_string_part(kind)));
            }
        }

        let closing = if self.at(TokenKind::HeredocEnd) {
            Some(self.bump())
        } else {
            let name = String::from_utf8_lossy(ident).into_owned();
            self.error_at_current(&messages::UNTERMINATED_HEREDOC, &[&name]);
            None
        };

        let dedent = if indent == HeredocIndent::Squiggly {
            self.common_indent(&pieces)
        } else {
            0
        };

        let mut parts = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match piece {
                HeredocPiece::Embedded(node) => parts.push(node),
                HeredocPiece::Line(token) => {
                    let raw = self.text(token.location);
                    let raw = if dedent > 0 && self.starts_line(token) {
                        strip_indent(raw, dedent)
                    } else {
                        raw
                    };
                    let unescaped = if quote == HeredocQuote::Single {
                        raw.to_vec()
                    } else {
                        unescape(raw, token.start() as usize, kind, &mut self.diagnostics)
                    };
                    parts.push(Node::String {
                        location: token.location,
                        flags: StringFlags::NONE,
                        opening: None,
                        content: token,
                        closing: None,
                        unescaped: self.alloc_bytes(unescaped),
                    });
                }
            }
        }

        let location = match (closing, parts.last()) {
            (Some(closing), _) => opening.location.join(&closing.location),
            (None, Some(last)) => opening.location.join(&last.location()),
            (None, None) => opening.location,
        };
        let backtick = quote == HeredocQuote::Backtick;
        let plain = parts.iter().all(|part| matches!(part, Node::String { .. }));
        if plain {
            let content = match (parts.first(), parts.last()) {
                (Some(first), Some(last)) => Token {
                    kind: TokenKind::StringContent,
                    location: first.location().join(&last.location()),
                },
                _ => Self::empty_content(closing.map_or(opening.end(), |token| token.start())),
            };
            let mut bytes = Vec::new();
            for part in &parts {
                if let Node::String { unescaped, .. } = part {
                    bytes.extend_from_slice(unescaped);
                }
            }
            let unescaped = self.alloc_bytes(bytes);
            if backtick {
                return Node::XString {
                    location,
                    opening,
                    content,
                    closing: closing.unwrap_or_else(|| self.missing_token()),
                    unescaped,
                };
            }
            return Node::String {
                location,
                flags: self.string_flags(),
                opening: Some(opening),
                content,
                closing,
                unescaped,
            };
        }

        if backtick {
            return Node::InterpolatedXString {
                location,
                opening,
                parts: self.alloc_nodes(parts),
                closing: closing.unwrap_or_else(|| self.missing_token()),
            };
        }
        Node::InterpolatedString {
            location,
            opening: Some(opening),
            parts: self.alloc_nodes(parts),
            closing,
        }
    }

    fn starts_line(&self, token: Token) -> bool {
        let start = token.start() as usize;
        start == 0 || self.source.get(start - 1) == Some(&b'\n')
    }

    /// The smallest indentation, in columns, of the non-blank body lines.
    fn common_indent(&self, pieces: &[HeredocPiece<'a>]) -> usize {
        let mut common: Option<usize> = None;
        for piece in pieces {
            let HeredocPiece::Line(token) = piece else {
                continue;
            };
            if !self.starts_line(*token) {
                continue;
            }
            let line = &self.source[token.start() as usize..];
            let mut column = 0;
            let mut index = 0;
            while let Some(byte) = line.get(index) {
                match byte {
                    b' ' => column += 1,
                    b'\t' => column = (column / 8 + 1) * 8,
                    _ => break,
                }
                index += 1;
            }
            // Whitespace-only lines do not count.
            if matches!(line.get(index), None | Some(b'\n') | Some(b'\r')) {
                continue;
            }
            common = Some(common.map_or(column, |current| current.min(column)));
        }
        common.unwrap_or(0)
    }
}

/// Indent style, quoting and terminator name from a heredoc opener.
fn parse_heredoc_header(header: &[u8]) -> (HeredocIndent, HeredocQuote, &[u8]) {
    let rest = header.get(2..).unwrap_or_default();
    let (indent, rest) = match rest.first() {
        Some(b'~') => (HeredocIndent::Squiggly, &rest[1..]),
        Some(b'-') => (HeredocIndent::Dash, &rest[1..]),
        _ => (HeredocIndent::Plain, rest),
    };
    let quote = match rest.first() {
        Some(b'\'') => HeredocQuote::Single,
        Some(b'"') => HeredocQuote::Double,
        Some(b'`') => HeredocQuote::Backtick,
        _ => HeredocQuote::None,
    };
    let ident = if quote == HeredocQuote::None || rest.len() < 2 {
        rest
    } else {
        &rest[1..rest.len() - 1]
    };
    (indent, quote, ident)
}

/// Remove up to `columns` columns of leading spaces and tabs.
fn strip_indent(line: &[u8], columns: usize) -> &[u8] {
    let mut column = 0;
    let mut index = 0;
    while column < columns {
        match line.get(index) {
            Some(b' ') => column += 1,
            Some(b'\t') => {
                let next = (column / 8 + 1) * 8;
                if next > columns {
                    break;
                }
                column = next;
            }
            _ => break,
        }
        index += 1;
    }
    &line[index..]
}

/// Tokens that can follow a bare `:` as a symbol name.
pub(super) fn is_symbol_name(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Constant
            | TokenKind::InstanceVariable
            | TokenKind::ClassVariable
            | TokenKind::GlobalVariable
            | TokenKind::BackReference
            | TokenKind::NthReference
    ) || kind.is_keyword()
        || is_operator_name(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heredoc_header() {
        let (indent, quote, ident) = parse_heredoc_header(b"<<~'EOS'");
        assert_eq!(indent, HeredocIndent::Squiggly);
        assert_eq!(quote, HeredocQuote::Single);
        assert_eq!(ident, b"EOS");

        let (indent, quote, ident) = parse_heredoc_header(b"<<-END");
        assert_eq!(indent, HeredocIndent::Dash);
        assert_eq!(quote, HeredocQuote::None);
        assert_eq!(ident, b"END");
    }

    #[test]
    fn test_strip_indent() {
        assert_eq!(strip_indent(b"    a\n", 2), b"  a\n");
        assert_eq!(strip_indent(b"\ta\n", 8), b"a\n");
        assert_eq!(strip_indent(b" \ta\n", 4), b"\ta\n");
        assert_eq!(strip_indent(b"a\n", 4), b"a\n");
    }
}
