//! Literal bodies: strings, word lists, regular expressions and heredocs.

use super::Lexer;
use crate::char_codes::is_whitespace;
use crate::mode::{HeredocIndent, LexMode};
use crate::state::LexState;
use rbparse_ast::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    pub(super) fn lex_string(&mut self) -> Token {
        let LexMode::String {
            terminator,
            incrementor,
            mut nesting,
            interpolation,
            label_allowed,
        } = self.mode()
        else {
            return self.eof();
        };
        let start = self.pos;
        let Some(byte) = self.peek() else {
            return self.eof();
        };

        if byte == terminator && nesting == 0 {
            self.pos += 1;
            self.pop_mode();
            if label_allowed && self.peek() == Some(b':') && self.peek_at(1) != Some(b':') {
                self.pos += 1;
                self.state = LexState::BEG | LexState::LABELED;
                return self.token(TokenKind::LabelEnd, start);
            }
            self.state = LexState::END;
            return self.token(TokenKind::StringEnd, start);
        }
        if interpolation {
            if let Some(token) = self.lex_interpolation_start() {
                return token;
            }
        }

        while let Some(byte) = self.peek() {
            if byte == b'\\' {
                self.skip_escape();
                continue;
            }
            if incrementor != 0 && byte == incrementor {
                nesting += 1;
            } else if byte == terminator {
                if nesting == 0 {
                    break;
                }
                nesting -= 1;
            } else if interpolation && byte == b'#' && self.starts_interpolation(self.pos) {
                break;
            }
            self.pos += 1;
        }
        self.set_nesting(nesting);
        self.token(TokenKind::StringContent, start)
    }

    pub(super) fn lex_list(&mut self) -> Token {
        let LexMode::List {
            terminator,
            incrementor,
            mut nesting,
            interpolation,
        } = self.mode()
        else {
            return self.eof();
        };
        let start = self.pos;
        let Some(byte) = self.peek() else {
            return self.eof();
        };

        if is_whitespace(byte) {
            while self.peek().map_or(false, is_whitespace) {
                self.pos += 1;
            }
            return self.token(TokenKind::WordsSep, start);
        }
        if byte == terminator && nesting == 0 {
            self.pos += 1;
            self.pop_mode();
            self.state = LexState::END;
            return self.token(TokenKind::StringEnd, start);
        }
        if interpolation {
            if let Some(token) = self.lex_interpolation_start() {
                return token;
            }
        }

        while let Some(byte) = self.peek() {
            if byte == b'\\' {
                self.skip_escape();
                continue;
            }
            if is_whitespace(byte) {
                break;
            }
            if incrementor != 0 && byte == incrementor {
                nesting += 1;
            } else if byte == terminator {
                if nesting == 0 {
                    break;
                }
                nesting -= 1;
            } else if interpolation && byte == b'#' && self.starts_interpolation(self.pos) {
                break;
            }
            self.pos += 1;
        }
        self.set_nesting(nesting);
        self.token(TokenKind::StringContent, start)
    }

    pub(super) fn lex_regexp(&mut self) -> Token {
        let LexMode::Regexp {
            terminator,
            incrementor,
            mut nesting,
        } = self.mode()
        else {
            return self.eof();
        };
        let start = self.pos;
        let Some(byte) = self.peek() else {
            return self.eof();
        };

        if byte == terminator && nesting == 0 {
            self.pos += 1;
            while self.peek().map_or(false, |b| b.is_ascii_alphabetic()) {
                self.pos += 1;
            }
            self.pop_mode();
            self.state = LexState::END;
            return self.token(TokenKind::RegexpEnd, start);
        }
        if let Some(token) = self.lex_interpolation_start() {
            return token;
        }

        while let Some(byte) = self.peek() {
            if byte == b'\\' {
                self.skip_escape();
                continue;
            }
            if incrementor != 0 && byte == incrementor {
                nesting += 1;
            } else if byte == terminator {
                if nesting == 0 {
                    break;
                }
                nesting -= 1;
            } else if byte == b'#' && self.starts_interpolation(self.pos) {
                break;
            }
            self.pos += 1;
        }
        self.set_nesting(nesting);
        self.token(TokenKind::StringContent, start)
    }

    /// One line of a heredoc body per token, so the parser can strip
    /// indentation line by line. The terminator line ends the body and
    /// sends the cursor back to just after the opener.
    pub(super) fn lex_heredoc(&mut self) -> Token {
        let LexMode::Heredoc {
            ident_start,
            ident_end,
            indent,
            quote,
            resume,
        } = self.mode()
        else {
            return self.eof();
        };
        let start = self.pos;
        if self.is_eof() {
            return self.eof();
        }

        if self.is_line_start(start) {
            if let Some(end) = self.heredoc_terminator(start, ident_start, ident_end, indent) {
                self.pos = end;
                let token = self.token(TokenKind::HeredocEnd, start);
                self.pop_mode();
                self.heredoc_end = Some(end);
                self.pos = resume;
                self.state = LexState::END;
                return token;
            }
        }

        let interpolation = quote.interpolates();
        if interpolation {
            if let Some(token) = self.lex_interpolation_start() {
                return token;
            }
        }

        while let Some(byte) = self.peek() {
            if byte == b'\n' {
                self.pos += 1;
                break;
            }
            if interpolation && byte == b'\\' {
                let escaped_newline = self.peek_at(1) == Some(b'\n');
                self.skip_escape();
                if escaped_newline {
                    break;
                }
                continue;
            }
            if interpolation && byte == b'#' && self.starts_interpolation(self.pos) {
                break;
            }
            self.pos += 1;
        }
        self.token(TokenKind::StringContent, start)
    }

    /// If the line at `line_start` terminates the heredoc, the position just
    /// past that line.
    fn heredoc_terminator(
        &self,
        line_start: usize,
        ident_start: usize,
        ident_end: usize,
        indent: HeredocIndent,
    ) -> Option<usize> {
        let mut index = line_start;
        if indent != HeredocIndent::Plain {
            while matches!(self.byte_at(index), Some(b' ') | Some(b'\t')) {
                index += 1;
            }
        }
        let ident = &self.source[ident_start..ident_end];
        if !self.source[index..].starts_with(ident) {
            return None;
        }
        index += ident.len();
        match self.byte_at(index) {
            None => Some(index),
            Some(b'\n') => Some(index + 1),
            Some(b'\r') if self.byte_at(index + 1) == Some(b'\n') => Some(index + 2),
            _ => None,
        }
    }

    /// Skip a backslash and the byte it escapes.
    fn skip_escape(&mut self) {
        self.pos = (self.pos + 2).min(self.source.len());
    }

    fn set_nesting(&mut self, value: u32) {
        match self.modes.last_mut() {
            Some(LexMode::String { nesting, .. })
            | Some(LexMode::List { nesting, .. })
            | Some(LexMode::Regexp { nesting, .. }) => *nesting = value,
            _ => {}
        }
    }
}
