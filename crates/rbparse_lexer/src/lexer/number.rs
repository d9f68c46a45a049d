//! Numeric literals.

use super::Lexer;
use crate::char_codes::*;
use crate::state::LexState;
use rbparse_ast::token::TokenKind;
use rbparse_diagnostics::messages;

impl<'a> Lexer<'a> {
    /// Lex an integer or float starting at a decimal digit, with optional
    /// `r` and `i` suffixes.
    pub(super) fn lex_number(&mut self) -> TokenKind {
        let start = self.pos;
        self.state = LexState::END;
        let mut valid = true;
        let mut kind = TokenKind::Integer;

        if self.peek() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'x' | b'X') => {
                    self.pos += 2;
                    valid = self.scan_digits(is_hex_digit, false);
                }
                Some(b'b' | b'B') => {
                    self.pos += 2;
                    valid = self.scan_digits(is_binary_digit, false);
                }
                Some(b'o' | b'O') => {
                    self.pos += 2;
                    valid = self.scan_digits(is_octal_digit, false);
                }
                Some(b'd' | b'D') => {
                    self.pos += 2;
                    valid = self.scan_digits(is_decimal_digit, false);
                }
                Some(b'_' | b'0'..=b'7') => {
                    self.pos += 1;
                    valid = self.scan_digits(is_octal_digit, true);
                }
                Some(b'8' | b'9') => {
                    self.pos += 1;
                    self.scan_digits(is_decimal_digit, true);
                    valid = false;
                }
                _ => {
                    self.pos += 1;
                    kind = self.scan_fraction_and_exponent(&mut valid);
                }
            }
        } else {
            valid = self.scan_digits(is_decimal_digit, false);
            kind = self.scan_fraction_and_exponent(&mut valid);
        }

        if !valid {
            self.error(start, self.pos, &messages::INVALID_NUMBER, &[]);
            return TokenKind::Invalid;
        }
        self.scan_numeric_suffix(kind)
    }

    /// Consume digits matching `is_digit`, allowing single underscores
    /// between them. Returns false for a missing digit run or a stray `_`.
    fn scan_digits(&mut self, is_digit: fn(u8) -> bool, after_digit: bool) -> bool {
        let mut count = 0usize;
        let mut last_underscore = false;
        let mut valid = true;
        while let Some(byte) = self.peek() {
            if is_digit(byte) {
                count += 1;
                last_underscore = false;
            } else if byte == b'_' {
                if last_underscore || (count == 0 && !after_digit) {
                    valid = false;
                }
                last_underscore = true;
            } else {
                break;
            }
            self.pos += 1;
        }
        valid && !last_underscore && (count > 0 || after_digit)
    }

    fn scan_fraction_and_exponent(&mut self, valid: &mut bool) -> TokenKind {
        let mut kind = TokenKind::Integer;
        if self.peek() == Some(b'.') && self.peek_at(1).map_or(false, is_decimal_digit) {
            self.pos += 1;
            *valid &= self.scan_digits(is_decimal_digit, false);
            kind = TokenKind::Float;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digits_at = match self.peek_at(1) {
                Some(b'+' | b'-') => 2,
                _ => 1,
            };
            if self.peek_at(digits_at).map_or(false, is_decimal_digit) {
                self.pos += digits_at;
                *valid &= self.scan_digits(is_decimal_digit, false);
                kind = TokenKind::Float;
            }
        }
        kind
    }

    /// `r` makes a rational, `i` an imaginary, `ri` an imaginary rational.
    fn scan_numeric_suffix(&mut self, kind: TokenKind) -> TokenKind {
        let ends_word = |lexer: &Self, offset: usize| !lexer.peek_at(offset).map_or(false, is_identifier_char);
        match (self.peek(), self.peek_at(1)) {
            (Some(b'r'), Some(b'i')) if ends_word(self, 2) => {
                self.pos += 2;
                TokenKind::ImaginaryNumber
            }
            (Some(b'r'), _) if ends_word(self, 1) => {
                self.pos += 1;
                TokenKind::RationalNumber
            }
            (Some(b'i'), _) if ends_word(self, 1) => {
                self.pos += 1;
                TokenKind::ImaginaryNumber
            }
            _ => kind,
        }
    }
}
