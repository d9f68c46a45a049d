//! Escape processing for literal contents.
//!
//! The lexer hands the parser raw content spans. When a literal node is
//! built, its content is run through [`unescape`] to produce the owned
//! bytes stored on the node. Malformed escapes are reported against the
//! source offsets of the escape and the rest of the content is still
//! processed.

use crate::char_codes::{is_hex_digit, is_octal_digit, is_whitespace};
use rbparse_core::text::Location;
use rbparse_diagnostics::{messages, Diagnostic, DiagnosticCollection};

/// Which escapes are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnescapeKind {
    /// Double-quoted strings, interpolating lists, heredocs and symbols.
    All,
    /// Single-quoted strings: only `\\` and the escaped delimiters.
    Minimal { terminator: u8, incrementor: u8 },
    /// `%w` and `%i` words: like `Minimal`, plus escaped whitespace.
    Words { terminator: u8, incrementor: u8 },
    /// Regular expression source, left for the regex engine except for an
    /// escaped terminator.
    Regexp { terminator: u8 },
}

/// Unescape `content`, which starts at `base` in the source.
pub fn unescape(
    content: &[u8],
    base: usize,
    kind: UnescapeKind,
    diagnostics: &mut DiagnosticCollection,
) -> Vec<u8> {
    if memchr::memchr(b'\\', content).is_none() {
        return content.to_vec();
    }
    let mut unescaper = Unescaper {
        content,
        pos: 0,
        base,
        out: Vec::with_capacity(content.len()),
        diagnostics,
    };
    unescaper.run(kind);
    unescaper.out
}

struct Unescaper<'s, 'd> {
    content: &'s [u8],
    pos: usize,
    base: usize,
    out: Vec<u8>,
    diagnostics: &'d mut DiagnosticCollection,
}

impl<'s, 'd> Unescaper<'s, 'd> {
    fn run(&mut self, kind: UnescapeKind) {
        while self.pos < self.content.len() {
            let rest = &self.content[self.pos..];
            let Some(offset) = memchr::memchr(b'\\', rest) else {
                self.out.extend_from_slice(rest);
                break;
            };
            self.out.extend_from_slice(&rest[..offset]);
            self.pos += offset + 1;

            match kind {
                UnescapeKind::All => self.escape(),
                UnescapeKind::Minimal { terminator, incrementor } => {
                    self.delimiter_escape(terminator, incrementor, false)
                }
                UnescapeKind::Words { terminator, incrementor } => {
                    self.delimiter_escape(terminator, incrementor, true)
                }
                UnescapeKind::Regexp { terminator } => match self.peek() {
                    Some(byte) if byte == terminator && byte != b'\\' => {
                        self.out.push(byte);
                        self.pos += 1;
                    }
                    Some(byte) => {
                        self.out.extend_from_slice(&[b'\\', byte]);
                        self.pos += 1;
                    }
                    None => self.out.push(b'\\'),
                },
            }
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.content.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.content.get(self.pos + offset).copied()
    }

    fn invalid(&mut self, start: usize) {
        let location = Location::from_offsets(self.base + start, self.base + self.pos.max(start + 1));
        self.diagnostics
            .add(Diagnostic::new(location, &messages::INVALID_ESCAPE, &[]));
    }

    fn delimiter_escape(&mut self, terminator: u8, incrementor: u8, whitespace: bool) {
        match self.peek() {
            Some(byte)
                if byte == b'\\'
                    || byte == terminator
                    || (incrementor != 0 && byte == incrementor)
                    || (whitespace && is_whitespace(byte)) =>
            {
                self.out.push(byte);
                self.pos += 1;
            }
            _ => self.out.push(b'\\'),
        }
    }

    /// Full escape processing, with the cursor just past the backslash.
    fn escape(&mut self) {
        match self.peek() {
            None => self.out.push(b'\\'),
            Some(b'\n') => self.pos += 1,
            Some(b'\r') if self.peek_at(1) == Some(b'\n') => self.pos += 2,
            Some(b'u') => self.unicode(),
            Some(_) => {
                if let Some(value) = self.byte_escape() {
                    self.out.push(value);
                }
            }
        }
    }

    /// An escape that denotes a single byte.
    fn byte_escape(&mut self) -> Option<u8> {
        let start = self.pos - 1;
        let byte = self.peek()?;
        self.pos += 1;
        let value = match byte {
            b'n' => b'\n',
            b't' => b'\t',
            b's' => b' ',
            b'r' => b'\r',
            b'a' => 0x07,
            b'b' => 0x08,
            b'e' => 0x1b,
            b'f' => 0x0c,
            b'v' => 0x0b,
            b'0'..=b'7' => {
                let mut value = u32::from(byte - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(digit) if is_octal_digit(digit) => {
                            value = value * 8 + u32::from(digit - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                (value & 0xff) as u8
            }
            b'x' => {
                let mut value = 0u8;
                let mut count = 0;
                while count < 2 {
                    match self.peek() {
                        Some(digit) if is_hex_digit(digit) => {
                            value = value * 16 + hex_value(digit);
                            self.pos += 1;
                            count += 1;
                        }
                        _ => break,
                    }
                }
                if count == 0 {
                    self.invalid(start);
                    return None;
                }
                value
            }
            b'c' => return self.escaped_target(start).map(control),
            b'C' if self.peek() == Some(b'-') => {
                self.pos += 1;
                return self.escaped_target(start).map(control);
            }
            b'M' if self.peek() == Some(b'-') => {
                self.pos += 1;
                return self.escaped_target(start).map(|value| value | 0x80);
            }
            other => other,
        };
        Some(value)
    }

    /// The character a `\c`, `\C-` or `\M-` escape applies to.
    fn escaped_target(&mut self, start: usize) -> Option<u8> {
        match self.peek() {
            None => {
                self.invalid(start);
                None
            }
            Some(b'\\') => {
                self.pos += 1;
                self.byte_escape()
            }
            Some(byte) => {
                self.pos += 1;
                Some(byte)
            }
        }
    }

    /// `\uXXXX` or `\u{X XX XXX}`, with the cursor at `u`.
    fn unicode(&mut self) {
        let start = self.pos - 1;
        self.pos += 1;

        if self.peek() != Some(b'{') {
            let digits = self.hex_run(4);
            if digits.len() != 4 {
                self.invalid(start);
                return;
            }
            self.push_codepoint(start, &digits);
            return;
        }

        self.pos += 1;
        loop {
            while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
                self.pos += 1;
            }
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return;
                }
                Some(byte) if is_hex_digit(byte) => {
                    let codepoint_start = self.pos;
                    let digits = self.hex_run(usize::MAX);
                    if digits.len() > 6 {
                        self.invalid(codepoint_start);
                        continue;
                    }
                    self.push_codepoint(codepoint_start, &digits);
                }
                _ => {
                    self.invalid(start);
                    return;
                }
            }
        }
    }

    fn hex_run(&mut self, limit: usize) -> Vec<u8> {
        let mut digits = Vec::new();
        while digits.len() < limit {
            match self.peek() {
                Some(byte) if is_hex_digit(byte) => {
                    digits.push(byte);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        digits
    }

    fn push_codepoint(&mut self, start: usize, digits: &[u8]) {
        let value = digits
            .iter()
            .fold(0u32, |acc, digit| acc * 16 + u32::from(hex_value(*digit)));
        match char::from_u32(value) {
            Some(ch) => {
                let mut buffer = [0u8; 4];
                self.out.extend_from_slice(ch.encode_utf8(&mut buffer).as_bytes());
            }
            None => self.invalid(start),
        }
    }
}

#[inline]
fn control(value: u8) -> u8 {
    if value == b'?' {
        0x7f
    } else {
        value & 0x9f
    }
}

#[inline]
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
