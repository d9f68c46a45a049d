//! Template parsing.

use crate::directive::{
    Directive, DirectiveType, Encoding, Endian, Format, LengthType, Signed, Size, Variant, Version,
};
use rbparse_core::text::Location;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("unsupported directive '{directive}' at offset {offset}")]
    UnsupportedDirective { directive: char, offset: usize },
    #[error("unknown directive '{directive}' at offset {offset}")]
    UnknownDirective { directive: char, offset: usize },
    #[error("pack length too big at offset {offset}")]
    LengthTooBig { offset: usize },
    #[error("'{modifier}' allowed only after types sSiIlLqQjJ (offset {offset})")]
    BangNotAllowed { modifier: char, offset: usize },
    #[error("can't use both '<' and '>' (offset {offset})")]
    DoubleEndian { offset: usize },
}

/// Parse a whole template into its directives and the encoding of the
/// packed result.
pub fn parse_directives(version: Version, variant: Variant, format: &str) -> Result<Format, PackError> {
    let mut scanner = Scanner {
        bytes: format.as_bytes(),
        format,
        pos: 0,
        variant,
    };
    let mut encoding = Encoding::UsAscii;
    let mut directives = Vec::new();

    while scanner.pos < scanner.bytes.len() {
        let start = scanner.pos;
        let parsed = scanner.directive()?;
        apply_encoding(&mut encoding, parsed.directive_type);
        directives.push(Directive {
            version,
            variant,
            source: format[start..scanner.pos].to_string(),
            span: Location::new(start as u32, scanner.pos as u32),
            directive_type: parsed.directive_type,
            signed: parsed.signed,
            endian: parsed.endian,
            size: parsed.size,
            length_type: parsed.length_type,
            length: parsed.length,
        });
    }

    tracing::trace!(directives = directives.len(), ?encoding, "parsed pack template");
    Ok(Format { directives, encoding })
}

/// `U` upgrades a still-ASCII result to UTF-8; the text encodings keep it;
/// everything else makes it binary.
fn apply_encoding(encoding: &mut Encoding, directive_type: DirectiveType) {
    match directive_type {
        DirectiveType::Space | DirectiveType::Comment => {}
        DirectiveType::Utf8 => {
            if *encoding == Encoding::UsAscii {
                *encoding = Encoding::Utf8;
            }
        }
        DirectiveType::StringMime | DirectiveType::StringBase64 | DirectiveType::StringUu => {}
        _ => *encoding = Encoding::Ascii8Bit,
    }
}

struct Parsed {
    directive_type: DirectiveType,
    signed: Signed,
    endian: Endian,
    size: Size,
    length_type: LengthType,
    length: u64,
}

impl Parsed {
    fn new(directive_type: DirectiveType, signed: Signed, endian: Endian, size: Size) -> Self {
        Self {
            directive_type,
            signed,
            endian,
            size,
            length_type: LengthType::Fixed,
            length: 1,
        }
    }

    fn string(directive_type: DirectiveType) -> Self {
        Self::new(directive_type, Signed::NotApplicable, Endian::NotApplicable, Size::NotApplicable)
    }

    fn bare(directive_type: DirectiveType) -> Self {
        Self {
            length_type: LengthType::NotApplicable,
            length: 0,
            ..Self::string(directive_type)
        }
    }
}

struct Scanner<'f> {
    bytes: &'f [u8],
    format: &'f str,
    pos: usize,
    variant: Variant,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn char_at(&self, offset: usize) -> char {
        self.format
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn directive(&mut self) -> Result<Parsed, PackError> {
        use DirectiveType as T;
        use Endian as E;
        use Signed as S;

        let offset = self.pos;
        let Some(letter) = self.peek() else {
            return Err(PackError::UnknownDirective {
                directive: char::REPLACEMENT_CHARACTER,
                offset,
            });
        };
        self.pos += 1;

        // Only the native-sized integer letters take `_`, `!`, `<` and `>`.
        let mut modifiable = true;
        let mut parsed = match letter {
            b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r' => return Ok(Parsed::bare(T::Space)),
            b'#' => {
                while self.peek().is_some_and(|byte| byte != b'\n') {
                    self.pos += 1;
                }
                return Ok(Parsed::bare(T::Comment));
            }
            b'C' => Parsed::new(T::Integer, S::Unsigned, E::Agnostic, Size::Bits8),
            b'S' => Parsed::new(T::Integer, S::Unsigned, E::Native, Size::Bits16),
            b'L' => Parsed::new(T::Integer, S::Unsigned, E::Native, Size::Bits32),
            b'Q' => Parsed::new(T::Integer, S::Unsigned, E::Native, Size::Bits64),
            b'J' => Parsed::new(T::Integer, S::Unsigned, E::Native, Size::Pointer),
            b'c' => Parsed::new(T::Integer, S::Signed, E::Agnostic, Size::Bits8),
            b's' => Parsed::new(T::Integer, S::Signed, E::Native, Size::Bits16),
            b'l' => Parsed::new(T::Integer, S::Signed, E::Native, Size::Bits32),
            b'q' => Parsed::new(T::Integer, S::Signed, E::Native, Size::Bits64),
            b'j' => Parsed::new(T::Integer, S::Signed, E::Native, Size::Pointer),
            b'I' => Parsed::new(T::Integer, S::Unsigned, E::Native, Size::Int),
            b'i' => Parsed::new(T::Integer, S::Signed, E::Native, Size::Int),
            b'n' | b'N' | b'v' | b'V' => {
                modifiable = false;
                let endian = if matches!(letter, b'n' | b'N') { E::Big } else { E::Little };
                let size = if matches!(letter, b'n' | b'v') { Size::Bits16 } else { Size::Bits32 };
                Parsed::new(T::Integer, S::Unsigned, endian, size)
            }
            b'U' => Parsed::string(T::Utf8),
            b'w' => Parsed::new(T::Ber, S::Unsigned, E::NotApplicable, Size::NotApplicable),
            b'D' | b'd' => Parsed::new(T::Float, S::NotApplicable, E::Native, Size::Bits64),
            b'F' | b'f' => Parsed::new(T::Float, S::NotApplicable, E::Native, Size::Bits32),
            b'E' => Parsed::new(T::Float, S::NotApplicable, E::Little, Size::Bits64),
            b'e' => Parsed::new(T::Float, S::NotApplicable, E::Little, Size::Bits32),
            b'G' => Parsed::new(T::Float, S::NotApplicable, E::Big, Size::Bits64),
            b'g' => Parsed::new(T::Float, S::NotApplicable, E::Big, Size::Bits32),
            b'A' => Parsed::string(T::StringSpacePadded),
            b'a' => Parsed::string(T::StringNullPadded),
            b'Z' => Parsed::string(T::StringNullTerminated),
            b'B' => Parsed::string(T::StringMsb),
            b'b' => Parsed::string(T::StringLsb),
            b'H' => Parsed::string(T::StringHexHigh),
            b'h' => Parsed::string(T::StringHexLow),
            b'u' => Parsed::string(T::StringUu),
            b'M' => Parsed::string(T::StringMime),
            b'm' => Parsed::string(T::StringBase64),
            b'P' => Parsed::string(T::StringFixed),
            b'p' => Parsed::string(T::StringPointer),
            b'@' => Parsed::string(T::Move),
            b'X' => Parsed::string(T::Back),
            b'x' => Parsed::string(T::Null),
            b'%' => {
                return Err(PackError::UnsupportedDirective {
                    directive: '%',
                    offset,
                })
            }
            _ => {
                return Err(PackError::UnknownDirective {
                    directive: self.char_at(offset),
                    offset,
                })
            }
        };

        self.modifiers(&mut parsed, modifiable)?;

        if self.variant == Variant::Unpack && parsed.directive_type == T::Move {
            parsed.length = 0;
        }
        self.count(&mut parsed)?;
        Ok(parsed)
    }

    fn modifiers(&mut self, parsed: &mut Parsed, modifiable: bool) -> Result<(), PackError> {
        let mut explicit_endian = false;
        while let Some(modifier) = self.peek() {
            let offset = self.pos;
            match modifier {
                b'_' | b'!' => {
                    self.pos += 1;
                    let not_allowed = PackError::BangNotAllowed {
                        modifier: modifier as char,
                        offset,
                    };
                    if parsed.directive_type != DirectiveType::Integer || !modifiable {
                        return Err(not_allowed);
                    }
                    parsed.size = match parsed.size {
                        Size::Short | Size::Int | Size::Long | Size::LongLong | Size::Pointer => parsed.size,
                        Size::Bits16 => Size::Short,
                        Size::Bits32 => Size::Long,
                        Size::Bits64 => Size::LongLong,
                        Size::Bits8 | Size::NotApplicable => return Err(not_allowed),
                    };
                }
                b'<' | b'>' => {
                    self.pos += 1;
                    if parsed.directive_type != DirectiveType::Integer
                        || !modifiable
                        || parsed.endian == Endian::Agnostic
                    {
                        return Err(PackError::BangNotAllowed {
                            modifier: modifier as char,
                            offset,
                        });
                    }
                    if explicit_endian {
                        return Err(PackError::DoubleEndian { offset });
                    }
                    explicit_endian = true;
                    parsed.endian = if modifier == b'<' { Endian::Little } else { Endian::Big };
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn count(&mut self, parsed: &mut Parsed) -> Result<(), PackError> {
        use DirectiveType as T;

        match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                let unpack = self.variant == Variant::Unpack;
                (parsed.length_type, parsed.length) = match parsed.directive_type {
                    T::Null | T::Back if unpack => (LengthType::Max, 0),
                    T::Null | T::Back => (LengthType::Fixed, 0),
                    T::Move if unpack => (LengthType::Relative, 0),
                    T::Move => (LengthType::Fixed, 0),
                    T::StringUu => (LengthType::Fixed, 0),
                    T::StringFixed if unpack => (LengthType::Max, 0),
                    T::StringFixed => (LengthType::Fixed, 1),
                    T::StringMime | T::StringBase64 => (LengthType::Fixed, 1),
                    _ => (LengthType::Max, 0),
                };
            }
            Some(b'0'..=b'9') => {
                let offset = self.pos;
                let mut length: u64 = 0;
                while let Some(digit @ b'0'..=b'9') = self.peek() {
                    self.pos += 1;
                    length = length
                        .checked_mul(10)
                        .and_then(|length| length.checked_add(u64::from(digit - b'0')))
                        .ok_or(PackError::LengthTooBig { offset })?;
                }
                parsed.length_type = LengthType::Fixed;
                parsed.length = length;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(format: &str) -> Result<Format, PackError> {
        parse_directives(Version::Ruby3_2, Variant::Pack, format)
    }

    fn single(format: &str) -> Directive {
        let mut directives = pack(format).unwrap().directives;
        assert_eq!(directives.len(), 1, "{:?}", directives);
        directives.remove(0)
    }

    #[test]
    fn test_empty_template() {
        let format = pack("").unwrap();
        assert!(format.directives.is_empty());
        assert_eq!(format.encoding, Encoding::UsAscii);
    }

    #[test]
    fn test_integer_letters() {
        let directive = single("s");
        assert_eq!(directive.directive_type, DirectiveType::Integer);
        assert_eq!(directive.signed, Signed::Signed);
        assert_eq!(directive.endian, Endian::Native);
        assert_eq!(directive.size, Size::Bits16);
        assert_eq!(directive.length_type, LengthType::Fixed);
        assert_eq!(directive.length, 1);

        let directive = single("N");
        assert_eq!(directive.endian, Endian::Big);
        assert_eq!(directive.size, Size::Bits32);
    }

    #[test]
    fn test_native_size_modifier() {
        assert_eq!(single("s_").size, Size::Short);
        assert_eq!(single("L!").size, Size::Long);
        assert_eq!(single("q!").size, Size::LongLong);
        assert_eq!(single("i!").size, Size::Int);
    }

    #[test]
    fn test_endian_modifiers() {
        assert_eq!(single("L<").endian, Endian::Little);
        assert_eq!(single("s!>").endian, Endian::Big);
    }

    #[test]
    fn test_counts() {
        let directive = single("a10");
        assert_eq!(directive.length_type, LengthType::Fixed);
        assert_eq!(directive.length, 10);

        let directive = single("C*");
        assert_eq!(directive.length_type, LengthType::Max);
        assert_eq!(directive.length, 0);
    }

    #[test]
    fn test_length_too_big() {
        assert_eq!(
            pack("a99999999999999999999"),
            Err(PackError::LengthTooBig { offset: 1 })
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        let format = pack("C # byte\nS").unwrap();
        let types: Vec<DirectiveType> = format.directives.iter().map(|d| d.directive_type).collect();
        assert_eq!(
            types,
            vec![
                DirectiveType::Integer,
                DirectiveType::Space,
                DirectiveType::Comment,
                DirectiveType::Space,
                DirectiveType::Integer,
            ]
        );
        assert_eq!(format.directives[2].source, "# byte");
    }
}
