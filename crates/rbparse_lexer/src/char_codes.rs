//! Byte classification used by the lexer.
//!
//! Source text is scanned as bytes. Any byte at or above 0x80 is treated as
//! part of an identifier, so multi-byte UTF-8 names lex without decoding.

#[inline]
pub fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte >= 0x80
}

#[inline]
pub fn is_identifier_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte >= 0x80
}

/// Spaces, tabs and the other non-newline whitespace bytes.
#[inline]
pub fn is_non_newline_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | 0x0b | 0x0c | b'\r')
}

#[inline]
pub fn is_whitespace(byte: u8) -> bool {
    is_non_newline_whitespace(byte) || byte == b'\n'
}

#[inline]
pub fn is_binary_digit(byte: u8) -> bool {
    matches!(byte, b'0' | b'1')
}

#[inline]
pub fn is_octal_digit(byte: u8) -> bool {
    matches!(byte, b'0'..=b'7')
}

#[inline]
pub fn is_decimal_digit(byte: u8) -> bool {
    byte.is_ascii_digit()
}

#[inline]
pub fn is_hex_digit(byte: u8) -> bool {
    byte.is_ascii_hexdigit()
}

/// Characters that may follow `$` to form a special global such as `$!`.
#[inline]
pub fn is_special_global(byte: u8) -> bool {
    matches!(
        byte,
        b'~' | b'*' | b'$' | b'?' | b'!' | b'@' | b'/' | b'\\' | b';' | b',' | b'.' | b'=' | b':'
            | b'<' | b'>' | b'"' | b'0'
    )
}

/// `$&`, `` $` ``, `$'` and `$+`.
#[inline]
pub fn is_back_reference(byte: u8) -> bool {
    matches!(byte, b'&' | b'`' | b'\'' | b'+')
}

/// The closing delimiter paired with an opening one. Non-bracket
/// delimiters close themselves.
#[inline]
pub fn terminator_for(opening: u8) -> u8 {
    match opening {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        b'<' => b'>',
        other => other,
    }
}

/// The opening byte that increases nesting for a bracket delimiter, or 0.
#[inline]
pub fn incrementor_for(opening: u8) -> u8 {
    match opening {
        b'(' | b'[' | b'{' | b'<' => opening,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_bytes() {
        assert!(is_identifier_start(b'a'));
        assert!(is_identifier_start(b'_'));
        assert!(is_identifier_start(0xc3));
        assert!(!is_identifier_start(b'1'));
        assert!(is_identifier_char(b'1'));
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(terminator_for(b'('), b')');
        assert_eq!(terminator_for(b'|'), b'|');
        assert_eq!(incrementor_for(b'<'), b'<');
        assert_eq!(incrementor_for(b'!'), 0);
    }
}
