//! Pack template integration tests.

use pretty_assertions::assert_eq;
use rbparse_core::text::Location;
use rbparse_pack::{
    parse_directives, DirectiveType, Encoding, Endian, Format, LengthType, PackError, Size, Variant, Version,
};

fn parse(variant: Variant, format: &str) -> Result<Format, PackError> {
    parse_directives(Version::Ruby3_2, variant, format)
}

fn pack(format: &str) -> Format {
    parse(Variant::Pack, format).unwrap()
}

fn unpack(format: &str) -> Format {
    parse(Variant::Unpack, format).unwrap()
}

// ============================================================================
// Spans
// ============================================================================

#[test]
fn test_directive_spans_cover_template() {
    let format = pack("C2n*  a3");
    let sources: Vec<&str> = format.directives.iter().map(|d| d.source.as_str()).collect();
    assert_eq!(sources, vec!["C2", "n*", " ", " ", "a3"]);
    assert_eq!(format.directives[1].span, Location::new(2, 4));
    assert_eq!(format.directives[4].span, Location::new(6, 8));
}

#[test]
fn test_modifiers_are_part_of_the_span() {
    let format = pack("l_<4");
    assert_eq!(format.directives.len(), 1);
    assert_eq!(format.directives[0].source, "l_<4");
    assert_eq!(format.directives[0].size, Size::Long);
    assert_eq!(format.directives[0].endian, Endian::Little);
    assert_eq!(format.directives[0].length, 4);
}

// ============================================================================
// Pack versus unpack
// ============================================================================

#[test]
fn test_star_on_null_and_back() {
    let packed = &pack("x*").directives[0];
    assert_eq!((packed.length_type, packed.length), (LengthType::Fixed, 0));

    let unpacked = &unpack("X*").directives[0];
    assert_eq!((unpacked.length_type, unpacked.length), (LengthType::Max, 0));
}

#[test]
fn test_move_directive() {
    let packed = &pack("@").directives[0];
    assert_eq!((packed.length_type, packed.length), (LengthType::Fixed, 1));

    let unpacked = &unpack("@").directives[0];
    assert_eq!((unpacked.length_type, unpacked.length), (LengthType::Fixed, 0));

    let relative = &unpack("@*").directives[0];
    assert_eq!(relative.length_type, LengthType::Relative);
}

#[test]
fn test_star_on_fixed_pointer_and_encoded_strings() {
    let packed = &pack("P*").directives[0];
    assert_eq!((packed.length_type, packed.length), (LengthType::Fixed, 1));
    let unpacked = &unpack("P*").directives[0];
    assert_eq!((unpacked.length_type, unpacked.length), (LengthType::Max, 0));

    let base64 = &pack("m*").directives[0];
    assert_eq!((base64.length_type, base64.length), (LengthType::Fixed, 1));
    let uu = &pack("u*").directives[0];
    assert_eq!((uu.length_type, uu.length), (LengthType::Fixed, 0));
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_encoding_of_result() {
    assert_eq!(pack("U*").encoding, Encoding::Utf8);
    assert_eq!(pack("m0").encoding, Encoding::UsAscii);
    assert_eq!(pack("  # nothing").encoding, Encoding::UsAscii);
    assert_eq!(pack("C").encoding, Encoding::Ascii8Bit);
    assert_eq!(pack("CU").encoding, Encoding::Ascii8Bit);
    assert_eq!(pack("UC").encoding, Encoding::Ascii8Bit);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unsupported_directive() {
    assert_eq!(
        parse(Variant::Pack, "C%"),
        Err(PackError::UnsupportedDirective { directive: '%', offset: 1 })
    );
}

#[test]
fn test_unknown_directive() {
    assert_eq!(
        parse(Variant::Unpack, "Cy"),
        Err(PackError::UnknownDirective { directive: 'y', offset: 1 })
    );
    assert_eq!(
        parse(Variant::Pack, "é"),
        Err(PackError::UnknownDirective { directive: 'é', offset: 0 })
    );
}

#[test]
fn test_modifier_not_allowed() {
    assert_eq!(
        parse(Variant::Pack, "n!"),
        Err(PackError::BangNotAllowed { modifier: '!', offset: 1 })
    );
    assert_eq!(
        parse(Variant::Pack, "a_"),
        Err(PackError::BangNotAllowed { modifier: '_', offset: 1 })
    );
    assert_eq!(
        parse(Variant::Pack, "C<"),
        Err(PackError::BangNotAllowed { modifier: '<', offset: 1 })
    );
}

#[test]
fn test_conflicting_endianness() {
    assert_eq!(
        parse(Variant::Pack, "s<>"),
        Err(PackError::DoubleEndian { offset: 2 })
    );
}

#[test]
fn test_error_messages() {
    let error = parse(Variant::Pack, "s<>").unwrap_err();
    assert_eq!(error.to_string(), "can't use both '<' and '>' (offset 2)");
}

// ============================================================================
// Descriptions
// ============================================================================

#[test]
fn test_describe() {
    let format = pack("C n2 a* # trailing");
    assert_eq!(
        format.describe(),
        vec![
            "C: 8-bit unsigned integer".to_string(),
            "n2: 16-bit unsigned big-endian integer, x2".to_string(),
            "a*: arbitrary binary string (null padded), as long as possible".to_string(),
        ]
    );
    assert_eq!(format.directives[0].directive_type, DirectiveType::Integer);
}
