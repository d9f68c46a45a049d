//! Directive descriptions.

use rbparse_core::text::Location;

/// Language version whose template rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    #[default]
    Ruby3_2,
}

/// Whether the template drives packing or unpacking. A few directives
/// interpret `*` differently between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Pack,
    Unpack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveType {
    Space,
    Comment,
    Integer,
    Utf8,
    Ber,
    Float,
    StringSpacePadded,
    StringNullPadded,
    StringNullTerminated,
    StringMsb,
    StringLsb,
    StringHexHigh,
    StringHexLow,
    StringUu,
    StringMime,
    StringBase64,
    StringFixed,
    StringPointer,
    Move,
    Back,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signed {
    Unsigned,
    Signed,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Single bytes, where byte order does not matter.
    Agnostic,
    Little,
    Big,
    Native,
    NotApplicable,
}

/// Size of a numeric directive. The C-type classes are platform sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Short,
    Int,
    Long,
    LongLong,
    Bits8,
    Bits16,
    Bits32,
    Bits64,
    Pointer,
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthType {
    /// Exactly `length` items.
    Fixed,
    /// As many items as remain (`*`).
    Max,
    /// `*` on `@` when unpacking: relative to the current position.
    Relative,
    NotApplicable,
}

/// Encoding of the string a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    UsAscii,
    Utf8,
    Ascii8Bit,
}

/// One parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub version: Version,
    pub variant: Variant,
    /// The template text this directive was parsed from.
    pub source: String,
    /// Byte span of `source` within the template.
    pub span: Location,
    pub directive_type: DirectiveType,
    pub signed: Signed,
    pub endian: Endian,
    pub size: Size,
    pub length_type: LengthType,
    pub length: u64,
}

impl Directive {
    /// A one-line human description, e.g. `"16-bit unsigned big-endian integer"`.
    pub fn describe(&self) -> String {
        match self.directive_type {
            DirectiveType::Space => "whitespace".to_string(),
            DirectiveType::Comment => "comment".to_string(),
            DirectiveType::Integer => {
                let mut parts = vec![self.size_name().to_string()];
                parts.push(match self.signed {
                    Signed::Signed => "signed".to_string(),
                    _ => "unsigned".to_string(),
                });
                match self.endian {
                    Endian::Little => parts.push("little-endian".to_string()),
                    Endian::Big => parts.push("big-endian".to_string()),
                    Endian::Native => parts.push("native-endian".to_string()),
                    Endian::Agnostic | Endian::NotApplicable => {}
                }
                parts.push("integer".to_string());
                format!("{}{}", parts.join(" "), self.count_suffix())
            }
            DirectiveType::Float => {
                let endian = match self.endian {
                    Endian::Little => " little-endian",
                    Endian::Big => " big-endian",
                    _ => " native-endian",
                };
                format!("{}{} float{}", self.size_name(), endian, self.count_suffix())
            }
            DirectiveType::Utf8 => format!("UTF-8 character{}", self.count_suffix()),
            DirectiveType::Ber => format!("BER-compressed integer{}", self.count_suffix()),
            DirectiveType::StringSpacePadded => format!("arbitrary binary string (space padded){}", self.width_suffix()),
            DirectiveType::StringNullPadded => format!("arbitrary binary string (null padded){}", self.width_suffix()),
            DirectiveType::StringNullTerminated => format!("null-terminated string{}", self.width_suffix()),
            DirectiveType::StringMsb => format!("bit string (MSB first){}", self.width_suffix()),
            DirectiveType::StringLsb => format!("bit string (LSB first){}", self.width_suffix()),
            DirectiveType::StringHexHigh => format!("hex string (high nibble first){}", self.width_suffix()),
            DirectiveType::StringHexLow => format!("hex string (low nibble first){}", self.width_suffix()),
            DirectiveType::StringUu => "UU-encoded string".to_string(),
            DirectiveType::StringMime => "quoted printable, MIME encoding".to_string(),
            DirectiveType::StringBase64 => "base64-encoded string".to_string(),
            DirectiveType::StringFixed => "pointer to a fixed-length string".to_string(),
            DirectiveType::StringPointer => "pointer to a null-terminated string".to_string(),
            DirectiveType::Move => match self.length_type {
                LengthType::Relative => "move to the current position".to_string(),
                _ => format!("move to absolute position {}", self.length),
            },
            DirectiveType::Back => format!("back up {}", self.byte_count()),
            DirectiveType::Null => format!("null {}", self.byte_count()),
        }
    }

    fn size_name(&self) -> &'static str {
        match self.size {
            Size::Short => "short",
            Size::Int => "int",
            Size::Long => "long",
            Size::LongLong => "long long",
            Size::Bits8 => "8-bit",
            Size::Bits16 => "16-bit",
            Size::Bits32 => "32-bit",
            Size::Bits64 => "64-bit",
            Size::Pointer => "pointer-width",
            Size::NotApplicable => "",
        }
    }

    fn count_suffix(&self) -> String {
        match self.length_type {
            LengthType::Fixed if self.length > 1 => format!(", x{}", self.length),
            LengthType::Max => ", as many as possible".to_string(),
            _ => String::new(),
        }
    }

    fn width_suffix(&self) -> String {
        match self.length_type {
            LengthType::Fixed if self.length > 1 => format!(", {} wide", self.length),
            LengthType::Max => ", as long as possible".to_string(),
            _ => String::new(),
        }
    }

    fn byte_count(&self) -> String {
        match self.length_type {
            LengthType::Max => "to the end".to_string(),
            _ if self.length == 1 => "a byte".to_string(),
            _ => format!("{} bytes", self.length),
        }
    }
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub directives: Vec<Directive>,
    /// Encoding of the packed result.
    pub encoding: Encoding,
}

impl Format {
    /// One description line per directive, whitespace and comments skipped.
    pub fn describe(&self) -> Vec<String> {
        self.directives
            .iter()
            .filter(|directive| !matches!(directive.directive_type, DirectiveType::Space | DirectiveType::Comment))
            .map(|directive| format!("{}: {}", directive.source.trim_end(), directive.describe()))
            .collect()
    }
}
