//! Flag types carried by some node variants.

bitflags::bitflags! {
    /// Flags for call nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CallFlags: u32 {
        const NONE              = 0;
        /// The call uses `&.`.
        const SAFE_NAVIGATION   = 1 << 0;
        /// A bare identifier that could also have been a local variable.
        const VARIABLE_CALL     = 1 << 1;
        /// An attribute or index assignment such as `a.b = 1` or `a[0] = 1`.
        const ATTRIBUTE_WRITE   = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Options trailing a regular expression literal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RegexFlags: u32 {
        const NONE          = 0;
        const IGNORE_CASE   = 1 << 0;
        const EXTENDED      = 1 << 1;
        const MULTI_LINE    = 1 << 2;
        const ONCE          = 1 << 3;
        const EUC_JP        = 1 << 4;
        const ASCII_8BIT    = 1 << 5;
        const WINDOWS_31J   = 1 << 6;
        const UTF_8         = 1 << 7;
    }
}

impl RegexFlags {
    /// The flag for one option character, e.g. `i` in `/a/i`.
    pub fn from_option(byte: u8) -> Option<RegexFlags> {
        Some(match byte {
            b'i' => RegexFlags::IGNORE_CASE,
            b'x' => RegexFlags::EXTENDED,
            b'm' => RegexFlags::MULTI_LINE,
            b'o' => RegexFlags::ONCE,
            b'e' => RegexFlags::EUC_JP,
            b'n' => RegexFlags::ASCII_8BIT,
            b's' => RegexFlags::WINDOWS_31J,
            b'u' => RegexFlags::UTF_8,
            _ => return None,
        })
    }
}

bitflags::bitflags! {
    /// Flags for string literal nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StringFlags: u32 {
        const NONE      = 0;
        /// `frozen_string_literal` is in effect for this literal.
        const FROZEN    = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Flags for range nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RangeFlags: u32 {
        const NONE          = 0;
        /// `...` rather than `..`.
        const EXCLUDE_END   = 1 << 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_options() {
        let mut flags = RegexFlags::NONE;
        for byte in b"imx" {
            flags |= RegexFlags::from_option(*byte).unwrap_or_default();
        }
        assert!(flags.contains(RegexFlags::IGNORE_CASE | RegexFlags::MULTI_LINE | RegexFlags::EXTENDED));
        assert_eq!(RegexFlags::from_option(b'z'), None);
    }
}
