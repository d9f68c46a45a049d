//! rbparse_pack: the `Array#pack` / `String#unpack` template language.
//!
//! A template such as `"C2 n* a3"` is a sequence of directives. Each
//! directive is a type letter, optional `_`/`!` and `<`/`>` modifiers, and
//! an optional count (`3`) or star. [`parse_directives`] validates a
//! template and describes every directive it contains, including
//! whitespace and comments, with the byte span it came from.

mod directive;
mod parse;

pub use directive::{
    Directive, DirectiveType, Encoding, Endian, Format, LengthType, Signed, Size, Variant, Version,
};
pub use parse::{parse_directives, PackError};
