//! rbparse_lexer: Tokenizer for Ruby source.
//!
//! The lexer is driven one token at a time by the parser, which may adjust
//! its state when it knows more about the grammar (local variables, method
//! names after `def`). `tokenize` runs it standalone.

pub mod char_codes;
pub mod lexer;
pub mod mode;
pub mod state;
pub mod unescape;

pub use lexer::{tokenize, Lexer};
pub use mode::{HeredocIndent, HeredocQuote, LexMode};
pub use state::LexState;
pub use unescape::{unescape, UnescapeKind};
