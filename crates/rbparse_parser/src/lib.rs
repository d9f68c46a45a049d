//! rbparse_parser: Ruby source to syntax tree.
//!
//! ```ignore
//! let arena = bumpalo::Bump::new();
//! let result = Parser::new(&arena, source, &ParseOptions::default()).parse();
//! ```

mod parser;
mod precedence;
mod scope;

pub use parser::{ParseResult, Parser};
pub use precedence::{binding_power, Binding, BindingPower};
pub use scope::{ScopeKind, ScopeStack};
