//! rbparse_ast: syntax tree definitions.
//!
//! Tokens, node variants with their stable tags, the flag types some nodes
//! carry, location computation and tree traversal.

pub mod comment;
pub mod field;
pub mod flags;
pub mod location;
pub mod node;
pub mod token;
pub mod visitor;

pub use comment::{Comment, CommentKind};
pub use field::{Field, FieldVisitor};
pub use flags::{CallFlags, RangeFlags, RegexFlags, StringFlags};
pub use node::{Node, NodeKind};
pub use token::{Token, TokenKind};
pub use visitor::{for_each_child, walk_children, AstVisitor};
