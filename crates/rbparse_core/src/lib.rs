//! rbparse_core: Core utilities shared by every stage of the Ruby parser.
//!
//! Provides byte-offset locations, line lookup, the parse arena, small
//! collections and stack growth for deeply nested input.

pub mod arena;
pub mod collections;
pub mod stack;
pub mod text;

// Re-export commonly used types
pub use arena::ParseArena;
pub use collections::OrderedSet;
pub use stack::ensure_sufficient_stack;
pub use text::{LineMap, Location};
