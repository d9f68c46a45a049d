//! rbparse_serialize: binary dump of a syntax tree.
//!
//! The format is a header followed by the root node and a trailing NUL:
//!
//! ```text
//! "YARP" major:u8 minor:u8 patch:u8 <node> 0x00
//! ```
//!
//! Each node is its tag byte, its location as `start:u32 length:u32`, and
//! then its fields in declaration order. Integers are little-endian.
//!
//! | field           | encoding                                        |
//! |-----------------|-------------------------------------------------|
//! | node            | nested node                                     |
//! | optional node   | `0x00` when absent, otherwise a nested node     |
//! | node list       | `count:u32` then each node                      |
//! | token           | `start:u32 length:u32`                          |
//! | optional token  | `0x00` when absent, `0x01` then the token       |
//! | token list      | `count:u32` then each token                     |
//! | bytes, name     | `length:u32` then the raw bytes                 |
//! | locals          | `count:u32` then each name                      |
//! | integer, flags  | `u32`                                           |
//!
//! Node tags start at 1, so a zero byte in node position always means an
//! absent child.

mod header;
mod writer;

pub use header::{check_header, SerializeError, Version, HEADER_LEN, MAGIC, VERSION};
pub use writer::{serialize, serialize_into};
