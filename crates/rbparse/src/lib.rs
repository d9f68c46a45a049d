//! rbparse: a standalone Ruby parser.
//!
//! Parses Ruby source into a fully located syntax tree, with the syntax
//! errors and comments found along the way. Malformed input still yields a
//! complete tree: missing pieces are `Missing` nodes and every fault is
//! reported in [`ParseResult::errors`].
//!
//! ```ignore
//! let arena = bumpalo::Bump::new();
//! let result = rbparse::parse(&arena, b"puts 1 + 2");
//! assert!(result.errors.is_empty());
//! ```

mod load;

pub use load::{read_source, LoadError};

pub use rbparse_ast::{Comment, CommentKind, Node, NodeKind, Token, TokenKind};
pub use rbparse_config::{load_options, ConfigError, ParseOptions};
pub use rbparse_core::text::{LineMap, Location};
pub use rbparse_core::ParseArena;
pub use rbparse_diagnostics::{Diagnostic, DiagnosticCategory};
pub use rbparse_parser::ParseResult;
pub use rbparse_serialize::{check_header, SerializeError, Version, VERSION};

/// The tree types, traversal helpers and node flags.
pub mod ast {
    pub use rbparse_ast::*;
}

/// The `pack`/`unpack` template language.
pub mod pack {
    pub use rbparse_pack::*;
}

use bumpalo::Bump;
use rbparse_parser::Parser;
use std::path::Path;
use tracing::debug;

/// Parse `source` with default options.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn parse<'a>(arena: &'a Bump, source: &'a [u8]) -> ParseResult<'a> {
    Parser::new(arena, source, &ParseOptions::default()).parse()
}

/// Parse `source` with the given options.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len(), filepath = %options.filepath))]
pub fn parse_with_options<'a>(arena: &'a Bump, source: &'a [u8], options: &ParseOptions) -> ParseResult<'a> {
    Parser::new(arena, source, options).parse()
}

/// Read and parse a file. The source is copied into `arena` so the tree can
/// borrow from it, and `__FILE__` resolves to `path`.
pub fn parse_file<'a>(arena: &'a Bump, path: impl AsRef<Path>) -> Result<ParseResult<'a>, LoadError> {
    let path = path.as_ref();
    let options = ParseOptions::default().with_filepath(path.to_string_lossy());
    parse_file_with_options(arena, path, &options)
}

/// Read and parse a file with explicit options. An empty `filepath` in
/// `options` is filled with `path`.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_file_with_options<'a>(
    arena: &'a Bump,
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<ParseResult<'a>, LoadError> {
    let path = path.as_ref();
    let bytes = read_source(path)?;
    let source = arena.alloc_slice_copy(&bytes);

    let result = if options.filepath.is_empty() {
        let options = options.clone().with_filepath(path.to_string_lossy());
        Parser::new(arena, source, &options).parse()
    } else {
        Parser::new(arena, source, options).parse()
    };
    debug!(errors = result.errors.len(), comments = result.comments.len(), "parsed file");
    Ok(result)
}

/// Every token of `source` up to, but not including, end of input.
///
/// Tokens are produced by a full parse, so the lexer sees the same local
/// variables and states it would during parsing. Comments, newlines,
/// embedded documents and `__END__` are included.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn lex(source: &[u8]) -> Vec<Token> {
    let arena = ParseArena::for_source(source.len());
    let (_, tokens) = Parser::new(arena.bump(), source, &ParseOptions::default())
        .with_token_recording()
        .parse_with_tokens();
    tokens
}

/// Read a file and lex it like [`lex`].
pub fn lex_file(path: impl AsRef<Path>) -> Result<Vec<Token>, LoadError> {
    let bytes = read_source(path.as_ref())?;
    Ok(lex(&bytes))
}

/// Parse `source` and dump the tree in the binary format.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn serialize(source: &[u8]) -> Vec<u8> {
    let arena = ParseArena::for_source(source.len());
    let result = Parser::new(arena.bump(), source, &ParseOptions::default()).parse();
    rbparse_serialize::serialize(result.root)
}

/// Dump an already parsed tree in the binary format.
pub fn serialize_tree(root: &Node<'_>) -> Vec<u8> {
    rbparse_serialize::serialize(root)
}

/// Read a file, parse it and dump the tree.
pub fn serialize_file(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    let bytes = read_source(path)?;
    let arena = ParseArena::for_source(bytes.len());
    let options = ParseOptions::default().with_filepath(path.to_string_lossy());
    let result = Parser::new(arena.bump(), &bytes, &options).parse();
    Ok(rbparse_serialize::serialize(result.root))
}
