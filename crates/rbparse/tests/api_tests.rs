//! Public API tests: buffer and file entry points.

use bumpalo::Bump;
use pretty_assertions::assert_eq;
use rbparse::{
    check_header, lex, lex_file, parse, parse_file, parse_file_with_options, parse_with_options, serialize,
    serialize_file, CommentKind, LoadError, Node, NodeKind, ParseOptions, TokenKind, VERSION,
};
use std::io::Write;

fn ruby_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".rb").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn first_statement<'a>(root: &'a Node<'a>) -> &'a Node<'a> {
    match root {
        Node::Program { statements, .. } => &statements.statements_body()[0],
        other => panic!("expected a program, got {:?}", other.kind()),
    }
}

// ============================================================================
// Parsing buffers
// ============================================================================

#[test]
fn test_parse_returns_tree_errors_and_comments() {
    let arena = Bump::new();
    let result = parse(&arena, b"# greeting\nputs 'hi' # inline\n");
    assert!(result.errors.is_empty());
    assert_eq!(result.comments.len(), 2);
    assert!(result.comments.iter().all(|comment| comment.kind == CommentKind::Inline));
    assert_eq!(first_statement(result.root).kind(), NodeKind::Call);
}

#[test]
fn test_parse_malformed_source_still_returns_tree() {
    let arena = Bump::new();
    let result = parse(&arena, b"def foo(\n");
    assert!(result.has_errors());
    assert_eq!(result.root.kind(), NodeKind::Program);
}

#[test]
fn test_parse_with_options_sees_outer_locals() {
    let arena = Bump::new();
    let options = ParseOptions::default().with_scope(["outer"]);
    let result = parse_with_options(&arena, b"outer", &options);
    match first_statement(result.root) {
        Node::LocalVariableRead { name, depth, .. } => {
            assert_eq!(*name, "outer");
            assert_eq!(*depth, 1);
        }
        other => panic!("expected a local read, got {:?}", other.kind()),
    }
}

// ============================================================================
// Parsing files
// ============================================================================

#[test]
fn test_parse_file_records_path_for_file_keyword() {
    let file = ruby_file("__FILE__\n");
    let arena = Bump::new();
    let result = parse_file(&arena, file.path()).unwrap();
    match first_statement(result.root) {
        Node::SourceFile { filepath, .. } => {
            assert_eq!(*filepath, file.path().to_string_lossy().as_ref());
        }
        other => panic!("expected __FILE__, got {:?}", other.kind()),
    }
}

#[test]
fn test_parse_file_with_explicit_filepath() {
    let file = ruby_file("__FILE__\n");
    let arena = Bump::new();
    let options = ParseOptions::default().with_filepath("lib/virtual.rb");
    let result = parse_file_with_options(&arena, file.path(), &options).unwrap();
    assert!(matches!(
        first_statement(result.root),
        Node::SourceFile { filepath: "lib/virtual.rb", .. }
    ));
}

#[test]
fn test_missing_file_is_a_load_error() {
    let arena = Bump::new();
    let error = parse_file(&arena, "/nonexistent/missing.rb").unwrap_err();
    assert!(matches!(error, LoadError::Io { .. }));
    assert_eq!(error.path().to_str(), Some("/nonexistent/missing.rb"));
    assert!(lex_file("/nonexistent/missing.rb").is_err());
    assert!(serialize_file("/nonexistent/missing.rb").is_err());
}

#[test]
fn test_non_utf8_source_is_accepted() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"x = \"\xff\xfe\"\n").unwrap();
    let arena = Bump::new();
    let result = parse_file(&arena, file.path()).unwrap();
    assert!(result.errors.is_empty());
}

// ============================================================================
// Lexing
// ============================================================================

#[test]
fn test_lex_includes_trivia_and_stops_before_eof() {
    let kinds: Vec<TokenKind> = lex(b"a = 1 # note\n").into_iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::Equal,
            TokenKind::Integer,
            TokenKind::Comment,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_lex_knows_local_variables() {
    let source = b"a = 1\na /2";
    let kinds: Vec<TokenKind> = lex(source).into_iter().map(|token| token.kind).collect();
    assert!(kinds.contains(&TokenKind::Slash), "{:?}", kinds);
    assert!(!kinds.contains(&TokenKind::RegexpBegin), "{:?}", kinds);
}

#[test]
fn test_lex_file_matches_lex() {
    let source = "def foo = 1\n__END__\ndata\n";
    let file = ruby_file(source);
    assert_eq!(lex_file(file.path()).unwrap(), lex(source.as_bytes()));
    assert!(lex(source.as_bytes()).iter().any(|token| token.kind == TokenKind::EndData));
}

#[test]
fn test_relexing_is_stable() {
    let source = b"x = <<~EOS\n  #{y}\nEOS\n%w[a b].each { |s| puts s }\n";
    assert_eq!(lex(source), lex(source));
}

// ============================================================================
// Serializing
// ============================================================================

#[test]
fn test_serialize_has_current_header() {
    let bytes = serialize(b"1 + 2");
    assert_eq!(check_header(&bytes), Ok(VERSION));
    assert_eq!(bytes.last(), Some(&0));
}

#[test]
fn test_serialize_file_matches_buffer() {
    let source = "class A; end\n";
    let file = ruby_file(source);
    assert_eq!(serialize_file(file.path()).unwrap(), serialize(source.as_bytes()));
}
