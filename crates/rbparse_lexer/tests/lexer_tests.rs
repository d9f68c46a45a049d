//! Lexer integration tests.
//!
//! Verifies token kinds and spans for the lexically ambiguous corners of
//! the language: literals, heredocs, interpolation and state-driven
//! operator readings.

use pretty_assertions::assert_eq;
use rbparse_ast::comment::CommentKind;
use rbparse_ast::token::TokenKind;
use rbparse_lexer::{tokenize, Lexer};

/// Helper: lex all tokens and return them as (kind, text) pairs.
fn lex_all(source: &str) -> Vec<(TokenKind, String)> {
    tokenize(source.as_bytes())
        .into_iter()
        .map(|token| {
            let text = &source.as_bytes()[token.location.to_range()];
            (token.kind, String::from_utf8_lossy(text).into_owned())
        })
        .collect()
}

/// Helper: lex all token kinds.
fn lex_kinds(source: &str) -> Vec<TokenKind> {
    lex_all(source).into_iter().map(|(kind, _)| kind).collect()
}

/// Helper: lex to the end and return the diagnostic messages.
fn lex_messages(source: &str) -> Vec<String> {
    let mut lexer = Lexer::new(source.as_bytes());
    while lexer.next_token().kind != TokenKind::Eof {}
    lexer
        .take_diagnostics()
        .into_diagnostics()
        .into_iter()
        .map(|diagnostic| diagnostic.message)
        .collect()
}

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_empty_source() {
    assert!(lex_all("").is_empty());
}

#[test]
fn test_whitespace_only() {
    assert!(lex_all("   \n\t  ").is_empty());
}

#[test]
fn test_assignment() {
    assert_eq!(
        lex_all("foo = 1"),
        vec![
            (TokenKind::Identifier, "foo".to_string()),
            (TokenKind::Equal, "=".to_string()),
            (TokenKind::Integer, "1".to_string()),
        ]
    );
}

#[test]
fn test_relex_is_deterministic() {
    let source = b"def a(b) = b * 2\nputs \"#{a(1)}\" if x\n";
    assert_eq!(tokenize(source), tokenize(source));
}

#[test]
fn test_newline_after_operator_is_ignored() {
    assert_eq!(
        lex_kinds("a +\nb"),
        vec![TokenKind::Identifier, TokenKind::Plus, TokenKind::Identifier]
    );
}

#[test]
fn test_leading_dot_continues_call() {
    assert_eq!(
        lex_kinds("a\n  .b"),
        vec![TokenKind::Identifier, TokenKind::Dot, TokenKind::Identifier]
    );
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numeric_literals() {
    assert_eq!(lex_kinds("42"), vec![TokenKind::Integer]);
    assert_eq!(lex_kinds("1_000"), vec![TokenKind::Integer]);
    assert_eq!(lex_kinds("0x1F"), vec![TokenKind::Integer]);
    assert_eq!(lex_kinds("0b1010"), vec![TokenKind::Integer]);
    assert_eq!(lex_kinds("0o17"), vec![TokenKind::Integer]);
    assert_eq!(lex_kinds("017"), vec![TokenKind::Integer]);
    assert_eq!(lex_kinds("3.14"), vec![TokenKind::Float]);
    assert_eq!(lex_kinds("1e10"), vec![TokenKind::Float]);
    assert_eq!(lex_kinds("1.5e-3"), vec![TokenKind::Float]);
    assert_eq!(lex_kinds("3r"), vec![TokenKind::RationalNumber]);
    assert_eq!(lex_kinds("2i"), vec![TokenKind::ImaginaryNumber]);
    assert_eq!(lex_kinds("2ri"), vec![TokenKind::ImaginaryNumber]);
}

#[test]
fn test_integer_method_call() {
    assert_eq!(
        lex_kinds("1.times"),
        vec![TokenKind::Integer, TokenKind::Dot, TokenKind::Identifier]
    );
}

#[test]
fn test_invalid_numbers() {
    assert_eq!(lex_kinds("1__0"), vec![TokenKind::Invalid]);
    assert_eq!(lex_messages("1_"), vec!["Invalid number.".to_string()]);
    assert_eq!(lex_messages("09"), vec!["Invalid number.".to_string()]);
}

#[test]
fn test_negative_number() {
    assert_eq!(lex_kinds("-1"), vec![TokenKind::UMinusNum, TokenKind::Integer]);
    assert_eq!(
        lex_kinds("a - 1"),
        vec![TokenKind::Identifier, TokenKind::Minus, TokenKind::Integer]
    );
}

// ============================================================================
// Strings and interpolation
// ============================================================================

#[test]
fn test_string_literals() {
    assert_eq!(
        lex_all(r#""hello""#),
        vec![
            (TokenKind::StringBegin, "\"".to_string()),
            (TokenKind::StringContent, "hello".to_string()),
            (TokenKind::StringEnd, "\"".to_string()),
        ]
    );
    assert_eq!(
        lex_kinds("'a\\'b'"),
        vec![TokenKind::StringBegin, TokenKind::StringContent, TokenKind::StringEnd]
    );
}

#[test]
fn test_interpolation() {
    assert_eq!(
        lex_kinds(r#""a#{b}c""#),
        vec![
            TokenKind::StringBegin,
            TokenKind::StringContent,
            TokenKind::EmbexprBegin,
            TokenKind::Identifier,
            TokenKind::EmbexprEnd,
            TokenKind::StringContent,
            TokenKind::StringEnd,
        ]
    );
}

#[test]
fn test_interpolation_with_braces() {
    assert_eq!(
        lex_kinds(r##""#{{a: 1}}""##),
        vec![
            TokenKind::StringBegin,
            TokenKind::EmbexprBegin,
            TokenKind::BraceLeft,
            TokenKind::Label,
            TokenKind::Integer,
            TokenKind::BraceRight,
            TokenKind::EmbexprEnd,
            TokenKind::StringEnd,
        ]
    );
}

#[test]
fn test_embedded_variable() {
    assert_eq!(
        lex_kinds(r##""#@a""##),
        vec![
            TokenKind::StringBegin,
            TokenKind::Embvar,
            TokenKind::InstanceVariable,
            TokenKind::StringEnd,
        ]
    );
}

#[test]
fn test_single_quotes_do_not_interpolate() {
    assert_eq!(
        lex_kinds("'#{a}'"),
        vec![TokenKind::StringBegin, TokenKind::StringContent, TokenKind::StringEnd]
    );
}

#[test]
fn test_unterminated_string_stops_at_eof() {
    assert_eq!(lex_kinds("\"hello"), vec![TokenKind::StringBegin, TokenKind::StringContent]);
}

#[test]
fn test_string_label() {
    assert_eq!(
        lex_kinds(r#"{"a": 1}"#),
        vec![
            TokenKind::BraceLeft,
            TokenKind::StringBegin,
            TokenKind::StringContent,
            TokenKind::LabelEnd,
            TokenKind::Integer,
            TokenKind::BraceRight,
        ]
    );
}

#[test]
fn test_character_literal() {
    assert_eq!(lex_all("?a"), vec![(TokenKind::CharacterLiteral, "?a".to_string())]);
    assert_eq!(lex_all("?\\n"), vec![(TokenKind::CharacterLiteral, "?\\n".to_string())]);
}

// ============================================================================
// Symbols
// ============================================================================

#[test]
fn test_symbols() {
    assert_eq!(lex_kinds(":foo"), vec![TokenKind::SymbolBegin, TokenKind::Identifier]);
    assert_eq!(lex_kinds(":+"), vec![TokenKind::SymbolBegin, TokenKind::Plus]);
    assert_eq!(lex_kinds(":if"), vec![TokenKind::SymbolBegin, TokenKind::KeywordIf]);
    assert_eq!(
        lex_kinds(r#":"a b""#),
        vec![TokenKind::SymbolBegin, TokenKind::StringContent, TokenKind::StringEnd]
    );
}

#[test]
fn test_ternary_colon_is_not_symbol() {
    assert_eq!(
        lex_kinds("a ? b : c"),
        vec![
            TokenKind::Identifier,
            TokenKind::QuestionMark,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Identifier,
        ]
    );
}

#[test]
fn test_scope_resolution() {
    assert_eq!(
        lex_kinds("A::B"),
        vec![TokenKind::Constant, TokenKind::ColonColon, TokenKind::Constant]
    );
    assert_eq!(lex_kinds("::A"), vec![TokenKind::UColonColon, TokenKind::Constant]);
}

// ============================================================================
// Percent literals
// ============================================================================

#[test]
fn test_word_list() {
    assert_eq!(
        lex_all("%w[a b]"),
        vec![
            (TokenKind::PercentLowerW, "%w[".to_string()),
            (TokenKind::StringContent, "a".to_string()),
            (TokenKind::WordsSep, " ".to_string()),
            (TokenKind::StringContent, "b".to_string()),
            (TokenKind::StringEnd, "]".to_string()),
        ]
    );
}

#[test]
fn test_word_list_nesting() {
    assert_eq!(
        lex_all("%w(a (b) c)"),
        vec![
            (TokenKind::PercentLowerW, "%w(".to_string()),
            (TokenKind::StringContent, "a".to_string()),
            (TokenKind::WordsSep, " ".to_string()),
            (TokenKind::StringContent, "(b)".to_string()),
            (TokenKind::WordsSep, " ".to_string()),
            (TokenKind::StringContent, "c".to_string()),
            (TokenKind::StringEnd, ")".to_string()),
        ]
    );
}

#[test]
fn test_percent_literal_kinds() {
    assert_eq!(lex_kinds("%i[a]")[0], TokenKind::PercentLowerI);
    assert_eq!(lex_kinds("%I[a]")[0], TokenKind::PercentUpperI);
    assert_eq!(lex_kinds("%W[a]")[0], TokenKind::PercentUpperW);
    assert_eq!(lex_kinds("%q(a)")[0], TokenKind::StringBegin);
    assert_eq!(lex_kinds("%(a)")[0], TokenKind::StringBegin);
    assert_eq!(lex_kinds("%s(a)")[0], TokenKind::SymbolBegin);
    assert_eq!(lex_kinds("%x(ls)")[0], TokenKind::PercentLowerX);
    assert_eq!(lex_kinds("%r{a}i")[0], TokenKind::RegexpBegin);
}

#[test]
fn test_modulo() {
    assert_eq!(
        lex_kinds("a % b"),
        vec![TokenKind::Identifier, TokenKind::Percent, TokenKind::Identifier]
    );
    assert_eq!(
        lex_kinds("a %= 2"),
        vec![TokenKind::Identifier, TokenKind::PercentEqual, TokenKind::Integer]
    );
}

// ============================================================================
// Regular expressions
// ============================================================================

#[test]
fn test_regexp() {
    assert_eq!(
        lex_all("/ab+/im"),
        vec![
            (TokenKind::RegexpBegin, "/".to_string()),
            (TokenKind::StringContent, "ab+".to_string()),
            (TokenKind::RegexpEnd, "/im".to_string()),
        ]
    );
}

#[test]
fn test_division() {
    assert_eq!(
        lex_kinds("1 / 2"),
        vec![TokenKind::Integer, TokenKind::Slash, TokenKind::Integer]
    );
    assert_eq!(
        lex_kinds("a/b"),
        vec![TokenKind::Identifier, TokenKind::Slash, TokenKind::Identifier]
    );
}

#[test]
fn test_regexp_argument_warns() {
    assert_eq!(
        lex_kinds("foo /bar/"),
        vec![
            TokenKind::Identifier,
            TokenKind::RegexpBegin,
            TokenKind::StringContent,
            TokenKind::RegexpEnd,
        ]
    );
    let messages = lex_messages("foo /bar/");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Ambiguous first argument"));
}

// ============================================================================
// Heredocs
// ============================================================================

#[test]
fn test_heredoc() {
    assert_eq!(
        lex_all("<<~EOS\n  hi\nEOS\n"),
        vec![
            (TokenKind::HeredocStart, "<<~EOS".to_string()),
            (TokenKind::StringContent, "  hi\n".to_string()),
            (TokenKind::HeredocEnd, "EOS\n".to_string()),
            (TokenKind::Newline, "\n".to_string()),
        ]
    );
}

#[test]
fn test_heredoc_rest_of_line() {
    assert_eq!(
        lex_kinds("foo(<<A)\nbody\nA\nbar"),
        vec![
            TokenKind::Identifier,
            TokenKind::ParenthesisLeft,
            TokenKind::HeredocStart,
            TokenKind::StringContent,
            TokenKind::HeredocEnd,
            TokenKind::ParenthesisRight,
            TokenKind::Newline,
            TokenKind::Identifier,
        ]
    );
}

#[test]
fn test_two_heredocs_on_one_line() {
    let tokens = lex_all("foo(<<A, <<B)\na\nA\nb\nB\n");
    let kinds: Vec<TokenKind> = tokens.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::ParenthesisLeft,
            TokenKind::HeredocStart,
            TokenKind::StringContent,
            TokenKind::HeredocEnd,
            TokenKind::Comma,
            TokenKind::HeredocStart,
            TokenKind::StringContent,
            TokenKind::HeredocEnd,
            TokenKind::ParenthesisRight,
            TokenKind::Newline,
        ]
    );
    assert_eq!(tokens[3].1, "a\n");
    assert_eq!(tokens[7].1, "b\n");
}

#[test]
fn test_dash_heredoc_indented_terminator() {
    let tokens = lex_all("<<-EOS\nx\n  EOS\n");
    assert_eq!(tokens[2], (TokenKind::HeredocEnd, "  EOS\n".to_string()));
}

#[test]
fn test_heredoc_interpolation() {
    assert_eq!(
        lex_kinds("<<A\nx#{y}\nA\n"),
        vec![
            TokenKind::HeredocStart,
            TokenKind::StringContent,
            TokenKind::EmbexprBegin,
            TokenKind::Identifier,
            TokenKind::EmbexprEnd,
            TokenKind::StringContent,
            TokenKind::HeredocEnd,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_left_shift_is_not_heredoc() {
    assert_eq!(
        lex_kinds("a << b"),
        vec![TokenKind::Identifier, TokenKind::LessLess, TokenKind::Identifier]
    );
}

// ============================================================================
// Comments and trivia
// ============================================================================

#[test]
fn test_comment() {
    assert_eq!(
        lex_all("# hi\nfoo"),
        vec![
            (TokenKind::Comment, "# hi".to_string()),
            (TokenKind::Identifier, "foo".to_string()),
        ]
    );
}

#[test]
fn test_embdoc() {
    assert_eq!(
        lex_kinds("=begin\nfoo\n=end\n"),
        vec![TokenKind::EmbdocBegin, TokenKind::EmbdocLine, TokenKind::EmbdocEnd]
    );
}

#[test]
fn test_unterminated_embdoc() {
    let mut lexer = Lexer::new(b"=begin\nfoo");
    while lexer.next_token().kind != TokenKind::Eof {}
    let diagnostics = lexer.take_diagnostics().into_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Unterminated embdoc");
    assert_eq!(diagnostics[0].location.to_range(), 0..6);
}

#[test]
fn test_end_data() {
    let mut lexer = Lexer::new(b"foo\n__END__\ndata");
    let mut kinds = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        kinds.push(token.kind);
    }
    assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::Newline, TokenKind::EndData]);
    let comments = lexer.take_comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].kind, CommentKind::TrailingDataMarker);
}

#[test]
fn test_frozen_string_literal_magic_comment() {
    let mut lexer = Lexer::new(b"# frozen_string_literal: true\nfoo");
    while lexer.next_token().kind != TokenKind::Eof {}
    assert!(lexer.frozen_string_literal());

    let mut lexer = Lexer::new(b"foo\n# frozen_string_literal: true\n");
    while lexer.next_token().kind != TokenKind::Eof {}
    assert!(!lexer.frozen_string_literal());
}

// ============================================================================
// Keywords and state
// ============================================================================

#[test]
fn test_modifier_keyword() {
    assert_eq!(
        lex_kinds("foo if bar"),
        vec![TokenKind::Identifier, TokenKind::KeywordIfModifier, TokenKind::Identifier]
    );
    assert_eq!(lex_kinds("if bar")[0], TokenKind::KeywordIf);
}

#[test]
fn test_keyword_after_dot_is_identifier() {
    assert_eq!(
        lex_kinds("a.class"),
        vec![TokenKind::Identifier, TokenKind::Dot, TokenKind::Identifier]
    );
}

#[test]
fn test_label() {
    assert_eq!(
        lex_all("{a: 1}"),
        vec![
            (TokenKind::BraceLeft, "{".to_string()),
            (TokenKind::Label, "a:".to_string()),
            (TokenKind::Integer, "1".to_string()),
            (TokenKind::BraceRight, "}".to_string()),
        ]
    );
}

#[test]
fn test_setter_method_name() {
    assert_eq!(
        lex_all("def foo=(v)")[1],
        (TokenKind::Identifier, "foo=".to_string())
    );
}

#[test]
fn test_safe_navigation() {
    assert_eq!(
        lex_kinds("x&.y"),
        vec![TokenKind::Identifier, TokenKind::AmpersandDot, TokenKind::Identifier]
    );
}

#[test]
fn test_variables() {
    assert_eq!(
        lex_kinds("@a @@b $c $1 $&"),
        vec![
            TokenKind::InstanceVariable,
            TokenKind::ClassVariable,
            TokenKind::GlobalVariable,
            TokenKind::NthReference,
            TokenKind::BackReference,
        ]
    );
}
