//! Error recovery tests.
//!
//! A malformed program must still produce a complete tree: missing pieces
//! become `Missing` nodes or zero-width tokens and each fault is reported
//! once, with the exact message a user would see.

use bumpalo::Bump;
use pretty_assertions::assert_eq;
use rbparse_ast::{Node, NodeKind};
use rbparse_config::ParseOptions;
use rbparse_parser::{ParseResult, Parser};

fn with_parse<R>(source: &str, check: impl FnOnce(&ParseResult<'_>) -> R) -> R {
    let arena = Bump::new();
    let result = Parser::new(&arena, source.as_bytes(), &ParseOptions::default()).parse();
    check(&result)
}

fn top_level<'a>(result: &ParseResult<'a>) -> &'a [Node<'a>] {
    match result.root {
        Node::Program { statements, .. } => statements.statements_body(),
        _ => &[],
    }
}

fn error_messages(result: &ParseResult<'_>) -> Vec<String> {
    result.errors.iter().map(|error| error.message.clone()).collect()
}

/// Every child location must lie within its parent's location.
fn assert_contained(node: &Node<'_>) {
    let parent = node.location();
    for child in node.children() {
        assert!(
            parent.covers(&child.location()),
            "{:?} at {:?} escapes {:?} at {:?}",
            child.kind(),
            child.location(),
            node.kind(),
            parent
        );
        assert_contained(child);
    }
}

// ============================================================================
// Missing names
// ============================================================================

#[test]
fn test_constant_path_with_invalid_child() {
    with_parse("A::$b", |result| {
        assert_eq!(
            error_messages(result),
            vec!["Expected identifier or constant after '::'".to_string()]
        );
        let statements = top_level(result);
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Node::ConstantPath { parent, child, .. } => {
                assert!(matches!(parent, Some(Node::ConstantRead { name: "A", .. })));
                assert!(child.is_missing());
            }
            other => panic!("expected a constant path, got {:?}", other.kind()),
        }
    });
}

#[test]
fn test_module_without_name() {
    with_parse("module Parent module end", |result| {
        assert_eq!(
            error_messages(result),
            vec!["Expected to find a module name after `module`.".to_string()]
        );
        let statements = top_level(result);
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Node::Module { constant_path, body, end_keyword, .. } => {
                assert!(matches!(constant_path, Node::ConstantRead { name: "Parent", .. }));
                assert!(!end_keyword.is_missing());
                let body = body.map(|body| body.statements_body()).unwrap_or(&[]);
                assert_eq!(body.len(), 1);
                match &body[0] {
                    Node::Module { constant_path, end_keyword, .. } => {
                        assert!(constant_path.is_missing());
                        assert!(end_keyword.is_missing());
                    }
                    other => panic!("expected an inner module, got {:?}", other.kind()),
                }
            }
            other => panic!("expected a module, got {:?}", other.kind()),
        }
    });
}

// ============================================================================
// Missing clauses
// ============================================================================

#[test]
fn test_for_without_index_or_collection() {
    with_parse("for end", |result| {
        assert_eq!(
            error_messages(result),
            vec![
                "Expected index after for.".to_string(),
                "Expected keyword in.".to_string(),
                "Expected collection.".to_string(),
            ]
        );
        let statements = top_level(result);
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Node::For { index, collection, in_keyword, statements, end_keyword, .. } => {
                assert!(index.is_missing());
                assert!(collection.is_missing());
                assert!(in_keyword.is_missing());
                assert!(statements.is_none());
                assert!(!end_keyword.is_missing());
            }
            other => panic!("expected a for loop, got {:?}", other.kind()),
        }
    });
}

#[test]
fn test_unterminated_string() {
    with_parse("\"hello", |result| {
        assert_eq!(
            error_messages(result),
            vec!["Expected a closing delimiter for an interpolated string.".to_string()]
        );
        let statements = top_level(result);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].kind(), NodeKind::InterpolatedString);
    });
}

#[test]
fn test_unclosed_parenthesized_arguments() {
    with_parse("foo(1, 2", |result| {
        assert!(result.has_errors());
        assert_eq!(top_level(result).len(), 1);
        assert_eq!(top_level(result)[0].kind(), NodeKind::Call);
    });
}

#[test]
fn test_unclosed_parenthesis() {
    with_parse("(1 + 2", |result| {
        assert_eq!(error_messages(result), vec!["Expected a closing parenthesis.".to_string()]);
        let statements = top_level(result);
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Node::Parentheses { closing, .. } => assert!(closing.is_missing()),
            other => panic!("expected parentheses, got {:?}", other.kind()),
        }
    });
}

#[test]
fn test_operator_without_right_operand() {
    with_parse("1 +", |result| {
        assert_eq!(error_messages(result), vec!["Expected a value after the operator.".to_string()]);
        assert_eq!(top_level(result)[0].kind(), NodeKind::Call);
    });
}

#[test]
fn test_unterminated_symbol_list() {
    with_parse("%i[a b", |result| {
        assert_eq!(
            error_messages(result),
            vec!["Expected a closing delimiter for a `%i` list.".to_string()]
        );
        assert_eq!(top_level(result)[0].kind(), NodeKind::Array);
    });
}

#[test]
fn test_unterminated_regular_expression() {
    with_parse("/abc", |result| {
        assert_eq!(
            error_messages(result),
            vec!["Expected a closing delimiter for a regular expression.".to_string()]
        );
        assert_eq!(top_level(result)[0].kind(), NodeKind::RegularExpression);
    });
}

#[test]
fn test_begin_upcase_without_brace() {
    with_parse("BEGIN 1 }", |result| {
        assert_eq!(error_messages(result), vec!["Expected '{' after 'BEGIN'.".to_string()]);
        let statements = top_level(result);
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Node::PreExecution { opening, statements, closing, .. } => {
                assert!(opening.is_missing());
                let body = statements.map(|body| body.statements_body()).unwrap_or(&[]);
                assert_eq!(body.len(), 1);
                assert_eq!(body[0].kind(), NodeKind::Integer);
                assert!(!closing.is_missing());
            }
            other => panic!("expected BEGIN block, got {:?}", other.kind()),
        }
    });
}

#[test]
fn test_class_name_must_be_constant() {
    with_parse("class a; end", |result| {
        assert_eq!(error_messages(result), vec!["class/module name must be CONSTANT".to_string()]);
        assert_eq!(top_level(result)[0].kind(), NodeKind::Class);
    });
    with_parse("module foo; end", |result| {
        assert_eq!(error_messages(result), vec!["class/module name must be CONSTANT".to_string()]);
    });
    with_parse("class A::B; end
module ::C; end", |result| {
        assert!(!result.has_errors(), "errors: {:?}", error_messages(result));
    });
}

#[test]
fn test_alias_without_names_reports_once() {
    with_parse("alias", |result| {
        assert_eq!(
            error_messages(result),
            vec!["Expected a method name or symbol for `alias`.".to_string()]
        );
        match &top_level(result)[0] {
            Node::Alias { new_name, old_name, .. } => {
                assert!(new_name.is_missing());
                assert!(old_name.is_missing());
            }
            other => panic!("expected alias, got {:?}", other.kind()),
        }
    });
}

// ============================================================================
// Context errors
// ============================================================================

#[test]
fn test_forwarding_without_forwarding_parameters() {
    with_parse("def a(x, y, z); b(...); end", |result| {
        assert_eq!(
            error_messages(result),
            vec!["unexpected ... when parent method is not forwarding.".to_string()]
        );
        assert_eq!(top_level(result)[0].kind(), NodeKind::Def);
    });
}

#[test]
fn test_forwarding_does_not_leak_between_methods() {
    with_parse("def x(...); end\ndef a(x); b(...); end", |result| {
        assert_eq!(
            error_messages(result),
            vec!["unexpected ... when parent method is not forwarding.".to_string()]
        );
    });
}

#[test]
fn test_begin_upcase_inside_method() {
    with_parse("def foo\n  BEGIN { 1 }\nend", |result| {
        assert_eq!(
            error_messages(result),
            vec!["BEGIN is permitted only at toplevel".to_string()]
        );
    });
}

#[test]
fn test_errors_are_ordered_by_location() {
    with_parse("for end\nA::$b", |result| {
        let starts: Vec<u32> = result.errors.iter().map(|error| error.location.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(result.errors.len(), 4);
    });
}

#[test]
fn test_recovery_continues_after_fault() {
    with_parse("for end\nx = 1", |result| {
        assert!(result.has_errors());
        let kinds: Vec<NodeKind> = top_level(result).iter().map(Node::kind).collect();
        assert_eq!(kinds, vec![NodeKind::For, NodeKind::LocalVariableWrite]);
    });
}

// ============================================================================
// Deep nesting
// ============================================================================

fn nested_array_pattern(depth: usize) -> String {
    format!("case x\nin {}{}\nend", "[".repeat(depth), "]".repeat(depth))
}

#[test]
fn test_deep_valid_nesting_parses_cleanly() {
    let parens = format!("{}1{}", "(".repeat(250), ")".repeat(250));
    with_parse(&parens, |result| {
        assert!(!result.has_errors(), "errors: {:?}", error_messages(result));
        assert_eq!(top_level(result)[0].kind(), NodeKind::Parentheses);
    });

    let parens = format!("{}1{}", "(".repeat(1000), ")".repeat(1000));
    with_parse(&parens, |result| assert!(!result.has_errors()));

    with_parse(&nested_array_pattern(1000), |result| {
        assert!(!result.has_errors(), "errors: {:?}", error_messages(result));
        assert_eq!(top_level(result)[0].kind(), NodeKind::Case);
    });
}

#[test]
fn test_nesting_past_limit_is_an_error() {
    with_parse(&nested_array_pattern(6000), |result| {
        assert!(error_messages(result).contains(&"Cannot parse the expression.".to_string()));
        assert!(!top_level(result).is_empty());
    });

    let parens = format!("{}1{}", "(".repeat(6000), ")".repeat(6000));
    with_parse(&parens, |result| {
        assert!(error_messages(result).contains(&"Cannot parse the expression.".to_string()));
    });
}

// ============================================================================
// Location containment
// ============================================================================

#[test]
fn test_children_lie_within_parents() {
    let sources = [
        "a = 1 + 2 * 3",
        "def foo(a, b = 1, *c, d:, **e, &f)\n  a + b\nend",
        "class A < B\n  def x; end\nend",
        "module M\n  X = 1\nend",
        "if a then b elsif c then d else e end",
        "foo(1, 2) { |x| x }",
        "[1, { a: 2 }, :c, \"d#{e}f\"]",
        "case x\nwhen 1, 2 then :a\nelse :b\nend",
        "case [1, 2]\nin [Integer => a, *rest] then a\nend",
        "begin\n  a\nrescue Foo => e\n  b\nensure\n  c\nend",
        "x = y rescue z",
        "a&.b&.c(1)",
        "foo(<<~E, 1)\n  a #{b} c\nE\n",
        "x = [<<-A, <<B]\n  one\n  A\ntwo\nB\n",
        "<<~E.strip\n  #{1 + 2}\nE\n",
    ];
    for source in sources {
        with_parse(source, |result| {
            assert!(!result.has_errors(), "source: {:?}\nerrors: {:?}", source, error_messages(result));
            assert_contained(result.root);
        });
    }
}

#[test]
fn test_children_lie_within_parents_after_recovery() {
    for source in [
        "A::$b",
        "module Parent module end",
        "for end",
        "def a(x); b(...); end",
        "foo(<<~E\n  #{ ) }\nE\n",
        "x = <<~E\n  unterminated",
    ] {
        with_parse(source, |result| {
            assert!(result.has_errors());
            assert_contained(result.root);
        });
    }
}
