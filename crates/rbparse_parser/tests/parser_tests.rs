//! Parser integration tests.
//!
//! Verifies the trees the parser builds for well-formed Ruby: node kinds,
//! the fields that matter for each construct, and local variable tracking.

use bumpalo::Bump;
use pretty_assertions::assert_eq;
use rbparse_ast::flags::{CallFlags, StringFlags};
use rbparse_ast::visitor::{AstVisitor, KindCollector};
use rbparse_ast::{Node, NodeKind};
use rbparse_config::ParseOptions;
use rbparse_parser::{ParseResult, Parser};

/// Helper: parse `source` with `options` and hand the result to `check`.
fn with_parse_options<R>(source: &str, options: &ParseOptions, check: impl FnOnce(&ParseResult<'_>) -> R) -> R {
    let arena = Bump::new();
    let result = Parser::new(&arena, source.as_bytes(), options).parse();
    check(&result)
}

fn with_parse<R>(source: &str, check: impl FnOnce(&ParseResult<'_>) -> R) -> R {
    with_parse_options(source, &ParseOptions::default(), check)
}

/// Helper: the top-level statements of a parse.
fn top_level<'a>(result: &ParseResult<'a>) -> &'a [Node<'a>] {
    match result.root {
        Node::Program { statements, .. } => statements.statements_body(),
        _ => &[],
    }
}

/// Helper: the kinds of the top-level statements, asserting a clean parse.
fn statement_kinds(source: &str) -> Vec<NodeKind> {
    with_parse(source, |result| {
        assert_no_errors(source, result);
        top_level(result).iter().map(Node::kind).collect()
    })
}

/// Helper: every node kind in the tree, in pre-order.
fn all_kinds(source: &str) -> Vec<NodeKind> {
    with_parse(source, |result| {
        let mut collector = KindCollector::default();
        collector.visit_node(result.root);
        collector.kinds
    })
}

/// Helper: the error messages of a parse.
fn error_messages(source: &str) -> Vec<String> {
    with_parse(source, |result| result.errors.iter().map(|error| error.message.clone()).collect())
}

fn assert_no_errors(source: &str, result: &ParseResult<'_>) {
    let messages: Vec<&str> = result.errors.iter().map(|error| error.message.as_str()).collect();
    assert!(messages.is_empty(), "source: {:?}\nerrors: {:?}", source, messages);
}

// ============================================================================
// Program
// ============================================================================

#[test]
fn test_empty_program() {
    with_parse("", |result| {
        assert!(matches!(result.root, Node::Program { .. }));
        assert!(top_level(result).is_empty());
        assert!(!result.has_errors());
    });
}

#[test]
fn test_statements_separated_by_newlines_and_semicolons() {
    assert_eq!(
        statement_kinds("1\n2; 3"),
        vec![NodeKind::Integer, NodeKind::Integer, NodeKind::Integer]
    );
}

#[test]
fn test_comments_are_collected() {
    with_parse("# one\n1 # two\n", |result| {
        assert_eq!(result.comments.len(), 2);
        assert_eq!(top_level(result).len(), 1);
    });
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numeric_literals() {
    assert_eq!(
        statement_kinds("1; 1.5; 0x1f; 3r; 2i; 1e3"),
        vec![
            NodeKind::Integer,
            NodeKind::Float,
            NodeKind::Integer,
            NodeKind::Rational,
            NodeKind::Imaginary,
            NodeKind::Float,
        ]
    );
}

#[test]
fn test_keyword_literals() {
    assert_eq!(
        statement_kinds("nil; true; false; self; __LINE__"),
        vec![
            NodeKind::Nil,
            NodeKind::True,
            NodeKind::False,
            NodeKind::SelfReference,
            NodeKind::SourceLine,
        ]
    );
}

#[test]
fn test_source_file_uses_filepath_option() {
    let options = ParseOptions::default().with_filepath("lib/app.rb");
    with_parse_options("__FILE__", &options, |result| match &top_level(result)[0] {
        Node::SourceFile { filepath, .. } => assert_eq!(*filepath, "lib/app.rb"),
        other => panic!("expected SourceFile, got {:?}", other.kind()),
    });
}

#[test]
fn test_plain_string() {
    with_parse("'hello'", |result| match &top_level(result)[0] {
        Node::String { unescaped, flags, .. } => {
            assert_eq!(*unescaped, b"hello");
            assert_eq!(*flags, StringFlags::NONE);
        }
        other => panic!("expected String, got {:?}", other.kind()),
    });
}

#[test]
fn test_frozen_string_option() {
    let options = ParseOptions::default().with_frozen_string_literal(true);
    with_parse_options("'hello'", &options, |result| match &top_level(result)[0] {
        Node::String { flags, .. } => assert!(flags.contains(StringFlags::FROZEN)),
        other => panic!("expected String, got {:?}", other.kind()),
    });
}

#[test]
fn test_interpolated_string_parts() {
    with_parse("\"a#{b}c\"", |result| {
        assert_no_errors("\"a#{b}c\"", result);
        match &top_level(result)[0] {
            Node::InterpolatedString { parts, .. } => {
                let kinds: Vec<NodeKind> = parts.iter().map(Node::kind).collect();
                assert_eq!(
                    kinds,
                    vec![NodeKind::String, NodeKind::EmbeddedStatements, NodeKind::String]
                );
            }
            other => panic!("expected InterpolatedString, got {:?}", other.kind()),
        }
    });
}

#[test]
fn test_symbols() {
    assert_eq!(
        statement_kinds(":foo; :\"bar\""),
        vec![NodeKind::Symbol, NodeKind::Symbol]
    );
}

#[test]
fn test_regular_expression() {
    assert_eq!(statement_kinds("/ab+c/i"), vec![NodeKind::RegularExpression]);
}

#[test]
fn test_word_list() {
    with_parse("%w[a b c]", |result| match &top_level(result)[0] {
        Node::Array { elements, .. } => assert_eq!(elements.len(), 3),
        other => panic!("expected Array, got {:?}", other.kind()),
    });
}

#[test]
fn test_squiggly_heredoc() {
    let source = "x = <<~EOS\n  hi\n  there\nEOS\n";
    assert_eq!(statement_kinds(source), vec![NodeKind::LocalVariableWrite]);
}

#[test]
fn test_array_and_hash() {
    with_parse("[1, 2, 3]; { a: 1, \"b\" => 2 }", |result| {
        let statements = top_level(result);
        match &statements[0] {
            Node::Array { elements, .. } => assert_eq!(elements.len(), 3),
            other => panic!("expected Array, got {:?}", other.kind()),
        }
        match &statements[1] {
            Node::Hash { elements, .. } => assert_eq!(elements.len(), 2),
            other => panic!("expected Hash, got {:?}", other.kind()),
        }
    });
}

#[test]
fn test_ranges() {
    assert_eq!(
        statement_kinds("1..2; 1...2; (1..)"),
        vec![NodeKind::Range, NodeKind::Range, NodeKind::Parentheses]
    );
}

// ============================================================================
// Variables and assignment
// ============================================================================

#[test]
fn test_local_assignment_then_read() {
    assert_eq!(
        statement_kinds("a = 1\na"),
        vec![NodeKind::LocalVariableWrite, NodeKind::LocalVariableRead]
    );
}

#[test]
fn test_unbound_identifier_is_variable_call() {
    with_parse("foo", |result| match &top_level(result)[0] {
        Node::Call { flags, name, .. } => {
            assert_eq!(*name, "foo");
            assert!(flags.contains(CallFlags::VARIABLE_CALL));
        }
        other => panic!("expected Call, got {:?}", other.kind()),
    });
}

#[test]
fn test_program_locals() {
    with_parse("a = 1; b = 2", |result| match result.root {
        Node::Program { locals, .. } => assert_eq!(*locals, ["a", "b"]),
        _ => unreachable!(),
    });
}

#[test]
fn test_variable_writes() {
    assert_eq!(
        statement_kinds("@a = 1; @@b = 2; $c = 3; D = 4"),
        vec![
            NodeKind::InstanceVariableWrite,
            NodeKind::ClassVariableWrite,
            NodeKind::GlobalVariableWrite,
            NodeKind::ConstantWrite,
        ]
    );
}

#[test]
fn test_operator_writes() {
    assert_eq!(
        statement_kinds("a ||= 1; a &&= 2; a += 3"),
        vec![NodeKind::OrWrite, NodeKind::AndWrite, NodeKind::OperatorWrite]
    );
}

#[test]
fn test_multiple_assignment() {
    with_parse("a, b = 1, 2", |result| match &top_level(result)[0] {
        Node::MultiWrite { targets, value, .. } => {
            assert_eq!(targets.len(), 2);
            assert_eq!(value.kind(), NodeKind::Array);
        }
        other => panic!("expected MultiWrite, got {:?}", other.kind()),
    });
}

#[test]
fn test_eval_scope_locals_are_visible() {
    let options = ParseOptions::default().with_scope(["outer"]);
    with_parse_options("outer", &options, |result| match &top_level(result)[0] {
        Node::LocalVariableRead { name, depth, .. } => {
            assert_eq!(*name, "outer");
            assert_eq!(*depth, 1);
        }
        other => panic!("expected LocalVariableRead, got {:?}", other.kind()),
    });
}

#[test]
fn test_block_reads_outer_local_with_depth() {
    let kinds = all_kinds("a = 1; [1].each { a }");
    assert!(kinds.contains(&NodeKind::Block));
    with_parse("a = 1; [1].each { a }", |result| {
        let call = &top_level(result)[1];
        let Node::Call { block: Some(Node::Block { body: Some(body), .. }), .. } = call else {
            panic!("expected a call with a block");
        };
        match &body.statements_body()[0] {
            Node::LocalVariableRead { depth, .. } => assert_eq!(*depth, 1),
            other => panic!("expected LocalVariableRead, got {:?}", other.kind()),
        }
    });
}

#[test]
fn test_def_does_not_see_outer_locals() {
    with_parse("a = 1\ndef foo\n  a\nend", |result| {
        let Node::Def { body: Some(body), .. } = &top_level(result)[1] else {
            panic!("expected a def with a body");
        };
        assert_eq!(body.statements_body()[0].kind(), NodeKind::Call);
    });
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_binary_operator_is_call() {
    with_parse("1 + 2", |result| match &top_level(result)[0] {
        Node::Call { name, arguments: Some(Node::Arguments { arguments, .. }), .. } => {
            assert_eq!(*name, "+");
            assert_eq!(arguments.len(), 1);
        }
        other => panic!("expected Call, got {:?}", other.kind()),
    });
}

#[test]
fn test_precedence_factor_over_term() {
    with_parse("1 + 2 * 3", |result| match &top_level(result)[0] {
        Node::Call { name, arguments: Some(Node::Arguments { arguments, .. }), .. } => {
            assert_eq!(*name, "+");
            assert_eq!(arguments[0].kind(), NodeKind::Call);
        }
        other => panic!("expected Call, got {:?}", other.kind()),
    });
}

#[test]
fn test_command_call_arguments() {
    with_parse("puts 1, 2", |result| match &top_level(result)[0] {
        Node::Call { arguments: Some(Node::Arguments { arguments, .. }), .. } => assert_eq!(arguments.len(), 2),
        other => panic!("expected Call, got {:?}", other.kind()),
    });
}

#[test]
fn test_method_call_with_brace_block() {
    with_parse("a.b(1) { |x| x }", |result| match &top_level(result)[0] {
        Node::Call { name, block: Some(Node::Block { parameters, .. }), .. } => {
            assert_eq!(*name, "b");
            assert!(parameters.is_some());
        }
        other => panic!("expected Call with block, got {:?}", other.kind()),
    });
}

#[test]
fn test_do_block() {
    let kinds = all_kinds("foo do |a, b|\n  a\nend");
    assert!(kinds.contains(&NodeKind::Block));
    assert!(kinds.contains(&NodeKind::BlockParameters));
}

#[test]
fn test_safe_navigation() {
    with_parse("a&.b", |result| match &top_level(result)[0] {
        Node::Call { flags, .. } => assert!(flags.contains(CallFlags::SAFE_NAVIGATION)),
        other => panic!("expected Call, got {:?}", other.kind()),
    });
}

#[test]
fn test_splat_keyword_and_block_arguments() {
    let kinds = all_kinds("foo(*args, key: 1, **opts, &blk)");
    assert!(kinds.contains(&NodeKind::Splat));
    assert!(kinds.contains(&NodeKind::KeywordHash));
    assert!(kinds.contains(&NodeKind::AssocSplat));
    assert!(kinds.contains(&NodeKind::BlockArgument));
}

#[test]
fn test_attribute_write() {
    with_parse("a.b = 1", |result| match &top_level(result)[0] {
        Node::Call { name, flags, .. } => {
            assert_eq!(*name, "b=");
            assert!(flags.contains(CallFlags::ATTRIBUTE_WRITE));
        }
        other => panic!("expected Call, got {:?}", other.kind()),
    });
}

#[test]
fn test_index_read_and_write() {
    with_parse("a[1]; a[1] = 2", |result| {
        let statements = top_level(result);
        assert!(matches!(&statements[0], Node::Call { name: "[]", .. }));
        assert!(matches!(&statements[1], Node::Call { name: "[]=", .. }));
    });
}

#[test]
fn test_ternary() {
    assert_eq!(statement_kinds("a ? b : c"), vec![NodeKind::Ternary]);
}

#[test]
fn test_logical_operators() {
    assert_eq!(
        statement_kinds("a && b; a || b; a and b; not a"),
        vec![NodeKind::And, NodeKind::Or, NodeKind::And, NodeKind::Call]
    );
}

#[test]
fn test_lambda() {
    with_parse("->(x) { x * 2 }", |result| match &top_level(result)[0] {
        Node::Lambda { parameters, body, .. } => {
            assert!(parameters.is_some());
            assert!(body.is_some());
        }
        other => panic!("expected Lambda, got {:?}", other.kind()),
    });
}

#[test]
fn test_super_yield_defined() {
    let kinds = all_kinds("def foo\n  super\n  super(1)\n  yield 2\n  defined?(x)\nend");
    assert!(kinds.contains(&NodeKind::ForwardingSuper));
    assert!(kinds.contains(&NodeKind::Super));
    assert!(kinds.contains(&NodeKind::Yield));
    assert!(kinds.contains(&NodeKind::Defined));
}

// ============================================================================
// Definitions
// ============================================================================

#[test]
fn test_def_with_every_parameter_kind() {
    let source = "def foo(a, b = 1, *c, d, e:, f: 2, **g, &h); end";
    with_parse(source, |result| {
        assert_no_errors(source, result);
        let Node::Def { name, parameters: Some(parameters), .. } = &top_level(result)[0] else {
            panic!("expected a def with parameters");
        };
        assert_eq!(*name, "foo");
        let Node::Parameters {
            requireds,
            optionals,
            rest,
            posts,
            keywords,
            keyword_rest,
            block,
            ..
        } = parameters
        else {
            panic!("expected Parameters");
        };
        assert_eq!(requireds.len(), 1);
        assert_eq!(optionals.len(), 1);
        assert!(rest.is_some());
        assert_eq!(posts.len(), 1);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keyword_rest.map(Node::kind), Some(NodeKind::KeywordRestParameter));
        assert_eq!(block.map(Node::kind), Some(NodeKind::BlockParameter));
    });
}

#[test]
fn test_def_locals_are_parameters() {
    with_parse("def foo(a, b)\n  c = a\nend", |result| match &top_level(result)[0] {
        Node::Def { locals, .. } => assert_eq!(*locals, ["a", "b", "c"]),
        other => panic!("expected Def, got {:?}", other.kind()),
    });
}

#[test]
fn test_singleton_def() {
    with_parse("def self.build; end", |result| match &top_level(result)[0] {
        Node::Def { name, receiver: Some(receiver), .. } => {
            assert_eq!(*name, "build");
            assert_eq!(receiver.kind(), NodeKind::SelfReference);
        }
        other => panic!("expected Def with receiver, got {:?}", other.kind()),
    });
}

#[test]
fn test_endless_def() {
    with_parse("def double(x) = x * 2", |result| match &top_level(result)[0] {
        Node::Def { equal, end_keyword, body, .. } => {
            assert!(equal.is_some());
            assert!(end_keyword.is_none());
            assert!(body.is_some());
        }
        other => panic!("expected Def, got {:?}", other.kind()),
    });
}

#[test]
fn test_forwarding_parameters() {
    let source = "def foo(...)\n  bar(...)\nend";
    let kinds = all_kinds(source);
    assert!(kinds.contains(&NodeKind::ForwardingParameter));
    assert!(kinds.contains(&NodeKind::ForwardingArguments));
    assert!(error_messages(source).is_empty());
}

#[test]
fn test_def_body_with_rescue() {
    with_parse("def foo\n  a\nrescue\n  b\nend", |result| match &top_level(result)[0] {
        Node::Def { body: Some(Node::Begin { begin_keyword, rescue_clause, .. }), .. } => {
            assert!(begin_keyword.is_none());
            assert!(rescue_clause.is_some());
        }
        other => panic!("expected Def with a rescue body, got {:?}", other.kind()),
    });
}

#[test]
fn test_class_with_superclass() {
    with_parse("class Foo < Bar\n  def baz; end\nend", |result| match &top_level(result)[0] {
        Node::Class { name, superclass, body, .. } => {
            assert_eq!(*name, "Foo");
            assert_eq!(superclass.map(Node::kind), Some(NodeKind::ConstantRead));
            assert!(body.is_some());
        }
        other => panic!("expected Class, got {:?}", other.kind()),
    });
}

#[test]
fn test_singleton_class() {
    assert_eq!(statement_kinds("class << self\nend"), vec![NodeKind::SingletonClass]);
}

#[test]
fn test_module_with_constant_path() {
    with_parse("module A::B\nend", |result| match &top_level(result)[0] {
        Node::Module { name, constant_path, .. } => {
            assert_eq!(*name, "B");
            assert_eq!(constant_path.kind(), NodeKind::ConstantPath);
        }
        other => panic!("expected Module, got {:?}", other.kind()),
    });
}

#[test]
fn test_alias_and_undef() {
    with_parse("alias new old\nalias $new $old\nundef a, b", |result| {
        let statements = top_level(result);
        match &statements[0] {
            Node::Alias { new_name, old_name, .. } => {
                assert_eq!(new_name.kind(), NodeKind::Symbol);
                assert_eq!(old_name.kind(), NodeKind::Symbol);
            }
            other => panic!("expected Alias, got {:?}", other.kind()),
        }
        match &statements[1] {
            Node::Alias { new_name, .. } => assert_eq!(new_name.kind(), NodeKind::GlobalVariableRead),
            other => panic!("expected Alias, got {:?}", other.kind()),
        }
        match &statements[2] {
            Node::Undef { names, .. } => assert_eq!(names.len(), 2),
            other => panic!("expected Undef, got {:?}", other.kind()),
        }
    });
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_if_elsif_else() {
    with_parse("if a then 1 elsif b then 2 else 3 end", |result| match &top_level(result)[0] {
        Node::If { consequent: Some(Node::If { consequent: Some(last), .. }), end_keyword, .. } => {
            assert_eq!(last.kind(), NodeKind::Else);
            assert!(end_keyword.is_some());
        }
        other => panic!("expected If chain, got {:?}", other.kind()),
    });
}

#[test]
fn test_modifiers() {
    assert_eq!(
        statement_kinds("a if b\na unless b\na while b\na until b\na rescue b"),
        vec![
            NodeKind::If,
            NodeKind::Unless,
            NodeKind::While,
            NodeKind::Until,
            NodeKind::RescueModifier,
        ]
    );
}

#[test]
fn test_loops() {
    assert_eq!(
        statement_kinds("while a do b end\nuntil a\n  b\nend"),
        vec![NodeKind::While, NodeKind::Until]
    );
}

#[test]
fn test_for_loop_binds_index() {
    with_parse("for i in 1..3 do puts i end", |result| match &top_level(result)[0] {
        Node::For { index, collection, .. } => {
            assert_eq!(index.kind(), NodeKind::LocalVariableTarget);
            assert_eq!(collection.kind(), NodeKind::Range);
        }
        other => panic!("expected For, got {:?}", other.kind()),
    });
}

#[test]
fn test_case_when() {
    with_parse("case x\nwhen 1, 2 then :a\nelse :b\nend", |result| match &top_level(result)[0] {
        Node::Case { conditions, consequent, .. } => {
            assert_eq!(conditions.len(), 1);
            match &conditions[0] {
                Node::When { conditions, .. } => assert_eq!(conditions.len(), 2),
                other => panic!("expected When, got {:?}", other.kind()),
            }
            assert_eq!(consequent.map(Node::kind), Some(NodeKind::Else));
        }
        other => panic!("expected Case, got {:?}", other.kind()),
    });
}

#[test]
fn test_begin_rescue_ensure() {
    let source = "begin\n  a\nrescue Foo, Bar => e\n  retry\nelse\n  b\nensure\n  c\nend";
    with_parse(source, |result| {
        assert_no_errors(source, result);
        match &top_level(result)[0] {
            Node::Begin { rescue_clause: Some(Node::Rescue { exceptions, reference, .. }), else_clause, ensure_clause, .. } => {
                assert_eq!(exceptions.len(), 2);
                assert_eq!(reference.map(Node::kind), Some(NodeKind::LocalVariableTarget));
                assert!(else_clause.is_some());
                assert!(ensure_clause.is_some());
            }
            other => panic!("expected Begin, got {:?}", other.kind()),
        }
    });
}

#[test]
fn test_jumps() {
    let kinds = all_kinds("loop do\n  next 1\n  break\nend\ndef f\n  return 1, 2\nend");
    assert!(kinds.contains(&NodeKind::Next));
    assert!(kinds.contains(&NodeKind::Break));
    assert!(kinds.contains(&NodeKind::Return));
}

#[test]
fn test_execution_blocks() {
    assert_eq!(
        statement_kinds("BEGIN { a }\nEND { b }"),
        vec![NodeKind::PreExecution, NodeKind::PostExecution]
    );
}

// ============================================================================
// Pattern matching
// ============================================================================

#[test]
fn test_case_in_array_pattern() {
    let source = "case [1, 2]\nin [Integer => a, *rest] then a\nend";
    with_parse(source, |result| {
        assert_no_errors(source, result);
        let Node::Case { conditions, .. } = &top_level(result)[0] else {
            panic!("expected Case");
        };
        let Node::In { pattern, statements, .. } = &conditions[0] else {
            panic!("expected In");
        };
        match pattern {
            Node::ArrayPattern { requireds, rest, .. } => {
                assert_eq!(requireds.len(), 1);
                assert_eq!(requireds[0].kind(), NodeKind::CapturePattern);
                assert!(rest.is_some());
            }
            other => panic!("expected ArrayPattern, got {:?}", other.kind()),
        }
        let body = statements.map(Node::statements_body).unwrap_or_default();
        assert_eq!(body[0].kind(), NodeKind::LocalVariableRead);
    });
}

#[test]
fn test_find_pattern() {
    let kinds = all_kinds("case x\nin [*, 1, *post]\nend");
    assert!(kinds.contains(&NodeKind::FindPattern));
}

#[test]
fn test_hash_pattern() {
    let source = "case h\nin {name: String => name, **rest}\nend";
    with_parse(source, |result| {
        assert_no_errors(source, result);
        let kinds = {
            let mut collector = KindCollector::default();
            collector.visit_node(result.root);
            collector.kinds
        };
        assert!(kinds.contains(&NodeKind::HashPattern));
        assert!(kinds.contains(&NodeKind::CapturePattern));
    });
}

#[test]
fn test_alternation_and_pin() {
    let source = "x = 1\ncase y\nin ^x | nil\nend";
    let kinds = all_kinds(source);
    assert!(kinds.contains(&NodeKind::AlternationPattern));
    assert!(kinds.contains(&NodeKind::PinnedVariable));
    assert!(error_messages(source).is_empty());
}

#[test]
fn test_one_line_matches() {
    assert_eq!(
        statement_kinds("1 in Integer\n1 => a"),
        vec![NodeKind::MatchPredicate, NodeKind::MatchRequired]
    );
}

// ============================================================================
// Diagnostics for valid-looking but invalid code
// ============================================================================

#[test]
fn test_retry_outside_rescue() {
    assert_eq!(error_messages("retry"), vec!["Invalid retry without rescue.".to_string()]);
}

#[test]
fn test_return_in_class_body() {
    assert_eq!(
        error_messages("class A\n  return\nend"),
        vec!["Invalid return in class/module body.".to_string()]
    );
}

#[test]
fn test_class_in_method() {
    let messages = error_messages("def foo\n  class A; end\nend");
    assert_eq!(messages.len(), 1);
}

#[test]
fn test_duplicated_parameter() {
    assert_eq!(error_messages("def foo(a, a); end").len(), 1);
    assert!(error_messages("def foo(_, _); end").is_empty());
}
