//! Text output for `--output tokens` and `--output tree`.

use rbparse::ast::for_each_child;
use rbparse::{LineMap, Location, Node, Token};
use std::fmt::Write;

fn position(line_map: &LineMap, location: Location) -> String {
    let start = line_map.line_and_column_of(location.start);
    let end = line_map.line_and_column_of(location.end);
    format!("{}:{}-{}:{}", start.line, start.column, end.line, end.column)
}

/// One line per token: position, kind and source text.
pub fn tokens(source: &[u8], tokens: &[Token], line_map: &LineMap) -> String {
    let mut out = String::new();
    for token in tokens {
        let text = String::from_utf8_lossy(&source[token.location.to_range()]);
        let _ = writeln!(
            out,
            "{:<16} {:<24} {:?}",
            position(line_map, token.location),
            format!("{:?}", token.kind),
            text
        );
    }
    out
}

/// An indented outline of node kinds with their positions.
pub fn tree(root: &Node<'_>, line_map: &LineMap) -> String {
    let mut out = String::new();
    outline(root, 0, line_map, &mut out);
    out
}

fn outline<'a>(node: &'a Node<'a>, depth: usize, line_map: &LineMap, out: &mut String) {
    let _ = writeln!(
        out,
        "{:indent$}{} {}",
        "",
        node.kind().name(),
        position(line_map, node.location()),
        indent = depth * 2
    );
    for_each_child(node, |child| outline(child, depth + 1, line_map, out));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn test_tree_outline() {
        let arena = Bump::new();
        let source = b"x = 1\nputs x";
        let result = rbparse::parse(&arena, source);
        let out = tree(result.root, &LineMap::new(source));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Program 1:0-2:6");
        assert_eq!(lines[1], "  Statements 1:0-2:6");
        assert_eq!(lines[2], "    LocalVariableWrite 1:0-1:5");
        assert_eq!(lines[3], "      Integer 1:4-1:5");
    }

    #[test]
    fn test_token_lines_use_first_line() {
        let source = b"foo";
        let out = tokens(source, &rbparse::lex(source), &LineMap::with_first_line(source, 10));
        assert!(out.starts_with("10:0-10:3"));
        assert!(out.contains("Identifier"));
        assert!(out.trim_end().ends_with("\"foo\""));
    }
}
