//! Shared helpers for parser snapshot tests.
#![allow(dead_code, unused_imports)]

pub use st_syntax::parser::parse;
pub use st_syntax::syntax::{SyntaxKind, SyntaxNode};

/// Renders a parse as an indented tree of node kinds and non-trivia tokens,
/// followed by its errors.
pub fn snapshot_parse(source: &str) -> String {
    let parsed = parse(source);

    let mut output = String::new();
    format_node(&parsed.syntax(), &mut output, 0);

    if !parsed.ok() {
        output.push_str("---\n");
        for err in parsed.errors() {
            output.push_str(&format!("{err}\n"));
        }
    }

    output
}

fn format_node(node: &SyntaxNode, out: &mut String, depth: usize) {
    out.push_str(&format!("{}{:?}\n", "  ".repeat(depth), node.kind()));

    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => format_node(&n, out, depth + 1),
            rowan::NodeOrToken::Token(t) if !t.kind().is_trivia() => {
                out.push_str(&format!(
                    "{}{:?} {:?}\n",
                    "  ".repeat(depth + 1),
                    t.kind(),
                    t.text()
                ));
            }
            rowan::NodeOrToken::Token(_) => {}
        }
    }
}

/// Error messages of a parse, in source order.
pub fn error_messages(source: &str) -> Vec<String> {
    parse(source)
        .errors()
        .iter()
        .map(|err| err.message.clone())
        .collect()
}

/// All node kinds in preorder.
pub fn node_kinds(source: &str) -> Vec<SyntaxKind> {
    parse(source).syntax().descendants().map(|n| n.kind()).collect()
}

/// Asserts that the tree reproduces the input byte for byte.
pub fn assert_lossless(source: &str) {
    let parsed = parse(source);
    assert_eq!(parsed.syntax().text().to_string(), source);
    assert_eq!(u32::from(parsed.syntax().text_range().len()) as usize, source.len());
}
