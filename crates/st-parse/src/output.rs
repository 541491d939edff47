//! Rendering of file reports.

use std::fmt::Write as _;
use std::path::Path;

use rowan::NodeOrToken;
use serde::Serialize;
use st_syntax::lexer::Point;
use st_syntax::{ErrorKind, SyntaxNode};
use text_size::TextSize;

use crate::config::Format;
use crate::worker::FileReport;

/// Renders one report in `format`. The result ends with a newline unless empty.
#[must_use]
pub fn render(report: &FileReport, format: Format, show_trivia: bool) -> String {
    match format {
        Format::Tokens => render_tokens(report, show_trivia),
        Format::Tree => render_tree(&report.parse.syntax(), show_trivia),
        Format::Errors => render_errors(report),
        Format::Json => render_json(report),
    }
}

/// `kind start..end line:column "text"` per token.
#[must_use]
pub fn render_tokens(report: &FileReport, show_trivia: bool) -> String {
    let mut out = String::new();
    for token in &report.tokens {
        if token.kind.is_trivia() && !show_trivia {
            continue;
        }
        let _ = writeln!(
            out,
            "{} {}..{} {} {:?}",
            token.kind,
            u32::from(token.range.start()),
            u32::from(token.range.end()),
            token.start,
            token.text(&report.text)
        );
    }
    out
}

#[must_use]
pub fn render_tree(root: &SyntaxNode, show_trivia: bool) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for event in root.preorder_with_tokens() {
        match event {
            rowan::WalkEvent::Enter(NodeOrToken::Node(node)) => {
                let _ = writeln!(
                    out,
                    "{:indent$}{:?}@{:?}",
                    "",
                    node.kind(),
                    node.text_range(),
                    indent = depth * 2
                );
                depth += 1;
            }
            rowan::WalkEvent::Leave(NodeOrToken::Node(_)) => depth -= 1,
            rowan::WalkEvent::Enter(NodeOrToken::Token(token)) => {
                if token.kind().is_trivia() && !show_trivia {
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{:indent$}{:?}@{:?} {:?}",
                    "",
                    token.kind(),
                    token.text_range(),
                    token.text(),
                    indent = depth * 2
                );
            }
            rowan::WalkEvent::Leave(NodeOrToken::Token(_)) => {}
        }
    }
    out
}

/// `path:line:column: kind error: message` per error, one-based.
#[must_use]
pub fn render_errors(report: &FileReport) -> String {
    let mut out = String::new();
    for error in report.parse.errors() {
        let point = point_at(&report.text, error.range.start());
        let _ = writeln!(
            out,
            "{}:{}:{}: {} error: {}",
            display_path(&report.path),
            point.row + 1,
            point.column + 1,
            kind_name(error.kind),
            error.message
        );
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    path: String,
    ok: bool,
    tokens: usize,
    errors: Vec<JsonError<'a>>,
}

#[derive(Serialize)]
struct JsonError<'a> {
    kind: &'static str,
    message: &'a str,
    start: u32,
    end: u32,
    line: u32,
    column: u32,
}

/// One JSON object per file, on a single line.
#[must_use]
pub fn render_json(report: &FileReport) -> String {
    let errors = report
        .parse
        .errors()
        .iter()
        .map(|error| {
            let point = point_at(&report.text, error.range.start());
            JsonError {
                kind: kind_name(error.kind),
                message: &error.message,
                start: error.range.start().into(),
                end: error.range.end().into(),
                line: point.row + 1,
                column: point.column + 1,
            }
        })
        .collect();
    let json = JsonReport {
        path: display_path(&report.path),
        ok: report.ok(),
        tokens: report.tokens.len(),
        errors,
    };
    match serde_json::to_string(&json) {
        Ok(mut line) => {
            line.push('\n');
            line
        }
        Err(_) => String::new(),
    }
}

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Lexical => "lexical",
        ErrorKind::Syntactic => "syntax",
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

fn point_at(text: &str, offset: TextSize) -> Point {
    let offset = usize::from(offset).min(text.len());
    Point::default().advance(text.get(..offset).unwrap_or(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use std::path::PathBuf;

    fn report(text: &str) -> FileReport {
        FileReport::new(PathBuf::from("src/main.st"), text.to_string())
    }

    #[test]
    fn test_tokens_without_trivia() {
        let out = render(&report("x := 1; // set\n"), Format::Tokens, false);
        expect![[r#"
            identifier 0..1 1:1 "x"
            := 2..4 1:3 ":="
            integer_literal 5..6 1:6 "1"
            ; 6..7 1:7 ";"
        "#]]
        .assert_eq(&out);
    }

    #[test]
    fn test_tokens_with_trivia() {
        let out = render(&report("(* a\nb *)"), Format::Tokens, true);
        expect![[r#"
            block_comment 0..5 1:1 "(* a\n"
            block_comment 5..9 2:1 "b *)"
        "#]]
        .assert_eq(&out);
    }

    #[test]
    fn test_tree() {
        let out = render(&report("x := 1;"), Format::Tree, false);
        expect![[r#"
            SourceFile@0..7
              StmtList@0..7
                AssignStmt@0..7
                  NameRef@0..2
                    Ident@0..1 "x"
                  Assign@2..4 ":="
                  Literal@4..6
                    IntLiteral@5..6 "1"
                  Semicolon@6..7 ";"
        "#]]
        .assert_eq(&out);
    }

    #[test]
    fn test_errors_are_one_based() {
        let out = render(&report("IF x THEN\n  y := 1;\n"), Format::Errors, false);
        expect![[r#"
            src/main.st:2:10: syntax error: expected END_IF
        "#]]
        .assert_eq(&out);
        assert!(render(&report("x := 1;"), Format::Errors, false).is_empty());
    }

    #[test]
    fn test_json() {
        let out = render(&report("x := @;"), Format::Json, false);
        expect![[r#"
            {"path":"src/main.st","ok":false,"tokens":6,"errors":[{"kind":"lexical","message":"unexpected character \"@\"","start":5,"end":6,"line":1,"column":6}]}
        "#]]
        .assert_eq(&out);
    }
}
