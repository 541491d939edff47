mod common;
use common::*;

use st_syntax::ErrorKind;

// Error Recovery
#[test]
fn test_missing_end_if() {
    let source = "PROGRAM P\nIF a THEN\n  b := 1;\nEND_PROGRAM";
    let parsed = parse(source);
    let errors: Vec<_> = parsed.errors().iter().map(ToString::to_string).collect();
    assert_eq!(errors, vec!["expected END_IF at 30..41"]);

    let program = parsed.syntax().first_child().expect("program");
    assert_eq!(program.kind(), SyntaxKind::Program);
    assert!(program
        .children_with_tokens()
        .any(|e| e.kind() == SyntaxKind::KwEndProgram));
}

#[test]
fn test_missing_then() {
    assert_eq!(
        error_messages("IF x > 0\n  y := 1;\nEND_IF"),
        vec!["expected THEN"]
    );
}

#[test]
fn test_unexpected_characters() {
    let source = "x := 1;\n@@ y := 2;";
    let parsed = parse(source);
    let errors: Vec<_> = parsed
        .errors()
        .iter()
        .map(|e| (e.kind, e.message.as_str()))
        .collect();
    assert_eq!(
        errors,
        vec![
            (ErrorKind::Lexical, "unexpected character \"@\""),
            (ErrorKind::Lexical, "unexpected character \"@\""),
        ]
    );
    // The statement after the garbage is intact.
    assert_eq!(
        parsed
            .syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::AssignStmt)
            .count(),
        2
    );
}

#[test]
fn test_unterminated_block_comment() {
    let source = "x := 1; (* open\nstill open";
    let parsed = parse(source);
    let errors: Vec<_> = parsed.errors().iter().map(ToString::to_string).collect();
    assert_eq!(errors, vec!["unterminated block comment at 16..26"]);
    assert_lossless(source);
}

#[test]
fn test_unterminated_pragma() {
    assert_eq!(
        error_messages("{attribute 'x'\nx := 1;"),
        vec!["unterminated pragma"]
    );
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        error_messages("s := 'abc;"),
        vec!["unterminated string literal", "expected ';'"]
    );
}

#[test]
fn test_malformed_string_escape() {
    assert_eq!(
        error_messages("s := 'bad $Q escape';"),
        vec!["malformed string literal"]
    );
}

#[test]
fn test_stray_close_keyword_at_top_level() {
    assert_eq!(
        error_messages("END_WHILE\nx := 1;"),
        vec!["unexpected END_WHILE"]
    );
}

#[test]
fn test_missing_end_before_next_pou() {
    let source = r#"
FUNCTION_BLOCK A
VAR
    x : INT;
x := 1;
FUNCTION_BLOCK B
END_FUNCTION_BLOCK
"#;
    assert_eq!(
        error_messages(source),
        vec!["expected END_VAR", "expected END_FUNCTION_BLOCK"]
    );
    let kinds: Vec<_> = parse(source).syntax().children().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![SyntaxKind::FunctionBlock, SyntaxKind::FunctionBlock]
    );
}

#[test]
fn test_errors_are_sorted() {
    let parsed = parse("x := ;\nIF THEN END_IF\ny := 1 @");
    let starts: Vec<_> = parsed.errors().iter().map(|e| e.range.start()).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert!(parsed.errors().len() >= 3);
}

#[test]
fn test_broken_inputs_stay_lossless() {
    let inputs = [
        "",
        ";;;",
        "END_IF END_CASE END_FOR",
        "IF",
        "CASE x OF",
        "CASE x OF ) : ; END_CASE",
        "FOR := TO DO",
        "x := (((",
        "x := a[1, ;",
        "f(a := , => b, NOT);",
        "PROGRAM",
        "FUNCTION : END_FUNCTION",
        "TYPE ; X : STRUCT END_TYPE",
        "VAR VAR VAR",
        "VAR x : ARRAY[ OF ; END_VAR",
        "REPEAT UNTIL",
        "label:",
        "JMP ;",
        "x := INT#;",
        "'unterminated",
        "(* never closed",
        "\"wide",
        "%IX",
        "é := 1;",
        "x := 1 (* c *) + (* d *) 2; // tail",
    ];
    for source in inputs {
        assert_lossless(source);
    }
}

// Nesting limit

/// Parses on a thread with a small stack, returning whether the tree is
/// lossless, the error messages and the number of assignments.
fn parse_on_small_stack(source: String) -> (bool, Vec<String>, usize) {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let parsed = parse(&source);
            let lossless = parsed.syntax().text().to_string() == source;
            let messages = parsed.errors().iter().map(|e| e.message.clone()).collect();
            let assignments = parsed
                .syntax()
                .descendants()
                .filter(|n| n.kind() == SyntaxKind::AssignStmt)
                .count();
            (lossless, messages, assignments)
        })
        .expect("spawn parser thread")
        .join()
        .expect("parser thread finished")
}

#[test]
fn test_deeply_nested_parentheses() {
    let depth = 100_000;
    let source = format!("x := {}1{};\ny := 2;", "(".repeat(depth), ")".repeat(depth));
    let (lossless, messages, assignments) = parse_on_small_stack(source);
    assert!(lossless);
    assert_eq!(messages, vec!["nesting too deep"]);
    assert_eq!(assignments, 2);
}

#[test]
fn test_moderate_nesting_is_accepted() {
    let source = format!("x := {}1{};", "(".repeat(100), ")".repeat(100));
    let (lossless, messages, _) = parse_on_small_stack(source);
    assert!(lossless);
    assert!(messages.is_empty(), "{messages:?}");
}

#[test]
fn test_deeply_nested_blocks() {
    let depth = 5_000;
    let source = format!(
        "{}x := 1;\n{}y := 2;",
        "IF a THEN\n".repeat(depth),
        "END_IF;\n".repeat(depth)
    );
    let (lossless, messages, assignments) = parse_on_small_stack(source);
    assert!(lossless);
    assert!(!messages.is_empty());
    assert!(messages.iter().all(|m| m == "nesting too deep"), "{messages:?}");
    assert_eq!(assignments, 1, "the skipped block hides x := 1");
}

#[test]
fn test_deeply_nested_labels_and_types() {
    let labels = format!("{}x := 1;", "step: ".repeat(50_000));
    let types = format!(
        "TYPE T : {}INT;\nEND_TYPE",
        "ARRAY[0..1] OF ".repeat(50_000)
    );
    let initializer = format!(
        "VAR a : INT := {}0{}; END_VAR",
        "[".repeat(50_000),
        "]".repeat(50_000)
    );
    for source in [labels, types, initializer] {
        let (lossless, messages, _) = parse_on_small_stack(source);
        assert!(lossless);
        assert!(!messages.is_empty());
        assert!(
            messages
                .iter()
                .all(|m| m == "nesting too deep" || m.starts_with("unexpected VAR")),
            "{messages:?}"
        );
    }
}
