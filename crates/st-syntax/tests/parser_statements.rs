mod common;
use common::*;

// Statements - Assignment
#[test]
fn test_assignment() {
    insta::assert_snapshot!(snapshot_parse("x := a + 1;"), @r#"
    SourceFile
      StmtList
        AssignStmt
          NameRef
            Ident "x"
          Assign ":="
          BinaryExpr
            NameRef
              Ident "a"
            Plus "+"
            Literal
              IntLiteral "1"
          Semicolon ";"
    "#);
}

// Statements - Control Flow
#[test]
// IEC 61131-3 Ed.3 Table 72 (IF statement)
fn test_if_else() {
    insta::assert_snapshot!(snapshot_parse("IF a THEN\n  b := 1;\nELSE\n  b := 2;\nEND_IF"), @r#"
    SourceFile
      StmtList
        IfStmt
          KwIf "IF"
          NameRef
            Ident "a"
          KwThen "THEN"
          StmtList
            AssignStmt
              NameRef
                Ident "b"
              Assign ":="
              Literal
                IntLiteral "1"
              Semicolon ";"
          ElseBranch
            KwElse "ELSE"
            StmtList
              AssignStmt
                NameRef
                  Ident "b"
                Assign ":="
                Literal
                  IntLiteral "2"
                Semicolon ";"
          KwEndIf "END_IF"
    "#);
}

#[test]
// IEC 61131-3 Ed.3 Table 72 (CASE statement)
fn test_case_statement() {
    insta::assert_snapshot!(snapshot_parse("CASE s OF\n  1, 2..3: y := 0;\nELSE\n  ;\nEND_CASE"), @r#"
    SourceFile
      StmtList
        CaseStmt
          KwCase "CASE"
          NameRef
            Ident "s"
          KwOf "OF"
          CaseBranch
            CaseLabel
              Subrange
                Literal
                  IntLiteral "1"
            Comma ","
            CaseLabel
              Subrange
                Literal
                  IntLiteral "2"
                DotDot ".."
                Literal
                  IntLiteral "3"
            Colon ":"
            StmtList
              AssignStmt
                NameRef
                  Ident "y"
                Assign ":="
                Literal
                  IntLiteral "0"
                Semicolon ";"
          ElseBranch
            KwElse "ELSE"
            StmtList
              EmptyStmt
                Semicolon ";"
          KwEndCase "END_CASE"
    "#);
}

#[test]
fn test_repeat_until() {
    insta::assert_snapshot!(snapshot_parse("REPEAT\n  i := i + 1;\nUNTIL i >= 10\nEND_REPEAT"), @r#"
    SourceFile
      StmtList
        RepeatStmt
          KwRepeat "REPEAT"
          StmtList
            AssignStmt
              NameRef
                Ident "i"
              Assign ":="
              BinaryExpr
                NameRef
                  Ident "i"
                Plus "+"
                Literal
                  IntLiteral "1"
              Semicolon ";"
          KwUntil "UNTIL"
          BinaryExpr
            NameRef
              Ident "i"
            GtEq ">="
            Literal
              IntLiteral "10"
          KwEndRepeat "END_REPEAT"
    "#);
}

#[test]
fn test_for_while_and_jumps() {
    let source = r#"
FOR i := 0 TO 10 BY 2 DO
    WHILE busy DO
        IF abort THEN EXIT; END_IF
        CONTINUE;
    END_WHILE
END_FOR
again: JMP again;
RETURN;
"#;
    let kinds = node_kinds(source);
    for kind in [
        SyntaxKind::ForStmt,
        SyntaxKind::WhileStmt,
        SyntaxKind::IfStmt,
        SyntaxKind::ExitStmt,
        SyntaxKind::ContinueStmt,
        SyntaxKind::LabelStmt,
        SyntaxKind::JmpStmt,
        SyntaxKind::ReturnStmt,
    ] {
        assert!(kinds.contains(&kind), "missing {kind:?}");
    }
    assert!(error_messages(source).is_empty());
}

#[test]
fn test_keywords_are_case_insensitive() {
    let source = "if a then b := 1; elsif c then b := 2; end_if\nWhile x Do x := x - 1; End_While";
    assert!(error_messages(source).is_empty());
    let kinds = node_kinds(source);
    assert!(kinds.contains(&SyntaxKind::ElsifBranch));
    assert!(kinds.contains(&SyntaxKind::WhileStmt));
}

#[test]
fn test_nested_if_inside_case_keeps_its_else() {
    let source = r#"
CASE mode OF
    0:
        IF ready THEN
            start();
        ELSE
            wait();
        END_IF
    1:
        stop();
ELSE
    fault();
END_CASE
"#;
    assert!(error_messages(source).is_empty());
    let root = parse(source).syntax();
    let case_stmt = root
        .descendants()
        .find(|n| n.kind() == SyntaxKind::CaseStmt)
        .expect("case statement");
    let branches = case_stmt
        .children()
        .filter(|n| n.kind() == SyntaxKind::CaseBranch)
        .count();
    assert_eq!(branches, 2);
    assert!(case_stmt
        .children()
        .any(|n| n.kind() == SyntaxKind::ElseBranch));
    let if_stmt = root
        .descendants()
        .find(|n| n.kind() == SyntaxKind::IfStmt)
        .expect("if statement");
    assert!(if_stmt.children().any(|n| n.kind() == SyntaxKind::ElseBranch));
}

#[test]
fn test_comments_are_preserved() {
    let source = "(* header *)\nx := 1; // trailing\n{pragma}\ny := (* inline *) 2;\n";
    assert!(error_messages(source).is_empty());
    assert_lossless(source);
}
