mod common;
use common::*;

// Program Organization Units
#[test]
fn test_function_block() {
    let source = "FUNCTION_BLOCK Counter\nVAR_INPUT\n  reset : BOOL;\nEND_VAR\ncount := count + 1;\nEND_FUNCTION_BLOCK";
    insta::assert_snapshot!(snapshot_parse(source), @r#"
    SourceFile
      FunctionBlock
        KwFunctionBlock "FUNCTION_BLOCK"
        Name
          Ident "Counter"
        VarBlock
          KwVarInput "VAR_INPUT"
          VarDecl
            Name
              Ident "reset"
            Colon ":"
            TypeRef
              KwBool "BOOL"
            Semicolon ";"
          KwEndVar "END_VAR"
        StmtList
          AssignStmt
            NameRef
              Ident "count"
            Assign ":="
            BinaryExpr
              NameRef
                Ident "count"
              Plus "+"
              Literal
                IntLiteral "1"
            Semicolon ";"
        KwEndFunctionBlock "END_FUNCTION_BLOCK"
    "#);
}

#[test]
fn test_enum_type() {
    insta::assert_snapshot!(snapshot_parse("TYPE\n  Color : (Red, Green := 5);\nEND_TYPE"), @r#"
    SourceFile
      TypeDecl
        KwType "TYPE"
        Name
          Ident "Color"
        Colon ":"
        EnumDef
          LParen "("
          EnumValue
            Name
              Ident "Red"
          Comma ","
          EnumValue
            Name
              Ident "Green"
            Assign ":="
            Literal
              IntLiteral "5"
          RParen ")"
        Semicolon ";"
        KwEndType "END_TYPE"
    "#);
}

#[test]
fn test_program_with_every_var_section() {
    let source = r#"
PROGRAM Main
VAR_INPUT start : BOOL; END_VAR
VAR_OUTPUT done : BOOL; END_VAR
VAR_IN_OUT buffer : ARRAY[0..9] OF BYTE; END_VAR
VAR_TEMP scratch : DINT; END_VAR
VAR_GLOBAL RETAIN total : LREAL := 0.0; END_VAR
VAR_EXTERNAL CONSTANT limit : INT; END_VAR
VAR PERSISTENT
    timer : TON;
    lamp AT %QX0.0 : BOOL;
END_VAR
timer(IN := start, PT := T#2s);
done := timer.Q;
END_PROGRAM
"#;
    assert!(error_messages(source).is_empty(), "{:?}", error_messages(source));
    let kinds = node_kinds(source);
    assert_eq!(
        kinds.iter().filter(|k| **k == SyntaxKind::VarBlock).count(),
        7
    );
    assert_eq!(kinds.iter().filter(|k| **k == SyntaxKind::VarDecl).count(), 8);
}

#[test]
fn test_function_return_types() {
    for source in [
        "FUNCTION F : INT END_FUNCTION",
        "FUNCTION F : STRING[20] END_FUNCTION",
        "FUNCTION F : REF_TO Motor END_FUNCTION",
        "FUNCTION F END_FUNCTION",
    ] {
        assert!(error_messages(source).is_empty(), "{source}");
    }
}

#[test]
fn test_struct_and_alias_types() {
    let source = r#"
TYPE
    Point : STRUCT
        x : REAL := 0.0;
        y : REAL;
    END_STRUCT;
    Percent : INT(0..100) := 50;
    Buffer : ARRAY[1..16, 1..*] OF POINTER TO Point;
    Name : WSTRING[32];
END_TYPE
"#;
    assert!(error_messages(source).is_empty(), "{:?}", error_messages(source));
    let kinds = node_kinds(source);
    for kind in [
        SyntaxKind::StructDef,
        SyntaxKind::Subrange,
        SyntaxKind::ArrayType,
        SyntaxKind::PointerType,
        SyntaxKind::StringType,
    ] {
        assert!(kinds.contains(&kind), "missing {kind:?}");
    }
}

#[test]
fn test_initializers() {
    let source = r#"
PROGRAM P
VAR
    lut : ARRAY[0..4] OF INT := [1, 2, 3(0)];
    origin : Point := (x := 0.0, y := 0.0);
    label : STRING := 'start';
END_VAR
END_PROGRAM
"#;
    assert!(error_messages(source).is_empty(), "{:?}", error_messages(source));
    let kinds = node_kinds(source);
    assert!(kinds.contains(&SyntaxKind::ArrayInitializer));
    assert!(kinds.contains(&SyntaxKind::InitializerList));
}

#[test]
fn test_multiple_pous_and_bare_statements() {
    let source = "TYPE T : INT; END_TYPE\nPROGRAM A END_PROGRAM\nx := 1;\nFUNCTION F : BOOL F := TRUE; END_FUNCTION";
    assert!(error_messages(source).is_empty());
    let kinds: Vec<_> = parse(source).syntax().children().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::TypeDecl,
            SyntaxKind::Program,
            SyntaxKind::StmtList,
            SyntaxKind::Function,
        ]
    );
}
