//! Rule set for IEC 61131-3 Structured Text.
//!
//! Rule order matters only for the first entry, which is the start rule.
//! Node kinds attached to rules are the kinds the reference parser builds.

use super::{
    BlockDelimiter, Conflict, Grammar, Precedence, Production, Resolution, Rule, Symbol,
};
use crate::lexer::TokenKind::{self, *};
use crate::syntax::SyntaxKind;

pub(super) const PREC_OR: u8 = 0;
pub(super) const PREC_XOR: u8 = 1;
pub(super) const PREC_AND: u8 = 2;
pub(super) const PREC_EQUALITY: u8 = 10;
pub(super) const PREC_COMPARISON: u8 = 11;
pub(super) const PREC_ADDITIVE: u8 = 20;
pub(super) const PREC_MULTIPLICATIVE: u8 = 21;
pub(super) const PREC_POWER: u8 = 22;
pub(super) const PREC_UNARY: u8 = 30;
pub(super) const PREC_PAREN: u8 = 40;
pub(super) const PREC_POSTFIX: u8 = 50;

const VAR_KEYWORDS: [TokenKind; 7] = [
    KwVar,
    KwVarInput,
    KwVarOutput,
    KwVarInOut,
    KwVarTemp,
    KwVarGlobal,
    KwVarExternal,
];

const VAR_MODIFIERS: [TokenKind; 4] = [KwConstant, KwRetain, KwNonRetain, KwPersistent];

const ELEMENTARY_TYPES: [TokenKind; 25] = [
    KwBool,
    KwSInt,
    KwInt,
    KwDInt,
    KwLInt,
    KwUSInt,
    KwUInt,
    KwUDInt,
    KwULInt,
    KwReal,
    KwLReal,
    KwByte,
    KwWord,
    KwDWord,
    KwLWord,
    KwTime,
    KwLTime,
    KwDate,
    KwLDate,
    KwTimeOfDay,
    KwLTimeOfDay,
    KwDateAndTime,
    KwLDateAndTime,
    KwChar,
    KwWChar,
];

const LITERAL_TOKENS: [TokenKind; 11] = [
    IntLiteral,
    BasedIntLiteral,
    RealLiteral,
    StringLiteral,
    WideStringLiteral,
    TimeLiteral,
    DateLiteral,
    TimeOfDayLiteral,
    DateAndTimeLiteral,
    KwTrue,
    KwFalse,
];

fn t(kind: TokenKind) -> Symbol {
    Symbol::Token(kind)
}

fn r(name: &'static str) -> Symbol {
    Symbol::Rule(name)
}

fn opt(symbols: Vec<Symbol>) -> Symbol {
    Symbol::Optional(symbols)
}

fn rep(symbols: Vec<Symbol>) -> Symbol {
    Symbol::Repeat(symbols)
}

fn rep1(symbols: Vec<Symbol>) -> Symbol {
    Symbol::Repeat1(symbols)
}

fn seq(symbols: Vec<Symbol>) -> Production {
    Production::new(symbols)
}

/// `item (, item)*`
fn comma_list(item: &'static str) -> Vec<Symbol> {
    vec![r(item), rep(vec![t(Comma), r(item)])]
}

fn choice(name: &'static str, node: Option<SyntaxKind>, alternatives: Vec<Production>) -> Rule {
    Rule::new(name, node, alternatives)
}

fn one_of(name: &'static str, tokens: &[TokenKind]) -> Rule {
    Rule::new(name, None, tokens.iter().map(|&kind| seq(vec![t(kind)])).collect())
}

fn refs(name: &'static str, rules: &[&'static str]) -> Rule {
    Rule::new(name, None, rules.iter().map(|&rule| seq(vec![r(rule)])).collect())
}

/// Builds the complete Structured Text grammar.
pub(super) fn build() -> Grammar {
    let mut rules = Vec::new();
    rules.extend(top_level_rules());
    rules.extend(declaration_rules());
    rules.extend(type_rules());
    rules.extend(statement_rules());
    rules.extend(expression_rules());

    Grammar::new("structured_text", rules)
        .with_extras(vec![Whitespace, LineComment, BlockComment, Pragma])
        .with_conflicts(vec![Conflict {
            name: "dangling_else",
            rules: vec!["if_statement", "case_statement"],
            resolution: Resolution::NearestBlock,
        }])
        .with_blocks(blocks())
}

fn blocks() -> Vec<BlockDelimiter> {
    let block = |rule, open: Vec<TokenKind>, close, branches: Vec<TokenKind>| BlockDelimiter {
        rule,
        open,
        close,
        branches,
    };
    vec![
        block("program", vec![KwProgram], KwEndProgram, vec![]),
        block("function", vec![KwFunction], KwEndFunction, vec![]),
        block("function_block", vec![KwFunctionBlock], KwEndFunctionBlock, vec![]),
        block("var_block", VAR_KEYWORDS.to_vec(), KwEndVar, vec![]),
        block("type_declaration", vec![KwType], KwEndType, vec![]),
        block("struct_type", vec![KwStruct], KwEndStruct, vec![]),
        block("if_statement", vec![KwIf], KwEndIf, vec![KwElsif, KwElse]),
        block("case_statement", vec![KwCase], KwEndCase, vec![KwElse]),
        block("for_statement", vec![KwFor], KwEndFor, vec![]),
        block("while_statement", vec![KwWhile], KwEndWhile, vec![]),
        block("repeat_statement", vec![KwRepeat], KwEndRepeat, vec![KwUntil]),
    ]
}

fn top_level_rules() -> Vec<Rule> {
    vec![
        choice(
            "source_file",
            Some(SyntaxKind::SourceFile),
            vec![seq(vec![rep(vec![r("_top_level_item")])])],
        ),
        refs(
            "_top_level_item",
            &[
                "program",
                "function",
                "function_block",
                "type_declaration",
                "statement_list",
            ],
        ),
        choice(
            "program",
            Some(SyntaxKind::Program),
            vec![seq(vec![
                t(KwProgram),
                r("name"),
                rep(vec![r("var_block")]),
                opt(vec![r("statement_list")]),
                t(KwEndProgram),
            ])],
        ),
        choice(
            "function",
            Some(SyntaxKind::Function),
            vec![seq(vec![
                t(KwFunction),
                r("name"),
                opt(vec![t(Colon), r("type_ref")]),
                rep(vec![r("var_block")]),
                opt(vec![r("statement_list")]),
                t(KwEndFunction),
            ])],
        ),
        choice(
            "function_block",
            Some(SyntaxKind::FunctionBlock),
            vec![seq(vec![
                t(KwFunctionBlock),
                r("name"),
                rep(vec![r("var_block")]),
                opt(vec![r("statement_list")]),
                t(KwEndFunctionBlock),
            ])],
        ),
        choice("name", Some(SyntaxKind::Name), vec![seq(vec![t(Ident)])]),
    ]
}

fn declaration_rules() -> Vec<Rule> {
    let mut var_decl = vec![r("name"), rep(vec![t(Comma), r("name")])];
    var_decl.extend([
        opt(vec![t(KwAt), t(DirectAddress)]),
        t(Colon),
        r("type_ref"),
        opt(vec![t(Assign), r("_initializer")]),
        t(Semicolon),
    ]);

    vec![
        choice(
            "var_block",
            Some(SyntaxKind::VarBlock),
            vec![seq(vec![
                r("_var_section"),
                rep(vec![r("_var_modifier")]),
                rep(vec![r("var_declaration")]),
                t(KwEndVar),
            ])],
        ),
        one_of("_var_section", &VAR_KEYWORDS),
        one_of("_var_modifier", &VAR_MODIFIERS),
        choice("var_declaration", Some(SyntaxKind::VarDecl), vec![seq(var_decl)]),
        refs(
            "_initializer",
            &["_expression", "array_initializer", "initializer_list"],
        ),
        choice(
            "array_initializer",
            Some(SyntaxKind::ArrayInitializer),
            vec![seq(vec![
                t(LBracket),
                r("_initializer"),
                rep(vec![t(Comma), r("_initializer")]),
                t(RBracket),
            ])],
        ),
        choice(
            "initializer_list",
            Some(SyntaxKind::InitializerList),
            vec![seq(vec![
                t(LParen),
                r("_field_initializer"),
                rep(vec![t(Comma), r("_field_initializer")]),
                t(RParen),
            ])],
        ),
        choice(
            "_field_initializer",
            None,
            vec![seq(vec![r("name"), t(Assign), r("_initializer")])],
        ),
    ]
}

fn type_rules() -> Vec<Rule> {
    let mut array = vec![t(KwArray), t(LBracket)];
    array.extend(comma_list("subrange"));
    array.extend([t(RBracket), t(KwOf), r("type_ref")]);

    let mut enum_def = vec![t(LParen)];
    enum_def.extend(comma_list("enum_value"));
    enum_def.push(t(RParen));

    vec![
        choice(
            "type_declaration",
            Some(SyntaxKind::TypeDecl),
            vec![seq(vec![
                t(KwType),
                rep1(vec![
                    r("name"),
                    t(Colon),
                    r("_type_definition"),
                    opt(vec![t(Assign), r("_initializer")]),
                    t(Semicolon),
                ]),
                t(KwEndType),
            ])],
        ),
        refs("_type_definition", &["struct_type", "enum_type", "type_ref"]),
        choice(
            "struct_type",
            Some(SyntaxKind::StructDef),
            vec![seq(vec![
                t(KwStruct),
                rep(vec![r("var_declaration")]),
                t(KwEndStruct),
            ])],
        ),
        choice("enum_type", Some(SyntaxKind::EnumDef), vec![seq(enum_def)]),
        choice(
            "enum_value",
            Some(SyntaxKind::EnumValue),
            vec![seq(vec![r("name"), opt(vec![t(Assign), r("_expression")])])],
        ),
        choice(
            "type_ref",
            Some(SyntaxKind::TypeRef),
            vec![
                seq(vec![
                    r("_elementary_type"),
                    opt(vec![t(LParen), r("subrange"), t(RParen)]),
                ]),
                seq(vec![
                    r("name"),
                    opt(vec![t(LParen), r("subrange"), t(RParen)]),
                ]),
                seq(vec![r("array_type")]),
                seq(vec![r("pointer_type")]),
                seq(vec![r("reference_type")]),
                seq(vec![r("string_type")]),
            ],
        ),
        one_of("_elementary_type", &ELEMENTARY_TYPES),
        choice("array_type", Some(SyntaxKind::ArrayType), vec![seq(array)]),
        choice(
            "pointer_type",
            Some(SyntaxKind::PointerType),
            vec![seq(vec![t(KwPointer), t(KwTo), r("type_ref")])],
        ),
        choice(
            "reference_type",
            Some(SyntaxKind::ReferenceType),
            vec![seq(vec![t(KwRefTo), r("type_ref")])],
        ),
        choice(
            "string_type",
            Some(SyntaxKind::StringType),
            vec![seq(vec![
                r("_string_keyword"),
                opt(vec![t(LBracket), r("_expression"), t(RBracket)]),
            ])],
        ),
        one_of("_string_keyword", &[KwString, KwWString]),
        choice(
            "subrange",
            Some(SyntaxKind::Subrange),
            vec![
                seq(vec![r("_subrange_bound")]),
                seq(vec![r("_subrange_bound"), t(DotDot), r("_subrange_bound")]),
            ],
        ),
        choice(
            "_subrange_bound",
            None,
            vec![seq(vec![r("_expression")]), seq(vec![t(Star)])],
        ),
    ]
}

fn statement_rules() -> Vec<Rule> {
    let body = || opt(vec![r("statement_list")]);

    let mut case_branch = comma_list("case_label");
    case_branch.extend([t(Colon), body()]);

    vec![
        choice(
            "statement_list",
            Some(SyntaxKind::StmtList),
            vec![seq(vec![rep1(vec![r("_statement")])])],
        ),
        refs(
            "_statement",
            &[
                "assignment_statement",
                "expression_statement",
                "if_statement",
                "case_statement",
                "for_statement",
                "while_statement",
                "repeat_statement",
                "return_statement",
                "exit_statement",
                "continue_statement",
                "jmp_statement",
                "label_statement",
                "empty_statement",
            ],
        ),
        choice(
            "assignment_statement",
            Some(SyntaxKind::AssignStmt),
            vec![
                seq(vec![r("_expression"), t(Assign), r("_expression"), t(Semicolon)]),
                seq(vec![r("_expression"), t(RefAssign), r("_expression"), t(Semicolon)]),
            ],
        ),
        choice(
            "expression_statement",
            Some(SyntaxKind::ExprStmt),
            vec![seq(vec![r("_expression"), t(Semicolon)])],
        ),
        choice(
            "if_statement",
            Some(SyntaxKind::IfStmt),
            vec![seq(vec![
                t(KwIf),
                r("_expression"),
                t(KwThen),
                body(),
                rep(vec![r("elsif_clause")]),
                opt(vec![r("else_clause")]),
                t(KwEndIf),
            ])],
        ),
        choice(
            "elsif_clause",
            Some(SyntaxKind::ElsifBranch),
            vec![seq(vec![t(KwElsif), r("_expression"), t(KwThen), body()])],
        ),
        choice(
            "else_clause",
            Some(SyntaxKind::ElseBranch),
            vec![seq(vec![t(KwElse), body()])],
        ),
        choice(
            "case_statement",
            Some(SyntaxKind::CaseStmt),
            vec![seq(vec![
                t(KwCase),
                r("_expression"),
                t(KwOf),
                rep(vec![r("case_branch")]),
                opt(vec![r("else_clause")]),
                t(KwEndCase),
            ])],
        ),
        choice("case_branch", Some(SyntaxKind::CaseBranch), vec![seq(case_branch)]),
        choice(
            "case_label",
            Some(SyntaxKind::CaseLabel),
            vec![seq(vec![r("subrange")])],
        ),
        choice(
            "for_statement",
            Some(SyntaxKind::ForStmt),
            vec![seq(vec![
                t(KwFor),
                r("name"),
                t(Assign),
                r("_expression"),
                t(KwTo),
                r("_expression"),
                opt(vec![t(KwBy), r("_expression")]),
                t(KwDo),
                body(),
                t(KwEndFor),
            ])],
        ),
        choice(
            "while_statement",
            Some(SyntaxKind::WhileStmt),
            vec![seq(vec![
                t(KwWhile),
                r("_expression"),
                t(KwDo),
                body(),
                t(KwEndWhile),
            ])],
        ),
        choice(
            "repeat_statement",
            Some(SyntaxKind::RepeatStmt),
            vec![seq(vec![
                t(KwRepeat),
                body(),
                t(KwUntil),
                r("_expression"),
                t(KwEndRepeat),
            ])],
        ),
        choice(
            "return_statement",
            Some(SyntaxKind::ReturnStmt),
            vec![seq(vec![t(KwReturn), opt(vec![r("_expression")]), t(Semicolon)])],
        ),
        choice(
            "exit_statement",
            Some(SyntaxKind::ExitStmt),
            vec![seq(vec![t(KwExit), t(Semicolon)])],
        ),
        choice(
            "continue_statement",
            Some(SyntaxKind::ContinueStmt),
            vec![seq(vec![t(KwContinue), t(Semicolon)])],
        ),
        choice(
            "jmp_statement",
            Some(SyntaxKind::JmpStmt),
            vec![seq(vec![t(KwJmp), r("name"), t(Semicolon)])],
        ),
        choice(
            "label_statement",
            Some(SyntaxKind::LabelStmt),
            vec![seq(vec![r("name"), t(Colon), r("_statement")])],
        ),
        choice(
            "empty_statement",
            Some(SyntaxKind::EmptyStmt),
            vec![seq(vec![t(Semicolon)])],
        ),
    ]
}

fn expression_rules() -> Vec<Rule> {
    let binary = |op, precedence| {
        seq(vec![r("_expression"), t(op), r("_expression")]).with_precedence(precedence)
    };
    let postfix = |symbols| seq(symbols).with_precedence(Precedence::left(PREC_POSTFIX));

    let mut index = vec![r("_expression"), t(LBracket)];
    index.extend(comma_list("_expression"));
    index.push(t(RBracket));

    let mut literal: Vec<Production> = LITERAL_TOKENS.iter().map(|&kind| seq(vec![t(kind)])).collect();
    literal.push(seq(vec![
        t(TypedLiteralPrefix),
        opt(vec![r("_sign")]),
        r("_typed_literal_value"),
    ]));

    let mut typed_values = LITERAL_TOKENS.to_vec();
    typed_values.push(Ident);

    vec![
        refs(
            "_expression",
            &[
                "binary_expression",
                "unary_expression",
                "parenthesized_expression",
                "call_expression",
                "index_expression",
                "field_expression",
                "deref_expression",
                "name_ref",
                "literal",
            ],
        ),
        choice(
            "binary_expression",
            Some(SyntaxKind::BinaryExpr),
            vec![
                binary(KwOr, Precedence::left(PREC_OR)),
                binary(KwXor, Precedence::left(PREC_XOR)),
                binary(KwAnd, Precedence::left(PREC_AND)),
                binary(Ampersand, Precedence::left(PREC_AND)),
                binary(Eq, Precedence::left(PREC_EQUALITY)),
                binary(Neq, Precedence::left(PREC_EQUALITY)),
                binary(Lt, Precedence::left(PREC_COMPARISON)),
                binary(LtEq, Precedence::left(PREC_COMPARISON)),
                binary(Gt, Precedence::left(PREC_COMPARISON)),
                binary(GtEq, Precedence::left(PREC_COMPARISON)),
                binary(Plus, Precedence::left(PREC_ADDITIVE)),
                binary(Minus, Precedence::left(PREC_ADDITIVE)),
                binary(Star, Precedence::left(PREC_MULTIPLICATIVE)),
                binary(Slash, Precedence::left(PREC_MULTIPLICATIVE)),
                binary(KwMod, Precedence::left(PREC_MULTIPLICATIVE)),
                binary(Power, Precedence::right(PREC_POWER)),
            ],
        ),
        choice(
            "unary_expression",
            Some(SyntaxKind::UnaryExpr),
            vec![
                seq(vec![t(Minus), r("_expression")]),
                seq(vec![t(Plus), r("_expression")]),
                seq(vec![t(KwNot), r("_expression")]),
            ],
        )
        .with_precedence(Precedence::none(PREC_UNARY)),
        choice(
            "parenthesized_expression",
            Some(SyntaxKind::ParenExpr),
            vec![seq(vec![t(LParen), r("_expression"), t(RParen)])],
        )
        .with_precedence(Precedence::none(PREC_PAREN)),
        choice(
            "call_expression",
            Some(SyntaxKind::CallExpr),
            vec![postfix(vec![r("_expression"), r("argument_list")])],
        ),
        choice(
            "argument_list",
            Some(SyntaxKind::ArgList),
            vec![seq(vec![
                t(LParen),
                opt(comma_list("argument")),
                t(RParen),
            ])],
        ),
        choice(
            "argument",
            Some(SyntaxKind::Arg),
            vec![
                seq(vec![r("_expression")]),
                seq(vec![r("name"), t(Assign), r("_expression")]),
                seq(vec![r("name"), t(Arrow), r("_expression")]),
                seq(vec![t(KwNot), r("name"), t(Arrow), r("_expression")]),
            ],
        ),
        choice("index_expression", Some(SyntaxKind::IndexExpr), vec![postfix(index)]),
        choice(
            "field_expression",
            Some(SyntaxKind::FieldExpr),
            vec![
                postfix(vec![r("_expression"), t(Dot), r("name")]),
                postfix(vec![r("_expression"), t(Dot), r("literal")]),
            ],
        ),
        choice(
            "deref_expression",
            Some(SyntaxKind::DerefExpr),
            vec![postfix(vec![r("_expression"), t(Caret)])],
        ),
        choice(
            "name_ref",
            Some(SyntaxKind::NameRef),
            vec![seq(vec![t(Ident)]), seq(vec![t(DirectAddress)])],
        ),
        choice("literal", Some(SyntaxKind::Literal), literal),
        one_of("_sign", &[Plus, Minus]),
        one_of("_typed_literal_value", &typed_values),
    ]
}
