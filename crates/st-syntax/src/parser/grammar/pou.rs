//! Program Organization Unit (POU) parsing.
//!
//! Handles:
//! - PROGRAM / END_PROGRAM
//! - FUNCTION / END_FUNCTION
//! - FUNCTION_BLOCK / END_FUNCTION_BLOCK

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::super::parser::describe;
use super::super::Parser;

impl Parser<'_, '_> {
    /// Parse a PROGRAM declaration.
    pub(crate) fn parse_program(&mut self) {
        self.start_node(SyntaxKind::Program);
        self.enter_block("program");
        self.parse_pou_name("expected program name");
        self.parse_pou_body();
        self.exit_block();
        self.finish_node();
    }

    /// Parse a FUNCTION declaration.
    pub(crate) fn parse_function(&mut self) {
        self.start_node(SyntaxKind::Function);
        self.enter_block("function");
        self.parse_pou_name("expected function name");

        // Return type
        if self.eat(TokenKind::Colon) {
            self.parse_type_ref();
        }

        self.parse_pou_body();
        self.exit_block();
        self.finish_node();
    }

    /// Parse a FUNCTION_BLOCK declaration.
    pub(crate) fn parse_function_block(&mut self) {
        self.start_node(SyntaxKind::FunctionBlock);
        self.enter_block("function_block");
        self.parse_pou_name("expected function block name");
        self.parse_pou_body();
        self.exit_block();
        self.finish_node();
    }

    fn parse_pou_name(&mut self, message: &str) {
        if self.at(TokenKind::Ident) {
            self.parse_name();
        } else {
            self.error(message);
        }
    }

    /// Var blocks followed by the statement body.
    ///
    /// Var blocks after the first statement are still parsed, but reported.
    fn parse_pou_body(&mut self) {
        let mut seen_statements = false;
        loop {
            let kind = self.current();
            if kind.is_var_keyword() {
                if seen_statements {
                    self.error(format!("unexpected {} after statements", describe(kind)));
                }
                self.parse_var_block();
            } else if !self.at_stmt_list_end() {
                self.parse_stmt_list(false);
                seen_statements = true;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::syntax::SyntaxKind;

    fn messages(source: &str) -> Vec<String> {
        parse(source)
            .errors()
            .iter()
            .map(|error| error.message.clone())
            .collect()
    }

    #[test]
    fn test_function_with_return_type() {
        let source = "FUNCTION Add : DINT\nVAR_INPUT a, b : DINT; END_VAR\nAdd := a + b;\nEND_FUNCTION";
        let parse = parse(source);
        assert!(parse.ok(), "{:?}", parse.errors());
        let function = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::Function);
        let children: Vec<_> = function
            .map(|n| n.children().map(|c| c.kind()).collect())
            .unwrap_or_default();
        assert_eq!(
            children,
            vec![
                SyntaxKind::Name,
                SyntaxKind::TypeRef,
                SyntaxKind::VarBlock,
                SyntaxKind::StmtList
            ]
        );
    }

    #[test]
    fn test_several_pous() {
        let source = "PROGRAM A END_PROGRAM\nFUNCTION_BLOCK B END_FUNCTION_BLOCK\nFUNCTION C END_FUNCTION";
        let parse = parse(source);
        assert!(parse.ok(), "{:?}", parse.errors());
        let kinds: Vec<_> = parse.syntax().children().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Program,
                SyntaxKind::FunctionBlock,
                SyntaxKind::Function
            ]
        );
    }

    #[test]
    fn test_missing_names() {
        assert_eq!(messages("PROGRAM END_PROGRAM"), vec!["expected program name"]);
        assert_eq!(
            messages("FUNCTION_BLOCK END_FUNCTION_BLOCK"),
            vec!["expected function block name"]
        );
    }

    #[test]
    fn test_var_block_after_statements() {
        assert_eq!(
            messages("PROGRAM P x := 1; VAR y : INT; END_VAR END_PROGRAM"),
            vec!["unexpected VAR after statements"]
        );
    }

    #[test]
    fn test_missing_end_program_before_next_pou() {
        let source = "PROGRAM A x := 1;\nFUNCTION_BLOCK B END_FUNCTION_BLOCK";
        let parse = parse(source);
        let messages: Vec<_> = parse.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["expected END_PROGRAM"]);
        let kinds: Vec<_> = parse.syntax().children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::Program, SyntaxKind::FunctionBlock]);
    }
}
