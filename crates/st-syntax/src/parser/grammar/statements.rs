//! Statements: assignments (`:=` and `?=`), call statements, the IF, CASE,
//! FOR, WHILE and REPEAT blocks, the jump family (RETURN, EXIT, CONTINUE,
//! JMP), labels and the bare `;`.
//!
//! A body gets a `StmtList` node only when it holds at least one statement.

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::super::parser::describe;
use super::super::Parser;

impl Parser<'_, '_> {
    /// Parse statements until an enclosing block or declaration takes over.
    ///
    /// Inside a case branch the list also stops before the next case label.
    pub(crate) fn parse_stmt_list(&mut self, case_branch: bool) {
        if self.at_body_end(case_branch) {
            return;
        }
        self.start_node(SyntaxKind::StmtList);
        while !self.at_body_end(case_branch) {
            self.parse_statement();
        }
        self.finish_node();
    }

    fn at_body_end(&self, case_branch: bool) -> bool {
        self.at_stmt_list_end()
            || (case_branch
                && self.current().can_start_expr()
                && self.source.has_case_label_ahead())
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) {
        match self.current() {
            kind @ (TokenKind::KwIf
            | TokenKind::KwCase
            | TokenKind::KwFor
            | TokenKind::KwWhile
            | TokenKind::KwRepeat) => {
                if self.nested(|p| p.parse_block_stmt(kind)).is_none() {
                    self.skip_too_deep(false);
                }
            }
            TokenKind::KwReturn => self.parse_return_stmt(),
            TokenKind::KwExit => self.parse_keyword_stmt(SyntaxKind::ExitStmt),
            TokenKind::KwContinue => self.parse_keyword_stmt(SyntaxKind::ContinueStmt),
            TokenKind::KwJmp => {
                self.start_node(SyntaxKind::JmpStmt);
                self.bump();
                if self.at(TokenKind::Ident) {
                    self.parse_name();
                } else {
                    self.error("expected label after JMP");
                }
                self.expect_semicolon();
                self.finish_node();
            }
            TokenKind::Semicolon => {
                self.start_node(SyntaxKind::EmptyStmt);
                self.bump();
                self.finish_node();
            }
            TokenKind::Ident if self.peek_kind_n(1) == TokenKind::Colon => self.parse_label_stmt(),
            kind if Self::is_block_keyword(kind) => {
                self.bump_error(format!("unexpected {}", describe(kind)));
            }
            kind if kind.can_start_expr() => self.parse_assign_or_call_stmt(),
            kind => {
                if kind != TokenKind::Error {
                    self.error("expected statement");
                }
                self.recover_statement();
            }
        }
    }

    fn parse_keyword_stmt(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.expect_semicolon();
        self.finish_node();
    }

    /// Parse IF statement.
    ///
    /// `ELSIF` and `ELSE` attach to the innermost open `IF`.
    fn parse_if_stmt(&mut self) {
        self.start_node(SyntaxKind::IfStmt);
        self.enter_block("if_statement");

        self.parse_expression(); // condition
        self.expect(TokenKind::KwThen);
        self.parse_stmt_list(false);

        while self.at(TokenKind::KwElsif) {
            self.start_node(SyntaxKind::ElsifBranch);
            self.bump();
            self.parse_expression();
            self.expect(TokenKind::KwThen);
            self.parse_stmt_list(false);
            self.finish_node();
        }

        self.parse_else_branch();
        self.exit_block();
        self.finish_node();
    }

    fn parse_else_branch(&mut self) {
        if !self.at(TokenKind::KwElse) {
            return;
        }
        self.start_node(SyntaxKind::ElseBranch);
        self.bump();
        self.parse_stmt_list(false);
        self.finish_node();
    }

    fn parse_block_stmt(&mut self, kind: TokenKind) {
        match kind {
            TokenKind::KwIf => self.parse_if_stmt(),
            TokenKind::KwCase => self.parse_case_stmt(),
            TokenKind::KwFor => self.parse_for_stmt(),
            TokenKind::KwWhile => self.parse_while_stmt(),
            _ => self.parse_repeat_stmt(),
        }
    }

    fn parse_label_stmt(&mut self) {
        self.start_node(SyntaxKind::LabelStmt);
        self.parse_name();
        self.bump(); // :
        if self.at_stmt_list_end() {
            self.error("expected statement after label");
        } else if self.nested(Self::parse_statement).is_none() {
            self.skip_too_deep(false);
        }
        self.finish_node();
    }

    /// Parse CASE statement.
    fn parse_case_stmt(&mut self) {
        self.start_node(SyntaxKind::CaseStmt);
        self.enter_block("case_statement");

        self.parse_expression();
        self.expect(TokenKind::KwOf);

        while !self.at_stmt_list_end() {
            if self.current().can_start_expr() {
                self.parse_case_branch();
            } else {
                self.bump_error("expected case label");
            }
        }

        self.parse_else_branch();
        self.exit_block();
        self.finish_node();
    }

    fn parse_case_branch(&mut self) {
        self.start_node(SyntaxKind::CaseBranch);

        self.parse_case_label();
        while self.eat(TokenKind::Comma) {
            self.parse_case_label();
        }
        self.expect(TokenKind::Colon);
        self.parse_stmt_list(true);

        self.finish_node();
    }

    fn parse_case_label(&mut self) {
        self.start_node(SyntaxKind::CaseLabel);
        self.parse_subrange();
        self.finish_node();
    }

    /// Parse FOR statement.
    fn parse_for_stmt(&mut self) {
        self.start_node(SyntaxKind::ForStmt);
        self.enter_block("for_statement");

        if self.at(TokenKind::Ident) {
            self.parse_name();
        } else {
            self.error("expected loop variable");
        }
        if self.expect(TokenKind::Assign) {
            self.parse_expression(); // start
        }
        if self.expect(TokenKind::KwTo) {
            self.parse_expression(); // end
        }
        if self.eat(TokenKind::KwBy) {
            self.parse_expression(); // step
        }
        self.expect(TokenKind::KwDo);
        self.parse_stmt_list(false);

        self.exit_block();
        self.finish_node();
    }

    /// Parse WHILE statement.
    fn parse_while_stmt(&mut self) {
        self.start_node(SyntaxKind::WhileStmt);
        self.enter_block("while_statement");

        self.parse_expression();
        self.expect(TokenKind::KwDo);
        self.parse_stmt_list(false);

        self.exit_block();
        self.finish_node();
    }

    /// Parse REPEAT statement.
    fn parse_repeat_stmt(&mut self) {
        self.start_node(SyntaxKind::RepeatStmt);
        self.enter_block("repeat_statement");

        self.parse_stmt_list(false);
        if self.expect(TokenKind::KwUntil) {
            self.parse_expression();
        }

        self.exit_block();
        self.finish_node();
    }

    /// Parse RETURN statement.
    fn parse_return_stmt(&mut self) {
        self.start_node(SyntaxKind::ReturnStmt);
        self.bump(); // RETURN

        if self.current().can_start_expr() {
            self.parse_expression();
        }

        self.expect_semicolon();
        self.finish_node();
    }

    /// Parse assignment or call statement.
    fn parse_assign_or_call_stmt(&mut self) {
        let is_assign = self.source.has_assign_ahead();
        self.start_node(if is_assign {
            SyntaxKind::AssignStmt
        } else {
            SyntaxKind::ExprStmt
        });

        self.parse_expression();

        if is_assign {
            if self.at(TokenKind::Assign) || self.at(TokenKind::RefAssign) {
                self.bump();
                self.parse_expression();
            } else {
                self.error("expected ':=' or '?='");
            }
        }

        self.expect_semicolon();
        self.finish_node();
    }
}
