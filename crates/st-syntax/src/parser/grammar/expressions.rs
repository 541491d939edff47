//! Expression parsing using Pratt parsing.
//!
//! Binding powers come from the grammar table's operator precedences, so the
//! tree built here and the table handed to external engines always agree.

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;
use crate::table::grammar;

use super::super::CompletedMarker;
use super::super::Parser;

impl Parser<'_, '_> {
    /// Parse an expression using Pratt parsing.
    pub(crate) fn parse_expression(&mut self) -> CompletedMarker {
        self.parse_expr_bp(0)
    }

    /// Parse expression with minimum binding power.
    fn parse_expr_bp(&mut self, min_bp: u8) -> CompletedMarker {
        match self.nested(|p| p.parse_operators(min_bp)) {
            Some(completed) => completed,
            None => self.skip_too_deep(true),
        }
    }

    fn parse_operators(&mut self, min_bp: u8) -> CompletedMarker {
        let operators = grammar().operators();

        let mut lhs = match operators.prefix_binding_power(self.current()) {
            Some(bp) => {
                let marker = self.start();
                self.bump();
                self.parse_expr_bp(bp);
                marker.complete(self, SyntaxKind::UnaryExpr)
            }
            None => self.parse_primary_expr(),
        };

        loop {
            let op = self.current();

            if let Some(precedence) = operators.postfix(op) {
                if precedence.infix_binding_power().0 < min_bp {
                    break;
                }
                lhs = self.parse_postfix_expr(lhs, op);
                continue;
            }

            if let Some((l_bp, r_bp)) = operators.infix_binding_power(op) {
                if l_bp < min_bp {
                    break;
                }
                let marker = lhs.precede(self);
                self.bump(); // operator
                self.parse_expr_bp(r_bp);
                lhs = marker.complete(self, SyntaxKind::BinaryExpr);
                continue;
            }

            break;
        }

        lhs
    }

    /// Parse postfix expressions (field access, calls, indexing, dereference).
    fn parse_postfix_expr(&mut self, lhs: CompletedMarker, op: TokenKind) -> CompletedMarker {
        let marker = lhs.precede(self);
        let kind = match op {
            TokenKind::Dot => {
                self.bump();
                if self.at(TokenKind::Ident) {
                    self.parse_name();
                } else if self.at(TokenKind::IntLiteral) {
                    self.start_node(SyntaxKind::Literal);
                    self.bump();
                    self.finish_node();
                } else {
                    self.error("expected field name");
                }
                SyntaxKind::FieldExpr
            }
            TokenKind::LParen => {
                self.parse_arg_list();
                SyntaxKind::CallExpr
            }
            TokenKind::LBracket => {
                self.bump();
                self.parse_expression();
                while self.eat(TokenKind::Comma) {
                    self.parse_expression();
                }
                self.expect(TokenKind::RBracket);
                SyntaxKind::IndexExpr
            }
            _ => {
                self.bump(); // ^
                SyntaxKind::DerefExpr
            }
        };
        marker.complete(self, kind)
    }

    /// Parse primary expressions (literals, names, parentheses).
    fn parse_primary_expr(&mut self) -> CompletedMarker {
        let marker = self.start();
        let kind = match self.current() {
            kind if kind.is_literal() => {
                self.bump();
                SyntaxKind::Literal
            }
            TokenKind::TypedLiteralPrefix => {
                self.bump();
                if matches!(self.current(), TokenKind::Plus | TokenKind::Minus) {
                    self.bump();
                }
                if self.current().is_literal() || self.at(TokenKind::Ident) {
                    self.bump();
                } else {
                    self.error("expected typed literal value");
                }
                SyntaxKind::Literal
            }
            TokenKind::Ident | TokenKind::DirectAddress => {
                self.bump();
                SyntaxKind::NameRef
            }
            TokenKind::LParen => {
                self.bump();
                self.parse_expression();
                self.expect(TokenKind::RParen);
                SyntaxKind::ParenExpr
            }
            TokenKind::Error => {
                self.bump();
                SyntaxKind::Error
            }
            _ => {
                self.error("expected expression");
                if !self.at_expression_boundary() {
                    self.bump();
                }
                SyntaxKind::Error
            }
        };
        marker.complete(self, kind)
    }

    /// Tokens that end an expression without being part of it.
    pub(crate) fn at_expression_boundary(&self) -> bool {
        self.is_sync_point()
            || matches!(
                self.current(),
                TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::DotDot
                    | TokenKind::Assign
                    | TokenKind::RefAssign
                    | TokenKind::Arrow
                    | TokenKind::KwThen
                    | TokenKind::KwDo
                    | TokenKind::KwOf
                    | TokenKind::KwTo
                    | TokenKind::KwBy
                    | TokenKind::Eof
            )
    }

    /// Parse argument list for function calls.
    ///
    /// Arguments are positional, `name := value` inputs, `name => var`
    /// outputs, or negated outputs `NOT name => var`.
    pub(crate) fn parse_arg_list(&mut self) {
        self.start_node(SyntaxKind::ArgList);
        self.bump(); // (

        if !self.at(TokenKind::RParen) {
            loop {
                self.parse_arg();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen);
        self.finish_node();
    }

    fn parse_arg(&mut self) {
        self.start_node(SyntaxKind::Arg);

        let named = self.at(TokenKind::Ident)
            && matches!(self.peek_kind_n(1), TokenKind::Assign | TokenKind::Arrow);
        let negated_output = self.at(TokenKind::KwNot)
            && self.peek_kind_n(1) == TokenKind::Ident
            && self.peek_kind_n(2) == TokenKind::Arrow;

        if negated_output {
            self.bump(); // NOT
        }
        if named || negated_output {
            self.parse_name();
            self.bump(); // := or =>
        }

        self.parse_expression();
        self.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::syntax::{SyntaxKind, SyntaxNode};

    fn expression(source: &str) -> SyntaxNode {
        let parse = parse(&format!("x := {source};"));
        assert!(parse.ok(), "{source}: {:?}", parse.errors());
        parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::AssignStmt)
            .and_then(|stmt| stmt.children().nth(1))
            .unwrap_or_else(|| panic!("no expression in {source}"))
    }

    fn operator(node: &SyntaxNode) -> String {
        node.children_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| !t.kind().is_trivia())
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }

    /// Renders binary and unary structure with parentheses.
    fn shape(node: &SyntaxNode) -> String {
        let children: Vec<_> = node.children().collect();
        match node.kind() {
            SyntaxKind::BinaryExpr => format!(
                "({} {} {})",
                shape(&children[0]),
                operator(node),
                shape(&children[1])
            ),
            SyntaxKind::UnaryExpr => format!("({} {})", operator(node), shape(&children[0])),
            _ => node.text().to_string().trim().to_string(),
        }
    }

    #[test]
    fn test_precedence_levels() {
        let cases = [
            ("a OR b AND c", "(a OR (b AND c))"),
            ("a XOR b OR c", "((a XOR b) OR c)"),
            ("a & b = c", "(a & (b = c))"),
            ("a = b < c", "(a = (b < c))"),
            ("a < b + c", "(a < (b + c))"),
            ("a + b * c", "(a + (b * c))"),
            ("a MOD b ** c", "(a MOD (b ** c))"),
            ("a - b - c", "((a - b) - c)"),
            ("a ** b ** c", "(a ** (b ** c))"),
            ("a < b < c", "((a < b) < c)"),
            ("-a ** 2", "((- a) ** 2)"),
            ("NOT a AND b", "((NOT a) AND b)"),
        ];
        for (source, expected) in cases {
            assert_eq!(shape(&expression(source)), expected, "{source}");
        }
    }

    #[test]
    fn test_postfix_chain() {
        let node = expression("a.b[1, 2]^.c(3)");
        assert_eq!(node.kind(), SyntaxKind::CallExpr);
        let kinds: Vec<_> = node
            .descendants()
            .map(|n| n.kind())
            .filter(|k| {
                matches!(
                    k,
                    SyntaxKind::CallExpr
                        | SyntaxKind::FieldExpr
                        | SyntaxKind::DerefExpr
                        | SyntaxKind::IndexExpr
                )
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::CallExpr,
                SyntaxKind::FieldExpr,
                SyntaxKind::DerefExpr,
                SyntaxKind::IndexExpr,
                SyntaxKind::FieldExpr,
            ]
        );
    }

    #[test]
    fn test_unary_over_postfix() {
        let node = expression("-a.b");
        assert_eq!(node.kind(), SyntaxKind::UnaryExpr);
        assert_eq!(
            node.children().next().map(|n| n.kind()),
            Some(SyntaxKind::FieldExpr)
        );
    }

    #[test]
    fn test_call_arguments() {
        let node = expression("TON(IN := start, PT := T#5s, Q => done, NOT busy => idle, 4)");
        let args: Vec<_> = node
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::Arg)
            .map(|n| n.children().any(|c| c.kind() == SyntaxKind::Name))
            .collect();
        assert_eq!(args, vec![true, true, true, true, false]);
    }

    #[test]
    fn test_typed_literals() {
        for source in ["INT#16#FF", "REAL#-1.5", "BOOL#TRUE", "Color#Red", "T#1h30m"] {
            assert_eq!(expression(source).kind(), SyntaxKind::Literal, "{source}");
        }
    }

    #[test]
    fn test_field_by_bit_index() {
        let node = expression("flags.3");
        assert_eq!(node.kind(), SyntaxKind::FieldExpr);
        assert_eq!(
            node.children().nth(1).map(|n| n.kind()),
            Some(SyntaxKind::Literal)
        );
    }

    #[test]
    fn test_missing_operand() {
        let parse = parse("x := 1 + ;");
        let messages: Vec<_> = parse.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["expected expression"]);
        assert_eq!(parse.syntax().text().to_string(), "x := 1 + ;");
    }
}
