//! Declaration parsing for IEC 61131-3 Structured Text.
//!
//! Handles:
//! - Variable blocks (VAR, VAR_INPUT, VAR_OUTPUT, etc.) with modifiers
//! - Variable declarations with optional AT binding and initializers
//! - Type declarations (TYPE...END_TYPE)
//! - Struct and enum definitions
//! - Array, pointer, reference and string types

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::super::Parser;

impl Parser<'_, '_> {
    /// Parse a variable block.
    pub(crate) fn parse_var_block(&mut self) {
        self.start_node(SyntaxKind::VarBlock);
        self.enter_block("var_block");

        while matches!(
            self.current(),
            TokenKind::KwConstant
                | TokenKind::KwRetain
                | TokenKind::KwNonRetain
                | TokenKind::KwPersistent
        ) {
            self.bump();
        }

        self.parse_var_decls();

        self.exit_block();
        self.finish_node();
    }

    /// Declarations up to the closing keyword of a var block or struct.
    ///
    /// An identifier that does not continue as a declaration is taken as the
    /// first statement after a missing `END_VAR`.
    fn parse_var_decls(&mut self) {
        loop {
            if self.at(TokenKind::Ident)
                && matches!(
                    self.peek_kind_n(1),
                    TokenKind::Colon | TokenKind::Comma | TokenKind::KwAt
                )
            {
                self.parse_var_decl();
            } else if self.at_stmt_list_end() || self.current().can_start_statement() {
                break;
            } else {
                self.bump_error("expected variable name");
            }
        }
    }

    /// Parse a single variable declaration.
    fn parse_var_decl(&mut self) {
        self.start_node(SyntaxKind::VarDecl);

        self.parse_name();
        while self.eat(TokenKind::Comma) {
            self.parse_name();
        }

        if self.eat(TokenKind::KwAt) {
            self.expect(TokenKind::DirectAddress);
        }

        if self.expect(TokenKind::Colon) {
            self.parse_type_ref();
        }

        if self.eat(TokenKind::Assign) {
            self.parse_initializer();
        }

        self.expect_semicolon();
        self.finish_node();
    }

    /// Initial value: an expression, `[...]` array or `(field := ...)` struct.
    fn parse_initializer(&mut self) {
        if self.nested(Self::parse_initializer_value).is_none() {
            self.skip_too_deep(false);
        }
    }

    fn parse_initializer_value(&mut self) {
        match self.current() {
            TokenKind::LBracket => self.parse_array_initializer(),
            TokenKind::LParen
                if self.peek_kind_n(1) == TokenKind::Ident
                    && self.peek_kind_n(2) == TokenKind::Assign =>
            {
                self.parse_initializer_list();
            }
            _ => {
                self.parse_expression();
            }
        }
    }

    /// `[1, 2, 3(0)]`; repetition counts parse as calls.
    fn parse_array_initializer(&mut self) {
        self.start_node(SyntaxKind::ArrayInitializer);
        self.bump(); // [

        self.parse_initializer();
        while self.eat(TokenKind::Comma) {
            self.parse_initializer();
        }

        self.expect(TokenKind::RBracket);
        self.finish_node();
    }

    fn parse_initializer_list(&mut self) {
        self.start_node(SyntaxKind::InitializerList);
        self.bump(); // (

        loop {
            self.parse_name();
            if self.expect(TokenKind::Assign) {
                self.parse_initializer();
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen);
        self.finish_node();
    }

    /// Parse a TYPE declaration block.
    pub(crate) fn parse_type_decl(&mut self) {
        self.start_node(SyntaxKind::TypeDecl);
        self.enter_block("type_declaration");

        if !self.at(TokenKind::Ident) {
            self.error("expected type name");
        }

        loop {
            if self.at(TokenKind::Ident) {
                self.parse_name();
                if self.expect(TokenKind::Colon) {
                    self.parse_type_definition();
                    if self.eat(TokenKind::Assign) {
                        self.parse_initializer();
                    }
                }
                self.expect_semicolon();
            } else if self.at_stmt_list_end() {
                break;
            } else {
                self.bump_error("expected type name");
            }
        }

        self.exit_block();
        self.finish_node();
    }

    fn parse_type_definition(&mut self) {
        match self.current() {
            TokenKind::KwStruct => self.parse_struct_def(),
            TokenKind::LParen => self.parse_enum_def(),
            _ => self.parse_type_ref(),
        }
    }

    fn parse_struct_def(&mut self) {
        self.start_node(SyntaxKind::StructDef);
        self.enter_block("struct_type");
        self.parse_var_decls();
        self.exit_block();
        self.finish_node();
    }

    /// `(Red, Green := 5, Blue)`
    fn parse_enum_def(&mut self) {
        self.start_node(SyntaxKind::EnumDef);
        self.bump(); // (

        loop {
            self.start_node(SyntaxKind::EnumValue);
            self.parse_name();
            if self.eat(TokenKind::Assign) {
                self.parse_expression();
            }
            self.finish_node();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen);
        self.finish_node();
    }

    /// Parse a type reference.
    pub(crate) fn parse_type_ref(&mut self) {
        if self.nested(Self::parse_type_ref_node).is_none() {
            self.skip_too_deep(false);
        }
    }

    fn parse_type_ref_node(&mut self) {
        self.start_node(SyntaxKind::TypeRef);

        match self.current() {
            TokenKind::KwArray => self.parse_array_type(),
            TokenKind::KwPointer => {
                self.start_node(SyntaxKind::PointerType);
                self.bump();
                if self.expect(TokenKind::KwTo) {
                    self.parse_type_ref();
                }
                self.finish_node();
            }
            TokenKind::KwRefTo => {
                self.start_node(SyntaxKind::ReferenceType);
                self.bump();
                self.parse_type_ref();
                self.finish_node();
            }
            TokenKind::KwString | TokenKind::KwWString => {
                self.start_node(SyntaxKind::StringType);
                self.bump();
                if self.eat(TokenKind::LBracket) {
                    self.parse_expression();
                    self.expect(TokenKind::RBracket);
                }
                self.finish_node();
            }
            kind if kind.is_type_keyword() => {
                self.bump();
                self.parse_type_subrange();
            }
            TokenKind::Ident => {
                self.parse_name();
                self.parse_type_subrange();
            }
            _ => self.error("expected type"),
        }

        self.finish_node();
    }

    /// `INT(0..100)`
    fn parse_type_subrange(&mut self) {
        if self.eat(TokenKind::LParen) {
            self.parse_subrange();
            self.expect(TokenKind::RParen);
        }
    }

    /// `ARRAY[1..10, 0..*] OF T`
    fn parse_array_type(&mut self) {
        self.start_node(SyntaxKind::ArrayType);
        self.bump(); // ARRAY

        if self.expect(TokenKind::LBracket) {
            self.parse_subrange();
            while self.eat(TokenKind::Comma) {
                self.parse_subrange();
            }
            self.expect(TokenKind::RBracket);
        }

        if self.expect(TokenKind::KwOf) {
            self.parse_type_ref();
        }

        self.finish_node();
    }

    /// A single value or `low..high`; `*` stands for an open bound.
    pub(crate) fn parse_subrange(&mut self) {
        self.start_node(SyntaxKind::Subrange);
        self.parse_subrange_bound();
        if self.eat(TokenKind::DotDot) {
            self.parse_subrange_bound();
        }
        self.finish_node();
    }

    fn parse_subrange_bound(&mut self) {
        if !self.eat(TokenKind::Star) {
            self.parse_expression();
        }
    }

    /// Parse a name (identifier).
    pub(crate) fn parse_name(&mut self) {
        self.start_node(SyntaxKind::Name);
        if !self.eat(TokenKind::Ident) {
            self.error("expected name");
        }
        self.finish_node();
    }
}
