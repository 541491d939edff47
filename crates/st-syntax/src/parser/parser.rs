//! Parser state, markers, and shared recovery helpers.

use drop_bomb::DropBomb;
use text_size::{TextRange, TextSize};

use crate::lexer::{Token, TokenKind};
use crate::parser::event::Event;
use crate::parser::source::Source;
use crate::parser::ParseError;
use crate::syntax::SyntaxKind;
use crate::table::{grammar, BlockDelimiter};

/// Nesting depth past which constructs are skipped instead of parsed, so
/// that deeply nested input cannot exhaust the stack.
pub(crate) const MAX_NESTING: u32 = 256;

/// The parser state.
pub(crate) struct Parser<'t, 'src> {
    pub(crate) source: Source<'t, 'src>,
    pub(crate) events: Vec<Event>,
    errors: Vec<ParseError>,
    /// Blocks currently open, innermost last.
    blocks: Vec<&'static BlockDelimiter>,
    /// Recursion depth of nested expressions, statements and types.
    nesting: u32,
}

pub(crate) struct Marker {
    pos: usize,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: usize) -> Self {
        Self {
            pos,
            bomb: DropBomb::new("uncompleted marker"),
        }
    }

    pub(crate) fn complete(
        mut self,
        parser: &mut Parser<'_, '_>,
        kind: SyntaxKind,
    ) -> CompletedMarker {
        self.bomb.defuse();
        if let Some(event) = parser.events.get_mut(self.pos) {
            match event {
                Event::Start {
                    kind: existing_kind,
                    ..
                } => *existing_kind = kind,
                _ => *event = Event::start(kind),
            }
        }
        parser.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct CompletedMarker {
    pos: usize,
}

impl CompletedMarker {
    /// Starts a new node that will become the parent of this one.
    pub(crate) fn precede(self, parser: &mut Parser<'_, '_>) -> Marker {
        let new_pos = parser.events.len();
        parser.events.push(Event::Placeholder);
        set_forward_parent(&mut parser.events, self.pos, new_pos);
        Marker::new(new_pos)
    }
}

fn set_forward_parent(events: &mut [Event], from: usize, to: usize) {
    let mut current = from;
    while let Event::Start { forward_parent, .. } = &mut events[current] {
        match forward_parent {
            Some(distance) => current += *distance as usize,
            None => {
                *forward_parent = u32::try_from(to - current).ok();
                break;
            }
        }
    }
}

impl<'t, 'src> Parser<'t, 'src> {
    pub(crate) fn new(tokens: &'t [Token], source: &'src str) -> Self {
        Self {
            source: Source::new(tokens, source),
            events: Vec::new(),
            errors: Vec::new(),
            blocks: Vec::new(),
            nesting: 0,
        }
    }

    pub(crate) fn parse(mut self) -> (Vec<Event>, Vec<ParseError>) {
        let root = self.start();
        while !self.at_end() {
            self.parse_top_level_item();
        }
        root.complete(&mut self, SyntaxKind::SourceFile);
        (self.events, self.errors)
    }

    fn parse_top_level_item(&mut self) {
        match self.current() {
            TokenKind::KwProgram => self.parse_program(),
            TokenKind::KwFunction => self.parse_function(),
            TokenKind::KwFunctionBlock => self.parse_function_block(),
            TokenKind::KwType => self.parse_type_decl(),
            kind if kind.is_var_keyword() => {
                self.error(format!("unexpected {} outside of a declaration", describe(kind)));
                self.parse_var_block();
            }
            _ => self.parse_stmt_list(false),
        }
    }

    // Lookahead and consumption.

    pub(crate) fn current(&self) -> TokenKind {
        self.source.current()
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_end(&self) -> bool {
        self.source.at_end()
    }

    pub(crate) fn peek_kind_n(&self, n: usize) -> TokenKind {
        self.source.peek_kind_n(n)
    }

    pub(crate) fn bump(&mut self) {
        let kind = self.current();
        if kind == TokenKind::Eof {
            return;
        }
        self.events.push(Event::Token {
            kind: SyntaxKind::from(kind),
        });
        self.source.bump();
    }

    /// Consumes `kind` or reports it as missing.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error(format!("expected {}", describe(kind)));
            false
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker::new(pos)
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.events.push(Event::start(kind));
    }

    pub(crate) fn finish_node(&mut self) {
        self.events.push(Event::Finish);
    }

    /// Reports an error at the current token.
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let range = match self.source.current_token() {
            Some(token) => token.range,
            None => TextRange::empty(self.source.previous_end().unwrap_or(TextSize::from(0))),
        };
        self.errors.push(ParseError::syntactic(message, range));
    }

    /// Wraps the current token in an `Error` node.
    ///
    /// Nothing is reported on a lexical error token; the scanner's error
    /// already covers it.
    pub(crate) fn bump_error(&mut self, message: impl Into<String>) {
        if !self.at(TokenKind::Error) {
            self.error(message);
        }
        self.start_node(SyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    // Nesting limit.

    /// Runs `parse` one level deeper, or returns `None` without consuming
    /// anything once [`MAX_NESTING`] is reached.
    pub(crate) fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.nesting >= MAX_NESTING {
            return None;
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        Some(result)
    }

    /// Reports nesting past the limit and wraps the construct at the cursor
    /// in an `Error` node without descending into it.
    ///
    /// Brackets and blocks opened inside are skipped through their matching
    /// close. Skipping stops before an unmatched close, a `;`, a branch
    /// keyword or a declaration; in an expression it also stops at the
    /// tokens that end one, such as `THEN` or `,`.
    pub(crate) fn skip_too_deep(&mut self, in_expression: bool) -> CompletedMarker {
        self.error("nesting too deep");
        let marker = self.start();
        let table = grammar();
        let mut brackets = 0u32;
        let mut blocks = 0u32;
        loop {
            let kind = self.current();
            let outer = brackets == 0 && blocks == 0;
            match kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon if blocks == 0 => break,
                TokenKind::LParen | TokenKind::LBracket => brackets += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    if brackets == 0 {
                        break;
                    }
                    brackets -= 1;
                }
                _ if outer && (kind.is_declaration_start() || table.is_branch(kind)) => break,
                _ if outer && in_expression && self.at_expression_boundary() => break,
                _ if table.block_opened_by(kind).is_some() => blocks += 1,
                _ if table.block_closed_by(kind).is_some() => {
                    if blocks == 0 {
                        break;
                    }
                    blocks -= 1;
                    if blocks == 0 {
                        self.bump();
                        break;
                    }
                }
                _ => {}
            }
            self.bump();
        }
        marker.complete(self, SyntaxKind::Error)
    }

    // Blocks declared in the grammar table.

    /// Opens the block declared for `rule` in the grammar table and bumps its
    /// open keyword.
    pub(crate) fn enter_block(&mut self, rule: &str) {
        if let Some(block) = grammar().block(rule) {
            self.blocks.push(block);
        }
        self.bump();
    }

    /// Closes the innermost block, consuming its close keyword if present.
    pub(crate) fn exit_block(&mut self) {
        let Some(block) = self.blocks.pop() else {
            return;
        };
        self.expect(block.close);
    }

    /// Returns true if `kind` closes or continues a block that is open.
    pub(crate) fn belongs_to_open_block(&self, kind: TokenKind) -> bool {
        self.blocks
            .iter()
            .any(|block| block.close == kind || block.branches.contains(&kind))
    }

    /// Returns true if `kind` closes or continues some block, open or not.
    pub(crate) fn is_block_keyword(kind: TokenKind) -> bool {
        let table = grammar();
        table.block_closed_by(kind).is_some() || table.is_branch(kind)
    }

    /// Returns true where a statement list must stop: end of input, a new
    /// declaration, or a keyword that an enclosing block is waiting for.
    pub(crate) fn at_stmt_list_end(&self) -> bool {
        let kind = self.current();
        kind == TokenKind::Eof || kind.is_declaration_start() || self.belongs_to_open_block(kind)
    }

    /// Returns true if the current token is a synchronization point.
    pub(crate) fn is_sync_point(&self) -> bool {
        let kind = self.current();
        kind == TokenKind::Semicolon || kind.is_declaration_start() || Self::is_block_keyword(kind)
    }

    /// Skips to the next statement boundary, wrapping skipped tokens in an
    /// `Error` node. A trailing `;` is consumed.
    pub(crate) fn recover_statement(&mut self) {
        if self.is_sync_point() || self.current().can_start_statement() {
            self.eat(TokenKind::Semicolon);
            return;
        }
        self.start_node(SyntaxKind::Error);
        while !self.at_end() && !self.is_sync_point() && !self.current().can_start_statement() {
            self.bump();
        }
        self.finish_node();
        self.eat(TokenKind::Semicolon);
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume a statement terminator, or insert it when unambiguous.
    pub(crate) fn expect_semicolon(&mut self) {
        if self.eat(TokenKind::Semicolon) {
            return;
        }
        self.error_before("expected ';'");
        if !self.at_semicolon_insertion_point() {
            self.recover_statement();
        }
    }

    /// Reports an error just after the previous token, where something is
    /// missing.
    fn error_before(&mut self, message: &str) {
        let end = self.source.previous_end().unwrap_or(TextSize::from(0));
        self.errors
            .push(ParseError::syntactic(message, TextRange::empty(end)));
    }

    fn at_semicolon_insertion_point(&self) -> bool {
        self.at_end()
            || self.is_sync_point()
            || self.current().can_start_statement()
            || (self.current().can_start_expr() && self.source.has_case_label_ahead())
    }
}

/// Human-readable form of a token kind for error messages.
pub(crate) fn describe(kind: TokenKind) -> String {
    match kind.text() {
        Some(text) if kind.is_keyword() => text.to_string(),
        Some(text) => format!("'{text}'"),
        None => kind.name().replace('_', " "),
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse, ErrorKind};

    fn messages(source: &str) -> Vec<String> {
        parse(source)
            .errors()
            .iter()
            .map(|error| error.message.clone())
            .collect()
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").ok());
        assert!(parse("  (* only a comment *)\n").ok());
    }

    #[test]
    fn test_parse_simple_program() {
        let parse = parse("PROGRAM Test END_PROGRAM");
        assert!(parse.ok(), "errors: {:?}", parse.errors());
    }

    #[test]
    fn test_parse_function_block() {
        let source = r#"
FUNCTION_BLOCK FB_Motor
VAR_INPUT
    enable : BOOL;
END_VAR
END_FUNCTION_BLOCK
"#;
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors());
    }

    #[test]
    fn test_parse_call_statement() {
        let parse = parse("PROGRAM Test\nMyFunc(1, 2);\nEND_PROGRAM\n");
        assert!(parse.ok(), "errors: {:?}", parse.errors());
    }

    #[test]
    fn test_parse_typed_literal_and_deref() {
        let parse = parse("PROGRAM Test\nptr^ := INT#16#FF;\nEND_PROGRAM\n");
        assert!(parse.ok(), "errors: {:?}", parse.errors());
    }

    #[test]
    fn test_parse_bare_statements() {
        let parse = parse("x := 1;\nIF x > 0 THEN y := 2; END_IF;\n");
        assert!(parse.ok(), "errors: {:?}", parse.errors());
    }

    #[test]
    fn test_missing_semicolon_insertion() {
        let source = r#"
PROGRAM Test
    x := 1
    y := 2;
END_PROGRAM
"#;
        assert_eq!(messages(source), vec!["expected ';'"]);
    }

    #[test]
    fn test_missing_end_case_recovery() {
        let source = r#"
PROGRAM Test
    CASE x OF
        0: y := 1;
END_PROGRAM
"#;
        assert_eq!(messages(source), vec!["expected END_CASE"]);
    }

    #[test]
    fn test_close_keyword_of_outer_block_ends_inner() {
        let source = "WHILE a DO IF b THEN c := 1; END_WHILE";
        assert_eq!(messages(source), vec!["expected END_IF"]);
    }

    #[test]
    fn test_stray_close_keyword_is_skipped() {
        let parse = parse("FOR i := 1 TO 2 DO x := i; END_IF END_FOR");
        let errors: Vec<_> = parse
            .errors()
            .iter()
            .map(|e| (e.kind, e.message.as_str()))
            .collect();
        assert_eq!(errors, vec![(ErrorKind::Syntactic, "unexpected END_IF")]);
    }

    #[test]
    fn test_var_block_at_top_level() {
        assert_eq!(
            messages("VAR x : INT; END_VAR"),
            vec!["unexpected VAR outside of a declaration"]
        );
    }
}
