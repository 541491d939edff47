//! Token source for the parser.
//!
//! Wraps a token slice and offers trivia-skipping lookahead.

use crate::lexer::{Token, TokenKind};
use crate::table::grammar;

pub(crate) struct Source<'t, 'src> {
    tokens: &'t [Token],
    source: &'src str,
    cursor: usize,
}

impl<'t, 'src> Source<'t, 'src> {
    pub(crate) fn new(tokens: &'t [Token], source: &'src str) -> Self {
        Self {
            tokens,
            source,
            cursor: 0,
        }
    }

    /// Kind of the current non-trivia token, or `Eof`.
    pub(crate) fn current(&self) -> TokenKind {
        self.peek_kind_n(0)
    }

    pub(crate) fn current_token(&self) -> Option<&'t Token> {
        self.peek_token_n(0)
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.current_token()
            .map(|token| token.text(self.source))
            .unwrap_or("")
    }

    /// Kind of the nth non-trivia token ahead (0 = current).
    pub(crate) fn peek_kind_n(&self, n: usize) -> TokenKind {
        self.peek_token_n(n)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    pub(crate) fn peek_token_n(&self, n: usize) -> Option<&'t Token> {
        self.tokens[self.cursor.min(self.tokens.len())..]
            .iter()
            .filter(|token| !token.kind.is_trivia())
            .nth(n)
    }

    /// End offset of the last consumed token, used to place insertion errors.
    pub(crate) fn previous_end(&self) -> Option<text_size::TextSize> {
        self.tokens[..self.cursor.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|token| !token.kind.is_trivia())
            .map(|token| token.range.end())
    }

    /// Advances past the current non-trivia token and any trivia before it.
    pub(crate) fn bump(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            self.cursor += 1;
            if !token.kind.is_trivia() {
                break;
            }
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.current() == TokenKind::Eof
    }

    /// Returns true if a top-level assignment operator comes before the end
    /// of the statement.
    pub(crate) fn has_assign_ahead(&self) -> bool {
        self.scan_statement(|kind| matches!(kind, TokenKind::Assign | TokenKind::RefAssign))
    }

    /// Returns true if a top-level colon comes before the end of the
    /// statement, which marks a case label.
    pub(crate) fn has_case_label_ahead(&self) -> bool {
        self.scan_statement(|kind| kind == TokenKind::Colon)
    }

    /// Scans forward at bracket depth zero until `found` matches or the
    /// statement ends at `;` or a block keyword.
    fn scan_statement(&self, found: impl Fn(TokenKind) -> bool) -> bool {
        let mut depth = 0u32;
        for token in &self.tokens[self.cursor.min(self.tokens.len())..] {
            let kind = token.kind;
            match kind {
                _ if kind.is_trivia() => {}
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ if depth > 0 => {}
                _ if found(kind) => return true,
                TokenKind::Semicolon | TokenKind::KwThen | TokenKind::KwDo | TokenKind::KwOf => {
                    return false;
                }
                _ if ends_statement(kind) => return false,
                _ => {}
            }
        }
        false
    }
}

fn ends_statement(kind: TokenKind) -> bool {
    let table = grammar();
    table.block_closed_by(kind).is_some() || table.is_branch(kind) || kind.is_declaration_start()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn test_peek_skips_trivia() {
        let tokens = lex("a (* c *) := // x\n 1");
        let source = Source::new(&tokens, "a (* c *) := // x\n 1");
        assert_eq!(source.peek_kind_n(0), TokenKind::Ident);
        assert_eq!(source.peek_kind_n(1), TokenKind::Assign);
        assert_eq!(source.peek_kind_n(2), TokenKind::IntLiteral);
        assert_eq!(source.peek_kind_n(3), TokenKind::Eof);
    }

    #[test]
    fn test_assign_lookahead_respects_brackets() {
        let text = "f(a := 1); x := 2;";
        let tokens = lex(text);
        let source = Source::new(&tokens, text);
        assert!(!source.has_assign_ahead());

        let text = "arr[i].x := 2;";
        let tokens = lex(text);
        assert!(Source::new(&tokens, text).has_assign_ahead());
    }

    #[test]
    fn test_case_label_lookahead() {
        let text = "1, 2..3: y := 1;";
        let tokens = lex(text);
        assert!(Source::new(&tokens, text).has_case_label_ahead());

        let text = "y := 1; 2: z := 0;";
        let tokens = lex(text);
        assert!(!Source::new(&tokens, text).has_case_label_ahead());

        let text = "y := 1 END_CASE";
        let tokens = lex(text);
        assert!(!Source::new(&tokens, text).has_case_label_ahead());
    }

    #[test]
    fn test_bump_and_previous_end() {
        let text = "a  b";
        let tokens = lex(text);
        let mut source = Source::new(&tokens, text);
        assert_eq!(source.previous_end(), None);
        source.bump();
        assert_eq!(source.current_text(), "b");
        assert_eq!(source.previous_end(), Some(1.into()));
        source.bump();
        assert!(source.at_end());
    }
}
