//! Lexer for IEC 61131-3 Structured Text.
//!
//! The [`Scanner`] produces one token at a time from a [`Cursor`] and a
//! resumable [`ScannerState`]. [`Lexer`] drives it over a whole source text,
//! and [`incremental::TokenBuffer`] keeps a token stream in sync with edits.

pub mod incremental;
mod keywords;
mod scanner;
mod tokens;

pub use keywords::KEYWORDS;
pub use scanner::{
    token_window, CommentStyle, Cursor, Point, Scanner, ScannerState, StateError,
    SERIALIZATION_BUFFER_SIZE,
};
pub use tokens::TokenKind;

use text_size::{TextRange, TextSize};

/// One scanned token. Tokens never overlap and together cover the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range in the source.
    pub range: TextRange,
    /// Row/column of the first byte.
    pub start: Point,
    /// Row/column just past the last byte.
    pub end: Point,
}

impl Token {
    #[must_use]
    pub fn len(&self) -> TextSize {
        self.range.len()
    }

    /// Always `false` for scanner output.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Slices the token out of `source`.
    #[must_use]
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.range]
    }
}

/// Iterator over all tokens of a text, starting in the default state.
///
/// Unrecognized input comes out as [`TokenKind::Error`] tokens; iteration
/// only stops at the end of the text.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    scanner: Scanner,
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            scanner: Scanner::new(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &'src str {
        self.cursor.source()
    }

    /// Scanner state after the last token.
    ///
    /// Once the iterator is exhausted, a non-default state means the input
    /// ended inside a block comment or pragma.
    #[must_use]
    pub fn state(&self) -> ScannerState {
        self.scanner.state()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.scanner.scan(&mut self.cursor)
    }
}

/// Collects every token of `source`, trivia included.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Like [`lex`], pairing each token with its text.
#[must_use]
pub fn lex_with_text(source: &str) -> Vec<(Token, &str)> {
    Lexer::new(source)
        .map(|token| (token, token.text(source)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(source: &str) -> Vec<(TokenKind, &str)> {
        lex_with_text(source)
            .into_iter()
            .filter(|(t, _)| !t.kind.is_trivia())
            .map(|(t, text)| (t.kind, text))
            .collect()
    }

    #[test]
    fn test_points_follow_newlines() {
        let tokens = lex("a :=\n  b;");
        let points: Vec<_> = tokens.iter().map(|t| (t.start, t.end)).collect();
        assert_eq!(
            points,
            vec![
                (Point::new(0, 0), Point::new(0, 1)),
                (Point::new(0, 1), Point::new(0, 2)),
                (Point::new(0, 2), Point::new(0, 4)),
                (Point::new(0, 4), Point::new(1, 2)),
                (Point::new(1, 2), Point::new(1, 3)),
                (Point::new(1, 3), Point::new(1, 4)),
            ]
        );
        assert_eq!(tokens[3].range, TextRange::new(4.into(), 7.into()));
    }

    #[test]
    fn test_keywords_keep_source_spelling() {
        assert_eq!(
            significant("If x tHeN end_if"),
            vec![
                (TokenKind::KwIf, "If"),
                (TokenKind::Ident, "x"),
                (TokenKind::KwThen, "tHeN"),
                (TokenKind::KwEndIf, "end_if"),
            ]
        );
    }

    #[test]
    fn test_unterminated_comment_state() {
        let mut lexer = Lexer::new("x (* open");
        let count = lexer.by_ref().count();
        assert_eq!(count, 3);
        assert!(!lexer.state().is_default());
    }

    #[test]
    fn test_declaration_section() {
        let source = "VAR_IN_OUT\n    io AT %QW4 : WORD; (* out *)\nEND_VAR";
        assert_eq!(
            significant(source),
            vec![
                (TokenKind::KwVarInOut, "VAR_IN_OUT"),
                (TokenKind::Ident, "io"),
                (TokenKind::KwAt, "AT"),
                (TokenKind::DirectAddress, "%QW4"),
                (TokenKind::Colon, ":"),
                (TokenKind::KwWord, "WORD"),
                (TokenKind::Semicolon, ";"),
                (TokenKind::KwEndVar, "END_VAR"),
            ]
        );
    }
}
