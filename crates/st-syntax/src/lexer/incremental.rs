//! Incremental re-lexing.
//!
//! [`TokenBuffer`] owns a source text together with its token stream and the
//! scanner state in effect before every token. After an edit, scanning
//! restarts at the token holding the newline that precedes the edited line
//! and stops at the first old token boundary past the edit whose stored state
//! matches the live scanner state. Everything after that point is reused with
//! shifted offsets and points.
//!
//! No token other than whitespace and line-segmented comments or pragmas
//! reads across a `\n`, and those segments end at it. Restarting before the
//! edited line therefore reproduces every token a full lex would.

use text_size::{TextRange, TextSize};
use thiserror::Error;
use tracing::debug;

use super::{Cursor, Point, Scanner, ScannerState, Token};
use crate::parser::{self, Parse};

/// A text replacement: `delete` is removed and `insert` put in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte range of the old text to remove.
    pub delete: TextRange,
    /// Replacement text.
    pub insert: String,
}

impl TextEdit {
    /// Replaces `range` with `text`.
    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            delete: range,
            insert: text.into(),
        }
    }

    /// Inserts `text` at `offset`.
    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), text)
    }

    /// Deletes `range`.
    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }
}

/// Description of an applied edit in the shape incremental parsing engines
/// expect: byte offsets and points for the start, old end and new end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct InputEdit {
    pub start_byte: u32,
    pub old_end_byte: u32,
    pub new_end_byte: u32,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

/// Outcome of [`TokenBuffer::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relex {
    /// The edit, for forwarding to a parsing engine.
    pub edit: InputEdit,
    /// Byte range of the new text covered by re-lexed tokens.
    pub relexed_range: TextRange,
    /// Number of tokens produced by scanning.
    pub relexed: usize,
    /// Number of old tokens kept, shifted or not.
    pub reused: usize,
}

/// Edit rejected before touching the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum EditError {
    #[error("edit range {range:?} exceeds text length {len:?}")]
    OutOfBounds { range: TextRange, len: TextSize },
    #[error("offset {offset:?} is not on a char boundary")]
    NotCharBoundary { offset: TextSize },
}

/// Source text with an incrementally maintained token stream.
#[derive(Debug, Clone)]
pub struct TokenBuffer {
    text: String,
    tokens: Vec<Token>,
    /// `states[i]` is the scanner state before `tokens[i]`.
    states: Vec<ScannerState>,
    end_state: ScannerState,
}

impl TokenBuffer {
    /// Lexes `text` from scratch.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut tokens = Vec::new();
        let mut states = Vec::new();
        let mut scanner = Scanner::new();
        let mut cursor = Cursor::new(&text);
        loop {
            let state = scanner.state();
            let Some(token) = scanner.scan(&mut cursor) else {
                break;
            };
            states.push(state);
            tokens.push(token);
        }
        let end_state = scanner.state();
        Self {
            text,
            tokens,
            states,
            end_state,
        }
    }

    /// Current source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current tokens, covering the whole text.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Scanner state before the token at `index`.
    pub fn state_before(&self, index: usize) -> Option<ScannerState> {
        self.states.get(index).copied()
    }

    /// Scanner state after the last token.
    pub fn end_state(&self) -> ScannerState {
        self.end_state
    }

    /// Parses the current tokens into a syntax tree.
    pub fn parse(&self) -> Parse {
        parser::parse_tokens(&self.text, &self.tokens, self.end_state)
    }

    /// Row/column of a byte offset in the current text.
    pub fn point_at(&self, offset: TextSize) -> Point {
        let index = self.tokens.partition_point(|t| t.range.end() <= offset);
        match self.tokens.get(index) {
            Some(token) => token
                .start
                .advance(&self.text[TextRange::new(token.range.start(), offset)]),
            None => self.tokens.last().map_or_else(Point::default, |t| t.end),
        }
    }

    /// Applies `edit` and re-lexes the affected region.
    pub fn edit(&mut self, edit: TextEdit) -> Result<Relex, EditError> {
        let TextEdit { delete, insert } = edit;
        let len = TextSize::of(self.text.as_str());
        if delete.end() > len {
            return Err(EditError::OutOfBounds { range: delete, len });
        }
        for offset in [delete.start(), delete.end()] {
            if !self.text.is_char_boundary(usize::from(offset)) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        let start = usize::from(delete.start());
        let old_end = usize::from(delete.end());
        let new_end = start + insert.len();

        let start_point = self.point_at(delete.start());
        let old_end_point = self.point_at(delete.end());
        let new_end_point = start_point.advance(&insert);

        let restart = match self.text[..start].rfind('\n') {
            Some(newline) => self
                .tokens
                .partition_point(|t| usize::from(t.range.end()) <= newline),
            None => 0,
        };
        let (restart_offset, restart_point, restart_state) = match self.tokens.get(restart) {
            Some(token) => (usize::from(token.range.start()), token.start, self.states[restart]),
            None => (0, Point::default(), ScannerState::Default),
        };

        self.text.replace_range(start..old_end, &insert);

        let mut scanner = Scanner::with_state(restart_state);
        let mut cursor = Cursor::at(&self.text, restart_offset, restart_point);
        let mut new_tokens = Vec::new();
        let mut new_states = Vec::new();
        let mut sync = None;

        loop {
            let offset = cursor.offset();
            if offset >= new_end {
                let old_offset = TextSize::from((offset - new_end + old_end) as u32);
                let old = &self.tokens[restart..];
                let index = restart + old.partition_point(|t| t.range.start() < old_offset);
                let boundary = match self.tokens.get(index) {
                    Some(token) if token.range.start() == old_offset => {
                        Some(self.states[index])
                    }
                    None if old_offset == len => Some(self.end_state),
                    _ => None,
                };
                if boundary == Some(scanner.state()) {
                    sync = Some(index);
                    break;
                }
            }
            let state = scanner.state();
            let Some(token) = scanner.scan(&mut cursor) else {
                break;
            };
            new_states.push(state);
            new_tokens.push(token);
        }

        let relexed = new_tokens.len();
        let relexed_range = TextRange::new(
            TextSize::from(restart_offset as u32),
            TextSize::from(cursor.offset() as u32),
        );

        match sync {
            Some(index) => {
                let shift = Shift {
                    old_end: TextSize::from(old_end as u32),
                    new_end: TextSize::from(new_end as u32),
                    old_end_point,
                    new_end_point,
                };
                for token in &mut self.tokens[index..] {
                    *token = shift.apply(*token);
                }
                self.tokens.splice(restart..index, new_tokens);
                self.states.splice(restart..index, new_states);
            }
            None => {
                self.tokens.truncate(restart);
                self.states.truncate(restart);
                self.tokens.extend(new_tokens);
                self.states.extend(new_states);
                self.end_state = scanner.state();
            }
        }

        let reused = self.tokens.len() - relexed;
        debug!(restart, relexed, reused, synced = sync.is_some(), "relexed after edit");

        Ok(Relex {
            edit: InputEdit {
                start_byte: start as u32,
                old_end_byte: old_end as u32,
                new_end_byte: new_end as u32,
                start_point,
                old_end_point,
                new_end_point,
            },
            relexed_range,
            relexed,
            reused,
        })
    }
}

/// Moves a token lying after an edit to its position in the new text.
struct Shift {
    old_end: TextSize,
    new_end: TextSize,
    old_end_point: Point,
    new_end_point: Point,
}

impl Shift {
    fn apply(&self, token: Token) -> Token {
        let offset = |at: TextSize| at - self.old_end + self.new_end;
        Token {
            kind: token.kind,
            range: TextRange::new(offset(token.range.start()), offset(token.range.end())),
            start: self.point(token.start),
            end: self.point(token.end),
        }
    }

    fn point(&self, point: Point) -> Point {
        if point.row == self.old_end_point.row {
            Point::new(
                self.new_end_point.row,
                point.column - self.old_end_point.column + self.new_end_point.column,
            )
        } else {
            Point::new(
                point.row - self.old_end_point.row + self.new_end_point.row,
                point.column,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{lex, Lexer};

    fn assert_matches_full_lex(buffer: &TokenBuffer) {
        let mut lexer = Lexer::new(buffer.text());
        let expected: Vec<_> = lexer.by_ref().collect();
        assert_eq!(buffer.tokens(), expected.as_slice(), "text: {:?}", buffer.text());
        assert_eq!(buffer.end_state(), lexer.state());
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn test_edit_inside_identifier() {
        let mut buffer = TokenBuffer::new("a := 1;\nbc := 2;\nd := 3;\n");
        let relex = buffer.edit(TextEdit::insert(9.into(), "xx")).unwrap();
        assert_eq!(buffer.text(), "a := 1;\nbxxc := 2;\nd := 3;\n");
        assert_matches_full_lex(&buffer);
        assert!(relex.reused > 0);
        assert_eq!(relex.edit.start_point, Point::new(1, 1));
        assert_eq!(relex.edit.new_end_point, Point::new(1, 3));
    }

    #[test]
    fn test_opening_comment_relexes_to_end() {
        let mut buffer = TokenBuffer::new("a := 1;\nb := 2;\nc := 3;\n");
        let relex = buffer.edit(TextEdit::insert(8.into(), "(* ")).unwrap();
        assert_matches_full_lex(&buffer);
        assert_eq!(relex.reused, 6);
        assert!(!buffer.end_state().is_default());
    }

    #[test]
    fn test_closing_comment_resyncs() {
        let mut buffer = TokenBuffer::new("(* a\nb\nc\nd := 1;\n");
        buffer.edit(TextEdit::insert(5.into(), "*)")).unwrap();
        assert_eq!(buffer.text(), "(* a\n*)b\nc\nd := 1;\n");
        assert_matches_full_lex(&buffer);
        assert!(buffer.end_state().is_default());
    }

    #[test]
    fn test_multiline_delete_shifts_points() {
        let source = "x := 1;\ny := 2;\nz := 3;\nw := 4;\n";
        let mut buffer = TokenBuffer::new(source);
        let relex = buffer.edit(TextEdit::delete(range(7, 15))).unwrap();
        assert_eq!(buffer.text(), "x := 1;\nz := 3;\nw := 4;\n");
        assert_matches_full_lex(&buffer);
        assert_eq!(relex.edit.old_end_point, Point::new(1, 7));
        assert_eq!(relex.edit.new_end_point, Point::new(0, 7));
        assert!(relex.reused > relex.relexed);
    }

    #[test]
    fn test_edit_on_same_line_after_edit_shifts_columns() {
        let mut buffer = TokenBuffer::new("ab := c + d;\ne := f;\n");
        buffer.edit(TextEdit::replace(range(0, 2), "abcdef")).unwrap();
        assert_matches_full_lex(&buffer);
    }

    #[test]
    fn test_edit_errors() {
        let mut buffer = TokenBuffer::new("a := 'ä';");
        assert!(matches!(
            buffer.edit(TextEdit::delete(range(3, 40))),
            Err(EditError::OutOfBounds { .. })
        ));
        assert_eq!(
            buffer.edit(TextEdit::insert(7.into(), "x")),
            Err(EditError::NotCharBoundary { offset: 7.into() })
        );
        assert_eq!(buffer.text(), "a := 'ä';");
    }

    #[test]
    fn test_edits_on_empty_and_whole_text() {
        let mut buffer = TokenBuffer::new("");
        assert!(buffer.tokens().is_empty());
        buffer.edit(TextEdit::insert(0.into(), "x := 1;")).unwrap();
        assert_matches_full_lex(&buffer);
        buffer.edit(TextEdit::delete(range(0, 7))).unwrap();
        assert!(buffer.tokens().is_empty());
        assert_eq!(buffer.tokens(), lex("").as_slice());
    }

    #[test]
    fn test_pseudo_random_edits_match_full_lex() {
        const PIECES: &[&str] = &[
            "(*", "*)", "/*", "*/", "{", "}", "\n", " ", "x", "16#F", "1.5", "'s'", ";", ":=",
            "IF", "END_IF", "..", "$", "ä", "// c\n",
        ];
        let mut seed = 0x2545_f491_u64;
        let mut next = move |bound: usize| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % bound as u64) as usize
        };

        let mut buffer = TokenBuffer::new(
            "PROGRAM p\nVAR x : INT; END_VAR\n(* c (* n *) *)\nx := 16#FF_FF;\n{pragma}\nEND_PROGRAM\n",
        );
        for _ in 0..400 {
            let text = buffer.text();
            let boundaries: Vec<usize> = (0..=text.len())
                .filter(|&i| text.is_char_boundary(i))
                .collect();
            let a = boundaries[next(boundaries.len())];
            let b = boundaries[next(boundaries.len())];
            let (start, end) = (a.min(b), a.max(b).min(a.min(b) + 6));
            let end = if text.is_char_boundary(end) { end } else { start };
            let insert = if next(3) == 0 { "" } else { PIECES[next(PIECES.len())] };
            buffer
                .edit(TextEdit::replace(range(start as u32, end as u32), insert))
                .unwrap();
            assert_matches_full_lex(&buffer);
        }
    }
}
