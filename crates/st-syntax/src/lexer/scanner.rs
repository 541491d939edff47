//! Resumable scanner for Structured Text.
//!
//! The scanner turns the remaining input under a [`Cursor`] into one token at
//! a time. Everything it needs to resume after an arbitrary token boundary is
//! held in [`ScannerState`], which an external parsing engine persists between
//! incremental re-parses via [`ScannerState::serialize`] and
//! [`ScannerState::deserialize`].
//!
//! Each token is a pure function of the remaining input and the state, which
//! is what makes re-lexing a region in isolation reproduce a full lex.

use logos::Logos;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::{keywords, Token, TokenKind};

/// Size of the buffer an engine hands to [`ScannerState::serialize`].
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

const TAG_PASCAL_COMMENT: u8 = 1;
const TAG_C_COMMENT: u8 = 2;
const TAG_PRAGMA: u8 = 3;

/// A zero-based row/column position. Columns count bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    /// Zero-based line number.
    pub row: u32,
    /// Zero-based byte offset within the line.
    pub column: u32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Returns the point reached after `text`, starting from `self`.
    #[must_use]
    pub fn advance(self, text: &str) -> Self {
        match text.rfind('\n') {
            Some(last_newline) => {
                let newlines = text.bytes().filter(|&b| b == b'\n').count();
                Self {
                    row: self.row + newlines as u32,
                    column: (text.len() - last_newline - 1) as u32,
                }
            }
            None => Self {
                row: self.row,
                column: self.column + text.len() as u32,
            },
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.column + 1)
    }
}

/// Block comment delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentStyle {
    /// `(* ... *)`
    Pascal,
    /// `/* ... */`
    C,
}

impl CommentStyle {
    fn open(self) -> &'static [u8; 2] {
        match self {
            Self::Pascal => b"(*",
            Self::C => b"/*",
        }
    }

    fn close(self) -> &'static [u8; 2] {
        match self {
            Self::Pascal => b"*)",
            Self::C => b"*/",
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::Pascal => TAG_PASCAL_COMMENT,
            Self::C => TAG_C_COMMENT,
        }
    }
}

/// Scanner state persisted across token boundaries.
///
/// Block comments and pragmas are emitted one line at a time, so a boundary
/// can fall inside either; the state records how to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScannerState {
    /// Between ordinary tokens.
    #[default]
    Default,
    /// Inside a block comment. `depth` is at least 1.
    Comment {
        /// Which delimiters opened the comment.
        style: CommentStyle,
        /// Number of unclosed openers.
        depth: u32,
    },
    /// Inside a `{ ... }` pragma.
    Pragma,
}

/// Failure to encode or decode a [`ScannerState`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The output buffer cannot hold the encoded state.
    #[error("state needs {needed} bytes but the buffer holds {available}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },
    /// The leading tag byte is not a known state.
    #[error("unknown scanner state tag {0}")]
    UnknownTag(u8),
    /// The encoded state has the wrong length for its tag.
    #[error("scanner state tag {tag} expects {expected} bytes, found {found}")]
    InvalidLength {
        /// The tag byte.
        tag: u8,
        /// Expected total length.
        expected: usize,
        /// Actual total length.
        found: usize,
    },
    /// A comment state with depth zero.
    #[error("comment depth must be at least 1")]
    ZeroDepth,
}

impl ScannerState {
    /// Returns `true` outside of comments and pragmas.
    #[must_use]
    pub fn is_default(self) -> bool {
        self == Self::Default
    }

    /// Writes the state into `buffer`, returning the number of bytes used.
    ///
    /// The default state encodes to zero bytes.
    pub fn serialize(self, buffer: &mut [u8]) -> Result<usize, StateError> {
        let mut encoded = [0u8; 5];
        let len = match self {
            Self::Default => 0,
            Self::Comment { style, depth } => {
                encoded[0] = style.tag();
                encoded[1..5].copy_from_slice(&depth.to_le_bytes());
                5
            }
            Self::Pragma => {
                encoded[0] = TAG_PRAGMA;
                1
            }
        };
        if buffer.len() < len {
            return Err(StateError::BufferTooSmall {
                needed: len,
                available: buffer.len(),
            });
        }
        buffer[..len].copy_from_slice(&encoded[..len]);
        Ok(len)
    }

    /// Reads a state previously written by [`ScannerState::serialize`].
    pub fn deserialize(buffer: &[u8]) -> Result<Self, StateError> {
        let Some((&tag, rest)) = buffer.split_first() else {
            return Ok(Self::Default);
        };
        match tag {
            TAG_PASCAL_COMMENT | TAG_C_COMMENT => {
                let depth: [u8; 4] =
                    rest.try_into()
                        .map_err(|_| StateError::InvalidLength {
                            tag,
                            expected: 5,
                            found: buffer.len(),
                        })?;
                let depth = u32::from_le_bytes(depth);
                if depth == 0 {
                    return Err(StateError::ZeroDepth);
                }
                let style = if tag == TAG_PASCAL_COMMENT {
                    CommentStyle::Pascal
                } else {
                    CommentStyle::C
                };
                Ok(Self::Comment { style, depth })
            }
            TAG_PRAGMA if rest.is_empty() => Ok(Self::Pragma),
            TAG_PRAGMA => Err(StateError::InvalidLength {
                tag,
                expected: 1,
                found: buffer.len(),
            }),
            other => Err(StateError::UnknownTag(other)),
        }
    }
}

/// A position in the source text from which scanning continues.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    offset: usize,
    point: Point,
}

impl<'src> Cursor<'src> {
    /// Creates a cursor at the start of `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            point: Point::default(),
        }
    }

    /// Creates a cursor at `offset`, whose row/column is `point`.
    ///
    /// `offset` must lie on a char boundary of `source`.
    #[must_use]
    pub fn at(source: &'src str, offset: usize, point: Point) -> Self {
        debug_assert!(source.is_char_boundary(offset));
        Self {
            source,
            offset,
            point,
        }
    }

    /// Returns the full source text.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the current byte offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the current row/column.
    #[must_use]
    pub fn point(&self) -> Point {
        self.point
    }

    /// Returns the unscanned input.
    #[must_use]
    pub fn remainder(&self) -> &'src str {
        &self.source[self.offset..]
    }

    /// Returns `true` when no input remains.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    fn bump(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.offset;
        let end = start + len;
        let start_point = self.point;
        let end_point = start_point.advance(&self.source[start..end]);
        self.offset = end;
        self.point = end_point;
        Token {
            kind,
            range: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
            start: start_point,
            end: end_point,
        }
    }
}

/// The Structured Text scanner.
///
/// Holds nothing but its [`ScannerState`]; independent scanners can run on
/// separate threads without coordination.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    state: ScannerState,
}

impl Scanner {
    /// Creates a scanner in the default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scanner resuming from `state`.
    #[must_use]
    pub fn with_state(state: ScannerState) -> Self {
        Self { state }
    }

    /// Returns the state after the last scanned token.
    #[must_use]
    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Replaces the current state.
    pub fn set_state(&mut self, state: ScannerState) {
        self.state = state;
    }

    /// Scans the next token and advances `cursor` past it.
    ///
    /// Returns `None` only at end of input. Returned tokens are never empty.
    pub fn scan(&mut self, cursor: &mut Cursor<'_>) -> Option<Token> {
        let rest = cursor.remainder();
        if rest.is_empty() {
            return None;
        }

        let (kind, len, next) = match self.state {
            ScannerState::Default => scan_default(rest),
            ScannerState::Comment { style, depth } => {
                let (len, next) = scan_comment(rest.as_bytes(), style, depth);
                (TokenKind::BlockComment, len, next)
            }
            ScannerState::Pragma => {
                let (len, next) = scan_pragma(rest.as_bytes());
                (TokenKind::Pragma, len, next)
            }
        };
        debug_assert!(len > 0 && rest.is_char_boundary(len));

        self.state = next;
        Some(cursor.bump(kind, len))
    }
}

fn scan_default(rest: &str) -> (TokenKind, usize, ScannerState) {
    let bytes = rest.as_bytes();
    match bytes {
        [b'(', b'*', tail @ ..] => {
            let (len, next) = scan_comment(tail, CommentStyle::Pascal, 1);
            (TokenKind::BlockComment, len + 2, next)
        }
        [b'/', b'*', tail @ ..] => {
            let (len, next) = scan_comment(tail, CommentStyle::C, 1);
            (TokenKind::BlockComment, len + 2, next)
        }
        [b'{', tail @ ..] => {
            let (len, next) = scan_pragma(tail);
            (TokenKind::Pragma, len + 1, next)
        }
        [b'0'..=b'9', ..] => {
            let (kind, len) = scan_number(bytes);
            (kind, len, ScannerState::Default)
        }
        _ => {
            let (kind, len) = scan_regular(rest);
            (kind, len, ScannerState::Default)
        }
    }
}

/// Length of the prefix of `bytes` that holds the next token in any state.
///
/// Only whitespace runs cross a line break, so the token ends within the
/// leading whitespace or on the line after it. The prefix always ends after a
/// `\n` or at the end of `bytes`, never inside a UTF-8 sequence.
#[must_use]
pub fn token_window(bytes: &[u8]) -> usize {
    let content = bytes
        .iter()
        .position(|&b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x0c'))
        .unwrap_or(bytes.len());
    bytes[content..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |newline| content + newline + 1)
}

/// Scans comment text up to the matching close or the end of the line.
fn scan_comment(bytes: &[u8], style: CommentStyle, mut depth: u32) -> (usize, ScannerState) {
    let (open, close) = (style.open(), style.close());
    let mut i = 0usize;

    while i < bytes.len() {
        let pair = bytes.get(i..i + 2);
        if pair == Some(&open[..]) {
            depth = depth.saturating_add(1);
            i += 2;
            continue;
        }
        if pair == Some(&close[..]) {
            depth = depth.saturating_sub(1);
            i += 2;
            if depth == 0 {
                return (i, ScannerState::Default);
            }
            continue;
        }
        i += 1;
        if bytes[i - 1] == b'\n' {
            break;
        }
    }

    (i, ScannerState::Comment { style, depth })
}

fn scan_pragma(bytes: &[u8]) -> (usize, ScannerState) {
    match bytes.iter().position(|&b| b == b'}' || b == b'\n') {
        Some(i) if bytes[i] == b'}' => (i + 1, ScannerState::Default),
        Some(i) => (i + 1, ScannerState::Pragma),
        None => (bytes.len(), ScannerState::Pragma),
    }
}

/// Scans an integer, based integer, or real literal starting with a digit.
fn scan_number(bytes: &[u8]) -> (TokenKind, usize) {
    let int_end = scan_digits(bytes, 0, |b| b.is_ascii_digit());

    if bytes.get(int_end) == Some(&b'#') {
        let radix = bytes[..int_end]
            .iter()
            .filter(|&&b| b != b'_')
            .try_fold(0u32, |acc, &b| {
                acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
            });
        let is_digit: Option<fn(u8) -> bool> = match radix {
            Some(2) => Some(|b| matches!(b, b'0' | b'1')),
            Some(8) => Some(|b| matches!(b, b'0'..=b'7')),
            Some(16) => Some(|b| b.is_ascii_hexdigit()),
            _ => None,
        };
        if let Some(is_digit) = is_digit {
            let end = scan_digits(bytes, int_end + 1, is_digit);
            if end > int_end + 1 {
                return (TokenKind::BasedIntLiteral, end);
            }
        }
        return (TokenKind::IntLiteral, int_end);
    }

    if bytes.get(int_end) == Some(&b'.') && bytes.get(int_end + 1).is_some_and(u8::is_ascii_digit) {
        let fraction_end = scan_digits(bytes, int_end + 1, |b| b.is_ascii_digit());
        let end = scan_exponent(bytes, fraction_end).unwrap_or(fraction_end);
        return (TokenKind::RealLiteral, end);
    }

    match scan_exponent(bytes, int_end) {
        Some(end) => (TokenKind::RealLiteral, end),
        None => (TokenKind::IntLiteral, int_end),
    }
}

/// Scans `digit (_? digit)*` from `start`; returns `start` if no digit is there.
fn scan_digits(bytes: &[u8], start: usize, is_digit: impl Fn(u8) -> bool) -> usize {
    if !bytes.get(start).is_some_and(|&b| is_digit(b)) {
        return start;
    }
    let mut i = start + 1;
    loop {
        match bytes.get(i) {
            Some(&b) if is_digit(b) => i += 1,
            Some(b'_') if bytes.get(i + 1).is_some_and(|&b| is_digit(b)) => i += 2,
            _ => return i,
        }
    }
}

fn scan_exponent(bytes: &[u8], start: usize) -> Option<usize> {
    if !matches!(bytes.get(start), Some(b'e' | b'E')) {
        return None;
    }
    let mut digits = start + 1;
    if matches!(bytes.get(digits), Some(b'+' | b'-')) {
        digits += 1;
    }
    let end = scan_digits(bytes, digits, |b| b.is_ascii_digit());
    (end > digits).then_some(end)
}

/// Runs the `logos` automaton for one token.
fn scan_regular(rest: &str) -> (TokenKind, usize) {
    let mut lexer = TokenKind::lexer(rest);
    match lexer.next() {
        Some(Ok(TokenKind::Ident)) => {
            let len = lexer.span().end;
            let kind = keywords::lookup(&rest[..len]).unwrap_or(TokenKind::Ident);
            (kind, len)
        }
        Some(Ok(kind)) if lexer.span().end > 0 => (kind, lexer.span().end),
        _ => {
            let len = rest.chars().next().map_or(1, char::len_utf8);
            (TokenKind::Error, len)
        }
    }
}
