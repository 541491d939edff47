//! Reference parser for IEC 61131-3 Structured Text.
//!
//! A hand-written recursive descent parser that builds a lossless concrete
//! syntax tree (CST) with `rowan`. It is the in-crate consumer of the grammar
//! table: operator binding powers and block delimiters are read from
//! [`crate::table::grammar`], and every node kind it builds is declared by a
//! table rule.
//!
//! # Architecture
//!
//! 1. **Lexing**: tokens come from the scanner, either fresh or from an
//!    incrementally maintained [`TokenBuffer`](crate::lexer::incremental::TokenBuffer)
//! 2. **Parsing**: build a flat stream of events (start node, add token, finish node)
//! 3. **Tree Building**: convert events into a `rowan` green tree
//!
//! Parsing never fails. Unexpected input is wrapped in `Error` nodes and
//! reported, so the tree always covers the whole source.

#![allow(clippy::module_inception)]

mod event;
mod grammar;
mod parser;
mod sink;
mod source;

pub(crate) use parser::{CompletedMarker, Parser};

use std::fmt;

use text_size::{TextRange, TextSize};

use crate::lexer::{Lexer, ScannerState, Token, TokenKind};
use crate::syntax::SyntaxNode;

/// Parses source text into a syntax tree.
#[must_use]
pub fn parse(source: &str) -> Parse {
    let mut lexer = Lexer::new(source);
    let tokens: Vec<Token> = lexer.by_ref().collect();
    parse_tokens(source, &tokens, lexer.state())
}

/// Parses an already scanned token stream.
///
/// `end_state` is the scanner state after the last token; a non-default
/// state is reported as an unterminated comment or pragma.
#[must_use]
pub fn parse_tokens(source: &str, tokens: &[Token], end_state: ScannerState) -> Parse {
    let (events, syntax_errors) = Parser::new(tokens, source).parse();
    let (green_node, sink_errors) = sink::build(tokens, source, events);

    let mut errors = lexical_errors(source, tokens, end_state);
    errors.extend(syntax_errors);
    errors.extend(sink_errors);
    errors.sort_by_key(|error| (error.range.start(), error.range.end()));

    Parse { green_node, errors }
}

fn lexical_errors(source: &str, tokens: &[Token], end_state: ScannerState) -> Vec<ParseError> {
    let mut errors: Vec<ParseError> = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Error)
        .map(|token| {
            let text = token.text(source);
            let message = if text.starts_with('\'') || text.starts_with('"') {
                if text.len() > 1 {
                    "malformed string literal".to_string()
                } else {
                    "unterminated string literal".to_string()
                }
            } else {
                format!("unexpected character {text:?}")
            };
            ParseError::lexical(message, token.range)
        })
        .collect();

    let unterminated = match end_state {
        ScannerState::Default => None,
        ScannerState::Comment { .. } => Some("unterminated block comment"),
        ScannerState::Pragma => Some("unterminated pragma"),
    };
    if let Some(message) = unterminated {
        let range = tokens
            .last()
            .map(|token| token.range)
            .unwrap_or_else(|| TextRange::empty(TextSize::of(source)));
        errors.push(ParseError::lexical(message, range));
    }
    errors
}

/// Result of parsing source text.
#[derive(Debug, Clone)]
pub struct Parse {
    /// The root syntax node.
    green_node: rowan::GreenNode,
    /// Lexical and syntactic errors, sorted by position.
    errors: Vec<ParseError>,
}

impl Parse {
    /// Returns the root syntax node.
    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green_node.clone())
    }

    /// Returns the green tree root.
    #[must_use]
    pub fn green(&self) -> &rowan::GreenNode {
        &self.green_node
    }

    /// Returns the parsing errors, sorted by position.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Returns `true` if parsing produced no errors.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Renders the tree as an indented list of nodes and tokens.
    #[must_use]
    pub fn debug_tree(&self) -> String {
        format!("{:#?}", self.syntax())
    }
}

/// Where an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The scanner could not form a valid token.
    Lexical,
    /// The token stream does not match the grammar.
    Syntactic,
}

/// A parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Whether the error is lexical or syntactic.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
    /// The byte range where the error occurred.
    pub range: TextRange,
}

impl ParseError {
    pub(crate) fn lexical(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            kind: ErrorKind::Lexical,
            message: message.into(),
            range,
        }
    }

    pub(crate) fn syntactic(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            kind: ErrorKind::Syntactic,
            message: message.into(),
            range,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

impl std::error::Error for ParseError {}
