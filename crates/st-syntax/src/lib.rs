//! Syntax support for IEC 61131-3 Structured Text aimed at incremental
//! parsing engines.
//!
//! Three pieces live here:
//!
//! - [`lexer`]: a resumable scanner. Its state between tokens is a handful of
//!   bytes, so an engine can store it and restart scanning after an edit.
//! - [`table`]: the grammar as data (rules, precedences, block delimiters and
//!   declared conflicts), exportable as `grammar.json`.
//! - [`parser`]: a reference parser that builds a lossless `rowan` tree from
//!   the same table and never gives up on bad input.
//!
//! ```
//! use st_syntax::TokenKind;
//!
//! let kinds: Vec<TokenKind> = st_syntax::lex("count := count + 1;")
//!     .into_iter()
//!     .map(|token| token.kind)
//!     .filter(|kind| !kind.is_trivia())
//!     .collect();
//! assert_eq!(kinds[..3], [TokenKind::Ident, TokenKind::Assign, TokenKind::Ident]);
//!
//! let parse = st_syntax::parse("IF a THEN b := 1; END_IF");
//! assert!(parse.ok());
//! assert_eq!(parse.syntax().text().to_string(), "IF a THEN b := 1; END_IF");
//! assert!(st_syntax::grammar().validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod lexer;
pub mod parser;
pub mod syntax;
pub mod table;
mod token_kinds;

pub use lexer::{lex, Lexer, Token, TokenKind};
pub use parser::{parse, parse_tokens, ErrorKind, Parse, ParseError};
pub use syntax::{StLanguage, SyntaxKind, SyntaxNode, SyntaxToken};
pub use table::{grammar, Grammar, GrammarError};
