//! Recursive descent rules, one file per construct family.
//!
//! `pou` handles the top level and program organization units, `declarations`
//! covers VAR blocks and TYPE definitions, `statements` the statement forms
//! and `expressions` the Pratt loop. Keyword delimiters and binding powers
//! come from [`crate::table::grammar`] rather than being repeated here.

mod declarations;
mod expressions;
mod pou;
mod statements;
