//! Token kinds.
//!
//! The regular part of the token set (punctuation, operators, strings,
//! date/time literals, identifiers) is matched by `logos`. Comments, pragmas,
//! numbers and keyword classification are handled by the hand-written
//! [`Scanner`](super::Scanner), so those variants carry no `logos` attributes.

use logos::Logos;

use super::keywords;

/// Kinds of tokens the scanner emits.
///
/// The declaration order is part of the interface: discriminants are shared
/// with `SyntaxKind` and exposed through the C descriptor. Keyword variants
/// are `Kw` plus the keyword; their canonical spelling is [`TokenKind::text`].
#[allow(missing_docs)]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum TokenKind {
    // Trivia.
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// `//` to end of line.
    #[regex(r"//[^\r\n]*")]
    LineComment,

    /// `(* *)` or `/* */`, nesting. One token per line while open.
    BlockComment,

    /// `{ ... }`, not nesting. One token per line while open.
    Pragma,

    // Punctuation and operators.
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("^")]
    Caret,
    #[token(":=")]
    Assign,
    #[token("=>")]
    Arrow,
    #[token("?=")]
    RefAssign,
    #[token("=")]
    Eq,
    #[token("<>")]
    Neq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("**")]
    Power,
    #[token("&")]
    Ampersand,

    // Keywords. `is_keyword` relies on `KwProgram` and `KwFalse` bounding them.
    KwProgram,
    KwEndProgram,
    KwFunction,
    KwEndFunction,
    KwFunctionBlock,
    KwEndFunctionBlock,

    KwVar,
    KwEndVar,
    KwVarInput,
    KwVarOutput,
    KwVarInOut,
    KwVarTemp,
    KwVarGlobal,
    KwVarExternal,
    KwConstant,
    KwRetain,
    KwNonRetain,
    KwPersistent,
    KwAt,

    KwType,
    KwEndType,
    KwStruct,
    KwEndStruct,
    KwArray,
    KwOf,
    KwString,
    KwWString,
    KwPointer,
    KwRefTo,
    KwTo,

    KwIf,
    KwThen,
    KwElsif,
    KwElse,
    KwEndIf,
    KwCase,
    KwEndCase,
    KwFor,
    KwBy,
    KwDo,
    KwEndFor,
    KwWhile,
    KwEndWhile,
    KwRepeat,
    KwUntil,
    KwEndRepeat,
    KwReturn,
    KwExit,
    KwContinue,
    KwJmp,

    KwAnd,
    KwOr,
    KwXor,
    KwNot,
    KwMod,

    // Elementary types, `KwBool..=KwWChar`.
    KwBool,
    KwSInt,
    KwInt,
    KwDInt,
    KwLInt,
    KwUSInt,
    KwUInt,
    KwUDInt,
    KwULInt,
    KwReal,
    KwLReal,
    KwByte,
    KwWord,
    KwDWord,
    KwLWord,
    KwTime,
    KwLTime,
    KwDate,
    KwLDate,
    KwTimeOfDay,
    KwLTimeOfDay,
    KwDateAndTime,
    KwLDateAndTime,
    KwChar,
    KwWChar,

    KwTrue,
    KwFalse,

    // Literals.
    /// `123`, `1_000`
    IntLiteral,

    /// `2#1010`, `8#777`, `16#FF_FF`
    BasedIntLiteral,

    /// `3.14`, `2.5e-3`, `1e5`
    RealLiteral,

    /// Durations such as `T#1h30m` or `LTIME#5m_30s`.
    #[regex(
        r"(?:T|TIME|LT|LTIME)#[+-]?(?:[0-9]+(?:\.[0-9]+)?(?:ms|us|ns|d|h|m|s))(?:_?(?:[0-9]+(?:\.[0-9]+)?(?:ms|us|ns|d|h|m|s)))*",
        ignore(ascii_case)
    )]
    TimeLiteral,

    /// `D#2024-01-15` and the `DATE#`, `LD#`, `LDATE#` spellings.
    #[regex(r"(?:DATE|D|LDATE|LD)#[0-9]{4}-[0-9]{2}-[0-9]{2}", ignore(ascii_case))]
    DateLiteral,

    /// `TOD#14:30:00`, fraction optional.
    #[regex(
        r"(?:TOD|TIME_OF_DAY|LTOD|LTIME_OF_DAY)#[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9][0-9_]*)?",
        ignore(ascii_case)
    )]
    TimeOfDayLiteral,

    /// `DT#2024-01-15-14:30:00`, fraction optional.
    #[regex(
        r"(?:DT|DATE_AND_TIME|LDT|LDATE_AND_TIME)#[0-9]{4}-[0-9]{2}-[0-9]{2}-[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9][0-9_]*)?",
        ignore(ascii_case)
    )]
    DateAndTimeLiteral,

    /// `'text'` with `$` escapes; two hex digits for codes.
    #[regex(
        r"'([^$'\r\n]|\$\$|\$[LlNnPpRrTt]|\$'|\$[0-9A-Fa-f]{2})*'",
        priority = 2
    )]
    StringLiteral,

    /// `"text"`; four hex digits for codes.
    #[regex(
        r#""([^$"\r\n]|\$\$|\$[LlNnPpRrTt]|\$"|\$[0-9A-Fa-f]{4})*""#,
        priority = 2
    )]
    WideStringLiteral,

    /// `INT#`, `BOOL#` and similar before a typed literal.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*#")]
    TypedLiteralPrefix,

    /// Located variable: `%IX0.0`, `%QW10`, `%I*`.
    #[regex(r"%[IQM]\*")]
    #[regex(r"%[IQM][XBWDL]?[0-9]+(\.[0-9]+)*")]
    #[regex(r"%[XBWDL][0-9]+")]
    DirectAddress,

    /// Keywords match this too and are reclassified by the scanner.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    /// Unrecognized character or malformed string.
    #[regex(r"'[^'\r\n]*'", priority = 1)]
    #[regex(r#""[^"\r\n]*""#, priority = 1)]
    Error,

    /// Never scanned; the parser reports it past the last token.
    Eof,
}

impl TokenKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment | Self::Pragma
        )
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        (Self::KwProgram as u16..=Self::KwFalse as u16).contains(&(self as u16))
    }

    /// Elementary type names, `STRING` and `WSTRING` included.
    pub fn is_type_keyword(self) -> bool {
        (Self::KwBool as u16..=Self::KwWChar as u16).contains(&(self as u16))
            || matches!(self, Self::KwString | Self::KwWString)
    }

    /// One of the seven `VAR*` section openers.
    pub fn is_var_keyword(self) -> bool {
        matches!(
            self,
            Self::KwVar
                | Self::KwVarInput
                | Self::KwVarOutput
                | Self::KwVarInOut
                | Self::KwVarTemp
                | Self::KwVarGlobal
                | Self::KwVarExternal
        )
    }

    /// Starts a POU, `TYPE` block, or variable section.
    pub fn is_declaration_start(self) -> bool {
        matches!(
            self,
            Self::KwProgram | Self::KwFunction | Self::KwFunctionBlock | Self::KwType
        ) || self.is_var_keyword()
    }

    /// A complete literal in one token.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::BasedIntLiteral
                | Self::RealLiteral
                | Self::StringLiteral
                | Self::WideStringLiteral
                | Self::TimeLiteral
                | Self::DateLiteral
                | Self::TimeOfDayLiteral
                | Self::DateAndTimeLiteral
                | Self::KwTrue
                | Self::KwFalse
        )
    }

    pub fn can_start_expr(self) -> bool {
        self.is_literal()
            || matches!(
                self,
                Self::Ident
                    | Self::DirectAddress
                    | Self::TypedLiteralPrefix
                    | Self::KwNot
                    | Self::LParen
                    | Self::Minus
                    | Self::Plus
            )
    }

    pub fn can_start_statement(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::DirectAddress
                | Self::KwIf
                | Self::KwCase
                | Self::KwFor
                | Self::KwWhile
                | Self::KwRepeat
                | Self::KwReturn
                | Self::KwExit
                | Self::KwContinue
                | Self::KwJmp
                | Self::Semicolon
        )
    }

    /// Returns the fixed source text of punctuation, operators and keywords.
    ///
    /// Keywords return their canonical upper-case spelling.
    pub fn text(self) -> Option<&'static str> {
        let text = match self {
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::DotDot => "..",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Caret => "^",
            Self::Assign => ":=",
            Self::Arrow => "=>",
            Self::RefAssign => "?=",
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Power => "**",
            Self::Ampersand => "&",
            kind if kind.is_keyword() => return keywords::canonical_text(kind),
            _ => return None,
        };
        Some(text)
    }

    /// Returns a stable snake_case name for the token.
    ///
    /// Tokens with fixed text are named by that text.
    pub fn name(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::LineComment => "line_comment",
            Self::BlockComment => "block_comment",
            Self::Pragma => "pragma",
            Self::IntLiteral => "integer_literal",
            Self::BasedIntLiteral => "based_integer_literal",
            Self::RealLiteral => "real_literal",
            Self::TimeLiteral => "time_literal",
            Self::DateLiteral => "date_literal",
            Self::TimeOfDayLiteral => "time_of_day_literal",
            Self::DateAndTimeLiteral => "date_and_time_literal",
            Self::StringLiteral => "string_literal",
            Self::WideStringLiteral => "wide_string_literal",
            Self::TypedLiteralPrefix => "typed_literal_prefix",
            Self::DirectAddress => "direct_address",
            Self::Ident => "identifier",
            Self::Error => "error",
            Self::Eof => "end_of_file",
            kind => kind.text().unwrap_or("unknown"),
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<TokenKind> for rowan::SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        Self(kind as u16)
    }
}
