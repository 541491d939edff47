//! Case-insensitive keyword table.
//!
//! Identifiers are matched by a single regex and then classified here, so
//! `if`, `IF` and `If` all become [`TokenKind::KwIf`] while `iF1` stays an
//! identifier. The first spelling listed for a kind is its canonical text.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::TokenKind;

/// Every keyword spelling, upper-case.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    // Program Organization Units
    ("PROGRAM", TokenKind::KwProgram),
    ("END_PROGRAM", TokenKind::KwEndProgram),
    ("FUNCTION", TokenKind::KwFunction),
    ("END_FUNCTION", TokenKind::KwEndFunction),
    ("FUNCTION_BLOCK", TokenKind::KwFunctionBlock),
    ("END_FUNCTION_BLOCK", TokenKind::KwEndFunctionBlock),
    // Variable declarations
    ("VAR", TokenKind::KwVar),
    ("END_VAR", TokenKind::KwEndVar),
    ("VAR_INPUT", TokenKind::KwVarInput),
    ("VAR_OUTPUT", TokenKind::KwVarOutput),
    ("VAR_IN_OUT", TokenKind::KwVarInOut),
    ("VAR_TEMP", TokenKind::KwVarTemp),
    ("VAR_GLOBAL", TokenKind::KwVarGlobal),
    ("VAR_EXTERNAL", TokenKind::KwVarExternal),
    ("CONSTANT", TokenKind::KwConstant),
    ("RETAIN", TokenKind::KwRetain),
    ("NON_RETAIN", TokenKind::KwNonRetain),
    ("PERSISTENT", TokenKind::KwPersistent),
    ("AT", TokenKind::KwAt),
    // Type definitions
    ("TYPE", TokenKind::KwType),
    ("END_TYPE", TokenKind::KwEndType),
    ("STRUCT", TokenKind::KwStruct),
    ("END_STRUCT", TokenKind::KwEndStruct),
    ("ARRAY", TokenKind::KwArray),
    ("OF", TokenKind::KwOf),
    ("STRING", TokenKind::KwString),
    ("WSTRING", TokenKind::KwWString),
    ("POINTER", TokenKind::KwPointer),
    ("REF_TO", TokenKind::KwRefTo),
    ("TO", TokenKind::KwTo),
    // Control flow
    ("IF", TokenKind::KwIf),
    ("THEN", TokenKind::KwThen),
    ("ELSIF", TokenKind::KwElsif),
    ("ELSE", TokenKind::KwElse),
    ("END_IF", TokenKind::KwEndIf),
    ("CASE", TokenKind::KwCase),
    ("END_CASE", TokenKind::KwEndCase),
    ("FOR", TokenKind::KwFor),
    ("BY", TokenKind::KwBy),
    ("DO", TokenKind::KwDo),
    ("END_FOR", TokenKind::KwEndFor),
    ("WHILE", TokenKind::KwWhile),
    ("END_WHILE", TokenKind::KwEndWhile),
    ("REPEAT", TokenKind::KwRepeat),
    ("UNTIL", TokenKind::KwUntil),
    ("END_REPEAT", TokenKind::KwEndRepeat),
    ("RETURN", TokenKind::KwReturn),
    ("EXIT", TokenKind::KwExit),
    ("CONTINUE", TokenKind::KwContinue),
    ("JMP", TokenKind::KwJmp),
    // Logical operators
    ("AND", TokenKind::KwAnd),
    ("OR", TokenKind::KwOr),
    ("XOR", TokenKind::KwXor),
    ("NOT", TokenKind::KwNot),
    ("MOD", TokenKind::KwMod),
    // Elementary data types
    ("BOOL", TokenKind::KwBool),
    ("SINT", TokenKind::KwSInt),
    ("INT", TokenKind::KwInt),
    ("DINT", TokenKind::KwDInt),
    ("LINT", TokenKind::KwLInt),
    ("USINT", TokenKind::KwUSInt),
    ("UINT", TokenKind::KwUInt),
    ("UDINT", TokenKind::KwUDInt),
    ("ULINT", TokenKind::KwULInt),
    ("REAL", TokenKind::KwReal),
    ("LREAL", TokenKind::KwLReal),
    ("BYTE", TokenKind::KwByte),
    ("WORD", TokenKind::KwWord),
    ("DWORD", TokenKind::KwDWord),
    ("LWORD", TokenKind::KwLWord),
    ("TIME", TokenKind::KwTime),
    ("LTIME", TokenKind::KwLTime),
    ("DATE", TokenKind::KwDate),
    ("LDATE", TokenKind::KwLDate),
    ("TIME_OF_DAY", TokenKind::KwTimeOfDay),
    ("TOD", TokenKind::KwTimeOfDay),
    ("LTIME_OF_DAY", TokenKind::KwLTimeOfDay),
    ("LTOD", TokenKind::KwLTimeOfDay),
    ("DATE_AND_TIME", TokenKind::KwDateAndTime),
    ("DT", TokenKind::KwDateAndTime),
    ("LDATE_AND_TIME", TokenKind::KwLDateAndTime),
    ("LDT", TokenKind::KwLDateAndTime),
    ("CHAR", TokenKind::KwChar),
    ("WCHAR", TokenKind::KwWChar),
    // Boolean literals
    ("TRUE", TokenKind::KwTrue),
    ("FALSE", TokenKind::KwFalse),
];

const MAX_KEYWORD_LEN: usize = 24;

static KEYWORD_MAP: Lazy<FxHashMap<&'static str, TokenKind>> =
    Lazy::new(|| KEYWORDS.iter().copied().collect());

/// Classifies an identifier as a keyword, ignoring ASCII case.
///
/// Identifier text is ASCII by construction, so upper-casing happens in a
/// fixed stack buffer.
pub fn lookup(ident: &str) -> Option<TokenKind> {
    let bytes = ident.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_KEYWORD_LEN {
        return None;
    }
    let mut buf = [0u8; MAX_KEYWORD_LEN];
    let upper = &mut buf[..bytes.len()];
    upper.copy_from_slice(bytes);
    upper.make_ascii_uppercase();
    let upper = std::str::from_utf8(upper).ok()?;
    KEYWORD_MAP.get(upper).copied()
}

/// Returns the canonical spelling of a keyword kind.
pub fn canonical_text(kind: TokenKind) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(_, keyword)| *keyword == kind)
        .map(|(text, _)| *text)
}
