//! Single list of token kind names shared by `TokenKind` and `SyntaxKind`.
//!
//! The order must match the declaration order of `TokenKind`, so that both
//! enums assign the same discriminant to every token. `Eof` stays last.

macro_rules! for_each_token_kind {
    ($callback:ident) => {
        $callback! {
            Whitespace, LineComment, BlockComment, Pragma, Semicolon, Colon, Comma, Dot, DotDot,
            LParen, RParen, LBracket, RBracket, Caret, Assign, Arrow, RefAssign, Eq, Neq, Lt, LtEq,
            Gt, GtEq, Plus, Minus, Star, Slash, Power, Ampersand, KwProgram, KwEndProgram,
            KwFunction, KwEndFunction, KwFunctionBlock, KwEndFunctionBlock, KwVar, KwEndVar,
            KwVarInput, KwVarOutput, KwVarInOut, KwVarTemp, KwVarGlobal, KwVarExternal, KwConstant,
            KwRetain, KwNonRetain, KwPersistent, KwAt, KwType, KwEndType, KwStruct, KwEndStruct,
            KwArray, KwOf, KwString, KwWString, KwPointer, KwRefTo, KwTo, KwIf, KwThen, KwElsif,
            KwElse, KwEndIf, KwCase, KwEndCase, KwFor, KwBy, KwDo, KwEndFor, KwWhile, KwEndWhile,
            KwRepeat, KwUntil, KwEndRepeat, KwReturn, KwExit, KwContinue, KwJmp, KwAnd, KwOr,
            KwXor, KwNot, KwMod, KwBool, KwSInt, KwInt, KwDInt, KwLInt, KwUSInt, KwUInt, KwUDInt,
            KwULInt, KwReal, KwLReal, KwByte, KwWord, KwDWord, KwLWord, KwTime, KwLTime, KwDate,
            KwLDate, KwTimeOfDay, KwLTimeOfDay, KwDateAndTime, KwLDateAndTime, KwChar, KwWChar,
            KwTrue, KwFalse, IntLiteral, BasedIntLiteral, RealLiteral, TimeLiteral, DateLiteral,
            TimeOfDayLiteral, DateAndTimeLiteral, StringLiteral, WideStringLiteral,
            TypedLiteralPrefix, DirectAddress, Ident, Error, Eof,
        }
    };
}

pub(crate) use for_each_token_kind;
